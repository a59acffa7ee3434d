//! Overload resolution and invocation.
//!
//! Resolution ranks applicable candidates by pairwise signature
//! preference: a candidate survives only while no other candidate converts
//! every argument at least as cheaply and one argument strictly cheaper.
//! Surviving ties raise `AmbiguousOverload` listing every candidate. A
//! small advisory cache keyed on argument shapes skips re-ranking for
//! repeated call sites; hits are re-validated, so the cache can never
//! change which member wins.

use crate::catalog::{MemberKind, MemberRecord};
use crate::convert::{conversion_weight, Weight};
use crate::error::{InteropError, InteropResult};
use crate::host::ty::HostType;
use crate::host::value::{HostObject, HostSeq, HostValue};
use crate::session::Session;
use crate::wrappers::unwrap_host;
use kiln_core::Value;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

const PREFERENCE_EQUAL: u8 = 0;
const PREFERENCE_FIRST: u8 = 1;
const PREFERENCE_SECOND: u8 = 2;
const PREFERENCE_AMBIGUOUS: u8 = 3;

/// Coarse argument shape used as a resolution cache key.
#[derive(Debug, Clone, PartialEq)]
enum ArgShape {
    Undefined,
    Null,
    Bool,
    Number,
    Str,
    Array,
    Object,
    Callable,
    Host(HostType),
}

fn shape_of(value: &Value) -> ArgShape {
    if let Some(hv) = unwrap_host(value) {
        return ArgShape::Host(hv.type_of());
    }
    match value {
        Value::Undefined => ArgShape::Undefined,
        Value::Null => ArgShape::Null,
        Value::Bool(_) => ArgShape::Bool,
        Value::Number(_) => ArgShape::Number,
        Value::String(_) => ArgShape::Str,
        Value::Array(_) => ArgShape::Array,
        Value::Callable(_) => ArgShape::Callable,
        Value::Object(_) | Value::External(_) => ArgShape::Object,
    }
}

/// Bounded advisory cache of shape fingerprint to member index.
struct ResolutionCache {
    entries: RwLock<Vec<(Box<[ArgShape]>, usize)>>,
    cap: usize,
}

impl ResolutionCache {
    fn new(cap: usize) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            cap,
        }
    }

    fn lookup(&self, shapes: &[ArgShape]) -> Option<usize> {
        self.entries
            .read()
            .iter()
            .find(|(s, _)| **s == *shapes)
            .map(|(_, idx)| *idx)
    }

    fn insert(&self, shapes: Box<[ArgShape]>, idx: usize) {
        let mut entries = self.entries.write();
        if entries.len() < self.cap && !entries.iter().any(|(s, _)| *s == shapes) {
            entries.push((shapes, idx));
        }
    }
}

/// All overloads sharing one name on one type.
pub struct OverloadSet {
    pub type_name: Arc<str>,
    pub name: Arc<str>,
    members: Vec<Arc<MemberRecord>>,
    cache: ResolutionCache,
}

impl OverloadSet {
    pub fn new(type_name: Arc<str>, name: Arc<str>, members: Vec<Arc<MemberRecord>>) -> Self {
        let cap = 2 * members.len();
        Self {
            type_name,
            name,
            members,
            cache: ResolutionCache::new(cap),
        }
    }

    pub fn members(&self) -> &[Arc<MemberRecord>] {
        &self.members
    }

    /// Pick the overload for the given arguments.
    ///
    /// A lone candidate skips ranking but is still screened: the arity
    /// must fit and every fixed argument must have some conversion.
    pub fn resolve(&self, session: &Session, args: &[Value]) -> InteropResult<Arc<MemberRecord>> {
        match self.members.len() {
            0 => Err(self.no_match(args)),
            1 => {
                if applicable(session, &self.members[0], args) {
                    Ok(self.members[0].clone())
                } else {
                    Err(self.no_match(args))
                }
            }
            _ => {
                let shapes: Box<[ArgShape]> = args.iter().map(shape_of).collect();
                if let Some(idx) = self.cache.lookup(&shapes) {
                    if idx < self.members.len() && applicable(session, &self.members[idx], args) {
                        return Ok(self.members[idx].clone());
                    }
                }
                let idx = self.find_function(session, args)?;
                self.cache.insert(shapes, idx);
                Ok(self.members[idx].clone())
            }
        }
    }

    fn find_function(&self, session: &Session, args: &[Value]) -> InteropResult<usize> {
        let mut first_best: Option<usize> = None;
        let mut extra_best: Vec<usize> = Vec::new();

        'search: for (i, member) in self.members.iter().enumerate() {
            if !applicable(session, member, args) {
                continue;
            }
            let Some(best) = first_best else {
                first_best = Some(i);
                continue;
            };
            let mut better = 0usize;
            let mut worse = 0usize;
            let total = 1 + extra_best.len();
            for slot in 0..total {
                let best_idx = if slot == 0 { best } else { extra_best[slot - 1] };
                let current_best = &self.members[best_idx];
                match prefer_signature(session, args, member, current_best) {
                    PREFERENCE_AMBIGUOUS => break,
                    PREFERENCE_FIRST => better += 1,
                    PREFERENCE_SECOND => worse += 1,
                    _ => {
                        // identical effective signatures: substitute the
                        // more derived declaring type
                        if more_derived(session, member, current_best) {
                            if slot == 0 {
                                first_best = Some(i);
                            } else {
                                extra_best[slot - 1] = i;
                            }
                        }
                        continue 'search;
                    }
                }
            }
            if better == total {
                first_best = Some(i);
                extra_best.clear();
            } else if worse == total {
                // dominated; drop it
            } else {
                extra_best.push(i);
            }
        }

        match first_best {
            None => Err(self.no_match(args)),
            Some(best) if extra_best.is_empty() => Ok(best),
            Some(best) => {
                let registry = session.registry();
                let mut candidates = vec![self.members[best].declaration(registry)];
                candidates.extend(
                    extra_best
                        .iter()
                        .map(|&i| self.members[i].declaration(registry)),
                );
                Err(InteropError::AmbiguousOverload {
                    type_name: self.type_name.to_string(),
                    member: self.name.to_string(),
                    signature: script_signature(args),
                    candidates,
                })
            }
        }
    }

    fn no_match(&self, args: &[Value]) -> InteropError {
        InteropError::MemberNotFound {
            type_name: self.type_name.to_string(),
            member: format!("{}{}", self.name, script_signature(args)),
        }
    }
}

/// Whether a candidate can accept the argument list at all: arity must
/// match (a variadic candidate accepts anything past its fixed prefix)
/// and every fixed-position argument must have some conversion.
fn applicable(session: &Session, member: &MemberRecord, args: &[Value]) -> bool {
    let params = member.params();
    let fixed = if member.is_varargs() {
        let fixed = params.len() - 1;
        if fixed > args.len() {
            return false;
        }
        fixed
    } else {
        if params.len() != args.len() {
            return false;
        }
        params.len()
    };
    for j in 0..fixed {
        if conversion_weight(session, &args[j], &params[j]).is_none() {
            return false;
        }
    }
    true
}

/// Effective parameter type at an argument position; variadic candidates
/// reuse their rest element type past the fixed prefix.
fn param_at(member: &MemberRecord, j: usize) -> HostType {
    let params = member.params();
    if member.is_varargs() && j + 1 >= params.len() {
        match params.last() {
            Some(HostType::Array(elem)) => (**elem).clone(),
            Some(other) => other.clone(),
            None => HostType::Any,
        }
    } else {
        params.get(j).cloned().unwrap_or(HostType::Any)
    }
}

/// Pairwise preference between two candidates for a concrete argument
/// list, accumulated per position as bit flags. Equal weights at an exact
/// match fall back to preferring the narrower parameter type.
fn prefer_signature(
    session: &Session,
    args: &[Value],
    first: &MemberRecord,
    second: &MemberRecord,
) -> u8 {
    let registry = session.registry();
    let mut total = PREFERENCE_EQUAL;
    for (j, arg) in args.iter().enumerate() {
        let t1 = param_at(first, j);
        let t2 = param_at(second, j);
        if t1 == t2 {
            continue;
        }
        let w1 = conversion_weight(session, arg, &t1);
        let w2 = conversion_weight(session, arg, &t2);
        let pref = if w1 < w2 {
            PREFERENCE_FIRST
        } else if w1 > w2 {
            PREFERENCE_SECOND
        } else if w1 == Weight::EXACT {
            if registry.is_assignable(&t1, &t2) {
                PREFERENCE_SECOND
            } else if registry.is_assignable(&t2, &t1) {
                PREFERENCE_FIRST
            } else {
                PREFERENCE_AMBIGUOUS
            }
        } else {
            PREFERENCE_AMBIGUOUS
        };
        total |= pref;
        if total == PREFERENCE_AMBIGUOUS {
            break;
        }
    }
    total
}

/// Whether `member` declares the same signature lower in the hierarchy
/// than `other`.
fn more_derived(session: &Session, member: &MemberRecord, other: &MemberRecord) -> bool {
    member.declaring != other.declaring
        && session
            .registry()
            .is_assignable_class(other.declaring, member.declaring)
}

/// Render a call-site signature from argument kinds: `"(number,string)"`.
pub fn script_signature(args: &[Value]) -> String {
    let parts: Vec<&str> = args.iter().map(|a| a.type_name()).collect();
    format!("({})", parts.join(","))
}

/// Invoke a resolved member with script arguments.
pub fn invoke(
    session: &Session,
    record: &Arc<MemberRecord>,
    this: Option<&Arc<HostObject>>,
    args: &[Value],
) -> InteropResult<Value> {
    let host_args = marshal_args(session, record, args)?;
    let result = match &record.kind {
        MemberKind::Method { body, .. } => match body {
            Some(body) => {
                let receiver = if record.is_static() {
                    None
                } else {
                    this.map(|o| o.as_ref())
                };
                body(receiver, &host_args)
                    .map_err(|message| InteropError::HostFailure { message })?
            }
            None => {
                // signature-only method: dispatch to the script value
                // behind an adapter instance
                let script = this.and_then(|o| o.script_value());
                let Some(script) = script else {
                    return Err(InteropError::HostFailure {
                        message: format!(
                            "{}.{} has no implementation",
                            record.declaring_name, record.original_name
                        ),
                    });
                };
                crate::adapter::invoke_script_method(session, script, record, &host_args)?
            }
        },
        MemberKind::Constructor { body, .. } => match body {
            Some(body) => {
                body(&host_args).map_err(|message| InteropError::HostFailure { message })?
            }
            None => default_construct(session, record)?,
        },
        MemberKind::Field { .. } => {
            return Err(InteropError::HostFailure {
                message: format!("{} is not invokable", record.original_name),
            })
        }
    };
    Ok(session.to_runtime(&result))
}

/// Convert script arguments to the member's parameter types. For variadic
/// members, a single array (or null) at exact arity spreads through as the
/// rest array itself; otherwise trailing arguments collapse into a fresh
/// rest array, empty when absent.
fn marshal_args(
    session: &Session,
    record: &MemberRecord,
    args: &[Value],
) -> InteropResult<Vec<HostValue>> {
    let params = record.params();
    if !record.is_varargs() {
        let mut out = Vec::with_capacity(params.len());
        for (i, param) in params.iter().enumerate() {
            let arg = args.get(i).unwrap_or(&Value::Undefined);
            out.push(session.to_host(arg, param)?);
        }
        return Ok(out);
    }

    let fixed = params.len() - 1;
    let mut out = Vec::with_capacity(params.len());
    for (i, param) in params.iter().take(fixed).enumerate() {
        let arg = args.get(i).unwrap_or(&Value::Undefined);
        out.push(session.to_host(arg, param)?);
    }
    let rest_ty = &params[fixed];
    let elem = match rest_ty {
        HostType::Array(e) => (**e).clone(),
        other => other.clone(),
    };
    if args.len() == params.len() {
        let last = &args[fixed];
        let passthrough = last.is_null()
            || matches!(last, Value::Array(_))
            || matches!(unwrap_host(last), Some(HostValue::Array(_)));
        if passthrough {
            if let Ok(direct) = session.to_host(last, rest_ty) {
                out.push(direct);
                return Ok(out);
            }
        }
    }
    let mut items = Vec::new();
    if args.len() > fixed {
        for arg in &args[fixed..] {
            items.push(session.to_host(arg, &elem)?);
        }
    }
    out.push(HostValue::Array(Arc::new(HostSeq::new(elem, items))));
    Ok(out)
}

/// Default allocation for a body-less constructor: a fresh instance whose
/// fields hold their declared defaults.
fn default_construct(session: &Session, record: &MemberRecord) -> InteropResult<HostValue> {
    let desc = session.describe(record.declaring)?;
    let mut fields = FxHashMap::default();
    for field in desc.accessible_fields(session.catalog()) {
        if field.is_static() {
            continue;
        }
        if let MemberKind::Field { default, .. } = &field.kind {
            fields.insert(field.original_name.clone(), default.clone());
        }
    }
    Ok(HostValue::Object(Arc::new(HostObject::with_fields(
        record.declaring,
        desc.name.clone(),
        fields,
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::class::{ClassDef, MethodDef};
    use crate::host::registry::HostRegistry;
    use crate::host::ty::PrimKind;
    use crate::members::{Member, MemberTable};

    fn session_and_table(def: ClassDef) -> (Session, Arc<MemberTable>) {
        let reg = Arc::new(HostRegistry::new());
        let id = reg.register(def);
        let session = Session::new(reg);
        let table = session.lookup(id).unwrap();
        (session, table)
    }

    fn method_set(table: &MemberTable, name: &str) -> Arc<OverloadSet> {
        match table.entry(name, false) {
            Some(Member::Methods(set)) => set.clone(),
            _ => panic!("expected a method group"),
        }
    }

    fn tagged(tag: &'static str) -> MethodDef {
        MethodDef::new("pick", HostType::Str, move |_, _| {
            Ok(HostValue::Str(tag.into()))
        })
    }

    #[test]
    fn test_single_candidate_skips_ranking_but_screens() {
        let (session, table) = session_and_table(ClassDef::new("Solo").with_method(
            tagged("only").with_param(HostType::Prim(PrimKind::Int)),
        ));
        let set = method_set(&table, "pick");
        // a convertible argument resolves without ranking
        let record = set.resolve(&session, &[Value::string("3")]).unwrap();
        assert_eq!(record.params().len(), 1);
        // an argument with no conversion is rejected
        let err = set.resolve(&session, &[Value::Bool(true)]).unwrap_err();
        assert!(matches!(err, InteropError::MemberNotFound { .. }));
    }

    #[test]
    fn test_single_candidate_rejects_wrong_arity() {
        let (session, table) = session_and_table(ClassDef::new("Solo").with_method(
            tagged("only").with_param(HostType::Str),
        ));
        let set = method_set(&table, "pick");
        let err = set.resolve(&session, &[]).unwrap_err();
        assert!(matches!(err, InteropError::MemberNotFound { .. }));
        let err = set
            .resolve(&session, &[Value::string("a"), Value::string("b")])
            .unwrap_err();
        match err {
            InteropError::MemberNotFound { member, .. } => {
                assert_eq!(member, "pick(string,string)");
            }
            other => panic!("expected no match, got {other}"),
        }
    }

    #[test]
    fn test_wider_numeric_wins_for_plain_number() {
        let (session, table) = session_and_table(
            ClassDef::new("Calc")
                .with_method(tagged("int").with_param(HostType::Prim(PrimKind::Int)))
                .with_method(tagged("double").with_param(HostType::Prim(PrimKind::Double))),
        );
        let set = method_set(&table, "pick");
        let record = set.resolve(&session, &[Value::Number(3.0)]).unwrap();
        assert_eq!(record.params()[0], HostType::Prim(PrimKind::Double));
    }

    #[test]
    fn test_string_argument_prefers_string_param() {
        let (session, table) = session_and_table(
            ClassDef::new("Fmt")
                .with_method(tagged("str").with_param(HostType::Str))
                .with_method(tagged("double").with_param(HostType::Prim(PrimKind::Double))),
        );
        let set = method_set(&table, "pick");
        let record = set.resolve(&session, &[Value::string("x")]).unwrap();
        assert_eq!(record.params()[0], HostType::Str);
    }

    #[test]
    fn test_null_between_reference_types_is_ambiguous() {
        let (session, table) = session_and_table(
            ClassDef::new("Sink")
                .with_method(tagged("str").with_param(HostType::Str))
                .with_method(tagged("date").with_param(HostType::Date)),
        );
        let set = method_set(&table, "pick");
        let err = set.resolve(&session, &[Value::Null]).unwrap_err();
        match err {
            InteropError::AmbiguousOverload { candidates, .. } => {
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("expected ambiguity, got {other}"),
        }
    }

    #[test]
    fn test_arity_screens_candidates() {
        let (session, table) = session_and_table(
            ClassDef::new("Gate")
                .with_method(tagged("one").with_param(HostType::Str))
                .with_method(
                    tagged("two")
                        .with_param(HostType::Str)
                        .with_param(HostType::Str),
                ),
        );
        let set = method_set(&table, "pick");
        let record = set
            .resolve(&session, &[Value::string("a"), Value::string("b")])
            .unwrap();
        assert_eq!(record.params().len(), 2);
    }

    #[test]
    fn test_no_applicable_candidate_reports_call_signature() {
        let (session, table) = session_and_table(
            ClassDef::new("Gate")
                .with_method(tagged("one").with_param(HostType::Str))
                .with_method(tagged("two").with_param(HostType::Date)),
        );
        let set = method_set(&table, "pick");
        let err = set
            .resolve(&session, &[Value::string("a"), Value::string("b")])
            .unwrap_err();
        match err {
            InteropError::MemberNotFound { member, .. } => {
                assert_eq!(member, "pick(string,string)");
            }
            other => panic!("expected no match, got {other}"),
        }
    }

    #[test]
    fn test_cache_repeats_resolution() {
        let (session, table) = session_and_table(
            ClassDef::new("Calc")
                .with_method(tagged("int").with_param(HostType::Prim(PrimKind::Int)))
                .with_method(tagged("double").with_param(HostType::Prim(PrimKind::Double))),
        );
        let set = method_set(&table, "pick");
        for _ in 0..3 {
            let record = set.resolve(&session, &[Value::Number(1.5)]).unwrap();
            assert_eq!(record.params()[0], HostType::Prim(PrimKind::Double));
        }
    }
}
