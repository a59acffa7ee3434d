//! Name-indexed member tables.
//!
//! A `MemberTable` turns a type description into what property access
//! needs: one entry per script-visible name, split into instance and
//! static sides. Overloaded methods collapse into one entry, a field and
//! methods sharing a name combine, and accessor methods (`getX`/`isX`/
//! `setX`) additionally synthesize a bean-style property under `x` unless
//! an explicit member already claims that name.

use crate::catalog::{Catalog, MemberKind, MemberRecord, TypeDescriptor};
use crate::error::{InteropError, InteropResult};
use crate::host::registry::HostRegistry;
use crate::host::ty::{HostType, HostTypeId};
use crate::host::value::HostObject;
use crate::overload::{invoke, OverloadSet};
use crate::session::Session;
use crate::wrappers::method::HostMethod;
use kiln_core::Value;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

/// One named entry of a member table.
#[derive(Clone)]
pub enum Member {
    Field(Arc<MemberRecord>),
    Methods(Arc<OverloadSet>),
    /// A field and one or more methods share the name; reads produce the
    /// callable, writes hit the field
    FieldAndMethods {
        field: Arc<MemberRecord>,
        methods: Arc<OverloadSet>,
    },
    Property(Arc<BeanProperty>),
}

/// A synthesized accessor property.
pub struct BeanProperty {
    pub name: Arc<str>,
    pub getter: Option<Arc<MemberRecord>>,
    pub setter: Option<Arc<MemberRecord>>,
    /// The full setter overload set, kept when more than one single-arg
    /// setter exists so writes can re-resolve against the actual value
    pub setters: Option<Arc<OverloadSet>>,
}

/// All script-visible members of one host type.
pub struct MemberTable {
    pub type_id: HostTypeId,
    pub type_name: Arc<str>,
    members: FxHashMap<Arc<str>, Member>,
    static_members: FxHashMap<Arc<str>, Member>,
    ctors: Arc<OverloadSet>,
}

impl MemberTable {
    /// Index a described type. Methods are grouped first, then fields
    /// merge in, then bean properties are synthesized over both sides.
    pub fn build(catalog: &Catalog, desc: &TypeDescriptor) -> Self {
        let registry = catalog.registry().as_ref();
        let type_name = desc.name.clone();

        let mut inst_groups: FxHashMap<Arc<str>, Vec<Arc<MemberRecord>>> = FxHashMap::default();
        let mut stat_groups: FxHashMap<Arc<str>, Vec<Arc<MemberRecord>>> = FxHashMap::default();
        for method in desc.accessible_methods(catalog) {
            let groups = if method.is_static() {
                &mut stat_groups
            } else {
                &mut inst_groups
            };
            groups
                .entry(method.script_name.clone())
                .or_default()
                .push(method.clone());
        }

        let mut members: FxHashMap<Arc<str>, Member> = FxHashMap::default();
        let mut static_members: FxHashMap<Arc<str>, Member> = FxHashMap::default();
        for (groups, map) in [
            (inst_groups, &mut members),
            (stat_groups, &mut static_members),
        ] {
            for (name, group) in groups {
                let set = OverloadSet::new(type_name.clone(), name.clone(), group);
                map.insert(name, Member::Methods(Arc::new(set)));
            }
        }

        for field in desc.accessible_fields(catalog) {
            let map = if field.is_static() {
                &mut static_members
            } else {
                &mut members
            };
            match map.entry(field.script_name.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(Member::Field(field.clone()));
                }
                Entry::Occupied(mut slot) => {
                    if let Member::Methods(methods) = slot.get() {
                        let methods = methods.clone();
                        slot.insert(Member::FieldAndMethods {
                            field: field.clone(),
                            methods,
                        });
                    }
                }
            }
        }

        synthesize_beans(&mut members, registry);
        synthesize_beans(&mut static_members, registry);

        let ctors = Arc::new(OverloadSet::new(
            type_name.clone(),
            type_name.clone(),
            desc.constructors(catalog).to_vec(),
        ));

        Self {
            type_id: desc.id,
            type_name,
            members,
            static_members,
            ctors,
        }
    }

    /// The constructor overload set
    pub fn constructors(&self) -> &Arc<OverloadSet> {
        &self.ctors
    }

    /// Look up an entry. Instance access falls back to static members;
    /// static access never reaches instance members.
    pub fn entry(&self, name: &str, is_static: bool) -> Option<&Member> {
        if is_static {
            self.static_members.get(name)
        } else {
            self.members
                .get(name)
                .or_else(|| self.static_members.get(name))
        }
    }

    /// Whether a name resolves on the given side
    pub fn has(&self, name: &str, is_static: bool) -> bool {
        self.entry(name, is_static).is_some()
    }

    /// All names on one side, sorted for stable enumeration
    pub fn ids(&self, is_static: bool) -> Vec<Arc<str>> {
        let map = if is_static {
            &self.static_members
        } else {
            &self.members
        };
        let mut names: Vec<Arc<str>> = map.keys().cloned().collect();
        names.sort();
        names
    }

    /// Read a member as a script value.
    pub fn get(
        &self,
        session: &Session,
        this: Option<&Arc<HostObject>>,
        name: &str,
    ) -> InteropResult<Value> {
        if name.contains('(') {
            if let Some(found) = self.find_explicit(session, this, name) {
                return Ok(found);
            }
            return Err(self.not_found(name));
        }
        let member = self
            .entry(name, this.is_none())
            .ok_or_else(|| self.not_found(name))?;
        match member {
            Member::Field(field) => self.field_get(session, field, this),
            Member::Methods(set) => Ok(HostMethod::value(
                session.clone(),
                set.clone(),
                this.cloned(),
                None,
            )),
            Member::FieldAndMethods { field, methods } => Ok(HostMethod::value(
                session.clone(),
                methods.clone(),
                this.cloned(),
                Some(field.clone()),
            )),
            Member::Property(bp) => match &bp.getter {
                Some(getter) => invoke(session, getter, this, &[]),
                None => Ok(Value::Undefined),
            },
        }
    }

    /// Write a member from a script value.
    pub fn put(
        &self,
        session: &Session,
        this: Option<&Arc<HostObject>>,
        name: &str,
        value: &Value,
    ) -> InteropResult<()> {
        let member = self
            .entry(name, this.is_none())
            .ok_or_else(|| self.not_found(name))?;
        match member {
            Member::Field(field) | Member::FieldAndMethods { field, .. } => {
                self.field_put(session, field, this, value)
            }
            Member::Property(bp) => {
                if let Some(setters) = &bp.setters {
                    let args = [value.clone()];
                    let record = setters.resolve(session, &args)?;
                    invoke(session, &record, this, &args)?;
                    Ok(())
                } else if let Some(setter) = &bp.setter {
                    invoke(session, setter, this, &[value.clone()])?;
                    Ok(())
                } else {
                    Err(InteropError::ImmutableField {
                        type_name: self.type_name.to_string(),
                        field: name.to_string(),
                    })
                }
            }
            Member::Methods(_) => Err(InteropError::ImmutableField {
                type_name: self.type_name.to_string(),
                field: name.to_string(),
            }),
        }
    }

    fn field_get(
        &self,
        session: &Session,
        field: &Arc<MemberRecord>,
        this: Option<&Arc<HostObject>>,
    ) -> InteropResult<Value> {
        let MemberKind::Field { default, .. } = &field.kind else {
            unreachable!("field member holds a field record");
        };
        let current = if field.is_static() {
            session
                .registry()
                .static_get(field.declaring, &field.original_name, default)
        } else {
            match this {
                Some(obj) => obj
                    .field(&field.original_name)
                    .unwrap_or_else(|| default.clone()),
                None => return Err(self.not_found(&field.script_name)),
            }
        };
        Ok(session.to_runtime(&current))
    }

    fn field_put(
        &self,
        session: &Session,
        field: &Arc<MemberRecord>,
        this: Option<&Arc<HostObject>>,
        value: &Value,
    ) -> InteropResult<()> {
        if field.modifiers.is_final() {
            return Err(InteropError::ImmutableField {
                type_name: self.type_name.to_string(),
                field: field.script_name.to_string(),
            });
        }
        let MemberKind::Field { ty, .. } = &field.kind else {
            unreachable!("field member holds a field record");
        };
        let converted = session.to_host(value, ty)?;
        if field.is_static() {
            session
                .registry()
                .static_set(field.declaring, &field.original_name, converted);
        } else if let Some(obj) = this {
            obj.set_field(field.original_name.clone(), converted);
        } else {
            return Err(self.not_found(&field.script_name));
        }
        Ok(())
    }

    /// Resolve an explicit-signature lookup such as `"load(String,int)"`.
    /// A leading `(` on the static side addresses a constructor.
    fn find_explicit(
        &self,
        session: &Session,
        this: Option<&Arc<HostObject>>,
        name: &str,
    ) -> Option<Value> {
        let paren = name.find('(')?;
        let (head, sig) = name.split_at(paren);
        let registry = session.registry();
        if head.is_empty() {
            if this.is_some() {
                return None;
            }
            let record = self
                .ctors
                .members()
                .iter()
                .find(|c| registry.signature_of_params(c.params()) == sig)?
                .clone();
            let set = OverloadSet::new(self.type_name.clone(), self.type_name.clone(), vec![
                record,
            ]);
            return Some(HostMethod::value(session.clone(), Arc::new(set), None, None));
        }
        let set = match self.entry(head, this.is_none())? {
            Member::Methods(set) | Member::FieldAndMethods { methods: set, .. } => set,
            _ => return None,
        };
        let record = set
            .members()
            .iter()
            .find(|m| registry.signature_of_params(m.params()) == sig)?
            .clone();
        let single = OverloadSet::new(self.type_name.clone(), set.name.clone(), vec![record]);
        Some(HostMethod::value(
            session.clone(),
            Arc::new(single),
            this.cloned(),
            None,
        ))
    }

    fn not_found(&self, name: &str) -> InteropError {
        InteropError::MemberNotFound {
            type_name: self.type_name.to_string(),
            member: name.to_string(),
        }
    }
}

/// Derive the property name from an accessor remainder: `Count` becomes
/// `count`, but `URL` stays `URL` (two leading capitals).
fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(first), second) if first.is_uppercase() => match second {
            Some(c) if c.is_uppercase() => name.to_string(),
            _ => {
                let mut out: String = first.to_lowercase().collect();
                out.push_str(&name[first.len_utf8()..]);
                out
            }
        },
        _ => name.to_string(),
    }
}

/// Scan one side of a table for `getX`/`isX`/`setX` methods and add a
/// property entry per derived name. Explicit members always win.
fn synthesize_beans(map: &mut FxHashMap<Arc<str>, Member>, registry: &HostRegistry) {
    let mut found: Vec<(String, String)> = Vec::new();
    for name in map.keys() {
        let remainder = name
            .strip_prefix("get")
            .or_else(|| name.strip_prefix("is"))
            .or_else(|| name.strip_prefix("set"));
        let Some(rem) = remainder else { continue };
        if rem.is_empty() {
            continue;
        }
        let bean = decapitalize(rem);
        if map.contains_key(bean.as_str()) || found.iter().any(|(b, _)| *b == bean) {
            continue;
        }
        found.push((bean, rem.to_string()));
    }

    for (bean, rem) in found {
        let getter = find_getter(map, &rem);
        let mut setter = None;
        let mut setters = None;
        if let Some(set) = methods_at(map, &format!("set{rem}")) {
            setter = match &getter {
                // two passes: exact parameter type first, then an
                // assignable widening
                Some(g) => {
                    let ret = g.return_type().cloned().unwrap_or(HostType::Any);
                    set.members()
                        .iter()
                        .find(|m| m.params().len() == 1 && m.params()[0] == ret)
                        .or_else(|| {
                            set.members().iter().find(|m| {
                                m.params().len() == 1
                                    && registry.is_assignable(&m.params()[0], &ret)
                            })
                        })
                        .cloned()
                }
                None => set
                    .members()
                    .iter()
                    .find(|m| {
                        m.params().len() == 1 && m.return_type() == Some(&HostType::Void)
                    })
                    .cloned(),
            };
            let one_arg = set
                .members()
                .iter()
                .filter(|m| m.params().len() == 1)
                .count();
            if one_arg > 1 {
                setters = Some(set.clone());
            }
        }
        if getter.is_none() && setter.is_none() {
            continue;
        }
        let name: Arc<str> = Arc::from(bean.as_str());
        map.insert(
            name.clone(),
            Member::Property(Arc::new(BeanProperty {
                name,
                getter,
                setter,
                setters,
            })),
        );
    }
}

fn methods_at<'a>(
    map: &'a FxHashMap<Arc<str>, Member>,
    name: &str,
) -> Option<&'a Arc<OverloadSet>> {
    match map.get(name)? {
        Member::Methods(set) | Member::FieldAndMethods { methods: set, .. } => Some(set),
        _ => None,
    }
}

/// Zero-argument non-void accessor; `get` is preferred over `is`.
fn find_getter(map: &FxHashMap<Arc<str>, Member>, rem: &str) -> Option<Arc<MemberRecord>> {
    for prefix in ["get", "is"] {
        if let Some(set) = methods_at(map, &format!("{prefix}{rem}")) {
            let hit = set.members().iter().find(|m| {
                m.params().is_empty() && m.return_type().is_some_and(|r| *r != HostType::Void)
            });
            if let Some(m) = hit {
                return Some(m.clone());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, PublicOnly};
    use crate::host::class::{ClassDef, FieldDef, MethodDef};
    use crate::host::registry::HostRegistry;
    use crate::host::ty::PrimKind;
    use crate::host::value::HostValue;

    fn table_for(def: ClassDef) -> MemberTable {
        let reg = Arc::new(HostRegistry::new());
        let id = reg.register(def);
        let cat = Catalog::new(reg, Arc::new(PublicOnly));
        let desc = cat.describe(id).unwrap();
        MemberTable::build(&cat, &desc)
    }

    #[test]
    fn test_decapitalize() {
        assert_eq!(decapitalize("Count"), "count");
        assert_eq!(decapitalize("X"), "x");
        assert_eq!(decapitalize("URL"), "URL");
        assert_eq!(decapitalize("already"), "already");
    }

    #[test]
    fn test_overloads_group_under_one_name() {
        let table = table_for(
            ClassDef::new("Painter")
                .with_method(
                    MethodDef::new("fill", HostType::Void, |_, _| Ok(HostValue::Void))
                        .with_param(HostType::Prim(PrimKind::Int)),
                )
                .with_method(
                    MethodDef::new("fill", HostType::Void, |_, _| Ok(HostValue::Void))
                        .with_param(HostType::Str),
                ),
        );
        match table.entry("fill", false) {
            Some(Member::Methods(set)) => assert_eq!(set.members().len(), 2),
            _ => panic!("expected a method group"),
        }
    }

    #[test]
    fn test_field_and_methods_combine() {
        let table = table_for(
            ClassDef::new("Mixed")
                .with_field(FieldDef::new("size", HostType::Prim(PrimKind::Int)))
                .with_method(MethodDef::new(
                    "size",
                    HostType::Prim(PrimKind::Int),
                    |_, _| Ok(HostValue::Int(0)),
                )),
        );
        assert!(matches!(
            table.entry("size", false),
            Some(Member::FieldAndMethods { .. })
        ));
    }

    #[test]
    fn test_bean_property_synthesis() {
        let table = table_for(
            ClassDef::new("Widget")
                .with_method(MethodDef::new(
                    "getWidth",
                    HostType::Prim(PrimKind::Int),
                    |_, _| Ok(HostValue::Int(0)),
                ))
                .with_method(
                    MethodDef::new("setWidth", HostType::Void, |_, _| Ok(HostValue::Void))
                        .with_param(HostType::Prim(PrimKind::Int)),
                ),
        );
        match table.entry("width", false) {
            Some(Member::Property(bp)) => {
                assert!(bp.getter.is_some());
                assert!(bp.setter.is_some());
                assert!(bp.setters.is_none());
            }
            _ => panic!("expected a synthesized property"),
        }
    }

    #[test]
    fn test_explicit_member_beats_bean() {
        let table = table_for(
            ClassDef::new("Widget")
                .with_field(FieldDef::new("width", HostType::Prim(PrimKind::Int)))
                .with_method(MethodDef::new(
                    "getWidth",
                    HostType::Prim(PrimKind::Int),
                    |_, _| Ok(HostValue::Int(0)),
                )),
        );
        assert!(matches!(table.entry("width", false), Some(Member::Field(_))));
    }

    #[test]
    fn test_is_getter_used_when_no_get() {
        let table = table_for(ClassDef::new("Flag").with_method(MethodDef::new(
            "isEnabled",
            HostType::Prim(PrimKind::Bool),
            |_, _| Ok(HostValue::Bool(true)),
        )));
        match table.entry("enabled", false) {
            Some(Member::Property(bp)) => {
                let getter = bp.getter.as_ref().unwrap();
                assert_eq!(&*getter.original_name, "isEnabled");
            }
            _ => panic!("expected a synthesized property"),
        }
    }

    #[test]
    fn test_getter_only_property_has_no_setter() {
        let table = table_for(ClassDef::new("Clock").with_method(MethodDef::new(
            "getTime",
            HostType::Prim(PrimKind::Long),
            |_, _| Ok(HostValue::Long(0)),
        )));
        match table.entry("time", false) {
            Some(Member::Property(bp)) => {
                assert!(bp.getter.is_some());
                assert!(bp.setter.is_none());
            }
            _ => panic!("expected a synthesized property"),
        }
    }

    #[test]
    fn test_ambiguous_setters_keep_overload_set() {
        let table = table_for(
            ClassDef::new("Widget")
                .with_method(
                    MethodDef::new("setScale", HostType::Void, |_, _| Ok(HostValue::Void))
                        .with_param(HostType::Prim(PrimKind::Double)),
                )
                .with_method(
                    MethodDef::new("setScale", HostType::Void, |_, _| Ok(HostValue::Void))
                        .with_param(HostType::Str),
                ),
        );
        match table.entry("scale", false) {
            Some(Member::Property(bp)) => {
                assert!(bp.setters.is_some());
            }
            _ => panic!("expected a synthesized property"),
        }
    }

    #[test]
    fn test_static_side_separation() {
        let table = table_for(
            ClassDef::new("Counter")
                .with_field(FieldDef::new("total", HostType::Prim(PrimKind::Int)).as_static())
                .with_field(FieldDef::new("value", HostType::Prim(PrimKind::Int))),
        );
        assert!(table.has("total", true));
        assert!(!table.has("value", true));
        // instance access still reaches statics
        assert!(table.has("total", false));
    }
}
