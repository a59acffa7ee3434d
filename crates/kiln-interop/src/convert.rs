//! Value conversion and ranking.
//!
//! `conversion_weight` is the total order overload resolution compares
//! candidates with: 0 is an exact match, small numbers are cheap
//! conversions, `Weight::NONE` means no conversion exists. `to_host` and
//! `to_runtime` perform the conversions the weights promise; `to_runtime`
//! is total, `to_host` fails with `ConversionNotAllowed`.

use crate::adapter;
use crate::error::{InteropError, InteropResult};
use crate::host::ty::{HostType, HostTypeId, PrimKind};
use crate::host::value::{HostMap, HostSeq, HostValue};
use crate::session::Session;
use crate::wrappers::unwrap_host;
use kiln_core::Value;
use std::sync::Arc;

/// An opaque conversion cost. Ordered; lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Weight(u8);

impl Weight {
    /// The value already inhabits the target type
    pub const EXACT: Weight = Weight(0);
    /// The cheapest real conversion
    pub const TRIVIAL: Weight = Weight(1);
    /// No conversion exists
    pub const NONE: Weight = Weight(99);

    fn of(rank: u8) -> Self {
        Weight(rank.min(Self::NONE.0))
    }

    pub fn rank(self) -> u8 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

// The largest and smallest doubles that still round-trip through a 64-bit
// integer without losing their order.
const MAX_LONG_AS_DOUBLE: f64 = f64::from_bits(0x43DF_FFFF_FFFF_FFFF);
const MIN_LONG_AS_DOUBLE: f64 = f64::from_bits(0xC3E0_0000_0000_0000);

/// Rank converting `value` into `target`.
pub fn conversion_weight(session: &Session, value: &Value, target: &HostType) -> Weight {
    if let Some(hv) = unwrap_host(value) {
        return host_weight(session, &hv, target);
    }
    match value {
        Value::Undefined => match target {
            HostType::Str | HostType::Any => Weight::of(1),
            _ => Weight::NONE,
        },
        Value::Null => {
            if target.is_primitive() || *target == HostType::Void {
                Weight::NONE
            } else {
                Weight::of(1)
            }
        }
        Value::Bool(_) => match target {
            HostType::Prim(PrimKind::Bool) => Weight::of(1),
            HostType::Boxed(PrimKind::Bool) => Weight::of(2),
            HostType::Any => Weight::of(3),
            HostType::Str => Weight::of(4),
            _ => Weight::NONE,
        },
        Value::Number(_) => match target {
            HostType::Prim(PrimKind::Double) => Weight::of(1),
            HostType::Prim(k) if k.is_numeric() => {
                Weight::of(1u8.saturating_add(k.size_rank().unwrap_or(Weight::NONE.0)))
            }
            HostType::Boxed(k) if k.is_numeric() => Weight::of(2),
            HostType::Date => Weight::of(2),
            HostType::Str => Weight::of(9),
            HostType::Any => Weight::of(10),
            _ => Weight::NONE,
        },
        Value::String(_) => match target {
            HostType::Str => Weight::of(1),
            HostType::Any => Weight::of(2),
            HostType::Prim(PrimKind::Char) => Weight::of(3),
            HostType::Boxed(PrimKind::Char) => Weight::of(4),
            HostType::Prim(k) if k.is_numeric() => Weight::of(4),
            _ => Weight::NONE,
        },
        Value::Array(_) => match target {
            HostType::List(_) | HostType::Set(_) => Weight::of(1),
            HostType::Array(_) => Weight::of(2),
            HostType::Any => Weight::of(3),
            HostType::Str => Weight::of(4),
            _ => Weight::NONE,
        },
        Value::Object(obj) => match target {
            HostType::Map(_, _) => Weight::of(1),
            HostType::Date if date_like(&Value::Object(obj.clone())).is_some() => Weight::of(1),
            HostType::Class(id) if adapter::functional_interface(session, *id).is_some() => {
                Weight::of(2)
            }
            HostType::Any => Weight::of(3),
            HostType::Str => Weight::of(4),
            HostType::Prim(k) if k.is_numeric() => {
                Weight::of(4u8.saturating_add(k.size_rank().unwrap_or(Weight::NONE.0)))
            }
            _ => Weight::NONE,
        },
        Value::Callable(_) => match target {
            HostType::Class(id) if adapter::functional_interface(session, *id).is_some() => {
                Weight::of(1)
            }
            HostType::Any => Weight::of(3),
            HostType::Str => Weight::of(4),
            _ => Weight::NONE,
        },
        Value::External(_) => match target {
            HostType::Any => Weight::of(3),
            HostType::Str => Weight::of(4),
            _ => Weight::NONE,
        },
    }
}

/// Ranking for values that are already host values.
fn host_weight(session: &Session, hv: &HostValue, target: &HostType) -> Weight {
    let registry = session.registry();
    if registry.value_instance_of(hv, target) {
        return Weight::EXACT;
    }
    match target {
        HostType::Str => Weight::of(2),
        // a host sequence converts element-wise into a differently typed one
        HostType::Array(_) | HostType::List(_) | HostType::Set(_)
            if matches!(
                hv,
                HostValue::Array(_) | HostValue::List(_) | HostValue::Set(_)
            ) =>
        {
            Weight::of(3)
        }
        HostType::Map(_, _) if matches!(hv, HostValue::Map(_)) => Weight::of(3),
        HostType::Prim(k) if k.is_numeric() => {
            if matches!(
                hv,
                HostValue::Array(_) | HostValue::List(_) | HostValue::Set(_) | HostValue::Map(_)
            ) {
                Weight::NONE
            } else {
                Weight::of(2u8.saturating_add(k.size_rank().unwrap_or(Weight::NONE.0)))
            }
        }
        _ => Weight::NONE,
    }
}

/// Convert a script value to a host value of the given type.
pub fn to_host(session: &Session, value: &Value, target: &HostType) -> InteropResult<HostValue> {
    match target {
        HostType::Any => Ok(to_host_any(value)),
        HostType::Void => Ok(HostValue::Void),
        HostType::Str => match value {
            Value::Null => Ok(HostValue::Null),
            other => Ok(HostValue::Str(other.to_display().into())),
        },
        HostType::Prim(PrimKind::Bool) => Ok(HostValue::Bool(truthy(value))),
        HostType::Boxed(PrimKind::Bool) => match value {
            Value::Null | Value::Undefined => Ok(HostValue::Null),
            other => Ok(HostValue::Bool(truthy(other))),
        },
        HostType::Prim(k) => to_numeric(session, value, *k, target, false),
        HostType::Boxed(k) => to_numeric(session, value, *k, target, true),
        HostType::Date => to_date(session, value, target),
        HostType::Class(id) => to_class(session, value, *id, target),
        HostType::Array(elem) => to_sequence(session, value, elem, target, SeqKind::Array),
        HostType::List(elem) => to_sequence(session, value, elem, target, SeqKind::List),
        HostType::Set(elem) => to_sequence(session, value, elem, target, SeqKind::Set),
        HostType::Map(key, val) => to_map(session, value, key, val, target),
    }
}

/// Conversion to the unconstrained host root type. Total: script objects,
/// arrays and callables pass through opaquely.
fn to_host_any(value: &Value) -> HostValue {
    if let Some(hv) = unwrap_host(value) {
        return hv;
    }
    match value {
        Value::Undefined => HostValue::Str("undefined".into()),
        Value::Null => HostValue::Null,
        Value::Bool(b) => HostValue::Bool(*b),
        Value::Number(n) => HostValue::Double(*n),
        Value::String(s) => HostValue::Str(s.clone()),
        other => HostValue::Script(other.clone()),
    }
}

fn to_numeric(
    session: &Session,
    value: &Value,
    kind: PrimKind,
    target: &HostType,
    nullable: bool,
) -> InteropResult<HostValue> {
    if value.is_null() || value.is_undefined() {
        if nullable {
            return Ok(HostValue::Null);
        }
        return Err(conv_err(session, value, target));
    }
    if kind == PrimKind::Char {
        if let Value::String(s) = value {
            let mut chars = s.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                return Ok(HostValue::Char(c));
            }
            return Err(conv_err(session, value, target));
        }
    }
    let n = coerce_number(session, value).ok_or_else(|| conv_err(session, value, target))?;
    convert_number(session, n, kind).map_err(|_| conv_err(session, value, target))
}

/// Numeric interpretation of a value, host values included.
fn coerce_number(_session: &Session, value: &Value) -> Option<f64> {
    if let Some(hv) = unwrap_host(value) {
        return match hv {
            HostValue::Date(ms) => Some(ms as f64),
            other => other.as_f64(),
        };
    }
    let n = value.to_number();
    match value {
        // objects and callables have no numeric interpretation
        Value::Object(_) | Value::Callable(_) | Value::Array(_) | Value::External(_) => None,
        _ => Some(n),
    }
}

fn convert_number(_session: &Session, n: f64, kind: PrimKind) -> Result<HostValue, ()> {
    match kind {
        PrimKind::Double => Ok(HostValue::Double(n)),
        // overflow saturates to infinity, underflow to zero
        PrimKind::Float => Ok(HostValue::Float(n as f32)),
        PrimKind::Long => {
            integral(n, MIN_LONG_AS_DOUBLE, MAX_LONG_AS_DOUBLE)?;
            Ok(HostValue::Long(n.trunc() as i64))
        }
        PrimKind::Int => {
            integral(n, i32::MIN as f64, i32::MAX as f64)?;
            Ok(HostValue::Int(n.trunc() as i32))
        }
        PrimKind::Short => {
            integral(n, i16::MIN as f64, i16::MAX as f64)?;
            Ok(HostValue::Short(n.trunc() as i16))
        }
        PrimKind::Byte => {
            integral(n, i8::MIN as f64, i8::MAX as f64)?;
            Ok(HostValue::Byte(n.trunc() as i8))
        }
        PrimKind::Char => {
            integral(n, 0.0, char::MAX as u32 as f64)?;
            char::from_u32(n.trunc() as u32).map(HostValue::Char).ok_or(())
        }
        PrimKind::Bool => Err(()),
    }
}

/// Integral targets reject NaN, infinities and out-of-range values
/// instead of wrapping.
fn integral(n: f64, min: f64, max: f64) -> Result<(), ()> {
    if n.is_finite() && n >= min && n <= max {
        Ok(())
    } else {
        Err(())
    }
}

/// A script object counts as a date when it exposes a callable `getTime`.
fn date_like(value: &Value) -> Option<f64> {
    let Value::Object(obj) = value else {
        return None;
    };
    let Some(Value::Callable(get_time)) = obj.get("getTime") else {
        return None;
    };
    get_time.call(&[]).ok()?.as_number()
}

fn to_date(session: &Session, value: &Value, target: &HostType) -> InteropResult<HostValue> {
    if let Some(HostValue::Date(ms)) = unwrap_host(value) {
        return Ok(HostValue::Date(ms));
    }
    match value {
        Value::Null | Value::Undefined => Ok(HostValue::Null),
        Value::Number(n) if n.is_finite() => Ok(HostValue::Date(n.trunc() as i64)),
        other => match date_like(other) {
            Some(ms) if ms.is_finite() => Ok(HostValue::Date(ms.trunc() as i64)),
            _ => Err(conv_err(session, value, target)),
        },
    }
}

fn to_class(
    session: &Session,
    value: &Value,
    id: HostTypeId,
    target: &HostType,
) -> InteropResult<HostValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(HostValue::Null);
    }
    if let Some(hv) = unwrap_host(value) {
        if session.registry().value_instance_of(&hv, target) {
            return Ok(hv);
        }
        return Err(conv_err(session, value, target));
    }
    if adapter::functional_interface(session, id).is_some()
        && matches!(value, Value::Callable(_) | Value::Object(_))
    {
        return adapter::adapter_for(session, id, value);
    }
    Err(conv_err(session, value, target))
}

enum SeqKind {
    Array,
    List,
    Set,
}

impl SeqKind {
    fn wrap(&self, seq: Arc<HostSeq>) -> HostValue {
        match self {
            SeqKind::Array => HostValue::Array(seq),
            SeqKind::List => HostValue::List(seq),
            SeqKind::Set => HostValue::Set(seq),
        }
    }
}

/// Element-wise conversion into a typed sequence. A host sequence whose
/// element type already fits passes through by identity; there is no
/// promotion of a lone value into a one-element sequence.
fn to_sequence(
    session: &Session,
    value: &Value,
    elem: &HostType,
    target: &HostType,
    kind: SeqKind,
) -> InteropResult<HostValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(HostValue::Null);
    }
    if let Some(hv) = unwrap_host(value) {
        match hv {
            HostValue::Array(seq) | HostValue::List(seq) | HostValue::Set(seq) => {
                if *elem == HostType::Any || seq.elem == *elem {
                    return Ok(kind.wrap(seq));
                }
                let mut items = Vec::with_capacity(seq.len());
                for item in seq.to_vec() {
                    let rt = session.to_runtime(&item);
                    let converted = session.to_host(&rt, elem)?;
                    if !matches!(kind, SeqKind::Set)
                        || !items.iter().any(|v: &HostValue| *v == converted)
                    {
                        items.push(converted);
                    }
                }
                return Ok(kind.wrap(Arc::new(HostSeq::new(elem.clone(), items))));
            }
            _ => return Err(conv_err(session, value, target)),
        }
    }
    let Value::Array(arr) = value else {
        return Err(conv_err(session, value, target));
    };
    let source = arr.to_vec();
    let mut items = Vec::with_capacity(source.len());
    for item in &source {
        let converted = session.to_host(item, elem)?;
        if matches!(kind, SeqKind::Set) && items.iter().any(|v: &HostValue| *v == converted) {
            continue;
        }
        items.push(converted);
    }
    Ok(kind.wrap(Arc::new(HostSeq::new(elem.clone(), items))))
}

fn to_map(
    session: &Session,
    value: &Value,
    key_ty: &HostType,
    val_ty: &HostType,
    target: &HostType,
) -> InteropResult<HostValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(HostValue::Null);
    }
    if let Some(HostValue::Map(map)) = unwrap_host(value) {
        let keys_fit = *key_ty == HostType::Any || map.key == *key_ty;
        let vals_fit = *val_ty == HostType::Any || map.val == *val_ty;
        if keys_fit && vals_fit {
            return Ok(HostValue::Map(map));
        }
        let out = HostMap::new(key_ty.clone(), val_ty.clone());
        for (k, v) in map.entries() {
            let rk = session.to_runtime(&k);
            let rv = session.to_runtime(&v);
            out.insert(session.to_host(&rk, key_ty)?, session.to_host(&rv, val_ty)?);
        }
        return Ok(HostValue::Map(Arc::new(out)));
    }
    let Value::Object(obj) = value else {
        return Err(conv_err(session, value, target));
    };
    let out = HostMap::new(key_ty.clone(), val_ty.clone());
    for (key, val) in obj.entries() {
        let host_key = session.to_host(&Value::String(key), key_ty)?;
        let host_val = session.to_host(&val, val_ty)?;
        out.insert(host_key, host_val);
    }
    Ok(HostValue::Map(Arc::new(out)))
}

/// Surface a host value to script. Total by construction.
pub fn to_runtime(session: &Session, value: &HostValue) -> Value {
    if let Some(wrapped) = session.try_wrap_hook(value) {
        return wrapped;
    }
    match value {
        HostValue::Null => Value::Null,
        HostValue::Void => Value::Undefined,
        HostValue::Bool(b) => Value::Bool(*b),
        HostValue::Byte(n) => Value::Number(*n as f64),
        HostValue::Short(n) => Value::Number(*n as f64),
        HostValue::Int(n) => Value::Number(*n as f64),
        HostValue::Long(n) => Value::Number(*n as f64),
        HostValue::Float(n) => Value::Number(*n as f64),
        HostValue::Double(n) => Value::Number(*n),
        HostValue::Char(c) => Value::string(c.to_string()),
        HostValue::Str(s) => Value::String(s.clone()),
        HostValue::Date(ms) => Value::Number(*ms as f64),
        HostValue::Array(seq) => session.wrap_array(seq.clone()),
        HostValue::List(seq) => session.wrap_list(seq.clone()),
        HostValue::Set(_) | HostValue::Map(_) => session.wrap_opaque(value.clone()),
        HostValue::Object(obj) => match obj.script_value() {
            // adapter instances unwrap back to the script value they wrap
            Some(v) => v.clone(),
            None => session.wrap_object(obj.clone()),
        },
        HostValue::Class(id) => session.class_value(*id),
        // opaque passthroughs surface as the value they wrap
        HostValue::Script(v) => v.clone(),
    }
}

/// Script truthiness
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Undefined | Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn conv_err(session: &Session, value: &Value, target: &HostType) -> InteropError {
    InteropError::ConversionNotAllowed {
        value: format!("{} '{}'", value.type_name(), value.to_display()),
        target: session.registry().signature_of(target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::registry::HostRegistry;

    fn session() -> Session {
        Session::new(Arc::new(HostRegistry::new()))
    }

    #[test]
    fn test_number_ranking_monotonic() {
        let s = session();
        let v = Value::Number(3.0);
        let w_double = conversion_weight(&s, &v, &HostType::Prim(PrimKind::Double));
        let w_float = conversion_weight(&s, &v, &HostType::Prim(PrimKind::Float));
        let w_int = conversion_weight(&s, &v, &HostType::Prim(PrimKind::Int));
        let w_byte = conversion_weight(&s, &v, &HostType::Prim(PrimKind::Byte));
        assert!(w_double < w_float);
        assert!(w_float < w_int);
        assert!(w_int < w_byte);
        assert!(!w_byte.is_none());
    }

    #[test]
    fn test_string_prefers_string_over_numeric() {
        let s = session();
        let v = Value::string("9");
        let w_str = conversion_weight(&s, &v, &HostType::Str);
        let w_int = conversion_weight(&s, &v, &HostType::Prim(PrimKind::Int));
        assert!(w_str < w_int);
        assert!(!w_int.is_none());
    }

    #[test]
    fn test_bool_has_no_numeric_conversion() {
        let s = session();
        let v = Value::Bool(true);
        assert!(conversion_weight(&s, &v, &HostType::Prim(PrimKind::Int)).is_none());
        assert_eq!(
            conversion_weight(&s, &v, &HostType::Prim(PrimKind::Bool)),
            Weight::of(1)
        );
    }

    #[test]
    fn test_integral_bounds() {
        let s = session();
        assert_eq!(
            to_host(&s, &Value::Number(200.0), &HostType::Prim(PrimKind::Byte))
                .unwrap_err()
                .to_string()
                .contains("byte"),
            true
        );
        assert_eq!(
            to_host(&s, &Value::Number(127.0), &HostType::Prim(PrimKind::Byte)).unwrap(),
            HostValue::Byte(127)
        );
        assert!(to_host(
            &s,
            &Value::Number(f64::NAN),
            &HostType::Prim(PrimKind::Long)
        )
        .is_err());
    }

    #[test]
    fn test_long_bounds_are_bit_exact() {
        let s = session();
        assert!(to_host(
            &s,
            &Value::Number(MAX_LONG_AS_DOUBLE),
            &HostType::Prim(PrimKind::Long)
        )
        .is_ok());
        let above = f64::from_bits(MAX_LONG_AS_DOUBLE.to_bits() + 1);
        assert!(to_host(&s, &Value::Number(above), &HostType::Prim(PrimKind::Long)).is_err());
        assert!(to_host(
            &s,
            &Value::Number(MIN_LONG_AS_DOUBLE),
            &HostType::Prim(PrimKind::Long)
        )
        .is_ok());
    }

    #[test]
    fn test_truncation_toward_zero() {
        let s = session();
        assert_eq!(
            to_host(&s, &Value::Number(3.9), &HostType::Prim(PrimKind::Int)).unwrap(),
            HostValue::Int(3)
        );
        assert_eq!(
            to_host(&s, &Value::Number(-3.9), &HostType::Prim(PrimKind::Int)).unwrap(),
            HostValue::Int(-3)
        );
    }

    #[test]
    fn test_numeric_round_trip_preserves_zero_fraction() {
        let s = session();
        let host = to_host(&s, &Value::Number(7.0), &HostType::Prim(PrimKind::Int)).unwrap();
        let back = to_runtime(&s, &host);
        assert_eq!(back.as_number(), Some(7.0));
        assert_eq!(back.to_display(), "7");
    }

    #[test]
    fn test_char_from_single_char_string() {
        let s = session();
        assert_eq!(
            to_host(&s, &Value::string("k"), &HostType::Prim(PrimKind::Char)).unwrap(),
            HostValue::Char('k')
        );
        assert!(to_host(&s, &Value::string("kk"), &HostType::Prim(PrimKind::Char)).is_err());
    }

    #[test]
    fn test_undefined_to_any_is_the_string() {
        let s = session();
        let host = to_host(&s, &Value::Undefined, &HostType::Any).unwrap();
        assert_eq!(host, HostValue::Str("undefined".into()));
    }

    #[test]
    fn test_array_to_typed_list() {
        let s = session();
        let arr = kiln_core::ScriptArray::from_vec(vec![Value::Number(1.0), Value::Number(2.5)]);
        let value = Value::Array(Arc::new(arr));
        let host = to_host(
            &s,
            &value,
            &HostType::list_of(HostType::Prim(PrimKind::Double)),
        )
        .unwrap();
        match host {
            HostValue::List(seq) => {
                assert_eq!(seq.len(), 2);
                assert_eq!(seq.get(1), Some(HostValue::Double(2.5)));
            }
            other => panic!("expected a list, got {other:?}"),
        }
    }

    #[test]
    fn test_set_conversion_dedups() {
        let s = session();
        let arr = kiln_core::ScriptArray::from_vec(vec![
            Value::Number(1.0),
            Value::Number(1.0),
            Value::Number(2.0),
        ]);
        let value = Value::Array(Arc::new(arr));
        let host = to_host(
            &s,
            &value,
            &HostType::set_of(HostType::Prim(PrimKind::Int)),
        )
        .unwrap();
        match host {
            HostValue::Set(seq) => assert_eq!(seq.len(), 2),
            other => panic!("expected a set, got {other:?}"),
        }
    }

    #[test]
    fn test_no_single_value_sequence_promotion() {
        let s = session();
        assert!(to_host(
            &s,
            &Value::Number(1.0),
            &HostType::array_of(HostType::Prim(PrimKind::Int))
        )
        .is_err());
    }

    #[test]
    fn test_host_sequence_ranks_against_retyped_container() {
        let s = session();
        let seq = Arc::new(HostSeq::new(
            HostType::Prim(PrimKind::Double),
            vec![HostValue::Double(1.0)],
        ));
        let wrapped = to_runtime(&s, &HostValue::Array(seq));
        let target = HostType::array_of(HostType::Prim(PrimKind::Int));
        // the weight must agree with what to_host can actually do
        assert!(!conversion_weight(&s, &wrapped, &target).is_none());
        match to_host(&s, &wrapped, &target).unwrap() {
            HostValue::Array(out) => assert_eq!(out.get(0), Some(HostValue::Int(1))),
            other => panic!("expected an array, got {other:?}"),
        }
    }

    #[test]
    fn test_opaque_script_value_round_trips() {
        let s = session();
        let value = Value::Object(Arc::new(kiln_core::ScriptObject::new()));
        let host = to_host(&s, &value, &HostType::Any).unwrap();
        assert!(matches!(host, HostValue::Script(_)));
        assert_eq!(to_runtime(&s, &host), value);
    }

    #[test]
    fn test_object_to_map() {
        let s = session();
        let obj = kiln_core::ScriptObject::new();
        obj.set("a", Value::Number(1.0));
        obj.set("b", Value::Number(2.0));
        let value = Value::Object(Arc::new(obj));
        let host = to_host(
            &s,
            &value,
            &HostType::map_of(HostType::Str, HostType::Prim(PrimKind::Int)),
        )
        .unwrap();
        match host {
            HostValue::Map(map) => {
                assert_eq!(map.len(), 2);
                assert_eq!(
                    map.get(&HostValue::Str("b".into())),
                    Some(HostValue::Int(2))
                );
            }
            other => panic!("expected a map, got {other:?}"),
        }
    }

    #[test]
    fn test_date_like_object() {
        let s = session();
        let obj = kiln_core::ScriptObject::new();
        obj.set(
            "getTime",
            Value::Callable(Arc::new(kiln_core::NativeFunction::new("getTime", |_| {
                Ok(Value::Number(1234.0))
            }))),
        );
        let value = Value::Object(Arc::new(obj));
        assert_eq!(
            to_host(&s, &value, &HostType::Date).unwrap(),
            HostValue::Date(1234)
        );
        assert_eq!(
            conversion_weight(&s, &value, &HostType::Date),
            Weight::of(1)
        );
    }
}
