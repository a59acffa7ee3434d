//! Interface adapters.
//!
//! A script callable (or an object carrying one) can stand in for a host
//! interface with a single abstract method. The adapter is a script-backed
//! `HostObject`; invoking the interface method routes back into the
//! script value. Adapters are cached per (interface, value identity), so
//! the same function always yields the same host instance.

use crate::catalog::{MemberKind, MemberRecord};
use crate::error::{InteropError, InteropResult};
use crate::host::ty::HostTypeId;
use crate::host::value::{HostObject, HostValue};
use crate::session::Session;
use kiln_core::Value;
use std::sync::Arc;

/// The lone abstract method of a functional interface, or None when the
/// type is not an interface or has more than one.
pub fn functional_interface(session: &Session, id: HostTypeId) -> Option<Arc<MemberRecord>> {
    let desc = session.describe(id).ok()?;
    if !desc.is_interface() {
        return None;
    }
    let catalog = session.catalog();
    let mut found: Option<Arc<MemberRecord>> = None;
    for method in desc.accessible_methods(catalog) {
        if method.is_static() {
            continue;
        }
        let MemberKind::Method { body, .. } = &method.kind else {
            continue;
        };
        if body.is_some() {
            continue;
        }
        if found.is_some() {
            return None;
        }
        found = Some(method.clone());
    }
    found
}

/// Wrap a script value as an instance of a functional interface.
pub fn adapter_for(
    session: &Session,
    iface: HostTypeId,
    value: &Value,
) -> InteropResult<HostValue> {
    let desc = session.describe(iface)?;
    let Some(identity) = value.identity() else {
        return Err(InteropError::ConversionNotAllowed {
            value: value.type_name().to_string(),
            target: desc.name.to_string(),
        });
    };
    let adapter = session
        .adapters()
        .entry((iface, identity))
        .or_insert_with(|| {
            tracing::debug!(interface = %desc.name, "building interface adapter");
            Arc::new(HostObject::from_script(iface, desc.name.clone(), value.clone()))
        })
        .clone();
    Ok(HostValue::Object(adapter))
}

/// Dispatch an interface method to the script value behind an adapter.
pub fn invoke_script_method(
    session: &Session,
    script: &Value,
    record: &MemberRecord,
    host_args: &[HostValue],
) -> InteropResult<HostValue> {
    let args: Vec<Value> = host_args.iter().map(|a| session.to_runtime(a)).collect();
    let callable = match script {
        Value::Callable(c) => c.clone(),
        Value::Object(obj) => match obj.get(&record.script_name) {
            Some(Value::Callable(c)) => c,
            _ => {
                return Err(InteropError::MemberNotFound {
                    type_name: "object".to_string(),
                    member: record.script_name.to_string(),
                })
            }
        },
        other => {
            return Err(InteropError::ConversionNotAllowed {
                value: other.type_name().to_string(),
                target: record.declaring_name.to_string(),
            })
        }
    };
    let result = callable
        .call(&args)
        .map_err(|e| InteropError::HostFailure {
            message: e.to_string(),
        })?;
    match record.return_type() {
        None | Some(crate::host::ty::HostType::Void) => Ok(HostValue::Void),
        Some(ret) => session.to_host(&result, ret),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::class::{ClassDef, MethodDef};
    use crate::host::registry::HostRegistry;
    use crate::host::ty::{HostType, PrimKind};
    use kiln_core::NativeFunction;

    fn runnable_session() -> (Session, HostTypeId) {
        let reg = Arc::new(HostRegistry::new());
        let id = reg.register(
            ClassDef::interface("Transform").with_method(
                MethodDef::abstract_sig("apply", HostType::Prim(PrimKind::Double))
                    .with_param(HostType::Prim(PrimKind::Double)),
            ),
        );
        (Session::new(reg), id)
    }

    #[test]
    fn test_functional_interface_detection() {
        let (session, id) = runnable_session();
        let method = functional_interface(&session, id).unwrap();
        assert_eq!(&*method.script_name, "apply");
    }

    #[test]
    fn test_two_abstract_methods_not_functional() {
        let reg = Arc::new(HostRegistry::new());
        let id = reg.register(
            ClassDef::interface("Pair")
                .with_method(MethodDef::abstract_sig("first", HostType::Any))
                .with_method(MethodDef::abstract_sig("second", HostType::Any)),
        );
        let session = Session::new(reg);
        assert!(functional_interface(&session, id).is_none());
    }

    #[test]
    fn test_adapter_cached_per_value_identity() {
        let (session, id) = runnable_session();
        let func = Value::Callable(Arc::new(NativeFunction::new("double", |args| {
            Ok(Value::Number(args[0].as_number().unwrap_or(0.0) * 2.0))
        })));
        let a = adapter_for(&session, id, &func).unwrap();
        let b = adapter_for(&session, id, &func).unwrap();
        assert_eq!(a, b); // same identity
        let other = Value::Callable(Arc::new(NativeFunction::new("id", |args| {
            Ok(args[0].clone())
        })));
        let c = adapter_for(&session, id, &other).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_script_method_dispatch() {
        let (session, id) = runnable_session();
        let func = Value::Callable(Arc::new(NativeFunction::new("double", |args| {
            Ok(Value::Number(args[0].as_number().unwrap_or(0.0) * 2.0))
        })));
        let adapter = adapter_for(&session, id, &func).unwrap();
        let HostValue::Object(obj) = adapter else {
            panic!("expected an adapter object");
        };
        let record = functional_interface(&session, id).unwrap();
        let out = invoke_script_method(
            &session,
            obj.script_value().unwrap(),
            &record,
            &[HostValue::Double(21.0)],
        )
        .unwrap();
        assert_eq!(out, HostValue::Double(42.0));
    }
}
