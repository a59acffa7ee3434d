//! Bound method wrapper.

use crate::catalog::{MemberKind, MemberRecord};
use crate::host::value::HostObject;
use crate::overload::{invoke, OverloadSet};
use crate::session::Session;
use kiln_core::{Callable, RuntimeError, Value};
use std::sync::Arc;

/// A host method (or overload group) bound to its receiver, callable from
/// script. When a field shares the method's name, the field record rides
/// along and string conversion renders the field's current value instead
/// of a function description.
pub struct HostMethod {
    session: Session,
    set: Arc<OverloadSet>,
    this: Option<Arc<HostObject>>,
    field: Option<Arc<MemberRecord>>,
}

impl HostMethod {
    pub fn new(
        session: Session,
        set: Arc<OverloadSet>,
        this: Option<Arc<HostObject>>,
        field: Option<Arc<MemberRecord>>,
    ) -> Self {
        Self {
            session,
            set,
            this,
            field,
        }
    }

    /// Wrap as a script value
    pub fn value(
        session: Session,
        set: Arc<OverloadSet>,
        this: Option<Arc<HostObject>>,
        field: Option<Arc<MemberRecord>>,
    ) -> Value {
        Value::Callable(Arc::new(Self::new(session, set, this, field)))
    }

    /// Current value of the field sharing this method's name, if any
    pub fn field_value(&self) -> Option<Value> {
        let field = self.field.as_ref()?;
        let MemberKind::Field { default, .. } = &field.kind else {
            return None;
        };
        let current = if field.is_static() {
            self.session
                .registry()
                .static_get(field.declaring, &field.original_name, default)
        } else {
            let obj = self.this.as_ref()?;
            obj.field(&field.original_name)
                .unwrap_or_else(|| default.clone())
        };
        Some(self.session.to_runtime(&current))
    }
}

impl Callable for HostMethod {
    fn name(&self) -> &str {
        &self.set.name
    }

    fn to_display(&self) -> String {
        match self.field_value() {
            Some(value) => value.to_display(),
            None => format!("function {}", self.set.name),
        }
    }

    fn call(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        let record = self.set.resolve(&self.session, args)?;
        let result = invoke(&self.session, &record, self.this.as_ref(), args)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::class::{ClassDef, FieldDef, MethodDef};
    use crate::host::registry::HostRegistry;
    use crate::host::ty::{HostType, PrimKind};
    use crate::host::value::HostValue;

    #[test]
    fn test_combined_entry_renders_field_value() {
        let reg = Arc::new(HostRegistry::new());
        let id = reg.register(
            ClassDef::new("Mixed")
                .with_field(
                    FieldDef::new("size", HostType::Prim(PrimKind::Int))
                        .with_default(HostValue::Int(9)),
                )
                .with_method(MethodDef::new(
                    "size",
                    HostType::Prim(PrimKind::Int),
                    |_, _| Ok(HostValue::Int(0)),
                )),
        );
        let session = Session::new(reg);
        let obj = Arc::new(HostObject::new(id, "Mixed"));
        let table = session.lookup(id).unwrap();
        let value = table.get(&session, Some(&obj), "size").unwrap();
        // string conversion reads as the field
        assert_eq!(value.to_display(), "9");
        // invocation still dispatches the method
        let Value::Callable(method) = value else {
            panic!("expected a bound method");
        };
        assert_eq!(method.call(&[]).unwrap().as_number(), Some(0.0));
    }

    #[test]
    fn test_plain_method_renders_as_function() {
        let reg = Arc::new(HostRegistry::new());
        let id = reg.register(ClassDef::new("Point").with_method(MethodDef::new(
            "norm",
            HostType::Prim(PrimKind::Double),
            |_, _| Ok(HostValue::Double(0.0)),
        )));
        let session = Session::new(reg);
        let obj = Arc::new(HostObject::new(id, "Point"));
        let table = session.lookup(id).unwrap();
        let value = table.get(&session, Some(&obj), "norm").unwrap();
        assert_eq!(value.to_display(), "function norm");
    }
}
