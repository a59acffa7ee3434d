//! Script-facing wrappers around host values.
//!
//! Each wrapper implements `External` so it can live inside a `Value`;
//! `unwrap_host` is the inverse, recovering the host value from any of
//! them. Wrappers hold a `Session` clone, so property access and method
//! dispatch always use the caches of the session that created them.

pub mod array;
pub mod class;
pub mod method;
pub mod object;

use crate::host::value::HostValue;
use kiln_core::{External, Value};

pub use array::{HostArrayView, HostListView};
pub use class::HostClassView;
pub use method::HostMethod;
pub use object::HostObjectView;

/// An opaque host value (set, map, or anything without a richer wrapper).
/// Scripts can pass it around and hand it back to host APIs, nothing more.
pub struct HostWrapper {
    value: HostValue,
    type_name: String,
}

impl HostWrapper {
    pub fn new(value: HostValue) -> Self {
        let type_name = match &value {
            HostValue::Set(_) => "Set".to_string(),
            HostValue::Map(_) => "Map".to_string(),
            other => other.type_of().to_string(),
        };
        Self { value, type_name }
    }

    pub fn value(&self) -> &HostValue {
        &self.value
    }
}

impl External for HostWrapper {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn to_display(&self) -> String {
        self.value.to_display()
    }
}

/// Recover the host value behind a wrapped script value, if there is one.
pub fn unwrap_host(value: &Value) -> Option<HostValue> {
    let Value::External(ext) = value else {
        return None;
    };
    let any = ext.as_any();
    if let Some(view) = any.downcast_ref::<HostObjectView>() {
        return Some(HostValue::Object(view.object().clone()));
    }
    if let Some(view) = any.downcast_ref::<HostClassView>() {
        return Some(HostValue::Class(view.id()));
    }
    if let Some(view) = any.downcast_ref::<HostArrayView>() {
        return Some(HostValue::Array(view.seq().clone()));
    }
    if let Some(view) = any.downcast_ref::<HostListView>() {
        return Some(HostValue::List(view.seq().clone()));
    }
    if let Some(wrapper) = any.downcast_ref::<HostWrapper>() {
        return Some(wrapper.value().clone());
    }
    None
}
