//! Instance wrapper.

use crate::error::InteropResult;
use crate::host::value::HostObject;
use crate::session::Session;
use kiln_core::{External, Value};
use std::sync::Arc;

/// A host instance exposed to script. Property access resolves through
/// the member table of the instance's class.
pub struct HostObjectView {
    session: Session,
    object: Arc<HostObject>,
}

impl HostObjectView {
    pub fn new(session: Session, object: Arc<HostObject>) -> Self {
        Self { session, object }
    }

    pub fn object(&self) -> &Arc<HostObject> {
        &self.object
    }

    /// Read a member; fields and properties yield their value, methods
    /// yield a bound callable.
    pub fn get(&self, name: &str) -> InteropResult<Value> {
        let table = self.session.lookup(self.object.class)?;
        table.get(&self.session, Some(&self.object), name)
    }

    /// Write a field or property
    pub fn put(&self, name: &str, value: &Value) -> InteropResult<()> {
        let table = self.session.lookup(self.object.class)?;
        table.put(&self.session, Some(&self.object), name, value)
    }

    /// Whether the name resolves on this instance
    pub fn has(&self, name: &str) -> InteropResult<bool> {
        let table = self.session.lookup(self.object.class)?;
        Ok(table.has(name, false))
    }

    /// Host members cannot be removed; deletion reports false
    pub fn delete(&self, _name: &str) -> InteropResult<bool> {
        Ok(false)
    }

    /// Member names for enumeration
    pub fn keys(&self) -> InteropResult<Vec<Arc<str>>> {
        let table = self.session.lookup(self.object.class)?;
        Ok(table.ids(false))
    }
}

impl External for HostObjectView {
    fn type_name(&self) -> &str {
        &self.object.class_name
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn to_display(&self) -> String {
        format!("[object {}]", self.object.class_name)
    }
}
