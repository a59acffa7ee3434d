//! Class facade wrapper.

use crate::error::InteropResult;
use crate::host::ty::HostTypeId;
use crate::overload::invoke;
use crate::session::Session;
use kiln_core::{External, Value};
use std::sync::Arc;

/// A host class exposed to script: static member access plus construction.
pub struct HostClassView {
    session: Session,
    id: HostTypeId,
    name: Arc<str>,
}

impl HostClassView {
    pub fn new(session: Session, id: HostTypeId, name: Arc<str>) -> Self {
        Self { session, id, name }
    }

    pub fn id(&self) -> HostTypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read a static member
    pub fn get(&self, name: &str) -> InteropResult<Value> {
        let table = self.session.lookup(self.id)?;
        table.get(&self.session, None, name)
    }

    /// Write a static field or property
    pub fn put(&self, name: &str, value: &Value) -> InteropResult<()> {
        let table = self.session.lookup(self.id)?;
        table.put(&self.session, None, name, value)
    }

    /// Whether the name resolves as a static member
    pub fn has(&self, name: &str) -> InteropResult<bool> {
        let table = self.session.lookup(self.id)?;
        Ok(table.has(name, true))
    }

    /// Static member names for enumeration
    pub fn keys(&self) -> InteropResult<Vec<Arc<str>>> {
        let table = self.session.lookup(self.id)?;
        Ok(table.ids(true))
    }

    /// Construct an instance, resolving among constructor overloads
    pub fn construct(&self, args: &[Value]) -> InteropResult<Value> {
        let table = self.session.lookup(self.id)?;
        let ctor = table.constructors().resolve(&self.session, args)?;
        invoke(&self.session, &ctor, None, args)
    }
}

impl External for HostClassView {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn to_display(&self) -> String {
        format!("[class {}]", self.name)
    }
}
