//! Sequence wrappers.
//!
//! Host arrays and lists expose indexed access to script. Element writes
//! convert through the sequence's element type; reads past the end yield
//! `undefined` rather than failing.

use crate::error::InteropResult;
use crate::host::value::HostSeq;
use crate::session::Session;
use kiln_core::{External, Value};
use std::sync::Arc;

/// A fixed-length host array exposed to script.
pub struct HostArrayView {
    session: Session,
    seq: Arc<HostSeq>,
}

impl HostArrayView {
    pub fn new(session: Session, seq: Arc<HostSeq>) -> Self {
        Self { session, seq }
    }

    pub fn seq(&self) -> &Arc<HostSeq> {
        &self.seq
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// Element at index; out of bounds reads yield `undefined`
    pub fn get(&self, index: usize) -> Value {
        match self.seq.get(index) {
            Some(item) => self.session.to_runtime(&item),
            None => Value::Undefined,
        }
    }

    /// Store an element, converting to the array's element type. Arrays
    /// are fixed-length; writes past the end are ignored.
    pub fn put(&self, index: usize, value: &Value) -> InteropResult<()> {
        let converted = self.session.to_host(value, &self.seq.elem)?;
        self.seq.set(index, converted);
        Ok(())
    }
}

impl External for HostArrayView {
    fn type_name(&self) -> &str {
        "array"
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn to_display(&self) -> String {
        let items: Vec<String> = self
            .seq
            .to_vec()
            .iter()
            .map(|v| self.session.to_runtime(v).to_display())
            .collect();
        items.join(",")
    }
}

/// A growable host list exposed to script.
pub struct HostListView {
    session: Session,
    seq: Arc<HostSeq>,
}

impl HostListView {
    pub fn new(session: Session, seq: Arc<HostSeq>) -> Self {
        Self { session, seq }
    }

    pub fn seq(&self) -> &Arc<HostSeq> {
        &self.seq
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    pub fn get(&self, index: usize) -> Value {
        match self.seq.get(index) {
            Some(item) => self.session.to_runtime(&item),
            None => Value::Undefined,
        }
    }

    /// Store an element; writing one past the end appends
    pub fn put(&self, index: usize, value: &Value) -> InteropResult<()> {
        let converted = self.session.to_host(value, &self.seq.elem)?;
        if !self.seq.set(index, converted.clone()) && index == self.seq.len() {
            self.seq.push(converted);
        }
        Ok(())
    }

    pub fn push(&self, value: &Value) -> InteropResult<()> {
        let converted = self.session.to_host(value, &self.seq.elem)?;
        self.seq.push(converted);
        Ok(())
    }
}

impl External for HostListView {
    fn type_name(&self) -> &str {
        "list"
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn to_display(&self) -> String {
        let items: Vec<String> = self
            .seq
            .to_vec()
            .iter()
            .map(|v| self.session.to_runtime(v).to_display())
            .collect();
        format!("[{}]", items.join(", "))
    }
}
