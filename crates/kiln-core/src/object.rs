//! Script objects and arrays.
//!
//! These are deliberately minimal: the bridge only needs ordered property
//! enumeration, name lookup and indexed access. Prototype chains, getters
//! and property attributes live in the interpreter, not here.

use crate::value::Value;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// A plain script object: an insertion-ordered string-keyed property map.
#[derive(Default)]
pub struct ScriptObject {
    // Insertion order drives enumeration; the index map makes lookup O(1).
    order: RwLock<Vec<Arc<str>>>,
    slots: RwLock<FxHashMap<Arc<str>, Value>>,
}

impl ScriptObject {
    /// Create an empty object
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an object from key/value pairs, preserving order
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<Arc<str>>,
    {
        let obj = Self::new();
        for (k, v) in entries {
            obj.set(k.into(), v);
        }
        obj
    }

    /// Look up a property by name
    pub fn get(&self, name: &str) -> Option<Value> {
        self.slots.read().get(name).cloned()
    }

    /// Whether a property exists
    pub fn has(&self, name: &str) -> bool {
        self.slots.read().contains_key(name)
    }

    /// Set a property, appending to enumeration order on first insert
    pub fn set(&self, name: impl Into<Arc<str>>, value: Value) {
        let name = name.into();
        let mut slots = self.slots.write();
        if slots.insert(name.clone(), value).is_none() {
            self.order.write().push(name);
        }
    }

    /// Remove a property; returns true if it existed
    pub fn delete(&self, name: &str) -> bool {
        let mut slots = self.slots.write();
        if slots.remove(name).is_some() {
            self.order.write().retain(|k| k.as_ref() != name);
            true
        } else {
            false
        }
    }

    /// Property names in insertion order
    pub fn keys(&self) -> Vec<Arc<str>> {
        self.order.read().clone()
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    /// Whether the object has no properties
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// Snapshot of entries in insertion order
    pub fn entries(&self) -> Vec<(Arc<str>, Value)> {
        let slots = self.slots.read();
        self.order
            .read()
            .iter()
            .filter_map(|k| slots.get(k).map(|v| (k.clone(), v.clone())))
            .collect()
    }
}

/// A script array: a growable vector of values.
#[derive(Default)]
pub struct ScriptArray {
    items: RwLock<Vec<Value>>,
}

impl ScriptArray {
    /// Create an empty array
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an array from existing values
    pub fn from_vec(items: Vec<Value>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    /// Element at index, or None past the end
    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.read().get(index).cloned()
    }

    /// Set an element, growing with `undefined` holes if needed
    pub fn set(&self, index: usize, value: Value) {
        let mut items = self.items.write();
        if index >= items.len() {
            items.resize(index + 1, Value::Undefined);
        }
        items[index] = value;
    }

    /// Append an element
    pub fn push(&self, value: Value) {
        self.items.write().push(value);
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Whether the array is empty
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Snapshot of all elements
    pub fn to_vec(&self) -> Vec<Value> {
        self.items.read().clone()
    }
}
