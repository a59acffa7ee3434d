//! Host-side values.
//!
//! `HostValue` is the currency of method thunks and field storage: typed
//! primitives, strings, dates, containers with element types, class
//! instances, and an opaque passthrough for script values handed to `Any`
//! parameters.

use crate::host::ty::{HostType, HostTypeId, PrimKind};
use kiln_core::Value;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// A value on the host side of the bridge.
#[derive(Clone)]
pub enum HostValue {
    /// The host null reference
    Null,
    /// Absence of a value (void-returning methods)
    Void,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    Str(Arc<str>),
    /// Epoch milliseconds
    Date(i64),
    Array(Arc<HostSeq>),
    List(Arc<HostSeq>),
    Set(Arc<HostSeq>),
    Map(Arc<HostMap>),
    /// An instance of a registered class
    Object(Arc<HostObject>),
    /// A class used as a value (static facade, constructor target)
    Class(HostTypeId),
    /// A script value passed through unconverted (Any parameters)
    Script(Value),
}

/// A typed host sequence backing arrays, lists and sets.
pub struct HostSeq {
    pub elem: HostType,
    items: RwLock<Vec<HostValue>>,
}

impl HostSeq {
    pub fn new(elem: HostType, items: Vec<HostValue>) -> Self {
        Self {
            elem,
            items: RwLock::new(items),
        }
    }

    pub fn get(&self, index: usize) -> Option<HostValue> {
        self.items.read().get(index).cloned()
    }

    pub fn set(&self, index: usize, value: HostValue) -> bool {
        let mut items = self.items.write();
        if index < items.len() {
            items[index] = value;
            true
        } else {
            false
        }
    }

    pub fn push(&self, value: HostValue) {
        self.items.write().push(value);
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn to_vec(&self) -> Vec<HostValue> {
        self.items.read().clone()
    }

    /// Whether an equal element is already present (set semantics)
    pub fn contains(&self, value: &HostValue) -> bool {
        self.items.read().iter().any(|v| v == value)
    }
}

/// A typed host map. Entries keep insertion order; keys compare with
/// `HostValue` equality.
pub struct HostMap {
    pub key: HostType,
    pub val: HostType,
    entries: RwLock<Vec<(HostValue, HostValue)>>,
}

impl HostMap {
    pub fn new(key: HostType, val: HostType) -> Self {
        Self {
            key,
            val,
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn get(&self, key: &HostValue) -> Option<HostValue> {
        self.entries
            .read()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    pub fn insert(&self, key: HostValue, value: HostValue) {
        let mut entries = self.entries.write();
        if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            entries.push((key, value));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn entries(&self) -> Vec<(HostValue, HostValue)> {
        self.entries.read().clone()
    }
}

/// Storage behind a host object instance.
pub enum Backing {
    /// Ordinary instance: per-field storage
    Fields(RwLock<FxHashMap<Arc<str>, HostValue>>),
    /// Interface adapter: a script value implements the methods
    Script(Value),
}

/// An instance of a registered host class.
pub struct HostObject {
    pub class: HostTypeId,
    pub class_name: Arc<str>,
    pub backing: Backing,
}

impl HostObject {
    /// Fresh instance with no field storage yet
    pub fn new(class: HostTypeId, class_name: impl Into<Arc<str>>) -> Self {
        Self::with_fields(class, class_name, FxHashMap::default())
    }

    pub fn with_fields(
        class: HostTypeId,
        class_name: impl Into<Arc<str>>,
        fields: FxHashMap<Arc<str>, HostValue>,
    ) -> Self {
        Self {
            class,
            class_name: class_name.into(),
            backing: Backing::Fields(RwLock::new(fields)),
        }
    }

    /// Build an adapter instance whose behavior delegates to a script value
    pub fn from_script(class: HostTypeId, class_name: impl Into<Arc<str>>, value: Value) -> Self {
        Self {
            class,
            class_name: class_name.into(),
            backing: Backing::Script(value),
        }
    }

    pub fn field(&self, name: &str) -> Option<HostValue> {
        match &self.backing {
            Backing::Fields(fields) => fields.read().get(name).cloned(),
            Backing::Script(_) => None,
        }
    }

    pub fn set_field(&self, name: impl Into<Arc<str>>, value: HostValue) {
        if let Backing::Fields(fields) = &self.backing {
            fields.write().insert(name.into(), value);
        }
    }

    /// The script value behind an adapter instance, if any
    pub fn script_value(&self) -> Option<&Value> {
        match &self.backing {
            Backing::Script(v) => Some(v),
            Backing::Fields(_) => None,
        }
    }
}

impl HostValue {
    /// The host type this value inhabits
    pub fn type_of(&self) -> HostType {
        match self {
            HostValue::Null | HostValue::Script(_) => HostType::Any,
            HostValue::Void => HostType::Void,
            HostValue::Bool(_) => HostType::Prim(PrimKind::Bool),
            HostValue::Byte(_) => HostType::Prim(PrimKind::Byte),
            HostValue::Short(_) => HostType::Prim(PrimKind::Short),
            HostValue::Int(_) => HostType::Prim(PrimKind::Int),
            HostValue::Long(_) => HostType::Prim(PrimKind::Long),
            HostValue::Float(_) => HostType::Prim(PrimKind::Float),
            HostValue::Double(_) => HostType::Prim(PrimKind::Double),
            HostValue::Char(_) => HostType::Prim(PrimKind::Char),
            HostValue::Str(_) => HostType::Str,
            HostValue::Date(_) => HostType::Date,
            HostValue::Array(seq) => HostType::array_of(seq.elem.clone()),
            HostValue::List(seq) => HostType::list_of(seq.elem.clone()),
            HostValue::Set(seq) => HostType::set_of(seq.elem.clone()),
            HostValue::Map(map) => HostType::map_of(map.key.clone(), map.val.clone()),
            HostValue::Object(obj) => HostType::Class(obj.class),
            HostValue::Class(id) => HostType::Class(*id),
        }
    }

    /// The zero/empty value for a field of the given type
    pub fn default_for(ty: &HostType) -> HostValue {
        match ty {
            HostType::Void => HostValue::Void,
            HostType::Prim(PrimKind::Bool) => HostValue::Bool(false),
            HostType::Prim(PrimKind::Byte) => HostValue::Byte(0),
            HostType::Prim(PrimKind::Short) => HostValue::Short(0),
            HostType::Prim(PrimKind::Int) => HostValue::Int(0),
            HostType::Prim(PrimKind::Long) => HostValue::Long(0),
            HostType::Prim(PrimKind::Float) => HostValue::Float(0.0),
            HostType::Prim(PrimKind::Double) => HostValue::Double(0.0),
            HostType::Prim(PrimKind::Char) => HostValue::Char('\0'),
            _ => HostValue::Null,
        }
    }

    /// Numeric value if this is any numeric primitive
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HostValue::Byte(n) => Some(*n as f64),
            HostValue::Short(n) => Some(*n as f64),
            HostValue::Int(n) => Some(*n as f64),
            HostValue::Long(n) => Some(*n as f64),
            HostValue::Float(n) => Some(*n as f64),
            HostValue::Double(n) => Some(*n),
            HostValue::Char(c) => Some(*c as u32 as f64),
            _ => None,
        }
    }

    /// Pointer identity for heap values
    pub fn identity(&self) -> Option<usize> {
        match self {
            HostValue::Str(s) => Some(Arc::as_ptr(s) as *const () as usize),
            HostValue::Array(s) | HostValue::List(s) | HostValue::Set(s) => {
                Some(Arc::as_ptr(s) as *const () as usize)
            }
            HostValue::Map(m) => Some(Arc::as_ptr(m) as *const () as usize),
            HostValue::Object(o) => Some(Arc::as_ptr(o) as *const () as usize),
            HostValue::Script(v) => v.identity(),
            _ => None,
        }
    }

    /// Render for string conversion and diagnostics
    pub fn to_display(&self) -> String {
        match self {
            HostValue::Null => "null".to_string(),
            HostValue::Void => "undefined".to_string(),
            HostValue::Bool(b) => b.to_string(),
            HostValue::Byte(n) => n.to_string(),
            HostValue::Short(n) => n.to_string(),
            HostValue::Int(n) => n.to_string(),
            HostValue::Long(n) => n.to_string(),
            HostValue::Float(n) => kiln_core::format_number(*n as f64),
            HostValue::Double(n) => kiln_core::format_number(*n),
            HostValue::Char(c) => c.to_string(),
            HostValue::Str(s) => s.to_string(),
            HostValue::Date(ms) => format!("[date {ms}]"),
            HostValue::Array(seq) | HostValue::List(seq) | HostValue::Set(seq) => {
                let items: Vec<String> = seq.to_vec().iter().map(|v| v.to_display()).collect();
                format!("[{}]", items.join(", "))
            }
            HostValue::Map(map) => format!("{{{} entries}}", map.len()),
            HostValue::Object(obj) => format!("[object {}]", obj.class_name),
            HostValue::Class(id) => format!("[class #{}]", id.index()),
            HostValue::Script(v) => v.to_display(),
        }
    }
}

impl PartialEq for HostValue {
    /// Primitives, strings, dates and class references compare by value;
    /// containers and objects compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (HostValue::Null, HostValue::Null) | (HostValue::Void, HostValue::Void) => true,
            (HostValue::Bool(a), HostValue::Bool(b)) => a == b,
            (HostValue::Char(a), HostValue::Char(b)) => a == b,
            (HostValue::Str(a), HostValue::Str(b)) => a == b,
            (HostValue::Date(a), HostValue::Date(b)) => a == b,
            (HostValue::Class(a), HostValue::Class(b)) => a == b,
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => match (self.identity(), other.identity()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                },
            },
        }
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Null => write!(f, "Null"),
            HostValue::Void => write!(f, "Void"),
            HostValue::Bool(b) => write!(f, "Bool({b})"),
            HostValue::Byte(n) => write!(f, "Byte({n})"),
            HostValue::Short(n) => write!(f, "Short({n})"),
            HostValue::Int(n) => write!(f, "Int({n})"),
            HostValue::Long(n) => write!(f, "Long({n})"),
            HostValue::Float(n) => write!(f, "Float({n})"),
            HostValue::Double(n) => write!(f, "Double({n})"),
            HostValue::Char(c) => write!(f, "Char({c:?})"),
            HostValue::Str(s) => write!(f, "Str({s:?})"),
            HostValue::Date(ms) => write!(f, "Date({ms})"),
            HostValue::Array(s) => write!(f, "Array(len={})", s.len()),
            HostValue::List(s) => write!(f, "List(len={})", s.len()),
            HostValue::Set(s) => write!(f, "Set(len={})", s.len()),
            HostValue::Map(m) => write!(f, "Map(len={})", m.len()),
            HostValue::Object(o) => write!(f, "Object({})", o.class_name),
            HostValue::Class(id) => write!(f, "Class(#{})", id.index()),
            HostValue::Script(v) => write!(f, "Script({v:?})"),
        }
    }
}
