//! The dynamic value taxonomy.
//!
//! Every script value is one of nine kinds: undefined, null, boolean,
//! number, string, array, object, callable, or an external value supplied
//! by a layer above the core (host wrappers, class facades, …). Heap kinds
//! are shared behind `Arc` and compare by identity.

use crate::callable::Callable;
use crate::external::External;
use crate::object::{ScriptArray, ScriptObject};
use std::fmt;
use std::sync::Arc;

/// A script value.
#[derive(Clone)]
pub enum Value {
    /// The undefined value
    Undefined,
    /// The null value
    Null,
    /// A boolean
    Bool(bool),
    /// All numbers are IEEE 754 doubles
    Number(f64),
    /// An immutable string
    String(Arc<str>),
    /// A script array
    Array(Arc<ScriptArray>),
    /// A plain script object
    Object(Arc<ScriptObject>),
    /// Anything invokable
    Callable(Arc<dyn Callable>),
    /// A foreign value (host wrapper, class facade, …)
    External(Arc<dyn External>),
}

/// The kind of a value, used by ranking and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Undefined,
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
    Callable,
    External,
}

impl Value {
    /// Build a string value
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    /// The kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Undefined => ValueKind::Undefined,
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
            Value::Callable(_) => ValueKind::Callable,
            Value::External(_) => ValueKind::External,
        }
    }

    /// Type name used in signatures and error messages
    pub fn type_name(&self) -> &str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Callable(_) => "function",
            Value::External(ext) => ext.type_name(),
        }
    }

    /// Whether this is `undefined`
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Whether this is `null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Extract a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Pointer identity for heap values; None for primitives.
    ///
    /// Used as a cache key by layers that memoize per-value state (for
    /// example interface adapters).
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(Arc::as_ptr(s) as *const () as usize),
            Value::Array(a) => Some(Arc::as_ptr(a) as *const () as usize),
            Value::Object(o) => Some(Arc::as_ptr(o) as *const () as usize),
            Value::Callable(c) => Some(Arc::as_ptr(c) as *const () as usize),
            Value::External(e) => Some(Arc::as_ptr(e) as *const () as usize),
            _ => None,
        }
    }

    /// Coerce to a number the way script arithmetic does.
    ///
    /// Total: values with no numeric interpretation yield NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::String(s) => {
                let t = s.trim();
                if t.is_empty() {
                    0.0
                } else {
                    t.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
            _ => f64::NAN,
        }
    }

    /// Render for string conversion and diagnostics
    pub fn to_display(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.to_string(),
            Value::Array(a) => {
                let items: Vec<String> = a.to_vec().iter().map(|v| v.to_display()).collect();
                items.join(",")
            }
            Value::Object(_) => "[object Object]".to_string(),
            Value::Callable(c) => c.to_display(),
            Value::External(e) => e.to_display(),
        }
    }
}

/// Format a number the way script string conversion does: integral values
/// print without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n == n.trunc() && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl PartialEq for Value {
    /// Primitives compare by value (with NaN != NaN); heap values compare
    /// by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => match (self.identity(), other.identity()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Array(a) => write!(f, "Array(len={})", a.len()),
            Value::Object(o) => write!(f, "Object(len={})", o.len()),
            Value::Callable(c) => write!(f, "Callable({:?})", c.name()),
            Value::External(e) => write!(f, "External({})", e.type_name()),
        }
    }
}
