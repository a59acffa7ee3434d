//! Host type references.
//!
//! A `HostType` names a type of the embedding environment: a primitive or
//! its boxed form, a string, a registered class or interface, or a
//! first-level parameterized container. Conversion ranking and overload
//! dispatch operate on these references, never on concrete Rust types.

use std::fmt;

/// Identity of a registered host class or interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostTypeId(pub(crate) u32);

impl HostTypeId {
    /// Raw index, useful for cache keys
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The eight host primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimKind {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
}

impl PrimKind {
    /// Preference order among numeric primitives: wider converts cheaper.
    /// Double ranks best, byte worst; bool has no numeric rank.
    pub fn size_rank(self) -> Option<u8> {
        match self {
            PrimKind::Double => Some(1),
            PrimKind::Float => Some(2),
            PrimKind::Long => Some(3),
            PrimKind::Int => Some(4),
            PrimKind::Short => Some(5),
            PrimKind::Char => Some(6),
            PrimKind::Byte => Some(7),
            PrimKind::Bool => None,
        }
    }

    /// Whether this primitive holds a number (everything except bool)
    pub fn is_numeric(self) -> bool {
        !matches!(self, PrimKind::Bool)
    }

    /// Source-style name
    pub fn name(self) -> &'static str {
        match self {
            PrimKind::Bool => "boolean",
            PrimKind::Byte => "byte",
            PrimKind::Short => "short",
            PrimKind::Int => "int",
            PrimKind::Long => "long",
            PrimKind::Float => "float",
            PrimKind::Double => "double",
            PrimKind::Char => "char",
        }
    }
}

/// A reference to a host type.
///
/// Container variants carry exactly one level of element typing; deeper
/// nesting collapses to `Any`, which is all the overload ranking needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostType {
    /// No value (method return only)
    Void,
    /// The host root type; accepts any value
    Any,
    /// An unboxed primitive
    Prim(PrimKind),
    /// The boxed form of a primitive
    Boxed(PrimKind),
    /// The host string type
    Str,
    /// The host date type (epoch milliseconds)
    Date,
    /// A registered class or interface
    Class(HostTypeId),
    /// A host array with the given element type
    Array(Box<HostType>),
    /// An ordered list with the given element type
    List(Box<HostType>),
    /// A set with the given element type
    Set(Box<HostType>),
    /// A map with the given key and value types
    Map(Box<HostType>, Box<HostType>),
}

impl HostType {
    /// Shorthand for an array of `elem`
    pub fn array_of(elem: HostType) -> Self {
        HostType::Array(Box::new(elem))
    }

    /// Shorthand for a list of `elem`
    pub fn list_of(elem: HostType) -> Self {
        HostType::List(Box::new(elem))
    }

    /// Shorthand for a set of `elem`
    pub fn set_of(elem: HostType) -> Self {
        HostType::Set(Box::new(elem))
    }

    /// Shorthand for a map of `key` to `value`
    pub fn map_of(key: HostType, value: HostType) -> Self {
        HostType::Map(Box::new(key), Box::new(value))
    }

    /// Whether this is an unboxed primitive
    pub fn is_primitive(&self) -> bool {
        matches!(self, HostType::Prim(_))
    }

    /// The primitive kind if this is a numeric primitive
    pub fn numeric_prim(&self) -> Option<PrimKind> {
        match self {
            HostType::Prim(k) if k.is_numeric() => Some(*k),
            _ => None,
        }
    }

    /// Whether this is a container (array/list/set/map)
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            HostType::Array(_) | HostType::List(_) | HostType::Set(_) | HostType::Map(_, _)
        )
    }

    /// Size rank used by numeric conversion ranking; non-primitives rank 8
    pub fn size_rank(&self) -> u8 {
        match self {
            HostType::Prim(k) | HostType::Boxed(k) => k.size_rank().unwrap_or(u8::MAX),
            _ => 8,
        }
    }
}

impl fmt::Display for HostType {
    /// Textual signature with unresolved class ids; `HostRegistry::signature`
    /// substitutes class names.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::Void => write!(f, "void"),
            HostType::Any => write!(f, "any"),
            HostType::Prim(k) => write!(f, "{}", k.name()),
            HostType::Boxed(k) => {
                let n = k.name();
                let mut chars = n.chars();
                let first = chars.next().unwrap_or_default().to_ascii_uppercase();
                write!(f, "{first}{}", chars.as_str())
            }
            HostType::Str => write!(f, "String"),
            HostType::Date => write!(f, "Date"),
            HostType::Class(id) => write!(f, "#{}", id.0),
            HostType::Array(e) => write!(f, "{e}[]"),
            HostType::List(e) => write!(f, "List<{e}>"),
            HostType::Set(e) => write!(f, "Set<{e}>"),
            HostType::Map(k, v) => write!(f, "Map<{k},{v}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_rank_order() {
        let order = [
            PrimKind::Double,
            PrimKind::Float,
            PrimKind::Long,
            PrimKind::Int,
            PrimKind::Short,
            PrimKind::Char,
            PrimKind::Byte,
        ];
        let ranks: Vec<u8> = order.iter().map(|k| k.size_rank().unwrap()).collect();
        let mut sorted = ranks.clone();
        sorted.sort_unstable();
        assert_eq!(ranks, sorted);
        assert!(PrimKind::Bool.size_rank().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(HostType::Prim(PrimKind::Int).to_string(), "int");
        assert_eq!(HostType::Boxed(PrimKind::Int).to_string(), "Int");
        assert_eq!(
            HostType::array_of(HostType::Prim(PrimKind::Double)).to_string(),
            "double[]"
        );
        assert_eq!(
            HostType::map_of(HostType::Str, HostType::Any).to_string(),
            "Map<String,any>"
        );
    }

    #[test]
    fn test_numeric_prim() {
        assert_eq!(
            HostType::Prim(PrimKind::Long).numeric_prim(),
            Some(PrimKind::Long)
        );
        assert!(HostType::Prim(PrimKind::Bool).numeric_prim().is_none());
        assert!(HostType::Boxed(PrimKind::Long).numeric_prim().is_none());
    }
}
