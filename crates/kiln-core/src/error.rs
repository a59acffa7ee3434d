//! Error types surfaced to script code.

/// A runtime error that script code can catch.
///
/// Errors raised by host interop carry a stable error name (for example
/// `MemberNotFound`) so scripts can dispatch on it, plus a human-readable
/// message.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    /// A value had the wrong type for an operation
    #[error("TypeError: {0}")]
    Type(String),

    /// A numeric value was outside the representable range
    #[error("RangeError: {0}")]
    Range(String),

    /// A named error raised by an embedder or the interop bridge
    #[error("{name}: {message}")]
    Named {
        /// Stable error name, used by script-side dispatch
        name: String,
        /// Human-readable description
        message: String,
    },
}

impl RuntimeError {
    /// Create a named error
    pub fn named(name: impl Into<String>, message: impl Into<String>) -> Self {
        RuntimeError::Named {
            name: name.into(),
            message: message.into(),
        }
    }

    /// The stable error name
    pub fn name(&self) -> &str {
        match self {
            RuntimeError::Type(_) => "TypeError",
            RuntimeError::Range(_) => "RangeError",
            RuntimeError::Named { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_error_display() {
        let err = RuntimeError::named("MemberNotFound", "Point has no member 'q'");
        assert_eq!(err.name(), "MemberNotFound");
        assert_eq!(err.to_string(), "MemberNotFound: Point has no member 'q'");
    }

    #[test]
    fn test_builtin_names() {
        assert_eq!(RuntimeError::Type("x".into()).name(), "TypeError");
        assert_eq!(RuntimeError::Range("x".into()).name(), "RangeError");
    }
}
