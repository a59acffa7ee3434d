//! Interop error taxonomy.

use kiln_core::RuntimeError;

/// Errors raised by the host-interop bridge.
///
/// Each variant carries enough context to render a useful script-facing
/// message; `AmbiguousOverload` in particular enumerates every surviving
/// candidate so the caller can see which signatures tied.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InteropError {
    /// Name does not resolve to any member of the type
    #[error("{type_name} has no member named '{member}'")]
    MemberNotFound { type_name: String, member: String },

    /// Write attempted on a final field or a getter-only property
    #[error("field '{field}' of {type_name} is not writable")]
    ImmutableField { type_name: String, field: String },

    /// No conversion exists from the value to the target type
    #[error("cannot convert {value} to {target}")]
    ConversionNotAllowed { value: String, target: String },

    /// Overload resolution found no strictly best candidate
    #[error("ambiguous call to {type_name}.{member}{signature}; candidates:\n{}", candidates.join("\n"))]
    AmbiguousOverload {
        type_name: String,
        member: String,
        /// Rendered argument signature of the call site
        signature: String,
        /// Declarations of every tied candidate
        candidates: Vec<String>,
    },

    /// The visibility policy refused to expose the type
    #[error("access to {type_name} is not allowed")]
    IntrospectionDenied { type_name: String },

    /// A host method or constructor body failed
    #[error("{message}")]
    HostFailure { message: String },
}

pub type InteropResult<T> = Result<T, InteropError>;

impl From<InteropError> for RuntimeError {
    /// Surface interop errors to script as named runtime errors
    fn from(err: InteropError) -> Self {
        let name = match &err {
            InteropError::MemberNotFound { .. } => "MemberNotFound",
            InteropError::ImmutableField { .. } => "ImmutableField",
            InteropError::ConversionNotAllowed { .. } => "ConversionNotAllowed",
            InteropError::AmbiguousOverload { .. } => "AmbiguousOverload",
            InteropError::IntrospectionDenied { .. } => "IntrospectionDenied",
            InteropError::HostFailure { .. } => "HostError",
        };
        RuntimeError::named(name, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_lists_candidates() {
        let err = InteropError::AmbiguousOverload {
            type_name: "Painter".into(),
            member: "fill".into(),
            signature: "(number)".into(),
            candidates: vec![
                "public void fill(int)".into(),
                "public void fill(double)".into(),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("Painter.fill(number)"));
        assert!(msg.contains("public void fill(int)"));
        assert!(msg.contains("public void fill(double)"));
    }

    #[test]
    fn test_runtime_error_names() {
        let err: RuntimeError = InteropError::MemberNotFound {
            type_name: "Point".into(),
            member: "q".into(),
        }
        .into();
        assert_eq!(err.name(), "MemberNotFound");

        let err: RuntimeError = InteropError::ImmutableField {
            type_name: "Point".into(),
            field: "x".into(),
        }
        .into();
        assert_eq!(err.name(), "ImmutableField");
    }
}
