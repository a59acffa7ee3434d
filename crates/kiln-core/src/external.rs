//! Extension point for foreign values.
//!
//! Layers above the core (notably the host-interop bridge) need to place
//! values of their own kinds inside `Value` without the core knowing their
//! concrete types. They implement `External` and downcast on the way out.

use std::any::Any;

/// A foreign value embedded in the dynamic value model.
///
/// Implementations are shared behind `Arc`, so interior mutability is the
/// implementor's responsibility.
pub trait External: Send + Sync {
    /// Name reported by `typeof`-style introspection
    fn type_name(&self) -> &str;

    /// Downcast support
    fn as_any(&self) -> &dyn Any;

    /// Rendering used by string conversion
    fn to_display(&self) -> String {
        format!("[object {}]", self.type_name())
    }
}
