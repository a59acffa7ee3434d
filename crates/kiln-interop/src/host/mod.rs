//! The host-side object model: type references, class definitions, typed
//! values and the class registry.

pub mod class;
pub mod registry;
pub mod ty;
pub mod value;

pub use class::{ClassDef, CtorBody, CtorDef, FieldDef, MethodBody, MethodDef, Modifiers};
pub use registry::HostRegistry;
pub use ty::{HostType, HostTypeId, PrimKind};
pub use value::{Backing, HostMap, HostObject, HostSeq, HostValue};
