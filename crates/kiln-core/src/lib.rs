//! Core value model for the Kiln runtime.
//!
//! This crate defines the dynamic value taxonomy shared by the interpreter
//! and the host-interop bridge: `Value` and its kinds, script objects and
//! arrays, the `Callable` trait for anything invokable from script, the
//! `External` extension point that lets foreign values live inside `Value`,
//! and the catchable `RuntimeError` type.

pub mod callable;
pub mod error;
pub mod external;
pub mod object;
pub mod value;

pub use callable::{Callable, NativeFunction};
pub use error::RuntimeError;
pub use external::External;
pub use object::{ScriptArray, ScriptObject};
pub use value::{format_number, Value, ValueKind};
