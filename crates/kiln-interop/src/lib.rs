//! Host interop bridge for the Kiln runtime.
//!
//! The bridge sits between the dynamic value model of `kiln-core` and a
//! host object model the embedder registers at startup. It is organized
//! in four layers:
//!
//! - [`catalog`] describes registered classes into memoized, visibility-
//!   filtered [`catalog::TypeDescriptor`]s;
//! - [`members`] indexes a description by script name, grouping overloads
//!   and synthesizing bean-style accessor properties;
//! - [`overload`] picks the candidate whose parameters convert cheapest
//!   for a concrete argument list;
//! - [`convert`] ranks and performs the conversions in both directions,
//!   including adapters that let script callables implement single-method
//!   host interfaces.
//!
//! All caches hang off a [`Session`], so independent script contexts over
//! the same registry never observe each other's state.

pub mod adapter;
pub mod catalog;
pub mod convert;
pub mod error;
pub mod host;
pub mod members;
pub mod overload;
pub mod session;
pub mod wrappers;

pub use catalog::{Catalog, MemberKind, MemberRecord, PublicOnly, TypeDescriptor, VisibilityPolicy};
pub use convert::Weight;
pub use error::{InteropError, InteropResult};
pub use host::{
    ClassDef, CtorDef, FieldDef, HostRegistry, HostType, HostTypeId, HostValue, MethodDef,
    Modifiers, PrimKind,
};
pub use members::{BeanProperty, Member, MemberTable};
pub use overload::OverloadSet;
pub use session::{Session, WrapHook};
pub use wrappers::{
    unwrap_host, HostArrayView, HostClassView, HostListView, HostMethod, HostObjectView,
    HostWrapper,
};
