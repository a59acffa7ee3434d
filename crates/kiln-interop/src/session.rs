//! The interop session.
//!
//! A `Session` owns every cache the bridge keeps: the descriptor catalog,
//! per-type member tables, overload resolution caches (inside the tables)
//! and interface adapters. Sessions clone cheaply and share state; two
//! independent sessions over the same registry never share caches, so an
//! embedder can give each script context its own.

use crate::catalog::{Catalog, TypeDescriptor, VisibilityPolicy};
use crate::convert;
use crate::error::InteropResult;
use crate::host::registry::HostRegistry;
use crate::host::ty::{HostType, HostTypeId};
use crate::host::value::{HostObject, HostSeq, HostValue};
use crate::members::MemberTable;
use crate::wrappers::{HostArrayView, HostClassView, HostListView, HostObjectView, HostWrapper};
use dashmap::DashMap;
use kiln_core::Value;
use parking_lot::RwLock;
use std::sync::Arc;

/// Lets the embedder substitute its own wrapper when a host value
/// surfaces to script. Returning None falls through to the default
/// wrappers.
pub trait WrapHook: Send + Sync {
    fn wrap(&self, session: &Session, value: &HostValue) -> Option<Value>;
}

struct SessionInner {
    registry: Arc<HostRegistry>,
    catalog: Catalog,
    adapters: DashMap<(HostTypeId, usize), Arc<HostObject>>,
    wrap_hook: RwLock<Option<Arc<dyn WrapHook>>>,
}

/// A handle to one bridge instance. Cheap to clone.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Session with the default public-only visibility policy
    pub fn new(registry: Arc<HostRegistry>) -> Self {
        Self::with_policy(registry, Arc::new(crate::catalog::PublicOnly))
    }

    pub fn with_policy(registry: Arc<HostRegistry>, policy: Arc<dyn VisibilityPolicy>) -> Self {
        let catalog = Catalog::new(registry.clone(), policy);
        Self {
            inner: Arc::new(SessionInner {
                registry,
                catalog,
                adapters: DashMap::new(),
                wrap_hook: RwLock::new(None),
            }),
        }
    }

    /// Install a wrap hook. The hook runs before the default wrappers for
    /// every host value surfacing to script; it must not convert the value
    /// it is asked about through the same session, or wrapping recurses.
    pub fn set_wrap_hook(&self, hook: Arc<dyn WrapHook>) {
        *self.inner.wrap_hook.write() = Some(hook);
    }

    pub fn registry(&self) -> &HostRegistry {
        &self.inner.registry
    }

    pub(crate) fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    pub(crate) fn adapters(&self) -> &DashMap<(HostTypeId, usize), Arc<HostObject>> {
        &self.inner.adapters
    }

    /// Describe a host type (memoized)
    pub fn describe(&self, id: HostTypeId) -> InteropResult<Arc<TypeDescriptor>> {
        self.inner.catalog.describe(id)
    }

    /// The member table of a type, built on first use
    pub fn lookup(&self, id: HostTypeId) -> InteropResult<Arc<MemberTable>> {
        let desc = self.describe(id)?;
        let table = desc
            .table
            .get_or_init(|| Arc::new(MemberTable::build(&self.inner.catalog, &desc)))
            .clone();
        Ok(table)
    }

    /// Rank converting `value` into `target`
    pub fn conversion_weight(&self, value: &Value, target: &HostType) -> convert::Weight {
        convert::conversion_weight(self, value, target)
    }

    /// Resolve an overload set against concrete arguments
    pub fn resolve(
        &self,
        set: &crate::overload::OverloadSet,
        args: &[Value],
    ) -> InteropResult<Arc<crate::catalog::MemberRecord>> {
        set.resolve(self, args)
    }

    /// Convert a script value to a host value of the given type
    pub fn to_host(&self, value: &Value, target: &HostType) -> InteropResult<HostValue> {
        convert::to_host(self, value, target)
    }

    /// Surface a host value to script
    pub fn to_runtime(&self, value: &HostValue) -> Value {
        convert::to_runtime(self, value)
    }

    pub(crate) fn try_wrap_hook(&self, value: &HostValue) -> Option<Value> {
        let hook = self.inner.wrap_hook.read().clone()?;
        hook.wrap(self, value)
    }

    /// The class facade for a registered type
    pub fn class_value(&self, id: HostTypeId) -> Value {
        let name: Arc<str> = Arc::from(self.inner.registry.name(id).as_str());
        Value::External(Arc::new(HostClassView::new(self.clone(), id, name)))
    }

    /// Wrap a host instance
    pub fn wrap_object(&self, object: Arc<HostObject>) -> Value {
        Value::External(Arc::new(HostObjectView::new(self.clone(), object)))
    }

    pub(crate) fn wrap_array(&self, seq: Arc<HostSeq>) -> Value {
        Value::External(Arc::new(HostArrayView::new(self.clone(), seq)))
    }

    pub(crate) fn wrap_list(&self, seq: Arc<HostSeq>) -> Value {
        Value::External(Arc::new(HostListView::new(self.clone(), seq)))
    }

    pub(crate) fn wrap_opaque(&self, value: HostValue) -> Value {
        Value::External(Arc::new(HostWrapper::new(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::class::{ClassDef, MethodDef};
    use crate::host::ty::PrimKind;

    #[test]
    fn test_lookup_builds_table_once() {
        let reg = Arc::new(HostRegistry::new());
        let id = reg.register(ClassDef::new("Point").with_method(MethodDef::new(
            "norm",
            HostType::Prim(PrimKind::Double),
            |_, _| Ok(HostValue::Double(0.0)),
        )));
        let session = Session::new(reg);
        let a = session.lookup(id).unwrap();
        let b = session.lookup(id).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_sessions_do_not_share_caches() {
        let reg = Arc::new(HostRegistry::new());
        let id = reg.register(ClassDef::new("Point"));
        let s1 = Session::new(reg.clone());
        let s2 = Session::new(reg);
        let a = s1.lookup(id).unwrap();
        let b = s2.lookup(id).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    struct NumberDates;

    impl WrapHook for NumberDates {
        fn wrap(&self, _session: &Session, value: &HostValue) -> Option<Value> {
            match value {
                HostValue::Date(ms) => Some(Value::string(format!("@{ms}"))),
                _ => None,
            }
        }
    }

    #[test]
    fn test_wrap_hook_overrides_default() {
        let reg = Arc::new(HostRegistry::new());
        let session = Session::new(reg);
        assert_eq!(session.to_runtime(&HostValue::Date(5)), Value::Number(5.0));
        session.set_wrap_hook(Arc::new(NumberDates));
        assert_eq!(
            session.to_runtime(&HostValue::Date(5)),
            Value::string("@5")
        );
        // non-dates fall through
        assert_eq!(session.to_runtime(&HostValue::Int(1)), Value::Number(1.0));
    }
}
