//! The class catalog: memoized, policy-filtered descriptions of host types.
//!
//! A `TypeDescriptor` is built at most once per class per catalog and
//! caches everything downstream layers need: declared and accessible
//! members, constructors, and (lazily) the name-indexed member table.
//! Members whose signatures mention a declared-but-undefined class are
//! dropped with a warning rather than failing the whole description.

use crate::error::{InteropError, InteropResult};
use crate::host::class::{ClassDef, CtorBody, MethodBody, Modifiers};
use crate::host::registry::HostRegistry;
use crate::host::ty::{HostType, HostTypeId};
use crate::host::value::HostValue;
use crate::members::MemberTable;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Decides which types and members scripts may see.
///
/// The default exposes exactly the public surface. Embedders can plug in
/// stricter policies (package allow-lists, name deny-lists).
pub trait VisibilityPolicy: Send + Sync {
    /// Whether a type may be described at all
    fn type_visible(&self, modifiers: Modifiers, _name: &str) -> bool {
        modifiers.is_public()
    }

    /// Whether a member may appear in descriptors
    fn member_visible(&self, modifiers: Modifiers, _name: &str) -> bool {
        modifiers.is_public()
    }
}

/// The default policy: public types and members only.
pub struct PublicOnly;

impl VisibilityPolicy for PublicOnly {}

/// What a member is; the closed set of member shapes the bridge exposes.
pub enum MemberKind {
    Field {
        ty: HostType,
        default: HostValue,
    },
    Method {
        params: Vec<HostType>,
        varargs: bool,
        ret: HostType,
        body: Option<MethodBody>,
    },
    Constructor {
        params: Vec<HostType>,
        varargs: bool,
        body: Option<CtorBody>,
    },
}

/// One described member, tied to the class that declared it.
pub struct MemberRecord {
    /// Name as declared by the host
    pub original_name: Arc<str>,
    /// Name scripts use, after renames and prefix remapping
    pub script_name: Arc<str>,
    pub declaring: HostTypeId,
    pub declaring_name: Arc<str>,
    pub modifiers: Modifiers,
    /// Hidden members stay in declared lists so they can suppress
    /// inherited members of the same name, but are never accessible
    pub hidden: bool,
    pub kind: MemberKind,
}

impl MemberRecord {
    pub fn is_static(&self) -> bool {
        self.modifiers.is_static()
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind, MemberKind::Field { .. })
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, MemberKind::Method { .. })
    }

    /// Parameter types; empty for fields
    pub fn params(&self) -> &[HostType] {
        match &self.kind {
            MemberKind::Method { params, .. } | MemberKind::Constructor { params, .. } => params,
            MemberKind::Field { .. } => &[],
        }
    }

    /// Whether the trailing parameter is a variadic rest array
    pub fn is_varargs(&self) -> bool {
        match &self.kind {
            MemberKind::Method { varargs, .. } | MemberKind::Constructor { varargs, .. } => {
                *varargs
            }
            MemberKind::Field { .. } => false,
        }
    }

    /// Return type of a method; None for fields and constructors
    pub fn return_type(&self) -> Option<&HostType> {
        match &self.kind {
            MemberKind::Method { ret, .. } => Some(ret),
            _ => None,
        }
    }

    /// Declared field type, if this is a field
    pub fn field_type(&self) -> Option<&HostType> {
        match &self.kind {
            MemberKind::Field { ty, .. } => Some(ty),
            _ => None,
        }
    }

    /// Render the member the way the host declared it, for diagnostics
    /// and ambiguity reports.
    pub fn declaration(&self, registry: &HostRegistry) -> String {
        match &self.kind {
            MemberKind::Field { ty, .. } => format!(
                "{} {} {}.{}",
                self.modifiers,
                registry.signature_of(ty),
                self.declaring_name,
                self.original_name
            ),
            MemberKind::Method {
                params,
                varargs,
                ret,
                ..
            } => {
                let mut sig = registry.signature_of_params(params);
                if *varargs {
                    sig = sig.replacen("[])", "...)", 1);
                }
                format!(
                    "{} {} {}.{}{}",
                    self.modifiers,
                    registry.signature_of(ret),
                    self.declaring_name,
                    self.original_name,
                    sig
                )
            }
            MemberKind::Constructor {
                params, varargs, ..
            } => {
                let mut sig = registry.signature_of_params(params);
                if *varargs {
                    sig = sig.replacen("[])", "...)", 1);
                }
                format!("{} {}{}", self.modifiers, self.declaring_name, sig)
            }
        }
    }
}

impl fmt::Debug for MemberRecord {
    // the kind holds invocation thunks, so render it by shape only
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            MemberKind::Field { .. } => "field",
            MemberKind::Method { .. } => "method",
            MemberKind::Constructor { .. } => "constructor",
        };
        f.debug_struct("MemberRecord")
            .field("name", &self.original_name)
            .field("declaring", &self.declaring_name)
            .field("modifiers", &self.modifiers)
            .field("kind", &kind)
            .finish()
    }
}

/// A memoized description of one host type.
pub struct TypeDescriptor {
    pub id: HostTypeId,
    pub name: Arc<str>,
    pub modifiers: Modifiers,
    /// True when the definition was missing or suppressed and the member
    /// set is intentionally empty
    pub degraded: bool,
    pub superclass: Option<HostTypeId>,
    pub interfaces: Vec<HostTypeId>,
    def: Option<Arc<ClassDef>>,
    declared_fields: OnceCell<Vec<Arc<MemberRecord>>>,
    declared_methods: OnceCell<Vec<Arc<MemberRecord>>>,
    constructors: OnceCell<Vec<Arc<MemberRecord>>>,
    accessible_fields: OnceCell<Vec<Arc<MemberRecord>>>,
    accessible_methods: OnceCell<Vec<Arc<MemberRecord>>>,
    pub(crate) table: OnceCell<Arc<MemberTable>>,
}

impl TypeDescriptor {
    fn degraded(id: HostTypeId, name: Arc<str>, def: Option<Arc<ClassDef>>) -> Self {
        let (modifiers, superclass, interfaces) = match &def {
            Some(d) => (d.modifiers, d.superclass, d.interfaces.clone()),
            None => (Modifiers::PUBLIC, None, Vec::new()),
        };
        let desc = Self {
            id,
            name,
            modifiers,
            degraded: true,
            superclass,
            interfaces,
            def: None,
            declared_fields: OnceCell::new(),
            declared_methods: OnceCell::new(),
            constructors: OnceCell::new(),
            accessible_fields: OnceCell::new(),
            accessible_methods: OnceCell::new(),
            table: OnceCell::new(),
        };
        let _ = desc.declared_fields.set(Vec::new());
        let _ = desc.declared_methods.set(Vec::new());
        let _ = desc.constructors.set(Vec::new());
        desc
    }

    fn from_def(id: HostTypeId, def: Arc<ClassDef>) -> Self {
        Self {
            id,
            name: Arc::from(def.name.as_str()),
            modifiers: def.modifiers,
            degraded: false,
            superclass: def.superclass,
            interfaces: def.interfaces.clone(),
            def: Some(def),
            declared_fields: OnceCell::new(),
            declared_methods: OnceCell::new(),
            constructors: OnceCell::new(),
            accessible_fields: OnceCell::new(),
            accessible_methods: OnceCell::new(),
            table: OnceCell::new(),
        }
    }

    pub fn is_interface(&self) -> bool {
        self.modifiers.contains(Modifiers::INTERFACE)
    }

    /// Fields declared directly on this type, hidden ones included
    pub fn declared_fields(&self, catalog: &Catalog) -> &[Arc<MemberRecord>] {
        self.declared_fields.get_or_init(|| {
            let Some(def) = &self.def else {
                return Vec::new();
            };
            let mut out = Vec::new();
            for field in &def.fields {
                if !catalog.policy.member_visible(field.modifiers, &field.name) {
                    continue;
                }
                if !catalog.registry.types_resolved(&field.ty) {
                    warn!(
                        class = %def.name,
                        field = %field.name,
                        "dropping field with unresolved type from description"
                    );
                    continue;
                }
                out.push(Arc::new(MemberRecord {
                    original_name: Arc::from(field.name.as_str()),
                    script_name: Arc::from(def.script_field_name(field)),
                    declaring: self.id,
                    declaring_name: self.name.clone(),
                    modifiers: field.modifiers,
                    hidden: field.hidden,
                    kind: MemberKind::Field {
                        ty: field.ty.clone(),
                        default: field.default.clone(),
                    },
                }));
            }
            out
        })
    }

    /// Methods declared directly on this type, hidden ones included
    pub fn declared_methods(&self, catalog: &Catalog) -> &[Arc<MemberRecord>] {
        self.declared_methods.get_or_init(|| {
            let Some(def) = &self.def else {
                return Vec::new();
            };
            let mut out = Vec::new();
            for method in &def.methods {
                if !catalog.policy.member_visible(method.modifiers, &method.name) {
                    continue;
                }
                let unresolved = !catalog.registry.types_resolved(&method.ret)
                    || method
                        .params
                        .iter()
                        .any(|p| !catalog.registry.types_resolved(p));
                if unresolved {
                    warn!(
                        class = %def.name,
                        method = %method.name,
                        "dropping method with unresolved signature from description"
                    );
                    continue;
                }
                out.push(Arc::new(MemberRecord {
                    original_name: Arc::from(method.name.as_str()),
                    script_name: Arc::from(def.script_method_name(method)),
                    declaring: self.id,
                    declaring_name: self.name.clone(),
                    modifiers: method.modifiers,
                    hidden: method.hidden,
                    kind: MemberKind::Method {
                        params: method.params.clone(),
                        varargs: method.varargs,
                        ret: method.ret.clone(),
                        body: method.body.clone(),
                    },
                }));
            }
            out
        })
    }

    /// Invokable constructors of this type
    pub fn constructors(&self, catalog: &Catalog) -> &[Arc<MemberRecord>] {
        self.constructors.get_or_init(|| {
            let Some(def) = &self.def else {
                return Vec::new();
            };
            if def.is_interface() {
                return Vec::new();
            }
            let mut out = Vec::new();
            for ctor in &def.constructors {
                if ctor.hidden || !catalog.policy.member_visible(ctor.modifiers, &def.name) {
                    continue;
                }
                if ctor
                    .params
                    .iter()
                    .any(|p| !catalog.registry.types_resolved(p))
                {
                    warn!(
                        class = %def.name,
                        "dropping constructor with unresolved signature from description"
                    );
                    continue;
                }
                out.push(Arc::new(MemberRecord {
                    original_name: Arc::from("<init>"),
                    script_name: self.name.clone(),
                    declaring: self.id,
                    declaring_name: self.name.clone(),
                    modifiers: ctor.modifiers,
                    hidden: false,
                    kind: MemberKind::Constructor {
                        params: ctor.params.clone(),
                        varargs: ctor.varargs,
                        body: ctor.body.clone(),
                    },
                }));
            }
            out
        })
    }

    /// Fields reachable on instances of this type: own fields plus
    /// inherited ones. Shadowing keys on the declared host name, so the
    /// most-derived declaration wins and its rename (if any) governs the
    /// script name. A hidden declaration suppresses same-named inherited
    /// fields.
    pub fn accessible_fields(&self, catalog: &Catalog) -> &[Arc<MemberRecord>] {
        self.accessible_fields.get_or_init(|| {
            let mut out = Vec::new();
            let mut seen: FxHashSet<Arc<str>> = FxHashSet::default();
            let mut current = Some(self.id);
            while let Some(id) = current {
                let Ok(desc) = catalog.describe(id) else {
                    break;
                };
                for field in desc.declared_fields(catalog) {
                    if seen.insert(field.original_name.clone()) && !field.hidden {
                        out.push(field.clone());
                    }
                }
                current = desc.superclass;
            }
            out
        })
    }

    /// Methods reachable on this type: a breadth-first walk over the
    /// class, its superclasses and interfaces. The first declaration of a
    /// (host name, parameter types) signature wins, so overrides shadow
    /// inherited methods and a most-derived rename governs the script
    /// name; concrete superclass methods take precedence over interface
    /// signatures.
    pub fn accessible_methods(&self, catalog: &Catalog) -> &[Arc<MemberRecord>] {
        self.accessible_methods.get_or_init(|| {
            let mut out = Vec::new();
            let mut seen: FxHashSet<(Arc<str>, Vec<HostType>)> = FxHashSet::default();
            let mut visited: FxHashSet<HostTypeId> = FxHashSet::default();
            let mut queue = VecDeque::from([self.id]);
            while let Some(id) = queue.pop_front() {
                if !visited.insert(id) {
                    continue;
                }
                let Ok(desc) = catalog.describe(id) else {
                    continue;
                };
                for method in desc.declared_methods(catalog) {
                    let key = (method.original_name.clone(), method.params().to_vec());
                    if seen.insert(key) && !method.hidden {
                        out.push(method.clone());
                    }
                }
                if let Some(sup) = desc.superclass {
                    queue.push_back(sup);
                }
                queue.extend(desc.interfaces.iter().copied());
            }
            out
        })
    }
}

/// Memoizing catalog of type descriptors, scoped to one session.
pub struct Catalog {
    pub(crate) registry: Arc<HostRegistry>,
    pub(crate) policy: Arc<dyn VisibilityPolicy>,
    descriptors: DashMap<HostTypeId, Arc<TypeDescriptor>>,
}

impl Catalog {
    pub fn new(registry: Arc<HostRegistry>, policy: Arc<dyn VisibilityPolicy>) -> Self {
        Self {
            registry,
            policy,
            descriptors: DashMap::new(),
        }
    }

    pub fn registry(&self) -> &Arc<HostRegistry> {
        &self.registry
    }

    /// Describe a type, memoizing the result. Repeated calls return the
    /// same descriptor.
    ///
    /// Declared-but-undefined classes and hidden classes describe to a
    /// degraded descriptor with an empty member set; types refused by the
    /// visibility policy fail with `IntrospectionDenied`.
    pub fn describe(&self, id: HostTypeId) -> InteropResult<Arc<TypeDescriptor>> {
        if let Some(desc) = self.descriptors.get(&id) {
            return Ok(desc.clone());
        }
        let desc = match self.registry.get(id) {
            Some(def) => {
                if !self.policy.type_visible(def.modifiers, &def.name) {
                    return Err(InteropError::IntrospectionDenied {
                        type_name: def.name.clone(),
                    });
                }
                if def.hidden {
                    TypeDescriptor::degraded(id, Arc::from(def.name.as_str()), Some(def))
                } else {
                    TypeDescriptor::from_def(id, def)
                }
            }
            None => {
                let name = self.registry.name(id);
                warn!(class = %name, "describing a declared but undefined class; member set is empty");
                TypeDescriptor::degraded(id, Arc::from(name.as_str()), None)
            }
        };
        Ok(self
            .descriptors
            .entry(id)
            .or_insert_with(|| Arc::new(desc))
            .clone())
    }
}
