//! The host class registry.
//!
//! Embedders register `ClassDef`s here before (or while) scripts run. The
//! registry owns class identity, the assignability relation, static field
//! storage, and signature rendering. A class may be declared ahead of its
//! definition; members referencing a still-undefined class are treated as
//! unresolvable by the catalog.

use crate::host::class::ClassDef;
use crate::host::ty::{HostType, HostTypeId};
use crate::host::value::HostValue;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Registry of host classes known to a session.
#[derive(Default)]
pub struct HostRegistry {
    // Slot is None between declare() and define()
    classes: RwLock<Vec<Option<Arc<ClassDef>>>>,
    by_name: DashMap<String, HostTypeId>,
    statics: DashMap<(HostTypeId, Arc<str>), HostValue>,
}

impl HostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an id for a class by name without defining it yet. Useful
    /// for mutually referential definitions.
    pub fn declare(&self, name: impl Into<String>) -> HostTypeId {
        let name = name.into();
        if let Some(id) = self.by_name.get(&name) {
            return *id;
        }
        let mut classes = self.classes.write();
        let id = HostTypeId(classes.len() as u32);
        classes.push(None);
        self.by_name.insert(name, id);
        id
    }

    /// Fill in a previously declared class
    pub fn define(&self, id: HostTypeId, def: ClassDef) {
        let mut classes = self.classes.write();
        if let Some(slot) = classes.get_mut(id.index()) {
            *slot = Some(Arc::new(def));
        }
    }

    /// Declare and define in one step
    pub fn register(&self, def: ClassDef) -> HostTypeId {
        let id = self.declare(def.name.clone());
        self.define(id, def);
        id
    }

    /// Definition of a class, or None if only declared
    pub fn get(&self, id: HostTypeId) -> Option<Arc<ClassDef>> {
        self.classes.read().get(id.index()).and_then(|s| s.clone())
    }

    /// Look up a class id by name
    pub fn lookup(&self, name: &str) -> Option<HostTypeId> {
        self.by_name.get(name).map(|id| *id)
    }

    /// Name of a class, whether or not it has been defined
    pub fn name(&self, id: HostTypeId) -> String {
        if let Some(def) = self.get(id) {
            return def.name.clone();
        }
        self.by_name
            .iter()
            .find(|e| *e.value() == id)
            .map(|e| e.key().clone())
            .unwrap_or_else(|| format!("#{}", id.index()))
    }

    /// Whether `from` is `target` or inherits/implements it
    pub fn is_assignable_class(&self, target: HostTypeId, from: HostTypeId) -> bool {
        let mut worklist = vec![from];
        while let Some(current) = worklist.pop() {
            if current == target {
                return true;
            }
            let Some(def) = self.get(current) else {
                continue;
            };
            if let Some(sup) = def.superclass {
                worklist.push(sup);
            }
            worklist.extend(def.interfaces.iter().copied());
        }
        false
    }

    /// Whether a value of type `from` can fill a slot of type `target`
    /// without conversion.
    pub fn is_assignable(&self, target: &HostType, from: &HostType) -> bool {
        if target == from {
            return true;
        }
        match (target, from) {
            (HostType::Any, f) => !matches!(f, HostType::Void),
            (HostType::Boxed(t), HostType::Prim(f)) | (HostType::Prim(t), HostType::Boxed(f)) => {
                t == f
            }
            (HostType::Class(t), HostType::Class(f)) => self.is_assignable_class(*t, *f),
            (HostType::Array(t), HostType::Array(f))
            | (HostType::List(t), HostType::List(f))
            | (HostType::Set(t), HostType::Set(f)) => {
                **t == HostType::Any || self.is_assignable(t, f)
            }
            (HostType::Map(tk, tv), HostType::Map(fk, fv)) => {
                (**tk == HostType::Any || self.is_assignable(tk, fk))
                    && (**tv == HostType::Any || self.is_assignable(tv, fv))
            }
            _ => false,
        }
    }

    /// Whether a host value is already an instance of `target`
    pub fn value_instance_of(&self, value: &HostValue, target: &HostType) -> bool {
        match value {
            HostValue::Null => !target.is_primitive() && *target != HostType::Void,
            HostValue::Object(obj) => match target {
                HostType::Class(id) => self.is_assignable_class(*id, obj.class),
                HostType::Any => true,
                _ => false,
            },
            other => self.is_assignable(target, &other.type_of()),
        }
    }

    /// Read a static field, lazily initializing from its declared default
    pub fn static_get(&self, class: HostTypeId, name: &str, default: &HostValue) -> HostValue {
        let key = (class, Arc::<str>::from(name));
        if let Some(v) = self.statics.get(&key) {
            return v.clone();
        }
        self.statics
            .entry(key)
            .or_insert_with(|| default.clone())
            .clone()
    }

    /// Write a static field
    pub fn static_set(&self, class: HostTypeId, name: &str, value: HostValue) {
        self.statics.insert((class, Arc::from(name)), value);
    }

    /// Render a type signature with class names substituted
    pub fn signature_of(&self, ty: &HostType) -> String {
        match ty {
            HostType::Class(id) => self.name(*id),
            HostType::Array(e) => format!("{}[]", self.signature_of(e)),
            HostType::List(e) => format!("List<{}>", self.signature_of(e)),
            HostType::Set(e) => format!("Set<{}>", self.signature_of(e)),
            HostType::Map(k, v) => {
                format!("Map<{},{}>", self.signature_of(k), self.signature_of(v))
            }
            other => other.to_string(),
        }
    }

    /// Render a parameter list: "(int,String)"
    pub fn signature_of_params(&self, params: &[HostType]) -> String {
        let parts: Vec<String> = params.iter().map(|p| self.signature_of(p)).collect();
        format!("({})", parts.join(","))
    }

    /// Whether every type a signature mentions has a definition. Members
    /// with unresolved signatures are dropped from descriptors.
    pub fn types_resolved(&self, ty: &HostType) -> bool {
        match ty {
            HostType::Class(id) => self.get(*id).is_some(),
            HostType::Array(e) | HostType::List(e) | HostType::Set(e) => self.types_resolved(e),
            HostType::Map(k, v) => self.types_resolved(k) && self.types_resolved(v),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::class::{ClassDef, FieldDef, MethodDef};
    use crate::host::ty::PrimKind;

    fn registry_with_hierarchy() -> (HostRegistry, HostTypeId, HostTypeId, HostTypeId) {
        let reg = HostRegistry::new();
        let animal = reg.register(ClassDef::new("Animal"));
        let pet = reg.register(ClassDef::interface("Pet"));
        let dog = reg.register(ClassDef::new("Dog").extends(animal).implements(pet));
        (reg, animal, pet, dog)
    }

    #[test]
    fn test_assignable_walks_super_and_interfaces() {
        let (reg, animal, pet, dog) = registry_with_hierarchy();
        assert!(reg.is_assignable_class(animal, dog));
        assert!(reg.is_assignable_class(pet, dog));
        assert!(!reg.is_assignable_class(dog, animal));
        assert!(reg.is_assignable_class(dog, dog));
    }

    #[test]
    fn test_declare_before_define() {
        let reg = HostRegistry::new();
        let id = reg.declare("Node");
        assert!(reg.get(id).is_none());
        assert_eq!(reg.name(id), "Node");
        reg.define(
            id,
            ClassDef::new("Node").with_method(MethodDef::new("next", HostType::Class(id), |_, _| {
                Ok(HostValue::Null)
            })),
        );
        assert!(reg.get(id).is_some());
        assert_eq!(reg.lookup("Node"), Some(id));
    }

    #[test]
    fn test_static_field_lazy_default() {
        let reg = HostRegistry::new();
        let id = reg.register(ClassDef::new("Counter"));
        let field = FieldDef::new("count", HostType::Prim(PrimKind::Int)).as_static();
        assert_eq!(
            reg.static_get(id, &field.name, &field.default),
            HostValue::Int(0)
        );
        reg.static_set(id, &field.name, HostValue::Int(7));
        assert_eq!(
            reg.static_get(id, &field.name, &field.default),
            HostValue::Int(7)
        );
    }

    #[test]
    fn test_signature_rendering() {
        let (reg, animal, _, _) = registry_with_hierarchy();
        assert_eq!(
            reg.signature_of(&HostType::list_of(HostType::Class(animal))),
            "List<Animal>"
        );
        assert_eq!(
            reg.signature_of_params(&[HostType::Prim(PrimKind::Int), HostType::Str]),
            "(int,String)"
        );
    }

    #[test]
    fn test_types_resolved() {
        let reg = HostRegistry::new();
        let pending = reg.declare("Pending");
        assert!(!reg.types_resolved(&HostType::Class(pending)));
        assert!(!reg.types_resolved(&HostType::list_of(HostType::Class(pending))));
        assert!(reg.types_resolved(&HostType::Str));
    }
}
