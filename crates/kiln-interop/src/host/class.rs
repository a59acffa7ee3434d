//! Host class definitions.
//!
//! The embedder describes its classes to the bridge as `ClassDef`s: named
//! fields, overloaded methods and constructors, each carrying modifiers and
//! an invocation thunk. Definitions are declarative; the catalog and member
//! resolver consume them, they never call into the embedder directly.

use crate::host::ty::{HostType, HostTypeId};
use crate::host::value::{HostObject, HostValue};
use bitflags::bitflags;
use std::fmt;
use std::sync::Arc;

bitflags! {
    /// Access and shape modifiers on classes and members.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Modifiers: u16 {
        const PUBLIC    = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE   = 1 << 2;
        const STATIC    = 1 << 3;
        const FINAL     = 1 << 4;
        const ABSTRACT  = 1 << 5;
        const NATIVE    = 1 << 6;
        const INTERFACE = 1 << 7;
    }
}

impl Modifiers {
    pub fn is_public(self) -> bool {
        self.contains(Modifiers::PUBLIC)
    }

    pub fn is_static(self) -> bool {
        self.contains(Modifiers::STATIC)
    }

    pub fn is_final(self) -> bool {
        self.contains(Modifiers::FINAL)
    }

    pub fn is_abstract(self) -> bool {
        self.contains(Modifiers::ABSTRACT)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.contains(Modifiers::PUBLIC) {
            parts.push("public");
        }
        if self.contains(Modifiers::PROTECTED) {
            parts.push("protected");
        }
        if self.contains(Modifiers::PRIVATE) {
            parts.push("private");
        }
        if self.contains(Modifiers::STATIC) {
            parts.push("static");
        }
        if self.contains(Modifiers::FINAL) {
            parts.push("final");
        }
        if self.contains(Modifiers::ABSTRACT) {
            parts.push("abstract");
        }
        if self.contains(Modifiers::NATIVE) {
            parts.push("native");
        }
        write!(f, "{}", parts.join(" "))
    }
}

/// Thunk invoked when a host method is called. Receives the receiver
/// (None for statics) and pre-converted arguments.
pub type MethodBody =
    Arc<dyn Fn(Option<&HostObject>, &[HostValue]) -> Result<HostValue, String> + Send + Sync>;

/// Thunk invoked when a constructor runs. Receives pre-converted arguments
/// and yields the new instance.
pub type CtorBody = Arc<dyn Fn(&[HostValue]) -> Result<HostValue, String> + Send + Sync>;

/// A field of a host class.
#[derive(Clone)]
pub struct FieldDef {
    pub name: String,
    pub ty: HostType,
    pub modifiers: Modifiers,
    pub hidden: bool,
    pub rename: Option<String>,
    /// Initial value for freshly constructed instances and lazily
    /// initialized statics
    pub default: HostValue,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: HostType) -> Self {
        let default = HostValue::default_for(&ty);
        Self {
            name: name.into(),
            ty,
            modifiers: Modifiers::PUBLIC,
            hidden: false,
            rename: None,
            default,
        }
    }

    pub fn as_static(mut self) -> Self {
        self.modifiers |= Modifiers::STATIC;
        self
    }

    pub fn as_final(mut self) -> Self {
        self.modifiers |= Modifiers::FINAL;
        self
    }

    pub fn as_private(mut self) -> Self {
        self.modifiers = (self.modifiers - Modifiers::PUBLIC) | Modifiers::PRIVATE;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn renamed(mut self, script_name: impl Into<String>) -> Self {
        self.rename = Some(script_name.into());
        self
    }

    pub fn with_default(mut self, value: HostValue) -> Self {
        self.default = value;
        self
    }
}

/// A method of a host class. A method without a body is abstract: it
/// contributes its signature (interface methods, adapter targets) but
/// cannot be invoked directly.
#[derive(Clone)]
pub struct MethodDef {
    pub name: String,
    pub modifiers: Modifiers,
    pub hidden: bool,
    pub rename: Option<String>,
    pub params: Vec<HostType>,
    pub varargs: bool,
    pub ret: HostType,
    pub body: Option<MethodBody>,
}

impl MethodDef {
    pub fn new<F>(name: impl Into<String>, ret: HostType, body: F) -> Self
    where
        F: Fn(Option<&HostObject>, &[HostValue]) -> Result<HostValue, String>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            modifiers: Modifiers::PUBLIC,
            hidden: false,
            rename: None,
            params: Vec::new(),
            varargs: false,
            ret,
            body: Some(Arc::new(body)),
        }
    }

    /// A signature-only method, used for interface members
    pub fn abstract_sig(name: impl Into<String>, ret: HostType) -> Self {
        Self {
            name: name.into(),
            modifiers: Modifiers::PUBLIC | Modifiers::ABSTRACT,
            hidden: false,
            rename: None,
            params: Vec::new(),
            varargs: false,
            ret,
            body: None,
        }
    }

    pub fn with_param(mut self, ty: HostType) -> Self {
        self.params.push(ty);
        self
    }

    pub fn with_params(mut self, tys: impl IntoIterator<Item = HostType>) -> Self {
        self.params.extend(tys);
        self
    }

    pub fn as_static(mut self) -> Self {
        self.modifiers |= Modifiers::STATIC;
        self
    }

    pub fn as_private(mut self) -> Self {
        self.modifiers = (self.modifiers - Modifiers::PUBLIC) | Modifiers::PRIVATE;
        self
    }

    /// Mark the trailing parameter as a variadic rest array
    pub fn as_varargs(mut self) -> Self {
        self.varargs = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn renamed(mut self, script_name: impl Into<String>) -> Self {
        self.rename = Some(script_name.into());
        self
    }
}

/// A constructor of a host class. A constructor without a body performs
/// default allocation: a fresh instance whose fields hold their declared
/// defaults.
#[derive(Clone)]
pub struct CtorDef {
    pub modifiers: Modifiers,
    pub hidden: bool,
    pub params: Vec<HostType>,
    pub varargs: bool,
    pub body: Option<CtorBody>,
}

impl CtorDef {
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&[HostValue]) -> Result<HostValue, String> + Send + Sync + 'static,
    {
        Self {
            modifiers: Modifiers::PUBLIC,
            hidden: false,
            params: Vec::new(),
            varargs: false,
            body: Some(Arc::new(body)),
        }
    }

    /// Zero-argument constructor that allocates with field defaults
    pub fn default_alloc() -> Self {
        Self {
            modifiers: Modifiers::PUBLIC,
            hidden: false,
            params: Vec::new(),
            varargs: false,
            body: None,
        }
    }

    pub fn with_param(mut self, ty: HostType) -> Self {
        self.params.push(ty);
        self
    }

    pub fn as_private(mut self) -> Self {
        self.modifiers = (self.modifiers - Modifiers::PUBLIC) | Modifiers::PRIVATE;
        self
    }

    pub fn as_varargs(mut self) -> Self {
        self.varargs = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// A host class or interface definition.
pub struct ClassDef {
    pub name: String,
    pub modifiers: Modifiers,
    pub superclass: Option<HostTypeId>,
    pub interfaces: Vec<HostTypeId>,
    /// Hidden classes contribute no inherited members and yield a degraded
    /// (empty) descriptor when described directly
    pub hidden: bool,
    /// Method name prefixes stripped by remapping (e.g. "kiln$")
    pub remap_prefixes: Vec<String>,
    pub constructors: Vec<CtorDef>,
    pub fields: Vec<FieldDef>,
    pub methods: Vec<MethodDef>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: Modifiers::PUBLIC,
            superclass: None,
            interfaces: Vec::new(),
            hidden: false,
            remap_prefixes: Vec::new(),
            constructors: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Define an interface: all methods are signatures, no instances
    pub fn interface(name: impl Into<String>) -> Self {
        let mut def = Self::new(name);
        def.modifiers |= Modifiers::INTERFACE | Modifiers::ABSTRACT;
        def
    }

    pub fn extends(mut self, superclass: HostTypeId) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn implements(mut self, iface: HostTypeId) -> Self {
        self.interfaces.push(iface);
        self
    }

    pub fn as_final(mut self) -> Self {
        self.modifiers |= Modifiers::FINAL;
        self
    }

    pub fn as_private(mut self) -> Self {
        self.modifiers = (self.modifiers - Modifiers::PUBLIC) | Modifiers::PRIVATE;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn with_remap_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.remap_prefixes.push(prefix.into());
        self
    }

    pub fn with_ctor(mut self, ctor: CtorDef) -> Self {
        self.constructors.push(ctor);
        self
    }

    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    pub fn is_interface(&self) -> bool {
        self.modifiers.contains(Modifiers::INTERFACE)
    }

    /// Script-facing name of a method after renames and prefix remapping
    pub fn script_method_name<'a>(&'a self, method: &'a MethodDef) -> &'a str {
        if let Some(rename) = &method.rename {
            return rename;
        }
        for prefix in &self.remap_prefixes {
            if let Some(stripped) = method.name.strip_prefix(prefix.as_str()) {
                if !stripped.is_empty() {
                    return stripped;
                }
            }
        }
        &method.name
    }

    /// Script-facing name of a field after renames
    pub fn script_field_name<'a>(&'a self, field: &'a FieldDef) -> &'a str {
        field.rename.as_deref().unwrap_or(&field.name)
    }
}

impl fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDef")
            .field("name", &self.name)
            .field("modifiers", &self.modifiers)
            .field("superclass", &self.superclass)
            .field("interfaces", &self.interfaces)
            .field("fields", &self.fields.len())
            .field("methods", &self.methods.len())
            .field("constructors", &self.constructors.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ty::PrimKind;

    #[test]
    fn test_builder_chains() {
        let def = ClassDef::new("Point")
            .with_field(FieldDef::new("x", HostType::Prim(PrimKind::Double)))
            .with_field(
                FieldDef::new("origin", HostType::Str)
                    .as_static()
                    .as_final(),
            )
            .with_method(MethodDef::new("norm", HostType::Prim(PrimKind::Double), |_, _| {
                Ok(HostValue::Double(0.0))
            }))
            .with_ctor(CtorDef::default_alloc());
        assert_eq!(def.fields.len(), 2);
        assert!(def.fields[1].modifiers.is_static());
        assert!(def.fields[1].modifiers.is_final());
        assert_eq!(def.methods.len(), 1);
        assert!(!def.is_interface());
    }

    #[test]
    fn test_prefix_remap() {
        let def = ClassDef::new("Widget")
            .with_remap_prefix("kiln$")
            .with_method(MethodDef::new("kiln$resize", HostType::Void, |_, _| {
                Ok(HostValue::Void)
            }))
            .with_method(
                MethodDef::new("kiln$grow", HostType::Void, |_, _| Ok(HostValue::Void))
                    .renamed("expand"),
            );
        assert_eq!(def.script_method_name(&def.methods[0]), "resize");
        // explicit rename wins over prefix stripping
        assert_eq!(def.script_method_name(&def.methods[1]), "expand");
    }

    #[test]
    fn test_interface_is_abstract() {
        let def = ClassDef::interface("Runnable")
            .with_method(MethodDef::abstract_sig("run", HostType::Void));
        assert!(def.is_interface());
        assert!(def.methods[0].body.is_none());
        assert!(def.methods[0].modifiers.is_abstract());
    }
}
