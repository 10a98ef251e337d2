//! In-memory model of one compiled module.
//!
//! The model holds exactly what the weaver reads and writes: ordered type
//! definitions with their fields, properties, methods, events, custom
//! attributes and nested types, method signatures, and instruction bodies.
//! Types live in an arena indexed by [`TypeId`]; members are addressed by
//! `(TypeId, index)` handles so references stay valid while new members are
//! appended.

use smallvec::SmallVec;

use crate::{Body, FieldFlags, MethodFlags, Name, StringInterner, TypeFlags, TypeRef};

// ── Handles ─────────────────────────────────────────────────────────

/// Index of a type definition in the module arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A method of a module type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId {
    pub ty: TypeId,
    pub index: u32,
}

/// A field of a module type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId {
    pub ty: TypeId,
    pub index: u32,
}

/// A property of a module type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId {
    pub ty: TypeId,
    pub index: u32,
}

fn member_index(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("member count exceeds u32::MAX"))
}

// ── Attributes ──────────────────────────────────────────────────────

/// Constructor argument of a custom attribute.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AttrArg {
    String(Name),
    Int(i64),
    Bool(bool),
    Type(TypeRef),
}

/// A custom attribute applied to a type or a method.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CustomAttribute {
    /// Full name of the attribute type (`Commander.OnCommandAttribute`).
    pub ty: Name,
    /// Constructor arguments in order.
    pub args: Vec<AttrArg>,
}

impl CustomAttribute {
    pub fn new(ty: Name, args: Vec<AttrArg>) -> Self {
        Self { ty, args }
    }

    /// The first constructor argument, if it is a string.
    pub fn first_string_arg(&self) -> Option<Name> {
        match self.args.first() {
            Some(AttrArg::String(s)) => Some(*s),
            _ => None,
        }
    }
}

// ── Members ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamDef {
    pub name: Name,
    pub ty: TypeRef,
    /// Output (`out`) parameter.
    pub is_out: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDef {
    pub name: Name,
    pub flags: MethodFlags,
    pub params: Vec<ParamDef>,
    pub ret: TypeRef,
    pub attributes: Vec<CustomAttribute>,
    /// `None` for abstract and imported-signature methods.
    pub body: Option<Body>,
}

impl MethodDef {
    pub fn new(name: Name, flags: MethodFlags, ret: TypeRef) -> Self {
        Self {
            name,
            flags,
            params: Vec::new(),
            ret,
            attributes: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_param(mut self, name: Name, ty: TypeRef) -> Self {
        self.params.push(ParamDef {
            name,
            ty,
            is_out: false,
        });
        self
    }

    #[must_use]
    pub fn with_out_param(mut self, name: Name, ty: TypeRef) -> Self {
        self.params.push(ParamDef {
            name,
            ty,
            is_out: true,
        });
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: CustomAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(MethodFlags::STATIC)
    }

    pub fn is_virtual(&self) -> bool {
        self.flags.contains(MethodFlags::VIRTUAL)
    }

    /// Instance constructor (`.ctor`). Type initializers are excluded.
    pub fn is_constructor(&self) -> bool {
        self.flags.contains(MethodFlags::RT_SPECIAL_NAME) && !self.is_static()
    }

    pub fn param_types(&self) -> Vec<TypeRef> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldDef {
    pub name: Name,
    pub ty: TypeRef,
    pub flags: FieldFlags,
}

/// A property; accessors are method indices on the same type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyDef {
    pub name: Name,
    pub ty: TypeRef,
    pub getter: Option<u32>,
    pub setter: Option<u32>,
}

/// An event; the backing field and accessors are indices on the same type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EventDef {
    pub name: Name,
    pub ty: TypeRef,
    pub field: Option<u32>,
    pub add: Option<u32>,
    pub remove: Option<u32>,
}

// ── Types ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDef {
    pub namespace: Name,
    pub name: Name,
    pub flags: TypeFlags,
    pub base: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    /// Names of generic parameters; `TypeRef::GenericParam(i)` refers to entry `i`.
    pub generic_params: Vec<Name>,
    pub fields: Vec<FieldDef>,
    pub properties: Vec<PropertyDef>,
    pub methods: Vec<MethodDef>,
    pub events: Vec<EventDef>,
    pub attributes: Vec<CustomAttribute>,
    pub nested: Vec<TypeId>,
    pub declaring: Option<TypeId>,
}

impl TypeDef {
    pub fn new(namespace: Name, name: Name, flags: TypeFlags) -> Self {
        Self {
            namespace,
            name,
            flags,
            base: Some(TypeRef::Object),
            interfaces: Vec::new(),
            generic_params: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            events: Vec::new(),
            attributes: Vec::new(),
            nested: Vec::new(),
            declaring: None,
        }
    }

    pub fn find_method(&self, name: Name) -> Option<u32> {
        self.methods
            .iter()
            .position(|m| m.name == name)
            .map(member_index)
    }

    pub fn find_field(&self, name: Name) -> Option<u32> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .map(member_index)
    }

    pub fn find_property(&self, name: Name) -> Option<u32> {
        self.properties
            .iter()
            .position(|p| p.name == name)
            .map(member_index)
    }

    /// Indices of instance constructors, in declaration order.
    pub fn constructors(&self) -> impl Iterator<Item = u32> + '_ {
        self.methods
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_constructor())
            .map(|(i, _)| member_index(i))
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_params.is_empty()
    }

    pub fn implements(&self, interface: &TypeRef) -> bool {
        self.interfaces.iter().any(|i| i == interface)
    }
}

// ── Method references ───────────────────────────────────────────────

/// A method as referenced from an instruction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MethodRef {
    /// A method of a module type. `type_args` instantiate the declaring
    /// type's generic parameters (empty for non-generic types, or for
    /// references from inside the generic type itself).
    Def {
        method: MethodId,
        type_args: SmallVec<[TypeRef; 1]>,
    },
    /// An imported method, identified by owner, name and signature.
    External {
        owner: TypeRef,
        name: Name,
        params: Vec<TypeRef>,
        ret: TypeRef,
    },
}

impl MethodRef {
    /// Uninstantiated reference to a module method.
    pub fn def(method: MethodId) -> Self {
        MethodRef::Def {
            method,
            type_args: SmallVec::new(),
        }
    }

    /// Reference to a module method on an instantiated declaring type.
    pub fn instantiated(method: MethodId, type_args: impl IntoIterator<Item = TypeRef>) -> Self {
        MethodRef::Def {
            method,
            type_args: type_args.into_iter().collect(),
        }
    }

    pub fn as_def(&self) -> Option<MethodId> {
        match self {
            MethodRef::Def { method, .. } => Some(*method),
            MethodRef::External { .. } => None,
        }
    }
}

/// Reference to another module the woven module depends on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AssemblyRef {
    pub name: Name,
}

// ── Module ──────────────────────────────────────────────────────────

/// One compiled module, exclusively owned by whoever is transforming it.
#[derive(Debug)]
pub struct Module {
    pub name: Name,
    types: Vec<TypeDef>,
    top_level: Vec<TypeId>,
    pub references: Vec<AssemblyRef>,
    interner: StringInterner,
}

impl Module {
    pub fn new(name: &str) -> Self {
        let interner = StringInterner::new();
        let name = interner.intern(name);
        Self {
            name,
            types: Vec::new(),
            top_level: Vec::new(),
            references: Vec::new(),
            interner,
        }
    }

    // Names

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// Resolve a name to its text.
    #[inline]
    pub fn str(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    // Types

    fn push_type(&mut self, def: TypeDef) -> TypeId {
        let id = TypeId::new(member_index(self.types.len()));
        self.types.push(def);
        id
    }

    /// Add a top-level type.
    pub fn add_type(&mut self, def: TypeDef) -> TypeId {
        let id = self.push_type(def);
        self.top_level.push(id);
        id
    }

    /// Add a type nested inside `owner`.
    pub fn add_nested_type(&mut self, owner: TypeId, mut def: TypeDef) -> TypeId {
        def.declaring = Some(owner);
        let id = self.push_type(def);
        self.types[owner.index()].nested.push(id);
        id
    }

    #[inline]
    pub fn ty(&self, id: TypeId) -> &TypeDef {
        &self.types[id.index()]
    }

    #[inline]
    pub fn ty_mut(&mut self, id: TypeId) -> &mut TypeDef {
        &mut self.types[id.index()]
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn top_level_types(&self) -> &[TypeId] {
        &self.top_level
    }

    /// Every type in the module, depth-first: each type is followed by its
    /// nested types.
    pub fn all_types(&self) -> Vec<TypeId> {
        fn visit(module: &Module, id: TypeId, out: &mut Vec<TypeId>) {
            out.push(id);
            for &nested in &module.ty(id).nested {
                visit(module, nested, out);
            }
        }
        let mut out = Vec::with_capacity(self.types.len());
        for &id in &self.top_level {
            visit(self, id, &mut out);
        }
        out
    }

    /// Find a type by the text of its full name (see [`full_name`](Self::full_name)).
    pub fn find_type(&self, full_name: &str) -> Option<TypeId> {
        self.all_types()
            .into_iter()
            .find(|&id| self.full_name(id) == full_name)
    }

    /// `Namespace.Name` for top-level types, `Outer/Inner` for nested ones.
    pub fn full_name(&self, id: TypeId) -> String {
        let def = self.ty(id);
        if let Some(outer) = def.declaring {
            return format!("{}/{}", self.full_name(outer), self.str(def.name));
        }
        let ns = self.str(def.namespace);
        if ns.is_empty() {
            self.str(def.name).to_owned()
        } else {
            format!("{ns}.{}", self.str(def.name))
        }
    }

    // Members

    #[inline]
    pub fn method(&self, id: MethodId) -> &MethodDef {
        &self.ty(id.ty).methods[id.index as usize]
    }

    #[inline]
    pub fn method_mut(&mut self, id: MethodId) -> &mut MethodDef {
        &mut self.ty_mut(id.ty).methods[id.index as usize]
    }

    #[inline]
    pub fn field(&self, id: FieldId) -> &FieldDef {
        &self.ty(id.ty).fields[id.index as usize]
    }

    #[inline]
    pub fn property(&self, id: PropertyId) -> &PropertyDef {
        &self.ty(id.ty).properties[id.index as usize]
    }

    pub fn add_method(&mut self, ty: TypeId, def: MethodDef) -> MethodId {
        let methods = &mut self.ty_mut(ty).methods;
        let index = member_index(methods.len());
        methods.push(def);
        MethodId { ty, index }
    }

    pub fn add_field(&mut self, ty: TypeId, def: FieldDef) -> FieldId {
        let fields = &mut self.ty_mut(ty).fields;
        let index = member_index(fields.len());
        fields.push(def);
        FieldId { ty, index }
    }

    pub fn add_property(&mut self, ty: TypeId, def: PropertyDef) -> PropertyId {
        let properties = &mut self.ty_mut(ty).properties;
        let index = member_index(properties.len());
        properties.push(def);
        PropertyId { ty, index }
    }

    pub fn add_event(&mut self, ty: TypeId, def: EventDef) -> u32 {
        let events = &mut self.ty_mut(ty).events;
        let index = member_index(events.len());
        events.push(def);
        index
    }

    pub fn getter(&self, id: PropertyId) -> Option<MethodId> {
        self.property(id)
            .getter
            .map(|index| MethodId { ty: id.ty, index })
    }

    pub fn setter(&self, id: PropertyId) -> Option<MethodId> {
        self.property(id)
            .setter
            .map(|index| MethodId { ty: id.ty, index })
    }

    // Signatures

    /// Parameter types of a referenced method, with the declaring type's
    /// generic arguments substituted.
    pub fn ref_params(&self, method: &MethodRef) -> Vec<TypeRef> {
        match method {
            MethodRef::Def { method, type_args } => self
                .method(*method)
                .params
                .iter()
                .map(|p| p.ty.substitute(type_args))
                .collect(),
            MethodRef::External { params, .. } => params.clone(),
        }
    }

    /// Return type of a referenced method.
    pub fn ref_ret(&self, method: &MethodRef) -> TypeRef {
        match method {
            MethodRef::Def { method, type_args } => self.method(*method).ret.substitute(type_args),
            MethodRef::External { ret, .. } => ret.clone(),
        }
    }

    /// Name of a referenced method.
    pub fn ref_name(&self, method: &MethodRef) -> Name {
        match method {
            MethodRef::Def { method, .. } => self.method(*method).name,
            MethodRef::External { name, .. } => *name,
        }
    }

    // Display

    /// Render a type reference the way metadata dumps do.
    pub fn display_type(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Void => "System.Void".to_owned(),
            TypeRef::Bool => "System.Boolean".to_owned(),
            TypeRef::Int32 => "System.Int32".to_owned(),
            TypeRef::String => "System.String".to_owned(),
            TypeRef::Object => "System.Object".to_owned(),
            TypeRef::IntPtr => "System.IntPtr".to_owned(),
            TypeRef::Named(name) => self.str(*name).to_owned(),
            TypeRef::Def(id) => self.full_name(*id),
            TypeRef::GenericParam(i) => format!("!{i}"),
            TypeRef::Generic { base, args } => {
                let args: Vec<String> = args.iter().map(|a| self.display_type(a)).collect();
                format!("{}<{}>", self.display_type(base), args.join(","))
            }
        }
    }

    /// `System.Void Ns.Type::Name(System.Object)`.
    pub fn display_method(&self, id: MethodId) -> String {
        let def = self.method(id);
        let params: Vec<String> = def.params.iter().map(|p| self.display_type(&p.ty)).collect();
        format!(
            "{} {}::{}({})",
            self.display_type(&def.ret),
            self.full_name(id.ty),
            self.str(def.name),
            params.join(",")
        )
    }
}
