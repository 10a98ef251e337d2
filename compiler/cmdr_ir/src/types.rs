//! Type references.
//!
//! A [`TypeRef`] names a type the way a signature or an instruction operand
//! does: a primitive, an imported type by full name, a type defined in the
//! module being woven, a generic parameter of the enclosing type, or an
//! instantiation of a generic type.

use crate::{Name, TypeId};

/// Reference to a type from a signature or an instruction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Void,
    Bool,
    Int32,
    String,
    Object,
    /// Native-sized integer; the function-pointer slot of delegate constructors.
    IntPtr,
    /// Imported type by full name (`System.Action`1`).
    Named(Name),
    /// Type defined in the module being woven.
    Def(TypeId),
    /// Generic parameter of the enclosing type, by position.
    GenericParam(u16),
    /// Instantiation of a generic type.
    Generic {
        base: Box<TypeRef>,
        args: Vec<TypeRef>,
    },
}

impl TypeRef {
    /// Instantiate `base` with `args`.
    pub fn generic(base: TypeRef, args: impl IntoIterator<Item = TypeRef>) -> Self {
        TypeRef::Generic {
            base: Box::new(base),
            args: args.into_iter().collect(),
        }
    }

    /// The uninstantiated type: `base` of a `Generic`, `self` otherwise.
    pub fn element(&self) -> &TypeRef {
        match self {
            TypeRef::Generic { base, .. } => base,
            other => other,
        }
    }

    /// Generic arguments of an instantiation, empty otherwise.
    pub fn generic_args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Generic { args, .. } => args.as_slice(),
            _ => &[],
        }
    }

    /// Value types are unboxed on conversion; everything else is cast.
    pub fn is_value_type(&self) -> bool {
        matches!(self, TypeRef::Bool | TypeRef::Int32 | TypeRef::IntPtr)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, TypeRef::Object)
    }

    /// Whether the type mentions a generic parameter anywhere.
    pub fn is_open(&self) -> bool {
        match self {
            TypeRef::GenericParam(_) => true,
            TypeRef::Generic { base, args } => base.is_open() || args.iter().any(TypeRef::is_open),
            _ => false,
        }
    }

    /// Replace generic parameters with `args` by position.
    ///
    /// Parameters without a matching argument are left in place.
    #[must_use]
    pub fn substitute(&self, args: &[TypeRef]) -> TypeRef {
        match self {
            TypeRef::GenericParam(i) => args
                .get(usize::from(*i))
                .cloned()
                .unwrap_or_else(|| self.clone()),
            TypeRef::Generic { base, args: inner } => TypeRef::Generic {
                base: Box::new(base.substitute(args)),
                args: inner.iter().map(|t| t.substitute(args)).collect(),
            },
            other => other.clone(),
        }
    }
}
