//! Definition attribute flags for types, methods and fields.
//!
//! These mirror the metadata attribute bits of a compiled module closely
//! enough for the weaver to read visibility and dispatch information and to
//! mark the members it synthesizes.

use bitflags::bitflags;

bitflags! {
    /// Attributes of a type definition.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeFlags: u32 {
        /// Visible outside the module.
        const PUBLIC = 1 << 0;
        /// Nested type visible only to its declaring type.
        const NESTED_PRIVATE = 1 << 1;
        /// Nested type visible wherever its declaring type is.
        const NESTED_PUBLIC = 1 << 2;
        /// Cannot be instantiated directly.
        const ABSTRACT = 1 << 3;
        /// Interface contract, no instance state.
        const INTERFACE = 1 << 4;
        /// Cannot be derived from.
        const SEALED = 1 << 5;
        /// Name is significant to tools (compiler-generated).
        const SPECIAL_NAME = 1 << 6;
        /// Static initialization may run lazily.
        const BEFORE_FIELD_INIT = 1 << 7;
    }
}

bitflags! {
    /// Attributes of a method definition.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct MethodFlags: u32 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        /// No `this` argument.
        const STATIC = 1 << 2;
        /// Dispatched through the vtable.
        const VIRTUAL = 1 << 3;
        /// Cannot be overridden.
        const FINAL = 1 << 4;
        /// Always gets a fresh vtable slot.
        const NEW_SLOT = 1 << 5;
        const HIDE_BY_SIG = 1 << 6;
        /// Accessors, constructors and other tool-significant names.
        const SPECIAL_NAME = 1 << 7;
        /// Runtime-significant name (`.ctor`, `.cctor`).
        const RT_SPECIAL_NAME = 1 << 8;
        const ABSTRACT = 1 << 9;
    }
}

bitflags! {
    /// Attributes of a field definition.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FieldFlags: u32 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const STATIC = 1 << 2;
        /// Assignable only from a constructor.
        const INIT_ONLY = 1 << 3;
    }
}

impl MethodFlags {
    /// Flags of a public instance constructor.
    pub const CONSTRUCTOR: MethodFlags = MethodFlags::PUBLIC
        .union(MethodFlags::HIDE_BY_SIG)
        .union(MethodFlags::SPECIAL_NAME)
        .union(MethodFlags::RT_SPECIAL_NAME);

    /// Flags of a sealed interface implementation method.
    pub const INTERFACE_IMPL: MethodFlags = MethodFlags::PUBLIC
        .union(MethodFlags::FINAL)
        .union(MethodFlags::HIDE_BY_SIG)
        .union(MethodFlags::NEW_SLOT)
        .union(MethodFlags::VIRTUAL);

    /// Flags of a public property or event accessor.
    pub const ACCESSOR: MethodFlags = MethodFlags::PUBLIC
        .union(MethodFlags::HIDE_BY_SIG)
        .union(MethodFlags::SPECIAL_NAME);
}
