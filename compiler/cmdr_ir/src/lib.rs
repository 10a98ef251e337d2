//! Module model and instruction IR for the command weaver.
//!
//! This crate provides:
//!
//! - **Names** ([`Name`], [`StringInterner`]): every identifier in a module
//!   is interned once and compared as an integer.
//!
//! - **Module model** ([`Module`], [`TypeDef`], [`MethodDef`], ...): the
//!   in-memory view of one compiled module that the weaver mutates.
//!
//! - **Block IR** ([`Body`], [`Block`], [`Instr`], [`Terminator`]): method
//!   bodies as basic blocks over a handful of operations (construct, bind
//!   delegate, load/store field, call, convert, null test).
//!
//! - **Lowering** ([`lower::lower_body`]): block IR to stack-machine
//!   opcodes, kept separate so synthesis can be built and tested without a
//!   binary encoder.

pub mod body;
pub mod builder;
mod flags;
mod interner;
pub mod lower;
pub mod module;
mod name;
mod types;

pub use body::{Block, BlockId, Body, Dispatch, Instr, Operand, Terminator, VarId};
pub use builder::BodyBuilder;
pub use flags::{FieldFlags, MethodFlags, TypeFlags};
pub use interner::{InternError, StringInterner};
pub use module::{
    AssemblyRef, AttrArg, CustomAttribute, EventDef, FieldDef, FieldId, MethodDef, MethodId,
    MethodRef, Module, ParamDef, PropertyDef, PropertyId, TypeDef, TypeId,
};
pub use name::Name;
pub use types::TypeRef;
