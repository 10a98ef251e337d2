//! Interpreter for woven modules.
//!
//! Runs method bodies of a [`cmdr_ir::Module`] directly on the block IR,
//! with a small object heap. Enough of the runtime is modelled to execute
//! what the weaver generates:
//!
//! - objects of module types, constructed through their constructors
//! - delegates bound to a target and a method, multicast through
//!   `Delegate.Combine` / `Delegate.Remove`
//! - exceptions raised by `throw`, surfaced as [`EvalError::Thrown`]
//! - value conversions with unboxing checks
//!
//! Used by the weaver's tests to check behaviour of woven code; a host can
//! use it for smoke checks before writing a module out.

mod error;
mod heap;
pub mod interpreter;

pub use error::{EvalError, EvalResult};
pub use heap::{Binding, Heap, HeapObject, ObjRef, Value};
pub use interpreter::Interpreter;
