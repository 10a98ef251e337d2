//! Diagnostics for the command weaver.
//!
//! Every problem the weave finds becomes a [`Diagnostic`] rather than an
//! abort:
//! - an [`ErrorCode`] for searchability (first digit is the weave phase)
//! - a [`Severity`] (usage problems are warnings, synthesis failures errors)
//! - a message, the member it concerns, and optional notes
//!
//! # Error Guarantees
//!
//! [`ErrorGuaranteed`] is proof that at least one error was queued. Only
//! [`DiagnosticQueue::emit_error`] hands one out, so a function returning
//! `Result<_, ErrorGuaranteed>` cannot fail without reporting.
//!
//! ```text
//! let guarantee = queue.emit_error(diagnostic);
//! return Err(guarantee);
//! ```

mod diagnostic;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
