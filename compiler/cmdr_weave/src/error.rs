//! Per-command weave failures.
//!
//! Every phase after scanning works command by command and returns
//! `Result<_, WeaveError>`; the pipeline turns each error into one error
//! diagnostic and moves on to the next command.

use cmdr_diagnostic::{Diagnostic, ErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeaveError {
    #[error("property `{property}` exists with type `{found}`; a command property must have type `{expected}`")]
    PropertyTypeConflict {
        property: String,
        found: String,
        expected: String,
    },

    #[error("cannot add `{member}` to `{ty}`: a member with that name already exists")]
    MemberNameClash { ty: String, member: String },

    #[error("command property `{property}` has no {accessor}")]
    MissingAccessor {
        property: String,
        accessor: &'static str,
    },

    #[error("implementation `{implementation}` has no constructor taking {arity} argument(s)")]
    ConstructorNotFound {
        implementation: String,
        arity: usize,
    },

    #[error("existing type `{ty}` does not have the expected shape: {detail}")]
    GeneratedTypeShape { ty: String, detail: String },

    #[error("command `{command}` has no execute handler")]
    MissingExecuteHandler { command: String },

    #[error("command `{command}` has {} can-execute handlers; at most one is allowed", handlers.len())]
    AmbiguousCanExecute {
        command: String,
        handlers: Vec<String>,
    },

    #[error("handler `{handler}` does not fit delegate parameter `{delegate}`")]
    DelegateShapeMismatch { handler: String, delegate: String },

    #[error("`{ty}` already has a method `{name}` that is not a parameterless instance initializer")]
    InitializerClash { ty: String, name: String },

    #[error("handler `{handler}` is not declared on `{owner}`, which initializes the command")]
    ForeignHandler { handler: String, owner: String },
}

impl WeaveError {
    pub fn code(&self) -> ErrorCode {
        match self {
            WeaveError::PropertyTypeConflict { .. } => ErrorCode::E2001,
            WeaveError::MemberNameClash { .. } => ErrorCode::E2002,
            WeaveError::MissingAccessor { .. } => ErrorCode::E2003,
            WeaveError::ConstructorNotFound { .. } => ErrorCode::E3001,
            WeaveError::GeneratedTypeShape { .. } => ErrorCode::E3002,
            WeaveError::MissingExecuteHandler { .. } => ErrorCode::E4001,
            WeaveError::AmbiguousCanExecute { .. } => ErrorCode::E4002,
            WeaveError::DelegateShapeMismatch { .. } => ErrorCode::E4003,
            WeaveError::InitializerClash { .. } => ErrorCode::E4004,
            WeaveError::ForeignHandler { .. } => ErrorCode::E4005,
        }
    }

    /// Error diagnostic for this failure, located at `location`.
    pub fn to_diagnostic(&self, location: impl Into<String>) -> Diagnostic {
        let diag = Diagnostic::error(self.code())
            .with_message(self.to_string())
            .at(location);
        match self {
            WeaveError::AmbiguousCanExecute { handlers, .. } => handlers
                .iter()
                .fold(diag, |d, h| d.with_note(format!("candidate: {h}"))),
            _ => diag,
        }
    }
}
