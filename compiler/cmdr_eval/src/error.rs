//! Evaluation errors.

/// Failure while running a method body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// An exception escaped the outermost call.
    #[error("unhandled `{ty}`: {message}")]
    Thrown { ty: String, message: String },

    #[error("null reference: {context}")]
    NullReference { context: String },

    #[error("cannot convert {value} to `{target}`")]
    InvalidCast { value: String, target: String },

    #[error("`{method}` has no body")]
    NoBody { method: String },

    #[error("`{ty}` has no method `{name}` taking {arity} argument(s)")]
    MethodNotFound {
        ty: String,
        name: String,
        arity: usize,
    },

    #[error("`{ty}` has no field `{field}`")]
    NoField { ty: String, field: String },

    #[error("external method `{0}` is not supported")]
    UnsupportedExternal(String),

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("call depth limit of {0} exceeded")]
    DepthLimit(usize),

    #[error("step limit of {0} exceeded")]
    StepLimit(u64),
}

pub type EvalResult<T> = Result<T, EvalError>;
