use thiserror::Error;

/// Errors raised while compiling a rule tree into a predicate.
///
/// All variants are deterministic and raised synchronously at compile time;
/// evaluation itself never fails (missing or mistyped values degrade to
/// `false`).
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("unsupported data type '{token}'")]
    UnsupportedType { token: String },

    #[error("unknown operator '{token}'")]
    UnknownOperator { token: String },

    #[error("unresolved field segment '{segment}' in path '{path}'")]
    UnresolvedField { segment: String, path: String },

    #[error("missing external capability: {capability}")]
    MissingExternalCapability { capability: String },

    #[error("malformed value: {detail}")]
    MalformedValue { detail: String },

    #[error("operator '{operator}' is not applicable to declared type '{declared}'")]
    IncompatibleOperator { operator: String, declared: String },
}
