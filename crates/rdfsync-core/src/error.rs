use std::path::PathBuf;

use thiserror::Error;

/// Failure to translate between a file path and a context IRI.
///
/// None of these are fatal: a path that does not map is simply not synced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("{path} is not under {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("{path} has an unrecognized extension")]
    UnknownExtension { path: PathBuf },

    #[error("{path} is not valid UTF-8")]
    NonUtf8Path { path: PathBuf },

    #[error("{iri} is not a valid IRI: {reason}")]
    InvalidIri { iri: String, reason: String },

    #[error("context {context} does not start with prefix {prefix}")]
    PrefixMismatch { context: String, prefix: String },

    #[error("context {context} does not end with #context")]
    MissingContextSuffix { context: String },

    #[error("context {context} names a path outside the root")]
    EscapesRoot { context: String },
}
