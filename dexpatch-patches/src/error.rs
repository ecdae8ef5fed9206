use thiserror::Error;

/// Failures that abort a patch run.
///
/// Call sites that cannot be rewritten safely are not errors; they show up
/// as skips in the [`TransformReport`](crate::TransformReport).
#[derive(Debug, Error)]
pub enum PatchError {
    /// The in-place replace primitive rejected a constant load.
    #[error("{method}: failed to replace instruction {index}: {source}")]
    Replace {
        method: String,
        index: usize,
        #[source]
        source: dexpatch_ir::Error,
    },

    #[error("unknown patch `{0}`")]
    UnknownPatch(String),

    #[error("invalid patch options: {0}")]
    Options(#[from] serde_yaml::Error),

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, PatchError>;
