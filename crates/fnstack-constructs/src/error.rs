use fnstack_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConstructError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("no entry file for layer '{layer}' in {}", dir.display())]
    LayerEntryNotFound { layer: String, dir: PathBuf },

    #[error("failed to bundle layer '{layer}': {message}")]
    Bundle { layer: String, message: String },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode layer manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

impl ConstructError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| ConstructError::Io { path, source }
    }
}
