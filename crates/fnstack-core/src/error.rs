//! Error types for the template model

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Two sibling constructs share an id
    #[error("there is already a construct with id '{id}' in '{scope}'")]
    DuplicateConstruct { scope: String, id: String },

    /// Two resources render to the same logical id
    #[error("duplicate logical id '{logical_id}' in stack '{stack}'")]
    DuplicateLogicalId { stack: String, logical_id: String },

    /// The resource type cannot honour the requested removal policy
    #[error("{resource_type} does not support removal policy '{policy}'")]
    UnsupportedRemovalPolicy {
        resource_type: String,
        policy: &'static str,
    },

    #[error("unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("failed to read asset at {path}: {source}")]
    AssetIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render template: {0}")]
    Render(#[from] serde_json::Error),
}
