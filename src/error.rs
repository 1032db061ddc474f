//! Error types for geolayers.

use geolayers_types::id::CategoryId;

pub type Result<T> = std::result::Result<T, LayersError>;

#[derive(Debug, thiserror::Error)]
pub enum LayersError {
    /// Id is not part of the static category tree.
    #[error("Unknown category: '{0}'")]
    UnknownCategory(CategoryId),

    #[error("Resource not found: '{0}'")]
    ResourceNotFound(String),

    #[error("Malformed point data in resource '{resource}': {reason}")]
    MalformedData { resource: String, reason: String },

    #[error("Slice index {index} out of range [{min}, {max}]")]
    OutOfRange { index: u32, min: u32, max: u32 },

    #[error("Invalid category tree: {0}")]
    InvalidTree(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LayersError {
    pub(crate) fn malformed(resource: &str, reason: impl ToString) -> Self {
        Self::MalformedData {
            resource: resource.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether the failure is confined to one category or slice.
    ///
    /// Recoverable errors degrade the affected unit to an empty dataset
    /// while the rest of the aggregation proceeds.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ResourceNotFound(_) | Self::MalformedData { .. }
        )
    }
}
