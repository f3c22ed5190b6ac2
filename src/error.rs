use std::path::PathBuf;

use ixa::IxaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// A parameter set that would silently produce meaningless trajectories.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("failed to export {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: Box<ModelError>,
    },
}

impl ModelError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ModelError::InvalidParameters(msg.into())
    }
}

impl From<ModelError> for IxaError {
    fn from(error: ModelError) -> Self {
        IxaError::IxaError(error.to_string())
    }
}
