use thiserror::Error;

use crate::kernel::MissingRecord;

/// Failures while refreshing one industry's insights
#[derive(Debug, Error)]
pub enum InsightsError {
    /// The model request failed (network, API, quota)
    #[error("Model call failed: {0}")]
    ModelCall(String),

    /// The model answered without a candidate or text
    #[error("Unexpected model response shape: {0}")]
    ResponseShape(String),

    /// The cleaned response text is not the expected JSON object
    #[error("Failed to parse model response as insights JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// `demandLevel` or `marketOutlook` is missing or not an accepted value
    #[error("Invalid {field}: {reason}")]
    Normalization { field: &'static str, reason: String },

    /// Reading from or writing to storage failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// The industry has no storage record to overwrite
    #[error("Storage error: no industry insight record for '{0}'")]
    MissingRecord(String),
}

impl InsightsError {
    pub(crate) fn storage(err: anyhow::Error) -> Self {
        match err.downcast_ref::<MissingRecord>() {
            Some(MissingRecord(industry)) => InsightsError::MissingRecord(industry.clone()),
            None => InsightsError::Storage(format!("{:#}", err)),
        }
    }

    /// Whether retrying the same external call can help
    pub fn is_transient(&self) -> bool {
        matches!(self, InsightsError::ModelCall(_) | InsightsError::Storage(_))
    }
}

pub type Result<T> = std::result::Result<T, InsightsError>;
