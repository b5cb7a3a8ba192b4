use serde::Serialize;
use thiserror::Error;

/// All possible errors in the nuclear data lookups
#[derive(Error, Debug)]
pub enum NdsError {
    /// Configuration-shaped problem: bad override, misconfigured default path,
    /// unknown quantity name, or no database configured.
    #[error("{message}")]
    InvalidParams {
        message: String,
        details: InvalidParamsDetails,
    },

    #[error("Table '{table}' is missing columns: {missing}", missing = .missing.join(", "))]
    SchemaMismatch { table: String, missing: Vec<String> },

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Query task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Structured payload attached to [`NdsError::InvalidParams`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InvalidParamsDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub how_to: Option<String>,
}

impl NdsError {
    pub fn invalid_params(message: impl Into<String>, details: InvalidParamsDetails) -> Self {
        NdsError::InvalidParams {
            message: message.into(),
            details,
        }
    }

    pub fn is_invalid_params(&self) -> bool {
        matches!(self, NdsError::InvalidParams { .. })
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, NdsError>;
