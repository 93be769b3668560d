//! Error types for the dashboard layer.

use thiserror::Error;

/// Dashboard errors.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("API error: {0}")]
    Api(#[from] outlet_dashboard_client::ClientError),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Access denied: {0}")]
    Access(#[from] crate::state::AccessError),

    #[error("Export error: {0}")]
    Export(#[from] crate::export::ExportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DashboardError {
    /// Message shown inline on the affected screen.
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for dashboard operations.
pub type DashboardResult<T> = Result<T, DashboardError>;
