use axum::http::StatusCode;
use thiserror::Error;

/// Main error type for the stats service
#[derive(Error, Debug)]
pub enum StatsError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote store error ({status}): {message}")]
    Store { status: u16, message: String },

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Lookup errors
    #[error("Not found: {0}")]
    NotFound(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for StatsError
pub type Result<T> = std::result::Result<T, StatsError>;

impl StatsError {
    /// True for failures of the remote store or the transport in front of it.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            StatsError::Http(_) | StatsError::Store { .. } | StatsError::UpstreamUnavailable(_)
        )
    }

    /// HTTP status used when this error reaches the API boundary
    pub fn status_code(&self) -> StatusCode {
        match self {
            StatsError::NotFound(_) => StatusCode::NOT_FOUND,
            StatsError::Validation(_) => StatusCode::BAD_REQUEST,
            StatsError::Http(_) | StatsError::UpstreamUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            StatsError::Store { .. } | StatsError::Json(_) => StatusCode::BAD_GATEWAY,
            StatsError::Config(_)
            | StatsError::Io(_)
            | StatsError::Internal(_)
            | StatsError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StatsError> for (StatusCode, String) {
    fn from(err: StatsError) -> Self {
        (err.status_code(), err.to_string())
    }
}
