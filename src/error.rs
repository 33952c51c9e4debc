use thiserror::Error;

/// Main error type for the planning pipeline
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Stage `{stage}` failed: {message}")]
    Stage { stage: String, message: String },

    #[error("Rate limit exceeded: retry after {retry_after}s")]
    RateLimit { retry_after: u64 },

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PlannerError>;

impl PlannerError {
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        PlannerError::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Get the error code for structured responses
    pub fn error_code(&self) -> &'static str {
        match self {
            PlannerError::Config(_) => "CONFIG_ERROR",
            PlannerError::Http(_) => "HTTP_ERROR",
            PlannerError::Serialization(_) => "SERIALIZATION_ERROR",
            PlannerError::Validation(_) => "VALIDATION_ERROR",
            PlannerError::Stage { .. } => "STAGE_ERROR",
            PlannerError::RateLimit { .. } => "RATE_LIMIT_ERROR",
            PlannerError::Unknown(_) => "UNKNOWN_ERROR",
        }
    }
}
