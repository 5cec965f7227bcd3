use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Authentication failed at step '{step}': {message}")]
    Auth { step: &'static str, message: String },

    #[error("Navigation failed: {message}")]
    Navigation { message: String },

    #[error("Element not found: {locator}")]
    ElementNotFound { locator: String },

    #[error("Timed out waiting for: {locator}")]
    WaitTimeout { locator: String },
}

pub type Result<T> = std::result::Result<T, SyncError>;
