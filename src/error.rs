use thiserror::Error;

/// Errors from the external transcription and generation services
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Source material too large: {length} characters (max: {max_length})")]
    SourceTooLarge { length: usize, max_length: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Credential lookup errors
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid credential data: {0}")]
    InvalidData(String),
}
