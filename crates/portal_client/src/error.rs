use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend could not be reached or the response could not be read.
    #[error("{0}")]
    Transport(String),

    /// Non-2xx response. Displays as the backend-provided message.
    #[error("{message}")]
    Http { status: StatusCode, message: String },

    #[error("Failed to decode response from {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("{0}")]
    Invariant(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 401 responses, which usually mean the stored credential is stale.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
