use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the gallery uploader.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("token refresh rejected: {status} {message}")]
    TokenRefresh { status: StatusCode, message: String },
    #[error("youtube request failed: {status} {message}")]
    YouTube { status: StatusCode, message: String },
    #[error("drive request failed: {status} {message}")]
    Drive { status: StatusCode, message: String },
    #[error("upload session response carried no resumable session URI")]
    MissingSessionUri,
    #[error("upload interrupted: {status} {message}")]
    UploadInterrupted { status: StatusCode, message: String },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bounded view of a remote error body, for error messages.
pub(crate) fn snippet(body: &str) -> String {
    body.chars().take(200).collect()
}
