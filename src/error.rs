//! Error handling for the transfer admin client

use std::fmt;
use thiserror::Error;

/// Unified error type for the admin client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors that are not connectivity failures
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend answered 401; the session has already been torn down
    #[error("Unauthorized: session cleared")]
    Unauthorized,

    /// Authentication was refused before anything was stored
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The backend rejected the request
    #[error("API error ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    /// No response was received from the backend
    #[error("Connection error: {0}")]
    Connection(String),

    /// Client-side validation failed, the request was never sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Push permission, token or delivery errors
    #[error("Push error: {0}")]
    Push(String),

    /// Session storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Spreadsheet export errors
    #[error("Export error: {0}")]
    Export(String),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new push error
    pub fn push<T: fmt::Display>(msg: T) -> Self {
        Error::Push(msg.to_string())
    }

    /// Create a new storage error
    pub fn storage<T: fmt::Display>(msg: T) -> Self {
        Error::Storage(msg.to_string())
    }

    /// Create a new export error
    pub fn export<T: fmt::Display>(msg: T) -> Self {
        Error::Export(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// HTTP status carried by the error, if the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Unauthorized => Some(401),
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Text to show the operator for a failed action.
    ///
    /// Server-provided messages and validation messages are shown verbatim,
    /// everything else falls back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Error::Validation(msg) | Error::Auth(msg) => msg.clone(),
            Error::Api {
                message: Some(msg), ..
            } => msg.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for Error {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Error::Export(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
