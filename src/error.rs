//! Error types
//!
//! Every failure a module can report falls into one of two buckets: bad input
//! (caught before the API is touched) or a failed call against Zoho Books.

use thiserror::Error;

/// Zoho `code` for "resource does not exist"
pub const ZOHO_CODE_NOT_FOUND: i64 = 1004;

/// Errors surfaced by module execution
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid input
    #[error("{0}")]
    Configuration(String),

    /// Non-2xx response, non-zero Zoho `code`, or transport failure
    #[error("{message}")]
    Remote {
        /// HTTP status, absent for transport failures
        status: Option<u16>,
        /// Zoho application code from the response envelope
        code: Option<i64>,
        message: String,
    },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            code: None,
            message: message.into(),
        }
    }

    pub fn api(status: u16, code: Option<i64>, message: impl Into<String>) -> Self {
        Self::Remote {
            status: Some(status),
            code,
            message: message.into(),
        }
    }

    /// HTTP status carried by a remote error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => *status,
            Self::Configuration(_) => None,
        }
    }

    /// Whether the API reported that the resource does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Remote { status, code, .. } => {
                *status == Some(404) || *code == Some(ZOHO_CODE_NOT_FOUND)
            }
            Self::Configuration(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
