//! Error types for the Supabase client.

use thiserror::Error;

/// Result type for Supabase client operations.
pub type Result<T> = std::result::Result<T, SupabaseError>;

/// Supabase client errors.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// Configuration error (missing URL or key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request never produced a response (connection refused, timeout, DNS)
    #[error("Network error: {0}")]
    Network(String),

    /// Supabase answered with a non-2xx status
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The response body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

impl SupabaseError {
    /// HTTP status of an API error, if there was a response at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            SupabaseError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SupabaseError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SupabaseError::Parse(err.to_string())
        } else {
            SupabaseError::Network(err.to_string())
        }
    }
}
