//! Error taxonomy for key lifecycle operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyError {
    /// Any failure reported by, or while talking to, the key-management service.
    #[error("{0}")]
    Service(String),

    /// Credentials file (or other local file) could not be opened, read, or written.
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid status '{0}': use 'active' or 'inactive'")]
    InvalidStatus(String),

    /// Current user or home directory could not be resolved.
    #[error("{0}")]
    Config(String),
}

impl KeyError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        KeyError::Io {
            context: context.into(),
            source,
        }
    }
}
