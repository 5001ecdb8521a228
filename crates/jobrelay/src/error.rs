use thiserror::Error;

use crate::email::{EmailError, ScanError};
use crate::notify::NotifyError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Mailbox error: {0}")]
    Email(#[from] EmailError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),
}

impl From<ScanError> for RelayError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Store(e) => RelayError::Store(e),
            ScanError::Email(e) => RelayError::Email(e),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Required environment variable '{name}' is not set")]
    MissingVar { name: String },

    #[error("Environment variable '{name}' has invalid value '{value}': {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, RelayError>;
