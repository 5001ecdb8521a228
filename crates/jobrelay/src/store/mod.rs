//! Durable set of identifiers for messages that already produced a
//! notification.

pub mod error;
pub mod file;
pub mod processed;
pub mod token;

pub use error::StoreError;
pub use file::IdStore;
pub use processed::{migrate, ProcessedIds};
pub use token::{uid_token, Identity, Token};
