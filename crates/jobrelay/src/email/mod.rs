//! Mailbox access and the polling cycle that turns new mail into alerts.

pub mod client;
pub mod error;
pub mod mailbox;
pub mod parser;
pub mod scanner;

pub use client::ImapClient;
pub use error::EmailError;
pub use mailbox::{FetchOutcome, Mailbox};
pub use parser::ParsedMessage;
pub use scanner::{CycleReport, MailScanner, ScanError};
