pub mod categorizer;
pub mod config;
pub mod email;
pub mod error;
pub mod logging;
pub mod notify;
pub mod secrets;
pub mod store;
pub mod worker;

pub use categorizer::{classify, extract_payload_url, Classification, Source};
pub use config::{Config, Mode};
pub use email::{EmailError, FetchOutcome, ImapClient, Mailbox, MailScanner};
pub use error::{ConfigError, RelayError, Result};
pub use notify::{Alert, Dispatcher, ErrorReporter, Notifier, NotifyError};
pub use store::{IdStore, Identity, ProcessedIds, StoreError, Token};
pub use worker::Poller;
