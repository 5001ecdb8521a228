//! Outbound chat notifications and the error side channel.

pub mod channel;
pub mod dispatcher;
pub mod error;
pub mod line;
pub mod reporter;
pub mod slack;

pub use channel::{Alert, Delivery, Notifier};
pub use dispatcher::{DispatchSummary, Dispatcher};
pub use error::NotifyError;
pub use line::LineNotifier;
pub use reporter::{ErrorReporter, SlackErrorReporter};
pub use slack::SlackNotifier;
