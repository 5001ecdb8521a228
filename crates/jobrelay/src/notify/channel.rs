//! Notifier trait and the alert it delivers.

use async_trait::async_trait;

use crate::categorizer::Source;
use crate::config::Mode;

use super::error::Result;

/// A new application to announce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub source: Source,
    /// Applicant display name.
    pub name: String,
    /// Link to the application. Empty when none was found.
    pub url: String,
}

impl Alert {
    pub fn new(source: Source, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            source,
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn has_url(&self) -> bool {
        !self.url.is_empty()
    }
}

/// Outcome of a notification attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Not sent because the channel lacks configuration for the mode.
    Skipped(String),
}

/// A chat platform that can announce an alert.
///
/// One HTTP request per call, no retry. `mode` picks the destination.
#[async_trait(?Send)]
pub trait Notifier {
    /// Channel name, used in logs and error reports.
    fn name(&self) -> &str;

    async fn notify(&self, mode: Mode, alert: &Alert) -> Result<Delivery>;
}
