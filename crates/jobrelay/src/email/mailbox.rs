//! The mailbox operations a polling cycle needs.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::Result;

/// Result of fetching a full message by UID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The server returned the message and its Gmail message id.
    WithProviderId { provider_id: u64, raw: Vec<u8> },
    /// The server returned the message but no Gmail message id.
    WithoutProviderId { raw: Vec<u8> },
    /// No message (or no body) for this UID.
    NotFound,
}

impl FetchOutcome {
    pub fn new(provider_id: Option<u64>, raw: Option<Vec<u8>>) -> Self {
        match (provider_id, raw) {
            (_, None) => FetchOutcome::NotFound,
            (Some(provider_id), Some(raw)) => FetchOutcome::WithProviderId { provider_id, raw },
            (None, Some(raw)) => FetchOutcome::WithoutProviderId { raw },
        }
    }
}

/// A read-only view of one mailbox folder, addressed by UID.
///
/// Implementations must never change message flags.
#[async_trait(?Send)]
pub trait Mailbox {
    /// UIDs of messages received on or after `since`, in server order.
    async fn search_since(&mut self, since: NaiveDate) -> Result<Vec<u32>>;

    /// Fetches only the Gmail message id for `uid`.
    async fn fetch_provider_id(&mut self, uid: u32) -> Result<Option<u64>>;

    /// Fetches the provider id and the full raw message for `uid`.
    async fn fetch_message(&mut self, uid: u32) -> Result<FetchOutcome>;
}
