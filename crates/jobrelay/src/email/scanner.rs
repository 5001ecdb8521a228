//! One polling cycle: find unseen mail, notify once per message, record it.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use thiserror::Error;
use tracing::{debug, error, info, info_span, warn};

use crate::categorizer::{classify, extract_payload_url};
use crate::notify::{Alert, Dispatcher, ErrorReporter};
use crate::store::{IdStore, Identity, ProcessedIds, StoreError};

use super::error::EmailError;
use super::mailbox::{FetchOutcome, Mailbox};
use super::parser::ParsedMessage;

/// Errors that abort a whole cycle.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Email(#[from] EmailError),
}

pub type Result<T> = std::result::Result<T, ScanError>;

/// What a cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// UIDs returned by the date search.
    pub searched: usize,
    /// UIDs whose `uid:` token was not yet stored.
    pub candidates: usize,
    /// Already-notified messages that only gained a `uid:` token.
    pub bootstrapped: usize,
    /// Messages that were dispatched.
    pub notified: usize,
    /// Messages recorded without dispatch because they are not applications.
    pub non_target: usize,
    /// Messages whose identity was already stored; only the UID was recorded.
    pub already_known: usize,
    /// Messages left unrecorded (no body or no identity).
    pub skipped: usize,
    /// A save failed and the rest of the cycle was abandoned.
    pub halted: bool,
}

/// What to do with one fully fetched message.
enum Verdict {
    Skip,
    AlreadyKnown(Identity),
    Record(Identity),
}

/// Runs polling cycles against a mailbox and the processed-id store.
pub struct MailScanner {
    store: IdStore,
    dispatcher: Dispatcher,
    reporter: Arc<dyn ErrorReporter>,
    search_days: u32,
}

impl MailScanner {
    pub fn new(
        store: IdStore,
        dispatcher: Dispatcher,
        reporter: Arc<dyn ErrorReporter>,
        search_days: u32,
    ) -> Self {
        Self {
            store,
            dispatcher,
            reporter,
            search_days,
        }
    }

    pub fn store(&self) -> &IdStore {
        &self.store
    }

    /// First day of the search window for a cycle running on `today`.
    pub fn since(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(Days::new(u64::from(self.search_days)))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Loads the store and runs one cycle.
    pub async fn run_cycle<M: Mailbox>(
        &self,
        mailbox: &mut M,
        today: NaiveDate,
    ) -> Result<CycleReport> {
        // A corrupted store aborts the cycle before anything is fetched.
        let ids = self.store.load()?;
        self.run_cycle_with(mailbox, ids, today).await
    }

    /// Runs one cycle starting from `ids`, freshly loaded from the store.
    ///
    /// A notification is sent before its identity is persisted, so a crash in
    /// between may repeat it once; a message is never recorded unnotified.
    pub async fn run_cycle_with<M: Mailbox>(
        &self,
        mailbox: &mut M,
        mut ids: ProcessedIds,
        today: NaiveDate,
    ) -> Result<CycleReport> {
        let _span = info_span!("mail_cycle", mode = %self.dispatcher.mode()).entered();
        let mut report = CycleReport::default();

        let uids = mailbox.search_since(self.since(today)).await?;
        report.searched = uids.len();
        info!("Emails in last {} days: {}", self.search_days, uids.len());

        let candidates: Vec<u32> = uids
            .into_iter()
            .filter(|uid| !ids.contains_uid(*uid))
            .collect();
        report.candidates = candidates.len();
        if candidates.is_empty() {
            return Ok(report);
        }
        info!("UIDs not in cache: {}", candidates.len());

        let truly_new = self.bootstrap(mailbox, &mut ids, candidates, &mut report).await?;
        if !truly_new.is_empty() {
            info!("Truly new emails to process: {}", truly_new.len());
        }

        for uid in truly_new {
            let verdict = self.process(mailbox, &ids, uid, &mut report).await?;
            let identity = match verdict {
                Verdict::Skip => continue,
                Verdict::AlreadyKnown(identity) | Verdict::Record(identity) => identity,
            };

            ids.commit(&identity, uid);
            if let Err(e) = self.store.save(&ids) {
                error!("Stopping mail processing due to save failure: {}", e);
                self.reporter
                    .report(&format!("Failed to save processed IDs, processing stopped: {}", e))
                    .await;
                report.halted = true;
                break;
            }
        }

        Ok(report)
    }

    /// Splits candidates into already-notified messages, which only gain a
    /// `uid:` token, and truly new ones.
    async fn bootstrap<M: Mailbox>(
        &self,
        mailbox: &mut M,
        ids: &mut ProcessedIds,
        candidates: Vec<u32>,
        report: &mut CycleReport,
    ) -> Result<Vec<u32>> {
        let mut truly_new = Vec::new();
        let mut to_mark = Vec::new();

        for uid in candidates {
            let known = mailbox
                .fetch_provider_id(uid)
                .await?
                .is_some_and(|id| ids.contains_identity(&Identity::Gm(id)));
            if known {
                to_mark.push(uid);
            } else {
                truly_new.push(uid);
            }
        }

        if !to_mark.is_empty() {
            info!(
                "Bootstrapping {} UIDs for already-processed emails",
                to_mark.len()
            );
            for uid in &to_mark {
                ids.insert_uid(*uid);
            }
            self.store.save(ids).map_err(|e| {
                error!("Failed to save bootstrapped UIDs: {}", e);
                e
            })?;
            report.bootstrapped = to_mark.len();
        }

        Ok(truly_new)
    }

    /// Fetches one message and notifies when it is a new application.
    async fn process<M: Mailbox>(
        &self,
        mailbox: &mut M,
        ids: &ProcessedIds,
        uid: u32,
        report: &mut CycleReport,
    ) -> Result<Verdict> {
        let (provider_id, raw) = match mailbox.fetch_message(uid).await? {
            FetchOutcome::WithProviderId { provider_id, raw } => (Some(provider_id), raw),
            FetchOutcome::WithoutProviderId { raw } => (None, raw),
            FetchOutcome::NotFound => {
                error!("Failed to fetch body for uid={}", uid);
                report.skipped += 1;
                return Ok(Verdict::Skip);
            }
        };

        let message = ParsedMessage::parse(&raw);
        let Some(identity) = Identity::derive(provider_id, message.message_id.as_deref()) else {
            error!(
                "No unique ID found for uid={}, skipping to prevent duplicates",
                uid
            );
            report.skipped += 1;
            return Ok(Verdict::Skip);
        };

        if ids.contains_identity(&identity) {
            debug!("uid={} already processed as {}", uid, identity);
            report.already_known += 1;
            return Ok(Verdict::AlreadyKnown(identity));
        }

        let classification = classify(&message.subject);
        let Some(source) = classification.source else {
            info!(
                "Skip non-target mail: {}...",
                message.subject.chars().take(50).collect::<String>()
            );
            report.non_target += 1;
            return Ok(Verdict::Record(identity));
        };

        let url = match classification.default_url {
            Some(url) => url.to_string(),
            None => extract_payload_url(&message.html, source),
        };
        let alert = Alert::new(source, message.sender_name(), url);
        info!(
            "Notify {}: {}, url={}, id={}",
            source, alert.name, alert.url, identity
        );

        let summary = self.dispatcher.dispatch(&alert).await;
        if summary.sent == 0 {
            warn!("No channel delivered the alert for {}", identity);
        }
        report.notified += 1;

        Ok(Verdict::Record(identity))
    }
}
