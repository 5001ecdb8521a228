//! The polling loop: one mailbox cycle every poll interval.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::email::{CycleReport, ImapClient, MailScanner};
use crate::error::Result;
use crate::notify::{Dispatcher, ErrorReporter, LineNotifier, SlackErrorReporter, SlackNotifier};
use crate::store::IdStore;

/// Drives [`MailScanner`] cycles against the IMAP inbox.
pub struct Poller {
    client: ImapClient,
    folder: String,
    scanner: MailScanner,
    reporter: Arc<dyn ErrorReporter>,
    poll_interval: Duration,
}

impl Poller {
    /// Wires the IMAP client, store, notifiers and error reporter from `config`.
    pub fn from_config(config: Config) -> Self {
        let reporter: Arc<dyn ErrorReporter> =
            Arc::new(SlackErrorReporter::new(config.slack.error_webhook_url.clone()));

        let dispatcher = Dispatcher::new(config.mode, reporter.clone())
            .with_notifier(SlackNotifier::new(config.slack.clone()))
            .with_notifier(LineNotifier::new(&config.line));

        let scanner = MailScanner::new(
            IdStore::new(&config.processed_ids_file),
            dispatcher,
            reporter.clone(),
            config.search_days,
        );

        let folder = config.imap.folder.clone();
        Self {
            client: ImapClient::new(config.imap),
            folder,
            scanner,
            reporter,
            poll_interval: config.poll_interval,
        }
    }

    /// Checks that the store is writable and readable.
    ///
    /// The service must not start otherwise: without a working store every
    /// cycle would notify the whole search window again.
    pub async fn verify_storage(&self) -> Result<usize> {
        let store = self.scanner.store();
        info!("Verifying storage at {}", store.path().display());

        match store.verify() {
            Ok(count) => {
                info!("Currently tracking {} processed emails", count);
                Ok(count)
            }
            Err(e) => {
                error!("Storage verification failed: {}", e);
                self.reporter
                    .report(&format!(
                        "CRITICAL: Storage verification failed at startup. Service stopped. ({})",
                        e
                    ))
                    .await;
                Err(e.into())
            }
        }
    }

    /// Runs one cycle on a fresh IMAP session. Errors are logged and reported
    /// before being returned.
    pub async fn run_once(&mut self) -> Result<CycleReport> {
        let result = self.cycle().await;

        if let Err(e) = self.client.disconnect().await {
            warn!("IMAP logout failed: {}", e);
        }

        match result {
            Ok(report) => {
                info!(
                    "Cycle done: searched={}, candidates={}, bootstrapped={}, notified={}, non_target={}, skipped={}, halted={}",
                    report.searched,
                    report.candidates,
                    report.bootstrapped,
                    report.notified,
                    report.non_target,
                    report.skipped,
                    report.halted
                );
                Ok(report)
            }
            Err(e) => {
                error!("Gmail polling error: {}", e);
                self.reporter
                    .report(&format!("Gmail polling error: {}", e))
                    .await;
                Err(e)
            }
        }
    }

    async fn cycle(&mut self) -> Result<CycleReport> {
        // A corrupted store aborts the cycle before the mailbox is opened.
        let ids = self.scanner.store().load()?;

        self.client.connect().await?;
        self.client.examine_folder(&self.folder).await?;
        let today = Local::now().date_naive();
        Ok(self
            .scanner
            .run_cycle_with(&mut self.client, ids, today)
            .await?)
    }

    /// Verifies storage, then polls until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = tx.send(true);
            }
        });
        self.run_until(rx).await
    }

    /// Verifies storage, then polls until `shutdown` turns true. A request
    /// that arrives during a cycle is honored at the next sleep. Cycle errors
    /// never stop the loop.
    pub async fn run_until(mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        self.verify_storage().await?;
        info!(
            "Starting Gmail polling with poll interval {}s",
            self.poll_interval.as_secs()
        );

        loop {
            let _ = self.run_once().await;

            if *shutdown.borrow_and_update() {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        // Sender gone: nothing can request shutdown any more.
                        tokio::time::sleep(self.poll_interval).await;
                    } else if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Shutdown requested, stopping poller");
        Ok(())
    }
}
