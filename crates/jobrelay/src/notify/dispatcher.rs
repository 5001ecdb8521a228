//! Fans an alert out to every configured channel.

use std::sync::Arc;

use tracing::{error, info};

use crate::config::Mode;

use super::channel::{Alert, Delivery, Notifier};
use super::reporter::ErrorReporter;

/// Counts of per-channel outcomes for one alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Sends alerts to each notifier in turn.
///
/// A failing channel is logged and reported, never propagated: the other
/// channels still get their attempt and the caller carries on.
pub struct Dispatcher {
    mode: Mode,
    notifiers: Vec<Box<dyn Notifier>>,
    reporter: Arc<dyn ErrorReporter>,
}

impl Dispatcher {
    pub fn new(mode: Mode, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            mode,
            notifiers: Vec::new(),
            reporter,
        }
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifiers.push(Box::new(notifier));
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub async fn dispatch(&self, alert: &Alert) -> DispatchSummary {
        let mut summary = DispatchSummary::default();

        for notifier in &self.notifiers {
            match notifier.notify(self.mode, alert).await {
                Ok(Delivery::Sent) => summary.sent += 1,
                Ok(Delivery::Skipped(reason)) => {
                    info!("{} notification skipped: {}", notifier.name(), reason);
                    summary.skipped += 1;
                }
                Err(e) => {
                    error!("{} notify failed: {}", notifier.name(), e);
                    self.reporter
                        .report(&format!("{} notify failed: {}", notifier.name(), e))
                        .await;
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}
