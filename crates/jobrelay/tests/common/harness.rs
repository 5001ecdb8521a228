//! Test harness for running mail cycles in isolation.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use tempfile::TempDir;

use jobrelay::email::error::{EmailError, Result as EmailResult};
use jobrelay::email::{CycleReport, ScanError};
use jobrelay::notify::error::{NotifyError, Result as NotifyResult};
use jobrelay::notify::Delivery;
use jobrelay::{
    Alert, Dispatcher, ErrorReporter, FetchOutcome, IdStore, MailScanner, Mailbox, Mode, Notifier,
    ProcessedIds,
};

/// A message as the fake server holds it.
#[derive(Debug, Clone)]
pub struct FakeMessage {
    pub provider_id: Option<u64>,
    pub raw: Option<Vec<u8>>,
}

/// In-memory mailbox keyed by UID. Records which fetches were made.
#[derive(Debug, Default)]
pub struct FakeMailbox {
    pub messages: BTreeMap<u32, FakeMessage>,
    pub light_fetches: Vec<u32>,
    pub full_fetches: Vec<u32>,
    pub fail_search: bool,
}

impl FakeMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, uid: u32, provider_id: Option<u64>, raw: Vec<u8>) -> Self {
        self.messages.insert(
            uid,
            FakeMessage {
                provider_id,
                raw: Some(raw),
            },
        );
        self
    }

    /// A UID the search returns but whose body cannot be fetched.
    pub fn with_missing_body(mut self, uid: u32, provider_id: Option<u64>) -> Self {
        self.messages.insert(
            uid,
            FakeMessage {
                provider_id,
                raw: None,
            },
        );
        self
    }

    /// Moves a message to a new UID, as after a folder rebuild.
    pub fn renumber(&mut self, from: u32, to: u32) {
        if let Some(message) = self.messages.remove(&from) {
            self.messages.insert(to, message);
        }
    }

    pub fn reset_counters(&mut self) {
        self.light_fetches.clear();
        self.full_fetches.clear();
    }
}

#[async_trait(?Send)]
impl Mailbox for FakeMailbox {
    async fn search_since(&mut self, _since: NaiveDate) -> EmailResult<Vec<u32>> {
        if self.fail_search {
            return Err(EmailError::ProtocolError("connection reset".to_string()));
        }
        Ok(self.messages.keys().copied().collect())
    }

    async fn fetch_provider_id(&mut self, uid: u32) -> EmailResult<Option<u64>> {
        self.light_fetches.push(uid);
        Ok(self.messages.get(&uid).and_then(|m| m.provider_id))
    }

    async fn fetch_message(&mut self, uid: u32) -> EmailResult<FetchOutcome> {
        self.full_fetches.push(uid);
        Ok(match self.messages.get(&uid) {
            Some(message) => FetchOutcome::new(message.provider_id, message.raw.clone()),
            None => FetchOutcome::NotFound,
        })
    }
}

/// One delivered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub channel: String,
    pub mode: Mode,
    pub alert: Alert,
}

type Hook = Box<dyn Fn()>;

/// Records every alert it receives; can be told to fail or to run a hook.
pub struct RecordingNotifier {
    name: String,
    sent: Arc<Mutex<Vec<Sent>>>,
    fail: bool,
    on_notify: Option<Hook>,
}

impl RecordingNotifier {
    pub fn new(name: &str, sent: Arc<Mutex<Vec<Sent>>>) -> Self {
        Self {
            name: name.to_string(),
            sent,
            fail: false,
            on_notify: None,
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn on_notify(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_notify = Some(Box::new(hook));
        self
    }
}

#[async_trait(?Send)]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn notify(&self, mode: Mode, alert: &Alert) -> NotifyResult<Delivery> {
        if let Some(hook) = &self.on_notify {
            hook();
        }
        if self.fail {
            return Err(NotifyError::Status {
                status: 500,
                body: "internal error".to_string(),
            });
        }
        self.sent.lock().unwrap().push(Sent {
            channel: self.name.clone(),
            mode,
            alert: alert.clone(),
        });
        Ok(Delivery::Sent)
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    pub reports: Mutex<Vec<String>>,
}

#[async_trait(?Send)]
impl ErrorReporter for RecordingReporter {
    async fn report(&self, message: &str) {
        self.reports.lock().unwrap().push(message.to_string());
    }
}

/// Isolated environment: a temp store plus recording channels.
pub struct RelayHarness {
    temp_dir: TempDir,
    pub store_path: PathBuf,
    pub mode: Mode,
    pub sent: Arc<Mutex<Vec<Sent>>>,
    pub reporter: Arc<RecordingReporter>,
}

impl RelayHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store_path = temp_dir.path().join("state").join("processed_ids.json");
        Self {
            temp_dir,
            store_path,
            mode: Mode::Production,
            sent: Arc::new(Mutex::new(Vec::new())),
            reporter: Arc::new(RecordingReporter::default()),
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn store(&self) -> IdStore {
        IdStore::new(&self.store_path)
    }

    pub fn seed(&self, tokens: &[&str]) {
        let ids: ProcessedIds = tokens.iter().copied().collect();
        self.store().save(&ids).expect("Failed to seed store");
    }

    pub fn write_raw_store(&self, content: &str) {
        std::fs::create_dir_all(self.store_path.parent().unwrap()).unwrap();
        std::fs::write(&self.store_path, content).expect("Failed to write store");
    }

    pub fn stored(&self) -> ProcessedIds {
        self.store().load().expect("Failed to load store")
    }

    pub fn slack(&self) -> RecordingNotifier {
        RecordingNotifier::new("Slack", self.sent.clone())
    }

    pub fn line(&self) -> RecordingNotifier {
        RecordingNotifier::new("LINE", self.sent.clone())
    }

    /// A scanner wired to the given notifiers.
    pub fn scanner_with(&self, notifiers: Vec<RecordingNotifier>) -> MailScanner {
        let reporter: Arc<dyn ErrorReporter> = self.reporter.clone();
        let mut dispatcher = Dispatcher::new(self.mode, reporter.clone());
        for notifier in notifiers {
            dispatcher = dispatcher.with_notifier(notifier);
        }
        MailScanner::new(self.store(), dispatcher, reporter, 7)
    }

    /// A scanner wired to recording Slack and LINE notifiers.
    pub fn scanner(&self) -> MailScanner {
        self.scanner_with(vec![self.slack(), self.line()])
    }

    pub async fn run(&self, mailbox: &mut FakeMailbox) -> Result<CycleReport, ScanError> {
        self.scanner().run_cycle(mailbox, today()).await
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn reports(&self) -> Vec<String> {
        self.reporter.reports.lock().unwrap().clone()
    }
}

impl Default for RelayHarness {
    fn default() -> Self {
        Self::new()
    }
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
}
