use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

/// Prefix added to every chat message in test mode.
pub const TEST_MODE_PREFIX: &str = "【テストバージョン】";

/// Selects which destinations receive notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    Test,
    #[default]
    Production,
}

impl Mode {
    /// `test` (any case) selects test mode; everything else is production.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("test") {
            Mode::Test
        } else {
            Mode::Production
        }
    }

    /// Marks a message as test traffic when running in test mode.
    pub fn decorate(&self, message: &str) -> String {
        match self {
            Mode::Test => format!("{}\n{}", TEST_MODE_PREFIX, message),
            Mode::Production => message.to_string(),
        }
    }

    /// Suffix used by the per-mode environment variables.
    pub fn env_suffix(&self) -> &'static str {
        match self {
            Mode::Test => "TEST",
            Mode::Production => "PROD",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Test => f.write_str("test"),
            Mode::Production => f.write_str("prod"),
        }
    }
}

/// A value configured separately for each mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Destinations<T> {
    pub test: Option<T>,
    pub production: Option<T>,
}

impl<T> Destinations<T> {
    pub fn for_mode(&self, mode: Mode) -> Option<&T> {
        match mode {
            Mode::Test => self.test.as_ref(),
            Mode::Production => self.production.as_ref(),
        }
    }
}

/// A user to mention. `key` names the LINE substitution placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub key: String,
    pub user_id: String,
}

#[derive(Debug)]
pub struct ImapSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: SecretString,
    pub folder: String,
}

#[derive(Debug, Clone, Default)]
pub struct SlackSettings {
    pub webhooks: Destinations<String>,
    /// Configured mentions only; unset ids are left out entirely.
    pub mentions: Vec<Mention>,
    pub error_webhook_url: Option<String>,
}

#[derive(Debug, Default)]
pub struct LineSettings {
    pub access_token: Option<SecretString>,
    pub recipients: Destinations<String>,
    pub mentions: Vec<Mention>,
}

/// Immutable service configuration, read once at startup.
#[derive(Debug)]
pub struct Config {
    pub imap: ImapSettings,
    pub mode: Mode,
    pub slack: SlackSettings,
    pub line: LineSettings,
    pub poll_interval: Duration,
    pub search_days: u32,
    pub log_dir: PathBuf,
    pub processed_ids_file: PathBuf,
}
