use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::config::schema::{
    Config, Destinations, ImapSettings, LineSettings, Mention, Mode, SlackSettings,
};
use crate::error::ConfigError;
use crate::secrets::resolve_secret;

const DEFAULT_IMAP_HOST: &str = "imap.gmail.com";
const DEFAULT_IMAP_PORT: u16 = 993;
const DEFAULT_FOLDER: &str = "INBOX";
const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 30;
const DEFAULT_SEARCH_DAYS: u32 = 7;
const DEFAULT_LOG_DIR: &str = "/tmp";
const PROCESSED_IDS_FILENAME: &str = "processed_ids.json";

/// Mention placeholders, in the order they appear in messages.
pub const MENTION_KEYS: [&str; 2] = ["inoue", "kondo"];

/// Loads the configuration from the process environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from_lookup(|name| std::env::var(name).ok())
}

/// Loads the configuration through `lookup`, which maps a variable name to
/// its value. Empty values are treated as unset.
pub fn load_config_from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let password = resolve_secret(
        get("GMAIL_IMAP_PASSWORD").as_deref(),
        get("GMAIL_IMAP_PASSWORD_FILE").as_deref(),
    )
    .map_err(|e| ConfigError::InvalidValue {
        name: "GMAIL_IMAP_PASSWORD".to_string(),
        value: "<redacted>".to_string(),
        reason: e.to_string(),
    })?;

    let imap = ImapSettings {
        host: get("GMAIL_IMAP_HOST").unwrap_or_else(|| DEFAULT_IMAP_HOST.to_string()),
        port: parse_or("GMAIL_IMAP_PORT", get("GMAIL_IMAP_PORT"), DEFAULT_IMAP_PORT)?,
        user: get("GMAIL_IMAP_USER").ok_or_else(|| ConfigError::MissingVar {
            name: "GMAIL_IMAP_USER".to_string(),
        })?,
        password,
        folder: DEFAULT_FOLDER.to_string(),
    };

    let mode = get("MODE").map(|v| Mode::parse(&v)).unwrap_or_default();

    let slack = SlackSettings {
        webhooks: Destinations {
            test: get("SLACK_WEBHOOK_URL_TEST"),
            production: get("SLACK_WEBHOOK_URL_PROD"),
        },
        mentions: mentions(&get, "SLACK"),
        error_webhook_url: get("SLACK_ERROR_WEBHOOK_URL"),
    };

    let line = LineSettings {
        access_token: get("LINE_CHANNEL_ACCESS_TOKEN").map(Into::into),
        recipients: Destinations {
            test: get("LINE_TO_ID_TEST"),
            production: get("LINE_TO_ID_PROD"),
        },
        mentions: mentions(&get, "LINE"),
    };

    let poll_seconds = parse_or(
        "POLL_INTERVAL_SECONDS",
        get("POLL_INTERVAL_SECONDS"),
        DEFAULT_POLL_INTERVAL_SECONDS,
    )?;
    let search_days = parse_or("SEARCH_DAYS", get("SEARCH_DAYS"), DEFAULT_SEARCH_DAYS)?;

    let log_dir = PathBuf::from(get("LOG_DIR").unwrap_or_else(|| DEFAULT_LOG_DIR.to_string()));
    let processed_ids_file = get("PROCESSED_IDS_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| log_dir.join(PROCESSED_IDS_FILENAME));

    Ok(Config {
        imap,
        mode,
        slack,
        line,
        poll_interval: Duration::from_secs(poll_seconds),
        search_days,
        log_dir,
        processed_ids_file,
    })
}

fn mentions<G>(get: &G, channel: &str) -> Vec<Mention>
where
    G: Fn(&str) -> Option<String>,
{
    MENTION_KEYS
        .iter()
        .filter_map(|key| {
            let var = format!("{}_MENTION_{}_ID", channel, key.to_ascii_uppercase());
            get(&var).map(|user_id| Mention {
                key: key.to_string(),
                user_id: user_id.trim().to_string(),
            })
        })
        .collect()
}

fn parse_or<T>(name: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                name: name.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("GMAIL_IMAP_USER", "jobs@example.com"),
            ("GMAIL_IMAP_PASSWORD", "app-password"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = load_config_from_lookup(lookup_from(&minimal())).unwrap();
        assert_eq!(config.imap.host, "imap.gmail.com");
        assert_eq!(config.imap.port, 993);
        assert_eq!(config.imap.password.expose_secret(), "app-password");
        assert_eq!(config.mode, Mode::Production);
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.search_days, 7);
        assert_eq!(config.log_dir, PathBuf::from("/tmp"));
        assert_eq!(
            config.processed_ids_file,
            PathBuf::from("/tmp/processed_ids.json")
        );
        assert!(config.slack.mentions.is_empty());
        assert!(config.line.access_token.is_none());
    }

    #[test]
    fn test_missing_user() {
        let result = load_config_from_lookup(lookup_from(&[("GMAIL_IMAP_PASSWORD", "x")]));
        assert!(matches!(result, Err(ConfigError::MissingVar { name }) if name == "GMAIL_IMAP_USER"));
    }

    #[test]
    fn test_missing_password() {
        let result = load_config_from_lookup(lookup_from(&[("GMAIL_IMAP_USER", "u")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_invalid_number() {
        let mut pairs = minimal();
        pairs.push(("POLL_INTERVAL_SECONDS", "soon"));
        let result = load_config_from_lookup(lookup_from(&pairs));
        assert!(
            matches!(result, Err(ConfigError::InvalidValue { name, .. }) if name == "POLL_INTERVAL_SECONDS")
        );
    }

    #[test]
    fn test_full_configuration() {
        let mut pairs = minimal();
        pairs.extend([
            ("MODE", "test"),
            ("SLACK_WEBHOOK_URL_TEST", "https://hooks.slack.com/test"),
            ("SLACK_MENTION_INOUE_ID", "U111"),
            ("LINE_CHANNEL_ACCESS_TOKEN", "line-token"),
            ("LINE_TO_ID_PROD", "Cprod"),
            ("LINE_MENTION_KONDO_ID", "Ukondo"),
            ("LOG_DIR", "/var/log/jobrelay"),
            ("SEARCH_DAYS", "3"),
        ]);
        let config = load_config_from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(config.mode, Mode::Test);
        assert_eq!(
            config.slack.webhooks.for_mode(Mode::Test).map(String::as_str),
            Some("https://hooks.slack.com/test")
        );
        assert_eq!(config.slack.webhooks.for_mode(Mode::Production), None);
        assert_eq!(
            config.slack.mentions,
            vec![Mention {
                key: "inoue".to_string(),
                user_id: "U111".to_string()
            }]
        );
        assert_eq!(config.line.mentions.len(), 1);
        assert_eq!(config.line.mentions[0].key, "kondo");
        assert_eq!(config.search_days, 3);
        assert_eq!(
            config.processed_ids_file,
            PathBuf::from("/var/log/jobrelay/processed_ids.json")
        );
    }

    #[test]
    fn test_empty_values_are_unset() {
        let mut pairs = minimal();
        pairs.push(("SLACK_WEBHOOK_URL_PROD", ""));
        let config = load_config_from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.slack.webhooks.production, None);
    }

    #[test]
    #[serial]
    fn test_load_config_from_environment() {
        std::env::set_var("GMAIL_IMAP_USER", "env-user@example.com");
        std::env::set_var("GMAIL_IMAP_PASSWORD", "env-password");
        std::env::set_var("PROCESSED_IDS_FILE", "/data/ids.json");

        let config = load_config().unwrap();
        assert_eq!(config.imap.user, "env-user@example.com");
        assert_eq!(config.processed_ids_file, PathBuf::from("/data/ids.json"));

        std::env::remove_var("GMAIL_IMAP_USER");
        std::env::remove_var("GMAIL_IMAP_PASSWORD");
        std::env::remove_var("PROCESSED_IDS_FILE");
    }
}
