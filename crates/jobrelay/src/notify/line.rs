//! LINE Messaging API push notifier.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{info, warn};

use crate::categorizer::Source;
use crate::config::{Destinations, LineSettings, Mention, Mode};

use super::channel::{Alert, Delivery, Notifier};
use super::error::{check_status, Result};

pub const LINE_PUSH_URL: &str = "https://api.line.me/v2/bot/message/push";

#[derive(Debug, Serialize, PartialEq)]
pub struct PushRequest {
    pub to: String,
    pub messages: Vec<TextV2Message>,
}

/// A `textV2` message; `{key}` placeholders in `text` are replaced by the
/// matching `substitution` entries.
#[derive(Debug, Serialize, PartialEq)]
pub struct TextV2Message {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
    pub substitution: BTreeMap<String, Substitution>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Substitution {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mentionee: Mentionee,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Mentionee {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(rename = "userId")]
    pub user_id: String,
}

pub struct LineNotifier {
    client: Client,
    access_token: Option<SecretString>,
    recipients: Destinations<String>,
    mentions: Vec<Mention>,
}

impl LineNotifier {
    pub fn new(settings: &LineSettings) -> Self {
        Self {
            client: Client::new(),
            access_token: settings
                .access_token
                .as_ref()
                .map(|token| SecretString::from(token.expose_secret())),
            recipients: settings.recipients.clone(),
            mentions: settings.mentions.clone(),
        }
    }

    /// Builds the push request body for `alert`.
    pub fn build_request(&self, mode: Mode, to: &str, alert: &Alert) -> PushRequest {
        let title = match alert.source {
            Source::Indeed => "Indeedに応募がありました。",
            Source::Jimoty => "ジモティーで新着があります。",
        };

        let mut lines = vec![format!("【{}】 さんから{}", alert.name, title)];
        if alert.has_url() {
            lines.push(String::new());
            lines.push("詳細はこちら:".to_string());
            lines.push(alert.url.clone());
        }
        let base_message = mode.decorate(&lines.join("\n"));

        let placeholders: Vec<String> = self
            .mentions
            .iter()
            .map(|m| format!("{{{}}}", m.key))
            .collect();
        let substitution = self
            .mentions
            .iter()
            .map(|m| {
                (
                    m.key.clone(),
                    Substitution {
                        kind: "mention",
                        mentionee: Mentionee {
                            kind: "user",
                            user_id: m.user_id.clone(),
                        },
                    },
                )
            })
            .collect();

        let text = if placeholders.is_empty() {
            base_message
        } else {
            format!("{} {}", placeholders.join(" "), base_message)
        };

        PushRequest {
            to: to.to_string(),
            messages: vec![TextV2Message {
                kind: "textV2",
                text,
                substitution,
            }],
        }
    }
}

#[async_trait(?Send)]
impl Notifier for LineNotifier {
    fn name(&self) -> &str {
        "LINE"
    }

    async fn notify(&self, mode: Mode, alert: &Alert) -> Result<Delivery> {
        let (Some(token), Some(to)) = (&self.access_token, self.recipients.for_mode(mode)) else {
            warn!(
                "LINE token or LINE_TO_ID_{} missing",
                mode.env_suffix()
            );
            return Ok(Delivery::Skipped("LINE token or recipient missing".to_string()));
        };

        if self.mentions.is_empty() {
            warn!("LINE mention IDs not configured; sending without mentions");
        }

        let body = self.build_request(mode, to, alert);
        let response = self
            .client
            .post(LINE_PUSH_URL)
            .bearer_auth(token.expose_secret())
            .json(&body)
            .send()
            .await?;
        info!("LINE API response: status={}", response.status());
        check_status(response).await?;

        Ok(Delivery::Sent)
    }
}
