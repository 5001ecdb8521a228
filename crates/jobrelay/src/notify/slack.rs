//! Slack incoming-webhook notifier.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::categorizer::Source;
use crate::config::{Mention, Mode, SlackSettings, MENTION_KEYS};

use super::channel::{Alert, Delivery, Notifier};
use super::error::{check_status, Result};

/// Incoming-webhook payload.
#[derive(Debug, Serialize)]
pub struct SlackPayload {
    pub text: String,
}

pub struct SlackNotifier {
    client: Client,
    settings: SlackSettings,
}

impl SlackNotifier {
    pub fn new(settings: SlackSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    /// Builds the message text for `alert`.
    pub fn format_message(&self, mode: Mode, alert: &Alert) -> String {
        let title = match alert.source {
            Source::Indeed => "【Indeed応募】",
            Source::Jimoty => "【ジモティー】",
        };

        let mut lines = vec![format!("{} 【{}】 さんから応募がありました。", title, alert.name)];
        if alert.has_url() {
            lines.push(String::new());
            lines.push("応募内容はこちら:".to_string());
            lines.push(alert.url.clone());
        }

        let body = lines.join("\n");
        match mention_line(&self.settings.mentions) {
            Some(mentions) => mode.decorate(&format!("{}\n{}", mentions, body)),
            None => mode.decorate(&body),
        }
    }
}

/// The mention directive, emitted only when every mention id is configured.
fn mention_line(mentions: &[Mention]) -> Option<String> {
    if mentions.len() < MENTION_KEYS.len() {
        return None;
    }
    Some(
        mentions
            .iter()
            .map(|m| format!("<@{}>", m.user_id))
            .collect::<Vec<_>>()
            .join(" "),
    )
}

#[async_trait(?Send)]
impl Notifier for SlackNotifier {
    fn name(&self) -> &str {
        "Slack"
    }

    async fn notify(&self, mode: Mode, alert: &Alert) -> Result<Delivery> {
        let Some(webhook_url) = self.settings.webhooks.for_mode(mode) else {
            warn!("SLACK_WEBHOOK_URL_{} is not set", mode.env_suffix());
            return Ok(Delivery::Skipped("no Slack webhook URL".to_string()));
        };

        if mention_line(&self.settings.mentions).is_none() {
            warn!("Slack mention IDs not configured; sending without mentions");
        }

        let payload = SlackPayload {
            text: self.format_message(mode, alert),
        };
        let response = self.client.post(webhook_url).json(&payload).send().await?;
        check_status(response).await?;

        info!("Slack notification sent ({})", alert.source);
        Ok(Delivery::Sent)
    }
}
