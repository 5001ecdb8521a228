//! Best-effort error side channel.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::error;

use super::error::NotifyError;
use super::slack::SlackPayload;

/// Header line of every error report.
pub const ERROR_REPORT_HEADER: &str = "🚨 Indeed応募通知エラー発生";

/// Keeps a hung error endpoint from stalling the poller.
const ERROR_REPORT_TIMEOUT: Duration = Duration::from_secs(5);

/// Receives reports of failures anywhere in the service.
///
/// Implementations must not fail and must not report their own failures
/// through themselves.
#[async_trait(?Send)]
pub trait ErrorReporter {
    async fn report(&self, message: &str);
}

/// Posts error reports to a Slack webhook. Without a URL it only logs.
pub struct SlackErrorReporter {
    client: Option<Client>,
    webhook_url: Option<String>,
}

impl SlackErrorReporter {
    pub fn new(webhook_url: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(ERROR_REPORT_TIMEOUT)
            .build()
            .map_err(|e| {
                error!("{}", NotifyError::Client(e.to_string()));
            })
            .ok();
        Self {
            client,
            webhook_url,
        }
    }

    pub fn format_report(message: &str) -> String {
        format!("{}\n{}", ERROR_REPORT_HEADER, message)
    }
}

#[async_trait(?Send)]
impl ErrorReporter for SlackErrorReporter {
    async fn report(&self, message: &str) {
        let (Some(client), Some(url)) = (&self.client, &self.webhook_url) else {
            error!("SLACK_ERROR_WEBHOOK_URL is not set; cannot report error: {}", message);
            return;
        };

        let payload = SlackPayload {
            text: Self::format_report(message),
        };
        match client.post(url).json(&payload).send().await {
            Ok(response) if !response.status().is_success() => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                error!(
                    "Failed to send error notification to Slack (status={}, body={})",
                    status, body
                );
            }
            Ok(_) => {}
            Err(e) => {
                error!("Exception while sending error notification to Slack: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_report() {
        assert_eq!(
            SlackErrorReporter::format_report("Gmail polling error: timeout"),
            "🚨 Indeed応募通知エラー発生\nGmail polling error: timeout"
        );
    }

    #[tokio::test]
    async fn test_report_without_url_does_not_fail() {
        let reporter = SlackErrorReporter::new(None);
        reporter.report("something broke").await;
    }

    #[tokio::test]
    async fn test_report_to_unreachable_endpoint_does_not_fail() {
        let reporter = SlackErrorReporter::new(Some("http://127.0.0.1:9/hook".to_string()));
        reporter.report("something broke").await;
    }
}
