//! IMAP client for the Gmail inbox.

use async_imap::Session;
use async_native_tls::TlsConnector;
use async_trait::async_trait;
use chrono::NaiveDate;
use futures_util::StreamExt;
use log::{debug, info, warn};
use secrecy::ExposeSecret;

use crate::config::ImapSettings;

use super::error::{EmailError, Result};
use super::mailbox::{FetchOutcome, Mailbox};

/// Type alias for the underlying async stream (using async-std compatible TcpStream).
type AsyncTcpStream = async_io::Async<std::net::TcpStream>;

/// Type alias for the TLS stream used by the IMAP session.
type TlsStream = async_native_tls::TlsStream<AsyncTcpStream>;

/// IMAP client over TLS. Folders are only ever opened with EXAMINE.
pub struct ImapClient {
    session: Option<Session<TlsStream>>,
    settings: ImapSettings,
}

impl ImapClient {
    pub fn new(settings: ImapSettings) -> Self {
        Self {
            session: None,
            settings,
        }
    }

    /// Connects to the IMAP server and logs in with the configured password.
    pub async fn connect(&mut self) -> Result<()> {
        if self.session.is_some() {
            debug!("Already connected to IMAP server");
            return Ok(());
        }

        let addr = format!("{}:{}", self.settings.host, self.settings.port);
        info!("Connecting to IMAP server at {}", addr);

        let std_stream = std::net::TcpStream::connect(&addr)
            .map_err(|e| EmailError::ConnectionFailed(e.to_string()))?;
        std_stream
            .set_nonblocking(true)
            .map_err(|e| EmailError::ConnectionFailed(e.to_string()))?;
        let tcp_stream = async_io::Async::new(std_stream)
            .map_err(|e| EmailError::ConnectionFailed(e.to_string()))?;

        let tls = TlsConnector::new();
        let tls_stream = tls.connect(&self.settings.host, tcp_stream).await?;

        let client = async_imap::Client::new(tls_stream);
        let session = client
            .login(&self.settings.user, self.settings.password.expose_secret())
            .await
            .map_err(|(e, _)| EmailError::AuthenticationFailed(e.to_string()))?;

        info!("Successfully authenticated to IMAP server");
        self.session = Some(session);
        Ok(())
    }

    /// Opens a folder in read-only mode using EXAMINE (not SELECT), so that
    /// inspecting messages never marks them as read.
    pub async fn examine_folder(&mut self, folder: &str) -> Result<()> {
        let session = self.session_mut()?;

        info!("Examining folder: {}", folder);
        session.examine(folder).await.map_err(|e| {
            if e.to_string().contains("Mailbox doesn't exist") || e.to_string().contains("NO") {
                EmailError::FolderNotFound(folder.to_string())
            } else {
                EmailError::ProtocolError(e.to_string())
            }
        })?;

        Ok(())
    }

    /// Disconnects from the IMAP server gracefully.
    pub async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut session) = self.session.take() {
            info!("Disconnecting from IMAP server");
            session
                .logout()
                .await
                .map_err(|e| EmailError::ProtocolError(e.to_string()))?;
        }
        Ok(())
    }

    fn session_mut(&mut self) -> Result<&mut Session<TlsStream>> {
        self.session.as_mut().ok_or(EmailError::NotConnected)
    }

    /// Runs a UID FETCH for a single message and returns its Gmail message
    /// id and body, whichever the server sent.
    async fn uid_fetch_one(
        &mut self,
        uid: u32,
        query: &str,
    ) -> Result<(Option<u64>, Option<Vec<u8>>)> {
        let session = self.session_mut()?;

        let mut messages = session
            .uid_fetch(uid.to_string(), query)
            .await
            .map_err(|e| EmailError::ProtocolError(e.to_string()))?;

        let mut provider_id = None;
        let mut raw = None;
        while let Some(message_result) = messages.next().await {
            let message =
                message_result.map_err(|e| EmailError::ProtocolError(e.to_string()))?;
            if provider_id.is_none() {
                provider_id = message.gmail_msg_id().copied();
            }
            if raw.is_none() {
                raw = message.body().map(|body| body.to_vec());
            }
        }

        Ok((provider_id, raw))
    }
}

#[async_trait(?Send)]
impl Mailbox for ImapClient {
    async fn search_since(&mut self, since: NaiveDate) -> Result<Vec<u32>> {
        let session = self.session_mut()?;

        let query = format!("SINCE {}", imap_date(since));
        debug!("Searching with query: {}", query);

        let uids = session
            .uid_search(&query)
            .await
            .map_err(|e| EmailError::ProtocolError(e.to_string()))?;

        // The server's SEARCH order is ascending UID; the client hands back a set.
        let mut uid_list: Vec<u32> = uids.into_iter().collect();
        uid_list.sort_unstable();
        debug!("Found {} messages since {}", uid_list.len(), since);
        Ok(uid_list)
    }

    async fn fetch_provider_id(&mut self, uid: u32) -> Result<Option<u64>> {
        let (provider_id, _) = self.uid_fetch_one(uid, "(UID X-GM-MSGID)").await?;
        if provider_id.is_none() {
            debug!("No X-GM-MSGID for UID {}", uid);
        }
        Ok(provider_id)
    }

    async fn fetch_message(&mut self, uid: u32) -> Result<FetchOutcome> {
        debug!("Fetching email with UID {}", uid);

        // BODY.PEEK[] leaves the \Seen flag untouched.
        let (provider_id, raw) = self
            .uid_fetch_one(uid, "(UID X-GM-MSGID BODY.PEEK[])")
            .await?;

        if raw.is_none() {
            warn!("Failed to fetch body for UID {}", uid);
        }
        Ok(FetchOutcome::new(provider_id, raw))
    }
}

impl Drop for ImapClient {
    fn drop(&mut self) {
        if self.session.is_some() {
            warn!("ImapClient dropped without explicit disconnect - session will be closed");
        }
    }
}

/// Formats a date for IMAP SEARCH (e.g. `05-Jan-2024`).
pub fn imap_date(date: NaiveDate) -> String {
    date.format("%d-%b-%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn create_test_settings() -> ImapSettings {
        ImapSettings {
            host: "imap.example.com".to_string(),
            port: 993,
            user: "test@example.com".to_string(),
            password: SecretString::from("secret"),
            folder: "INBOX".to_string(),
        }
    }

    #[tokio::test]
    async fn test_fetch_message_requires_connection() {
        let mut client = ImapClient::new(create_test_settings());
        let result = client.fetch_message(1).await;
        assert!(matches!(result, Err(EmailError::NotConnected)));
    }

    #[tokio::test]
    async fn test_disconnect_without_session_is_noop() {
        let mut client = ImapClient::new(create_test_settings());
        client.disconnect().await.unwrap();
        let result = client.search_since(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()).await;
        assert!(matches!(result, Err(EmailError::NotConnected)));
    }

    #[tokio::test]
    async fn test_operations_require_connection() {
        let mut client = ImapClient::new(create_test_settings());
        let result = client.fetch_provider_id(1).await;
        assert!(matches!(result, Err(EmailError::NotConnected)));
    }

    #[test]
    fn test_imap_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(imap_date(date), "05-Jan-2024");
    }
}
