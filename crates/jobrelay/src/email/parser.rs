//! Email parsing: decoded headers, sender name and HTML body.

use mail_parser::{HeaderName, Message, MessageParser, PartType};
use tracing::debug;

/// The fields of a message the relay cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedMessage {
    /// Message-ID header text as sent, usually with angle brackets.
    pub message_id: Option<String>,
    /// Decoded Subject header.
    pub subject: String,
    /// Decoded From header in `Name <address>` form.
    pub from: String,
    /// First `text/html` part, empty if there is none.
    pub html: String,
}

impl ParsedMessage {
    /// Parses a raw RFC 5322 message. Never fails: unparseable input yields an
    /// empty message, which carries no Message-ID.
    pub fn parse(raw: &[u8]) -> Self {
        let Some(message) = MessageParser::default().parse(raw) else {
            debug!("Failed to parse email message ({} bytes)", raw.len());
            return Self::default();
        };

        Self {
            message_id: raw_message_id(&message),
            subject: message.subject().unwrap_or_default().to_string(),
            from: message
                .from()
                .and_then(|addr| addr.first().map(format_address))
                .unwrap_or_default(),
            html: extract_html(&message),
        }
    }

    pub fn sender_name(&self) -> String {
        extract_name(&self.from)
    }
}

/// Sender display name: text before the first `<`, without quotes.
pub fn extract_name(from_header: &str) -> String {
    match from_header.split_once('<') {
        Some((name, _)) => name.replace('"', "").trim().to_string(),
        None => from_header.replace('"', "").trim().to_string(),
    }
}

/// The Message-ID header exactly as written, minus folding whitespace.
fn raw_message_id(message: &Message) -> Option<String> {
    message
        .header_raw(HeaderName::MessageId)
        .map(|raw| raw.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|id| !id.is_empty())
}

fn extract_html(message: &Message) -> String {
    message
        .parts
        .iter()
        .find_map(|part| match &part.body {
            PartType::Html(html) => Some(html.to_string()),
            _ => None,
        })
        .unwrap_or_default()
}

fn format_address(addr: &mail_parser::Addr) -> String {
    if let Some(name) = addr.name() {
        format!("{} <{}>", name, addr.address().unwrap_or_default())
    } else {
        addr.address().unwrap_or_default().to_string()
    }
}
