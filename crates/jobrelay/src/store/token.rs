//! Token formats stored in the processed-ID file.
//!
//! Every entry in the file is a plain string. The prefix tells what kind of
//! reference it is:
//!
//! - `gm:<number>`: Gmail `X-GM-MSGID`, stable across label changes and moves
//! - `mid:<message-id>`: the Message-ID header, used when Gmail gives no id
//! - `uid:<uid>`: IMAP UID, only a pre-filter and never a message identity
//! - a bare number: the legacy format, meaning the same as `gm:<number>`

use std::fmt;

pub const GM_PREFIX: &str = "gm:";
pub const MID_PREFIX: &str = "mid:";
pub const UID_PREFIX: &str = "uid:";

/// A parsed entry of the processed-ID set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Gm(String),
    Mid(String),
    Uid(String),
    /// Pre-migration bare `X-GM-MSGID`.
    Legacy(String),
    /// Anything else. Kept verbatim so newer formats survive a downgrade.
    Unknown(String),
}

impl Token {
    pub fn parse(raw: &str) -> Self {
        if let Some(rest) = raw.strip_prefix(GM_PREFIX) {
            Token::Gm(rest.to_string())
        } else if let Some(rest) = raw.strip_prefix(MID_PREFIX) {
            Token::Mid(rest.to_string())
        } else if let Some(rest) = raw.strip_prefix(UID_PREFIX) {
            Token::Uid(rest.to_string())
        } else if is_legacy_numeric(raw) {
            Token::Legacy(raw.to_string())
        } else {
            Token::Unknown(raw.to_string())
        }
    }

    /// Returns the token in its current on-disk form. Legacy tokens are
    /// rewritten to `gm:`.
    pub fn canonical(&self) -> String {
        match self {
            Token::Gm(id) | Token::Legacy(id) => format!("{GM_PREFIX}{id}"),
            Token::Mid(id) => format!("{MID_PREFIX}{id}"),
            Token::Uid(uid) => format!("{UID_PREFIX}{uid}"),
            Token::Unknown(raw) => raw.clone(),
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Token::Legacy(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

fn is_legacy_numeric(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
}

/// The identity of a message, as far as "already notified" is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Gmail `X-GM-MSGID`.
    Gm(u64),
    /// Message-ID header, angle brackets included.
    Mid(String),
}

impl Identity {
    /// Picks the provider id when available, else the Message-ID. Returns
    /// `None` when neither exists; such a message must not be processed.
    pub fn derive(provider_id: Option<u64>, message_id: Option<&str>) -> Option<Self> {
        if let Some(id) = provider_id {
            return Some(Identity::Gm(id));
        }
        message_id
            .map(str::trim)
            .filter(|mid| !mid.is_empty())
            .map(|mid| Identity::Mid(mid.to_string()))
    }

    pub fn token(&self) -> String {
        match self {
            Identity::Gm(id) => format!("{GM_PREFIX}{id}"),
            Identity::Mid(mid) => format!("{MID_PREFIX}{mid}"),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

pub fn uid_token(uid: u32) -> String {
    format!("{UID_PREFIX}{uid}")
}
