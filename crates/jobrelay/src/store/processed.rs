//! In-memory view of the processed-ID set.

use std::collections::BTreeSet;

use tracing::info;

use super::token::{uid_token, Identity, Token};

/// The set of tokens for messages that have been handled.
///
/// Tokens are only ever added. A message counts as notified when its
/// identity token is present; `uid:` tokens only skip re-inspection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedIds {
    tokens: BTreeSet<String>,
}

impl ProcessedIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn contains_uid(&self, uid: u32) -> bool {
        self.tokens.contains(&uid_token(uid))
    }

    pub fn contains_identity(&self, identity: &Identity) -> bool {
        self.tokens.contains(&identity.token())
    }

    /// Returns true if the token was not present before.
    pub fn insert(&mut self, token: impl Into<String>) -> bool {
        self.tokens.insert(token.into())
    }

    pub fn insert_uid(&mut self, uid: u32) -> bool {
        self.insert(uid_token(uid))
    }

    /// Records a processed message under both its identity and its UID.
    pub fn commit(&mut self, identity: &Identity, uid: u32) {
        self.insert(identity.token());
        self.insert_uid(uid);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ProcessedIds {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Rewrites legacy bare-numeric tokens to `gm:` form.
///
/// Prefixed and unrecognized tokens pass through unchanged. Returns the new
/// set together with the number of rewritten tokens.
pub fn migrate(ids: &ProcessedIds) -> (ProcessedIds, usize) {
    let mut migrated = 0;
    let result = ids
        .iter()
        .map(|raw| {
            let token = Token::parse(raw);
            if token.is_legacy() {
                migrated += 1;
            }
            token.canonical()
        })
        .collect();

    if migrated > 0 {
        info!("Migrated {} IDs from legacy format to gm: format", migrated);
    }

    (result, migrated)
}
