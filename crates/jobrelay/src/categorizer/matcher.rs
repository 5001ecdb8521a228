use std::fmt;

/// Subject marker of Indeed's "new applicant" emails.
pub const INDEED_SUBJECT_MARKER: &str = "新しい応募者のお知らせ";
/// Subject marker of Jimoty message emails.
pub const JIMOTY_SUBJECT_MARKER: &str = "ジモティー";
/// Jimoty messages are always read on the same inbox page.
pub const JIMOTY_DEFAULT_URL: &str = "https://jmty.jp/web_mail/posts";

/// Where an application notification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Indeed,
    Jimoty,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Indeed => "indeed",
            Source::Jimoty => "jimoty",
        }
    }

    /// Substring that identifies this source's links in an email body.
    pub fn domain_keyword(&self) -> &'static str {
        match self {
            Source::Indeed => "indeed",
            Source::Jimoty => "jmty",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// `None` means "not a target message".
    pub source: Option<Source>,
    /// Fixed payload URL. `None` for sources whose link lives in the body.
    pub default_url: Option<&'static str>,
}

impl Classification {
    fn none() -> Self {
        Self {
            source: None,
            default_url: None,
        }
    }

    pub fn is_target(&self) -> bool {
        self.source.is_some()
    }
}

/// Classifies a decoded subject line.
pub fn classify(subject: &str) -> Classification {
    if subject.contains(INDEED_SUBJECT_MARKER) {
        Classification {
            source: Some(Source::Indeed),
            default_url: None,
        }
    } else if subject.contains(JIMOTY_SUBJECT_MARKER) {
        Classification {
            source: Some(Source::Jimoty),
            default_url: Some(JIMOTY_DEFAULT_URL),
        }
    } else {
        Classification::none()
    }
}
