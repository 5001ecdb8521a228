//! Payload link extraction from HTML bodies.

use kuchiki::traits::*;
use tracing::debug;

use super::matcher::Source;

/// Visible text of Indeed's "review the application" button.
pub const INDEED_CTA_TEXT: &str = "応募内容を確認する";

/// Finds the link a notification should point to.
///
/// The first anchor whose text contains the call-to-action phrase wins.
/// Otherwise the first anchor whose href contains the source's domain keyword
/// is used. Returns an empty string when neither exists.
pub fn extract_payload_url(html: &str, source: Source) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let document = kuchiki::parse_html().one(html);
    let anchors: Vec<(String, String)> = match document.select("a") {
        Ok(selection) => selection
            .map(|anchor| {
                let text = anchor.text_contents();
                let href = anchor
                    .attributes
                    .borrow()
                    .get("href")
                    .unwrap_or_default()
                    .to_string();
                (text, href)
            })
            .collect(),
        Err(()) => return String::new(),
    };

    if let Some((_, href)) = anchors
        .iter()
        .find(|(text, _)| text.contains(INDEED_CTA_TEXT))
    {
        debug!("Found call-to-action link");
        return href.clone();
    }

    let keyword = source.domain_keyword();
    anchors
        .into_iter()
        .find(|(_, href)| href.contains(keyword))
        .map(|(_, href)| href)
        .unwrap_or_default()
}
