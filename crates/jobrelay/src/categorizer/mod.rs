//! Classification of notification emails by source.

pub mod link;
pub mod matcher;

pub use link::extract_payload_url;
pub use matcher::{classify, Classification, Source};
