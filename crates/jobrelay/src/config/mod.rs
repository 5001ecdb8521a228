pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_from_lookup, MENTION_KEYS};
pub use schema::{Config, Destinations, ImapSettings, LineSettings, Mention, Mode, SlackSettings};
