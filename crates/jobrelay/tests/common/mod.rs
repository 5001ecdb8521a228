//! Shared test utilities for jobrelay integration tests.
//!
//! This module provides:
//! - `RelayHarness`: temp store, recording notifiers and reporter
//! - `FakeMailbox`: an in-memory `Mailbox`
//! - `MessageBuilder`: raw RFC 5322 messages

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::*;
