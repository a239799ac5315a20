//! Polyglot CLI
//!
//! Command-line client for a running Polyglot server.

pub mod cli;
pub mod client;

pub use cli::{Cli, Commands, log_filter_from_verbosity};
pub use client::{ClientError, PolyglotClient};
