//! Command-line arguments

use clap::{Parser, Subcommand};

/// Default server address
pub const DEFAULT_URL: &str = "http://localhost:3000";

/// Polyglot CLI
#[derive(Debug, Parser)]
#[command(name = "polyglot-cli")]
#[command(author, version, about = "Polyglot language practice CLI", long_about = None)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Server URL
    #[arg(short, long, global = true, env = "POLYGLOT_URL", default_value = DEFAULT_URL)]
    pub url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check server readiness
    Status,

    /// List languages, topics and proficiency levels
    Options,

    /// Start a conversation, optionally changing the selection first
    ///
    /// Example: polyglot-cli start --language German --topic Art --level Beginner
    Start {
        /// Practice language
        #[arg(short, long)]
        language: Option<String>,

        /// Conversation topic
        #[arg(short, long)]
        topic: Option<String>,

        /// Proficiency level
        #[arg(long)]
        level: Option<String>,
    },

    /// Send a message to the tutor
    Say {
        /// Message text
        text: String,
    },

    /// Print the transcript
    Transcript,

    /// Clear the transcript
    Clear,
}

/// Determine log filter level from verbosity count
pub const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_verbosity_levels() {
        assert_eq!(log_filter_from_verbosity(0), "warn");
        assert_eq!(log_filter_from_verbosity(1), "info");
        assert_eq!(log_filter_from_verbosity(2), "debug");
        assert_eq!(log_filter_from_verbosity(9), "trace");
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
