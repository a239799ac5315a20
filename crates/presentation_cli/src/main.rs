//! Polyglot CLI
//!
//! Drives a running server from the terminal.

#![allow(clippy::print_stdout)]

use clap::Parser;
use presentation_cli::{
    Cli, Commands, PolyglotClient, log_filter_from_verbosity,
    client::{OutcomeView, SelectionUpdate, TurnView},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_turn(turn: &TurnView) {
    println!("{}: {}", turn.sender, turn.content);
}

fn print_outcome(outcome: &OutcomeView) {
    for turn in &outcome.turns {
        print_turn(turn);
    }
    println!("\n⏱️  {} in {}ms", outcome.model, outcome.latency_ms);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(log_filter_from_verbosity(
            cli.verbose,
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client = PolyglotClient::new(&cli.url);

    match cli.command {
        Commands::Status => {
            let (ready, report) = client.status().await?;
            println!("{} Polyglot at {}", if ready { "✅" } else { "❌" }, cli.url);
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !ready {
                std::process::exit(1);
            }
        },

        Commands::Options => {
            let options = client.options().await?;
            println!("🌍 Languages:");
            for language in &options.languages {
                println!("   {} ({})", language.display_name, language.speech_code);
            }
            println!("📚 Topics: {}", options.topics.join(", "));
            println!("🎓 Levels: {}", options.proficiency_levels.join(", "));
        },

        Commands::Start {
            language,
            topic,
            level,
        } => {
            let update = SelectionUpdate {
                language,
                topic,
                proficiency_level: level,
            };
            if !update.is_empty() {
                client.update_selection(&update).await?;
            }
            print_outcome(&client.start().await?);
        },

        Commands::Say { text } => {
            print_outcome(&client.say(&text).await?);
        },

        Commands::Transcript => {
            let transcript = client.transcript().await?;
            if transcript.turns.is_empty() {
                println!("(empty)");
            }
            for turn in &transcript.turns {
                print_turn(turn);
            }
        },

        Commands::Clear => {
            client.clear().await?;
            println!("🧹 Conversation cleared");
        },
    }

    Ok(())
}
