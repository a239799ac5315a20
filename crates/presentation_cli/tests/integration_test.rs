//! Integration tests for CLI
//!
//! Argument parsing and the HTTP client against a mock server.

#![allow(clippy::panic, clippy::unwrap_used)]

use std::ffi::OsString;

use clap::Parser;
use presentation_cli::{
    Cli, ClientError, Commands, PolyglotClient,
    client::{SelectionUpdate, TurnView},
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path},
};

fn parse_args(args: &[&str]) -> Result<Cli, clap::Error> {
    let os_args: Vec<OsString> = args.iter().map(OsString::from).collect();
    Cli::try_parse_from(os_args)
}

// ============ Argument parsing ============

#[test]
fn cli_parses_status_command() {
    let cli = parse_args(&["polyglot-cli", "status"]).unwrap();
    assert!(matches!(cli.command, Commands::Status));
}

#[test]
fn cli_parses_custom_url_after_subcommand() {
    let cli = parse_args(&["polyglot-cli", "transcript", "--url", "http://custom:8080"]).unwrap();
    assert_eq!(cli.url, "http://custom:8080");
    assert!(matches!(cli.command, Commands::Transcript));
}

#[test]
fn cli_parses_start_with_selection() {
    let cli = parse_args(&[
        "polyglot-cli",
        "start",
        "--language",
        "German",
        "--topic",
        "Art",
        "--level",
        "Advanced",
    ])
    .unwrap();

    if let Commands::Start {
        language,
        topic,
        level,
    } = cli.command
    {
        assert_eq!(language.as_deref(), Some("German"));
        assert_eq!(topic.as_deref(), Some("Art"));
        assert_eq!(level.as_deref(), Some("Advanced"));
    } else {
        panic!("Expected Start command");
    }
}

#[test]
fn cli_parses_say_command() {
    let cli = parse_args(&["polyglot-cli", "say", "Hallo, wie geht's?"]).unwrap();
    if let Commands::Say { text } = cli.command {
        assert_eq!(text, "Hallo, wie geht's?");
    } else {
        panic!("Expected Say command");
    }
}

#[test]
fn cli_say_requires_text() {
    assert!(parse_args(&["polyglot-cli", "say"]).is_err());
}

#[test]
fn cli_parses_verbosity() {
    let cli = parse_args(&["polyglot-cli", "-vv", "clear"]).unwrap();
    assert_eq!(cli.verbose, 2);
    assert!(matches!(cli.command, Commands::Clear));
}

#[test]
fn cli_rejects_unknown_command() {
    assert!(parse_args(&["polyglot-cli", "translate"]).is_err());
}

// ============ Client ============

fn outcome_body() -> serde_json::Value {
    json!({
        "turns": [
            { "id": "0190a3b0-0000-7000-8000-000000000001", "sender": "User", "content": "Hello", "created_at": "2024-01-01T00:00:00Z" },
            { "id": "0190a3b0-0000-7000-8000-000000000002", "sender": "AI", "content": "Hi there!", "created_at": "2024-01-01T00:00:01Z" }
        ],
        "clips": [],
        "model": "gpt-3.5-turbo",
        "latency_ms": 420
    })
}

#[tokio::test]
async fn say_posts_message_and_reads_turns() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/conversation/messages"))
        .and(body_json(json!({ "message": "Hello" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(outcome_body()))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = PolyglotClient::new(server.uri()).say("Hello").await.unwrap();

    assert_eq!(
        outcome.turns,
        vec![
            TurnView {
                sender: "User".to_string(),
                content: "Hello".to_string(),
            },
            TurnView {
                sender: "AI".to_string(),
                content: "Hi there!".to_string(),
            },
        ]
    );
    assert_eq!(outcome.latency_ms, 420);
}

#[tokio::test]
async fn error_body_becomes_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/session/selection"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Unknown language: Klingon",
            "code": "bad_request"
        })))
        .mount(&server)
        .await;

    let update = SelectionUpdate {
        language: Some("Klingon".to_string()),
        ..SelectionUpdate::default()
    };
    let err = PolyglotClient::new(server.uri())
        .update_selection(&update)
        .await
        .unwrap_err();

    match err {
        ClientError::Api {
            status,
            code,
            message,
        } => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(code, "bad_request");
            assert!(message.contains("Klingon"));
        },
        other => panic!("Expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn collaborator_details_are_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/conversation/start"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({
            "error": "A speech or chat service failed",
            "code": "collaborator_error",
            "details": "connection refused"
        })))
        .mount(&server)
        .await;

    let err = PolyglotClient::new(server.uri()).start().await.unwrap_err();
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn not_ready_status_still_returns_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ready"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "ready": false,
            "chat": { "healthy": false, "error": "Chat collaborator unreachable" }
        })))
        .mount(&server)
        .await;

    let (ready, report) = PolyglotClient::new(server.uri()).status().await.unwrap();
    assert!(!ready);
    assert_eq!(report["chat"]["healthy"], false);
}

#[tokio::test]
async fn clear_and_transcript() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/conversation"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/conversation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "selection": { "language": "English", "topic": "General", "proficiency_level": "Beginner" },
            "started": true,
            "turns": []
        })))
        .mount(&server)
        .await;

    let client = PolyglotClient::new(server.uri());
    client.clear().await.unwrap();
    assert!(client.transcript().await.unwrap().turns.is_empty());
}

#[tokio::test]
async fn options_are_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/options"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "languages": [{ "display_name": "German", "speech_code": "de" }],
            "topics": ["General", "Art"],
            "proficiency_levels": ["Beginner"]
        })))
        .mount(&server)
        .await;

    let options = PolyglotClient::new(server.uri()).options().await.unwrap();
    assert_eq!(options.languages[0].speech_code, "de");
    assert_eq!(options.topics, ["General", "Art"]);
}
