//! Polyglot HTTP Server
//!
//! Main entry point for the practice page and its API.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use application::{
    ChatPort, ClipStorePort, ConversationService, HealthService, SpeechBridge,
    SpeechRecognitionPort, SpeechSynthesisPort,
};
use axum::http::{HeaderValue, Method};
use infrastructure::{
    API_KEY_ENV, AppConfig, BrowserMicrophone, LogFormat, OpenAIChatAdapter, ServerConfig,
    SpeechAdapter, TempFileClipStore,
};
use presentation_http::{BodyLimits, create_router_with_limits, state::AppState};
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(config.server.log_format);

    info!("🗣️ Polyglot v{} starting...", env!("CARGO_PKG_VERSION"));

    // Fail before binding when no key is available
    config.resolve_api_key(std::env::var(API_KEY_ENV).ok())?;
    config.validate()?;

    info!(
        host = %config.server.host,
        port = %config.server.port,
        model = %config.inference.default_model,
        forward_history = config.conversation.forward_history,
        "Configuration loaded"
    );

    let chat: Arc<dyn ChatPort> = Arc::new(
        OpenAIChatAdapter::new(config.inference.clone())
            .context("Failed to initialize chat adapter")?,
    );
    let speech = Arc::new(
        SpeechAdapter::new(config.speech.clone()).context("Failed to initialize speech adapter")?,
    );
    let synthesizer: Arc<dyn SpeechSynthesisPort> = speech.clone();
    let recognizer: Arc<dyn SpeechRecognitionPort> = speech;
    let clips: Arc<dyn ClipStorePort> =
        Arc::new(TempFileClipStore::new(config.speech.max_retained_clips));

    let microphone = BrowserMicrophone::new();
    let bridge = Arc::new(
        SpeechBridge::new(Arc::new(microphone.clone()), recognizer)
            .with_listen_timeout(config.microphone.listen_timeout()),
    );

    let conversation = ConversationService::new(
        Arc::clone(&chat),
        Arc::clone(&synthesizer),
        Arc::clone(&clips),
    )
    .with_config(config.conversation);

    let health = HealthService::new(chat, synthesizer).with_config(config.health.clone());

    let state = AppState::new(
        Arc::new(conversation),
        Arc::clone(&bridge),
        microphone,
        clips,
        Arc::new(health),
    );

    let limits = BodyLimits {
        json_bytes: config.server.max_body_size_json_bytes,
        audio_bytes: config.server.max_body_size_audio_bytes,
    };

    let app = create_router_with_limits(state, limits).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&config.server)),
    );

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🚀 Server listening on http://{}", addr);

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs.unwrap_or(30));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout, bridge))
        .await?;

    info!("👋 Server shutdown complete");

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "polyglot_server=debug,presentation_http=debug,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(filter)
        .with((format == LogFormat::Json).then(|| tracing_subscriber::fmt::layer().json()))
        .with((format == LogFormat::Text).then(tracing_subscriber::fmt::layer))
        .init();
}

/// CORS policy; a bare layer adds no CORS headers
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    if !server.cors_enabled {
        return CorsLayer::new();
    }

    if server.allowed_origins.is_empty() {
        // Development mode: allow all origins
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = server
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

/// Wait for SIGINT or SIGTERM, then release a waiting capture cycle
async fn shutdown_signal(timeout: Duration, bridge: Arc<SpeechBridge>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("📥 Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("📥 Received SIGTERM, initiating graceful shutdown...");
        }
    }

    if bridge.stop() {
        info!("Stopped speech recognition");
    }

    info!("⏳ Waiting up to {:?} for connections to close...", timeout);
}
