//! Health aggregation service
//!
//! Checks the chat and speech collaborators with per-service timeouts and
//! reports each status individually.

use std::{collections::HashMap, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::ports::{ChatPort, SpeechSynthesisPort};

/// Default global timeout for health checks in seconds
const DEFAULT_HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

/// Configuration for health check behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Global timeout for all health checks in seconds (default: 5)
    #[serde(default = "default_global_timeout")]
    pub global_timeout_secs: u64,

    /// Service-specific timeout overrides in seconds
    #[serde(default)]
    pub service_timeouts: HashMap<String, u64>,
}

const fn default_global_timeout() -> u64 {
    DEFAULT_HEALTH_CHECK_TIMEOUT_SECS
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            global_timeout_secs: default_global_timeout(),
            service_timeouts: HashMap::new(),
        }
    }
}

impl HealthConfig {
    /// Get the timeout for a specific service
    #[must_use]
    pub fn timeout_for_service(&self, service: &str) -> Duration {
        let secs = self
            .service_timeouts
            .get(service)
            .copied()
            .unwrap_or(self.global_timeout_secs);
        Duration::from_secs(secs)
    }
}

/// Status of an individual service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    /// Whether the service is healthy
    pub healthy: bool,
    /// Optional additional information (e.g., model name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    /// Response time in milliseconds (if check was performed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    /// Error message if unhealthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceHealth {
    #[must_use]
    pub const fn healthy() -> Self {
        Self {
            healthy: true,
            info: None,
            response_time_ms: None,
            error: None,
        }
    }

    #[must_use]
    pub fn healthy_with_info(info: impl Into<String>) -> Self {
        Self {
            info: Some(info.into()),
            ..Self::healthy()
        }
    }

    #[must_use]
    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            healthy: false,
            info: None,
            response_time_ms: None,
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn timeout() -> Self {
        Self::unhealthy("Health check timed out")
    }

    #[must_use]
    pub const fn with_response_time(mut self, ms: u64) -> Self {
        self.response_time_ms = Some(ms);
        self
    }
}

/// Health report for all collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// True if every service is healthy
    pub healthy: bool,
    /// Individual service statuses
    pub services: HashMap<String, ServiceHealth>,
    /// Timestamp of the health check
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

impl HealthReport {
    #[must_use]
    pub fn new(services: HashMap<String, ServiceHealth>) -> Self {
        let healthy = services.values().all(|s| s.healthy);

        Self {
            healthy,
            services,
            checked_at: chrono::Utc::now(),
        }
    }

    #[must_use]
    pub fn service_status(&self, name: &str) -> Option<&ServiceHealth> {
        self.services.get(name)
    }
}

/// Service for aggregating collaborator health checks
pub struct HealthService {
    config: HealthConfig,
    chat: Arc<dyn ChatPort>,
    speech: Arc<dyn SpeechSynthesisPort>,
}

impl std::fmt::Debug for HealthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthService")
            .field("config", &self.config)
            .field("chat", &"<ChatPort>")
            .field("speech", &"<SpeechSynthesisPort>")
            .finish()
    }
}

impl HealthService {
    #[must_use]
    pub fn new(chat: Arc<dyn ChatPort>, speech: Arc<dyn SpeechSynthesisPort>) -> Self {
        Self {
            config: HealthConfig::default(),
            chat,
            speech,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: HealthConfig) -> Self {
        self.config = config;
        self
    }

    /// Check health of every collaborator
    #[instrument(skip(self))]
    pub async fn check_all(&self) -> HealthReport {
        let (chat, speech) = tokio::join!(self.check_chat(), self.check_speech());

        let mut services = HashMap::new();
        services.insert("chat".to_string(), chat);
        services.insert("speech".to_string(), speech);

        HealthReport::new(services)
    }

    /// Check the chat collaborator
    #[instrument(skip(self))]
    pub async fn check_chat(&self) -> ServiceHealth {
        let timeout_duration = self.config.timeout_for_service("chat");
        let start = std::time::Instant::now();

        let Ok(healthy) = timeout(timeout_duration, self.chat.is_healthy()).await else {
            warn!("Chat health check timed out");
            return ServiceHealth::timeout();
        };

        #[allow(clippy::cast_possible_truncation)]
        let response_time = start.elapsed().as_millis() as u64;
        if healthy {
            let model = self.chat.current_model();
            debug!(model = %model, response_time_ms = response_time, "Chat healthy");
            ServiceHealth::healthy_with_info(model).with_response_time(response_time)
        } else {
            warn!(response_time_ms = response_time, "Chat unhealthy");
            ServiceHealth::unhealthy("Chat collaborator unreachable")
                .with_response_time(response_time)
        }
    }

    /// Check the speech synthesis collaborator
    #[instrument(skip(self))]
    pub async fn check_speech(&self) -> ServiceHealth {
        let timeout_duration = self.config.timeout_for_service("speech");
        let start = std::time::Instant::now();

        let Ok(available) = timeout(timeout_duration, self.speech.is_available()).await else {
            warn!("Speech health check timed out");
            return ServiceHealth::timeout();
        };

        #[allow(clippy::cast_possible_truncation)]
        let response_time = start.elapsed().as_millis() as u64;
        if available {
            debug!(response_time_ms = response_time, "Speech healthy");
            ServiceHealth::healthy().with_response_time(response_time)
        } else {
            warn!(response_time_ms = response_time, "Speech unhealthy");
            ServiceHealth::unhealthy("Speech collaborator unreachable")
                .with_response_time(response_time)
        }
    }
}
