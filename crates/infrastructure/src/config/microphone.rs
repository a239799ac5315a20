//! Microphone capture configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for one capture cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MicrophoneConfig {
    /// Seconds to wait for an utterance before giving up
    #[serde(default = "default_listen_timeout_secs")]
    pub listen_timeout_secs: u64,
}

const fn default_listen_timeout_secs() -> u64 {
    30
}

impl Default for MicrophoneConfig {
    fn default() -> Self {
        Self {
            listen_timeout_secs: default_listen_timeout_secs(),
        }
    }
}

impl MicrophoneConfig {
    pub const fn listen_timeout(&self) -> Duration {
        Duration::from_secs(self.listen_timeout_secs)
    }
}
