//! Clip store port - retention of synthesized speech for playback

use async_trait::async_trait;
use domain::{AudioFormat, ClipId, Sender, Turn, TurnId};
#[cfg(test)]
use mockall::automock;
use serde::Serialize;

use super::SynthesizedSpeech;
use crate::error::ApplicationError;

/// Metadata of a stored clip, as rendered next to its turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipInfo {
    pub id: ClipId,
    pub turn_id: TurnId,
    pub sender: Sender,
    pub format: AudioFormat,
    pub size_bytes: usize,
}

/// A stored clip with its audio
#[derive(Debug, Clone)]
pub struct SpeechClip {
    pub info: ClipInfo,
    pub audio: Vec<u8>,
}

impl SpeechClip {
    pub fn mime_type(&self) -> &'static str {
        self.info.format.mime_type()
    }
}

/// Port for storing synthesized speech clips
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClipStorePort: Send + Sync {
    /// Store the speech produced for `turn`
    async fn store(
        &self,
        turn: &Turn,
        speech: SynthesizedSpeech,
    ) -> Result<ClipInfo, ApplicationError>;

    /// Load a clip by id
    async fn load(&self, id: ClipId) -> Result<Option<SpeechClip>, ApplicationError>;

    /// Delete every clip
    async fn clear(&self) -> Result<(), ApplicationError>;

    /// Number of clips currently retained
    fn clip_count(&self) -> usize;
}
