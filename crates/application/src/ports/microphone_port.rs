//! Microphone port - scoped access to an audio input

use async_trait::async_trait;
use domain::AudioFormat;
#[cfg(test)]
use mockall::automock;
use tokio_util::sync::CancellationToken;

use crate::error::ApplicationError;

/// One utterance captured from the input device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedAudio {
    pub data: Vec<u8>,
    pub format: AudioFormat,
}

impl CapturedAudio {
    pub fn new(data: impl Into<Vec<u8>>, format: AudioFormat) -> Self {
        Self {
            data: data.into(),
            format,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// An open audio input; the device is released when the source is dropped
#[async_trait]
pub trait AudioSource: Send {
    /// Wait for one utterance
    ///
    /// Resolves with `None` once `cancel` fires before anything was captured.
    async fn listen(
        &mut self,
        cancel: CancellationToken,
    ) -> Result<Option<CapturedAudio>, ApplicationError>;
}

/// Port for acquiring the microphone
#[cfg_attr(test, automock)]
pub trait MicrophonePort: Send + Sync {
    /// Open the input device for a single capture cycle
    fn open(&self) -> Result<Box<dyn AudioSource>, ApplicationError>;
}
