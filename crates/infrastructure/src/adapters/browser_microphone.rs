//! Browser-fed microphone
//!
//! The page records an utterance with MediaRecorder and uploads it. An upload
//! is routed to the capture cycle currently waiting in [`AudioSource::listen`];
//! without an open source it is rejected.

use std::sync::Arc;

use application::{
    error::ApplicationError,
    ports::{AudioSource, CapturedAudio, MicrophonePort},
};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    pending: Option<(u64, oneshot::Sender<CapturedAudio>)>,
}

/// Microphone whose audio arrives through HTTP uploads
#[derive(Debug, Clone, Default)]
pub struct BrowserMicrophone {
    slot: Arc<Mutex<Slot>>,
}

impl BrowserMicrophone {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a capture cycle is waiting for an upload
    pub fn is_open(&self) -> bool {
        self.slot.lock().pending.is_some()
    }

    /// Hand an uploaded utterance to the waiting capture cycle
    #[instrument(skip(self, audio), fields(format = %audio.format, bytes = audio.data.len()))]
    pub fn deliver(&self, audio: CapturedAudio) -> Result<(), ApplicationError> {
        let Some((generation, sender)) = self.slot.lock().pending.take() else {
            return Err(ApplicationError::Conflict(
                "speech recognition is not listening".to_string(),
            ));
        };

        sender.send(audio).map_err(|_| {
            ApplicationError::Conflict("capture ended before the upload arrived".to_string())
        })?;
        debug!(generation, "Utterance delivered");
        Ok(())
    }
}

impl MicrophonePort for BrowserMicrophone {
    fn open(&self) -> Result<Box<dyn AudioSource>, ApplicationError> {
        let mut slot = self.slot.lock();
        if slot.pending.is_some() {
            return Err(ApplicationError::Conflict(
                "microphone is already open".to_string(),
            ));
        }

        slot.generation += 1;
        let generation = slot.generation;
        let (sender, receiver) = oneshot::channel();
        slot.pending = Some((generation, sender));
        debug!(generation, "Microphone opened");

        Ok(Box::new(BrowserAudioSource {
            slot: Arc::clone(&self.slot),
            generation,
            receiver,
        }))
    }
}

/// One open capture; closing it stops accepting uploads
#[derive(Debug)]
struct BrowserAudioSource {
    slot: Arc<Mutex<Slot>>,
    generation: u64,
    receiver: oneshot::Receiver<CapturedAudio>,
}

#[async_trait]
impl AudioSource for BrowserAudioSource {
    async fn listen(
        &mut self,
        cancel: CancellationToken,
    ) -> Result<Option<CapturedAudio>, ApplicationError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Ok(None),
            audio = &mut self.receiver => Ok(audio.ok()),
        }
    }
}

impl Drop for BrowserAudioSource {
    fn drop(&mut self) {
        let mut slot = self.slot.lock();
        if slot
            .pending
            .as_ref()
            .is_some_and(|(generation, _)| *generation == self.generation)
        {
            slot.pending = None;
            debug!(generation = self.generation, "Microphone released");
        }
    }
}
