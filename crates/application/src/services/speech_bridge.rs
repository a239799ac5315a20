//! Speech bridge - microphone capture feeding the conversation
//!
//! A toggle flips between Idle and Listening. Listening runs one capture
//! cycle: open the microphone, wait for an utterance, transcribe it in the
//! selected language and submit the text as a recognized message. Stopping
//! cancels whatever part of the cycle is still in flight.

use std::{fmt, sync::Arc, time::Duration};

use domain::{ListeningState, PracticeSession};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::{ConversationService, TurnOutcome};
use crate::{
    error::ApplicationError,
    ports::{
        AudioSource, CapturedAudio, MicrophonePort, SpeechRecognitionPort, TranscriptionResult,
    },
};

/// Default wait for an utterance
pub const DEFAULT_LISTEN_TIMEOUT: Duration = Duration::from_secs(30);

const NO_UTTERANCE: &str = "no utterance captured";

#[derive(Debug, Default)]
struct ControlState {
    generation: u64,
    active: Option<(u64, CancellationToken)>,
}

/// Listening flag shared between the capture cycle and stop requests
#[derive(Debug, Default)]
pub struct ListeningControl {
    state: Mutex<ControlState>,
}

impl ListeningControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ListeningState {
        if self.state.lock().active.is_some() {
            ListeningState::Listening
        } else {
            ListeningState::Idle
        }
    }

    /// Cancel the running capture cycle
    ///
    /// Returns `false` when nothing was listening.
    pub fn stop(&self) -> bool {
        let Some((generation, token)) = self.state.lock().active.take() else {
            return false;
        };
        debug!(generation, "Stopping capture");
        token.cancel();
        true
    }

    /// Switch to Listening, unless a cycle is already running
    pub fn begin(self: &Arc<Self>) -> Option<ListeningGuard> {
        let mut state = self.state.lock();
        if state.active.is_some() {
            return None;
        }
        state.generation += 1;
        let generation = state.generation;
        let token = CancellationToken::new();
        state.active = Some((generation, token.clone()));

        Some(ListeningGuard {
            control: Arc::clone(self),
            generation,
            token,
        })
    }
}

/// Keeps the control in Listening for one capture cycle
///
/// Dropping the guard returns the control to Idle.
#[derive(Debug)]
pub struct ListeningGuard {
    control: Arc<ListeningControl>,
    generation: u64,
    token: CancellationToken,
}

impl ListeningGuard {
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Drop for ListeningGuard {
    fn drop(&mut self) {
        self.token.cancel();
        let mut state = self.control.state.lock();
        if state
            .active
            .as_ref()
            .is_some_and(|(generation, _)| *generation == self.generation)
        {
            state.active = None;
        }
    }
}

/// Result of pressing the speech toggle
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// A running capture was stopped
    Stopped,
    /// The capture cycle ended without an utterance
    Cancelled,
    /// An utterance was recognized and answered
    Recognized {
        transcript: String,
        outcome: TurnOutcome,
    },
}

/// Bridges microphone capture and speech recognition into the conversation
pub struct SpeechBridge {
    microphone: Arc<dyn MicrophonePort>,
    recognizer: Arc<dyn SpeechRecognitionPort>,
    control: Arc<ListeningControl>,
    listen_timeout: Duration,
}

impl fmt::Debug for SpeechBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechBridge")
            .field("state", &self.control.state())
            .field("listen_timeout", &self.listen_timeout)
            .finish_non_exhaustive()
    }
}

impl SpeechBridge {
    pub fn new(
        microphone: Arc<dyn MicrophonePort>,
        recognizer: Arc<dyn SpeechRecognitionPort>,
    ) -> Self {
        Self {
            microphone,
            recognizer,
            control: Arc::new(ListeningControl::new()),
            listen_timeout: DEFAULT_LISTEN_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_listen_timeout(mut self, listen_timeout: Duration) -> Self {
        self.listen_timeout = listen_timeout;
        self
    }

    pub fn state(&self) -> ListeningState {
        self.control.state()
    }

    /// Stop the running capture cycle, if any
    pub fn stop(&self) -> bool {
        self.control.stop()
    }

    /// Run one capture cycle and transcribe the utterance
    ///
    /// Returns `None` when the cycle was stopped before a transcript was
    /// available.
    #[instrument(skip(self))]
    pub async fn listen_once(
        &self,
        speech_code: &str,
    ) -> Result<Option<TranscriptionResult>, ApplicationError> {
        let (guard, source) = self.arm()?;
        let Some(audio) = self.capture(&guard, source).await? else {
            return Ok(None);
        };
        self.recognize(&guard, audio, speech_code).await
    }

    /// Handle the speech toggle
    ///
    /// While Listening this stops the running cycle. While Idle it switches to
    /// Listening at once and captures without holding the session. The
    /// session is locked to read the speech code after capture, and again to
    /// submit the transcript.
    pub async fn toggle(
        &self,
        session: &tokio::sync::Mutex<PracticeSession>,
        conversation: &ConversationService,
    ) -> Result<ToggleOutcome, ApplicationError> {
        if self.stop() {
            return Ok(ToggleOutcome::Stopped);
        }

        let (guard, source) = self.arm()?;
        let Some(audio) = self.capture(&guard, source).await? else {
            return Ok(ToggleOutcome::Cancelled);
        };

        let cancel = guard.token();
        let speech_code = tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(ToggleOutcome::Cancelled),
            locked = session.lock() => locked.selection.speech_code(),
        };

        let Some(transcription) = self.recognize(&guard, audio, speech_code).await? else {
            return Ok(ToggleOutcome::Cancelled);
        };
        drop(guard);

        let mut session = session.lock().await;
        let outcome = conversation
            .submit_recognized(&mut session, &transcription.text)
            .await?;

        Ok(ToggleOutcome::Recognized {
            transcript: transcription.text,
            outcome,
        })
    }

    /// Switch to Listening and open the microphone
    fn arm(&self) -> Result<(ListeningGuard, Box<dyn AudioSource>), ApplicationError> {
        let guard = self
            .control
            .begin()
            .ok_or_else(|| ApplicationError::Conflict("already listening".to_string()))?;
        let source = self.microphone.open()?;
        Ok((guard, source))
    }

    /// Wait for one utterance; `None` when the cycle was stopped
    async fn capture(
        &self,
        guard: &ListeningGuard,
        mut source: Box<dyn AudioSource>,
    ) -> Result<Option<CapturedAudio>, ApplicationError> {
        let captured = match timeout(self.listen_timeout, source.listen(guard.token())).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(timeout = ?self.listen_timeout, "No utterance before timeout");
                return Err(ApplicationError::Recognition(NO_UTTERANCE.to_string()));
            },
        };
        drop(source);

        let Some(audio) = captured else {
            info!("Capture cancelled");
            return Ok(None);
        };
        if audio.is_empty() {
            return Err(ApplicationError::Recognition(NO_UTTERANCE.to_string()));
        }

        debug!(bytes = audio.data.len(), format = %audio.format, "Utterance captured");
        Ok(Some(audio))
    }

    async fn recognize(
        &self,
        guard: &ListeningGuard,
        audio: CapturedAudio,
        speech_code: &str,
    ) -> Result<Option<TranscriptionResult>, ApplicationError> {
        let cancel = guard.token();
        let transcription = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!("Transcription cancelled");
                return Ok(None);
            },
            result = self.recognizer.transcribe(audio, speech_code) => result?,
        };

        if transcription.text.trim().is_empty() {
            return Err(ApplicationError::Recognition(
                "no speech detected".to_string(),
            ));
        }

        Ok(Some(transcription))
    }
}
