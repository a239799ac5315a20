//! Conversation service - turn taking between the learner and the tutor

use std::{fmt, sync::Arc, time::Instant};

use domain::{ChatMessage, DomainError, PracticeSession, Sender, Turn, build_system_prompt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{
    error::ApplicationError,
    ports::{ChatPort, ClipInfo, ClipStorePort, SpeechSynthesisPort},
};

/// Conversation behavior switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Send the tutor instruction and the whole transcript with every message
    #[serde(default)]
    pub forward_history: bool,
}

/// What one interaction added to the session
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    /// Appended turns in transcript order
    pub turns: Vec<Turn>,
    /// Speech clips stored for the appended turns
    pub clips: Vec<ClipInfo>,
    /// Model that produced the reply
    pub model: String,
    /// Time spent on the whole interaction in milliseconds
    pub latency_ms: u64,
}

/// Service driving the three conversation entry points
pub struct ConversationService {
    chat: Arc<dyn ChatPort>,
    synthesizer: Arc<dyn SpeechSynthesisPort>,
    clips: Arc<dyn ClipStorePort>,
    config: ConversationConfig,
}

impl fmt::Debug for ConversationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ConversationService {
    pub fn new(
        chat: Arc<dyn ChatPort>,
        synthesizer: Arc<dyn SpeechSynthesisPort>,
        clips: Arc<dyn ClipStorePort>,
    ) -> Self {
        Self {
            chat,
            synthesizer,
            clips,
            config: ConversationConfig::default(),
        }
    }

    #[must_use]
    pub const fn with_config(mut self, config: ConversationConfig) -> Self {
        self.config = config;
        self
    }

    pub const fn config(&self) -> ConversationConfig {
        self.config
    }

    /// Open the conversation with the instruction built from the selection
    ///
    /// Only the tutor's reply is appended and spoken.
    #[instrument(skip(self, session), fields(language = %session.selection.language))]
    pub async fn start(
        &self,
        session: &mut PracticeSession,
    ) -> Result<TurnOutcome, ApplicationError> {
        let started = Instant::now();
        let instruction = build_system_prompt(&session.selection)?;

        let reply = self
            .chat
            .complete(&[ChatMessage::system(instruction.as_str())])
            .await?;

        session.instruction = Some(instruction);
        let ai_turn = session.log.append(Sender::Ai, reply.content).clone();

        let clip = self
            .speak(&ai_turn, session.selection.speech_code())
            .await?;

        let latency_ms = elapsed_ms(started);
        info!(model = %reply.model, latency_ms, "Conversation started");

        Ok(TurnOutcome {
            turns: vec![ai_turn],
            clips: vec![clip],
            model: reply.model,
            latency_ms,
        })
    }

    /// Handle text typed by the learner
    ///
    /// Both the learner's message and the reply are spoken, learner first.
    #[instrument(skip(self, session, text), fields(text_len = text.len()))]
    pub async fn submit_text(
        &self,
        session: &mut PracticeSession,
        text: &str,
    ) -> Result<TurnOutcome, ApplicationError> {
        let started = Instant::now();
        let (user_turn, ai_turn, model) = self.exchange(session, text).await?;

        let speech_code = session.selection.speech_code();
        let user_clip = self.speak(&user_turn, speech_code).await?;
        let ai_clip = self.speak(&ai_turn, speech_code).await?;

        Ok(TurnOutcome {
            turns: vec![user_turn, ai_turn],
            clips: vec![user_clip, ai_clip],
            model,
            latency_ms: elapsed_ms(started),
        })
    }

    /// Handle text recognized from the learner's speech
    ///
    /// Only the reply is spoken.
    #[instrument(skip(self, session, text), fields(text_len = text.len()))]
    pub async fn submit_recognized(
        &self,
        session: &mut PracticeSession,
        text: &str,
    ) -> Result<TurnOutcome, ApplicationError> {
        let started = Instant::now();
        let (user_turn, ai_turn, model) = self.exchange(session, text).await?;

        let ai_clip = self
            .speak(&ai_turn, session.selection.speech_code())
            .await?;

        Ok(TurnOutcome {
            turns: vec![user_turn, ai_turn],
            clips: vec![ai_clip],
            model,
            latency_ms: elapsed_ms(started),
        })
    }

    /// Empty the transcript and drop its speech clips
    ///
    /// The instruction of the last start is kept. The transcript is left
    /// intact when the clips cannot be dropped.
    #[instrument(skip(self, session), fields(turns = session.log.len()))]
    pub async fn clear(&self, session: &mut PracticeSession) -> Result<(), ApplicationError> {
        self.clips.clear().await?;
        session.log.clear();
        debug!("Conversation cleared");
        Ok(())
    }

    /// Send one learner message and commit both turns once the reply arrived
    async fn exchange(
        &self,
        session: &mut PracticeSession,
        text: &str,
    ) -> Result<(Turn, Turn, String), ApplicationError> {
        if text.trim().is_empty() {
            return Err(DomainError::EmptyMessage.into());
        }

        let messages = self.outbound(session, text);
        let reply = self.chat.complete(&messages).await?;

        debug!(
            model = %reply.model,
            tokens = ?reply.tokens_used,
            latency_ms = reply.latency_ms,
            sent = messages.len(),
            "Tutor replied"
        );

        let user_turn = session.log.append(Sender::User, text).clone();
        let ai_turn = session.log.append(Sender::Ai, reply.content).clone();
        Ok((user_turn, ai_turn, reply.model))
    }

    fn outbound(&self, session: &PracticeSession, text: &str) -> Vec<ChatMessage> {
        let message = ChatMessage::user(text);
        if self.config.forward_history {
            let mut messages = session.history();
            messages.push(message);
            messages
        } else {
            vec![message]
        }
    }

    async fn speak(&self, turn: &Turn, speech_code: &str) -> Result<ClipInfo, ApplicationError> {
        let speech = self
            .synthesizer
            .synthesize(turn.content(), speech_code)
            .await?;
        self.clips.store(turn, speech).await
    }
}

#[allow(clippy::cast_possible_truncation)]
fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use domain::{
        AudioFormat, ClipId, Language, MessageRole, ProficiencyLevel, SessionSelection, Topic,
    };

    use super::*;
    use crate::ports::{
        ChatReply, MockChatPort, MockClipStorePort, MockSpeechSynthesisPort, SynthesizedSpeech,
    };

    fn reply(content: &str) -> ChatReply {
        ChatReply {
            content: content.to_string(),
            model: "gpt-3.5-turbo".to_string(),
            tokens_used: Some(12),
            latency_ms: 5,
        }
    }

    fn speech() -> SynthesizedSpeech {
        SynthesizedSpeech {
            audio: vec![1, 2, 3],
            format: AudioFormat::Mp3,
            duration_ms: None,
        }
    }

    fn synthesizer(times: usize) -> MockSpeechSynthesisPort {
        let mut mock = MockSpeechSynthesisPort::new();
        mock.expect_synthesize()
            .times(times)
            .returning(|_, _| Ok(speech()));
        mock
    }

    fn storing_clips() -> MockClipStorePort {
        let mut mock = MockClipStorePort::new();
        mock.expect_store().returning(|turn, speech| {
            Ok(ClipInfo {
                id: ClipId::new(),
                turn_id: turn.id(),
                sender: turn.sender(),
                format: speech.format,
                size_bytes: speech.audio.len(),
            })
        });
        mock
    }

    fn clip_store() -> MockClipStorePort {
        let mut mock = storing_clips();
        mock.expect_clear().returning(|| Ok(()));
        mock
    }

    fn service(chat: MockChatPort, synth: MockSpeechSynthesisPort) -> ConversationService {
        ConversationService::new(Arc::new(chat), Arc::new(synth), Arc::new(clip_store()))
    }

    fn english_science_beginner() -> PracticeSession {
        PracticeSession::new(SessionSelection::new(
            Language::English,
            Topic::Science,
            ProficiencyLevel::Beginner,
        ))
    }

    #[tokio::test]
    async fn start_appends_single_ai_turn() {
        let mut chat = MockChatPort::new();
        chat.expect_complete()
            .withf(|messages| {
                messages.len() == 1
                    && messages[0].role == MessageRole::System
                    && messages[0].content.contains("Science")
                    && messages[0].content.contains("Beginner")
            })
            .times(1)
            .returning(|_| Ok(reply("Hello! Let's talk about science.")));

        let service = service(chat, synthesizer(1));
        let mut session = english_science_beginner();

        let outcome = service.start(&mut session).await.unwrap();

        assert_eq!(session.log.len(), 1);
        let turn = session.log.last().unwrap();
        assert_eq!(turn.sender(), Sender::Ai);
        assert_eq!(turn.content(), "Hello! Let's talk about science.");
        assert_eq!(outcome.turns.len(), 1);
        assert_eq!(outcome.clips.len(), 1);
        assert_eq!(outcome.clips[0].sender, Sender::Ai);
        assert!(session.instruction.is_some());
    }

    #[tokio::test]
    async fn start_speaks_in_selected_language() {
        let mut chat = MockChatPort::new();
        chat.expect_complete().returning(|_| Ok(reply("Hallo!")));

        let mut synth = MockSpeechSynthesisPort::new();
        synth
            .expect_synthesize()
            .withf(|text, code| text == "Hallo!" && code == "de")
            .times(1)
            .returning(|_, _| Ok(speech()));

        let service = service(chat, synth);
        let mut session = PracticeSession::new(SessionSelection::new(
            Language::German,
            Topic::History,
            ProficiencyLevel::Intermediate,
        ));

        service.start(&mut session).await.unwrap();
    }

    #[tokio::test]
    async fn start_failure_leaves_session_untouched() {
        let mut chat = MockChatPort::new();
        chat.expect_complete()
            .returning(|_| Err(ApplicationError::Inference("connection refused".into())));

        let service = service(chat, synthesizer(0));
        let mut session = english_science_beginner();

        let err = service.start(&mut session).await.unwrap_err();

        assert!(matches!(err, ApplicationError::Inference(_)));
        assert!(session.log.is_empty());
        assert!(session.instruction.is_none());
    }

    #[tokio::test]
    async fn submit_text_appends_user_then_ai_and_speaks_twice() {
        let mut chat = MockChatPort::new();
        chat.expect_complete()
            .withf(|messages| {
                messages.len() == 1
                    && messages[0].role == MessageRole::User
                    && messages[0].content == "Hello"
            })
            .times(1)
            .returning(|_| Ok(reply("Hi! How are you?")));

        let spoken = Arc::new(Mutex::new(Vec::new()));
        let record = Arc::clone(&spoken);
        let mut synth = MockSpeechSynthesisPort::new();
        synth
            .expect_synthesize()
            .times(2)
            .returning(move |text, _| {
                record.lock().unwrap().push(text.to_string());
                Ok(speech())
            });

        let service = service(chat, synth);
        let mut session = english_science_beginner();

        let outcome = service.submit_text(&mut session, "Hello").await.unwrap();

        let turns: Vec<_> = session
            .log
            .snapshot()
            .map(|t| (t.sender(), t.content().to_string()))
            .collect();
        assert_eq!(
            turns,
            [
                (Sender::User, "Hello".to_string()),
                (Sender::Ai, "Hi! How are you?".to_string()),
            ]
        );
        assert_eq!(*spoken.lock().unwrap(), ["Hello", "Hi! How are you?"]);
        assert_eq!(outcome.clips.len(), 2);
        assert_eq!(outcome.clips[0].sender, Sender::User);
    }

    #[tokio::test]
    async fn submit_text_keeps_raw_text() {
        let mut chat = MockChatPort::new();
        chat.expect_complete()
            .withf(|messages| messages[0].content == "  ciao  ")
            .returning(|_| Ok(reply("Ciao!")));

        let service = service(chat, synthesizer(2));
        let mut session = english_science_beginner();

        service.submit_text(&mut session, "  ciao  ").await.unwrap();
        assert_eq!(session.log.snapshot().next().unwrap().content(), "  ciao  ");
    }

    #[tokio::test]
    async fn submit_text_rejects_blank_message() {
        let mut chat = MockChatPort::new();
        chat.expect_complete().never();

        let service = service(chat, synthesizer(0));
        let mut session = english_science_beginner();

        let err = service.submit_text(&mut session, "   ").await.unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::EmptyMessage)
        ));
        assert!(session.log.is_empty());
    }

    #[tokio::test]
    async fn chat_failure_leaves_log_length_unchanged() {
        let mut chat = MockChatPort::new();
        let mut calls = 0;
        chat.expect_complete().returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(reply("Welcome"))
            } else {
                Err(ApplicationError::RateLimited)
            }
        });

        let service = service(chat, synthesizer(1));
        let mut session = english_science_beginner();
        service.start(&mut session).await.unwrap();

        let err = service.submit_text(&mut session, "Hello").await.unwrap_err();

        assert!(matches!(err, ApplicationError::RateLimited));
        assert_eq!(session.log.len(), 1);
    }

    #[tokio::test]
    async fn synthesis_failure_keeps_committed_turns() {
        let mut chat = MockChatPort::new();
        chat.expect_complete().returning(|_| Ok(reply("Sure")));

        let mut synth = MockSpeechSynthesisPort::new();
        synth
            .expect_synthesize()
            .returning(|_, _| Err(ApplicationError::ExternalService("tts down".into())));

        let service = service(chat, synth);
        let mut session = english_science_beginner();

        let err = service.submit_text(&mut session, "Hello").await.unwrap_err();

        assert!(err.is_collaborator_failure());
        assert_eq!(session.log.len(), 2);
    }

    #[tokio::test]
    async fn submit_recognized_speaks_only_the_reply() {
        let mut chat = MockChatPort::new();
        chat.expect_complete().returning(|_| Ok(reply("Très bien!")));

        let mut synth = MockSpeechSynthesisPort::new();
        synth
            .expect_synthesize()
            .withf(|text, code| text == "Très bien!" && code == "fr")
            .times(1)
            .returning(|_, _| Ok(speech()));

        let service = service(chat, synth);
        let mut session = PracticeSession::new(SessionSelection::new(
            Language::French,
            Topic::Art,
            ProficiencyLevel::Advanced,
        ));

        let outcome = service
            .submit_recognized(&mut session, "Bonjour")
            .await
            .unwrap();

        assert_eq!(session.log.len(), 2);
        assert_eq!(outcome.turns[0].sender(), Sender::User);
        assert_eq!(outcome.clips.len(), 1);
        assert_eq!(outcome.clips[0].sender, Sender::Ai);
    }

    #[tokio::test]
    async fn forwarding_history_sends_instruction_and_transcript() {
        let mut chat = MockChatPort::new();
        chat.expect_complete()
            .withf(|messages| messages.len() == 1)
            .times(1)
            .returning(|_| Ok(reply("Welcome")));
        chat.expect_complete()
            .withf(|messages| {
                let roles: Vec<_> = messages.iter().map(|m| m.role).collect();
                roles
                    == [
                        MessageRole::System,
                        MessageRole::Assistant,
                        MessageRole::User,
                    ]
                    && messages[2].content == "Hello"
            })
            .times(1)
            .returning(|_| Ok(reply("Hi")));

        let service = service(chat, synthesizer(3)).with_config(ConversationConfig {
            forward_history: true,
        });
        let mut session = english_science_beginner();

        service.start(&mut session).await.unwrap();
        service.submit_text(&mut session, "Hello").await.unwrap();

        assert_eq!(session.log.len(), 3);
    }

    #[tokio::test]
    async fn clear_empties_log_and_clips_but_keeps_instruction() {
        let mut chat = MockChatPort::new();
        chat.expect_complete().returning(|_| Ok(reply("Welcome")));

        let mut clips = storing_clips();
        clips.expect_clear().times(1).returning(|| Ok(()));

        let service =
            ConversationService::new(Arc::new(chat), Arc::new(synthesizer(1)), Arc::new(clips));
        let mut session = english_science_beginner();
        service.start(&mut session).await.unwrap();

        service.clear(&mut session).await.unwrap();

        assert!(session.log.is_empty());
        assert!(session.instruction.is_some());
    }

    #[tokio::test]
    async fn failed_clip_clear_keeps_transcript() {
        let mut chat = MockChatPort::new();
        chat.expect_complete().returning(|_| Ok(reply("Welcome")));

        let mut clips = storing_clips();
        clips
            .expect_clear()
            .times(1)
            .returning(|| Err(ApplicationError::Internal("disk full".into())));

        let service =
            ConversationService::new(Arc::new(chat), Arc::new(synthesizer(1)), Arc::new(clips));
        let mut session = english_science_beginner();
        service.start(&mut session).await.unwrap();

        let err = service.clear(&mut session).await.unwrap_err();

        assert!(matches!(err, ApplicationError::Internal(_)));
        assert_eq!(session.log.len(), 1);
    }

    #[test]
    fn config_defaults_to_no_history() {
        assert!(!ConversationConfig::default().forward_history);
        let parsed: ConversationConfig = serde_json::from_str("{}").unwrap();
        assert!(!parsed.forward_history);
    }

    #[test]
    fn debug_shows_config() {
        let service = service(MockChatPort::new(), MockSpeechSynthesisPort::new());
        assert!(format!("{service:?}").contains("forward_history"));
    }
}
