//! Clip store keeping each synthesized utterance in its own temporary file
//!
//! Files are removed when a clip is evicted, when the store is cleared and
//! when the store itself is dropped.

use std::{collections::VecDeque, io::Write, path::PathBuf};

use application::{
    error::ApplicationError,
    ports::{ClipInfo, ClipStorePort, SpeechClip, SynthesizedSpeech},
};
use async_trait::async_trait;
use domain::{ClipId, Turn};
use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

#[derive(Debug)]
struct StoredClip {
    info: ClipInfo,
    file: NamedTempFile,
}

/// Bounded FIFO of speech clips backed by temporary files
#[derive(Debug)]
pub struct TempFileClipStore {
    clips: Mutex<VecDeque<StoredClip>>,
    max_retained: usize,
    directory: Option<PathBuf>,
}

impl TempFileClipStore {
    /// Create a store that keeps at most `max_retained` clips
    pub fn new(max_retained: usize) -> Self {
        Self {
            clips: Mutex::new(VecDeque::new()),
            max_retained: max_retained.max(1),
            directory: None,
        }
    }

    /// Place clip files in `directory` instead of the system temp dir
    #[must_use]
    pub fn in_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    fn write_file(
        directory: Option<PathBuf>,
        suffix: &str,
        audio: &[u8],
    ) -> std::io::Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("polyglot-clip-").suffix(suffix);
        let mut file = match directory {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(audio)?;
        file.flush()?;
        Ok(file)
    }
}

#[async_trait]
impl ClipStorePort for TempFileClipStore {
    #[instrument(skip(self, turn, speech), fields(turn_id = %turn.id(), bytes = speech.audio.len()))]
    async fn store(
        &self,
        turn: &Turn,
        speech: SynthesizedSpeech,
    ) -> Result<ClipInfo, ApplicationError> {
        let info = ClipInfo {
            id: ClipId::new(),
            turn_id: turn.id(),
            sender: turn.sender(),
            format: speech.format,
            size_bytes: speech.audio.len(),
        };

        let suffix = format!(".{}", speech.format.extension());
        let directory = self.directory.clone();
        let audio = speech.audio;
        let file = tokio::task::spawn_blocking(move || Self::write_file(directory, &suffix, &audio))
            .await
            .map_err(|e| ApplicationError::Internal(format!("Clip writer failed: {e}")))?
            .map_err(|e| ApplicationError::Internal(format!("Failed to write clip: {e}")))?;

        let mut clips = self.clips.lock();
        clips.push_back(StoredClip {
            info: info.clone(),
            file,
        });
        while clips.len() > self.max_retained {
            if let Some(evicted) = clips.pop_front() {
                debug!(clip_id = %evicted.info.id, "Evicted oldest clip");
            }
        }

        Ok(info)
    }

    async fn load(&self, id: ClipId) -> Result<Option<SpeechClip>, ApplicationError> {
        let Some((info, path)) = self
            .clips
            .lock()
            .iter()
            .find(|clip| clip.info.id == id)
            .map(|clip| (clip.info.clone(), clip.file.path().to_path_buf()))
        else {
            return Ok(None);
        };

        match tokio::fs::read(&path).await {
            Ok(audio) => Ok(Some(SpeechClip { info, audio })),
            // Evicted between lookup and read
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ApplicationError::Internal(format!(
                "Failed to read clip {id}: {e}"
            ))),
        }
    }

    async fn clear(&self) -> Result<(), ApplicationError> {
        let removed: Vec<StoredClip> = self.clips.lock().drain(..).collect();
        debug!(count = removed.len(), "Cleared clips");
        Ok(())
    }

    fn clip_count(&self) -> usize {
        self.clips.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use domain::{AudioFormat, Sender};

    use super::*;

    fn speech(bytes: &[u8]) -> SynthesizedSpeech {
        SynthesizedSpeech {
            audio: bytes.to_vec(),
            format: AudioFormat::Mp3,
            duration_ms: None,
        }
    }

    #[tokio::test]
    async fn store_then_load_returns_audio() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempFileClipStore::new(4).in_directory(dir.path());
        let turn = Turn::new(Sender::Ai, "Bonjour");

        let info = store.store(&turn, speech(b"ID3audio")).await.unwrap();
        let clip = store.load(info.id).await.unwrap().unwrap();

        assert_eq!(clip.audio, b"ID3audio");
        assert_eq!(clip.info.turn_id, turn.id());
        assert_eq!(clip.info.sender, Sender::Ai);
        assert_eq!(clip.mime_type(), "audio/mpeg");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn unknown_clip_is_none() {
        let store = TempFileClipStore::new(4);
        assert!(store.load(ClipId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn oldest_clips_are_evicted() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempFileClipStore::new(2).in_directory(dir.path());

        let first = store
            .store(&Turn::new(Sender::User, "one"), speech(b"1"))
            .await
            .unwrap();
        store
            .store(&Turn::new(Sender::Ai, "two"), speech(b"2"))
            .await
            .unwrap();
        let third = store
            .store(&Turn::new(Sender::User, "three"), speech(b"3"))
            .await
            .unwrap();

        assert_eq!(store.clip_count(), 2);
        assert!(store.load(first.id).await.unwrap().is_none());
        assert!(store.load(third.id).await.unwrap().is_some());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn clear_deletes_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempFileClipStore::new(8).in_directory(dir.path());
        for text in ["a", "b", "c"] {
            store
                .store(&Turn::new(Sender::Ai, text), speech(text.as_bytes()))
                .await
                .unwrap();
        }

        store.clear().await.unwrap();

        assert_eq!(store.clip_count(), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn dropping_store_deletes_files() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = TempFileClipStore::new(8).in_directory(dir.path());
            store
                .store(&Turn::new(Sender::Ai, "bye"), speech(b"bye"))
                .await
                .unwrap();
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn zero_retention_keeps_one() {
        assert_eq!(TempFileClipStore::new(0).max_retained, 1);
    }
}
