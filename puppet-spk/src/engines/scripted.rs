//! Scripted playback engine
//! Walks the words of an utterance at a fixed pace without producing audio.
//! Used for headless runs, demos and tests.

use crate::engines::{PlaybackEngine, Utterance};
use crate::error::SpeechError;
use crate::events::WordBoundary;
use crate::voice::Voice;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::debug;

/// Words per minute at rate 1.0
const DEFAULT_WORDS_PER_MINUTE: u32 = 150;

pub struct ScriptedEngine {
    name: String,
    words_per_minute: u32,
    voices: Vec<Voice>,
    paused: watch::Sender<bool>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::with_pace(DEFAULT_WORDS_PER_MINUTE)
    }

    /// Create an engine speaking `words_per_minute` at rate 1.0
    pub fn with_pace(words_per_minute: u32) -> Self {
        let (paused, _) = watch::channel(false);
        Self {
            name: "scripted".to_string(),
            words_per_minute: words_per_minute.max(1),
            voices: vec![Voice::new("Scripted English", "en-US")],
            paused,
        }
    }

    pub fn with_voices(mut self, voices: Vec<Voice>) -> Self {
        self.voices = voices;
        self
    }

    /// Time spent on each word for the given rate multiplier
    pub fn word_duration(&self, rate: f32) -> Duration {
        let rate = if rate.is_finite() { rate.max(0.1) } else { 1.0 };
        Duration::from_secs_f64(60.0 / (self.words_per_minute as f64 * rate as f64))
    }

    async fn wait_while_paused(&self) {
        let mut paused = self.paused.subscribe();
        loop {
            let is_paused = *paused.borrow_and_update();
            if !is_paused || paused.changed().await.is_err() {
                break;
            }
        }
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlaybackEngine for ScriptedEngine {
    async fn play(
        &self,
        utterance: &Utterance,
        boundaries: mpsc::UnboundedSender<WordBoundary>,
    ) -> Result<(), SpeechError> {
        let step = self.word_duration(utterance.rate);
        let base = utterance.text.as_ptr() as usize;

        for (index, word) in utterance.text.split_whitespace().enumerate() {
            self.wait_while_paused().await;

            let boundary = WordBoundary {
                index,
                char_index: word.as_ptr() as usize - base,
                word: word.to_string(),
            };
            if boundaries.send(boundary).is_err() {
                debug!("Boundary receiver dropped, stopping scripted playback");
                return Ok(());
            }
            tokio::time::sleep(step).await;
        }

        Ok(())
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, SpeechError> {
        Ok(self.voices.clone())
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn pause(&self) {
        self.paused.send_replace(true);
    }

    fn resume(&self) {
        self.paused.send_replace(false);
    }
}
