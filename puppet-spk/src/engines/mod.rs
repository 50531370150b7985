//! Playback engine implementations

pub mod scripted;

pub use scripted::ScriptedEngine;

use crate::error::SpeechError;
use crate::events::WordBoundary;
use crate::voice::Voice;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// A single utterance handed to an engine
#[derive(Debug, Clone)]
pub struct Utterance {
    pub text: String,
    pub voice: Option<Voice>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

/// Trait for playback engines
///
/// `play` resolves when the utterance has finished playing. Dropping the
/// returned future stops playback.
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    /// Play an utterance, reporting word boundaries as they are reached
    async fn play(
        &self,
        utterance: &Utterance,
        boundaries: mpsc::UnboundedSender<WordBoundary>,
    ) -> Result<(), SpeechError>;

    /// Get available voices
    async fn list_voices(&self) -> Result<Vec<Voice>, SpeechError>;

    /// Check if engine is available
    fn is_available(&self) -> bool;

    /// Get engine name
    fn name(&self) -> &str;

    /// Pause the utterance in progress
    fn pause(&self) {}

    /// Resume a paused utterance
    fn resume(&self) {}
}
