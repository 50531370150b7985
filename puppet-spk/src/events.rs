//! Playback session events

use serde::{Deserialize, Serialize};

/// Word boundary reported by the engine while an utterance plays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordBoundary {
    /// Zero-based word index within the utterance
    pub index: usize,
    /// Byte offset of the word in the utterance text
    pub char_index: usize,
    /// The word itself
    pub word: String,
}

/// How a playback session ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeechOutcome {
    /// Utterance played to the end
    Completed,
    /// Engine reported an error
    Failed(String),
    /// Session was cancelled (stop, or a newer utterance replaced it)
    Cancelled,
}

impl SpeechOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, SpeechOutcome::Failed(_))
    }
}

/// Events delivered by a session, in order: one `Started`, any number of
/// `WordBoundary`, one `Ended`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeechEvent {
    Started,
    WordBoundary(WordBoundary),
    Ended(SpeechOutcome),
}
