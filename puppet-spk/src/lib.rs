//! puppet-spk: Speech playback for avatars
//!
//! Provides utterance playback with:
//! - Pluggable playback engines
//! - One active utterance at a time, cancellable through a session handle
//! - Start / word-boundary / end events for lip-sync
//! - Voice catalogue and selection

pub mod error;
pub mod config;
pub mod events;
pub mod voice;
pub mod engines;
pub mod player;

pub use error::SpeechError;
pub use config::{SpeechConfig, VoiceConfig};
pub use events::{SpeechEvent, SpeechOutcome, WordBoundary};
pub use voice::{select_voice, Voice};
pub use engines::{PlaybackEngine, ScriptedEngine, Utterance};
pub use player::{SessionHandle, SpeechPlayer, SpeechService, SpeechSession};
