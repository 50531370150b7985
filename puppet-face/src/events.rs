//! Coordinator state snapshots and notifications

use crate::types::{AnimationClip, ExpressionId, GestureId};
use chrono::{DateTime, Utc};
use puppet_spk::SpeechOutcome;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Animation state consumed by the render layer each frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimationSnapshot {
    pub clip: AnimationClip,
    pub expression: ExpressionId,
    pub gesture: GestureId,
    pub mouth_intensity: f32,
    pub is_speaking: bool,
    /// Active speech session, if any
    pub session: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Avatar,
}

/// One line of the chat transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn new(speaker: Speaker, content: impl Into<String>) -> Self {
        Self {
            speaker,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoordinatorEvent {
    Message(TranscriptEntry),
    StateChanged(AnimationSnapshot),
    SpeechStarted { session: Uuid },
    SpeechEnded { session: Uuid, outcome: SpeechOutcome },
    GestureRejected { gesture: GestureId, reason: String },
    AnimationRejected { clip: AnimationClip, reason: String },
    Recovered { reason: String },
}
