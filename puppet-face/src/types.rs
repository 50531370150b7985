//! Expression, gesture and animation clip identifiers

use crate::error::AvatarError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lowercase and drop separators so "thumbs_up", "Thumbs Up" and "thumbsUp" agree
fn normalize(id: &str) -> String {
    id.trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpressionId {
    #[default]
    Neutral,
    Happy,
    Sad,
    Surprised,
    Thinking,
    Angry,
    Worried,
    Smile,
}

impl ExpressionId {
    pub const ALL: [ExpressionId; 8] = [
        ExpressionId::Neutral,
        ExpressionId::Happy,
        ExpressionId::Sad,
        ExpressionId::Surprised,
        ExpressionId::Thinking,
        ExpressionId::Angry,
        ExpressionId::Worried,
        ExpressionId::Smile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpressionId::Neutral => "neutral",
            ExpressionId::Happy => "happy",
            ExpressionId::Sad => "sad",
            ExpressionId::Surprised => "surprised",
            ExpressionId::Thinking => "thinking",
            ExpressionId::Angry => "angry",
            ExpressionId::Worried => "worried",
            ExpressionId::Smile => "smile",
        }
    }
}

impl FromStr for ExpressionId {
    type Err = AvatarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize(s);
        ExpressionId::ALL
            .into_iter()
            .find(|e| e.as_str() == key)
            .ok_or_else(|| AvatarError::UnknownId {
                kind: "expression",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GestureId {
    #[default]
    Idle,
    Wave,
    Point,
    ThumbsUp,
    ThumbsDown,
    Shrug,
    Clap,
    Thinking,
    Explain,
}

impl GestureId {
    pub const ALL: [GestureId; 9] = [
        GestureId::Idle,
        GestureId::Wave,
        GestureId::Point,
        GestureId::ThumbsUp,
        GestureId::ThumbsDown,
        GestureId::Shrug,
        GestureId::Clap,
        GestureId::Thinking,
        GestureId::Explain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GestureId::Idle => "idle",
            GestureId::Wave => "wave",
            GestureId::Point => "point",
            GestureId::ThumbsUp => "thumbsUp",
            GestureId::ThumbsDown => "thumbsDown",
            GestureId::Shrug => "shrug",
            GestureId::Clap => "clap",
            GestureId::Thinking => "thinking",
            GestureId::Explain => "explain",
        }
    }
}

impl FromStr for GestureId {
    type Err = AvatarError;

    /// Accepts camelCase or snake_case ids; "none" is an alias of idle
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize(s);
        if key == "none" {
            return Ok(GestureId::Idle);
        }
        GestureId::ALL
            .into_iter()
            .find(|g| g.as_str().to_lowercase() == key)
            .ok_or_else(|| AvatarError::UnknownId {
                kind: "gesture",
                value: s.to_string(),
            })
    }
}

/// Body animation clip played by the scene's animation mixer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimationClip {
    #[default]
    Idle,
    Wave,
    Talking,
    Thinking,
    Happy,
    Surprised,
    Nodding,
    Shaking,
}

impl AnimationClip {
    pub const ALL: [AnimationClip; 8] = [
        AnimationClip::Idle,
        AnimationClip::Wave,
        AnimationClip::Talking,
        AnimationClip::Thinking,
        AnimationClip::Happy,
        AnimationClip::Surprised,
        AnimationClip::Nodding,
        AnimationClip::Shaking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationClip::Idle => "idle",
            AnimationClip::Wave => "wave",
            AnimationClip::Talking => "talking",
            AnimationClip::Thinking => "thinking",
            AnimationClip::Happy => "happy",
            AnimationClip::Surprised => "surprised",
            AnimationClip::Nodding => "nodding",
            AnimationClip::Shaking => "shaking",
        }
    }

    /// Clip name in the model's animation set
    pub fn mixer_name(&self) -> &'static str {
        match self {
            AnimationClip::Idle => "Idle",
            AnimationClip::Wave => "Wave",
            AnimationClip::Talking => "Talking",
            AnimationClip::Thinking => "Thinking",
            AnimationClip::Happy => "Happy",
            AnimationClip::Surprised => "Surprised",
            AnimationClip::Nodding => "Nodding",
            AnimationClip::Shaking => "Shaking",
        }
    }

    /// Lenient lookup used by the mixer: unknown labels play `Idle`
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or_default()
    }
}

impl FromStr for AnimationClip {
    type Err = AvatarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize(s);
        AnimationClip::ALL
            .into_iter()
            .find(|c| c.as_str() == key)
            .ok_or_else(|| AvatarError::UnknownId {
                kind: "animation",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for ExpressionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for GestureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AnimationClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gesture_id_parsing() {
        assert_eq!("thumbsUp".parse::<GestureId>().unwrap(), GestureId::ThumbsUp);
        assert_eq!("thumbs_up".parse::<GestureId>().unwrap(), GestureId::ThumbsUp);
        assert_eq!("none".parse::<GestureId>().unwrap(), GestureId::Idle);
        assert!("moonwalk".parse::<GestureId>().is_err());
    }

    #[test]
    fn test_expression_id_parsing() {
        assert_eq!("Happy".parse::<ExpressionId>().unwrap(), ExpressionId::Happy);
        assert!(matches!(
            "bored".parse::<ExpressionId>(),
            Err(AvatarError::UnknownId { kind: "expression", .. })
        ));
    }

    #[test]
    fn test_clip_mixer_names() {
        assert_eq!(AnimationClip::Nodding.mixer_name(), "Nodding");
        assert_eq!(AnimationClip::from_label("breakdance"), AnimationClip::Idle);
        assert_eq!(AnimationClip::from_label("shaking"), AnimationClip::Shaking);
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let json = serde_json::to_string(&GestureId::ThumbsDown).unwrap();
        assert_eq!(json, "\"thumbsDown\"");
        let parsed: GestureId = serde_json::from_str("\"thumbsUp\"").unwrap();
        assert_eq!(parsed, GestureId::ThumbsUp);
    }
}
