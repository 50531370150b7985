//! Keyword classifier mapping reply text to an expression and a gesture
//!
//! Categories are tried in a fixed priority order and the first category with
//! any keyword contained in the lowercased text wins. Matching is plain
//! substring containment, so "hi" also matches inside "this".

use crate::types::{ExpressionId, GestureId};
use serde::{Deserialize, Serialize};

/// Expression categories in priority order
const EXPRESSION_RULES: &[(ExpressionId, &[&str])] = &[
    (
        ExpressionId::Happy,
        &[
            "happy", "great", "awesome", "excellent", "wonderful", "fantastic", "love", "enjoy",
            "amazing", "perfect", "glad", "smile",
        ],
    ),
    (
        ExpressionId::Sad,
        &[
            "sad", "sorry", "unfortunately", "disappointed", "upset", "regret", "terrible",
            "bad news",
        ],
    ),
    (
        ExpressionId::Surprised,
        &["wow", "amazing", "incredible", "unbelievable", "surprising", "shocked", "omg"],
    ),
    (
        ExpressionId::Angry,
        &["angry", "furious", "mad", "annoyed", "frustrated", "irritated"],
    ),
    (
        ExpressionId::Thinking,
        &["think", "maybe", "perhaps", "consider", "let me", "hmm", "well", "actually"],
    ),
    (
        ExpressionId::Worried,
        &["worried", "scared", "afraid", "nervous", "anxious", "concern", "fear"],
    ),
];

/// Gesture categories in priority order
const GESTURE_RULES: &[(GestureId, &[&str])] = &[
    (
        GestureId::Wave,
        &["hello", "hi", "hey", "greetings", "welcome", "bye", "goodbye"],
    ),
    (GestureId::Point, &["look", "see", "check", "there", "this", "point"]),
    (
        GestureId::ThumbsUp,
        &["good", "great", "perfect", "correct", "right", "yes", "agree", "okay", "ok"],
    ),
    (
        GestureId::ThumbsDown,
        &["no", "wrong", "bad", "incorrect", "disagree", "nope"],
    ),
    (
        GestureId::Shrug,
        &["dont know", "not sure", "maybe", "dunno", "shrug"],
    ),
    (
        GestureId::Clap,
        &["congratulations", "congrats", "well done", "bravo", "applause", "amazing job"],
    ),
    (
        GestureId::Thinking,
        &["think", "consider", "hmm", "let me think", "analyzing"],
    ),
    (
        GestureId::Explain,
        &["explain", "tell you", "let me", "heres", "basically", "essentially", "means that"],
    ),
];

/// Classifier output; expression and gesture are chosen independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Classification {
    pub expression: ExpressionId,
    pub gesture: GestureId,
}

/// Maps text to an (expression, gesture) pair
pub trait EmotionClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Classification;
}

/// Rule-based keyword classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct TextEmotionClassifier;

impl TextEmotionClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl EmotionClassifier for TextEmotionClassifier {
    fn classify(&self, text: &str) -> Classification {
        if text.trim().is_empty() {
            return Classification::default();
        }

        let lower = text.to_lowercase();
        Classification {
            expression: first_match(EXPRESSION_RULES, &lower).unwrap_or_default(),
            gesture: first_match(GESTURE_RULES, &lower).unwrap_or_default(),
        }
    }
}

fn first_match<T: Copy>(rules: &[(T, &[&str])], lower: &str) -> Option<T> {
    rules
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(id, _)| *id)
}
