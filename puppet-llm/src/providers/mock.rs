use crate::error::Result;
use crate::providers::ResponseProvider;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use regex::Regex;
use std::time::Duration;

const GREETINGS: &[&str] = &[
    "Hello! It's great to meet you! How can I help you today?",
    "Hi there! I'm here to assist you. What would you like to talk about?",
    "Hey! Nice to see you! What's on your mind?",
];

const QUESTIONS: &[&str] = &[
    "That's an interesting question! Let me think about that for a moment.",
    "Great question! I'd be happy to help you understand that better.",
    "I appreciate you asking! Here's what I think...",
];

const GENERAL: &[&str] = &[
    "I understand what you're saying. That's a thoughtful perspective!",
    "Thanks for sharing that with me. It's interesting to hear your thoughts.",
    "I see! That makes sense. Would you like to explore this topic more?",
];

const FAREWELLS: &[&str] = &[
    "It was wonderful talking with you! Feel free to come back anytime!",
    "Thanks for the chat! Have a great day!",
    "Goodbye! Looking forward to our next conversation!",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    Farewell,
    Question,
    General,
}

impl Intent {
    pub fn replies(&self) -> &'static [&'static str] {
        match self {
            Intent::Greeting => GREETINGS,
            Intent::Farewell => FAREWELLS,
            Intent::Question => QUESTIONS,
            Intent::General => GENERAL,
        }
    }
}

/// Canned replies chosen by simple intent detection, with simulated latency
pub struct MockResponder {
    greeting: Regex,
    farewell: Regex,
    delay: Duration,
}

impl MockResponder {
    pub fn new(delay: Duration) -> Result<Self> {
        Ok(Self {
            greeting: Regex::new(r"(?i)\b(hi|hello|hey|greetings)\b")?,
            farewell: Regex::new(r"(?i)\b(bye|goodbye|see you|farewell)\b")?,
            delay,
        })
    }

    /// Greetings win over farewells, which win over questions
    pub fn intent(&self, message: &str) -> Intent {
        if self.greeting.is_match(message) {
            Intent::Greeting
        } else if self.farewell.is_match(message) {
            Intent::Farewell
        } else if message.contains('?') {
            Intent::Question
        } else {
            Intent::General
        }
    }

    fn pick(intent: Intent) -> String {
        let replies = intent.replies();
        replies
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(replies[0])
            .to_string()
    }
}

#[async_trait]
impl ResponseProvider for MockResponder {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get_response(&self, message: &str) -> Result<String> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let intent = self.intent(message);
        tracing::debug!("Mock reply for intent {:?}", intent);
        Ok(Self::pick(intent))
    }
}
