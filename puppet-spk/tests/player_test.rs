//! Tests for SpeechPlayer sessions
//! Event ordering, cancellation, replacement and engine failures

use async_trait::async_trait;
use puppet_spk::config::SpeechConfig;
use puppet_spk::engines::{PlaybackEngine, ScriptedEngine, Utterance};
use puppet_spk::error::SpeechError;
use puppet_spk::events::{SpeechEvent, SpeechOutcome, WordBoundary};
use puppet_spk::player::{SpeechPlayer, SpeechService, SpeechSession};
use puppet_spk::voice::Voice;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Engine that reports one word and then fails
struct BrokenEngine;

#[async_trait]
impl PlaybackEngine for BrokenEngine {
    async fn play(
        &self,
        _utterance: &Utterance,
        boundaries: mpsc::UnboundedSender<WordBoundary>,
    ) -> Result<(), SpeechError> {
        let _ = boundaries.send(WordBoundary {
            index: 0,
            char_index: 0,
            word: "Hello".to_string(),
        });
        Err(SpeechError::Engine("audio device lost".to_string()))
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, SpeechError> {
        Ok(Vec::new())
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "broken"
    }
}

struct OfflineEngine;

#[async_trait]
impl PlaybackEngine for OfflineEngine {
    async fn play(
        &self,
        _utterance: &Utterance,
        _boundaries: mpsc::UnboundedSender<WordBoundary>,
    ) -> Result<(), SpeechError> {
        Ok(())
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, SpeechError> {
        Ok(Vec::new())
    }

    fn is_available(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "offline"
    }
}

fn scripted_player() -> SpeechPlayer {
    SpeechPlayer::new(SpeechConfig::default(), Arc::new(ScriptedEngine::new())).unwrap()
}

async fn collect(mut session: SpeechSession) -> Vec<SpeechEvent> {
    let mut events = Vec::new();
    while let Some(event) = session.next_event().await {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn test_session_event_order() {
    let player = scripted_player();
    let session = player.speak("Hello there friend").unwrap();
    let events = collect(session).await;

    assert_eq!(events.len(), 5);
    assert_eq!(events[0], SpeechEvent::Started);
    let words: Vec<_> = events[1..4]
        .iter()
        .map(|e| match e {
            SpeechEvent::WordBoundary(b) => b.word.clone(),
            other => panic!("Expected word boundary, got {:?}", other),
        })
        .collect();
    assert_eq!(words, vec!["Hello", "there", "friend"]);
    assert_eq!(events[4], SpeechEvent::Ended(SpeechOutcome::Completed));
    assert!(!player.is_speaking());
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_session() {
    let player = scripted_player();
    let mut session = player.speak("one two three four five six").unwrap();

    assert_eq!(session.next_event().await, Some(SpeechEvent::Started));
    assert!(matches!(session.next_event().await, Some(SpeechEvent::WordBoundary(_))));
    assert!(player.is_speaking());

    player.stop();
    let rest = collect(session).await;

    assert_eq!(rest.last(), Some(&SpeechEvent::Ended(SpeechOutcome::Cancelled)));
    let ended = rest.iter().filter(|e| matches!(e, SpeechEvent::Ended(_))).count();
    assert_eq!(ended, 1);
    assert!(!player.is_speaking());
}

#[tokio::test(start_paused = true)]
async fn test_new_utterance_replaces_old() {
    let player = scripted_player();
    let first = player.speak("first utterance with several words").unwrap();
    let second = player.speak("second").unwrap();
    assert_ne!(first.id(), second.id());

    let first_events = collect(first).await;
    let second_events = collect(second).await;

    assert_eq!(first_events.first(), Some(&SpeechEvent::Started));
    assert_eq!(
        first_events.last(),
        Some(&SpeechEvent::Ended(SpeechOutcome::Cancelled))
    );
    assert_eq!(
        second_events.last(),
        Some(&SpeechEvent::Ended(SpeechOutcome::Completed))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_speak_leaves_one_session_running() {
    let engine = Arc::new(ScriptedEngine::with_pace(3000));
    let player = Arc::new(SpeechPlayer::new(SpeechConfig::default(), engine).unwrap());

    for _ in 0..20 {
        let barrier = Arc::new(tokio::sync::Barrier::new(2));
        let tasks: Vec<_> = ["left side talking now", "right side talking now"]
            .into_iter()
            .map(|text| {
                let player = player.clone();
                let barrier = barrier.clone();
                tokio::spawn(async move {
                    barrier.wait().await;
                    let session = player.speak(text).unwrap();
                    collect(session).await
                })
            })
            .collect();

        let mut outcomes = Vec::new();
        for task in tasks {
            match task.await.unwrap().last() {
                Some(SpeechEvent::Ended(outcome)) => outcomes.push(outcome.clone()),
                other => panic!("session ended without outcome: {:?}", other),
            }
        }

        let completed = outcomes
            .iter()
            .filter(|o| **o == SpeechOutcome::Completed)
            .count();
        let cancelled = outcomes
            .iter()
            .filter(|o| **o == SpeechOutcome::Cancelled)
            .count();
        assert_eq!((completed, cancelled), (1, 1), "outcomes: {:?}", outcomes);
        assert!(!player.is_speaking());
    }
}

#[tokio::test]
async fn test_engine_failure_ends_session_with_error() {
    let player = SpeechPlayer::new(SpeechConfig::default(), Arc::new(BrokenEngine)).unwrap();
    let events = collect(player.speak("Hello world").unwrap()).await;

    assert_eq!(events[0], SpeechEvent::Started);
    assert!(matches!(events[1], SpeechEvent::WordBoundary(_)));
    match &events[2] {
        SpeechEvent::Ended(outcome) => {
            assert!(outcome.is_error());
        }
        other => panic!("Expected Ended, got {:?}", other),
    }
    assert_eq!(events.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_pause_and_resume() {
    let player = scripted_player();
    let mut session = player.speak("alpha beta gamma").unwrap();

    assert_eq!(session.next_event().await, Some(SpeechEvent::Started));
    assert!(matches!(session.next_event().await, Some(SpeechEvent::WordBoundary(_))));

    player.pause();
    tokio::time::sleep(Duration::from_secs(10)).await;
    let (handle, mut events) = session.into_parts();
    assert!(events.try_recv().is_err());
    assert!(!handle.is_finished());

    player.resume();
    let mut remaining = Vec::new();
    while let Some(event) = events.recv().await {
        remaining.push(event);
    }
    assert_eq!(remaining.len(), 3);
    assert_eq!(
        remaining.last(),
        Some(&SpeechEvent::Ended(SpeechOutcome::Completed))
    );
}

#[test]
fn test_unavailable_engine_rejected() {
    let result = SpeechPlayer::new(SpeechConfig::default(), Arc::new(OfflineEngine));
    match result {
        Err(SpeechError::Engine(msg)) => assert!(msg.contains("offline")),
        _ => panic!("Expected Engine error for unavailable engine"),
    }
}

#[tokio::test]
async fn test_text_too_long_rejected() {
    let mut config = SpeechConfig::default();
    config.max_text_length = 8;
    let player = SpeechPlayer::new(config, Arc::new(ScriptedEngine::new())).unwrap();
    assert!(matches!(
        player.speak("far too long for this"),
        Err(SpeechError::Playback(_))
    ));
}

#[tokio::test]
async fn test_voice_selection_from_engine() {
    let engine = ScriptedEngine::new().with_voices(vec![
        Voice::new("Samantha", "en-US"),
        Voice::new("Google US English", "en-US"),
        Voice::new("Google español", "es-ES"),
    ]);
    let player = SpeechPlayer::new(SpeechConfig::default(), Arc::new(engine)).unwrap();

    player.load_voices().await.unwrap();
    assert_eq!(player.selected_voice().unwrap().name, "Google US English");

    player.set_voice_by_language("es").unwrap();
    assert_eq!(player.selected_voice().unwrap().name, "Google español");

    player.set_voice("Samantha").unwrap();
    assert_eq!(player.selected_voice().unwrap().name, "Samantha");
}
