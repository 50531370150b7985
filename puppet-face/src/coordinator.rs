//! Animation coordinator
//!
//! Single owner of the avatar's animation state. Chat turns, speech playback
//! events and the manual control surface all go through here; the render
//! layer reads `snapshot()` once per frame.

use crate::classifier::{Classification, EmotionClassifier};
use crate::config::AvatarConfig;
use crate::error::AvatarError;
use crate::events::{AnimationSnapshot, CoordinatorEvent, Speaker, TranscriptEntry};
use crate::types::{AnimationClip, ExpressionId, GestureId};
use parking_lot::Mutex;
use puppet_llm::ResponseProvider;
use puppet_spk::{SessionHandle, SpeechEvent, SpeechOutcome, SpeechService, WordBoundary};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Transcript entries kept in memory
const TRANSCRIPT_LIMIT: usize = 200;

/// Mouth intensity for a uniform sample `r` in [0, 1).
/// Louder above 0.3, near-closed below.
pub fn jitter_intensity(r: f32) -> f32 {
    if r > 0.3 {
        r * 0.4
    } else {
        r * 0.15
    }
}

/// How a chat turn finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input, nothing happened
    Ignored,
    /// A newer turn started before this one could speak
    Superseded,
    /// The reply was spoken (or its session ended)
    Spoken(SpeechOutcome),
    /// Speech could not start; the fallback message was shown
    Recovered,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Expression,
    Gesture,
    Clip,
}

/// Revert timer slot. The revision changes on every write to the field, so a
/// timer that was already past its sleep when superseded still does nothing.
#[derive(Default)]
struct RevertTimer {
    revision: u64,
    handle: Option<JoinHandle<()>>,
}

impl RevertTimer {
    fn supersede(&mut self) -> u64 {
        self.revision += 1;
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.revision
    }
}

struct ActiveSession {
    id: Uuid,
    handle: SessionHandle,
}

#[derive(Default)]
struct CoordinatorState {
    clip: AnimationClip,
    expression: ExpressionId,
    gesture: GestureId,
    mouth_intensity: f32,
    is_speaking: bool,
    session: Option<ActiveSession>,
    jitter: Option<JoinHandle<()>>,
    expression_timer: RevertTimer,
    gesture_timer: RevertTimer,
    clip_timer: RevertTimer,
    turn: u64,
    transcript: Vec<TranscriptEntry>,
}

impl CoordinatorState {
    fn snapshot(&self) -> AnimationSnapshot {
        AnimationSnapshot {
            clip: self.clip,
            expression: self.expression,
            gesture: self.gesture,
            mouth_intensity: self.mouth_intensity,
            is_speaking: self.is_speaking,
            session: self.session.as_ref().map(|s| s.id),
        }
    }

    fn is_active(&self, id: Uuid) -> bool {
        self.session.as_ref().map(|s| s.id == id).unwrap_or(false)
    }

    fn timer(&mut self, field: Field) -> &mut RevertTimer {
        match field {
            Field::Expression => &mut self.expression_timer,
            Field::Gesture => &mut self.gesture_timer,
            Field::Clip => &mut self.clip_timer,
        }
    }

    fn write_expression(&mut self, expression: ExpressionId) -> u64 {
        self.expression = expression;
        self.expression_timer.supersede()
    }

    fn write_gesture(&mut self, gesture: GestureId) -> u64 {
        self.gesture = gesture;
        self.gesture_timer.supersede()
    }

    fn write_clip(&mut self, clip: AnimationClip) -> u64 {
        self.clip = clip;
        self.clip_timer.supersede()
    }

    /// {neutral, idle, idle}
    fn rest(&mut self) {
        self.write_expression(ExpressionId::Neutral);
        self.write_gesture(GestureId::Idle);
        self.write_clip(AnimationClip::Idle);
    }

    fn cancel_timers(&mut self) {
        self.expression_timer.supersede();
        self.gesture_timer.supersede();
        self.clip_timer.supersede();
    }

    fn stop_jitter(&mut self) {
        if let Some(handle) = self.jitter.take() {
            handle.abort();
        }
    }

    fn push_message(&mut self, speaker: Speaker, content: &str) -> TranscriptEntry {
        let entry = TranscriptEntry::new(speaker, content);
        self.transcript.push(entry.clone());
        if self.transcript.len() > TRANSCRIPT_LIMIT {
            let excess = self.transcript.len() - TRANSCRIPT_LIMIT;
            self.transcript.drain(..excess);
        }
        entry
    }
}

struct Inner {
    config: AvatarConfig,
    classifier: Arc<dyn EmotionClassifier>,
    speech: Arc<dyn SpeechService>,
    responder: Arc<dyn ResponseProvider>,
    state: Mutex<CoordinatorState>,
    events: broadcast::Sender<CoordinatorEvent>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        state.stop_jitter();
        state.cancel_timers();
        if let Some(session) = state.session.take() {
            session.handle.cancel();
        }
    }
}

/// Coordinates expression, gesture, clip and mouth state.
///
/// Cloning is cheap; clones share the same state. Timers hold weak references
/// and stop once every clone is dropped.
#[derive(Clone)]
pub struct AnimationCoordinator {
    inner: Arc<Inner>,
}

impl AnimationCoordinator {
    pub fn new(
        config: AvatarConfig,
        classifier: Arc<dyn EmotionClassifier>,
        speech: Arc<dyn SpeechService>,
        responder: Arc<dyn ResponseProvider>,
    ) -> Result<Self, AvatarError> {
        config.validate().map_err(AvatarError::Config)?;

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let mut state = CoordinatorState::default();
        if let Some(greeting) = config.greeting.as_deref() {
            state.push_message(Speaker::Avatar, greeting);
        }

        info!(
            "Animation coordinator ready (lip-sync: {}, gestures: {}, reply provider: {})",
            config.enable_lip_sync,
            config.enable_gestures,
            responder.name()
        );

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                classifier,
                speech,
                responder,
                state: Mutex::new(state),
                events,
            }),
        })
    }

    pub fn config(&self) -> &AvatarConfig {
        &self.inner.config
    }

    pub fn snapshot(&self) -> AnimationSnapshot {
        self.inner.state.lock().snapshot()
    }

    pub fn mouth_intensity(&self) -> f32 {
        self.inner.state.lock().mouth_intensity
    }

    pub fn is_speaking(&self) -> bool {
        self.inner.state.lock().is_speaking
    }

    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.inner.state.lock().transcript.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.inner.events.subscribe()
    }

    fn emit(&self, event: CoordinatorEvent) {
        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }

    fn emit_state(&self, snapshot: AnimationSnapshot) {
        self.emit(CoordinatorEvent::StateChanged(snapshot));
    }

    /// Run one chat turn: fetch a reply, show it, classify it and speak it.
    /// Resolves once the reply has finished speaking.
    pub async fn respond(&self, message: &str) -> TurnOutcome {
        let message = message.trim();
        if message.is_empty() {
            debug!("Ignoring blank message");
            return TurnOutcome::Ignored;
        }

        let turn = self.begin_user_turn(message);

        let reply = match self.inner.responder.get_response(message).await {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => {
                warn!("Reply provider returned an empty reply, using fallback message");
                self.inner.config.fallback_message.clone()
            }
            Err(e) => {
                warn!("Reply fetch failed: {}, using fallback message", e);
                self.inner.config.fallback_message.clone()
            }
        };

        if !self.post_reply(turn, &reply) {
            debug!("Turn {} superseded before its reply arrived", turn);
            return TurnOutcome::Superseded;
        }

        let delay = Duration::from_millis(self.inner.config.reply_display_delay_ms);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let classification = self.inner.classifier.classify(&reply);

        match self.start_reply_session(turn, &reply, &classification) {
            Ok(Some((id, events))) => TurnOutcome::Spoken(self.pump_session(id, events).await),
            Ok(None) => {
                debug!("Turn {} superseded before speaking", turn);
                TurnOutcome::Superseded
            }
            Err(e) => {
                self.recover(&format!("speech failed to start: {}", e));
                TurnOutcome::Recovered
            }
        }
    }

    /// New user message: cancel any reply in flight and look thoughtful.
    /// Returns the turn number.
    pub fn begin_user_turn(&self, message: &str) -> u64 {
        let mut state = self.inner.state.lock();
        let entry = state.push_message(Speaker::User, message);
        self.cancel_speech_locked(&mut state);

        state.turn += 1;
        state.write_expression(ExpressionId::Thinking);
        state.write_gesture(GestureId::Idle);
        state.write_clip(AnimationClip::Idle);

        let turn = state.turn;
        let snapshot = state.snapshot();
        drop(state);

        info!("User turn {} started", turn);
        self.emit(CoordinatorEvent::Message(entry));
        self.emit_state(snapshot);
        turn
    }

    /// Add the avatar's reply to the transcript if `turn` is still current
    fn post_reply(&self, turn: u64, reply: &str) -> bool {
        let mut state = self.inner.state.lock();
        if state.turn != turn {
            return false;
        }
        let entry = state.push_message(Speaker::Avatar, reply);
        drop(state);

        self.emit(CoordinatorEvent::Message(entry));
        true
    }

    /// Reply text is ready: if `turn` is still current, take the classified
    /// expression, keep the arms idle and start speaking, all under one lock.
    /// Returns `None` when a newer turn has started.
    fn start_reply_session(
        &self,
        turn: u64,
        reply: &str,
        classification: &Classification,
    ) -> Result<Option<(Uuid, mpsc::UnboundedReceiver<SpeechEvent>)>, AvatarError> {
        let mut state = self.inner.state.lock();
        if state.turn != turn {
            return Ok(None);
        }

        state.write_expression(classification.expression);
        state.write_gesture(GestureId::Idle);
        let snapshot = state.snapshot();
        let started = self.register_session(&mut state, reply);
        drop(state);

        info!(
            "Reply classified as {} / {} (gesture held idle for speech)",
            classification.expression, classification.gesture
        );
        self.emit_state(snapshot);
        started.map(Some)
    }

    /// Speak `text`, feeding its playback events back into the coordinator.
    /// Resolves when the session ends.
    pub async fn speak(&self, text: &str) -> Result<SpeechOutcome, AvatarError> {
        let (id, events) = self.start_session(text)?;
        Ok(self.pump_session(id, events).await)
    }

    fn start_session(
        &self,
        text: &str,
    ) -> Result<(Uuid, mpsc::UnboundedReceiver<SpeechEvent>), AvatarError> {
        let mut state = self.inner.state.lock();
        self.register_session(&mut state, text)
    }

    fn register_session(
        &self,
        state: &mut CoordinatorState,
        text: &str,
    ) -> Result<(Uuid, mpsc::UnboundedReceiver<SpeechEvent>), AvatarError> {
        self.cancel_speech_locked(state);

        let session = self.inner.speech.speak(text)?;
        let (handle, events) = session.into_parts();
        let id = handle.id();
        state.session = Some(ActiveSession { id, handle });

        debug!("Speech session {} registered", id);
        Ok((id, events))
    }

    async fn pump_session(
        &self,
        id: Uuid,
        mut events: mpsc::UnboundedReceiver<SpeechEvent>,
    ) -> SpeechOutcome {
        while let Some(event) = events.recv().await {
            match event {
                SpeechEvent::Started => {
                    self.on_speech_start(id);
                }
                SpeechEvent::WordBoundary(boundary) => {
                    self.on_word_boundary(id, &boundary);
                }
                SpeechEvent::Ended(outcome) => {
                    self.on_speech_end(id, outcome.clone());
                    return outcome;
                }
            }
        }

        let outcome = SpeechOutcome::Failed("session closed without ending".to_string());
        self.on_speech_end(id, outcome.clone());
        outcome
    }

    /// Speech started: mark speaking, hold gestures and start the mouth jitter.
    /// Events from any session but the active one are ignored.
    pub fn on_speech_start(&self, id: Uuid) -> bool {
        let mut state = self.inner.state.lock();
        if !state.is_active(id) {
            debug!("Ignoring start of stale session {}", id);
            return false;
        }

        state.cancel_timers();
        state.stop_jitter();
        state.is_speaking = true;
        state.write_gesture(GestureId::Idle);
        state.write_clip(AnimationClip::Idle);

        if self.inner.config.enable_lip_sync {
            state.jitter = self.spawn_jitter(id);
        }

        let snapshot = state.snapshot();
        drop(state);

        info!("Speech started ({})", id);
        self.emit(CoordinatorEvent::SpeechStarted { session: id });
        self.emit_state(snapshot);
        true
    }

    /// Word boundary: open the mouth to the emphasis value until the next jitter tick
    pub fn on_word_boundary(&self, id: Uuid, boundary: &WordBoundary) -> bool {
        let mut state = self.inner.state.lock();
        if !state.is_active(id) || !state.is_speaking {
            return false;
        }
        if self.inner.config.enable_lip_sync {
            state.mouth_intensity = self.inner.config.word_emphasis;
        }
        trace!("Word {} '{}'", boundary.index, boundary.word);
        true
    }

    /// Speech ended (any outcome): close the mouth and return to rest
    pub fn on_speech_end(&self, id: Uuid, outcome: SpeechOutcome) -> bool {
        let mut state = self.inner.state.lock();
        if !state.is_active(id) {
            debug!("Ignoring end of stale session {}", id);
            return false;
        }

        state.session = None;
        state.stop_jitter();
        state.mouth_intensity = 0.0;
        state.is_speaking = false;
        state.rest();

        let fallback = match &outcome {
            SpeechOutcome::Failed(reason) => {
                warn!("Speech session {} failed: {}", id, reason);
                let fallback = self.inner.config.fallback_message.clone();
                Some((reason.clone(), state.push_message(Speaker::Avatar, &fallback)))
            }
            _ => None,
        };

        let snapshot = state.snapshot();
        drop(state);

        info!("Speech ended ({}): {:?}", id, outcome);
        self.emit(CoordinatorEvent::SpeechEnded {
            session: id,
            outcome,
        });
        if let Some((reason, entry)) = fallback {
            self.emit(CoordinatorEvent::Message(entry));
            self.emit(CoordinatorEvent::Recovered { reason });
        }
        self.emit_state(snapshot);
        true
    }

    /// Manual expression; reverts to neutral after the dwell unless replaced
    pub fn set_expression(&self, expression: ExpressionId) {
        let mut state = self.inner.state.lock();
        let revision = state.write_expression(expression);
        if expression != ExpressionId::Neutral {
            let dwell = Duration::from_millis(self.inner.config.dwell_ms);
            state.expression_timer.handle = self.spawn_revert(Field::Expression, revision, dwell);
        }
        let snapshot = state.snapshot();
        drop(state);

        info!("Expression set to {}", expression);
        self.emit_state(snapshot);
    }

    /// Manual gesture; rejected while speaking. Reverts to idle after the dwell.
    pub fn set_gesture(&self, gesture: GestureId) -> bool {
        let mut state = self.inner.state.lock();

        let rejection = if state.is_speaking {
            Some("avatar is speaking")
        } else if !self.inner.config.enable_gestures && gesture != GestureId::Idle {
            Some("gestures are disabled")
        } else {
            None
        };

        if let Some(reason) = rejection {
            drop(state);
            info!("Gesture {} blocked: {}", gesture, reason);
            self.emit(CoordinatorEvent::GestureRejected {
                gesture,
                reason: reason.to_string(),
            });
            return false;
        }

        let revision = state.write_gesture(gesture);
        if gesture != GestureId::Idle {
            let dwell = Duration::from_millis(self.inner.config.dwell_ms);
            state.gesture_timer.handle = self.spawn_revert(Field::Gesture, revision, dwell);
        }
        let snapshot = state.snapshot();
        drop(state);

        info!("Gesture set to {}", gesture);
        self.emit_state(snapshot);
        true
    }

    /// Manual body clip; rejected while speaking. Reverts to idle after a short dwell.
    pub fn set_animation(&self, clip: AnimationClip) -> bool {
        let mut state = self.inner.state.lock();
        if state.is_speaking {
            drop(state);
            info!("Animation {} blocked: avatar is speaking", clip);
            self.emit(CoordinatorEvent::AnimationRejected {
                clip,
                reason: "avatar is speaking".to_string(),
            });
            return false;
        }

        let revision = state.write_clip(clip);
        if clip != AnimationClip::Idle {
            let dwell = Duration::from_millis(self.inner.config.animation_revert_ms);
            state.clip_timer.handle = self.spawn_revert(Field::Clip, revision, dwell);
        }
        let snapshot = state.snapshot();
        drop(state);

        info!("Animation set to {} ({})", clip, clip.mixer_name());
        self.emit_state(snapshot);
        true
    }

    /// Parse and apply a control-surface expression id
    pub fn set_expression_by_id(&self, id: &str) -> Result<(), AvatarError> {
        self.set_expression(id.parse()?);
        Ok(())
    }

    /// Parse and apply a control-surface gesture id
    pub fn set_gesture_by_id(&self, id: &str) -> Result<bool, AvatarError> {
        Ok(self.set_gesture(id.parse()?))
    }

    /// Parse and apply a control-surface animation id
    pub fn set_animation_by_id(&self, id: &str) -> Result<bool, AvatarError> {
        Ok(self.set_animation(id.parse()?))
    }

    /// Stop the reply in flight, if any, and return to rest
    pub fn cancel_speech(&self) -> bool {
        let mut state = self.inner.state.lock();
        if !self.cancel_speech_locked(&mut state) {
            return false;
        }
        state.rest();
        let snapshot = state.snapshot();
        drop(state);

        self.emit_state(snapshot);
        true
    }

    /// Stops audio, jitter and the speaking flag. The session's own `Ended`
    /// event arrives later and is ignored as stale.
    fn cancel_speech_locked(&self, state: &mut CoordinatorState) -> bool {
        let Some(session) = state.session.take() else {
            return false;
        };

        session.handle.cancel();
        self.inner.speech.stop();
        state.stop_jitter();
        state.mouth_intensity = 0.0;
        state.is_speaking = false;

        info!("Speech session {} cancelled", session.id);
        true
    }

    /// Upstream failure: show the fallback message and force the rest state
    pub fn recover(&self, reason: &str) {
        let mut state = self.inner.state.lock();
        self.cancel_speech_locked(&mut state);
        state.cancel_timers();
        state.rest();
        let entry = state.push_message(Speaker::Avatar, &self.inner.config.fallback_message);
        let snapshot = state.snapshot();
        drop(state);

        warn!("Recovered from failure: {}", reason);
        self.emit(CoordinatorEvent::Message(entry));
        self.emit(CoordinatorEvent::Recovered {
            reason: reason.to_string(),
        });
        self.emit_state(snapshot);
    }

    /// Cancel speech and every pending timer
    pub fn shutdown(&self) {
        let mut state = self.inner.state.lock();
        self.cancel_speech_locked(&mut state);
        state.cancel_timers();
        drop(state);
        info!("Animation coordinator shut down");
    }

    fn spawn_revert(&self, field: Field, revision: u64, delay: Duration) -> Option<JoinHandle<()>> {
        let weak = Arc::downgrade(&self.inner);
        spawn_task(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                AnimationCoordinator { inner }.revert(field, revision);
            }
        })
    }

    fn revert(&self, field: Field, revision: u64) {
        let mut state = self.inner.state.lock();
        let timer = state.timer(field);
        if timer.revision != revision {
            return;
        }
        timer.handle = None;

        match field {
            Field::Expression => state.expression = ExpressionId::Neutral,
            Field::Gesture => state.gesture = GestureId::Idle,
            Field::Clip => state.clip = AnimationClip::Idle,
        }
        let snapshot = state.snapshot();
        drop(state);

        debug!("{:?} reverted after dwell", field);
        self.emit_state(snapshot);
    }

    fn spawn_jitter(&self, id: Uuid) -> Option<JoinHandle<()>> {
        let weak = Arc::downgrade(&self.inner);
        let tick = Duration::from_millis(self.inner.config.jitter_interval_ms);
        spawn_task(async move {
            loop {
                tokio::time::sleep(tick).await;

                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let sample: f32 = rand::random();
                let keep_going = {
                    let mut state = inner.state.lock();
                    if state.is_active(id) && state.is_speaking {
                        state.mouth_intensity = jitter_intensity(sample);
                        true
                    } else {
                        false
                    }
                };
                if !keep_going {
                    break;
                }
            }
        })
    }
}

fn spawn_task<F>(future: F) -> Option<JoinHandle<()>>
where
    F: Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => Some(runtime.spawn(future)),
        Err(_) => {
            warn!("No async runtime available, timer not started");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_intensity_range() {
        assert_eq!(jitter_intensity(0.0), 0.0);
        assert!((jitter_intensity(0.3) - 0.045).abs() < 1e-6);
        assert!((jitter_intensity(0.5) - 0.2).abs() < 1e-6);
        for step in 0..100 {
            let v = jitter_intensity(step as f32 / 100.0);
            assert!((0.0..0.4).contains(&v));
        }
    }

    #[test]
    fn test_supersede_bumps_revision() {
        let mut timer = RevertTimer::default();
        let first = timer.supersede();
        let second = timer.supersede();
        assert!(second > first);
        assert!(timer.handle.is_none());
    }
}
