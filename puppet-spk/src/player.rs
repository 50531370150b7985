//! Speech player with single-utterance sessions

use crate::config::SpeechConfig;
use crate::engines::{PlaybackEngine, Utterance};
use crate::error::SpeechError;
use crate::events::{SpeechEvent, SpeechOutcome};
use crate::voice::{select_voice, Voice};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Speech output as seen by the animation layer
pub trait SpeechService: Send + Sync {
    /// Start speaking `text`, cancelling anything already playing
    fn speak(&self, text: &str) -> Result<SpeechSession, SpeechError>;

    /// Cancel the active utterance, if any
    fn stop(&self);

    /// Whether an utterance is currently playing
    fn is_speaking(&self) -> bool;
}

/// Cloneable handle used to cancel or poll a session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: Uuid,
    cancel: Arc<Notify>,
    finished: Arc<AtomicBool>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            cancel: Arc::new(Notify::new()),
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait until cancellation is requested
    pub async fn cancelled(&self) {
        self.cancel.notified().await
    }

    /// Mark the session as finished; call before sending `Ended`
    pub fn finish(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }

    /// Request cancellation. The session still delivers its `Ended` event.
    pub fn cancel(&self) {
        self.cancel.notify_one();
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// One utterance in flight and its event stream
#[derive(Debug)]
pub struct SpeechSession {
    events: mpsc::UnboundedReceiver<SpeechEvent>,
    handle: SessionHandle,
}

impl SpeechSession {
    /// Wrap an event stream produced by a `SpeechService` implementation
    pub fn new(handle: SessionHandle, events: mpsc::UnboundedReceiver<SpeechEvent>) -> Self {
        Self { events, handle }
    }

    pub fn id(&self) -> Uuid {
        self.handle.id
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Next event, or `None` once the session has ended
    pub async fn next_event(&mut self) -> Option<SpeechEvent> {
        self.events.recv().await
    }

    pub fn into_parts(self) -> (SessionHandle, mpsc::UnboundedReceiver<SpeechEvent>) {
        (self.handle, self.events)
    }
}

/// Speech player
///
/// Plays at most one utterance at a time. Starting a new utterance cancels the
/// previous one, whose session then ends with `SpeechOutcome::Cancelled`.
pub struct SpeechPlayer {
    config: SpeechConfig,
    engine: Arc<dyn PlaybackEngine>,
    voices: RwLock<Vec<Voice>>,
    selected_voice: RwLock<Option<Voice>>,
    current: Mutex<Option<SessionHandle>>,
}

impl SpeechPlayer {
    /// Create a new player over the given engine
    pub fn new(config: SpeechConfig, engine: Arc<dyn PlaybackEngine>) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Config)?;

        if !engine.is_available() {
            return Err(SpeechError::Engine(format!(
                "Playback engine '{}' not available",
                engine.name()
            )));
        }

        info!("Speech player created with engine '{}'", engine.name());

        Ok(Self {
            config,
            engine,
            voices: RwLock::new(Vec::new()),
            selected_voice: RwLock::new(None),
            current: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &SpeechConfig {
        &self.config
    }

    /// Fetch the engine's voice list and pick a voice from the configuration
    pub async fn load_voices(&self) -> Result<Vec<Voice>, SpeechError> {
        let voices = self.engine.list_voices().await?;
        let selected = select_voice(&voices, &self.config.voice).cloned();

        match &selected {
            Some(voice) => info!("Selected voice '{}' ({})", voice.name, voice.language),
            None => warn!("No voices reported by engine '{}'", self.engine.name()),
        }

        *self.voices.write() = voices.clone();
        *self.selected_voice.write() = selected;
        Ok(voices)
    }

    pub fn voices(&self) -> Vec<Voice> {
        self.voices.read().clone()
    }

    pub fn selected_voice(&self) -> Option<Voice> {
        self.selected_voice.read().clone()
    }

    /// Select a loaded voice by exact name
    pub fn set_voice(&self, name: &str) -> Result<(), SpeechError> {
        let voice = self
            .voices
            .read()
            .iter()
            .find(|v| v.name == name)
            .cloned()
            .ok_or_else(|| SpeechError::Config(format!("Voice '{}' not found", name)))?;

        debug!("Voice set to '{}'", voice.name);
        *self.selected_voice.write() = Some(voice);
        Ok(())
    }

    /// Select the first loaded voice whose language starts with `language`
    pub fn set_voice_by_language(&self, language: &str) -> Result<(), SpeechError> {
        let voice = self
            .voices
            .read()
            .iter()
            .find(|v| v.language.starts_with(language))
            .cloned()
            .ok_or_else(|| SpeechError::Config(format!("No voice for language '{}'", language)))?;

        debug!("Voice set to '{}' for language '{}'", voice.name, language);
        *self.selected_voice.write() = Some(voice);
        Ok(())
    }

    pub fn pause(&self) {
        if self.is_speaking() {
            self.engine.pause();
        }
    }

    pub fn resume(&self) {
        self.engine.resume();
    }

    /// Swap the current session under one lock, cancelling the previous one
    fn replace_current(&self, next: Option<SessionHandle>) {
        let previous = {
            let mut current = self.current.lock();
            std::mem::replace(&mut *current, next)
        };
        if let Some(handle) = previous {
            if !handle.is_finished() {
                debug!("Cancelling speech session {}", handle.id);
            }
            handle.cancel();
        }
        self.engine.resume();
    }

    fn validate_text(&self, text: &str) -> Result<(), SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::Playback("Text cannot be empty".to_string()));
        }

        if text.contains('\0') {
            return Err(SpeechError::Playback("Text contains null bytes".to_string()));
        }

        if text.len() > self.config.max_text_length {
            return Err(SpeechError::Playback(format!(
                "Text too long: {} bytes (max {})",
                text.len(),
                self.config.max_text_length
            )));
        }

        Ok(())
    }

    fn utterance(&self, text: &str) -> Utterance {
        Utterance {
            text: text.to_string(),
            voice: self.selected_voice(),
            rate: self.config.rate,
            pitch: self.config.pitch,
            volume: self.config.volume,
        }
    }
}

impl SpeechService for SpeechPlayer {
    fn speak(&self, text: &str) -> Result<SpeechSession, SpeechError> {
        self.validate_text(text)?;

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SpeechError::Engine(format!("No async runtime available: {}", e)))?;

        let handle = SessionHandle::new();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let utterance = self.utterance(text);
        let engine = self.engine.clone();
        let session = handle.clone();
        let id = handle.id;

        self.replace_current(Some(handle.clone()));
        debug!("Speech session {} started ({} bytes)", id, utterance.text.len());

        runtime.spawn(async move {
            let _ = events_tx.send(SpeechEvent::Started);

            let (boundary_tx, mut boundary_rx) = mpsc::unbounded_channel();
            let play = engine.play(&utterance, boundary_tx);
            tokio::pin!(play);

            let outcome = loop {
                tokio::select! {
                    biased;
                    _ = session.cancelled() => break SpeechOutcome::Cancelled,
                    Some(boundary) = boundary_rx.recv() => {
                        let _ = events_tx.send(SpeechEvent::WordBoundary(boundary));
                    }
                    result = &mut play => {
                        while let Ok(boundary) = boundary_rx.try_recv() {
                            let _ = events_tx.send(SpeechEvent::WordBoundary(boundary));
                        }
                        break match result {
                            Ok(()) => SpeechOutcome::Completed,
                            Err(e) => {
                                warn!("Speech session {} failed: {}", id, e);
                                SpeechOutcome::Failed(e.to_string())
                            }
                        };
                    }
                }
            };

            session.finish();
            debug!("Speech session {} ended: {:?}", id, outcome);
            let _ = events_tx.send(SpeechEvent::Ended(outcome));
        });

        Ok(SpeechSession::new(handle, events_rx))
    }

    fn stop(&self) {
        self.replace_current(None);
    }

    fn is_speaking(&self) -> bool {
        self.current
            .lock()
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for SpeechPlayer {
    fn drop(&mut self) {
        if let Some(handle) = self.current.get_mut().take() {
            handle.cancel();
        }
    }
}
