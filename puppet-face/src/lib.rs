//! puppet-face: Expression / gesture / lip-sync coordination for rigged avatars
//!
//! Turns chat replies and speech playback events into per-frame morph
//! influences and arm bone rotations:
//! - Keyword classifier mapping text to an expression and a gesture
//! - Rig binding resolving bones and morph channels by name
//! - Morph blender for expressions and viseme mouth shapes
//! - Procedural gesture poses
//! - Coordinator owning the shared animation state and its timers

pub mod error;
pub mod config;
pub mod settings;
pub mod types;
pub mod classifier;
pub mod rig;
pub mod morph;
pub mod gesture;
pub mod animator;
pub mod events;
pub mod coordinator;

pub use error::AvatarError;
pub use config::AvatarConfig;
pub use settings::PuppetSettings;
pub use types::{AnimationClip, ExpressionId, GestureId};
pub use classifier::{Classification, EmotionClassifier, TextEmotionClassifier};
pub use rig::{BoneRef, BoneRole, Euler, Mesh, RigBinding, SceneGraph};
pub use gesture::Pose;
pub use animator::AvatarAnimator;
pub use events::{AnimationSnapshot, CoordinatorEvent, Speaker, TranscriptEntry};
pub use coordinator::{jitter_intensity, AnimationCoordinator, TurnOutcome};
