//! Per-frame driver applying coordinator state to a scene

use crate::error::AvatarError;
use crate::events::AnimationSnapshot;
use crate::gesture;
use crate::morph;
use crate::rig::{RigBinding, SceneGraph};
use crate::types::{AnimationClip, ExpressionId, GestureId};
use tracing::{debug, warn};

/// Longest frame step accepted; anything above is treated as a stall
const MAX_FRAME_DELTA: f32 = 1.0;

/// Owns the rig binding and the animation clocks.
///
/// Expression morphs are re-applied when the expression changes and viseme
/// morphs when the mouth intensity changes. Gestures are posed every frame.
pub struct AvatarAnimator {
    binding: RigBinding,
    base_position: [f32; 3],
    /// Seconds since the current gesture started
    gesture_clock: f32,
    /// Seconds since the animator started
    elapsed: f32,
    gesture: GestureId,
    applied_expression: Option<ExpressionId>,
    applied_mouth: Option<f32>,
}

impl AvatarAnimator {
    pub fn new(binding: RigBinding, base_position: [f32; 3]) -> Self {
        Self {
            binding,
            base_position,
            gesture_clock: 0.0,
            elapsed: 0.0,
            gesture: GestureId::Idle,
            applied_expression: None,
            applied_mouth: None,
        }
    }

    /// Bind a freshly loaded scene
    pub fn for_scene(scene: &SceneGraph, base_position: [f32; 3]) -> Self {
        Self::new(RigBinding::bind(scene), base_position)
    }

    pub fn binding(&self) -> &RigBinding {
        &self.binding
    }

    pub fn gesture_clock(&self) -> f32 {
        self.gesture_clock
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Advance by `dt` seconds and write the state into the scene.
    ///
    /// A malformed step is rejected without touching the scene; the next
    /// frame proceeds normally.
    pub fn frame(
        &mut self,
        scene: &mut SceneGraph,
        state: &AnimationSnapshot,
        dt: f32,
    ) -> Result<(), AvatarError> {
        if !dt.is_finite() || dt < 0.0 {
            warn!("Skipping frame with invalid delta {}", dt);
            return Err(AvatarError::Frame(format!("invalid frame delta {}", dt)));
        }
        let dt = dt.min(MAX_FRAME_DELTA);

        // Mouth first: an expression change in the same frame owns jawOpen
        if self.applied_mouth != Some(state.mouth_intensity) {
            morph::apply_mouth(&self.binding, scene, state.mouth_intensity);
            self.applied_mouth = Some(state.mouth_intensity);
        }

        if self.applied_expression != Some(state.expression) {
            morph::apply_expression(&self.binding, scene, state.expression);
            self.applied_expression = Some(state.expression);
            debug!("Frame applied expression {}", state.expression);
        }

        if state.gesture != self.gesture {
            debug!("Gesture {} -> {}, clock reset", self.gesture, state.gesture);
            self.gesture = state.gesture;
            self.gesture_clock = 0.0;
        } else {
            self.gesture_clock += dt;
        }
        self.elapsed += dt;

        gesture::animate(&self.binding, scene, self.gesture, self.gesture_clock);
        self.update_root(scene, state.clip);

        Ok(())
    }

    fn update_root(&self, scene: &mut SceneGraph, clip: AnimationClip) {
        let [x, y, z] = self.base_position;
        if clip == AnimationClip::Idle {
            scene.root.rotation.y = (self.elapsed * 0.3).sin() * 0.05;
            let breathe = (self.elapsed * 0.5).sin() * 0.02;
            scene.root.position = [x, y + breathe, z];
        } else {
            scene.root.position = [x, y, z];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::Mesh;

    fn scene() -> SceneGraph {
        SceneGraph::new(vec![Mesh::with_morphs(
            "Body",
            &["viseme_aa", "jawOpen", "mouthSmileLeft", "eyeWideLeft"],
        )
        .skinned(&["RightArm", "RightForeArm", "RightHand"])])
    }

    fn state(expression: ExpressionId, gesture: GestureId, mouth: f32) -> AnimationSnapshot {
        AnimationSnapshot {
            expression,
            gesture,
            mouth_intensity: mouth,
            ..AnimationSnapshot::default()
        }
    }

    #[test]
    fn test_invalid_delta_skipped() {
        let mut scene = scene();
        let mut animator = AvatarAnimator::for_scene(&scene, [0.0, 0.0, 0.0]);
        let snapshot = state(ExpressionId::Happy, GestureId::Idle, 0.0);

        assert!(animator.frame(&mut scene, &snapshot, f32::NAN).is_err());
        assert!(animator.frame(&mut scene, &snapshot, -0.1).is_err());
        assert_eq!(scene.meshes[0].influence("mouthSmileLeft"), Some(0.0));

        animator.frame(&mut scene, &snapshot, 0.016).unwrap();
        assert_eq!(scene.meshes[0].influence("mouthSmileLeft"), Some(0.8));
    }

    #[test]
    fn test_gesture_clock_resets_on_change() {
        let mut scene = scene();
        let mut animator = AvatarAnimator::for_scene(&scene, [0.0, 0.0, 0.0]);
        let waving = state(ExpressionId::Neutral, GestureId::Wave, 0.0);

        animator.frame(&mut scene, &waving, 0.0).unwrap();
        for _ in 0..10 {
            animator.frame(&mut scene, &waving, 0.1).unwrap();
        }
        assert!((animator.gesture_clock() - 1.0).abs() < 1e-4);

        let pointing = state(ExpressionId::Neutral, GestureId::Point, 0.0);
        animator.frame(&mut scene, &pointing, 0.1).unwrap();
        assert_eq!(animator.gesture_clock(), 0.0);
    }

    #[test]
    fn test_mouth_only_written_on_change() {
        let mut scene = scene();
        let mut animator = AvatarAnimator::for_scene(&scene, [0.0, 0.0, 0.0]);

        animator
            .frame(&mut scene, &state(ExpressionId::Surprised, GestureId::Idle, 0.0), 0.016)
            .unwrap();
        assert_eq!(scene.meshes[0].influence("jawOpen"), Some(0.6));

        animator
            .frame(&mut scene, &state(ExpressionId::Surprised, GestureId::Idle, 0.0), 0.016)
            .unwrap();
        assert_eq!(scene.meshes[0].influence("jawOpen"), Some(0.6));

        animator
            .frame(&mut scene, &state(ExpressionId::Surprised, GestureId::Idle, 0.4), 0.016)
            .unwrap();
        assert_eq!(scene.meshes[0].influence("jawOpen"), Some(0.2));
    }

    #[test]
    fn test_idle_clip_sways_root() {
        let mut scene = scene();
        let mut animator = AvatarAnimator::for_scene(&scene, [0.0, -0.8, 0.0]);
        let idle = state(ExpressionId::Neutral, GestureId::Idle, 0.0);

        animator.frame(&mut scene, &idle, 0.5).unwrap();
        assert!(scene.root.rotation.y != 0.0);
        assert!((scene.root.position[1] - (-0.8 + (0.25f32).sin() * 0.02)).abs() < 1e-6);

        let talking = AnimationSnapshot {
            clip: AnimationClip::Talking,
            ..idle
        };
        animator.frame(&mut scene, &talking, 0.5).unwrap();
        assert_eq!(scene.root.position, [0.0, -0.8, 0.0]);
    }
}
