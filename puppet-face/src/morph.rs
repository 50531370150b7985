//! Morph blending for facial expressions and mouth shapes

use crate::rig::{RigBinding, SceneGraph};
use crate::types::ExpressionId;
use tracing::trace;

/// Viseme channels driven by the mouth intensity, in variation order
pub const VISEMES: [&str; 14] = [
    "viseme_aa", "viseme_E", "viseme_I", "viseme_O", "viseme_U", "viseme_PP", "viseme_FF",
    "viseme_TH", "viseme_DD", "viseme_kk", "viseme_CH", "viseme_SS", "viseme_nn", "viseme_RR",
];

pub const VISEME_PREFIX: &str = "viseme_";
pub const JAW_OPEN: &str = "jawOpen";

const HAPPY: &[(&str, f32)] = &[
    ("mouthSmileLeft", 0.8),
    ("mouthSmileRight", 0.8),
    ("eyeSquintLeft", 0.4),
    ("eyeSquintRight", 0.4),
    ("cheekSquintLeft", 0.5),
    ("cheekSquintRight", 0.5),
    ("mouthDimpleLeft", 0.3),
    ("mouthDimpleRight", 0.3),
];

const SAD: &[(&str, f32)] = &[
    ("mouthFrownLeft", 0.7),
    ("mouthFrownRight", 0.7),
    ("mouthLowerDownLeft", 0.6),
    ("mouthLowerDownRight", 0.6),
    ("browInnerUp", 0.7),
    ("eyeSquintLeft", 0.2),
    ("eyeSquintRight", 0.2),
    ("mouthShrugLower", 0.3),
];

const SURPRISED: &[(&str, f32)] = &[
    ("eyeWideLeft", 1.0),
    ("eyeWideRight", 1.0),
    ("browOuterUpLeft", 0.9),
    ("browOuterUpRight", 0.9),
    ("browInnerUp", 0.8),
    ("jawOpen", 0.6),
    ("mouthFunnel", 0.4),
];

const THINKING: &[(&str, f32)] = &[
    ("browInnerUp", 0.7),
    ("browOuterUpLeft", 0.8),
    ("browOuterUpRight", 0.3),
    ("mouthPucker", 0.7),
    ("mouthFunnel", 0.3),
    ("jawLeft", 0.4),
    ("mouthLeft", 0.5),
    ("eyeSquintRight", 0.4),
    ("mouthRollLower", 0.4),
    ("mouthUpperUpLeft", 0.2),
];

const ANGRY: &[(&str, f32)] = &[
    ("mouthFrownLeft", 0.9),
    ("mouthFrownRight", 0.9),
    ("eyeSquintLeft", 0.8),
    ("eyeSquintRight", 0.8),
    ("browDownLeft", 0.9),
    ("browDownRight", 0.9),
    ("noseSneerLeft", 0.6),
    ("noseSneerRight", 0.6),
    ("mouthPressLeft", 0.5),
    ("mouthPressRight", 0.5),
    ("jawForward", 0.3),
];

const WORRIED: &[(&str, f32)] = &[
    ("browInnerUp", 0.9),
    ("browOuterUpLeft", 0.4),
    ("browOuterUpRight", 0.4),
    ("eyeWideLeft", 0.6),
    ("eyeWideRight", 0.6),
    ("mouthFrownLeft", 0.5),
    ("mouthFrownRight", 0.5),
    ("mouthLowerDownLeft", 0.4),
    ("mouthLowerDownRight", 0.4),
    ("mouthStretchLeft", 0.2),
    ("mouthStretchRight", 0.2),
];

/// Morph values set by an expression; every other non-viseme morph is zero
pub fn expression_targets(expression: ExpressionId) -> &'static [(&'static str, f32)] {
    match expression {
        ExpressionId::Neutral => &[],
        ExpressionId::Happy | ExpressionId::Smile => HAPPY,
        ExpressionId::Sad => SAD,
        ExpressionId::Surprised => SURPRISED,
        ExpressionId::Thinking => THINKING,
        ExpressionId::Angry => ANGRY,
        ExpressionId::Worried => WORRIED,
    }
}

/// Per-channel scale so visemes open unevenly.
/// Amplitude approximation, not phoneme-accurate.
pub fn viseme_variation(index: usize) -> f32 {
    0.7 + (index as f32).sin() * 0.3
}

/// Zero every non-viseme morph, then set the expression's table.
/// Morphs the rig lacks are skipped.
pub fn apply_expression(binding: &RigBinding, scene: &mut SceneGraph, expression: ExpressionId) {
    let targets = expression_targets(expression);

    for morphs in binding.morphs() {
        let Some(mesh) = scene.meshes.get_mut(morphs.mesh) else {
            continue;
        };
        let influences = &mut mesh.morph_influences;

        for (name, &index) in &morphs.targets {
            if !name.starts_with(VISEME_PREFIX) {
                if let Some(slot) = influences.get_mut(index) {
                    *slot = 0.0;
                }
            }
        }

        for &(name, value) in targets {
            if let Some(slot) = morphs.targets.get(name).and_then(|&i| influences.get_mut(i)) {
                *slot = value;
            }
        }
    }

    trace!("Applied expression {}", expression);
}

/// Write the mouth intensity to every viseme channel and the jaw.
/// Non-finite input counts as closed; the rest is clamped to [0, 1].
pub fn apply_mouth(binding: &RigBinding, scene: &mut SceneGraph, intensity: f32) {
    let intensity = if intensity.is_finite() {
        intensity.clamp(0.0, 1.0)
    } else {
        0.0
    };

    for morphs in binding.morphs() {
        let Some(mesh) = scene.meshes.get_mut(morphs.mesh) else {
            continue;
        };
        let influences = &mut mesh.morph_influences;

        for (i, viseme) in VISEMES.iter().enumerate() {
            if let Some(slot) = morphs.targets.get(*viseme).and_then(|&k| influences.get_mut(k)) {
                *slot = (intensity * viseme_variation(i)).min(1.0);
            }
        }

        if let Some(slot) = morphs.targets.get(JAW_OPEN).and_then(|&k| influences.get_mut(k)) {
            *slot = intensity * 0.5;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::Mesh;

    fn face() -> (SceneGraph, RigBinding) {
        let mut morphs: Vec<&str> = VISEMES.to_vec();
        morphs.extend([
            "jawOpen",
            "mouthSmileLeft",
            "mouthSmileRight",
            "browInnerUp",
            "eyeWideLeft",
            "mouthFrownLeft",
        ]);
        let scene = SceneGraph::new(vec![Mesh::with_morphs("Head", &morphs)]);
        let binding = RigBinding::bind(&scene);
        (scene, binding)
    }

    #[test]
    fn test_every_expression_has_a_table() {
        for expression in ExpressionId::ALL {
            let table = expression_targets(expression);
            assert_eq!(table.is_empty(), expression == ExpressionId::Neutral);
        }
        assert_eq!(
            expression_targets(ExpressionId::Smile),
            expression_targets(ExpressionId::Happy)
        );
    }

    #[test]
    fn test_expression_switch_clears_previous() {
        let (mut scene, binding) = face();
        apply_expression(&binding, &mut scene, ExpressionId::Sad);
        assert_eq!(scene.meshes[0].influence("mouthFrownLeft"), Some(0.7));

        apply_expression(&binding, &mut scene, ExpressionId::Happy);
        assert_eq!(scene.meshes[0].influence("mouthFrownLeft"), Some(0.0));
        assert_eq!(scene.meshes[0].influence("mouthSmileRight"), Some(0.8));
    }

    #[test]
    fn test_expression_keeps_visemes() {
        let (mut scene, binding) = face();
        apply_mouth(&binding, &mut scene, 0.5);
        let before = scene.meshes[0].influence("viseme_aa");

        apply_expression(&binding, &mut scene, ExpressionId::Worried);
        assert_eq!(scene.meshes[0].influence("viseme_aa"), before);
        assert_eq!(scene.meshes[0].influence("jawOpen"), Some(0.0));
    }

    #[test]
    fn test_mouth_values() {
        let (mut scene, binding) = face();
        apply_mouth(&binding, &mut scene, 1.0);
        let mesh = &scene.meshes[0];
        assert_eq!(mesh.influence("viseme_aa"), Some(0.7));
        assert_eq!(mesh.influence("jawOpen"), Some(0.5));
        for viseme in VISEMES {
            let v = mesh.influence(viseme).unwrap();
            assert!((0.0..=1.0).contains(&v));
        }

        apply_mouth(&binding, &mut scene, 0.0);
        let mesh = &scene.meshes[0];
        assert!(VISEMES.iter().all(|v| mesh.influence(v) == Some(0.0)));
        assert_eq!(mesh.influence("jawOpen"), Some(0.0));
    }

    #[test]
    fn test_mouth_rejects_bad_input() {
        let (mut scene, binding) = face();
        apply_mouth(&binding, &mut scene, f32::NAN);
        assert_eq!(scene.meshes[0].influence("jawOpen"), Some(0.0));

        apply_mouth(&binding, &mut scene, 7.0);
        assert_eq!(scene.meshes[0].influence("jawOpen"), Some(0.5));
    }
}
