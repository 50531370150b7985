use puppet_face::morph;
use puppet_face::{
    AnimationClip, AvatarAnimator, AnimationSnapshot, ExpressionId, GestureId, Mesh,
    PuppetSettings, RigBinding, SceneGraph,
};
use std::collections::HashMap;

#[test]
fn test_empty_scene_animates_without_effect() {
    let mut scene = SceneGraph::default();
    let mut animator = AvatarAnimator::for_scene(&scene, [0.0, 0.0, 0.0]);
    let snapshot = AnimationSnapshot {
        expression: ExpressionId::Angry,
        gesture: GestureId::Clap,
        mouth_intensity: 0.9,
        ..AnimationSnapshot::default()
    };

    for _ in 0..10 {
        animator.frame(&mut scene, &snapshot, 0.016).unwrap();
    }
    assert!(!animator.binding().has_bones());
    assert!(animator.binding().morphs().is_empty());
}

#[test]
fn test_corrupt_morph_dictionary() {
    let mut dictionary = HashMap::new();
    dictionary.insert("jawOpen".to_string(), 0);
    dictionary.insert("mouthSmileLeft".to_string(), 7);

    let mut scene = SceneGraph::new(vec![Mesh {
        name: "Broken".to_string(),
        morph_dictionary: Some(dictionary),
        morph_influences: vec![0.0],
        skeleton: None,
    }]);

    let binding = RigBinding::bind(&scene);
    morph::apply_expression(&binding, &mut scene, ExpressionId::Happy);
    morph::apply_mouth(&binding, &mut scene, 1.0);
    assert_eq!(scene.meshes[0].morph_influences, vec![0.5]);
}

#[test]
fn test_mesh_without_dictionary_ignored() {
    let mut scene = SceneGraph::new(vec![Mesh {
        name: "Hair".to_string(),
        morph_dictionary: None,
        morph_influences: vec![0.3, 0.3],
        skeleton: None,
    }]);

    let binding = RigBinding::bind(&scene);
    morph::apply_expression(&binding, &mut scene, ExpressionId::Sad);
    assert_eq!(scene.meshes[0].morph_influences, vec![0.3, 0.3]);
}

#[test]
fn test_huge_frame_delta_capped() {
    let mut scene = SceneGraph::new(vec![Mesh::default().skinned(&["RightArm"])]);
    let mut animator = AvatarAnimator::for_scene(&scene, [0.0, 0.0, 0.0]);
    let snapshot = AnimationSnapshot {
        gesture: GestureId::Wave,
        clip: AnimationClip::Talking,
        ..AnimationSnapshot::default()
    };

    animator.frame(&mut scene, &snapshot, 0.0).unwrap();
    animator.frame(&mut scene, &snapshot, 3600.0).unwrap();
    assert_eq!(animator.gesture_clock(), 1.0);
    assert!(animator.frame(&mut scene, &snapshot, f32::INFINITY).is_err());
}

#[test]
fn test_unknown_ids() {
    assert!("".parse::<ExpressionId>().is_err());
    assert!("wink".parse::<ExpressionId>().is_err());
    assert!("dance".parse::<AnimationClip>().is_err());
    assert_eq!("none".parse::<GestureId>().unwrap(), GestureId::Idle);
    assert_eq!("Thumbs-Up".parse::<GestureId>().unwrap(), GestureId::ThumbsUp);
}

#[test]
fn test_malformed_settings() {
    assert!(PuppetSettings::from_toml_str("[avatar\ndwell_ms = ").is_err());
    assert!(PuppetSettings::from_json_str("{").is_err());

    // A section of the wrong shape falls back to defaults
    let settings = PuppetSettings::from_toml_str("avatar = 5\n[speech]\nrate = 2.0").unwrap();
    assert_eq!(settings.avatar.dwell_ms, 5000);
    assert_eq!(settings.speech.rate, 2.0);
}

#[test]
fn test_oversized_settings_rejected() {
    let text = format!("# {}\n", "x".repeat(2 * 1024 * 1024));
    assert!(PuppetSettings::from_toml_str(&text).is_err());
}
