//! Procedural arm gestures
//!
//! Each gesture is a pure function of gesture-local time producing local
//! rotations for the arm roles it touches. Roles a gesture leaves out stay at
//! the reset pose.

use crate::rig::{BoneRole, Euler, RigBinding, SceneGraph};
use crate::types::GestureId;
use std::f32::consts::PI;

/// Rotations for each arm role; `None` leaves the bone untouched
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    rotations: [Option<Euler>; 6],
}

impl Pose {
    fn set(&mut self, role: BoneRole, x: f32, y: f32, z: f32) {
        self.rotations[role.index()] = Some(Euler::new(x, y, z));
    }

    pub fn get(&self, role: BoneRole) -> Option<Euler> {
        self.rotations[role.index()]
    }

    pub fn roles(&self) -> impl Iterator<Item = (BoneRole, Euler)> + '_ {
        BoneRole::ALL
            .into_iter()
            .filter_map(move |role| self.get(role).map(|r| (role, r)))
    }
}

/// Pose for `gesture` at gesture-local time `t` seconds
pub fn pose(gesture: GestureId, t: f32) -> Pose {
    use BoneRole::*;

    let mut p = Pose::default();
    match gesture {
        GestureId::Idle => return idle_pose(t),
        GestureId::Wave => {
            let wave = (t * 6.0).sin();
            p.set(RightUpperArm, -1.0, wave * 0.3, 1.4 + wave * 0.4);
            p.set(RightForearm, -0.6 + wave * 0.5, 0.0, wave * 0.4);
            p.set(RightHand, 0.0, 0.0, wave * 0.6);
        }
        GestureId::Point => {
            p.set(RightUpperArm, -1.6, -0.7, 0.5);
            p.set(RightForearm, 0.0, 0.0, 0.0);
            p.set(RightHand, -0.4, 0.0, 0.3);
        }
        GestureId::ThumbsUp => {
            p.set(RightUpperArm, -0.8, 0.5, 1.3);
            p.set(RightForearm, -1.4, 0.2, 0.0);
            p.set(RightHand, -0.2, 0.6, PI / 2.0);
        }
        GestureId::ThumbsDown => {
            p.set(RightUpperArm, -0.6, 0.3, 0.9);
            p.set(RightForearm, -1.2, 0.0, 0.0);
            p.set(RightHand, 0.0, -0.5, -PI / 2.0);
        }
        GestureId::Shrug => {
            p.set(RightUpperArm, -0.4, 0.3, 1.2);
            p.set(RightForearm, -0.8, 0.0, 0.0);
            p.set(LeftUpperArm, -0.4, -0.3, -1.2);
            p.set(LeftForearm, -0.8, 0.0, 0.0);
        }
        GestureId::Clap => {
            let clap = (t * 10.0).sin().abs() * 0.4;
            p.set(RightUpperArm, -PI / 2.5, -0.6 - clap, 0.5 + clap);
            p.set(RightForearm, -0.3, 0.0, 0.0);
            p.set(LeftUpperArm, -PI / 2.5, 0.6 + clap, -0.5 - clap);
            p.set(LeftForearm, -0.3, 0.0, 0.0);
        }
        GestureId::Thinking => {
            p.set(RightUpperArm, -1.2, -0.5, 0.6);
            p.set(RightForearm, -1.6, 0.0, 0.0);
            p.set(RightHand, -0.5, 0.0, 0.0);
        }
        GestureId::Explain => {
            let sway = (t * 3.0).sin() * 0.2;
            p.set(RightUpperArm, -0.8, -0.3, 0.7 + sway);
            p.set(RightForearm, -0.5 + sway * 0.5, 0.0, 0.0);
            p.set(RightHand, 0.3, 0.0, sway * 0.3);
            p.set(LeftUpperArm, -0.8, 0.3, -0.7 - sway);
            p.set(LeftForearm, -0.5 - sway * 0.5, 0.0, 0.0);
            p.set(LeftHand, 0.3, 0.0, -sway * 0.3);
        }
    }
    p
}

/// Arms resting at the sides with a slow breathing motion
pub fn idle_pose(t: f32) -> Pose {
    use BoneRole::*;

    let breathe = (t * 0.8).sin() * 0.02;
    let mut p = Pose::default();
    p.set(RightUpperArm, breathe, 0.05, 0.08);
    p.set(RightForearm, 0.1 + breathe * 0.5, 0.0, 0.0);
    p.set(RightHand, 0.0, 0.0, 0.0);
    p.set(LeftUpperArm, breathe, -0.05, -0.08);
    p.set(LeftForearm, 0.1 + breathe * 0.5, 0.0, 0.0);
    p.set(LeftHand, 0.0, 0.0, 0.0);
    p
}

/// Zero the rotation of every bound arm bone
pub fn reset(binding: &RigBinding, scene: &mut SceneGraph) {
    for role in BoneRole::ALL {
        if let Some(bone) = binding.bone(role).and_then(|r| scene.bone_mut(r)) {
            bone.rotation = Euler::ZERO;
        }
    }
}

/// Write a pose to the bound bones; missing roles are skipped
pub fn apply(binding: &RigBinding, scene: &mut SceneGraph, pose: &Pose) {
    for (role, rotation) in pose.roles() {
        if let Some(bone) = binding.bone(role).and_then(|r| scene.bone_mut(r)) {
            bone.rotation = rotation;
        }
    }
}

/// Per-frame gesture update: reset then pose, except idle which poses over
/// the current rotations
pub fn animate(binding: &RigBinding, scene: &mut SceneGraph, gesture: GestureId, t: f32) {
    if gesture != GestureId::Idle {
        if !binding.has_bones() {
            return;
        }
        reset(binding, scene);
    }
    apply(binding, scene, &pose(gesture, t));
}
