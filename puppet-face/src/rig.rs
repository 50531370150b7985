//! Scene model and rig binding
//!
//! The scene graph is owned by the render layer. `RigBinding` only holds
//! indices into it: which mesh influences belong to which morph name and which
//! bone plays which arm role.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Local rotation in radians
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Euler {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Euler {
    pub const ZERO: Euler = Euler { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    pub rotation: Euler,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Skeleton {
    pub bones: Vec<Bone>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    /// Morph name to influence index
    pub morph_dictionary: Option<HashMap<String, usize>>,
    pub morph_influences: Vec<f32>,
    /// Present on skinned meshes
    pub skeleton: Option<Skeleton>,
}

impl Mesh {
    /// Mesh exposing the given morph channels, all at zero influence
    pub fn with_morphs(name: impl Into<String>, morphs: &[&str]) -> Self {
        let dictionary = morphs
            .iter()
            .enumerate()
            .map(|(i, m)| (m.to_string(), i))
            .collect();
        Self {
            name: name.into(),
            morph_dictionary: Some(dictionary),
            morph_influences: vec![0.0; morphs.len()],
            skeleton: None,
        }
    }

    /// Attach a skeleton with the given bone names
    pub fn skinned(mut self, bones: &[&str]) -> Self {
        self.skeleton = Some(Skeleton {
            bones: bones
                .iter()
                .map(|b| Bone {
                    name: b.to_string(),
                    rotation: Euler::ZERO,
                })
                .collect(),
        });
        self
    }

    pub fn influence(&self, morph: &str) -> Option<f32> {
        let index = *self.morph_dictionary.as_ref()?.get(morph)?;
        self.morph_influences.get(index).copied()
    }
}

/// Transform of the avatar's root group
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RootTransform {
    pub position: [f32; 3],
    pub rotation: Euler,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneGraph {
    pub meshes: Vec<Mesh>,
    pub root: RootTransform,
}

impl SceneGraph {
    pub fn new(meshes: Vec<Mesh>) -> Self {
        Self {
            meshes,
            root: RootTransform::default(),
        }
    }

    pub fn bone(&self, r: BoneRef) -> Option<&Bone> {
        self.meshes.get(r.mesh)?.skeleton.as_ref()?.bones.get(r.bone)
    }

    pub fn bone_mut(&mut self, r: BoneRef) -> Option<&mut Bone> {
        self.meshes.get_mut(r.mesh)?.skeleton.as_mut()?.bones.get_mut(r.bone)
    }

    /// Find a bone by exact name, for inspection
    pub fn find_bone(&self, name: &str) -> Option<&Bone> {
        self.meshes
            .iter()
            .filter_map(|m| m.skeleton.as_ref())
            .flat_map(|s| s.bones.iter())
            .find(|b| b.name == name)
    }
}

/// Logical arm roles driven by gestures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoneRole {
    RightUpperArm,
    RightForearm,
    RightHand,
    LeftUpperArm,
    LeftForearm,
    LeftHand,
}

impl BoneRole {
    pub const ALL: [BoneRole; 6] = [
        BoneRole::RightUpperArm,
        BoneRole::RightForearm,
        BoneRole::RightHand,
        BoneRole::LeftUpperArm,
        BoneRole::LeftForearm,
        BoneRole::LeftHand,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Accepted lowercase bone names, highest priority first
    pub fn accepted_names(&self) -> &'static [&'static str] {
        match self {
            BoneRole::RightUpperArm => &["rightarm", "rightshoulder"],
            BoneRole::RightForearm => &["rightforearm"],
            BoneRole::RightHand => &["righthand"],
            BoneRole::LeftUpperArm => &["leftarm", "leftshoulder"],
            BoneRole::LeftForearm => &["leftforearm"],
            BoneRole::LeftHand => &["lefthand"],
        }
    }
}

/// Location of a bone inside the scene graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoneRef {
    pub mesh: usize,
    pub bone: usize,
}

/// Morph channels of one mesh
#[derive(Debug, Clone)]
pub struct MorphBinding {
    pub mesh: usize,
    pub targets: HashMap<String, usize>,
}

/// Lookup tables resolved once when a rig finishes loading
#[derive(Debug, Clone, Default)]
pub struct RigBinding {
    morphs: Vec<MorphBinding>,
    bones: HashMap<BoneRole, BoneRef>,
}

impl RigBinding {
    /// Resolve bones and morph channels from a loaded scene.
    ///
    /// Missing roles and channels are left out of the binding; a rig with
    /// nothing bound is valid and simply never animates.
    pub fn bind(scene: &SceneGraph) -> Self {
        let mut morphs = Vec::new();

        for (mesh_index, mesh) in scene.meshes.iter().enumerate() {
            let Some(dictionary) = mesh.morph_dictionary.as_ref() else {
                continue;
            };

            let mut targets = HashMap::with_capacity(dictionary.len());
            for (name, &index) in dictionary {
                if index < mesh.morph_influences.len() {
                    targets.insert(name.clone(), index);
                } else {
                    warn!(
                        "Morph '{}' on mesh '{}' points past its influences ({} >= {}), skipping",
                        name,
                        mesh.name,
                        index,
                        mesh.morph_influences.len()
                    );
                }
            }

            if !targets.is_empty() {
                debug!("Mesh '{}' exposes {} morph targets", mesh.name, targets.len());
                morphs.push(MorphBinding {
                    mesh: mesh_index,
                    targets,
                });
            }
        }

        let mut bones = HashMap::new();
        for role in BoneRole::ALL {
            if let Some(found) = find_role(scene, role) {
                bones.insert(role, found);
            }
        }

        let binding = Self { morphs, bones };
        binding.log_summary();
        binding
    }

    fn log_summary(&self) {
        info!(
            "Rig bound: {} morph meshes, {} of {} arm bones",
            self.morphs.len(),
            self.bones.len(),
            BoneRole::ALL.len()
        );

        for role in BoneRole::ALL {
            if !self.bones.contains_key(&role) {
                debug!("Arm role {:?} not found", role);
            }
        }

        if self.bones.is_empty() {
            warn!("No arm bones found, gestures will not animate");
        } else if self.bones.len() < 4 {
            warn!("Only {} arm bones found, gestures may be limited", self.bones.len());
        }

        if self.morphs.is_empty() {
            warn!("No morph targets found, expressions and lip-sync will not animate");
        }
    }

    pub fn morphs(&self) -> &[MorphBinding] {
        &self.morphs
    }

    pub fn bone(&self, role: BoneRole) -> Option<BoneRef> {
        self.bones.get(&role).copied()
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn has_bones(&self) -> bool {
        !self.bones.is_empty()
    }
}

/// First bone matching the role's names, trying names in priority order
fn find_role(scene: &SceneGraph, role: BoneRole) -> Option<BoneRef> {
    role.accepted_names().iter().find_map(|accepted| {
        scene.meshes.iter().enumerate().find_map(|(mesh_index, mesh)| {
            let skeleton = mesh.skeleton.as_ref()?;
            skeleton
                .bones
                .iter()
                .position(|b| b.name.to_lowercase() == *accepted)
                .map(|bone| BoneRef {
                    mesh: mesh_index,
                    bone,
                })
        })
    })
}
