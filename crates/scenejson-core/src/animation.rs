//! Keyframe animation.

use glam::{Quat, Vec3};

use crate::label::Label;

/// A vector value at a point in time (in ticks).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorKey {
    pub time: f64,
    pub value: Vec3,
}

impl VectorKey {
    pub fn new(time: f64, value: Vec3) -> Self {
        Self { time, value }
    }
}

/// A rotation at a point in time (in ticks).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuatKey {
    pub time: f64,
    pub value: Quat,
}

impl QuatKey {
    pub fn new(time: f64, value: Quat) -> Self {
        Self { time, value }
    }
}

/// Selects one of the mesh's alternative vertex sets at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshKey {
    pub time: f64,
    pub value: u32,
}

/// Morph target weights at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshMorphKey {
    pub time: f64,
    pub values: Vec<u32>,
    pub weights: Vec<f64>,
}

/// What a channel does outside its keyed time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum AnimBehaviour {
    /// Use the node's own transform.
    #[default]
    Default = 0,
    /// Hold the nearest key.
    Constant = 1,
    /// Extrapolate from the nearest two keys.
    Linear = 2,
    /// Repeat the keyed range.
    Repeat = 3,
}

/// Transform track for one node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeAnim {
    pub node_name: Label,
    pub position_keys: Vec<VectorKey>,
    pub rotation_keys: Vec<QuatKey>,
    pub scaling_keys: Vec<VectorKey>,
    pub pre_state: AnimBehaviour,
    pub post_state: AnimBehaviour,
}

/// Vertex-set switching track for one mesh.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshAnim {
    pub name: Label,
    pub keys: Vec<MeshKey>,
}

/// Morph weight track for one mesh.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshMorphAnim {
    pub name: Label,
    pub keys: Vec<MeshMorphKey>,
}

/// A named animation with three independent kinds of tracks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Animation {
    pub name: Label,
    /// Length in ticks.
    pub duration: f64,
    /// 0 when the source format does not say.
    pub ticks_per_second: f64,
    pub channels: Vec<NodeAnim>,
    pub mesh_channels: Vec<MeshAnim>,
    pub morph_mesh_channels: Vec<MeshMorphAnim>,
}

impl Animation {
    pub fn new(name: impl Into<Label>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
