//! Cameras.

use glam::Vec3;

use crate::label::Label;

/// A camera. Its name matches the node that places it in the scene; the
/// vectors are relative to that node.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub name: Label,
    pub position: Vec3,
    pub up: Vec3,
    pub look_at: Vec3,
    /// Half horizontal field of view, in radians.
    pub horizontal_fov: f32,
    pub clip_plane_near: f32,
    pub clip_plane_far: f32,
    /// Width over height, or 0 when unknown.
    pub aspect: f32,
    /// Half width of the view volume for orthographic cameras, 0 otherwise.
    pub orthographic_width: f32,
}

impl Camera {
    pub fn new(name: impl Into<Label>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            name: Label::default(),
            position: Vec3::ZERO,
            up: Vec3::Y,
            look_at: Vec3::NEG_Z,
            horizontal_fov: std::f32::consts::FRAC_PI_4,
            clip_plane_near: 0.1,
            clip_plane_far: 1000.0,
            aspect: 0.0,
            orthographic_width: 0.0,
        }
    }
}
