//! Light sources.

use glam::{Vec2, Vec3};

use crate::color::Color3;
use crate::label::Label;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum LightSourceType {
    #[default]
    Undefined = 0,
    Directional = 1,
    Point = 2,
    Spot = 3,
    Ambient = 4,
    Area = 5,
}

/// A light source. Its name matches the node that places it in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub name: Label,
    pub light_type: LightSourceType,
    pub position: Vec3,
    pub direction: Vec3,
    pub up: Vec3,
    pub attenuation_constant: f32,
    pub attenuation_linear: f32,
    pub attenuation_quadratic: f32,
    pub color_diffuse: Color3,
    pub color_specular: Color3,
    pub color_ambient: Color3,
    /// Inner cone angle of a spot light, in radians.
    pub angle_inner_cone: f32,
    /// Outer cone angle of a spot light, in radians.
    pub angle_outer_cone: f32,
    /// Extent of an area light.
    pub size: Vec2,
}

impl Light {
    pub fn new(name: impl Into<Label>, light_type: LightSourceType) -> Self {
        Self {
            name: name.into(),
            light_type,
            ..Default::default()
        }
    }
}

impl Default for Light {
    fn default() -> Self {
        Self {
            name: Label::default(),
            light_type: LightSourceType::Undefined,
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            attenuation_constant: 0.0,
            attenuation_linear: 1.0,
            attenuation_quadratic: 0.0,
            color_diffuse: Color3::BLACK,
            color_specular: Color3::BLACK,
            color_ambient: Color3::BLACK,
            angle_inner_cone: std::f32::consts::TAU,
            angle_outer_cone: std::f32::consts::TAU,
            size: Vec2::ZERO,
        }
    }
}
