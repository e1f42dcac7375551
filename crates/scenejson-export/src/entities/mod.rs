//! One encoder per entity kind. Each takes a borrowed entity and returns a
//! JSON object; none of them can fail.

pub mod animation;
pub mod camera;
pub mod light;
pub mod material;
pub mod mesh;
pub mod node;
pub mod texture;

use scenejson_core::{Animation, Camera, Light, Material, Mesh, Texture};
use serde_json::Value;

/// A borrowed entity from one of the scene's flat collections.
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Mesh(&'a Mesh),
    Material(&'a Material),
    Texture(&'a Texture),
    Light(&'a Light),
    Camera(&'a Camera),
    Animation(&'a Animation),
}

impl Entity<'_> {
    /// Dispatch to the encoder for this entity kind.
    pub fn encode(self) -> Value {
        match self {
            Entity::Mesh(m) => mesh::encode(m),
            Entity::Material(m) => material::encode(m),
            Entity::Texture(t) => texture::encode(t),
            Entity::Light(l) => light::encode(l),
            Entity::Camera(c) => camera::encode(c),
            Entity::Animation(a) => animation::encode(a),
        }
    }
}
