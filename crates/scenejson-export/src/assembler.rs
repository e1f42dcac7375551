//! Builds the top-level document from a scene.
//!
//! The document is produced in one pass over the scene's collections, in
//! the order flags, meshes, materials, textures, lights, cameras,
//! animations, root. Each collection is preceded by its `num_<kind>` count,
//! which always equals the array length.

use scenejson_core::Scene;
use serde_json::{Map, Value};

use crate::entities::{node, Entity};

/// The flat entity collections of a scene, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Meshes,
    Materials,
    Textures,
    Lights,
    Cameras,
    Animations,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Meshes,
        Section::Materials,
        Section::Textures,
        Section::Lights,
        Section::Cameras,
        Section::Animations,
    ];

    /// Key of the entity array.
    pub fn key(self) -> &'static str {
        match self {
            Section::Meshes => "meshes",
            Section::Materials => "materials",
            Section::Textures => "textures",
            Section::Lights => "lights",
            Section::Cameras => "cameras",
            Section::Animations => "animations",
        }
    }

    /// Key of the element count.
    pub fn count_key(self) -> &'static str {
        match self {
            Section::Meshes => "num_meshes",
            Section::Materials => "num_materials",
            Section::Textures => "num_textures",
            Section::Lights => "num_lights",
            Section::Cameras => "num_cameras",
            Section::Animations => "num_animations",
        }
    }

    /// Borrow every entity of this section, in index order.
    pub fn entities(self, scene: &Scene) -> Vec<Entity<'_>> {
        match self {
            Section::Meshes => scene.meshes.iter().map(Entity::Mesh).collect(),
            Section::Materials => scene.materials.iter().map(Entity::Material).collect(),
            Section::Textures => scene.textures.iter().map(Entity::Texture).collect(),
            Section::Lights => scene.lights.iter().map(Entity::Light).collect(),
            Section::Cameras => scene.cameras.iter().map(Entity::Camera).collect(),
            Section::Animations => scene.animations.iter().map(Entity::Animation).collect(),
        }
    }
}

/// Encode a whole scene into one JSON document.
pub fn assemble(scene: &Scene) -> Value {
    let mut document = Map::new();
    document.insert("flags".into(), scene.flags.bits().into());

    for section in Section::ALL {
        let encoded: Vec<Value> = section
            .entities(scene)
            .into_iter()
            .map(Entity::encode)
            .collect();
        log::debug!("encoded {} {}", encoded.len(), section.key());

        document.insert(section.count_key().into(), encoded.len().into());
        document.insert(section.key().into(), Value::Array(encoded));
    }

    document.insert("root".into(), node::encode(&scene.root));
    log::debug!("encoded {} nodes", scene.root.count());

    Value::Object(document)
}
