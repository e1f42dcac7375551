//! scenejson-core: the in-memory scene graph handed from an importer to the
//! serializer.
//!
//! The model mirrors what a general-purpose 3D asset importer produces:
//!
//! ```text
//! Scene
//! ├── meshes      (positions, normals, tangents, faces, colors, UVs, bones)
//! ├── materials   (keyed property store, texture bindings by type/slot)
//! ├── textures    (embedded pixel data)
//! ├── lights
//! ├── cameras
//! ├── animations  (node, mesh and morph channels)
//! └── root: Node  (owned tree of transforms and mesh references)
//! ```
//!
//! Optional per-vertex channels are `Option`s, so "absent" is a distinct
//! state from "present but empty". Cross-entity references are plain
//! indices.

pub mod animation;
pub mod camera;
pub mod color;
pub mod label;
pub mod light;
pub mod material;
pub mod mesh;
pub mod node;
pub mod scene;
pub mod texture;

pub use animation::{
    AnimBehaviour, Animation, MeshAnim, MeshKey, MeshMorphAnim, MeshMorphKey, NodeAnim, QuatKey,
    VectorKey,
};
pub use camera::Camera;
pub use color::{Color3, Color4};
pub use label::{Label, MAX_LABEL_LEN};
pub use light::{Light, LightSourceType};
pub use material::{
    blend_mode, matkey, shading_model, Material, MaterialProperty, PropertyValue, TextureBinding,
    TextureMapMode,
    TextureMapping, TextureOp, TextureType,
};
pub use mesh::{
    Bone, Face, Mesh, PrimitiveTypes, TangentFrame, UvChannel, VertexWeight, MAX_COLOR_SETS,
    MAX_TEXTURE_COORDS,
};
pub use node::Node;
pub use scene::{Scene, SceneFlags, ValidationError};
pub use texture::{Texel, Texture};

// Math types used throughout the model.
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
