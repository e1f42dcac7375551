//! The scene: flat entity collections plus the node tree.

use bitflags::bitflags;
use thiserror::Error;

use crate::animation::Animation;
use crate::camera::Camera;
use crate::light::Light;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::node::Node;
use crate::texture::Texture;

bitflags! {
    /// Scene-wide state flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SceneFlags: u32 {
        /// The importer could not produce a full scene.
        const INCOMPLETE = 0x1;
        const VALIDATED = 0x2;
        const VALIDATION_WARNING = 0x4;
        /// Vertices are shared between faces.
        const NON_VERBOSE_FORMAT = 0x8;
        const TERRAIN = 0x10;
        const ALLOW_SHARED = 0x20;
    }
}

/// A broken cross-reference found by [`Scene::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("mesh {mesh}: {channel} has {len} elements, expected {expected}")]
    ChannelLength {
        mesh: usize,
        channel: &'static str,
        len: usize,
        expected: usize,
    },

    #[error("mesh {mesh}: face index {index} out of range")]
    FaceIndex { mesh: usize, index: u32 },

    #[error("mesh {mesh}: material index {index} out of range")]
    MaterialIndex { mesh: usize, index: u32 },

    #[error("node '{node}': mesh index {index} out of range")]
    NodeMesh { node: String, index: u32 },
}

/// A fully imported scene.
///
/// Entities are referenced by their index in the owning collection. The
/// serializer never resolves those indices, it only reports them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub flags: SceneFlags,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    pub lights: Vec<Light>,
    pub cameras: Vec<Camera>,
    pub animations: Vec<Animation>,
    pub root: Node,
}

impl Scene {
    /// Create an empty scene with the given root node.
    pub fn new(root: Node) -> Self {
        Self {
            root,
            ..Default::default()
        }
    }

    /// Add a mesh and return its index.
    pub fn add_mesh(&mut self, mesh: Mesh) -> u32 {
        self.meshes.push(mesh);
        (self.meshes.len() - 1) as u32
    }

    /// Add a material and return its index.
    pub fn add_material(&mut self, material: Material) -> u32 {
        self.materials.push(material);
        (self.materials.len() - 1) as u32
    }

    /// Add an embedded texture and return its index.
    pub fn add_texture(&mut self, texture: Texture) -> u32 {
        self.textures.push(texture);
        (self.textures.len() - 1) as u32
    }

    /// Check the cross-references an importer promises to keep valid:
    /// per-vertex channel lengths, face indices, material indices and node
    /// mesh indices. Stops at the first violation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (i, mesh) in self.meshes.iter().enumerate() {
            let vertex_count = mesh.vertex_count();
            let check_len = |channel: &'static str, len: usize| {
                if len == vertex_count {
                    Ok(())
                } else {
                    Err(ValidationError::ChannelLength {
                        mesh: i,
                        channel,
                        len,
                        expected: vertex_count,
                    })
                }
            };

            if let Some(normals) = &mesh.normals {
                check_len("normals", normals.len())?;
            }
            if let Some(frame) = &mesh.tangent_frame {
                check_len("tangents", frame.tangents.len())?;
                check_len("bitangents", frame.bitangents.len())?;
            }
            for colors in mesh.colors.iter().flatten() {
                check_len("colors", colors.len())?;
            }
            for channel in mesh.texture_coords.iter().flatten() {
                check_len("texture coordinates", channel.coords.len())?;
            }
            for face in &mesh.faces {
                if let Some(&bad) = face.indices.iter().find(|&&v| v as usize >= vertex_count) {
                    return Err(ValidationError::FaceIndex { mesh: i, index: bad });
                }
            }
            if mesh.material_index as usize >= self.materials.len() {
                return Err(ValidationError::MaterialIndex {
                    mesh: i,
                    index: mesh.material_index,
                });
            }
        }

        for node in self.root.iter() {
            if let Some(&bad) = node.meshes.iter().find(|&&m| m as usize >= self.meshes.len()) {
                return Err(ValidationError::NodeMesh {
                    node: node.name.to_string_lossy(),
                    index: bad,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Face;
    use glam::Vec3;

    fn scene_with_triangle() -> Scene {
        let mut scene = Scene::new(Node::new("root"));
        let mut mesh = Mesh::new("tri");
        mesh.positions = Some(vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
        mesh.faces = vec![Face::triangle(0, 1, 2)];
        scene.add_material(Material::named("default"));
        let idx = scene.add_mesh(mesh);
        scene.root.meshes.push(idx);
        scene
    }

    #[test]
    fn test_empty_scene() {
        assert!(Scene::default().validate().is_ok());
    }

    #[test]
    fn test_validate_ok() {
        assert!(scene_with_triangle().validate().is_ok());
    }

    #[test]
    fn test_validate_short_channel() {
        let mut scene = scene_with_triangle();
        scene.meshes[0].normals = Some(vec![Vec3::Z]);
        assert_eq!(
            scene.validate(),
            Err(ValidationError::ChannelLength {
                mesh: 0,
                channel: "normals",
                len: 1,
                expected: 3,
            })
        );
    }

    #[test]
    fn test_validate_dangling_node_mesh() {
        let mut scene = scene_with_triangle();
        scene.root.add_child(Node::new("bad").with_meshes([5]));
        let err = scene.validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::NodeMesh {
                node: "bad".to_string(),
                index: 5,
            }
        );
        assert_eq!(err.to_string(), "node 'bad': mesh index 5 out of range");
    }
}
