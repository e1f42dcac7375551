//! Mesh types.

use bitflags::bitflags;
use glam::{Mat4, Vec3};
use smallvec::SmallVec;

use crate::color::Color4;
use crate::label::Label;

/// Maximum number of vertex color channels per mesh.
pub const MAX_COLOR_SETS: usize = 8;
/// Maximum number of texture coordinate channels per mesh.
pub const MAX_TEXTURE_COORDS: usize = 8;

bitflags! {
    /// Primitive kinds contained in a mesh.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PrimitiveTypes: u32 {
        const POINT = 0x1;
        const LINE = 0x2;
        const TRIANGLE = 0x4;
        const POLYGON = 0x8;
        const NGON_ENCODING = 0x10;
    }
}

impl PrimitiveTypes {
    /// Primitive kind for a face with the given number of indices.
    pub fn for_index_count(count: usize) -> Self {
        match count {
            1 => Self::POINT,
            2 => Self::LINE,
            3 => Self::TRIANGLE,
            _ => Self::POLYGON,
        }
    }
}

/// One face: an ordered list of vertex indices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Face {
    pub indices: SmallVec<[u32; 4]>,
}

impl Face {
    pub fn new(indices: &[u32]) -> Self {
        Self {
            indices: SmallVec::from_slice(indices),
        }
    }

    pub fn triangle(a: u32, b: u32, c: u32) -> Self {
        Self::new(&[a, b, c])
    }
}

/// Influence of a bone on one vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexWeight {
    pub vertex_id: u32,
    pub weight: f32,
}

/// A bone of a skinned mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: Label,
    pub weights: Vec<VertexWeight>,
    /// Transforms from mesh space to bone space in bind pose.
    pub offset_matrix: Mat4,
}

impl Bone {
    pub fn new(name: impl Into<Label>, offset_matrix: Mat4) -> Self {
        Self {
            name: name.into(),
            weights: Vec::new(),
            offset_matrix,
        }
    }
}

/// Tangents and bitangents always come as a pair.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TangentFrame {
    pub tangents: Vec<Vec3>,
    pub bitangents: Vec<Vec3>,
}

/// One texture coordinate channel.
///
/// Coordinates are always stored with three components; `components` says how
/// many of them were authored (2 for UV, 3 for UVW).
#[derive(Debug, Clone, PartialEq)]
pub struct UvChannel {
    pub components: u32,
    pub coords: Vec<Vec3>,
}

impl UvChannel {
    pub fn new(components: u32, coords: Vec<Vec3>) -> Self {
        Self { components, coords }
    }
}

/// A mesh with a single material.
///
/// Every optional per-vertex channel, when present, holds exactly
/// `vertex_count()` elements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub name: Label,
    pub primitive_types: PrimitiveTypes,
    /// Index into the scene's material list.
    pub material_index: u32,
    pub positions: Option<Vec<Vec3>>,
    pub normals: Option<Vec<Vec3>>,
    pub tangent_frame: Option<TangentFrame>,
    pub faces: Vec<Face>,
    pub colors: [Option<Vec<Color4>>; MAX_COLOR_SETS],
    pub texture_coords: [Option<UvChannel>; MAX_TEXTURE_COORDS],
    pub bones: Vec<Bone>,
}

impl Mesh {
    pub fn new(name: impl Into<Label>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.as_ref().map_or(0, Vec::len)
    }

    pub fn has_positions(&self) -> bool {
        self.positions.as_ref().is_some_and(|p| !p.is_empty())
    }

    pub fn has_normals(&self) -> bool {
        self.normals.is_some() && self.vertex_count() > 0
    }

    pub fn has_tangents_and_bitangents(&self) -> bool {
        self.tangent_frame.is_some() && self.vertex_count() > 0
    }

    pub fn has_faces(&self) -> bool {
        !self.faces.is_empty()
    }

    pub fn has_bones(&self) -> bool {
        !self.bones.is_empty()
    }

    pub fn has_vertex_colors(&self, channel: usize) -> bool {
        self.colors.get(channel).is_some_and(Option::is_some) && self.vertex_count() > 0
    }

    pub fn has_texture_coords(&self, channel: usize) -> bool {
        self.texture_coords.get(channel).is_some_and(Option::is_some) && self.vertex_count() > 0
    }

    /// Recompute `primitive_types` from the face list.
    pub fn update_primitive_types(&mut self) {
        self.primitive_types = self
            .faces
            .iter()
            .fold(PrimitiveTypes::empty(), |acc, face| {
                acc | PrimitiveTypes::for_index_count(face.indices.len())
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Mesh {
        let mut mesh = Mesh::new("tri");
        mesh.positions = Some(vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
        mesh.faces = vec![Face::triangle(0, 1, 2)];
        mesh.update_primitive_types();
        mesh
    }

    #[test]
    fn test_presence_predicates() {
        let mut mesh = triangle();
        assert!(mesh.has_positions());
        assert!(mesh.has_faces());
        assert!(!mesh.has_normals());
        assert!(!mesh.has_bones());
        assert!(!mesh.has_vertex_colors(0));
        assert!(!mesh.has_texture_coords(MAX_TEXTURE_COORDS + 3));

        mesh.normals = Some(vec![Vec3::Z; 3]);
        assert!(mesh.has_normals());
    }

    #[test]
    fn test_channels_are_independent() {
        let mut mesh = triangle();
        mesh.texture_coords[2] = Some(UvChannel::new(2, vec![Vec3::ZERO; 3]));
        assert!(!mesh.has_texture_coords(0));
        assert!(mesh.has_texture_coords(2));
    }

    #[test]
    fn test_update_primitive_types() {
        let mut mesh = triangle();
        mesh.faces.push(Face::new(&[0, 1]));
        mesh.update_primitive_types();
        assert_eq!(
            mesh.primitive_types,
            PrimitiveTypes::TRIANGLE | PrimitiveTypes::LINE
        );
    }
}
