//! Splitting meshes by primitive type.

use scenejson_core::{Face, Mesh, PrimitiveTypes, Scene};

use super::{remap_bones, select_vertices};

const KINDS: [PrimitiveTypes; 4] = [
    PrimitiveTypes::POINT,
    PrimitiveTypes::LINE,
    PrimitiveTypes::TRIANGLE,
    PrimitiveTypes::POLYGON,
];

/// Split every mesh holding more than one primitive type into one mesh per
/// type and point the nodes at the replacements. Returns the number of
/// meshes added.
pub fn sort_by_primitive_type(scene: &mut Scene) -> usize {
    let original = std::mem::take(&mut scene.meshes);
    let original_count = original.len();

    // New mesh indices for each original mesh.
    let mut replacements: Vec<Vec<u32>> = Vec::with_capacity(original_count);
    for mesh in original {
        let parts = split_mesh(mesh);
        let start = scene.meshes.len() as u32;
        replacements.push((start..start + parts.len() as u32).collect());
        scene.meshes.extend(parts);
    }

    let added = scene.meshes.len() - original_count;
    if added > 0 {
        scene.root.visit_mut(&mut |node| {
            node.meshes = node
                .meshes
                .iter()
                .flat_map(|&m| replacements.get(m as usize).cloned().unwrap_or_default())
                .collect();
        });
    }
    added
}

fn split_mesh(mesh: Mesh) -> Vec<Mesh> {
    let kinds: Vec<PrimitiveTypes> = KINDS
        .into_iter()
        .filter(|&kind| mesh.faces.iter().any(|face| kind_of(face) == kind))
        .collect();

    if kinds.len() <= 1 {
        return vec![mesh];
    }
    kinds.into_iter().map(|kind| extract(&mesh, kind)).collect()
}

fn kind_of(face: &Face) -> PrimitiveTypes {
    PrimitiveTypes::for_index_count(face.indices.len())
}

/// The faces of one kind, with only the vertices they use.
fn extract(mesh: &Mesh, kind: PrimitiveTypes) -> Mesh {
    let mut new_index: Vec<Option<u32>> = vec![None; mesh.vertex_count()];
    let mut order: Vec<usize> = Vec::new();
    let mut faces = Vec::new();

    for face in mesh.faces.iter().filter(|face| kind_of(face) == kind) {
        let mut indices = Vec::with_capacity(face.indices.len());
        for &old in &face.indices {
            let slot = &mut new_index[old as usize];
            let index = match *slot {
                Some(index) => index,
                None => {
                    let index = order.len() as u32;
                    order.push(old as usize);
                    *slot = Some(index);
                    index
                }
            };
            indices.push(index);
        }
        faces.push(Face::new(&indices));
    }

    let mut part = select_vertices(mesh, &order);
    part.faces = faces;
    part.primitive_types = kind;
    part.bones = remap_bones(&mesh.bones, |vertex| {
        new_index.get(vertex as usize).copied().flatten()
    });
    part
}
