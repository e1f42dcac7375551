//! Post-processing steps run on a freshly read scene.
//!
//! Every step works on a validated scene: per-vertex channels match the
//! vertex count and face indices are in range.

mod join_vertices;
mod sort_by_type;
mod triangulate;

pub use join_vertices::join_identical_vertices;
pub use sort_by_type::sort_by_primitive_type;
pub use triangulate::triangulate;

use scenejson_core::{Bone, Mesh, Scene, TangentFrame, UvChannel, VertexWeight};

use crate::options::ImportOptions;

/// Run the enabled steps: triangulate, then sort by primitive type, then
/// join identical vertices.
pub fn apply(scene: &mut Scene, options: &ImportOptions) {
    if options.triangulate {
        let split = triangulate(scene);
        log::debug!("triangulate: {} polygons split", split);
    }
    if options.sort_by_primitive_type {
        let added = sort_by_primitive_type(scene);
        log::debug!("sort by primitive type: {} meshes added", added);
    }
    if options.join_identical_vertices {
        let removed = join_identical_vertices(scene);
        log::debug!("join identical vertices: {} vertices removed", removed);
    }
}

/// Copy of `mesh` holding only the vertices listed in `order`, renumbered by
/// their position in that list. Faces and bones are left empty.
fn select_vertices(mesh: &Mesh, order: &[usize]) -> Mesh {
    fn gather<T: Copy>(values: &[T], order: &[usize]) -> Vec<T> {
        order.iter().map(|&i| values[i]).collect()
    }

    Mesh {
        name: mesh.name.clone(),
        primitive_types: mesh.primitive_types,
        material_index: mesh.material_index,
        positions: mesh.positions.as_deref().map(|p| gather(p, order)),
        normals: mesh.normals.as_deref().map(|n| gather(n, order)),
        tangent_frame: mesh.tangent_frame.as_ref().map(|frame| TangentFrame {
            tangents: gather(&frame.tangents, order),
            bitangents: gather(&frame.bitangents, order),
        }),
        faces: Vec::new(),
        colors: std::array::from_fn(|c| mesh.colors[c].as_deref().map(|set| gather(set, order))),
        texture_coords: std::array::from_fn(|c| {
            mesh.texture_coords[c]
                .as_ref()
                .map(|uv| UvChannel::new(uv.components, gather(&uv.coords, order)))
        }),
        bones: Vec::new(),
    }
}

/// Rewrite bone weights through `map`, which returns the new vertex id or
/// `None` to drop the weight. Bones left without weights are dropped.
fn remap_bones(bones: &[Bone], map: impl Fn(u32) -> Option<u32>) -> Vec<Bone> {
    bones
        .iter()
        .filter_map(|bone| {
            let weights: Vec<VertexWeight> = bone
                .weights
                .iter()
                .filter_map(|w| {
                    map(w.vertex_id).map(|vertex_id| VertexWeight {
                        vertex_id,
                        weight: w.weight,
                    })
                })
                .collect();

            (!weights.is_empty()).then(|| Bone {
                name: bone.name.clone(),
                offset_matrix: bone.offset_matrix,
                weights,
            })
        })
        .collect()
}
