//! Merging of identical vertices.

use std::collections::HashMap;

use scenejson_core::{Face, Mesh, Scene, SceneFlags};

use super::{remap_bones, select_vertices};

/// Merge vertices whose every channel is bit-identical, including their
/// bone influences, and rewrite faces to match. Marks the scene as
/// non-verbose. Returns the number of vertices removed.
pub fn join_identical_vertices(scene: &mut Scene) -> usize {
    let removed = scene.meshes.iter_mut().map(join_mesh).sum();
    scene.flags |= SceneFlags::NON_VERBOSE_FORMAT;
    removed
}

fn join_mesh(mesh: &mut Mesh) -> usize {
    let count = mesh.vertex_count();
    if count == 0 {
        return 0;
    }

    // (bone, weight bits) per vertex, in bone order.
    let mut influences: Vec<Vec<(u32, u32)>> = vec![Vec::new(); count];
    for (b, bone) in mesh.bones.iter().enumerate() {
        for weight in &bone.weights {
            if let Some(list) = influences.get_mut(weight.vertex_id as usize) {
                list.push((b as u32, weight.weight.to_bits()));
            }
        }
    }

    let mut unique: HashMap<Vec<u32>, u32> = HashMap::with_capacity(count);
    let mut new_index: Vec<u32> = Vec::with_capacity(count);
    let mut order: Vec<usize> = Vec::new();
    for (v, influence) in influences.iter().enumerate() {
        let next = order.len() as u32;
        let index = *unique.entry(vertex_key(mesh, v, influence)).or_insert_with(|| {
            order.push(v);
            next
        });
        new_index.push(index);
    }

    let removed = count - order.len();
    if removed == 0 {
        return 0;
    }

    let mut joined = select_vertices(mesh, &order);
    joined.faces = mesh
        .faces
        .iter()
        .map(|face| {
            let indices: Vec<u32> = face.indices.iter().map(|&i| new_index[i as usize]).collect();
            Face::new(&indices)
        })
        .collect();
    // Only the surviving copy of a vertex keeps its weights.
    joined.bones = remap_bones(&mesh.bones, |vertex| {
        let index = *new_index.get(vertex as usize)?;
        (order[index as usize] == vertex as usize).then_some(index)
    });

    *mesh = joined;
    removed
}

/// Bit patterns of every channel of vertex `v`, followed by its influences.
fn vertex_key(mesh: &Mesh, v: usize, influences: &[(u32, u32)]) -> Vec<u32> {
    let mut key = Vec::with_capacity(24);
    let mut push = |values: &[f32]| key.extend(values.iter().map(|f| f.to_bits()));

    if let Some(positions) = &mesh.positions {
        push(&positions[v].to_array());
    }
    if let Some(normals) = &mesh.normals {
        push(&normals[v].to_array());
    }
    if let Some(frame) = &mesh.tangent_frame {
        push(&frame.tangents[v].to_array());
        push(&frame.bitangents[v].to_array());
    }
    for colors in mesh.colors.iter().flatten() {
        let c = colors[v];
        push(&[c.r, c.g, c.b, c.a]);
    }
    for channel in mesh.texture_coords.iter().flatten() {
        push(&channel.coords[v].to_array());
    }

    for &(bone, weight) in influences {
        key.push(bone);
        key.push(weight);
    }
    key
}
