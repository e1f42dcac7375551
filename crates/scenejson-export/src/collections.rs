//! Encoders for variable-length and conditionally present arrays.
//!
//! Output arrays keep the source's index order. A channel that the source
//! reports as absent produces no value at all, so the caller can leave its
//! key out of the enclosing object.

use scenejson_core::{Bone, Face, Mesh, UvChannel, VertexWeight, MAX_COLOR_SETS, MAX_TEXTURE_COORDS};
use serde_json::{json, Map, Value};

use crate::primitives;

/// Encode every element of `items` in order.
pub fn array<T>(items: &[T], encode: impl Fn(&T) -> Value) -> Value {
    Value::Array(items.iter().map(encode).collect())
}

/// Encode `items` only when `present` holds.
pub fn channel<T>(items: &[T], present: bool, encode: impl Fn(&T) -> Value) -> Option<Value> {
    present.then(|| array(items, encode))
}

/// Insert `value` under `key` unless it is absent.
pub fn insert_present(object: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        object.insert(key.to_owned(), value);
    }
}

/// Build an object keyed by decimal channel index over the present channels.
/// Returns `None` when no channel is present.
fn indexed_channels(count: usize, mut encode: impl FnMut(usize) -> Option<Value>) -> Option<Value> {
    let object: Map<String, Value> = (0..count)
        .filter_map(|i| encode(i).map(|value| (i.to_string(), value)))
        .collect();

    (!object.is_empty()).then_some(Value::Object(object))
}

pub fn face(face: &Face) -> Value {
    json!({
        "num_indices": face.indices.len(),
        "indices": face.indices.as_slice(),
    })
}

pub fn vertex_weight(weight: &VertexWeight) -> Value {
    json!({
        "id": weight.vertex_id,
        "weight": weight.weight,
    })
}

pub fn bone(bone: &Bone) -> Value {
    json!({
        "name": primitives::label(&bone.name),
        "offset_matrix": primitives::matrix(&bone.offset_matrix),
        "num_weights": bone.weights.len(),
        "weights": array(&bone.weights, vertex_weight),
    })
}

/// Coordinates truncated to the channel's component count.
pub fn uv_channel(channel: &UvChannel) -> Value {
    let n = (channel.components as usize).min(3);
    let coords = channel
        .coords
        .iter()
        .map(|coord| Value::from(&coord.to_array()[..n]))
        .collect();

    json!({
        "numcomponents": channel.components,
        "coords": Value::Array(coords),
    })
}

/// `{"<i>": [[r, g, b, a], ...]}` over the mesh's present color sets.
pub fn color_sets(mesh: &Mesh) -> Option<Value> {
    indexed_channels(MAX_COLOR_SETS, |i| {
        let colors = mesh.colors[i].as_deref()?;
        channel(colors, mesh.has_vertex_colors(i), |c| primitives::color4(*c))
    })
}

/// `{"<i>": {numcomponents, coords}}` over the mesh's present UV channels.
pub fn texture_coord_sets(mesh: &Mesh) -> Option<Value> {
    indexed_channels(MAX_TEXTURE_COORDS, |i| {
        let uv = mesh.texture_coords[i].as_ref()?;
        mesh.has_texture_coords(i).then(|| uv_channel(uv))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenejson_core::{Color4, Mat4, Vec3};

    #[test]
    fn test_absent_channel_is_omitted() {
        let items = [Vec3::X];
        assert!(channel(&items, false, |v| primitives::vec3(*v)).is_none());
        assert_eq!(
            channel(&items, true, |v| primitives::vec3(*v)),
            Some(json!([[1.0, 0.0, 0.0]]))
        );
    }

    #[test]
    fn test_present_but_empty_channel() {
        let items: [Vec3; 0] = [];
        assert_eq!(channel(&items, true, |v| primitives::vec3(*v)), Some(json!([])));
    }

    #[test]
    fn test_face() {
        assert_eq!(
            face(&Face::new(&[3, 1, 2, 0])),
            json!({"num_indices": 4, "indices": [3, 1, 2, 0]})
        );
    }

    #[test]
    fn test_bone_keeps_weight_order() {
        let mut b = Bone::new("hip", Mat4::IDENTITY);
        b.weights.push(VertexWeight { vertex_id: 9, weight: 0.25 });
        b.weights.push(VertexWeight { vertex_id: 2, weight: 0.75 });

        let value = bone(&b);
        assert_eq!(value["num_weights"], json!(2));
        assert_eq!(
            value["weights"],
            json!([{"id": 9, "weight": 0.25}, {"id": 2, "weight": 0.75}])
        );
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["name", "offset_matrix", "num_weights", "weights"]);
    }

    #[test]
    fn test_color_sets_sparse_indices() {
        let mut mesh = Mesh::new("m");
        mesh.positions = Some(vec![Vec3::ZERO]);
        mesh.colors[2] = Some(vec![Color4::new(1.0, 0.5, 0.25, 1.0)]);

        let value = color_sets(&mesh).unwrap();
        assert_eq!(value, json!({"2": [[1.0, 0.5, 0.25, 1.0]]}));
    }

    #[test]
    fn test_no_color_sets() {
        let mesh = Mesh::new("m");
        assert!(color_sets(&mesh).is_none());
        assert!(texture_coord_sets(&mesh).is_none());
    }

    #[test]
    fn test_uv_components() {
        let mut mesh = Mesh::new("m");
        mesh.positions = Some(vec![Vec3::ZERO]);
        mesh.texture_coords[0] = Some(UvChannel::new(2, vec![Vec3::new(0.5, 0.25, 9.0)]));
        mesh.texture_coords[1] = Some(UvChannel::new(3, vec![Vec3::new(0.5, 0.25, 1.0)]));

        let value = texture_coord_sets(&mesh).unwrap();
        assert_eq!(value["0"], json!({"numcomponents": 2, "coords": [[0.5, 0.25]]}));
        assert_eq!(value["1"]["coords"], json!([[0.5, 0.25, 1.0]]));
    }
}
