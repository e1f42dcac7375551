use scenejson_core::Mesh;
use serde_json::{Map, Value};

use crate::collections::{self, channel, insert_present};
use crate::primitives;

/// Encode a mesh. Optional channels appear only when the mesh reports them
/// present, in the fixed order vertices, normals, tangents, bitangents,
/// faces, bones, colors, texturecoords.
pub fn encode(mesh: &Mesh) -> Value {
    let mut object = Map::new();
    object.insert("name".into(), primitives::label(&mesh.name));
    object.insert("primitive_types".into(), mesh.primitive_types.bits().into());
    object.insert("material_index".into(), mesh.material_index.into());

    let vec3 = |v: &scenejson_core::Vec3| primitives::vec3(*v);

    if let Some(positions) = &mesh.positions {
        insert_present(&mut object, "vertices", channel(positions, mesh.has_positions(), vec3));
    }
    if let Some(normals) = &mesh.normals {
        insert_present(&mut object, "normals", channel(normals, mesh.has_normals(), vec3));
    }
    if let Some(frame) = &mesh.tangent_frame {
        let present = mesh.has_tangents_and_bitangents();
        insert_present(&mut object, "tangents", channel(&frame.tangents, present, vec3));
        insert_present(&mut object, "bitangents", channel(&frame.bitangents, present, vec3));
    }
    insert_present(
        &mut object,
        "faces",
        channel(&mesh.faces, mesh.has_faces(), collections::face),
    );
    insert_present(
        &mut object,
        "bones",
        channel(&mesh.bones, mesh.has_bones(), collections::bone),
    );
    insert_present(&mut object, "colors", collections::color_sets(mesh));
    insert_present(&mut object, "texturecoords", collections::texture_coord_sets(mesh));

    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenejson_core::{Face, PrimitiveTypes, TangentFrame, Vec3};
    use serde_json::json;

    fn keys(value: &Value) -> Vec<String> {
        value.as_object().unwrap().keys().cloned().collect()
    }

    #[test]
    fn test_bare_mesh() {
        let mesh = Mesh::new("empty");
        let value = encode(&mesh);
        assert_eq!(keys(&value), ["name", "primitive_types", "material_index"]);
        assert_eq!(value["name"], json!("empty"));
    }

    #[test]
    fn test_triangle() {
        let mut mesh = Mesh::new("tri");
        mesh.positions = Some(vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
        mesh.normals = Some(vec![Vec3::Z; 3]);
        mesh.faces = vec![Face::triangle(0, 1, 2)];
        mesh.update_primitive_types();
        mesh.material_index = 2;

        let value = encode(&mesh);
        assert_eq!(
            keys(&value),
            ["name", "primitive_types", "material_index", "vertices", "normals", "faces"]
        );
        assert_eq!(value["primitive_types"], json!(PrimitiveTypes::TRIANGLE.bits()));
        assert_eq!(value["material_index"], json!(2));
        assert_eq!(
            value["vertices"],
            json!([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
        );
        assert_eq!(value["faces"], json!([{"num_indices": 3, "indices": [0, 1, 2]}]));
    }

    #[test]
    fn test_tangents_and_bitangents_together() {
        let mut mesh = Mesh::new("m");
        mesh.positions = Some(vec![Vec3::ZERO]);
        mesh.tangent_frame = Some(TangentFrame {
            tangents: vec![Vec3::X],
            bitangents: vec![Vec3::Y],
        });

        let value = encode(&mesh);
        assert_eq!(value["tangents"], json!([[1.0, 0.0, 0.0]]));
        assert_eq!(value["bitangents"], json!([[0.0, 1.0, 0.0]]));
    }

    #[test]
    fn test_channels_without_vertices_are_omitted() {
        let mut mesh = Mesh::new("m");
        mesh.normals = Some(Vec::new());
        let value = encode(&mesh);
        assert!(value.get("normals").is_none());
        assert!(value.get("vertices").is_none());
    }

    #[test]
    fn test_reversed_vertices_reverse_output() {
        let vertices = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z];
        let mut forward = Mesh::new("m");
        forward.positions = Some(vertices.clone());
        let mut backward = Mesh::new("m");
        backward.positions = Some(vertices.into_iter().rev().collect());

        let mut expected = encode(&forward)["vertices"].as_array().unwrap().clone();
        expected.reverse();
        assert_eq!(encode(&backward)["vertices"], Value::Array(expected));
    }
}
