use scenejson_core::Node;
use serde_json::{json, Value};

use crate::collections::array;
use crate::primitives::{label, matrix};

/// Encode a node and, recursively, its children in order.
pub fn encode(node: &Node) -> Value {
    json!({
        "name": label(&node.name),
        "transformation": matrix(&node.transformation),
        "meshes": node.meshes,
        "children": array(&node.children, encode),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenejson_core::{Mat4, Vec3};

    #[test]
    fn test_leaf() {
        let value = encode(&Node::new("leaf").with_meshes([0, 2]));
        assert_eq!(value["name"], json!("leaf"));
        assert_eq!(value["meshes"], json!([0, 2]));
        assert_eq!(value["children"], json!([]));
        assert_eq!(value["transformation"][0], json!(1.0));
        assert_eq!(value["transformation"][15], json!(1.0));
    }

    #[test]
    fn test_children_in_order() {
        let mut root = Node::new("root");
        let arm = root.add_child(
            Node::new("arm").transformed(Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0))),
        );
        arm.add_child(Node::new("hand"));
        root.add_child(Node::new("leg"));

        let value = encode(&root);
        assert_eq!(value["children"][0]["name"], json!("arm"));
        assert_eq!(value["children"][1]["name"], json!("leg"));
        assert_eq!(value["children"][0]["children"][0]["name"], json!("hand"));
        assert_eq!(value["children"][0]["transformation"][7], json!(2.0));
    }
}
