use scenejson_core::{Animation, MeshAnim, MeshKey, MeshMorphAnim, MeshMorphKey, NodeAnim};
use serde_json::{json, Value};

use crate::collections::array;
use crate::primitives::{label, quat_key, vector_key};

fn node_channel(channel: &NodeAnim) -> Value {
    json!({
        "node_name": label(&channel.node_name),
        "position_keys": array(&channel.position_keys, vector_key),
        "rotation_keys": array(&channel.rotation_keys, quat_key),
        "scaling_keys": array(&channel.scaling_keys, vector_key),
        "pre_state": channel.pre_state as u32,
        "post_state": channel.post_state as u32,
    })
}

fn mesh_key(key: &MeshKey) -> Value {
    json!({
        "time": key.time,
        "value": key.value,
    })
}

fn mesh_channel(channel: &MeshAnim) -> Value {
    json!({
        "name": label(&channel.name),
        "keys": array(&channel.keys, mesh_key),
    })
}

fn morph_key(key: &MeshMorphKey) -> Value {
    json!({
        "time": key.time,
        "values": key.values,
        "weights": key.weights,
    })
}

fn morph_channel(channel: &MeshMorphAnim) -> Value {
    json!({
        "name": label(&channel.name),
        "keys": array(&channel.keys, morph_key),
    })
}

pub fn encode(animation: &Animation) -> Value {
    json!({
        "name": label(&animation.name),
        "duration": animation.duration,
        "ticks_per_second": animation.ticks_per_second,
        "num_channels": animation.channels.len(),
        "channels": array(&animation.channels, node_channel),
        "num_mesh_channels": animation.mesh_channels.len(),
        "mesh_channels": array(&animation.mesh_channels, mesh_channel),
        "num_morph_mesh_channels": animation.morph_mesh_channels.len(),
        "morph_mesh_channels": array(&animation.morph_mesh_channels, morph_channel),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenejson_core::{AnimBehaviour, Quat, QuatKey, Vec3, VectorKey};

    #[test]
    fn test_node_channel() {
        let mut animation = Animation::new("walk");
        animation.duration = 2000.0;
        animation.ticks_per_second = 1000.0;
        animation.channels.push(NodeAnim {
            node_name: "hip".into(),
            position_keys: vec![
                VectorKey::new(0.0, Vec3::ZERO),
                VectorKey::new(1000.0, Vec3::X),
            ],
            rotation_keys: vec![QuatKey::new(0.0, Quat::IDENTITY)],
            scaling_keys: Vec::new(),
            pre_state: AnimBehaviour::Default,
            post_state: AnimBehaviour::Repeat,
        });

        let value = encode(&animation);
        assert_eq!(value["num_channels"], json!(1));
        assert_eq!(value["num_mesh_channels"], json!(0));
        assert_eq!(value["mesh_channels"], json!([]));

        let channel = &value["channels"][0];
        assert_eq!(channel["node_name"], json!("hip"));
        assert_eq!(channel["position_keys"][1], json!({"time": 1000.0, "value": [1.0, 0.0, 0.0]}));
        assert_eq!(channel["rotation_keys"][0]["value"], json!([0.0, 0.0, 0.0, 1.0]));
        assert_eq!(channel["scaling_keys"], json!([]));
        assert_eq!(channel["post_state"], json!(3));
    }

    #[test]
    fn test_mesh_and_morph_channels() {
        let mut animation = Animation::new("blink");
        animation.mesh_channels.push(MeshAnim {
            name: "face".into(),
            keys: vec![MeshKey { time: 5.0, value: 1 }],
        });
        animation.morph_mesh_channels.push(MeshMorphAnim {
            name: "face".into(),
            keys: vec![MeshMorphKey {
                time: 0.0,
                values: vec![0, 1],
                weights: vec![0.25, 0.75],
            }],
        });

        let value = encode(&animation);
        assert_eq!(value["mesh_channels"][0]["keys"], json!([{"time": 5.0, "value": 1}]));
        assert_eq!(
            value["morph_mesh_channels"][0]["keys"],
            json!([{"time": 0.0, "values": [0, 1], "weights": [0.25, 0.75]}])
        );
        assert_eq!(value["num_morph_mesh_channels"], json!(1));
    }
}
