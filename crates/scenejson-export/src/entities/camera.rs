use scenejson_core::Camera;
use serde_json::{json, Value};

use crate::primitives::{label, vec3};

pub fn encode(camera: &Camera) -> Value {
    json!({
        "name": label(&camera.name),
        "position": vec3(camera.position),
        "up": vec3(camera.up),
        "lookat": vec3(camera.look_at),
        "horizontal_fov": camera.horizontal_fov,
        "clip_plane_near": camera.clip_plane_near,
        "clip_plane_far": camera.clip_plane_far,
        "aspect": camera.aspect,
        "orthographic_width": camera.orthographic_width,
    })
}
