//! Encoders for fixed-shape values.
//!
//! All of these are total: every value the model can hold maps to JSON.
//! Non-finite floats become `null`.

use scenejson_core::{Color3, Color4, Label, Mat4, Quat, QuatKey, Vec2, Vec3, VectorKey};
use serde_json::{json, Value};

pub fn vec2(v: Vec2) -> Value {
    json!([v.x, v.y])
}

pub fn vec3(v: Vec3) -> Value {
    json!([v.x, v.y, v.z])
}

/// `[r, g, b]`, without a synthesized alpha.
pub fn color3(c: Color3) -> Value {
    json!([c.r, c.g, c.b])
}

/// `[r, g, b, a]`.
pub fn color4(c: Color4) -> Value {
    json!([c.r, c.g, c.b, c.a])
}

/// `[x, y, z, w]`, scalar last.
pub fn quat(q: Quat) -> Value {
    json!([q.x, q.y, q.z, q.w])
}

/// Sixteen floats in row-major order: a1..a4, b1..b4, c1..c4, d1..d4.
pub fn matrix(m: &Mat4) -> Value {
    let cells: Vec<Value> = (0..4)
        .flat_map(|r| m.row(r).to_array())
        .map(Value::from)
        .collect();
    Value::Array(cells)
}

/// Text up to the label's declared length.
pub fn label(l: &Label) -> Value {
    Value::String(l.to_string_lossy())
}

pub fn vector_key(key: &VectorKey) -> Value {
    json!({
        "time": key.time,
        "value": vec3(key.value),
    })
}

pub fn quat_key(key: &QuatKey) -> Value {
    json!({
        "time": key.time,
        "value": quat(key.value),
    })
}
