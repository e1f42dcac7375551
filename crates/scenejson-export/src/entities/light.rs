use scenejson_core::Light;
use serde_json::{json, Value};

use crate::primitives::{color3, label, vec2, vec3};

/// Encode a light. Colors stay RGB.
pub fn encode(light: &Light) -> Value {
    json!({
        "name": label(&light.name),
        "type": light.light_type as u32,
        "position": vec3(light.position),
        "direction": vec3(light.direction),
        "up": vec3(light.up),
        "attenuation_constant": light.attenuation_constant,
        "attenuation_linear": light.attenuation_linear,
        "attenuation_quadratic": light.attenuation_quadratic,
        "diffuse": color3(light.color_diffuse),
        "specular": color3(light.color_specular),
        "ambient": color3(light.color_ambient),
        "angle_inner_cone": light.angle_inner_cone,
        "angle_outer_cone": light.angle_outer_cone,
        "size": vec2(light.size),
    })
}
