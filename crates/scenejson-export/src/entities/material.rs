use scenejson_core::{matkey, Material, TextureBinding, TextureType};
use serde_json::{json, Map, Value};

use crate::primitives;

/// Lowercase keyword for a texture type. Types without a keyword, including
/// the PBR kinds, render as `"none"`.
pub fn texture_type_keyword(ty: TextureType) -> &'static str {
    match ty {
        TextureType::Diffuse => "diffuse",
        TextureType::Specular => "specular",
        TextureType::Ambient => "ambient",
        TextureType::Emissive => "emissive",
        TextureType::Height => "height",
        TextureType::Normals => "normals",
        TextureType::Shininess => "shininess",
        TextureType::Opacity => "opacity",
        TextureType::Displacement => "displacement",
        TextureType::Lightmap => "lightmap",
        TextureType::Reflection => "reflection",
        TextureType::Unknown => "unknown",
        _ => "none",
    }
}

fn binding(ty: TextureType, slot: u32, binding: &TextureBinding) -> Value {
    let mut object = Map::new();
    object.insert("type".into(), texture_type_keyword(ty).into());
    object.insert("slot".into(), slot.into());
    object.insert("path".into(), primitives::label(&binding.path));
    if let Some(uv_index) = binding.uv_index {
        object.insert("uvindex".into(), uv_index.into());
    }
    if let Some(mapping) = binding.mapping {
        object.insert("mapping".into(), (mapping as u32).into());
    }
    if let Some(blend) = binding.blend {
        object.insert("blend".into(), blend.into());
    }
    if let Some(op) = binding.op {
        object.insert("op".into(), (op as u32).into());
    }
    let modes: Vec<u32> = binding.map_modes.iter().flatten().map(|m| *m as u32).collect();
    if !modes.is_empty() {
        object.insert("mapmode".into(), modes.into());
    }
    Value::Object(object)
}

/// Every binding that can be read back, by type then slot.
fn textures(material: &Material) -> Vec<Value> {
    TextureType::KNOWN
        .iter()
        .flat_map(|&ty| {
            (0..material.texture_count(ty))
                .filter_map(move |slot| Some(binding(ty, slot, &material.get_texture(ty, slot)?)))
        })
        .collect()
}

/// Encode a material. Each property is queried on its own; a failed query
/// leaves its key out rather than substituting a default.
pub fn encode(material: &Material) -> Value {
    let mut object = Map::new();

    if let Some(name) = material.get_string(matkey::NAME) {
        object.insert("name".into(), primitives::label(name));
    }

    let colors = [
        ("diffuse", matkey::COLOR_DIFFUSE),
        ("specular", matkey::COLOR_SPECULAR),
        ("ambient", matkey::COLOR_AMBIENT),
        ("emissive", matkey::COLOR_EMISSIVE),
        ("transparent", matkey::COLOR_TRANSPARENT),
    ];
    for (name, key) in colors {
        if let Some(color) = material.get_color(key) {
            object.insert(name.into(), primitives::color4(color));
        }
    }

    for (name, key) in [("wireframe", matkey::ENABLE_WIREFRAME), ("twosided", matkey::TWOSIDED)] {
        if let Some(flag) = material.get_integer(key) {
            object.insert(name.into(), json!(flag != 0));
        }
    }

    for (name, key) in [("shading_model", matkey::SHADING_MODEL), ("blend_func", matkey::BLEND_FUNC)] {
        if let Some(value) = material.get_integer(key) {
            object.insert(name.into(), value.into());
        }
    }

    let floats = [
        ("opacity", matkey::OPACITY),
        ("shininess", matkey::SHININESS),
        ("shininess_strength", matkey::SHININESS_STRENGTH),
        ("refracti", matkey::REFRACTI),
    ];
    for (name, key) in floats {
        if let Some(value) = material.get_float(key) {
            object.insert(name.into(), value.into());
        }
    }

    let textures = textures(material);
    if !textures.is_empty() {
        object.insert("textures".into(), Value::Array(textures));
    }

    Value::Object(object)
}
