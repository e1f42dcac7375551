use scenejson_core::{Texel, Texture};
use serde_json::{json, Value};

use crate::collections::array;

/// Alpha first, red last. Consumers decode texels by field name.
fn texel(t: &Texel) -> Value {
    json!({
        "a": t.a,
        "b": t.b,
        "g": t.g,
        "r": t.r,
    })
}

pub fn encode(texture: &Texture) -> Value {
    json!({
        "format": texture.format_hint,
        "width": texture.width,
        "height": texture.height,
        "data": array(&texture.texels, texel),
    })
}
