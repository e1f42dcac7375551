//! Materials as a queryable property store.
//!
//! A material is a flat list of keyed properties. Readers ask for a property
//! by key and get `None` back when it is missing or has an incompatible
//! type. Texture bindings are properties too, keyed by texture type and slot.

use crate::color::Color4;
use crate::label::Label;

/// Well-known property keys.
pub mod matkey {
    pub const NAME: &str = "?mat.name";
    pub const COLOR_DIFFUSE: &str = "$clr.diffuse";
    pub const COLOR_SPECULAR: &str = "$clr.specular";
    pub const COLOR_AMBIENT: &str = "$clr.ambient";
    pub const COLOR_EMISSIVE: &str = "$clr.emissive";
    pub const COLOR_TRANSPARENT: &str = "$clr.transparent";
    pub const ENABLE_WIREFRAME: &str = "$mat.wireframe";
    pub const TWOSIDED: &str = "$mat.twosided";
    pub const SHADING_MODEL: &str = "$mat.shadingm";
    pub const BLEND_FUNC: &str = "$mat.blend";
    pub const OPACITY: &str = "$mat.opacity";
    pub const SHININESS: &str = "$mat.shininess";
    pub const SHININESS_STRENGTH: &str = "$mat.shinpercent";
    pub const REFRACTI: &str = "$mat.refracti";

    pub const TEXTURE_FILE: &str = "$tex.file";
    pub const TEXTURE_UVWSRC: &str = "$tex.uvwsrc";
    pub const TEXTURE_MAPPING: &str = "$tex.mapping";
    pub const TEXTURE_BLEND: &str = "$tex.blend";
    pub const TEXTURE_OP: &str = "$tex.op";
    pub const TEXTURE_MAPMODE_U: &str = "$tex.mapmodeu";
    pub const TEXTURE_MAPMODE_V: &str = "$tex.mapmodev";
    pub const TEXTURE_MAPMODE_W: &str = "$tex.mapmodew";

    /// Map mode keys in u, v, w order.
    pub const TEXTURE_MAPMODES: [&str; 3] = [TEXTURE_MAPMODE_U, TEXTURE_MAPMODE_V, TEXTURE_MAPMODE_W];
}

/// Shading models stored under [`matkey::SHADING_MODEL`].
pub mod shading_model {
    pub const FLAT: i32 = 0x1;
    pub const GOURAUD: i32 = 0x2;
    pub const PHONG: i32 = 0x3;
    pub const BLINN: i32 = 0x4;
    pub const TOON: i32 = 0x5;
    pub const OREN_NAYAR: i32 = 0x6;
    pub const MINNAERT: i32 = 0x7;
    pub const COOK_TORRANCE: i32 = 0x8;
    pub const NO_SHADING: i32 = 0x9;
    pub const FRESNEL: i32 = 0xa;
    pub const PBR_BRDF: i32 = 0xb;
}

/// Blend functions stored under [`matkey::BLEND_FUNC`].
pub mod blend_mode {
    pub const DEFAULT: i32 = 0x0;
    pub const ADDITIVE: i32 = 0x1;
}

/// Semantic texture types. `None` is a sentinel and never holds bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TextureType {
    None = 0,
    Diffuse = 1,
    Specular = 2,
    Ambient = 3,
    Emissive = 4,
    Height = 5,
    Normals = 6,
    Shininess = 7,
    Opacity = 8,
    Displacement = 9,
    Lightmap = 10,
    Reflection = 11,
    BaseColor = 12,
    NormalCamera = 13,
    EmissionColor = 14,
    Metalness = 15,
    DiffuseRoughness = 16,
    AmbientOcclusion = 17,
    Unknown = 18,
}

impl TextureType {
    /// Every type that can carry bindings, in enumerator order.
    pub const KNOWN: [TextureType; 18] = [
        Self::Diffuse,
        Self::Specular,
        Self::Ambient,
        Self::Emissive,
        Self::Height,
        Self::Normals,
        Self::Shininess,
        Self::Opacity,
        Self::Displacement,
        Self::Lightmap,
        Self::Reflection,
        Self::BaseColor,
        Self::NormalCamera,
        Self::EmissionColor,
        Self::Metalness,
        Self::DiffuseRoughness,
        Self::AmbientOcclusion,
        Self::Unknown,
    ];
}

/// How texture coordinates are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum TextureMapping {
    #[default]
    Uv = 0,
    Sphere = 1,
    Cylinder = 2,
    Box = 3,
    Plane = 4,
    Other = 5,
}

impl TextureMapping {
    pub fn from_raw(value: i32) -> Self {
        match value {
            0 => Self::Uv,
            1 => Self::Sphere,
            2 => Self::Cylinder,
            3 => Self::Box,
            4 => Self::Plane,
            _ => Self::Other,
        }
    }
}

/// How a texture is combined with the layer below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TextureOp {
    Multiply = 0,
    Add = 1,
    Subtract = 2,
    Divide = 3,
    SmoothAdd = 4,
    SignedAdd = 5,
}

impl TextureOp {
    pub fn from_raw(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Multiply),
            1 => Some(Self::Add),
            2 => Some(Self::Subtract),
            3 => Some(Self::Divide),
            4 => Some(Self::SmoothAdd),
            5 => Some(Self::SignedAdd),
            _ => None,
        }
    }
}

/// Out-of-range coordinate handling along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TextureMapMode {
    Wrap = 0,
    Clamp = 1,
    Mirror = 2,
    Decal = 3,
}

impl TextureMapMode {
    pub fn from_raw(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Wrap),
            1 => Some(Self::Clamp),
            2 => Some(Self::Mirror),
            3 => Some(Self::Decal),
            _ => None,
        }
    }
}

/// Stored value of a material property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Float(f32),
    Floats(Vec<f32>),
    Integer(i32),
    String(Label),
    Color(Color4),
}

/// One keyed entry of a material.
///
/// Non-texture properties use `TextureType::None` and index 0.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialProperty {
    pub key: String,
    pub semantic: TextureType,
    pub index: u32,
    pub value: PropertyValue,
}

/// Result of a texture query for one (type, slot) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureBinding {
    /// Unresolved file path. `*N` refers to the Nth embedded texture.
    pub path: Label,
    pub mapping: Option<TextureMapping>,
    pub uv_index: Option<u32>,
    pub blend: Option<f32>,
    pub op: Option<TextureOp>,
    /// Map modes for the u, v and w axes; any axis may be missing.
    pub map_modes: [Option<TextureMapMode>; 3],
}

impl TextureBinding {
    pub fn new(path: impl Into<Label>) -> Self {
        Self {
            path: path.into(),
            mapping: None,
            uv_index: None,
            blend: None,
            op: None,
            map_modes: [None; 3],
        }
    }
}

/// A material: an ordered property list with typed queries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Material {
    properties: Vec<MaterialProperty>,
}

impl Material {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a material that only carries a name.
    pub fn named(name: &str) -> Self {
        let mut material = Self::new();
        material.set_string(matkey::NAME, name);
        material
    }

    /// Insert or replace a property.
    pub fn add_property(
        &mut self,
        key: &str,
        semantic: TextureType,
        index: u32,
        value: PropertyValue,
    ) {
        if let Some(existing) = self
            .properties
            .iter_mut()
            .find(|p| p.key == key && p.semantic == semantic && p.index == index)
        {
            existing.value = value;
            return;
        }
        self.properties.push(MaterialProperty {
            key: key.to_string(),
            semantic,
            index,
            value,
        });
    }

    pub fn set_string(&mut self, key: &str, value: &str) {
        self.add_property(key, TextureType::None, 0, PropertyValue::String(Label::new(value)));
    }

    pub fn set_float(&mut self, key: &str, value: f32) {
        self.add_property(key, TextureType::None, 0, PropertyValue::Float(value));
    }

    pub fn set_integer(&mut self, key: &str, value: i32) {
        self.add_property(key, TextureType::None, 0, PropertyValue::Integer(value));
    }

    pub fn set_color(&mut self, key: &str, value: Color4) {
        self.add_property(key, TextureType::None, 0, PropertyValue::Color(value));
    }

    /// Append a texture binding as the next slot of its type.
    pub fn add_texture(&mut self, ty: TextureType, binding: &TextureBinding) -> u32 {
        let slot = self.texture_count(ty);
        self.set_texture(ty, slot, binding);
        slot
    }

    /// Write a texture binding into an explicit slot.
    pub fn set_texture(&mut self, ty: TextureType, slot: u32, binding: &TextureBinding) {
        self.add_property(
            matkey::TEXTURE_FILE,
            ty,
            slot,
            PropertyValue::String(binding.path.clone()),
        );
        if let Some(mapping) = binding.mapping {
            self.add_property(
                matkey::TEXTURE_MAPPING,
                ty,
                slot,
                PropertyValue::Integer(mapping as i32),
            );
        }
        if let Some(uv_index) = binding.uv_index {
            self.add_property(
                matkey::TEXTURE_UVWSRC,
                ty,
                slot,
                PropertyValue::Integer(uv_index as i32),
            );
        }
        if let Some(blend) = binding.blend {
            self.add_property(matkey::TEXTURE_BLEND, ty, slot, PropertyValue::Float(blend));
        }
        if let Some(op) = binding.op {
            self.add_property(matkey::TEXTURE_OP, ty, slot, PropertyValue::Integer(op as i32));
        }
        for (key, mode) in matkey::TEXTURE_MAPMODES.iter().zip(binding.map_modes) {
            if let Some(mode) = mode {
                self.add_property(key, ty, slot, PropertyValue::Integer(mode as i32));
            }
        }
    }

    fn find(&self, key: &str, semantic: TextureType, index: u32) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|p| p.key == key && p.semantic == semantic && p.index == index)
            .map(|p| &p.value)
    }

    pub fn get_string(&self, key: &str) -> Option<&Label> {
        self.get_string_at(key, TextureType::None, 0)
    }

    pub fn get_float(&self, key: &str) -> Option<f32> {
        self.get_float_at(key, TextureType::None, 0)
    }

    pub fn get_integer(&self, key: &str) -> Option<i32> {
        self.get_integer_at(key, TextureType::None, 0)
    }

    /// Colors stored as three floats come back with alpha 1.
    pub fn get_color(&self, key: &str) -> Option<Color4> {
        match self.find(key, TextureType::None, 0)? {
            PropertyValue::Color(color) => Some(*color),
            PropertyValue::Floats(values) if values.len() == 4 => {
                Some(Color4::new(values[0], values[1], values[2], values[3]))
            }
            PropertyValue::Floats(values) if values.len() == 3 => {
                Some(Color4::new(values[0], values[1], values[2], 1.0))
            }
            _ => None,
        }
    }

    fn get_string_at(&self, key: &str, semantic: TextureType, index: u32) -> Option<&Label> {
        match self.find(key, semantic, index)? {
            PropertyValue::String(value) => Some(value),
            _ => None,
        }
    }

    fn get_float_at(&self, key: &str, semantic: TextureType, index: u32) -> Option<f32> {
        match self.find(key, semantic, index)? {
            PropertyValue::Float(value) => Some(*value),
            PropertyValue::Floats(values) => values.first().copied(),
            PropertyValue::Integer(value) => Some(*value as f32),
            _ => None,
        }
    }

    fn get_integer_at(&self, key: &str, semantic: TextureType, index: u32) -> Option<i32> {
        match self.find(key, semantic, index)? {
            PropertyValue::Integer(value) => Some(*value),
            PropertyValue::Float(value) => Some(*value as i32),
            _ => None,
        }
    }

    /// One past the highest slot that has a file bound for `ty`.
    pub fn texture_count(&self, ty: TextureType) -> u32 {
        self.properties
            .iter()
            .filter(|p| p.key == matkey::TEXTURE_FILE && p.semantic == ty)
            .map(|p| p.index + 1)
            .max()
            .unwrap_or(0)
    }

    /// Look up the binding in `slot` of `ty`. Fails when no file is bound there.
    pub fn get_texture(&self, ty: TextureType, slot: u32) -> Option<TextureBinding> {
        let path = self.get_string_at(matkey::TEXTURE_FILE, ty, slot)?.clone();
        let mut map_modes = [None; 3];
        for (mode, key) in map_modes.iter_mut().zip(matkey::TEXTURE_MAPMODES) {
            *mode = self
                .get_integer_at(key, ty, slot)
                .and_then(TextureMapMode::from_raw);
        }

        Some(TextureBinding {
            path,
            mapping: self
                .get_integer_at(matkey::TEXTURE_MAPPING, ty, slot)
                .map(TextureMapping::from_raw),
            uv_index: self
                .get_integer_at(matkey::TEXTURE_UVWSRC, ty, slot)
                .and_then(|v| u32::try_from(v).ok()),
            blend: self.get_float_at(matkey::TEXTURE_BLEND, ty, slot),
            op: self
                .get_integer_at(matkey::TEXTURE_OP, ty, slot)
                .and_then(TextureOp::from_raw),
            map_modes,
        })
    }
}
