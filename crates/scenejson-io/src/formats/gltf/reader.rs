//! glTF reader implementation: container parsing and buffer loading.

use std::path::Path;

use crate::error::{ImportError, Result};
use crate::registry::{FormatReader, ReadOptions};
use base64::Engine;
use scenejson_core::Scene;

use super::convert::Converter;
use super::schema::Gltf;

/// GLB magic number.
const GLB_MAGIC: u32 = 0x46546C67; // "glTF" in little-endian
/// GLB version 2.
const GLB_VERSION: u32 = 2;
/// JSON chunk type.
const GLB_CHUNK_JSON: u32 = 0x4E4F534A; // "JSON" in little-endian
/// Binary chunk type.
const GLB_CHUNK_BIN: u32 = 0x004E4942; // "BIN\0" in little-endian

/// Extensions whose absence would change the meaning of the file.
const SUPPORTED_REQUIRED_EXTENSIONS: &[&str] = &["KHR_lights_punctual"];

/// Reader for glTF 2.0 files.
pub struct GltfReader;

impl GltfReader {
    /// Create a new glTF reader.
    pub fn new() -> Self {
        Self
    }
}

impl Default for GltfReader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn is_glb(data: &[u8]) -> bool {
    data.len() >= 4 && read_u32(data, 0) == GLB_MAGIC
}

impl FormatReader for GltfReader {
    fn name(&self) -> &'static str {
        "gltf"
    }

    fn extensions(&self) -> &[&'static str] {
        &["gltf", "glb"]
    }

    fn can_read(&self, data: &[u8]) -> bool {
        if is_glb(data) {
            return true;
        }

        if let Ok(text) = std::str::from_utf8(data) {
            let trimmed = text.trim_start();
            if trimmed.starts_with('{') && trimmed.contains("\"asset\"") {
                return true;
            }
        }

        false
    }

    fn read(&self, data: &[u8], options: &ReadOptions) -> Result<Scene> {
        if is_glb(data) {
            self.read_glb(data, options)
        } else {
            self.read_json(data, options)
        }
    }
}

impl GltfReader {
    /// Read a GLB file.
    fn read_glb(&self, data: &[u8], options: &ReadOptions) -> Result<Scene> {
        if data.len() < 12 {
            return Err(ImportError::InvalidData("GLB file too short".into()));
        }

        let version = read_u32(data, 4);
        let length = read_u32(data, 8) as usize;

        if version != GLB_VERSION {
            return Err(ImportError::Unsupported(format!(
                "GLB version {} not supported",
                version
            )));
        }
        if length > data.len() {
            return Err(ImportError::InvalidData(format!(
                "GLB header declares {} bytes but file has {}",
                length,
                data.len()
            )));
        }

        let mut offset = 12;
        let mut json_data: Option<&[u8]> = None;
        let mut bin_data: Option<&[u8]> = None;

        while offset + 8 <= length {
            let chunk_length = read_u32(data, offset) as usize;
            let chunk_type = read_u32(data, offset + 4);

            offset += 8;

            let chunk_end = match offset.checked_add(chunk_length) {
                Some(end) if end <= length => end,
                _ => {
                    return Err(ImportError::parse_at(
                        "GLB chunk extends past end of file",
                        offset,
                    ))
                }
            };

            match chunk_type {
                GLB_CHUNK_JSON if json_data.is_none() => {
                    json_data = Some(&data[offset..chunk_end]);
                }
                GLB_CHUNK_BIN if bin_data.is_none() => {
                    bin_data = Some(&data[offset..chunk_end]);
                }
                other => {
                    log::debug!("skipping GLB chunk 0x{:08X}", other);
                }
            }

            // Chunks are 4-byte aligned
            offset = chunk_end.saturating_add(3) & !3;
        }

        let json_data =
            json_data.ok_or_else(|| ImportError::MissingRequired("GLB JSON chunk".into()))?;

        let gltf: Gltf = serde_json::from_slice(json_data)?;
        let buffers = self.load_buffers(&gltf, bin_data, options)?;
        self.convert(&gltf, &buffers)
    }

    /// Read a JSON glTF file.
    fn read_json(&self, data: &[u8], options: &ReadOptions) -> Result<Scene> {
        let gltf: Gltf = serde_json::from_slice(data)?;
        let buffers = self.load_buffers(&gltf, None, options)?;
        self.convert(&gltf, &buffers)
    }

    fn convert(&self, gltf: &Gltf, buffers: &[Vec<u8>]) -> Result<Scene> {
        check_version(gltf)?;
        for ext in &gltf.extensions_required {
            if !SUPPORTED_REQUIRED_EXTENSIONS.contains(&ext.as_str()) {
                return Err(ImportError::Unsupported(format!(
                    "required extension {}",
                    ext
                )));
            }
        }

        let scene = Converter::new(gltf, buffers).convert()?;
        log::debug!(
            "glTF converted: {} meshes, {} materials, {} textures, {} lights, {} cameras, {} animations",
            scene.meshes.len(),
            scene.materials.len(),
            scene.textures.len(),
            scene.lights.len(),
            scene.cameras.len(),
            scene.animations.len()
        );
        Ok(scene)
    }

    /// Load every buffer. The first buffer of a GLB without a URI is the
    /// binary chunk.
    fn load_buffers(
        &self,
        gltf: &Gltf,
        bin_data: Option<&[u8]>,
        options: &ReadOptions,
    ) -> Result<Vec<Vec<u8>>> {
        let mut buffers = Vec::with_capacity(gltf.buffers.len());

        for (i, buffer) in gltf.buffers.iter().enumerate() {
            let data = match (&buffer.uri, bin_data) {
                (Some(uri), _) => load_uri(uri, options.base_dir.as_deref())?,
                (None, Some(bin)) if i == 0 => bin.to_vec(),
                (None, _) => {
                    return Err(ImportError::InvalidData(format!("buffer {} has no data", i)))
                }
            };

            if data.len() < buffer.byte_length {
                return Err(ImportError::InvalidData(format!(
                    "buffer {} holds {} bytes, expected {}",
                    i,
                    data.len(),
                    buffer.byte_length
                )));
            }
            buffers.push(data);
        }

        Ok(buffers)
    }
}

fn check_version(gltf: &Gltf) -> Result<()> {
    let version = gltf
        .asset
        .min_version
        .as_deref()
        .unwrap_or(&gltf.asset.version);
    if version.starts_with("2.") {
        Ok(())
    } else {
        Err(ImportError::Unsupported(format!("glTF version {}", version)))
    }
}

/// Load the bytes behind a URI: either a data URI or a file relative to
/// `base_dir`.
pub(super) fn load_uri(uri: &str, base_dir: Option<&Path>) -> Result<Vec<u8>> {
    if uri.starts_with("data:") {
        return decode_data_uri(uri);
    }

    let base_dir = base_dir.ok_or_else(|| {
        ImportError::Unsupported(format!(
            "external URI {} without a base directory",
            uri
        ))
    })?;
    let path = base_dir.join(percent_decode(uri));
    log::debug!("loading sidecar {}", path.display());
    Ok(std::fs::read(path)?)
}

/// Decode a data URI.
pub(super) fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    // Format: data:[<mediatype>][;base64],<data>
    let (header, data) = uri
        .split_once(',')
        .ok_or_else(|| ImportError::InvalidData("invalid data URI".into()))?;

    if header.ends_with(";base64") {
        Ok(base64::engine::general_purpose::STANDARD.decode(data)?)
    } else {
        Ok(percent_decode(data).into_bytes())
    }
}

/// Media type of a data URI, if it names one.
pub(super) fn data_uri_mime(uri: &str) -> Option<&str> {
    let header = uri.strip_prefix("data:")?.split(',').next()?;
    let mime = header.split(';').next()?;
    (!mime.is_empty()).then_some(mime)
}

/// Undo `%XX` escapes. Malformed escapes are kept verbatim.
fn percent_decode(s: &str) -> String {
    fn hex(b: u8) -> Option<u8> {
        (b as char).to_digit(16).map(|d| d as u8)
    }

    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(high), Some(low)) = (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                out.push(high << 4 | low);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_read() {
        let reader = GltfReader::new();

        assert!(reader.can_read(b"glTF\x02\x00\x00\x00"));
        assert!(reader.can_read(br#"{"asset": {"version": "2.0"}}"#));
        assert!(!reader.can_read(b"random"));
    }

    #[test]
    fn test_decode_data_uri() {
        let uri = "data:application/octet-stream;base64,SGVsbG8=";
        assert_eq!(decode_data_uri(uri).unwrap(), b"Hello");
        assert_eq!(data_uri_mime(uri), Some("application/octet-stream"));
        assert_eq!(decode_data_uri("data:,a%20b").unwrap(), b"a b");
        assert!(decode_data_uri("data:nocomma").is_err());
        assert!(matches!(
            decode_data_uri("data:;base64,!!!"),
            Err(ImportError::Base64(_))
        ));
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("my%20file.bin"), "my file.bin");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
    }

    #[test]
    fn test_external_uri_needs_base_dir() {
        assert!(matches!(
            load_uri("mesh.bin", None),
            Err(ImportError::Unsupported(_))
        ));
    }

    #[test]
    fn test_rejects_gltf_1() {
        let json = br#"{"asset": {"version": "1.0"}}"#;
        let result = GltfReader::new().read(json, &ReadOptions::default());
        assert!(matches!(result, Err(ImportError::Unsupported(_))));
    }

    #[test]
    fn test_rejects_unknown_required_extension() {
        let json = br#"{"asset": {"version": "2.0"}, "extensionsRequired": ["KHR_draco_mesh_compression"]}"#;
        let result = GltfReader::new().read(json, &ReadOptions::default());
        assert!(matches!(result, Err(ImportError::Unsupported(_))));
    }

    fn glb(json: &str, bin: &[u8]) -> Vec<u8> {
        let mut json = json.as_bytes().to_vec();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }
        let mut bin = bin.to_vec();
        while bin.len() % 4 != 0 {
            bin.push(0);
        }

        let total = 12 + 8 + json.len() + 8 + bin.len();
        let mut out = Vec::with_capacity(total);
        out.extend(GLB_MAGIC.to_le_bytes());
        out.extend(GLB_VERSION.to_le_bytes());
        out.extend((total as u32).to_le_bytes());
        out.extend((json.len() as u32).to_le_bytes());
        out.extend(GLB_CHUNK_JSON.to_le_bytes());
        out.extend(json);
        out.extend((bin.len() as u32).to_le_bytes());
        out.extend(GLB_CHUNK_BIN.to_le_bytes());
        out.extend(bin);
        out
    }

    #[test]
    fn test_glb_triangle() {
        let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let bin: Vec<u8> = positions.iter().flat_map(|f| f.to_le_bytes()).collect();
        let json = r#"{
            "asset": {"version": "2.0"},
            "scenes": [{"nodes": [0]}],
            "nodes": [{"mesh": 0, "name": "Tri"}],
            "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
            "accessors": [{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"}],
            "bufferViews": [{"buffer": 0, "byteLength": 36}],
            "buffers": [{"byteLength": 36}]
        }"#;

        let data = glb(json, &bin);
        let reader = GltfReader::new();
        assert!(reader.can_read(&data));

        let scene = reader.read(&data, &ReadOptions::default()).unwrap();
        assert_eq!(scene.meshes.len(), 1);
        assert_eq!(scene.meshes[0].vertex_count(), 3);
        assert_eq!(scene.meshes[0].faces.len(), 1);
        assert_eq!(scene.root.name.to_string_lossy(), "Tri");
    }

    #[test]
    fn test_glb_truncated() {
        let mut data = glb(r#"{"asset": {"version": "2.0"}}"#, &[]);
        data.truncate(10);
        assert!(GltfReader::new().read(&data, &ReadOptions::default()).is_err());
    }
}
