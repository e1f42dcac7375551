//! glTF 2.0 format reader.
//!
//! Supports both JSON (.gltf) and binary (.glb) variants. Buffers may be
//! data URIs, the GLB binary chunk, or sidecar files next to the model.

mod accessor;
mod convert;
mod reader;
mod schema;

pub use reader::GltfReader;
