//! scenejson-export: serializes a scene graph into a single JSON document.
//!
//! The encoders are layered:
//!
//! - [`primitives`]: vectors, colors, quaternions, matrices, labels, keys
//! - [`collections`]: per-vertex channels, faces, bone weights, color and
//!   UV sets
//! - [`entities`]: one encoder per entity kind, plus the node tree
//! - [`assembler`]: the top-level document
//!
//! # Example
//!
//! ```
//! use scenejson_core::{Node, Scene};
//! use scenejson_export::{export_scene, to_string_pretty, ExportOptions};
//!
//! let scene = Scene::new(Node::new("root"));
//! let document = export_scene(&scene);
//! assert_eq!(document["num_meshes"], 0);
//!
//! let text = to_string_pretty(&scene, &ExportOptions::default()).unwrap();
//! assert!(text.starts_with("{\n    \"flags\": 0,"));
//! ```

pub mod assembler;
pub mod collections;
pub mod entities;
pub mod error;
pub mod primitives;

pub use error::{ExportError, Result};

use std::io::Write;

use scenejson_core::Scene;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

/// Options for writing a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Spaces per indentation level.
    pub indent: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { indent: 4 }
    }
}

/// Encode a scene into a JSON value.
pub fn export_scene(scene: &Scene) -> Value {
    assembler::assemble(scene)
}

/// Pretty-print an encoded document to a writer.
pub fn write_value<W: Write>(value: &Value, writer: W, options: &ExportOptions) -> Result<()> {
    let indent = vec![b' '; options.indent];
    let formatter = PrettyFormatter::with_indent(&indent);
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    value.serialize(&mut serializer)?;
    Ok(())
}

/// Encode a scene and pretty-print it to a writer.
pub fn write_pretty<W: Write>(scene: &Scene, writer: W, options: &ExportOptions) -> Result<()> {
    write_value(&export_scene(scene), writer, options)
}

/// Encode a scene and pretty-print it to a string.
pub fn to_string_pretty(scene: &Scene, options: &ExportOptions) -> Result<String> {
    let mut buffer = Vec::new();
    write_pretty(scene, &mut buffer, options)?;
    Ok(String::from_utf8(buffer)?)
}
