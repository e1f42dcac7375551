//! scenejson-io: model file import into the scenejson scene graph.
//!
//! Readers turn file bytes into a [`Scene`]; the post-processing steps then
//! bring it into the shape the serializer documents: triangulated, with
//! identical vertices joined and one primitive type per mesh.
//!
//! # Supported Formats
//!
//! | Format | Extensions | Feature |
//! |--------|------------|---------|
//! | glTF 2.0 | `.gltf`, `.glb` | `gltf` (default) |
//!
//! # Quick Start
//!
//! ```ignore
//! use scenejson_io::{import_file, ImportOptions};
//!
//! let scene = import_file("model.glb", &ImportOptions::default())?;
//! println!("{} meshes", scene.meshes.len());
//! ```
//!
//! # Plugin System
//!
//! Additional formats plug in through [`FormatReader`]:
//!
//! ```ignore
//! use scenejson_io::FormatRegistry;
//!
//! let mut registry = FormatRegistry::with_defaults();
//! registry.register_reader(MyReader::new());
//! ```

use std::path::Path;

use scenejson_core::Scene;

pub mod error;
pub mod formats;
pub mod options;
pub mod postprocess;
pub mod registry;

pub use error::{ImportError, Result};
pub use options::ImportOptions;
pub use registry::{FormatReader, FormatRegistry, ReadOptions};

/// Import a model file.
///
/// The reader is picked by extension, falling back to content sniffing.
/// External buffers resolve relative to the file's directory.
pub fn import_file(path: impl AsRef<Path>, options: &ImportOptions) -> Result<Scene> {
    let path = path.as_ref();
    log::debug!("importing {}", path.display());

    let data = std::fs::read(path)?;
    let mut read_options = ReadOptions::new();
    if let Some(dir) = path.parent() {
        read_options = read_options.with_base_dir(dir);
    }
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();

    import_with(&data, extension, &read_options, options)
}

/// Import a model held in memory. `extension` is a hint and may be empty.
pub fn import_bytes(data: &[u8], extension: &str, options: &ImportOptions) -> Result<Scene> {
    import_with(data, extension, &ReadOptions::default(), options)
}

fn import_with(
    data: &[u8],
    extension: &str,
    read_options: &ReadOptions,
    options: &ImportOptions,
) -> Result<Scene> {
    let mut scene = FormatRegistry::with_defaults().read_with_extension(data, extension, read_options)?;
    scene.validate()?;
    postprocess::apply(&mut scene, options);
    Ok(scene)
}
