//! The reader seam: one implementation per input format.

use std::path::{Path, PathBuf};

use crate::error::Result;
use scenejson_core::Scene;

/// Turns the bytes of one model format into a raw [`Scene`].
pub trait FormatReader: Send + Sync {
    /// Lowercase format name, used as the registry key.
    fn name(&self) -> &'static str;

    /// Extensions claimed by this reader, without the dot.
    fn extensions(&self) -> &[&'static str];

    /// Cheap content sniff: magic bytes or a leading token, never a full parse.
    fn can_read(&self, data: &[u8]) -> bool;

    /// Convert `data`. Post-processing is the caller's business.
    fn read(&self, data: &[u8], options: &ReadOptions) -> Result<Scene>;
}

/// Options handed to a reader.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Directory that relative URIs (sidecar buffers) resolve against.
    /// Without one, only embedded data can be loaded.
    pub base_dir: Option<PathBuf>,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative URIs against `dir`.
    pub fn with_base_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.base_dir = Some(dir.as_ref().to_path_buf());
        self
    }
}
