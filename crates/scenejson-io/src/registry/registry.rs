//! Reader lookup by extension and by content.

use crate::error::{ImportError, Result};
use indexmap::IndexMap;
use scenejson_core::Scene;

use super::traits::{FormatReader, ReadOptions};

/// Known readers, keyed by lowercase name. Sniffing tries them in
/// registration order.
pub struct FormatRegistry {
    readers: IndexMap<String, Box<dyn FormatReader>>,
    extension_to_reader: IndexMap<String, String>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self {
            readers: IndexMap::new(),
            extension_to_reader: IndexMap::new(),
        }
    }

    /// Every reader compiled in through cargo features.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        #[cfg(feature = "gltf")]
        registry.register_reader(crate::formats::gltf::GltfReader::new());

        registry
    }

    /// Add `reader`, replacing any earlier reader of the same name. Its
    /// extensions take over from whoever claimed them before.
    pub fn register_reader<R: FormatReader + 'static>(&mut self, reader: R) {
        let name = reader.name().to_lowercase();

        for ext in reader.extensions() {
            self.extension_to_reader
                .insert(ext.to_lowercase(), name.clone());
        }

        self.readers.insert(name, Box::new(reader));
    }

    pub fn get_reader(&self, format: &str) -> Option<&dyn FormatReader> {
        self.readers.get(&format.to_lowercase()).map(|r| r.as_ref())
    }

    /// Case-insensitive; a leading dot is ignored.
    pub fn reader_for_extension(&self, ext: &str) -> Option<&dyn FormatReader> {
        let ext_lower = ext.trim_start_matches('.').to_lowercase();
        let format = self.extension_to_reader.get(&ext_lower)?;
        self.get_reader(format)
    }

    pub fn reader_formats(&self) -> impl Iterator<Item = &str> {
        self.readers.keys().map(String::as_str)
    }

    /// Hand `data` to the first reader whose sniff accepts it.
    pub fn read(&self, data: &[u8], options: &ReadOptions) -> Result<Scene> {
        for reader in self.readers.values() {
            if reader.can_read(data) {
                log::debug!("content sniffing selected the {} reader", reader.name());
                return reader.read(data, options);
            }
        }

        Err(ImportError::UnknownFormat(
            "no reader recognized this format".into(),
        ))
    }

    /// Prefer the reader claiming `extension`; sniff when none does.
    pub fn read_with_extension(
        &self,
        data: &[u8],
        extension: &str,
        options: &ReadOptions,
    ) -> Result<Scene> {
        match self.reader_for_extension(extension) {
            Some(reader) => {
                log::debug!("extension '{}' selected the {} reader", extension, reader.name());
                reader.read(data, options)
            }
            None => self.read(data, options),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenejson_core::Node;

    struct MockReader;

    impl FormatReader for MockReader {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn extensions(&self) -> &[&'static str] {
            &["mock", "mck"]
        }

        fn can_read(&self, data: &[u8]) -> bool {
            data.starts_with(b"MOCK")
        }

        fn read(&self, _data: &[u8], _options: &ReadOptions) -> Result<Scene> {
            Ok(Scene::new(Node::new("mock")))
        }
    }

    #[test]
    fn test_register_reader() {
        let mut registry = FormatRegistry::new();
        registry.register_reader(MockReader);

        assert!(registry.get_reader("mock").is_some());
        assert!(registry.get_reader("Mock").is_some());
        assert!(registry.reader_for_extension("mock").is_some());
        assert!(registry.reader_for_extension(".MCK").is_some());
        assert_eq!(registry.reader_formats().collect::<Vec<_>>(), ["mock"]);
    }

    #[test]
    fn test_auto_detect() {
        let mut registry = FormatRegistry::new();
        registry.register_reader(MockReader);

        let result = registry.read(b"MOCK content", &ReadOptions::default());
        assert!(result.is_ok());

        let result = registry.read(b"UNKNOWN", &ReadOptions::default());
        assert!(matches!(result, Err(ImportError::UnknownFormat(_))));
    }

    #[test]
    fn test_unknown_extension_falls_back_to_sniffing() {
        let mut registry = FormatRegistry::new();
        registry.register_reader(MockReader);

        let scene = registry
            .read_with_extension(b"MOCK", "bin", &ReadOptions::default())
            .unwrap();
        assert_eq!(scene.root.name.to_string_lossy(), "mock");

        let result = registry.read_with_extension(b"????", "bin", &ReadOptions::default());
        assert!(matches!(result, Err(ImportError::UnknownFormat(_))));
    }

    #[cfg(feature = "gltf")]
    #[test]
    fn test_defaults_include_gltf() {
        let registry = FormatRegistry::with_defaults();
        assert!(registry.reader_for_extension("glb").is_some());
        assert!(registry.reader_for_extension("gltf").is_some());
    }
}
