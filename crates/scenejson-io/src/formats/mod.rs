//! Built-in format readers.

#[cfg(feature = "gltf")]
pub mod gltf;
