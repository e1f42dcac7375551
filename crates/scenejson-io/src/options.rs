//! Import configuration.

/// Post-processing applied by [`import_file`](crate::import_file) after a
/// reader has built the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Fan polygons into triangles.
    pub triangulate: bool,
    /// Merge bit-identical vertices within each mesh.
    pub join_identical_vertices: bool,
    /// Split meshes so each holds a single primitive type.
    pub sort_by_primitive_type: bool,
}

impl ImportOptions {
    /// Options with every post-processing step disabled.
    pub fn raw() -> Self {
        Self {
            triangulate: false,
            join_identical_vertices: false,
            sort_by_primitive_type: false,
        }
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            triangulate: true,
            join_identical_vertices: true,
            sort_by_primitive_type: true,
        }
    }
}
