//! Polygon triangulation.

use scenejson_core::{Face, Mesh, Scene};

/// Fan every face with more than three indices into triangles. Polygons are
/// assumed convex. Returns the number of polygons split.
pub fn triangulate(scene: &mut Scene) -> usize {
    scene.meshes.iter_mut().map(triangulate_mesh).sum()
}

fn triangulate_mesh(mesh: &mut Mesh) -> usize {
    if mesh.faces.iter().all(|face| face.indices.len() <= 3) {
        return 0;
    }

    let mut split = 0;
    let mut faces = Vec::with_capacity(mesh.faces.len() * 2);
    for face in mesh.faces.drain(..) {
        if face.indices.len() <= 3 {
            faces.push(face);
            continue;
        }

        split += 1;
        let first = face.indices[0];
        faces.extend(
            face.indices[1..]
                .windows(2)
                .map(|w| Face::triangle(first, w[0], w[1])),
        );
    }

    mesh.faces = faces;
    mesh.update_primitive_types();
    split
}
