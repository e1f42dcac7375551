use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use scenejson_core::{Face, Material, Mesh, Node, Scene, UvChannel, Vec3};
use scenejson_export::{export_scene, to_string_pretty, ExportOptions};

/// A grid mesh with `n * n` vertices, normals, one UV set and triangle faces.
fn grid_scene(n: u32) -> Scene {
    let mut positions = Vec::new();
    let mut uvs = Vec::new();
    for y in 0..n {
        for x in 0..n {
            positions.push(Vec3::new(x as f32, y as f32, 0.0));
            uvs.push(Vec3::new(x as f32 / n as f32, y as f32 / n as f32, 0.0));
        }
    }

    let mut faces = Vec::new();
    for y in 0..n - 1 {
        for x in 0..n - 1 {
            let i = y * n + x;
            faces.push(Face::triangle(i, i + 1, i + n));
            faces.push(Face::triangle(i + 1, i + n + 1, i + n));
        }
    }

    let mut mesh = Mesh::new("grid");
    mesh.normals = Some(vec![Vec3::Z; positions.len()]);
    mesh.texture_coords[0] = Some(UvChannel::new(2, uvs));
    mesh.positions = Some(positions);
    mesh.faces = faces;
    mesh.update_primitive_types();

    let mut scene = Scene::new(Node::new("root").with_meshes([0]));
    scene.add_mesh(mesh);
    scene.add_material(Material::named("default"));
    scene
}

fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");

    for n in [16u32, 64, 256] {
        let scene = grid_scene(n);
        group.bench_with_input(BenchmarkId::new("value", n), &scene, |b, scene| {
            b.iter(|| export_scene(black_box(scene)))
        });
        group.bench_with_input(BenchmarkId::new("pretty", n), &scene, |b, scene| {
            b.iter(|| to_string_pretty(black_box(scene), &ExportOptions::default()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_export);
criterion_main!(benches);
