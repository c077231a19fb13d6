use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use std::f32::consts::PI;

use prompt3d::viewer::camera::OrbitCamera;
use prompt3d::viewer::model::{Geometry, LoadedModel, Material, MeshNode, ResourceTracker};
use prompt3d::viewer::normalize::NormalizePolicy;
use prompt3d::viewer::raster::{render_scene, FrameBuffer};
use prompt3d::viewer::scene::Scene;

/// UV sphere with `rings * segments * 2` triangles
fn sphere_model(tracker: &ResourceTracker, rings: u32, segments: u32, radius: f32) -> LoadedModel {
    let mut positions = Vec::new();
    for ring in 0..=rings {
        let phi = PI * ring as f32 / rings as f32;
        for segment in 0..=segments {
            let theta = 2.0 * PI * segment as f32 / segments as f32;
            positions.push(Vec3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.cos(),
                radius * phi.sin() * theta.sin(),
            ));
        }
    }

    let stride = segments + 1;
    let mut indices = Vec::new();
    for ring in 0..rings {
        for segment in 0..segments {
            let a = ring * stride + segment;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    let mut material = Material::new(tracker, [0.3, 0.7, 1.0, 1.0]);
    material.double_sided = true;
    LoadedModel::new(vec![MeshNode {
        name: Some("sphere".to_string()),
        geometry: Geometry::new(tracker, positions, indices),
        material,
    }])
}

/// Benchmark: bounding box + transform for models of increasing size
fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    let tracker = ResourceTracker::new();
    let policy = NormalizePolicy::default();

    for rings in [16u32, 64, 256] {
        let mut model = sphere_model(&tracker, rings, rings * 2, 25.0);
        group.bench_with_input(
            BenchmarkId::from_parameter(model.triangle_count()),
            &rings,
            |b, _| b.iter(|| black_box(policy.apply(&mut model))),
        );
    }
    group.finish();
}

/// Benchmark: one full frame (grid + shaded model) at common window sizes
fn bench_render_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_frame");
    group.sample_size(20);

    let tracker = ResourceTracker::new();
    let mut scene = Scene::new();
    let mut model = sphere_model(&tracker, 48, 96, 1.0);
    NormalizePolicy::default().apply(&mut model);
    scene.attach(model);

    for (width, height) in [(640u32, 480u32), (1024, 768), (1920, 1080)] {
        let camera = OrbitCamera::new(width as f32 / height as f32);
        let mut frame = FrameBuffer::new(width, height);
        group.bench_with_input(
            BenchmarkId::new("sphere", format!("{}x{}", width, height)),
            &(width, height),
            |b, _| {
                b.iter(|| {
                    render_scene(&scene, &camera, &mut frame);
                    black_box(frame.pixel(width / 2, height / 2))
                })
            },
        );
    }
    group.finish();
}

/// Benchmark: wireframe vs solid for the same model
fn bench_wireframe(c: &mut Criterion) {
    let mut group = c.benchmark_group("wireframe");
    group.sample_size(20);

    for wireframe in [false, true] {
        let tracker = ResourceTracker::new();
        let mut scene = Scene::new();
        let mut model = sphere_model(&tracker, 48, 96, 1.0);
        model.set_wireframe(wireframe);
        scene.attach(model);

        let camera = OrbitCamera::new(4.0 / 3.0);
        let mut frame = FrameBuffer::new(1024, 768);
        let label = if wireframe { "wireframe" } else { "solid" };
        group.bench_function(label, |b| {
            b.iter(|| {
                render_scene(&scene, &camera, &mut frame);
                black_box(frame.pixels().len())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_normalize, bench_render_frame, bench_wireframe);
criterion_main!(benches);
