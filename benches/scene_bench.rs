use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::{Mat4, Vec3};
use lumen::camera::{Camera, Projection};
use lumen::scene::{generate_spheres, SceneBuilder};
use lumen::{DirectionalLight, FrameDispatcher, Mesh, RayTracingObject, Scene};

fn sphere_generation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_spheres");
    for count in [100, 1_000, 10_000].iter() {
        group.bench_function(format!("{count}_attempts"), |b| {
            b.iter(|| {
                black_box(generate_spheres(
                    black_box(7),
                    *count,
                    [3.0, 8.0],
                    100.0,
                ))
            })
        });
    }
    group.finish();
}

fn scene_rebuild_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_rebuild");
    for count in [10, 100, 1_000].iter() {
        let mut scene = Scene::new();
        let ids: Vec<_> = (0..*count)
            .map(|i| {
                let offset = Vec3::new(i as f32 * 3.0, 1.0, 0.0);
                scene.add(
                    RayTracingObject::new(Mesh::cube(1.0))
                        .with_transform(Mat4::from_translation(offset)),
                )
            })
            .collect();
        let mut builder = SceneBuilder::new();

        group.bench_function(format!("{count}_cubes"), |b| {
            b.iter(|| {
                // Toggle one object so every iteration does a full rebuild.
                let _ = scene.unregister(ids[0]);
                let _ = scene.register(ids[0]);
                black_box(builder.rebuild(&mut scene))
            })
        });
    }
    group.finish();
}

fn frame_prepare_benchmark(c: &mut Criterion) {
    let camera = Camera::look_at(
        Vec3::new(0.0, 60.0, 160.0),
        Vec3::ZERO,
        Projection::Perspective {
            fovy: 60.0,
            aspect: 16.0 / 9.0,
            znear: 0.3,
            zfar: 1000.0,
        },
    );
    let light = DirectionalLight::default();
    let mut dispatcher =
        FrameDispatcher::new(generate_spheres(0, 100, [3.0, 8.0], 100.0), 0);

    c.bench_function("frame_prepare_static_view", |b| {
        b.iter(|| {
            let plan = dispatcher.prepare((1920, 1080), &camera, &light);
            dispatcher.frame_rendered();
            black_box(plan)
        })
    });
}

criterion_group!(
    benches,
    sphere_generation_benchmark,
    scene_rebuild_benchmark,
    frame_prepare_benchmark
);
criterion_main!(benches);
