use criterion::{criterion_group, criterion_main, Criterion, black_box};

use snowprint::deform::{indent, BatchScheduler, IndentParams};
use snowprint::mesh::{compute_normals, GridMesh};

use glam::Vec3;

fn footprint(center: Vec3) -> Vec<Vec3> {
    [(-0.3, -0.5), (0.3, -0.5), (-0.3, 0.5), (0.3, 0.5)]
        .iter()
        .map(|&(dx, dz)| center + Vec3::new(dx, 0.0, dz))
        .collect()
}

fn bench_generate_grid_128(c: &mut Criterion) {
    c.bench_function("generate_grid_128", |b| {
        b.iter(|| GridMesh::generate(black_box(128), black_box(128)))
    });
}

fn bench_normals_128(c: &mut Criterion) {
    let grid = GridMesh::generate(128, 128).unwrap();

    c.bench_function("normals_128", |b| {
        b.iter(|| compute_normals(black_box(&grid.vertices), black_box(&grid.triangles)))
    });
}

fn bench_indent_256(c: &mut Criterion) {
    let grid = GridMesh::generate(256, 256).unwrap();
    let contacts = footprint(Vec3::new(128.0, 0.0, 128.0));
    let params = IndentParams { force: 0.5, radius: 1.0, ..Default::default() };

    c.bench_function("indent_256_footprint", |b| {
        b.iter(|| {
            indent(
                black_box(&grid.vertices),
                black_box(&grid.vertices),
                black_box(&contacts),
                &params,
            )
        })
    });
}

fn bench_issue_pump_64(c: &mut Criterion) {
    let grid = GridMesh::generate(64, 64).unwrap();
    let mut scheduler = BatchScheduler::new(grid.vertices, 0).unwrap();
    let params = IndentParams::default();

    c.bench_function("issue_pump_4_batches_64", |b| {
        let mut step = 0u32;
        b.iter(|| {
            for i in 0..4 {
                step = step.wrapping_add(1);
                let x = (step % 60) as f32 + 2.0;
                scheduler.issue(footprint(Vec3::new(x, 0.0, 10.0 + i as f32 * 10.0)), params);
            }
            black_box(scheduler.pump());
        });
    });
}

criterion_group!(
    benches,
    bench_generate_grid_128,
    bench_normals_128,
    bench_indent_256,
    bench_issue_pump_64,
);
criterion_main!(benches);
