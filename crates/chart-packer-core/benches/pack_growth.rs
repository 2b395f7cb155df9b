use chart_packer_core::prelude::*;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::DVec2;

fn add_quad(mesh: &mut Mesh, origin: DVec2, size: f64, region: RegionId) -> Vec<usize> {
    let p = [
        origin,
        origin + DVec2::new(size, 0.0),
        origin + DVec2::new(size, size),
        origin + DVec2::new(0.0, size),
    ];
    let v: Vec<usize> = p.iter().map(|&uv| mesh.add_vertex(uv)).collect();
    let f0 = mesh.add_face([v[0], v[1], v[2]], [p[0], p[1], p[2]], region);
    let f1 = mesh.add_face([v[0], v[2], v[3]], [p[0], p[2], p[3]], region);
    vec![f0, f1]
}

fn build_scene(count: usize) -> (Mesh, Vec<Chart>) {
    let mut mesh = Mesh::new();
    let mut groups = Vec::new();
    for i in 0..count {
        let origin = DVec2::new((i % 16) as f64 * 80.0, (i / 16) as f64 * 80.0);
        // Vary sizes so the skyline actually has decisions to make.
        let size = 16.0 + (i % 7) as f64 * 8.0;
        groups.push((i as RegionId, add_quad(&mut mesh, origin, size, i as RegionId)));
    }
    mesh.build_adjacency();
    let charts = build_charts(&mut mesh, groups);
    (mesh, charts)
}

fn bench_pack_charts(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack_charts");

    for count in [16usize, 64, 256] {
        let (mesh, charts) = build_scene(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(
            BenchmarkId::new("skyline_oracle", count),
            &(mesh, charts),
            |b, (mesh, charts)| {
                b.iter(|| {
                    let mut mesh = mesh.clone();
                    let mut charts = charts.clone();
                    let textures = SourceTextures::new(vec![TextureSize::new(1024, 1024)]);
                    let mut oracle = SkylineOracle::new();
                    let outcome = pack_charts(
                        &mut mesh,
                        &mut charts,
                        &textures,
                        &mut oracle,
                        &AlgoParameters::default(),
                    )
                    .unwrap();
                    black_box(outcome.total_packed)
                });
            },
        );
    }

    group.finish();
}

fn bench_outline_extraction(c: &mut Criterion) {
    let (mesh, charts) = build_scene(256);
    c.bench_function("extract_outline_256", |b| {
        b.iter(|| {
            for chart in &charts {
                black_box(extract_outline(&mesh, chart));
            }
        });
    });
}

criterion_group!(benches, bench_pack_charts, bench_outline_extraction);
criterion_main!(benches);
