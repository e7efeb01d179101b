use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;

use karst_grid::{GridBuf, VisibilityMap};
use karst_merge::{FaceOptions, VolumeOptions, merge_faces, merge_volume};

/// Rolling heightfield with a few material bands; deterministic, no noise dep.
fn terrain_grid(sx: usize, sy: usize, sz: usize) -> GridBuf {
    let mut g = GridBuf::new(sx, sy, sz).unwrap();
    for z in 0..sz {
        for x in 0..sx {
            let fx = x as f32 * 0.19;
            let fz = z as f32 * 0.23;
            let h = ((fx.sin() + fz.cos()) * 0.25 + 0.5) * sy as f32;
            let h = (h as usize).clamp(1, sy);
            for y in 0..h {
                let v = if y + 2 >= h { 2 } else { 1 };
                g.set(x, y, z, v);
            }
        }
    }
    g
}

fn bench_volume_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("volume_merge");
    group.measurement_time(Duration::from_secs(8));
    let g = terrain_grid(64, 48, 64);
    group.bench_function("terrain_64x48x64", |b| {
        b.iter(|| black_box(merge_volume(&g, None, &VolumeOptions::default())))
    });
    let vis = VisibilityMap::compute(&g);
    let culled = vis.culled_cells(&g);
    let opts = VolumeOptions {
        merge_culled: true,
        single_value: true,
    };
    group.bench_function("terrain_64x48x64_wildcards", |b| {
        b.iter(|| black_box(merge_volume(&g, Some(&culled), &opts)))
    });
    group.finish();
}

fn bench_face_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("face_merge");
    group.measurement_time(Duration::from_secs(8));
    let g = terrain_grid(64, 48, 64);
    group.bench_function("terrain_64x48x64", |b| {
        b.iter(|| black_box(merge_faces(&g, &FaceOptions::default())))
    });
    let ao = FaceOptions {
        ambient_occlusion: true,
    };
    group.bench_function("terrain_64x48x64_ao", |b| {
        b.iter(|| black_box(merge_faces(&g, &ao)))
    });
    group.finish();
}

criterion_group!(benches, bench_volume_merge, bench_face_merge);
criterion_main!(benches);
