//! Whole-pipeline checks over a synthetic terrain chunk.

use karst::{
    Aabb, Collider, EMPTY, FaceOptions, GridBuf, Vec3, VisibilityMap, VolumeOptions, index_grid,
    merge_faces, pack_atlas, triangulate,
};

/// Deterministic heightfield with two materials and a carved tunnel.
fn terrain() -> GridBuf {
    let _ = env_logger::builder().is_test(true).try_init();
    let (sx, sy, sz) = (24usize, 12usize, 24usize);
    let mut grid = GridBuf::new(sx, sy, sz).unwrap();
    for z in 0..sz {
        for x in 0..sx {
            let h = 3 + ((x * 7 + z * 11) % 5);
            for y in 0..h {
                let v = if y + 1 == h { 2 } else { 1 };
                grid.set(x, y, z, v);
            }
        }
    }
    // Tunnel along x at ground level.
    for x in 0..sx {
        grid.set(x, 1, 10, EMPTY);
        grid.set(x, 2, 10, EMPTY);
    }
    grid
}

#[test]
fn indexed_grid_answers_point_queries() {
    let grid = terrain();
    let tree = index_grid(&grid, &VolumeOptions::default());

    for (x, y, z) in [(0usize, 0usize, 0usize), (5, 2, 7), (23, 3, 23), (12, 1, 10)] {
        let p = [x as i32, y as i32, z as i32];
        let occupied = grid.get(x, y, z) != EMPTY;
        let hit = tree
            .find_leaf(p)
            .map(|leaf| {
                tree.items(leaf)
                    .iter()
                    .any(|b| b.bounds().contains_point(p))
            })
            .unwrap_or(false);
        assert_eq!(hit, occupied, "at {:?}", p);
    }
}

#[test]
fn wildcard_merge_keeps_volume_and_surface_values() {
    let grid = terrain();
    let occupied: i64 = grid.cells.iter().filter(|&&c| c != EMPTY).count() as i64;
    let tree = index_grid(
        &grid,
        &VolumeOptions {
            merge_culled: true,
            ..Default::default()
        },
    );

    // Every occupied cell lands in exactly one run, wildcards included.
    let all = tree.bounds(tree.root());
    let total: i64 = tree
        .intersecting(&all)
        .iter()
        .map(|b| b.bounds().volume())
        .sum();
    assert_eq!(total, occupied);

    // Buried cells may be absorbed into foreign runs; visible cells keep
    // their material.
    let vis = VisibilityMap::compute(&grid);
    for (x, y, z) in [(0usize, 2usize, 0usize), (8, 0, 10), (17, 4, 3)] {
        let v = grid.get(x, y, z);
        if v == EMPTY || vis.exposed_mask(x, y, z) == 0 {
            continue;
        }
        let p = [x as i32, y as i32, z as i32];
        let leaf = tree.find_leaf(p).unwrap();
        let b = tree
            .items(leaf)
            .iter()
            .find(|b| b.bounds().contains_point(p))
            .unwrap();
        assert_eq!(b.value, v, "at {:?}", p);
    }
}

#[test]
fn falling_body_lands_on_terrain_surface() {
    let grid = terrain();
    let tree = index_grid(&grid, &VolumeOptions::default());
    let mut collider = Collider::new();

    // The column under (12, 10) tops out at y = 7.
    let body = Aabb::new(Vec3::new(12.2, 9.0, 10.2), Vec3::new(12.8, 9.8, 10.8));
    let moved = collider.sweep_aabb(&tree, body, Vec3::new(0.0, -8.0, 0.0));
    assert!((body.min.y + moved.y - 7.0).abs() < 1e-5);
    assert!(!collider.contacts().is_empty());
    assert_eq!(collider.contacts()[0].normal, Vec3::new(0.0, 1.0, 0.0));
}

#[test]
fn face_mesh_covers_every_boundary_once() {
    let grid = terrain();
    let mut quads = merge_faces(&grid, &FaceOptions::default());

    // Quad area equals the number of occupancy sign changes across all
    // slice boundaries.
    let mut boundary_faces = 0i64;
    for z in 0..grid.sz {
        for y in 0..grid.sy {
            for x in 0..grid.sx {
                if grid.get(x, y, z) == EMPTY {
                    continue;
                }
                for face in karst::Face::ALL {
                    if grid.neighbor(x, y, z, face) == EMPTY {
                        boundary_faces += 1;
                    }
                }
            }
        }
    }
    let quad_area: i64 = quads
        .iter()
        .map(|q| (q.width() * q.height()) as i64)
        .sum();
    assert_eq!(quad_area, boundary_faces);

    let meshes = triangulate(&quads);
    let verts: usize = meshes.values().map(|m| m.pos.len() / 3).sum();
    let tris: usize = meshes.values().map(|m| m.idx.len() / 3).sum();
    assert_eq!(verts, quads.len() * 4);
    assert_eq!(tris, quads.len() * 2);

    let (aw, ah) = pack_atlas(&mut quads);
    assert!(aw > 0 && ah > 0);
    for q in &quads {
        assert!(q.atlas[0] >= 0 && q.atlas[0] + q.width() <= aw);
        assert!(q.atlas[1] >= 0 && q.atlas[1] + q.height() <= ah);
    }
}
