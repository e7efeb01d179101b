use karst_grid::{EMPTY, GridBuf};
use karst_merge::{FaceOptions, VolumeOptions, merge_faces, merge_volume};
use proptest::prelude::*;

fn arb_grid() -> impl Strategy<Value = GridBuf> {
    (1usize..6, 1usize..6, 1usize..6)
        .prop_flat_map(|(sx, sy, sz)| {
            let n = sx * sy * sz;
            (
                Just((sx, sy, sz)),
                proptest::collection::vec(0u8..4, n..=n),
            )
        })
        .prop_map(|((sx, sy, sz), cells)| GridBuf::from_cells(sx, sy, sz, cells).unwrap())
}

proptest! {
    // Emitted boxes exactly tile the occupied cells: re-rasterizing them
    // reproduces the grid with no overlaps, gaps, or omissions.
    #[test]
    fn volume_merge_exactly_tiles(g in arb_grid()) {
        let boxes = merge_volume(&g, None, &VolumeOptions::default());
        let mut raster = GridBuf::new(g.sx, g.sy, g.sz).unwrap();
        for b in &boxes {
            for y in b.min[1]..b.max[1] {
                for z in b.min[2]..b.max[2] {
                    for x in b.min[0]..b.max[0] {
                        let (x, y, z) = (x as usize, y as usize, z as usize);
                        prop_assert_eq!(raster.get(x, y, z), EMPTY, "cell covered twice");
                        raster.set(x, y, z, b.value);
                    }
                }
            }
        }
        prop_assert_eq!(&raster.cells, &g.cells);
    }

    // With single_value set, re-rasterized occupancy (not values) matches.
    #[test]
    fn single_value_merge_covers_occupancy(g in arb_grid()) {
        let opts = VolumeOptions { single_value: true, ..Default::default() };
        let boxes = merge_volume(&g, None, &opts);
        let mut covered = vec![false; g.cells.len()];
        for b in &boxes {
            for y in b.min[1]..b.max[1] {
                for z in b.min[2]..b.max[2] {
                    for x in b.min[0]..b.max[0] {
                        let i = g.idx(x as usize, y as usize, z as usize);
                        prop_assert!(!covered[i]);
                        covered[i] = true;
                    }
                }
            }
        }
        for (i, &c) in g.cells.iter().enumerate() {
            prop_assert_eq!(covered[i], c != EMPTY);
        }
    }

    // Face quads never overlap within one slice plane, and total face area
    // equals the number of boundary cells with an occupancy sign change.
    #[test]
    fn face_merge_area_matches_boundaries(g in arb_grid()) {
        let quads = merge_faces(&g, &FaceOptions::default());
        let merged_area: i64 = quads
            .iter()
            .map(|q| q.width() as i64 * q.height() as i64)
            .sum();
        let mut unit_area = 0i64;
        for z in 0..g.sz as i32 {
            for y in 0..g.sy as i32 {
                for x in 0..g.sx as i32 {
                    let here = g.get_clamped(x, y, z) != EMPTY;
                    for (dx, dy, dz) in [(1, 0, 0), (0, 1, 0), (0, 0, 1)] {
                        let there = g.get_clamped(x + dx, y + dy, z + dz) != EMPTY;
                        if here != there {
                            unit_area += 1;
                        }
                    }
                    // Low boundaries of the grid itself.
                    if here && x == 0 { unit_area += 1; }
                    if here && y == 0 { unit_area += 1; }
                    if here && z == 0 { unit_area += 1; }
                }
            }
        }
        prop_assert_eq!(merged_area, unit_area);
    }
}
