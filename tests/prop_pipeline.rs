use std::collections::HashMap;

use karst::{EMPTY, GridBuf, VolumeOptions, index_grid};
use proptest::prelude::*;

fn arb_grid() -> impl Strategy<Value = GridBuf> {
    (2usize..8, 2usize..6, 2usize..8)
        .prop_flat_map(|(sx, sy, sz)| {
            let n = sx * sy * sz;
            (
                Just((sx, sy, sz)),
                proptest::collection::vec(0u8..4, n..=n),
            )
        })
        .prop_map(|((sx, sy, sz), cells)| GridBuf::from_cells(sx, sy, sz, cells).unwrap())
}

fn cell_volume_by_value(g: &GridBuf) -> HashMap<u8, i64> {
    let mut m = HashMap::new();
    for &c in &g.cells {
        if c != EMPTY {
            *m.entry(c).or_insert(0) += 1;
        }
    }
    m
}

proptest! {
    // Merging, exposure tagging, and tree construction conserve volume per
    // material: straddling runs are split across leaves, never duplicated
    // or dropped.
    #[test]
    fn index_grid_conserves_volume_per_value(g in arb_grid()) {
        let tree = index_grid(&g, &VolumeOptions::default());
        let all = tree.bounds(tree.root());
        let mut got: HashMap<u8, i64> = HashMap::new();
        for b in tree.intersecting(&all) {
            *got.entry(b.value).or_insert(0) += b.bounds().volume();
        }
        prop_assert_eq!(got, cell_volume_by_value(&g));
    }

    // The wildcard mode may relabel buried cells but still covers every
    // occupied cell exactly once.
    #[test]
    fn wildcard_index_covers_occupancy_exactly(g in arb_grid()) {
        let occupied = g.cells.iter().filter(|&&c| c != EMPTY).count() as i64;
        let tree = index_grid(
            &g,
            &VolumeOptions { merge_culled: true, ..Default::default() },
        );
        let all = tree.bounds(tree.root());
        let total: i64 = tree
            .intersecting(&all)
            .iter()
            .map(|b| b.bounds().volume())
            .sum();
        prop_assert_eq!(total, occupied);

        // Point queries agree with the raw grid on occupancy.
        for z in 0..g.sz {
            for y in 0..g.sy {
                for x in 0..g.sx {
                    let p = [x as i32, y as i32, z as i32];
                    let hit = tree
                        .find_leaf(p)
                        .map(|leaf| {
                            tree.items(leaf)
                                .iter()
                                .any(|b| b.bounds().contains_point(p))
                        })
                        .unwrap_or(false);
                    prop_assert_eq!(hit, g.get(x, y, z) != EMPTY, "at {:?}", p);
                }
            }
        }
    }
}
