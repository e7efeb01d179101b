//! Greedy volumetric box merging.
//!
//! Scans the grid in (z,y,x) order and grows each unvisited occupied cell
//! into a maximal box: first along x, then along z with the x-extent fixed,
//! then along y with the x- and z-extents fixed. Covered cells are reset to
//! empty in a scratch copy, so every occupied cell lands in exactly one box.

use karst_geom::{Face, VoxelBox};
use karst_grid::{EMPTY, GridBuf, VisibilityMap};

#[derive(Clone, Copy, Debug, Default)]
pub struct VolumeOptions {
    /// Treat culled (fully enclosed) cells as wildcards that match any run.
    pub merge_culled: bool,
    /// Treat any two occupied values as equal; boxes keep the seed's value.
    pub single_value: bool,
}

/// Merges the grid into maximal equal-valued boxes.
///
/// `culled` is the optional per-cell flag array from
/// [`VisibilityMap::culled_cells`]; it is only consulted when
/// `opts.merge_culled` is set. Emitted boxes carry a zero exposed-sides mask;
/// see [`apply_exposure`].
pub fn merge_volume(grid: &GridBuf, culled: Option<&[bool]>, opts: &VolumeOptions) -> Vec<VoxelBox> {
    if let Some(c) = culled {
        assert_eq!(c.len(), grid.cells.len(), "culled array length mismatch");
    }
    let t0 = std::time::Instant::now();
    let (sx, sy, sz) = (grid.sx, grid.sy, grid.sz);
    let mut cells = grid.cells.clone();
    let idx = |x: usize, y: usize, z: usize| x + sx * (y + sy * z);

    let mergeable = |cells: &[u8], seed: u8, i: usize| -> bool {
        let v = cells[i];
        if v == EMPTY {
            return false;
        }
        if v == seed || opts.single_value {
            return true;
        }
        opts.merge_culled && culled.is_some_and(|c| c[i])
    };

    let mut out = Vec::new();
    for z0 in 0..sz {
        for y0 in 0..sy {
            for x0 in 0..sx {
                let seed = cells[idx(x0, y0, z0)];
                if seed == EMPTY {
                    continue;
                }

                // Extend along x.
                let mut x1 = x0 + 1;
                while x1 < sx && mergeable(&cells, seed, idx(x1, y0, z0)) {
                    x1 += 1;
                }
                // Extend along z keeping the x-extent.
                let mut z1 = z0 + 1;
                'z: while z1 < sz {
                    for x in x0..x1 {
                        if !mergeable(&cells, seed, idx(x, y0, z1)) {
                            break 'z;
                        }
                    }
                    z1 += 1;
                }
                // Extend along y keeping the x- and z-extents.
                let mut y1 = y0 + 1;
                'y: while y1 < sy {
                    for z in z0..z1 {
                        for x in x0..x1 {
                            if !mergeable(&cells, seed, idx(x, y1, z)) {
                                break 'y;
                            }
                        }
                    }
                    y1 += 1;
                }

                for y in y0..y1 {
                    for z in z0..z1 {
                        for x in x0..x1 {
                            cells[idx(x, y, z)] = EMPTY;
                        }
                    }
                }
                out.push(VoxelBox::new(
                    [x0 as i32, y0 as i32, z0 as i32],
                    [x1 as i32, y1 as i32, z1 as i32],
                    seed,
                ));
            }
        }
    }
    let ms = t0.elapsed().as_millis();
    log::info!(
        target: "perf",
        "ms={} volume_merge boxes={} dims=({}, {}, {})",
        ms,
        out.len(),
        sx,
        sy,
        sz
    );
    out
}

/// Fills each box's exposed-sides mask from the flood-fill visibility pass:
/// a box face is exposed when any covered cell on that face layer has the
/// matching face exposed.
pub fn apply_exposure(boxes: &mut [VoxelBox], grid: &GridBuf, vis: &VisibilityMap) {
    for b in boxes.iter_mut() {
        debug_assert!(
            b.min.iter().all(|&m| m >= 0)
                && b.max[0] <= grid.sx as i32
                && b.max[1] <= grid.sy as i32
                && b.max[2] <= grid.sz as i32
        );
        let mut mask = 0u8;
        for face in Face::ALL {
            let a = face.axis().index();
            let layer = if face.is_positive() {
                b.max[a] - 1
            } else {
                b.min[a]
            };
            'cells: for u in b.min[(a + 1) % 3]..b.max[(a + 1) % 3] {
                for v in b.min[(a + 2) % 3]..b.max[(a + 2) % 3] {
                    let mut p = [0i32; 3];
                    p[a] = layer;
                    p[(a + 1) % 3] = u;
                    p[(a + 2) % 3] = v;
                    if vis.exposed_mask(p[0] as usize, p[1] as usize, p[2] as usize) & face.bit()
                        != 0
                    {
                        mask |= face.bit();
                        break 'cells;
                    }
                }
            }
        }
        b.exposed = mask;
    }
}
