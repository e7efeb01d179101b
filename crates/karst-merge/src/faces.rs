//! Greedy per-face quad merging.
//!
//! Independent of the volume merger: for each axis and each slice boundary,
//! a 2D mask records where occupancy changes sign across the boundary (and
//! in which direction). The mask is then merged into maximal rectangles with
//! the same extend-u-then-extend-v scan the volume merger uses one dimension
//! higher. Merged cells are erased from the mask so nothing is covered twice.

use karst_geom::{Axis, Face};
use karst_grid::{EMPTY, GridBuf};

#[derive(Clone, Copy, Debug, Default)]
pub struct FaceOptions {
    /// Compute per-vertex ambient-occlusion weights (0 = darkest, 3 = open).
    ///
    /// Rectangles are merged on mask value alone and the four weights are
    /// sampled at the merged quad's corners afterward, so occlusion varying
    /// in the interior of a large quad is flattened by interpolation.
    /// Callers needing per-cell AO fidelity must mesh at cell granularity.
    pub ambient_occlusion: bool,
}

/// A merged rectangular face on a material boundary.
///
/// `u`/`v` are texture-space cell coordinates in the slice plane (`u1`/`v1`
/// exclusive), `d` is the slice boundary along the face's axis. `atlas` is
/// assigned later by the packer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceQuad {
    pub u0: i32,
    pub v0: i32,
    pub u1: i32,
    pub v1: i32,
    pub d: i32,
    pub face: Face,
    pub value: u8,
    /// Corner weights in (u0,v0), (u1,v0), (u1,v1), (u0,v1) order.
    pub ao: [u8; 4],
    pub atlas: [i32; 2],
}

impl FaceQuad {
    #[inline]
    pub fn width(&self) -> i32 {
        self.u1 - self.u0
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.v1 - self.v0
    }
}

/// Maps slice-plane coordinates `(u, v)` at axis coordinate `w` back to a
/// grid cell. The u/v assignment matches the per-face texture convention:
/// X faces use (z, y), Y faces (x, z), Z faces (x, y).
#[inline]
fn cell_at(axis: Axis, w: i32, u: i32, v: i32) -> (i32, i32, i32) {
    match axis {
        Axis::X => (w, v, u),
        Axis::Y => (u, w, v),
        Axis::Z => (u, v, w),
    }
}

#[inline]
fn plane_dims(axis: Axis, grid: &GridBuf) -> (usize, usize, usize) {
    match axis {
        Axis::X => (grid.sz, grid.sy, grid.sx),
        Axis::Y => (grid.sx, grid.sz, grid.sy),
        Axis::Z => (grid.sx, grid.sy, grid.sz),
    }
}

/// Merges boundary faces across the whole grid into maximal quads.
pub fn merge_faces(grid: &GridBuf, opts: &FaceOptions) -> Vec<FaceQuad> {
    let t0 = std::time::Instant::now();
    let mut out = Vec::new();
    let mut mask: Vec<i16> = Vec::new();
    for axis in Axis::ALL {
        let (w, h, depth) = plane_dims(axis, grid);
        mask.resize(w * h, 0);
        // One boundary per cell layer plus the far side.
        for d in 0..=depth as i32 {
            let mut any = false;
            for v in 0..h as i32 {
                for u in 0..w as i32 {
                    let (bx, by, bz) = cell_at(axis, d - 1, u, v);
                    let (ax, ay, az) = cell_at(axis, d, u, v);
                    let below = grid.get_clamped(bx, by, bz);
                    let above = grid.get_clamped(ax, ay, az);
                    let m = &mut mask[u as usize + w * v as usize];
                    *m = if below != EMPTY && above == EMPTY {
                        below as i16
                    } else if below == EMPTY && above != EMPTY {
                        -(above as i16)
                    } else {
                        0
                    };
                    any |= *m != 0;
                }
            }
            if !any {
                continue;
            }
            merge_slice(&mut mask, w, h, |u0, v0, u1, v1, m| {
                let positive = m > 0;
                let face = Face::from_axis(axis, positive);
                let mut quad = FaceQuad {
                    u0,
                    v0,
                    u1,
                    v1,
                    d,
                    face,
                    value: m.unsigned_abs() as u8,
                    ao: [3; 4],
                    atlas: [0, 0],
                };
                if opts.ambient_occlusion {
                    quad.ao = corner_ao(grid, axis, d, positive, u0, v0, u1, v1);
                }
                out.push(quad);
            });
        }
    }
    let ms = t0.elapsed().as_millis();
    log::info!(
        target: "perf",
        "ms={} face_merge quads={} dims=({}, {}, {})",
        ms,
        out.len(),
        grid.sx,
        grid.sy,
        grid.sz
    );
    out
}

/// 2D greedy rectangle merge over a value mask; emits and erases each run.
fn merge_slice(
    mask: &mut [i16],
    w: usize,
    h: usize,
    mut emit: impl FnMut(i32, i32, i32, i32, i16),
) {
    for v0 in 0..h {
        for u0 in 0..w {
            let m = mask[u0 + w * v0];
            if m == 0 {
                continue;
            }
            // Extend width while the mask value matches.
            let mut u1 = u0 + 1;
            while u1 < w && mask[u1 + w * v0] == m {
                u1 += 1;
            }
            // Extend height while every cell in the row matches.
            let mut v1 = v0 + 1;
            'v: while v1 < h {
                for u in u0..u1 {
                    if mask[u + w * v1] != m {
                        break 'v;
                    }
                }
                v1 += 1;
            }
            for v in v0..v1 {
                for u in u0..u1 {
                    mask[u + w * v] = 0;
                }
            }
            emit(u0 as i32, v0 as i32, u1 as i32, v1 as i32, m);
        }
    }
}

/// Classic three-neighbor ambient occlusion per quad corner, sampled in the
/// open layer the face looks into.
fn corner_ao(
    grid: &GridBuf,
    axis: Axis,
    d: i32,
    positive: bool,
    u0: i32,
    v0: i32,
    u1: i32,
    v1: i32,
) -> [u8; 4] {
    // For a positive face the open cells sit at axis coordinate d; for a
    // negative face at d-1.
    let open_w = if positive { d } else { d - 1 };
    let solid = |u: i32, v: i32| -> bool {
        let (x, y, z) = cell_at(axis, open_w, u, v);
        grid.get_clamped(x, y, z) != EMPTY
    };
    let weigh = |cu: i32, cv: i32, du: i32, dv: i32| -> u8 {
        let side1 = solid(cu + du, cv);
        let side2 = solid(cu, cv + dv);
        let corner = solid(cu + du, cv + dv);
        if side1 && side2 {
            0
        } else {
            3 - (side1 as u8 + side2 as u8 + corner as u8)
        }
    };
    [
        weigh(u0, v0, -1, -1),
        weigh(u1 - 1, v0, 1, -1),
        weigh(u1 - 1, v1 - 1, 1, 1),
        weigh(u0, v1 - 1, -1, 1),
    ]
}
