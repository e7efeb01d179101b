//! Outside-reachability flood fill over a grid.
//!
//! A face of an occupied cell is "exposed" when the cell across it is either
//! outside the grid or an empty cell connected to the grid boundary through
//! other empty cells. Fully enclosed cells (no exposed face) are "culled":
//! the collider never needs them and the volume merger may treat them as
//! wildcards.

use std::collections::VecDeque;

use karst_geom::Face;

use crate::{EMPTY, GridBuf};

#[derive(Clone, Debug)]
pub struct VisibilityMap {
    sx: usize,
    sy: usize,
    sz: usize,
    /// Empty cells reachable from the grid boundary.
    outside: Vec<bool>,
    /// Per occupied cell, `Face::bit` mask of exposed faces; 0 for empty cells.
    exposed: Vec<u8>,
}

impl VisibilityMap {
    /// Runs the boundary flood fill and derives per-face exposure.
    pub fn compute(grid: &GridBuf) -> VisibilityMap {
        let (sx, sy, sz) = (grid.sx, grid.sy, grid.sz);
        let n = sx * sy * sz;
        let mut outside = vec![false; n];
        let mut queue = VecDeque::new();

        // Seed with every empty boundary cell.
        for z in 0..sz {
            for y in 0..sy {
                for x in 0..sx {
                    let boundary = x == 0
                        || y == 0
                        || z == 0
                        || x == sx - 1
                        || y == sy - 1
                        || z == sz - 1;
                    if !boundary {
                        continue;
                    }
                    let i = grid.idx(x, y, z);
                    if grid.cells[i] == EMPTY && !outside[i] {
                        outside[i] = true;
                        queue.push_back((x, y, z));
                    }
                }
            }
        }

        while let Some((x, y, z)) = queue.pop_front() {
            for face in Face::ALL {
                let (dx, dy, dz) = face.delta();
                let (nx, ny, nz) = (x as i32 + dx, y as i32 + dy, z as i32 + dz);
                if !grid.in_bounds(nx, ny, nz) {
                    continue;
                }
                let (nx, ny, nz) = (nx as usize, ny as usize, nz as usize);
                let ni = grid.idx(nx, ny, nz);
                if grid.cells[ni] == EMPTY && !outside[ni] {
                    outside[ni] = true;
                    queue.push_back((nx, ny, nz));
                }
            }
        }

        let mut exposed = vec![0u8; n];
        for z in 0..sz {
            for y in 0..sy {
                for x in 0..sx {
                    let i = grid.idx(x, y, z);
                    if grid.cells[i] == EMPTY {
                        continue;
                    }
                    let mut mask = 0u8;
                    for face in Face::ALL {
                        let (dx, dy, dz) = face.delta();
                        let (nx, ny, nz) = (x as i32 + dx, y as i32 + dy, z as i32 + dz);
                        let open = if !grid.in_bounds(nx, ny, nz) {
                            true
                        } else {
                            let ni = grid.idx(nx as usize, ny as usize, nz as usize);
                            grid.cells[ni] == EMPTY && outside[ni]
                        };
                        if open {
                            mask |= face.bit();
                        }
                    }
                    exposed[i] = mask;
                }
            }
        }

        VisibilityMap {
            sx,
            sy,
            sz,
            outside,
            exposed,
        }
    }

    #[inline]
    fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < self.sx && y < self.sy && z < self.sz);
        x + self.sx * (y + self.sy * z)
    }

    /// Exposed-face mask of the cell; 0 for empty or fully enclosed cells.
    #[inline]
    pub fn exposed_mask(&self, x: usize, y: usize, z: usize) -> u8 {
        self.exposed[self.idx(x, y, z)]
    }

    /// True for an empty cell connected to the boundary.
    #[inline]
    pub fn is_outside(&self, x: usize, y: usize, z: usize) -> bool {
        self.outside[self.idx(x, y, z)]
    }

    /// True for an occupied cell with no exposed face.
    #[inline]
    pub fn is_culled(&self, grid: &GridBuf, x: usize, y: usize, z: usize) -> bool {
        let i = self.idx(x, y, z);
        grid.cells[i] != EMPTY && self.exposed[i] == 0
    }

    /// Per-cell culled flags, parallel to the grid's cell buffer.
    pub fn culled_cells(&self, grid: &GridBuf) -> Vec<bool> {
        let mut out = vec![false; grid.cells.len()];
        for z in 0..self.sz {
            for y in 0..self.sy {
                for x in 0..self.sx {
                    out[self.idx(x, y, z)] = self.is_culled(grid, x, y, z);
                }
            }
        }
        out
    }
}
