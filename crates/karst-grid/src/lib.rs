//! Dense occupancy grid and the boundary flood-fill visibility pass.
#![forbid(unsafe_code)]

use karst_geom::Face;
use thiserror::Error;

pub mod visibility;

pub use visibility::VisibilityMap;

/// Cell value meaning "no voxel here".
pub const EMPTY: u8 = 0;

/// Largest grid dimension: cell coordinates must survive packing into a byte,
/// so an axis spans at most `0..=256`.
pub const MAX_DIM: usize = 256;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid dimensions {sx}x{sy}x{sz} out of range 1..={max}")]
    InvalidDimensions {
        sx: usize,
        sy: usize,
        sz: usize,
        max: usize,
    },
    #[error("cell buffer holds {got} cells, dimensions require {want}")]
    CellCountMismatch { got: usize, want: usize },
}

/// Dense per-cell palette values, `x` fastest: index `x + sx*(y + sy*z)`.
#[derive(Clone, Debug, PartialEq)]
pub struct GridBuf {
    pub sx: usize,
    pub sy: usize,
    pub sz: usize,
    pub cells: Vec<u8>,
}

impl GridBuf {
    /// An all-empty grid. Dimensions are validated here, not deep inside the
    /// mergers or the tree build.
    pub fn new(sx: usize, sy: usize, sz: usize) -> Result<Self, GridError> {
        Self::check_dims(sx, sy, sz)?;
        Ok(Self {
            sx,
            sy,
            sz,
            cells: vec![EMPTY; sx * sy * sz],
        })
    }

    /// Wraps an existing flat cell buffer (`x` fastest ordering).
    pub fn from_cells(sx: usize, sy: usize, sz: usize, cells: Vec<u8>) -> Result<Self, GridError> {
        Self::check_dims(sx, sy, sz)?;
        let want = sx * sy * sz;
        if cells.len() != want {
            return Err(GridError::CellCountMismatch {
                got: cells.len(),
                want,
            });
        }
        Ok(Self { sx, sy, sz, cells })
    }

    fn check_dims(sx: usize, sy: usize, sz: usize) -> Result<(), GridError> {
        let ok = |d: usize| (1..=MAX_DIM).contains(&d);
        if ok(sx) && ok(sy) && ok(sz) {
            Ok(())
        } else {
            Err(GridError::InvalidDimensions {
                sx,
                sy,
                sz,
                max: MAX_DIM,
            })
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < self.sx && y < self.sy && z < self.sz);
        x + self.sx * (y + self.sy * z)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> u8 {
        self.cells[self.idx(x, y, z)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, v: u8) {
        let i = self.idx(x, y, z);
        self.cells[i] = v;
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as usize) < self.sx
            && (y as usize) < self.sy
            && (z as usize) < self.sz
    }

    /// Cell lookup with signed coordinates; outside the grid reads as empty.
    #[inline]
    pub fn get_clamped(&self, x: i32, y: i32, z: i32) -> u8 {
        if self.in_bounds(x, y, z) {
            self.get(x as usize, y as usize, z as usize)
        } else {
            EMPTY
        }
    }

    #[inline]
    pub fn is_empty_at(&self, x: i32, y: i32, z: i32) -> bool {
        self.get_clamped(x, y, z) == EMPTY
    }

    /// Neighbor value across the given face of `(x,y,z)`.
    #[inline]
    pub fn neighbor(&self, x: usize, y: usize, z: usize, face: Face) -> u8 {
        let (dx, dy, dz) = face.delta();
        self.get_clamped(x as i32 + dx, y as i32 + dy, z as i32 + dz)
    }

    #[inline]
    pub fn has_occupied(&self) -> bool {
        self.cells.iter().any(|&c| c != EMPTY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_dimensions() {
        assert!(matches!(
            GridBuf::new(0, 4, 4),
            Err(GridError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            GridBuf::new(4, 257, 4),
            Err(GridError::InvalidDimensions { .. })
        ));
        assert!(GridBuf::new(256, 1, 1).is_ok());
    }

    #[test]
    fn rejects_short_cell_buffer() {
        assert_eq!(
            GridBuf::from_cells(2, 2, 2, vec![0; 7]),
            Err(GridError::CellCountMismatch { got: 7, want: 8 })
        );
    }

    #[test]
    fn index_is_x_fastest() {
        let mut g = GridBuf::new(4, 3, 2).unwrap();
        g.set(1, 2, 1, 9);
        assert_eq!(g.cells[1 + 4 * (2 + 3 * 1)], 9);
        assert_eq!(g.get_clamped(-1, 0, 0), EMPTY);
        assert_eq!(g.get_clamped(4, 0, 0), EMPTY);
    }
}
