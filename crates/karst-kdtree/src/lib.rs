//! Integer KD-tree over axis-aligned boxes with stackless neighbor ropes.
//!
//! The tree is generic over anything [`Boundable`]: it can index raw
//! per-voxel boxes or the merged runs the volume merger emits. Once built it
//! is immutable; edits to the source grid rebuild the tree wholesale and the
//! caller swaps the new tree in.
#![forbid(unsafe_code)]

use karst_geom::{Axis, Face, IAabb, VoxelBox};

mod build;
mod tree;

pub use tree::{KdTree, NodeId};

/// Capability of a spatial primitive: per-axis integer extents (max
/// exclusive) and exact splitting at a coordinate.
///
/// Contract: `split_left(a, p).max(a) == p` and
/// `split_right(a, p).min(a) == p`, and the two halves' union is the
/// original. The tree builder asserts this; a violation is a construction
/// bug, not a recoverable error.
pub trait Boundable: Sized {
    fn min(&self, axis: Axis) -> i32;
    fn max(&self, axis: Axis) -> i32;

    /// The part of this primitive strictly below `at` on `axis`.
    fn split_left(&self, axis: Axis, at: i32) -> Self;
    /// The part of this primitive at or above `at` on `axis`.
    fn split_right(&self, axis: Axis, at: i32) -> Self;

    #[inline]
    fn bounds(&self) -> IAabb {
        IAabb::new(
            [self.min(Axis::X), self.min(Axis::Y), self.min(Axis::Z)],
            [self.max(Axis::X), self.max(Axis::Y), self.max(Axis::Z)],
        )
    }
}

impl Boundable for VoxelBox {
    #[inline]
    fn min(&self, axis: Axis) -> i32 {
        self.min[axis.index()]
    }

    #[inline]
    fn max(&self, axis: Axis) -> i32 {
        self.max[axis.index()]
    }

    fn split_left(&self, axis: Axis, at: i32) -> Self {
        debug_assert!(at > self.min[axis.index()] && at < self.max[axis.index()]);
        let mut half = *self;
        half.max[axis.index()] = at;
        // The cut plane is interior to the original solid, never exposed.
        half.exposed &= !Face::from_axis(axis, true).bit();
        half
    }

    fn split_right(&self, axis: Axis, at: i32) -> Self {
        debug_assert!(at > self.min[axis.index()] && at < self.max[axis.index()]);
        let mut half = *self;
        half.min[axis.index()] = at;
        half.exposed &= !Face::from_axis(axis, false).bit();
        half
    }
}
