//! Tree storage and read-only queries.
//!
//! Nodes live in a flat arena and refer to children and ropes by index, so
//! the cyclic rope graph between sibling and cousin leaves never owns
//! anything. The six ropes per node point to the nearest neighbor across
//! each face, pushed as deep as the neighbor subtree allows.

use karst_geom::{Face, IAabb};

use crate::Boundable;

/// Arena handle of a tree node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub(crate) fn ix(self) -> usize {
        self.0 as usize
    }
}

pub(crate) enum NodeKind<T> {
    Branch {
        axis: karst_geom::Axis,
        pos: i32,
        left: NodeId,
        right: NodeId,
    },
    Leaf {
        items: Vec<T>,
    },
}

pub(crate) struct Node<T> {
    pub(crate) bounds: IAabb,
    pub(crate) kind: NodeKind<T>,
    pub(crate) ropes: [Option<NodeId>; 6],
}

/// Immutable KD-tree over [`Boundable`] primitives. Safe to query from many
/// threads once built; rebuilds replace the whole tree.
pub struct KdTree<T> {
    pub(crate) nodes: Vec<Node<T>>,
    pub(crate) root: NodeId,
}

impl<T: Boundable> KdTree<T> {
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn bounds(&self, id: NodeId) -> IAabb {
        self.nodes[id.ix()].bounds
    }

    #[inline]
    pub fn is_leaf(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.ix()].kind, NodeKind::Leaf { .. })
    }

    /// The rope across `face`, if any neighbor exists on that side.
    #[inline]
    pub fn rope(&self, id: NodeId, face: Face) -> Option<NodeId> {
        self.nodes[id.ix()].ropes[face.index()]
    }

    /// Leaf contents; empty for branch nodes.
    #[inline]
    pub fn items(&self, id: NodeId) -> &[T] {
        match &self.nodes[id.ix()].kind {
            NodeKind::Leaf { items } => items,
            NodeKind::Branch { .. } => &[],
        }
    }

    /// All primitives whose own bounds overlap `region` (not merely stored
    /// in a leaf whose box overlaps it).
    pub fn intersecting(&self, region: &IAabb) -> Vec<&T> {
        let mut out = Vec::new();
        self.walk_region(self.root, region, &mut |item| out.push(item));
        out
    }

    /// Query variant writing clones into a caller-owned scratch buffer.
    pub fn collect_intersecting(&self, region: &IAabb, out: &mut Vec<T>)
    where
        T: Clone,
    {
        self.walk_region(self.root, region, &mut |item| out.push(item.clone()));
    }

    fn walk_region<'a>(
        &'a self,
        id: NodeId,
        region: &IAabb,
        visit: &mut impl FnMut(&'a T),
    ) {
        let node = &self.nodes[id.ix()];
        if !node.bounds.intersects(*region) {
            return;
        }
        match &node.kind {
            NodeKind::Leaf { items } => {
                for item in items {
                    if item.bounds().intersects(*region) {
                        visit(item);
                    }
                }
            }
            NodeKind::Branch { left, right, .. } => {
                self.walk_region(*left, region, visit);
                self.walk_region(*right, region, visit);
            }
        }
    }

    /// Single descent to the leaf containing `p`, or `None` when the point
    /// lies outside the root bounds entirely.
    pub fn find_leaf(&self, p: [i32; 3]) -> Option<NodeId> {
        if !self.nodes[self.root.ix()].bounds.contains_point(p) {
            return None;
        }
        let mut id = self.root;
        loop {
            match &self.nodes[id.ix()].kind {
                NodeKind::Leaf { .. } => return Some(id),
                NodeKind::Branch {
                    axis,
                    pos,
                    left,
                    right,
                } => {
                    id = if p[axis.index()] < *pos { *left } else { *right };
                }
            }
        }
    }

    /// Leaf ids in arena order; handy for invariant checks and debugging.
    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32)
            .map(NodeId)
            .filter(|id| self.is_leaf(*id))
    }
}
