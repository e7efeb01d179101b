//! Tree construction: cost-based splitting, then two rope passes.
//!
//! Build is three explicit top-down passes. The first lays out nodes in the
//! arena, splitting straddling primitives exactly at the cut plane so no
//! primitive is duplicated whole. The second hands every child the four
//! ropes the split leaves untouched plus its sibling across the cut. The
//! third pushes each rope as deep into the neighbor subtree as it can go
//! without overshooting this node's own box.

use karst_geom::{Axis, Face, IAabb};

use crate::tree::{KdTree, Node, NodeId, NodeKind};
use crate::Boundable;

/// Leaves hold at most this many primitives unless no beneficial split exists.
const LEAF_CAPACITY: usize = 2;
/// Split selection samples at most this many primitives, evenly strided.
const SPLIT_SAMPLES: usize = 100;
/// Linear cost per primitive in the split heuristic.
const BOX_COST: f32 = 1.0;

impl<T: Boundable + Clone> KdTree<T> {
    /// Builds the tree from a flat primitive list. An empty list yields a
    /// single empty leaf at the origin.
    pub fn build(items: Vec<T>) -> KdTree<T> {
        let t0 = std::time::Instant::now();
        let n_input = items.len();
        let bounds = items
            .iter()
            .map(|it| it.bounds())
            .reduce(IAabb::union)
            .unwrap_or(IAabb::EMPTY);
        let mut nodes = Vec::new();
        let root = build_node(&mut nodes, items, bounds, Axis::X);
        let mut tree = KdTree { nodes, root };
        tree.assign_ropes(root, [None; 6]);
        tree.optimize_ropes();
        let ms = t0.elapsed().as_millis();
        log::info!(
            target: "perf",
            "ms={} kdtree_build items={} nodes={}",
            ms,
            n_input,
            tree.nodes.len()
        );
        tree
    }

    /// Second pass: children inherit the parent's ropes except across the
    /// split plane, where the sibling is the nearest neighbor by
    /// construction.
    fn assign_ropes(&mut self, id: NodeId, ropes: [Option<NodeId>; 6]) {
        self.nodes[id.ix()].ropes = ropes;
        let branch = match &self.nodes[id.ix()].kind {
            NodeKind::Branch {
                axis, left, right, ..
            } => Some((*axis, *left, *right)),
            NodeKind::Leaf { .. } => None,
        };
        if let Some((axis, left, right)) = branch {
            let pos_face = Face::from_axis(axis, true);
            let neg_face = pos_face.opposite();
            let mut lr = ropes;
            lr[pos_face.index()] = Some(right);
            let mut rr = ropes;
            rr[neg_face.index()] = Some(left);
            self.assign_ropes(left, lr);
            self.assign_ropes(right, rr);
        }
    }

    /// Third pass: walk each rope downward through the neighbor subtree,
    /// always taking the child on the side nearer this node's box, stopping
    /// once the neighbor's split plane falls strictly inside it.
    fn optimize_ropes(&mut self) {
        for i in 0..self.nodes.len() {
            let nb = self.nodes[i].bounds;
            let mut ropes = self.nodes[i].ropes;
            for face in Face::ALL {
                if let Some(r) = ropes[face.index()] {
                    ropes[face.index()] = Some(self.push_rope(nb, face, r));
                }
            }
            self.nodes[i].ropes = ropes;
        }
    }

    fn push_rope(&self, nb: IAabb, face: Face, start: NodeId) -> NodeId {
        let mut id = start;
        loop {
            match &self.nodes[id.ix()].kind {
                NodeKind::Leaf { .. } => return id,
                NodeKind::Branch {
                    axis,
                    pos,
                    left,
                    right,
                } => {
                    if *axis == face.axis() {
                        // The neighbor splits along the rope direction; only
                        // the child facing us can be adjacent.
                        id = if face.is_positive() { *left } else { *right };
                    } else {
                        let a = axis.index();
                        if *pos <= nb.min[a] {
                            id = *right;
                        } else if *pos >= nb.max[a] {
                            id = *left;
                        } else {
                            // Plane cuts through our own extent: both
                            // children border us, descending would lose one.
                            return id;
                        }
                    }
                }
            }
        }
    }
}

fn build_node<T: Boundable + Clone>(
    nodes: &mut Vec<Node<T>>,
    items: Vec<T>,
    bounds: IAabb,
    axis_hint: Axis,
) -> NodeId {
    if items.len() <= LEAF_CAPACITY {
        return push_leaf(nodes, bounds, items);
    }
    let Some((axis, pos)) = choose_split(&items, bounds, axis_hint) else {
        return push_leaf(nodes, bounds, items);
    };

    let mut left_items = Vec::new();
    let mut right_items = Vec::new();
    for it in items {
        if it.max(axis) <= pos {
            left_items.push(it);
        } else if it.min(axis) >= pos {
            right_items.push(it);
        } else {
            let l = it.split_left(axis, pos);
            let r = it.split_right(axis, pos);
            debug_assert_eq!(l.max(axis), pos, "split_left contract violated");
            debug_assert_eq!(r.min(axis), pos, "split_right contract violated");
            left_items.push(l);
            right_items.push(r);
        }
    }

    let mut left_bounds = bounds;
    left_bounds.max[axis.index()] = pos;
    let mut right_bounds = bounds;
    right_bounds.min[axis.index()] = pos;

    // Reserve the parent slot so children land after it in the arena.
    let id = push_leaf(nodes, bounds, Vec::new());
    let left = build_node(nodes, left_items, left_bounds, axis.next());
    let right = build_node(nodes, right_items, right_bounds, axis.next());
    nodes[id.ix()].kind = NodeKind::Branch {
        axis,
        pos,
        left,
        right,
    };
    id
}

fn push_leaf<T>(nodes: &mut Vec<Node<T>>, bounds: IAabb, items: Vec<T>) -> NodeId {
    let id = NodeId(nodes.len() as u32);
    nodes.push(Node {
        bounds,
        kind: NodeKind::Leaf { items },
        ropes: [None; 6],
    });
    id
}

/// Picks the split plane minimizing a linear sweep cost over sampled
/// interval boundaries on the largest-extent axis, or `None` when every
/// candidate is degenerate or worse than not splitting.
fn choose_split<T: Boundable>(items: &[T], bounds: IAabb, axis_hint: Axis) -> Option<(Axis, i32)> {
    // Largest extent wins; the rotated hint breaks ties.
    let mut axis = axis_hint;
    let mut best_ext = bounds.extent(axis_hint);
    for a in [axis_hint.next(), axis_hint.next().next()] {
        let e = bounds.extent(a);
        if e > best_ext {
            axis = a;
            best_ext = e;
        }
    }
    if best_ext <= 1 {
        return None;
    }

    let n = items.len();
    let stride = (n / SPLIT_SAMPLES).max(1);
    // (boundary position, is_interval_end)
    let mut events: Vec<(i32, bool)> = Vec::with_capacity(2 * n.div_ceil(stride));
    let mut sampled = 0usize;
    for i in (0..n).step_by(stride) {
        let (min, max) = (items[i].min(axis), items[i].max(axis));
        // Zero-extent intervals contribute no boundary worth cutting at.
        if min < max {
            events.push((min, false));
            events.push((max, true));
            sampled += 1;
        }
    }
    if sampled == 0 {
        return None;
    }
    events.sort_unstable();

    let lo = bounds.min[axis.index()];
    let hi = bounds.max[axis.index()];
    let inv_width = 1.0 / (hi - lo) as f32;
    let leaf_cost = BOX_COST * sampled as f32;

    let mut open = 0usize;
    let mut done = 0usize;
    let mut best: Option<(i32, f32)> = None;
    let mut i = 0;
    while i < events.len() {
        let p = events[i].0;
        let mut starts = 0usize;
        while i < events.len() && events[i].0 == p {
            if events[i].1 {
                open -= 1;
                done += 1;
            } else {
                starts += 1;
            }
            i += 1;
        }
        // Boundaries on the node's own faces make no progress.
        if p > lo && p < hi {
            let alpha = (p - lo) as f32 * inv_width;
            let left = (done + open) as f32;
            let right = (sampled - done) as f32;
            let cost = BOX_COST * (alpha * left + (1.0 - alpha) * right);
            if best.is_none_or(|(_, c)| cost < c) {
                best = Some((p, cost));
            }
        }
        open += starts;
    }

    match best {
        Some((p, c)) if c < leaf_cost => Some((axis, p)),
        _ => None,
    }
}
