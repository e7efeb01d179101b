//! Discrete and continuous collision against the voxel KD-tree.
//!
//! The box phase runs slab time-of-impact tests against the candidates a
//! range query returns, honoring each box's exposed-sides mask, then
//! integrates the displacement in contact order with per-axis velocity
//! zeroing: the result is blocked-and-slid motion for one frame. The sphere
//! phase (see [`sphere`]) solves exact time of impact with closed forms for
//! face, edge, and corner contact.
//!
//! A `Collider` owns reusable scratch buffers and is therefore not safe to
//! share across threads; use one per thread. The tree itself is read-only
//! and may be queried concurrently.
#![forbid(unsafe_code)]

use karst_geom::{Aabb, Axis, Face, IAabb, Vec3, VoxelBox};
use karst_kdtree::KdTree;

pub mod sphere;

pub use sphere::{sphere_contact, sphere_toi};

/// One collision event inside a single query; sorted by time of impact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// Unit normal with exactly one nonzero axis component, pointing from
    /// the hit box toward the mover.
    pub normal: Vec3,
    /// Fraction of the frame displacement at first touch, in `[0, 1]`.
    pub t: f32,
    pub hit: VoxelBox,
}

impl Contact {
    /// The normal's (single) nonzero axis.
    #[inline]
    pub fn axis(&self) -> Axis {
        if self.normal.x != 0.0 {
            Axis::X
        } else if self.normal.y != 0.0 {
            Axis::Y
        } else {
            Axis::Z
        }
    }
}

/// Per-thread collision context with reusable scratch buffers.
#[derive(Default)]
pub struct Collider {
    candidates: Vec<VoxelBox>,
    contacts: Vec<Contact>,
}

impl Collider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contacts produced by the most recent query, in consumption order.
    #[inline]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Sweeps `moving` along `delta` against the indexed boxes and returns
    /// the blocked-and-slid displacement for the frame.
    pub fn sweep_aabb(&mut self, tree: &KdTree<VoxelBox>, moving: Aabb, delta: Vec3) -> Vec3 {
        self.candidates.clear();
        self.contacts.clear();
        // Inflate the gathering region so boxes merely touching the mover
        // (distance zero) are still candidates for t = 0 contacts.
        let region = IAabb::enclosing(moving.swept(delta).inflate(0.5));
        tree.collect_intersecting(&region, &mut self.candidates);

        for b in &self.candidates {
            if b.exposed == 0 {
                continue;
            }
            if let Some(c) = aabb_contact(moving, delta, b) {
                self.contacts.push(c);
            }
        }

        log::trace!(
            target: "collide",
            "sweep_aabb candidates={} contacts={}",
            self.candidates.len(),
            self.contacts.len()
        );
        self.contacts.sort_by(|a, b| {
            a.t.partial_cmp(&b.t)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.hit.min.cmp(&b.hit.min))
                .then_with(|| a.axis().index().cmp(&b.axis().index()))
        });
        dedup_contacts(&mut self.contacts, delta);

        // Integrate in time order, zeroing the velocity component along each
        // consumed contact's normal axis.
        let mut vel = delta;
        let mut out = Vec3::ZERO;
        let mut t_prev = 0.0f32;
        for c in &self.contacts {
            let axis = c.axis();
            let dt = (c.t - t_prev).max(0.0);
            out += vel * dt;
            t_prev = t_prev.max(c.t);
            if vel.get(axis) * c.normal.get(axis) < 0.0 {
                vel.set(axis, 0.0);
            }
        }
        out + vel * (1.0 - t_prev)
    }

    /// Sweeps a sphere against the indexed boxes; returns the earliest
    /// contact, if any.
    pub fn sweep_sphere(
        &mut self,
        tree: &KdTree<VoxelBox>,
        center: Vec3,
        radius: f32,
        delta: Vec3,
    ) -> Option<Contact> {
        assert!(radius > 0.0, "sphere radius must be positive");
        self.candidates.clear();
        let ball = Aabb::new(center, center).inflate(radius);
        let region = IAabb::enclosing(ball.swept(delta).inflate(0.5));
        tree.collect_intersecting(&region, &mut self.candidates);

        let mut best: Option<Contact> = None;
        for b in &self.candidates {
            if b.exposed == 0 {
                continue;
            }
            let Some((t, normal)) = sphere_contact(center, radius, delta, b.aabb()) else {
                continue;
            };
            // Flat contacts against an unexposed face cannot happen.
            if let Some(face) = axis_face(normal) {
                if !b.face_exposed(face) {
                    continue;
                }
            }
            if best.is_none_or(|c| t < c.t) {
                best = Some(Contact { normal, t, hit: *b });
            }
        }
        best
    }
}

/// The face a pure axis normal points out of, if it is one.
#[inline]
fn axis_face(normal: Vec3) -> Option<Face> {
    for face in Face::ALL {
        if normal == face.normal() {
            return Some(face);
        }
    }
    None
}

/// Slab time-of-impact of a moving box against one voxel box.
fn aabb_contact(moving: Aabb, delta: Vec3, b: &VoxelBox) -> Option<Contact> {
    let bb = b.aabb();
    let mut entry = [f32::NEG_INFINITY; 3];
    let mut t_exit = f32::INFINITY;
    for a in Axis::ALL {
        let d = delta.get(a);
        let (mn, mx) = (moving.min.get(a), moving.max.get(a));
        let (bn, bx) = (bb.min.get(a), bb.max.get(a));
        if d == 0.0 {
            // Touching counts as overlap so resting contacts resolve at t=0.
            if mx < bn || mn > bx {
                return None;
            }
            continue;
        }
        let (e, x) = if d > 0.0 {
            ((bn - mx) / d, (bx - mn) / d)
        } else {
            ((bx - mn) / d, (bn - mx) / d)
        };
        entry[a.index()] = e;
        t_exit = t_exit.min(x);
    }
    let t_entry = entry[0].max(entry[1]).max(entry[2]);
    if t_entry > t_exit || t_entry > 1.0 || t_exit < 0.0 {
        return None;
    }
    if t_entry <= 0.0 {
        return static_contact(moving, delta, b);
    }

    // Among axes tied for the latest entry, prefer the larger contact
    // cross-section; a zero cross-section is an edge graze, not a contact.
    let overlap_at = |a: Axis, t: f32| -> f32 {
        let off = delta.get(a) * t;
        (moving.max.get(a) + off).min(bb.max.get(a))
            - (moving.min.get(a) + off).max(bb.min.get(a))
    };
    let mut axis: Option<(Axis, f32)> = None;
    for a in Axis::ALL {
        if entry[a.index()] != t_entry {
            continue;
        }
        let (o1, o2) = a.others();
        let area = overlap_at(o1, t_entry).max(0.0) * overlap_at(o2, t_entry).max(0.0);
        if axis.is_none_or(|(_, best)| area > best) {
            axis = Some((a, area));
        }
    }
    let (axis, area) = axis?;
    if area <= 0.0 {
        return None;
    }
    let face = Face::from_axis(axis, delta.get(axis) < 0.0);
    if !b.face_exposed(face) {
        return None;
    }
    Some(Contact {
        normal: face.normal(),
        t: t_entry,
        hit: *b,
    })
}

/// Resolves a box already overlapping or touching the mover: the contact
/// axis is the one with the smallest penetration whose cross-section has
/// positive area, and the normal points toward the mover.
fn static_contact(moving: Aabb, delta: Vec3, b: &VoxelBox) -> Option<Contact> {
    let bb = b.aabb();
    let overlap = |a: Axis| -> f32 {
        moving.max.get(a).min(bb.max.get(a)) - moving.min.get(a).max(bb.min.get(a))
    };
    let mut best: Option<(Axis, f32)> = None;
    for a in Axis::ALL {
        let (o1, o2) = a.others();
        if overlap(o1) <= 0.0 || overlap(o2) <= 0.0 {
            continue;
        }
        let depth = overlap(a);
        if depth < 0.0 {
            return None;
        }
        if best.is_none_or(|(_, d)| depth < d) {
            best = Some((a, depth));
        }
    }
    let (axis, _) = best?;
    let positive = if moving.center().get(axis) != bb.center().get(axis) {
        moving.center().get(axis) > bb.center().get(axis)
    } else {
        // Concentric overlap: face away from the motion.
        delta.get(axis) < 0.0
    };
    let face = Face::from_axis(axis, positive);
    if !b.face_exposed(face) {
        return None;
    }
    Some(Contact {
        normal: face.normal(),
        t: 0.0,
        hit: *b,
    })
}

/// Drops contacts that disagree about a shared face: when two candidates
/// adjacent along an axis report opposite normals at the same time, only
/// the face opposing the motion is geometrically plausible. Grid-aligned
/// convex input assumed.
fn dedup_contacts(contacts: &mut Vec<Contact>, delta: Vec3) {
    let mut keep = vec![true; contacts.len()];
    for i in 0..contacts.len() {
        for j in (i + 1)..contacts.len() {
            if !keep[i] || !keep[j] {
                continue;
            }
            let (a, b) = (&contacts[i], &contacts[j]);
            if a.t != b.t || a.axis() != b.axis() {
                continue;
            }
            let ax = a.axis();
            if a.normal.get(ax) * b.normal.get(ax) >= 0.0 {
                continue;
            }
            let ai = ax.index();
            let adjacent =
                a.hit.max[ai] == b.hit.min[ai] || b.hit.max[ai] == a.hit.min[ai];
            if !adjacent {
                continue;
            }
            // Keep the face opposing motion; with no motion on the axis,
            // keep the earlier-sorted contact.
            let d = delta.get(ax);
            if d == 0.0 {
                keep[j] = false;
            } else if a.normal.get(ax) * d < 0.0 {
                keep[j] = false;
            } else {
                keep[i] = false;
            }
        }
    }
    let mut i = 0;
    contacts.retain(|_| {
        let k = keep[i];
        i += 1;
        k
    });
}
