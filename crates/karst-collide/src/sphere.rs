//! Continuous sphere-vs-box time of impact.
//!
//! The query inflates the box by the sphere radius, finds the conservative
//! slab entry, then classifies the hit region: flat faces resolve directly,
//! rounded edges become a moving-point-vs-capsule quadratic, and corners a
//! ray-vs-sphere test.

use karst_geom::{Aabb, Axis, Face, Vec3};

/// Earliest time in `[0, 1]` at which a sphere swept along `delta` touches
/// `bb`, with the surface normal at the contact point. Overlapping or
/// touching starts report `t = 0`. `None` means no impact within the step.
pub fn sphere_contact(center: Vec3, radius: f32, delta: Vec3, bb: Aabb) -> Option<(f32, Vec3)> {
    debug_assert!(radius > 0.0);
    let closest = center.max(bb.min).min(bb.max);
    let to_center = center - closest;
    let d2 = to_center.length_sq();
    if d2 <= radius * radius {
        let normal = if d2 > 0.0 {
            to_center.normalized()
        } else {
            nearest_face_normal(center, bb)
        };
        return Some((0.0, normal));
    }
    if delta == Vec3::ZERO {
        return None;
    }

    let fat = bb.inflate(radius);
    let (t0, axis) = ray_aabb(center, delta, fat)?;
    if t0 > 1.0 {
        return None;
    }
    let p = center + delta * t0;

    // Nearer box side per axis, for edge and corner feature selection.
    let side = |a: Axis| -> f32 {
        let mid = (bb.min.get(a) + bb.max.get(a)) * 0.5;
        if p.get(a) < mid {
            bb.min.get(a)
        } else {
            bb.max.get(a)
        }
    };

    let (o1, o2) = axis.others();
    let out1 = p.get(o1) < bb.min.get(o1) || p.get(o1) > bb.max.get(o1);
    let out2 = p.get(o2) < bb.min.get(o2) || p.get(o2) > bb.max.get(o2);
    match (out1, out2) {
        (false, false) => {
            // Flat region of the inflated face: the slab entry is exact.
            let face = Face::from_axis(axis, delta.get(axis) < 0.0);
            Some((t0, face.normal()))
        }
        (true, false) => edge_contact(center, delta, radius, bb, o2, side),
        (false, true) => edge_contact(center, delta, radius, bb, o1, side),
        (true, true) => {
            let corner = Vec3::new(side(Axis::X), side(Axis::Y), side(Axis::Z));
            let t = ray_sphere(center, delta, corner, radius)?;
            if t > 1.0 {
                return None;
            }
            Some((t, (center + delta * t - corner).normalized()))
        }
    }
}

/// [`sphere_contact`] reduced to a time; `NaN` signals no impact.
#[inline]
pub fn sphere_toi(center: Vec3, radius: f32, delta: Vec3, bb: Aabb) -> f32 {
    match sphere_contact(center, radius, delta, bb) {
        Some((t, _)) => t,
        None => f32::NAN,
    }
}

/// Moving point against the capsule around a box edge running along `along`.
/// Falls back to the endpoint corner spheres when the radial solution lands
/// past either end of the edge.
fn edge_contact(
    center: Vec3,
    delta: Vec3,
    radius: f32,
    bb: Aabb,
    along: Axis,
    side: impl Fn(Axis) -> f32,
) -> Option<(f32, Vec3)> {
    let (o1, o2) = along.others();
    let mut e0 = Vec3::ZERO;
    e0.set(o1, side(o1));
    e0.set(o2, side(o2));
    e0.set(along, bb.min.get(along));
    let len = bb.max.get(along) - bb.min.get(along);

    // Project out the edge direction and solve in the radial plane.
    let mut n = center - e0;
    n.set(along, 0.0);
    let mut d = delta;
    d.set(along, 0.0);
    let a = d.length_sq();
    if a == 0.0 {
        // Motion parallel to the edge never closes the radial distance.
        return None;
    }
    let b = n.dot(d);
    let c = n.length_sq() - radius * radius;
    let disc = b * b - a * c;
    if disc < 0.0 {
        return None;
    }
    let mut t = (-b - disc.sqrt()) / a;
    if t < 0.0 {
        if c > 0.0 {
            return None;
        }
        t = 0.0;
    }
    if t > 1.0 {
        return None;
    }

    let s = center.get(along) + delta.get(along) * t - e0.get(along);
    if s < 0.0 || s > len {
        let mut corner = e0;
        corner.set(along, if s < 0.0 { e0.get(along) } else { e0.get(along) + len });
        let t = ray_sphere(center, delta, corner, radius)?;
        if t > 1.0 {
            return None;
        }
        return Some((t, (center + delta * t - corner).normalized()));
    }
    let mut on_edge = e0;
    on_edge.set(along, e0.get(along) + s);
    Some((t, (center + delta * t - on_edge).normalized()))
}

/// Slab entry of a ray into a float box: entry time (clamped to zero when
/// the origin starts inside) and the entry axis.
fn ray_aabb(origin: Vec3, dir: Vec3, bb: Aabb) -> Option<(f32, Axis)> {
    let mut t_entry = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut axis = Axis::X;
    for a in Axis::ALL {
        let d = dir.get(a);
        let o = origin.get(a);
        let (lo, hi) = (bb.min.get(a), bb.max.get(a));
        if d == 0.0 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let (e, x) = if d > 0.0 {
            ((lo - o) / d, (hi - o) / d)
        } else {
            ((hi - o) / d, (lo - o) / d)
        };
        if e > t_entry {
            t_entry = e;
            axis = a;
        }
        t_exit = t_exit.min(x);
    }
    if t_entry > t_exit || t_exit < 0.0 {
        return None;
    }
    Some((t_entry.max(0.0), axis))
}

/// First nonnegative time a ray enters a sphere.
fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let m = origin - center;
    let a = dir.length_sq();
    if a == 0.0 {
        return None;
    }
    let b = m.dot(dir);
    let c = m.length_sq() - radius * radius;
    let disc = b * b - a * c;
    if disc < 0.0 {
        return None;
    }
    let t = (-b - disc.sqrt()) / a;
    if t < 0.0 {
        if c <= 0.0 { Some(0.0) } else { None }
    } else {
        Some(t)
    }
}

/// Outward normal of the box face nearest to an interior point.
fn nearest_face_normal(p: Vec3, bb: Aabb) -> Vec3 {
    let mut best = Face::PosY;
    let mut best_d = f32::INFINITY;
    for face in Face::ALL {
        let a = face.axis();
        let d = if face.is_positive() {
            bb.max.get(a) - p.get(a)
        } else {
            p.get(a) - bb.min.get(a)
        };
        if d < best_d {
            best_d = d;
            best = face;
        }
    }
    best.normal()
}
