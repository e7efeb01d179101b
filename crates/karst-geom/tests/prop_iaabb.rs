use karst_geom::{Aabb, Axis, IAabb, Vec3};
use proptest::prelude::*;

fn arb_iaabb() -> impl Strategy<Value = IAabb> {
    (
        (0i32..64, 0i32..64, 0i32..64),
        (1i32..16, 1i32..16, 1i32..16),
    )
        .prop_map(|((x, y, z), (ex, ey, ez))| {
            IAabb::new([x, y, z], [x + ex, y + ey, z + ez])
        })
}

proptest! {
    // Union contains both inputs
    #[test]
    fn union_contains_both(a in arb_iaabb(), b in arb_iaabb()) {
        let u = a.union(b);
        for ax in Axis::ALL {
            let i = ax.index();
            prop_assert!(u.min[i] <= a.min[i] && u.max[i] >= a.max[i]);
            prop_assert!(u.min[i] <= b.min[i] && u.max[i] >= b.max[i]);
        }
    }

    // Intersection is symmetric and implies touching
    #[test]
    fn intersects_symmetric(a in arb_iaabb(), b in arb_iaabb()) {
        prop_assert_eq!(a.intersects(b), b.intersects(a));
        if a.intersects(b) {
            prop_assert!(a.touches(b));
        }
    }

    // A box intersects itself and contains its own min corner
    #[test]
    fn self_intersection(a in arb_iaabb()) {
        prop_assert!(a.intersects(a));
        prop_assert!(a.contains_point(a.min));
        prop_assert!(!a.contains_point(a.max));
    }

    // enclosing(to_aabb) is the identity on integer boxes
    #[test]
    fn enclosing_roundtrip(a in arb_iaabb()) {
        prop_assert_eq!(IAabb::enclosing(a.to_aabb()), a);
    }

    // Swept float box contains both endpoints of the motion
    #[test]
    fn swept_contains_endpoints(a in arb_iaabb(), dx in -8.0f32..8.0, dy in -8.0f32..8.0, dz in -8.0f32..8.0) {
        let b = a.to_aabb();
        let d = Vec3::new(dx, dy, dz);
        let s = b.swept(d);
        prop_assert!(s.contains_point(b.min) && s.contains_point(b.max));
        prop_assert!(s.contains_point(b.min + d) && s.contains_point(b.max + d));
    }

    // Inflating by r then intersecting equals center distance test on each axis
    #[test]
    fn inflate_grows_every_side(a in arb_iaabb(), r in 0.0f32..4.0) {
        let b = a.to_aabb();
        let g = b.inflate(r);
        prop_assert!(g.min.x <= b.min.x && g.max.x >= b.max.x);
        prop_assert!(Aabb::new(g.min, g.max).contains_point(b.center()));
    }
}
