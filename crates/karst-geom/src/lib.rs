//! Minimal geometry types shared by the karst crates (no engine dependency).
#![forbid(unsafe_code)]

use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn dot(self, rhs: Vec3) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline]
    pub fn length_sq(self) -> f32 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    #[inline]
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len > 0.0 { self / len } else { self }
    }

    /// Component access by axis index.
    #[inline]
    pub fn get(self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Component replacement by axis index.
    #[inline]
    pub fn set(&mut self, axis: Axis, v: f32) {
        match axis {
            Axis::X => self.x = v,
            Axis::Y => self.y = v,
            Axis::Z => self.z = v,
        }
    }

    #[inline]
    pub fn min(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x.min(rhs.x), self.y.min(rhs.y), self.z.min(rhs.z))
    }

    #[inline]
    pub fn max(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x.max(rhs.x), self.y.max(rhs.y), self.z.max(rhs.z))
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vec3 {
    #[inline]
    fn sub_assign(&mut self, rhs: Vec3) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn div(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    #[inline]
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Returns the `[0..3)` index of this axis.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Converts an axis index `[0..3)` back into an `Axis` value.
    /// Out-of-range indices are a programming error.
    #[inline]
    pub fn from_index(i: usize) -> Axis {
        match i {
            0 => Axis::X,
            1 => Axis::Y,
            2 => Axis::Z,
            _ => panic!("axis index out of range: {}", i),
        }
    }

    /// Next axis in the X -> Y -> Z -> X rotation.
    #[inline]
    pub fn next(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::Z,
            Axis::Z => Axis::X,
        }
    }

    /// The two axes perpendicular to this one.
    #[inline]
    pub fn others(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::X, Axis::Z),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosY = 0,
    NegY = 1,
    PosX = 2,
    NegX = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosY,
        Face::NegY,
        Face::PosX,
        Face::NegX,
        Face::PosZ,
        Face::NegZ,
    ];

    /// Returns the `[0..6)` index of this face.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Converts a face index `[0..6)` back into a `Face` value.
    /// Out-of-range indices are a programming error.
    #[inline]
    pub fn from_index(i: usize) -> Face {
        match i {
            0 => Face::PosY,
            1 => Face::NegY,
            2 => Face::PosX,
            3 => Face::NegX,
            4 => Face::PosZ,
            5 => Face::NegZ,
            _ => panic!("face index out of range: {}", i),
        }
    }

    /// The axis this face is perpendicular to.
    #[inline]
    pub fn axis(self) -> Axis {
        match self {
            Face::PosY | Face::NegY => Axis::Y,
            Face::PosX | Face::NegX => Axis::X,
            Face::PosZ | Face::NegZ => Axis::Z,
        }
    }

    /// True for the +axis face, false for the -axis face.
    #[inline]
    pub fn is_positive(self) -> bool {
        matches!(self, Face::PosX | Face::PosY | Face::PosZ)
    }

    /// The face on the opposite side of the same axis.
    #[inline]
    pub fn opposite(self) -> Face {
        match self {
            Face::PosY => Face::NegY,
            Face::NegY => Face::PosY,
            Face::PosX => Face::NegX,
            Face::NegX => Face::PosX,
            Face::PosZ => Face::NegZ,
            Face::NegZ => Face::PosZ,
        }
    }

    /// Face of the given axis with the given sign.
    #[inline]
    pub fn from_axis(axis: Axis, positive: bool) -> Face {
        match (axis, positive) {
            (Axis::Y, true) => Face::PosY,
            (Axis::Y, false) => Face::NegY,
            (Axis::X, true) => Face::PosX,
            (Axis::X, false) => Face::NegX,
            (Axis::Z, true) => Face::PosZ,
            (Axis::Z, false) => Face::NegZ,
        }
    }

    /// Returns the unit-normal vector for this face.
    #[inline]
    pub fn normal(self) -> Vec3 {
        match self {
            Face::PosY => Vec3::new(0.0, 1.0, 0.0),
            Face::NegY => Vec3::new(0.0, -1.0, 0.0),
            Face::PosX => Vec3::new(1.0, 0.0, 0.0),
            Face::NegX => Vec3::new(-1.0, 0.0, 0.0),
            Face::PosZ => Vec3::new(0.0, 0.0, 1.0),
            Face::NegZ => Vec3::new(0.0, 0.0, -1.0),
        }
    }

    /// Returns the integer grid delta `(dx,dy,dz)` when stepping out of this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::PosY => (0, 1, 0),
            Face::NegY => (0, -1, 0),
            Face::PosX => (1, 0, 0),
            Face::NegX => (-1, 0, 0),
            Face::PosZ => (0, 0, 1),
            Face::NegZ => (0, 0, -1),
        }
    }

    /// Bit of this face in a six-bit exposed-sides mask.
    #[inline]
    pub fn bit(self) -> u8 {
        1u8 << self.index()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn center(self) -> Vec3 {
        (self.min + self.max) / 2.0
    }

    #[inline]
    pub fn intersects(self, other: Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
            && self.min.z < other.max.z
            && other.min.z < self.max.z
    }

    #[inline]
    pub fn contains_point(self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Grows the box outward by `r` on every side.
    #[inline]
    pub fn inflate(self, r: f32) -> Aabb {
        let d = Vec3::new(r, r, r);
        Aabb::new(self.min - d, self.max + d)
    }

    /// Bounding box of this box swept along `delta`.
    #[inline]
    pub fn swept(self, delta: Vec3) -> Aabb {
        Aabb::new(
            self.min.min(self.min + delta),
            self.max.max(self.max + delta),
        )
    }
}

/// Axis-aligned integer box; `max` is exclusive on every axis.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct IAabb {
    pub min: [i32; 3],
    pub max: [i32; 3],
}

impl IAabb {
    #[inline]
    pub const fn new(min: [i32; 3], max: [i32; 3]) -> Self {
        Self { min, max }
    }

    /// The empty box at the origin.
    pub const EMPTY: IAabb = IAabb {
        min: [0; 3],
        max: [0; 3],
    };

    #[inline]
    pub fn extent(self, axis: Axis) -> i32 {
        self.max[axis.index()] - self.min[axis.index()]
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.min[0] >= self.max[0] || self.min[1] >= self.max[1] || self.min[2] >= self.max[2]
    }

    /// Strict overlap: shared faces do not count as intersection.
    #[inline]
    pub fn intersects(self, other: IAabb) -> bool {
        (0..3).all(|a| self.min[a] < other.max[a] && other.min[a] < self.max[a])
    }

    /// Touching-or-overlapping: shared faces count.
    #[inline]
    pub fn touches(self, other: IAabb) -> bool {
        (0..3).all(|a| self.min[a] <= other.max[a] && other.min[a] <= self.max[a])
    }

    #[inline]
    pub fn contains_point(self, p: [i32; 3]) -> bool {
        (0..3).all(|a| p[a] >= self.min[a] && p[a] < self.max[a])
    }

    #[inline]
    pub fn union(self, other: IAabb) -> IAabb {
        IAabb {
            min: [
                self.min[0].min(other.min[0]),
                self.min[1].min(other.min[1]),
                self.min[2].min(other.min[2]),
            ],
            max: [
                self.max[0].max(other.max[0]),
                self.max[1].max(other.max[1]),
                self.max[2].max(other.max[2]),
            ],
        }
    }

    #[inline]
    pub fn volume(self) -> i64 {
        if self.is_empty() {
            return 0;
        }
        (0..3).map(|a| (self.max[a] - self.min[a]) as i64).product()
    }

    #[inline]
    pub fn to_aabb(self) -> Aabb {
        Aabb::new(
            Vec3::new(self.min[0] as f32, self.min[1] as f32, self.min[2] as f32),
            Vec3::new(self.max[0] as f32, self.max[1] as f32, self.max[2] as f32),
        )
    }

    /// Smallest integer box covering the float box.
    #[inline]
    pub fn enclosing(b: Aabb) -> IAabb {
        IAabb {
            min: [
                b.min.x.floor() as i32,
                b.min.y.floor() as i32,
                b.min.z.floor() as i32,
            ],
            max: [
                b.max.x.ceil() as i32,
                b.max.y.ceil() as i32,
                b.max.z.ceil() as i32,
            ],
        }
    }
}

/// A merged run of equal-valued cells: the volume merger's output record and
/// the primitive the KD-tree indexes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VoxelBox {
    pub min: [i32; 3],
    pub max: [i32; 3],
    /// Palette index of the merged cells; never 0.
    pub value: u8,
    /// Six-bit mask of faces reachable from outside, `Face::bit` per face.
    pub exposed: u8,
}

impl VoxelBox {
    #[inline]
    pub const fn new(min: [i32; 3], max: [i32; 3], value: u8) -> Self {
        Self {
            min,
            max,
            value,
            exposed: 0,
        }
    }

    #[inline]
    pub fn bounds(&self) -> IAabb {
        IAabb::new(self.min, self.max)
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        self.bounds().to_aabb()
    }

    #[inline]
    pub fn face_exposed(&self, face: Face) -> bool {
        self.exposed & face.bit() != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_index_roundtrip() {
        for f in Face::ALL {
            assert_eq!(Face::from_index(f.index()), f);
            assert_eq!(f.opposite().opposite(), f);
            assert_eq!(Face::from_axis(f.axis(), f.is_positive()), f);
        }
    }

    #[test]
    #[should_panic(expected = "face index out of range")]
    fn face_from_index_rejects_out_of_range() {
        Face::from_index(6);
    }

    #[test]
    #[should_panic(expected = "axis index out of range")]
    fn axis_from_index_rejects_out_of_range() {
        Axis::from_index(3);
    }

    #[test]
    fn iaabb_shared_face_is_not_intersection() {
        let a = IAabb::new([0, 0, 0], [2, 2, 2]);
        let b = IAabb::new([2, 0, 0], [4, 2, 2]);
        assert!(!a.intersects(b));
        assert!(a.touches(b));
    }

    #[test]
    fn iaabb_union_volume() {
        let a = IAabb::new([0, 0, 0], [1, 1, 1]);
        let b = IAabb::new([3, 3, 3], [4, 4, 4]);
        let u = a.union(b);
        assert_eq!(u, IAabb::new([0, 0, 0], [4, 4, 4]));
        assert_eq!(u.volume(), 64);
    }
}
