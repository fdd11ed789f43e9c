//! Rigid-body geometry for modular tiles.
//!
//! Tiles only ever rotate about the vertical axis, so a pose is a translation
//! plus a yaw angle. Yaw follows the usual left-handed game convention:
//! forward `(0, 0, 1)` rotated by 90° becomes `(1, 0, 0)`.

use serde::{Deserialize, Serialize};

/// Overlap depth below which two volumes are considered touching, not colliding.
pub const COLLISION_TOLERANCE: f32 = 0.1;

/// Values this close to a whole number are snapped after rotation.
const SNAP_EPSILON: f32 = 1e-5;

/// 3D vector (meters). `y` is up.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };
    pub const UP: Self = Self { x: 0.0, y: 1.0, z: 0.0 };
    pub const FORWARD: Self = Self { x: 0.0, y: 0.0, z: 1.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance_squared(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance(&self, other: &Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    pub fn abs(&self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Rotate about +Y by `yaw` degrees.
    pub fn rotate_yaw(&self, yaw: f32) -> Self {
        let (sin, cos) = snapped_sin_cos(yaw);
        Self {
            x: snap(self.x * cos + self.z * sin),
            y: self.y,
            z: snap(-self.x * sin + self.z * cos),
        }
    }

    /// True if every component is within `epsilon` of `other`.
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.z - other.z).abs() <= epsilon
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

fn snap(v: f32) -> f32 {
    let r = v.round();
    if (v - r).abs() < SNAP_EPSILON {
        r
    } else {
        v
    }
}

fn snapped_sin_cos(yaw: f32) -> (f32, f32) {
    let (sin, cos) = yaw.to_radians().sin_cos();
    (snap(sin), snap(cos))
}

/// Normalize an angle in degrees to `[0, 360)`.
pub fn normalize_yaw(yaw: f32) -> f32 {
    let y = snap(yaw.rem_euclid(360.0));
    if y >= 360.0 {
        0.0
    } else {
        y
    }
}

/// Position plus yaw, either in world space or relative to a parent pose.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    /// Degrees about +Y.
    #[serde(default)]
    pub yaw: f32,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        yaw: 0.0,
    };

    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            yaw: normalize_yaw(yaw),
        }
    }

    /// Transform a point from this pose's local space into the parent space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + local.rotate_yaw(self.yaw)
    }

    /// The pose of `child` (expressed relative to `self`) in the parent space.
    pub fn compose(&self, child: &Pose) -> Pose {
        Pose::new(self.transform_point(child.position), self.yaw + child.yaw)
    }

    /// Unit vector this pose faces along.
    pub fn forward(&self) -> Vec3 {
        Vec3::FORWARD.rotate_yaw(self.yaw)
    }

    /// Pose a tile must take so that its connector at `connector_local`
    /// sits exactly on `socket_world`, facing the opposite way.
    pub fn mate(socket_world: &Pose, connector_local: &Pose) -> Pose {
        let yaw = normalize_yaw(socket_world.yaw + 180.0 - connector_local.yaw);
        let offset = connector_local.position.rotate_yaw(yaw);
        Pose::new(socket_world.position - offset, yaw)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn depth(&self) -> f32 {
        self.max.z - self.min.z
    }

    pub fn is_positive(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0 && self.depth() > 0.0
    }

    pub fn contains(&self, point: &Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Shrink every face inward by `amount` (never past the center).
    pub fn shrunk(&self, amount: f32) -> Self {
        let half = self.half_extents();
        let shrink = Vec3::new(
            amount.min(half.x),
            amount.min(half.y),
            amount.min(half.z),
        );
        Self::from_center(self.center(), half - shrink)
    }

    /// World-space box enclosing this local box under `pose`.
    pub fn transformed(&self, pose: &Pose) -> Self {
        let center = pose.transform_point(self.center());
        let half = self.half_extents();
        let (sin, cos) = snapped_sin_cos(pose.yaw);
        let (sin, cos) = (sin.abs(), cos.abs());
        let world_half = Vec3::new(
            cos * half.x + sin * half.z,
            half.y,
            sin * half.x + cos * half.z,
        );
        Self::from_center(center, world_half)
    }

    /// Strict intersection: touching faces do not count.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
            && self.min.z < other.max.z
            && other.min.z < self.max.z
    }

    /// True if the boxes interpenetrate by more than `tolerance` on every axis.
    pub fn overlaps(&self, other: &Aabb, tolerance: f32) -> bool {
        self.min.x + tolerance < other.max.x
            && other.min.x + tolerance < self.max.x
            && self.min.y + tolerance < other.max.y
            && other.min.y + tolerance < self.max.y
            && self.min.z + tolerance < other.max.z
            && other.min.z + tolerance < self.max.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);

        let sum = a + b;
        assert_eq!(sum, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vec3::new(3.0, 3.0, 3.0));
        assert_eq!(a * 2.0, Vec3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn test_quarter_turns_are_exact() {
        let v = Vec3::FORWARD;
        assert_eq!(v.rotate_yaw(90.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(v.rotate_yaw(180.0), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(v.rotate_yaw(270.0), Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(v.rotate_yaw(-90.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_normalize_yaw() {
        assert_eq!(normalize_yaw(-90.0), 270.0);
        assert_eq!(normalize_yaw(360.0), 0.0);
        assert_eq!(normalize_yaw(450.0), 90.0);
    }

    #[test]
    fn test_compose() {
        let parent = Pose::new(Vec3::new(10.0, 0.0, 0.0), 90.0);
        let child = Pose::new(Vec3::new(0.0, 0.0, 4.0), 0.0);
        let world = parent.compose(&child);
        assert_eq!(world.position, Vec3::new(14.0, 0.0, 0.0));
        assert_eq!(world.yaw, 90.0);
    }

    #[test]
    fn test_mate_places_connectors_face_to_face() {
        // Socket on the +z wall of a tile at the origin.
        let socket = Pose::new(Vec3::new(0.0, 0.0, 4.0), 0.0);
        // Incoming tile's connector sits on its own +x wall.
        let local = Pose::new(Vec3::new(4.0, 0.0, 0.0), 90.0);

        let pose = Pose::mate(&socket, &local);
        let connector_world = pose.compose(&local);

        assert!(connector_world.position.approx_eq(&socket.position, 1e-4));
        assert_eq!(normalize_yaw(connector_world.yaw - socket.yaw), 180.0);
        // The new tile lies beyond the socket, not on top of the first tile.
        assert!(pose.position.z > socket.position.z);
    }

    #[test]
    fn test_transformed_bounds_swap_extents() {
        let local = Aabb::new(Vec3::new(-2.0, 0.0, -4.0), Vec3::new(2.0, 4.0, 4.0));
        let world = local.transformed(&Pose::new(Vec3::new(10.0, 0.0, 0.0), 90.0));
        assert_eq!(world.min, Vec3::new(6.0, 0.0, -2.0));
        assert_eq!(world.max, Vec3::new(14.0, 4.0, 2.0));
    }

    #[test]
    fn test_touching_is_not_overlap() {
        let a = Aabb::new(Vec3::ZERO, Vec3::new(4.0, 4.0, 4.0));
        let b = Aabb::new(Vec3::new(4.0, 0.0, 0.0), Vec3::new(8.0, 4.0, 4.0));
        assert!(!a.intersects(&b));
        assert!(!a.overlaps(&b, COLLISION_TOLERANCE));

        let c = Aabb::new(Vec3::new(3.95, 0.0, 0.0), Vec3::new(8.0, 4.0, 4.0));
        assert!(a.intersects(&c));
        assert!(!a.overlaps(&c, COLLISION_TOLERANCE));

        let d = Aabb::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(8.0, 4.0, 4.0));
        assert!(a.overlaps(&d, COLLISION_TOLERANCE));
    }

    #[test]
    fn test_shrunk_never_inverts() {
        let a = Aabb::from_center(Vec3::ZERO, Vec3::new(1.0, 0.05, 1.0));
        let s = a.shrunk(0.1);
        assert!(s.min.y <= s.max.y);
        assert!((s.half_extents().x - 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_bounding_box_contains() {
        let bb = Aabb::new(Vec3::ZERO, Vec3::new(10.0, 10.0, 10.0));
        assert!(bb.contains(&Vec3::new(5.0, 5.0, 5.0)));
        assert!(!bb.contains(&Vec3::new(15.0, 5.0, 5.0)));
    }
}
