//! Fixture component - a blocker or door fitted into a socket.

use hecs::Entity;
use tilecrawl_logic::geometry::{Aabb, Pose, Vec3};

pub use tilecrawl_logic::validation::FixtureKind;

/// A structural piece placed at a connector during post-processing.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub kind: FixtureKind,
    pub prefab: String,
    /// Socket the piece sits in
    pub socket: Entity,
    /// World pose, identical to the socket's world pose
    pub pose: Pose,
    /// World-space volume (doors register it on the `Door` layer)
    pub volume: Aabb,
}

impl Fixture {
    /// Build a fixture filling a `width × height` opening with the given thickness.
    pub fn fitted(
        kind: FixtureKind,
        prefab: impl Into<String>,
        socket: Entity,
        pose: Pose,
        size: [f32; 2],
        thickness: f32,
    ) -> Self {
        let local = Aabb::new(
            Vec3::new(-size[0] / 2.0, 0.0, -thickness / 2.0),
            Vec3::new(size[0] / 2.0, size[1], thickness / 2.0),
        );
        Self {
            kind,
            prefab: prefab.into(),
            socket,
            pose,
            volume: local.transformed(&pose),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fitted_volume_rotates_with_socket() {
        let mut world = hecs::World::new();
        let socket = world.spawn(());
        let door = Fixture::fitted(
            FixtureKind::Door,
            "Wooden Door",
            socket,
            Pose::new(Vec3::new(4.0, 0.0, 0.0), 90.0),
            [4.0, 4.0],
            0.2,
        );
        assert!((door.volume.width() - 0.2).abs() < 1e-5);
        assert!((door.volume.depth() - 4.0).abs() < 1e-5);
        assert_eq!(door.volume.height(), 4.0);
    }
}
