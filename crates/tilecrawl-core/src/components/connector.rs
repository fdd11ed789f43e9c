//! Connector component - a socket on a tile's boundary.

use hecs::Entity;
use tilecrawl_logic::geometry::Pose;

/// Default socket opening, width × height in meters.
pub const DEFAULT_SOCKET_SIZE: [f32; 2] = [4.0, 4.0];

/// A directional socket through which two tiles can be joined.
///
/// The local pose faces out of the tile. Once `connected` is set the socket
/// never takes part in matching again unless backtracking releases it.
#[derive(Debug, Clone)]
pub struct Connector {
    /// Tile that owns this socket
    pub owner: Entity,
    /// Pose relative to the owning tile
    pub local: Pose,
    /// Opening width × height
    pub size: [f32; 2],
    pub connected: bool,
    /// Blocker or door placed on this socket during post-processing
    pub fixture: Option<Entity>,
}

impl Connector {
    pub fn new(owner: Entity, local: Pose, size: [f32; 2]) -> Self {
        Self {
            owner,
            local,
            size,
            connected: false,
            fixture: None,
        }
    }

    pub fn width(&self) -> f32 {
        self.size[0]
    }

    pub fn height(&self) -> f32 {
        self.size[1]
    }

    /// World pose given the owning tile's pose.
    pub fn world_pose(&self, tile_pose: &Pose) -> Pose {
        tile_pose.compose(&self.local)
    }

    /// Free for matching: not connected and not yet fitted.
    pub fn is_free(&self) -> bool {
        !self.connected && self.fixture.is_none()
    }
}
