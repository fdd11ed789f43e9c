//! Tile components: placement, footprint, sockets, lights.

use super::common::Color;
use hecs::Entity;
use serde::{Deserialize, Serialize};
use tilecrawl_logic::geometry::{Aabb, Pose};

/// Which catalog a tile was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Start,
    Regular,
    Exit,
}

impl std::fmt::Display for TileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TileKind::Start => "start",
            TileKind::Regular => "regular",
            TileKind::Exit => "exit",
        };
        f.write_str(name)
    }
}

/// Placement component - where a tile instance sits in the level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement {
    /// Prefab name the tile was instantiated from
    pub prefab: String,
    pub kind: TileKind,
    /// World pose. Neutral (identity) until the tile is linked.
    pub pose: Pose,
}

impl Placement {
    pub fn new(prefab: impl Into<String>, kind: TileKind) -> Self {
        Self {
            prefab: prefab.into(),
            kind,
            pose: Pose::IDENTITY,
        }
    }

    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }
}

/// Local-space bounds of the tile geometry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Footprint {
    pub local: Aabb,
}

impl Footprint {
    pub fn world(&self, pose: &Pose) -> Aabb {
        self.local.transformed(pose)
    }
}

/// Connector entities owned by a tile, in prefab order.
#[derive(Debug, Clone, Default)]
pub struct Sockets(pub Vec<Entity>);

/// Marker for the temporary bounding volume used during collision checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Collider;

/// Room light. `base` is the prefab colour, `color` the current one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoomLight {
    pub base: Color,
    pub color: Color,
}

impl RoomLight {
    pub fn new(base: Color) -> Self {
        Self { base, color: base }
    }

    pub fn restore(&mut self) {
        self.color = self.base;
    }
}
