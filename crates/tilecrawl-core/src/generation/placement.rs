//! Tile instantiation and connector linking.

use hecs::Entity;
use log::trace;
use rand::Rng;
use tilecrawl_logic::geometry::{Pose, Vec3};

use crate::components::*;
use crate::engine::DungeonGenerator;
use crate::error::GenerationError;
use crate::generation::TileRecord;
use crate::spatial::{Layer, SpatialIndex};

impl<R: Rng, S: SpatialIndex> DungeonGenerator<R, S> {
    /// Instantiate a random prefab of `kind` and record it.
    ///
    /// Start tiles get a random quarter-turn about the origin. Every other
    /// tile keeps an identity pose until [`connect`](Self::connect) places it,
    /// and records the current frontier as its origin.
    pub(crate) fn create_tile(&mut self, kind: TileKind) -> Result<Entity, GenerationError> {
        let prefab = self.catalog.sample_tile(kind, &mut self.rng)?.clone();
        let origin = match kind {
            TileKind::Start => None,
            _ => Some(self.frontier.ok_or(GenerationError::NoFrontier)?),
        };

        let mut placement = Placement::new(&prefab.name, kind);
        if kind == TileKind::Start {
            let quarter = self.rng.gen_range(0..4u8);
            placement = placement.with_pose(Pose::new(Vec3::ZERO, f32::from(quarter) * 90.0));
        }

        let tile = self.world.spawn((
            placement,
            Footprint {
                local: prefab.bounds,
            },
            Sockets::default(),
        ));
        if let Some(color) = prefab.light {
            self.world.insert_one(tile, RoomLight::new(color))?;
        }

        let sockets: Vec<Entity> = prefab
            .connectors
            .iter()
            .map(|spec| {
                self.world
                    .spawn((Connector::new(tile, spec.local_pose(), spec.size),))
            })
            .collect();
        self.world.get::<&mut Sockets>(tile)?.0 = sockets;

        self.tiles
            .push(TileRecord::new(tile, origin, kind, self.container));
        trace!("Created {} tile '{}' ({:?})", kind, prefab.name, tile);
        Ok(tile)
    }

    /// Join a free socket on `from` to a free socket on `to`, moving `to` so
    /// the two sockets coincide face to face.
    ///
    /// Returns the socket used on `from`, or `None` when either tile has no
    /// free socket (nothing is marked in that case).
    pub(crate) fn connect(
        &mut self,
        from: Entity,
        to: Entity,
    ) -> Result<Option<Entity>, GenerationError> {
        let Some(from_socket) = self.pick_free_socket(from)? else {
            return Ok(None);
        };
        let Some(to_socket) = self.pick_free_socket(to)? else {
            return Ok(None);
        };

        self.world.get::<&mut Connector>(from_socket)?.connected = true;
        self.world.get::<&mut Connector>(to_socket)?.connected = true;
        self.attach_collider(from)?;

        let socket = self.connector_pose(from_socket)?;
        let local = self.world.get::<&Connector>(to_socket)?.local;
        self.world.get::<&mut Placement>(to)?.pose = Pose::mate(&socket, &local);

        let record = self
            .tiles
            .get_mut(to)
            .ok_or(GenerationError::UnknownTile(to))?;
        record.connector = Some(from_socket);
        Ok(Some(from_socket))
    }

    /// Uniformly pick a free socket on `tile`.
    fn pick_free_socket(&mut self, tile: Entity) -> Result<Option<Entity>, GenerationError> {
        let mut free = Vec::new();
        for socket in self.connectors_of(tile)? {
            if self.world.get::<&Connector>(socket)?.is_free() {
                free.push(socket);
            }
        }
        if free.is_empty() {
            return Ok(None);
        }
        Ok(Some(free[self.rng.gen_range(0..free.len())]))
    }

    /// Give `tile` a collision volume in the spatial index, once.
    pub(crate) fn attach_collider(&mut self, tile: Entity) -> Result<(), GenerationError> {
        if self.world.get::<&Collider>(tile).is_ok() {
            return Ok(());
        }
        self.world.insert_one(tile, Collider)?;
        let bounds = self.tile_bounds(tile)?;
        self.index.insert(tile, bounds, Layer::Tile);
        Ok(())
    }
}
