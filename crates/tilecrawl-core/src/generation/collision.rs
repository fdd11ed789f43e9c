//! Collision checks, rejection, and the backtracking ladder.
//!
//! A growth step builds one tile, links it and checks it against everything
//! already placed. A rejected tile is destroyed and counted. After
//! `max_attempts` consecutive rejections the generator backtracks:
//!
//! 1. If the tile being grown from is not the chain root, discard it and
//!    retry from its origin (on the main path the origin becomes the new root
//!    when it already was the root).
//! 2. On the main path, a root with an origin hands the root role to it.
//! 3. Otherwise restart from a tile owning a random pooled connector.
//! 4. With nothing left to try, the chain is abandoned and ends short.
//!    The rejection counter is cleared so the next chain starts from zero,
//!    and `attempts()` reads 0 once a blocked level completes.
//!
//! Every rung either removes a tile or moves the root strictly toward the
//! start tile or consumes a pooled connector, so generation always ends.

use hecs::Entity;
use log::{debug, warn};
use rand::Rng;
use tilecrawl_logic::geometry::COLLISION_TOLERANCE;

use crate::components::*;
use crate::engine::DungeonGenerator;
use crate::error::GenerationError;
use crate::generation::{Container, GenerationEvent, TileRecord};
use crate::spatial::{Layer, SpatialIndex};

/// Outcome of one growth step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Growth {
    Placed(Entity),
    /// The attempt failed; growth continues on the next step.
    Rejected,
    /// Backtracking ran out of options; the chain is over.
    Abandoned,
}

impl<R: Rng, S: SpatialIndex> DungeonGenerator<R, S> {
    /// Build, link, and check one tile of `kind` grown from the frontier.
    pub(crate) fn grow(&mut self, kind: TileKind) -> Result<Growth, GenerationError> {
        let from = self.frontier.ok_or(GenerationError::NoFrontier)?;
        let retry = self.attempts > 0;

        let to = self.create_tile(kind)?;
        self.paint_phase(to, kind, retry)?;

        let clear = match self.connect(from, to)? {
            Some(_) => self.collision_check(from, to)?,
            None => false,
        };
        if clear {
            self.attempts = 0;
            self.frontier = Some(to);
            debug!("{}: placed {} tile {:?}", self.container, kind, to);
            return Ok(Growth::Placed(to));
        }
        self.reject(from, to)
    }

    /// True when `to` overlaps nothing but itself and the tile it grew from.
    pub(crate) fn collision_check(&mut self, from: Entity, to: Entity) -> Result<bool, GenerationError> {
        self.attach_collider(to)?;
        let probe = self.tile_bounds(to)?.shrunk(COLLISION_TOLERANCE);
        let hits = self
            .index
            .query(probe.center(), probe.half_extents(), Layer::Tile);
        Ok(hits.iter().all(|&hit| hit == from || hit == to))
    }

    fn reject(&mut self, from: Entity, to: Entity) -> Result<Growth, GenerationError> {
        self.attempts = (self.attempts + 1).min(self.config.max_attempts);
        self.discard_tile(to)?;
        debug!(
            "{}: rejected tile from {:?} ({}/{})",
            self.container, from, self.attempts, self.config.max_attempts
        );
        if self.attempts < self.config.max_attempts {
            return Ok(Growth::Rejected);
        }
        self.backtrack(from)
    }

    fn backtrack(&mut self, from: Entity) -> Result<Growth, GenerationError> {
        let main = self.container == Container::Main;

        if Some(from) != self.root {
            let record = self.discard_tile(from)?;
            self.events.push(GenerationEvent::Backtracked {
                container: self.container,
                discarded: from,
            });
            debug!("{}: backtracked past {:?}", self.container, from);

            match record.origin {
                Some(origin) if Some(origin) != self.root => {
                    self.frontier = Some(origin);
                    return Ok(Growth::Rejected);
                }
                Some(origin) if main => {
                    self.reroot(origin);
                    return Ok(Growth::Rejected);
                }
                _ => {}
            }
        } else if main {
            let origin = self
                .tiles
                .get(from)
                .ok_or(GenerationError::UnknownTile(from))?
                .origin;
            if let Some(origin) = origin {
                self.reroot(origin);
                return Ok(Growth::Rejected);
            }
        }

        if let Some(tile) = self.take_available()? {
            self.reroot(tile);
            return Ok(Growth::Rejected);
        }
        self.abandon()
    }

    fn reroot(&mut self, tile: Entity) {
        self.root = Some(tile);
        self.frontier = Some(tile);
    }

    fn abandon(&mut self) -> Result<Growth, GenerationError> {
        let tiles = self.tiles.count_in(self.container);
        warn!(
            "{}: no frontier left after {} rejections, ending with {} tiles",
            self.container, self.config.max_attempts, tiles
        );
        self.events.push(GenerationEvent::FrontierExhausted {
            container: self.container,
            tiles,
        });
        self.attempts = 0;
        Ok(Growth::Abandoned)
    }

    /// Pop a random pooled connector and return the tile that owns it.
    pub(crate) fn take_available(&mut self) -> Result<Option<Entity>, GenerationError> {
        if self.available.is_empty() {
            return Ok(None);
        }
        let socket = self
            .available
            .remove(self.rng.gen_range(0..self.available.len()));
        Ok(Some(self.world.get::<&Connector>(socket)?.owner))
    }

    /// Remove a tile and everything it owns, releasing the socket on its
    /// origin that it was attached through.
    pub(crate) fn discard_tile(&mut self, tile: Entity) -> Result<TileRecord, GenerationError> {
        let record = self
            .tiles
            .remove(tile)
            .ok_or(GenerationError::UnknownTile(tile))?;
        if let Some(socket) = record.connector {
            self.world.get::<&mut Connector>(socket)?.connected = false;
        }

        let sockets = self.connectors_of(tile)?;
        self.available.retain(|c| !sockets.contains(c));
        self.index.remove(tile);
        for socket in sockets {
            self.world.despawn(socket)?;
        }
        self.world.despawn(tile)?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TileCatalog;
    use crate::config::GeneratorConfig;
    use crate::generation::DungeonState;

    fn generator(seed: u64) -> DungeonGenerator<rand::rngs::StdRng> {
        let config = GeneratorConfig::default()
            .with_main_length(6)
            .with_branches(0, 0);
        DungeonGenerator::seeded(config, TileCatalog::builtin().unwrap(), seed).unwrap()
    }

    #[test]
    fn test_discard_releases_origin_socket() {
        let mut generator = generator(4);
        generator.advance().unwrap();
        let start = generator.frontier().unwrap();
        let next = generator.create_tile(TileKind::Regular).unwrap();
        let socket = generator.connect(start, next).unwrap().unwrap();
        assert!(generator.world().get::<&Connector>(socket).unwrap().connected);

        generator.discard_tile(next).unwrap();
        assert!(!generator.world().get::<&Connector>(socket).unwrap().connected);
        assert!(!generator.world().contains(next));
        assert!(generator.tile_record(next).is_none());
        assert_eq!(generator.generated_tiles().len(), 1);
    }

    #[test]
    fn test_placed_tile_does_not_overlap() {
        let mut generator = generator(12);
        generator.advance().unwrap();
        while generator.state() == DungeonState::GeneratingMain {
            generator.advance().unwrap();
        }
        let records = generator.generated_tiles().to_vec();
        for (i, a) in records.iter().enumerate() {
            for b in &records[i + 1..] {
                let ba = generator.tile_bounds(a.tile).unwrap();
                let bb = generator.tile_bounds(b.tile).unwrap();
                assert!(!ba.overlaps(&bb, COLLISION_TOLERANCE));
            }
        }
    }

    #[test]
    fn test_attempts_reset_after_success() {
        let mut generator = generator(30);
        generator.advance().unwrap();
        while generator.state() == DungeonState::GeneratingMain {
            let before = generator.generated_tiles().len();
            generator.advance().unwrap();
            if generator.generated_tiles().len() > before {
                assert_eq!(generator.attempts(), 0);
            }
            assert!(generator.attempts() <= generator.config().max_attempts);
        }
    }
}
