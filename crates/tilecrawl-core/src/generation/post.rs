//! Post-processing: strip collision volumes, seal open sockets, hang doors.

use hecs::Entity;
use log::{debug, info};
use rand::Rng;
use tilecrawl_logic::geometry::{Aabb, Vec3, COLLISION_TOLERANCE};

use crate::catalog::FixturePrefab;
use crate::components::*;
use crate::engine::DungeonGenerator;
use crate::error::GenerationError;
use crate::generation::DungeonState;
use crate::spatial::{Layer, SpatialIndex};

impl<R: Rng, S: SpatialIndex> DungeonGenerator<R, S> {
    /// Cleanup phase. Runs once, then the level is complete.
    pub(crate) fn finish(&mut self) -> Result<(), GenerationError> {
        self.restore_lighting();
        let stripped = self.cleanup();
        let sealed = self.seal_unconnected()?;
        let doors = self.spawn_doors(self.config.door_percent)?;
        self.state = DungeonState::Completed;
        info!(
            "Level complete: {} tiles ({} main path), {} sockets sealed, {} doors, {} colliders stripped",
            self.tiles.len(),
            self.main_path_len(),
            sealed,
            doors,
            stripped
        );
        Ok(())
    }

    /// Remove the temporary collision volume from every tile, unless the
    /// configuration asks to keep them. Returns how many were removed.
    pub fn cleanup(&mut self) -> usize {
        if self.config.keep_colliders {
            return 0;
        }
        let tiles: Vec<Entity> = self.tiles.iter().map(|r| r.tile).collect();
        let mut stripped = 0;
        for tile in tiles {
            if self.world.remove_one::<Collider>(tile).is_ok() {
                stripped += 1;
            }
            self.index.remove(tile);
        }
        stripped
    }

    /// Fit a random blocker into every socket that is neither connected nor
    /// already fitted. Safe to call again; returns how many were sealed.
    pub fn seal_unconnected(&mut self) -> Result<usize, GenerationError> {
        let mut sealed = 0;
        for socket in self.all_connectors()? {
            if !self.world.get::<&Connector>(socket)?.is_free() {
                continue;
            }
            let prefab = self
                .catalog
                .sample_fixture(FixtureKind::Blocker, &mut self.rng)?
                .clone();
            self.place_fixture(socket, FixtureKind::Blocker, &prefab)?;
            sealed += 1;
        }
        debug!("Sealed {} open sockets", sealed);
        Ok(sealed)
    }

    /// Roll a door onto each connected, unfitted socket with `door_percent`
    /// chance. A link whose partner socket already carries a door is skipped,
    /// so every link gets at most one.
    pub fn spawn_doors(&mut self, door_percent: u32) -> Result<usize, GenerationError> {
        if door_percent == 0 {
            return Ok(0);
        }
        let chance = door_percent.min(100) as f32;
        let mut placed = 0;
        for socket in self.all_connectors()? {
            let (connected, fitted, width) = {
                let connector = self.world.get::<&Connector>(socket)?;
                (connector.connected, connector.fixture.is_some(), connector.width())
            };
            if !connected || fitted {
                continue;
            }
            if self.rng.gen_range(0.0..100.0f32) >= chance {
                continue;
            }

            let pose = self.connector_pose(socket)?;
            let probe = Aabb::from_center(
                pose.position + Vec3::UP * 0.5,
                Vec3::new(width / 2.0, 1.0, width / 2.0),
            )
            .shrunk(COLLISION_TOLERANCE);
            if !self
                .index
                .query(probe.center(), probe.half_extents(), Layer::Door)
                .is_empty()
            {
                continue;
            }

            let prefab = self
                .catalog
                .sample_fixture(FixtureKind::Door, &mut self.rng)?
                .clone();
            self.place_fixture(socket, FixtureKind::Door, &prefab)?;
            placed += 1;
        }
        debug!("Placed {} doors", placed);
        Ok(placed)
    }

    fn place_fixture(
        &mut self,
        socket: Entity,
        kind: FixtureKind,
        prefab: &FixturePrefab,
    ) -> Result<Entity, GenerationError> {
        let pose = self.connector_pose(socket)?;
        let size = self.world.get::<&Connector>(socket)?.size;
        let fixture = Fixture::fitted(kind, prefab.name.clone(), socket, pose, size, prefab.thickness);
        let volume = fixture.volume;

        let entity = self.world.spawn((fixture,));
        self.world.get::<&mut Connector>(socket)?.fixture = Some(entity);
        if kind == FixtureKind::Door {
            self.index.insert(entity, volume, Layer::Door);
        }
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TileCatalog;
    use crate::config::GeneratorConfig;

    fn complete(config: GeneratorConfig, seed: u64) -> DungeonGenerator<rand::rngs::StdRng> {
        let mut generator =
            DungeonGenerator::seeded(config, TileCatalog::builtin().unwrap(), seed).unwrap();
        generator.run_to_completion().unwrap();
        generator
    }

    #[test]
    fn test_sealing_is_idempotent() {
        let mut generator = complete(GeneratorConfig::default().with_main_length(6), 9);
        let blockers = generator.fixture_count(FixtureKind::Blocker);
        assert_eq!(generator.seal_unconnected().unwrap(), 0);
        assert_eq!(generator.fixture_count(FixtureKind::Blocker), blockers);
    }

    #[test]
    fn test_colliders_stripped_by_default() {
        let generator = complete(GeneratorConfig::default().with_main_length(6), 10);
        assert_eq!(generator.world().query::<&Collider>().iter().count(), 0);
        assert_eq!(generator.index().count(Layer::Tile), 0);
    }

    #[test]
    fn test_colliders_kept_on_request() {
        let generator = complete(
            GeneratorConfig::default()
                .with_main_length(6)
                .with_kept_colliders(),
            10,
        );
        let tiles = generator.generated_tiles().len();
        assert_eq!(generator.world().query::<&Collider>().iter().count(), tiles);
        assert_eq!(generator.index().count(Layer::Tile), tiles);
    }

    #[test]
    fn test_zero_door_chance_places_no_doors() {
        let generator = complete(GeneratorConfig::default().with_door_percent(0), 14);
        assert_eq!(generator.fixture_count(FixtureKind::Door), 0);
    }

    #[test]
    fn test_second_door_pass_adds_nothing_at_full_chance() {
        let mut generator = complete(GeneratorConfig::default().with_door_percent(100), 15);
        assert_eq!(generator.spawn_doors(100).unwrap(), 0);
    }
}
