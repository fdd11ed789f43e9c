//! Main path growth: start tile to exit tile.

use log::info;
use rand::Rng;

use crate::components::*;
use crate::engine::DungeonGenerator;
use crate::error::GenerationError;
use crate::generation::collision::Growth;
use crate::generation::DungeonState;
use crate::spatial::SpatialIndex;

impl<R: Rng, S: SpatialIndex> DungeonGenerator<R, S> {
    /// One main-path step. The last tile of a full-length path is an exit.
    pub(crate) fn step_main(&mut self) -> Result<(), GenerationError> {
        let target = self.config.main_length as usize;
        if self.main_finished || self.tiles.len() >= target {
            self.collect_available()?;
            self.state = DungeonState::GeneratingBranches;
            info!(
                "Main path done with {} tiles, {} open connectors for branching",
                self.tiles.len(),
                self.available.len()
            );
            return Ok(());
        }

        let kind = if self.tiles.len() + 1 == target {
            TileKind::Exit
        } else {
            TileKind::Regular
        };
        if self.grow(kind)? == Growth::Abandoned {
            self.main_finished = true;
        }
        Ok(())
    }

    /// Pool every still-unconnected socket on the main path.
    fn collect_available(&mut self) -> Result<(), GenerationError> {
        for socket in self.all_connectors()? {
            if !self.world.get::<&Connector>(socket)?.connected && !self.available.contains(&socket) {
                self.available.push(socket);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::TileCatalog;
    use crate::components::*;
    use crate::config::GeneratorConfig;
    use crate::engine::DungeonGenerator;
    use crate::generation::{Container, DungeonState};

    #[test]
    fn test_main_path_ends_in_exit() {
        let config = GeneratorConfig::default()
            .with_main_length(7)
            .with_branches(0, 0);
        let mut generator =
            DungeonGenerator::seeded(config, TileCatalog::builtin().unwrap(), 77).unwrap();
        while generator.state() < DungeonState::GeneratingBranches {
            generator.advance().unwrap();
        }
        let tiles = generator.generated_tiles();
        assert_eq!(tiles.len(), 7);
        assert_eq!(tiles[0].kind, TileKind::Start);
        assert_eq!(tiles[6].kind, TileKind::Exit);
        assert!(tiles[1..6].iter().all(|t| t.kind == TileKind::Regular));
        assert!(tiles.iter().all(|t| t.container == Container::Main));
    }

    #[test]
    fn test_pool_holds_only_open_main_sockets() {
        let config = GeneratorConfig::default().with_main_length(5);
        let mut generator =
            DungeonGenerator::seeded(config, TileCatalog::builtin().unwrap(), 5).unwrap();
        while generator.state() < DungeonState::GeneratingBranches {
            generator.advance().unwrap();
        }
        for &socket in generator.available_connectors() {
            let connector = generator.world().get::<&Connector>(socket).unwrap();
            assert!(!connector.connected);
            let owner = generator.tile_record(connector.owner).unwrap();
            assert_eq!(owner.container, Container::Main);
        }
    }
}
