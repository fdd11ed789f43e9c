//! Debug room lighting: tint each tile by the phase that placed it.

use hecs::Entity;
use rand::Rng;

use crate::components::*;
use crate::engine::DungeonGenerator;
use crate::error::GenerationError;
use crate::generation::Container;
use crate::spatial::SpatialIndex;

/// Phase colour for a tile. Retries show doubled intensity, except on the
/// exit tile.
pub fn phase_color(kind: TileKind, container: Container, retry: bool) -> Color {
    let base = match (kind, container) {
        (TileKind::Start, _) => Color::CYAN,
        (TileKind::Exit, _) => return Color::MAGENTA,
        (TileKind::Regular, Container::Main) => Color::YELLOW,
        (TileKind::Regular, Container::Branch(_)) => Color::GREEN,
    };
    if retry {
        base.scaled(2.0)
    } else {
        base
    }
}

impl<R: Rng, S: SpatialIndex> DungeonGenerator<R, S> {
    pub(crate) fn paint_phase(
        &mut self,
        tile: Entity,
        kind: TileKind,
        retry: bool,
    ) -> Result<(), GenerationError> {
        if !self.config.debug_lighting {
            return Ok(());
        }
        let color = phase_color(kind, self.container, retry);
        if let Ok(mut light) = self.world.get::<&mut RoomLight>(tile) {
            light.color = color;
        }
        Ok(())
    }

    /// Put every room light back to its prefab colour.
    pub(crate) fn restore_lighting(&mut self) {
        if !(self.config.debug_lighting && self.config.restore_lighting) {
            return;
        }
        for (_, light) in self.world.query_mut::<&mut RoomLight>() {
            light.restore();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TileCatalog;
    use crate::config::GeneratorConfig;

    #[test]
    fn test_phase_colors() {
        assert_eq!(phase_color(TileKind::Start, Container::Main, false), Color::CYAN);
        assert_eq!(phase_color(TileKind::Exit, Container::Main, true), Color::MAGENTA);
        assert_eq!(
            phase_color(TileKind::Regular, Container::Branch(2), false),
            Color::GREEN
        );
        assert_eq!(
            phase_color(TileKind::Regular, Container::Main, true),
            Color::YELLOW.scaled(2.0)
        );
    }

    fn lights(generator: &DungeonGenerator<rand::rngs::StdRng>) -> Vec<RoomLight> {
        generator
            .world()
            .query::<&RoomLight>()
            .iter()
            .map(|(_, l)| *l)
            .collect()
    }

    #[test]
    fn test_lights_restored_after_generation() {
        let config = GeneratorConfig::default()
            .with_main_length(5)
            .with_debug_lighting();
        let mut generator =
            DungeonGenerator::seeded(config, TileCatalog::builtin().unwrap(), 2).unwrap();
        generator.advance().unwrap();
        assert!(lights(&generator).iter().all(|l| l.color == Color::CYAN));

        generator.run_to_completion().unwrap();
        assert!(lights(&generator).iter().all(|l| l.color == l.base));
    }

    #[test]
    fn test_lights_kept_when_not_restoring() {
        let config = GeneratorConfig::default()
            .with_main_length(5)
            .with_branches(0, 0)
            .with_debug_lighting()
            .with_restore_lighting(false);
        let mut generator =
            DungeonGenerator::seeded(config, TileCatalog::builtin().unwrap(), 2).unwrap();
        generator.run_to_completion().unwrap();
        assert!(lights(&generator).iter().any(|l| l.color == Color::MAGENTA));
    }
}
