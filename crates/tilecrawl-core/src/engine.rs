//! Dungeon generator - main entry point for building a level

use hecs::{Entity, World};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::time::Duration;
use tilecrawl_logic::geometry::{Aabb, Pose};
use tilecrawl_logic::validation::{FixtureKind, SocketInfo, TileFootprint};

use crate::catalog::TileCatalog;
use crate::components::*;
use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::generation::{Container, DungeonState, GenerationEvent, TileRecord, TileRegistry};
use crate::spatial::{GridIndex, SpatialIndex};

/// Progress through the branch currently being grown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BranchProgress {
    /// Placements still owed to this branch
    pub remaining: u32,
}

/// Stepwise level generator.
///
/// Owns all generation state. Call [`advance`](Self::advance) once per pacing
/// tick until it returns [`DungeonState::Completed`].
pub struct DungeonGenerator<R: Rng, S: SpatialIndex = GridIndex> {
    /// Placed tiles, connectors and fixtures
    pub(crate) world: World,
    pub(crate) config: GeneratorConfig,
    pub(crate) catalog: TileCatalog,
    pub(crate) rng: R,
    pub(crate) index: S,
    pub(crate) state: DungeonState,
    pub(crate) tiles: TileRegistry,
    /// Unconnected main-path sockets eligible to seed a branch
    pub(crate) available: Vec<Entity>,
    /// Consecutive rejected placements since the last success
    pub(crate) attempts: u32,
    /// First tile of the chain being grown
    pub(crate) root: Option<Entity>,
    /// Tile the next placement grows from
    pub(crate) frontier: Option<Entity>,
    pub(crate) container: Container,
    pub(crate) main_finished: bool,
    pub(crate) branch: Option<BranchProgress>,
    pub(crate) branches_started: u32,
    pub(crate) events: Vec<GenerationEvent>,
}

impl DungeonGenerator<StdRng, GridIndex> {
    /// Generator with a seeded standard RNG and a default grid index.
    pub fn seeded(
        config: GeneratorConfig,
        catalog: TileCatalog,
        seed: u64,
    ) -> Result<Self, GenerationError> {
        Self::new(config, catalog, StdRng::seed_from_u64(seed), GridIndex::default())
    }
}

impl<R: Rng, S: SpatialIndex> DungeonGenerator<R, S> {
    /// Create an inactive generator. Fails fast on bad limits or an unusable catalog.
    pub fn new(
        config: GeneratorConfig,
        catalog: TileCatalog,
        rng: R,
        index: S,
    ) -> Result<Self, GenerationError> {
        config.validate()?;
        catalog.validate(config.door_percent > 0)?;
        Ok(Self {
            world: World::new(),
            config,
            catalog,
            rng,
            index,
            state: DungeonState::Inactive,
            tiles: TileRegistry::new(),
            available: Vec::new(),
            attempts: 0,
            root: None,
            frontier: None,
            container: Container::Main,
            main_finished: false,
            branch: None,
            branches_started: 0,
            events: Vec::new(),
        })
    }

    /// Do one unit of work and return the resulting state.
    ///
    /// While growing, one unit is a single tile build + link + collision
    /// check, including any rollback it triggers.
    pub fn advance(&mut self) -> Result<DungeonState, GenerationError> {
        match self.state {
            DungeonState::Inactive => self.begin()?,
            DungeonState::GeneratingMain => self.step_main()?,
            DungeonState::GeneratingBranches => self.step_branches()?,
            DungeonState::Cleanup => self.finish()?,
            DungeonState::Completed => {}
        }
        Ok(self.state)
    }

    /// Advance until completion, without pacing.
    pub fn run_to_completion(&mut self) -> Result<DungeonState, GenerationError> {
        while self.advance()? != DungeonState::Completed {}
        Ok(self.state)
    }

    /// Throw the level away and return to `Inactive`.
    pub fn reset(&mut self) {
        self.world.clear();
        self.index.clear();
        self.tiles.clear();
        self.available.clear();
        self.attempts = 0;
        self.root = None;
        self.frontier = None;
        self.container = Container::Main;
        self.main_finished = false;
        self.branch = None;
        self.branches_started = 0;
        self.events.clear();
        self.state = DungeonState::Inactive;
    }

    fn begin(&mut self) -> Result<(), GenerationError> {
        self.container = Container::Main;
        let start = self.create_tile(TileKind::Start)?;
        self.paint_phase(start, TileKind::Start, false)?;
        self.root = Some(start);
        self.frontier = Some(start);
        self.state = DungeonState::GeneratingMain;
        info!(
            "Generating main path: {} tiles, then {} branches of {}",
            self.config.main_length, self.config.num_branches, self.config.branch_length
        );
        Ok(())
    }

    // ── Read-only views ─────────────────────────────────────────────────

    pub fn state(&self) -> DungeonState {
        self.state
    }

    /// Placed tiles in generation order.
    pub fn generated_tiles(&self) -> &[TileRecord] {
        self.tiles.records()
    }

    pub fn tile_record(&self, tile: Entity) -> Option<&TileRecord> {
        self.tiles.get(tile)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn available_connectors(&self) -> &[Entity] {
        &self.available
    }

    pub fn events(&self) -> &[GenerationEvent] {
        &self.events
    }

    pub fn frontier(&self) -> Option<Entity> {
        self.frontier
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    pub fn index(&self) -> &S {
        &self.index
    }

    pub fn pacing_delay(&self) -> Duration {
        self.config.pacing_delay()
    }

    /// Tiles in the main-path container.
    pub fn main_path_len(&self) -> usize {
        self.tiles.count_in(Container::Main)
    }

    /// True once any chain ended short because backtracking ran out of frontiers.
    pub fn frontier_exhausted(&self, container: Container) -> bool {
        self.events.iter().any(|e| {
            matches!(e, GenerationEvent::FrontierExhausted { container: c, .. } if *c == container)
        })
    }

    /// World-space bounds of a tile.
    pub fn tile_bounds(&self, tile: Entity) -> Result<Aabb, GenerationError> {
        let pose = self.world.get::<&Placement>(tile)?.pose;
        let footprint = *self.world.get::<&Footprint>(tile)?;
        Ok(footprint.world(&pose))
    }

    /// Connector entities of a tile, in prefab order.
    pub fn connectors_of(&self, tile: Entity) -> Result<Vec<Entity>, GenerationError> {
        Ok(self.world.get::<&Sockets>(tile)?.0.clone())
    }

    /// World pose of a connector.
    pub fn connector_pose(&self, socket: Entity) -> Result<Pose, GenerationError> {
        let connector = self.world.get::<&Connector>(socket)?;
        let tile_pose = self.world.get::<&Placement>(connector.owner)?.pose;
        Ok(connector.world_pose(&tile_pose))
    }

    /// Every connector on every placed tile, in generation order.
    pub fn all_connectors(&self) -> Result<Vec<Entity>, GenerationError> {
        let mut all = Vec::new();
        for record in self.tiles.iter() {
            all.extend(self.connectors_of(record.tile)?);
        }
        Ok(all)
    }

    /// All blockers and doors placed so far.
    pub fn fixtures(&self) -> Vec<(Entity, Fixture)> {
        self.world
            .query::<&Fixture>()
            .iter()
            .map(|(e, f)| (e, f.clone()))
            .collect()
    }

    pub fn fixture_count(&self, kind: FixtureKind) -> usize {
        self.world
            .query::<&Fixture>()
            .iter()
            .filter(|(_, f)| f.kind == kind)
            .count()
    }

    /// Export tiles for level validation.
    pub fn footprints(&self) -> Result<Vec<TileFootprint>, GenerationError> {
        self.tiles
            .iter()
            .map(|r| {
                Ok(TileFootprint {
                    id: entity_id(r.tile),
                    origin: r.origin.map(entity_id),
                    link: r.connector.map(entity_id),
                    bounds: self.tile_bounds(r.tile)?,
                })
            })
            .collect()
    }

    /// Export connectors, with every fixture placed on each, for level validation.
    pub fn sockets(&self) -> Result<Vec<SocketInfo>, GenerationError> {
        let mut fitted: HashMap<Entity, Vec<FixtureKind>> = HashMap::new();
        for (_, fixture) in self.world.query::<&Fixture>().iter() {
            fitted.entry(fixture.socket).or_default().push(fixture.kind);
        }

        let mut sockets = Vec::new();
        for socket in self.all_connectors()? {
            let connector = self.world.get::<&Connector>(socket)?;
            sockets.push(SocketInfo {
                id: entity_id(socket),
                tile: entity_id(connector.owner),
                position: self.connector_pose(socket)?.position,
                connected: connector.connected,
                fixtures: fitted.remove(&socket).unwrap_or_default(),
            });
        }
        Ok(sockets)
    }
}

fn entity_id(entity: Entity) -> u64 {
    entity.to_bits().get()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> GeneratorConfig {
        GeneratorConfig::default()
            .with_main_length(4)
            .with_branches(2, 3)
    }

    #[test]
    fn test_generator_creation() {
        let generator =
            DungeonGenerator::seeded(small_config(), TileCatalog::builtin().unwrap(), 7).unwrap();
        assert_eq!(generator.state(), DungeonState::Inactive);
        assert!(generator.generated_tiles().is_empty());
    }

    #[test]
    fn test_first_advance_places_start_tile() {
        let mut generator =
            DungeonGenerator::seeded(small_config(), TileCatalog::builtin().unwrap(), 7).unwrap();
        let state = generator.advance().unwrap();
        assert_eq!(state, DungeonState::GeneratingMain);
        assert_eq!(generator.generated_tiles().len(), 1);
        let start = &generator.generated_tiles()[0];
        assert_eq!(start.kind, TileKind::Start);
        assert!(start.origin.is_none());
        assert_eq!(generator.frontier(), Some(start.tile));
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = GeneratorConfig::default().with_main_length(0);
        assert!(matches!(
            DungeonGenerator::seeded(config, TileCatalog::builtin().unwrap(), 1),
            Err(GenerationError::Config(_))
        ));
    }

    #[test]
    fn test_empty_catalog_fails_fast() {
        assert!(matches!(
            DungeonGenerator::seeded(small_config(), TileCatalog::default(), 1),
            Err(GenerationError::Catalog(_))
        ));
    }

    #[test]
    fn test_state_never_regresses() {
        let mut generator =
            DungeonGenerator::seeded(small_config(), TileCatalog::builtin().unwrap(), 11).unwrap();
        let mut last = generator.state();
        while last != DungeonState::Completed {
            let next = generator.advance().unwrap();
            assert!(next >= last);
            last = next;
        }
        assert_eq!(generator.advance().unwrap(), DungeonState::Completed);
    }

    #[test]
    fn test_reset_returns_to_inactive() {
        let mut generator =
            DungeonGenerator::seeded(small_config(), TileCatalog::builtin().unwrap(), 3).unwrap();
        generator.run_to_completion().unwrap();
        assert!(generator.generated_tiles().len() > 1);

        generator.reset();
        assert_eq!(generator.state(), DungeonState::Inactive);
        assert!(generator.generated_tiles().is_empty());
        assert!(generator.events().is_empty());
        assert_eq!(generator.world().len(), 0);
        assert!(generator.index().is_empty());

        assert_eq!(generator.run_to_completion().unwrap(), DungeonState::Completed);
    }

    #[test]
    fn test_exports_cover_every_tile_and_socket() {
        let mut generator =
            DungeonGenerator::seeded(small_config(), TileCatalog::builtin().unwrap(), 5).unwrap();
        generator.run_to_completion().unwrap();
        let footprints = generator.footprints().unwrap();
        let sockets = generator.sockets().unwrap();
        assert_eq!(footprints.len(), generator.generated_tiles().len());
        assert_eq!(sockets.len(), generator.all_connectors().unwrap().len());
    }
}
