//! Interactive session: a generator plus the two player commands.

use log::info;
use rand::Rng;
use std::time::Duration;

use crate::engine::DungeonGenerator;
use crate::error::GenerationError;
use crate::generation::DungeonState;
use crate::spatial::{GridIndex, SpatialIndex};

/// Player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Throw the level away and generate a fresh one
    ReloadLevel,
    /// Switch between the overhead and first-person views
    ToggleOverview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Overview,
    FirstPerson,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Overview => ViewMode::FirstPerson,
            ViewMode::FirstPerson => ViewMode::Overview,
        }
    }
}

/// Drives one generator at the configured pace and reacts to commands.
///
/// The view starts in overview while the level assembles and switches to
/// first person the first time generation completes.
pub struct Session<R: Rng, S: SpatialIndex = GridIndex> {
    generator: DungeonGenerator<R, S>,
    view: ViewMode,
    revealed: bool,
    reloads: u32,
}

impl<R: Rng, S: SpatialIndex> Session<R, S> {
    pub fn new(generator: DungeonGenerator<R, S>) -> Self {
        Self {
            generator,
            view: ViewMode::Overview,
            revealed: false,
            reloads: 0,
        }
    }

    /// Advance generation by one step.
    pub fn tick(&mut self) -> Result<DungeonState, GenerationError> {
        let state = self.generator.advance()?;
        if state == DungeonState::Completed && !self.revealed {
            self.revealed = true;
            self.view = ViewMode::FirstPerson;
            info!("Level ready, switching to first person");
        }
        Ok(state)
    }

    /// Tick until complete, calling `pace` with the configured delay between steps.
    pub fn run(&mut self, mut pace: impl FnMut(Duration)) -> Result<DungeonState, GenerationError> {
        let delay = self.generator.pacing_delay();
        loop {
            let state = self.tick()?;
            if state == DungeonState::Completed {
                return Ok(state);
            }
            if !delay.is_zero() {
                pace(delay);
            }
        }
    }

    pub fn handle(&mut self, command: Command) {
        match command {
            Command::ReloadLevel => {
                self.generator.reset();
                self.view = ViewMode::Overview;
                self.revealed = false;
                self.reloads += 1;
                info!("Reloading level (#{})", self.reloads);
            }
            Command::ToggleOverview => {
                self.view = self.view.toggled();
            }
        }
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn reloads(&self) -> u32 {
        self.reloads
    }

    pub fn generator(&self) -> &DungeonGenerator<R, S> {
        &self.generator
    }

    pub fn generator_mut(&mut self) -> &mut DungeonGenerator<R, S> {
        &mut self.generator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TileCatalog;
    use crate::config::GeneratorConfig;

    fn session(delay: f32) -> Session<rand::rngs::StdRng> {
        let config = GeneratorConfig::default()
            .with_main_length(4)
            .with_branches(1, 2)
            .with_construction_delay(delay);
        Session::new(DungeonGenerator::seeded(config, TileCatalog::builtin().unwrap(), 1).unwrap())
    }

    #[test]
    fn test_view_switches_on_completion() {
        let mut session = session(0.0);
        assert_eq!(session.view(), ViewMode::Overview);
        session.run(|_| {}).unwrap();
        assert_eq!(session.view(), ViewMode::FirstPerson);

        // Ticking a completed level does not force the view back.
        session.handle(Command::ToggleOverview);
        session.tick().unwrap();
        assert_eq!(session.view(), ViewMode::Overview);
    }

    #[test]
    fn test_reload_restarts_generation() {
        let mut session = session(0.0);
        session.run(|_| {}).unwrap();
        session.handle(Command::ReloadLevel);
        assert_eq!(session.generator().state(), DungeonState::Inactive);
        assert_eq!(session.view(), ViewMode::Overview);
        assert_eq!(session.reloads(), 1);

        assert_eq!(session.run(|_| {}).unwrap(), DungeonState::Completed);
        assert_eq!(session.view(), ViewMode::FirstPerson);
    }

    #[test]
    fn test_pacing_called_between_steps() {
        let mut session = session(0.5);
        let mut pauses = Vec::new();
        session.run(|d| pauses.push(d)).unwrap();
        assert!(!pauses.is_empty());
        assert!(pauses.iter().all(|d| *d == Duration::from_millis(500)));
    }
}
