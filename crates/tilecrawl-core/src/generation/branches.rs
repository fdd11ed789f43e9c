//! Branch growth off the main path.
//!
//! Each branch is seeded from a random pooled connector and grows like the
//! main path, but never places an exit and never hands its root back toward
//! the start tile.

use log::{debug, warn};
use rand::Rng;

use crate::components::TileKind;
use crate::engine::{BranchProgress, DungeonGenerator};
use crate::error::GenerationError;
use crate::generation::collision::Growth;
use crate::generation::{Container, DungeonState, GenerationEvent};
use crate::spatial::SpatialIndex;

impl<R: Rng, S: SpatialIndex> DungeonGenerator<R, S> {
    /// One branch step: seed the next branch, or grow the active one by one attempt.
    pub(crate) fn step_branches(&mut self) -> Result<(), GenerationError> {
        let Some(mut progress) = self.branch else {
            return self.seed_branch();
        };

        match self.grow(TileKind::Regular)? {
            Growth::Placed(_) => {
                progress.remaining -= 1;
                self.branch = (progress.remaining > 0).then_some(progress);
            }
            Growth::Rejected => {}
            Growth::Abandoned => self.branch = None,
        }
        if self.branch.is_none() {
            debug!(
                "{} finished with {} tiles",
                self.container,
                self.tiles.count_in(self.container)
            );
        }
        Ok(())
    }

    fn seed_branch(&mut self) -> Result<(), GenerationError> {
        let requested = self.config.num_branches;
        if self.branches_started >= requested {
            self.state = DungeonState::Cleanup;
            return Ok(());
        }

        let Some(root) = self.take_available()? else {
            warn!(
                "Connector pool empty after {} of {} branches",
                self.branches_started, requested
            );
            self.events.push(GenerationEvent::PoolExhausted {
                requested,
                built: self.branches_started,
            });
            self.state = DungeonState::Cleanup;
            return Ok(());
        };

        self.branches_started += 1;
        self.container = Container::Branch(self.branches_started);
        self.root = Some(root);
        self.frontier = Some(root);
        self.attempts = 0;

        // The root tile counts toward the branch length.
        let remaining = self.config.branch_length.saturating_sub(1);
        self.branch = (remaining > 0).then_some(BranchProgress { remaining });
        debug!("{} seeded from {:?}", self.container, root);
        Ok(())
    }
}
