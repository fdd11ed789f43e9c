//! Tilecrawl Core - Modular Dungeon Generator
//!
//! Builds levels by chaining prefab tiles through their connectors: a main
//! path from a start tile to an exit tile, branches off it, then sealing and
//! doors. Placement is checked against everything already built, and
//! rejected placements backtrack.
//!
//! # Architecture
//!
//! The level lives in a `hecs` world:
//! - **Tiles**: placement, footprint, sockets, optional room light
//! - **Connectors**: sockets on tile boundaries, linked pairwise
//! - **Fixtures**: blockers and doors fitted into sockets
//!
//! Overlap queries go through the [`spatial::SpatialIndex`] trait.
//!
//! # Example
//!
//! ```rust,no_run
//! use tilecrawl_core::prelude::*;
//!
//! let config = GeneratorConfig::default().with_main_length(12);
//! let mut generator = DungeonGenerator::seeded(config, TileCatalog::builtin()?, 42)?;
//! generator.run_to_completion()?;
//! println!("{} tiles", generator.generated_tiles().len());
//! # Ok::<(), tilecrawl_core::error::GenerationError>(())
//! ```

pub mod catalog;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod generation;
pub mod session;
pub mod spatial;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::catalog::TileCatalog;
    pub use crate::components::*;
    pub use crate::config::GeneratorConfig;
    pub use crate::engine::DungeonGenerator;
    pub use crate::error::GenerationError;
    pub use crate::generation::{Container, DungeonState, GenerationEvent, TileRecord};
    pub use crate::session::{Command, Session, ViewMode};
    pub use crate::spatial::{GridIndex, Layer, SpatialIndex};
}
