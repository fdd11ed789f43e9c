//! Error types for catalog loading, configuration, and generation.
//!
//! Only contract violations surface here. A missing free connector or an
//! overlapping placement is part of normal generation and never an error.

use crate::components::{FixtureKind, TileKind};
use thiserror::Error;

/// A malformed tile catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("No {0} tiles in catalog")]
    EmptyTiles(TileKind),
    #[error("No {0:?} pieces in catalog")]
    EmptyFixtures(FixtureKind),
    #[error("Tile prefab '{0}' has non-positive bounds")]
    DegenerateBounds(String),
    #[error("Tile prefab '{0}' has no connectors")]
    NoConnectors(String),
    #[error("Tile prefab '{prefab}' connector #{index} has non-positive size")]
    DegenerateConnector { prefab: String, index: usize },
}

/// Generation limits outside their supported range.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Errors surfaced by the generator.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Entity no longer exists: {0}")]
    MissingEntity(#[from] hecs::NoSuchEntity),
    #[error("Component lookup failed: {0}")]
    MissingComponent(#[from] hecs::ComponentError),
    #[error("Tile {0:?} has no generation record")]
    UnknownTile(hecs::Entity),
    #[error("Growth step requested with no frontier tile")]
    NoFrontier,
}
