//! Tile catalog - the five prefab collections the generator samples from.
//!
//! Catalogs are plain JSON so new tilesets can be dropped in without a
//! rebuild. The default tileset ships embedded in the binary.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tilecrawl_logic::geometry::{Aabb, Pose, Vec3};

use crate::components::{Color, FixtureKind, TileKind, DEFAULT_SOCKET_SIZE};
use crate::error::CatalogError;

// ── Built-in tileset (same JSON the harness validates) ─────────────────
const BUILTIN_TILESET: &str = include_str!("../../../data/tileset.json");

fn default_socket_size() -> [f32; 2] {
    DEFAULT_SOCKET_SIZE
}

fn default_thickness() -> f32 {
    0.25
}

/// A socket on a tile prefab, in the prefab's local space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorSpec {
    pub position: Vec3,
    /// Degrees about +Y; the socket faces out of the tile.
    #[serde(default)]
    pub yaw: f32,
    #[serde(default = "default_socket_size")]
    pub size: [f32; 2],
}

impl ConnectorSpec {
    pub fn local_pose(&self) -> Pose {
        Pose::new(self.position, self.yaw)
    }
}

/// A placeable room piece.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TilePrefab {
    pub name: String,
    /// Local-space bounds
    pub bounds: Aabb,
    pub connectors: Vec<ConnectorSpec>,
    /// Room light colour, if the prefab is lit
    #[serde(default)]
    pub light: Option<Color>,
}

/// A blocker or door piece fitted into a socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixturePrefab {
    pub name: String,
    #[serde(default = "default_thickness")]
    pub thickness: f32,
}

/// Five disjoint prefab collections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TileCatalog {
    #[serde(default)]
    pub start: Vec<TilePrefab>,
    #[serde(default)]
    pub regular: Vec<TilePrefab>,
    #[serde(default)]
    pub exit: Vec<TilePrefab>,
    #[serde(default)]
    pub blocker: Vec<FixturePrefab>,
    #[serde(default)]
    pub door: Vec<FixturePrefab>,
}

impl TileCatalog {
    /// The embedded default tileset.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_TILESET)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: TileCatalog = serde_json::from_str(json)?;
        Ok(catalog)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn tiles(&self, kind: TileKind) -> &[TilePrefab] {
        match kind {
            TileKind::Start => &self.start,
            TileKind::Regular => &self.regular,
            TileKind::Exit => &self.exit,
        }
    }

    pub fn fixtures(&self, kind: FixtureKind) -> &[FixturePrefab] {
        match kind {
            FixtureKind::Blocker => &self.blocker,
            FixtureKind::Door => &self.door,
        }
    }

    /// Uniformly pick a tile prefab of `kind`.
    pub fn sample_tile<R: Rng>(&self, kind: TileKind, rng: &mut R) -> Result<&TilePrefab, CatalogError> {
        let list = self.tiles(kind);
        if list.is_empty() {
            return Err(CatalogError::EmptyTiles(kind));
        }
        Ok(&list[rng.gen_range(0..list.len())])
    }

    /// Uniformly pick a fixture prefab of `kind`.
    pub fn sample_fixture<R: Rng>(
        &self,
        kind: FixtureKind,
        rng: &mut R,
    ) -> Result<&FixturePrefab, CatalogError> {
        let list = self.fixtures(kind);
        if list.is_empty() {
            return Err(CatalogError::EmptyFixtures(kind));
        }
        Ok(&list[rng.gen_range(0..list.len())])
    }

    /// Check the collections a generation run will sample.
    ///
    /// Doors are only required when `needs_doors` is set, since a zero door
    /// chance never samples them.
    pub fn validate(&self, needs_doors: bool) -> Result<(), CatalogError> {
        for kind in [TileKind::Start, TileKind::Regular, TileKind::Exit] {
            let list = self.tiles(kind);
            if list.is_empty() {
                return Err(CatalogError::EmptyTiles(kind));
            }
            for prefab in list {
                validate_prefab(prefab)?;
            }
        }
        if self.blocker.is_empty() {
            return Err(CatalogError::EmptyFixtures(FixtureKind::Blocker));
        }
        if needs_doors && self.door.is_empty() {
            return Err(CatalogError::EmptyFixtures(FixtureKind::Door));
        }
        Ok(())
    }
}

fn validate_prefab(prefab: &TilePrefab) -> Result<(), CatalogError> {
    if !prefab.bounds.is_positive() {
        return Err(CatalogError::DegenerateBounds(prefab.name.clone()));
    }
    if prefab.connectors.is_empty() {
        return Err(CatalogError::NoConnectors(prefab.name.clone()));
    }
    for (index, c) in prefab.connectors.iter().enumerate() {
        if c.size[0] <= 0.0 || c.size[1] <= 0.0 {
            return Err(CatalogError::DegenerateConnector {
                prefab: prefab.name.clone(),
                index,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = TileCatalog::builtin().unwrap();
        catalog.validate(true).unwrap();
        assert!(!catalog.start.is_empty());
        assert!(catalog.regular.len() >= 4);
        assert!(!catalog.exit.is_empty());
    }

    #[test]
    fn test_connectors_sit_on_bounds() {
        let catalog = TileCatalog::builtin().unwrap();
        for kind in [TileKind::Start, TileKind::Regular, TileKind::Exit] {
            for prefab in catalog.tiles(kind) {
                for c in &prefab.connectors {
                    assert!(
                        prefab.bounds.contains(&c.position),
                        "{}: socket {:?} outside bounds",
                        prefab.name,
                        c.position
                    );
                }
            }
        }
    }

    #[test]
    fn test_sample_empty_is_error() {
        let catalog = TileCatalog::default();
        let mut rng = StdRng::seed_from_u64(42);
        assert!(matches!(
            catalog.sample_tile(TileKind::Exit, &mut rng),
            Err(CatalogError::EmptyTiles(TileKind::Exit))
        ));
        assert!(matches!(
            catalog.sample_fixture(FixtureKind::Door, &mut rng),
            Err(CatalogError::EmptyFixtures(FixtureKind::Door))
        ));
    }

    #[test]
    fn test_doors_optional_without_door_chance() {
        let mut catalog = TileCatalog::builtin().unwrap();
        catalog.door.clear();
        assert!(catalog.validate(false).is_ok());
        assert!(matches!(
            catalog.validate(true),
            Err(CatalogError::EmptyFixtures(FixtureKind::Door))
        ));
    }

    #[test]
    fn test_degenerate_connector_rejected() {
        let json = r#"{
            "start": [{"name": "Bad", "bounds": {"min": {"x": -1, "y": 0, "z": -1}, "max": {"x": 1, "y": 1, "z": 1}},
                       "connectors": [{"position": {"x": 0, "y": 0, "z": 1}, "size": [0, 2]}]}],
            "regular": [], "exit": [], "blocker": [], "door": []
        }"#;
        let catalog = TileCatalog::from_json(json).unwrap();
        assert!(matches!(
            catalog.validate(false),
            Err(CatalogError::DegenerateConnector { index: 0, .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            TileCatalog::from_json("{ not json"),
            Err(CatalogError::Parse(_))
        ));
    }
}
