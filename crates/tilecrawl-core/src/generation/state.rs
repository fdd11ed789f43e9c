//! Generation state: phase machine, tile records, and the event log.

use hecs::Entity;
use std::collections::HashMap;

use crate::components::TileKind;

/// Generation phase. Only ever advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DungeonState {
    Inactive,
    GeneratingMain,
    GeneratingBranches,
    Cleanup,
    Completed,
}

/// Which chain a tile was grown as part of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    Main,
    /// Branches are numbered from 1
    Branch(u32),
}

impl std::fmt::Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Container::Main => f.write_str("Main Path"),
            Container::Branch(n) => write!(f, "Branch {}", n),
        }
    }
}

/// Generation metadata for one placed tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TileRecord {
    /// Handle to the tile entity in the level world
    pub tile: Entity,
    /// Tile this one was grown from. `None` only for the start tile.
    pub origin: Option<Entity>,
    /// Socket on `origin` used to attach this tile, once linked
    pub connector: Option<Entity>,
    pub kind: TileKind,
    pub container: Container,
}

impl TileRecord {
    pub fn new(tile: Entity, origin: Option<Entity>, kind: TileKind, container: Container) -> Self {
        Self {
            tile,
            origin,
            connector: None,
            kind,
            container,
        }
    }
}

/// Ordered tile records with O(1) lookup by tile handle.
///
/// Order encodes recency. Removals shift later records down and re-slot them.
#[derive(Debug, Clone, Default)]
pub struct TileRegistry {
    records: Vec<TileRecord>,
    slots: HashMap<Entity, usize>,
}

impl TileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: TileRecord) {
        self.slots.insert(record.tile, self.records.len());
        self.records.push(record);
    }

    pub fn get(&self, tile: Entity) -> Option<&TileRecord> {
        self.slots.get(&tile).map(|&slot| &self.records[slot])
    }

    pub fn get_mut(&mut self, tile: Entity) -> Option<&mut TileRecord> {
        match self.slots.get(&tile) {
            Some(&slot) => self.records.get_mut(slot),
            None => None,
        }
    }

    pub fn contains(&self, tile: Entity) -> bool {
        self.slots.contains_key(&tile)
    }

    pub fn remove(&mut self, tile: Entity) -> Option<TileRecord> {
        let slot = self.slots.remove(&tile)?;
        let record = self.records.remove(slot);
        for (i, r) in self.records.iter().enumerate().skip(slot) {
            self.slots.insert(r.tile, i);
        }
        Some(record)
    }

    pub fn last(&self) -> Option<&TileRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TileRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileRecord> {
        self.records.iter()
    }

    pub fn count_in(&self, container: Container) -> usize {
        self.records.iter().filter(|r| r.container == container).count()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.slots.clear();
    }
}

/// Notable non-error outcomes recorded while generating.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEvent {
    /// A rejected tile's predecessor was discarded during backtracking.
    Backtracked {
        container: Container,
        discarded: Entity,
    },
    /// Backtracking ran out of frontiers; the chain ends short.
    FrontierExhausted { container: Container, tiles: usize },
    /// The connector pool emptied before every branch was seeded.
    PoolExhausted { requested: u32, built: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use hecs::World;

    #[test]
    fn test_registry_lookup_survives_removal() {
        let mut world = World::new();
        let tiles: Vec<Entity> = (0..4).map(|_| world.spawn(())).collect();
        let mut registry = TileRegistry::new();
        registry.push(TileRecord::new(tiles[0], None, TileKind::Start, Container::Main));
        for pair in tiles.windows(2) {
            registry.push(TileRecord::new(pair[1], Some(pair[0]), TileKind::Regular, Container::Main));
        }

        let removed = registry.remove(tiles[1]).unwrap();
        assert_eq!(removed.origin, Some(tiles[0]));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(tiles[3]).unwrap().tile, tiles[3]);
        assert_eq!(registry.get(tiles[2]).unwrap().origin, Some(tiles[1]));
        assert!(registry.get(tiles[1]).is_none());
        assert_eq!(registry.last().unwrap().tile, tiles[3]);
    }

    #[test]
    fn test_state_order_is_monotonic() {
        assert!(DungeonState::Inactive < DungeonState::GeneratingMain);
        assert!(DungeonState::GeneratingMain < DungeonState::GeneratingBranches);
        assert!(DungeonState::GeneratingBranches < DungeonState::Cleanup);
        assert!(DungeonState::Cleanup < DungeonState::Completed);
    }

    #[test]
    fn test_container_names() {
        assert_eq!(Container::Main.to_string(), "Main Path");
        assert_eq!(Container::Branch(3).to_string(), "Branch 3");
    }
}
