//! Spatial overlap queries.
//!
//! The generator only ever asks one question of space: which registered
//! volumes on a layer intersect this box. `SpatialIndex` captures that, so the
//! placement algorithm is independent of the index behind it and tests can
//! substitute deterministic fakes.

use hecs::Entity;
use std::collections::{BTreeSet, HashMap};
use tilecrawl_logic::geometry::{Aabb, Vec3};

/// Query category. Volumes on one layer are invisible to queries on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Tile,
    Door,
}

/// Overlap queries over registered volumes.
pub trait SpatialIndex {
    /// Register (or move) `entity`'s volume on `layer`.
    fn insert(&mut self, entity: Entity, volume: Aabb, layer: Layer);

    /// Forget `entity`. Unknown entities are ignored.
    fn remove(&mut self, entity: Entity);

    /// Entities on `layer` whose volume strictly intersects the query box.
    fn query(&self, center: Vec3, half_extents: Vec3, layer: Layer) -> Vec<Entity>;

    /// Forget everything.
    fn clear(&mut self);
}

type Cell = (i32, i32, i32);

/// Uniform grid index. Each volume is bucketed into every cell it touches.
#[derive(Debug, Clone)]
pub struct GridIndex {
    cell_size: f32,
    cells: HashMap<Cell, Vec<Entity>>,
    volumes: HashMap<Entity, (Aabb, Layer)>,
}

impl GridIndex {
    pub const DEFAULT_CELL_SIZE: f32 = 8.0;

    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(0.5),
            cells: HashMap::new(),
            volumes: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.volumes.contains_key(&entity)
    }

    /// Number of registered volumes on `layer`.
    pub fn count(&self, layer: Layer) -> usize {
        self.volumes.values().filter(|(_, l)| *l == layer).count()
    }

    fn cell_of(&self, p: Vec3) -> Cell {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
            (p.z / self.cell_size).floor() as i32,
        )
    }

    fn cells_for(&self, volume: &Aabb) -> impl Iterator<Item = Cell> {
        let lo = self.cell_of(volume.min);
        let hi = self.cell_of(volume.max);
        (lo.0..=hi.0).flat_map(move |x| {
            (lo.1..=hi.1).flat_map(move |y| (lo.2..=hi.2).map(move |z| (x, y, z)))
        })
    }
}

impl Default for GridIndex {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CELL_SIZE)
    }
}

impl SpatialIndex for GridIndex {
    fn insert(&mut self, entity: Entity, volume: Aabb, layer: Layer) {
        self.remove(entity);
        let cells: Vec<Cell> = self.cells_for(&volume).collect();
        for cell in cells {
            self.cells.entry(cell).or_default().push(entity);
        }
        self.volumes.insert(entity, (volume, layer));
    }

    fn remove(&mut self, entity: Entity) {
        let Some((volume, _)) = self.volumes.remove(&entity) else {
            return;
        };
        let cells: Vec<Cell> = self.cells_for(&volume).collect();
        for cell in cells {
            if let Some(bucket) = self.cells.get_mut(&cell) {
                bucket.retain(|e| *e != entity);
                if bucket.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
    }

    fn query(&self, center: Vec3, half_extents: Vec3, layer: Layer) -> Vec<Entity> {
        let probe = Aabb::from_center(center, half_extents);
        let mut hits = BTreeSet::new();
        for cell in self.cells_for(&probe) {
            let Some(bucket) = self.cells.get(&cell) else {
                continue;
            };
            for entity in bucket {
                if let Some((volume, l)) = self.volumes.get(entity) {
                    if *l == layer && volume.intersects(&probe) {
                        hits.insert(*entity);
                    }
                }
            }
        }
        hits.into_iter().collect()
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.volumes.clear();
    }
}
