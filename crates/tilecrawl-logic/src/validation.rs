//! Validation for generated dungeon levels.
//!
//! Pure functions that take tile/socket data and return validation errors.
//! No ECS dependency: the generator exports plain structs and these checks
//! run over them in tests and in the headless harness.

use crate::geometry::{Aabb, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// What a post-processing pass attached to a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FixtureKind {
    /// Wall piece sealing an unused socket.
    Blocker,
    /// Door piece placed in a used socket.
    Door,
}

/// Minimal tile data needed for validation.
#[derive(Debug, Clone)]
pub struct TileFootprint {
    pub id: u64,
    /// Tile this one was grown from. `None` only for the start tile.
    pub origin: Option<u64>,
    /// Socket on the origin tile used to attach this tile.
    pub link: Option<u64>,
    /// World-space bounds.
    pub bounds: Aabb,
}

/// Minimal connector data needed for validation.
#[derive(Debug, Clone)]
pub struct SocketInfo {
    pub id: u64,
    pub tile: u64,
    pub position: Vec3,
    pub connected: bool,
    pub fixtures: Vec<FixtureKind>,
}

impl SocketInfo {
    fn count(&self, kind: FixtureKind) -> usize {
        self.fixtures.iter().filter(|f| **f == kind).count()
    }
}

/// A level validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

fn error(category: &'static str, message: String) -> ValidationError {
    ValidationError {
        category,
        severity: Severity::Error,
        message,
    }
}

// ── A. Tile geometry ────────────────────────────────────────────────────

/// Check that no tile has zero or negative extents.
pub fn check_tile_dimensions(tiles: &[TileFootprint]) -> Vec<ValidationError> {
    tiles
        .iter()
        .filter(|t| !t.bounds.is_positive())
        .map(|t| {
            error(
                "tile_geometry",
                format!(
                    "Tile #{} has non-positive extents: {}×{}×{}",
                    t.id,
                    t.bounds.width(),
                    t.bounds.height(),
                    t.bounds.depth()
                ),
            )
        })
        .collect()
}

/// Check no two tiles overlap, except a tile and its direct origin.
/// Overlaps shallower than `tolerance` count as touching.
pub fn check_tile_overlaps(tiles: &[TileFootprint], tolerance: f32) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for i in 0..tiles.len() {
        for j in (i + 1)..tiles.len() {
            let a = &tiles[i];
            let b = &tiles[j];
            if a.origin == Some(b.id) || b.origin == Some(a.id) {
                continue;
            }
            if a.bounds.overlaps(&b.bounds, tolerance) {
                errors.push(error(
                    "tile_overlap",
                    format!("Tiles #{} and #{} overlap", a.id, b.id),
                ));
            }
        }
    }
    errors
}

// ── B. Origin chain ─────────────────────────────────────────────────────

/// Check the origin/link fields form a tree rooted at a single start tile,
/// and that every link names a connected socket on the origin tile.
pub fn check_origin_chain(tiles: &[TileFootprint], sockets: &[SocketInfo]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let tile_ids: HashSet<u64> = tiles.iter().map(|t| t.id).collect();
    let by_socket: HashMap<u64, &SocketInfo> = sockets.iter().map(|s| (s.id, s)).collect();

    let roots = tiles.iter().filter(|t| t.origin.is_none()).count();
    if !tiles.is_empty() && roots != 1 {
        errors.push(error(
            "origin_chain",
            format!("Expected exactly one start tile, found {}", roots),
        ));
    }

    for t in tiles {
        let Some(origin) = t.origin else {
            continue;
        };
        if !tile_ids.contains(&origin) {
            errors.push(error(
                "origin_chain",
                format!("Tile #{} references missing origin #{}", t.id, origin),
            ));
        }
        match t.link.and_then(|id| by_socket.get(&id)) {
            None => errors.push(error(
                "origin_chain",
                format!("Tile #{} has no linking connector", t.id),
            )),
            Some(socket) => {
                if socket.tile != origin {
                    errors.push(error(
                        "origin_chain",
                        format!(
                            "Tile #{} links through socket #{} owned by #{}, not its origin #{}",
                            t.id, socket.id, socket.tile, origin
                        ),
                    ));
                }
                if !socket.connected {
                    errors.push(error(
                        "origin_chain",
                        format!("Tile #{} links through unconnected socket #{}", t.id, socket.id),
                    ));
                }
            }
        }
    }
    errors
}

/// Check every tile is reachable from the start tile through origin links.
pub fn check_connectivity(tiles: &[TileFootprint]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let Some(start) = tiles.iter().find(|t| t.origin.is_none()) else {
        return errors;
    };

    let mut children: HashMap<u64, Vec<u64>> = HashMap::new();
    for t in tiles {
        if let Some(origin) = t.origin {
            children.entry(origin).or_default().push(t.id);
        }
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(start.id);
    queue.push_back(start.id);
    while let Some(current) = queue.pop_front() {
        if let Some(next) = children.get(&current) {
            for &n in next {
                if visited.insert(n) {
                    queue.push_back(n);
                }
            }
        }
    }

    let unreached: Vec<u64> = tiles
        .iter()
        .map(|t| t.id)
        .filter(|id| !visited.contains(id))
        .collect();
    if !unreached.is_empty() {
        errors.push(error(
            "connectivity",
            format!(
                "{} of {} tiles unreachable from the start tile (e.g. tile #{})",
                unreached.len(),
                tiles.len(),
                unreached[0]
            ),
        ));
    }
    errors
}

// ── C. Post-processing ──────────────────────────────────────────────────

/// Check every unconnected socket carries exactly one blocker and no
/// connected socket carries one.
pub fn check_sealing(sockets: &[SocketInfo]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for s in sockets {
        let blockers = s.count(FixtureKind::Blocker);
        if !s.connected && blockers != 1 {
            errors.push(error(
                "sealing",
                format!("Unconnected socket #{} has {} blockers", s.id, blockers),
            ));
        }
        if s.connected && blockers > 0 {
            errors.push(error(
                "sealing",
                format!("Connected socket #{} was sealed", s.id),
            ));
        }
    }
    errors
}

/// Check doors sit only in connected sockets, at most one per socket,
/// and at most one per socket location (a link's two sockets coincide).
pub fn check_doors(sockets: &[SocketInfo], epsilon: f32) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut placed: Vec<(u64, Vec3)> = Vec::new();

    for s in sockets {
        let doors = s.count(FixtureKind::Door);
        if doors == 0 {
            continue;
        }
        if !s.connected {
            errors.push(error(
                "doors",
                format!("Door placed in unconnected socket #{}", s.id),
            ));
        }
        if doors > 1 {
            errors.push(error(
                "doors",
                format!("Socket #{} has {} doors", s.id, doors),
            ));
        }
        if let Some((other, _)) = placed
            .iter()
            .find(|(_, p)| p.approx_eq(&s.position, epsilon))
        {
            errors.push(error(
                "doors",
                format!("Sockets #{} and #{} both received a door", other, s.id),
            ));
        }
        placed.push((s.id, s.position));
    }
    errors
}

/// Check no socket holds both a blocker and a door.
pub fn check_single_fixture(sockets: &[SocketInfo]) -> Vec<ValidationError> {
    sockets
        .iter()
        .filter(|s| s.count(FixtureKind::Blocker) > 0 && s.count(FixtureKind::Door) > 0)
        .map(|s| {
            error(
                "fixtures",
                format!("Socket #{} holds both a blocker and a door", s.id),
            )
        })
        .collect()
}

// ── Master validation ───────────────────────────────────────────────────

/// Run all level validations and return combined results.
pub fn validate_level(
    tiles: &[TileFootprint],
    sockets: &[SocketInfo],
    tolerance: f32,
) -> Vec<ValidationError> {
    let mut all = Vec::new();
    all.extend(check_tile_dimensions(tiles));
    all.extend(check_tile_overlaps(tiles, tolerance));
    all.extend(check_origin_chain(tiles, sockets));
    all.extend(check_connectivity(tiles));
    all.extend(check_sealing(sockets));
    all.extend(check_doors(sockets, tolerance));
    all.extend(check_single_fixture(sockets));
    all
}
