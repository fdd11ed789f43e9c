//! Pure geometry and validation logic for tilecrawl.
//!
//! This crate contains the parts of level generation that are independent of
//! any ECS, random source, or runtime. Functions take plain data and return
//! results, making them unit-testable and reusable by the generator, the
//! headless harness, and any engine integration.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`geometry`] | `Vec3`, yaw-only `Pose`, `Aabb`, connector mating, tolerant overlap |
//! | [`validation`] | Level checks: overlaps, origin chain, sealing, door placement |

pub mod geometry;
pub mod validation;
