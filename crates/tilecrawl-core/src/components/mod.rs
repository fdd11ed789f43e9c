//! Component definitions for the level world.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior - that lives in the generator.

mod common;
mod connector;
mod fixture;
mod tile;

pub use common::*;
pub use connector::*;
pub use fixture::*;
pub use tile::*;
