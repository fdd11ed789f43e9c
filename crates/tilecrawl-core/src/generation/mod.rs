//! Level generation, split by phase.
//!
//! Each submodule adds one slice of behaviour to
//! [`DungeonGenerator`](crate::engine::DungeonGenerator):
//!
//! - `placement`: tile instantiation and connector linking
//! - `collision`: overlap checks, rejection, backtracking
//! - `main_path`: start to exit
//! - `branches`: side chains off the main path
//! - `post`: collider cleanup, sealing, doors
//! - `lighting`: debug phase colours

mod branches;
mod collision;
mod lighting;
mod main_path;
mod placement;
mod post;
mod state;

pub use lighting::phase_color;
pub use state::*;
