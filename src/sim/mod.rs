//! Deterministic simulation module
//!
//! All battle logic lives here. This module must be deterministic:
//! - Seeded RNG only (spawn placement)
//! - Battle time supplied by the caller, never read from the system clock
//! - Stable iteration order (by robot ID)
//! - No I/O

pub mod collision;
pub mod game;
pub mod geometry;
pub mod state;
pub mod tick;

pub use collision::{BoundaryResult, Edge, clamp_to_field, destination};
pub use game::Game;
pub use geometry::{distance, heading_to, inverse_square_intensity, is_within_cone};
pub use state::{Battlefield, RngState, RobotId, RobotRecord};
