//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick at a time, no wall-clock time
//! - Seeded RNG only
//! - Stable iteration order (roster order)
//! - No rendering or platform dependencies

pub mod brain;
pub mod damage;
pub mod shot;
pub mod state;
pub mod tank;
pub mod terrain;
pub mod tick;

pub use brain::{Brain, BrainState};
pub use damage::{ExplosionReport, explosion_damage, resolve_explosion};
pub use shot::Shot;
pub use state::{GameEvent, GameState, MatchStatus, MatchSummary, TankSummary};
pub use tank::{GroundContact, Tank, TankCommand, TankId};
pub use terrain::Terrain;
pub use tick::{TickInput, tick};
