//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only, passed in explicitly
//! - Caller-supplied clock only
//! - Stable iteration order (by entity index)
//! - No rendering or terminal dependencies

pub mod collision;
pub mod generate;
pub mod state;
pub mod tick;

pub use collision::{Outcome, Resolution, classify_contact, resolve};
pub use generate::generate_level;
pub use state::{
    Actor, GamePhase, GameState, Hazard, Heading, Item, Obstacle, Platform, Progress, Pursuer,
    Registry, RngState, RunSummary,
};
pub use tick::{Intent, TickInput, TickReport, autopilot, step, tick};
