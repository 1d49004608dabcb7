//! Jumping Frog - a lane-crossing arcade game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (level generation, ticking, collisions, game state)
//! - `config`: Game tunables loaded from a `key=value` file
//! - `persistence`: Snapshot save/restore
//!
//! Drawing and keyboard capture live outside this crate; they only read
//! [`sim::GameState`] and feed [`sim::Intent`] values back in.

pub mod config;
pub mod persistence;
pub mod sim;

pub use config::{Config, ConfigError};

use glam::IVec2;

/// Game configuration constants
pub mod consts {
    /// Compiled entity capacities (config counts are clamped to these)
    pub const MAX_CARS: usize = 9;
    pub const MAX_FRIENDLY_CARS: usize = 2;
    pub const MAX_COINS: usize = 5;
    pub const MAX_OBSTACLES: usize = 20;

    /// Row the frog must reach
    pub const GOAL_ROW: i32 = 1;
    /// First traffic lane; lanes are every other row below it
    pub const FIRST_LANE_ROW: i32 = 2;
    pub const LANE_SPACING: i32 = 2;
    /// Rows reserved below the playfield for the HUD
    pub const HUD_ROWS: i32 = 2;
    /// Smallest board that still fits two lanes, a free row and the goal
    pub const MIN_SCREEN_HEIGHT: i32 = 7;
    /// Largest board side (terminal coordinates are 16-bit)
    pub const MAX_SCREEN_SIZE: i32 = i16::MAX as i32;

    /// Obstacles are a fixed 3 cells wide, anchored at their left cell
    pub const OBSTACLE_WIDTH: i32 = 3;
    /// One obstacle per this many board cells
    pub const CELLS_PER_OBSTACLE: i32 = 200;

    /// Hazards below this index bounce off the edges, the rest respawn
    pub const BOUNCING_HAZARDS: usize = 5;
    /// Hazards that brake when the frog gets close
    pub const STOPPING_HAZARDS: usize = 2;
    /// Respawn delay is drawn from 1..=MAX_SPAWN_DELAY ticks
    pub const MAX_SPAWN_DELAY: u32 = 10;
    /// Per-tick chance that an even-indexed hazard redraws its speed
    pub const SPEED_SURGE_CHANCE: f64 = 0.1;

    /// Minimum seconds between two frog jumps
    pub const MOVE_COOLDOWN_SECS: f64 = 1.0;

    pub const STARTING_LIVES: u32 = 3;
    pub const FIRST_LEVEL: u32 = 1;
    pub const MAX_LEVEL: u32 = 3;
    /// Level at which the stork joins the hunt
    pub const PURSUER_LEVEL: u32 = 2;

    /// Points for reaching the goal row
    pub const GOAL_BONUS: u64 = 5;
    /// Points per coin
    pub const COIN_VALUE: u64 = 1;
}

/// Manhattan distance between two grid cells
#[inline]
pub fn manhattan(a: IVec2, b: IVec2) -> i32 {
    (a - b).abs().element_sum()
}

/// One cell from `from` toward `to` on each axis independently
#[inline]
pub fn step_toward(from: IVec2, to: IVec2) -> IVec2 {
    from + (to - from).signum()
}
