//! Game state and core simulation types
//!
//! Everything a snapshot must carry to resume a run lives here.

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::generate::generate_level;
use crate::config::Config;
use crate::consts::*;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Lives exhausted or the last level cleared
    GameOver,
}

/// Horizontal travel direction of a lane entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Heading {
    Left,
    Right,
}

impl Heading {
    pub fn sign(self) -> i32 {
        match self {
            Heading::Left => -1,
            Heading::Right => 1,
        }
    }

    /// Coin flip between left and right
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.random_bool(0.5) {
            Heading::Right
        } else {
            Heading::Left
        }
    }
}

/// The player's frog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub pos: IVec2,
    /// Position before the most recent jump (obstacles push the frog back here)
    pub prev_pos: IVec2,
    /// Index of the platform carrying the frog
    pub carrier: Option<usize>,
    /// Jump attempts since the level was generated
    pub steps: u32,
    /// Clock reading of the last jump attempt (seconds)
    pub last_move_at: f64,
}

impl Actor {
    pub fn new(pos: IVec2, now: f64) -> Self {
        Self {
            pos,
            prev_pos: pos,
            carrier: None,
            steps: 0,
            last_move_at: now,
        }
    }

    pub fn is_carried(&self) -> bool {
        self.carrier.is_some()
    }

    /// Put the frog back on the start cell, keeping the jump clock
    pub fn reset_to(&mut self, pos: IVec2) {
        self.pos = pos;
        self.prev_pos = pos;
        self.carrier = None;
    }

    /// Whether enough time has passed since the last jump attempt
    pub fn cooldown_elapsed(&self, now: f64) -> bool {
        now - self.last_move_at >= MOVE_COOLDOWN_SECS
    }
}

/// A lethal car
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub pos: IVec2,
    pub heading: Heading,
    /// Cells per tick
    pub speed: i32,
    /// Ticks until the car appears; it neither moves nor collides meanwhile
    pub spawn_delay: u32,
    /// Brakes when the frog comes within the proximity threshold
    pub stops: bool,
    /// Braking this tick (recomputed every tick)
    #[serde(default)]
    pub frozen: bool,
}

impl Hazard {
    pub fn is_active(&self) -> bool {
        self.spawn_delay == 0
    }

    /// Speed actually applied this tick
    pub fn effective_speed(&self) -> i32 {
        if self.frozen { 0 } else { self.speed }
    }

    /// Horizontal hitbox: widens with speed so fast cars can't skip the frog
    pub fn hit_window(&self) -> std::ops::RangeInclusive<i32> {
        let reach = self.effective_speed();
        self.pos.x - reach..=self.pos.x + reach
    }
}

/// A friendly car that carries the frog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub pos: IVec2,
    pub heading: Heading,
    pub speed: i32,
}

/// A collectible coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub pos: IVec2,
    pub collected: bool,
}

/// A static barrier, `OBSTACLE_WIDTH` cells wide starting at `pos`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: IVec2,
}

impl Obstacle {
    pub fn covers(&self, cell: IVec2) -> bool {
        cell.y == self.pos.y && (self.pos.x..self.pos.x + OBSTACLE_WIDTH).contains(&cell.x)
    }
}

/// The stork hunting the frog from level 2 onward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pursuer {
    pub pos: IVec2,
}

/// All entities on the board. Vector index is entity identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    pub actor: Actor,
    pub hazards: Vec<Hazard>,
    pub platforms: Vec<Platform>,
    pub items: Vec<Item>,
    pub obstacles: Vec<Obstacle>,
    pub pursuer: Option<Pursuer>,
}

impl Registry {
    /// Empty board with the frog on its start cell
    pub fn new(config: &Config, now: f64) -> Self {
        Self {
            actor: Actor::new(config.start_position(), now),
            hazards: Vec::with_capacity(MAX_CARS),
            platforms: Vec::with_capacity(MAX_FRIENDLY_CARS),
            items: Vec::with_capacity(MAX_COINS),
            obstacles: Vec::with_capacity(MAX_OBSTACLES),
            pursuer: None,
        }
    }

    /// Check every position and index against the board and capacities
    pub fn within_bounds(&self, config: &Config) -> bool {
        let on_board = |p: IVec2| {
            (0..config.screen_width).contains(&p.x) && (0..config.screen_height).contains(&p.y)
        };

        let carrier_ok = match self.actor.carrier {
            Some(i) => i < self.platforms.len(),
            None => true,
        };

        carrier_ok
            && on_board(self.actor.pos)
            && self.hazards.len() <= MAX_CARS
            && self.platforms.len() <= MAX_FRIENDLY_CARS
            && self.items.len() <= MAX_COINS
            && self.obstacles.len() <= MAX_OBSTACLES
            && self.hazards.iter().all(|h| on_board(h.pos))
            && self.platforms.iter().all(|p| on_board(p.pos))
            && self.items.iter().all(|i| on_board(i.pos))
            && self
                .obstacles
                .iter()
                .all(|o| on_board(o.pos) && on_board(o.pos + IVec2::new(OBSTACLE_WIDTH - 1, 0)))
            && self.pursuer.as_ref().is_none_or(|p| on_board(p.pos))
    }
}

/// Level, score and lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Current level (1..=MAX_LEVEL)
    pub level: u32,
    pub score: u64,
    pub lives: u32,
    /// Clock reading when the run started (seconds)
    pub started_at: f64,
    /// Seconds played so far
    pub elapsed: f64,
}

impl Progress {
    pub fn new(now: f64) -> Self {
        Self {
            level: FIRST_LEVEL,
            score: 0,
            lives: STARTING_LIVES,
            started_at: now,
            elapsed: 0.0,
        }
    }
}

/// RNG state wrapper for serialization
///
/// Each consumer call gets a fresh generator for the next stream, so a run
/// replays exactly from its seed and a restored snapshot keeps going where
/// it left off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn next_rng(&mut self) -> Pcg32 {
        let mixed = self.stream.wrapping_mul(2654435761).wrapping_add(self.seed);
        self.stream += 1;
        Pcg32::seed_from_u64(mixed)
    }
}

/// Final stats shown on the game-over screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u64,
    pub level: u32,
    pub seconds_played: f64,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng_state: RngState,
    pub phase: GamePhase,
    pub progress: Progress,
    pub registry: Registry,
}

impl GameState {
    /// Start a new run on level 1 with a freshly generated board
    pub fn new(config: &Config, seed: u64, now: f64) -> Self {
        let mut state = Self {
            seed,
            rng_state: RngState::new(seed),
            phase: GamePhase::Playing,
            progress: Progress::new(now),
            registry: Registry::new(config, now),
        };
        state.regenerate(config);
        state
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Regenerate the board for the current level
    pub fn regenerate(&mut self, config: &Config) {
        let mut rng = self.rng_state.next_rng();
        generate_level(&mut self.registry, config, self.progress.level, &mut rng);
    }

    /// Move on to the next level, or end the run after the last one.
    ///
    /// Returns true if the run ended. Score and lives carry over.
    pub fn advance_level(&mut self, config: &Config) -> bool {
        if self.progress.level < MAX_LEVEL {
            self.progress.level += 1;
            log::info!("Advancing to level {}", self.progress.level);
            self.regenerate(config);
            false
        } else {
            log::info!("Final level cleared with score {}", self.progress.score);
            self.progress.lives = 0;
            self.phase = GamePhase::GameOver;
            true
        }
    }

    /// Take a life and send the frog back to the start.
    ///
    /// The stork goes back to its perch too, otherwise one parked on the
    /// start cell would take every remaining life on consecutive ticks.
    /// Returns true if that was the last life.
    pub fn lose_life(&mut self, config: &Config) -> bool {
        self.progress.lives = self.progress.lives.saturating_sub(1);
        self.registry.actor.reset_to(config.start_position());
        if let Some(pursuer) = self.registry.pursuer.as_mut() {
            pursuer.pos = config.pursuer_start();
        }
        log::debug!("Life lost, {} remaining", self.progress.lives);
        if self.progress.lives == 0 {
            log::info!("Game over with score {}", self.progress.score);
            self.phase = GamePhase::GameOver;
            true
        } else {
            false
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            score: self.progress.score,
            level: self.progress.level,
            seconds_played: self.progress.elapsed,
        }
    }
}
