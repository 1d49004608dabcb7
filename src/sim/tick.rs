//! Fixed-order simulation tick
//!
//! Core game loop that advances the board one frame. Within a tick the order
//! is frog, stork, platforms, cars; later steps read the results of earlier
//! ones (a carried frog is snapped onto its platform after the platform moves).

use glam::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{Outcome, Resolution, resolve};
use super::state::{GameState, Heading, Registry};
use crate::config::Config;
use crate::consts::*;
use crate::{manhattan, step_toward};

/// Direction the player asked the frog to jump this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Intent {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

impl Intent {
    pub fn delta(self) -> IVec2 {
        match self {
            Intent::None => IVec2::ZERO,
            Intent::Up => IVec2::new(0, -1),
            Intent::Down => IVec2::new(0, 1),
            Intent::Left => IVec2::new(-1, 0),
            Intent::Right => IVec2::new(1, 0),
        }
    }
}

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub intent: Intent,
    /// Caller's clock reading in seconds
    pub now: f64,
    /// Idle/demo mode - the autopilot picks the intent
    pub idle_mode: bool,
}

/// What happened during one call to [`tick`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    /// The jump cooldown fired this tick
    pub jumped: bool,
    pub resolution: Resolution,
    pub life_lost: bool,
    pub level_advanced: bool,
    pub game_over: bool,
}

/// Advance the board by one frame without resolving collisions.
///
/// Returns true if the jump cooldown fired (the frog jumped, or let go of
/// its platform).
pub fn step<R: Rng + ?Sized>(
    registry: &mut Registry,
    config: &Config,
    level: u32,
    input: &TickInput,
    rng: &mut R,
) -> bool {
    let jumped = move_actor(registry, config, input.intent, input.now);
    if jumped {
        move_pursuer(registry, level);
    }
    update_platforms(registry, config);
    update_hazards(registry, config, rng);
    jumped
}

/// Run one full frame: step the board, resolve contacts, then apply the
/// outcome to lives, score and level.
pub fn tick(state: &mut GameState, config: &Config, input: &TickInput) -> TickReport {
    if state.is_over() {
        return TickReport::default();
    }

    state.progress.elapsed = (input.now - state.progress.started_at).max(0.0);

    let mut input = input.clone();
    if input.idle_mode {
        input.intent = autopilot(&state.registry, config);
    }

    let mut rng = state.rng_state.next_rng();
    let jumped = step(
        &mut state.registry,
        config,
        state.progress.level,
        &input,
        &mut rng,
    );
    let resolution = resolve(&mut state.registry, &mut state.progress);

    let mut report = TickReport {
        jumped,
        resolution,
        ..Default::default()
    };

    match resolution.outcome {
        Outcome::None => {}
        Outcome::HazardHit | Outcome::PursuerHit => {
            report.life_lost = true;
            report.game_over = state.lose_life(config);
        }
        Outcome::ObstacleHit => {
            if config.obstacles_lethal {
                report.life_lost = true;
                report.game_over = state.lose_life(config);
            } else {
                let actor = &mut state.registry.actor;
                actor.pos = actor.prev_pos;
            }
        }
        Outcome::GoalReached => {
            state.progress.score += GOAL_BONUS;
            report.game_over = state.advance_level(config);
            report.level_advanced = !report.game_over;
        }
    }

    report
}

/// Apply a jump if the cooldown allows one. A carried frog spends the jump
/// letting go of its platform instead of moving.
fn move_actor(registry: &mut Registry, config: &Config, intent: Intent, now: f64) -> bool {
    let actor = &mut registry.actor;
    if intent == Intent::None || !actor.cooldown_elapsed(now) {
        return false;
    }

    actor.prev_pos = actor.pos;
    if actor.is_carried() {
        actor.carrier = None;
    } else {
        // Each axis is applied only if it stays on the board
        let delta = intent.delta();
        let x = actor.pos.x + delta.x;
        if (0..config.screen_width).contains(&x) {
            actor.pos.x = x;
        }
        let y = actor.pos.y + delta.y;
        if config.frog_rows().contains(&y) {
            actor.pos.y = y;
        }
    }

    actor.last_move_at = now;
    actor.steps += 1;
    true
}

/// The stork closes in every jump from level 3, every other jump on level 2
fn move_pursuer(registry: &mut Registry, level: u32) {
    let Some(pursuer) = registry.pursuer.as_mut() else {
        return;
    };
    let hunts = match level {
        0 | 1 => false,
        2 => registry.actor.steps % 2 == 0,
        _ => true,
    };
    if hunts {
        pursuer.pos = step_toward(pursuer.pos, registry.actor.pos);
    }
}

/// Move along the lane, turning around at either edge
fn bounce(x: &mut i32, heading: &mut Heading, speed: i32, width: i32) {
    *x += heading.sign() * speed;
    if *x >= width {
        *heading = Heading::Left;
        *x = width - 1;
    } else if *x < 0 {
        *heading = Heading::Right;
        *x = 0;
    }
}

fn update_platforms(registry: &mut Registry, config: &Config) {
    for platform in &mut registry.platforms {
        bounce(
            &mut platform.pos.x,
            &mut platform.heading,
            platform.speed,
            config.screen_width,
        );
    }

    // Lowest index wins when platforms overlap
    let actor = &mut registry.actor;
    if let Some(index) = registry.platforms.iter().position(|p| p.pos == actor.pos) {
        actor.carrier = Some(index);
    }
    if let Some(platform) = actor.carrier.and_then(|i| registry.platforms.get(i)) {
        actor.pos = platform.pos;
    }
}

fn update_hazards<R: Rng + ?Sized>(registry: &mut Registry, config: &Config, rng: &mut R) {
    let frog = registry.actor.pos;
    let width = config.screen_width;

    for (i, hazard) in registry.hazards.iter_mut().enumerate() {
        if hazard.spawn_delay > 0 {
            hazard.spawn_delay -= 1;
            continue;
        }

        hazard.frozen =
            hazard.stops && manhattan(frog, hazard.pos) <= config.proximity_threshold;
        if hazard.frozen {
            continue;
        }

        // Even lanes occasionally surge to the top speed tier
        if i % 2 == 0 && rng.random_bool(SPEED_SURGE_CHANCE) {
            hazard.speed = rng.random_range(1..=config.max_speed_level_3);
        }

        if i < BOUNCING_HAZARDS {
            bounce(&mut hazard.pos.x, &mut hazard.heading, hazard.speed, width);
        } else {
            hazard.pos.x += hazard.heading.sign() * hazard.speed;
            let respawn_x = if hazard.pos.x >= width {
                Some(0)
            } else if hazard.pos.x < 0 {
                Some(width - 1)
            } else {
                None
            };
            if let Some(x) = respawn_x {
                hazard.pos.x = x;
                hazard.spawn_delay = rng.random_range(1..=MAX_SPAWN_DELAY);
            }
        }
    }
}

/// Pick a jump for the demo: up when the cell above is clear, otherwise
/// sidestep, otherwise wait.
pub fn autopilot(registry: &Registry, config: &Config) -> Intent {
    let frog = registry.actor.pos;
    if registry.actor.is_carried() {
        return Intent::Up;
    }

    [Intent::Up, Intent::Left, Intent::Right]
        .into_iter()
        .find(|intent| {
            let cell = frog + intent.delta();
            (0..config.screen_width).contains(&cell.x)
                && config.frog_rows().contains(&cell.y)
                && is_safe(registry, cell)
        })
        .unwrap_or(Intent::None)
}

/// Conservative safety check: stays out of a car's reach for the next tick
fn is_safe(registry: &Registry, cell: IVec2) -> bool {
    let near_car = registry.hazards.iter().any(|h| {
        let reach = h.speed.max(1) * 2;
        h.pos.y == cell.y && (h.pos.x - cell.x).abs() <= reach
    });
    let blocked = registry.obstacles.iter().any(|o| o.covers(cell));
    let stork = registry
        .pursuer
        .as_ref()
        .is_some_and(|p| manhattan(p.pos, cell) <= 1);
    !near_car && !blocked && !stork
}
