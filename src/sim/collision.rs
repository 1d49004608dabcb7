//! Collision classification and coin pickup
//!
//! The frog can touch several things in one tick. Contacts are checked in a
//! fixed order and the first hit decides the outcome:
//! cars, then obstacles, then the stork, then the goal row.
//! Coin pickup runs independently of that classification.

use serde::{Deserialize, Serialize};

use super::state::{Progress, Registry};
use crate::consts::*;

/// What the frog ran into this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Outcome {
    #[default]
    None,
    /// Hit by a car (lethal)
    HazardHit,
    /// Jumped into an obstacle (blocks the jump unless obstacles are lethal)
    ObstacleHit,
    /// Caught by the stork (lethal)
    PursuerHit,
    /// Reached the goal row
    GoalReached,
}

impl Outcome {
    /// Whether this outcome always costs a life
    pub fn is_lethal(self) -> bool {
        matches!(self, Outcome::HazardHit | Outcome::PursuerHit)
    }
}

/// Result of resolving one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    pub outcome: Outcome,
    /// Index of the coin picked up this tick
    pub picked_up: Option<usize>,
}

/// Collect any coin under the frog, then classify its contacts.
pub fn resolve(registry: &mut Registry, progress: &mut Progress) -> Resolution {
    let picked_up = collect_item(registry, progress);
    let outcome = classify_contact(registry, progress.level);
    Resolution { outcome, picked_up }
}

/// Classify the frog's contact without touching any state.
///
/// A carried frog is immune to cars, obstacles and the stork, but can still
/// reach the goal row.
pub fn classify_contact(registry: &Registry, level: u32) -> Outcome {
    let frog = registry.actor.pos;

    if !registry.actor.is_carried() {
        let hit_by_car = registry
            .hazards
            .iter()
            .filter(|h| h.is_active())
            .any(|h| h.pos.y == frog.y && h.hit_window().contains(&frog.x));
        if hit_by_car {
            return Outcome::HazardHit;
        }

        if registry.obstacles.iter().any(|o| o.covers(frog)) {
            return Outcome::ObstacleHit;
        }

        if level >= PURSUER_LEVEL
            && registry.pursuer.as_ref().is_some_and(|p| p.pos == frog)
        {
            return Outcome::PursuerHit;
        }
    }

    if frog.y == GOAL_ROW {
        Outcome::GoalReached
    } else {
        Outcome::None
    }
}

/// Mark an uncollected coin on the frog's cell as collected and score it
fn collect_item(registry: &mut Registry, progress: &mut Progress) -> Option<usize> {
    let frog = registry.actor.pos;
    let (index, item) = registry
        .items
        .iter_mut()
        .enumerate()
        .find(|(_, item)| !item.collected && item.pos == frog)?;
    item.collected = true;
    progress.score += COIN_VALUE;
    log::debug!("Coin {} collected, score {}", index, progress.score);
    Some(index)
}
