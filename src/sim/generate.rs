//! Level generation
//!
//! Lays out a fresh board for a level: lanes of cars, rescue platforms,
//! coins on distinct rows, and obstacles kept off the car lanes.

use glam::IVec2;
use rand::Rng;
use rand::seq::index;

use super::state::{Hazard, Heading, Item, Obstacle, Platform, Pursuer, Registry};
use crate::config::Config;
use crate::consts::*;

/// Overwrite every entity in `registry` with a new layout for `level`.
///
/// Deterministic for a given generator state. The frog's jump clock is kept
/// so a new level doesn't hand out a free jump.
pub fn generate_level<R: Rng + ?Sized>(
    registry: &mut Registry,
    config: &Config,
    level: u32,
    rng: &mut R,
) {
    registry.actor.reset_to(config.start_position());
    registry.actor.steps = 0;

    place_hazards(registry, config, level, rng);
    place_platforms(registry, config, rng);
    place_items(registry, config, rng);
    place_obstacles(registry, config, rng);

    registry.pursuer = (level >= PURSUER_LEVEL).then(|| Pursuer {
        pos: config.pursuer_start(),
    });

    log::info!(
        "Level {}: {} cars, {} platforms, {} coins, {} obstacles{}",
        level,
        registry.hazards.len(),
        registry.platforms.len(),
        registry.items.len(),
        registry.obstacles.len(),
        if registry.pursuer.is_some() { ", stork" } else { "" }
    );
}

/// Random column anywhere on the board
fn random_column<R: Rng + ?Sized>(config: &Config, rng: &mut R) -> i32 {
    rng.random_range(0..config.screen_width)
}

/// Random row inside the playfield
fn random_row<R: Rng + ?Sized>(config: &Config, rng: &mut R) -> i32 {
    rng.random_range(config.playfield_rows())
}

/// One car per lane, two of them marked as stopping cars
fn place_hazards<R: Rng + ?Sized>(
    registry: &mut Registry,
    config: &Config,
    level: u32,
    rng: &mut R,
) {
    let cap = config.speed_cap(level);
    registry.hazards.clear();
    for i in 0..config.max_cars {
        registry.hazards.push(Hazard {
            pos: IVec2::new(
                random_column(config, rng),
                FIRST_LANE_ROW + i as i32 * LANE_SPACING,
            ),
            heading: Heading::random(rng),
            speed: rng.random_range(1..=cap),
            spawn_delay: rng.random_range(1..=MAX_SPAWN_DELAY),
            stops: false,
            frozen: false,
        });
    }

    let stoppers = STOPPING_HAZARDS.min(registry.hazards.len());
    for i in index::sample(rng, registry.hazards.len(), stoppers) {
        registry.hazards[i].stops = true;
    }
}

/// Platforms always use the level-1 speed tier
fn place_platforms<R: Rng + ?Sized>(registry: &mut Registry, config: &Config, rng: &mut R) {
    let rows = config.playfield_rows().count() as i32;
    registry.platforms.clear();
    for i in 0..config.max_friendly_cars {
        registry.platforms.push(Platform {
            pos: IVec2::new(
                random_column(config, rng),
                FIRST_LANE_ROW + (i as i32 * LANE_SPACING) % rows,
            ),
            heading: Heading::random(rng),
            speed: rng.random_range(1..=config.max_speed_level_1),
        });
    }
}

/// Coins never share a row
fn place_items<R: Rng + ?Sized>(registry: &mut Registry, config: &Config, rng: &mut R) {
    registry.items.clear();
    for _ in 0..config.max_coins {
        let x = random_column(config, rng);
        let mut y = random_row(config, rng);
        while registry.items.iter().any(|item| item.pos.y == y) {
            y = random_row(config, rng);
        }
        registry.items.push(Item {
            pos: IVec2::new(x, y),
            collected: false,
        });
    }
}

/// Obstacles avoid every car lane. Obstacles may overlap each other.
fn place_obstacles<R: Rng + ?Sized>(registry: &mut Registry, config: &Config, rng: &mut R) {
    let count = config.obstacle_count();
    registry.obstacles.clear();
    for _ in 0..count {
        let pos = loop {
            let x = rng.random_range(0..=config.screen_width - OBSTACLE_WIDTH);
            let y = random_row(config, rng);
            if !registry.hazards.iter().any(|h| h.pos.y == y) {
                break IVec2::new(x, y);
            }
        };
        registry.obstacles.push(Obstacle { pos });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn config() -> Config {
        Config::default().validated().unwrap()
    }

    fn generated(config: &Config, level: u32, seed: u64) -> Registry {
        let mut registry = Registry::new(config, 0.0);
        let mut rng = Pcg32::seed_from_u64(seed);
        generate_level(&mut registry, config, level, &mut rng);
        registry
    }

    #[test]
    fn test_hazards_fill_lanes_in_order() {
        let config = config();
        let registry = generated(&config, 1, 3);
        assert_eq!(registry.hazards.len(), config.max_cars);
        for (i, hazard) in registry.hazards.iter().enumerate() {
            assert_eq!(hazard.pos.y, 2 + 2 * i as i32);
            assert!((1..=config.max_speed_level_1).contains(&hazard.speed));
            assert!((1..=MAX_SPAWN_DELAY).contains(&hazard.spawn_delay));
            assert!(!hazard.frozen);
        }
    }

    #[test]
    fn test_level_three_uses_fastest_tier() {
        let config = Config {
            max_speed_level_3: 6,
            ..config()
        };
        let registry = generated(&config, 3, 11);
        assert!(registry.hazards.iter().all(|h| (1..=6).contains(&h.speed)));
        // Platforms stay on the slowest tier regardless of level
        assert!(
            registry
                .platforms
                .iter()
                .all(|p| (1..=config.max_speed_level_1).contains(&p.speed))
        );
    }

    #[test]
    fn test_platform_rows_wrap_inside_playfield() {
        let config = config();
        let registry = generated(&config, 1, 9);
        let rows: Vec<i32> = registry.platforms.iter().map(|p| p.pos.y).collect();
        assert_eq!(rows, vec![2, 4]);
    }

    #[test]
    fn test_frog_placed_on_start_cell() {
        let config = config();
        let registry = generated(&config, 2, 1);
        assert_eq!(registry.actor.pos, IVec2::new(40, 22));
        assert_eq!(registry.actor.steps, 0);
        assert!(!registry.actor.is_carried());
    }

    #[test]
    fn test_pursuer_only_from_level_two() {
        let config = config();
        assert!(generated(&config, 1, 4).pursuer.is_none());
        let pursuer = generated(&config, 2, 4).pursuer.unwrap();
        assert_eq!(pursuer.pos, IVec2::new(79, 22));
        assert!(generated(&config, 3, 4).pursuer.is_some());
    }

    #[test]
    fn test_regenerating_clears_collected_coins() {
        let config = config();
        let mut registry = generated(&config, 1, 2);
        registry.items[0].collected = true;
        let mut rng = Pcg32::seed_from_u64(99);
        generate_level(&mut registry, &config, 2, &mut rng);
        assert!(registry.items.iter().all(|item| !item.collected));
        assert_eq!(registry.items.len(), config.max_coins);
    }

    #[test]
    fn test_coins_fill_every_row_of_tight_board() {
        // 8 rows tall leaves exactly 4 playfield rows for 4 coins
        let config = Config {
            screen_height: 8,
            max_coins: 4,
            ..Default::default()
        }
        .validated()
        .unwrap();
        let registry = generated(&config, 1, 21);
        let mut rows: Vec<i32> = registry.items.iter().map(|i| i.pos.y).collect();
        rows.sort();
        assert_eq!(rows, vec![2, 3, 4, 5]);
    }

    proptest! {
        #[test]
        fn prop_generator_invariants(seed in any::<u64>(), level in 1u32..=3) {
            let config = config();
            let registry = generated(&config, level, seed);

            prop_assert!(registry.within_bounds(&config));

            // No two coins share a row
            for (i, a) in registry.items.iter().enumerate() {
                for b in &registry.items[i + 1..] {
                    prop_assert_ne!(a.pos.y, b.pos.y);
                }
            }

            // No obstacle sits on a car lane
            for obstacle in &registry.obstacles {
                prop_assert!(registry.hazards.iter().all(|h| h.pos.y != obstacle.pos.y));
            }

            // Exactly two stopping cars
            prop_assert_eq!(registry.hazards.iter().filter(|h| h.stops).count(), 2);

            prop_assert_eq!(registry.obstacles.len(), config.obstacle_count());
        }
    }
}
