//! Game tunables
//!
//! Read once before the run starts from a `key=value` text file and never
//! mutated by the simulation afterwards.

use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors produced while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // === Shapes (passed through to rendering) ===
    pub frog_size: i32,
    pub frog_shape: char,
    pub car_size: i32,
    pub car_shape: char,
    pub friendly_car_shape: char,
    pub stork_shape: char,

    // === Board ===
    pub screen_width: i32,
    pub screen_height: i32,

    // === Entity counts ===
    /// Hazard (car) count
    pub max_cars: usize,
    /// Rescue platform (friendly car) count
    pub max_friendly_cars: usize,
    /// Coin count
    pub max_coins: usize,
    /// Upper bound on obstacles; the actual count depends on board area
    pub max_obstacles: usize,

    // === Gameplay ===
    /// Seconds the game-over screen waits before exiting
    pub quit_time: u32,
    /// Manhattan distance at which stopping cars brake
    pub proximity_threshold: i32,
    pub max_speed_level_1: i32,
    pub max_speed_level_2: i32,
    pub max_speed_level_3: i32,
    /// Obstacle contact costs a life instead of blocking the jump
    #[serde(default)]
    pub obstacles_lethal: bool,

    // === Colors (opaque to the core) ===
    pub car_color: i16,
    pub friendly_car_color: i16,
    pub frog_color: i16,
    pub coin_color: i16,
    pub goal_color: i16,
    pub stork_color: i16,
    pub road_color: i16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frog_size: 1,
            frog_shape: 'F',
            car_size: 1,
            car_shape: 'C',
            friendly_car_shape: 'P',
            stork_shape: 'S',

            screen_width: 80,
            screen_height: 24,

            max_cars: MAX_CARS,
            max_friendly_cars: MAX_FRIENDLY_CARS,
            max_coins: MAX_COINS,
            max_obstacles: MAX_OBSTACLES,

            quit_time: 10,
            proximity_threshold: 3,
            max_speed_level_1: 1,
            max_speed_level_2: 2,
            max_speed_level_3: 3,
            obstacles_lethal: false,

            car_color: 1,
            friendly_car_color: 2,
            frog_color: 3,
            coin_color: 4,
            goal_color: 5,
            stork_color: 6,
            road_color: 7,
        }
    }
}

impl Config {
    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::parse(&text).validated()?;
        log::info!(
            "Loaded config from {:?} ({}x{} board)",
            path,
            config.screen_width,
            config.screen_height
        );
        Ok(config)
    }

    /// Parse `key=value` lines on top of the defaults.
    ///
    /// Unknown keys are ignored. Numbers are coerced leniently: garbage
    /// reads as 0, exactly like C `atoi`. Shapes take the first character.
    /// The result is not validated; see [`Config::validated`].
    pub fn parse(text: &str) -> Self {
        let mut config = Self::default();
        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim_end_matches('\r');
            if value.is_empty() {
                continue;
            }
            let int = atoi(value);
            match key {
                "frog_size" => config.frog_size = int,
                "frog_shape" => config.frog_shape = first_char(value),
                "car_size" => config.car_size = int,
                "car_shape" => config.car_shape = first_char(value),
                "friendly_car_shape" => config.friendly_car_shape = first_char(value),
                "stork_shape" => config.stork_shape = first_char(value),
                "screen_width" => config.screen_width = int,
                "screen_height" => config.screen_height = int,
                "max_cars" => config.max_cars = int.max(0) as usize,
                "max_friendly_cars" => config.max_friendly_cars = int.max(0) as usize,
                "max_coins" => config.max_coins = int.max(0) as usize,
                "max_obstacles" => config.max_obstacles = int.max(0) as usize,
                "quit_time" => config.quit_time = int.max(0) as u32,
                "proximity_threshold" => config.proximity_threshold = int,
                "max_speed_level_1" => config.max_speed_level_1 = int,
                "max_speed_level_2" => config.max_speed_level_2 = int,
                "max_speed_level_3" => config.max_speed_level_3 = int,
                "obstacles_lethal" => config.obstacles_lethal = int != 0,
                "car_color" => config.car_color = int as i16,
                "friendly_car_color" => config.friendly_car_color = int as i16,
                "frog_color" => config.frog_color = int as i16,
                "coin_color" => config.coin_color = int as i16,
                "goal_color" => config.goal_color = int as i16,
                "stork_color" => config.stork_color = int as i16,
                "road_color" => config.road_color = int as i16,
                _ => log::debug!("Ignoring unknown config key {:?}", key),
            }
        }
        config
    }

    /// Reject boards the generator cannot fill or that exceed the largest
    /// supported size, and clamp counts and speeds to what the board holds.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.screen_width < OBSTACLE_WIDTH {
            return Err(ConfigError::Invalid(format!(
                "screen_width {} is narrower than an obstacle",
                self.screen_width
            )));
        }
        if self.screen_height < MIN_SCREEN_HEIGHT {
            return Err(ConfigError::Invalid(format!(
                "screen_height {} is below the minimum of {}",
                self.screen_height, MIN_SCREEN_HEIGHT
            )));
        }
        if self.screen_width > MAX_SCREEN_SIZE || self.screen_height > MAX_SCREEN_SIZE {
            return Err(ConfigError::Invalid(format!(
                "{}x{} board exceeds the maximum of {} cells per side",
                self.screen_width, self.screen_height, MAX_SCREEN_SIZE
            )));
        }
        if self.max_cars < STOPPING_HAZARDS {
            return Err(ConfigError::Invalid(format!(
                "max_cars {} leaves no room for {} stopping cars",
                self.max_cars, STOPPING_HAZARDS
            )));
        }

        let lanes = self.lane_capacity();
        self.max_cars = clamp_count("max_cars", self.max_cars, MAX_CARS.min(lanes));
        self.max_friendly_cars =
            clamp_count("max_friendly_cars", self.max_friendly_cars, MAX_FRIENDLY_CARS);
        let rows = self.playfield_rows().count();
        self.max_coins = clamp_count("max_coins", self.max_coins, MAX_COINS.min(rows));
        self.max_obstacles = clamp_count("max_obstacles", self.max_obstacles, MAX_OBSTACLES);

        let width = self.screen_width;
        for (name, tier) in [
            ("max_speed_level_1", &mut self.max_speed_level_1),
            ("max_speed_level_2", &mut self.max_speed_level_2),
            ("max_speed_level_3", &mut self.max_speed_level_3),
        ] {
            if *tier < 1 {
                log::warn!("{} = {} coerced to 1", name, tier);
                *tier = 1;
            } else if *tier > width {
                log::warn!("{} = {} clamped to the board width", name, tier);
                *tier = width;
            }
        }

        Ok(self)
    }

    /// Hazard speed bound for a level (levels past 3 use tier 3)
    pub fn speed_cap(&self, level: u32) -> i32 {
        match level {
            0 | 1 => self.max_speed_level_1,
            2 => self.max_speed_level_2,
            _ => self.max_speed_level_3,
        }
    }

    /// Rows entities may be generated on (below the goal, above the HUD)
    pub fn playfield_rows(&self) -> RangeInclusive<i32> {
        FIRST_LANE_ROW..=self.screen_height - 1 - HUD_ROWS
    }

    /// Rows the frog may stand on, goal row through start row
    pub fn frog_rows(&self) -> RangeInclusive<i32> {
        GOAL_ROW..=self.screen_height - HUD_ROWS
    }

    /// Where the frog starts each life
    pub fn start_position(&self) -> glam::IVec2 {
        glam::IVec2::new(self.screen_width / 2, self.screen_height - HUD_ROWS)
    }

    /// Where the stork enters, and returns to after catching the frog
    pub fn pursuer_start(&self) -> glam::IVec2 {
        glam::IVec2::new(self.screen_width - 1, self.screen_height - HUD_ROWS)
    }

    /// Fastest speed any tier allows
    pub fn top_speed(&self) -> i32 {
        self.max_speed_level_1
            .max(self.max_speed_level_2)
            .max(self.max_speed_level_3)
    }

    /// Number of traffic lanes that fit inside the playfield
    pub fn lane_capacity(&self) -> usize {
        let last = *self.playfield_rows().end();
        if last < FIRST_LANE_ROW {
            return 0;
        }
        ((last - FIRST_LANE_ROW) / LANE_SPACING + 1) as usize
    }

    /// Obstacle count for this board: one per `CELLS_PER_OBSTACLE` cells
    pub fn obstacle_count(&self) -> usize {
        let cells = self.screen_width.saturating_mul(self.screen_height);
        let by_area = (cells / CELLS_PER_OBSTACLE).max(0);
        (by_area as usize).min(self.max_obstacles)
    }
}

fn clamp_count(name: &str, value: usize, cap: usize) -> usize {
    if value > cap {
        log::warn!("{} = {} exceeds capacity, clamped to {}", name, value, cap);
        cap
    } else {
        value
    }
}

fn first_char(value: &str) -> char {
    value.chars().next().unwrap_or(' ')
}

/// C-style integer parse: optional whitespace and sign, then leading digits
fn atoi(value: &str) -> i32 {
    let s = value.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut n: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        n = (n * 10 + i64::from(b - b'0')).min(i64::from(i32::MAX) + 1);
    }
    let n = if negative { -n } else { n };
    n.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atoi_coercion() {
        assert_eq!(atoi("42"), 42);
        assert_eq!(atoi("  -7"), -7);
        assert_eq!(atoi("+3"), 3);
        assert_eq!(atoi("12abc"), 12);
        assert_eq!(atoi("abc"), 0);
        assert_eq!(atoi(""), 0);
        assert_eq!(atoi("99999999999"), i32::MAX);
    }

    #[test]
    fn test_parse_overrides_defaults() {
        let text = "screen_width=40\nscreen_height=20\nfrog_shape=@\ncar_color=9\nunknown=5\n";
        let config = Config::parse(text);
        assert_eq!(config.screen_width, 40);
        assert_eq!(config.screen_height, 20);
        assert_eq!(config.frog_shape, '@');
        assert_eq!(config.car_color, 9);
        // Untouched keys keep their defaults
        assert_eq!(config.max_coins, MAX_COINS);
    }

    #[test]
    fn test_parse_garbage_value_reads_as_zero() {
        let config = Config::parse("proximity_threshold=lots\n");
        assert_eq!(config.proximity_threshold, 0);
    }

    #[test]
    fn test_validated_clamps_counts() {
        let config = Config {
            screen_width: 40,
            screen_height: 20,
            max_cars: 50,
            max_coins: 50,
            max_friendly_cars: 7,
            max_obstacles: 100,
            ..Default::default()
        }
        .validated()
        .unwrap();

        // 20 rows: playfield 2..=17 holds lanes 2,4,..,16
        assert_eq!(config.max_cars, 8);
        assert_eq!(config.max_coins, MAX_COINS);
        assert_eq!(config.max_friendly_cars, MAX_FRIENDLY_CARS);
        assert_eq!(config.max_obstacles, MAX_OBSTACLES);
    }

    #[test]
    fn test_validated_coerces_zero_speed_tiers() {
        let config = Config {
            max_speed_level_2: 0,
            ..Default::default()
        }
        .validated()
        .unwrap();
        assert_eq!(config.max_speed_level_2, 1);
    }

    #[test]
    fn test_validated_rejects_tiny_boards() {
        let short = Config {
            screen_height: 5,
            ..Default::default()
        };
        assert!(matches!(short.validated(), Err(ConfigError::Invalid(_))));

        let narrow = Config {
            screen_width: 2,
            ..Default::default()
        };
        assert!(matches!(narrow.validated(), Err(ConfigError::Invalid(_))));

        let lonely = Config {
            max_cars: 1,
            ..Default::default()
        };
        assert!(matches!(lonely.validated(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validated_rejects_oversized_boards() {
        let config = Config::parse("screen_width=70000\nscreen_height=70000\n");
        assert!(matches!(config.validated(), Err(ConfigError::Invalid(_))));

        let tall = Config {
            screen_height: MAX_SCREEN_SIZE + 1,
            ..Default::default()
        };
        assert!(matches!(tall.validated(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_largest_board_counts_obstacles_without_overflow() {
        let config = Config {
            screen_width: MAX_SCREEN_SIZE,
            screen_height: MAX_SCREEN_SIZE,
            ..Default::default()
        }
        .validated()
        .unwrap();
        assert_eq!(config.obstacle_count(), MAX_OBSTACLES);

        let unchecked = Config {
            screen_width: i32::MAX,
            screen_height: i32::MAX,
            ..Default::default()
        };
        assert_eq!(unchecked.obstacle_count(), MAX_OBSTACLES);
    }

    #[test]
    fn test_validated_caps_speed_tiers_at_board_width() {
        let config = Config::parse("screen_width=40\nmax_speed_level_3=2147483647\n")
            .validated()
            .unwrap();
        assert_eq!(config.max_speed_level_3, 40);
        assert_eq!(config.max_speed_level_1, 1);
    }

    #[test]
    fn test_speed_cap_by_level() {
        let config = Config::default();
        assert_eq!(config.speed_cap(1), 1);
        assert_eq!(config.speed_cap(2), 2);
        assert_eq!(config.speed_cap(3), 3);
        assert_eq!(config.speed_cap(7), 3);
    }

    #[test]
    fn test_obstacle_count_scales_with_area() {
        let config = Config::default();
        assert_eq!(config.obstacle_count(), 80 * 24 / 200);

        let huge = Config {
            screen_width: 400,
            screen_height: 100,
            ..Default::default()
        };
        assert_eq!(huge.obstacle_count(), MAX_OBSTACLES);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Config::load("/definitely/not/here/config.txt").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
