//! Save/load of whole-run snapshots
//!
//! A snapshot is the complete [`GameState`]: board, progress and RNG state.
//! Restores are checked against the current config (entity positions, level,
//! lives, speeds) before they are handed back. Writes go to a temporary file
//! first and are renamed into place, so a failed save never clobbers the
//! previous one. Every error leaves the caller's in-memory state alone.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::Config;
use crate::consts::*;
use crate::sim::GameState;

/// Errors produced while saving or restoring a snapshot
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encoding failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("snapshot does not fit the current config: {0}")]
    Incompatible(String),
}

/// Encode a snapshot
pub fn to_bytes(state: &GameState) -> Result<Vec<u8>, PersistError> {
    Ok(serde_json::to_vec(state)?)
}

/// Decode a snapshot and check it fits the board described by `config`
pub fn from_bytes(bytes: &[u8], config: &Config) -> Result<GameState, PersistError> {
    let state: GameState = serde_json::from_slice(bytes)?;
    check_compatible(&state, config)?;
    Ok(state)
}

fn check_compatible(state: &GameState, config: &Config) -> Result<(), PersistError> {
    let incompatible =
        |reason: String| -> Result<(), PersistError> { Err(PersistError::Incompatible(reason)) };

    if !state.registry.within_bounds(config) {
        return incompatible(format!(
            "entities fall outside the {}x{} board",
            config.screen_width, config.screen_height
        ));
    }

    let progress = &state.progress;
    if !(FIRST_LEVEL..=MAX_LEVEL).contains(&progress.level) {
        return incompatible(format!("level {} out of range", progress.level));
    }
    if progress.lives > STARTING_LIVES {
        return incompatible(format!("{} lives is more than a run starts with", progress.lives));
    }

    let speeds = 1..=config.top_speed();
    let registry = &state.registry;
    if let Some(hazard) = registry.hazards.iter().find(|h| !speeds.contains(&h.speed)) {
        return incompatible(format!("car speed {} out of range", hazard.speed));
    }
    if let Some(platform) = registry.platforms.iter().find(|p| !speeds.contains(&p.speed)) {
        return incompatible(format!("platform speed {} out of range", platform.speed));
    }
    if registry.hazards.iter().any(|h| h.spawn_delay > MAX_SPAWN_DELAY) {
        return incompatible("car spawn delay out of range".to_string());
    }
    Ok(())
}

/// Write a snapshot to `path`
pub fn save(state: &GameState, path: impl AsRef<Path>) -> Result<(), PersistError> {
    let path = path.as_ref();
    let bytes = to_bytes(state)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    log::info!("Game saved to {:?} (level {})", path, state.progress.level);
    Ok(())
}

/// Read a snapshot from `path`
pub fn load(path: impl AsRef<Path>, config: &Config) -> Result<GameState, PersistError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let state = from_bytes(&bytes, config)?;
    log::info!("Game loaded from {:?} (level {})", path, state.progress.level);
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Intent, TickInput, tick};
    use std::path::PathBuf;

    fn config() -> Config {
        Config::default().validated().unwrap()
    }

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("jumping-frog-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_save_and_load_file() {
        let config = config();
        let mut state = GameState::new(&config, 31, 0.0);
        for frame in 1..20 {
            let input = TickInput {
                intent: Intent::Left,
                now: frame as f64,
                idle_mode: false,
            };
            tick(&mut state, &config, &input);
        }

        let path = scratch_path("roundtrip");
        save(&state, &path).unwrap();
        let loaded = load(&path, &config).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, state);
    }

    #[test]
    fn test_restored_run_continues_identically() {
        let config = config();
        let mut original = GameState::new(&config, 8, 0.0);
        let mut restored = from_bytes(&to_bytes(&original).unwrap(), &config).unwrap();

        for frame in 1..100 {
            let input = TickInput {
                intent: Intent::None,
                now: frame as f64 * 0.3,
                idle_mode: true,
            };
            tick(&mut original, &config, &input);
            tick(&mut restored, &config, &input);
        }
        assert_eq!(original, restored);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load(scratch_path("missing"), &config()).unwrap_err();
        assert!(matches!(err, PersistError::Io(_)));
    }

    #[test]
    fn test_garbage_is_serialization_error() {
        let err = from_bytes(b"not a snapshot", &config()).unwrap_err();
        assert!(matches!(err, PersistError::Serialization(_)));
    }

    #[test]
    fn test_snapshot_from_bigger_board_rejected() {
        let big = config();
        let state = GameState::new(&big, 4, 0.0);
        let small = Config {
            screen_width: 20,
            screen_height: 12,
            ..Default::default()
        }
        .validated()
        .unwrap();

        let err = from_bytes(&to_bytes(&state).unwrap(), &small).unwrap_err();
        assert!(matches!(err, PersistError::Incompatible(_)));
    }

    #[test]
    fn test_snapshot_with_bad_level_rejected() {
        let config = config();
        let mut state = GameState::new(&config, 4, 0.0);
        state.progress.level = 0;
        let err = from_bytes(&to_bytes(&state).unwrap(), &config).unwrap_err();
        assert!(matches!(err, PersistError::Incompatible(_)));

        state.progress.level = MAX_LEVEL + 1;
        let err = from_bytes(&to_bytes(&state).unwrap(), &config).unwrap_err();
        assert!(matches!(err, PersistError::Incompatible(_)));
    }

    #[test]
    fn test_snapshot_with_runaway_speed_rejected() {
        let config = config();
        let mut state = GameState::new(&config, 4, 0.0);
        state.registry.hazards[3].speed = i32::MAX;
        let err = from_bytes(&to_bytes(&state).unwrap(), &config).unwrap_err();
        assert!(matches!(err, PersistError::Incompatible(_)));

        let mut state = GameState::new(&config, 4, 0.0);
        state.registry.platforms[0].speed = 0;
        let err = from_bytes(&to_bytes(&state).unwrap(), &config).unwrap_err();
        assert!(matches!(err, PersistError::Incompatible(_)));
    }
}
