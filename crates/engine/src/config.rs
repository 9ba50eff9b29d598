//! Session configuration
//!
//! Sources, later ones winning:
//!
//! 1. Built-in defaults
//! 2. The JSON file named by `MATCH3_CONFIG`, if set
//! 3. `MATCH3_*` environment overrides
//!
//! The result is checked with [`GameConfig::validate`] before a session uses it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::types::{
    PieceKind, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH, FALL_ANIM_MS, LEVEL_SCORE_TO_ADD,
    MAX_BOARD_DIM, MIN_BOARD_DIM, SCALE_OUT_MS, SPAWN_ANIM_MS, SWAP_ANIM_MS, TIMER_START_MS,
    TIMER_STEP_MS,
};

pub const CONFIG_PATH_ENV: &str = "MATCH3_CONFIG";

const MIN_KINDS: u8 = 3;
const MAX_KINDS: u8 = PieceKind::ALL.len() as u8;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("board {width}x{height} is outside {min}..={max} per side")]
    Dimensions {
        width: u8,
        height: u8,
        min: u8,
        max: u8,
    },
    #[error("palette of {kinds} kinds is outside {min}..={max}")]
    Palette { kinds: u8, min: u8, max: u8 },
    #[error("timer step must be non-zero")]
    ZeroTimerStep,
    #[error("level score increment must be non-zero")]
    ZeroLevelScore,
}

/// Presentation durations in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationTimings {
    pub swap_ms: u32,
    pub fall_ms: u32,
    pub spawn_ms: u32,
    pub scale_out_ms: u32,
}

impl AnimationTimings {
    /// All-zero timings for tests and headless play
    pub fn instant() -> Self {
        Self {
            swap_ms: 0,
            fall_ms: 0,
            spawn_ms: 0,
            scale_out_ms: 0,
        }
    }
}

impl Default for AnimationTimings {
    fn default() -> Self {
        Self {
            swap_ms: SWAP_ANIM_MS,
            fall_ms: FALL_ANIM_MS,
            spawn_ms: SPAWN_ANIM_MS,
            scale_out_ms: SCALE_OUT_MS,
        }
    }
}

/// Game session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: u8,
    pub height: u8,
    /// Number of piece kinds in play (a prefix of the full palette)
    pub kinds: u8,
    pub seed: u32,
    /// Base score increment used for the level objectives
    pub level_score: u32,
    pub timer_ms: u32,
    pub timer_step_ms: u32,
    pub animation: AnimationTimings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            kinds: MAX_KINDS,
            seed: 1,
            level_score: LEVEL_SCORE_TO_ADD,
            timer_ms: TIMER_START_MS,
            timer_step_ms: TIMER_STEP_MS,
            animation: AnimationTimings::default(),
        }
    }
}

/// Overwrite `$field` when `$key` is set and parses
macro_rules! env_override {
    ($config:expr, $lookup:expr, $field:ident, $key:expr) => {
        if let Some(raw) = $lookup($key) {
            match raw.trim().parse() {
                Ok(v) => $config.$field = v,
                Err(_) => warn!(key = $key, value = %raw, "ignoring unparsable override"),
            }
        }
    };
}

impl GameConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Full load: optional file, then environment overrides, then validation
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                info!("Loading config from {}: {}", CONFIG_PATH_ENV, path);
                Self::from_path(Path::new(path.trim()))?
            }
            _ => {
                debug!("No {} set, using built-in defaults", CONFIG_PATH_ENV);
                Self::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `MATCH3_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        env_override!(self, lookup, width, "MATCH3_WIDTH");
        env_override!(self, lookup, height, "MATCH3_HEIGHT");
        env_override!(self, lookup, kinds, "MATCH3_KINDS");
        env_override!(self, lookup, seed, "MATCH3_SEED");
        env_override!(self, lookup, timer_ms, "MATCH3_TIMER_MS");
        env_override!(self, lookup, level_score, "MATCH3_LEVEL_SCORE");
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let dims = MIN_BOARD_DIM..=MAX_BOARD_DIM;
        if !dims.contains(&self.width) || !dims.contains(&self.height) {
            return Err(ConfigError::Dimensions {
                width: self.width,
                height: self.height,
                min: MIN_BOARD_DIM,
                max: MAX_BOARD_DIM,
            });
        }
        if !(MIN_KINDS..=MAX_KINDS).contains(&self.kinds) {
            return Err(ConfigError::Palette {
                kinds: self.kinds,
                min: MIN_KINDS,
                max: MAX_KINDS,
            });
        }
        if self.timer_step_ms == 0 {
            return Err(ConfigError::ZeroTimerStep);
        }
        if self.level_score == 0 {
            return Err(ConfigError::ZeroLevelScore);
        }
        Ok(())
    }

    /// Kinds in play
    pub fn palette(&self) -> &'static [PieceKind] {
        let n = (self.kinds as usize).min(PieceKind::ALL.len());
        &PieceKind::ALL[..n]
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_board(mut self, width: u8, height: u8) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_animation(mut self, animation: AnimationTimings) -> Self {
        self.animation = animation;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.palette().len(), 6);
        assert_eq!(config.timer_ms, 120_000);
        assert_eq!(config.animation.swap_ms, 300);
    }

    #[test]
    fn test_json_keeps_defaults_for_missing_fields() {
        let config = GameConfig::from_json_str(r#"{"width": 6, "animation": {"fall_ms": 50}}"#)
            .unwrap();
        assert_eq!(config.width, 6);
        assert_eq!(config.height, DEFAULT_BOARD_HEIGHT);
        assert_eq!(config.animation.fall_ms, 50);
        assert_eq!(config.animation.swap_ms, SWAP_ANIM_MS);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        let err = GameConfig::from_json_str("{width: 6").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("MATCH3_WIDTH", "5"),
            ("MATCH3_SEED", " 99 "),
            ("MATCH3_KINDS", "four"),
        ]
        .into_iter()
        .collect();

        let mut config = GameConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.width, 5);
        assert_eq!(config.seed, 99);
        // Unparsable values are ignored.
        assert_eq!(config.kinds, 6);
    }

    #[test]
    fn test_validate_rejects() {
        let small = GameConfig::default().with_board(2, 8);
        assert!(matches!(small.validate(), Err(ConfigError::Dimensions { .. })));

        let large = GameConfig::default().with_board(8, 33);
        assert!(matches!(large.validate(), Err(ConfigError::Dimensions { .. })));

        let palette = GameConfig {
            kinds: 2,
            ..GameConfig::default()
        };
        assert!(matches!(palette.validate(), Err(ConfigError::Palette { kinds: 2, .. })));

        let step = GameConfig {
            timer_step_ms: 0,
            ..GameConfig::default()
        };
        assert!(matches!(step.validate(), Err(ConfigError::ZeroTimerStep)));

        let level = GameConfig {
            level_score: 0,
            ..GameConfig::default()
        };
        assert!(matches!(level.validate(), Err(ConfigError::ZeroLevelScore)));
    }

    #[test]
    fn test_missing_file() {
        let err = GameConfig::from_path(Path::new("/nonexistent/match3.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
