//! Scoring module - shape points and level progression
//!
//! Each level has a score band `[previous_objective, objective)`. When the
//! score reaches the objective the level increments once and the band moves
//! up. The objective for level `L` with base increment `B` is:
//!
//! - `B` for level 1
//! - `L * B + L * 100` above level 1

use tracing::{info, warn};

use crate::types::{MatchShape, FALLBACK_MATCH_SCORE, LEVEL_BONUS_PER_LEVEL, LEVEL_SCORE_TO_ADD};

/// Points for a match tier; unknown shapes fall back to a fixed score.
pub fn score_for(shape: Option<MatchShape>) -> u32 {
    match shape {
        Some(shape) => shape.points(),
        None => {
            warn!(
                points = FALLBACK_MATCH_SCORE,
                "unrecognized match shape, applying fallback score"
            );
            FALLBACK_MATCH_SCORE
        }
    }
}

/// Score needed to leave `level`
pub fn level_objective(level: u32, base: u32) -> u32 {
    let objective = level.saturating_mul(base);
    if level <= 1 {
        objective
    } else {
        objective.saturating_add(level.saturating_mul(LEVEL_BONUS_PER_LEVEL))
    }
}

/// Score, level and objective band of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    score: u32,
    level: u32,
    objective: u32,
    previous_objective: u32,
    base: u32,
}

impl Progress {
    pub fn new(base: u32) -> Self {
        Self {
            score: 0,
            level: 1,
            objective: level_objective(1, base),
            previous_objective: 0,
            base,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn objective(&self) -> u32 {
        self.objective
    }

    pub fn previous_objective(&self) -> u32 {
        self.previous_objective
    }

    /// Add points; the score never decreases.
    pub fn award(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Move up one level if the objective is reached. Called once per batch,
    /// so a batch advances at most one level.
    pub fn try_level_up(&mut self) -> bool {
        if self.score < self.objective {
            return false;
        }
        self.level += 1;
        self.previous_objective = self.objective;
        self.objective = level_objective(self.level, self.base);
        info!(level = self.level, objective = self.objective, "level up");
        true
    }

    /// Position inside the current band, clamped to `0.0..=1.0`
    pub fn fraction(&self) -> f32 {
        let span = self.objective.saturating_sub(self.previous_objective);
        if span == 0 {
            return 1.0;
        }
        let done = self.score.saturating_sub(self.previous_objective);
        (done as f32 / span as f32).clamp(0.0, 1.0)
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.base);
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new(LEVEL_SCORE_TO_ADD)
    }
}
