//! Cascade resolver
//!
//! Runs matched batches in strict order: score, remove, gravity, refill,
//! re-detect. Every animation is awaited before the next step starts, and the
//! board is only mutated here.

use tracing::debug;

use crate::config::AnimationTimings;
use crate::core::{
    apply_gravity, apply_refill, find_board_match, plan_gravity, plan_refill, remove_matches,
    score_for, Board, BoardError, Match, Progress, RefillSource, SimpleRng,
};
use crate::presenter::{Motion, Presenter, ScreenPos};
use crate::types::{MatchShape, PieceKind, Sound};

/// One scored match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchReport {
    pub shape: Option<MatchShape>,
    pub points: u32,
    pub size: usize,
}

impl MatchReport {
    /// Shape label, `"unknown"` for unrecognized shapes
    pub fn label(&self) -> &'static str {
        self.shape.map(|s| s.label()).unwrap_or("unknown")
    }
}

/// One batch of matches resolved together
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchReport {
    pub matches: Vec<MatchReport>,
    pub points: u32,
    pub leveled_up: bool,
}

pub(crate) struct Resolver<'a, P> {
    pub board: &'a mut Board,
    pub progress: &'a mut Progress,
    pub refills: &'a mut RefillSource,
    pub fx: &'a mut SimpleRng,
    pub palette: &'a [PieceKind],
    pub timings: AnimationTimings,
    pub presenter: &'a P,
}

impl<P: Presenter> Resolver<'_, P> {
    /// Resolve `first` and every cascade it causes, until the board is stable.
    pub async fn run(&mut self, first: Vec<Match>) -> Result<Vec<BatchReport>, BoardError> {
        let mut batches = Vec::new();
        let mut pending = first;
        loop {
            let report = self.resolve_batch(&pending).await?;
            batches.push(report);
            match find_board_match(&*self.board) {
                Some(next) => {
                    debug!(depth = batches.len() + 1, kind = next.kind.as_str(), "cascade continues");
                    pending = vec![next];
                }
                None => break,
            }
        }
        Ok(batches)
    }

    async fn resolve_batch(&mut self, matches: &[Match]) -> Result<BatchReport, BoardError> {
        let mut report = BatchReport::default();

        for m in matches {
            let shape = m.shape();
            let points = score_for(shape);
            self.progress.award(points);
            let (col, row) = m.centroid();
            self.presenter.float_score(points, ScreenPos::new(col, row), m.kind);
            debug!(kind = m.kind.as_str(), size = m.len(), points, "scored match");
            report.points += points;
            report.matches.push(MatchReport {
                shape,
                points,
                size: m.len(),
            });
        }

        report.leveled_up = self.progress.try_level_up();
        self.presenter.set_score_text(&self.progress.score().to_string());
        if report.leveled_up {
            self.presenter.play_sound(Sound::LevelUp);
            self.presenter.set_level_text(&self.progress.level().to_string());
        }
        self.presenter.set_level_progress(self.progress.fraction());

        let removed = remove_matches(self.board, matches)?;
        for _ in 0..2 {
            let variant = self.fx.next_range(3) as u8 + 1;
            self.presenter.play_sound(Sound::Bubble(variant));
        }
        let ids: Vec<_> = removed.iter().map(|p| p.id()).collect();
        self.presenter.scale_out(&ids, self.timings.scale_out_ms).await;

        let falls = plan_gravity(self.board);
        apply_gravity(self.board, &falls)?;
        let motions: Vec<Motion> = falls
            .iter()
            .map(|f| Motion {
                piece: f.piece,
                to: f.to.into(),
                duration_ms: self.timings.fall_ms,
            })
            .collect();
        debug!(falls = motions.len(), "gravity");
        self.presenter.move_all(&motions).await;

        let spawns = plan_refill(self.board, &mut *self.refills, self.palette)?;
        let placed = apply_refill(self.board, &spawns)?;
        let motions: Vec<Motion> = placed
            .iter()
            .map(|(id, spawn)| {
                self.presenter.place(*id, spawn.kind, spawn.entry().into());
                Motion {
                    piece: *id,
                    to: spawn.tile.into(),
                    duration_ms: self.timings.spawn_ms,
                }
            })
            .collect();
        debug!(spawns = motions.len(), "refill");
        self.presenter.move_all(&motions).await;

        Ok(report)
    }
}
