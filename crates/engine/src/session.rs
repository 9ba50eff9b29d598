//! Game session - the single owner of board, progress and turn state
//!
//! A session accepts one swap at a time. While a cascade is being resolved,
//! further swaps are rejected rather than queued. Rejected swaps are ordinary
//! outcomes ([`SwapOutcome::Rejected`]); `Err` is reserved for broken board
//! invariants.
//!
//! # Turn flow
//!
//! 1. The armed piece is swapped with an adjacent one and the swap animates.
//! 2. A match is looked for at the armed piece's new tile, then at the other.
//! 3. No match: the swap is reverted.
//! 4. Otherwise both matches resolve as one batch, then cascades run until the
//!    board is stable.
//! 5. A stable board with no future move ends the game (deadlock).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigError, GameConfig};
use crate::core::{
    find_future_move, find_match, has_future_move, is_adjacent, layout, Board, BoardError,
    BoardSnapshot, KindGrid, Match, Progress, RefillSource, SimpleRng, Swap,
};
use crate::presenter::{Motion, Presenter, ScreenPos};
use crate::resolver::{BatchReport, Resolver};
use crate::timer::{format_clock, Countdown, GameOverLatch};
use crate::types::{GameOverReason, PieceKind, RejectReason, Tile, TurnState};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Summary of one accepted swap
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TurnReport {
    pub swap: Option<Swap>,
    pub batches: Vec<BatchReport>,
    pub points: u32,
    pub game_over: Option<GameOverReason>,
}

impl TurnReport {
    /// Number of batches, counting the swap's own batch
    pub fn cascade_depth(&self) -> usize {
        self.batches.len()
    }

    pub fn leveled_up(&self) -> bool {
        self.batches.iter().any(|b| b.leveled_up)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Nothing changed
    Rejected(RejectReason),
    /// The swap made no match and was undone
    Reverted,
    Resolved(TurnReport),
}

impl SwapOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SwapOutcome::Resolved(_))
    }

    pub fn report(&self) -> Option<&TurnReport> {
        match self {
            SwapOutcome::Resolved(report) => Some(report),
            _ => None,
        }
    }
}

/// Serializable view of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub width: u8,
    pub height: u8,
    /// Row-major, top row first; `0` empty, otherwise kind index + 1
    pub board: Vec<Vec<u8>>,
    pub score: u32,
    pub level: u32,
    pub objective: u32,
    pub previous_objective: u32,
    pub progress: f32,
    pub state: String,
    pub game_over: Option<String>,
    pub turns: u32,
    pub seed: u32,
}

pub struct GameSession<P: Presenter> {
    config: GameConfig,
    board: Board,
    progress: Progress,
    layout_rng: SimpleRng,
    refills: RefillSource,
    fx: SimpleRng,
    presenter: P,
    resolving: bool,
    selected: Option<Tile>,
    latch: GameOverLatch,
    turns: u32,
}

impl<P: Presenter> GameSession<P> {
    /// Start a session on a freshly generated layout
    pub fn new(config: GameConfig, presenter: P) -> Result<Self, SessionError> {
        config.validate()?;
        let mut layout_rng = SimpleRng::new(config.seed);
        let board = layout::generate(config.width, config.height, config.palette(), &mut layout_rng)?;
        let refills = RefillSource::new(layout_rng.next_u32());
        Ok(Self::assemble(config, board, layout_rng, refills, presenter))
    }

    /// Start a session on a given board; its size overrides the configured one.
    pub fn with_board(config: GameConfig, board: Board, presenter: P) -> Result<Self, SessionError> {
        let config = config.with_board(board.width(), board.height());
        config.validate()?;
        let layout_rng = SimpleRng::new(config.seed);
        let refills = RefillSource::new(config.seed);
        Ok(Self::assemble(config, board, layout_rng, refills, presenter))
    }

    fn assemble(
        config: GameConfig,
        board: Board,
        layout_rng: SimpleRng,
        refills: RefillSource,
        presenter: P,
    ) -> Self {
        let fx = SimpleRng::new(config.seed.rotate_left(16));
        let progress = Progress::new(config.level_score);
        let session = Self {
            config,
            board,
            progress,
            layout_rng,
            refills,
            fx,
            presenter,
            resolving: false,
            selected: None,
            latch: GameOverLatch::new(),
            turns: 0,
        };
        session.present_all();
        session
    }

    fn present_all(&self) {
        self.presenter.clear();
        for piece in self.board.pieces() {
            self.presenter
                .place(piece.id(), piece.kind(), ScreenPos::from(piece.tile()));
        }
        self.presenter.set_score_text(&self.progress.score().to_string());
        self.presenter.set_level_text(&self.progress.level().to_string());
        self.presenter.set_level_progress(self.progress.fraction());
        self.presenter.set_timer_text(&format_clock(self.config.timer_ms));
        self.presenter.highlight(None);
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn selected(&self) -> Option<Tile> {
        self.selected
    }

    /// Accepted swaps that resolved at least one match
    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn latch(&self) -> &GameOverLatch {
        &self.latch
    }

    pub fn state(&self) -> TurnState {
        if self.latch.reason().is_some() {
            TurnState::GameOver
        } else if self.resolving {
            TurnState::Resolving
        } else {
            TurnState::Idle
        }
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.latch.reason()
    }

    /// Queue refill kinds ahead of the random ones
    pub fn script_refills<I: IntoIterator<Item = PieceKind>>(&mut self, kinds: I) {
        self.refills.script(kinds);
    }

    fn gate(&self) -> Result<(), RejectReason> {
        match self.state() {
            TurnState::GameOver => Err(RejectReason::GameOver),
            TurnState::Resolving => Err(RejectReason::Busy),
            TurnState::Idle => Ok(()),
        }
    }

    fn check_tile(&self, tile: Tile) -> Result<(), RejectReason> {
        if !self.board.is_inside(tile.col, tile.row) {
            return Err(RejectReason::OutOfBounds);
        }
        if self.board.kind_at(tile).is_none() {
            return Err(RejectReason::EmptyTile);
        }
        Ok(())
    }

    /// Arm the piece at `tile`, replacing any previous selection
    pub fn select(&mut self, tile: Tile) -> Result<(), RejectReason> {
        self.gate()?;
        self.check_tile(tile)?;
        self.selected = Some(tile);
        self.presenter.highlight(Some(tile));
        Ok(())
    }

    pub fn deselect(&mut self) {
        if self.selected.take().is_some() {
            self.presenter.highlight(None);
        }
    }

    /// Swap `a` with `b`
    pub async fn request_swap(&mut self, a: Tile, b: Tile) -> Result<SwapOutcome, SessionError> {
        if let Err(reason) = self.select(a) {
            self.deselect();
            debug!(reason = reason.as_str(), "swap rejected");
            return Ok(SwapOutcome::Rejected(reason));
        }
        self.swap_selected(b).await
    }

    /// Swap the armed piece with the piece at `target`
    pub async fn swap_selected(&mut self, target: Tile) -> Result<SwapOutcome, SessionError> {
        let from = self.selected;
        self.deselect();

        let checked = self.gate().and_then(|_| {
            let from = from.ok_or(RejectReason::NothingSelected)?;
            self.check_tile(target)?;
            if !is_adjacent(from, target) {
                return Err(RejectReason::NotAdjacent);
            }
            Ok(from)
        });
        let from = match checked {
            Ok(from) => from,
            Err(reason) => {
                debug!(reason = reason.as_str(), "swap rejected");
                return Ok(SwapOutcome::Rejected(reason));
            }
        };

        self.resolving = true;
        let result = self.play_swap(Swap::new(from, target)).await;
        self.resolving = false;
        let mut report = match result? {
            SwapOutcome::Resolved(report) => report,
            other => return Ok(other),
        };

        self.turns += 1;
        if !has_future_move(&self.board) && self.latch.trip(GameOverReason::Deadlock) {
            info!(score = self.progress.score(), "no moves left, game over");
            self.presenter.game_over(GameOverReason::Deadlock);
        }
        report.game_over = self.latch.reason();
        Ok(SwapOutcome::Resolved(report))
    }

    async fn animate_swap(&self, swap: Swap) -> Result<(), BoardError> {
        let mut motions = Vec::with_capacity(2);
        for tile in [swap.from, swap.to] {
            if let Some(piece) = self.board.get(tile)? {
                motions.push(Motion {
                    piece: piece.id(),
                    to: tile.into(),
                    duration_ms: self.config.animation.swap_ms,
                });
            }
        }
        self.presenter.move_all(&motions).await;
        Ok(())
    }

    async fn play_swap(&mut self, swap: Swap) -> Result<SwapOutcome, SessionError> {
        self.board.swap(swap.from, swap.to)?;
        self.animate_swap(swap).await?;

        // The armed piece now sits on `swap.to`.
        let mut matches: Vec<Match> = Vec::with_capacity(2);
        for seed in [swap.to, swap.from] {
            if let Some(m) = find_match(&self.board, seed) {
                if !matches.iter().any(|seen| seen.tiles == m.tiles) {
                    matches.push(m);
                }
            }
        }

        if matches.is_empty() {
            self.board.swap(swap.from, swap.to)?;
            self.animate_swap(swap).await?;
            debug!(?swap, "no match, swap reverted");
            return Ok(SwapOutcome::Reverted);
        }

        debug!(?swap, matches = matches.len(), "swap accepted");
        let mut resolver = Resolver {
            board: &mut self.board,
            progress: &mut self.progress,
            refills: &mut self.refills,
            fx: &mut self.fx,
            palette: self.config.palette(),
            timings: self.config.animation,
            presenter: &self.presenter,
        };
        let batches = resolver.run(matches).await?;
        let points = batches.iter().map(|b| b.points).sum();
        Ok(SwapOutcome::Resolved(TurnReport {
            swap: Some(swap),
            batches,
            points,
            game_over: None,
        }))
    }

    /// First legal match-producing swap, while the session accepts swaps
    pub fn hint(&self) -> Option<Swap> {
        self.gate().ok()?;
        find_future_move(&self.board)
    }

    /// End the session now; `false` if it was already over.
    pub fn force_game_over(&self, reason: GameOverReason) -> bool {
        let tripped = self.latch.trip(reason);
        if tripped {
            info!(reason = reason.as_str(), "game over");
            self.presenter.game_over(reason);
        }
        tripped
    }

    /// New layout, score and level; back to `Idle`.
    ///
    /// Countdowns created before the reset stop at their next tick.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.latch.supersede();
        self.latch = GameOverLatch::new();
        self.board = layout::generate(
            self.config.width,
            self.config.height,
            self.config.palette(),
            &mut self.layout_rng,
        )?;
        self.progress.reset();
        self.resolving = false;
        self.selected = None;
        self.turns = 0;
        info!(width = self.config.width, height = self.config.height, "session reset");
        self.present_all();
        Ok(())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let core = BoardSnapshot::capture(&self.board, &self.progress);
        SessionSnapshot {
            width: core.width,
            height: core.height,
            board: core.cells,
            score: core.score,
            level: core.level,
            objective: core.objective,
            previous_objective: core.previous_objective,
            progress: self.progress.fraction(),
            state: self.state().as_str().to_string(),
            game_over: self.latch.reason().map(|r| r.as_str().to_string()),
            turns: self.turns,
            seed: self.config.seed,
        }
    }
}

impl<P: Presenter + Clone> GameSession<P> {
    /// Countdown bound to the current latch
    pub fn countdown(&self) -> Countdown<P> {
        Countdown::new(
            self.config.timer_ms,
            self.config.timer_step_ms,
            self.latch.clone(),
            self.presenter.clone(),
        )
    }
}
