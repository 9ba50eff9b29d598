//! Presentation seam
//!
//! The session never draws anything itself. It drives a [`Presenter`]:
//! animations are futures the cascade awaits in order, everything else
//! (sounds, text) is fire-and-forget.
//!
//! Methods take `&self`; implementations that keep state use interior
//! mutability so the countdown task can share a clone of the presenter.

use std::future::Future;
use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::types::{GameOverReason, PieceId, PieceKind, Sound, Tile};

/// Position in board cell units; rows above the board are negative
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPos {
    pub col: f32,
    pub row: f32,
}

impl ScreenPos {
    pub fn new(col: f32, row: f32) -> Self {
        Self { col, row }
    }

    /// Linear interpolation towards `to`, `t` in `0.0..=1.0`
    pub fn lerp(self, to: ScreenPos, t: f32) -> ScreenPos {
        let t = t.clamp(0.0, 1.0);
        ScreenPos {
            col: self.col + (to.col - self.col) * t,
            row: self.row + (to.row - self.row) * t,
        }
    }
}

impl From<Tile> for ScreenPos {
    fn from(tile: Tile) -> Self {
        Self {
            col: tile.col as f32,
            row: tile.row as f32,
        }
    }
}

/// One piece moving to a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub piece: PieceId,
    pub to: ScreenPos,
    pub duration_ms: u32,
}

pub trait Presenter {
    /// Show a new piece sprite at `at`
    fn place(&self, piece: PieceId, kind: PieceKind, at: ScreenPos);

    /// Animate one piece; resolves when the motion is done.
    fn move_to(&self, piece: PieceId, to: ScreenPos, duration_ms: u32) -> impl Future<Output = ()>;

    /// Animate several pieces; resolves when all of them are done.
    ///
    /// The default runs the motions one after another. Presenters that can
    /// animate in parallel should override it.
    fn move_all(&self, motions: &[Motion]) -> impl Future<Output = ()> {
        async move {
            for m in motions {
                self.move_to(m.piece, m.to, m.duration_ms).await;
            }
        }
    }

    /// Shrink and drop the sprites of removed pieces
    fn scale_out(&self, pieces: &[PieceId], duration_ms: u32) -> impl Future<Output = ()>;

    fn play_sound(&self, sound: Sound);

    /// Points popup at the centroid of a match
    fn float_score(&self, _points: u32, _at: ScreenPos, _kind: PieceKind) {}

    fn set_score_text(&self, text: &str);

    fn set_level_text(&self, text: &str);

    /// Fraction of the current level band, `0.0..=1.0`
    fn set_level_progress(&self, fraction: f32);

    /// Countdown text in `mm:ss.mmm`
    fn set_timer_text(&self, text: &str);

    /// Mark the armed tile (`None` clears the mark)
    fn highlight(&self, _tile: Option<Tile>) {}

    /// Drop every sprite
    fn clear(&self) {}

    fn game_over(&self, _reason: GameOverReason) {}
}

/// Presenter that completes every animation immediately
///
/// Used for headless play and tests; events are only traced.
#[derive(Debug, Clone, Copy, Default)]
pub struct Headless;

impl Presenter for Headless {
    fn place(&self, piece: PieceId, kind: PieceKind, at: ScreenPos) {
        trace!(?piece, kind = kind.as_str(), col = at.col, row = at.row, "place");
    }

    async fn move_to(&self, piece: PieceId, to: ScreenPos, _duration_ms: u32) {
        trace!(?piece, col = to.col, row = to.row, "move");
    }

    async fn move_all(&self, motions: &[Motion]) {
        trace!(count = motions.len(), "move all");
    }

    async fn scale_out(&self, pieces: &[PieceId], _duration_ms: u32) {
        trace!(count = pieces.len(), "scale out");
    }

    fn play_sound(&self, sound: Sound) {
        trace!(sound = sound.as_str(), "sound");
    }

    fn set_score_text(&self, _text: &str) {}

    fn set_level_text(&self, _text: &str) {}

    fn set_level_progress(&self, _fraction: f32) {}

    fn set_timer_text(&self, _text: &str) {}
}

/// Everything a [`Recorder`] saw
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Place(PieceId, PieceKind, ScreenPos),
    Move(PieceId, ScreenPos),
    ScaleOut(Vec<PieceId>),
    Sound(Sound),
    FloatScore(u32),
    Score(String),
    Level(String),
    Progress(f32),
    Timer(String),
    Highlight(Option<Tile>),
    Clear,
    GameOver(GameOverReason),
}

/// Instant presenter that records every call, in order
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Last timer text, if any
    pub fn last_timer(&self) -> Option<String> {
        self.events().into_iter().rev().find_map(|e| match e {
            Event::Timer(t) => Some(t),
            _ => None,
        })
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }
}

impl Presenter for Recorder {
    fn place(&self, piece: PieceId, kind: PieceKind, at: ScreenPos) {
        self.push(Event::Place(piece, kind, at));
    }

    async fn move_to(&self, piece: PieceId, to: ScreenPos, _duration_ms: u32) {
        self.push(Event::Move(piece, to));
    }

    async fn scale_out(&self, pieces: &[PieceId], _duration_ms: u32) {
        self.push(Event::ScaleOut(pieces.to_vec()));
    }

    fn play_sound(&self, sound: Sound) {
        self.push(Event::Sound(sound));
    }

    fn float_score(&self, points: u32, _at: ScreenPos, _kind: PieceKind) {
        self.push(Event::FloatScore(points));
    }

    fn set_score_text(&self, text: &str) {
        self.push(Event::Score(text.to_string()));
    }

    fn set_level_text(&self, text: &str) {
        self.push(Event::Level(text.to_string()));
    }

    fn set_level_progress(&self, fraction: f32) {
        self.push(Event::Progress(fraction));
    }

    fn set_timer_text(&self, text: &str) {
        self.push(Event::Timer(text.to_string()));
    }

    fn highlight(&self, tile: Option<Tile>) {
        self.push(Event::Highlight(tile));
    }

    fn clear(&self) {
        self.push(Event::Clear);
    }

    fn game_over(&self, reason: GameOverReason) {
        self.push(Event::GameOver(reason));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_pos_from_tile_and_lerp() {
        let a = ScreenPos::from(Tile::new(2, -1));
        assert_eq!(a, ScreenPos::new(2.0, -1.0));
        let b = a.lerp(ScreenPos::new(2.0, 3.0), 0.5);
        assert_eq!(b, ScreenPos::new(2.0, 1.0));
        assert_eq!(a.lerp(b, 7.0), b);
    }

    #[test]
    fn test_default_move_all_runs_every_motion() {
        let rec = Recorder::new();
        let motions = [
            Motion {
                piece: PieceId(1),
                to: ScreenPos::new(0.0, 1.0),
                duration_ms: 10,
            },
            Motion {
                piece: PieceId(2),
                to: ScreenPos::new(0.0, 2.0),
                duration_ms: 10,
            },
        ];
        tokio_test::block_on(rec.move_all(&motions));
        assert_eq!(
            rec.events(),
            vec![
                Event::Move(PieceId(1), ScreenPos::new(0.0, 1.0)),
                Event::Move(PieceId(2), ScreenPos::new(0.0, 2.0)),
            ]
        );
    }

    #[test]
    fn test_recorder_clones_share_log() {
        let rec = Recorder::new();
        let other = rec.clone();
        other.play_sound(Sound::LevelUp);
        assert_eq!(rec.take(), vec![Event::Sound(Sound::LevelUp)]);
        assert!(rec.events().is_empty());
    }
}
