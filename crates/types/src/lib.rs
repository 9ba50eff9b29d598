//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data with no external dependencies, so they can be used
//! from the rules core, the async session layer, and the terminal front end alike.
//!
//! # Board Coordinates
//!
//! - **Column**: `0..width`, left to right
//! - **Row**: `0..height`, top to bottom (gravity pulls towards higher rows)
//! - Rows below zero are "above the board" and are only used as spawn entry points
//!
//! # Scoring Table
//!
//! | Shape | Label | Points |
//! |-------|-------|--------|
//! | `Line3` | `3line` | 50 |
//! | `Line4` | `4line` | 100 |
//! | `Line5` | `5line` | 500 |
//! | `Line6` | `6line` | 800 |
//! | `Corner3` | `3L` | 800 |
//! | `Corner4` | `4L` | 1000 |
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TIMER_START_MS` | 120000 | Session countdown |
//! | `TIMER_STEP_MS` | 10 | Countdown tick |
//! | `SWAP_ANIM_MS` | 300 | Two-piece swap animation |
//! | `FALL_ANIM_MS` | 200 | Gravity slide per piece |
//! | `SPAWN_ANIM_MS` | 200 | Refill entry slide |
//! | `SCALE_OUT_MS` | 250 | Removal shrink |
//!
//! # Examples
//!
//! ```
//! use tui_match3_types::{MatchShape, PieceKind, Tile};
//!
//! let kind = PieceKind::from_str("r").unwrap();
//! assert_eq!(kind, PieceKind::Red);
//!
//! assert_eq!(MatchShape::Line5.points(), 500);
//! assert_eq!(MatchShape::from_label("4L"), Some(MatchShape::Corner4));
//!
//! let tile = Tile::new(2, 3);
//! assert_eq!(tile.offset(1, -1), Tile::new(3, 2));
//! ```

/// Default board width in cells
pub const DEFAULT_BOARD_WIDTH: u8 = 8;

/// Default board height in cells
pub const DEFAULT_BOARD_HEIGHT: u8 = 8;

/// Smallest playable board edge
pub const MIN_BOARD_DIM: u8 = 3;

/// Largest supported board edge (coordinates are stored as `i8`)
pub const MAX_BOARD_DIM: u8 = 32;

/// Minimum run length that counts as a match
pub const MIN_MATCH_LEN: usize = 3;

/// Longer runs still score as this length
pub const MAX_SCORED_RUN: usize = 6;

/// Score increment that defines the level objectives (level 1 objective)
pub const LEVEL_SCORE_TO_ADD: u32 = 1000;

/// Extra objective points per level above 1
pub const LEVEL_BONUS_PER_LEVEL: u32 = 100;

/// Score applied to a match whose shape could not be recognized
pub const FALLBACK_MATCH_SCORE: u32 = 100;

/// Session countdown start value
pub const TIMER_START_MS: u32 = 120_000;

/// Countdown decrement per tick
pub const TIMER_STEP_MS: u32 = 10;

pub const SWAP_ANIM_MS: u32 = 300;
pub const FALL_ANIM_MS: u32 = 200;
pub const SPAWN_ANIM_MS: u32 = 200;
pub const SCALE_OUT_MS: u32 = 250;

/// The six piece kinds of the default palette
///
/// A session may play with a prefix of [`PieceKind::ALL`] (3 to 6 kinds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
}

impl PieceKind {
    /// All kinds in palette order
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Red,
        PieceKind::Orange,
        PieceKind::Yellow,
        PieceKind::Green,
        PieceKind::Blue,
        PieceKind::Purple,
    ];

    /// Parse piece kind from its letter or name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_match3_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("b"), Some(PieceKind::Blue));
    /// assert_eq!(PieceKind::from_str("Purple"), Some(PieceKind::Purple));
    /// assert_eq!(PieceKind::from_str("x"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "r" | "red" => Some(PieceKind::Red),
            "o" | "orange" => Some(PieceKind::Orange),
            "y" | "yellow" => Some(PieceKind::Yellow),
            "g" | "green" => Some(PieceKind::Green),
            "b" | "blue" => Some(PieceKind::Blue),
            "p" | "purple" => Some(PieceKind::Purple),
            _ => None,
        }
    }

    /// Parse a single board letter (`R O Y G B P`, case-insensitive)
    pub fn from_letter(ch: char) -> Option<Self> {
        match ch.to_ascii_uppercase() {
            'R' => Some(PieceKind::Red),
            'O' => Some(PieceKind::Orange),
            'Y' => Some(PieceKind::Yellow),
            'G' => Some(PieceKind::Green),
            'B' => Some(PieceKind::Blue),
            'P' => Some(PieceKind::Purple),
            _ => None,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            PieceKind::Red => 'R',
            PieceKind::Orange => 'O',
            PieceKind::Yellow => 'Y',
            PieceKind::Green => 'G',
            PieceKind::Blue => 'B',
            PieceKind::Purple => 'P',
        }
    }

    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::Red => "red",
            PieceKind::Orange => "orange",
            PieceKind::Yellow => "yellow",
            PieceKind::Green => "green",
            PieceKind::Blue => "blue",
            PieceKind::Purple => "purple",
        }
    }

    /// Position in [`PieceKind::ALL`]
    pub fn index(&self) -> u8 {
        *self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

/// A board coordinate (column, row)
///
/// Coordinates are signed so that neighbor offsets and spawn entry rows
/// (above the board) can be expressed without casts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Tile {
    pub col: i8,
    pub row: i8,
}

impl Tile {
    pub const fn new(col: i8, row: i8) -> Self {
        Self { col, row }
    }

    /// Tile shifted by (dc, dr); never panics on overflow
    pub fn offset(self, dc: i8, dr: i8) -> Self {
        Self {
            col: self.col.wrapping_add(dc),
            row: self.row.wrapping_add(dr),
        }
    }

    pub fn manhattan(self, other: Tile) -> u16 {
        let dc = (self.col as i16 - other.col as i16).unsigned_abs();
        let dr = (self.row as i16 - other.row as i16).unsigned_abs();
        dc + dr
    }
}

/// Board-unique identity of a piece, stable across swaps and falls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub u32);

/// Match shape tiers
///
/// - **Line3..Line6**: straight runs; runs longer than six score as `Line6`
/// - **Corner3 / Corner4**: L/T clusters made of a horizontal and a vertical run
///   that share one piece, tiered by the longer arm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchShape {
    Line3,
    Line4,
    Line5,
    Line6,
    Corner3,
    Corner4,
}

impl MatchShape {
    pub const ALL: [MatchShape; 6] = [
        MatchShape::Line3,
        MatchShape::Line4,
        MatchShape::Line5,
        MatchShape::Line6,
        MatchShape::Corner3,
        MatchShape::Corner4,
    ];

    /// Score value for this shape
    pub fn points(&self) -> u32 {
        match self {
            MatchShape::Line3 => 50,
            MatchShape::Line4 => 100,
            MatchShape::Line5 => 500,
            MatchShape::Line6 => 800,
            MatchShape::Corner3 => 800,
            MatchShape::Corner4 => 1000,
        }
    }

    /// Short label (`3line`, `4L`, ...)
    pub fn label(&self) -> &'static str {
        match self {
            MatchShape::Line3 => "3line",
            MatchShape::Line4 => "4line",
            MatchShape::Line5 => "5line",
            MatchShape::Line6 => "6line",
            MatchShape::Corner3 => "3L",
            MatchShape::Corner4 => "4L",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|shape| shape.label() == s)
    }

    /// Straight-run tier for a run of `len` pieces (capped at [`MAX_SCORED_RUN`])
    pub fn line(len: usize) -> Option<Self> {
        match len.min(MAX_SCORED_RUN) {
            0..=2 => None,
            3 => Some(MatchShape::Line3),
            4 => Some(MatchShape::Line4),
            5 => Some(MatchShape::Line5),
            _ => Some(MatchShape::Line6),
        }
    }

    /// Cluster tier for an L/T whose longer arm has `arm` pieces
    pub fn corner(arm: usize) -> Option<Self> {
        match arm {
            0..=2 => None,
            3 => Some(MatchShape::Corner3),
            _ => Some(MatchShape::Corner4),
        }
    }
}

/// Sound cues the engine asks the presenter to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    /// Pop cue on removal, variant 1..=3
    Bubble(u8),
    LevelUp,
}

impl Sound {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sound::Bubble(1) => "bubble1",
            Sound::Bubble(2) => "bubble2",
            Sound::Bubble(_) => "bubble3",
            Sound::LevelUp => "levelUp",
        }
    }
}

/// Session turn state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnState {
    /// Accepting swaps
    Idle,
    /// A cascade is in flight; swaps are rejected
    Resolving,
    /// Terminal; only a reset leaves it
    GameOver,
}

impl TurnState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnState::Idle => "idle",
            TurnState::Resolving => "resolving",
            TurnState::GameOver => "gameOver",
        }
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOverReason {
    /// No adjacent swap can produce a match
    Deadlock,
    /// The countdown expired
    TimeUp,
}

impl GameOverReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameOverReason::Deadlock => "deadlock",
            GameOverReason::TimeUp => "timeUp",
        }
    }
}

/// Why a swap request was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// No piece is armed for swapping
    NothingSelected,
    /// The two tiles are not 4-neighbors
    NotAdjacent,
    /// A tile lies outside the board
    OutOfBounds,
    /// A tile holds no piece
    EmptyTile,
    /// A cascade is still resolving
    Busy,
    /// The session is over
    GameOver,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::NothingSelected => "nothingSelected",
            RejectReason::NotAdjacent => "notAdjacent",
            RejectReason::OutOfBounds => "outOfBounds",
            RejectReason::EmptyTile => "emptyTile",
            RejectReason::Busy => "busy",
            RejectReason::GameOver => "gameOver",
        }
    }
}
