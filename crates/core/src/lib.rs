//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the match-3 board rules: grid ownership, match
//! detection, move validation, the cascade steps, scoring and layout
//! generation. It has **no dependencies** on presentation, timers or I/O,
//! which makes it:
//!
//! - **Deterministic**: the same seed produces the same layouts and refills
//! - **Testable**: every rule is exercised by unit tests
//! - **Portable**: runs under the async session, the terminal demo or headless
//!
//! # Module Structure
//!
//! - [`board`]: grid of optional pieces, `KindGrid` read view, `KindMap` copy
//! - [`matcher`]: local and full-board match detection, shape recognition
//! - [`moves`]: adjacency, hypothetical swaps, future-move search
//! - [`cascade`]: removal plus two-phase gravity and refill plans
//! - [`rng`]: seeded LCG and the scripted [`RefillSource`]
//! - [`scoring`]: shape points, level objectives and the progress band
//! - [`layout`]: playable starting boards
//! - [`snapshot`]: plain-data board copies
//!
//! # Example
//!
//! ```
//! use tui_match3_core::{find_board_match, has_future_move, layout, SimpleRng};
//! use tui_match3_core::types::PieceKind;
//!
//! let mut rng = SimpleRng::new(12345);
//! let board = layout::generate(8, 8, &PieceKind::ALL, &mut rng).unwrap();
//!
//! // Fresh boards never start with a match and always have a move.
//! assert!(find_board_match(&board).is_none());
//! assert!(has_future_move(&board));
//! ```

pub mod board;
pub mod cascade;
pub mod layout;
pub mod matcher;
pub mod moves;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use tui_match3_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, BoardError, KindGrid, KindMap, Piece};
pub use cascade::{apply_gravity, apply_refill, plan_gravity, plan_refill, remove_matches, Fall, Spawn};
pub use matcher::{find_board_match, find_match, is_stable, recognize, Match};
pub use moves::{find_future_move, future_moves, has_future_move, is_adjacent, Swap};
pub use rng::{KindSource, RefillSource, SimpleRng};
pub use scoring::{level_objective, score_for, Progress};
pub use snapshot::BoardSnapshot;
