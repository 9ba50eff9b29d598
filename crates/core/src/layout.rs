//! Starting layout generation
//!
//! Boards are filled row-major. Each cell excludes any kind that would
//! complete a run of three with the two cells to its left or the two above, so
//! a fresh board never starts with a match. A board that additionally has no
//! future move is thrown away and generated again.

use arrayvec::ArrayVec;
use tracing::debug;

use crate::board::{Board, BoardError, KindGrid};
use crate::matcher::is_stable;
use crate::moves::has_future_move;
use crate::rng::SimpleRng;
use crate::types::{PieceKind, Tile};

/// Attempts before giving up on finding a playable layout
pub const MAX_LAYOUT_ATTEMPTS: u32 = 1000;

/// A stable board with at least one future move
pub fn is_playable(board: &Board) -> bool {
    board.is_full() && is_stable(board) && has_future_move(board)
}

fn completes_run(board: &Board, tile: Tile, kind: PieceKind, dc: i8, dr: i8) -> bool {
    let one = tile.offset(-dc, -dr);
    let two = tile.offset(-2 * dc, -2 * dr);
    board.kind_at(one) == Some(kind) && board.kind_at(two) == Some(kind)
}

fn fill(board: &mut Board, palette: &[PieceKind], rng: &mut SimpleRng) -> Result<(), BoardError> {
    board.clear();
    for row in 0..board.height() as i8 {
        for col in 0..board.width() as i8 {
            let tile = Tile::new(col, row);
            let allowed: ArrayVec<PieceKind, 6> = palette
                .iter()
                .copied()
                .filter(|&k| !completes_run(board, tile, k, 1, 0) && !completes_run(board, tile, k, 0, 1))
                .take(6)
                .collect();
            let kind = rng
                .pick(&allowed)
                .or_else(|| rng.pick(palette))
                .ok_or(BoardError::EmptyPalette)?;
            board.spawn(tile, kind)?;
        }
    }
    Ok(())
}

/// Generate a playable `width x height` board from `palette`
pub fn generate(
    width: u8,
    height: u8,
    palette: &[PieceKind],
    rng: &mut SimpleRng,
) -> Result<Board, BoardError> {
    if palette.is_empty() {
        return Err(BoardError::EmptyPalette);
    }
    let mut board = Board::new(width, height)?;
    for attempt in 1..=MAX_LAYOUT_ATTEMPTS {
        fill(&mut board, palette, rng)?;
        if is_playable(&board) {
            debug!(attempt, width, height, "generated layout");
            return Ok(board);
        }
    }
    Err(BoardError::NoPlayableLayout {
        attempts: MAX_LAYOUT_ATTEMPTS,
    })
}
