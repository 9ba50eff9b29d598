//! Cascade steps: removal, gravity and refill
//!
//! Gravity and refill are two-phase. A plan is computed from the current
//! board without mutating it, then applied in plan order. Presenters animate
//! straight from the plan.

use tracing::debug;

use crate::board::{Board, BoardError, KindGrid, Piece};
use crate::matcher::Match;
use crate::rng::KindSource;
use crate::types::{PieceId, PieceKind, Tile};

/// One piece sliding down its column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fall {
    pub piece: PieceId,
    pub from: Tile,
    pub to: Tile,
}

/// One new piece entering a column from above
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawn {
    pub tile: Tile,
    pub kind: PieceKind,
    /// Row above the board where the piece appears (always negative)
    pub entry_row: i8,
}

impl Spawn {
    pub fn entry(&self) -> Tile {
        Tile::new(self.tile.col, self.entry_row)
    }
}

/// Remove every matched piece. Tiles shared by several matches are removed
/// once. Returns the removed pieces, marked dead.
pub fn remove_matches(board: &mut Board, matches: &[Match]) -> Result<Vec<Piece>, BoardError> {
    let mut tiles: Vec<Tile> = matches.iter().flat_map(|m| m.tiles.iter().copied()).collect();
    tiles.sort();
    tiles.dedup();

    let mut removed = Vec::with_capacity(tiles.len());
    for tile in tiles {
        if let Some(mut piece) = board.take(tile)? {
            piece.kill();
            removed.push(piece);
        }
    }
    debug!(count = removed.len(), "removed matched pieces");
    Ok(removed)
}

/// Plan gravity: every column is bottom-packed, keeping relative order.
///
/// Falls are listed column by column, lowest piece first, so applying them in
/// order never moves a piece onto an occupied cell.
pub fn plan_gravity(board: &Board) -> Vec<Fall> {
    let mut falls = Vec::new();
    for col in 0..board.width() as i8 {
        let mut write = board.height() as i8 - 1;
        for row in (0..board.height() as i8).rev() {
            let from = Tile::new(col, row);
            let Ok(Some(piece)) = board.get(from) else {
                continue;
            };
            if row != write {
                falls.push(Fall {
                    piece: piece.id(),
                    from,
                    to: Tile::new(col, write),
                });
            }
            write -= 1;
        }
    }
    falls
}

/// Apply a gravity plan
pub fn apply_gravity(board: &mut Board, falls: &[Fall]) -> Result<(), BoardError> {
    for fall in falls {
        let piece = board.take(fall.from)?;
        board.set(fall.to, piece)?;
    }
    Ok(())
}

/// Plan refill: one spawn per empty cell, column by column, lowest cell first.
///
/// In a column with `k` empty cells the lowest one enters at row -1, the next
/// at row -2, and so on, so the stack drops in as one block.
pub fn plan_refill<S: KindSource + ?Sized>(
    board: &Board,
    source: &mut S,
    palette: &[PieceKind],
) -> Result<Vec<Spawn>, BoardError> {
    let mut spawns = Vec::new();
    for col in 0..board.width() as i8 {
        let mut stacked: i8 = 0;
        for row in (0..board.height() as i8).rev() {
            let tile = Tile::new(col, row);
            if board.kind_at(tile).is_some() {
                continue;
            }
            let kind = source.next_kind(palette).ok_or(BoardError::EmptyPalette)?;
            stacked += 1;
            spawns.push(Spawn {
                tile,
                kind,
                entry_row: -stacked,
            });
        }
    }
    Ok(spawns)
}

/// Apply a refill plan, returning the id assigned to each spawn
pub fn apply_refill(board: &mut Board, spawns: &[Spawn]) -> Result<Vec<(PieceId, Spawn)>, BoardError> {
    spawns
        .iter()
        .map(|spawn| Ok((board.spawn(spawn.tile, spawn.kind)?, *spawn)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::find_match;
    use crate::rng::RefillSource;

    #[test]
    fn test_remove_marks_pieces_dead() {
        let mut board = Board::from_rows(&["RRRG", "GBYB"]).unwrap();
        let m = find_match(&board, Tile::new(0, 0)).unwrap();

        let removed = remove_matches(&mut board, &[m.clone(), m]).unwrap();
        assert_eq!(removed.len(), 3);
        assert!(removed.iter().all(|p| !p.is_alive()));
        assert_eq!(board.to_rows(), vec!["...G", "GBYB"]);
        assert!(board.is_consistent());
    }

    #[test]
    fn test_gravity_preserves_order() {
        // Column top to bottom: A _ B _ C
        let mut board = Board::from_rows(&["R", ".", "G", ".", "B"]).unwrap();
        let falls = plan_gravity(&board);
        assert_eq!(falls.len(), 2);
        // Plan does not mutate.
        assert_eq!(board.to_rows(), vec!["R", ".", "G", ".", "B"]);

        apply_gravity(&mut board, &falls).unwrap();
        assert_eq!(board.to_rows(), vec![".", ".", "R", "G", "B"]);
        assert!(board.is_consistent());
    }

    #[test]
    fn test_gravity_plan_lists_lowest_first() {
        let board = Board::from_rows(&["R", "G", "."]).unwrap();
        let falls = plan_gravity(&board);
        assert_eq!(falls[0].from, Tile::new(0, 1));
        assert_eq!(falls[0].to, Tile::new(0, 2));
        assert_eq!(falls[1].from, Tile::new(0, 0));
        assert_eq!(falls[1].to, Tile::new(0, 1));
    }

    #[test]
    fn test_refill_fills_every_gap() {
        let mut board = Board::from_rows(&["..R", ".GB", "YOB"]).unwrap();
        let mut source = RefillSource::new(3);
        source.script([PieceKind::Red, PieceKind::Green, PieceKind::Blue]);

        let spawns = plan_refill(&board, &mut source, &PieceKind::ALL).unwrap();
        assert_eq!(spawns.len(), 3);
        assert_eq!(spawns[0].tile, Tile::new(0, 1));
        assert_eq!(spawns[0].entry_row, -1);
        assert_eq!(spawns[1].tile, Tile::new(0, 0));
        assert_eq!(spawns[1].entry_row, -2);
        assert_eq!(spawns[2].tile, Tile::new(1, 0));
        assert_eq!(spawns[2].entry_row, -1);

        let placed = apply_refill(&mut board, &spawns).unwrap();
        assert_eq!(placed.len(), 3);
        assert!(board.is_full());
        assert_eq!(board.to_rows(), vec!["GBR", "RGB", "YOB"]);
        assert!(board.is_consistent());
    }

    #[test]
    fn test_refill_with_empty_palette_fails() {
        let board = Board::from_rows(&["."]).unwrap();
        let mut source = RefillSource::new(1);
        let err = plan_refill(&board, &mut source, &[]).unwrap_err();
        assert_eq!(err, BoardError::EmptyPalette);
    }
}
