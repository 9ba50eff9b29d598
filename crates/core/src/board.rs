//! Board module - manages the game grid
//!
//! The board is a `width x height` grid where each cell owns at most one piece.
//! Uses a flat vector in row-major order (y * width + x).
//! Coordinates: (col, row) where row 0 is the top row; gravity pulls towards
//! higher rows.
//!
//! Invariant: every piece on the board is alive and its stored tile equals the
//! cell that holds it. All mutating operations keep this true.

use arrayvec::ArrayVec;
use thiserror::Error;

use crate::types::{PieceId, PieceKind, Tile, MAX_BOARD_DIM};

/// Board failures. None of these occur in normal play; they signal a broken
/// caller invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("tile ({col}, {row}) is outside the {width}x{height} board")]
    OutOfBounds {
        col: i8,
        row: i8,
        width: u8,
        height: u8,
    },
    #[error("board dimensions {width}x{height} are not within 1..={max}")]
    InvalidDimensions { width: u8, height: u8, max: u8 },
    #[error("piece palette is empty")]
    EmptyPalette,
    #[error("unknown board letter {letter:?} at ({col}, {row})")]
    UnknownLetter { letter: char, col: i8, row: i8 },
    #[error("no playable layout found after {attempts} attempts")]
    NoPlayableLayout { attempts: u32 },
}

/// A piece on the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    id: PieceId,
    kind: PieceKind,
    tile: Tile,
    alive: bool,
}

impl Piece {
    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Tile the piece currently occupies (or occupied when it was removed)
    pub fn tile(&self) -> Tile {
        self.tile
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub(crate) fn kill(&mut self) {
        self.alive = false;
    }
}

/// Read-only view of piece kinds on a grid
///
/// Implemented by [`Board`] and by the cheap [`KindMap`] copy used for
/// hypothetical swaps.
pub trait KindGrid {
    fn width(&self) -> u8;

    fn height(&self) -> u8;

    /// Kind at `tile`; `None` for an empty cell or a tile outside the grid.
    fn kind_at(&self, tile: Tile) -> Option<PieceKind>;

    fn contains(&self, tile: Tile) -> bool {
        tile.col >= 0
            && tile.row >= 0
            && (tile.col as u8) < self.width()
            && (tile.row as u8) < self.height()
    }

    /// All tiles in row-major order
    fn tiles(&self) -> TileIter {
        TileIter::new(self.width(), self.height())
    }
}

/// Row-major iterator over every tile of a grid
#[derive(Debug, Clone)]
pub struct TileIter {
    width: u8,
    height: u8,
    next: u16,
}

impl TileIter {
    fn new(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            next: 0,
        }
    }
}

impl Iterator for TileIter {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        let total = self.width as u16 * self.height as u16;
        if self.next >= total {
            return None;
        }
        let i = self.next;
        self.next += 1;
        let col = (i % self.width as u16) as i8;
        let row = (i / self.width as u16) as i8;
        Some(Tile::new(col, row))
    }
}

/// The game board
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    width: u8,
    height: u8,
    /// Flat array of cells, row-major order (row * width + col)
    cells: Vec<Option<Piece>>,
    next_id: u32,
}

impl Board {
    /// Create a new empty board
    pub fn new(width: u8, height: u8) -> Result<Self, BoardError> {
        if width == 0 || height == 0 || width > MAX_BOARD_DIM || height > MAX_BOARD_DIM {
            return Err(BoardError::InvalidDimensions {
                width,
                height,
                max: MAX_BOARD_DIM,
            });
        }
        Ok(Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
            next_id: 0,
        })
    }

    /// Build a board from letter rows, top row first (`.` is an empty cell).
    ///
    /// Intended for fixtures and replays:
    ///
    /// ```
    /// use tui_match3_core::Board;
    ///
    /// let board = Board::from_rows(&["RGB", "GB.", "BRG"]).unwrap();
    /// assert_eq!(board.width(), 3);
    /// assert_eq!(board.to_rows()[1], "GB.");
    /// ```
    pub fn from_rows(rows: &[&str]) -> Result<Self, BoardError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if height > MAX_BOARD_DIM as usize
            || width > MAX_BOARD_DIM as usize
            || rows.iter().any(|r| r.chars().count() != width)
        {
            return Err(BoardError::InvalidDimensions {
                width: width.min(u8::MAX as usize) as u8,
                height: height.min(u8::MAX as usize) as u8,
                max: MAX_BOARD_DIM,
            });
        }

        let mut board = Self::new(width as u8, height as u8)?;
        for (row, line) in rows.iter().enumerate() {
            for (col, letter) in line.chars().enumerate() {
                let tile = Tile::new(col as i8, row as i8);
                if letter == '.' {
                    continue;
                }
                let kind = PieceKind::from_letter(letter).ok_or(BoardError::UnknownLetter {
                    letter,
                    col: tile.col,
                    row: tile.row,
                })?;
                board.spawn(tile, kind)?;
            }
        }
        Ok(board)
    }

    /// Letter rows, top row first (`.` for empty cells)
    pub fn to_rows(&self) -> Vec<String> {
        (0..self.height as i8)
            .map(|row| {
                (0..self.width as i8)
                    .map(|col| {
                        self.kind_at(Tile::new(col, row))
                            .map(|k| k.letter())
                            .unwrap_or('.')
                    })
                    .collect()
            })
            .collect()
    }

    /// Calculate flat index from a tile
    #[inline(always)]
    fn index(&self, tile: Tile) -> Option<usize> {
        if !self.is_inside(tile.col, tile.row) {
            return None;
        }
        Some(tile.row as usize * self.width as usize + tile.col as usize)
    }

    fn checked_index(&self, tile: Tile) -> Result<usize, BoardError> {
        self.index(tile).ok_or(BoardError::OutOfBounds {
            col: tile.col,
            row: tile.row,
            width: self.width,
            height: self.height,
        })
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Check if (col, row) lies on the board
    pub fn is_inside(&self, col: i8, row: i8) -> bool {
        col >= 0 && row >= 0 && (col as u8) < self.width && (row as u8) < self.height
    }

    /// Get the piece at `tile`
    pub fn get(&self, tile: Tile) -> Result<Option<&Piece>, BoardError> {
        let idx = self.checked_index(tile)?;
        Ok(self.cells[idx].as_ref())
    }

    /// Put `piece` (or nothing) at `tile`, returning the previous occupant.
    ///
    /// The piece's stored tile is updated to `tile`.
    pub fn set(&mut self, tile: Tile, piece: Option<Piece>) -> Result<Option<Piece>, BoardError> {
        let idx = self.checked_index(tile)?;
        let piece = piece.map(|mut p| {
            p.tile = tile;
            p
        });
        Ok(std::mem::replace(&mut self.cells[idx], piece))
    }

    /// Remove and return the piece at `tile`
    pub fn take(&mut self, tile: Tile) -> Result<Option<Piece>, BoardError> {
        let idx = self.checked_index(tile)?;
        Ok(self.cells[idx].take())
    }

    /// Create a fresh live piece of `kind` at `tile`, replacing any occupant.
    pub fn spawn(&mut self, tile: Tile, kind: PieceKind) -> Result<PieceId, BoardError> {
        let idx = self.checked_index(tile)?;
        let id = PieceId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.cells[idx] = Some(Piece {
            id,
            kind,
            tile,
            alive: true,
        });
        Ok(id)
    }

    /// Exchange the pieces (not just their kinds) at `a` and `b`.
    pub fn swap(&mut self, a: Tile, b: Tile) -> Result<(), BoardError> {
        let ia = self.checked_index(a)?;
        let ib = self.checked_index(b)?;
        self.cells.swap(ia, ib);
        for (idx, tile) in [(ia, a), (ib, b)] {
            if let Some(piece) = self.cells[idx].as_mut() {
                piece.tile = tile;
            }
        }
        Ok(())
    }

    /// Up, down, left and right neighbors that lie on the board
    pub fn neighbors(&self, tile: Tile) -> ArrayVec<Tile, 4> {
        let mut out = ArrayVec::new();
        for (dc, dr) in [(0, -1), (0, 1), (-1, 0), (1, 0)] {
            let n = tile.offset(dc, dr);
            if self.is_inside(n.col, n.row) {
                out.push(n);
            }
        }
        out
    }

    /// Iterate all pieces in row-major order
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.cells.iter().flatten()
    }

    pub fn find_piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces().find(|p| p.id == id)
    }

    /// Tiles without a piece, row-major
    pub fn empty_tiles(&self) -> Vec<Tile> {
        self.tiles()
            .filter(|&t| self.kind_at(t).is_none())
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| c.is_some())
    }

    /// Remove every piece
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    /// Copy of the kinds, for hypothetical edits
    pub fn kinds(&self) -> KindMap {
        KindMap::from_grid(self)
    }

    /// Verify that every piece is alive, sits where it claims and is unique.
    pub fn is_consistent(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.tiles().all(|tile| match self.index(tile).and_then(|i| self.cells[i].as_ref()) {
            Some(p) => p.alive && p.tile == tile && seen.insert(p.id),
            None => true,
        })
    }

    /// Write kinds into a u8 grid (0 = empty, kind index + 1 otherwise)
    pub fn write_u8_grid(&self, out: &mut Vec<Vec<u8>>) {
        out.clear();
        for row in 0..self.height as i8 {
            out.push(
                (0..self.width as i8)
                    .map(|col| {
                        self.kind_at(Tile::new(col, row))
                            .map(|k| k.index() + 1)
                            .unwrap_or(0)
                    })
                    .collect(),
            );
        }
    }
}

impl KindGrid for Board {
    fn width(&self) -> u8 {
        self.width
    }

    fn height(&self) -> u8 {
        self.height
    }

    fn kind_at(&self, tile: Tile) -> Option<PieceKind> {
        self.index(tile)
            .and_then(|i| self.cells[i].as_ref())
            .map(|p| p.kind)
    }
}

/// Kinds-only copy of a grid
///
/// Swapping two kinds here is cheap and never touches piece identity, which is
/// what hypothetical move checks need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindMap {
    width: u8,
    height: u8,
    kinds: Vec<Option<PieceKind>>,
}

impl KindMap {
    pub fn from_grid<G: KindGrid + ?Sized>(grid: &G) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            kinds: grid.tiles().map(|t| grid.kind_at(t)).collect(),
        }
    }

    fn index(&self, tile: Tile) -> Option<usize> {
        if !self.contains(tile) {
            return None;
        }
        Some(tile.row as usize * self.width as usize + tile.col as usize)
    }

    /// Swap the kinds at `a` and `b`; tiles outside the map are ignored.
    pub fn swap(&mut self, a: Tile, b: Tile) {
        if let (Some(ia), Some(ib)) = (self.index(a), self.index(b)) {
            self.kinds.swap(ia, ib);
        }
    }
}

impl KindGrid for KindMap {
    fn width(&self) -> u8 {
        self.width
    }

    fn height(&self) -> u8 {
        self.height
    }

    fn kind_at(&self, tile: Tile) -> Option<PieceKind> {
        self.index(tile).and_then(|i| self.kinds[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_index_calculation() {
        let board = Board::new(6, 4).unwrap();
        assert_eq!(board.index(Tile::new(0, 0)), Some(0));
        assert_eq!(board.index(Tile::new(5, 0)), Some(5));
        assert_eq!(board.index(Tile::new(0, 1)), Some(6));
        assert_eq!(board.index(Tile::new(5, 3)), Some(23));
        assert_eq!(board.index(Tile::new(-1, 0)), None);
        assert_eq!(board.index(Tile::new(6, 0)), None);
        assert_eq!(board.index(Tile::new(0, 4)), None);
    }

    #[test]
    fn test_out_of_bounds_is_an_error() {
        let mut board = Board::new(3, 3).unwrap();
        let err = board.get(Tile::new(3, 0)).unwrap_err();
        assert_eq!(
            err,
            BoardError::OutOfBounds {
                col: 3,
                row: 0,
                width: 3,
                height: 3
            }
        );
        assert!(board.take(Tile::new(0, -1)).is_err());
        assert!(board.spawn(Tile::new(9, 9), PieceKind::Red).is_err());
    }

    #[test]
    fn test_set_relocates_piece() {
        let mut board = Board::new(3, 3).unwrap();
        board.spawn(Tile::new(0, 0), PieceKind::Blue).unwrap();

        let piece = board.take(Tile::new(0, 0)).unwrap().unwrap();
        board.set(Tile::new(2, 2), Some(piece)).unwrap();

        let moved = board.get(Tile::new(2, 2)).unwrap().unwrap();
        assert_eq!(moved.tile(), Tile::new(2, 2));
        assert!(board.get(Tile::new(0, 0)).unwrap().is_none());
        assert!(board.is_consistent());
    }

    #[test]
    fn test_swap_moves_piece_identity() {
        let mut board = Board::from_rows(&["RG", "BY"]).unwrap();
        let red = board.get(Tile::new(0, 0)).unwrap().unwrap().id();

        board.swap(Tile::new(0, 0), Tile::new(1, 0)).unwrap();

        assert_eq!(board.to_rows(), vec!["GR", "BY"]);
        let piece = board.find_piece(red).unwrap();
        assert_eq!(piece.tile(), Tile::new(1, 0));
        assert!(board.is_consistent());
    }

    #[test]
    fn test_neighbors_stay_inside() {
        let board = Board::new(3, 3).unwrap();
        assert_eq!(board.neighbors(Tile::new(1, 1)).len(), 4);
        assert_eq!(board.neighbors(Tile::new(0, 0)).len(), 2);
        let edge = board.neighbors(Tile::new(2, 1));
        assert_eq!(edge.len(), 3);
        assert!(!edge.contains(&Tile::new(3, 1)));
    }

    #[test]
    fn test_kind_map_swap_leaves_board_alone() {
        let board = Board::from_rows(&["RG", "BY"]).unwrap();
        let mut kinds = board.kinds();
        kinds.swap(Tile::new(0, 0), Tile::new(0, 1));

        assert_eq!(kinds.kind_at(Tile::new(0, 0)), Some(PieceKind::Blue));
        assert_eq!(board.kind_at(Tile::new(0, 0)), Some(PieceKind::Red));
    }

    #[test]
    fn test_u8_grid() {
        let board = Board::from_rows(&["R.", "OP"]).unwrap();
        let mut grid = Vec::new();
        board.write_u8_grid(&mut grid);
        assert_eq!(grid, vec![vec![1, 0], vec![2, 6]]);
    }

    #[test]
    fn test_from_rows_rejects_unknown_letters() {
        let err = Board::from_rows(&["RX"]).unwrap_err();
        assert!(matches!(err, BoardError::UnknownLetter { letter: 'X', .. }));
    }
}
