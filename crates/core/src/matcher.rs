//! Match detection
//!
//! A local scan starts from one seed tile and collects the horizontal and
//! vertical runs of the seed's kind through it:
//!
//! - both runs are 3+ long: the union is an L/T cluster
//! - otherwise the longer run, if it is 3+ long, is a straight line
//! - otherwise there is no match
//!
//! The full-board scan walks every tile in row-major order and returns the
//! first local match it finds.

use crate::board::KindGrid;
use crate::types::{MatchShape, PieceKind, Tile, MIN_MATCH_LEN};

/// A detected match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub kind: PieceKind,
    /// Tile the scan started from
    pub seed: Tile,
    /// Matched tiles, sorted, without duplicates
    pub tiles: Vec<Tile>,
    /// Length of the horizontal run through the seed
    pub horizontal: usize,
    /// Length of the vertical run through the seed
    pub vertical: usize,
}

impl Match {
    /// Tier of this match; `None` when the tiles do not form a known shape
    pub fn shape(&self) -> Option<MatchShape> {
        recognize(&self.tiles)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Mean position of the matched tiles as (col, row)
    pub fn centroid(&self) -> (f32, f32) {
        if self.tiles.is_empty() {
            return (self.seed.col as f32, self.seed.row as f32);
        }
        let n = self.tiles.len() as f32;
        let (sc, sr) = self
            .tiles
            .iter()
            .fold((0.0f32, 0.0f32), |(c, r), t| (c + t.col as f32, r + t.row as f32));
        (sc / n, sr / n)
    }
}

/// Tiles of `kind` reachable from `seed` stepping by (dc, dr), seed excluded
fn walk<G: KindGrid + ?Sized>(grid: &G, seed: Tile, kind: PieceKind, dc: i8, dr: i8, out: &mut Vec<Tile>) {
    let mut t = seed.offset(dc, dr);
    while grid.kind_at(t) == Some(kind) {
        out.push(t);
        t = t.offset(dc, dr);
    }
}

/// Detect the match through `seed`, if any
pub fn find_match<G: KindGrid + ?Sized>(grid: &G, seed: Tile) -> Option<Match> {
    let kind = grid.kind_at(seed)?;

    let mut row_run = vec![seed];
    walk(grid, seed, kind, -1, 0, &mut row_run);
    walk(grid, seed, kind, 1, 0, &mut row_run);

    let mut col_run = vec![seed];
    walk(grid, seed, kind, 0, -1, &mut col_run);
    walk(grid, seed, kind, 0, 1, &mut col_run);

    let horizontal = row_run.len();
    let vertical = col_run.len();

    let mut tiles = if horizontal >= MIN_MATCH_LEN && vertical >= MIN_MATCH_LEN {
        row_run.extend(col_run.into_iter().skip(1));
        row_run
    } else if horizontal >= vertical && horizontal >= MIN_MATCH_LEN {
        row_run
    } else if vertical >= MIN_MATCH_LEN {
        col_run
    } else {
        return None;
    };

    tiles.sort();
    tiles.dedup();
    Some(Match {
        kind,
        seed,
        tiles,
        horizontal,
        vertical,
    })
}

/// Whether `seed` is part of a match
pub fn has_match_at<G: KindGrid + ?Sized>(grid: &G, seed: Tile) -> bool {
    find_match(grid, seed).is_some()
}

/// First match on the board in row-major order
pub fn find_board_match<G: KindGrid + ?Sized>(grid: &G) -> Option<Match> {
    grid.tiles().find_map(|t| find_match(grid, t))
}

/// True when no tile is part of a match
pub fn is_stable<G: KindGrid + ?Sized>(grid: &G) -> bool {
    find_board_match(grid).is_none()
}

fn is_contiguous(mut values: Vec<i8>) -> bool {
    values.sort_unstable();
    values.windows(2).all(|w| w[1] == w[0] + 1)
}

/// Classify a set of tiles
///
/// Straight runs are tiered by length (capped at six). A cluster made of a
/// horizontal and a vertical run of 3+ that share one pivot tile is tiered by
/// its longer arm. Anything else (a 2x2 block, a bent snake) is `None`.
///
/// ```
/// use tui_match3_core::matcher::recognize;
/// use tui_match3_core::types::{MatchShape, Tile};
///
/// let l = [Tile::new(0, 0), Tile::new(0, 1), Tile::new(0, 2), Tile::new(1, 2), Tile::new(2, 2)];
/// assert_eq!(recognize(&l), Some(MatchShape::Corner3));
/// ```
pub fn recognize(tiles: &[Tile]) -> Option<MatchShape> {
    let first = *tiles.first()?;
    if tiles.len() < MIN_MATCH_LEN {
        return None;
    }

    if tiles.iter().all(|t| t.row == first.row) {
        let cols = tiles.iter().map(|t| t.col).collect();
        return is_contiguous(cols).then(|| MatchShape::line(tiles.len())).flatten();
    }
    if tiles.iter().all(|t| t.col == first.col) {
        let rows = tiles.iter().map(|t| t.row).collect();
        return is_contiguous(rows).then(|| MatchShape::line(tiles.len())).flatten();
    }

    for pivot in tiles {
        let mut cols = vec![pivot.col];
        let mut rows = vec![pivot.row];
        let mut fits = true;
        for t in tiles.iter().filter(|t| *t != pivot) {
            if t.row == pivot.row {
                cols.push(t.col);
            } else if t.col == pivot.col {
                rows.push(t.row);
            } else {
                fits = false;
                break;
            }
        }
        if !fits || cols.len() < MIN_MATCH_LEN || rows.len() < MIN_MATCH_LEN {
            continue;
        }
        let arm = cols.len().max(rows.len());
        if is_contiguous(cols) && is_contiguous(rows) {
            return MatchShape::corner(arm);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn t(col: i8, row: i8) -> Tile {
        Tile::new(col, row)
    }

    #[test]
    fn test_horizontal_line3() {
        let board = Board::from_rows(&["RRRG", "GBYB", "BGBY"]).unwrap();
        let m = find_match(&board, t(1, 0)).unwrap();
        assert_eq!(m.kind, PieceKind::Red);
        assert_eq!(m.tiles, vec![t(0, 0), t(1, 0), t(2, 0)]);
        assert_eq!(m.shape(), Some(MatchShape::Line3));
    }

    #[test]
    fn test_vertical_line4_and_line5() {
        let four = Board::from_rows(&["GR", "GB", "GR", "GB"]).unwrap();
        let m = find_match(&four, t(0, 2)).unwrap();
        assert_eq!(m.shape(), Some(MatchShape::Line4));
        assert_eq!(m.shape().map(|s| s.points()), Some(100));

        let five = Board::from_rows(&["BBBBB", "RGRGR"]).unwrap();
        let m = find_match(&five, t(4, 0)).unwrap();
        assert_eq!(m.shape(), Some(MatchShape::Line5));
        assert_eq!(m.shape().map(|s| s.points()), Some(500));
    }

    #[test]
    fn test_long_run_caps_at_line6() {
        let board = Board::from_rows(&["YYYYYYY"]).unwrap();
        let m = find_match(&board, t(3, 0)).unwrap();
        assert_eq!(m.len(), 7);
        assert_eq!(m.shape(), Some(MatchShape::Line6));
    }

    #[test]
    fn test_corner_clusters() {
        let l3 = Board::from_rows(&["RGB", "RBG", "RRR"]).unwrap();
        let m = find_match(&l3, t(0, 2)).unwrap();
        assert_eq!(m.len(), 5);
        assert_eq!(m.shape(), Some(MatchShape::Corner3));

        let t4 = Board::from_rows(&["GGGG", "BGRB", "RGBR"]).unwrap();
        let m = find_match(&t4, t(1, 0)).unwrap();
        assert_eq!(m.len(), 6);
        assert_eq!(m.shape(), Some(MatchShape::Corner4));
    }

    #[test]
    fn test_corner_needs_both_runs_through_seed() {
        // Seed at the end of the vertical arm only sees a line.
        let board = Board::from_rows(&["RGB", "RBG", "RRR"]).unwrap();
        let m = find_match(&board, t(0, 0)).unwrap();
        assert_eq!(m.shape(), Some(MatchShape::Line3));
        assert_eq!(m.tiles, vec![t(0, 0), t(0, 1), t(0, 2)]);
    }

    #[test]
    fn test_pairs_do_not_match() {
        let board = Board::from_rows(&["RRG", "GBR", "RGB"]).unwrap();
        assert!(find_match(&board, t(0, 0)).is_none());
        assert!(find_board_match(&board).is_none());
        assert!(is_stable(&board));
    }

    #[test]
    fn test_empty_cells_never_match() {
        let board = Board::from_rows(&["...", "RGB"]).unwrap();
        assert!(find_match(&board, t(1, 0)).is_none());
    }

    #[test]
    fn test_board_scan_returns_first_row_major() {
        let board = Board::from_rows(&["RGBY", "OOOY", "RGBY"]).unwrap();
        let m = find_board_match(&board).unwrap();
        // (3,0) is scanned before (0,1).
        assert_eq!(m.kind, PieceKind::Yellow);
        assert_eq!(m.seed, t(3, 0));
    }

    #[test]
    fn test_board_scan_is_idempotent() {
        let board = Board::from_rows(&["RGBY", "OOOY", "RGBY"]).unwrap();
        let first = find_board_match(&board);
        let second = find_board_match(&board);
        assert_eq!(first, second);
    }

    #[test]
    fn test_recognize_rejects_unknown_shapes() {
        let square = [t(0, 0), t(1, 0), t(0, 1), t(1, 1)];
        assert_eq!(recognize(&square), None);

        let gap = [t(0, 0), t(1, 0), t(3, 0)];
        assert_eq!(recognize(&gap), None);

        assert_eq!(recognize(&[t(0, 0), t(1, 0)]), None);
        assert_eq!(recognize(&[]), None);
    }

    #[test]
    fn test_centroid() {
        let board = Board::from_rows(&["RRR"]).unwrap();
        let m = find_match(&board, t(0, 0)).unwrap();
        assert_eq!(m.centroid(), (1.0, 0.0));
    }
}
