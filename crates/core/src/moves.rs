//! Move validation and future-move search
//!
//! Hypothetical swaps run on a [`KindMap`] copy so the real board (and piece
//! identities) are never touched.

use crate::board::{KindGrid, KindMap};
use crate::matcher::has_match_at;
use crate::types::Tile;

/// A swap between two tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Swap {
    pub from: Tile,
    pub to: Tile,
}

impl Swap {
    pub fn new(from: Tile, to: Tile) -> Self {
        Self { from, to }
    }
}

/// True when `a` and `b` differ by exactly one unit on exactly one axis
pub fn is_adjacent(a: Tile, b: Tile) -> bool {
    a.manhattan(b) == 1
}

/// Whether swapping the kinds at `swap.from` and `swap.to` produces a match at
/// either end. `kinds` is restored before returning.
pub fn swap_creates_match(kinds: &mut KindMap, swap: Swap) -> bool {
    if !kinds.contains(swap.from) || !kinds.contains(swap.to) {
        return false;
    }
    if kinds.kind_at(swap.from).is_none() || kinds.kind_at(swap.to).is_none() {
        return false;
    }
    kinds.swap(swap.from, swap.to);
    let hit = has_match_at(kinds, swap.to) || has_match_at(kinds, swap.from);
    kinds.swap(swap.from, swap.to);
    hit
}

/// Every unordered neighbor pair, each once: right and down from every tile
fn candidate_swaps<G: KindGrid + ?Sized>(grid: &G) -> impl Iterator<Item = Swap> + '_ {
    grid.tiles().flat_map(move |t| {
        [t.offset(1, 0), t.offset(0, 1)]
            .into_iter()
            .filter(move |n| grid.contains(*n))
            .map(move |n| Swap::new(t, n))
    })
}

/// First match-producing swap in row-major order, if any
pub fn find_future_move<G: KindGrid + ?Sized>(grid: &G) -> Option<Swap> {
    let mut kinds = KindMap::from_grid(grid);
    candidate_swaps(grid).find(|s| swap_creates_match(&mut kinds, *s))
}

/// All match-producing swaps in row-major order
pub fn future_moves<G: KindGrid + ?Sized>(grid: &G) -> Vec<Swap> {
    let mut kinds = KindMap::from_grid(grid);
    candidate_swaps(grid)
        .filter(|s| swap_creates_match(&mut kinds, *s))
        .collect()
}

/// Whether any adjacent swap produces a match; `false` means deadlock
pub fn has_future_move<G: KindGrid + ?Sized>(grid: &G) -> bool {
    find_future_move(grid).is_some()
}
