//! RNG module - deterministic piece kind generation
//!
//! Provides a simple LCG so that the same seed always produces the same
//! layouts and refills, plus [`RefillSource`] which lets tests and replays
//! script the next refill kinds before falling back to the generator.

use std::collections::VecDeque;

use crate::types::PieceKind;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        // High bits of an LCG are far better distributed than the low ones.
        (self.next_u32() >> 8) % max
    }

    /// Pick one element of a non-empty slice
    pub fn pick<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        if items.is_empty() {
            return None;
        }
        let i = self.next_range(items.len() as u32) as usize;
        Some(items[i])
    }

    /// Current generator state (feeding it to [`SimpleRng::new`] resumes the sequence)
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Anything that can hand out the kind of the next spawned piece
pub trait KindSource {
    /// Next kind drawn from `palette`; `None` only when the palette is empty.
    fn next_kind(&mut self, palette: &[PieceKind]) -> Option<PieceKind>;
}

impl KindSource for SimpleRng {
    fn next_kind(&mut self, palette: &[PieceKind]) -> Option<PieceKind> {
        self.pick(palette)
    }
}

/// Refill generator: scripted kinds first, then the seeded RNG
///
/// Scripted kinds are handed out as-is even if they are not in the palette.
#[derive(Debug, Clone)]
pub struct RefillSource {
    scripted: VecDeque<PieceKind>,
    rng: SimpleRng,
}

impl RefillSource {
    pub fn new(seed: u32) -> Self {
        Self {
            scripted: VecDeque::new(),
            rng: SimpleRng::new(seed),
        }
    }

    /// Queue kinds to be handed out before any random ones
    pub fn script<I: IntoIterator<Item = PieceKind>>(&mut self, kinds: I) {
        self.scripted.extend(kinds);
    }

    /// Number of scripted kinds not yet consumed
    pub fn scripted_len(&self) -> usize {
        self.scripted.len()
    }

    /// Drop pending scripted kinds and restart the RNG from `seed`
    pub fn reseed(&mut self, seed: u32) {
        self.scripted.clear();
        self.rng = SimpleRng::new(seed);
    }

    pub fn rng_mut(&mut self) -> &mut SimpleRng {
        &mut self.rng
    }
}

impl KindSource for RefillSource {
    fn next_kind(&mut self, palette: &[PieceKind]) -> Option<PieceKind> {
        match self.scripted.pop_front() {
            Some(kind) => Some(kind),
            None => self.rng.pick(palette),
        }
    }
}
