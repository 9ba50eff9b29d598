use crate::board::Board;
use crate::scoring::Progress;

/// Plain-data copy of a board and its progress
///
/// Cells are `0` for empty and `kind index + 1` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardSnapshot {
    pub width: u8,
    pub height: u8,
    pub cells: Vec<Vec<u8>>,
    pub score: u32,
    pub level: u32,
    pub objective: u32,
    pub previous_objective: u32,
}

impl BoardSnapshot {
    pub fn capture(board: &Board, progress: &Progress) -> Self {
        let mut snap = Self::default();
        snap.fill(board, progress);
        snap
    }

    /// Refill this snapshot in place, reusing the row buffers
    pub fn fill(&mut self, board: &Board, progress: &Progress) {
        self.width = board.width();
        self.height = board.height();
        board.write_u8_grid(&mut self.cells);
        self.score = progress.score();
        self.level = progress.level();
        self.objective = progress.objective();
        self.previous_objective = progress.previous_objective();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Count of occupied cells
    pub fn occupied(&self) -> usize {
        self.cells.iter().flatten().filter(|&&c| c != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture() {
        let board = Board::from_rows(&["RG", ".P"]).unwrap();
        let mut progress = Progress::new(1000);
        progress.award(50);

        let snap = BoardSnapshot::capture(&board, &progress);
        assert_eq!(snap.cells, vec![vec![1, 4], vec![0, 6]]);
        assert_eq!(snap.occupied(), 3);
        assert_eq!(snap.score, 50);
        assert_eq!(snap.level, 1);
        assert_eq!(snap.objective, 1000);
    }
}
