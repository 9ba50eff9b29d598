//! Board tests - grid storage, gravity and refill through the public API

use tui_match3::core::{
    apply_gravity, apply_refill, find_match, plan_gravity, plan_refill, remove_matches, Board,
    BoardError, KindGrid, RefillSource,
};
use tui_match3::types::{PieceKind, Tile, MAX_BOARD_DIM};

fn t(col: i8, row: i8) -> Tile {
    Tile::new(col, row)
}

#[test]
fn test_board_new_empty() {
    let board = Board::new(5, 4).unwrap();
    assert_eq!(board.width(), 5);
    assert_eq!(board.height(), 4);

    for tile in board.tiles() {
        assert!(board.is_inside(tile.col, tile.row));
        assert_eq!(board.get(tile), Ok(None));
    }
    assert_eq!(board.empty_tiles().len(), 20);
    assert!(!board.is_full());
}

#[test]
fn test_board_rejects_bad_dimensions() {
    assert!(matches!(
        Board::new(0, 4),
        Err(BoardError::InvalidDimensions { .. })
    ));
    assert!(Board::new(MAX_BOARD_DIM + 1, 4).is_err());
    assert!(Board::from_rows(&["RGB", "RG"]).is_err());
    assert_eq!(
        Board::from_rows(&["RXB"]).unwrap_err(),
        BoardError::UnknownLetter {
            letter: 'X',
            col: 1,
            row: 0
        }
    );
}

#[test]
fn test_board_get_out_of_bounds() {
    let board = Board::new(3, 3).unwrap();

    // Negative coordinates
    assert!(board.get(t(-1, 0)).is_err());
    assert!(board.get(t(0, -1)).is_err());

    // Beyond bounds
    assert!(board.get(t(3, 0)).is_err());
    assert!(board.get(t(0, 3)).is_err());
    assert_eq!(board.kind_at(t(3, 3)), None);
}

#[test]
fn test_board_spawn_set_take() {
    let mut board = Board::new(3, 3).unwrap();
    let id = board.spawn(t(1, 2), PieceKind::Blue).unwrap();

    let piece = board.get(t(1, 2)).unwrap().unwrap();
    assert_eq!(piece.id(), id);
    assert_eq!(piece.kind(), PieceKind::Blue);
    assert_eq!(piece.tile(), t(1, 2));
    assert!(piece.is_alive());

    // Moving a piece updates its stored tile.
    let taken = board.take(t(1, 2)).unwrap();
    board.set(t(0, 0), taken).unwrap();
    assert_eq!(board.find_piece(id).map(|p| p.tile()), Some(t(0, 0)));
    assert!(board.is_consistent());
}

#[test]
fn test_board_swap_moves_pieces() {
    let mut board = Board::from_rows(&["RG", "BY"]).unwrap();
    let red = board.get(t(0, 0)).unwrap().unwrap().id();

    board.swap(t(0, 0), t(1, 0)).unwrap();
    assert_eq!(board.to_rows(), vec!["GR", "BY"]);
    assert_eq!(board.find_piece(red).unwrap().tile(), t(1, 0));
    assert!(board.is_consistent());

    assert!(board.swap(t(0, 0), t(2, 0)).is_err());
}

#[test]
fn test_neighbors_stay_on_board() {
    let board = Board::new(3, 3).unwrap();
    assert_eq!(board.neighbors(t(0, 0)).len(), 2);
    assert_eq!(board.neighbors(t(1, 0)).len(), 3);
    assert_eq!(board.neighbors(t(1, 1)).len(), 4);
}

#[test]
fn test_rows_roundtrip_with_gaps() {
    let rows = ["R.B", "..Y", "POG"];
    let board = Board::from_rows(&rows).unwrap();
    assert_eq!(board.to_rows(), rows);
    assert_eq!(board.empty_tiles(), vec![t(1, 0), t(0, 1), t(1, 1)]);
}

#[test]
fn test_gravity_packs_columns_in_order() {
    let mut board = Board::from_rows(&["R.G", ".B.", "Y.."]).unwrap();
    let falls = plan_gravity(&board);
    apply_gravity(&mut board, &falls).unwrap();

    assert_eq!(board.to_rows(), vec!["...", "R..", "YBG"]);
    assert!(board.is_consistent());
    // Nothing left to fall.
    assert!(plan_gravity(&board).is_empty());
}

#[test]
fn test_remove_fall_refill_fills_every_hole() {
    let mut board = Board::from_rows(&["GBY", "RRR", "BYG"]).unwrap();
    let m = find_match(&board, t(0, 1)).unwrap();

    let removed = remove_matches(&mut board, &[m]).unwrap();
    assert_eq!(removed.len(), 3);
    assert!(removed.iter().all(|p| !p.is_alive()));

    let falls = plan_gravity(&board);
    assert_eq!(falls.len(), 3);
    assert!(falls.iter().all(|f| f.from.row == 0 && f.to.row == 1));
    apply_gravity(&mut board, &falls).unwrap();
    assert_eq!(board.to_rows(), vec!["...", "GBY", "BYG"]);

    let mut source = RefillSource::new(1);
    source.script([PieceKind::Purple, PieceKind::Orange, PieceKind::Red]);
    let spawns = plan_refill(&board, &mut source, &PieceKind::ALL).unwrap();
    assert!(spawns.iter().all(|s| s.entry_row == -1));
    apply_refill(&mut board, &spawns).unwrap();

    assert_eq!(board.to_rows(), vec!["POR", "GBY", "BYG"]);
    assert!(board.is_full());
    assert!(board.is_consistent());
}

#[test]
fn test_refill_stacks_entry_rows() {
    let board = Board::from_rows(&["..", ".R", "BR"]).unwrap();
    let mut source = RefillSource::new(9);
    let spawns = plan_refill(&board, &mut source, &[PieceKind::Green]).unwrap();

    let col0: Vec<(i8, i8)> = spawns
        .iter()
        .filter(|s| s.tile.col == 0)
        .map(|s| (s.tile.row, s.entry_row))
        .collect();
    assert_eq!(col0, vec![(1, -1), (0, -2)]);
    assert_eq!(spawns.len(), 3);
    assert!(spawns.iter().all(|s| s.kind == PieceKind::Green));

    assert_eq!(
        plan_refill(&board, &mut source, &[]).unwrap_err(),
        BoardError::EmptyPalette
    );
}
