//! Make/unmake involution tests.

use crate::board::{Board, Move, Piece, Square};

fn find_move(board: &mut Board, uci: &str) -> Move {
    board
        .parse_move(uci)
        .unwrap_or_else(|e| panic!("expected legal move {uci}: {e}"))
}

/// Make then unmake must restore every observable field; `Board`
/// equality is structural.
fn assert_involution(fen: &str, uci: &str) {
    let mut board = Board::from_fen(fen);
    let before = board.clone();
    let mut mv = find_move(&mut board, uci);
    board.make_move(&mut mv);
    assert_ne!(board.hash(), before.hash(), "make must change the hash");
    board.unmake_move(mv);
    assert_eq!(board, before, "unmake failed to restore {uci} on {fen}");
}

#[test]
fn test_quiet_and_capture_involution() {
    assert_involution(
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "e2e4",
    );
    assert_involution(
        "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2",
        "e4d5",
    );
}

#[test]
fn test_en_passant_involution() {
    assert_involution(
        "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
        "e5f6",
    );
}

#[test]
fn test_castling_involution() {
    let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
    assert_involution(fen, "e1g1");
    assert_involution(fen, "e1c1");
    let black = "r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1";
    assert_involution(black, "e8g8");
    assert_involution(black, "e8c8");
}

#[test]
fn test_promotion_involution() {
    assert_involution("8/P3k3/8/8/8/8/8/4K3 w - - 0 1", "a7a8q");
    assert_involution("8/P3k3/8/8/8/8/8/4K3 w - - 0 1", "a7a8n");
    // Capture promotion.
    assert_involution("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1", "a7b8q");
}

#[test]
fn test_make_updates_ep_and_castling() {
    let mut board = Board::new();
    let mut mv = find_move(&mut board, "e2e4");
    board.make_move(&mut mv);
    // A double push exposes the file behind the pawn.
    assert_eq!(board.to_fen().split(' ').nth(3), Some("e3"));
    board.unmake_move(mv);

    let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    let mut mv = find_move(&mut board, "e1e2");
    board.make_move(&mut mv);
    // A king move clears both of that side's rights.
    assert_eq!(board.castling_rights() & 0b0011, 0);
    assert_eq!(board.castling_rights() & 0b1100, 0b1100);
    board.unmake_move(mv);
    assert_eq!(board.castling_rights(), 0b1111);
}

#[test]
fn test_rook_capture_clears_victims_rights() {
    let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    let mut mv = find_move(&mut board, "a1a8");
    board.make_move(&mut mv);
    // Both queenside rights go: ours by moving, theirs by capture.
    assert_eq!(board.castling_rights(), 0b1010);
    board.unmake_move(mv);
    assert_eq!(board.castling_rights(), 0b1111);
}

#[test]
fn test_halfmove_clock_reset_rules() {
    let mut board = Board::from_fen("4k3/8/8/8/8/8/4P3/R3K3 w Q - 7 20");
    let mut rook_move = find_move(&mut board, "a1a5");
    board.make_move(&mut rook_move);
    assert_eq!(board.halfmove_clock(), 8);
    board.unmake_move(rook_move);

    let mut pawn_move = find_move(&mut board, "e2e3");
    board.make_move(&mut pawn_move);
    assert_eq!(board.halfmove_clock(), 0);
    board.unmake_move(pawn_move);
    assert_eq!(board.halfmove_clock(), 7);
}

#[test]
fn test_null_move_involution() {
    let mut board =
        Board::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
    let before = board.clone();

    let prev_ep = board.make_null_move();
    assert_ne!(board.hash(), before.hash());
    assert_ne!(board.turn(), before.turn());
    // The en passant target is gone after a null move.
    assert_eq!(board.to_fen().split(' ').nth(3), Some("-"));

    board.unmake_null_move(prev_ep);
    assert_eq!(board, before);
}

#[test]
fn test_phase_tracks_captures_and_promotions() {
    let board = Board::new();
    assert_eq!(board.phase, 24);

    // Capturing a queen drops four phase points.
    let mut board = Board::from_fen("3qk3/8/8/8/8/8/8/3QK3 w - - 0 1");
    let phase_before = board.phase;
    let mut mv = find_move(&mut board, "d1d8");
    board.make_move(&mut mv);
    assert_eq!(board.phase, phase_before - 4);
    board.unmake_move(mv);
    assert_eq!(board.phase, phase_before);

    // Promoting adds the new piece's weight.
    let mut board = Board::from_fen("8/P3k3/8/8/8/8/8/4K3 w - - 0 1");
    let mut mv = find_move(&mut board, "a7a8q");
    board.make_move(&mut mv);
    assert_eq!(board.phase, 4);
    board.unmake_move(mv);
    assert_eq!(board.phase, 0);
}

#[test]
fn test_legal_moves_stable_after_make_unmake() {
    let mut board = Board::new();
    let initial: Vec<String> = board.legal_moves().iter().map(|m| m.to_uci()).collect();

    for mv in board.legal_moves().as_slice().to_vec() {
        let mut mv = mv;
        board.make_move(&mut mv);
        board.unmake_move(mv);
    }

    let after: Vec<String> = board.legal_moves().iter().map(|m| m.to_uci()).collect();
    assert_eq!(initial, after);
}

#[test]
fn test_piece_map_agrees_after_moves() {
    let mut board = Board::new();
    for uci in ["e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "g8f6", "e1g1"] {
        let mut mv = board.parse_move(uci).unwrap();
        board.make_move(&mut mv);
    }
    // Spot-check piece map against known placements.
    assert_eq!(board.piece_at(Square::new(0, 6)), Some(Piece::King)); // g1
    assert_eq!(board.piece_at(Square::new(0, 5)), Some(Piece::Rook)); // f1
    assert_eq!(board.piece_at(Square::new(0, 4)), None); // e1
    assert_eq!(board.piece_at(Square::new(3, 4)), Some(Piece::Pawn)); // e4
}
