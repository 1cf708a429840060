//! Making and unmaking moves.
//!
//! `make_move` maintains every derived field incrementally: bitboards,
//! the piece map, king squares, hash, pawn key, phase, castling rights
//! and the en passant file. `unmake_move` reverses the board purely from
//! the move (its packed undo payload included) plus the popped undo
//! record; the involution is exercised heavily by the test suite.

use crate::zobrist::ZOBRIST;

use super::state::{UndoState, EP_NONE, MAX_GAME_PLIES};
use super::types::castling::{castling_rook_squares, CASTLING_MASK};
use super::types::{Color, Move, Piece, Square, PHASE_VALUES};
use super::Board;

impl Board {
    /// Apply a move. The move is mutated to carry the pre-move castling
    /// rights and en passant file for `unmake_move`.
    pub fn make_move(&mut self, m: &mut Move) {
        let keys = &*ZOBRIST;

        let from = m.from();
        let to = m.to();
        let from_idx = from.index();
        let to_idx = to.index();
        let promotion = m.promotion_piece();
        let captured = m.captured_piece();
        let us = self.turn;
        let them = us.opponent();
        let us_idx = us.index();
        let them_idx = them.index();

        let piece = self.piece_on[from_idx].expect("make_move: from-square is empty");
        let to_piece = promotion.unwrap_or(piece);

        m.set_undo_info(self.castling, self.ep_file);
        debug_assert!(self.undo_stack.len() < MAX_GAME_PLIES, "undo stack overflow");
        self.undo_stack.push(UndoState {
            hash: self.hash,
            pawn_key: self.pawn_key,
            halfmove_clock: self.halfmove_clock,
        });

        if piece == Piece::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        let mut h = self.hash ^ keys.side_to_move;
        self.turn = them;

        if self.ep_file < 8 {
            h ^= keys.ep_file[self.ep_file as usize];
        }
        self.ep_file = EP_NONE;

        // Remove the victim before the mover lands, so the piece map never
        // holds two pieces on one square.
        if let Some(cap) = captured {
            self.phase -= PHASE_VALUES[cap.index()];

            let cap_idx = if m.is_en_passant() {
                // The captured pawn sits behind the target square.
                if us == Color::White {
                    to_idx - 8
                } else {
                    to_idx + 8
                }
            } else {
                to_idx
            };
            self.remove_piece(them, cap, Square::from_index(cap_idx));
            h ^= keys.pieces[them_idx][cap.index()][cap_idx];
            if cap == Piece::Pawn {
                self.pawn_key ^= keys.pieces[them_idx][Piece::Pawn.index()][cap_idx];
            }
        }

        self.remove_piece(us, piece, from);
        self.add_piece(us, to_piece, to);
        h ^= keys.pieces[us_idx][piece.index()][from_idx];
        h ^= keys.pieces[us_idx][to_piece.index()][to_idx];
        if piece == Piece::King {
            self.king_sq[us_idx] = to;
        }

        if piece == Piece::Pawn {
            self.pawn_key ^= keys.pieces[us_idx][Piece::Pawn.index()][from_idx];
            // A promotion removes the pawn entirely, so nothing lands on
            // the destination in the pawn key.
            if promotion.is_none() {
                self.pawn_key ^= keys.pieces[us_idx][Piece::Pawn.index()][to_idx];
            }
        }

        if let Some(promo) = promotion {
            self.phase += PHASE_VALUES[promo.index()];
        }

        if m.is_castling() {
            let (rook_from, rook_to) = castling_rook_squares(to_idx);
            self.move_piece(
                us,
                Piece::Rook,
                Square::from_index(rook_from),
                Square::from_index(rook_to),
            );
            h ^= keys.pieces[us_idx][Piece::Rook.index()][rook_from];
            h ^= keys.pieces[us_idx][Piece::Rook.index()][rook_to];
        }

        self.refresh_all_occupied();

        h ^= keys.castling[self.castling as usize];
        self.castling &= CASTLING_MASK[from_idx] & CASTLING_MASK[to_idx];
        h ^= keys.castling[self.castling as usize];

        if piece == Piece::Pawn {
            let diff = to_idx as isize - from_idx as isize;
            if diff == 16 || diff == -16 {
                self.ep_file = (from_idx % 8) as u8;
                h ^= keys.ep_file[self.ep_file as usize];
            }
        }

        self.hash = h;
    }

    /// Reverse a move made by `make_move`.
    pub fn unmake_move(&mut self, m: Move) {
        self.turn = self.turn.opponent();
        let us = self.turn;
        let them = us.opponent();
        let us_idx = us.index();

        let from = m.from();
        let to = m.to();
        let to_idx = to.index();
        let promotion = m.promotion_piece();
        let captured = m.captured_piece();

        let to_piece = self.piece_on[to_idx].expect("unmake_move: to-square is empty");
        let piece = if promotion.is_some() {
            Piece::Pawn
        } else {
            to_piece
        };

        self.ep_file = m.prev_ep_file();
        self.castling = m.prev_castling();

        self.remove_piece(us, to_piece, to);
        self.add_piece(us, piece, from);
        if piece == Piece::King {
            self.king_sq[us_idx] = from;
        }

        if let Some(cap) = captured {
            self.phase += PHASE_VALUES[cap.index()];

            if m.is_en_passant() {
                let cap_idx = if us == Color::White {
                    to_idx - 8
                } else {
                    to_idx + 8
                };
                self.add_piece(them, Piece::Pawn, Square::from_index(cap_idx));
            } else {
                self.add_piece(them, cap, to);
            }
        }

        if let Some(promo) = promotion {
            self.phase -= PHASE_VALUES[promo.index()];
        }

        if m.is_castling() {
            let (rook_from, rook_to) = castling_rook_squares(to_idx);
            self.move_piece(
                us,
                Piece::Rook,
                Square::from_index(rook_to),
                Square::from_index(rook_from),
            );
        }

        self.refresh_all_occupied();

        let undo = self.undo_stack.pop().expect("unmake_move: undo stack is empty");
        self.hash = undo.hash;
        self.pawn_key = undo.pawn_key;
        self.halfmove_clock = undo.halfmove_clock;
    }

    /// Pass the move: flip the side, clear en passant, keep everything
    /// else. Returns the previous en passant file for `unmake_null_move`.
    pub fn make_null_move(&mut self) -> u8 {
        let keys = &*ZOBRIST;
        let prev_ep_file = self.ep_file;

        debug_assert!(self.undo_stack.len() < MAX_GAME_PLIES, "undo stack overflow");
        self.undo_stack.push(UndoState {
            hash: self.hash,
            pawn_key: self.pawn_key,
            halfmove_clock: self.halfmove_clock,
        });

        let mut h = self.hash ^ keys.side_to_move;
        if self.ep_file < 8 {
            h ^= keys.ep_file[self.ep_file as usize];
            self.ep_file = EP_NONE;
        }
        self.turn = self.turn.opponent();
        self.hash = h;

        prev_ep_file
    }

    /// Reverse a null move.
    pub fn unmake_null_move(&mut self, prev_ep_file: u8) {
        let undo = self
            .undo_stack
            .pop()
            .expect("unmake_null_move: undo stack is empty");
        self.hash = undo.hash;
        self.pawn_key = undo.pawn_key;
        self.halfmove_clock = undo.halfmove_clock;
        self.ep_file = prev_ep_file;
        self.turn = self.turn.opponent();
    }
}
