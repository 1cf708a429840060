//! Standard algebraic notation output.
//!
//! Used by the WAC bench to compare engine moves against `bm` operands.
//! Check and mate suffixes are not emitted; comparisons strip them from
//! the reference side instead.

use super::types::{Move, Piece};
use super::Board;

impl Board {
    /// Render a move in SAN with minimal disambiguation. The move must
    /// be legal in the current position.
    #[must_use]
    pub fn move_to_san(&mut self, mv: Move) -> String {
        if mv.is_castling() {
            return if mv.to().file() > mv.from().file() {
                "O-O".to_string()
            } else {
                "O-O-O".to_string()
            };
        }

        let piece = self
            .piece_at(mv.from())
            .expect("move_to_san: from-square is empty");
        let mut san = String::new();

        if piece != Piece::Pawn {
            san.push(piece.to_char().to_ascii_uppercase());

            // Disambiguate against other legal moves of the same piece
            // kind to the same square.
            let legal = self.legal_moves();
            let mut need_file = false;
            let mut need_rank = false;
            for other in &legal {
                if other.to() == mv.to()
                    && other.from() != mv.from()
                    && self.piece_at(other.from()) == Some(piece)
                {
                    if other.from().file() == mv.from().file() {
                        need_rank = true;
                    } else {
                        need_file = true;
                    }
                }
            }
            if need_file {
                san.push((mv.from().file() as u8 + b'a') as char);
            }
            if need_rank {
                san.push((mv.from().rank() as u8 + b'1') as char);
            }
        } else if mv.is_capture() {
            // Pawn captures lead with the source file.
            san.push((mv.from().file() as u8 + b'a') as char);
        }

        if mv.is_capture() {
            san.push('x');
        }

        san.push_str(&mv.to().to_string());

        if let Some(promo) = mv.promotion_piece() {
            san.push('=');
            san.push(promo.to_char().to_ascii_uppercase());
        }

        san
    }
}

/// Strip check/mate decorations from a SAN token for comparison.
#[must_use]
pub fn strip_san_suffixes(san: &str) -> &str {
    san.trim_end_matches(['+', '#'])
}
