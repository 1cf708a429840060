//! FEN input/output and UCI move parsing.

use std::str::FromStr;

use super::error::{FenError, MoveParseError};
use super::state::EP_NONE;
use super::types::castling::{
    BLACK_KINGSIDE, BLACK_QUEENSIDE, WHITE_KINGSIDE, WHITE_QUEENSIDE,
};
use super::types::{file_to_index, rank_to_index, Color, Move, Piece, Square};
use super::Board;

impl Board {
    /// Parse a board position from FEN notation.
    ///
    /// Only the first four fields are required; the halfmove clock is read
    /// when present, the fullmove number is ignored.
    pub fn try_from_fen(fen: &str) -> Result<Self, FenError> {
        let mut board = Board::empty();
        let fields: Vec<&str> = fen.split_whitespace().collect();

        if fields.len() < 4 {
            return Err(FenError::TooFewFields {
                found: fields.len(),
            });
        }

        for (rank_idx, rank_str) in fields[0].split('/').enumerate() {
            if rank_idx >= 8 {
                return Err(FenError::TooManyRanks);
            }
            let rank = 7 - rank_idx;
            let mut file = 0;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                } else {
                    let color = if c.is_ascii_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                    if file >= 8 {
                        return Err(FenError::TooManyFiles { rank: rank_idx });
                    }
                    board.add_piece(color, piece, Square::new(rank, file));
                    file += 1;
                }
            }
        }

        for color in 0..2 {
            if board.pieces[color][Piece::King.index()].popcount() != 1 {
                return Err(FenError::BadKingCount);
            }
        }

        board.turn = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };

        for c in fields[2].chars() {
            match c {
                'K' => board.castling |= WHITE_KINGSIDE,
                'Q' => board.castling |= WHITE_QUEENSIDE,
                'k' => board.castling |= BLACK_KINGSIDE,
                'q' => board.castling |= BLACK_QUEENSIDE,
                '-' => {}
                _ => return Err(FenError::InvalidCastling { char: c }),
            }
        }

        board.ep_file = if fields[3] == "-" {
            EP_NONE
        } else {
            let sq = Square::from_str(fields[3]).map_err(|()| FenError::InvalidEnPassant {
                found: fields[3].to_string(),
            })?;
            sq.file() as u8
        };

        if let Some(halfmove) = fields.get(4) {
            board.halfmove_clock = halfmove.parse().unwrap_or(0);
        }

        board.refresh_derived_state();
        Ok(board)
    }

    /// Parse a board position from FEN notation.
    ///
    /// # Panics
    /// Panics on invalid FEN. Use `try_from_fen` for fallible parsing.
    #[must_use]
    pub fn from_fen(fen: &str) -> Self {
        Self::try_from_fen(fen).expect("invalid FEN string")
    }

    /// Render the position as a six-field FEN string.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut rows: Vec<String> = Vec::with_capacity(8);
        for rank in (0..8).rev() {
            let mut row = String::new();
            let mut empty = 0;
            for file in 0..8 {
                let sq = Square::new(rank, file);
                match (self.piece_at(sq), self.color_on(sq)) {
                    (Some(piece), Some(color)) => {
                        if empty > 0 {
                            row.push_str(&empty.to_string());
                            empty = 0;
                        }
                        row.push(piece.to_fen_char(color));
                    }
                    _ => empty += 1,
                }
            }
            if empty > 0 {
                row.push_str(&empty.to_string());
            }
            rows.push(row);
        }

        let active = if self.turn == Color::White { "w" } else { "b" };

        let mut castling = String::new();
        if self.castling & WHITE_KINGSIDE != 0 {
            castling.push('K');
        }
        if self.castling & WHITE_QUEENSIDE != 0 {
            castling.push('Q');
        }
        if self.castling & BLACK_KINGSIDE != 0 {
            castling.push('k');
        }
        if self.castling & BLACK_QUEENSIDE != 0 {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let ep = self
            .ep_square()
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());

        format!(
            "{} {} {} {} {} 1",
            rows.join("/"),
            active,
            castling,
            ep,
            self.halfmove_clock
        )
    }

    /// Parse a move in UCI long algebraic notation (`e2e4`, `e7e8q`) by
    /// matching it against the legal moves of the current position.
    pub fn parse_move(&mut self, uci: &str) -> Result<Move, MoveParseError> {
        if uci.len() < 4 || uci.len() > 5 {
            return Err(MoveParseError::InvalidLength { len: uci.len() });
        }

        let chars: Vec<char> = uci.chars().collect();
        if !('a'..='h').contains(&chars[0])
            || !('1'..='8').contains(&chars[1])
            || !('a'..='h').contains(&chars[2])
            || !('1'..='8').contains(&chars[3])
        {
            return Err(MoveParseError::InvalidSquare {
                notation: uci.to_string(),
            });
        }

        let from = Square::new(rank_to_index(chars[1]), file_to_index(chars[0]));
        let to = Square::new(rank_to_index(chars[3]), file_to_index(chars[2]));

        let promotion = if uci.len() == 5 {
            let piece = Piece::from_char(chars[4]).ok_or(MoveParseError::InvalidPromotion {
                char: chars[4],
            })?;
            if matches!(piece, Piece::Pawn | Piece::King) {
                return Err(MoveParseError::InvalidPromotion { char: chars[4] });
            }
            Some(piece)
        } else {
            None
        };

        let legal = self.legal_moves();
        for mv in &legal {
            if mv.from() == from && mv.to() == to && mv.promotion_piece() == promotion {
                return Ok(*mv);
            }
        }

        Err(MoveParseError::IllegalMove {
            notation: uci.to_string(),
        })
    }

    /// Parse a UCI move and make it on the board in one call.
    pub fn make_move_uci(&mut self, uci: &str) -> Result<Move, MoveParseError> {
        let mut mv = self.parse_move(uci)?;
        self.make_move(&mut mv);
        Ok(mv)
    }
}

impl FromStr for Board {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::try_from_fen(s)
    }
}
