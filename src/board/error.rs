//! Error types for board operations.

use std::fmt;

/// Error type for FEN parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// FEN string has too few fields (needs at least 4).
    TooFewFields { found: usize },
    /// Invalid piece character in the placement field.
    InvalidPiece { char: char },
    /// Invalid side-to-move field (must be 'w' or 'b').
    InvalidSideToMove { found: String },
    /// Invalid castling character.
    InvalidCastling { char: char },
    /// Invalid en passant square.
    InvalidEnPassant { found: String },
    /// Placement field has too many ranks.
    TooManyRanks,
    /// A rank spills past the h-file.
    TooManyFiles { rank: usize },
    /// A side has no king (or more than one).
    BadKingCount,
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::TooFewFields { found } => {
                write!(f, "FEN must have at least 4 fields, found {found}")
            }
            FenError::InvalidPiece { char } => {
                write!(f, "invalid piece character '{char}' in FEN")
            }
            FenError::InvalidSideToMove { found } => {
                write!(f, "invalid side to move '{found}', expected 'w' or 'b'")
            }
            FenError::InvalidCastling { char } => {
                write!(f, "invalid castling character '{char}' in FEN")
            }
            FenError::InvalidEnPassant { found } => {
                write!(f, "invalid en passant square '{found}'")
            }
            FenError::TooManyRanks => write!(f, "FEN placement has more than 8 ranks"),
            FenError::TooManyFiles { rank } => {
                write!(f, "FEN rank {rank} spills past the h-file")
            }
            FenError::BadKingCount => write!(f, "each side needs exactly one king"),
        }
    }
}

impl std::error::Error for FenError {}

/// Error type for UCI move parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    /// Move string has invalid length (must be 4-5 characters).
    InvalidLength { len: usize },
    /// Invalid square notation.
    InvalidSquare { notation: String },
    /// Invalid promotion piece character.
    InvalidPromotion { char: char },
    /// No legal move matches the notation in the current position.
    IllegalMove { notation: String },
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveParseError::InvalidLength { len } => {
                write!(f, "move must be 4-5 characters, found {len}")
            }
            MoveParseError::InvalidSquare { notation } => {
                write!(f, "invalid square notation in '{notation}'")
            }
            MoveParseError::InvalidPromotion { char } => {
                write!(f, "invalid promotion piece '{char}'")
            }
            MoveParseError::IllegalMove { notation } => {
                write!(f, "illegal move '{notation}'")
            }
        }
    }
}

impl std::error::Error for MoveParseError {}
