//! Square type and utilities.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A square on the chess board, stored as a compact 0-63 index.
///
/// Index layout: rank * 8 + file, where a1=0, b1=1, ..., h8=63.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Square(u8);

impl Square {
    /// Create a square from rank and file (both 0-7).
    #[inline]
    #[must_use]
    pub const fn new(rank: usize, file: usize) -> Self {
        Square((rank * 8 + file) as u8)
    }

    /// Create a square from an index (0-63).
    #[inline]
    #[must_use]
    pub const fn from_index(idx: usize) -> Self {
        Square(idx as u8)
    }

    /// Get the square's index (0-63).
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the rank (0-7, where 0 = rank 1).
    #[inline]
    #[must_use]
    pub const fn rank(self) -> usize {
        (self.0 / 8) as usize
    }

    /// Get the file (0-7, where 0 = file a).
    #[inline]
    #[must_use]
    pub const fn file(self) -> usize {
        (self.0 % 8) as usize
    }

    /// Flip the square vertically (a1 <-> a8).
    #[inline]
    #[must_use]
    pub const fn flip_vertical(self) -> Self {
        Square(self.0 ^ 56)
    }
}

pub(crate) fn file_to_index(file: char) -> usize {
    file as usize - 'a' as usize
}

pub(crate) fn rank_to_index(rank: char) -> usize {
    rank as usize - '1' as usize
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            (self.file() as u8 + b'a') as char,
            self.rank() + 1
        )
    }
}

impl FromStr for Square {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(());
        };
        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return Err(());
        }
        Ok(Square::new(rank_to_index(rank), file_to_index(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_index_roundtrip() {
        for idx in 0..64 {
            let sq = Square::from_index(idx);
            assert_eq!(sq.index(), idx);
            assert_eq!(Square::new(sq.rank(), sq.file()), sq);
        }
    }

    #[test]
    fn test_square_display() {
        assert_eq!(Square::from_index(0).to_string(), "a1");
        assert_eq!(Square::from_index(28).to_string(), "e4");
        assert_eq!(Square::from_index(63).to_string(), "h8");
    }

    #[test]
    fn test_square_from_str() {
        assert_eq!("e4".parse::<Square>(), Ok(Square::from_index(28)));
        assert_eq!("a1".parse::<Square>(), Ok(Square::from_index(0)));
        assert!("i9".parse::<Square>().is_err());
        assert!("e45".parse::<Square>().is_err());
    }

    #[test]
    fn test_flip_vertical() {
        assert_eq!(Square::from_index(0).flip_vertical(), Square::from_index(56));
        assert_eq!(Square::from_index(28).flip_vertical().to_string(), "e5");
    }
}
