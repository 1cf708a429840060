//! Zobrist keys for incremental position hashing.
//!
//! A fixed seed keeps hashes reproducible across runs, which the tests
//! and the transposition table's empty-slot convention rely on.

use std::sync::LazyLock;

use rand::prelude::*;

pub(crate) struct ZobristKeys {
    /// `pieces[color][piece][square]`
    pub(crate) pieces: [[[u64; 64]; 6]; 2],
    /// XORed into the hash only when Black is to move.
    pub(crate) side_to_move: u64,
    /// One key per en passant file; applied only when a target exists.
    pub(crate) ep_file: [u64; 8],
    /// One key per 4-bit castling-rights state.
    pub(crate) castling: [u64; 16],
}

impl ZobristKeys {
    fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(0x98f1_07a3_c5e2_b4d6);

        let mut pieces = [[[0u64; 64]; 6]; 2];
        for color in &mut pieces {
            for piece in color.iter_mut() {
                for key in piece.iter_mut() {
                    *key = rng.gen();
                }
            }
        }

        let side_to_move = rng.gen();

        let mut ep_file = [0u64; 8];
        for key in &mut ep_file {
            *key = rng.gen();
        }

        let mut castling = [0u64; 16];
        for key in &mut castling {
            *key = rng.gen();
        }

        ZobristKeys {
            pieces,
            side_to_move,
            ep_file,
            castling,
        }
    }
}

pub(crate) static ZOBRIST: LazyLock<ZobristKeys> = LazyLock::new(ZobristKeys::new);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_reproducible() {
        let a = ZobristKeys::new();
        let b = ZobristKeys::new();
        assert_eq!(a.pieces[0][0][0], b.pieces[0][0][0]);
        assert_eq!(a.side_to_move, b.side_to_move);
        assert_eq!(a.castling[15], b.castling[15]);
    }

    #[test]
    fn test_keys_are_distinct() {
        let keys = &*ZOBRIST;
        // Spot-check that the generator did not hand out duplicates.
        assert_ne!(keys.pieces[0][0][0], keys.pieces[0][0][1]);
        assert_ne!(keys.pieces[0][0][0], keys.pieces[1][0][0]);
        assert_ne!(keys.side_to_move, keys.castling[0]);
    }
}
