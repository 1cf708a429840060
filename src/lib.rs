//! Sable, a UCI chess engine.
//!
//! The [`board`] module owns the position, move generation, evaluation,
//! search and perft; [`tt`] holds the transposition table; [`uci`] runs
//! the protocol loop; [`epd`] and [`bench`] back the command-line test
//! suites.

pub mod bench;
pub mod board;
pub mod epd;
pub mod tt;
pub mod uci;
pub(crate) mod zobrist;
