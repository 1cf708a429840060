//! Perft: the ground-truth validator for move generation and
//! make/unmake.
//!
//! Counts leaf nodes of the legal move tree to a fixed depth, with a
//! most-recent-wins cache keyed on `(hash, depth)`.

use super::Board;

#[derive(Clone, Copy)]
struct PerftEntry {
    hash: u64,
    nodes: u64,
    depth: u8,
}

/// Cache for perft subtree counts. Power-of-two sized; a store simply
/// overwrites whatever occupied the slot.
pub struct PerftTable {
    entries: Vec<PerftEntry>,
    mask: usize,
    hits: u64,
    misses: u64,
}

impl PerftTable {
    /// Allocate with the given size in MiB, rounded down to a power of
    /// two of entries.
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let bytes = size_mb.max(1) * 1024 * 1024;
        let count = (bytes / std::mem::size_of::<PerftEntry>())
            .next_power_of_two()
            / 2;
        let count = count.max(1024);
        PerftTable {
            entries: vec![
                PerftEntry {
                    hash: 0,
                    nodes: 0,
                    depth: 0
                };
                count
            ],
            mask: count - 1,
            hits: 0,
            misses: 0,
        }
    }

    fn probe(&mut self, hash: u64, depth: u32) -> Option<u64> {
        let entry = &self.entries[hash as usize & self.mask];
        if entry.hash == hash && entry.depth as u32 == depth {
            self.hits += 1;
            Some(entry.nodes)
        } else {
            self.misses += 1;
            None
        }
    }

    fn store(&mut self, hash: u64, depth: u32, nodes: u64) {
        let entry = &mut self.entries[hash as usize & self.mask];
        entry.hash = hash;
        entry.nodes = nodes;
        entry.depth = depth as u8;
    }

    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses
    }
}

/// Count leaf nodes of the legal move tree to `depth`.
#[must_use]
pub fn perft(board: &mut Board, depth: u32, table: &mut PerftTable) -> u64 {
    if depth == 0 {
        return 1;
    }

    if let Some(nodes) = table.probe(board.hash, depth) {
        return nodes;
    }

    let moves = board.generate_moves();
    let mut nodes = 0;
    for mv in &moves {
        let mut mv = *mv;
        board.make_move(&mut mv);
        if !board.mover_in_check() {
            nodes += perft(board, depth - 1, table);
        }
        board.unmake_move(mv);
    }

    table.store(board.hash, depth, nodes);

    nodes
}

/// Per-root-move subtree counts, printed in UCI notation. Returns the
/// total.
pub fn perft_divide(board: &mut Board, depth: u32, table: &mut PerftTable) -> u64 {
    let moves = board.generate_moves();
    let mut total = 0;

    for mv in &moves {
        let mut mv = *mv;
        board.make_move(&mut mv);
        if board.mover_in_check() {
            board.unmake_move(mv);
            continue;
        }
        let nodes = if depth > 1 {
            perft(board, depth - 1, table)
        } else {
            1
        };
        board.unmake_move(mv);

        println!("{}: {nodes}", mv.to_uci());
        total += nodes;
    }

    println!();
    println!("total: {total}");
    total
}
