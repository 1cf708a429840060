//! Transposition table.
//!
//! Fixed-size, power-of-two entry count, one slot per bucket. A probe
//! hands back the stored best move whenever the hash matches (for move
//! ordering) and a score only when the stored depth suffices and the
//! bound applies at the caller's window. Replacement is age-aware: an
//! entry from an older search loses two plies of effective depth per
//! generation it has sat in the table.

use crate::board::Move;

/// How a stored score bounds the true value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    /// Score is exact.
    Exact,
    /// Score is at least this value (fail high).
    Lower,
    /// Score is at most this value (fail low).
    Upper,
}

#[derive(Clone, Copy)]
struct TtEntry {
    hash: u64,
    score: i16,
    depth: u8,
    bound: Bound,
    generation: u8,
    best_move: u32,
}

const EMPTY_ENTRY: TtEntry = TtEntry {
    hash: 0,
    score: 0,
    depth: 0,
    bound: Bound::Exact,
    generation: 0,
    best_move: 0,
};

/// Result of a probe: a score when the entry allows a cutoff at the
/// probed depth and window, and the stored move regardless.
#[derive(Clone, Copy, Debug)]
pub struct TtProbe {
    pub score: Option<i32>,
    pub best_move: Move,
}

/// Probe/store counters for observability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TtStats {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    pub overwrites: u64,
}

pub struct TranspositionTable {
    entries: Vec<TtEntry>,
    mask: usize,
    generation: u8,
    stats: TtStats,
}

impl TranspositionTable {
    /// Allocate with the given size in MiB, rounded down to a power of
    /// two of entries.
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let bytes = size_mb.max(1) * 1024 * 1024;
        let mut count = bytes / std::mem::size_of::<TtEntry>();
        count = (count + 1).next_power_of_two() / 2;
        let count = count.max(1024);

        TranspositionTable {
            entries: vec![EMPTY_ENTRY; count],
            mask: count - 1,
            generation: 0,
            stats: TtStats::default(),
        }
    }

    /// Number of entries (always a power of two).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Begin a new search: ages every resident entry by one generation.
    pub fn new_search(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    #[inline]
    fn index(&self, hash: u64) -> usize {
        hash as usize & self.mask
    }

    /// Look up a position. `hash == 0` marks an empty slot, so the zero
    /// hash can never hit; a real position hashing to 0 simply goes
    /// uncached.
    pub fn probe(&mut self, hash: u64, depth: u32, alpha: i32, beta: i32) -> TtProbe {
        let entry = &self.entries[self.index(hash)];

        if entry.hash != hash {
            self.stats.misses += 1;
            return TtProbe {
                score: None,
                best_move: Move::null(),
            };
        }

        self.stats.hits += 1;
        let best_move = Move::from_u32(entry.best_move);

        if (entry.depth as u32) < depth {
            return TtProbe {
                score: None,
                best_move,
            };
        }

        let score = entry.score as i32;
        let usable = match entry.bound {
            Bound::Exact => true,
            Bound::Lower => score >= beta,
            Bound::Upper => score <= alpha,
        };

        TtProbe {
            score: usable.then_some(score),
            best_move,
        }
    }

    /// Store an entry under the age-aware replacement rule: same hash
    /// always replaces; otherwise the incumbent survives only while
    /// `new_depth + 2 * age < stored_depth`.
    pub fn store(&mut self, hash: u64, depth: u32, score: i32, bound: Bound, best_move: Move) {
        let generation = self.generation;
        let idx = self.index(hash);
        let entry = &mut self.entries[idx];

        self.stats.stores += 1;

        if entry.hash != 0 {
            let age = generation.wrapping_sub(entry.generation) as u32;
            let should_replace = entry.hash == hash || depth + age * 2 >= entry.depth as u32;
            if !should_replace {
                return;
            }
            self.stats.overwrites += 1;
        }

        *entry = TtEntry {
            hash,
            score: score as i16,
            depth: depth as u8,
            bound,
            generation,
            best_move: best_move.as_u32(),
        };
    }

    /// Zero the table, the generation counter and the stats.
    pub fn clear(&mut self) {
        self.entries.fill(EMPTY_ENTRY);
        self.generation = 0;
        self.stats = TtStats::default();
    }

    #[must_use]
    pub fn stats(&self) -> TtStats {
        self.stats
    }

    /// Occupied entries per mille, for `info hashfull` style reporting.
    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        let sample = self.entries.len().min(1000);
        let occupied = self.entries[..sample]
            .iter()
            .filter(|e| e.hash != 0)
            .count();
        (occupied * 1000 / sample.max(1)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe_depth0(tt: &mut TranspositionTable, hash: u64) -> TtProbe {
        tt.probe(hash, 0, -30000, 30000)
    }

    #[test]
    fn test_probe_miss_on_empty_table() {
        let mut tt = TranspositionTable::new(1);
        let probe = probe_depth0(&mut tt, 0xDEADBEEF);
        assert!(probe.score.is_none());
        assert!(probe.best_move.is_null());
        assert_eq!(tt.stats().misses, 1);
    }

    #[test]
    fn test_store_and_probe_exact() {
        let mut tt = TranspositionTable::new(1);
        let mv = Move::from_u32(0x1234);
        tt.store(42, 5, 100, Bound::Exact, mv);

        // Sufficient depth: score usable.
        let probe = tt.probe(42, 5, -30000, 30000);
        assert_eq!(probe.score, Some(100));
        assert!(probe.best_move.same_move(mv));

        // Insufficient depth: move only.
        let probe = tt.probe(42, 6, -30000, 30000);
        assert_eq!(probe.score, None);
        assert!(probe.best_move.same_move(mv));
    }

    #[test]
    fn test_bound_gating() {
        let mut tt = TranspositionTable::new(1);
        tt.store(7, 4, 50, Bound::Lower, Move::null());
        // Lower bound usable only when score >= beta.
        assert_eq!(tt.probe(7, 4, 0, 40).score, Some(50));
        assert_eq!(tt.probe(7, 4, 0, 60).score, None);

        tt.clear();
        tt.store(7, 4, 50, Bound::Upper, Move::null());
        // Upper bound usable only when score <= alpha.
        assert_eq!(tt.probe(7, 4, 60, 100).score, Some(50));
        assert_eq!(tt.probe(7, 4, 40, 100).score, None);
    }

    #[test]
    fn test_same_hash_always_replaces() {
        let mut tt = TranspositionTable::new(1);
        tt.store(9, 10, 100, Bound::Exact, Move::null());
        tt.store(9, 1, -5, Bound::Upper, Move::null());
        assert_eq!(tt.probe(9, 1, -30000, 30000).score, Some(-5));
    }

    #[test]
    fn test_deeper_incumbent_survives_same_generation() {
        let mut tt = TranspositionTable::new(1);
        let mask = (tt.len() - 1) as u64;
        // Two different hashes landing on the same bucket.
        let a = 1u64;
        let b = a + mask + 1;
        assert_eq!(a & mask, b & mask);

        tt.store(a, 10, 100, Bound::Exact, Move::null());
        tt.store(b, 3, 50, Bound::Exact, Move::null());
        // Shallow newcomer loses; the deep entry is still there.
        assert_eq!(tt.probe(a, 10, -30000, 30000).score, Some(100));
        assert!(probe_depth0(&mut tt, b).score.is_none());
    }

    #[test]
    fn test_stale_incumbent_loses_depth_value() {
        let mut tt = TranspositionTable::new(1);
        let mask = (tt.len() - 1) as u64;
        let a = 1u64;
        let b = a + mask + 1;

        tt.store(a, 10, 100, Bound::Exact, Move::null());
        // Four generations later, the depth-10 entry defends only
        // 10 - 2*4 = 2 effective plies.
        for _ in 0..4 {
            tt.new_search();
        }
        tt.store(b, 3, 50, Bound::Exact, Move::null());
        assert_eq!(tt.probe(b, 3, -30000, 30000).score, Some(50));
        assert!(probe_depth0(&mut tt, a).score.is_none());
    }

    #[test]
    fn test_replacement_boundary_is_inclusive() {
        let mut tt = TranspositionTable::new(1);
        let mask = (tt.len() - 1) as u64;
        let a = 1u64;
        let b = a + mask + 1;

        tt.store(a, 6, 100, Bound::Exact, Move::null());
        tt.new_search();
        // new_depth + 2*age = 4 + 2 = 6 >= 6: replaces.
        tt.store(b, 4, 50, Bound::Exact, Move::null());
        assert_eq!(tt.probe(b, 4, -30000, 30000).score, Some(50));
    }

    #[test]
    fn test_stats_counting() {
        let mut tt = TranspositionTable::new(1);
        tt.store(5, 3, 10, Bound::Exact, Move::null());
        tt.store(5, 4, 20, Bound::Exact, Move::null());
        probe_depth0(&mut tt, 5);
        probe_depth0(&mut tt, 6);

        let stats = tt.stats();
        assert_eq!(stats.stores, 2);
        assert_eq!(stats.overwrites, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut tt = TranspositionTable::new(1);
        tt.store(5, 3, 10, Bound::Exact, Move::null());
        tt.clear();
        assert!(probe_depth0(&mut tt, 5).score.is_none());
        assert_eq!(tt.stats().misses, 1);
        assert_eq!(tt.stats().stores, 0);
    }

    #[test]
    fn test_size_is_power_of_two() {
        for mb in [1, 2, 16, 100] {
            let tt = TranspositionTable::new(mb);
            assert!(tt.len().is_power_of_two());
        }
    }

    #[test]
    fn test_hashfull_grows_with_stores() {
        let mut tt = TranspositionTable::new(1);
        assert_eq!(tt.hashfull_per_mille(), 0);
        // Fill the sampled prefix of the table.
        for i in 0..1000u64 {
            tt.store(i + 1, 1, 0, Bound::Exact, Move::null());
        }
        assert!(tt.hashfull_per_mille() > 0);
    }
}
