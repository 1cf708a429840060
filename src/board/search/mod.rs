//! Alpha-beta search with iterative deepening.
//!
//! Plain fail-hard negamax over the pseudo-legal generator with an
//! in-loop legality filter, transposition-table cutoffs and move
//! ordering, and mate-distance scoring. The driver deepens from 1,
//! reports each completed iteration through a callback and stops
//! cooperatively: a shared stop flag and the elapsed-time budget are
//! polled every 2048 nodes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::tt::{Bound, TranspositionTable};

use super::eval::{evaluate, PawnCache};
use super::types::{Move, MoveList};
use super::Board;

pub(crate) const INFINITY_SCORE: i32 = 30_000;
/// Mate scores are encoded as `MATE_SCORE - ply`, so deeper mates score
/// lower and negamax sign flips keep distances correct.
pub const MATE_SCORE: i32 = 29_000;
pub const MAX_DEPTH: u32 = 64;

/// Scores at or above this are forced mates.
pub const MATE_BOUND: i32 = MATE_SCORE - MAX_DEPTH as i32;

const STOP_CHECK_MASK: u64 = 2047;

/// What a search produced.
#[derive(Clone, Debug)]
pub struct SearchResult {
    /// Best move found; null when the root has no legal move.
    pub best_move: Move,
    /// Expected reply, from the principal variation.
    pub ponder_move: Option<Move>,
    /// Score in centipawns from the root side-to-move's perspective.
    pub score: i32,
    /// Deepest fully completed iteration.
    pub depth: u32,
    /// Nodes visited over the whole search.
    pub nodes: u64,
}

/// Per-iteration report for `info` printing.
#[derive(Clone, Debug)]
pub struct SearchInfo {
    pub depth: u32,
    pub score: i32,
    pub nodes: u64,
    pub time_ms: u64,
    pub pv: Vec<Move>,
}

/// Callback invoked after each completed iteration.
pub type InfoCallback = Box<dyn Fn(&SearchInfo) + Send>;

/// Search limits: a time budget (0 = none) and a depth ceiling.
#[derive(Clone, Copy, Debug)]
pub struct SearchLimits {
    pub budget_ms: u64,
    pub max_depth: u32,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            budget_ms: 0,
            max_depth: MAX_DEPTH,
        }
    }
}

impl SearchLimits {
    /// Limit by time only.
    #[must_use]
    pub fn movetime(budget_ms: u64) -> Self {
        SearchLimits {
            budget_ms,
            ..Default::default()
        }
    }

    /// Limit by depth only.
    #[must_use]
    pub fn depth(max_depth: u32) -> Self {
        SearchLimits {
            budget_ms: 0,
            max_depth: max_depth.min(MAX_DEPTH),
        }
    }
}

struct Searcher<'a> {
    board: &'a mut Board,
    tt: &'a mut TranspositionTable,
    pawn_cache: &'a mut PawnCache,
    stop: &'a AtomicBool,
    start: Instant,
    budget_ms: u64,
    nodes: u64,
    stopped: bool,
}

impl Searcher<'_> {
    /// Cooperative cancellation, polled every 2048 nodes. Once tripped,
    /// every frame unwinds; scores returned after that are not trusted.
    #[inline]
    fn check_stop(&mut self) -> bool {
        if !self.stopped && self.nodes & STOP_CHECK_MASK == 0 {
            if self.stop.load(Ordering::Relaxed) {
                self.stopped = true;
            } else if self.budget_ms > 0
                && self.start.elapsed().as_millis() as u64 >= self.budget_ms
            {
                self.stopped = true;
            }
        }
        self.stopped
    }

    /// Pull the transposition-table move to the front of the list.
    fn order_tt_move_first(moves: &mut MoveList, tt_move: Move) {
        if tt_move.is_null() {
            return;
        }
        if let Some(pos) = moves.as_slice().iter().position(|m| m.same_move(tt_move)) {
            moves.swap(0, pos);
        }
    }

    fn alpha_beta(&mut self, depth: u32, mut alpha: i32, beta: i32, ply: i32) -> i32 {
        if self.check_stop() {
            return 0;
        }

        self.nodes += 1;

        // Fifty-move rule and repetition of an ancestor both end the
        // game; a repeated interior node scores as the draw it can force.
        if self.board.is_draw() {
            return 0;
        }

        let probe = self.tt.probe(self.board.hash, depth, alpha, beta);
        if let Some(score) = probe.score {
            return score;
        }
        let tt_move = probe.best_move;

        if depth == 0 {
            return evaluate(self.board, self.pawn_cache);
        }

        let mut moves = self.board.generate_moves();
        Self::order_tt_move_first(&mut moves, tt_move);

        let alpha_orig = alpha;
        let mut best_score = -INFINITY_SCORE;
        let mut best_move = Move::null();
        let mut legal_moves = 0;

        for i in 0..moves.len() {
            let mut m = moves.as_slice()[i];

            self.board.make_move(&mut m);
            if self.board.mover_in_check() {
                self.board.unmake_move(m);
                continue;
            }
            legal_moves += 1;

            let score = -self.alpha_beta(depth - 1, -beta, -alpha, ply + 1);

            self.board.unmake_move(m);

            if self.stopped {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = m;
            }

            if score >= beta {
                self.tt
                    .store(self.board.hash, depth, beta, Bound::Lower, m);
                return beta;
            }

            if score > alpha {
                alpha = score;
            }
        }

        if legal_moves == 0 {
            return if self.board.in_check(self.board.turn()) {
                -MATE_SCORE + ply
            } else {
                0
            };
        }

        let bound = if alpha > alpha_orig {
            Bound::Exact
        } else {
            Bound::Upper
        };
        self.tt.store(self.board.hash, depth, alpha, bound, best_move);

        alpha
    }

    /// The root mirrors the inner loop but never fails high and always
    /// keeps the best legal move found so far, even when interrupted.
    fn search_root(&mut self, depth: u32) -> (Move, i32) {
        let mut moves = self.board.generate_moves();

        let probe = self
            .tt
            .probe(self.board.hash, depth, -INFINITY_SCORE, INFINITY_SCORE);
        Self::order_tt_move_first(&mut moves, probe.best_move);

        let mut alpha = -INFINITY_SCORE;
        let beta = INFINITY_SCORE;
        let mut best_move = Move::null();
        let mut best_score = -INFINITY_SCORE;
        let mut legal_moves = 0;

        for i in 0..moves.len() {
            let mut m = moves.as_slice()[i];

            self.board.make_move(&mut m);
            if self.board.mover_in_check() {
                self.board.unmake_move(m);
                continue;
            }
            legal_moves += 1;

            let score = -self.alpha_beta(depth - 1, -beta, -alpha, 1);

            self.board.unmake_move(m);

            if self.stopped {
                break;
            }

            if score > best_score {
                best_score = score;
                best_move = m;
            }
            if score > alpha {
                alpha = score;
            }
        }

        if legal_moves == 0 {
            let score = if self.board.in_check(self.board.turn()) {
                -MATE_SCORE
            } else {
                0
            };
            return (Move::null(), score);
        }

        if !self.stopped && !best_move.is_null() {
            self.tt
                .store(self.board.hash, depth, best_score, Bound::Exact, best_move);
        }

        (best_move, best_score)
    }

    /// Walk the transposition table for the principal variation. Every
    /// step is validated against the legal moves of the position, and a
    /// seen-hash list guards against cycles.
    fn extract_pv(&mut self, max_len: usize) -> Vec<Move> {
        let mut pv: Vec<Move> = Vec::with_capacity(max_len);
        let mut seen: Vec<u64> = Vec::with_capacity(max_len);

        while pv.len() < max_len {
            let hash = self.board.hash;
            if seen.contains(&hash) {
                break;
            }
            seen.push(hash);

            let probe = self
                .tt
                .probe(hash, 0, -INFINITY_SCORE, INFINITY_SCORE);
            let tt_move = probe.best_move;
            if tt_move.is_null() {
                break;
            }

            let legal = self.board.legal_moves();
            let Some(mut mv) = legal
                .as_slice()
                .iter()
                .copied()
                .find(|m| m.same_move(tt_move))
            else {
                break;
            };

            self.board.make_move(&mut mv);
            pv.push(mv);
        }

        for mv in pv.iter().rev() {
            self.board.unmake_move(*mv);
        }

        pv
    }
}

/// Run an iteratively deepened search under the given limits.
///
/// On stop the result is the deepest fully completed iteration; if no
/// iteration completed, the best root move of the interrupted one.
pub fn search(
    board: &mut Board,
    tt: &mut TranspositionTable,
    pawn_cache: &mut PawnCache,
    stop: &AtomicBool,
    limits: SearchLimits,
    on_info: Option<InfoCallback>,
) -> SearchResult {
    let start = Instant::now();
    tt.new_search();

    let mut searcher = Searcher {
        board,
        tt,
        pawn_cache,
        stop,
        start,
        budget_ms: limits.budget_ms,
        nodes: 0,
        stopped: false,
    };

    let mut result = SearchResult {
        best_move: Move::null(),
        ponder_move: None,
        score: 0,
        depth: 0,
        nodes: 0,
    };

    for depth in 1..=limits.max_depth.min(MAX_DEPTH) {
        let (mv, score) = searcher.search_root(depth);

        if searcher.stopped {
            if result.best_move.is_null() && !mv.is_null() {
                result.best_move = mv;
                result.score = score;
            }
            break;
        }

        result.best_move = mv;
        result.score = score;
        result.depth = depth;

        let pv = searcher.extract_pv(depth as usize);
        result.ponder_move = pv.get(1).copied();

        if let Some(cb) = &on_info {
            cb(&SearchInfo {
                depth,
                score,
                nodes: searcher.nodes,
                time_ms: start.elapsed().as_millis() as u64,
                pv: if pv.is_empty() && !mv.is_null() {
                    vec![mv]
                } else {
                    pv
                },
            });
        }

        // A forced mate does not get better with depth.
        if score.abs() >= MATE_BOUND {
            break;
        }
    }

    result.nodes = searcher.nodes;
    result
}
