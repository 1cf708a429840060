//! Command-line bench suites: perft verification and WAC tactics.

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use crate::board::eval::PawnCache;
use crate::board::perft::{perft, PerftTable};
use crate::board::search::{search, SearchLimits};
use crate::board::{strip_san_suffixes, Board};
use crate::epd::{parse_perft_file, parse_wac_file};
use crate::tt::TranspositionTable;

/// Run a perft EPD suite. Returns true when every position matched its
/// expected counts.
pub fn bench_perft(path: &Path, max_depth: u32, hash_mb: usize) -> bool {
    let records = parse_perft_file(path);
    if records.is_empty() {
        eprintln!("failed to open or parse: {}", path.display());
        return false;
    }

    let mut table = PerftTable::new(hash_mb);

    println!("running perft suite: {}", path.display());
    println!("positions: {}", records.len());
    if max_depth > 0 {
        println!("max depth: {max_depth}");
    }
    println!("hash table: {hash_mb} MB");
    println!();

    let mut passed = 0;
    let mut failed = 0;
    let mut total_nodes: u64 = 0;
    let suite_start = Instant::now();

    for (i, record) in records.iter().enumerate() {
        let Ok(mut board) = Board::try_from_fen(&record.fen) else {
            println!("[{}/{}] bad FEN: {}", i + 1, records.len(), record.fen);
            failed += 1;
            continue;
        };

        println!("[{}/{}] {}", i + 1, records.len(), record.fen);

        let mut position_passed = true;
        let mut depths = record.expected_nodes.len() as u32;
        if max_depth > 0 {
            depths = depths.min(max_depth);
        }

        for d in 0..depths {
            let depth = d + 1;
            let expected = record.expected_nodes[d as usize];
            let nodes = perft(&mut board, depth, &mut table);
            total_nodes += nodes;

            let elapsed = suite_start.elapsed().as_secs_f64();
            let mnps = if elapsed > 0.0 {
                total_nodes as f64 / elapsed / 1e6
            } else {
                0.0
            };

            if nodes == expected {
                println!("  depth {depth}: {nodes} ({mnps:.2} Mnps) OK");
            } else {
                println!("  depth {depth}: {nodes} (expected {expected}) FAIL");
                position_passed = false;
                break;
            }
        }

        if position_passed {
            passed += 1;
        } else {
            failed += 1;
        }
    }

    let total = suite_start.elapsed().as_secs_f64();
    let mnps = if total > 0.0 {
        total_nodes as f64 / total / 1e6
    } else {
        0.0
    };

    println!();
    println!("=== results ===");
    println!("passed: {passed}/{}", passed + failed);
    println!("failed: {failed}");
    println!("total nodes: {total_nodes}");
    println!("total time: {} ms", (total * 1000.0) as u64);
    println!("nps: {mnps:.2} Mnps");

    let hits = table.hits();
    let misses = table.misses();
    let lookups = hits + misses;
    let hit_rate = if lookups > 0 {
        100.0 * hits as f64 / lookups as f64
    } else {
        0.0
    };
    println!("cache hits: {hits}, misses: {misses} ({hit_rate:.1}% hit rate)");

    failed == 0
}

/// Run a WAC-style tactics suite: search each position for `movetime_ms`
/// and compare the engine move in SAN against the `bm` operands.
/// Returns false only when the file could not be parsed; the solve rate
/// itself is informational.
pub fn bench_wac(path: &Path, movetime_ms: u64, hash_mb: usize, filter: Option<&str>) -> bool {
    let records = parse_wac_file(path);
    if records.is_empty() {
        eprintln!("failed to open or parse: {}", path.display());
        return false;
    }

    let mut tt = TranspositionTable::new(hash_mb);
    let mut pawn_cache = PawnCache::new(1);
    let stop = AtomicBool::new(false);

    let selected: Vec<_> = records
        .iter()
        .filter(|r| filter.map_or(true, |f| r.id.contains(f)))
        .collect();

    println!("running WAC suite: {}", path.display());
    println!("positions: {} ({} selected)", records.len(), selected.len());
    println!("movetime: {movetime_ms} ms, hash: {hash_mb} MB");
    println!();

    let mut solved = 0;
    let suite_start = Instant::now();

    for (i, record) in selected.iter().enumerate() {
        let Ok(mut board) = Board::try_from_fen(&record.fen) else {
            println!("[{}/{}] {} bad FEN", i + 1, selected.len(), record.id);
            continue;
        };

        tt.clear();
        let result = search(
            &mut board,
            &mut tt,
            &mut pawn_cache,
            &stop,
            SearchLimits::movetime(movetime_ms),
            None,
        );

        let engine_san = if result.best_move.is_null() {
            "(none)".to_string()
        } else {
            board.move_to_san(result.best_move)
        };

        let ok = record
            .best_moves
            .iter()
            .any(|bm| strip_san_suffixes(bm) == engine_san);
        if ok {
            solved += 1;
        }

        println!(
            "[{}/{}] {} {} (expected {}) depth {} score {} {}",
            i + 1,
            selected.len(),
            record.id,
            engine_san,
            record.best_moves.join("/"),
            result.depth,
            result.score,
            if ok { "OK" } else { "FAIL" },
        );
    }

    println!();
    println!("=== results ===");
    println!("solved: {solved}/{}", selected.len());
    println!(
        "total time: {} ms",
        suite_start.elapsed().as_millis()
    );

    true
}
