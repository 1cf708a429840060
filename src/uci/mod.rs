//! The UCI protocol loop.
//!
//! Stdin is drained by a dedicated reader thread into a channel. Between
//! searches the main loop dispatches commands directly; during a search
//! it keeps draining the channel for `stop` / `ponderhit` / `quit` /
//! `isready` while the search runs on its own thread, cancelled through
//! the shared stop flag.

pub mod options;
pub mod time;

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::board::eval::PawnCache;
use crate::board::search::{search, SearchInfo, SearchResult};
use crate::board::Board;
use crate::tt::TranspositionTable;

use self::options::{EngineOptions, UciOption};

const ENGINE_NAME: &str = "Sable";
const ENGINE_AUTHOR: &str = "the Sable developers";

/// Everything a search needs exclusive access to.
struct Engine {
    board: Board,
    tt: TranspositionTable,
    pawn_cache: PawnCache,
}

impl Engine {
    fn new(hash_mb: usize) -> Self {
        Engine {
            board: Board::new(),
            tt: TranspositionTable::new(hash_mb),
            pawn_cache: PawnCache::new(1),
        }
    }
}

/// Run the UCI loop until `quit` or end of input.
pub fn run() {
    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let stop = Arc::new(AtomicBool::new(false));
    let mut options = EngineOptions::default();
    let mut engine = Engine::new(options.hash_mb);
    let mut moves_played: u32 = 0;

    while let Ok(line) = rx.recv() {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        let command = line.split_whitespace().next().unwrap_or("");

        match command {
            "uci" => {
                println!("id name {ENGINE_NAME}");
                println!("id author {ENGINE_AUTHOR}");
                println!(
                    "option name Hash type spin default {} min {} max {}",
                    options::HASH_DEFAULT_MB,
                    options::HASH_MIN_MB,
                    options::HASH_MAX_MB
                );
                println!(
                    "option name Move Overhead type spin default {} min 0 max {}",
                    options::MOVE_OVERHEAD_DEFAULT_MS,
                    options::MOVE_OVERHEAD_MAX_MS
                );
                println!("option name Ponder type check default false");
                println!("uciok");
            }
            "isready" => println!("readyok"),
            "ucinewgame" => {
                engine.tt.clear();
                engine.pawn_cache.clear();
                engine.board = Board::new();
                moves_played = 0;
            }
            "setoption" => match options::parse_setoption(&line) {
                Some(UciOption::Hash(mb)) => {
                    options.hash_mb = mb;
                    engine.tt = TranspositionTable::new(mb);
                }
                Some(UciOption::MoveOverhead(ms)) => options.move_overhead_ms = ms,
                Some(UciOption::Ponder(on)) => options.ponder = on,
                None => log::debug!("ignored setoption: {line}"),
            },
            "position" => parse_position(&line, &mut engine.board),
            "go" => {
                let quit = run_go(&line, &mut engine, &options, &stop, &rx, &mut moves_played);
                if quit {
                    break;
                }
            }
            // A stop or ponderhit with no search running is stale; drop it.
            "stop" | "ponderhit" => {}
            "quit" => break,
            _ => eprintln!("Unknown command: {command}"),
        }
    }
}

/// Rebuild the board from a `position` command.
fn parse_position(line: &str, board: &mut Board) {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let mut i = 1;

    match tokens.get(i) {
        Some(&"startpos") => {
            *board = Board::new();
            i += 1;
        }
        Some(&"fen") => {
            i += 1;
            let start = i;
            while i < tokens.len() && tokens[i] != "moves" && i - start < 6 {
                i += 1;
            }
            let fen = tokens[start..i].join(" ");
            match Board::try_from_fen(&fen) {
                Ok(parsed) => *board = parsed,
                Err(err) => {
                    eprintln!("Error: invalid FEN '{fen}': {err}");
                    return;
                }
            }
        }
        _ => return,
    }

    if tokens.get(i) == Some(&"moves") {
        for token in &tokens[i + 1..] {
            if let Err(err) = board.make_move_uci(token) {
                eprintln!("Error: {err}");
                break;
            }
        }
    }
}

fn print_info(info: &SearchInfo) {
    let pv: Vec<String> = info.pv.iter().map(|m| m.to_uci()).collect();
    println!(
        "info depth {} score cp {} nodes {} time {} pv {}",
        info.depth,
        info.score,
        info.nodes,
        info.time_ms,
        pv.join(" ")
    );
}

fn print_bestmove(result: Option<&SearchResult>) {
    match result {
        Some(result) => {
            let mut line = format!("bestmove {}", result.best_move.to_uci());
            if let Some(ponder) = result.ponder_move {
                line.push_str(&format!(" ponder {}", ponder.to_uci()));
            }
            println!("{line}");
        }
        None => println!("bestmove 0000"),
    }
}

/// Launch a search and babysit the channel until it finishes.
/// Returns true when `quit` arrived mid-search.
fn run_go(
    line: &str,
    engine: &mut Engine,
    options: &EngineOptions,
    stop: &Arc<AtomicBool>,
    rx: &Receiver<String>,
    moves_played: &mut u32,
) -> bool {
    let params = time::parse_go(line);
    let limits = time::search_limits(
        &params,
        engine.board.turn().is_white(),
        options.move_overhead_ms,
        *moves_played,
    );

    stop.store(false, Ordering::Relaxed);
    let mut pondering = params.ponder;
    let mut quit = false;

    let result_slot: Mutex<Option<SearchResult>> = Mutex::new(None);

    thread::scope(|s| {
        let handle = s.spawn(|| {
            let result = search(
                &mut engine.board,
                &mut engine.tt,
                &mut engine.pawn_cache,
                stop,
                limits,
                Some(Box::new(print_info)),
            );
            *result_slot.lock() = Some(result);
        });

        while !handle.is_finished() {
            match rx.recv_timeout(Duration::from_millis(1)) {
                Ok(cmd) => match cmd.trim() {
                    "stop" => {
                        stop.store(true, Ordering::Relaxed);
                        pondering = false;
                    }
                    "ponderhit" => pondering = false,
                    "quit" => {
                        stop.store(true, Ordering::Relaxed);
                        quit = true;
                    }
                    "isready" => println!("readyok"),
                    other => log::debug!("dropped mid-search command: {other}"),
                },
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    stop.store(true, Ordering::Relaxed);
                    quit = true;
                }
            }
        }

        // The search stores its result before the thread ends.
        let _ = handle.join();
    });

    let result = result_slot.lock().take();
    if !pondering {
        print_bestmove(result.as_ref());
        *moves_played += 1;
    }

    quit
}
