//! EPD file parsing for the bench suites.
//!
//! Two dialects are consumed: perft records (`FEN;nodes_d1;nodes_d2;…`)
//! and WAC-style test records (`FEN bm <san> [<san>…]; id "…";`).
//! A missing or unreadable file yields an empty list; the caller reports
//! and exits nonzero.

use std::fs;
use std::path::Path;

/// One perft suite record: a position and its expected node counts for
/// depths 1, 2, 3, ...
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PerftRecord {
    pub fen: String,
    pub expected_nodes: Vec<u64>,
}

/// One WAC record: a position, the accepted best moves in SAN, and an id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WacRecord {
    pub fen: String,
    pub best_moves: Vec<String>,
    pub id: String,
}

/// Parse a perft EPD file. Returns an empty list if the file cannot be
/// read.
#[must_use]
pub fn parse_perft_file(path: &Path) -> Vec<PerftRecord> {
    match fs::read_to_string(path) {
        Ok(contents) => parse_perft_lines(contents.lines()),
        Err(err) => {
            log::warn!("could not read {}: {err}", path.display());
            Vec::new()
        }
    }
}

fn parse_perft_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<PerftRecord> {
    let mut records = Vec::new();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split(';');
        let Some(fen) = parts.next() else { continue };
        let fen = fen.trim().to_string();

        let expected_nodes: Vec<u64> = parts
            .map_while(|tok| {
                let tok = tok.trim();
                if tok.is_empty() {
                    None
                } else {
                    tok.parse().ok()
                }
            })
            .collect();

        if fen.is_empty() || expected_nodes.is_empty() {
            log::warn!("skipping malformed perft record: {line}");
            continue;
        }

        records.push(PerftRecord {
            fen,
            expected_nodes,
        });
    }

    records
}

/// Parse a WAC EPD file. Returns an empty list if the file cannot be
/// read.
#[must_use]
pub fn parse_wac_file(path: &Path) -> Vec<WacRecord> {
    match fs::read_to_string(path) {
        Ok(contents) => parse_wac_lines(contents.lines()),
        Err(err) => {
            log::warn!("could not read {}: {err}", path.display());
            Vec::new()
        }
    }
}

fn parse_wac_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<WacRecord> {
    let mut records = Vec::new();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(bm_pos) = line.find(" bm ") else {
            continue;
        };
        let fen = line[..bm_pos].trim().to_string();

        let Some(bm_end) = line[bm_pos..].find(';').map(|i| i + bm_pos) else {
            continue;
        };
        let best_moves: Vec<String> = line[bm_pos + 4..bm_end]
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let id = line[bm_end..]
            .find("id \"")
            .and_then(|i| {
                let start = bm_end + i + 4;
                line[start..].find('"').map(|end| line[start..start + end].to_string())
            })
            .unwrap_or_default();

        if fen.is_empty() || best_moves.is_empty() {
            log::warn!("skipping malformed WAC record: {line}");
            continue;
        }

        records.push(WacRecord {
            fen,
            best_moves,
            id,
        });
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_perft_lines() {
        let input = "\
rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1;20;400;8902
8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1;14;191

not-a-record";
        let records = parse_perft_lines(input.lines());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].expected_nodes, vec![20, 400, 8902]);
        assert_eq!(records[1].fen, "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
    }

    #[test]
    fn test_parse_wac_lines() {
        let input = r#"2rr3k/pp3pp1/1nnqbN1p/3pN3/2pP4/2P3Q1/PPB4P/R4RK1 w - - bm Qg6; id "WAC.001";
8/7p/5k2/5p2/p1p2P2/Pr1pPK2/1P1R3P/8 b - - bm Rxb2; id "WAC.002";
no best move here"#;
        let records = parse_wac_lines(input.lines());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].best_moves, vec!["Qg6"]);
        assert_eq!(records[0].id, "WAC.001");
        assert_eq!(records[1].best_moves, vec!["Rxb2"]);
    }

    #[test]
    fn test_multiple_best_moves() {
        let input = r#"4k3/8/8/8/8/8/8/4K2R w K - bm Rh8 Kf2; id "TEST.1";"#;
        let records = parse_wac_lines(input.lines());
        assert_eq!(records[0].best_moves, vec!["Rh8", "Kf2"]);
    }

    #[test]
    fn test_missing_file_is_empty() {
        assert!(parse_perft_file(Path::new("/no/such/file.epd")).is_empty());
        assert!(parse_wac_file(Path::new("/no/such/file.epd")).is_empty());
    }
}
