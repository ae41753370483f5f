//! Tests replaying PGN files (pgn module)
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;
use movegen::board::Board;
use movegen::chess::{self, START_FEN};
use movegen::pgn;

const TWO_GAMES: &str = r#"
% exported by hand
[Event "Casual game"]
[White "Somebody"]
[Black "Somebody else"]
[Result "1-0"]

1. e4 e5 2. Nf3 {develops} Nc6 (2... d6 3. d4) 3. Bb5 a6 $1 ; the Morphy defence
1-0

[Event "Castling study"]
[SetUp "1"]
[FEN "4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1"]

1. O-O+ Kd7 2. Rfe1 *
"#;

fn write_temp(name: &str, text: &str) -> PathBuf {
    let path = env::temp_dir().join(format!("movegen-{}-{}", process::id(), name));
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn two_games_from_a_file() {
    let path = write_temp("two-games.pgn", TWO_GAMES);
    let positions = pgn::load_file(&path).unwrap();
    let _ = fs::remove_file(&path);

    assert_eq!(positions.len(), 11);

    // 1. the first game starts from the standard position
    assert_eq!(positions[0], (START_FEN.to_owned(), String::new()));

    // 2. the variation, comments and NAG are skipped
    assert_eq!(positions[6], (
        "r1bqkbnr/1ppp1ppp/p1n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 0 4".to_owned(),
        "e2e4 e7e5 g1f3 b8c6 f1b5 a7a6".to_owned(),
    ));

    // 3. the second game starts from its FEN tag
    assert_eq!(positions[7],
        ("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1".to_owned(), String::new()));

    // 4. castling and a file-disambiguated rook move
    assert_eq!(positions[8],
        ("4k3/8/8/8/8/8/8/R4RK1 b - - 1 1".to_owned(), "e1g1".to_owned()));
    assert_eq!(positions[10], (
        "8/3k4/8/8/8/8/8/R3R1K1 b - - 3 2".to_owned(),
        "e1g1 e8d7 f1e1".to_owned(),
    ));
}

#[test]
fn board_loads_the_same_file() {
    let path = write_temp("board.pgn", TWO_GAMES);
    let board = Board::with_workers(1).unwrap();
    let from_board = board.load_pgn(&path).unwrap();
    let from_module = pgn::load_file(&path).unwrap();
    let _ = fs::remove_file(&path);

    assert_eq!(from_board, from_module);
    assert_eq!(board.fen(), START_FEN);
}

#[test]
fn illegal_move_stops_the_replay() {
    let path = write_temp("illegal.pgn", "[Event \"?\"]\n\n1. e4 e5 2. Ke3 *\n");
    let result = pgn::load_file(&path);
    let _ = fs::remove_file(&path);

    match result {
        Err(pgn::Error::Chess(chess::Error::AmbiguousOrIllegalMove(mv))) => assert_eq!(mv, "Ke3"),
        other => panic!("unexpected result: {:?}", other),
    }
}
