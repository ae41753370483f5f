//! Command line front end for the movegen library.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
#![warn(missing_docs, missing_debug_implementations, unused_extern_crates)]
#![warn(clippy::unimplemented, clippy::todo)]
#![warn(clippy::option_unwrap_used, clippy::result_unwrap_used)]

use std::convert::TryFrom;
use std::fs::{read_to_string, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use clap::{App, Arg, SubCommand, crate_version};
use log::{info, warn};
use serde::Deserialize;
use simplelog::{WriteLogger, LevelFilter, Config as LogConfig};
use movegen::board::{self, Board};
use movegen::chess::{self, Position, Square, START_FEN, variations};
use movegen::config::{self, Config};
use movegen::dispatch::Dispatcher;
use movegen::pgn;

fn main() -> Result<(), Error> {
    let fen_arg = Arg::with_name("fen")
        .value_name("FEN_STRING")
        .default_value(START_FEN)
        .hide_default_value(true)
        .multiple(true)
        .help("Position in Forsyth-Edwards Notation (FEN)");

    let matches =
        App::new("movegen")
            .version(crate_version!())
            .author("Mike Leany")
            .about("Generates legal chess moves from FEN and PGN input")
            .arg(Arg::with_name("log")
                .long("log")
                .short("l")
                .global(true)
                .help("Turns on logging"))
            .arg(Arg::with_name("log-file")
                .long("log-file")
                .global(true)
                .value_name("LOG_FILE")
                .takes_value(true)
                .help("Sets the log file if logging is turned on [default: movegen.log]"))
            .arg(Arg::with_name("log-level")
                .long("log-level")
                .global(true)
                .value_name("LEVEL")
                .takes_value(true)
                .possible_values(&["off", "error", "warn", "info", "debug", "trace"])
                .help("Sets the log level if logging is turned on [default: info]"))
            .arg(Arg::with_name("config")
                .long("config")
                .global(true)
                .value_name("CONFIG_FILE")
                .takes_value(true)
                .help("Reads settings from this file instead of ~/.movegen/config.yaml"))
            .arg(Arg::with_name("workers")
                .long("workers")
                .short("w")
                .global(true)
                .value_name("COUNT")
                .takes_value(true)
                .help("Number of worker threads [default: one per CPU]"))
            .subcommand(SubCommand::with_name("counts")
                .about("Counts the number of variations from a given starting position \
                        to a specified\ndepth. Defaults to the standard starting position.")
                .arg(Arg::with_name("file")
                    .short("f")
                    .value_name("EPD_FILE")
                    .takes_value(true)
                    .conflicts_with("depth")
                    .help("An EPD file of positions and expected counts to check"))
                .arg(Arg::with_name("depth")
                    .long("depth")
                    .short("d")
                    .value_name("DEPTH")
                    .takes_value(true)
                    .required_unless("file")
                    .help("Depth to search the position"))
                .arg(Arg::with_name("parallel")
                    .long("parallel")
                    .short("p")
                    .help("Splits the count over the worker threads"))
                .arg(fen_arg.clone()))
            .subcommand(SubCommand::with_name("moves")
                .about("Lists the legal moves in each position")
                .arg(Arg::with_name("san")
                    .long("san")
                    .help("Prints moves in Standard Algebraic Notation"))
                .arg(fen_arg))
            .subcommand(SubCommand::with_name("pieces")
                .about("Lists the legal moves of the given pieces, using the worker threads")
                .arg(Arg::with_name("fen")
                    .long("fen")
                    .value_name("FEN_STRING")
                    .takes_value(true)
                    .default_value(START_FEN)
                    .hide_default_value(true)
                    .help("Position in Forsyth-Edwards Notation (FEN)"))
                .arg(Arg::with_name("piece")
                    .value_name("PIECE:SQUARE")
                    .multiple(true)
                    .required(true)
                    .help("A piece name and a square, such as knight:g1 or knight:6")))
            .subcommand(SubCommand::with_name("pgn")
                .about("Prints the FEN and moves so far for every position in a PGN file")
                .arg(Arg::with_name("file")
                    .value_name("PGN_FILE")
                    .required(true)))
            .subcommand(SubCommand::with_name("save-config")
                .about("Writes the current settings to the config file, \
                        by default ~/.movegen/config.yaml"))
            .subcommand(SubCommand::with_name("batch")
                .about("Lists the legal moves for each placement in a YAML or JSON file")
                .arg(Arg::with_name("file")
                    .value_name("BATCH_FILE")
                    .required(true)))
            .get_matches();

    let config = Config::discover(matches.value_of_os("config").map(Path::new))?;

    let log_file = matches.value_of_os("log-file")
        .map(PathBuf::from)
        .unwrap_or_else(|| config.log_file.clone());
    let log_level_name = matches.value_of("log-level").unwrap_or(config.log_level.as_str());
    let log_level = match log_level_name {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        level => return Err(Error(format!("{}: invalid log level", level))),
    };

    let _logger = if matches.is_present("log") {
        WriteLogger::init(
            log_level,
            LogConfig::default(),
            File::create(&log_file).map_err(|err| {
                Error(format!("{}: {}", log_file.display(), err))
            })?)
    } else {
        WriteLogger::init(LevelFilter::Off, LogConfig::default(), std::io::sink())
    };

    let workers = match matches.value_of("workers") {
        Some(n) => Some(n.parse().map_err(|_| Error(format!("{}: invalid worker count", n)))?),
        None => config.workers,
    };
    let dispatcher = || -> Result<Dispatcher, Error> {
        let dispatcher = match workers {
            Some(n) => Dispatcher::new(n),
            None => Dispatcher::with_available_parallelism(),
        };
        dispatcher.map_err(|err| Error(format!("cannot start workers: {}", err)))
    };

    match matches.subcommand() {
        ("counts", Some(matches)) => {
            if let Some(file) = matches.value_of("file") {
                return check_epd(Path::new(file));
            }

            let depth = matches
                .value_of("depth")
                .expect("INFALLIBLE")
                .parse()
                .map_err(|_| {Error("depth must be numeric".to_owned())})?;
            let dispatcher = if matches.is_present("parallel") {
                Some(dispatcher()?)
            } else {
                None
            };

            println!();
            for fen in matches.values_of("fen").expect("INFALLIBLE") {
                let pos = parse_fen(fen)?;
                println!("{}", fen);
                let count = match &dispatcher {
                    Some(dispatcher) => {
                        let mut total = 0;
                        for (mv, count) in dispatcher.divide(&pos, depth) {
                            total += count;
                            println!("\t{:7}\t{:12}", mv, count);
                        }
                        if depth < 1 { 1 } else { total }
                    },
                    None => variations::print(&pos, depth),
                };
                println!("Depth {} total:\t{:12}\n", depth, count);
            }
        },
        ("moves", Some(matches)) => {
            for fen in matches.values_of("fen").expect("INFALLIBLE") {
                let pos = parse_fen(fen)?;
                let san = matches.is_present("san");
                let moves: Vec<String> = pos.legal_moves()?.iter()
                    .map(|mv| if san { mv.to_san(&pos) } else { mv.to_string() })
                    .collect();
                println!("{}\n\t{}", fen, moves.join(" "));
            }
        },
        ("pieces", Some(matches)) => {
            let pos = parse_fen(matches.value_of("fen").expect("INFALLIBLE"))?;
            let pieces = matches.values_of("piece").expect("INFALLIBLE")
                .map(parse_piece_square)
                .collect::<Result<Vec<_>, Error>>()?;

            for ((piece, sq), moves) in dispatcher()?.generate_for_pieces(&pos, &pieces)? {
                let moves: Vec<String> = moves.iter().map(|mv| mv.to_string()).collect();
                println!("{} {}:\t{}", piece.name(), sq, moves.join(" "));
            }
        },
        ("pgn", Some(matches)) => {
            let file = matches.value_of("file").expect("INFALLIBLE");
            for (fen, moves) in pgn::load_file(file)? {
                println!("{}\t{}", fen, moves);
            }
        },
        ("save-config", Some(_)) => {
            let path = match matches.value_of_os("config") {
                Some(path) => PathBuf::from(path),
                None => Config::default_path()
                    .ok_or_else(|| Error("cannot find the home directory".to_owned()))?,
            };
            let config = Config {
                workers,
                log_level: log_level_name.to_owned(),
                log_file,
            };
            config.save(&path)?;
            println!("settings written to {}", path.display());
        },
        ("batch", Some(matches)) => {
            let file = Path::new(matches.value_of("file").expect("INFALLIBLE"));
            run_batch(file, workers)?;
        },
        _ => {
            eprintln!("{}", matches.usage());
        },
    }

    Ok(())
}

fn parse_fen(fen: &str) -> Result<Position, Error> {
    fen.parse().map_err(|err| Error(format!("{}: {}", fen, err)))
}

/// Splits an argument such as `knight:g1` or `knight:6`
fn parse_piece_square(arg: &str) -> Result<(chess::Piece, Square), Error> {
    let mut split = arg.splitn(2, ':');
    let piece = chess::Piece::from_name(split.next().unwrap_or(""))?;
    let sq = split.next().ok_or_else(|| Error(format!("{}: expected PIECE:SQUARE", arg)))?;

    let sq = match sq.parse::<usize>() {
        Ok(index) => Square::try_from(index)?,
        Err(_) => sq.parse()?,
    };

    Ok((piece, sq))
}

/// Checks every line of an EPD perft suite against its expected counts
fn check_epd(file: &Path) -> Result<(), Error> {
    let epd = BufReader::new(File::open(file)?);

    for (line_num, line) in epd.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let (pos, expected) = variations::parse_epd_line(&line)
            .map_err(|err| Error(format!("{}: line {}: {}", file.display(), line_num + 1, err)))?;
        println!("\nLine {:3}:\t{}", line_num + 1, pos);

        for (depth, expected) in expected {
            println!("Depth {} expected:\t{:12}", depth, expected);
            let count = variations::count(&pos, depth);
            println!("Depth {} result:  \t{:12}", depth, count);
            if count != expected {
                warn!("{}: depth {}: expected {} but counted {}", pos, depth, expected, count);
                return Err(Error(format!("line {}: depth {}: expected {} but counted {}",
                    line_num + 1, depth, expected, count)));
            }
        }
    }

    Ok(())
}

/// One placement in a batch file
#[derive(Debug, Deserialize)]
struct BatchEntry {
    pieces: Vec<(String, String, usize)>,
    side_to_move: String,
}

fn run_batch(file: &Path, workers: Option<usize>) -> Result<(), Error> {
    let entries: Vec<BatchEntry> = serde_yaml::from_str(&read_to_string(file)?)?;
    info!("{}: {} entries", file.display(), entries.len());

    let mut board = match workers {
        Some(n) => Board::with_workers(n)?,
        None => Board::new()?,
    };

    for (i, entry) in entries.iter().enumerate() {
        let pieces: Vec<(&str, &str, usize)> = entry.pieces.iter()
            .map(|(piece, color, sq)| (piece.as_str(), color.as_str(), *sq))
            .collect();

        board.set_pieces(&pieces)?;
        board.set_side_to_move(&entry.side_to_move)?;
        println!("{}\t{}\t{}", i, board.fen(), board.generate_moves()?.join(" "));
    }

    Ok(())
}

struct Error(String);

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for Error { }

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error(err.to_string())
    }
}

impl From<chess::Error> for Error {
    fn from(err: chess::Error) -> Self {
        Error(err.to_string())
    }
}

impl From<pgn::Error> for Error {
    fn from(err: pgn::Error) -> Self {
        Error(err.to_string())
    }
}

impl From<board::Error> for Error {
    fn from(err: board::Error) -> Self {
        Error(err.to_string())
    }
}

impl From<config::Error> for Error {
    fn from(err: config::Error) -> Self {
        Error(err.to_string())
    }
}
