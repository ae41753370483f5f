//! Tools for reading PGN files and replaying their games.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use std::fs::File;
use std::io;
use std::io::{Read, BufRead, BufReader};
use std::path::Path;
use std::collections::HashMap;
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use crate::chess;
use chess::{Position, SanMove};

lazy_static! {
    static ref TAG: Regex = Regex::new(r#"^\[\s*(\w+)\s+"(.*)"\s*\]$"#).expect("INFALLIBLE");
    static ref MOVE_SEPARATOR: Regex = Regex::new(r"\s+|\d+\s*\.+").expect("INFALLIBLE");
}

const RESULTS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// Returns an iterator over the games in a PGN stream.
///
/// A game is a block of tag pairs followed by movetext. The movetext ends at a game result, at a
/// blank line or at the next tag line, unless a comment or variation is still open.
pub fn read_pgn_games<R: Read>(reader: R) -> ReadPgnGames<R> {
    ReadPgnGames{ reader: BufReader::new(reader), buffer: String::new() }
}

/// Iterator returned by [`read_pgn_games`](fn.read_pgn_games.html)
#[derive(Debug)]
pub struct ReadPgnGames<R: Read> {
    reader: BufReader<R>,
    buffer: String,
}

impl<R: Read> Iterator for ReadPgnGames<R> {
    type Item = io::Result<PgnGame>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut tags = Vec::new();
        let mut move_text = String::new();

        loop {
            let s = self.buffer.trim();

            if s.starts_with('[') {
                if move_text.is_empty() {
                    tags.push(s.to_owned());
                } else {
                    // the buffered line belongs to the next game
                    return Some(Ok(PgnGame{ tags, move_text }));
                }
            } else if !s.is_empty() && !s.starts_with('%') {
                move_text += s;
                move_text.push('\n');

                let (main_line, open) = main_line(&move_text);
                let last = main_line.split_whitespace().last();
                if !open && last.map_or(false, |token| RESULTS.contains(&token)) {
                    self.buffer.clear();
                    return Some(Ok(PgnGame{ tags, move_text }));
                }
            } else if s.is_empty() && !move_text.is_empty() && !main_line(&move_text).1 {
                self.buffer.clear();
                return Some(Ok(PgnGame{ tags, move_text }));
            }

            self.buffer.clear();
            match self.reader.read_line(&mut self.buffer) {
                Ok(0) => {
                    if tags.is_empty() && move_text.trim().is_empty() {
                        return None;
                    } else {
                        return Some(Ok(PgnGame{ tags, move_text }));
                    }
                },
                Err(error) => return Some(Err(error)),
                _ => {},
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The raw text of a single game from a PGN file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnGame {
    tags: Vec<String>,
    move_text: String,
}

impl PgnGame {
    /// Returns the tag lines exactly as they were read
    pub fn tag_text(&self) -> &[String] {
        &self.tags
    }

    /// Parses the tag pairs, such as `[Event "Casual game"]`
    pub fn tags(&self) -> Result<HashMap<String, String>> {
        let mut tags = HashMap::new();

        for tag in &self.tags {
            match TAG.captures(tag) {
                Some(caps) => {
                    tags.insert(caps[1].to_owned(), caps[2].replace("\\\"", "\""));
                },
                None => return Err(Error::Tag(tag.clone())),
            }
        }

        Ok(tags)
    }

    /// Returns the movetext, one line per line of input
    pub fn move_text(&self) -> &str {
        &self.move_text
    }

    /// Returns the SAN tokens of the main line.
    ///
    /// Comments, variations, numeric annotation glyphs, move numbers and the game result are
    /// dropped.
    pub fn move_tokens(&self) -> Vec<String> {
        let (main_line, _) = main_line(&self.move_text);

        MOVE_SEPARATOR.split(&main_line)
            .filter(|token| !token.is_empty())
            .filter(|token| !token.starts_with('$'))
            .filter(|token| !RESULTS.contains(token))
            .map(|token| token.to_owned())
            .collect()
    }

    /// Replays the game and returns a `(fen, moves)` pair for every position reached, starting with
    /// the initial one.
    ///
    /// `moves` lists the moves played so far in coordinate notation, separated by spaces. The game
    /// starts from the standard position unless a `FEN` tag says otherwise.
    pub fn positions(&self) -> Result<Vec<(String, String)>> {
        let tags = self.tags()?;
        let mut pos = match tags.get("FEN") {
            Some(fen) => fen.parse()?,
            None => Position::new(),
        };

        let mut history: Vec<String> = Vec::new();
        let mut positions = vec![(pos.to_fen_str(), String::new())];

        for token in self.move_tokens() {
            let san: SanMove = token.parse()
                .map_err(|_| chess::Error::AmbiguousOrIllegalMove(token.clone()))?;
            let mv = san.resolve(&pos)?;

            pos = pos.make_move(mv)?;
            history.push(mv.to_string());
            positions.push((pos.to_fen_str(), history.join(" ")));
        }

        Ok(positions)
    }
}

/// Blanks out the comments and variations of `move_text`. Also returns whether a brace comment or a
/// variation is still open at the end.
///
/// A `;` comment runs to the end of its line. Brace comments don't nest, and a `;` or parenthesis
/// inside one is plain text.
fn main_line(move_text: &str) -> (String, bool) {
    let mut main_line = String::with_capacity(move_text.len());
    let mut brace_comment = false;
    let mut line_comment = false;
    let mut variation_depth = 0usize;

    for c in move_text.chars() {
        match c {
            '\n' if line_comment => line_comment = false,
            '}' if brace_comment => brace_comment = false,
            _ if brace_comment || line_comment => {},
            '{' => brace_comment = true,
            ';' => line_comment = true,
            '(' => variation_depth += 1,
            ')' if variation_depth > 0 => variation_depth -= 1,
            _ if variation_depth > 0 => {},
            _ => {
                main_line.push(c);
                continue;
            },
        }
        // keep tokens on either side of a comment apart
        main_line.push(' ');
    }

    (main_line, brace_comment || variation_depth > 0)
}

/// Replays every game in `text`, concatenating their `(fen, moves)` pairs in order
pub fn parse_game(text: &str) -> Result<Vec<(String, String)>> {
    replay_all(read_pgn_games(text.as_bytes()))
}

/// Replays every game in the PGN file at `path`, concatenating their `(fen, moves)` pairs in file
/// order
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Vec<(String, String)>> {
    let file = File::open(path.as_ref())?;
    let positions = replay_all(read_pgn_games(file))?;
    info!("{}: {} positions", path.as_ref().display(), positions.len());
    Ok(positions)
}

fn replay_all<R: Read>(games: ReadPgnGames<R>) -> Result<Vec<(String, String)>> {
    let mut positions = Vec::new();

    for (i, game) in games.enumerate() {
        let game = game?;
        if game.move_tokens().is_empty() {
            debug!("game {}: no moves", i + 1);
        }

        let replayed = game.positions()?;
        info!("game {}: {} positions", i + 1, replayed.len());
        positions.extend(replayed);
    }

    Ok(positions)
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Error type used by the `pgn` module
#[derive(Debug)]
pub enum Error {
    /// Reading the PGN failed
    Io(io::Error),
    /// A tag line is not of the form `[Name "value"]`
    Tag(String),
    /// A FEN tag or a move could not be used
    Chess(chess::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(error) => write!(f, "PGN read error: {}", error),
            Error::Tag(tag) => write!(f, "{}: malformed PGN tag", tag),
            Error::Chess(error) => write!(f, "PGN replay error: {}", error),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(error) => Some(error),
            Error::Chess(error) => Some(error),
            Error::Tag(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::Io(error)
    }
}

impl From<chess::Error> for Error {
    fn from(error: chess::Error) -> Self {
        Error::Chess(error)
    }
}

/// Result type used by the `pgn` module
pub type Result<T> = std::result::Result<T, Error>;
