//! A string-based handle on a position, for callers that work with piece names, color names and
//! square numbers instead of the types in [`chess`](../chess/index.html).
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fmt;
use std::path::Path;
use log::debug;
use rayon::ThreadPoolBuildError;
use crate::chess::{self, Color, Move, Piece, Position, Square};
use crate::dispatch::Dispatcher;
use crate::pgn;

/// A position together with a worker pool.
///
/// Squares are numbered 0 (a1) to 63 (h8), rank by rank. Pieces are named "pawn", "knight",
/// "bishop", "rook", "queen" and "king", colors "white" and "black". Moves come back in coordinate
/// notation, such as "e2e4" or "e7e8q".
///
/// ```rust
/// use movegen::board::Board;
///
/// let mut board = Board::with_workers(2)?;
/// board.set_pieces(&[("king", "white", 4), ("king", "black", 60)])?;
/// board.set_side_to_move("white")?;
///
/// assert_eq!(board.generate_moves()?, vec!["e1d1", "e1f1", "e1d2", "e1e2", "e1f2"]);
/// # Ok::<(), movegen::board::Error>(())
/// ```
#[derive(Debug)]
pub struct Board {
    pos: Position,
    dispatcher: Dispatcher,
}

/// Moves for each requested piece, keyed by piece name and square number
pub type PieceMoves = Vec<((String, usize), Vec<String>)>;

impl Board {
    /// Creates a board in the standard starting position, with one worker per available CPU.
    pub fn new() -> Result<Board> {
        Ok(Board { pos: Position::new(), dispatcher: Dispatcher::with_available_parallelism()? })
    }

    /// Creates a board in the standard starting position, with `workers` worker threads.
    pub fn with_workers(workers: usize) -> Result<Board> {
        Ok(Board { pos: Position::new(), dispatcher: Dispatcher::new(workers)? })
    }

    /// Returns the current position.
    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// Returns the current position in FEN.
    pub fn fen(&self) -> String {
        self.pos.to_fen_str()
    }

    /// Returns to the standard starting position.
    pub fn reset(&mut self) {
        self.pos = Position::new();
    }

    /// Replaces every piece on the board with `(piece, color, square)` triples.
    ///
    /// Castling rights and the en-passant square are cleared. Nothing changes if any triple fails
    /// to convert.
    pub fn set_pieces(&mut self, pieces: &[(&str, &str, usize)]) -> Result<()> {
        let pieces = pieces.iter()
            .map(|&(piece, color, sq)| -> chess::Result<_> {
                Ok((Piece::from_name(piece)?, Color::from_name(color)?, Square::try_from(sq)?))
            })
            .collect::<chess::Result<Vec<_>>>()?;

        self.pos.set_pieces(&pieces);
        Ok(())
    }

    /// Sets the side to move to "white" or "black".
    pub fn set_side_to_move(&mut self, color: &str) -> Result<()> {
        self.pos.set_side_to_move(Color::from_name(color)?);
        Ok(())
    }

    /// Loads a position from FEN. The previous position is kept if `fen` is malformed.
    pub fn load_fen(&mut self, fen: &str) -> Result<()> {
        self.pos = fen.parse()?;
        debug!("loaded {}", self.pos);
        Ok(())
    }

    /// Replays every game in a PGN file, returning a `(fen, moves)` pair for each position reached.
    ///
    /// The board itself is not changed.
    pub fn load_pgn<P: AsRef<Path>>(&self, path: P) -> Result<Vec<(String, String)>> {
        Ok(pgn::load_file(path)?)
    }

    /// Plays a legal move given in coordinate notation.
    pub fn push_uci(&mut self, mv: &str) -> Result<()> {
        let mv = self.pos.move_from_uci(mv)?;
        self.pos = self.pos.make_move(mv)?;
        Ok(())
    }

    /// Returns every legal move for the side to move.
    pub fn generate_moves(&self) -> Result<Vec<String>> {
        Ok(self.pos.legal_moves()?.iter().map(|mv| mv.to_string()).collect())
    }

    /// Returns the legal moves for each `(piece, square)` pair, ordered by piece type and then
    /// square. A pair which doesn't name a piece of the side to move gets an empty list.
    pub fn generate_moves_for_pieces(&self, pieces: &[(&str, usize)]) -> Result<PieceMoves> {
        let pieces = convert_pairs(pieces)?;
        Ok(to_strings(self.pos.legal_moves_for_pieces(&pieces)?))
    }

    /// Same as [`generate_moves_for_pieces`](#method.generate_moves_for_pieces), but spread over
    /// the worker pool.
    pub fn generate_moves_for_pieces_parallel(&self, pieces: &[(&str, usize)])
        -> Result<PieceMoves>
    {
        let pieces = convert_pairs(pieces)?;
        Ok(to_strings(self.dispatcher.generate_for_pieces(&self.pos, &pieces)?))
    }
}

fn convert_pairs(pieces: &[(&str, usize)]) -> chess::Result<Vec<(Piece, Square)>> {
    pieces.iter()
        .map(|&(piece, sq)| -> chess::Result<_> {
            Ok((Piece::from_name(piece)?, Square::try_from(sq)?))
        })
        .collect()
}

fn to_strings(moves: BTreeMap<(Piece, Square), Vec<Move>>) -> PieceMoves {
    moves.into_iter()
        .map(|((piece, sq), moves)| {
            let moves = moves.iter().map(|mv| mv.to_string()).collect();
            ((piece.name().to_owned(), sq as usize), moves)
        })
        .collect()
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Error type used by `Board`
#[derive(Debug)]
pub enum Error {
    /// Bad input or an illegal request
    Chess(chess::Error),
    /// A PGN file could not be read or replayed
    Pgn(pgn::Error),
    /// The worker pool could not be started
    ThreadPool(ThreadPoolBuildError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Chess(error) => fmt::Display::fmt(error, f),
            Error::Pgn(error) => fmt::Display::fmt(error, f),
            Error::ThreadPool(error) => write!(f, "cannot start workers: {}", error),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Chess(error) => Some(error),
            Error::Pgn(error) => Some(error),
            Error::ThreadPool(error) => Some(error),
        }
    }
}

impl From<chess::Error> for Error {
    fn from(error: chess::Error) -> Self {
        Error::Chess(error)
    }
}

impl From<pgn::Error> for Error {
    fn from(error: pgn::Error) -> Self {
        Error::Pgn(error)
    }
}

impl From<ThreadPoolBuildError> for Error {
    fn from(error: ThreadPoolBuildError) -> Self {
        Error::ThreadPool(error)
    }
}

/// Result type used by `Board`
pub type Result<T> = std::result::Result<T, Error>;
