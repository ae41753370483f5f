//! Contains structures to represent moves in coordinate and algebraic notation
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use super::*;
use bitboard::Bitboard;
use Piece::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The type of move
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MoveType {
    /// Any move which is not castling, a two-square pawn advancement, en-passant capture, or pawn
    /// promotion
    Standard,
    /// A castling move
    Castling,
    /// A two-square pawn advancement
    Advance2,
    /// An en passant capture
    EnPassant,
    /// A pawn promotion to the given piece type
    Promotion(Promotion),
}

impl MoveType {
    /// Returns `true` if the `MoveType` is a promotion.
    pub fn is_promotion(self) -> bool {
        if let MoveType::Promotion(_) = self {
            true
        } else {
            false
        }
    }
}

impl Default for MoveType {
    fn default() -> Self {
        MoveType::Standard
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Which piece to promote to for a promotion move
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Promotion {
    ToKnight = 1,
    ToBishop = 2,
    ToRook = 3,
    ToQueen = 4,
}

use Promotion::*;

impl Promotion {
    /// Every promotion, in the order they are generated
    pub const ALL: [Promotion; 4] = [ToQueen, ToRook, ToBishop, ToKnight];

    /// Returns the promotion to `piece`, or `None` for pawns and kings
    pub fn from_piece(piece: Piece) -> Option<Promotion> {
        match piece {
            Knight => Some(ToKnight),
            Bishop => Some(ToBishop),
            Rook => Some(ToRook),
            Queen => Some(ToQueen),
            Pawn | King => None,
        }
    }
}

impl Default for Promotion {
    fn default() -> Self {
        ToQueen
    }
}

impl From<Promotion> for Piece {
    fn from(prom: Promotion) -> Self {
        match prom {
            ToKnight => Knight,
            ToBishop => Bishop,
            ToRook => Rook,
            ToQueen => Queen,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A move generated from some position.
///
/// A `Move` does not borrow the position it came from, so it can be sent between threads and
/// stored in maps. It is only meaningful for the position which generated it; passing it to
/// another position's `make_move` is checked just far enough to reject a missing piece.
///
/// Formatting with `{}` gives coordinate notation (eg g1f3, e7e8q, or e1g1).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    piece: Piece,
    orig: Square,
    dest: Square,
    capt_pc: Option<Piece>,
    move_type: MoveType,
}

impl Move {
    pub(crate) fn new(piece: Piece, orig: Square, dest: Square, capt_pc: Option<Piece>,
                      move_type: MoveType) -> Move {
        Move { piece, orig, dest, capt_pc, move_type }
    }

    /// Returns the piece to be moved.
    pub fn piece(&self) -> Piece {
        self.piece
    }

    /// Returns the origin of the moved piece.
    pub fn origin(&self) -> Square {
        self.orig
    }

    /// Returns the destination of the moved piece.
    pub fn destination(&self) -> Square {
        self.dest
    }

    /// Returns the captured piece, if any.
    pub fn captured_piece(&self) -> Option<Piece> {
        self.capt_pc
    }

    /// Returns the type of move.
    pub fn move_type(&self) -> MoveType {
        self.move_type
    }

    /// Returns `true` if the move is a capture.
    pub fn is_capture(&self) -> bool {
        self.capt_pc.is_some()
    }

    /// Returns `true` if the move is a promotion.
    pub fn is_promotion(&self) -> bool {
        self.move_type.is_promotion()
    }

    /// Returns the type of promotion, if any
    pub fn promotion(&self) -> Option<Promotion> {
        if let MoveType::Promotion(prom_pc) = self.move_type {
            Some(prom_pc)
        } else {
            None
        }
    }

    /// Returns `true` if the move castles on the king side.
    pub fn is_castle_king_side(&self) -> bool {
        self.move_type == MoveType::Castling && self.dest.file() == File::G
    }

    /// Returns `true` if the move castles on the queen side.
    pub fn is_castle_queen_side(&self) -> bool {
        self.move_type == MoveType::Castling && self.dest.file() == File::C
    }

    /// Formats the move in Standard Algebraic Notation (eg Nf3, exd5, e8=Q, or O-O), where `pos`
    /// is the position the move was generated from.
    ///
    /// Check and checkmate suffixes are not added.
    pub fn to_san(&self, pos: &Position) -> String {
        if self.is_castle_queen_side() {
            return "O-O-O".to_owned();
        } else if self.is_castle_king_side() {
            return "O-O".to_owned();
        }

        let mut s = String::new();

        if self.piece == Pawn {
            if self.capt_pc.is_some() {
                s += &self.orig.file().to_string();
            }
        } else {
            s += &self.piece.to_string();

            // other pieces of the same type which could also reach the destination
            let others: Bitboard = pos.legal_moves().unwrap_or_default().iter()
                .filter(|mv| mv.piece == self.piece && mv.dest == self.dest
                    && mv.orig != self.orig)
                .map(|mv| mv.orig)
                .collect();

            if !others.is_empty() {
                if others.is_disjoint(self.orig.file().into()) {
                    s += &self.orig.file().to_string();
                } else if others.is_disjoint(self.orig.rank().into()) {
                    s += &self.orig.rank().to_string();
                } else {
                    s += &self.orig.to_string();
                }
            }
        }

        if self.capt_pc.is_some() {
            s += "x";
        }

        s += &self.dest.to_string();

        if let MoveType::Promotion(prom_pc) = self.move_type {
            s += "=";
            s += &Piece::from(prom_pc).to_string();
        }

        s
    }
}

impl fmt::Display for Move {
    /// Writes the move in coordinate notation (eg g1f3, e7e8q, or e1g1)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = self.orig.to_string() + &self.dest.to_string();

        if let Some(prom_pc) = self.promotion() {
            s.push(Piece::from(prom_pc).fen_char(Color::Black));
        }

        s.fmt(f)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A move in Standard Algebraic Notation, not yet tied to a position.
///
/// Parse one with `str::parse`, then [`resolve`](#method.resolve) it against a position.
///
/// ```rust
/// use movegen::chess::{Position, SanMove, Square};
///
/// let pos = Position::new();
/// let mv = "Nf3".parse::<SanMove>()?.resolve(&pos)?;
/// assert_eq!(mv.origin(), Square::G1);
/// # Ok::<(), movegen::chess::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SanMove {
    text: String,
    piece: Piece,
    orig_file: Option<File>,
    orig_rank: Option<Rank>,
    dest: Option<Square>,
    capture: bool,
    prom_pc: Option<Promotion>,
    castle_dest: Option<File>,
}

impl SanMove {
    /// Returns the token this move was parsed from.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns `true` if `mv` fits every detail given in the notation.
    fn matches(&self, mv: &Move) -> bool {
        if let Some(file) = self.castle_dest {
            return mv.move_type() == MoveType::Castling && mv.destination().file() == file;
        }

        // a bare promotion square is read as a queen promotion
        let prom_pc = self.prom_pc.or_else(|| mv.promotion().and(Some(ToQueen)));

        mv.piece() == self.piece
            && Some(mv.destination()) == self.dest
            && self.orig_file.map_or(true, |f| mv.origin().file() == f)
            && self.orig_rank.map_or(true, |r| mv.origin().rank() == r)
            && (!self.capture || mv.is_capture())
            && mv.promotion() == prom_pc
    }

    /// Returns the single legal move in `pos` which this notation describes.
    ///
    /// Fails with `AmbiguousOrIllegalMove` when no legal move, or more than one, fits.
    pub fn resolve(&self, pos: &Position) -> Result<Move> {
        let mut matching = pos.legal_moves()?.into_iter().filter(|mv| self.matches(mv));

        match (matching.next(), matching.next()) {
            (Some(mv), None) => Ok(mv),
            _ => Err(Error::AmbiguousOrIllegalMove(self.text.clone())),
        }
    }
}

impl fmt::Display for SanMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.text.fmt(f)
    }
}

impl FromStr for SanMove {
    type Err = Error;

    /// Parses SAN from back to front. Check, mate and annotation suffixes are ignored.
    fn from_str(s: &str) -> Result<SanMove> {
        let text = s.trim_end_matches(|c| "+#!?".contains(c));
        let mut san = SanMove { text: s.to_owned(), ..Default::default() };

        // castling, with letter O or digit zero
        match text {
            "O-O" | "0-0" => {
                san.piece = King;
                san.castle_dest = Some(File::G);
                return Ok(san);
            },
            "O-O-O" | "0-0-0" => {
                san.piece = King;
                san.castle_dest = Some(File::C);
                return Ok(san);
            },
            _ => {},
        }

        let mut chars = text.chars();

        let mut next = chars.next_back();
        let mut c = if let Some(c) = next {
            c.to_string()
        } else {
            // empty string
            return Err(Error::ParseError);
        };

        // promotion piece
        let prom_pc = match c.as_str() {
            "Q" | "q" => Some(ToQueen),
            "R" | "r" => Some(ToRook),
            "B" | "b" => Some(ToBishop),
            "N" | "n" => Some(ToKnight),
            _ => None,
        };

        if prom_pc.is_some() {
            san.prom_pc = prom_pc;

            next = chars.next_back();
            if next == Some('=') {
                next = chars.next_back();
            }

            c = if let Some(c) = next {
                c.to_string()
            } else {
                // missing destination
                return Err(Error::ParseError);
            };
        }

        // destination
        let dest_rank: Rank = c.parse()?;

        c = if let Some(c) = chars.next_back() {
            c.to_string()
        } else {
            // missing destination file
            return Err(Error::ParseError);
        };

        let dest_file: File = c.parse()?;
        san.dest = Some(Square::from_coord(dest_file, dest_rank));

        next = chars.next_back();
        if next == Some('x') {
            san.capture = true;
            next = chars.next_back();
        }

        // origin
        if let Some(c) = next {
            if let Ok(rank) = c.to_string().parse() {
                san.orig_rank = Some(rank);
                next = chars.next_back();
            }
        }
        if let Some(c) = next {
            if c.is_ascii_lowercase() {
                if let Ok(file) = c.to_string().parse() {
                    san.orig_file = Some(file);
                    next = chars.next_back();
                }
            }
        }

        // piece, which must be an uppercase letter
        if let Some(c) = next {
            if c.is_ascii_uppercase() {
                san.piece = c.to_string().parse()?;
                next = chars.next_back();
            } else {
                return Err(Error::ParseError);
            }
        }

        if next.is_some() {
            // extra characters
            return Err(Error::ParseError);
        }

        Ok(san)
    }
}
