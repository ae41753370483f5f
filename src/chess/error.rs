//! Defines the error types needed by the chess module
//
//  Copyright 2019 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use super::Color;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The field of a FEN string that failed to parse
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum FenField {
    /// Wrong number of whitespace separated fields
    FieldCount,
    Placement,
    SideToMove,
    Castling,
    EnPassant,
    HalfmoveClock,
    FullmoveNumber,
}

impl fmt::Display for FenField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use FenField::*;

        match self {
            FieldCount => "expected six fields",
            Placement => "bad piece placement",
            SideToMove => "side to move must be 'w' or 'b'",
            Castling => "bad castling availability",
            EnPassant => "bad en-passant square",
            HalfmoveClock => "bad halfmove clock",
            FullmoveNumber => "bad fullmove number",
        }.fmt(f)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Error type used by methods in the `chess` module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Cannot parse string
    ParseError,
    /// Failed to convert an integer to an another type
    TryFromIntError,
    /// Malformed FEN string
    MalformedFen(FenField),
    /// SAN or coordinate move matches zero or several legal moves
    AmbiguousOrIllegalMove(String),
    /// Square index outside of 0 to 63
    InvalidSquare(usize),
    /// Piece name not recognized
    UnknownPieceType(String),
    /// Color name not recognized
    UnknownColor(String),
    /// No king of the given color is on the board
    NoKingPresent(Color),
    /// Structurally impossible board, such as two kings of the same color
    InvalidPosition,
    /// Illegal move
    IllegalMove,
    /// Player can capture opponent's king
    KingCapturable,
    /// Castling through check
    CastlingThroughCheck,
    /// Missing king or multiple kings of the same color
    InvalidKingCount,
    /// Pawn on first or last rank
    InvalidPawnRank,
    /// Castling flags aren't valid for this position
    InvalidCastlingFlags,
    /// En-passant square without capturable pawn
    MissingEnPassantPawn,
    /// En-passant square is occupied
    EnPassantSquareOccupied,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Error::*;

        match self {
            MalformedFen(field) => write!(f, "malformed FEN: {}", field),
            AmbiguousOrIllegalMove(mv) => write!(f, "{}: ambiguous or illegal move", mv),
            InvalidSquare(sq) => write!(f, "{}: square out of range", sq),
            UnknownPieceType(name) => write!(f, "{}: unknown piece type", name),
            UnknownColor(name) => write!(f, "{}: unknown color", name),
            NoKingPresent(color) => write!(f, "no {} king on the board", color.name()),
            ParseError => "cannot parse string".fmt(f),
            TryFromIntError => "integer out of range".fmt(f),
            InvalidPosition => "invalid position".fmt(f),
            IllegalMove => "illegal move".fmt(f),
            CastlingThroughCheck => "attempt to castle through check".fmt(f),
            KingCapturable => "king is under attack on opponent's move".fmt(f),
            InvalidKingCount => "missing king or multiple kings of the same color".fmt(f),
            InvalidPawnRank => "pawn on first or last rank".fmt(f),
            InvalidCastlingFlags => "castling flags aren't valid for this position".fmt(f),
            MissingEnPassantPawn => "en-passant square without capturable pawn".fmt(f),
            EnPassantSquareOccupied => "en-passant square is occupied".fmt(f),
        }
    }
}

impl std::error::Error for Error { }

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Result type used by methods in the `chess` module
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_offending_token() {
        assert_eq!(Error::UnknownPieceType("wizard".to_owned()).to_string(),
            "wizard: unknown piece type");
        assert_eq!(Error::UnknownColor("green".to_owned()).to_string(), "green: unknown color");
        assert_eq!(Error::InvalidSquare(64).to_string(), "64: square out of range");
        assert_eq!(Error::MalformedFen(FenField::SideToMove).to_string(),
            "malformed FEN: side to move must be 'w' or 'b'");
        assert_eq!(Error::NoKingPresent(Color::Black).to_string(), "no black king on the board");
        assert_eq!(Error::ParseError.to_string(), "cannot parse string");
        assert_eq!(Color::White.to_string(), "w");
    }
}
