//! Contains structures related to the `Position`.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::collections::BTreeMap;
use std::convert::TryInto;
use std::fmt;
use super::*;

use super::bitboard::*;
use builder::PositionBuilder;
use move_iter::PseudoMoves;

use Color::*;
use Piece::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A representation of the arrangement of pieces on the board at a given point in the game, as well
/// as castling availability and en passant legality.
///
/// # Instantiation
///  -  [`new`](#method.new) returns the standard starting position.
///  -  [`from_fen_str`](#method.from_fen_str) (along with `str::parse`) decodes [Forsyth-Edwards
///     Notation (FEN)](https://en.wikipedia.org/wiki/Forsyth%E2%80%93Edwards_Notation).
///  -  [`set_pieces`](#method.set_pieces) replaces the placement of an existing position.
///  -  A [`PositionBuilder`](struct.PositionBuilder.html).
///  -  [`make_move`](#method.make_move) returns the position after a move.
///
/// # Generating Moves
/// [`legal_moves`](#method.legal_moves) lists every legal move for the side to move, while
/// [`legal_moves_for_pieces`](#method.legal_moves_for_pieces) restricts generation to the pieces
/// on a given list of squares.
///
/// ```rust
/// use movegen::chess::Position;
///
/// let pos = Position::new();
/// let moves = pos.legal_moves()?;
/// assert_eq!(moves.len(), 20);
///
/// for mv in moves {
///     let next = pos.make_move(mv)?;
///     assert_eq!(next.turn(), !pos.turn());
/// }
/// # Ok::<(), movegen::chess::Error>(())
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Position {
    occ_squares: Bitboard,
    occ_by_color: [Bitboard; Color::COUNT],
    occ_by_piece: [[Bitboard; Piece::COUNT]; Color::COUNT],
    turn: Color,

    in_check: bool,
    ep_square: Option<Square>,
    castling_rights: [u8; Color::COUNT],

    draw_plies: usize,
    move_num: usize,
}

const CASTLE_KING_SIDE: u8 = 0x1;
const CASTLE_QUEEN_SIDE: u8 = 0x2;
const CASTLE_BOTH_SIDES: u8 = CASTLE_KING_SIDE | CASTLE_QUEEN_SIDE;

/// The FEN string of the standard starting position
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Which castling rights are lost when a piece leaves or lands on `sq`
fn castling_rights_touched(sq: Square) -> Option<(Color, u8)> {
    match sq {
        Square::A1 => Some((White, CASTLE_QUEEN_SIDE)),
        Square::H1 => Some((White, CASTLE_KING_SIDE)),
        Square::E1 => Some((White, CASTLE_BOTH_SIDES)),
        Square::A8 => Some((Black, CASTLE_QUEEN_SIDE)),
        Square::H8 => Some((Black, CASTLE_KING_SIDE)),
        Square::E8 => Some((Black, CASTLE_BOTH_SIDES)),
        _ => None,
    }
}

impl Position {

    /// Returns the standard starting Position.
    pub fn new() -> Position {
        Position {
            occ_squares: Bitboard::from(0xffff_0000_0000_ffffu64),
            occ_by_color: [
                // white
                Bitboard::from(0x0000_0000_0000_ffffu64),
                // black
                Bitboard::from(0xffff_0000_0000_0000u64)
            ],
            occ_by_piece:  [
                // white
                [
                    // pawns
                    Bitboard::from(0x0000_0000_0000_ff00u64),
                    // knights
                    Bitboard::from(0x0000_0000_0000_0042u64),
                    // bishops
                    Bitboard::from(0x0000_0000_0000_0024u64),
                    // rooks
                    Bitboard::from(0x0000_0000_0000_0081u64),
                    // queen
                    Bitboard::from(0x0000_0000_0000_0008u64),
                    // king
                    Bitboard::from(0x0000_0000_0000_0010u64),
                ],
                // black
                [
                    // pawns
                    Bitboard::from(0x00ff_0000_0000_0000u64),
                    // knights
                    Bitboard::from(0x4200_0000_0000_0000u64),
                    // bishops
                    Bitboard::from(0x2400_0000_0000_0000u64),
                    // rooks
                    Bitboard::from(0x8100_0000_0000_0000u64),
                    // queen
                    Bitboard::from(0x0800_0000_0000_0000u64),
                    // king
                    Bitboard::from(0x1000_0000_0000_0000u64),
                ],
            ],
            turn: White,
            in_check: false,
            ep_square: None,
            castling_rights: [CASTLE_BOTH_SIDES, CASTLE_BOTH_SIDES],
            draw_plies: 0,
            move_num: 1,
        }
    }

    /// Returns a position with an empty board.
    pub(crate) fn empty_board() -> Position {
        Position{
            occ_squares: Bitboard::new(),
            occ_by_color: [Bitboard::new(); Color::COUNT],
            occ_by_piece: [[Bitboard::new(); Piece::COUNT]; Color::COUNT],
            turn: White,
            in_check: false,
            ep_square: None,
            castling_rights: [0, 0],
            draw_plies: 0,
            move_num: 1,
        }
    }

    /// Parse a position from a string containing [Forsyth-Edwards
    /// Notation (FEN)](https://en.wikipedia.org/wiki/Forsyth%E2%80%93Edwards_Notation).
    ///
    /// All six fields are required. Only the syntax is checked: a position with a missing king, or
    /// with the opponent's king in check, decodes fine. Use [`validate`](#method.validate) to
    /// check that the position could arise in a game.
    pub fn from_fen_str(s: &str) -> Result<Position> {
        use FenField::*;

        let fields: Vec<&str> = s.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(Error::MalformedFen(FieldCount));
        }

        let mut pos = PositionBuilder::new();

        // parse the board
        let mut r = Rank::COUNT - 1;
        let mut f = 0;
        for c in fields[0].chars() {
            match c {
                '1' ..= '8' => {
                    f += c.to_digit(10).expect("INFALLIBLE") as usize;
                    if f > File::COUNT {
                        return Err(Error::MalformedFen(Placement));
                    }
                }
                '/' => {
                    if f == File::COUNT && r > 0 {
                        r -= 1;
                        f = 0;
                    } else {
                        return Err(Error::MalformedFen(Placement));
                    }
                }
                _ => {
                    let sq = match (f.try_into(), r.try_into()) {
                        (Ok(f), Ok(r)) => Square::from_coord(f, r),
                        _ => return Err(Error::MalformedFen(Placement)),
                    };
                    let color = if c.is_ascii_uppercase() { White } else { Black };
                    let piece: Piece = c.to_string().parse()
                        .map_err(|_| Error::MalformedFen(Placement))?;

                    pos.piece(color, piece, sq);

                    f += 1;
                }
            }
        }
        if r > 0 || f != File::COUNT {
            return Err(Error::MalformedFen(Placement));
        }

        // parse the turn
        pos.turn(fields[1].parse().map_err(|_| Error::MalformedFen(SideToMove))?);

        // parse the castling flags
        if fields[2] != "-" {
            for c in fields[2].chars() {
                match c {
                    'K' => { pos.can_castle_king_side(White, true); },
                    'Q' => { pos.can_castle_queen_side(White, true); },
                    'k' => { pos.can_castle_king_side(Black, true); },
                    'q' => { pos.can_castle_queen_side(Black, true); },
                    _ => return Err(Error::MalformedFen(Castling)),
                }
            }
        }

        // parse en passant square
        if fields[3] != "-" {
            let ep_square = fields[3].parse().map_err(|_| Error::MalformedFen(EnPassant))?;
            pos.en_passant_square(Some(ep_square));
        }

        // parse half move clock
        pos.draw_plies(fields[4].parse().map_err(|_| Error::MalformedFen(HalfmoveClock))?);

        // parse move number
        pos.move_number(fields[5].parse().map_err(|_| Error::MalformedFen(FullmoveNumber))?);

        Ok(pos.build())
    }

    /// Converts the position to a FEN string.
    pub fn to_fen_str(&self) -> String {
        // the board
        let mut board = String::new();

        for r in (0..Rank::COUNT).rev() {
            let mut count = 0;
            for f in 0..File::COUNT {
                let sq = Square::from_coord(
                    f.try_into().expect("INFALLIBLE"),
                    r.try_into().expect("INFALLIBLE"),
                );

                if let Some((c, p)) = self.piece_at(sq) {
                    if count > 0 {
                        board += &count.to_string();
                        count = 0;
                    }
                    board.push(p.fen_char(c));
                } else {
                    count += 1;
                }
            }
            if count > 0 {
                board += &count.to_string();
            }
            if r > 0 {
                board += "/";
            }
        }

        // castling rights
        let mut castling = String::new();
        castling += match self.castling_rights[White as usize] {
            CASTLE_KING_SIDE => "K",
            CASTLE_QUEEN_SIDE => "Q",
            CASTLE_BOTH_SIDES => "KQ",
            _ => "",
        };
        castling += match self.castling_rights[Black as usize] {
            CASTLE_KING_SIDE => "k",
            CASTLE_QUEEN_SIDE => "q",
            CASTLE_BOTH_SIDES => "kq",
            _ => "",
        };
        if castling.is_empty() {
            castling += "-";
        }

        // en passant square
        let ep_square = match self.ep_square {
            Some(sq) => sq.to_string(),
            None => "-".to_string(),
        };

        format!("{} {} {} {} {} {}", board, self.turn, castling, ep_square,
                                     self.draw_plies, self.move_num)
    }

    /// Replaces the placement of every piece on the board.
    ///
    /// Castling rights and the en-passant square are cleared and the move counters reset, since
    /// none of them can be known from the placement alone. The side to move is kept. If a square
    /// is listed more than once, the last entry wins.
    pub fn set_pieces(&mut self, pieces: &[(Piece, Color, Square)]) {
        let mut builder = PositionBuilder::new();
        builder.turn(self.turn);

        for &(piece, color, sq) in pieces {
            builder.piece(color, piece, sq);
        }

        *self = builder.build();
    }

    /// Sets the side to move, bypassing move legality.
    ///
    /// The en-passant square belongs to the other side's last move, so it is cleared.
    pub fn set_side_to_move(&mut self, c: Color) {
        self.turn = c;
        self.ep_square = None;
        self.in_check = self.compute_in_check();
    }

    /// Returns the color whose turn it is.
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Returns the en-passant square, if any.
    pub fn en_passant_square(&self) -> Option<Square> {
        self.ep_square
    }

    /// Returns `true` if the color to move is in check.
    pub fn in_check(&self) -> bool {
        self.in_check
    }

    /// Returns `true` if king-side castling rights are available for `c`.
    pub fn has_king_side_castling_rights(&self, c: Color) -> bool {
        self.castling_rights[c as usize] & CASTLE_KING_SIDE != 0
    }

    /// Returns `true` if queen-side castling rights are available for `c`.
    pub fn has_queen_side_castling_rights(&self, c: Color) -> bool {
        self.castling_rights[c as usize] & CASTLE_QUEEN_SIDE != 0
    }

    /// Returns `true` if any castling rights are available for `c`.
    pub fn has_castling_rights(&self, c: Color) -> bool {
        self.castling_rights[c as usize] != 0
    }

    /// Returns the number of plies which count toward the fifty move rule.
    pub fn draw_plies(&self) -> usize {
        self.draw_plies
    }

    /// Returns the move number.
    pub fn move_number(&self) -> usize {
        self.move_num
    }

    /// Returns a `Bitboard` of all occupied `Square`s.
    pub fn occupied(&self) -> Bitboard {
        self.occ_squares
    }

    /// Returns a `Bitboard` of `Squares` occupied by player `c`.
    pub fn occupied_by(&self, c: Color) -> Bitboard {
        self.occ_by_color[c as usize]
    }

    /// Returns a `Bitboard` of `Squares` occupied by the given `Piece` and `Color`.
    pub fn occupied_by_piece(&self, c: Color, p: Piece) -> Bitboard {
        self.occ_by_piece[c as usize][p as usize]
    }

    /// Returns the square where the king of the given color is located.
    ///
    /// Fails with `NoKingPresent` if `c` has no king, and with `InvalidPosition` if it has more
    /// than one.
    pub fn king_square(&self, c: Color) -> Result<Square> {
        let kings = self.occupied_by_piece(c, King);

        match kings.len() {
            0 => Err(Error::NoKingPresent(c)),
            1 => Ok(kings.peek().expect("INFALLIBLE")),
            _ => Err(Error::InvalidPosition),
        }
    }

    /// Returns the color and type of piece, if any, at the given location.
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        if !self.occ_squares.contains(sq) {
            return None;
        }

        let c = if self.occupied_by(White).contains(sq) { White } else { Black };
        Piece::ALL.iter()
            .find(|p| self.occupied_by_piece(c, **p).contains(sq))
            .map(|p| (c, *p))
    }

    /// Returns the squares attacked by the piece on `sq`, or an empty bitboard if `sq` is empty.
    ///
    /// For pawns only the diagonal captures count as attacks.
    pub fn attacks_from(&self, sq: Square) -> Bitboard {
        match self.piece_at(sq) {
            Some((c, Pawn)) => pawn_attacks(c, sq),
            Some((_, Knight)) => knight_attacks(sq),
            Some((_, Bishop)) => bishop_attacks(sq, self.occ_squares),
            Some((_, Rook)) => rook_attacks(sq, self.occ_squares),
            Some((_, Queen)) => queen_attacks(sq, self.occ_squares),
            Some((_, King)) => king_attacks(sq),
            None => Bitboard::new(),
        }
    }

    /// Returns `true` if `sq` is attacked by a piece of color `c`.
    pub fn is_square_attacked(&self, sq: Square, c: Color) -> bool {
        self.is_square_attacked_by_sliding(sq, c)
            || knight_attacks(sq).intersects(self.occupied_by_piece(c, Knight))
            || king_attacks(sq).intersects(self.occupied_by_piece(c, King))
            || pawn_attacks(!c, sq).intersects(self.occupied_by_piece(c, Pawn))
    }

    /// Returns `true` if `sq` is attacked by a sliding piece of color `c`.
    ///
    /// This is useful for finding discovered attacks.
    pub fn is_square_attacked_by_sliding(&self, sq: Square, c: Color) -> bool {
        let bishops = self.occupied_by_piece(c, Bishop);
        let rooks = self.occupied_by_piece(c, Rook);
        let queens = self.occupied_by_piece(c, Queen);

        bishop_attacks(sq, self.occ_squares).intersects(bishops | queens)
            || rook_attacks(sq, self.occ_squares).intersects(rooks | queens)
    }

    /// Checks that the position could arise in a game of chess.
    ///
    /// FEN decoding and `set_pieces` accept any syntactically valid placement; this is the strict
    /// check for callers who need it.
    pub fn validate(&self) -> Result<()> {
        use Error::*;

        for c in &Color::ALL {
            // Step 1: verify exactly one king per side
            if self.occupied_by_piece(*c, King).len() != 1 {
                return Err(InvalidKingCount);
            }
            // Step 2: no pawns on ranks 1 and 8
            if self.occupied_by_piece(*c, Pawn)
                .intersects(Bitboard::from(Rank::R1) | Rank::R8.into()) {
                return Err(InvalidPawnRank);
            }
        }
        // Step 3: opponent's king is not attacked
        if self.is_square_attacked(self.king_square(!self.turn)?, self.turn) {
            return Err(KingCapturable);
        }
        // Step 4: if there is an EP square, it must be empty and there must be a pawn to capture
        if let Some(ep_square) = self.ep_square {
            if self.piece_at(ep_square).is_some() {
                return Err(EnPassantSquareOccupied);
            }
            let forward = self.turn.forward();
            if !self.occupied_by_piece(!self.turn, Pawn).shift_xy(0, forward).contains(ep_square) {
                return Err(MissingEnPassantPawn);
            }
        }
        // Step 5: if castling rights exist, king and rook must be in the correct squares
        for c in &Color::ALL {
            if self.has_castling_rights(*c) {
                let r = c.back_rank();

                if !self.occupied_by_piece(*c, King).contains(Square::from_coord(File::E, r)) {
                    return Err(InvalidCastlingFlags);
                }
                if self.has_queen_side_castling_rights(*c)
                    && !self.occupied_by_piece(*c, Rook).contains(Square::from_coord(File::A, r)) {
                    return Err(InvalidCastlingFlags);
                }
                if self.has_king_side_castling_rights(*c)
                    && !self.occupied_by_piece(*c, Rook).contains(Square::from_coord(File::H, r)) {
                    return Err(InvalidCastlingFlags);
                }
            }
        }

        Ok(())
    }

    /// Returns an iterator over the pseudo-legal moves from this position.
    ///
    /// The moves obey the movement rules of each piece but may leave the mover in check. Use
    /// [`make_move`](#method.make_move) or [`legal_moves`](#method.legal_moves) to filter them.
    pub fn pseudo_moves(&self) -> PseudoMoves {
        PseudoMoves::new(self)
    }

    /// Returns an iterator over the pseudo-legal moves of the piece standing on `sq`, if it
    /// belongs to the side to move.
    pub fn pseudo_moves_from(&self, sq: Square) -> PseudoMoves {
        PseudoMoves::from_square(self, sq)
    }

    /// Returns every legal move for the side to move.
    ///
    /// Fails with `NoKingPresent` if the side to move has no king. An empty list means checkmate
    /// or stalemate.
    pub fn legal_moves(&self) -> Result<Vec<Move>> {
        self.king_square(self.turn)?;
        Ok(self.pseudo_moves().filter(|mv| self.make_move(*mv).is_ok()).collect())
    }

    /// Returns the legal moves of the piece on `sq`, which is empty unless that piece belongs to
    /// the side to move.
    pub fn legal_moves_from(&self, sq: Square) -> Result<Vec<Move>> {
        self.king_square(self.turn)?;
        Ok(self.pseudo_moves_from(sq).filter(|mv| self.make_move(*mv).is_ok()).collect())
    }

    /// Returns the legal moves for each requested `(piece, square)` pair.
    ///
    /// A pair only yields moves when a piece of that type belonging to the side to move stands on
    /// that square; otherwise its list is empty. Other pieces of the same type are ignored.
    pub fn legal_moves_for_pieces(&self, pieces: &[(Piece, Square)])
        -> Result<BTreeMap<(Piece, Square), Vec<Move>>>
    {
        self.king_square(self.turn)?;

        let mut result = BTreeMap::new();
        for &(piece, sq) in pieces {
            let moves = if self.piece_at(sq) == Some((self.turn, piece)) {
                self.pseudo_moves_from(sq).filter(|mv| self.make_move(*mv).is_ok()).collect()
            } else {
                Vec::new()
            };
            result.insert((piece, sq), moves);
        }

        Ok(result)
    }

    /// Returns `true` if `mv` is one of the legal moves from this position.
    pub fn is_legal(&self, mv: Move) -> bool {
        match self.piece_at(mv.origin()) {
            Some((c, p)) if c == self.turn && p == mv.piece() => {
                self.pseudo_moves_from(mv.origin()).any(|m| m == mv)
                    && self.make_move(mv).is_ok()
            },
            _ => false,
        }
    }

    /// Parses a move in coordinate notation (such as `e2e4` or `e7e8q`) and returns the matching
    /// legal move. A promotion without a piece letter is taken to be a queen promotion.
    pub fn move_from_uci(&self, s: &str) -> Result<Move> {
        let s = s.trim();
        if !(s.len() == 4 || s.len() == 5) || !s.is_ascii() {
            return Err(Error::ParseError);
        }

        let orig: Square = s[0..2].parse()?;
        let dest: Square = s[2..4].parse()?;
        let prom = match s.get(4..) {
            Some("") | None => None,
            Some(letter) => Some(Promotion::from_piece(letter.parse()?)
                .ok_or(Error::ParseError)?),
        };

        self.legal_moves_from(orig)?
            .into_iter()
            .find(|mv| mv.destination() == dest
                && mv.promotion() == prom.or_else(|| mv.promotion().and(Some(Promotion::ToQueen))))
            .ok_or_else(|| Error::AmbiguousOrIllegalMove(s.to_owned()))
    }

    /// Makes the move, returning the resulting position.
    ///
    /// `mv` must come from this position's move generation. Fails with `KingCapturable` if the
    /// move leaves the mover's king attacked, or with `CastlingThroughCheck` if the king castles
    /// out of or through an attacked square.
    pub fn make_move(&self, mv: Move) -> Result<Position> {
        let us = self.turn;
        let them = !us;

        if self.piece_at(mv.origin()) != Some((us, mv.piece())) {
            return Err(Error::IllegalMove);
        }

        let mut pos = self.clone();

        // clear captured piece (including en passant)
        if let Some(capt_pc) = mv.captured_piece() {
            let sq = if mv.move_type() == MoveType::EnPassant {
                Square::from_coord(mv.destination().file(), mv.origin().rank())
            } else {
                mv.destination()
            };

            let mask: Bitboard = sq.into();
            pos.occ_squares ^= mask;
            pos.occ_by_color[them as usize] ^= mask;
            pos.occ_by_piece[them as usize][capt_pc as usize] ^= mask;
        }

        // move piece to new location (update piece type if promotion)
        let mask = Bitboard::from(mv.origin()) | mv.destination().into();
        pos.occ_squares ^= mask;
        pos.occ_by_color[us as usize] ^= mask;
        match mv.move_type() {
            MoveType::Promotion(prom_pc) => {
                pos.occ_by_piece[us as usize][mv.piece() as usize] ^= mv.origin().into();
                pos.occ_by_piece[us as usize][Piece::from(prom_pc) as usize]
                    ^= mv.destination().into();
            },
            _ => {
                pos.occ_by_piece[us as usize][mv.piece() as usize] ^= mask;
            },
        }

        // move rook for castling moves
        if mv.move_type() == MoveType::Castling {
            let rank = mv.origin().rank();
            let (orig, dest) = match mv.destination().file() {
                File::C => (Square::from_coord(File::A, rank), Square::from_coord(File::D, rank)),
                File::G => (Square::from_coord(File::H, rank), Square::from_coord(File::F, rank)),
                _ => return Err(Error::IllegalMove),
            };

            // the rook's destination is the square the king passes through
            if self.in_check || pos.is_square_attacked(dest, them) {
                return Err(Error::CastlingThroughCheck);
            }

            let mask = Bitboard::from(orig) | dest.into();
            pos.occ_squares ^= mask;
            pos.occ_by_color[us as usize] ^= mask;
            pos.occ_by_piece[us as usize][Rook as usize] ^= mask;
        }

        // verify mover is not in check
        let king = pos.king_square(us)?;
        let king_attacked = if mv.piece() != King && !self.in_check {
            pos.is_square_attacked_by_sliding(king, them)
        } else {
            pos.is_square_attacked(king, them)
        };
        if king_attacked {
            return Err(Error::KingCapturable);
        }

        // update en passant square
        pos.ep_square = if mv.move_type() == MoveType::Advance2 {
            Square::from_coord(mv.destination().file(), mv.origin().rank())
                .offset(0, us.forward())
        } else {
            None
        };

        // update castling rights if applicable
        for sq in &[mv.origin(), mv.destination()] {
            if let Some((c, rights)) = castling_rights_touched(*sq) {
                pos.castling_rights[c as usize] &= !rights;
            }
        }

        // switch turns
        pos.turn = them;

        // update move counters
        if pos.turn == White {
            pos.move_num += 1;
        }
        if mv.is_capture() || mv.piece() == Pawn {
            pos.draw_plies = 0;
        } else {
            pos.draw_plies += 1;
        }

        pos.in_check = pos.compute_in_check();

        Ok(pos)
    }

    /// Returns `true` if the side to move has exactly one king and it is attacked. A missing king
    /// is never in check.
    fn compute_in_check(&self) -> bool {
        match self.king_square(self.turn) {
            Ok(king) => self.is_square_attacked(king, !self.turn),
            Err(_) => false,
        }
    }
}

impl Default for Position {
    /// Returns the standard starting Position.
    fn default() -> Self {
        Position::new()
    }
}

impl fmt::Display for Position {
    /// Writes out the position using FEN.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen_str())
    }
}

impl fmt::Debug for Position {
    /// Writes out the position using FEN.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen_str())
    }
}

impl FromStr for Position {
    type Err = Error;

    /// Parse a position from a FEN string.
    fn from_str(s: &str) -> Result<Self> {
        Position::from_fen_str(s)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
pub mod builder;
pub mod move_iter;

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;

    fn uci(moves: &[Move]) -> Vec<String> {
        let mut list: Vec<_> = moves.iter().map(|mv| mv.to_string()).collect();
        list.sort();
        list
    }

    fn fen(s: &str) -> Position {
        Position::from_fen_str(s).expect("valid fen")
    }

    /// Position::new() must return the standard starting position.
    ///
    /// Depends on to_fen_str() working properly.
    #[test]
    fn new_returns_the_standard_starting_position() {
        assert_eq!(Position::new().to_fen_str(), START_FEN);
        assert_eq!(fen(START_FEN), Position::new());
    }

    /// Tests for Position::from_fen_str()
    mod from_fen_str {
        use super::*;
        use FenField::*;

        fn malformed(field: FenField) -> Result<Position> {
            Err(Error::MalformedFen(field))
        }

        // 1. empty string returns a field count error
        #[test]
        fn empty_string_returns_error() {
            assert_eq!(Position::from_fen_str(""), malformed(FieldCount));
            assert_eq!(Position::from_fen_str(" \t\r\n"), malformed(FieldCount));
        }

        // 2. anything but six fields is a field count error
        #[test]
        fn wrong_field_count_returns_error() {
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - -"), malformed(FieldCount));
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - - 0 1 x"),
                malformed(FieldCount));
        }

        // 3. 0 or 9 in board string is a placement error
        #[test]
        fn invalid_empty_square_count_returns_error() {
            assert_eq!(Position::from_fen_str("0K1k5/8/8/8/8/8/8/8 w - - 0 1"),
                malformed(Placement));
            assert_eq!(Position::from_fen_str("K1k5/9/8/8/8/8/8/8 w - - 0 1"),
                malformed(Placement));
        }

        // 4. a rank with more or less than 8 squares is a placement error
        #[test]
        fn bad_rank_length_returns_error() {
            assert_eq!(Position::from_fen_str("K1k6/8/8/8/8/8/8/8 w - - 0 1"),
                malformed(Placement));
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8B w - - 0 1"),
                malformed(Placement));
            assert_eq!(Position::from_fen_str("K1k4/8/8/8/8/8/8/8 w - - 0 1"),
                malformed(Placement));
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/6B w - - 0 1"),
                malformed(Placement));
        }

        // 5. too many or too few ranks is a placement error
        #[test]
        fn bad_rank_count_returns_error() {
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8/8 w - - 0 1"),
                malformed(Placement));
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8 w - - 0 1"),
                malformed(Placement));
        }

        // 6. an unknown piece letter is a placement error
        #[test]
        fn unknown_piece_letter_returns_error() {
            assert_eq!(Position::from_fen_str("K1k4x/8/8/8/8/8/8/8 w - - 0 1"),
                malformed(Placement));
        }

        // 7. 'w' and 'b' set the turn, anything else is an error
        #[test]
        fn turn_field() {
            assert_eq!(fen("K1k5/8/8/8/8/8/8/8 w - - 0 1").turn(), White);
            assert_eq!(fen("K1k5/8/8/8/8/8/8/8 b - - 0 1").turn(), Black);
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 x - - 0 1"),
                malformed(SideToMove));
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 white - - 0 1"),
                malformed(SideToMove));
        }

        // 8. any combination of "KQkq" sets the appropriate flags
        #[test]
        fn castling_flags_set_correctly() {
            let pos = fen("r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1");
            assert!(pos.has_king_side_castling_rights(White));
            assert!(!pos.has_queen_side_castling_rights(White));
            assert!(!pos.has_king_side_castling_rights(Black));
            assert!(pos.has_queen_side_castling_rights(Black));

            let pos = fen("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1");
            assert!(!pos.has_castling_rights(White));
            assert!(!pos.has_castling_rights(Black));

            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w x - 0 1"),
                malformed(Castling));
        }

        // 9. the en passant field is "-" or a square
        #[test]
        fn en_passant_field() {
            assert_eq!(fen("K1k5/8/8/8/8/8/8/8 w - - 0 1").en_passant_square(), None);
            assert_eq!(fen("K1k5/8/8/7p/8/8/8/8 w - h6 0 1").en_passant_square(),
                Some(Square::H6));
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - x 0 1"),
                malformed(EnPassant));
        }

        // 10. move counters must be integers
        #[test]
        fn move_counters() {
            let pos = fen("K1k5/8/8/8/8/8/8/8 w - - 500 9999");
            assert_eq!(pos.draw_plies(), 500);
            assert_eq!(pos.move_number(), 9999);
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - - x 1"),
                malformed(HalfmoveClock));
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - - 0 x"),
                malformed(FullmoveNumber));
        }

        // 11. boards that could not arise in a game still decode
        #[test]
        fn decoding_is_lenient_about_legality() {
            let pos = fen("K1k5/8/8/8/8/8/8/2R5 w - - 0 1");
            assert_eq!(pos.validate(), Err(Error::KingCapturable));
            let pos = fen("8/8/8/8/8/8/8/K7 w - - 0 1");
            assert_eq!(pos.king_square(Black), Err(Error::NoKingPresent(Black)));
        }

        // 12. If no errors, to_fen_str() returns the input fen string
        #[test]
        fn back_to_identical_fen() {
            for s in &[
                START_FEN,
                "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
                "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
                "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
                "r3k2r/8/8/8/8/8/8/R3K2R b Kq - 17 42",
            ] {
                assert_eq!(fen(s).to_fen_str(), *s);
            }
        }
    }

    /// Tests for Position::validate()
    mod validate {
        use super::*;
        use Error::*;

        #[test]
        fn starting_position_is_valid() {
            assert_eq!(Position::new().validate(), Ok(()));
        }

        #[test]
        fn king_count() {
            assert_eq!(fen("K1k5/8/8/8/8/8/7K/8 w - - 0 1").validate(), Err(InvalidKingCount));
            assert_eq!(fen("K7/8/8/8/8/8/8/8 w - - 0 1").validate(), Err(InvalidKingCount));
        }

        #[test]
        fn pawns_on_first_or_last_rank() {
            assert_eq!(fen("K1k4p/8/8/8/8/8/8/8 w - - 0 1").validate(), Err(InvalidPawnRank));
            assert_eq!(fen("K1k5/8/8/8/8/8/8/P7 w - - 0 1").validate(), Err(InvalidPawnRank));
        }

        #[test]
        fn en_passant_square() {
            assert_eq!(fen("K1k5/8/7p/7p/8/8/8/8 w - h6 0 1").validate(),
                Err(EnPassantSquareOccupied));
            assert_eq!(fen("K1k5/8/8/8/8/8/8/8 w - h6 0 1").validate(),
                Err(MissingEnPassantPawn));
        }

        #[test]
        fn castling_flags() {
            assert_eq!(fen("2k5/8/8/8/8/8/7K/R6R w K - 0 1").validate(),
                Err(InvalidCastlingFlags));
            assert_eq!(fen("2k5/8/8/8/8/8/8/4K3 w Q - 0 1").validate(),
                Err(InvalidCastlingFlags));
            assert_eq!(fen("r6r/7k/8/8/8/8/8/2K5 w q - 0 1").validate(),
                Err(InvalidCastlingFlags));
        }
    }

    /// Tests for the setters used to build synthetic positions
    mod setters {
        use super::*;

        #[test]
        fn set_pieces_replaces_placement_and_clears_state() {
            let mut pos = fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
            pos.set_pieces(&[
                (King, White, Square::E1),
                (Rook, White, Square::H1),
                (King, Black, Square::E8),
            ]);

            assert_eq!(pos.to_fen_str(), "4k3/8/8/8/8/8/8/4K2R w - - 0 1");
            assert!(!pos.has_castling_rights(White));
            assert_eq!(pos.en_passant_square(), None);
        }

        #[test]
        fn set_pieces_keeps_the_turn_and_last_entry_wins() {
            let mut pos = Position::new();
            pos.set_side_to_move(Black);
            pos.set_pieces(&[
                (King, White, Square::E1),
                (Queen, White, Square::D4),
                (Knight, Black, Square::D4),
                (King, Black, Square::E8),
            ]);

            assert_eq!(pos.turn(), Black);
            assert_eq!(pos.piece_at(Square::D4), Some((Black, Knight)));
            assert!(!pos.occupied_by(White).contains(Square::D4));
        }

        #[test]
        fn set_side_to_move_updates_check() {
            let mut pos = Position::new();
            pos.set_pieces(&[
                (King, White, Square::E1),
                (Rook, White, Square::E4),
                (King, Black, Square::E8),
            ]);
            assert!(!pos.in_check());
            pos.set_side_to_move(Black);
            assert!(pos.in_check());
        }

        #[test]
        fn king_square() {
            let pos = Position::new();
            assert_eq!(pos.king_square(White), Ok(Square::E1));
            assert_eq!(pos.king_square(Black), Ok(Square::E8));

            let mut pos = Position::new();
            pos.set_pieces(&[(King, White, Square::A1)]);
            assert_eq!(pos.king_square(Black), Err(Error::NoKingPresent(Black)));
        }
    }

    /// Tests for the attack queries
    mod attacks {
        use super::*;

        #[test]
        fn square_attacked_on_an_empty_board() {
            let mut pos = Position::new();
            pos.set_pieces(&[(Rook, White, Square::A1)]);
            assert!(pos.is_square_attacked(Square::A8, White));
            assert!(pos.is_square_attacked(Square::H1, White));
            assert!(!pos.is_square_attacked(Square::B2, White));
            assert!(!pos.is_square_attacked(Square::A1, White));
            assert!(!pos.is_square_attacked(Square::A8, Black));
        }

        #[test]
        fn square_attacked_in_the_starting_position() {
            let pos = Position::new();
            // pawns and knights cover the third rank
            for f in 0..File::COUNT {
                let sq = Square::from_coord(f.try_into().unwrap(), Rank::R3);
                assert!(pos.is_square_attacked(sq, White));
                assert!(!pos.is_square_attacked(sq, Black));
            }
            // sliders are blocked by their own pawns
            assert!(!pos.is_square_attacked(Square::A4, White));
            assert!(!pos.is_square_attacked(Square::H5, Black));
            // the king attacks its neighbors even when they are occupied
            assert!(pos.is_square_attacked(Square::D2, White));
        }

        #[test]
        fn pawns_attack_diagonally_only() {
            let pos = fen("4k3/8/8/3p4/8/8/8/4K3 w - - 0 1");
            assert!(pos.is_square_attacked(Square::C4, Black));
            assert!(pos.is_square_attacked(Square::E4, Black));
            assert!(!pos.is_square_attacked(Square::D4, Black));
        }

        #[test]
        fn attacks_from() {
            let pos = Position::new();
            assert_eq!(pos.attacks_from(Square::G1).len(), 3);
            assert!(pos.attacks_from(Square::D1).len() == 5);
            assert!(pos.attacks_from(Square::E4).is_empty());
        }
    }

    /// Tests for move generation and Position::make_move()
    mod moves {
        use super::*;

        #[test]
        fn twenty_moves_from_the_start() {
            let moves = uci(&Position::new().legal_moves().unwrap());
            assert_eq!(moves.len(), 20);
            for mv in &["e2e4", "e2e3", "g1f3", "g1h3", "b1c3", "b1a3", "a2a4", "h2h3"] {
                assert!(moves.contains(&mv.to_string()), "missing {}", mv);
            }
            assert!(moves.iter().all(|mv| mv.ends_with('3') || mv.ends_with('4')));
        }

        #[test]
        fn kings_only_fixture() {
            let mut pos = Position::new();
            pos.set_pieces(&[(King, White, Square::E1), (King, Black, Square::E8)]);
            pos.set_side_to_move(White);
            assert_eq!(uci(&pos.legal_moves().unwrap()),
                vec!["e1d1", "e1d2", "e1e2", "e1f1", "e1f2"]);
        }

        #[test]
        fn kings_never_stand_next_to_each_other() {
            let pos = fen("8/8/8/4k3/8/4K3/8/8 w - - 0 1");
            let moves = uci(&pos.legal_moves().unwrap());
            assert_eq!(moves, vec!["e3d2", "e3d3", "e3e2", "e3f2", "e3f3"]);
        }

        #[test]
        fn no_king_is_an_error() {
            let pos = fen("8/8/8/4k3/8/8/8/8 w - - 0 1");
            assert_eq!(pos.legal_moves(), Err(Error::NoKingPresent(White)));
        }

        #[test]
        fn attacked_enemy_king_is_not_captured() {
            // black king is in check on white's move
            let pos = fen("4k3/8/8/8/4R3/8/8/4K3 w - - 0 1");
            let moves = uci(&pos.legal_moves().unwrap());
            assert!(!moves.contains(&"e4e8".to_string()));
            assert!(moves.contains(&"e4e7".to_string()));
        }

        #[test]
        fn checkmate_and_stalemate_are_empty() {
            // fool's mate
            let pos = fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
            assert!(pos.in_check());
            assert!(pos.legal_moves().unwrap().is_empty());

            let pos = fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
            assert!(!pos.in_check());
            assert!(pos.legal_moves().unwrap().is_empty());
        }

        #[test]
        fn pinned_piece_cannot_leave_the_pin() {
            let pos = fen("4k3/4r3/8/8/8/8/4N3/4K3 w - - 0 1");
            assert!(pos.legal_moves_from(Square::E2).unwrap().is_empty());
        }

        #[test]
        fn promotions_generate_four_moves() {
            let pos = fen("3r3k/4P3/8/8/8/8/8/K7 w - - 0 1");
            let moves = uci(&pos.legal_moves_from(Square::E7).unwrap());
            assert_eq!(moves, vec![
                "e7d8b", "e7d8n", "e7d8q", "e7d8r", "e7e8b", "e7e8n", "e7e8q", "e7e8r",
            ]);
        }

        #[test]
        fn en_passant_lifecycle() {
            let pos = fen("4k3/3p4/8/4P3/8/8/8/4K3 b - - 0 1");
            let pos = pos.make_move(pos.move_from_uci("d7d5").unwrap()).unwrap();
            assert_eq!(pos.en_passant_square(), Some(Square::D6));

            // usable for exactly one ply
            let ep = pos.move_from_uci("e5d6").unwrap();
            assert_eq!(ep.move_type(), MoveType::EnPassant);
            let after = pos.make_move(ep).unwrap();
            assert_eq!(after.piece_at(Square::D5), None);
            assert_eq!(after.en_passant_square(), None);

            // cleared when not used
            let pos = pos.make_move(pos.move_from_uci("e1e2").unwrap()).unwrap();
            assert_eq!(pos.en_passant_square(), None);
            let pos = pos.make_move(pos.move_from_uci("e8e7").unwrap()).unwrap();
            assert!(pos.move_from_uci("e5d6").is_err());
        }

        #[test]
        fn en_passant_cannot_expose_the_king() {
            // capturing en passant would open the fifth rank to the rook
            let pos = fen("8/8/8/K2pP2r/8/8/8/7k w - d6 0 1");
            assert!(pos.move_from_uci("e5d6").is_err());
        }

        #[test]
        fn castling_gating() {
            let pos = fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
            let moves = uci(&pos.legal_moves().unwrap());
            assert!(moves.contains(&"e1g1".to_string()));
            assert!(moves.contains(&"e1c1".to_string()));

            // no rights
            let pos = fen("r3k2r/8/8/8/8/8/8/R3K2R w kq - 0 1");
            let moves = uci(&pos.legal_moves().unwrap());
            assert!(!moves.contains(&"e1g1".to_string()));
            assert!(!moves.contains(&"e1c1".to_string()));

            // blocked
            let pos = fen("r3k2r/8/8/8/8/8/8/RN2K1NR w KQkq - 0 1");
            let moves = uci(&pos.legal_moves().unwrap());
            assert!(!moves.contains(&"e1g1".to_string()));
            assert!(!moves.contains(&"e1c1".to_string()));

            // transit square attacked
            let pos = fen("r3kr2/8/8/8/8/8/8/R3K2R w KQq - 0 1");
            let moves = uci(&pos.legal_moves().unwrap());
            assert!(!moves.contains(&"e1g1".to_string()));
            assert!(moves.contains(&"e1c1".to_string()));

            // in check
            let pos = fen("r3k2r/8/8/8/8/8/4r3/R3K2R w KQkq - 0 1");
            let moves = uci(&pos.legal_moves().unwrap());
            assert!(!moves.contains(&"e1g1".to_string()));
            assert!(!moves.contains(&"e1c1".to_string()));

            // b1 may be attacked when castling queen side
            let pos = fen("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
            let moves = uci(&pos.legal_moves().unwrap());
            assert!(moves.contains(&"e1c1".to_string()));
        }

        #[test]
        fn castling_moves_the_rook_and_clears_rights() {
            let pos = fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
            let pos = pos.make_move(pos.move_from_uci("e1g1").unwrap()).unwrap();
            assert_eq!(pos.to_fen_str(), "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 1 1");

            let pos = pos.make_move(pos.move_from_uci("a8a1").unwrap()).unwrap();
            assert_eq!(pos.to_fen_str(), "4k2r/8/8/8/8/8/8/r4RK1 w k - 0 2");
        }

        #[test]
        fn capturing_a_rook_clears_its_castling_right() {
            let pos = fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
            let pos = pos.make_move(pos.move_from_uci("h1h8").unwrap()).unwrap();
            assert!(!pos.has_king_side_castling_rights(Black));
            assert!(pos.has_queen_side_castling_rights(Black));
            assert!(!pos.has_king_side_castling_rights(White));
            assert!(pos.in_check());
        }

        #[test]
        fn legal_moves_never_leave_the_king_attacked() {
            let pos = fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
            for mv in pos.legal_moves().unwrap() {
                let next = pos.make_move(mv).unwrap();
                let king = next.king_square(White).unwrap();
                assert!(!next.is_square_attacked(king, Black), "{} leaves king attacked", mv);
            }
        }

        #[test]
        fn union_of_pieces_equals_all_moves() {
            let pos = fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
            let mut pairs = Vec::new();
            for p in &Piece::ALL {
                for sq in pos.occupied_by_piece(White, *p) {
                    pairs.push((*p, sq));
                }
            }

            let by_piece = pos.legal_moves_for_pieces(&pairs).unwrap();
            let union: Vec<Move> = by_piece.values().flatten().cloned().collect();
            assert_eq!(uci(&union), uci(&pos.legal_moves().unwrap()));
            assert_eq!(union.len(), 48);
        }

        #[test]
        fn pieces_not_matching_the_request_give_empty_lists() {
            let pos = Position::new();
            let result = pos.legal_moves_for_pieces(&[
                (Knight, Square::B1),
                (Bishop, Square::B1),
                (Knight, Square::B8),
                (Queen, Square::E4),
            ]).unwrap();

            assert_eq!(uci(&result[&(Knight, Square::B1)]), vec!["b1a3", "b1c3"]);
            assert!(result[&(Bishop, Square::B1)].is_empty());
            assert!(result[&(Knight, Square::B8)].is_empty());
            assert!(result[&(Queen, Square::E4)].is_empty());
        }

        #[test]
        fn counters_advance() {
            let pos = Position::new();
            let pos = pos.make_move(pos.move_from_uci("g1f3").unwrap()).unwrap();
            assert_eq!((pos.draw_plies(), pos.move_number()), (1, 1));
            let pos = pos.make_move(pos.move_from_uci("e7e5").unwrap()).unwrap();
            assert_eq!((pos.draw_plies(), pos.move_number()), (0, 2));
            assert_eq!(pos.to_fen_str(),
                "rnbqkbnr/pppp1ppp/8/4p3/8/5N2/PPPPPPPP/RNBQKB1R w KQkq e6 0 2");
        }

        #[test]
        fn uci_parsing() {
            let pos = fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
            assert_eq!(pos.move_from_uci("a7a8n").unwrap().promotion(), Some(Promotion::ToKnight));
            assert_eq!(pos.move_from_uci("a7a8").unwrap().promotion(), Some(Promotion::ToQueen));
            assert_eq!(pos.move_from_uci("a7a9"), Err(Error::ParseError));
            assert_eq!(pos.move_from_uci("a7a8k"), Err(Error::ParseError));
            assert_eq!(pos.move_from_uci("e1e3"),
                Err(Error::AmbiguousOrIllegalMove("e1e3".to_owned())));
        }

        #[test]
        fn is_legal() {
            let pos = Position::new();
            let mv = pos.move_from_uci("e2e4").unwrap();
            assert!(pos.is_legal(mv));
            let next = pos.make_move(mv).unwrap();
            assert!(!next.is_legal(mv));
        }
    }
}
