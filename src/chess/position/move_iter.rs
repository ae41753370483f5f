//! Contains the pseudo-legal move generator
//
//  Copyright 2019 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::iter::FusedIterator;
use std::collections::VecDeque;
use super::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// An iterator over all valid (pseudo-legal) moves from a position.
///
/// Note that the moves might not be fully legal, specifically, they may leave the mover in check or
/// involve castling through check. Use `Position::make_move()` to verify full legality.
///
/// Moves come out grouped by piece type (pawns first, king last), then by origin square in
/// ascending order, then by destination square in ascending order. Each promotion is expanded to
/// queen, rook, bishop and knight in that order, and castling follows the king's other moves.
///
/// Cannot outlive the position it is tied to.
#[derive(Debug, Clone)]
pub struct PseudoMoves<'a> {
    pos: &'a Position,
    next_piece: usize,
    piece: Piece,
    origins: Bitboard,
    pending: VecDeque<Move>,
}

impl<'a> PseudoMoves<'a> {
    pub(super) fn new(pos: &'a Position) -> PseudoMoves<'a> {
        PseudoMoves {
            pos,
            next_piece: 0,
            piece: Default::default(),
            origins: Bitboard::new(),
            pending: VecDeque::new(),
        }
    }

    /// Only the moves of the piece on `sq`, if it belongs to the side to move
    pub(super) fn from_square(pos: &'a Position, sq: Square) -> PseudoMoves<'a> {
        let mut moves = PseudoMoves {
            next_piece: Piece::COUNT,
            ..PseudoMoves::new(pos)
        };

        if let Some((c, piece)) = pos.piece_at(sq) {
            if c == pos.turn() {
                moves.piece = piece;
                moves.origins = sq.into();
            }
        }

        moves
    }

    /// Queues every move of `self.piece` from `orig`
    fn generate_from(&mut self, orig: Square) {
        let pos = self.pos;
        let us = pos.turn();
        let them = !us;

        // the enemy king is never a target
        let targets = !pos.occupied_by(us) & !pos.occupied_by_piece(them, King);

        if self.piece == Pawn {
            self.generate_pawn_moves(orig, targets);
            return;
        }

        let dests = match self.piece {
            Knight => knight_attacks(orig),
            Bishop => bishop_attacks(orig, pos.occupied()),
            Rook => rook_attacks(orig, pos.occupied()),
            Queen => queen_attacks(orig, pos.occupied()),
            King => king_attacks(orig),
            Pawn => Bitboard::new(),
        } & targets;

        for dest in dests {
            let capt_pc = pos.piece_at(dest).map(|(_, p)| p);
            self.pending.push_back(Move::new(self.piece, orig, dest, capt_pc, MoveType::Standard));
        }

        if self.piece == King {
            self.generate_castling(orig);
        }
    }

    fn generate_pawn_moves(&mut self, orig: Square, targets: Bitboard) {
        let pos = self.pos;
        let us = pos.turn();
        let them = !us;
        let forward = us.forward();
        let empty = !pos.occupied();
        let from = Bitboard::from(orig);

        let advance1 = from.shift_xy(0, forward) & empty;
        let start_rank = if us == White { Rank::R2 } else { Rank::R7 };
        let advance2 = if orig.rank() == start_rank {
            advance1.shift_xy(0, forward) & empty
        } else {
            Bitboard::new()
        };
        let captures = pawn_attacks(us, orig) & pos.occupied_by(them) & targets;
        let en_passant = match pos.en_passant_square() {
            Some(ep) if pawn_attacks(us, orig).contains(ep)
                && !pos.occupied().contains(ep)
                && pos.occupied_by_piece(them, Pawn)
                    .contains(Square::from_coord(ep.file(), orig.rank())) => Bitboard::from(ep),
            _ => Bitboard::new(),
        };

        let last_rank = (!us).back_rank();

        for dest in advance1 | advance2 | captures | en_passant {
            if en_passant.contains(dest) {
                self.pending.push_back(
                    Move::new(Pawn, orig, dest, Some(Pawn), MoveType::EnPassant));
                continue;
            }

            let capt_pc = pos.piece_at(dest).map(|(_, p)| p);

            if dest.rank() == last_rank {
                for prom in &Promotion::ALL {
                    self.pending.push_back(
                        Move::new(Pawn, orig, dest, capt_pc, MoveType::Promotion(*prom)));
                }
            } else if advance2.contains(dest) {
                self.pending.push_back(Move::new(Pawn, orig, dest, None, MoveType::Advance2));
            } else {
                self.pending.push_back(Move::new(Pawn, orig, dest, capt_pc, MoveType::Standard));
            }
        }
    }

    /// Castling is generated when the rights, the king and rook placement, and the empty squares
    /// between them allow it. Attacked squares are checked by `Position::make_move`.
    fn generate_castling(&mut self, orig: Square) {
        let pos = self.pos;
        let us = pos.turn();
        let rank = us.back_rank();

        if pos.in_check() || orig != Square::from_coord(File::E, rank) {
            return;
        }

        let sides = [
            (pos.has_king_side_castling_rights(us), File::H, File::G),
            (pos.has_queen_side_castling_rights(us), File::A, File::C),
        ];

        for &(rights, rook_file, dest_file) in &sides {
            let rook = Square::from_coord(rook_file, rank);
            if rights
                && pos.occupied_by_piece(us, Rook).contains(rook)
                && between(orig, rook).is_disjoint(pos.occupied())
            {
                let dest = Square::from_coord(dest_file, rank);
                self.pending.push_back(Move::new(King, orig, dest, None, MoveType::Castling));
            }
        }
    }
}

impl<'a> Iterator for PseudoMoves<'a> {
    type Item = Move;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(mv) = self.pending.pop_front() {
                return Some(mv);
            }

            if let Some(orig) = self.origins.pop() {
                self.generate_from(orig);
                continue;
            }

            if self.next_piece < Piece::COUNT {
                self.piece = Piece::ALL[self.next_piece];
                self.next_piece += 1;
                self.origins = self.pos.occupied_by_piece(self.pos.turn(), self.piece);
                continue;
            }

            return None;
        }
    }
}

impl<'a> FusedIterator for PseudoMoves<'a> { }
