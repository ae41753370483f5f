//! Contains a builder for `Position`
//
//  Copyright 2019 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use super::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A builder for `Position`
///
/// ```rust
/// use movegen::chess::{Color, Piece, PositionBuilder, Square};
///
/// let pos = PositionBuilder::new()
///     .piece(Color::White, Piece::King, Square::E1)
///     .piece(Color::White, Piece::Rook, Square::H1)
///     .piece(Color::Black, Piece::King, Square::E8)
///     .can_castle_king_side(Color::White, true)
///     .validate()?;
///
/// assert_eq!(pos.to_fen_str(), "4k3/8/8/8/8/8/8/4K2R w K - 0 1");
/// # Ok::<(), movegen::chess::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct PositionBuilder {
    board: [ Option<(Color, Piece)>; Square::COUNT ],
    turn: Color,
    castle_king_side: [ bool; Color::COUNT ],
    castle_queen_side: [ bool; Color::COUNT ],
    ep_square: Option<Square>,
    draw_plies: usize,
    move_num: usize,
}

impl PositionBuilder {
    /// Creates a new, empty `PositionBuilder`
    pub fn new() -> Self {
        PositionBuilder {
            board: [ None; Square::COUNT ],
            turn: White,
            castle_king_side: [ false; Color::COUNT ],
            castle_queen_side: [ false; Color::COUNT ],
            ep_square: None,
            draw_plies: 0,
            move_num: 1,
        }
    }

    /// Sets the piece at `square`, replacing whatever was there
    pub fn piece(&mut self, color: Color, piece: Piece, square: Square) -> &mut Self {
        self.board[square as usize] = Some((color, piece));
        self
    }

    /// Clears the piece at `square`
    pub fn clear(&mut self, square: Square) -> &mut Self {
        self.board[square as usize] = None;
        self
    }

    /// Sets the turn to `color`
    pub fn turn(&mut self, color: Color) -> &mut Self {
        self.turn = color;
        self
    }

    /// Sets king side castling rights for `color`
    pub fn can_castle_king_side(&mut self, color: Color, available: bool) -> &mut Self {
        self.castle_king_side[color as usize] = available;
        self
    }

    /// Sets queen side castling rights for `color`
    pub fn can_castle_queen_side(&mut self, color: Color, available: bool) -> &mut Self {
        self.castle_queen_side[color as usize] = available;
        self
    }

    /// Sets or clears the en-passant square
    pub fn en_passant_square(&mut self, square: Option<Square>) -> &mut Self {
        self.ep_square = square;
        self
    }

    /// Sets the number of plies that count toward the 50-move rule. A ply is a move by one player,
    /// so two plies would be one move by each player.
    pub fn draw_plies(&mut self, plies: usize) -> &mut Self {
        self.draw_plies = plies;
        self
    }

    /// Sets the move number
    pub fn move_number(&mut self, number: usize) -> &mut Self {
        self.move_num = number;
        self
    }

    /// Returns a `Position` without checking that it could arise in a game
    pub fn build(&self) -> Position {
        let mut pos = Position::empty_board();

        for (i, piece) in self.board.iter().enumerate() {
            let sq: Square = i.try_into().expect("INFALLIBLE");

            if let Some((color, piece)) = piece {
                pos.occ_squares.insert(sq);
                pos.occ_by_color[*color as usize].insert(sq);
                pos.occ_by_piece[*color as usize][*piece as usize].insert(sq);
            }
        }

        pos.turn = self.turn;
        for c in 0..Color::COUNT {
            if self.castle_king_side[c] {
                pos.castling_rights[c] |= CASTLE_KING_SIDE;
            }
            if self.castle_queen_side[c] {
                pos.castling_rights[c] |= CASTLE_QUEEN_SIDE;
            }
        }
        pos.ep_square = self.ep_square;
        pos.draw_plies = self.draw_plies;
        pos.move_num = self.move_num;
        pos.in_check = pos.compute_in_check();

        pos
    }

    /// Validates legality and returns a `Position`
    pub fn validate(&self) -> Result<Position> {
        let pos = self.build();
        pos.validate()?;
        Ok(pos)
    }
}

impl Default for PositionBuilder {
    fn default() -> Self {
        PositionBuilder::new()
    }
}
