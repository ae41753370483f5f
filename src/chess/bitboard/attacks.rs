//! Precomputed attack tables and sliding-piece ray casting
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::convert::TryFrom;
use lazy_static::lazy_static;
use super::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// One of the eight directions a sliding piece can move in
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Direction {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
}

impl Direction {
    /// The number of directions
    pub const COUNT: usize = 8;

    /// Directions a rook slides in
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::North, Direction::East, Direction::South, Direction::West,
    ];

    /// Directions a bishop slides in
    pub const DIAGONAL: [Direction; 4] = [
        Direction::NorthEast, Direction::SouthEast, Direction::SouthWest, Direction::NorthWest,
    ];

    /// File and rank step for one square in this direction
    pub fn step(self) -> (i8, i8) {
        match self {
            Direction::North => (0, 1),
            Direction::NorthEast => (1, 1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, -1),
            Direction::South => (0, -1),
            Direction::SouthWest => (-1, -1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, 1),
        }
    }

    /// Returns `true` if stepping in this direction increases the square index
    fn is_positive(self) -> bool {
        let (dx, dy) = self.step();
        dy > 0 || (dy == 0 && dx > 0)
    }
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1),
];

type SquareTable = [Bitboard; Square::COUNT];

fn squares() -> impl Iterator<Item = Square> {
    (0..Square::COUNT).map(|i| Square::try_from(i).expect("INFALLIBLE"))
}

fn offset_table(offsets: &[(i8, i8)]) -> SquareTable {
    let mut table = [Bitboard::new(); Square::COUNT];

    for sq in squares() {
        table[sq as usize] = offsets.iter()
            .filter_map(|&(dx, dy)| sq.offset(dx, dy))
            .collect();
    }

    table
}

fn ray_table(dir: Direction) -> SquareTable {
    let mut table = [Bitboard::new(); Square::COUNT];
    let (dx, dy) = dir.step();

    for sq in squares() {
        let mut next = sq.offset(dx, dy);
        while let Some(to) = next {
            table[sq as usize].insert(to);
            next = to.offset(dx, dy);
        }
    }

    table
}

lazy_static! {
    static ref KNIGHT_ATTACKS: SquareTable = offset_table(&KNIGHT_OFFSETS);
    static ref KING_ATTACKS: SquareTable = offset_table(&KING_OFFSETS);
    static ref PAWN_ATTACKS: [SquareTable; Color::COUNT] = [
        offset_table(&[(-1, 1), (1, 1)]),
        offset_table(&[(-1, -1), (1, -1)]),
    ];
    static ref RAYS: [SquareTable; Direction::COUNT] = [
        ray_table(Direction::North),
        ray_table(Direction::NorthEast),
        ray_table(Direction::East),
        ray_table(Direction::SouthEast),
        ray_table(Direction::South),
        ray_table(Direction::SouthWest),
        ray_table(Direction::West),
        ray_table(Direction::NorthWest),
    ];
}

/// Returns every square from `sq` (exclusive) to the edge of the board in direction `dir`
#[inline]
pub fn ray(dir: Direction, sq: Square) -> Bitboard {
    RAYS[dir as usize][sq as usize]
}

/// Casts a ray from `sq` in direction `dir`, stopping at (and including) the first occupied
/// square in `occ`
pub fn ray_attacks(dir: Direction, sq: Square, occ: Bitboard) -> Bitboard {
    let ray = ray(dir, sq);
    let blockers = ray & occ;

    let first = if dir.is_positive() {
        blockers.peek()
    } else {
        blockers.peek_last()
    };

    match first {
        Some(blocker) => ray ^ RAYS[dir as usize][blocker as usize],
        None => ray,
    }
}

/// Computes knight-like attacks to or from `sq`
#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq as usize]
}

/// Computes king-like attacks to or from `sq`
#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq as usize]
}

/// Computes the squares attacked by a pawn of color `c` standing on `sq`
///
/// Read the other way around, `pawn_attacks(!c, sq)` holds the squares from which a pawn of color
/// `c` would attack `sq`.
#[inline]
pub fn pawn_attacks(c: Color, sq: Square) -> Bitboard {
    PAWN_ATTACKS[c as usize][sq as usize]
}

/// Computes bishop-like attacks to or from `sq` based on the occupied squares given by `occ`
pub fn bishop_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    Direction::DIAGONAL.iter()
        .fold(Bitboard::new(), |att, dir| att | ray_attacks(*dir, sq, occ))
}

/// Computes rook-like attacks to or from `sq` based on the occupied squares given by `occ`
pub fn rook_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    Direction::ORTHOGONAL.iter()
        .fold(Bitboard::new(), |att, dir| att | ray_attacks(*dir, sq, occ))
}

/// Computes queen-like attacks to or from `sq` based on the occupied squares given by `occ`
#[inline]
pub fn queen_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    rook_attacks(sq, occ) | bishop_attacks(sq, occ)
}

/// Returns the squares strictly between `a` and `b`, or an empty bitboard if they do not share a
/// rank, file or diagonal
pub fn between(a: Square, b: Square) -> Bitboard {
    for d in 0..Direction::COUNT {
        let ray_a = RAYS[d][a as usize];
        if ray_a.contains(b) {
            return ray_a & !RAYS[d][b as usize] & !Bitboard::from(b);
        }
    }

    Bitboard::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(squares: &[Square]) -> Bitboard {
        squares.iter().cloned().collect()
    }

    #[test]
    fn knight_attacks_from_corners_and_center() {
        assert_eq!(knight_attacks(Square::A1), board(&[Square::B3, Square::C2]));
        assert_eq!(knight_attacks(Square::H8), board(&[Square::G6, Square::F7]));
        assert_eq!(knight_attacks(Square::D4).len(), 8);
        assert_eq!(knight_attacks(Square::G1), board(&[Square::E2, Square::F3, Square::H3]));
    }

    #[test]
    fn king_attacks_do_not_wrap() {
        assert_eq!(king_attacks(Square::A1), board(&[Square::A2, Square::B1, Square::B2]));
        assert_eq!(king_attacks(Square::H4).len(), 5);
        assert!(!king_attacks(Square::H4).contains(Square::A5));
        assert_eq!(king_attacks(Square::E4).len(), 8);
    }

    #[test]
    fn pawn_attacks_face_forward() {
        assert_eq!(pawn_attacks(Color::White, Square::E4), board(&[Square::D5, Square::F5]));
        assert_eq!(pawn_attacks(Color::Black, Square::E4), board(&[Square::D3, Square::F3]));
        assert_eq!(pawn_attacks(Color::White, Square::A2), board(&[Square::B3]));
        assert_eq!(pawn_attacks(Color::Black, Square::H7), board(&[Square::G6]));
        assert!(pawn_attacks(Color::White, Square::C8).is_empty());
    }

    #[test]
    fn sliding_attacks_on_an_empty_board() {
        let empty = Bitboard::new();
        assert_eq!(rook_attacks(Square::D4, empty).len(), 14);
        assert_eq!(bishop_attacks(Square::D4, empty).len(), 13);
        assert_eq!(queen_attacks(Square::D4, empty).len(), 27);
        assert_eq!(bishop_attacks(Square::A1, empty).len(), 7);
        assert_eq!(rook_attacks(Square::H1, empty),
            (Bitboard::from(Rank::R1) | File::H.into()) & !Bitboard::from(Square::H1));
    }

    #[test]
    fn sliding_attacks_on_a_full_board() {
        let full = !Bitboard::new();
        assert_eq!(rook_attacks(Square::D4, full),
            board(&[Square::D5, Square::E4, Square::D3, Square::C4]));
        assert_eq!(bishop_attacks(Square::D4, full),
            board(&[Square::E5, Square::E3, Square::C3, Square::C5]));
        assert_eq!(rook_attacks(Square::A1, full), board(&[Square::A2, Square::B1]));
        assert_eq!(bishop_attacks(Square::H8, full), board(&[Square::G7]));
    }

    #[test]
    fn rays_stop_at_the_first_blocker_in_both_directions() {
        let occ = board(&[Square::D6, Square::D2, Square::B4, Square::G4]);
        assert_eq!(rook_attacks(Square::D4, occ), board(&[
            Square::D5, Square::D6, Square::D3, Square::D2,
            Square::C4, Square::B4, Square::E4, Square::F4, Square::G4,
        ]));
    }

    #[test]
    fn between_aligned_squares() {
        assert_eq!(between(Square::E1, Square::H1), board(&[Square::F1, Square::G1]));
        assert_eq!(between(Square::E1, Square::A1), board(&[Square::B1, Square::C1, Square::D1]));
        assert_eq!(between(Square::A1, Square::D4), board(&[Square::B2, Square::C3]));
        assert!(between(Square::A1, Square::B3).is_empty());
        assert!(between(Square::A1, Square::B2).is_empty());
    }
}
