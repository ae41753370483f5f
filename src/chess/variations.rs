//! Module for counting and printing the number of variations from a given position
//
//  Copyright 2019 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use crate::chess::*;

/// Count the number of variations of the given `depth` from `pos`
pub fn count(pos: &Position, depth: usize) -> usize {
    if depth < 1 {
        return 1;
    }

    let mut total = 0;

    for mv in pos.pseudo_moves() {
        if let Ok(pos) = pos.make_move(mv) {
            total += if depth == 1 { 1 } else { count(&pos, depth - 1) };
        }
    }

    total
}

/// Count the variations of depth `depth - 1` after each legal move from `pos`
pub fn divide(pos: &Position, depth: usize) -> Vec<(Move, usize)> {
    if depth < 1 {
        return Vec::new();
    }

    pos.pseudo_moves()
        .filter_map(|mv| pos.make_move(mv).ok().map(|next| (mv, count(&next, depth - 1))))
        .collect()
}

/// Print the number of variations of the given `depth` for each legal move from `pos`
pub fn print(pos: &Position, depth: usize) -> usize {
    if depth < 1 {
        return 1;
    }

    let mut total = 0;

    for (mv, count) in divide(pos, depth) {
        total += count;
        println!("\t{:7}\t{:12}", mv, count);
    }

    total
}

/// Splits a line of an EPD perft suite, such as
/// `<fen> ;D1 20 ;D2 400`, into the position and its `(depth, expected count)` pairs.
///
/// Lines with only four FEN fields get a halfmove clock of 0 and a move number of 1.
pub fn parse_epd_line(line: &str) -> Result<(Position, Vec<(usize, usize)>)> {
    let mut fields = line.split(';');
    let fen = fields.next().unwrap_or("").trim();

    let pos = if fen.split_whitespace().count() == 4 {
        Position::from_fen_str(&format!("{} 0 1", fen))?
    } else {
        Position::from_fen_str(fen)?
    };

    let mut expected = Vec::new();
    for field in fields {
        let nums: Vec<&str> = field.trim().trim_start_matches('D').split_whitespace().collect();
        if nums.len() != 2 {
            return Err(Error::ParseError);
        }

        let depth = nums[0].parse().map_err(|_| Error::ParseError)?;
        let count = nums[1].parse().map_err(|_| Error::ParseError)?;
        expected.push((depth, count));
    }

    Ok((pos, expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_zero_is_one_variation() {
        assert_eq!(count(&Position::new(), 0), 1);
        assert!(divide(&Position::new(), 0).is_empty());
    }

    #[test]
    fn divide_sums_to_count() {
        let pos = Position::new();
        let parts = divide(&pos, 3);
        assert_eq!(parts.len(), 20);
        assert_eq!(parts.iter().map(|(_, n)| n).sum::<usize>(), count(&pos, 3));
    }

    #[test]
    fn epd_lines() {
        let (pos, expected) = parse_epd_line(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - ;D1 20 ;D2 400").unwrap();
        assert_eq!(pos, Position::new());
        assert_eq!(expected, vec![(1, 20), (2, 400)]);

        assert_eq!(parse_epd_line(&format!("{} ;D1", START_FEN)), Err(Error::ParseError));
        assert!(parse_epd_line("nonsense ;D1 20").is_err());
    }
}
