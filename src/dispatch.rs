//! Spreads move generation over a pool of worker threads.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::collections::BTreeMap;
use std::thread;
use log::debug;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder, ThreadPoolBuildError};
use crate::chess::{self, Move, Piece, Position, Square, variations};

/// Owns a thread pool for generating moves in parallel.
///
/// Every call shares the position read-only between the workers, so the results are the same as
/// the serial methods on `Position` for any number of workers.
#[derive(Debug)]
pub struct Dispatcher {
    pool: ThreadPool,
    workers: usize,
}

impl Dispatcher {
    /// Creates a dispatcher with `workers` threads, or one thread if `workers` is zero.
    pub fn new(workers: usize) -> Result<Dispatcher, ThreadPoolBuildError> {
        let workers = workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("movegen-{}", i))
            .build()?;

        debug!("started move generation pool with {} workers", workers);
        Ok(Dispatcher { pool, workers })
    }

    /// Creates a dispatcher with one thread per available CPU.
    pub fn with_available_parallelism() -> Result<Dispatcher, ThreadPoolBuildError> {
        Dispatcher::new(thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
    }

    /// Returns the number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Returns the legal moves for each `(piece, square)` pair, computed in parallel.
    ///
    /// The pairs are split into one chunk per worker. The first error from any chunk is returned
    /// and the partial results are dropped.
    pub fn generate_for_pieces(&self, pos: &Position, pieces: &[(Piece, Square)])
        -> chess::Result<BTreeMap<(Piece, Square), Vec<Move>>>
    {
        pos.king_square(pos.turn())?;

        let chunk_size = ((pieces.len() + self.workers - 1) / self.workers).max(1);

        let partials = self.pool.install(|| {
            pieces.par_chunks(chunk_size)
                .map(|chunk| pos.legal_moves_for_pieces(chunk))
                .collect::<chess::Result<Vec<_>>>()
        })?;

        let mut moves = BTreeMap::new();
        for partial in partials {
            moves.extend(partial);
        }

        Ok(moves)
    }

    /// Counts the variations of the given `depth` from `pos`, splitting the work at the root moves.
    pub fn perft(&self, pos: &Position, depth: usize) -> usize {
        if depth < 1 {
            return 1;
        }

        self.divide(pos, depth).iter().map(|(_, count)| count).sum()
    }

    /// Counts the variations of depth `depth - 1` after each legal move from `pos`, one root move
    /// per task.
    pub fn divide(&self, pos: &Position, depth: usize) -> Vec<(Move, usize)> {
        if depth < 1 {
            return Vec::new();
        }

        let roots: Vec<(Move, Position)> = pos.pseudo_moves()
            .filter_map(|mv| pos.make_move(mv).ok().map(|next| (mv, next)))
            .collect();

        self.pool.install(|| {
            roots.par_iter()
                .map(|(mv, next)| (*mv, variations::count(next, depth - 1)))
                .collect()
        })
    }
}
