//! # Color Sort Library
//!
//! This library provides the core logic for a tube-pouring color sort puzzle:
//! colored tokens are spread across tubes of fixed capacity and the player
//! pours the top run of one tube onto another until every non-empty tube is
//! full of a single color. A breadth-first solver computes the optimal move
//! count used for rating and produces hints.
//!
//! It is used by three binaries:
//! - `play`: Interactive terminal game.
//! - `solve`: Reads a board file and prints a shortest solution.
//! - `evaluate`: Solves a batch of seeded random boards and reports statistics.
//!
//! ## Modules
//! - `engine`: Tokens (`Color`), tubes (`Tube`), boards (`Board`), moves (`Move`),
//!   the play session (`Game`) and star rating (`rate`).
//! - `generator`: Randomized starting boards (`Generator`).
//! - `solver`: Breadth-first optimal search (`Solver`, `SearchOutcome`).
//! - `config`: Game parameters loadable from TOML (`GameConfig`).
//! - `error`: Error types for generation, parsing and configuration.
//! - `utils`: Text parsing of boards and player moves.
//!
//! The functions at the crate root are the interface used by the
//! presentation layer; each one runs with default configuration.

pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod solver;
pub mod utils;

pub use engine::rate;

use config::GameConfig;
use engine::{Board, Move};
use error::GenerateError;
use generator::Generator;
use solver::Solver;

/// Generates a starting board with `tube_count` tubes, or a random count in `5..=9`.
pub fn generate(tube_count: Option<usize>) -> Result<Board, GenerateError> {
    Generator::new(GameConfig::default()).generate(tube_count)
}

/// Returns `true` if `mv` is a legal pour on `board`.
pub fn legal(board: &Board, mv: Move) -> bool {
    board.is_legal(mv)
}

/// Applies `mv` to a copy of `board`.
///
/// Returns `(true, poured board)` on success or `(false, unchanged board)`
/// if the move is illegal.
pub fn apply(board: &Board, mv: Move) -> (bool, Board) {
    match board.after_move(mv) {
        Some(next) => (true, next),
        None => (false, board.clone()),
    }
}

pub fn is_won(board: &Board) -> bool {
    board.is_won()
}

/// Shortest solving sequence for `board`, or `None` if none was found.
pub fn solve(board: &Board) -> Option<Vec<Move>> {
    Solver::default().search(board).into_moves()
}

/// First move of a shortest solution from `board`.
pub fn hint(board: &Board) -> Option<Move> {
    Solver::default().hint(board)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_end_to_end() {
        let board = generate(Some(5)).unwrap();
        assert_eq!(board.len(), 5);
        assert!(!is_won(&board));

        let moves = solve(&board).expect("5-tube boards are solvable");
        assert_eq!(hint(&board), moves.first().copied());

        let mut current = board;
        for mv in moves {
            assert!(legal(&current, mv));
            let (ok, next) = apply(&current, mv);
            assert!(ok);
            current = next;
        }
        assert!(is_won(&current));
    }

    #[test]
    fn test_apply_illegal_returns_same_board() {
        let board = generate(Some(6)).unwrap();
        // Tube 6 is empty, so pouring from it is never legal.
        let (ok, next) = apply(&board, Move::new(5, 0));
        assert!(!ok);
        assert_eq!(next, board);
    }
}
