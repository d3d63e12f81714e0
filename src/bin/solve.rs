use anyhow::{Context, Result};
use clap::Parser;
use color_sort::engine::{Board, DEFAULT_CAPACITY};
use color_sort::solver::{SearchOutcome, Solver, SolverConfig, DEFAULT_MAX_STATES};
use color_sort::utils::board_from_str_array;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Find a shortest solution for a color sort board",
    long_about = None
)]
struct Args {
    /// Cap on distinct states the search may discover
    #[arg(short, long, default_value_t = DEFAULT_MAX_STATES)]
    max_states: usize,

    /// Search without a state cap
    #[arg(long, conflicts_with = "max_states")]
    unbounded: bool,

    /// Tube capacity
    #[arg(short, long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Path to the board file (one tube per line, colors bottom to top, '.' for empty)
    board_file: PathBuf,
}

fn read_board_file(path: &Path, capacity: usize) -> Result<Board> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let lines: Vec<&str> = content
        .lines()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && !s.starts_with('#'))
        .collect();

    board_from_str_array(&lines, capacity).context("invalid board format")
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let board = read_board_file(&args.board_file, args.capacity)?;
    println!("Loaded board from {}\n", args.board_file.display());
    println!("Initial board state:\n{}\n", board);

    let max_states = if args.unbounded { None } else { Some(args.max_states) };
    let solver = Solver::new(SolverConfig { max_states });
    println!("Searching for a shortest solution...\n");

    match solver.search(&board) {
        SearchOutcome::Solved(solution) => {
            println!("Solution found ({} states explored):\n", solution.states_explored);
            println!("Moves ({}):", solution.moves.len());
            if solution.moves.is_empty() {
                println!("  No moves needed.");
            }
            let mut final_board = board.clone();
            for (i, mv) in solution.moves.iter().enumerate() {
                println!("  Move {}: {}", i + 1, mv);
                final_board.apply_move(*mv);
            }
            println!("\nFinal board state:\n{}\n", final_board.to_text());
        }
        SearchOutcome::Unsolvable { explored } => {
            println!("No solution exists ({} states explored).", explored);
        }
        SearchOutcome::LimitReached { explored } => {
            println!(
                "No solution found within the state limit ({} states explored).",
                explored
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_board_file() {
        let name = format!("color_sort_board_{}.txt", std::process::id());
        let path = std::env::temp_dir().join(name);
        fs::write(&path, "# two moves\nRRRG\nGGG\n\nR\n").unwrap();
        let board = read_board_file(&path, 4);
        fs::remove_file(&path).ok();
        let board = board.unwrap();
        assert_eq!(board.len(), 3);
        assert_eq!(board.to_text(), "RRRG\nGGG\nR");
    }

    #[test]
    fn test_read_board_file_missing() {
        let err = read_board_file(Path::new("no/such/board.txt"), 4).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
