use anyhow::{Context, Result};
use clap::Parser;
use color_sort::config::GameConfig;
use color_sort::generator::Generator;
use color_sort::solver::{SearchOutcome, Solver};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Solve a batch of seeded boards and report statistics")]
struct Args {
    /// Number of boards to evaluate
    #[arg(short, long, default_value_t = 20)]
    boards: usize,

    /// Seed of the first board; board i uses start_seed + i
    #[arg(long, default_value_t = 0)]
    start_seed: u64,

    /// Tube count for every board (random per board when omitted)
    #[arg(short, long)]
    tubes: Option<usize>,

    /// Path to TOML configuration file
    #[arg(long, default_value = "color_sort.toml")]
    config: PathBuf,
}

#[derive(Debug, Default)]
struct Summary {
    solved: Vec<(usize, usize)>,
    unsolvable: usize,
    limited: usize,
}

impl Summary {
    fn record(&mut self, outcome: &SearchOutcome) {
        match outcome {
            SearchOutcome::Solved(solution) => self
                .solved
                .push((solution.moves.len(), solution.states_explored)),
            SearchOutcome::Unsolvable { .. } => self.unsolvable += 1,
            SearchOutcome::LimitReached { .. } => self.limited += 1,
        }
    }

    fn averages(&self) -> Option<(f64, f64)> {
        if self.solved.is_empty() {
            return None;
        }
        let n = self.solved.len() as f64;
        let moves: usize = self.solved.iter().map(|(m, _)| m).sum();
        let states: usize = self.solved.iter().map(|(_, s)| s).sum();
        Some((moves as f64 / n, states as f64 / n))
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config = GameConfig::load_or_default(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;
    let solver = Solver::new(config.solver.clone());
    let mut summary = Summary::default();

    println!("Starting solver evaluation for {} boards...", args.boards);

    for board_idx in 0..args.boards {
        let seed = args.start_seed + board_idx as u64;
        let board = Generator::with_seed(config.clone(), seed)
            .generate(args.tubes)
            .with_context(|| format!("generating board {} (seed {})", board_idx, seed))?;

        let outcome = solver.search(&board);
        match &outcome {
            SearchOutcome::Solved(solution) => println!(
                "  Board {:<3} (seed {:<4}) tubes {}: optimal {:<3} explored {}",
                board_idx,
                seed,
                board.len(),
                solution.moves.len(),
                solution.states_explored
            ),
            SearchOutcome::Unsolvable { explored } => println!(
                "  Board {:<3} (seed {:<4}) tubes {}: unsolvable, explored {}",
                board_idx,
                seed,
                board.len(),
                explored
            ),
            SearchOutcome::LimitReached { explored } => println!(
                "  Board {:<3} (seed {:<4}) tubes {}: state limit reached, explored {}",
                board_idx,
                seed,
                board.len(),
                explored
            ),
        }
        summary.record(&outcome);
    }

    println!("\n--- Evaluation Complete ---");
    println!("Solved: {}", summary.solved.len());
    println!("Unsolvable: {}", summary.unsolvable);
    println!("Hit state limit: {}", summary.limited);
    if let Some((moves, states)) = summary.averages() {
        println!("Average optimal moves: {:.2}", moves);
        println!("Average states explored: {:.0}", states);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_sort::solver::Solution;

    #[test]
    fn test_summary_averages() {
        let mut summary = Summary::default();
        assert_eq!(summary.averages(), None);
        summary.record(&SearchOutcome::Solved(Solution {
            moves: vec![],
            states_explored: 10,
        }));
        summary.record(&SearchOutcome::Unsolvable { explored: 4 });
        summary.record(&SearchOutcome::LimitReached { explored: 9 });
        assert_eq!(summary.solved.len(), 1);
        assert_eq!(summary.unsolvable, 1);
        assert_eq!(summary.limited, 1);
        assert_eq!(summary.averages(), Some((0.0, 10.0)));
    }
}
