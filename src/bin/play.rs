use anyhow::{Context, Result};
use clap::Parser;
use color_sort::config::GameConfig;
use color_sort::engine::{Game, Move};
use color_sort::generator::Generator;
use color_sort::solver::Solver;
use color_sort::utils::parse_move;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use log::{debug, warn};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const BANNER: &str = r"
   ___      _              ___          _
  / __|___ | | ___  _ _   / __| ___  _ _| |_
 | (__/ _ \| |/ _ \| '_|  \__ \/ _ \| '_|  _|
  \___\___/|_|\___/|_|    |___/\___/|_|  \__|
";

const RULES: &[&str] = &[
    "Pour the top run of one tube onto another, e.g. '1-3', '1,3' or '1 -> 3'.",
    "You can pour onto the same color or into an empty tube, while there is room.",
    "The puzzle is solved when every tube is empty or full of one color.",
];

#[derive(Parser, Debug)]
#[command(author, version, about = "Play the color sort puzzle in the terminal")]
struct Args {
    /// Number of tubes, including the empty ones (random when omitted)
    #[arg(short, long)]
    tubes: Option<usize>,

    /// Seed for reproducible boards
    #[arg(short, long)]
    seed: Option<u64>,

    /// Path to TOML configuration file
    #[arg(long, default_value = "color_sort.toml")]
    config: PathBuf,
}

/// Keyword commands typed instead of a move. Matching is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quit,
    Reset,
    Hint,
    New,
    Help,
    Undo,
    Copyright,
    Warranty,
}

impl Command {
    fn parse(input: &str) -> Option<Command> {
        match input.trim().to_uppercase().as_str() {
            "Q" | "QUIT" | "EXIT" => Some(Command::Quit),
            "R" | "RESET" => Some(Command::Reset),
            "H" | "HINT" => Some(Command::Hint),
            "N" | "NEW" => Some(Command::New),
            "I" | "HELP" => Some(Command::Help),
            "U" | "UNDO" => Some(Command::Undo),
            "SHOW C" => Some(Command::Copyright),
            "SHOW W" => Some(Command::Warranty),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Mood {
    New,
    Transition,
    Error,
    Restart,
}

fn mood_line(mood: Mood, rng: &mut SmallRng) -> &'static str {
    let lines: &[&str] = match mood {
        Mood::New => &[
            "A fresh set of tubes. Good luck!",
            "New puzzle, new colors.",
            "Let's sort some colors.",
        ],
        Mood::Transition => &[
            "What's next?",
            "Keep pouring.",
            "Nice, keep going.",
        ],
        Mood::Error => &[
            "Don't worry, try another one.",
            "Not quite.",
            "Type 'help' if you are stuck.",
        ],
        Mood::Restart => &["Back to the beginning.", "Same colors, fresh start."],
    };
    lines.choose(rng).copied().unwrap_or("")
}

fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "*".repeat(filled), ".".repeat(5 - filled))
}

/// Interactive session over any line-based input and output.
struct Player<R, W> {
    input: R,
    output: W,
    generator: Generator,
    solver: Solver,
    tube_count: Option<usize>,
    rng: SmallRng,
    game: Game,
}

impl<R: BufRead, W: Write> Player<R, W> {
    fn new(
        input: R,
        output: W,
        mut generator: Generator,
        tube_count: Option<usize>,
        seed: Option<u64>,
    ) -> Result<Self> {
        let solver = Solver::new(generator.config().solver.clone());
        let board = generator
            .generate(tube_count)
            .context("generating the first board")?;
        let game = Game::new(board, &solver);
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Ok(Player {
            input,
            output,
            generator,
            solver,
            tube_count,
            rng,
            game,
        })
    }

    /// Reads one line, or `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn new_game(&mut self) -> Result<()> {
        let board = self
            .generator
            .generate(self.tube_count)
            .context("generating a new board")?;
        self.game = Game::new(board, &self.solver);
        if self.game.optimal_moves().is_none() {
            warn!("no optimal solution found for the new board within the search bounds");
        }
        Ok(())
    }

    fn welcome(&mut self) -> Result<String> {
        writeln!(self.output, "{}", BANNER)?;
        writeln!(self.output, "> Welcome to Color Sort! Type 'help' for the rules.")?;
        writeln!(self.output, "> What's your name?")?;
        self.output.flush()?;
        let name = self.read_line()?.unwrap_or_default();
        Ok(if name.is_empty() { "Player".to_string() } else { name })
    }

    fn how_to_play(&mut self) -> Result<()> {
        writeln!(self.output, "> How to play:")?;
        for line in RULES {
            writeln!(self.output, ">   {}", line)?;
        }
        writeln!(
            self.output,
            "> Commands: (H)int, (U)ndo, (R)eset, (N)ew, (I)/help, (Q)uit, 'show c', 'show w'."
        )?;
        Ok(())
    }

    fn show_board(&mut self, highlight: Option<Move>) -> Result<()> {
        execute!(self.output, Clear(ClearType::All), MoveTo(0, 0))?;
        writeln!(self.output, "{}\n", self.game.board().to_string_with_highlight(highlight))?;
        writeln!(self.output, "> Moves: {}", self.game.move_count())?;
        Ok(())
    }

    /// Shows the win screen. Returns `false` if the player does not want another game.
    fn finish(&mut self, name: &str) -> Result<bool> {
        writeln!(self.output, "\n> Congratulations, {}! You solved the game.", name)?;
        match self.game.optimal_moves() {
            Some(best) => writeln!(self.output, "\n> Best solve: {}", best)?,
            None => writeln!(self.output, "\n> Best solve: unknown")?,
        }
        writeln!(self.output, "> Your solve: {}", self.game.move_count())?;
        if let Some(rating) = self.game.rating() {
            writeln!(self.output, "> Rating: {} ({}/5)", stars(rating), rating)?;
        }
        writeln!(self.output, "\n> Play again? [Y/n]")?;
        self.output.flush()?;
        let answer = self.read_line()?.unwrap_or_else(|| "n".to_string());
        Ok(answer.is_empty() || answer.eq_ignore_ascii_case("y"))
    }

    fn run(&mut self) -> Result<()> {
        let name = self.welcome()?;
        let mut mood = Mood::New;
        let mut highlight = None;

        loop {
            self.show_board(highlight.take())?;
            if self.game.is_won() {
                if !self.finish(&name)? {
                    break;
                }
                self.new_game()?;
                mood = Mood::New;
                continue;
            }

            let line = mood_line(mood, &mut self.rng);
            writeln!(self.output, "\n> {}", line)?;
            writeln!(self.output, "> Enter your move or a command")?;
            self.output.flush()?;
            mood = Mood::Transition;

            let Some(input) = self.read_line()? else {
                break;
            };

            match Command::parse(&input) {
                Some(Command::Quit) => break,
                Some(Command::Reset) => {
                    self.game.reset();
                    mood = Mood::Restart;
                    writeln!(self.output, "\n> Game reset!")?;
                }
                Some(Command::Hint) => match self.game.hint(&self.solver) {
                    Some(mv) => {
                        highlight = Some(mv);
                        writeln!(
                            self.output,
                            "\n> Hint: Try moving from tube {} to tube {}.",
                            mv.source + 1,
                            mv.destination + 1
                        )?;
                    }
                    None => writeln!(
                        self.output,
                        "\n> No valid moves. Consider undoing or restarting."
                    )?,
                },
                Some(Command::New) => {
                    self.new_game()?;
                    mood = Mood::New;
                    writeln!(self.output, "\n> New game!")?;
                }
                Some(Command::Help) => self.how_to_play()?,
                Some(Command::Undo) => {
                    if self.game.undo_last_move() {
                        writeln!(self.output, "\n> Last move undone.")?;
                    } else {
                        writeln!(self.output, "\n> Nothing to undo.")?;
                    }
                }
                Some(Command::Copyright) => {
                    writeln!(
                        self.output,
                        "\n> {} {} is licensed under {}.",
                        env!("CARGO_PKG_NAME"),
                        env!("CARGO_PKG_VERSION"),
                        env!("CARGO_PKG_LICENSE")
                    )?;
                }
                Some(Command::Warranty) => {
                    writeln!(
                        self.output,
                        "\n> This program is distributed WITHOUT ANY WARRANTY, \
                         to the extent permitted by law."
                    )?;
                }
                None => match parse_move(&input) {
                    Ok(mv) => {
                        if self.game.process_move(mv) {
                            writeln!(
                                self.output,
                                "\n> Moved from tube {} to tube {}.",
                                mv.source + 1,
                                mv.destination + 1
                            )?;
                        } else {
                            mood = Mood::Error;
                            writeln!(self.output, "\n> Invalid move. Please try again.")?;
                        }
                    }
                    Err(e) => {
                        debug!("rejected input {:?}: {}", input, e);
                        mood = Mood::Error;
                        writeln!(
                            self.output,
                            "\n> Invalid input. Please use the right format or a valid command."
                        )?;
                    }
                },
            }
        }

        writeln!(self.output, "\n> Thanks for playing, {}!", name)?;
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config = GameConfig::load_or_default(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;
    let generator = match args.seed {
        Some(seed) => Generator::with_seed(config, seed),
        None => Generator::new(config),
    };

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let result = Player::new(io::stdin().lock(), io::stdout(), generator, args.tubes, args.seed)
        .and_then(|mut player| player.run());

    // Restore the main screen, even on error
    restore_screen(&mut io::stdin().lock(), &mut io::stdout());
    result
}

/// Waits for Enter and leaves the alternate screen. Failures are logged, not returned,
/// so they never hide the session's own result.
fn restore_screen(input: &mut impl BufRead, output: &mut impl Write) {
    if let Err(e) = writeln!(output, "\nPress Enter to exit.").and_then(|()| output.flush()) {
        warn!("failed to write exit prompt: {}", e);
    }
    let mut pause = String::new();
    if let Err(e) = input.read_line(&mut pause) {
        warn!("failed to read exit confirmation: {}", e);
    }
    if let Err(e) = execute!(output, LeaveAlternateScreen) {
        warn!("failed to leave the alternate screen: {}", e);
    }
}
