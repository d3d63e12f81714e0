//! Core game engine for the color sort puzzle.
//!
//! This module defines the game's fundamental components:
//! - `Color`: The palette of token colors.
//! - `Tube`: A capacity-bounded stack of tokens, top = last element.
//! - `Board`: An ordered set of tubes with move legality, pouring and win detection.
//! - `Move`: A (source, destination) pair of 0-based tube indices.
//! - `Game`: Manages a play session, including the original board (for reset),
//!   a single-level undo snapshot and the list of moves made so far.
use crate::error::BoardParseError;
use crate::solver::Solver;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Number of tokens a tube holds when full.
pub const DEFAULT_CAPACITY: usize = 4;

/// Represents the color of a single token.
///
/// Colors carry no ordering; only identity matters for the rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Green,
    Blue,
    Cyan,
    Magenta,
    Yellow,
    White,
}

impl Color {
    /// Every color in palette order.
    pub const ALL: [Color; 7] = [
        Color::Red,
        Color::Green,
        Color::Blue,
        Color::Cyan,
        Color::Magenta,
        Color::Yellow,
        Color::White,
    ];

    /// Converts the color to its character representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use color_sort::engine::Color;
    /// assert_eq!(Color::Red.to_char(), 'R');
    /// assert_eq!(Color::Magenta.to_char(), 'M');
    /// ```
    pub fn to_char(&self) -> char {
        match self {
            Color::Red => 'R',
            Color::Green => 'G',
            Color::Blue => 'B',
            Color::Cyan => 'C',
            Color::Magenta => 'M',
            Color::Yellow => 'Y',
            Color::White => 'W',
        }
    }

    /// Parses a color letter, case-insensitively. Returns `None` for anything
    /// that is not one of `R G B C M Y W`.
    pub fn from_char(ch: char) -> Option<Color> {
        match ch.to_ascii_uppercase() {
            'R' => Some(Color::Red),
            'G' => Some(Color::Green),
            'B' => Some(Color::Blue),
            'C' => Some(Color::Cyan),
            'M' => Some(Color::Magenta),
            'Y' => Some(Color::Yellow),
            'W' => Some(Color::White),
            _ => None,
        }
    }

    /// Returns the ANSI background color code string for terminal output.
    fn to_ansi_color_code(&self) -> &'static str {
        match self {
            Color::Red => "41",
            Color::Green => "42",
            Color::Yellow => "43",
            Color::Blue => "44",
            Color::Magenta => "45",
            Color::Cyan => "46",
            Color::White => "47",
        }
    }

    // Key bytes start at 1 so that 0 can separate tubes.
    fn key_byte(&self) -> u8 {
        match self {
            Color::Red => 1,
            Color::Green => 2,
            Color::Blue => 3,
            Color::Cyan => 4,
            Color::Magenta => 5,
            Color::Yellow => 6,
            Color::White => 7,
        }
    }
}

/// A capacity-bounded stack of tokens. The top of the tube is the last element.
///
/// The length of a tube never exceeds its capacity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tube {
    tokens: Vec<Color>,
    capacity: usize,
}

impl Tube {
    /// Creates an empty tube with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Tube {
            tokens: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Creates a tube holding `tokens` (bottom first).
    ///
    /// # Returns
    /// `None` if there are more tokens than `capacity` allows.
    pub fn with_tokens(tokens: Vec<Color>, capacity: usize) -> Option<Self> {
        if tokens.len() > capacity {
            return None;
        }
        Some(Tube { tokens, capacity })
    }

    /// The tokens in this tube, bottom first.
    pub fn tokens(&self) -> &[Color] {
        &self.tokens
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tokens.len() >= self.capacity
    }

    pub fn free_space(&self) -> usize {
        self.capacity - self.tokens.len()
    }

    /// The color of the topmost token, if any.
    pub fn top(&self) -> Option<Color> {
        self.tokens.last().copied()
    }

    /// Returns `true` if all tokens are the same color. Empty and
    /// single-token tubes are uniform.
    pub fn is_uniform(&self) -> bool {
        match self.tokens.first() {
            Some(first) => self.tokens.iter().all(|t| t == first),
            None => true,
        }
    }

    /// Returns `true` if the tube is full and uniform.
    pub fn is_complete(&self) -> bool {
        self.is_full() && self.is_uniform()
    }

    /// Length of the run of equal tokens at the top of the tube.
    ///
    /// # Examples
    /// ```
    /// use color_sort::engine::{Color, Tube};
    /// let tube = Tube::with_tokens(vec![Color::Red, Color::Blue, Color::Blue], 4).unwrap();
    /// assert_eq!(tube.top_run_len(), 2);
    /// ```
    pub fn top_run_len(&self) -> usize {
        match self.top() {
            Some(top) => self.tokens.iter().rev().take_while(|&&t| t == top).count(),
            None => 0,
        }
    }

    /// Number of tokens a pour from `self` into `destination` would move.
    /// Zero when the top colors differ and the destination is not empty.
    fn pourable_amount(&self, destination: &Tube) -> usize {
        match (self.top(), destination.top()) {
            (None, _) => 0,
            (Some(a), Some(b)) if a != b => 0,
            _ => self.top_run_len().min(destination.free_space()),
        }
    }
}

/// A single pour from one tube to another, using 0-based indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub source: usize,
    pub destination: usize,
}

impl Move {
    pub fn new(source: usize, destination: usize) -> Self {
        Move {
            source,
            destination,
        }
    }

    /// The move pouring back the other way.
    pub fn reversed(&self) -> Move {
        Move::new(self.destination, self.source)
    }
}

impl fmt::Display for Move {
    /// Formats the move with 1-based tube numbers, as shown to the player.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source + 1, self.destination + 1)
    }
}

/// Order-sensitive structural fingerprint of a board.
///
/// Encodes each tube's tokens bottom to top with a `0` byte after every
/// tube. Boards with the same tubes in a different order produce different
/// keys; no permutation canonicalization is done.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoardKey(Vec<u8>);

/// Represents the game board as an ordered list of tubes.
///
/// Tube order defines the indices the player sees. Pours only relocate
/// tokens, so the multiset of colors on a board never changes through
/// legal moves.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    tubes: Vec<Tube>,
}

impl Board {
    /// Creates a board from already built tubes. Tubes may differ in capacity.
    pub fn new(tubes: Vec<Tube>) -> Self {
        Board { tubes }
    }

    /// Creates a board from per-tube token lists (bottom first), all with the same capacity.
    ///
    /// # Arguments
    /// * `stacks`: One entry per tube.
    /// * `capacity`: Capacity of every tube.
    ///
    /// # Returns
    /// * `Ok(Board)` on success.
    /// * `Err(BoardParseError::TubeOverCapacity)` if any stack is longer than `capacity`.
    /// * `Err(BoardParseError::Empty)` if `stacks` is empty.
    ///
    /// # Examples
    /// ```
    /// use color_sort::engine::{Board, Color::*};
    /// let board = Board::from_tokens(vec![vec![Red, Red, Red, Red], vec![], vec![]], 4).unwrap();
    /// assert!(board.is_won());
    /// ```
    pub fn from_tokens(stacks: Vec<Vec<Color>>, capacity: usize) -> Result<Self, BoardParseError> {
        if stacks.is_empty() {
            return Err(BoardParseError::Empty);
        }
        let mut tubes = Vec::with_capacity(stacks.len());
        for (index, tokens) in stacks.into_iter().enumerate() {
            let len = tokens.len();
            let tube = Tube::with_tokens(tokens, capacity).ok_or(
                BoardParseError::TubeOverCapacity {
                    tube: index + 1,
                    len,
                    capacity,
                },
            )?;
            tubes.push(tube);
        }
        Ok(Board { tubes })
    }

    pub fn tubes(&self) -> &[Tube] {
        &self.tubes
    }

    /// Returns the tube at `index`, or `None` if it is out of range.
    pub fn tube(&self, index: usize) -> Option<&Tube> {
        self.tubes.get(index)
    }

    /// Number of tubes on the board.
    pub fn len(&self) -> usize {
        self.tubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tubes.is_empty()
    }

    /// Capacity shared by the tubes (taken from the first tube).
    pub fn capacity(&self) -> usize {
        self.tubes.first().map_or(DEFAULT_CAPACITY, Tube::capacity)
    }

    /// Checks if the board is solved: every non-empty tube is complete.
    ///
    /// A board with only empty tubes counts as won.
    pub fn is_won(&self) -> bool {
        self.tubes.iter().all(|t| t.is_empty() || t.is_complete())
    }

    /// Computes the structural key used to deduplicate states during search.
    pub fn canonical_key(&self) -> BoardKey {
        let token_count: usize = self.tubes.iter().map(Tube::len).sum();
        let mut bytes = Vec::with_capacity(token_count + self.tubes.len());
        for tube in &self.tubes {
            bytes.extend(tube.tokens.iter().map(Color::key_byte));
            bytes.push(0);
        }
        BoardKey(bytes)
    }

    /// Counts the tokens of each color across all tubes.
    pub fn color_counts(&self) -> HashMap<Color, usize> {
        let mut counts = HashMap::new();
        for token in self.tubes.iter().flat_map(|t| t.tokens.iter()) {
            *counts.entry(*token).or_insert(0) += 1;
        }
        counts
    }

    /// Checks whether `mv` is a legal pour on this board.
    ///
    /// A move is legal if both indices are on the board, source and
    /// destination differ, the source is non-empty, the destination is not
    /// full, and the destination is either empty or has the same top color.
    pub fn is_legal(&self, mv: Move) -> bool {
        if mv.source == mv.destination {
            return false;
        }
        let (Some(source), Some(destination)) = (self.tube(mv.source), self.tube(mv.destination))
        else {
            return false;
        };
        if source.is_empty() || destination.is_full() {
            return false;
        }
        match destination.top() {
            None => true,
            Some(top) => source.top() == Some(top),
        }
    }

    /// Applies a pour in place.
    ///
    /// The whole top run of the source moves, limited by the free space in
    /// the destination. The amount is fixed before any token moves, so the
    /// board is either fully poured or left untouched.
    ///
    /// # Returns
    /// * `true` if the move was legal and the pour happened.
    /// * `false` if the move was illegal; the board is unchanged.
    pub fn apply_move(&mut self, mv: Move) -> bool {
        if !self.is_legal(mv) {
            return false;
        }
        let amount = self.tubes[mv.source].pourable_amount(&self.tubes[mv.destination]);
        let source = &mut self.tubes[mv.source].tokens;
        let start = source.len() - amount;
        let run: Vec<Color> = source.drain(start..).collect();
        self.tubes[mv.destination].tokens.extend(run);
        true
    }

    /// Returns a copy of the board with `mv` applied, or `None` if it is illegal.
    pub fn after_move(&self, mv: Move) -> Option<Board> {
        if !self.is_legal(mv) {
            return None;
        }
        let mut next = self.clone();
        next.apply_move(mv);
        Some(next)
    }

    /// Plain text form: one line per tube, color letters bottom to top,
    /// `.` for an empty tube. Parsed back by `utils::board_from_str_array`.
    pub fn to_text(&self) -> String {
        self.tubes
            .iter()
            .map(|tube| {
                if tube.is_empty() {
                    ".".to_string()
                } else {
                    tube.tokens.iter().map(Color::to_char).collect()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Generates a terminal rendering of the board with an optional highlighted move.
    ///
    /// Tubes are drawn side by side with ANSI background colors, topmost slot
    /// first, followed by a line of 1-based tube numbers. When `highlight` is
    /// `Some`, the source and destination tube numbers are marked with `^`
    /// and `v` on an extra line.
    pub fn to_string_with_highlight(&self, highlight: Option<Move>) -> String {
        let mut output = String::new();
        let capacity = self.capacity();

        for level in (0..capacity).rev() {
            for tube in &self.tubes {
                output.push('|');
                match tube.tokens.get(level) {
                    Some(color) => output.push_str(&format!(
                        "\x1b[{}m   \x1b[m",
                        color.to_ansi_color_code()
                    )),
                    None => output.push_str("   "),
                }
                output.push_str("| ");
            }
            output.push('\n');
        }

        for index in 0..self.tubes.len() {
            output.push_str(&format!(" {:^3}  ", index + 1));
        }

        if let Some(mv) = highlight {
            output.push('\n');
            for index in 0..self.tubes.len() {
                let marker = if index == mv.source {
                    "^"
                } else if index == mv.destination {
                    "v"
                } else {
                    " "
                };
                output.push_str(&format!(" {:^3}  ", marker));
            }
        }

        output
    }
}

impl fmt::Display for Board {
    /// Formats the board using `to_string_with_highlight(None)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_highlight(None))
    }
}

/// Rates a finished game from 1 to 5 stars.
///
/// Matching or beating the optimal move count gives 5 stars. Otherwise the
/// rating is `5 * optimal / user` rounded half up, never below 1.
///
/// # Examples
/// ```
/// use color_sort::engine::rate;
/// assert_eq!(rate(5, 5), 5);
/// assert_eq!(rate(10, 5), 3); // 2.5 rounds up
/// assert_eq!(rate(100, 5), 1);
/// ```
pub fn rate(user_moves: usize, optimal_moves: usize) -> u8 {
    if user_moves <= optimal_moves {
        return 5;
    }
    // floor(5 * o / u + 1/2) == floor((10 * o + u) / (2 * u))
    let stars = (10 * optimal_moves + user_moves) / (2 * user_moves);
    stars.clamp(1, 5) as u8
}

/// Manages the state of a single play session.
///
/// The session keeps the original board (for reset), the current board, the
/// board just before the last successful pour (for undo) and the moves made.
/// Only one level of undo is kept: undoing twice in a row is a no-op the
/// second time.
///
/// # Examples
/// ```
/// use color_sort::engine::{Board, Color::*, Game, Move};
/// let board = Board::from_tokens(
///     vec![vec![Red, Red, Red, Green], vec![Green, Green, Green], vec![Red]],
///     4,
/// ).unwrap();
/// let mut game = Game::new_with_board(board);
/// assert!(game.process_move(Move::new(0, 1)));
/// assert!(game.process_move(Move::new(2, 0)));
/// assert!(game.is_won());
/// assert_eq!(game.move_count(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    original: Board,
    previous: Option<Board>,
    moves: Vec<Move>,
    optimal_moves: Option<usize>,
}

impl Game {
    /// Creates a session for `board` without an optimal baseline.
    pub fn new_with_board(board: Board) -> Self {
        Game {
            original: board.clone(),
            board,
            previous: None,
            moves: Vec::new(),
            optimal_moves: None,
        }
    }

    /// Creates a session for `board` and computes the optimal move count with `solver`.
    ///
    /// The baseline stays `None` if the solver finds no solution within its bounds.
    pub fn new(board: Board, solver: &Solver) -> Self {
        let optimal_moves = solver.search(&board).moves().map(<[Move]>::len);
        Game {
            optimal_moves,
            ..Game::new_with_board(board)
        }
    }

    /// Returns an immutable reference to the current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The board the session started from.
    pub fn original(&self) -> &Board {
        &self.original
    }

    /// Successful moves made so far, in order.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    /// Shortest solution length from the original board, if known.
    pub fn optimal_moves(&self) -> Option<usize> {
        self.optimal_moves
    }

    /// Processes a player's move.
    ///
    /// On success the board before the pour becomes the undo snapshot and the
    /// move is recorded. An illegal move changes nothing.
    pub fn process_move(&mut self, mv: Move) -> bool {
        let snapshot = self.board.clone();
        if !self.board.apply_move(mv) {
            return false;
        }
        self.previous = Some(snapshot);
        self.moves.push(mv);
        true
    }

    /// Restores the board from before the last successful move.
    ///
    /// # Returns
    /// * `true` if a move was undone.
    /// * `false` if there is no snapshot, e.g. right after another undo, a
    ///   reset, or at the start of the game.
    pub fn undo_last_move(&mut self) -> bool {
        match self.previous.take() {
            Some(previous) => {
                self.board = previous;
                self.moves.pop();
                true
            }
            None => false,
        }
    }

    /// Restores the original board and clears the move list. The layout is not regenerated.
    pub fn reset(&mut self) {
        self.board = self.original.clone();
        self.previous = None;
        self.moves.clear();
    }

    pub fn is_won(&self) -> bool {
        self.board.is_won()
    }

    /// Next move of a freshly computed optimal path from the current board.
    pub fn hint(&self, solver: &Solver) -> Option<Move> {
        solver.hint(&self.board)
    }

    /// Star rating for a won game, or `None` if the game is not won or the
    /// optimal move count is unknown.
    pub fn rating(&self) -> Option<u8> {
        if !self.is_won() {
            return None;
        }
        self.optimal_moves.map(|optimal| rate(self.moves.len(), optimal))
    }
}
