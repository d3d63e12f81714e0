use crate::engine::{Board, BoardKey, Move};
use log::debug;
use std::collections::{HashSet, VecDeque};

/// Default cap on distinct states discovered by one search.
pub const DEFAULT_MAX_STATES: usize = 2_000_000;

/// Bounds for a single search.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Stop with [`SearchOutcome::LimitReached`] once this many distinct
    /// states have been discovered. `None` searches until the queue is empty.
    pub max_states: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_states: Some(DEFAULT_MAX_STATES),
        }
    }
}

/// Represents a solution found by the solver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    /// Shortest sequence of pours from the start board to a won board.
    pub moves: Vec<Move>,
    /// Number of states taken off the queue before the won board was found.
    pub states_explored: usize,
}

/// Result of a breadth-first search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    Solved(Solution),
    /// Every reachable state was explored without reaching a won board.
    Unsolvable { explored: usize },
    /// The state cap was hit first; the board may or may not be solvable.
    LimitReached { explored: usize },
}

impl SearchOutcome {
    /// The solving path, if one was found.
    pub fn moves(&self) -> Option<&[Move]> {
        match self {
            SearchOutcome::Solved(solution) => Some(&solution.moves),
            _ => None,
        }
    }

    pub fn into_moves(self) -> Option<Vec<Move>> {
        match self {
            SearchOutcome::Solved(solution) => Some(solution.moves),
            _ => None,
        }
    }

    /// States taken off the queue during the search.
    pub fn explored(&self) -> usize {
        match self {
            SearchOutcome::Solved(solution) => solution.states_explored,
            SearchOutcome::Unsolvable { explored } | SearchOutcome::LimitReached { explored } => {
                *explored
            }
        }
    }
}

// The arena only keeps parent links; the path is rebuilt by walking them.
struct SearchNode {
    parent: Option<usize>,
    via: Option<Move>,
}

/// Breadth-first solver returning shortest solving paths.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Solver { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Searches for a shortest sequence of moves that wins `start`.
    ///
    /// Nodes are distinct boards (by [`Board::canonical_key`]) and are expanded
    /// at most once. Successors come from [`candidate_moves`], so ties are
    /// broken by ascending source then destination index and the same board
    /// always yields the same path. The traversal uses an explicit queue.
    ///
    /// A successor is checked for a win as soon as it is generated, before the
    /// state cap is consulted. Every shallower board was generated earlier, so
    /// the first win seen is still a shortest one.
    pub fn search(&self, start: &Board) -> SearchOutcome {
        let mut visited: HashSet<BoardKey> = HashSet::new();
        visited.insert(start.canonical_key());
        let mut nodes = vec![SearchNode {
            parent: None,
            via: None,
        }];
        let mut queue = VecDeque::from([(0usize, start.clone())]);
        let mut explored = 0;

        while let Some((index, board)) = queue.pop_front() {
            explored += 1;

            if board.is_won() {
                return Self::solved(&nodes, index, explored, visited.len());
            }

            for mv in candidate_moves(&board, nodes[index].via) {
                let Some(next) = board.after_move(mv) else {
                    continue;
                };
                let key = next.canonical_key();
                if visited.contains(&key) {
                    continue;
                }
                if next.is_won() {
                    nodes.push(SearchNode {
                        parent: Some(index),
                        via: Some(mv),
                    });
                    return Self::solved(&nodes, nodes.len() - 1, explored, visited.len() + 1);
                }
                if self.config.max_states.is_some_and(|max| visited.len() >= max) {
                    debug!(
                        "state limit {} reached after exploring {} states",
                        visited.len(),
                        explored
                    );
                    return SearchOutcome::LimitReached { explored };
                }
                visited.insert(key);
                nodes.push(SearchNode {
                    parent: Some(index),
                    via: Some(mv),
                });
                queue.push_back((nodes.len() - 1, next));
            }
        }

        debug!("no solution after exploring {} states", explored);
        SearchOutcome::Unsolvable { explored }
    }

    fn solved(
        nodes: &[SearchNode],
        index: usize,
        explored: usize,
        discovered: usize,
    ) -> SearchOutcome {
        let moves = Self::path_to(nodes, index);
        debug!(
            "solved in {} moves after exploring {} states ({} discovered)",
            moves.len(),
            explored,
            discovered
        );
        SearchOutcome::Solved(Solution {
            moves,
            states_explored: explored,
        })
    }

    /// Next move of a shortest solution from `board`, or `None` when no
    /// solution was found (or the board is already won).
    pub fn hint(&self, board: &Board) -> Option<Move> {
        self.search(board).moves()?.first().copied()
    }

    fn path_to(nodes: &[SearchNode], mut index: usize) -> Vec<Move> {
        let mut moves = Vec::new();
        while let Some(mv) = nodes[index].via {
            moves.push(mv);
            match nodes[index].parent {
                Some(parent) => index = parent,
                None => break,
            }
        }
        moves.reverse();
        moves
    }
}

/// Enumerates the moves the solver expands from `board`, in search order.
///
/// Moves are listed by ascending source then destination index and must be
/// legal. Two kinds are skipped:
/// - the reverse of `previous`, the move that produced this board;
/// - pours out of a uniform tube into an empty tube, or into a tube without
///   room for the whole source tube.
pub fn candidate_moves(board: &Board, previous: Option<Move>) -> Vec<Move> {
    let mut moves = Vec::new();
    let reverse = previous.map(|mv| mv.reversed());

    for (source_index, source) in board.tubes().iter().enumerate() {
        if source.is_empty() {
            continue;
        }
        let clean = source.is_uniform();

        for (destination_index, destination) in board.tubes().iter().enumerate() {
            let mv = Move::new(source_index, destination_index);
            if reverse == Some(mv) {
                continue;
            }
            if clean && (destination.is_empty() || destination.free_space() < source.len()) {
                continue;
            }
            if board.is_legal(mv) {
                moves.push(mv);
            }
        }
    }
    moves
}

/// Solves `board` with the default bounds.
pub fn solve_bfs(board: &Board) -> SearchOutcome {
    Solver::default().search(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::engine::Color::*;
    use crate::engine::{Color, Tube, DEFAULT_CAPACITY};
    use crate::generator::Generator;

    fn board(stacks: Vec<Vec<Color>>) -> Board {
        Board::from_tokens(stacks, DEFAULT_CAPACITY).unwrap()
    }

    fn two_move_board() -> Board {
        board(vec![
            vec![Red, Red, Red, Green],
            vec![Green, Green, Green],
            vec![Red],
        ])
    }

    fn apply_all(start: &Board, moves: &[Move]) -> Board {
        let mut b = start.clone();
        for &mv in moves {
            assert!(b.apply_move(mv), "solver produced illegal move {}", mv);
        }
        b
    }

    #[test]
    fn test_solve_already_won() {
        let b = board(vec![vec![Red; 4], vec![], vec![]]);
        let outcome = solve_bfs(&b);
        assert_eq!(outcome.moves(), Some(&[][..]));
        assert_eq!(outcome.explored(), 1);
        assert_eq!(Solver::default().hint(&b), None);
    }

    #[test]
    fn test_solve_two_move_board_is_optimal() {
        let outcome = solve_bfs(&two_move_board());
        let moves = outcome.moves().unwrap();
        assert_eq!(moves, &[Move::new(0, 1), Move::new(0, 2)]);
        assert!(apply_all(&two_move_board(), moves).is_won());
    }

    #[test]
    fn test_solve_prefers_shorter_path() {
        // The empty tube is a distraction: red onto red, then blue onto blue.
        let b = board(vec![
            vec![Blue, Red],
            vec![Blue, Blue, Blue],
            vec![Red, Red, Red],
            vec![],
        ]);
        let moves = solve_bfs(&b).into_moves().unwrap();
        assert_eq!(moves.len(), 2);
        assert!(apply_all(&b, &moves).is_won());
    }

    #[test]
    fn test_solve_is_deterministic() {
        let config = GameConfig::default();
        let b = Generator::with_seed(config, 2024).generate(Some(6)).unwrap();
        let first = solve_bfs(&b);
        let second = solve_bfs(&b);
        assert_eq!(first, second);
        assert!(first.moves().is_some());
    }

    #[test]
    fn test_solve_unsolvable() {
        // Two full, interleaved tubes and nowhere to pour.
        let b = board(vec![vec![Red, Green, Red, Green], vec![Green, Red, Green, Red]]);
        assert_eq!(solve_bfs(&b), SearchOutcome::Unsolvable { explored: 1 });
        assert_eq!(Solver::default().hint(&b), None);
    }

    #[test]
    fn test_solve_limit_reached() {
        let solver = Solver::new(SolverConfig { max_states: Some(1) });
        let outcome = solver.search(&two_move_board());
        assert!(matches!(outcome, SearchOutcome::LimitReached { .. }));
        assert_eq!(outcome.moves(), None);

        let unbounded = Solver::new(SolverConfig { max_states: None });
        assert_eq!(unbounded.search(&two_move_board()).moves().map(<[Move]>::len), Some(2));
    }

    #[test]
    fn test_solve_stops_on_won_successor_at_state_limit() {
        // One pour from a win, with no room to enqueue anything.
        let b = board(vec![vec![Red, Red, Red], vec![Red], vec![]]);
        let solver = Solver::new(SolverConfig { max_states: Some(1) });
        let outcome = solver.search(&b);
        assert_eq!(outcome.moves(), Some(&[Move::new(0, 1)][..]));
        assert_eq!(outcome.explored(), 1);
    }

    #[test]
    fn test_solve_mixed_capacity_board() {
        let short = Tube::with_tokens(vec![Red], 3).unwrap();
        let tall = Tube::with_tokens(vec![Red, Red, Red], 4).unwrap();
        let b = Board::new(vec![short, tall]);
        assert_eq!(solve_bfs(&b).into_moves(), Some(vec![Move::new(0, 1)]));

        // The short tube cannot take the tall tube's run, so the pour goes the other way.
        let tall = Tube::with_tokens(vec![Red, Red, Red], 4).unwrap();
        let short = Tube::with_tokens(vec![Red], 2).unwrap();
        let b = Board::new(vec![tall, short]);
        assert_eq!(solve_bfs(&b).into_moves(), Some(vec![Move::new(1, 0)]));
    }

    #[test]
    fn test_candidate_moves_order_and_legality() {
        let b = board(vec![vec![Red, Green], vec![Blue, Green], vec![]]);
        assert_eq!(
            candidate_moves(&b, None),
            vec![
                Move::new(0, 1),
                Move::new(0, 2),
                Move::new(1, 0),
                Move::new(1, 2),
            ]
        );
    }

    #[test]
    fn test_candidate_moves_skips_reverse_of_previous() {
        let b = board(vec![vec![Red, Green], vec![Blue, Green], vec![]]);
        let moves = candidate_moves(&b, Some(Move::new(0, 1)));
        assert!(!moves.contains(&Move::new(1, 0)));
        assert!(moves.contains(&Move::new(0, 1)));
    }

    #[test]
    fn test_candidate_moves_keeps_clean_tubes_together() {
        let b = board(vec![
            vec![Red, Red],
            vec![],
            vec![Blue, Blue, Red],
            vec![Green, Red],
        ]);
        let moves = candidate_moves(&b, None);
        assert!(!moves.contains(&Move::new(0, 1)), "clean tube into empty tube");
        assert!(!moves.contains(&Move::new(0, 2)), "no room for the whole clean tube");
        assert!(moves.contains(&Move::new(0, 3)), "whole clean tube fits");
        assert!(moves.contains(&Move::new(2, 1)), "mixed tube may use the empty tube");
    }

    #[test]
    fn test_end_to_end_generated_board() {
        let config = GameConfig::default();
        let mut generator = Generator::with_seed(config, 42);
        for _ in 0..10 {
            let b = generator.generate(Some(5)).unwrap();
            let moves = solve_bfs(&b).into_moves().expect("5-tube boards are solvable");
            assert!(!moves.is_empty());
            assert!(apply_all(&b, &moves).is_won());
        }
    }
}
