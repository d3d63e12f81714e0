use crate::engine::{Board, Color, Move};
use crate::error::{BoardParseError, ParseMoveError};

/// Parses an array of string slices into a `Board` object.
///
/// Each string slice is one tube, listing color letters from the bottom of
/// the tube to the top. A tube written as `.` (or an empty string) is empty.
///
/// Valid characters for tokens are (case-insensitive):
/// - 'R': `Color::Red`
/// - 'G': `Color::Green`
/// - 'B': `Color::Blue`
/// - 'C': `Color::Cyan`
/// - 'M': `Color::Magenta`
/// - 'Y': `Color::Yellow`
/// - 'W': `Color::White`
///
/// # Arguments
/// * `s`: One entry per tube, in tube order.
/// * `capacity`: Capacity of every tube.
///
/// # Returns
/// * `Ok(Board)` if parsing is successful.
/// * `Err(BoardParseError)` if there are no tubes, a tube is longer than
///   `capacity`, or an unrecognized character is encountered.
///
/// # Examples
/// ```
/// use color_sort::utils::board_from_str_array;
/// use color_sort::engine::Color;
///
/// let board = board_from_str_array(&["RRGB", "bgr", "."], 4).unwrap();
/// assert_eq!(board.len(), 3);
/// assert_eq!(board.tubes()[0].top(), Some(Color::Blue));
/// assert!(board.tubes()[2].is_empty());
///
/// assert!(board_from_str_array(&["RXB"], 4).is_err());
/// assert!(board_from_str_array(&["RRRRR"], 4).is_err());
/// ```
pub fn board_from_str_array(s: &[&str], capacity: usize) -> Result<Board, BoardParseError> {
    let mut stacks = Vec::with_capacity(s.len());
    for (index, row) in s.iter().enumerate() {
        let row = row.trim();
        if row == "." {
            stacks.push(Vec::new());
            continue;
        }
        let tokens = row
            .chars()
            .map(|ch| {
                Color::from_char(ch).ok_or(BoardParseError::UnknownColor {
                    color: ch,
                    tube: index + 1,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        stacks.push(tokens);
    }
    Board::from_tokens(stacks, capacity)
}

/// Parses a player's move such as `3-5`, `3,5`, `3 5` or `3 -> 5`.
///
/// The input is split on `->`, `-`, `,` and whitespace; exactly two positive
/// integers must remain. They are 1-based tube numbers and are converted to
/// 0-based indices. Whether the tubes exist is left to the move engine.
///
/// # Examples
/// ```
/// use color_sort::utils::parse_move;
/// use color_sort::engine::Move;
///
/// assert_eq!(parse_move("3 -> 5"), Ok(Move::new(2, 4)));
/// assert!(parse_move("3").is_err());
/// ```
pub fn parse_move(input: &str) -> Result<Move, ParseMoveError> {
    let normalized = input.replace("->", " ");
    let parts: Vec<&str> = normalized
        .split(|c: char| c == '-' || c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();
    if parts.len() != 2 {
        return Err(ParseMoveError::WrongArity(parts.len()));
    }

    let mut indices = [0usize; 2];
    for (slot, part) in indices.iter_mut().zip(&parts) {
        let number: usize = part
            .parse()
            .map_err(|_| ParseMoveError::NotANumber(part.to_string()))?;
        *slot = number.checked_sub(1).ok_or(ParseMoveError::ZeroIndex)?;
    }
    Ok(Move::new(indices[0], indices[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Color::*;

    #[test]
    fn test_board_from_str_array_valid() {
        let board = board_from_str_array(&["RGBC", "MYW", ".", ""], 4).unwrap();
        assert_eq!(board.len(), 4);
        assert_eq!(board.tubes()[0].tokens(), &[Red, Green, Blue, Cyan]);
        assert_eq!(board.tubes()[1].tokens(), &[Magenta, Yellow, White]);
        assert!(board.tubes()[2].is_empty());
        assert!(board.tubes()[3].is_empty());
    }

    #[test]
    fn test_board_from_str_array_invalid_char() {
        let result = board_from_str_array(&["RG", "RX"], 4);
        assert_eq!(
            result.unwrap_err(),
            BoardParseError::UnknownColor { color: 'X', tube: 2 }
        );
    }

    #[test]
    fn test_board_from_str_array_with_spaces() {
        let result = board_from_str_array(&["R G"], 4);
        assert_eq!(
            result.unwrap_err(),
            BoardParseError::UnknownColor { color: ' ', tube: 1 }
        );
    }

    #[test]
    fn test_board_from_str_array_too_long() {
        let result = board_from_str_array(&["RRRRR"], 4);
        assert!(matches!(
            result,
            Err(BoardParseError::TubeOverCapacity { tube: 1, len: 5, capacity: 4 })
        ));
    }

    #[test]
    fn test_board_from_str_array_empty_input() {
        let board_str: [&str; 0] = [];
        assert_eq!(
            board_from_str_array(&board_str, 4).unwrap_err(),
            BoardParseError::Empty
        );
    }

    #[test]
    fn test_board_text_roundtrip() {
        let board = board_from_str_array(&["RGGB", ".", "WW"], 4).unwrap();
        let text = board.to_text();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(board_from_str_array(&rows, 4).unwrap(), board);
    }

    #[test]
    fn test_parse_move_accepted_formats() {
        for input in ["3-5", "3,5", "3 5", "3 -> 5", "3->5", "  3 ,  5 ", "3\t5", "3-->5"] {
            assert_eq!(parse_move(input), Ok(Move::new(2, 4)), "input {:?}", input);
        }
        assert_eq!(parse_move("10 1"), Ok(Move::new(9, 0)));
    }

    #[test]
    fn test_parse_move_rejects_bad_input() {
        assert_eq!(parse_move(""), Err(ParseMoveError::WrongArity(0)));
        assert_eq!(parse_move("3"), Err(ParseMoveError::WrongArity(1)));
        assert_eq!(parse_move("1 2 3"), Err(ParseMoveError::WrongArity(3)));
        assert_eq!(
            parse_move("a-b"),
            Err(ParseMoveError::NotANumber("a".to_string()))
        );
        assert_eq!(
            parse_move("1.5 2"),
            Err(ParseMoveError::NotANumber("1.5".to_string()))
        );
        assert_eq!(parse_move("0-2"), Err(ParseMoveError::ZeroIndex));
    }
}
