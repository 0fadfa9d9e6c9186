//! Core domain types shared by every board variant.

use crate::error::BoardError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// A player's symbol.
///
/// `X` is mark-A (participant index 0, moves first); `O` is mark-B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    /// Mark-A, placed by the first mover.
    X,
    /// Mark-B, placed by the second mover.
    O,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    /// Participant index that plays this mark.
    pub fn index(self) -> usize {
        match self {
            Mark::X => 0,
            Mark::O => 1,
        }
    }

    /// Mark played by the participant at `index` (0 or 1).
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Mark::X),
            1 => Some(Mark::O),
            _ => None,
        }
    }

    /// Lowercase side label used on the wire (`"x"` / `"o"`).
    pub fn side(self) -> &'static str {
        match self {
            Mark::X => "x",
            Mark::O => "o",
        }
    }
}

/// A cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Empty cell.
    Empty,
    /// Cell holding a mark.
    Occupied(Mark),
}

/// Board/rule variant.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Variant {
    /// Standard 3×3 win/draw rules.
    Classic,
    /// 3×3 with a decaying move history.
    Erase,
    /// 5×5 with continuous 3-in-line scoring and a 5-in-line instant win.
    Experimental,
}

impl Variant {
    /// Side length of this variant's square grid.
    pub fn side(self) -> usize {
        match self {
            Variant::Classic | Variant::Erase => 3,
            Variant::Experimental => 5,
        }
    }

    /// Number of cells on this variant's board.
    pub fn cell_count(self) -> usize {
        self.side() * self.side()
    }
}

/// Square grid of cells in row-major order.
///
/// The length is fixed at creation (9 or 25) and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBoard")]
pub struct Board {
    side: usize,
    cells: Vec<Cell>,
}

/// Unchecked serialized form of [`Board`].
#[derive(Deserialize)]
struct RawBoard {
    side: usize,
    cells: Vec<Cell>,
}

impl TryFrom<RawBoard> for Board {
    type Error = BoardError;

    fn try_from(raw: RawBoard) -> Result<Self, Self::Error> {
        let len = raw.cells.len();
        if !matches!(raw.side, 3 | 5) || len != raw.side * raw.side {
            return Err(BoardError::BadShape {
                side: raw.side,
                len,
            });
        }
        Ok(Self {
            side: raw.side,
            cells: raw.cells,
        })
    }
}

impl Board {
    /// Creates an empty board for the given variant.
    #[instrument]
    pub fn new(variant: Variant) -> Self {
        Self::with_side(variant.side())
    }

    /// Creates an empty 3×3 board.
    pub fn classic() -> Self {
        Self::with_side(3)
    }

    /// Creates an empty 5×5 board.
    pub fn experimental() -> Self {
        Self::with_side(5)
    }

    fn with_side(side: usize) -> Self {
        Self {
            side,
            cells: vec![Cell::Empty; side * side],
        }
    }

    /// Side length of the grid.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; boards have at least nine cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Gets the cell at `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Mark at `index`, if any.
    pub fn mark_at(&self, index: usize) -> Option<Mark> {
        match self.get(index) {
            Some(Cell::Occupied(mark)) => Some(mark),
            _ => None,
        }
    }

    /// True when `index` is in range and empty.
    pub fn is_vacant(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Cell::Empty))
    }

    /// Writes `cell` at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::CellOutOfRange`] when `index` is past the end.
    pub fn set(&mut self, index: usize, cell: Cell) -> Result<(), BoardError> {
        let len = self.cells.len();
        let slot = self
            .cells
            .get_mut(index)
            .ok_or(BoardError::CellOutOfRange { index, len })?;
        *slot = cell;
        Ok(())
    }

    /// Places `mark` at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::CellOutOfRange`] when `index` is past the end.
    pub fn place(&mut self, index: usize, mark: Mark) -> Result<(), BoardError> {
        self.set(index, Cell::Occupied(mark))
    }

    /// Empties the cell at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::CellOutOfRange`] when `index` is past the end.
    pub fn clear(&mut self, index: usize) -> Result<(), BoardError> {
        self.set(index, Cell::Empty)
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Indices of empty cells, ascending.
    pub fn vacant_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Cell::Empty)
            .map(|(index, _)| index)
    }

    /// True when no empty cell remains.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| *cell != Cell::Empty)
    }

    /// Number of cells holding `mark`.
    pub fn count(&self, mark: Mark) -> usize {
        self.cells
            .iter()
            .filter(|cell| **cell == Cell::Occupied(mark))
            .count()
    }

    /// Flat wire form, one entry per cell (`"x"`, `"o"` or `" "`).
    pub fn to_flat(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|cell| match cell {
                Cell::Empty => " ".to_string(),
                Cell::Occupied(Mark::X) => "x".to_string(),
                Cell::Occupied(Mark::O) => "o".to_string(),
            })
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::classic()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (row, chunk) in self.cells.chunks(self.side).enumerate() {
            if row > 0 {
                let rule = vec!["-"; self.side].join("+");
                writeln!(f)?;
                writeln!(f, "{}", rule)?;
            }
            let symbols: Vec<&str> = chunk
                .iter()
                .map(|cell| match cell {
                    Cell::Empty => " ",
                    Cell::Occupied(Mark::X) => "X",
                    Cell::Occupied(Mark::O) => "O",
                })
                .collect();
            write!(f, "{}", symbols.join("|"))?;
        }
        Ok(())
    }
}

/// Parses a flat board string: 9 or 25 characters, `X`/`O` in either case,
/// and a space, `.` or `_` for an empty cell.
impl FromStr for Board {
    type Err = BoardError;

    #[instrument]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        let side = match chars.len() {
            9 => 3,
            25 => 5,
            len => return Err(BoardError::BadLength { len }),
        };
        let cells = chars
            .into_iter()
            .map(|c| match c {
                'x' | 'X' => Ok(Cell::Occupied(Mark::X)),
                'o' | 'O' => Ok(Cell::Occupied(Mark::O)),
                ' ' | '.' | '_' => Ok(Cell::Empty),
                other => Err(BoardError::BadSymbol { symbol: other }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { side, cells })
    }
}

/// Result of evaluating a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// No winner yet and moves remain (or the variant never draws).
    InProgress,
    /// The mark completed a winning line.
    Won(Mark),
    /// Board is full with no winner.
    Draw,
}

impl Outcome {
    /// True for any outcome other than [`Outcome::InProgress`].
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }

    /// The winning mark, if any.
    pub fn winner(self) -> Option<Mark> {
        match self {
            Outcome::Won(mark) => Some(mark),
            _ => None,
        }
    }

    /// Status label used on the wire.
    pub fn label(self) -> &'static str {
        match self {
            Outcome::InProgress => "in_progress",
            Outcome::Won(Mark::X) => "x_wins",
            Outcome::Won(Mark::O) => "o_wins",
            Outcome::Draw => "draw",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_length_fixed_by_variant() {
        assert_eq!(Board::new(Variant::Classic).len(), 9);
        assert_eq!(Board::new(Variant::Erase).len(), 9);
        assert_eq!(Board::new(Variant::Experimental).len(), 25);
    }

    #[test]
    fn test_place_out_of_range_rejected() {
        let mut board = Board::classic();
        assert_eq!(
            board.place(9, Mark::X),
            Err(BoardError::CellOutOfRange { index: 9, len: 9 })
        );
        assert_eq!(board.len(), 9);
    }

    #[test]
    fn test_parse_flat_board() {
        let board: Board = "XX OO    ".parse().expect("valid board");
        assert_eq!(board.mark_at(0), Some(Mark::X));
        assert_eq!(board.mark_at(3), Some(Mark::O));
        assert!(board.is_vacant(2));
        assert_eq!(board.vacant_cells().collect::<Vec<_>>(), vec![2, 5, 6, 7, 8]);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!("XO".parse::<Board>(), Err(BoardError::BadLength { len: 2 })));
        assert!(matches!(
            "XXQOO    ".parse::<Board>(),
            Err(BoardError::BadSymbol { symbol: 'Q' })
        ));
    }

    #[test]
    fn test_display_grid() {
        let board: Board = "X O  O  X".parse().expect("valid board");
        assert_eq!(board.to_string(), "X| |O\n-+-+-\n | |O\n-+-+-\n | |X");
    }

    #[test]
    fn test_variant_parses_case_insensitively() {
        assert_eq!("Classic".parse::<Variant>(), Ok(Variant::Classic));
        assert_eq!("experimental".parse::<Variant>(), Ok(Variant::Experimental));
        assert_eq!(Variant::Erase.to_string(), "erase");
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::Won(Mark::X).label(), "x_wins");
        assert_eq!(Outcome::Won(Mark::O).label(), "o_wins");
        assert_eq!(Outcome::Draw.label(), "draw");
        assert_eq!(Outcome::InProgress.label(), "in_progress");
    }

    #[test]
    fn test_deserialize_rejects_malformed_board() {
        let good = serde_json::to_string(&Board::classic()).expect("serializable");
        let back: Board = serde_json::from_str(&good).expect("well-formed board");
        assert_eq!(back, Board::classic());

        let short = r#"{"side":3,"cells":["Empty","Empty"]}"#;
        let err = serde_json::from_str::<Board>(short).unwrap_err();
        assert!(err.to_string().contains("cannot hold 2 cells"));

        let odd_side = r#"{"side":1,"cells":["Empty"]}"#;
        assert!(serde_json::from_str::<Board>(odd_side).is_err());
    }
}
