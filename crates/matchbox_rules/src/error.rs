//! Board errors.

use derive_more::{Display, Error};

/// Error raised by board construction or cell access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum BoardError {
    /// Cell index is past the end of the board.
    #[display("Cell {} is out of range for a {}-cell board", index, len)]
    CellOutOfRange {
        /// Requested index.
        index: usize,
        /// Board length.
        len: usize,
    },

    /// Flat board string has an unsupported length.
    #[display("Board string must have 9 or 25 cells, got {}", len)]
    BadLength {
        /// Length of the input.
        len: usize,
    },

    /// Flat board string contains an unknown symbol.
    #[display("Unknown board symbol {:?}", symbol)]
    BadSymbol {
        /// The offending character.
        symbol: char,
    },

    /// Stored board does not form a 3×3 or 5×5 grid.
    #[display("Board of side {} cannot hold {} cells", side, len)]
    BadShape {
        /// Declared side length.
        side: usize,
        /// Number of cells supplied.
        len: usize,
    },
}
