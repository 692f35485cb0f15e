//! Cell coordinates and inclusive rectangles over a table.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// A (row, column) coordinate. Serializes as `[row, col]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "[usize; 2]", into = "[usize; 2]")]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<[usize; 2]> for Cell {
    fn from([row, col]: [usize; 2]) -> Self {
        Self { row, col }
    }
}

impl From<Cell> for [usize; 2] {
    fn from(cell: Cell) -> Self {
        [cell.row, cell.col]
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Inclusive rectangle between two corners, `start <= end` componentwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellRange {
    start: Cell,
    end: Cell,
}

impl CellRange {
    pub fn new(start: Cell, end: Cell) -> Result<Self> {
        if start.row > end.row || start.col > end.col {
            return Err(Error::InvalidRange(format!("{start}-{end}")));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn end(&self) -> Cell {
        self.end
    }

    pub fn rows(&self) -> usize {
        self.end.row - self.start.row + 1
    }

    pub fn cols(&self) -> usize {
        self.end.col - self.start.col + 1
    }

    pub fn len(&self) -> usize {
        self.rows() * self.cols()
    }

    /// Never true: a range always covers at least its start corner.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (self.start.row..=self.end.row).contains(&cell.row)
            && (self.start.col..=self.end.col).contains(&cell.col)
    }

    /// Whether the whole range fits inside a `rows` x `cols` table.
    pub fn fits(&self, rows: usize, cols: usize) -> bool {
        self.end.row < rows && self.end.col < cols
    }

    /// Row-major expansion of every covered cell.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (self.start.row..=self.end.row)
            .flat_map(move |row| (self.start.col..=self.end.col).map(move |col| Cell::new(row, col)))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
