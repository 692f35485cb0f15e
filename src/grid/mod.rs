//! Interactive cell highlighting over a rectangular table.
//!
//! A grid is either editable (the participant toggles cells with presses and
//! drags) or fixed (the selection is a rectangle supplied by the caller and
//! pointer input never changes it). Every change to the selection is reported
//! synchronously to a [`SelectionSink`], including the initial population of
//! a fixed grid.
//!
//! Drag semantics while the pointer is held:
//! - entering a cell toggles it, leaving a cell toggles it;
//! - a move straight from one cell to a neighbour is a leave followed by an
//!   enter, and the enter wins, so a stroke over A, B, C toggles exactly those;
//! - dragging off the grid toggles the cell that was left;
//! - crossing the same cell twice toggles it twice.

pub mod cell;
pub mod input;

use std::collections::BTreeSet;

pub use cell::{Cell, CellRange};
pub use input::InputState;

use crate::sxlog_trace;

/// Receives the full selection after every change.
pub trait SelectionSink {
    fn selection_changed(&mut self, cells: &[Cell]);
}

impl<F: FnMut(&[Cell])> SelectionSink for F {
    fn selection_changed(&mut self, cells: &[Cell]) {
        self(cells)
    }
}

/// Sink for callers that only read the selection back from the grid.
pub struct Discard;

impl SelectionSink for Discard {
    fn selection_changed(&mut self, _cells: &[Cell]) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridMode {
    Editable,
    Fixed(CellRange),
}

#[derive(Debug, Clone)]
pub struct HighlightGrid {
    rows: usize,
    cols: usize,
    mode: GridMode,
    selected: BTreeSet<Cell>,
    show_header: bool,
    mounted: bool,
}

impl HighlightGrid {
    /// An editable grid with nothing selected. No report is made until the
    /// first toggle.
    pub fn editable(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            mode: GridMode::Editable,
            selected: BTreeSet::new(),
            show_header: false,
            mounted: false,
        }
    }

    /// A fixed grid showing `range`. The populated selection is reported
    /// before this returns. Cells of `range` outside the table are dropped.
    pub fn fixed(rows: usize, cols: usize, range: CellRange, sink: &mut impl SelectionSink) -> Self {
        let mut grid = Self {
            rows,
            cols,
            mode: GridMode::Fixed(range),
            selected: BTreeSet::new(),
            show_header: false,
            mounted: false,
        };
        grid.populate(range, sink);
        grid
    }

    pub fn with_header(mut self, show_header: bool) -> Self {
        self.show_header = show_header;
        self
    }

    /// Replace the rectangle of a fixed grid. Ignored for editable grids.
    pub fn set_range(&mut self, range: CellRange, sink: &mut impl SelectionSink) {
        if let GridMode::Fixed(current) = self.mode {
            if current != range {
                self.mode = GridMode::Fixed(range);
                self.populate(range, sink);
            }
        }
    }

    fn populate(&mut self, range: CellRange, sink: &mut impl SelectionSink) {
        self.selected = range.cells().filter(|c| self.in_bounds(*c)).collect();
        self.report(sink);
    }

    pub fn mount(&mut self, input: &mut InputState) {
        if !self.mounted {
            input.attach();
            self.mounted = true;
        }
    }

    pub fn unmount(&mut self, input: &mut InputState) {
        if self.mounted {
            input.detach();
            self.mounted = false;
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn mode(&self) -> GridMode {
        self.mode
    }

    pub fn is_editable(&self) -> bool {
        self.mode == GridMode::Editable
    }

    pub fn show_header(&self) -> bool {
        self.show_header
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    pub fn is_selected(&self, cell: Cell) -> bool {
        self.selected.contains(&cell)
    }

    /// Current selection in row-major order.
    pub fn selection(&self) -> Vec<Cell> {
        self.selected.iter().copied().collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Pointer pressed on `cell`. Returns whether the selection changed.
    pub fn press(&mut self, cell: Cell, sink: &mut impl SelectionSink) -> bool {
        self.toggle(cell, sink)
    }

    pub fn enter(&mut self, cell: Cell, input: &InputState, sink: &mut impl SelectionSink) -> bool {
        if !input.is_pressed() {
            return false;
        }
        self.toggle(cell, sink)
    }

    pub fn leave(&mut self, cell: Cell, input: &InputState, sink: &mut impl SelectionSink) -> bool {
        if !input.is_pressed() {
            return false;
        }
        self.toggle(cell, sink)
    }

    /// Pointer moved from `from` to `to`, either of which may be off the grid.
    pub fn pointer_moved(
        &mut self,
        from: Option<Cell>,
        to: Option<Cell>,
        input: &InputState,
        sink: &mut impl SelectionSink,
    ) -> bool {
        if from == to {
            return false;
        }
        match (from, to) {
            (Some(_), Some(entered)) => self.enter(entered, input, sink),
            (Some(left), None) => self.leave(left, input, sink),
            (None, Some(entered)) => self.enter(entered, input, sink),
            (None, None) => false,
        }
    }

    fn toggle(&mut self, cell: Cell, sink: &mut impl SelectionSink) -> bool {
        if !self.is_editable() || !self.in_bounds(cell) {
            return false;
        }
        if !self.selected.remove(&cell) {
            self.selected.insert(cell);
        }
        sxlog_trace!("grid toggle {} selected={}", cell, self.selected.len());
        self.report(sink);
        true
    }

    fn report(&self, sink: &mut impl SelectionSink) {
        sink.selection_changed(&self.selection());
    }
}
