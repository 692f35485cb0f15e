//! Per-task screens. A view collects a candidate answer and hands it to a
//! completion callback on submit; it never judges correctness.

use serde::{Deserialize, Serialize};

use super::config::{CodeTemplate, TaskConfig, TaskPayload};
use super::language::Language;
use crate::grid::{Cell, CellRange, Discard, HighlightGrid, InputState};
use crate::sxlog_debug;

/// What a participant submitted: highlighted cells for a read task, typed
/// text for a write task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskAnswer {
    Cells(Vec<Cell>),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct ReadView {
    language: Language,
    code: String,
    grid: HighlightGrid,
    /// `None` until the grid reports its first change.
    candidate: Option<Vec<Cell>>,
}

impl ReadView {
    pub fn new(language: Language, code: String, rows: usize, cols: usize, show_header: bool) -> Self {
        Self {
            language,
            code,
            grid: HighlightGrid::editable(rows, cols).with_header(show_header),
            candidate: None,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn grid(&self) -> &HighlightGrid {
        &self.grid
    }

    pub fn candidate(&self) -> Option<&[Cell]> {
        self.candidate.as_deref()
    }

    pub fn press(&mut self, cell: Cell) {
        let candidate = &mut self.candidate;
        self.grid
            .press(cell, &mut |cells: &[Cell]| *candidate = Some(cells.to_vec()));
    }

    pub fn pointer_moved(&mut self, from: Option<Cell>, to: Option<Cell>, input: &InputState) {
        let candidate = &mut self.candidate;
        self.grid.pointer_moved(from, to, input, &mut |cells: &[Cell]| {
            *candidate = Some(cells.to_vec())
        });
    }

    /// An emptied selection counts once the grid has been touched.
    pub fn can_submit(&self) -> bool {
        self.candidate.is_some()
    }

    /// Hand the selection to `on_complete`. Returns whether it fired.
    pub fn submit(&self, on_complete: impl FnOnce(TaskAnswer)) -> bool {
        match &self.candidate {
            Some(cells) => {
                on_complete(TaskAnswer::Cells(cells.clone()));
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WriteView {
    language: Language,
    template: CodeTemplate,
    grid: HighlightGrid,
    highlighted: Vec<Cell>,
    answer: String,
}

impl WriteView {
    pub fn new(
        language: Language,
        template: CodeTemplate,
        rows: usize,
        cols: usize,
        target: CellRange,
        show_header: bool,
    ) -> Self {
        let mut highlighted = Vec::new();
        let grid = HighlightGrid::fixed(rows, cols, target, &mut |cells: &[Cell]| {
            highlighted = cells.to_vec()
        })
        .with_header(show_header);
        Self {
            language,
            template,
            grid,
            highlighted,
            answer: String::new(),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn template(&self) -> &CodeTemplate {
        &self.template
    }

    pub fn grid(&self) -> &HighlightGrid {
        &self.grid
    }

    /// Cells the fixed grid reported when it was populated.
    pub fn highlighted(&self) -> &[Cell] {
        &self.highlighted
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn input_char(&mut self, c: char) {
        if !c.is_control() {
            self.answer.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.answer.pop();
    }

    pub fn can_submit(&self) -> bool {
        !self.answer.is_empty()
    }

    pub fn submit(&self, on_complete: impl FnOnce(TaskAnswer)) -> bool {
        if !self.can_submit() {
            return false;
        }
        on_complete(TaskAnswer::Text(self.answer.clone()));
        true
    }
}

#[derive(Debug, Clone)]
pub enum TaskView {
    Read(ReadView),
    Write(WriteView),
}

impl TaskView {
    pub fn build(config: &TaskConfig, language: Language, show_header: bool) -> Self {
        let (rows, cols) = (config.table.row_count(), config.table.col_count());
        sxlog_debug!("TaskView::build kind={:?} language={} {}x{}", config.kind(), language, rows, cols);
        match &config.payload {
            TaskPayload::Read(read) => TaskView::Read(ReadView::new(
                language,
                read.code.get(language).clone(),
                rows,
                cols,
                show_header,
            )),
            TaskPayload::Write(write) => TaskView::Write(WriteView::new(
                language,
                write.template.get(language).clone(),
                rows,
                cols,
                write.target,
                show_header,
            )),
        }
    }

    pub fn grid(&self) -> &HighlightGrid {
        match self {
            TaskView::Read(view) => view.grid(),
            TaskView::Write(view) => view.grid(),
        }
    }

    pub fn mount(&mut self, input: &mut InputState) {
        match self {
            TaskView::Read(view) => view.grid.mount(input),
            TaskView::Write(view) => view.grid.mount(input),
        }
    }

    pub fn unmount(&mut self, input: &mut InputState) {
        match self {
            TaskView::Read(view) => view.grid.unmount(input),
            TaskView::Write(view) => view.grid.unmount(input),
        }
    }

    pub fn press(&mut self, cell: Cell) {
        match self {
            TaskView::Read(view) => view.press(cell),
            // Fixed grids ignore pointer input.
            TaskView::Write(view) => {
                view.grid.press(cell, &mut Discard);
            }
        }
    }

    pub fn pointer_moved(&mut self, from: Option<Cell>, to: Option<Cell>, input: &InputState) {
        if let TaskView::Read(view) = self {
            view.pointer_moved(from, to, input);
        }
    }

    pub fn can_submit(&self) -> bool {
        match self {
            TaskView::Read(view) => view.can_submit(),
            TaskView::Write(view) => view.can_submit(),
        }
    }

    pub fn submit(&self, on_complete: impl FnOnce(TaskAnswer)) -> bool {
        match self {
            TaskView::Read(view) => view.submit(on_complete),
            TaskView::Write(view) => view.submit(on_complete),
        }
    }
}
