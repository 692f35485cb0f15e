//! Test fixtures for integration tests.
//!
//! Provides helpers for:
//! - Driving the model with synthetic key and mouse events
//! - Executing commands against in-memory stores
//! - Building selection paths over task grids

use std::sync::Arc;

use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use syntaxlab::config::Config;
use syntaxlab::events::{EventType, TimedEvent};
use syntaxlab::grid::{Cell, CellRange};
use syntaxlab::identity::{self, MemoryIdentityStore};
use syntaxlab::orchestrator::TaskOrchestrator;
use syntaxlab::task::{Group, Language, TaskCatalog, TaskPayload};
use syntaxlab::tea::{update, Command, Message, Model};

/// A typical terminal; both study tables fit whole next to the code pane.
pub const TERMINAL: Rect = Rect {
    x: 0,
    y: 0,
    width: 160,
    height: 40,
};

/// A model plus everything its commands touched.
pub struct Harness {
    pub model: Model,
    /// Events in the order the runner recorded them.
    pub events: Vec<TimedEvent>,
    pub store: MemoryIdentityStore,
    pub quit: bool,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_catalog(TaskCatalog::builtin().expect("Bundled catalog loads"))
    }

    pub fn with_catalog(catalog: TaskCatalog) -> Self {
        Self::with_store(catalog, MemoryIdentityStore::default())
    }

    /// A fresh runner over an existing identity store, as after a restart.
    pub fn with_store(catalog: TaskCatalog, store: MemoryIdentityStore) -> Self {
        Self {
            model: Model::new(Config::default(), Arc::new(catalog), TERMINAL),
            events: Vec::new(),
            store,
            quit: false,
        }
    }

    pub fn send(&mut self, msg: Message) {
        let cmds = update(&mut self.model, msg);
        self.run(cmds);
    }

    pub fn run(&mut self, cmds: Vec<Command>) {
        for cmd in cmds {
            match cmd {
                Command::Record(event) => self.events.push(event),
                Command::SaveIdentity { id, group, route } => {
                    identity::persist(&mut self.store, &id, group, &route)
                        .expect("Memory store never fails");
                }
                Command::Quit => self.quit = true,
            }
        }
    }

    pub fn key(&mut self, code: KeyCode) {
        self.send(Message::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    pub fn enter(&mut self) {
        self.key(KeyCode::Enter);
    }

    pub fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.key(KeyCode::Char(c));
        }
    }

    /// Fill in the metadata page and submit it.
    pub fn start(&mut self, id: &str, group: Group) {
        while !self.model.metadata.id.is_empty() {
            self.key(KeyCode::Backspace);
        }
        self.type_text(id);
        if self.model.metadata.group != group {
            self.key(KeyCode::Tab);
        }
        self.enter();
    }

    /// Accept consent and type the task password, landing on task 0.
    pub fn unlock(&mut self) {
        self.key(KeyCode::Char(' '));
        self.enter();
        self.type_text("made24");
        self.enter();
    }

    pub fn mouse(&mut self, kind: MouseEventKind, cell: Cell) {
        let msg = mouse_at(&self.model, kind, cell);
        self.send(msg);
    }

    pub fn click(&mut self, cell: Cell) {
        self.mouse(MouseEventKind::Down(MouseButton::Left), cell);
        self.mouse(MouseEventKind::Up(MouseButton::Left), cell);
    }

    /// Press on the first cell, drag through the rest, release on the last.
    pub fn drag(&mut self, path: &[Cell]) {
        let Some((first, rest)) = path.split_first() else {
            return;
        };
        self.mouse(MouseEventKind::Down(MouseButton::Left), *first);
        for cell in rest {
            self.mouse(MouseEventKind::Drag(MouseButton::Left), *cell);
        }
        let last = path.last().copied().unwrap_or(*first);
        self.mouse(MouseEventKind::Up(MouseButton::Left), last);
    }

    pub fn orchestrator(&self) -> &TaskOrchestrator {
        self.model
            .orchestrator
            .as_ref()
            .expect("A task page is showing")
    }

    pub fn events_of(&self, event_type: EventType) -> Vec<&TimedEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Answer the current task correctly, submit, and continue.
    pub fn solve_current_task(&mut self) {
        let orchestrator = self.orchestrator();
        let language = orchestrator.language();
        match orchestrator.config().payload.clone() {
            TaskPayload::Write(_) => self.type_text(write_answer(language)),
            TaskPayload::Read(read) => match read.expected {
                Some(range) => self.drag(&snake(range)),
                // Touch without selecting: press the same cell twice.
                None => {
                    self.click(Cell::new(0, 0));
                    self.click(Cell::new(0, 0));
                }
            },
        }
        self.enter();
        assert!(self.orchestrator().is_completed(), "Task should complete");
        self.enter();
    }
}

/// The answer typed for every write task in `language`.
pub fn write_answer(language: Language) -> &'static str {
    match language {
        Language::Jv => "select: range A2:K4;",
        Language::Py => "df.iloc[1:4, :]",
    }
}

pub fn mouse_at(model: &Model, kind: MouseEventKind, cell: Cell) -> Message {
    let (column, row) = model
        .grid_geometry()
        .and_then(|g| g.cell_origin(cell))
        .expect("Cell is rendered");
    Message::Mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

/// Boustrophedon walk over a rectangle: every cell once, each step to a
/// neighbouring cell.
pub fn snake(range: CellRange) -> Vec<Cell> {
    let (start, end) = (range.start(), range.end());
    let mut path = Vec::with_capacity(range.len());
    for (i, row) in (start.row..=end.row).enumerate() {
        let cols: Vec<usize> = (start.col..=end.col).collect();
        if i % 2 == 0 {
            path.extend(cols.into_iter().map(|col| Cell::new(row, col)));
        } else {
            path.extend(cols.into_iter().rev().map(|col| Cell::new(row, col)));
        }
    }
    path
}
