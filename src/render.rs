use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::grid::Cell;
use crate::task::{CodeTemplate, Group, Language, Table, TaskKind};
use crate::tea::Notification;

/// Table plus the cells to draw highlighted.
#[derive(Debug, Clone)]
pub struct GridView {
    pub table: Arc<Table>,
    pub selected: BTreeSet<Cell>,
    pub show_header: bool,
}

#[derive(Debug, Clone)]
pub enum TaskBody {
    Read { code: String },
    Write { template: CodeTemplate, answer: String },
}

#[derive(Debug, Clone)]
pub struct TaskScreen {
    pub index: usize,
    pub total: usize,
    pub language: Language,
    pub kind: TaskKind,
    pub completed: bool,
    pub can_submit: bool,
    pub body: TaskBody,
    pub grid: GridView,
}

#[derive(Debug, Clone)]
pub enum PageView {
    Metadata { id: String, group: Group },
    Consent { accepted: bool },
    Preparation { password: String, unlocked: bool },
    Task(Box<TaskScreen>),
    End { id: String },
}

/// Render thread frame budget (60fps).
pub const FRAME_DURATION: Duration = Duration::from_micros(16_666);

// Starts at 1 so no snapshot shares the default state's version.
static VERSION_COUNTER: AtomicU64 = AtomicU64::new(1);

pub fn next_version() -> u64 {
    VERSION_COUNTER.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
pub struct RenderState {
    pub version: u64,
    /// Current path, shown in the title line.
    pub path: String,
    pub page: PageView,
    pub notification: Option<Notification>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            version: 0,
            path: "/".to_string(),
            page: PageView::Metadata {
                id: String::new(),
                group: Group::AB,
            },
            notification: None,
        }
    }
}
