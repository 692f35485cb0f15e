//! Model for the TEA (The Elm Architecture) pattern.
//!
//! The Model is pure application state - no channels, no handles, no runtime infrastructure.

use ratatui::layout::Rect;
use std::sync::Arc;

use crate::config::Config;
use crate::grid::{Cell, InputState};
use crate::orchestrator::TaskOrchestrator;
use crate::render::{next_version, GridView, PageView, RenderState, TaskBody, TaskScreen};
use crate::route::Route;
use crate::session::ExperimentSession;
use crate::task::{Group, TaskCatalog, TaskView};
use crate::ui::{self, GridGeometry};

/// Level of a notification message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Error notification - displayed in red with "Error:" prefix
    Error,
    /// Informational notification - displayed in green
    Info,
}

/// A notification message to display to the participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Participant id and group as typed on the metadata page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataForm {
    pub id: String,
    pub group: Group,
}

impl MetadataForm {
    /// Prefilled with a short random id.
    pub fn generated() -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string();
        Self {
            id: id[..8].to_string(),
            group: Group::AB,
        }
    }
}

/// Pure application state - the single source of truth.
pub struct Model {
    pub route: Route,
    pub session: Option<ExperimentSession>,

    // Page-local input
    pub metadata: MetadataForm,
    pub consent: bool,
    pub password: String,

    // Task page
    pub orchestrator: Option<TaskOrchestrator>,
    pub input: InputState,
    /// Grid cell under the pointer, `None` when off the grid.
    pub hover: Option<Cell>,

    /// Terminal area, needed to map mouse positions to grid cells.
    pub area: Rect,
    pub notification: Option<Notification>,

    // Dirty flag - set when state changes and render is needed
    pub dirty: bool,

    // Immutable after init
    pub config: Config,
    pub catalog: Arc<TaskCatalog>,
}

impl Model {
    pub fn new(config: Config, catalog: Arc<TaskCatalog>, area: Rect) -> Self {
        Self {
            route: Route::Metadata,
            session: None,
            metadata: MetadataForm::generated(),
            consent: false,
            password: String::new(),
            orchestrator: None,
            input: InputState::new(),
            hover: None,
            area,
            notification: None,
            dirty: true,
            config,
            catalog,
        }
    }

    pub fn password_ok(&self) -> bool {
        self.password.to_lowercase() == self.config.effective_password().to_lowercase()
    }

    /// Layout of the highlight grid on screen, when one is shown.
    pub fn grid_geometry(&self) -> Option<GridGeometry> {
        let orchestrator = self.orchestrator.as_ref()?;
        if !matches!(self.route, Route::Task(_)) || orchestrator.is_completed() {
            return None;
        }
        let config = orchestrator.config();
        Some(ui::task_grid_geometry(
            self.area,
            config.kind(),
            &config.table,
            self.config.show_header,
        ))
    }

    /// Create an immutable snapshot for the render thread.
    ///
    /// Each snapshot gets a monotonically increasing version number so the
    /// render thread can skip redundant frames.
    pub fn snapshot(&self) -> RenderState {
        let page = match (&self.route, &self.orchestrator) {
            (Route::Consent, _) => PageView::Consent {
                accepted: self.consent,
            },
            (Route::Preparation, _) => PageView::Preparation {
                password: self.password.clone(),
                unlocked: self.password_ok(),
            },
            (Route::Task(_), Some(orchestrator)) => PageView::Task(Box::new(self.task_screen(orchestrator))),
            (Route::End(id), _) => PageView::End { id: id.clone() },
            _ => PageView::Metadata {
                id: self.metadata.id.clone(),
                group: self.metadata.group,
            },
        };

        RenderState {
            version: next_version(),
            path: self.route.path(),
            page,
            notification: self.notification.clone(),
        }
    }

    fn task_screen(&self, orchestrator: &TaskOrchestrator) -> TaskScreen {
        let config = orchestrator.config();
        let view = orchestrator.view();
        let body = match view {
            TaskView::Read(read) => TaskBody::Read {
                code: read.code().to_string(),
            },
            TaskView::Write(write) => TaskBody::Write {
                template: write.template().clone(),
                answer: write.answer().to_string(),
            },
        };
        TaskScreen {
            index: orchestrator.index(),
            total: self.catalog.len(),
            language: orchestrator.language(),
            kind: config.kind(),
            completed: orchestrator.is_completed(),
            can_submit: orchestrator.can_submit(),
            body,
            grid: GridView {
                table: config.table.clone(),
                selected: view.grid().selection().into_iter().collect(),
                show_header: self.config.show_header,
            },
        }
    }
}
