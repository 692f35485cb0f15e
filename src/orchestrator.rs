//! Steps a participant through the task list.
//!
//! Each task index is either being shown or showing its completion notice.
//! Entering an index records `TASKSTART`; a view's completion callback
//! records `TASKCOMPLETED` and flips to the completion notice; "Continue"
//! yields the next route.

use serde_json::json;
use std::sync::Arc;

use crate::events::{EventSink, EventType, TimedEvent};
use crate::grid::{Cell, InputState};
use crate::route::Route;
use crate::session::ExperimentSession;
use crate::task::{Language, TaskAnswer, TaskCatalog, TaskConfig, TaskView};
use crate::{sxlog, sxlog_debug, sxlog_warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    ShowingTask(usize),
    ShowingCompletion(usize),
}

impl Phase {
    pub fn index(&self) -> usize {
        match self {
            Phase::ShowingTask(index) | Phase::ShowingCompletion(index) => *index,
        }
    }
}

#[derive(Debug)]
pub struct TaskOrchestrator {
    catalog: Arc<TaskCatalog>,
    phase: Phase,
    view: TaskView,
    language: Language,
    show_header: bool,
}

impl TaskOrchestrator {
    /// Start at `index`. Returns `None` when the index has no task.
    pub fn start(
        catalog: Arc<TaskCatalog>,
        index: usize,
        show_header: bool,
        session: &ExperimentSession,
        input: &mut InputState,
        sink: &mut dyn EventSink,
    ) -> Option<Self> {
        let config = catalog.get(index)?;
        let language = session.language_for(index)?;
        let view = TaskView::build(config, language, show_header);
        let mut orchestrator = Self {
            catalog,
            phase: Phase::ShowingTask(index),
            view,
            language,
            show_header,
        };
        orchestrator.activate(session, input, sink);
        Some(orchestrator)
    }

    /// Show task `index`, rebuilding the view even when it is the current
    /// one. Returns false when the index has no task.
    pub fn enter(
        &mut self,
        index: usize,
        session: &ExperimentSession,
        input: &mut InputState,
        sink: &mut dyn EventSink,
    ) -> bool {
        let (Some(config), Some(language)) = (self.catalog.get(index), session.language_for(index)) else {
            sxlog_warn!("No task at index {}", index);
            return false;
        };
        self.view.unmount(input);
        self.view = TaskView::build(config, language, self.show_header);
        self.language = language;
        self.phase = Phase::ShowingTask(index);
        self.activate(session, input, sink);
        true
    }

    fn activate(&mut self, session: &ExperimentSession, input: &mut InputState, sink: &mut dyn EventSink) {
        let index = self.phase.index();
        self.view.mount(input);
        sxlog!("Task {} start language={}", index, self.language);
        sink.record(TimedEvent::now(
            session.id(),
            EventType::TaskStart,
            &Route::Task(index),
            json!({ "config": self.config(), "language": self.language }),
        ));
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn index(&self) -> usize {
        self.phase.index()
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.phase, Phase::ShowingCompletion(_))
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn config(&self) -> &TaskConfig {
        // The phase index was checked against the catalog on entry.
        &self.catalog.configs()[self.phase.index()]
    }

    pub fn catalog(&self) -> &Arc<TaskCatalog> {
        &self.catalog
    }

    pub fn view(&self) -> &TaskView {
        &self.view
    }

    pub fn view_mut(&mut self) -> Option<&mut TaskView> {
        match self.phase {
            Phase::ShowingTask(_) => Some(&mut self.view),
            Phase::ShowingCompletion(_) => None,
        }
    }

    pub fn press(&mut self, cell: Cell) {
        if let Some(view) = self.view_mut() {
            view.press(cell);
        }
    }

    pub fn pointer_moved(&mut self, from: Option<Cell>, to: Option<Cell>, input: &InputState) {
        if let Some(view) = self.view_mut() {
            view.pointer_moved(from, to, input);
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.is_completed() && self.view.can_submit()
    }

    /// Submit the current view. Returns whether the task completed.
    pub fn submit(&mut self, session: &ExperimentSession, sink: &mut dyn EventSink) -> bool {
        if self.is_completed() {
            return false;
        }
        let mut submitted = None;
        self.view.submit(|answer| submitted = Some(answer));
        match submitted {
            Some(answer) => {
                self.complete(answer, session, sink);
                true
            }
            None => false,
        }
    }

    fn complete(&mut self, answer: TaskAnswer, session: &ExperimentSession, sink: &mut dyn EventSink) {
        let index = self.phase.index();
        sxlog!("Task {} completed", index);
        sink.record(TimedEvent::now(
            session.id(),
            EventType::TaskCompleted,
            &Route::Task(index),
            json!({ "solution": answer, "config": self.config() }),
        ));
        self.phase = Phase::ShowingCompletion(index);
    }

    /// "Continue" from the completion notice.
    pub fn acknowledge(&self, session: &ExperimentSession) -> Option<Route> {
        let Phase::ShowingCompletion(index) = self.phase else {
            return None;
        };
        let next = if index + 1 >= self.catalog.len() {
            Route::End(session.id().to_string())
        } else {
            Route::Task(index + 1)
        };
        sxlog_debug!("Task {} acknowledged, next {}", index, next);
        Some(next)
    }

    pub fn unmount(&mut self, input: &mut InputState) {
        self.view.unmount(input);
    }
}
