//! Pure update function for the TEA (The Elm Architecture) pattern.
//!
//! The update function takes a model and a message, mutates the model,
//! and returns a list of commands to execute. Recorded events leave as
//! `Command::Record` in the order they happened.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use std::sync::Arc;

use crate::events::{EventSink, TimedEvent};
use crate::identity::Resume;
use crate::orchestrator::TaskOrchestrator;
use crate::route::Route;
use crate::session::ExperimentSession;
use crate::task::TaskView;
use crate::{sxlog, sxlog_debug, sxlog_error, sxlog_warn};

use super::command::Command;
use super::message::Message;
use super::model::{MetadataForm, Model, Notification, NotificationLevel};

const MAX_ID_LEN: usize = 32;

/// Event sink that turns every event into a `Command::Record`.
struct Outbox<'a>(&'a mut Vec<Command>);

impl EventSink for Outbox<'_> {
    fn record(&mut self, event: TimedEvent) {
        self.0.push(Command::Record(event));
    }
}

/// Helper to set an error notification and mark model as dirty.
fn set_error(model: &mut Model, message: String) {
    sxlog_warn!("UI Error: {}", message);
    model.notification = Some(Notification {
        level: NotificationLevel::Error,
        message,
    });
    model.dirty = true;
}

/// Pure update function: Model + Message → Commands
///
/// All I/O happens via returned Commands.
pub fn update(model: &mut Model, msg: Message) -> Vec<Command> {
    let mut cmds = Vec::new();

    match msg {
        Message::Key(key) => {
            if key.kind != KeyEventKind::Press {
                return cmds;
            }
            model.notification = None; // Clear notification on any key press
            model.dirty = true;
            update_key(model, key, &mut cmds);
        }

        Message::Mouse(mouse) => update_mouse(model, mouse),

        Message::Resize(width, height) => {
            model.area.width = width;
            model.area.height = height;
            model.dirty = true;
        }

        Message::EventRecordFailed(err) => {
            sxlog_error!("Message::EventRecordFailed err={}", err);
            set_error(model, format!("Could not record event: {}", err));
        }

        Message::IdentitySaved => {
            sxlog_debug!("Message::IdentitySaved route={}", model.route);
        }

        Message::IdentitySaveFailed(err) => {
            set_error(model, format!("Could not save participant identity: {}", err));
        }
    }

    cmds
}

/// Pick up a restored session. The restored route is shown without a page
/// enter event; a task route starts its task again.
pub fn resume(model: &mut Model, resume: Resume) -> Vec<Command> {
    let mut cmds = Vec::new();
    let Resume { session, route } = resume;
    sxlog!("Resuming id={} group={}", session.id(), session.group());

    model.metadata = MetadataForm {
        id: session.id().to_string(),
        group: session.group(),
    };
    model.session = Some(session);
    model.route = route.unwrap_or(Route::Metadata);
    model.dirty = true;

    if let Route::Task(index) = model.route {
        enter_task(model, index, &mut cmds);
    }
    cmds
}

fn update_key(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        cmds.push(Command::Quit);
        return;
    }
    // Chorded characters are shortcuts, never text.
    if matches!(key.code, KeyCode::Char(_))
        && key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        sxlog_debug!("Ignoring chorded key {:?} {:?}", key.modifiers, key.code);
        return;
    }

    match model.route {
        Route::Metadata => update_metadata(model, key, cmds),
        Route::Consent => match key.code {
            KeyCode::Char(' ') => model.consent = !model.consent,
            KeyCode::Enter if model.consent => navigate(model, Route::Preparation, cmds),
            KeyCode::Enter => set_error(model, "Please accept the consent form to continue".to_string()),
            _ => {}
        },
        Route::Preparation => match key.code {
            KeyCode::Char(c) if !c.is_control() => model.password.push(c),
            KeyCode::Backspace => {
                model.password.pop();
            }
            KeyCode::Enter if model.password_ok() => navigate(model, Route::Task(0), cmds),
            KeyCode::Enter => set_error(model, "Wrong password".to_string()),
            _ => {}
        },
        Route::Task(_) => update_task(model, key, cmds),
        Route::End(_) => {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Enter | KeyCode::Esc) {
                cmds.push(Command::Quit);
            }
        }
    }
}

fn update_metadata(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    match key.code {
        KeyCode::Char(c) if !c.is_control() && !c.is_whitespace() => {
            if model.metadata.id.chars().count() < MAX_ID_LEN {
                model.metadata.id.push(c);
            }
        }
        KeyCode::Backspace => {
            model.metadata.id.pop();
        }
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
            model.metadata.group = model.metadata.group.other();
        }
        KeyCode::Esc => cmds.push(Command::Quit),
        KeyCode::Enter => start_experiment(model, cmds),
        _ => {}
    }
}

fn start_experiment(model: &mut Model, cmds: &mut Vec<Command>) {
    let id = model.metadata.id.trim().to_string();
    if id.is_empty() {
        set_error(model, "Participant id is required".to_string());
        return;
    }

    match ExperimentSession::new(id, model.metadata.group, &model.catalog) {
        Ok(session) => {
            session.announce(&Route::Metadata, &mut Outbox(cmds));
            model.session = Some(session);
            model.consent = false;
            model.password.clear();
            navigate(model, Route::Consent, cmds);
        }
        Err(e) => set_error(model, format!("Could not start experiment: {}", e)),
    }
}

fn update_task(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    let Some(orchestrator) = model.orchestrator.as_mut() else {
        return;
    };

    if orchestrator.is_completed() {
        if key.code == KeyCode::Enter {
            let next = model.session.as_ref().and_then(|s| orchestrator.acknowledge(s));
            if let Some(route) = next {
                navigate(model, route, cmds);
            }
        }
        return;
    }

    match key.code {
        KeyCode::Enter => {
            let Some(session) = model.session.as_ref() else {
                return;
            };
            if !orchestrator.submit(session, &mut Outbox(cmds)) {
                sxlog_debug!("Submit ignored on {}", model.route);
            }
        }
        KeyCode::Backspace => {
            if let Some(TaskView::Write(view)) = orchestrator.view_mut() {
                view.backspace();
            }
        }
        KeyCode::Char(c) => {
            if let Some(TaskView::Write(view)) = orchestrator.view_mut() {
                view.input_char(c);
            }
        }
        _ => {}
    }
}

fn update_mouse(model: &mut Model, mouse: MouseEvent) {
    let hit = model
        .grid_geometry()
        .and_then(|geometry| geometry.cell_at(mouse.column, mouse.row));

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            model.input.pointer_down();
            if let (Some(cell), Some(orchestrator)) = (hit, model.orchestrator.as_mut()) {
                orchestrator.press(cell);
            }
            model.hover = hit;
            model.dirty = true;
        }
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            if hit == model.hover {
                return;
            }
            if let Some(orchestrator) = model.orchestrator.as_mut() {
                orchestrator.pointer_moved(model.hover, hit, &model.input);
            }
            model.hover = hit;
            model.dirty = true;
        }
        MouseEventKind::Up(MouseButton::Left) => {
            model.input.pointer_up();
            model.hover = hit;
        }
        _ => {}
    }
}

/// Move to `route`: leave the task page if needed, record the page enter,
/// persist the position and start the task when `route` is one.
fn navigate(model: &mut Model, route: Route, cmds: &mut Vec<Command>) {
    sxlog_debug!("navigate {} -> {}", model.route, route);
    if route.task_index().is_none() {
        if let Some(mut orchestrator) = model.orchestrator.take() {
            orchestrator.unmount(&mut model.input);
        }
        model.hover = None;
    }
    model.route = route.clone();
    model.dirty = true;

    let Some(session) = model.session.as_ref() else {
        return;
    };
    session.page_enter(&route, &mut Outbox(cmds));
    cmds.push(Command::SaveIdentity {
        id: session.id().to_string(),
        group: session.group(),
        route: route.clone(),
    });

    if let Route::Task(index) = route {
        enter_task(model, index, cmds);
    }
}

fn enter_task(model: &mut Model, index: usize, cmds: &mut Vec<Command>) {
    let Some(session) = model.session.as_ref() else {
        return;
    };
    let mut outbox = Outbox(cmds);
    let entered = match model.orchestrator.as_mut() {
        Some(orchestrator) => orchestrator.enter(index, session, &mut model.input, &mut outbox),
        None => match TaskOrchestrator::start(
            Arc::clone(&model.catalog),
            index,
            model.config.show_header,
            session,
            &mut model.input,
            &mut outbox,
        ) {
            Some(orchestrator) => {
                model.orchestrator = Some(orchestrator);
                true
            }
            None => false,
        },
    };
    model.hover = None;
    if !entered {
        set_error(model, format!("There is no task {}", index));
    }
}
