use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Sender;
use crossterm::event::{self, Event};
use ratatui::layout::Rect;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::actors::{EventRecorderActor, RecorderHandle};
use crate::config::Config;
use crate::identity::{self, FileIdentityStore};
use crate::render::RenderState;
use crate::task::TaskCatalog;
use crate::tea::update::resume;
use crate::tea::{update, Command, Message, Model};
use crate::{sxlog, sxlog_debug, sxlog_error, Result};

const MAX_BG_MESSAGES: usize = 50;

pub struct LogicThread;

impl LogicThread {
    pub fn run(
        config: Config,
        catalog: Arc<TaskCatalog>,
        state_tx: Sender<RenderState>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        Runtime::new()?.block_on(Self::run_async(config, catalog, state_tx, shutdown))
    }

    async fn run_async(
        config: Config,
        catalog: Arc<TaskCatalog>,
        state_tx: Sender<RenderState>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        let events_path = config.events_path()?;
        let identity_path = Config::identity_path()?;
        sxlog_debug!(
            "LogicThread::run_async events={} identity={}",
            events_path.display(),
            identity_path.display()
        );

        let (width, height) = crossterm::terminal::size()?;
        let model = Model::new(config, catalog, Rect::new(0, 0, width, height));

        let (msg_tx, msg_rx) = mpsc::unbounded_channel::<Message>();
        let recorder = EventRecorderActor::new(msg_tx.clone(), events_path).spawn();

        let logic = Logic {
            model,
            msg_tx,
            msg_rx,
            recorder,
            identity_path,
        };
        logic.run(&state_tx, &shutdown, read_terminal_event).await
    }
}

/// Next pending terminal event, without waiting.
fn read_terminal_event() -> io::Result<Option<Event>> {
    if event::poll(Duration::ZERO)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

/// Everything the logic loop owns between frames.
struct Logic {
    model: Model,
    msg_tx: mpsc::UnboundedSender<Message>,
    msg_rx: mpsc::UnboundedReceiver<Message>,
    recorder: RecorderHandle,
    identity_path: PathBuf,
}

impl Logic {
    /// Drive the model until quit, shutdown or an input error. The recorder
    /// is closed on every exit so queued events reach the log.
    async fn run(
        mut self,
        state_tx: &Sender<RenderState>,
        shutdown: &AtomicBool,
        mut next_event: impl FnMut() -> io::Result<Option<Event>>,
    ) -> Result<()> {
        let restored = identity::restore(&FileIdentityStore::new(&self.identity_path), &self.model.catalog);
        if let Some(restored) = restored {
            let cmds = resume(&mut self.model, restored);
            self.execute_all(cmds).await;
        }
        publish_state(state_tx, &mut self.model);

        let result = self.drive(state_tx, shutdown, &mut next_event).await;
        if let Err(ref e) = result {
            sxlog_error!("Logic loop stopped: {}", e);
        }
        shutdown.store(true, Ordering::Relaxed);
        self.recorder.close().await;
        result
    }

    async fn drive(
        &mut self,
        state_tx: &Sender<RenderState>,
        shutdown: &AtomicBool,
        next_event: &mut impl FnMut() -> io::Result<Option<Event>>,
    ) -> Result<()> {
        loop {
            if shutdown.load(Ordering::Relaxed) {
                return Ok(());
            }

            // Terminal input (priority)
            while let Some(event) = next_event()? {
                let msg = match event {
                    Event::Key(key) => Message::Key(key),
                    Event::Mouse(mouse) => Message::Mouse(mouse),
                    Event::Resize(width, height) => Message::Resize(width, height),
                    _ => continue,
                };

                let cmds = update(&mut self.model, msg);
                if self.execute_all(cmds).await {
                    return Ok(());
                }
                publish_state(state_tx, &mut self.model);
            }

            // Background messages (bounded)
            for _ in 0..MAX_BG_MESSAGES {
                let Ok(msg) = self.msg_rx.try_recv() else { break };
                let cmds = update(&mut self.model, msg);
                if self.execute_all(cmds).await {
                    return Ok(());
                }
            }

            publish_state(state_tx, &mut self.model);
            tokio::time::sleep(Duration::from_micros(500)).await;
        }
    }

    /// Returns true when a command asked to quit.
    async fn execute_all(&self, cmds: Vec<Command>) -> bool {
        for cmd in cmds {
            if execute_command(cmd, &self.msg_tx, &self.recorder, &self.identity_path).await {
                return true;
            }
        }
        false
    }
}

/// Run one command. Returns true when the runner should quit.
async fn execute_command(
    cmd: Command,
    msg_tx: &mpsc::UnboundedSender<Message>,
    recorder: &RecorderHandle,
    identity_path: &Path,
) -> bool {
    match cmd {
        Command::Record(event) => {
            sxlog_debug!(
                "Command::Record type={:?} path={}",
                event.event_type,
                event.location.pathname
            );
            if !recorder.record(event) {
                let _ = msg_tx.send(Message::EventRecordFailed(
                    "event recorder is not running".to_string(),
                ));
            }
        }

        Command::SaveIdentity { id, group, route } => {
            sxlog_debug!("Command::SaveIdentity id={} route={}", id, route);
            // Saved in order, so the last navigation wins on disk.
            let path = identity_path.to_path_buf();
            let result = crate::util::blocking(move || {
                identity::persist(&mut FileIdentityStore::new(path), &id, group, &route)
            })
            .await;
            let msg = match result {
                Ok(()) => Message::IdentitySaved,
                Err(e) => {
                    sxlog_error!("Identity save failed: {}", e);
                    Message::IdentitySaveFailed(e.to_string())
                }
            };
            let _ = msg_tx.send(msg);
        }

        Command::Quit => {
            sxlog!("Command::Quit");
            return true;
        }
    }

    false
}

/// Offer a snapshot of a dirty model to the render thread. While the
/// previous snapshot is still queued the model stays dirty and is offered
/// again on the next pass.
fn publish_state(state_tx: &Sender<RenderState>, model: &mut Model) {
    if model.dirty && state_tx.try_send(model.snapshot()).is_ok() {
        model.dirty = false;
    }
}
