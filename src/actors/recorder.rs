//! Recorder actor appending timed events to the event log.

use std::path::PathBuf;
use std::time::Duration;

use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::events::TimedEvent;
use crate::tea::Message;
use crate::{sxlog_debug, sxlog_error, sxlog_trace};

use super::ActorHandle;

const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Actor that writes each event as one JSON line, in arrival order.
///
/// The file is opened on the first event and reopened after a failed
/// write, so a log that was unavailable once is tried again next time.
pub struct EventRecorderActor {
    msg_tx: mpsc::UnboundedSender<Message>,
    path: PathBuf,
}

/// Sending side of a running recorder.
pub struct RecorderHandle {
    tx: mpsc::UnboundedSender<TimedEvent>,
    actor: ActorHandle,
    task: JoinHandle<()>,
}

impl RecorderHandle {
    /// Queue an event. Returns false once the recorder has stopped.
    pub fn record(&self, event: TimedEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Stop accepting events and wait for queued ones to be written.
    pub async fn close(self) {
        let RecorderHandle { tx, actor, task } = self;
        drop(tx);
        if tokio::time::timeout(CLOSE_TIMEOUT, task).await.is_err() {
            sxlog_error!("EventRecorderActor did not drain within {:?}", CLOSE_TIMEOUT);
            actor.shutdown();
        }
    }

    pub fn shutdown(&self) {
        self.actor.shutdown();
    }
}

impl EventRecorderActor {
    pub fn new(msg_tx: mpsc::UnboundedSender<Message>, path: impl Into<PathBuf>) -> Self {
        Self {
            msg_tx,
            path: path.into(),
        }
    }

    pub fn spawn(self) -> RecorderHandle {
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();
        let (tx, mut rx) = mpsc::unbounded_channel::<TimedEvent>();

        sxlog_debug!("EventRecorderActor::spawn path={}", self.path.display());

        let task = tokio::spawn(async move {
            let mut file: Option<File> = None;

            loop {
                tokio::select! {
                    _ = cancel_clone.cancelled() => {
                        sxlog_debug!("EventRecorderActor cancelled");
                        break;
                    }
                    event = rx.recv() => {
                        let Some(event) = event else {
                            sxlog_debug!("EventRecorderActor: event channel closed");
                            break;
                        };
                        if let Err(e) = self.write(&mut file, &event).await {
                            sxlog_error!("EventRecorderActor: write failed: {}", e);
                            file = None;
                            let _ = self.msg_tx.send(Message::EventRecordFailed(e.to_string()));
                        }
                    }
                }
            }
        });

        RecorderHandle {
            tx,
            actor: ActorHandle::new(cancel),
            task,
        }
    }

    async fn write(&self, file: &mut Option<File>, event: &TimedEvent) -> crate::Result<()> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        if file.is_none() {
            *file = Some(self.open().await?);
        }
        if let Some(f) = file.as_mut() {
            f.write_all(line.as_bytes()).await?;
            f.flush().await?;
            sxlog_trace!("EventRecorderActor: wrote {:?}", event.event_type);
        }
        Ok(())
    }

    async fn open(&self) -> crate::Result<File> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?)
    }
}
