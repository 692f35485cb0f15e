//! Actor system for background tasks.
//!
//! Each actor is an independent tokio task that communicates with the logic
//! thread via message passing. The only actor today is the event recorder.
//!
//! NOTE: Keyboard and mouse input are handled synchronously in the logic
//! thread, not via an actor, for minimum latency.

pub mod recorder;

use tokio_util::sync::CancellationToken;

pub use recorder::{EventRecorderActor, RecorderHandle};

/// Handle to a running actor, used for graceful shutdown.
pub struct ActorHandle {
    cancel: CancellationToken,
}

impl ActorHandle {
    /// Create a new actor handle with a cancellation token.
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Signal the actor to shut down.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Check if shutdown has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
