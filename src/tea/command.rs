//! Commands for the TEA (The Elm Architecture) pattern.
//!
//! Commands are outputs from the update function - side effects the runtime
//! executes without blocking the update loop.

use crate::events::TimedEvent;
use crate::route::Route;
use crate::task::Group;

#[derive(Debug)]
pub enum Command {
    /// Append an event to the event log.
    Record(TimedEvent),

    /// Persist who the participant is and where they are.
    SaveIdentity {
        id: String,
        group: Group,
        route: Route,
    },

    Quit,
}
