//! Timed events recorded while a participant works.
//!
//! The runner emits exactly four kinds: experiment start, page enter, task
//! start and task completed. Where they end up is the sink's business; the
//! runtime sink appends JSON lines through the recorder actor.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::route::{Location, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    ExperimentStart,
    PageEnter,
    TaskStart,
    TaskCompleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    /// Participant id.
    pub experiment: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub location: Location,
    pub context: Value,
    /// Milliseconds since the Unix epoch.
    pub time: i64,
}

impl TimedEvent {
    pub fn now(experiment: &str, event_type: EventType, route: &Route, context: Value) -> Self {
        Self {
            experiment: experiment.to_string(),
            event_type,
            location: route.location(),
            context,
            time: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Fire-and-forget destination for events.
pub trait EventSink {
    fn record(&mut self, event: TimedEvent);
}

impl EventSink for Vec<TimedEvent> {
    fn record(&mut self, event: TimedEvent) {
        self.push(event);
    }
}
