//! The participant taking part in one run.

use serde_json::json;

use crate::events::{EventSink, EventType, TimedEvent};
use crate::route::Route;
use crate::task::{sequence_for, Group, Language, LanguageSequence, TaskCatalog};
use crate::{sxlog, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentSession {
    id: String,
    group: Group,
    languages: LanguageSequence,
}

impl ExperimentSession {
    /// Build a session and check its language sequence covers every task.
    pub fn new(id: impl Into<String>, group: Group, catalog: &TaskCatalog) -> Result<Self> {
        let languages = sequence_for(group);
        catalog.check_sequence(&languages)?;
        Ok(Self {
            id: id.into(),
            group,
            languages,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn group(&self) -> Group {
        self.group
    }

    pub fn languages(&self) -> &LanguageSequence {
        &self.languages
    }

    pub fn language_for(&self, task: usize) -> Option<Language> {
        self.languages.get(task)
    }

    /// Record the start of the experiment from `route`.
    pub fn announce(&self, route: &Route, sink: &mut dyn EventSink) {
        sxlog!("Experiment start id={} group={}", self.id, self.group);
        sink.record(TimedEvent::now(
            &self.id,
            EventType::ExperimentStart,
            route,
            json!({ "group": self.group }),
        ));
    }

    pub fn page_enter(&self, route: &Route, sink: &mut dyn EventSink) {
        sink.record(TimedEvent::now(&self.id, EventType::PageEnter, route, json!({})));
    }
}
