//! Offline analysis of a recorded event log.
//!
//! Reads the JSON lines the recorder appends and derives, per participant and
//! task, how long the task took and how well read tasks were answered.
//! Write-task answers are only normalized; scoring them needs the Jayvee and
//! Python toolchains.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use crate::events::{EventType, TimedEvent};
use crate::grid::Cell;
use crate::task::{Group, Language, TaskAnswer, TaskCatalog, TaskPayload};
use crate::{sxlog_debug, sxlog_warn, Result};

#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<TimedEvent>,
    skipped: usize,
}

impl EventLog {
    /// Parse JSON lines. Lines that are not events are skipped and counted.
    pub fn parse(text: &str) -> Self {
        let mut log = Self::default();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<TimedEvent>(line) {
                Ok(event) => log.events.push(event),
                Err(e) => {
                    sxlog_warn!("Skipping event line {}: {}", number + 1, e);
                    log.skipped += 1;
                }
            }
        }
        log
    }

    pub fn load(path: &Path) -> Result<Self> {
        sxlog_debug!("EventLog::load {}", path.display());
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    pub fn from_events(events: Vec<TimedEvent>) -> Self {
        Self { events, skipped: 0 }
    }

    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Participant ids in order of first appearance.
    pub fn participants(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.events
            .iter()
            .map(|e| e.experiment.as_str())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    fn first(&self, id: &str, event_type: EventType, task: Option<usize>) -> Option<&TimedEvent> {
        self.events.iter().find(|e| {
            e.experiment == id
                && e.event_type == event_type
                && task.map_or(true, |t| e.location.task_index() == Some(t))
        })
    }

    /// Group from the participant's first `EXPERIMENTSTART`.
    pub fn group(&self, id: &str) -> Option<Group> {
        self.first(id, EventType::ExperimentStart, None)?
            .context
            .get("group")?
            .as_str()?
            .parse()
            .ok()
    }

    /// Seconds between the first start and the first completion of `task`.
    pub fn task_duration_secs(&self, id: &str, task: usize) -> Option<f64> {
        let start = self.first(id, EventType::TaskStart, Some(task))?;
        let finish = self.first(id, EventType::TaskCompleted, Some(task))?;
        Some((finish.time - start.time) as f64 / 1000.0)
    }

    pub fn task_solution(&self, id: &str, task: usize) -> Option<TaskAnswer> {
        let finish = self.first(id, EventType::TaskCompleted, Some(task))?;
        serde_json::from_value(finish.context.get("solution")?.clone()).ok()
    }
}

/// Jaccard index of two cell sets; 0.0 when both are empty.
pub fn jaccard(a: &BTreeSet<Cell>, b: &BTreeSet<Cell>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Correctness of a read task answer. `None` for write tasks and for tasks
/// the participant never completed.
pub fn read_correctness(log: &EventLog, catalog: &TaskCatalog, id: &str, task: usize) -> Option<f64> {
    let TaskPayload::Read(read) = &catalog.get(task)?.payload else {
        return None;
    };
    let expected: BTreeSet<Cell> = read.expected.map(|r| r.cells().collect()).unwrap_or_default();
    let submitted: BTreeSet<Cell> = match log.task_solution(id, task)? {
        TaskAnswer::Cells(cells) => cells.into_iter().collect(),
        TaskAnswer::Text(_) => BTreeSet::new(),
    };
    Some(jaccard(&expected, &submitted))
}

/// `df.iloc[...]` wrapper around a pandas index expression
static ILOC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"df\d*\.iloc\[(.*?)\]").unwrap());

/// Property prefix of a Jayvee range selector
static SELECT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"select:\s*range\s+").unwrap());

/// Strip the parts of the template participants commonly retype.
pub fn normalize_write_answer(language: Language, answer: &str) -> String {
    let answer = answer.trim();
    match language {
        Language::Py => ILOC_RE.replace_all(answer, "$1").trim().to_string(),
        Language::Jv => {
            let answer = answer.trim_end_matches(';');
            SELECT_RE.replace_all(answer, "").trim().to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSummary {
    pub task: usize,
    pub language: Option<Language>,
    pub duration_secs: Option<f64>,
    pub correctness: Option<f64>,
    /// Normalized text for write tasks.
    pub answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantSummary {
    pub id: String,
    pub group: Option<Group>,
    pub tasks: Vec<TaskSummary>,
}

pub fn summarize(log: &EventLog, catalog: &TaskCatalog) -> Vec<ParticipantSummary> {
    log.participants()
        .into_iter()
        .map(|id| {
            let group = log.group(id);
            let languages = group.map(crate::task::sequence_for);
            let tasks = (0..catalog.len())
                .map(|task| {
                    let language = languages.as_ref().and_then(|l| l.get(task));
                    let answer = match (log.task_solution(id, task), language) {
                        (Some(TaskAnswer::Text(text)), Some(language)) => {
                            Some(normalize_write_answer(language, &text))
                        }
                        _ => None,
                    };
                    TaskSummary {
                        task,
                        language,
                        duration_secs: log.task_duration_secs(id, task),
                        correctness: read_correctness(log, catalog, id, task),
                        answer,
                    }
                })
                .collect();
            ParticipantSummary {
                id: id.to_string(),
                group,
                tasks,
            }
        })
        .collect()
}

fn opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Plain-text table, one row per participant and task.
pub fn render(summaries: &[ParticipantSummary]) -> String {
    let mut out = String::from("participant\tgroup\ttask\tlanguage\tseconds\tcorrectness\tanswer\n");
    for summary in summaries {
        for task in &summary.tasks {
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                summary.id,
                opt(summary.group.map(|g| g.as_str())),
                task.task,
                opt(task.language.map(|l| l.tag())),
                opt(task.duration_secs.map(|s| format!("{s:.1}"))),
                opt(task.correctness.map(|c| format!("{c:.3}"))),
                opt(task.answer.as_deref()),
            ));
        }
    }
    out
}
