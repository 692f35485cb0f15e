//! Integration test suite for syntaxlab.
//!
//! These tests drive the runner through its public API the way the logic
//! thread does: synthetic crossterm events go through `update`, and the
//! returned commands are executed against in-memory stores.
//!
//! # Test Categories
//!
//! - `experiment_flow`: a participant from metadata entry to the end page
//! - `resume`: restarting the runner mid-experiment
//! - `event_log`: recorded events on disk and the offline report

mod fixtures;

mod event_log;
mod experiment_flow;
mod resume;
