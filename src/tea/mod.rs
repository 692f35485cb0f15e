//! The Elm Architecture (TEA) implementation for the experiment runner.
//!
//! - `Model`: participant-facing state (route, session, current task)
//! - `Message`: terminal input and background completions
//! - `Command`: side effects (record an event, persist identity, quit)
//! - `update`: the only place the model changes

pub mod command;
pub mod message;
pub mod model;
pub mod update;

pub use command::Command;
pub use message::Message;
pub use model::{MetadataForm, Model, Notification, NotificationLevel};
pub use update::update;
