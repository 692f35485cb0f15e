pub mod config;
pub mod error;
pub mod events;
pub mod grid;
pub mod identity;
pub mod log;
pub mod orchestrator;
pub mod report;
pub mod route;
pub mod session;
pub mod task;
pub mod util;

// Decoupled game loop architecture
pub mod actors;
pub mod app;
pub mod render;
pub mod tea;
pub mod ui;

pub use error::{Error, Result};
