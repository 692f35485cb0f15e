//! Messages for the TEA (The Elm Architecture) pattern.
//!
//! Messages come from the terminal (keys, mouse, resize) or from background
//! work reporting back (event recording, identity persistence).

use crossterm::event::{KeyEvent, MouseEvent};

/// Input messages to the update function.
#[derive(Debug)]
pub enum Message {
    // Terminal events
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),

    // From the recorder actor
    EventRecordFailed(String),

    // Identity persistence
    IdentitySaved,
    IdentitySaveFailed(String),
}
