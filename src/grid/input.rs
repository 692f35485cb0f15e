//! Screen-wide pointer state shared by every mounted highlight grid.
//!
//! Press and release are tracked for the whole screen, not per cell, so a
//! drag that leaves a grid and comes back is still seen as held. Grids attach
//! on mount and detach on unmount; with nothing attached the state ignores
//! pointer traffic, the same way a page without listeners would.

#[derive(Debug, Default)]
pub struct InputState {
    pressed: bool,
    listeners: usize,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self) {
        self.listeners += 1;
    }

    pub fn detach(&mut self) {
        self.listeners = self.listeners.saturating_sub(1);
        if self.listeners == 0 {
            self.pressed = false;
        }
    }

    pub fn listeners(&self) -> usize {
        self.listeners
    }

    pub fn pointer_down(&mut self) {
        if self.listeners > 0 {
            self.pressed = true;
        }
    }

    pub fn pointer_up(&mut self) {
        self.pressed = false;
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}
