//! Buffered controller input.
//!
//! Whatever produces input (keyboard, autopilot, replay) writes here; the
//! controller systems drain it on their own schedule.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Discrete controller commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerAction {
    Jump,
    CrouchDown,
    CrouchUp,
    StartRunning,
    StopRunning,
    Pause(bool),
    Freeze(bool),
}

/// Per-entity input buffer.
#[derive(Component, Debug, Clone)]
pub struct ControllerInput {
    /// Strafe (x) and forward (y) axes.
    pub axes: Vec2,
    /// Clamp each axis to [-1, 1] before use.
    pub clamp: bool,
    /// Accumulated look delta in degrees (x = yaw right, y = pitch up).
    pub look: Vec2,
    actions: Vec<ControllerAction>,
}

impl Default for ControllerInput {
    fn default() -> Self {
        Self {
            axes: Vec2::ZERO,
            clamp: true,
            look: Vec2::ZERO,
            actions: Vec::new(),
        }
    }
}

impl ControllerInput {
    pub fn push(&mut self, action: ControllerAction) {
        self.actions.push(action);
    }

    pub fn add_look(&mut self, delta: Vec2) {
        if delta.is_finite() {
            self.look += delta;
        }
    }

    /// Take the buffered actions in arrival order.
    pub fn drain_actions(&mut self) -> Vec<ControllerAction> {
        std::mem::take(&mut self.actions)
    }

    pub fn take_look(&mut self) -> Vec2 {
        std::mem::take(&mut self.look)
    }
}
