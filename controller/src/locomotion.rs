//! Locomotion state machine: stance, running, pause and freeze.
//!
//! Target speed and collider height are derived from the flags on every call,
//! never accumulated, so any sequence of transitions lands on exact values.

use crate::settings::MovementSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stance {
    #[default]
    Standing,
    Crouching,
}

/// Locomotion flags. Mutated only through the transition methods.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocomotionState {
    stance: Stance,
    running: bool,
    paused: bool,
    frozen: bool,
    stand_up_requested: bool,
}

impl LocomotionState {
    pub fn stance(&self) -> Stance {
        self.stance
    }

    pub fn is_crouching(&self) -> bool {
        self.stance == Stance::Crouching
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn stand_up_requested(&self) -> bool {
        self.stand_up_requested
    }

    pub fn can_run(&self) -> bool {
        !self.is_crouching() && !self.paused
    }

    pub fn can_crouch(&self) -> bool {
        !self.running && !self.paused
    }

    /// Speed cap for the current state.
    pub fn target_speed(&self, settings: &MovementSettings) -> f32 {
        if self.is_crouching() {
            settings.crouch_speed()
        } else if self.running {
            settings.run_speed()
        } else {
            settings.walk_speed
        }
    }

    /// Collider height for the current stance.
    pub fn collider_height(&self, settings: &MovementSettings) -> f32 {
        match self.stance {
            Stance::Standing => settings.height,
            Stance::Crouching => settings.crouch_height(),
        }
    }

    pub fn start_running(&mut self) -> bool {
        if !self.can_run() {
            return false;
        }
        self.running = true;
        true
    }

    pub fn stop_running(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        true
    }

    /// Enter the crouch. Returns `true` when the stance changed.
    ///
    /// Crouching again while already down only cancels a pending stand-up.
    pub fn crouch_down(&mut self) -> bool {
        if !self.can_crouch() {
            return false;
        }
        self.stand_up_requested = false;
        if self.is_crouching() {
            return false;
        }
        self.stance = Stance::Crouching;
        true
    }

    /// Ask to stand. Granted later by [`Self::finish_stand_up`] once there is headroom.
    pub fn crouch_up(&mut self) -> bool {
        if !self.is_crouching() {
            return false;
        }
        self.stand_up_requested = true;
        true
    }

    /// Complete a requested stand-up.
    pub fn finish_stand_up(&mut self) -> bool {
        if !self.is_crouching() || !self.stand_up_requested {
            return false;
        }
        self.stance = Stance::Standing;
        self.stand_up_requested = false;
        true
    }

    /// Set the pause flag. Returns `true` when the caller unpaused a frozen body.
    pub fn set_paused(&mut self, paused: bool) -> bool {
        self.paused = paused;
        !paused && self.frozen
    }

    /// Freezing also pauses; thawing also unpauses.
    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
        self.paused = frozen;
    }
}
