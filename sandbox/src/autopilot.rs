//! Seeded random driver standing in for a player.
//!
//! Input comes in "legs": every few seconds a new direction, turn rate and
//! gait are rolled. Same seed, same run.

use bevy::prelude::*;
use fp_controller::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Movement directions a leg can pick. Forward is weighted up.
const LEG_AXES: [Vec2; 8] = [
    Vec2::new(0.0, 1.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(-1.0, 0.0),
    Vec2::new(0.0, -1.0),
    Vec2::new(0.7, 0.7),
    Vec2::ZERO,
];

#[derive(Component)]
pub struct Autopilot {
    rng: StdRng,
    /// Seconds left in the current leg.
    remaining: f32,
    axes: Vec2,
    /// Yaw rate in degrees per second.
    turn_rate: f32,
    running: bool,
    crouching: bool,
}

impl Autopilot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            remaining: 0.0,
            axes: Vec2::ZERO,
            turn_rate: 0.0,
            running: false,
            crouching: false,
        }
    }

    /// Advance by `dt`, writing into `input`. Returns `true` when a new leg started.
    pub fn advance(&mut self, dt: f32, input: &mut ControllerInput) -> bool {
        self.remaining -= dt;
        let new_leg = self.remaining <= 0.0;
        if new_leg {
            self.roll_leg(input);
        }
        input.axes = self.axes;
        input.add_look(Vec2::new(self.turn_rate * dt, 0.0));
        new_leg
    }

    fn roll_leg(&mut self, input: &mut ControllerInput) {
        self.remaining = self.rng.gen_range(1.0..3.0);
        self.axes = LEG_AXES.choose(&mut self.rng).copied().unwrap_or(Vec2::ZERO);
        self.turn_rate = self.rng.gen_range(-45.0..45.0);

        let crouch = self.rng.gen_bool(0.15);
        if crouch && !self.crouching {
            if self.running {
                input.push(ControllerAction::StopRunning);
                self.running = false;
            }
            input.push(ControllerAction::CrouchDown);
            self.crouching = true;
        } else if !crouch && self.crouching {
            input.push(ControllerAction::CrouchUp);
            self.crouching = false;
        }

        let run = !self.crouching && self.rng.gen_bool(0.3);
        if run != self.running {
            input.push(if run {
                ControllerAction::StartRunning
            } else {
                ControllerAction::StopRunning
            });
            self.running = run;
        }

        if self.rng.gen_bool(0.25) {
            input.push(ControllerAction::Jump);
        }
    }
}

/// Fixed-tick input for every autopiloted controller.
pub fn drive_autopilot(time: Res<Time>, mut query: Query<(&mut Autopilot, &mut ControllerInput)>) {
    let dt = time.delta_secs();
    for (mut autopilot, mut input) in query.iter_mut() {
        if autopilot.advance(dt, &mut input) {
            debug!(
                "Autopilot leg: axes {:?}, turn {:.0} deg/s, running {}, crouching {}",
                autopilot.axes, autopilot.turn_rate, autopilot.running, autopilot.crouching
            );
        }
    }
}
