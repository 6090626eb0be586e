//! Force integration: turns the held 2D input into a horizontal velocity
//! change each physics tick.
//!
//! Planar local vectors use `x` = strafe right, `y` = forward. In world space
//! forward is -Z (Bevy convention).
//!
//! - Ground control: instant response. The target is the scaled input; no input
//!   means braking to a standstill.
//! - Air control: momentum-preserving. New input is blended in at reduced
//!   authority and undriven axes decay toward zero.

use bevy::prelude::*;

use crate::friction::{self, FrictionDecision};
use crate::ground::GroundInfo;
use crate::physics::PhysicsBody;
use crate::settings::MovementSettings;

/// Grounded force below this squared length counts as no take-off momentum.
pub const MOMENTUM_EPSILON: f32 = 1e-6;

/// Keep only the yaw of a rotation.
pub fn yaw_only(rotation: Quat) -> Quat {
    let (yaw, _, _) = rotation.to_euler(EulerRot::YXZ);
    if yaw.is_finite() {
        Quat::from_rotation_y(yaw)
    } else {
        Quat::IDENTITY
    }
}

/// Planar local vector to world space.
#[inline]
pub fn to_world(yaw: Quat, local: Vec2) -> Vec3 {
    yaw * Vec3::new(local.x, 0.0, -local.y)
}

/// World vector to planar local space (vertical part dropped).
#[inline]
pub fn to_local(yaw: Quat, world: Vec3) -> Vec2 {
    let local = yaw.inverse() * world;
    Vec2::new(local.x, -local.z)
}

#[inline]
fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Force history used to keep air control continuous.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionMemory {
    /// Force applied last tick, planar local space.
    pub previous_force: Vec2,
    /// Force carried into the air from the last grounded tick, if the body was moving.
    pub ground_momentum: Option<Vec2>,
}

impl MotionMemory {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn record_grounded(&mut self) {
        self.ground_momentum = (self.previous_force.length_squared() > MOMENTUM_EPSILON)
            .then_some(self.previous_force);
    }
}

/// Air steering for one tick. `input` is already scaled by target speed.
pub fn air_control(
    memory: &MotionMemory,
    input: Vec2,
    target_speed: f32,
    settings: &MovementSettings,
    dt: f32,
) -> Vec2 {
    let mut force = match memory.ground_momentum {
        // Took off from a standstill: steer with the raw input.
        None => input,
        Some(momentum) => {
            let blended = memory.previous_force + input * settings.air_input_scale;
            // Forward momentum can be bled off but never reversed mid-air.
            let (min_forward, max_forward) = if momentum.y > 0.0 {
                (0.0, target_speed)
            } else {
                (-target_speed, 0.0)
            };
            Vec2::new(
                blended.x.clamp(-target_speed, target_speed),
                blended.y.clamp(min_forward, max_forward),
            )
        }
    };

    let decay = (settings.air_decay_rate * dt).clamp(0.0, 1.0);
    if input.x == 0.0 {
        force.x *= 1.0 - decay;
    }
    if input.y == 0.0 {
        force.y *= 1.0 - decay;
    }
    force
}

/// Horizontal velocity change that moves `velocity` onto `force`, both capped at `target_speed`.
pub fn velocity_change(force: Vec3, velocity: Vec3, target_speed: f32) -> Vec3 {
    let velocity = if velocity.is_finite() {
        horizontal(velocity)
    } else {
        Vec3::ZERO
    };
    let change =
        horizontal(force).clamp_length_max(target_speed) - velocity.clamp_length_max(target_speed);
    horizontal(change)
}

/// Remove the velocity component along the surface normal.
pub fn stick_to_ground(velocity: Vec3, normal: Vec3) -> Vec3 {
    let normal = normal.normalize_or_zero();
    if normal == Vec3::ZERO {
        return velocity;
    }
    velocity - normal * velocity.dot(normal)
}

/// Everything one integration tick decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationReport {
    /// Force target in world space.
    pub force: Vec3,
    /// Horizontal velocity change applied.
    pub change: Vec3,
    pub friction: FrictionDecision,
    pub stuck_to_ground: bool,
}

/// Per-tick inputs to [`integrate`].
#[derive(Debug, Clone, Copy)]
pub struct IntegrationInput {
    /// Held input, each axis in [-1, 1] unless the caller opted out of clamping.
    pub raw_input: Vec2,
    pub target_speed: f32,
    pub ground: GroundInfo,
    /// Leave the normal velocity alone this tick (a jump was just applied).
    pub skip_stick: bool,
    pub dt: f32,
}

/// Run one physics tick of force integration against `body`.
pub fn integrate<B: PhysicsBody + ?Sized>(
    body: &mut B,
    memory: &mut MotionMemory,
    settings: &MovementSettings,
    tick: IntegrationInput,
) -> IntegrationReport {
    let yaw = yaw_only(body.rotation());
    let input = tick.raw_input * tick.target_speed;

    let force = if tick.ground.grounded {
        memory.record_grounded();
        to_world(yaw, input)
    } else {
        to_world(
            yaw,
            air_control(memory, input, tick.target_speed, settings, tick.dt),
        )
    };

    let change = velocity_change(force, body.velocity(), tick.target_speed);
    if change != Vec3::ZERO {
        body.add_velocity_change(change);
    }

    let has_input = tick.raw_input != Vec2::ZERO;
    let friction = friction::apply(body, &tick.ground, has_input, settings);

    let stuck_to_ground = !tick.skip_stick && tick.ground.walkable(settings.max_slope_angle);
    if stuck_to_ground {
        let velocity = stick_to_ground(body.velocity(), tick.ground.normal);
        body.set_velocity(velocity);
    }

    memory.previous_force = to_local(yaw, force);

    IntegrationReport {
        force,
        change,
        friction,
        stuck_to_ground,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_world_round_trip() {
        let yaw = Quat::from_rotation_y(0.7);
        let local = Vec2::new(1.5, -2.0);
        let back = to_local(yaw, to_world(yaw, local));
        assert!((back - local).length() < 1e-5);
    }

    #[test]
    fn test_forward_is_negative_z() {
        let world = to_world(Quat::IDENTITY, Vec2::new(0.0, 1.0));
        assert!((world - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_yaw_only_strips_pitch_and_roll() {
        let rotation = Quat::from_euler(EulerRot::YXZ, 1.0, 0.4, -0.2);
        let (yaw, pitch, roll) = yaw_only(rotation).to_euler(EulerRot::YXZ);
        assert!((yaw - 1.0).abs() < 1e-5);
        assert!(pitch.abs() < 1e-5);
        assert!(roll.abs() < 1e-5);
    }

    #[test]
    fn test_velocity_change_brakes_to_zero() {
        let change = velocity_change(Vec3::ZERO, Vec3::new(3.0, -2.0, 1.0), 5.0);
        assert!((change - Vec3::new(-3.0, 0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn test_velocity_change_caps_force_at_target() {
        let change = velocity_change(Vec3::new(0.0, 0.0, -20.0), Vec3::ZERO, 5.0);
        assert!((change.length() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_velocity_change_ignores_nan_velocity() {
        let change = velocity_change(Vec3::X, Vec3::splat(f32::NAN), 5.0);
        assert!((change - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_air_control_without_momentum_uses_input() {
        let settings = MovementSettings::default();
        let memory = MotionMemory::default();
        let force = air_control(&memory, Vec2::new(0.0, 5.0), 5.0, &settings, 0.02);
        assert_eq!(force, Vec2::new(0.0, 5.0));
    }

    #[test]
    fn test_air_control_blends_half_input() {
        let settings = MovementSettings::default();
        let memory = MotionMemory {
            previous_force: Vec2::new(0.0, 3.0),
            ground_momentum: Some(Vec2::new(0.0, 3.0)),
        };
        let force = air_control(&memory, Vec2::new(2.0, 1.0), 5.0, &settings, 0.02);
        assert!((force - Vec2::new(1.0, 3.5)).length() < 1e-5);
    }

    #[test]
    fn test_air_control_cannot_reverse_forward_momentum() {
        let settings = MovementSettings::default();
        let memory = MotionMemory {
            previous_force: Vec2::new(0.0, 1.0),
            ground_momentum: Some(Vec2::new(0.0, 5.0)),
        };
        let force = air_control(&memory, Vec2::new(0.0, -5.0), 5.0, &settings, 0.02);
        assert_eq!(force.y, 0.0);
    }

    #[test]
    fn test_air_control_decays_undriven_axes() {
        let settings = MovementSettings::default();
        let memory = MotionMemory {
            previous_force: Vec2::new(4.0, 4.0),
            ground_momentum: Some(Vec2::new(4.0, 4.0)),
        };
        let force = air_control(&memory, Vec2::ZERO, 5.0, &settings, 0.02);
        // lerp toward zero by 2/s * 0.02s = 4%
        assert!((force - Vec2::new(3.84, 3.84)).length() < 1e-4);
    }

    #[test]
    fn test_stick_to_ground_removes_normal_component() {
        let normal = Quat::from_rotation_x(0.5) * Vec3::Y;
        let velocity = Vec3::new(1.0, 2.0, -3.0);
        let stuck = stick_to_ground(velocity, normal);
        assert!(stuck.dot(normal).abs() < 1e-5);
        assert_eq!(stick_to_ground(velocity, Vec3::ZERO), velocity);
    }

    #[test]
    fn test_memory_records_momentum_only_when_moving() {
        let mut memory = MotionMemory::default();
        memory.record_grounded();
        assert_eq!(memory.ground_momentum, None);

        memory.previous_force = Vec2::new(0.0, 5.0);
        memory.record_grounded();
        assert_eq!(memory.ground_momentum, Some(Vec2::new(0.0, 5.0)));

        memory.reset();
        assert_eq!(memory, MotionMemory::default());
    }
}
