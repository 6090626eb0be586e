//! Anti-slide friction policy.
//!
//! Friction is all-or-nothing. While the player drives the body the collider
//! is frictionless so the ground never fights the applied velocity; standing
//! still on a walkable slope switches to a high-friction material that wins
//! over the ground's own.

use bevy::prelude::*;

use crate::ground::GroundInfo;
use crate::physics::{PhysicsBody, SurfaceFriction};
use crate::settings::MovementSettings;

/// Outcome of one friction update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrictionDecision {
    pub friction: SurfaceFriction,
    /// Extra downward force keeping a moving body on a moderate slope.
    pub stick_force: Option<Vec3>,
}

/// Pick the body's friction for this tick.
///
/// `has_input` is whether any horizontal movement input is held.
pub fn decide(
    ground: &GroundInfo,
    has_input: bool,
    settings: &MovementSettings,
    gravity: Vec3,
    mass: f32,
) -> FrictionDecision {
    if !ground.grounded {
        return FrictionDecision {
            friction: SurfaceFriction::ZERO,
            stick_force: None,
        };
    }

    let walkable = ground.surface_angle <= settings.max_slope_angle;
    if walkable && !has_input {
        return FrictionDecision {
            friction: SurfaceFriction::grip(settings.max_friction),
            stick_force: None,
        };
    }

    let moderate_slope = walkable && ground.surface_angle > 0.0;
    let stick_force = (moderate_slope && has_input && settings.slope_stick_factor > 0.0)
        .then(|| gravity * mass * settings.slope_stick_factor)
        .filter(|force| force.is_finite() && *force != Vec3::ZERO);

    FrictionDecision {
        friction: SurfaceFriction::ZERO,
        stick_force,
    }
}

/// Decide and push the result to the body.
pub fn apply<B: PhysicsBody + ?Sized>(
    body: &mut B,
    ground: &GroundInfo,
    has_input: bool,
    settings: &MovementSettings,
) -> FrictionDecision {
    let decision = decide(ground, has_input, settings, body.gravity(), body.mass());
    body.set_friction(decision.friction);
    if let Some(force) = decision.stick_force {
        body.add_force(force);
    }
    decision
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::FrictionCombine;

    const GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

    fn ground(angle: f32) -> GroundInfo {
        GroundInfo {
            grounded: true,
            surface_angle: angle,
            normal: Quat::from_rotation_x(angle.to_radians()) * Vec3::Y,
        }
    }

    #[test]
    fn test_airborne_is_frictionless() {
        let settings = MovementSettings::default();
        let decision = decide(&GroundInfo::AIRBORNE, false, &settings, GRAVITY, 10.0);
        assert_eq!(decision.friction, SurfaceFriction::ZERO);
        assert!(decision.stick_force.is_none());
    }

    #[test]
    fn test_idle_on_walkable_slope_grips() {
        let settings = MovementSettings::default();
        for angle in [0.0, 20.0, 45.0] {
            let decision = decide(&ground(angle), false, &settings, GRAVITY, 10.0);
            assert_eq!(decision.friction.coefficient, settings.max_friction);
            assert_eq!(decision.friction.combine, FrictionCombine::Max);
        }
    }

    #[test]
    fn test_idle_on_steep_slope_slides() {
        let settings = MovementSettings::default();
        let decision = decide(&ground(46.0), false, &settings, GRAVITY, 10.0);
        assert_eq!(decision.friction, SurfaceFriction::ZERO);
        assert!(decision.stick_force.is_none());
    }

    #[test]
    fn test_moving_on_flat_has_no_stick_force() {
        let settings = MovementSettings::default();
        let decision = decide(&ground(0.0), true, &settings, GRAVITY, 10.0);
        assert_eq!(decision.friction, SurfaceFriction::ZERO);
        assert!(decision.stick_force.is_none());
    }

    #[test]
    fn test_moving_on_moderate_slope_pushes_down() {
        let settings = MovementSettings::default();
        let decision = decide(&ground(30.0), true, &settings, GRAVITY, 10.0);
        assert_eq!(decision.friction, SurfaceFriction::ZERO);
        let force = decision.stick_force.expect("stick force on slope");
        let expected = GRAVITY * 10.0 * settings.slope_stick_factor;
        assert!((force - expected).length() < 1e-4);
    }
}
