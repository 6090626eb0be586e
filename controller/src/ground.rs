//! Ground detection.
//!
//! A slightly shrunken sphere is swept a short distance down from just above
//! the lower hemisphere center. The hit normal gives the surface angle,
//! rounded to whole degrees so near-equal slopes don't flicker across the
//! walkable limit.

use bevy::prelude::*;

use crate::physics::PhysicsBody;

/// Probe sphere radius relative to the body radius.
pub const PROBE_RADIUS_SCALE: f32 = 0.95;

/// Probe origin height relative to the body radius (just above the hemisphere center).
pub const PROBE_ORIGIN_SCALE: f32 = 1.1;

/// What the body is standing on.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GroundInfo {
    pub grounded: bool,
    /// Whole degrees between world up and the surface normal. 0 when airborne.
    pub surface_angle: f32,
    /// Surface normal, `Vec3::Y` when airborne or degenerate.
    pub normal: Vec3,
}

impl GroundInfo {
    pub const AIRBORNE: Self = Self {
        grounded: false,
        surface_angle: 0.0,
        normal: Vec3::Y,
    };

    /// Grounded on a surface no steeper than `max_angle`.
    #[inline]
    pub fn walkable(&self, max_angle: f32) -> bool {
        self.grounded && self.surface_angle <= max_angle
    }
}

/// Angle between world up and `normal`, rounded to whole degrees.
pub fn surface_angle(normal: Vec3) -> f32 {
    let normal = normal.normalize_or_zero();
    if normal == Vec3::ZERO || !normal.is_finite() {
        return 0.0;
    }
    Vec3::Y.angle_between(normal).to_degrees().round()
}

/// Downward sphere probe with a per-tick cache.
#[derive(Debug, Clone, Default)]
pub struct GroundSensor {
    radius: f32,
    distance: f32,
    cached: Option<(u64, GroundInfo)>,
}

impl GroundSensor {
    pub fn new(radius: f32, distance: f32) -> Self {
        Self {
            radius,
            distance,
            cached: None,
        }
    }

    /// Ground under the body for physics tick `tick`. Casts at most once per tick.
    pub fn sense<B: PhysicsBody + ?Sized>(&mut self, body: &B, tick: u64) -> GroundInfo {
        if let Some((cached_tick, info)) = self.cached {
            if cached_tick == tick {
                return info;
            }
        }
        let info = self.probe(body);
        self.cached = Some((tick, info));
        info
    }

    /// Drop the cached result (e.g. after a teleport or settings swap).
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Uncached probe.
    pub fn probe<B: PhysicsBody + ?Sized>(&self, body: &B) -> GroundInfo {
        let origin = body.position() + Vec3::Y * (self.radius * PROBE_ORIGIN_SCALE);
        match body.sphere_cast(
            origin,
            self.radius * PROBE_RADIUS_SCALE,
            Dir3::NEG_Y,
            self.distance,
        ) {
            Some(hit) => {
                let normal = hit.normal.normalize_or_zero();
                GroundInfo {
                    grounded: true,
                    surface_angle: surface_angle(normal),
                    normal: if normal == Vec3::ZERO { Vec3::Y } else { normal },
                }
            }
            None => GroundInfo::AIRBORNE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::{SandboxBody, SandboxWorld, Surface};
    use std::sync::Arc;

    #[test]
    fn test_surface_angle_rounds_to_whole_degrees() {
        let normal = Quat::from_rotation_x(30.4_f32.to_radians()) * Vec3::Y;
        assert_eq!(surface_angle(normal), 30.0);

        let normal = Quat::from_rotation_z(-44.6_f32.to_radians()) * Vec3::Y;
        assert_eq!(surface_angle(normal), 45.0);
    }

    #[test]
    fn test_degenerate_normal_is_flat() {
        assert_eq!(surface_angle(Vec3::ZERO), 0.0);
        assert_eq!(surface_angle(Vec3::splat(f32::NAN)), 0.0);
    }

    #[test]
    fn test_resting_body_is_grounded() {
        let world = Arc::new(SandboxWorld::new().with_surface(Surface::ground(0.0)));
        let body = SandboxBody::new(world, Vec3::ZERO);
        let sensor = GroundSensor::new(0.35, 0.1);

        let info = sensor.probe(&body);
        assert!(info.grounded);
        assert_eq!(info.surface_angle, 0.0);
    }

    #[test]
    fn test_body_above_probe_range_is_airborne() {
        let world = Arc::new(SandboxWorld::new().with_surface(Surface::ground(0.0)));
        let body = SandboxBody::new(world, Vec3::new(0.0, 0.3, 0.0));
        let sensor = GroundSensor::new(0.35, 0.1);

        assert_eq!(sensor.probe(&body), GroundInfo::AIRBORNE);
    }

    #[test]
    fn test_cache_is_per_tick() {
        let world = Arc::new(SandboxWorld::new().with_surface(Surface::ground(0.0)));
        let mut body = SandboxBody::new(world, Vec3::ZERO);
        let mut sensor = GroundSensor::new(0.35, 0.1);

        assert!(sensor.sense(&body, 1).grounded);

        // Lift the body: the same tick still reports the cached value, the next one re-probes.
        body.teleport(Vec3::new(0.0, 2.0, 0.0));
        assert!(sensor.sense(&body, 1).grounded);
        assert!(!sensor.sense(&body, 2).grounded);
        assert_eq!(sensor.cached, Some((2, GroundInfo::AIRBORNE)));
    }
}
