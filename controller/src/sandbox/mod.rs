//! Deterministic stand-in physics world.
//!
//! Not a general simulator: one capsule body per [`SandboxBody`], gravity,
//! one-sided plane contact with Coulomb friction, and trigger zones. Enough to
//! drive the controller headless and in tests with exact, repeatable numbers.

mod body;
mod surface;
mod zones;

pub use body::SandboxBody;
pub use surface::{LocalPlane, NoiseTerrain, Surface, SurfaceShape, DEFAULT_SURFACE_FRICTION};
pub use zones::{Zone, ZoneKind, DEFAULT_RESPAWN};

use bevy::prelude::*;

use crate::physics::CastHit;

/// Standard gravity (m/s^2).
pub const GRAVITY: f32 = 9.81;

/// Static geometry and trigger zones shared by every body in the world.
#[derive(Debug, Clone)]
pub struct SandboxWorld {
    surfaces: Vec<Surface>,
    zones: Vec<Zone>,
    gravity: Vec3,
}

impl Default for SandboxWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxWorld {
    /// Empty world with standard gravity.
    pub fn new() -> Self {
        Self {
            surfaces: Vec::new(),
            zones: Vec::new(),
            gravity: Vec3::NEG_Y * GRAVITY,
        }
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_surface(mut self, surface: Surface) -> Self {
        self.surfaces.push(surface);
        self
    }

    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zones.push(zone);
        self
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Nearest hit of a swept sphere against every surface.
    pub fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Dir3,
        max_distance: f32,
    ) -> Option<CastHit> {
        if !origin.is_finite() || !radius.is_finite() || radius <= 0.0 {
            return None;
        }
        self.surfaces
            .iter()
            .filter_map(|surface| surface.sphere_cast(origin, radius, direction, max_distance))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(distance, normal, point)| CastHit {
                distance,
                normal,
                point,
            })
    }
}
