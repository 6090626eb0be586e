//! Physics backend boundary.
//!
//! The controller never simulates anything itself. It reads the body through
//! [`PhysicsBody`] and decides which velocity changes, forces, friction and
//! collider shape to hand back. Backends: [`crate::sandbox::SandboxBody`] for
//! headless runs and tests, and the Rapier adapter in the client.

use bevy::prelude::*;

use crate::error::ControllerError;

/// How two touching friction coefficients are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrictionCombine {
    Average,
    #[default]
    Min,
    Multiply,
    Max,
}

impl FrictionCombine {
    pub fn combine(self, a: f32, b: f32) -> f32 {
        match self {
            FrictionCombine::Average => (a + b) * 0.5,
            FrictionCombine::Min => a.min(b),
            FrictionCombine::Multiply => a * b,
            FrictionCombine::Max => a.max(b),
        }
    }
}

/// Friction material on the body's collider.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceFriction {
    pub coefficient: f32,
    pub combine: FrictionCombine,
}

impl SurfaceFriction {
    /// Slippery: zero coefficient, keeps the lower of the two surfaces.
    pub const ZERO: Self = Self {
        coefficient: 0.0,
        combine: FrictionCombine::Min,
    };

    /// High friction that wins over whatever the ground uses.
    pub fn grip(coefficient: f32) -> Self {
        Self {
            coefficient,
            combine: FrictionCombine::Max,
        }
    }
}

/// Vertical capsule standing on its lowest point (the body origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleShape {
    pub radius: f32,
    /// Total height including both hemispheres.
    pub height: f32,
}

impl CapsuleShape {
    /// Offset from the body origin to the capsule center.
    #[inline]
    pub fn center_offset(&self) -> Vec3 {
        Vec3::Y * (self.height * 0.5)
    }

    /// Half length of the cylindrical segment between the hemisphere centers.
    #[inline]
    pub fn half_segment(&self) -> f32 {
        (self.height * 0.5 - self.radius).max(0.0)
    }
}

/// One-time body setup requested by the controller at init.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyConfig {
    pub mass: f32,
    pub capsule: CapsuleShape,
    pub friction: SurfaceFriction,
}

/// Result of a sphere cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastHit {
    /// Distance travelled along the cast direction before contact (0 when starting overlapped).
    pub distance: f32,
    /// Surface normal at the contact, pointing away from the surface.
    pub normal: Vec3,
    /// World-space contact point.
    pub point: Vec3,
}

/// What a physics backend exposes for the controlled body.
///
/// Positions are the body origin: the bottom of the capsule.
pub trait PhysicsBody {
    /// Validate and set up the body. Fails when the backend lacks a required piece.
    fn configure(&mut self, config: &BodyConfig) -> Result<(), ControllerError>;

    fn position(&self) -> Vec3;

    fn rotation(&self) -> Quat;

    fn set_rotation(&mut self, rotation: Quat);

    fn velocity(&self) -> Vec3;

    fn set_velocity(&mut self, velocity: Vec3);

    /// Apply an instantaneous impulse (momentum change).
    fn add_impulse(&mut self, impulse: Vec3);

    /// Apply a continuous force for the coming physics step.
    fn add_force(&mut self, force: Vec3);

    fn mass(&self) -> f32;

    fn gravity(&self) -> Vec3;

    fn set_friction(&mut self, friction: SurfaceFriction);

    fn set_capsule(&mut self, capsule: CapsuleShape);

    /// Kinematic bodies ignore forces and gravity.
    fn set_kinematic(&mut self, kinematic: bool);

    /// Sweep a sphere against the world, ignoring the body itself.
    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Dir3,
        max_distance: f32,
    ) -> Option<CastHit>;

    /// Apply a velocity change regardless of mass.
    fn add_velocity_change(&mut self, change: Vec3) {
        let mass = self.mass();
        self.add_impulse(change * mass);
    }
}
