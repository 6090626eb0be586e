use std::sync::Arc;

use bevy::prelude::*;

use super::{SandboxWorld, ZoneKind};
use crate::error::{BodyComponent, ControllerError};
use crate::physics::{BodyConfig, CapsuleShape, CastHit, PhysicsBody, SurfaceFriction};

/// Below this |normal.y| contacts push sideways instead of vertically.
const VERTICAL_PUSH_LIMIT: f32 = 0.2;

const DEFAULT_CAPSULE: CapsuleShape = CapsuleShape {
    radius: 0.35,
    height: 1.75,
};

const DEFAULT_MASS: f32 = 10.0;

/// Capsule rigid body living in a [`SandboxWorld`].
///
/// Impulses change velocity immediately; forces accumulate until the next
/// [`SandboxBody::step`]. Rotation is yaw-only and never simulated.
#[derive(Component, Debug, Clone)]
pub struct SandboxBody {
    world: Option<Arc<SandboxWorld>>,
    position: Vec3,
    rotation: Quat,
    velocity: Vec3,
    mass: f32,
    capsule: CapsuleShape,
    friction: SurfaceFriction,
    kinematic: bool,
    pending_force: Vec3,
    /// Per-zone "inside last step" flags for enter detection.
    inside_zones: Vec<bool>,
    /// Normal of the floor touched during the last step.
    floor_normal: Option<Vec3>,
}

impl SandboxBody {
    pub fn new(world: Arc<SandboxWorld>, position: Vec3) -> Self {
        Self {
            world: Some(world),
            ..Self::detached(position)
        }
    }

    /// A body outside any world. It cannot be configured or simulated.
    pub fn detached(position: Vec3) -> Self {
        Self {
            world: None,
            position,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            mass: DEFAULT_MASS,
            capsule: DEFAULT_CAPSULE,
            friction: SurfaceFriction::ZERO,
            kinematic: false,
            pending_force: Vec3::ZERO,
            inside_zones: Vec::new(),
            floor_normal: None,
        }
    }

    /// Move the body without touching its velocity.
    pub fn teleport(&mut self, position: Vec3) {
        if position.is_finite() {
            self.position = position;
        }
    }

    pub fn capsule(&self) -> CapsuleShape {
        self.capsule
    }

    pub fn friction(&self) -> SurfaceFriction {
        self.friction
    }

    pub fn is_kinematic(&self) -> bool {
        self.kinematic
    }

    /// Normal of the floor the body rested on after the last step.
    pub fn floor_normal(&self) -> Option<Vec3> {
        self.floor_normal
    }

    /// Advance the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let force = std::mem::take(&mut self.pending_force);
        let Some(world) = self.world.clone() else {
            return;
        };
        if self.kinematic || !dt.is_finite() || dt <= 0.0 {
            return;
        }

        let acceleration = world.gravity() + force / self.mass;
        self.velocity += acceleration * dt;
        let travel = self.velocity.length() * dt;
        self.position += self.velocity * dt;

        self.resolve_contacts(&world, acceleration, travel, dt);
        self.apply_zones(&world);
    }

    fn resolve_contacts(
        &mut self,
        world: &SandboxWorld,
        acceleration: Vec3,
        travel: f32,
        dt: f32,
    ) {
        let radius = self.capsule.radius;
        self.floor_normal = None;

        for surface in world.surfaces() {
            let lower = self.position + Vec3::Y * radius;
            let upper = self.position + Vec3::Y * (self.capsule.height - radius);
            let center = if surface.local_plane(lower).normal.y >= 0.0 {
                lower
            } else {
                upper
            };
            let plane = surface.local_plane(center);
            let separation = plane.distance(center);
            // Tunnelled contacts within this step's travel still resolve.
            if separation >= radius || separation < -(radius + travel) {
                continue;
            }
            if !plane.covers(center - plane.normal * separation) {
                continue;
            }

            let depth = radius - separation;
            let normal = plane.normal;
            if normal.y.abs() > VERTICAL_PUSH_LIMIT {
                self.position.y += depth / normal.y;
            } else {
                self.position += normal * depth;
            }

            let into_surface = self.velocity.dot(normal);
            if into_surface < 0.0 {
                self.velocity -= normal * into_surface;
            }

            // Coulomb friction from the normal load.
            let load = (-acceleration.dot(normal)).max(0.0);
            let mu = self
                .friction
                .combine
                .combine(self.friction.coefficient, surface.friction)
                .max(0.0);
            let tangential = self.velocity - normal * self.velocity.dot(normal);
            let speed = tangential.length();
            if speed > 0.0 {
                let drop = (mu * load * dt).min(speed);
                self.velocity -= tangential / speed * drop;
            }

            if normal.y > 0.0 {
                self.floor_normal = Some(normal);
            }
        }
    }

    fn apply_zones(&mut self, world: &SandboxWorld) {
        let zones = world.zones();
        self.inside_zones.resize(zones.len(), false);

        for (zone, was_inside) in zones.iter().zip(self.inside_zones.iter_mut()) {
            let inside = zone.contains(self.position);
            let entered = inside && !*was_inside;
            *was_inside = inside;

            match zone.kind {
                ZoneKind::Wind { impulse } if inside => {
                    self.velocity += impulse / self.mass;
                }
                ZoneKind::Trampoline { impulse } if entered => {
                    self.velocity += Vec3::Y * (impulse / self.mass);
                }
                ZoneKind::Reset { respawn } if entered => {
                    self.position = respawn;
                    self.velocity = Vec3::ZERO;
                }
                _ => {}
            }
        }
    }
}

impl PhysicsBody for SandboxBody {
    fn configure(&mut self, config: &BodyConfig) -> Result<(), ControllerError> {
        if self.world.is_none() {
            return Err(ControllerError::MissingComponent(BodyComponent::RigidBody));
        }
        if !config.mass.is_finite() || config.mass <= 0.0 {
            return Err(ControllerError::MissingComponent(BodyComponent::Mass));
        }
        self.mass = config.mass;
        self.capsule = config.capsule;
        self.friction = config.friction;
        Ok(())
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        if rotation.is_finite() {
            self.rotation = rotation.normalize();
        }
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        if velocity.is_finite() && !self.kinematic {
            self.velocity = velocity;
        }
    }

    fn add_impulse(&mut self, impulse: Vec3) {
        if impulse.is_finite() && !self.kinematic {
            self.velocity += impulse / self.mass;
        }
    }

    fn add_force(&mut self, force: Vec3) {
        if force.is_finite() {
            self.pending_force += force;
        }
    }

    fn mass(&self) -> f32 {
        self.mass
    }

    fn gravity(&self) -> Vec3 {
        self.world
            .as_ref()
            .map_or(Vec3::ZERO, |world| world.gravity())
    }

    fn set_friction(&mut self, friction: SurfaceFriction) {
        self.friction = friction;
    }

    fn set_capsule(&mut self, capsule: CapsuleShape) {
        self.capsule = capsule;
    }

    fn set_kinematic(&mut self, kinematic: bool) {
        self.kinematic = kinematic;
        if kinematic {
            self.velocity = Vec3::ZERO;
        }
    }

    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Dir3,
        max_distance: f32,
    ) -> Option<CastHit> {
        self.world
            .as_ref()
            .and_then(|world| world.sphere_cast(origin, radius, direction, max_distance))
    }
}
