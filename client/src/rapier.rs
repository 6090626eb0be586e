//! `PhysicsBody` on top of bevy_rapier3d components.
//!
//! The adapter borrows the player's components for the duration of one
//! system run. Anything missing is reported at `configure` time. Components
//! are held as `Mut` so Rapier only resyncs what the controller actually wrote.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use fp_controller::error::{BodyComponent, ControllerError};
use fp_controller::physics::{
    BodyConfig, CapsuleShape, CastHit, FrictionCombine, PhysicsBody, SurfaceFriction,
};

/// Gravity used when no Rapier configuration is readable.
pub const FALLBACK_GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

/// Components a player body is read from.
pub type BodyQuery = (
    Entity,
    &'static mut Transform,
    Option<&'static mut RigidBody>,
    Option<&'static mut Collider>,
    Option<&'static mut Velocity>,
    Option<&'static mut Friction>,
    Option<&'static mut ColliderMassProperties>,
    Option<&'static ReadMassProperties>,
    Option<&'static mut ExternalForce>,
);

/// One row of [`BodyQuery`].
pub type BodyItem<'w> = (
    Entity,
    Mut<'w, Transform>,
    Option<Mut<'w, RigidBody>>,
    Option<Mut<'w, Collider>>,
    Option<Mut<'w, Velocity>>,
    Option<Mut<'w, Friction>>,
    Option<Mut<'w, ColliderMassProperties>>,
    Option<&'w ReadMassProperties>,
    Option<Mut<'w, ExternalForce>>,
);

/// Everything a player body needs; spawn it with a `FirstPersonController`.
#[derive(Bundle)]
pub struct RapierPlayerBundle {
    pub rigid_body: RigidBody,
    pub collider: Collider,
    pub velocity: Velocity,
    pub friction: Friction,
    pub mass: ColliderMassProperties,
    pub read_mass: ReadMassProperties,
    pub force: ExternalForce,
    pub locked_axes: LockedAxes,
    pub ccd: Ccd,
}

impl RapierPlayerBundle {
    pub fn new(capsule: CapsuleShape) -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            collider: capsule_collider(capsule),
            velocity: Velocity::zero(),
            friction: friction_material(SurfaceFriction::ZERO),
            mass: ColliderMassProperties::default(),
            read_mass: ReadMassProperties::default(),
            force: ExternalForce::default(),
            locked_axes: LockedAxes::ROTATION_LOCKED,
            ccd: Ccd::enabled(),
        }
    }
}

/// Capsule standing on the body origin.
pub fn capsule_collider(capsule: CapsuleShape) -> Collider {
    Collider::compound(vec![(
        capsule.center_offset(),
        Quat::IDENTITY,
        Collider::capsule_y(capsule.half_segment(), capsule.radius),
    )])
}

fn combine_rule(combine: FrictionCombine) -> CoefficientCombineRule {
    match combine {
        FrictionCombine::Average => CoefficientCombineRule::Average,
        FrictionCombine::Min => CoefficientCombineRule::Min,
        FrictionCombine::Multiply => CoefficientCombineRule::Multiply,
        FrictionCombine::Max => CoefficientCombineRule::Max,
    }
}

fn friction_material(friction: SurfaceFriction) -> Friction {
    Friction {
        coefficient: friction.coefficient,
        combine_rule: combine_rule(friction.combine),
    }
}

/// Borrowed view of one Rapier body.
pub struct RapierBody<'a, 'w> {
    pub entity: Entity,
    pub transform: Mut<'a, Transform>,
    pub rigid_body: Option<Mut<'a, RigidBody>>,
    pub collider: Option<Mut<'a, Collider>>,
    pub velocity: Option<Mut<'a, Velocity>>,
    pub friction: Option<Mut<'a, Friction>>,
    pub mass: Option<Mut<'a, ColliderMassProperties>>,
    pub read_mass: Option<&'a ReadMassProperties>,
    pub force: Option<Mut<'a, ExternalForce>>,
    /// Scene queries; `None` when no Rapier context exists yet.
    pub context: Option<&'a RapierContext<'w>>,
    pub gravity: Vec3,
}

impl<'a, 'w> RapierBody<'a, 'w> {
    /// Reborrow a query row as a body.
    pub fn bind(
        item: &'a mut BodyItem<'_>,
        context: Option<&'a RapierContext<'w>>,
        gravity: Vec3,
    ) -> Self {
        let (entity, transform, rigid_body, collider, velocity, friction, mass, read_mass, force) =
            item;
        Self {
            entity: *entity,
            transform: transform.reborrow(),
            rigid_body: rigid_body.as_mut().map(|c| c.reborrow()),
            collider: collider.as_mut().map(|c| c.reborrow()),
            velocity: velocity.as_mut().map(|c| c.reborrow()),
            friction: friction.as_mut().map(|c| c.reborrow()),
            mass: mass.as_mut().map(|c| c.reborrow()),
            read_mass: *read_mass,
            force: force.as_mut().map(|c| c.reborrow()),
            context,
            gravity,
        }
    }

    /// Forces do not persist across ticks.
    pub fn clear_forces(&mut self) {
        if let Some(force) = self.force.as_mut() {
            if force.force != Vec3::ZERO {
                force.force = Vec3::ZERO;
            }
        }
    }
}

impl PhysicsBody for RapierBody<'_, '_> {
    fn configure(&mut self, config: &BodyConfig) -> Result<(), ControllerError> {
        let Some(rigid_body) = self.rigid_body.as_mut() else {
            return Err(ControllerError::MissingComponent(BodyComponent::RigidBody));
        };
        let Some(collider) = self.collider.as_mut() else {
            return Err(ControllerError::MissingComponent(BodyComponent::Collider));
        };
        if self.velocity.is_none() {
            return Err(ControllerError::MissingComponent(BodyComponent::Velocity));
        }
        let Some(friction) = self.friction.as_mut() else {
            return Err(ControllerError::MissingComponent(BodyComponent::Friction));
        };
        let Some(mass) = self.mass.as_mut() else {
            return Err(ControllerError::MissingComponent(BodyComponent::Mass));
        };

        rigid_body.set_if_neq(RigidBody::Dynamic);
        **collider = capsule_collider(config.capsule);
        friction.set_if_neq(friction_material(config.friction));
        mass.set_if_neq(ColliderMassProperties::Mass(config.mass));
        Ok(())
    }

    fn position(&self) -> Vec3 {
        self.transform.translation
    }

    fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        if rotation.is_finite() {
            self.transform.rotation = rotation.normalize();
        }
    }

    fn velocity(&self) -> Vec3 {
        self.velocity.as_ref().map_or(Vec3::ZERO, |v| v.linvel)
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        if let Some(v) = self.velocity.as_mut() {
            if velocity.is_finite() {
                v.linvel = velocity;
            }
        }
    }

    fn add_impulse(&mut self, impulse: Vec3) {
        let mass = self.mass();
        if let Some(v) = self.velocity.as_mut() {
            if impulse.is_finite() && mass > 0.0 {
                v.linvel += impulse / mass;
            }
        }
    }

    fn add_force(&mut self, force: Vec3) {
        if let Some(external) = self.force.as_mut() {
            if force.is_finite() {
                external.force += force;
            }
        }
    }

    fn mass(&self) -> f32 {
        match self.mass.as_deref() {
            Some(ColliderMassProperties::Mass(mass)) => *mass,
            _ => self.read_mass.map_or(0.0, |read| read.get().mass),
        }
    }

    fn gravity(&self) -> Vec3 {
        self.gravity
    }

    fn set_friction(&mut self, friction: SurfaceFriction) {
        if let Some(material) = self.friction.as_mut() {
            material.set_if_neq(friction_material(friction));
        }
    }

    fn set_capsule(&mut self, capsule: CapsuleShape) {
        if let Some(collider) = self.collider.as_mut() {
            **collider = capsule_collider(capsule);
        }
    }

    fn set_kinematic(&mut self, kinematic: bool) {
        if let Some(rigid_body) = self.rigid_body.as_mut() {
            rigid_body.set_if_neq(if kinematic {
                RigidBody::KinematicPositionBased
            } else {
                RigidBody::Dynamic
            });
        }
        if kinematic {
            self.set_velocity(Vec3::ZERO);
        }
    }

    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Dir3,
        max_distance: f32,
    ) -> Option<CastHit> {
        let context = self.context?;
        let options = ShapeCastOptions {
            max_time_of_impact: max_distance,
            target_distance: 0.0,
            stop_at_penetration: true,
            compute_impact_geometry_on_penetration: true,
        };
        let filter = QueryFilter::default()
            .exclude_rigid_body(self.entity)
            .exclude_sensors();

        let (_, hit) = context.cast_shape(
            origin,
            Quat::IDENTITY,
            *direction,
            &*Collider::ball(radius).raw,
            options,
            filter,
        )?;

        let (normal, point) = hit
            .details
            .map_or((Vec3::ZERO, origin), |details| {
                (details.normal1, details.witness1)
            });
        Some(CastHit {
            distance: hit.time_of_impact,
            normal,
            point,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BodyConfig {
        BodyConfig {
            mass: 10.0,
            capsule: CapsuleShape {
                radius: 0.35,
                height: 1.75,
            },
            friction: SurfaceFriction::ZERO,
        }
    }

    #[test]
    fn test_combine_rules_map_one_to_one() {
        assert_eq!(combine_rule(FrictionCombine::Max), CoefficientCombineRule::Max);
        assert_eq!(combine_rule(FrictionCombine::Min), CoefficientCombineRule::Min);
    }

    #[test]
    fn test_bare_entity_is_missing_its_rigid_body() {
        let mut world = World::new();
        world.spawn(Transform::default());
        let mut query = world.query::<BodyQuery>();
        let mut item = query.single_mut(&mut world).unwrap();
        let mut body = RapierBody::bind(&mut item, None, FALLBACK_GRAVITY);

        assert!(matches!(
            body.configure(&config()),
            Err(ControllerError::MissingComponent(BodyComponent::RigidBody))
        ));
    }

    #[test]
    fn test_configured_mass_and_impulse() {
        let mut world = World::new();
        world.spawn((
            Transform::default(),
            ColliderMassProperties::Mass(10.0),
            Velocity::zero(),
        ));
        let mut query = world.query::<BodyQuery>();
        let mut item = query.single_mut(&mut world).unwrap();
        let mut body = RapierBody::bind(&mut item, None, FALLBACK_GRAVITY);

        assert_eq!(body.mass(), 10.0);
        body.add_impulse(Vec3::new(0.0, 50.0, 0.0));
        assert!((body.velocity().y - 5.0).abs() < 1e-6);
        // No context, no hits.
        assert!(body.sphere_cast(Vec3::ZERO, 0.3, Dir3::NEG_Y, 1.0).is_none());
    }
}
