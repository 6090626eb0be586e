//! First-person movement controller for rigid-body characters.
//!
//! The controller turns movement/look input into velocity changes, friction
//! and capsule changes on a physics body it reaches through [`PhysicsBody`].
//! It never simulates anything itself.
//!
//! Scale: 1 unit = 1 meter, forward is -Z, up is +Y.

pub mod camera;
pub mod controller;
pub mod error;
pub mod friction;
pub mod ground;
pub mod input;
pub mod integrator;
pub mod locomotion;
pub mod physics;
pub mod sandbox;
pub mod settings;
pub mod systems;

use std::marker::PhantomData;

use bevy::ecs::component::Mutable;
use bevy::prelude::*;

pub use controller::{BoundController, FirstPersonController, MotionState};
pub use error::{BodyComponent, ControllerError};
pub use input::{ControllerAction, ControllerInput};
pub use physics::{CapsuleShape, CastHit, PhysicsBody, SurfaceFriction};
pub use settings::{CameraSettings, MovementSettings, FIXED_TIMESTEP_HZ, SETTINGS_ENV_VAR};

/// Ordering of controller work.
///
/// `FixedUpdate`: Input -> Controller -> Physics. `Update`: Look -> Camera.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FirstPersonSet {
    /// Produce input (devices, autopilot).
    Input,
    /// Apply actions and run the controller's physics tick.
    Controller,
    /// Step the physics backend.
    Physics,
    /// Apply look deltas.
    Look,
    /// Camera follow.
    Camera,
}

/// Configures [`FirstPersonSet`] ordering only. Use when the body is not a
/// single component and the app drives the controller itself.
pub struct FirstPersonSchedulePlugin;

impl Plugin for FirstPersonSchedulePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            (
                FirstPersonSet::Input,
                FirstPersonSet::Controller,
                FirstPersonSet::Physics,
            )
                .chain(),
        );
        app.configure_sets(Update, (FirstPersonSet::Look, FirstPersonSet::Camera).chain());
    }
}

/// Full controller wiring for a body type that is one component.
pub struct FirstPersonPlugin<B> {
    _marker: PhantomData<fn() -> B>,
}

impl<B> Default for FirstPersonPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<B> Plugin for FirstPersonPlugin<B>
where
    B: Component<Mutability = Mutable> + PhysicsBody,
{
    fn build(&self, app: &mut App) {
        app.add_plugins(FirstPersonSchedulePlugin);
        app.add_systems(
            FixedUpdate,
            (systems::init_controllers::<B>, systems::drive_controllers::<B>)
                .chain()
                .in_set(FirstPersonSet::Controller),
        );
        app.add_systems(Update, systems::apply_look::<B>.in_set(FirstPersonSet::Look));
        app.add_systems(Update, systems::follow_camera::<B>.in_set(FirstPersonSet::Camera));
    }
}

pub mod prelude {
    pub use crate::controller::{BoundController, FirstPersonController, MotionState};
    pub use crate::error::ControllerError;
    pub use crate::input::{ControllerAction, ControllerInput};
    pub use crate::physics::PhysicsBody;
    pub use crate::sandbox::{SandboxBody, SandboxWorld, Surface, Zone};
    pub use crate::settings::{MovementSettings, FIXED_TIMESTEP_HZ};
    pub use crate::{FirstPersonPlugin, FirstPersonSchedulePlugin, FirstPersonSet};
}
