//! ECS systems for bodies that are a single component (e.g. [`crate::sandbox::SandboxBody`]).

use bevy::ecs::component::Mutable;
use bevy::prelude::*;

use crate::controller::FirstPersonController;
use crate::input::ControllerInput;
use crate::physics::PhysicsBody;

/// Run `init` on controllers that have not been initialized yet.
///
/// A body that cannot be configured loses its controller.
pub fn init_controllers<B>(
    mut commands: Commands,
    mut query: Query<(Entity, &mut FirstPersonController, &mut B)>,
) where
    B: Component<Mutability = Mutable> + PhysicsBody,
{
    for (entity, mut controller, mut body) in query.iter_mut() {
        if controller.is_initialized() {
            continue;
        }
        if let Err(err) = controller.init(&mut *body) {
            error!("Controller on {entity} failed to initialize: {err}");
            commands.entity(entity).remove::<FirstPersonController>();
        }
    }
}

/// Apply buffered actions and axes, then run the physics tick.
pub fn drive_controllers<B>(
    time: Res<Time>,
    mut query: Query<(&mut FirstPersonController, &mut ControllerInput, &mut B)>,
) where
    B: Component<Mutability = Mutable> + PhysicsBody,
{
    let dt = time.delta_secs();
    for (mut controller, mut input, mut body) in query.iter_mut() {
        if !controller.is_initialized() {
            continue;
        }
        for action in input.drain_actions() {
            controller.apply_action(&mut *body, action);
        }
        controller.move_axes(input.axes.x, input.axes.y, input.clamp);
        controller.physics_tick(&mut *body, dt);
    }
}

/// Feed accumulated look deltas to the controller.
pub fn apply_look<B>(mut query: Query<(&mut FirstPersonController, &mut ControllerInput, &mut B)>)
where
    B: Component<Mutability = Mutable> + PhysicsBody,
{
    for (mut controller, mut input, mut body) in query.iter_mut() {
        let look = input.take_look();
        if look != Vec2::ZERO {
            controller.look(&mut *body, look.x, look.y);
        }
    }
}

/// Render-rate camera follow.
pub fn follow_camera<B>(time: Res<Time>, mut query: Query<(&mut FirstPersonController, &B)>)
where
    B: Component + PhysicsBody,
{
    let dt = time.delta_secs();
    for (mut controller, body) in query.iter_mut() {
        controller.tick(body, dt);
    }
}
