//! The local player: spawn, fixed-tick drive and look.

use std::sync::Arc;

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use fp_controller::prelude::*;
use fp_controller::CapsuleShape;

use crate::rapier::{BodyQuery, RapierBody, RapierPlayerBundle, FALLBACK_GRAVITY};

/// Where the player starts and where reset volumes send it.
pub const SPAWN_POINT: Vec3 = Vec3::new(0.0, 0.5, 0.0);

/// Movement settings shared by every controller this app spawns.
#[derive(Resource, Clone)]
pub struct PlayerSettings(pub Arc<MovementSettings>);

/// Marker for the locally controlled body.
#[derive(Component)]
pub struct Player;

pub fn spawn_player(
    mut commands: Commands,
    settings: Res<PlayerSettings>,
    mut exit: MessageWriter<AppExit>,
) {
    let controller = match FirstPersonController::new(settings.0.clone()) {
        Ok(controller) => controller,
        Err(err) => {
            error!("Invalid movement settings: {err}");
            exit.write(AppExit::error());
            return;
        }
    };
    let capsule = CapsuleShape {
        radius: settings.0.radius,
        height: settings.0.height,
    };

    commands.spawn((
        Name::new("Player"),
        Player,
        controller,
        ControllerInput::default(),
        RapierPlayerBundle::new(capsule),
        Transform::from_translation(SPAWN_POINT),
    ));
}

/// Gravity of the default Rapier context.
pub fn world_gravity(configs: &Query<&RapierConfiguration>) -> Vec3 {
    configs
        .iter()
        .next()
        .map_or(FALLBACK_GRAVITY, |config| config.gravity)
}

/// Fixed tick: init on first run, then actions, axes and the physics tick.
///
/// Runs before the Rapier step so forces and velocity changes land this tick.
pub fn drive_player(
    mut commands: Commands,
    time: Res<Time>,
    rapier: ReadRapierContext,
    configs: Query<&RapierConfiguration>,
    mut players: Query<(&mut FirstPersonController, &mut ControllerInput, BodyQuery), With<Player>>,
) {
    let context = rapier.single().ok();
    let gravity = world_gravity(&configs);
    let dt = time.delta_secs();

    for (mut controller, mut input, mut item) in players.iter_mut() {
        let entity = item.0;
        let mut body = RapierBody::bind(&mut item, context.as_ref(), gravity);
        body.clear_forces();

        if !controller.is_initialized() {
            if let Err(err) = controller.init(&mut body) {
                error!("Controller on {entity} failed to initialize: {err}");
                commands.entity(entity).remove::<FirstPersonController>();
                continue;
            }
            info!("Controller ready on {entity}");
        }

        for action in input.drain_actions() {
            if !controller.apply_action(&mut body, action) {
                debug!("Ignored {action:?}");
            }
        }
        controller.move_axes(input.axes.x, input.axes.y, input.clamp);
        controller.physics_tick(&mut body, dt);
    }
}

/// Frame-rate look: yaw on the body, pitch on the rig.
pub fn apply_look(
    configs: Query<&RapierConfiguration>,
    mut players: Query<(&mut FirstPersonController, &mut ControllerInput, BodyQuery), With<Player>>,
) {
    let gravity = world_gravity(&configs);
    for (mut controller, mut input, mut item) in players.iter_mut() {
        let look = input.take_look();
        if look == Vec2::ZERO || !controller.is_initialized() {
            continue;
        }
        let mut body = RapierBody::bind(&mut item, None, gravity);
        controller.look(&mut body, look.x, look.y);
    }
}

/// R reloads movement settings from the settings file and swaps them in.
pub fn reload_settings(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut settings: ResMut<PlayerSettings>,
    configs: Query<&RapierConfiguration>,
    mut players: Query<(&mut FirstPersonController, BodyQuery), With<Player>>,
) {
    if !keyboard.just_pressed(KeyCode::KeyR) {
        return;
    }
    let loaded = match MovementSettings::from_env() {
        Ok(loaded) => Arc::new(loaded),
        Err(err) => {
            warn!("Keeping current movement settings: {err}");
            return;
        }
    };

    let gravity = world_gravity(&configs);
    for (mut controller, mut item) in players.iter_mut() {
        let mut body = RapierBody::bind(&mut item, None, gravity);
        if let Err(err) = controller.set_settings(loaded.clone(), &mut body) {
            warn!("Rejected reloaded settings: {err}");
            return;
        }
    }
    settings.0 = loaded;
    info!("Movement settings reloaded");
}
