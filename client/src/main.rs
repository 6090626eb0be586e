//! Windowed client - the first-person controller on a Rapier body.
//!
//! Click to capture the mouse, Esc to release. WASD, Shift, Ctrl, Space;
//! P pauses, F freezes, R reloads `FPC_SETTINGS`.

mod camera;
mod input;
mod player;
mod rapier;
mod scene;
mod zones;

use std::sync::Arc;

use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier3d::prelude::*;
use fp_controller::prelude::*;

use player::PlayerSettings;

fn main() -> AppExit {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "First-Person Controller".to_string(),
            resolution: WindowResolution::new(1280, 720),
            ..default()
        }),
        ..default()
    }));

    // Physics steps in the fixed schedule, after FirstPersonSet::Physics.
    app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule());
    app.insert_resource(Time::<Fixed>::from_hz(FIXED_TIMESTEP_HZ));

    let settings = match MovementSettings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            error!("Could not load movement settings: {err}");
            return AppExit::error();
        }
    };
    app.insert_resource(PlayerSettings(Arc::new(settings)));
    app.init_resource::<input::InputToggles>();
    app.add_plugins(FirstPersonSchedulePlugin);

    app.add_systems(
        Startup,
        (scene::spawn_scene, player::spawn_player, camera::spawn_camera),
    );

    app.add_systems(
        Update,
        (
            input::grab_cursor,
            input::handle_keyboard_input,
            input::handle_mouse_input,
            player::reload_settings,
        )
            .before(FirstPersonSet::Look),
    );
    app.add_systems(Update, player::apply_look.in_set(FirstPersonSet::Look));
    app.add_systems(
        Update,
        (camera::sync_projection, camera::follow_camera).in_set(FirstPersonSet::Camera),
    );

    app.add_systems(FixedUpdate, player::drive_player.in_set(FirstPersonSet::Controller));
    app.add_systems(FixedUpdate, zones::apply_zones.in_set(FirstPersonSet::Physics));

    app.run()
}
