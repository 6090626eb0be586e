//! Test course: a flat yard with a ramp, a too-steep slope, a crawlspace,
//! wind and trampoline volumes, and noise terrain below the edges.

use std::sync::Arc;

use bevy::prelude::*;
use fp_controller::prelude::*;
use fp_controller::sandbox::NoiseTerrain;

use crate::autopilot::Autopilot;
use crate::RunConfig;

/// Where the player starts and where reset zones send it.
pub const SPAWN_POINT: Vec3 = Vec3::new(0.0, 0.0, 0.0);

/// Half size of the flat yard (meters).
const YARD_HALF_SIZE: f32 = 30.0;

pub fn build_world(seed: u32) -> SandboxWorld {
    let yard = Rect::new(-YARD_HALF_SIZE, -YARD_HALF_SIZE, YARD_HALF_SIZE, YARD_HALF_SIZE);

    SandboxWorld::new()
        .with_surface(Surface::ground(0.0).with_bounds(yard))
        // Walkable 30 degree ramp rising north.
        .with_surface(
            Surface::slope(Vec3::new(0.0, 0.0, -10.0), 30.0)
                .with_bounds(Rect::new(-3.0, -16.0, 3.0, -10.0)),
        )
        // 55 degrees: too steep to stand on.
        .with_surface(
            Surface::slope(Vec3::new(10.0, 0.0, -10.0), 55.0)
                .with_bounds(Rect::new(7.0, -13.0, 13.0, -10.0)),
        )
        // Crawlspace: only a crouched capsule fits under.
        .with_surface(Surface::ceiling(1.2).with_bounds(Rect::new(-12.0, -4.0, -8.0, 4.0)))
        // Rolling basin outside the yard.
        .with_surface(Surface::terrain(NoiseTerrain::new(seed, 1.5, 0.04, -3.0)))
        .with_zone(Zone::wind(
            Vec3::new(20.0, 1.5, 0.0),
            Vec3::new(5.0, 1.5, 5.0),
            Vec3::X * 2.0,
        ))
        .with_zone(Zone::trampoline(
            Vec3::new(-20.0, 0.0, 10.0),
            Vec3::new(1.5, 0.1, 1.5),
            100.0,
        ))
        // Falling off the south edge sends the player home.
        .with_zone(Zone::reset(
            Vec3::new(0.0, -6.0, 45.0),
            Vec3::new(60.0, 5.0, 15.0),
            Some(SPAWN_POINT + Vec3::Y),
        ))
}

/// Spawn the controlled player. Init failure is fatal for the run.
pub fn spawn_player(
    mut commands: Commands,
    config: Res<RunConfig>,
    mut exit: MessageWriter<AppExit>,
) {
    let world = Arc::new(build_world(config.seed as u32));
    info!(
        "Sandbox world: {} surfaces, {} zones",
        world.surfaces().len(),
        world.zones().len()
    );

    let mut body = SandboxBody::new(world, SPAWN_POINT);
    let mut controller = match FirstPersonController::new(config.settings.clone()) {
        Ok(controller) => controller,
        Err(err) => {
            error!("Invalid movement settings: {err}");
            exit.write(AppExit::error());
            return;
        }
    };
    if let Err(err) = controller.init(&mut body) {
        error!("Failed to initialize controller: {err}");
        exit.write(AppExit::error());
        return;
    }

    commands.spawn((
        Name::new("Player"),
        controller,
        body,
        ControllerInput::default(),
        Autopilot::new(config.seed),
    ));
}
