//! Headless sandbox - runs the first-person controller against the sandbox
//! physics world with a seeded autopilot and logs what it does.
//!
//! Environment:
//! - `FPC_SETTINGS`: optional RON movement settings file
//! - `SANDBOX_SECONDS`: run length in seconds (default 20)
//! - `SANDBOX_SEED`: autopilot and terrain seed (default 42)

mod autopilot;
mod world;

use std::sync::Arc;
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use fp_controller::prelude::*;

const DEFAULT_SECONDS: f32 = 20.0;
const DEFAULT_SEED: u64 = 42;

/// Seconds between motion reports.
const REPORT_INTERVAL: f32 = 1.0;

#[derive(Resource)]
pub struct RunConfig {
    pub settings: Arc<MovementSettings>,
    pub seconds: f32,
    pub seed: u64,
}

/// Read a numeric environment variable, falling back (with a warning) on garbage.
fn env_or<T: std::str::FromStr + std::fmt::Display>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring {name}={raw:?}: not a valid value, using {default}");
            default
        }),
        Err(_) => default,
    }
}

/// Simulated time and report schedule.
#[derive(Resource, Default)]
struct RunClock {
    elapsed: f32,
    next_report: f32,
}

fn tick_duration() -> Duration {
    Duration::from_secs_f64(1.0 / FIXED_TIMESTEP_HZ)
}

/// Step every sandbox body after the controllers have run.
fn step_bodies(time: Res<Time>, mut bodies: Query<&mut SandboxBody>) {
    let dt = time.delta_secs();
    for mut body in bodies.iter_mut() {
        body.step(dt);
    }
}

/// Periodic motion log, and the end of the run.
fn report_and_exit(
    time: Res<Time>,
    config: Res<RunConfig>,
    mut clock: ResMut<RunClock>,
    players: Query<(&FirstPersonController, &SandboxBody)>,
    mut exit: MessageWriter<AppExit>,
) {
    clock.elapsed += time.delta_secs();

    if clock.elapsed >= clock.next_report {
        clock.next_report += REPORT_INTERVAL;
        for (controller, body) in players.iter() {
            let state = controller.motion_state(body);
            let summary = ron::to_string(&state).unwrap_or_else(|_| format!("{state:?}"));
            let floor = body
                .floor_normal()
                .map_or_else(|| "none".to_string(), |n| format!("({:.2}, {:.2}, {:.2})", n.x, n.y, n.z));
            info!(
                "t={:>5.1}s pos=({:.2}, {:.2}, {:.2}) floor={} {}",
                clock.elapsed,
                body.position().x,
                body.position().y,
                body.position().z,
                floor,
                summary
            );
        }
    }

    if clock.elapsed >= config.seconds {
        info!("Sandbox run finished after {:.1}s", clock.elapsed);
        exit.write(AppExit::Success);
    }
}

fn main() -> AppExit {
    let mut app = App::new();

    // Run the main loop at the fixed tick rate; nothing here renders.
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(tick_duration())));
    app.add_plugins(bevy::log::LogPlugin::default());
    app.insert_resource(Time::<Fixed>::from_hz(FIXED_TIMESTEP_HZ));

    let settings = match MovementSettings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            error!("Could not load movement settings: {err}");
            return AppExit::error();
        }
    };
    let config = RunConfig {
        settings: Arc::new(settings),
        seconds: env_or("SANDBOX_SECONDS", DEFAULT_SECONDS),
        seed: env_or("SANDBOX_SEED", DEFAULT_SEED),
    };
    info!(
        "Sandbox: {}s at {} Hz, seed {}",
        config.seconds, FIXED_TIMESTEP_HZ, config.seed
    );

    app.insert_resource(config);
    app.init_resource::<RunClock>();
    app.add_plugins(FirstPersonPlugin::<SandboxBody>::default());

    app.add_systems(Startup, world::spawn_player);
    app.add_systems(
        FixedUpdate,
        autopilot::drive_autopilot.in_set(FirstPersonSet::Input),
    );
    app.add_systems(
        FixedUpdate,
        (step_bodies, report_and_exit)
            .chain()
            .in_set(FirstPersonSet::Physics),
    );

    app.run()
}
