//! First-person camera: spawned from the camera settings, placed by the rig.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use fp_controller::prelude::*;
use fp_controller::CameraSettings;

use crate::player::{world_gravity, Player, PlayerSettings, SPAWN_POINT};
use crate::rapier::{BodyQuery, RapierBody};

/// Marker for the camera the rig drives.
#[derive(Component)]
pub struct PlayerCamera;

pub fn perspective(settings: &CameraSettings) -> Projection {
    Projection::Perspective(PerspectiveProjection {
        fov: settings.field_of_view.to_radians(),
        near: settings.near_clip,
        far: settings.far_clip,
        ..default()
    })
}

pub fn spawn_camera(mut commands: Commands, settings: Res<PlayerSettings>) {
    let camera = &settings.0.camera;
    commands.spawn((
        Name::new("Player Camera"),
        PlayerCamera,
        Camera3d::default(),
        perspective(camera),
        Transform::from_translation(SPAWN_POINT + Vec3::Y * settings.0.height),
    ));
}

/// Render-rate follow, then copy the rig onto the camera.
pub fn follow_camera(
    time: Res<Time>,
    configs: Query<&RapierConfiguration>,
    mut players: Query<(&mut FirstPersonController, BodyQuery), With<Player>>,
    mut cameras: Query<&mut Transform, (With<PlayerCamera>, Without<Player>)>,
) {
    let gravity = world_gravity(&configs);
    let dt = time.delta_secs();

    let Some((mut controller, mut item)) = players.iter_mut().next() else {
        return;
    };
    if !controller.is_initialized() {
        return;
    }
    let body = RapierBody::bind(&mut item, None, gravity);
    controller.tick(&body, dt);

    if !controller.camera().is_active() {
        return;
    }
    let rig = controller.camera_transform(&body);
    for mut transform in cameras.iter_mut() {
        *transform = rig;
    }
}

/// Keep the projection in step with hot-swapped settings.
pub fn sync_projection(
    settings: Res<PlayerSettings>,
    mut cameras: Query<&mut Projection, With<PlayerCamera>>,
) {
    if !settings.is_changed() {
        return;
    }
    for mut projection in cameras.iter_mut() {
        if let Projection::Perspective(ref mut persp) = *projection {
            let camera = &settings.0.camera;
            persp.fov = camera.field_of_view.to_radians();
            persp.near = camera.near_clip;
            persp.far = camera.far_clip;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perspective_uses_radians() {
        let settings = CameraSettings::default();
        let Projection::Perspective(persp) = perspective(&settings) else {
            panic!("expected a perspective projection");
        };
        assert!((persp.fov - 70.0_f32.to_radians()).abs() < 1e-6);
        assert!((persp.near - 0.01).abs() < 1e-6);
        assert!((persp.far - 250.0).abs() < 1e-3);
    }
}
