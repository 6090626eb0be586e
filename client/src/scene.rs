//! Test course built from Rapier colliders: a yard, a walkable ramp, a
//! too-steep slope, a crawlspace and trigger volumes.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use fp_controller::prelude::*;

use crate::player::SPAWN_POINT;
use crate::zones::ZoneVolume;

const YARD_HALF_SIZE: f32 = 30.0;
const SLAB_HALF_THICKNESS: f32 = 0.1;

/// Static box collider with a matching mesh.
fn spawn_block(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    material: Handle<StandardMaterial>,
    name: &str,
    transform: Transform,
    half: Vec3,
) {
    commands.spawn((
        Name::new(name.to_string()),
        RigidBody::Fixed,
        Collider::cuboid(half.x, half.y, half.z),
        Mesh3d(meshes.add(Cuboid::new(half.x * 2.0, half.y * 2.0, half.z * 2.0))),
        MeshMaterial3d(material),
        transform,
    ));
}

/// Slab whose top face starts at `start` and rises toward -Z at `angle` degrees.
pub fn ramp_transform(start: Vec3, run: f32, angle: f32) -> (Transform, Vec3) {
    let angle = angle.to_radians();
    let length = run / angle.cos();
    let rotation = Quat::from_rotation_x(angle);
    let up = rotation * Vec3::Y;
    let along = rotation * Vec3::NEG_Z;
    let center = start + along * (length * 0.5) - up * SLAB_HALF_THICKNESS;
    (
        Transform::from_translation(center).with_rotation(rotation),
        Vec3::new(3.0, SLAB_HALF_THICKNESS, length * 0.5),
    )
}

pub fn spawn_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let ground = materials.add(StandardMaterial {
        base_color: Color::srgb(0.55, 0.5, 0.42),
        perceptual_roughness: 0.9,
        ..default()
    });
    let walkable = materials.add(Color::srgb(0.35, 0.55, 0.35));
    let steep = materials.add(Color::srgb(0.7, 0.3, 0.25));
    let ceiling = materials.add(Color::srgb(0.4, 0.4, 0.5));

    spawn_block(
        &mut commands,
        &mut meshes,
        ground,
        "Yard",
        Transform::from_xyz(0.0, -SLAB_HALF_THICKNESS, 0.0),
        Vec3::new(YARD_HALF_SIZE, SLAB_HALF_THICKNESS, YARD_HALF_SIZE),
    );

    let (transform, half) = ramp_transform(Vec3::new(0.0, 0.0, -10.0), 6.0, 30.0);
    spawn_block(&mut commands, &mut meshes, walkable, "Ramp", transform, half);

    let (transform, half) = ramp_transform(Vec3::new(10.0, 0.0, -10.0), 3.0, 55.0);
    spawn_block(&mut commands, &mut meshes, steep, "Steep Slope", transform, half);

    // Only a crouched capsule fits under.
    spawn_block(
        &mut commands,
        &mut meshes,
        ceiling,
        "Crawlspace",
        Transform::from_xyz(-10.0, 1.2 + SLAB_HALF_THICKNESS, 0.0),
        Vec3::new(2.0, SLAB_HALF_THICKNESS, 4.0),
    );

    let zones = [
        (
            "Wind",
            Zone::wind(Vec3::new(20.0, 1.5, 0.0), Vec3::new(5.0, 1.5, 5.0), Vec3::X * 2.0),
            Color::srgba(0.6, 0.8, 1.0, 0.15),
        ),
        (
            "Trampoline",
            Zone::trampoline(Vec3::new(-20.0, 0.0, 10.0), Vec3::new(1.5, 0.1, 1.5), 100.0),
            Color::srgba(1.0, 0.8, 0.2, 0.5),
        ),
        (
            "Reset",
            Zone::reset(
                Vec3::new(0.0, -15.0, 0.0),
                Vec3::new(200.0, 5.0, 200.0),
                Some(SPAWN_POINT + Vec3::Y),
            ),
            Color::NONE,
        ),
    ];
    for (name, zone, color) in zones {
        let size = zone.max - zone.min;
        commands.spawn((
            Name::new(format!("{name} Zone")),
            ZoneVolume::new(zone),
            Mesh3d(meshes.add(Cuboid::new(size.x, size.y, size.z))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: color,
                alpha_mode: AlphaMode::Blend,
                unlit: true,
                ..default()
            })),
            Transform::from_translation((zone.min + zone.max) * 0.5),
            if color == Color::NONE {
                Visibility::Hidden
            } else {
                Visibility::Inherited
            },
        ));
    }

    commands.spawn((
        DirectionalLight {
            illuminance: 10_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(8.0, 20.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    info!("Scene ready");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_top_starts_at_ground_and_climbs() {
        let (transform, half) = ramp_transform(Vec3::new(0.0, 0.0, -10.0), 6.0, 30.0);
        let up = transform.rotation * Vec3::Y;
        let along = transform.rotation * Vec3::NEG_Z;
        let low_edge = transform.translation + up * half.y - along * half.z;
        let high_edge = transform.translation + up * half.y + along * half.z;

        assert!(low_edge.distance(Vec3::new(0.0, 0.0, -10.0)) < 1e-4);
        assert!((high_edge.z - -16.0).abs() < 1e-4);
        assert!((high_edge.y - 6.0 * 30.0_f32.to_radians().tan()).abs() < 1e-4);
    }
}
