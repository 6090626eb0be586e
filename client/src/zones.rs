//! Trigger volumes for the Rapier scene: wind, trampoline and reset.
//!
//! Same box-and-feet rules as the sandbox world, checked once per fixed tick
//! before the physics step.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use fp_controller::prelude::*;
use fp_controller::sandbox::ZoneKind;

use crate::player::{world_gravity, Player};
use crate::rapier::{BodyQuery, RapierBody};

#[derive(Component, Debug)]
pub struct ZoneVolume {
    pub zone: Zone,
    /// Player feet were inside on the previous tick.
    occupied: bool,
}

impl ZoneVolume {
    pub fn new(zone: Zone) -> Self {
        Self {
            zone,
            occupied: false,
        }
    }

    /// Update occupancy for `feet`; returns `(inside, just_entered)`.
    pub fn track(&mut self, feet: Vec3) -> (bool, bool) {
        let inside = self.zone.contains(feet);
        let entered = inside && !self.occupied;
        self.occupied = inside;
        (inside, entered)
    }
}

pub fn apply_zones(
    configs: Query<&RapierConfiguration>,
    mut volumes: Query<&mut ZoneVolume>,
    mut players: Query<BodyQuery, With<Player>>,
) {
    let gravity = world_gravity(&configs);
    for mut item in players.iter_mut() {
        let mut body = RapierBody::bind(&mut item, None, gravity);
        let feet = body.position();

        for mut volume in volumes.iter_mut() {
            let (inside, entered) = volume.track(feet);
            match volume.zone.kind {
                ZoneKind::Wind { impulse } if inside => body.add_impulse(impulse),
                ZoneKind::Trampoline { impulse } if entered => {
                    body.add_impulse(Vec3::Y * impulse);
                }
                ZoneKind::Reset { respawn } if entered => {
                    info!("Reset zone: respawning at {respawn}");
                    body.transform.translation = respawn;
                    body.set_velocity(Vec3::ZERO);
                }
                _ => {}
            }
        }
    }
}
