//! First-person camera rig.
//!
//! The physics tick publishes an eye target; the render tick chases it. While
//! the body moves the camera lerps toward the target plus a little look-ahead
//! along the velocity, which hides the fixed-step stutter. Standing still, or
//! after a teleport, it snaps.

use bevy::prelude::*;

use crate::settings::CameraSettings;

/// Eye position for a body standing at `body_position` with the given collider height.
#[inline]
pub fn eye_position(body_position: Vec3, collider_height: f32, settings: &CameraSettings) -> Vec3 {
    body_position + Vec3::Y * (collider_height - settings.eye_offset)
}

/// Camera state owned by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    target: Vec3,
    position: Vec3,
    /// Degrees, positive looks up.
    pitch: f32,
    active: bool,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            position: Vec3::ZERO,
            pitch: 0.0,
            active: true,
        }
    }
}

impl CameraRig {
    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Jump straight to the target.
    pub fn snap(&mut self) {
        self.position = self.target;
    }

    /// Add `delta` degrees of pitch, clamped to the configured limit.
    pub fn add_pitch(&mut self, delta: f32, settings: &CameraSettings) {
        if !delta.is_finite() {
            return;
        }
        self.pitch = (self.pitch + delta).clamp(-settings.max_pitch, settings.max_pitch);
    }

    /// Advance the camera by one render frame.
    ///
    /// `standing_height` is the full (uncrouched) collider height; the snap
    /// distance scales with it.
    pub fn follow(
        &mut self,
        body_position: Vec3,
        body_velocity: Vec3,
        standing_height: f32,
        settings: &CameraSettings,
        dt: f32,
    ) {
        if !self.active {
            return;
        }

        let speed = body_velocity.length();
        let too_far =
            body_position.distance(self.position) > settings.snap_distance_factor * standing_height;
        if too_far || !speed.is_finite() || speed < settings.idle_speed {
            self.snap();
            return;
        }

        let goal = self.target + body_velocity * settings.look_ahead;
        let t = (settings.follow_rate * dt).clamp(0.0, 1.0);
        self.position = self.position.lerp(goal, t);
    }

    /// World rotation of the camera: body yaw with the rig's pitch on top.
    pub fn rotation(&self, body_rotation: Quat) -> Quat {
        body_rotation * Quat::from_rotation_x(self.pitch.to_radians())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig_at(position: Vec3, target: Vec3) -> CameraRig {
        let mut rig = CameraRig::default();
        rig.set_target(position);
        rig.snap();
        rig.set_target(target);
        rig
    }

    #[test]
    fn test_eye_position_sits_below_collider_top() {
        let settings = CameraSettings::default();
        let eye = eye_position(Vec3::new(1.0, 2.0, 3.0), 1.75, &settings);
        assert!((eye - Vec3::new(1.0, 3.65, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let settings = CameraSettings::default();
        let mut rig = CameraRig::default();
        rig.add_pitch(120.0, &settings);
        assert_eq!(rig.pitch(), 90.0);
        rig.add_pitch(-500.0, &settings);
        assert_eq!(rig.pitch(), -90.0);
        rig.add_pitch(f32::NAN, &settings);
        assert_eq!(rig.pitch(), -90.0);
    }

    #[test]
    fn test_idle_body_snaps() {
        let settings = CameraSettings::default();
        let target = Vec3::new(0.0, 1.65, 0.0);
        let mut rig = rig_at(Vec3::new(0.0, 1.6, 0.3), target);

        rig.follow(Vec3::ZERO, Vec3::ZERO, 1.75, &settings, 1.0 / 60.0);
        assert_eq!(rig.position(), target);
    }

    #[test]
    fn test_moving_body_lerps_with_look_ahead() {
        let settings = CameraSettings::default();
        let start = Vec3::new(0.0, 1.65, 0.0);
        let target = Vec3::new(0.0, 1.65, -0.1);
        let velocity = Vec3::new(0.0, 0.0, -5.0);
        let mut rig = rig_at(start, target);

        let dt = 0.02;
        rig.follow(Vec3::new(0.0, 0.0, -0.1), velocity, 1.75, &settings, dt);

        let goal = target + velocity * settings.look_ahead;
        let expected = start.lerp(goal, settings.follow_rate * dt);
        assert!((rig.position() - expected).length() < 1e-5);
    }

    #[test]
    fn test_falling_body_lerps() {
        let settings = CameraSettings::default();
        let start = Vec3::new(0.0, 5.0, 0.0);
        let target = Vec3::new(0.0, 4.9, 0.0);
        let velocity = Vec3::new(0.0, -8.0, 0.0);
        let mut rig = rig_at(start, target);

        let dt = 1.0 / 144.0;
        rig.follow(Vec3::new(0.0, 3.25, 0.0), velocity, 1.75, &settings, dt);

        let goal = target + velocity * settings.look_ahead;
        let expected = start.lerp(goal, settings.follow_rate * dt);
        assert_ne!(rig.position(), target);
        assert!((rig.position() - expected).length() < 1e-5);
    }

    #[test]
    fn test_far_camera_snaps() {
        let settings = CameraSettings::default();
        let target = Vec3::new(10.0, 1.65, 0.0);
        let mut rig = rig_at(Vec3::new(0.0, 1.65, 0.0), target);

        // 10m apart with a 1.75m body: well past 1.3 heights.
        rig.follow(Vec3::new(10.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0), 1.75, &settings, 0.02);
        assert_eq!(rig.position(), target);
    }

    #[test]
    fn test_inactive_rig_does_not_move() {
        let settings = CameraSettings::default();
        let mut rig = rig_at(Vec3::ZERO, Vec3::ONE);
        rig.set_active(false);
        rig.follow(Vec3::ONE, Vec3::ZERO, 1.75, &settings, 0.02);
        assert_eq!(rig.position(), Vec3::ZERO);
    }

    #[test]
    fn test_rotation_applies_pitch_after_yaw() {
        let settings = CameraSettings::default();
        let mut rig = CameraRig::default();
        rig.add_pitch(90.0, &settings);
        let forward = rig.rotation(Quat::IDENTITY) * Vec3::NEG_Z;
        assert!((forward - Vec3::Y).length() < 1e-5);
    }
}
