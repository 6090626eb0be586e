//! Movement and camera tuning.
//!
//! Scale: 1 unit = 1 meter. Defaults reproduce the stock first-person preset
//! (1.75m capsule, 5 m/s walk).
//!
//! Settings are immutable once handed to a controller. Share them through an
//! `Arc` and swap the whole value between ticks if an editor retunes them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ControllerError;

/// Fixed physics tick rate (Hz) used by the bundled apps.
pub const FIXED_TIMESTEP_HZ: f64 = 50.0;

/// Environment variable pointing at an optional RON settings file.
pub const SETTINGS_ENV_VAR: &str = "FPC_SETTINGS";

/// Character movement tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementSettings {
    /// Target walk speed (m/s).
    pub walk_speed: f32,
    /// Run speed = walk * run multiplier.
    pub run_multiplier: f32,
    /// Crouch speed = walk * crouch multiplier.
    pub crouch_multiplier: f32,
    /// Upward velocity change applied by a jump (m/s).
    pub jump_impulse: f32,
    /// Capsule radius.
    pub radius: f32,
    /// Standing capsule height. Crouching halves it.
    pub height: f32,
    /// Steepest walkable slope in degrees.
    pub max_slope_angle: f32,
    /// Friction coefficient used while idle on a walkable slope.
    pub max_friction: f32,
    /// Body mass applied at init.
    pub mass: f32,
    /// Length of the downward ground probe.
    pub ground_probe_distance: f32,
    /// Extra downward force (x gravity x mass) while moving on a moderate slope.
    pub slope_stick_factor: f32,
    /// Per-second decay of air-control axes that receive no input.
    pub air_decay_rate: f32,
    /// Share of fresh input blended into air control.
    pub air_input_scale: f32,
    pub camera: CameraSettings,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            walk_speed: 5.0,
            run_multiplier: 1.3,
            crouch_multiplier: 0.6,
            jump_impulse: 5.0,
            radius: 0.35,
            height: 1.75,
            max_slope_angle: 45.0,
            max_friction: 20.0,
            mass: 10.0,
            ground_probe_distance: 0.1,
            slope_stick_factor: 0.25,
            air_decay_rate: 2.0,
            air_input_scale: 0.5,
            camera: CameraSettings::default(),
        }
    }
}

/// First-person camera tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Eye sits this far below the top of the collider.
    pub eye_offset: f32,
    /// Lerp rate toward the target (per second).
    pub follow_rate: f32,
    /// Seconds of body velocity added to the follow target.
    pub look_ahead: f32,
    /// Snap when the camera drifts further than this many standing heights from the body.
    pub snap_distance_factor: f32,
    /// Below this horizontal speed (m/s) the camera snaps instead of lerping.
    pub idle_speed: f32,
    /// Vertical field of view in degrees.
    pub field_of_view: f32,
    pub near_clip: f32,
    pub far_clip: f32,
    /// Pitch limit in degrees (symmetric).
    pub max_pitch: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            eye_offset: 0.1,
            follow_rate: 5.0,
            look_ahead: 0.2,
            snap_distance_factor: 1.3,
            idle_speed: 0.05,
            field_of_view: 70.0,
            near_clip: 0.01,
            far_clip: 250.0,
            max_pitch: 90.0,
        }
    }
}

impl MovementSettings {
    /// Walk speed scaled by the run multiplier.
    #[inline]
    pub fn run_speed(&self) -> f32 {
        self.walk_speed * self.run_multiplier
    }

    /// Walk speed scaled by the crouch multiplier.
    #[inline]
    pub fn crouch_speed(&self) -> f32 {
        self.walk_speed * self.crouch_multiplier
    }

    /// Capsule height while crouched.
    #[inline]
    pub fn crouch_height(&self) -> f32 {
        self.height * 0.5
    }

    /// Check every field for values the algorithms cannot work with.
    pub fn validate(&self) -> Result<(), ControllerError> {
        let positive = [
            ("walk_speed", self.walk_speed),
            ("run_multiplier", self.run_multiplier),
            ("crouch_multiplier", self.crouch_multiplier),
            ("jump_impulse", self.jump_impulse),
            ("radius", self.radius),
            ("height", self.height),
            ("mass", self.mass),
            ("ground_probe_distance", self.ground_probe_distance),
            ("air_decay_rate", self.air_decay_rate),
            ("air_input_scale", self.air_input_scale),
            ("camera.follow_rate", self.camera.follow_rate),
            ("camera.snap_distance_factor", self.camera.snap_distance_factor),
            ("camera.field_of_view", self.camera.field_of_view),
            ("camera.near_clip", self.camera.near_clip),
            ("camera.max_pitch", self.camera.max_pitch),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ControllerError::InvalidSettings(format!(
                    "{name} must be finite and positive (got {value})"
                )));
            }
        }

        let non_negative = [
            ("max_friction", self.max_friction),
            ("slope_stick_factor", self.slope_stick_factor),
            ("camera.eye_offset", self.camera.eye_offset),
            ("camera.look_ahead", self.camera.look_ahead),
            ("camera.idle_speed", self.camera.idle_speed),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ControllerError::InvalidSettings(format!(
                    "{name} must be finite and non-negative (got {value})"
                )));
            }
        }

        if !(0.0..90.0).contains(&self.max_slope_angle) {
            return Err(ControllerError::InvalidSettings(format!(
                "max_slope_angle must be in [0, 90) degrees (got {})",
                self.max_slope_angle
            )));
        }

        if self.crouch_height() < 2.0 * self.radius {
            return Err(ControllerError::InvalidSettings(format!(
                "crouched height {} cannot hold a capsule of radius {}",
                self.crouch_height(),
                self.radius
            )));
        }

        if self.camera.max_pitch > 90.0 {
            return Err(ControllerError::InvalidSettings(format!(
                "camera.max_pitch must not exceed 90 degrees (got {})",
                self.camera.max_pitch
            )));
        }

        if !self.camera.far_clip.is_finite() || self.camera.far_clip <= self.camera.near_clip {
            return Err(ControllerError::InvalidSettings(format!(
                "camera clip planes must satisfy 0 < near < far (got {} / {})",
                self.camera.near_clip, self.camera.far_clip
            )));
        }

        Ok(())
    }

    /// Parse and validate settings from RON text. Missing fields keep their defaults.
    pub fn from_ron_str(text: &str) -> Result<Self, ControllerError> {
        let settings: Self = ron::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ControllerError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ControllerError::SettingsIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    /// Load from `FPC_SETTINGS` when set, otherwise use the defaults.
    pub fn from_env() -> Result<Self, ControllerError> {
        match std::env::var_os(SETTINGS_ENV_VAR) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
