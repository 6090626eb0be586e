//! Controller error types.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A piece of the physics body the controller cannot run without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyComponent {
    RigidBody,
    Collider,
    Velocity,
    Friction,
    Mass,
}

impl fmt::Display for BodyComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BodyComponent::RigidBody => "rigid body",
            BodyComponent::Collider => "collider",
            BodyComponent::Velocity => "velocity",
            BodyComponent::Friction => "friction material",
            BodyComponent::Mass => "mass properties",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    /// The physics body lacks something the controller drives. Fatal at init.
    #[error("physics body is missing its {0}")]
    MissingComponent(BodyComponent),

    #[error("invalid movement settings: {0}")]
    InvalidSettings(String),

    #[error("failed to read settings file {path:?}: {source}")]
    SettingsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    SettingsParse(#[from] ron::error::SpannedError),
}
