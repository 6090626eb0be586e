//! Trigger volumes that push or relocate the body.

use bevy::prelude::*;

/// Respawn point used by reset zones built without an explicit one.
pub const DEFAULT_RESPAWN: Vec3 = Vec3::Y;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoneKind {
    /// Impulse applied every step while the body is inside.
    Wind { impulse: Vec3 },
    /// Upward impulse applied once when the body enters.
    Trampoline { impulse: f32 },
    /// Teleport to `respawn` with zero velocity on entering.
    Reset { respawn: Vec3 },
}

/// Axis-aligned trigger box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    pub min: Vec3,
    pub max: Vec3,
    pub kind: ZoneKind,
}

impl Zone {
    pub fn new(center: Vec3, half_extents: Vec3, kind: ZoneKind) -> Self {
        let half_extents = half_extents.abs();
        Self {
            min: center - half_extents,
            max: center + half_extents,
            kind,
        }
    }

    pub fn wind(center: Vec3, half_extents: Vec3, impulse: Vec3) -> Self {
        Self::new(center, half_extents, ZoneKind::Wind { impulse })
    }

    pub fn trampoline(center: Vec3, half_extents: Vec3, impulse: f32) -> Self {
        Self::new(center, half_extents, ZoneKind::Trampoline { impulse })
    }

    pub fn reset(center: Vec3, half_extents: Vec3, respawn: Option<Vec3>) -> Self {
        Self::new(
            center,
            half_extents,
            ZoneKind::Reset {
                respawn: respawn.unwrap_or(DEFAULT_RESPAWN),
            },
        )
    }

    #[inline]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_inclusive() {
        let zone = Zone::wind(Vec3::ZERO, Vec3::ONE, Vec3::X);
        assert!(zone.contains(Vec3::ZERO));
        assert!(zone.contains(Vec3::ONE));
        assert!(!zone.contains(Vec3::new(1.1, 0.0, 0.0)));
    }

    #[test]
    fn test_reset_defaults_to_one_meter_up() {
        let zone = Zone::reset(Vec3::ZERO, Vec3::ONE, None);
        assert_eq!(
            zone.kind,
            ZoneKind::Reset {
                respawn: Vec3::Y
            }
        );
    }
}
