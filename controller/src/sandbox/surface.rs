//! Static collision geometry for the sandbox world.
//!
//! Everything is a one-sided plane. Terrain is a Perlin heightfield that is
//! treated as its local tangent plane wherever it is queried, which is plenty
//! for a capsule that only ever touches it a few centimeters at a time.

use bevy::prelude::*;
use noise::{NoiseFn, Perlin};

/// Friction coefficient of sandbox surfaces unless overridden.
pub const DEFAULT_SURFACE_FRICTION: f32 = 0.6;

/// Heightfield sampling offset for normals (meters).
const NORMAL_SAMPLE_DISTANCE: f32 = 0.5;

/// Perlin heightfield.
#[derive(Clone)]
pub struct NoiseTerrain {
    noise: Perlin,
    /// Peak height variation (meters).
    pub amplitude: f32,
    /// Noise frequency (1 / meters).
    pub frequency: f32,
    pub base_height: f32,
}

impl std::fmt::Debug for NoiseTerrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseTerrain")
            .field("amplitude", &self.amplitude)
            .field("frequency", &self.frequency)
            .field("base_height", &self.base_height)
            .finish()
    }
}

impl NoiseTerrain {
    pub fn new(seed: u32, amplitude: f32, frequency: f32, base_height: f32) -> Self {
        Self {
            noise: Perlin::new(seed),
            amplitude,
            frequency,
            base_height,
        }
    }

    pub fn height(&self, x: f32, z: f32) -> f32 {
        let n = self.noise.get([
            x as f64 * self.frequency as f64,
            z as f64 * self.frequency as f64,
        ]) as f32;
        self.base_height + n * self.amplitude
    }

    /// Surface normal from central differences.
    pub fn normal(&self, x: f32, z: f32) -> Vec3 {
        let d = NORMAL_SAMPLE_DISTANCE;
        let dx = (self.height(x + d, z) - self.height(x - d, z)) / (2.0 * d);
        let dz = (self.height(x, z + d) - self.height(x, z - d)) / (2.0 * d);
        Vec3::new(-dx, 1.0, -dz).normalize_or(Vec3::Y)
    }
}

#[derive(Debug, Clone)]
pub enum SurfaceShape {
    /// Infinite (or `bounds`-limited on XZ) plane through `origin`.
    Plane {
        origin: Vec3,
        normal: Vec3,
        bounds: Option<Rect>,
    },
    Terrain(NoiseTerrain),
}

/// A plane the world collides against, as seen from one query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalPlane {
    pub origin: Vec3,
    pub normal: Vec3,
    pub bounds: Option<Rect>,
}

impl LocalPlane {
    /// Signed distance from the plane, positive on the normal side.
    #[inline]
    pub fn distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point - self.origin)
    }

    /// Whether the XZ footprint of `point` lies on the plane's bounded part.
    #[inline]
    pub fn covers(&self, point: Vec3) -> bool {
        self.bounds
            .is_none_or(|bounds| bounds.contains(Vec2::new(point.x, point.z)))
    }
}

#[derive(Debug, Clone)]
pub struct Surface {
    pub shape: SurfaceShape,
    pub friction: f32,
}

impl Surface {
    /// Plane through `origin` facing `normal`. A degenerate normal faces up.
    pub fn plane(origin: Vec3, normal: Vec3) -> Self {
        Self {
            shape: SurfaceShape::Plane {
                origin,
                normal: normal.normalize_or(Vec3::Y),
                bounds: None,
            },
            friction: DEFAULT_SURFACE_FRICTION,
        }
    }

    /// Flat floor at `height`.
    pub fn ground(height: f32) -> Self {
        Self::plane(Vec3::Y * height, Vec3::Y)
    }

    /// Downward-facing ceiling at `height`.
    pub fn ceiling(height: f32) -> Self {
        Self::plane(Vec3::Y * height, Vec3::NEG_Y)
    }

    /// Slope through `origin` rising toward -Z by `angle` degrees.
    pub fn slope(origin: Vec3, angle: f32) -> Self {
        Self::plane(origin, Quat::from_rotation_x(angle.to_radians()) * Vec3::Y)
    }

    pub fn terrain(terrain: NoiseTerrain) -> Self {
        Self {
            shape: SurfaceShape::Terrain(terrain),
            friction: DEFAULT_SURFACE_FRICTION,
        }
    }

    /// Limit a plane to an XZ rectangle. No effect on terrain.
    pub fn with_bounds(mut self, rect: Rect) -> Self {
        if let SurfaceShape::Plane { bounds, .. } = &mut self.shape {
            *bounds = Some(rect);
        }
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// The plane this surface presents near `point`.
    pub fn local_plane(&self, point: Vec3) -> LocalPlane {
        match &self.shape {
            SurfaceShape::Plane {
                origin,
                normal,
                bounds,
            } => LocalPlane {
                origin: *origin,
                normal: *normal,
                bounds: *bounds,
            },
            SurfaceShape::Terrain(terrain) => LocalPlane {
                origin: Vec3::new(point.x, terrain.height(point.x, point.z), point.z),
                normal: terrain.normal(point.x, point.z),
                bounds: None,
            },
        }
    }

    /// Sweep a sphere from `origin` along `direction`. Starting overlapped is a hit at 0.
    pub fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Dir3,
        max_distance: f32,
    ) -> Option<(f32, Vec3, Vec3)> {
        let plane = self.local_plane(origin);
        let start = plane.distance(origin);

        // Fully behind a one-sided plane.
        if start < -radius {
            return None;
        }

        let distance = if start < radius {
            0.0
        } else {
            let approach = -plane.normal.dot(*direction);
            if approach <= 0.0 {
                return None;
            }
            let t = (start - radius) / approach;
            if t > max_distance {
                return None;
            }
            t
        };

        let center = origin + *direction * distance;
        let point = center - plane.normal * plane.distance(center).min(radius);
        plane
            .covers(point)
            .then_some((distance, plane.normal, point))
    }
}
