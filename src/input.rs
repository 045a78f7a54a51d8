//! Host-supplied input and the aim-line query.
//!
//! The core never polls devices.  Each frame the host fills an
//! [`InputFrame`]; tests can populate it directly to drive the player without
//! a real input device.

use bevy::math::{Vec2, Vec3};

/// Aggregated player intent for the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    /// Movement on the ground plane: `x` → world X, `y` → world Z.
    /// Normalised by the core, so raw WASD sums are fine.
    pub movement: Vec2,
    /// World-space point under the cursor, if the host could resolve one.
    pub aim_point: Option<Vec3>,
    pub fire_held: bool,
    /// Edge-triggered: consumed by the first frame that sees it.
    pub pause_requested: bool,
}

/// Raycast-style collaborator: closest obstruction along a ray.
pub trait ObstructionQuery: Send + Sync {
    /// First point hit travelling from `origin` along the unit vector `dir`
    /// within `max_dist`, or `None` when the ray is clear.
    fn closest_obstruction(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<Vec3>;
}

/// Nothing ever blocks the aim line.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenField;

impl ObstructionQuery for OpenField {
    fn closest_obstruction(&self, _origin: Vec3, _dir: Vec3, _max_dist: f32) -> Option<Vec3> {
        None
    }
}

/// Start and end of the aim guide line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimLine {
    pub start: Vec3,
    pub end: Vec3,
}

impl AimLine {
    /// Line from `origin` toward `target`, clamped to the first obstruction or
    /// to `max_len`.  `None` when the target coincides with the origin.
    pub fn toward(
        origin: Vec3,
        target: Vec3,
        max_len: f32,
        query: &dyn ObstructionQuery,
    ) -> Option<Self> {
        let dir = (target - origin).normalize_or_zero();
        if dir == Vec3::ZERO || max_len <= 0.0 {
            return None;
        }
        let end = query
            .closest_obstruction(origin, dir, max_len)
            .unwrap_or(origin + dir * max_len);
        Some(Self { start: origin, end })
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct WallAt(f32);

    impl ObstructionQuery for WallAt {
        fn closest_obstruction(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<Vec3> {
            (self.0 <= max_dist).then(|| origin + dir * self.0)
        }
    }

    #[test]
    fn clear_ray_extends_to_max_length() {
        let line = AimLine::toward(Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0), 100.0, &OpenField).unwrap();
        assert!((line.length() - 100.0).abs() < 1e-4);
        assert!((line.end - Vec3::new(0.0, 0.0, 100.0)).length() < 1e-4);
    }

    #[test]
    fn obstruction_clamps_the_line() {
        let line =
            AimLine::toward(Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0), 100.0, &WallAt(7.5)).unwrap();
        assert!((line.length() - 7.5).abs() < 1e-4);
    }

    #[test]
    fn degenerate_target_has_no_line() {
        assert!(AimLine::toward(Vec3::ONE, Vec3::ONE, 100.0, &OpenField).is_none());
    }
}
