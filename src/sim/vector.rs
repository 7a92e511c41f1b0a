//! 2D vector math
//!
//! `Vector2D` is `glam::Vec2`; this module adds the handful of operations the
//! simulation needs on top of it with the semantics the game relies on
//! (zero-safe normalization, screen-space heading angle).

use glam::Vec2;

pub type Vector2D = Vec2;

pub trait Vector2DExt {
    /// Unit vector in the same direction, or `(0, 0)` for the zero vector
    fn normalized(self) -> Vec2;
    /// Perpendicular vector `(-y, x)`
    fn perpendicular(self) -> Vec2;
    /// Heading measured from screen-up in a y-down world, in `(-π, π]`
    fn heading(self) -> f32;
    /// Rotate by the given number of degrees
    fn rotated_deg(self, degrees: f32) -> Vec2;
}

impl Vector2DExt for Vec2 {
    #[inline]
    fn normalized(self) -> Vec2 {
        self.normalize_or_zero()
    }

    #[inline]
    fn perpendicular(self) -> Vec2 {
        self.perp()
    }

    #[inline]
    fn heading(self) -> f32 {
        // atan2 of the perpendicular: our cartesian plane is flipped
        let p = self.perpendicular();
        p.y.atan2(p.x)
    }

    #[inline]
    fn rotated_deg(self, degrees: f32) -> Vec2 {
        Vec2::from_angle(degrees.to_radians()).rotate(self)
    }
}
