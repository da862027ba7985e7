//! Arena-space geometry: points, directions, and axis-aligned rectangles.
//!
//! Arena space has its origin in the top-left corner, x growing right and
//! y growing down, measured in arena units (one unit per pixel at 1:1).

use serde::{Deserialize, Serialize};

pub use glam::Vec2;

/// Unit vector for an angle in radians.
#[must_use]
pub fn direction_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle in radians of the vector from `from` to `to`.
#[must_use]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Whether two circles overlap (strictly).
#[must_use]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// Axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether the square of half-size `r` around `p` overlaps this rectangle.
    ///
    /// This is the conservative box test used for circle bodies: a circle
    /// is treated as its bounding square.
    #[must_use]
    pub fn overlaps_box(&self, p: Vec2, r: f32) -> bool {
        p.x + r > self.x && p.x - r < self.right() && p.y + r > self.y && p.y - r < self.bottom()
    }
}
