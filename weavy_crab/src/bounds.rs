//! Axis-aligned extents and the normalization transform derived from them.

use ultraviolet::Vec3;

/// Running per-axis minimum/maximum over a set of positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    min: Vec3,
    max: Vec3,
}

impl Default for Bounds {
    fn default() -> Bounds {
        Bounds::new()
    }
}

impl Bounds {
    /// Creates an empty bounds (+inf minimum, -inf maximum).
    pub fn new() -> Bounds {
        Bounds {
            min: Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Grows the bounds so that it contains `point`.
    pub fn extend(&mut self, point: Vec3) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Returns `true` if no point has been added yet.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Returns the size along each axis, or zero when empty.
    pub fn extent(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::zero()
        } else {
            self.max - self.min
        }
    }

    /// Computes `(center, scale)` such that `scale * (p - center)` maps the
    /// longest axis onto `[-1, 1]`.
    ///
    /// An empty or flat bounds keeps the scale at 1 and, when empty, centers
    /// on the origin.
    pub fn normalization(&self) -> (Vec3, f32) {
        if self.is_empty() {
            return (Vec3::zero(), 1.0);
        }

        let center = (self.min + self.max) * 0.5;
        let extent = self.max - self.min;
        let largest = extent.x.max(extent.y).max(extent.z);
        let scale = if largest > 0.0 && largest.is_finite() {
            2.0 / largest
        } else {
            1.0
        };

        (center, scale)
    }
}
