use glam::DVec3;

/// An oriented plane splitting space into an inside and an outside.
///
/// A point is inside when `normal · p > offset`. The comparison is strict,
/// so points on the plane are never inside. For a hull face, "inside" means
/// the point can see the face.
///
/// A half-space built from coincident or collinear points has a zero normal
/// and contains nothing. Callers must not rely on such half-spaces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HalfSpace {
    normal: DVec3,
    offset: f64,
}

impl HalfSpace {
    /// Creates the half-space bounded by the plane through `a`, `b` and `c`.
    ///
    /// The normal is `(b - a) × (c - a)`, normalized, so the inside is the
    /// side from which `a, b, c` appear counterclockwise.
    #[inline]
    pub fn from_triangle(a: DVec3, b: DVec3, c: DVec3) -> Self {
        let normal = (b - a).cross(c - a).normalize_or_zero();
        Self {
            normal,
            offset: normal.dot(a),
        }
    }

    /// Creates the vertical half-space bounded by the plane through `a` and `b`
    /// that contains the up axis.
    ///
    /// Viewed from above, the inside is to the right of `a → b`, so a
    /// counterclockwise boundary sees nothing of its own interior.
    #[inline]
    pub fn from_segment(a: DVec3, b: DVec3) -> Self {
        Self::from_triangle(a, b, a + DVec3::Z)
    }

    /// Returns the unit normal of the bounding plane, or zero if degenerate.
    #[inline]
    pub fn normal(&self) -> DVec3 {
        self.normal
    }

    /// Returns the signed distance of the bounding plane from the origin.
    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Returns `true` if the half-space was built from degenerate points.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.normal == DVec3::ZERO
    }

    /// Returns `true` if `point` lies strictly inside the half-space.
    #[inline]
    pub fn inside(&self, point: DVec3) -> bool {
        self.normal.dot(point) > self.offset
    }

    /// Returns how far `point` lies beyond the bounding plane.
    ///
    /// Positive values are inside.
    #[inline]
    pub fn distance(&self, point: DVec3) -> f64 {
        self.normal.dot(point) - self.offset
    }

    /// Returns the height of the bounding plane above `(x, y)`.
    ///
    /// Only meaningful when the normal has a non-zero `z` component.
    #[inline]
    pub fn z_intersect(&self, x: f64, y: f64) -> f64 {
        (self.offset - self.normal.x * x - self.normal.y * y) / self.normal.z
    }
}
