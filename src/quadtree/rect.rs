use glam::{DVec2, DVec3};

/// An axis-aligned rectangle in the `xy` plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    /// The minimum corner of the rectangle.
    pub min: DVec2,
    /// The maximum corner of the rectangle.
    pub max: DVec2,
}

impl Rect {
    /// An empty rectangle with min set to the maximum possible value
    /// and max set to the minimum possible value.
    pub const INVALID: Self = Self {
        min: DVec2::splat(f64::MAX),
        max: DVec2::splat(f64::MIN),
    };

    /// Creates a new rectangle with the given minimum and maximum corners.
    #[inline]
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// Creates the rectangle bounding the `xy` projection of `points`.
    ///
    /// Returns [`Rect::INVALID`] for an empty slice.
    #[inline]
    pub fn from_points(points: &[DVec3]) -> Self {
        let mut rect = Self::INVALID;
        for point in points {
            rect.extend(point.truncate());
        }
        rect
    }

    /// Extends the rectangle to include the given point.
    #[inline]
    pub fn extend(&mut self, point: DVec2) -> &mut Self {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
        self
    }

    /// Returns `true` if the rectangle contains no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Returns the center point of the rectangle.
    #[inline]
    pub fn center(&self) -> DVec2 {
        (self.max + self.min) * 0.5
    }

    /// Splits the rectangle about its center into the `[ne, se, nw, sw]` quadrants.
    #[inline]
    pub fn quadrants(&self) -> [Rect; 4] {
        let c = self.center();
        [
            Rect::new(c, self.max),
            Rect::new(DVec2::new(c.x, self.min.y), DVec2::new(self.max.x, c.y)),
            Rect::new(DVec2::new(self.min.x, c.y), DVec2::new(c.x, self.max.y)),
            Rect::new(self.min, c),
        ]
    }

    /// Returns the index into [`quadrants`](Self::quadrants) that holds `point`.
    #[inline]
    pub fn quadrant_of(&self, point: DVec2) -> usize {
        let c = self.center();
        match (point.x >= c.x, point.y >= c.y) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        }
    }

    /// Returns the `[ne, se, nw, sw]` corners of the rectangle.
    #[inline]
    pub fn corners(&self) -> [DVec2; 4] {
        [
            self.max,
            DVec2::new(self.max.x, self.min.y),
            DVec2::new(self.min.x, self.max.y),
            self.min,
        ]
    }
}

#[cfg(test)]
mod tests {
    use glam::{dvec2, dvec3};

    use super::*;

    #[test]
    fn bounds_of_points() {
        let rect = Rect::from_points(&[dvec3(1.0, -2.0, 9.0), dvec3(-3.0, 4.0, -9.0)]);
        assert_eq!(rect.min, dvec2(-3.0, -2.0));
        assert_eq!(rect.max, dvec2(1.0, 4.0));
        assert!(Rect::from_points(&[]).is_empty());
    }

    #[test]
    fn quadrants_cover_their_points() {
        let rect = Rect::new(dvec2(0.0, 0.0), dvec2(2.0, 2.0));
        let quadrants = rect.quadrants();
        for point in [dvec2(1.5, 1.5), dvec2(1.5, 0.5), dvec2(0.5, 1.5), dvec2(0.5, 0.5)] {
            let quadrant = quadrants[rect.quadrant_of(point)];
            assert!(quadrant.min.x <= point.x && point.x <= quadrant.max.x);
            assert!(quadrant.min.y <= point.y && point.y <= quadrant.max.y);
        }
        assert_eq!(rect.quadrant_of(dvec2(1.0, 1.0)), 0);
    }
}
