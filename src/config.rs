//! Tunable parameters for hull construction.

use crate::{Frame, Lifetime};

/// Number of points a quadtree leaf holds before it splits.
pub const DEFAULT_BUCKET_CAPACITY: usize = 10;

/// Depth at which quadtree leaves stop splitting.
///
/// Points sharing `x` and `y` can never be separated, so splitting has to
/// stop somewhere.
pub const DEFAULT_MAX_DEPTH: usize = 24;

/// Colour indices a renderer uses to draw a history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorHints {
    /// Colour for primitives with nothing special happening to them.
    pub normal: u32,
    /// Colour for primitives created at the shown frame.
    pub added: u32,
    /// Colour for primitives deleted at the shown frame.
    pub deleted: u32,
    /// Colour for primitives selected at the shown frame.
    pub selected: u32,
    /// Default colour of the left sub-hull in divide and conquer.
    pub left: u32,
    /// Default colour of the right sub-hull in divide and conquer.
    pub right: u32,
}

impl Default for ColorHints {
    fn default() -> Self {
        Self {
            normal: 0,
            added: 1,
            deleted: 2,
            selected: 3,
            left: 4,
            right: 5,
        }
    }
}

impl ColorHints {
    /// Picks the colour for a primitive shown at `frame`.
    ///
    /// Creation wins over selection, which wins over deletion. `fallback` is
    /// used when nothing happens to the primitive at `frame`, typically the
    /// colour of its enclosing group.
    pub fn color_at(&self, lifetime: &Lifetime, frame: Frame, fallback: u32) -> u32 {
        if lifetime.first == frame {
            self.added
        } else if lifetime.selected == Some(frame) {
            self.selected
        } else if lifetime.last == Some(frame) {
            self.deleted
        } else {
            fallback
        }
    }
}

/// Configuration shared by all hull algorithms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HullConfig {
    /// Whether Gift-Wrap answers its 3D pivot queries with a [`QuadTree`](crate::QuadTree).
    pub quadtree: bool,
    /// Number of points a quadtree leaf holds before it splits.
    pub bucket_capacity: usize,
    /// Depth at which quadtree leaves stop splitting.
    pub max_depth: usize,
    /// Colour indices attached to groups and reported by
    /// [`HullAlgorithm::extra_colors`](crate::HullAlgorithm::extra_colors).
    pub colors: ColorHints,
}

impl Default for HullConfig {
    fn default() -> Self {
        Self {
            quadtree: true,
            bucket_capacity: DEFAULT_BUCKET_CAPACITY,
            max_depth: DEFAULT_MAX_DEPTH,
            colors: ColorHints::default(),
        }
    }
}

impl HullConfig {
    /// Sets whether Gift-Wrap uses a quadtree.
    #[inline]
    pub fn with_quadtree(mut self, quadtree: bool) -> Self {
        self.quadtree = quadtree;
        self
    }

    /// Sets the quadtree bucket capacity. Values below 1 are raised to 1.
    #[inline]
    pub fn with_bucket_capacity(mut self, capacity: usize) -> Self {
        self.bucket_capacity = capacity.max(1);
        self
    }

    /// Sets the quadtree depth limit.
    #[inline]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the colour hints.
    #[inline]
    pub fn with_colors(mut self, colors: ColorHints) -> Self {
        self.colors = colors;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_follow_frames() {
        let colors = ColorHints::default();
        let mut lifetime = Lifetime::new(2);
        lifetime.select(4);
        lifetime.kill(5);
        assert_eq!(colors.color_at(&lifetime, 2, 9), colors.added);
        assert_eq!(colors.color_at(&lifetime, 3, 9), 9);
        assert_eq!(colors.color_at(&lifetime, 4, 9), colors.selected);
        assert_eq!(colors.color_at(&lifetime, 5, 9), colors.deleted);
    }

    #[test]
    fn bucket_capacity_is_at_least_one() {
        assert_eq!(HullConfig::default().with_bucket_capacity(0).bucket_capacity, 1);
    }
}
