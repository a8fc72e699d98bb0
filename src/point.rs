use glam::DVec3;

/// The index of a point in the working copy of the input point set.
///
/// Points are compared by identity: two points with identical coordinates
/// are still distinct vertices if they have different ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointId(pub u32);

impl PointId {
    /// A placeholder `PointId` that does not correspond to any valid point.
    pub const PLACEHOLDER: PointId = PointId(u32::MAX);

    /// Returns the underlying index of the point as a `usize`.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the position of the point in `points`.
    #[inline]
    pub fn position(self, points: &[DVec3]) -> DVec3 {
        points[self.index()]
    }
}

impl From<u32> for PointId {
    #[inline]
    fn from(value: u32) -> Self {
        PointId(value)
    }
}

impl From<usize> for PointId {
    #[inline]
    fn from(value: usize) -> Self {
        debug_assert!(value < u32::MAX as usize);
        PointId(value as u32)
    }
}

/// Returns the ids of every point in `points`, in input order.
#[inline]
pub fn all_ids(points: &[DVec3]) -> Vec<PointId> {
    (0..points.len()).map(PointId::from).collect()
}
