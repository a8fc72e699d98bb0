//! The four hull algorithms and what they share.
//!
//! Every algorithm copies its input into a working buffer on construction and
//! can build the 3D hull or the hull of the `xy` projection. A build returns a
//! [`GeometryHistory`] of frame-stamped primitives, or stops early with
//! [`Cancelled`] when the [`ProgressSink`] asks it to.

mod degenerate;
mod divide_and_conquer;
mod gift_wrap;
mod incremental;
mod quickhull;

pub use divide_and_conquer::DivideAndConquer;
pub use gift_wrap::GiftWrap;
pub use incremental::Incremental;
pub use quickhull::QuickHull;

use core::{fmt, str::FromStr};

use glam::DVec3;
use thiserror::Error;

use crate::{
    config::HullConfig,
    orient::{beyond, right_of},
    Frame, GeometryHistory, NoProgress, PointId, ProgressSink,
};

/// The type of degeneracy that prevents a hull from being built.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateInput {
    /// There are not enough points to start the algorithm.
    #[error("expected at least {required} points, found {found}")]
    TooFewPoints {
        /// The number of points the algorithm needs.
        required: usize,
        /// The number of points given.
        found: usize,
    },
    /// The points that must be distinct are equal.
    #[error("input points are coincident")]
    Coincident,
    /// The points lie on a single line.
    #[error("input points are collinear")]
    Collinear,
    /// The points lie on a single plane.
    #[error("input points are coplanar")]
    Coplanar,
}

/// An error returned when a hull cannot be built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    /// The input is degenerate. Reported before any frame is emitted.
    #[error("degenerate input: {0}")]
    DegenerateInput(#[from] DegenerateInput),
    /// A bounded loop failed to converge, typically because of round-off on
    /// nearly degenerate input.
    #[error("erroneous results by roundoff error: {0}")]
    RoundOff(&'static str),
}

/// Where a cancelled build stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cancelled {
    /// The frame counter when the build stopped.
    pub frame: Frame,
    /// The number of faces emitted before the build stopped.
    pub emitted: usize,
}

/// The result of a build that did not fail.
#[derive(Clone, Debug, PartialEq)]
pub enum BuildOutcome {
    /// The build ran to completion.
    Complete(GeometryHistory),
    /// The progress sink cancelled the build.
    Cancelled(Cancelled),
}

impl BuildOutcome {
    /// Returns the history if the build completed.
    #[inline]
    pub fn complete(self) -> Option<GeometryHistory> {
        match self {
            BuildOutcome::Complete(history) => Some(history),
            BuildOutcome::Cancelled(_) => None,
        }
    }

    /// Returns `true` if the build was cancelled.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BuildOutcome::Cancelled(_))
    }
}

/// Why a build stopped early.
#[derive(Debug)]
pub(crate) enum Halt {
    Cancelled(Cancelled),
    Failed(BuildError),
}

impl From<Cancelled> for Halt {
    #[inline]
    fn from(value: Cancelled) -> Self {
        Halt::Cancelled(value)
    }
}

impl From<BuildError> for Halt {
    #[inline]
    fn from(value: BuildError) -> Self {
        Halt::Failed(value)
    }
}

impl From<DegenerateInput> for Halt {
    #[inline]
    fn from(value: DegenerateInput) -> Self {
        Halt::Failed(value.into())
    }
}

/// Turns the result of a build into its public outcome and logs it.
pub(crate) fn conclude(
    algorithm: &'static str,
    dimension: u8,
    points: usize,
    result: Result<GeometryHistory, Halt>,
) -> Result<BuildOutcome, BuildError> {
    match result {
        Ok(history) => {
            tracing::debug!(
                algorithm,
                dimension,
                points,
                final_frame = history.final_frame(),
                primitives = history.primitives().count(),
                "Hull built"
            );
            Ok(BuildOutcome::Complete(history))
        }
        Err(Halt::Cancelled(cancelled)) => {
            tracing::warn!(
                algorithm,
                dimension,
                frame = cancelled.frame,
                emitted = cancelled.emitted,
                "Hull build cancelled"
            );
            Ok(BuildOutcome::Cancelled(cancelled))
        }
        Err(Halt::Failed(error)) => {
            tracing::debug!(algorithm, dimension, points, %error, "Hull build failed");
            Err(error)
        }
    }
}

/// A convex hull algorithm that records its construction history.
pub trait HullAlgorithm {
    /// The display name of the algorithm.
    fn name(&self) -> &'static str;

    /// Colour indices the algorithm uses beyond the normal, added and
    /// deleted colours.
    fn extra_colors(&self) -> Vec<u32>;

    /// Builds the 3D hull, polling `progress` once per emitted face.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if the input is degenerate or the
    /// construction fails to converge.
    fn build_with_progress(&self, progress: &dyn ProgressSink)
        -> Result<BuildOutcome, BuildError>;

    /// Builds the hull of the `xy` projection, polling `progress` once per
    /// emitted edge.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if the input is degenerate or the
    /// construction fails to converge.
    fn build_2d_with_progress(
        &self,
        progress: &dyn ProgressSink,
    ) -> Result<BuildOutcome, BuildError>;

    /// Builds the 3D hull.
    ///
    /// # Errors
    ///
    /// See [`build_with_progress`](Self::build_with_progress).
    fn build(&self) -> Result<GeometryHistory, BuildError> {
        match self.build_with_progress(&NoProgress)? {
            BuildOutcome::Complete(history) => Ok(history),
            BuildOutcome::Cancelled(_) => unreachable!("NoProgress never cancels"),
        }
    }

    /// Builds the hull of the `xy` projection.
    ///
    /// # Errors
    ///
    /// See [`build_2d_with_progress`](Self::build_2d_with_progress).
    fn build_2d(&self) -> Result<GeometryHistory, BuildError> {
        match self.build_2d_with_progress(&NoProgress)? {
            BuildOutcome::Complete(history) => Ok(history),
            BuildOutcome::Cancelled(_) => unreachable!("NoProgress never cancels"),
        }
    }
}

/// The available hull algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Insert points one at a time, patching the hole each one carves.
    Incremental,
    /// Wrap the hull face by face from a known edge.
    GiftWrap,
    /// Merge hulls of the two halves of the points sorted by `x`.
    DivideAndConquer,
    /// Grow the hull towards the farthest conflicting point.
    QuickHull,
}

impl Algorithm {
    /// Every algorithm, in menu order.
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Incremental,
        Algorithm::GiftWrap,
        Algorithm::DivideAndConquer,
        Algorithm::QuickHull,
    ];

    /// The display name of the algorithm.
    pub const fn name(self) -> &'static str {
        match self {
            Algorithm::Incremental => "Incremental",
            Algorithm::GiftWrap => "Gift Wrap",
            Algorithm::DivideAndConquer => "Divide and Conquer",
            Algorithm::QuickHull => "QuickHull",
        }
    }

    /// Creates the algorithm over a copy of `points`.
    pub fn instantiate(self, points: &[DVec3], config: HullConfig) -> Box<dyn HullAlgorithm> {
        match self {
            Algorithm::Incremental => Box::new(Incremental::with_config(points, config)),
            Algorithm::GiftWrap => Box::new(GiftWrap::with_config(points, config)),
            Algorithm::DivideAndConquer => Box::new(DivideAndConquer::with_config(points, config)),
            Algorithm::QuickHull => Box::new(QuickHull::with_config(points, config)),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An error returned when parsing an unknown algorithm name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown hull algorithm: {0:?}")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    /// Parses a display name such as `"Gift Wrap"`, ignoring case, spaces,
    /// dashes and underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "incremental" => Ok(Algorithm::Incremental),
            "giftwrap" | "giftwrapping" => Ok(Algorithm::GiftWrap),
            "divideandconquer" | "dc" => Ok(Algorithm::DivideAndConquer),
            "quickhull" => Ok(Algorithm::QuickHull),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Finds the point `w` in `ids` such that no point of `ids` lies beyond the
/// triangle `start, end, w`.
///
/// The first point other than `start` and `end` is the initial candidate.
/// Each pass replaces the candidate with any point beyond its triangle, and
/// passes repeat until one leaves the candidate unchanged. For a hull edge
/// the result is the third vertex of the hull face on `start → end`. Returns
/// the position of `w` in `ids`, or `None` if `ids` holds no other point.
///
/// Ties between coplanar points are broken by a symbolic perturbation of the
/// input, so the result is unique even for degenerate point sets.
pub fn pivot(points: &[DVec3], ids: &[PointId], start: PointId, end: PointId) -> Option<usize> {
    let mut best = ids.iter().position(|&id| id != start && id != end)?;
    // A pass that changes the candidate rules out at least one more point.
    for _ in 0..ids.len() {
        let mut changed = false;
        for (index, &id) in ids.iter().enumerate() {
            if beyond(points, [start, end, ids[best]], id) {
                best = index;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    Some(best)
}

/// The 2D counterpart of [`pivot`]: finds the point `w` such that no point
/// lies to the right of `from → w` when seen from above.
pub fn pivot_2d(points: &[DVec3], ids: &[PointId], from: PointId) -> Option<usize> {
    let mut best = ids.iter().position(|&id| id != from)?;
    for _ in 0..ids.len() {
        let mut changed = false;
        for (index, &id) in ids.iter().enumerate() {
            if right_of(points, [from, ids[best]], id) {
                best = index;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    Some(best)
}

/// Returns the point with the smallest `y`, breaking ties by `x`, so the
/// result is a hull vertex. Ties between points with the same `x` and `y` go
/// to the last one.
pub(crate) fn bottom(points: &[DVec3]) -> PointId {
    let key = |p: DVec3| (p.y, p.x);
    let mut best = 0;
    for (index, &point) in points.iter().enumerate().skip(1) {
        if key(point) <= key(points[best]) {
            best = index;
        }
    }
    PointId::from(best)
}

#[cfg(test)]
mod tests;
