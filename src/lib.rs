//! # Hull History
//!
//! Convex hulls of 2D and 3D point sets that record how they were built.
//!
//! Four classic algorithms are provided: [`Incremental`], [`GiftWrap`],
//! [`DivideAndConquer`] and [`QuickHull`]. Each one can build the 3D hull or
//! the hull of the `xy` projection. Instead of only returning the final
//! faces, a build returns a [`GeometryHistory`]: every vertex, segment and
//! triangle the algorithm touched, stamped with the frames at which it was
//! created, selected and deleted. Replaying the frames animates the
//! construction.
//!
//! ```
//! use hull_history::{Algorithm, Distribution, HullAlgorithm, HullConfig};
//!
//! let points = Distribution::InSphere.generate(50, 7);
//! let history = Algorithm::QuickHull
//!     .instantiate(&points, HullConfig::default())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(history.euler_characteristic(), 2);
//! assert!(points.iter().all(|&p| history.contains(p)));
//! ```
//!
//! Builds poll a [`ProgressSink`] once per emitted face, which can cancel
//! them from another thread.
//!
//! ## References
//!
//! - Franco P. Preparata and Michael Ian Shamos. 1985. Computational Geometry: An Introduction.
//! - C. Bradford Barber et al. 1996. [The Quickhull Algorithm for Convex Hulls](https://www.cise.ufl.edu/~ungor/courses/fall06/papers/QuickHull.pdf)

#![warn(missing_docs)]

mod boundary;
mod config;
mod distribution;
mod frame;
mod half_space;
mod history;
mod hull;
mod orient;
mod point;
mod progress;
mod quadtree;

pub use boundary::{Edge, EdgeStack, PointStack};
pub use config::{ColorHints, HullConfig, DEFAULT_BUCKET_CAPACITY, DEFAULT_MAX_DEPTH};
pub use distribution::{Distribution, UnknownDistribution};
pub use frame::{Frame, FrameKey, FrameStamped, Lifetime};
pub use half_space::HalfSpace;
pub use history::{
    Face, GeometryHistory, Group, HistoryNode, Primitive, Primitives, Segment, Triangle, Vertex,
    VertexMark,
};
pub use hull::{
    pivot, pivot_2d, Algorithm, BuildError, BuildOutcome, Cancelled, DegenerateInput,
    DivideAndConquer, GiftWrap, HullAlgorithm, Incremental, QuickHull, UnknownAlgorithm,
};
pub use point::PointId;
pub use progress::{NoProgress, ProgressMode, ProgressSink, ProgressTracker};
pub use quadtree::{QuadTree, Rect};
