use glam::DVec3;

use super::{
    bottom, conclude,
    degenerate::{require_area, require_volume},
    pivot, pivot_2d, BuildError, BuildOutcome, DegenerateInput, Halt, HullAlgorithm,
};
use crate::{
    boundary::{Edge, EdgeStack},
    frame::Lifetime,
    history::Trace,
    point::all_ids,
    progress::Checkpoint,
    GeometryHistory, Group, HistoryNode, HullConfig, PointId, ProgressMode, ProgressSink,
    QuadTree, Segment,
};

/// Gift wrapping: the hull is grown one face at a time across the open
/// edges of the faces found so far.
///
/// Faces are never deleted, so every emitted face belongs to the final hull.
/// In 3D the pivot step is answered by a [`QuadTree`] unless
/// [`HullConfig::quadtree`] is off.
#[derive(Clone, Debug)]
pub struct GiftWrap {
    points: Vec<DVec3>,
    config: HullConfig,
}

/// Finds the third vertex of the hull face on an edge.
enum Pivot {
    Linear(Vec<PointId>),
    Tree(QuadTree),
}

impl Pivot {
    fn find(&self, points: &[DVec3], edge: Edge) -> Option<PointId> {
        match self {
            Pivot::Linear(ids) => pivot(points, ids, edge.start, edge.end).map(|index| ids[index]),
            Pivot::Tree(tree) => tree.search(points, edge),
        }
    }
}

impl GiftWrap {
    /// Creates the algorithm over a copy of `points`.
    #[inline]
    pub fn new(points: &[DVec3]) -> Self {
        Self::with_config(points, HullConfig::default())
    }

    /// Creates the algorithm over a copy of `points` with the given configuration.
    #[inline]
    pub fn with_config(points: &[DVec3], config: HullConfig) -> Self {
        Self {
            points: points.to_vec(),
            config,
        }
    }

    /// The working copy of the input points.
    #[inline]
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    fn run(&self, progress: &dyn ProgressSink) -> Result<GeometryHistory, Halt> {
        require_volume(&self.points)?;

        let points = self.points.as_slice();
        let mut checkpoint = Checkpoint::new(progress, points.len(), ProgressMode::Indeterminate);
        let mut trace = Trace::new(points);

        let ids = all_ids(points);
        let bot = bottom(points);
        let bot2 = pivot_2d(points, &ids, bot)
            .map(|index| ids[index])
            .ok_or(DegenerateInput::Coincident)?;

        let pivot = if self.config.quadtree {
            Pivot::Tree(QuadTree::build(points, &self.config))
        } else {
            Pivot::Linear(ids)
        };

        let mut nodes: Vec<HistoryNode> = Vec::new();
        let frame = trace.advance();
        nodes.push(
            Segment {
                lifetime: Lifetime::instant(frame),
                ..trace.segment([bot, bot2], frame)
            }
            .into(),
        );

        let mut open = EdgeStack::new();
        open.put(bot, bot2);
        open.put(bot2, bot);

        // A closed triangulated sphere over n vertices has at most 2n - 4 faces.
        let limit = 2 * points.len();
        let mut faces = 0;
        while let Some(edge) = open.pop() {
            let candidate = pivot
                .find(points, edge)
                .ok_or(BuildError::RoundOff("no pivot for an open edge"))?;

            let frame = trace.advance();
            nodes.push(trace.triangle([edge.start, edge.end, candidate], frame).into());
            faces += 1;
            if faces > limit {
                return Err(BuildError::RoundOff("gift wrap did not close").into());
            }

            open.putp(edge.start, candidate);
            open.putp(candidate, edge.end);
            checkpoint.face(frame)?;
        }

        tracing::trace!(faces, "Gift wrap closed");
        Ok(trace.finish(Group::with_children(0, nodes)))
    }

    fn run_2d(&self, progress: &dyn ProgressSink) -> Result<GeometryHistory, Halt> {
        require_area(&self.points)?;

        let points = self.points.as_slice();
        let mut checkpoint = Checkpoint::new(progress, points.len(), ProgressMode::Indeterminate);
        let mut trace = Trace::new(points);
        let ids = all_ids(points);

        let bot = bottom(points);
        let mut nodes: Vec<HistoryNode> = Vec::new();
        let frame = trace.advance();
        nodes.push(trace.mark(bot, frame).into());

        let limit = points.len() + 1;
        let mut current = bot;
        loop {
            let next = pivot_2d(points, &ids, current)
                .map(|index| ids[index])
                .ok_or(DegenerateInput::Coincident)?;

            let frame = trace.advance();
            nodes.push(trace.segment([current, next], frame).into());
            if nodes.len() > limit {
                return Err(BuildError::RoundOff("gift wrap did not close").into());
            }
            checkpoint.face(frame)?;

            current = next;
            if current == bot {
                break;
            }
        }

        Ok(trace.finish(Group::with_children(0, nodes)))
    }
}

impl HullAlgorithm for GiftWrap {
    fn name(&self) -> &'static str {
        "Gift Wrap"
    }

    fn extra_colors(&self) -> Vec<u32> {
        Vec::new()
    }

    fn build_with_progress(
        &self,
        progress: &dyn ProgressSink,
    ) -> Result<BuildOutcome, BuildError> {
        conclude(self.name(), 3, self.points.len(), self.run(progress))
    }

    fn build_2d_with_progress(
        &self,
        progress: &dyn ProgressSink,
    ) -> Result<BuildOutcome, BuildError> {
        conclude(self.name(), 2, self.points.len(), self.run_2d(progress))
    }
}
