use glam::DVec3;

use super::{
    conclude,
    degenerate::{require_seed_segment, require_seed_triangle},
    BuildError, BuildOutcome, Halt, HullAlgorithm,
};
use crate::{
    boundary::{EdgeStack, PointStack},
    history::{Primitive, Trace},
    progress::Checkpoint,
    Group, GeometryHistory, HistoryNode, HullConfig, PointId, ProgressMode, ProgressSink,
};

/// Incremental construction: points are inserted in input order.
///
/// Each point that lies outside the current hull deletes the faces it can
/// see and patches the hole with faces joining its boundary to the point.
/// Points inside the hull leave the frame counter untouched. A point on the
/// plane of the seed triangle still sees exactly one of the two seed faces.
#[derive(Clone, Debug)]
pub struct Incremental {
    points: Vec<DVec3>,
    config: HullConfig,
}

impl Incremental {
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
        require_seed_triangle(&self.points)?;

        let mut checkpoint = Checkpoint::new(progress, self.points.len(), ProgressMode::Determinate);
        let mut trace = Trace::new(&self.points);
        let mut boundary = EdgeStack::new();

        let [p0, p1, p2] = [0u32, 1, 2].map(PointId);
        let mut faces = Vec::with_capacity(2 * self.points.len());
        let frame = trace.advance();
        faces.push(trace.triangle([p0, p1, p2], frame));
        let frame = trace.advance();
        faces.push(trace.triangle([p0, p2, p1], frame));
        checkpoint.seed(2);

        for index in 3..self.points.len() {
            let id = PointId::from(index);

            // Delete the faces this point can see.
            let frame = trace.frame();
            let mut outside = false;
            for face in faces.iter_mut().filter(|face| face.lifetime.is_live()) {
                if face.sees(&self.points, id) {
                    face.lifetime.kill(frame);
                    outside = true;
                    for edge in face.edges() {
                        boundary.putp(edge.start, edge.end);
                    }
                }
            }
            if !outside {
                continue;
            }

            let selected = trace.advance();
            trace.select_vertex(id, selected);

            let frame = trace.frame();
            while !boundary.is_empty() {
                let edge = boundary.get();
                faces.push(trace.triangle([edge.start, edge.end, id], frame));
                checkpoint.face(frame)?;
            }
            trace.advance();
        }

        Ok(trace.finish(Group::with_children(0, faces)))
    }

    fn run_2d(&self, progress: &dyn ProgressSink) -> Result<GeometryHistory, Halt> {
        require_seed_segment(&self.points)?;

        let mut checkpoint = Checkpoint::new(progress, self.points.len(), ProgressMode::Determinate);
        let mut trace = Trace::new(&self.points);
        let mut boundary = PointStack::new();

        let [p0, p1] = [0u32, 1].map(PointId);
        let mut nodes: Vec<HistoryNode> = Vec::with_capacity(3 * self.points.len());
        let frame = trace.advance();
        nodes.push(trace.segment([p0, p1], frame).into());
        let frame = trace.advance();
        nodes.push(trace.segment([p1, p0], frame).into());
        checkpoint.seed(2);

        for index in 2..self.points.len() {
            let id = PointId::from(index);

            let frame = trace.frame();
            let mut outside = false;
            for node in &mut nodes {
                let HistoryNode::Primitive(Primitive::Segment(segment)) = node else {
                    continue;
                };
                if segment.lifetime.is_live() && segment.sees(&self.points, id) {
                    segment.lifetime.kill(frame);
                    outside = true;
                    boundary.putp(segment.start(), segment.end());
                }
            }
            if !outside {
                continue;
            }

            let marked = trace.advance();
            nodes.push(trace.mark(id, marked).into());

            let frame = trace.frame();
            let start = boundary.pop_start();
            let end = boundary.pop_end();
            nodes.push(trace.segment([start, id], frame).into());
            checkpoint.face(frame)?;
            nodes.push(trace.segment([id, end], frame).into());
            checkpoint.face(frame)?;
            trace.advance();
        }

        Ok(trace.finish(Group::with_children(0, nodes)))
    }
}

impl HullAlgorithm for Incremental {
    fn name(&self) -> &'static str {
        "Incremental"
    }

    fn extra_colors(&self) -> Vec<u32> {
        vec![self.config.colors.selected]
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
