use core::mem;

use glam::DVec3;

use super::{
    conclude,
    degenerate::{collinear, require_area, require_volume},
    BuildError, BuildOutcome, Halt, HullAlgorithm,
};
use crate::{
    boundary::{EdgeStack, PointStack},
    history::Trace,
    progress::Checkpoint,
    GeometryHistory, Group, HalfSpace, HullConfig, PointId, ProgressMode, ProgressSink,
};

/// QuickHull: every face keeps a conflict list of the points that can see
/// it, and the hull grows towards the farthest conflicting point.
///
/// Faces are processed in creation order, including faces created while the
/// loop runs. Visibility is exact and never ties, so a point that no new face
/// claims is inside the hull and is dropped. In 2D the hull grows the same
/// way: every segment the new vertex sees is deleted and the gap is bridged
/// by two segments.
#[derive(Clone, Debug)]
pub struct QuickHull {
    points: Vec<DVec3>,
    config: HullConfig,
}

/// Returns the points with the largest and the smallest `x`, comparing `y`
/// and `z` on ties.
fn extremes(points: &[DVec3]) -> (PointId, PointId) {
    let key = |p: DVec3| (p.x, p.y, p.z);
    let (mut max, mut min) = (0, 0);
    for (index, &point) in points.iter().enumerate().skip(1) {
        if key(point) > key(points[max]) {
            max = index;
        }
        if key(point) < key(points[min]) {
            min = index;
        }
    }
    (PointId::from(max), PointId::from(min))
}

impl QuickHull {
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

    /// Finds the point farthest from the vertical plane through `p0` and
    /// `p1` on its positive side. If that point is collinear with them, the
    /// point farthest on either side is used instead.
    ///
    /// Returns `None` if there is no point other than `p0` and `p1`.
    fn apex(&self, p0: PointId, p1: PointId) -> Option<PointId> {
        let points = self.points.as_slice();
        let plane = HalfSpace::from_segment(p0.position(points), p1.position(points));
        let others = || {
            (0..points.len())
                .map(PointId::from)
                .filter(move |&id| id != p0 && id != p1)
        };
        let farthest = |distance: &dyn Fn(PointId) -> f64| {
            let mut best: Option<(PointId, f64)> = None;
            for id in others() {
                let d = distance(id);
                if best.is_none_or(|(_, max)| d > max) {
                    best = Some((id, d));
                }
            }
            best.map(|(id, _)| id)
        };

        let p2 = farthest(&|id| plane.normal().dot(id.position(points)))?;
        if !collinear(p0.position(points), p1.position(points), p2.position(points)) {
            return Some(p2);
        }
        farthest(&|id| plane.distance(id.position(points)).abs())
    }

    fn run(&self, progress: &dyn ProgressSink) -> Result<GeometryHistory, Halt> {
        require_volume(&self.points)?;

        let points = self.points.as_slice();
        let mut checkpoint = Checkpoint::new(progress, points.len(), ProgressMode::Determinate);
        let mut trace = Trace::new(points);

        let (p0, p1) = extremes(points);
        let p2 = self
            .apex(p0, p1)
            .ok_or(BuildError::RoundOff("no apex for the seed triangle"))?;

        let mut faces = Vec::with_capacity(2 * points.len());
        let frame = trace.advance();
        faces.push(trace.triangle([p0, p1, p2], frame));
        let frame = trace.advance();
        faces.push(trace.triangle([p0, p2, p1], frame));
        checkpoint.seed(2);

        let mut dropped = 0;
        for id in (0..points.len()).map(PointId::from) {
            if id == p0 || id == p1 || id == p2 {
                continue;
            }
            if !faces[0].add(points, id) && !faces[1].add(points, id) {
                dropped += 1;
            }
        }

        let mut boundary = EdgeStack::new();
        let mut pool = Vec::new();
        let mut index = 0;
        while index < faces.len() {
            let current = index;
            index += 1;
            if !faces[current].lifetime.is_live() {
                continue;
            }
            let Some(apex) = faces[current].extreme(points) else {
                continue;
            };

            // Open the hole the new vertex can see into.
            let frame = trace.frame();
            for face in faces.iter_mut().filter(|face| face.lifetime.is_live()) {
                if face.sees(points, apex) {
                    face.lifetime.kill(frame);
                    for edge in face.edges() {
                        boundary.putp(edge.start, edge.end);
                    }
                    pool.append(&mut face.conflicts);
                }
            }

            let selected = trace.advance();
            faces[current].lifetime.select(selected);
            trace.select_vertex(apex, selected);

            while !boundary.is_empty() {
                let edge = boundary.get();
                let frame = trace.advance();
                let mut face = trace.triangle([edge.start, edge.end, apex], frame);

                let mut unclaimed = Vec::with_capacity(pool.len());
                for &id in pool.iter().rev() {
                    if id != apex && !face.add(points, id) {
                        unclaimed.push(id);
                    }
                }
                pool = unclaimed;

                faces.push(face);
                checkpoint.face(frame)?;
            }

            dropped += pool.iter().filter(|&&id| id != apex).count();
            pool.clear();
        }

        if dropped > 0 {
            tracing::trace!(dropped, "Dropped points that no face claimed");
        }
        Ok(trace.finish(Group::with_children(0, faces)))
    }

    fn run_2d(&self, progress: &dyn ProgressSink) -> Result<GeometryHistory, Halt> {
        require_area(&self.points)?;

        let points = self.points.as_slice();
        let mut checkpoint = Checkpoint::new(progress, points.len(), ProgressMode::Determinate);
        let mut trace = Trace::new(points);

        let (p0, p1) = extremes(points);
        let mut edges = Vec::with_capacity(2 * points.len());
        let frame = trace.advance();
        edges.push(trace.segment([p0, p1], frame));
        let frame = trace.advance();
        edges.push(trace.segment([p1, p0], frame));
        checkpoint.seed(2);

        for id in (0..points.len()).map(PointId::from) {
            if id == p0 || id == p1 {
                continue;
            }
            if !edges[0].add(points, id) {
                edges[1].add(points, id);
            }
        }

        let mut hole = PointStack::new();
        let mut pool = Vec::new();
        let mut index = 0;
        while index < edges.len() {
            let current = index;
            index += 1;
            if !edges[current].lifetime.is_live() {
                continue;
            }
            let Some(apex) = edges[current].extreme(points) else {
                continue;
            };

            // The segments the apex sees form one chain, ending at the two
            // vertices the new segments join.
            let frame = trace.advance();
            for edge in edges.iter_mut().filter(|edge| edge.lifetime.is_live()) {
                if edge.sees(points, apex) {
                    edge.lifetime.kill(frame);
                    hole.putp(edge.start(), edge.end());
                    pool.append(&mut edge.conflicts);
                }
            }
            edges[current].lifetime.select(frame);
            trace.select_vertex(apex, frame);
            let (start, end) = (hole.pop_start(), hole.pop_end());

            let before = trace.advance();
            let mut first = trace.segment([start, apex], before);
            let after = trace.advance();
            let mut second = trace.segment([apex, end], after);
            for id in mem::take(&mut pool) {
                if id != apex && !first.add(points, id) {
                    second.add(points, id);
                }
            }

            edges.push(first);
            checkpoint.face(before)?;
            edges.push(second);
            checkpoint.face(after)?;
        }

        Ok(trace.finish(Group::with_children(0, edges)))
    }
}

impl HullAlgorithm for QuickHull {
    fn name(&self) -> &'static str {
        "QuickHull"
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
