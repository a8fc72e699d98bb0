use glam::DVec3;

use super::{
    conclude,
    degenerate::{require_area, require_volume},
    pivot, BuildError, BuildOutcome, Halt, HullAlgorithm,
};
use crate::{
    boundary::PointStack,
    config::ColorHints,
    frame::Lifetime,
    history::{Primitive, Trace},
    orient::right_of,
    point::all_ids,
    progress::Checkpoint,
    Frame, GeometryHistory, Group, HistoryNode, HullConfig, PointId, ProgressMode, ProgressSink,
    Segment,
};

/// Divide and conquer: the points are ordered by descending `x`, split in
/// half, and the hulls of the halves are merged.
///
/// The merge walks a belt of new faces around the seam between the two
/// sub-hulls, starting from their lower common tangent, and then deletes the
/// sub-hull faces that the other half can see. Each sub-hull is kept as a
/// nested [`Group`] tagged with the left or right colour.
#[derive(Clone, Debug)]
pub struct DivideAndConquer {
    points: Vec<DVec3>,
    order: Vec<PointId>,
    config: HullConfig,
}

impl DivideAndConquer {
    /// Creates the algorithm over a copy of `points`.
    #[inline]
    pub fn new(points: &[DVec3]) -> Self {
        Self::with_config(points, HullConfig::default())
    }

    /// Creates the algorithm over a copy of `points` with the given
    /// configuration.
    pub fn with_config(points: &[DVec3], config: HullConfig) -> Self {
        let points = points.to_vec();
        let mut order = all_ids(&points);
        order.sort_by(|a, b| b.position(&points).x.total_cmp(&a.position(&points).x));
        Self {
            points,
            order,
            config,
        }
    }

    /// The working copy of the input points, in input order.
    #[inline]
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// The point ids stably sorted by descending `x`. The recursion splits
    /// this sequence in halves.
    #[inline]
    pub fn order(&self) -> &[PointId] {
        &self.order
    }

    fn run(&self, progress: &dyn ProgressSink) -> Result<GeometryHistory, Halt> {
        require_volume(&self.points)?;
        let mut merger = Merger::new(&self.points, &self.order, progress, self.config.colors);
        let root = merger.merge(0, self.points.len() - 1)?;
        Ok(merger.trace.finish(root))
    }

    fn run_2d(&self, progress: &dyn ProgressSink) -> Result<GeometryHistory, Halt> {
        require_area(&self.points)?;
        let mut merger = Merger::new(&self.points, &self.order, progress, self.config.colors);
        let root = merger.merge_2d(0, self.points.len() - 1)?;
        Ok(merger.trace.finish(root))
    }
}

/// The recursion state shared by every level of a build.
///
/// Ranges such as `first..=last` are positions in `order`, not point ids.
struct Merger<'a> {
    trace: Trace<'a>,
    order: &'a [PointId],
    checkpoint: Checkpoint<'a>,
    colors: ColorHints,
}

impl<'a> Merger<'a> {
    fn new(
        points: &'a [DVec3],
        order: &'a [PointId],
        progress: &'a dyn ProgressSink,
        colors: ColorHints,
    ) -> Self {
        Self {
            trace: Trace::new(points),
            order,
            checkpoint: Checkpoint::new(progress, points.len(), ProgressMode::Indeterminate),
            colors,
        }
    }

    /// Tags the hull of a half with its colour.
    fn paint(&self, half: Option<Group>, color: u32) -> Option<Group> {
        half.map(|mut group| {
            group.color = Some(color);
            group
        })
    }

    /// Builds the 3D hull of `first..=last`, or nothing for fewer than three
    /// points.
    fn sub_hull(&mut self, first: usize, last: usize) -> Result<Option<Group>, Halt> {
        self.checkpoint.poll(self.trace.frame())?;
        if last - first < 2 {
            return Ok(None);
        }
        self.merge(first, last).map(Some)
    }

    fn merge(&mut self, first: usize, last: usize) -> Result<Group, Halt> {
        let mid = (first + last) / 2;
        let mut group = Group::new(self.trace.frame());

        let left = self.sub_hull(first, mid)?;
        let mut left = self.paint(left, self.colors.left);
        let right = self.sub_hull(mid + 1, last)?;
        let mut right = self.paint(right, self.colors.right);

        let order = self.order;
        let (tangent_left, tangent_right) = self.lower_tangent(first, mid, last)?;
        let frame = self.trace.advance();
        let tangent = Segment {
            lifetime: Lifetime::instant(frame),
            ..self
                .trace
                .segment([order[tangent_left], order[tangent_right]], frame)
        };

        // Walk around the seam until the tangent edge comes back.
        let points = self.trace.points();
        let ids = &order[first..=last];
        let limit = 2 * ids.len();
        let mut faces = Vec::new();
        let (mut l, mut r) = (tangent_left, tangent_right);
        loop {
            let candidate = pivot(points, ids, order[l], order[r])
                .map(|offset| first + offset)
                .ok_or(BuildError::RoundOff("no pivot for a seam edge"))?;

            let frame = self.trace.advance();
            faces.push(self.trace.triangle([l, r, candidate].map(|i| order[i]), frame));
            self.checkpoint.face(frame)?;

            if candidate <= mid {
                l = candidate;
            } else {
                r = candidate;
            }
            if (l, r) == (tangent_left, tangent_right) {
                break;
            }
            if faces.len() > limit {
                return Err(BuildError::RoundOff("merge walk did not return to the tangent").into());
            }
        }

        let frame = self.trace.frame();
        if let Some(left) = &mut left {
            purge(left, points, &order[mid + 1..=last], frame, None);
        }
        if let Some(right) = &mut right {
            purge(right, points, &order[first..=mid], frame, None);
        }
        self.trace.advance();

        tracing::trace!(first, last, faces = faces.len(), "Merged sub-hulls");
        group.children.extend(left.map(HistoryNode::from));
        group.children.extend(right.map(HistoryNode::from));
        group.push(tangent);
        group.children.extend(faces.into_iter().map(HistoryNode::from));
        Ok(group)
    }

    /// Relaxes a pair of endpoints until no point of either half lies to
    /// the right of the line from the right one to the left one, seen from
    /// above.
    fn lower_tangent(
        &self,
        first: usize,
        mid: usize,
        last: usize,
    ) -> Result<(usize, usize), BuildError> {
        let points = self.trace.points();
        let order = self.order;
        let below = |l: usize, r: usize, i: usize| right_of(points, [order[r], order[l]], order[i]);
        let (mut l, mut r) = (first, last);

        let limit = (mid + 1 - first) * (last - mid) + 1;
        for _ in 0..limit {
            let mut changed = false;
            for i in first..=mid {
                if i != l && below(l, r, i) {
                    l = i;
                    changed = true;
                }
            }
            for i in mid + 1..=last {
                if i != r && below(l, r, i) {
                    r = i;
                    changed = true;
                }
            }
            if !changed {
                return Ok((l, r));
            }
        }
        Err(BuildError::RoundOff("lower tangent did not converge"))
    }

    /// Builds the 2D hull of `first..=last`, or nothing for a single point.
    fn sub_hull_2d(&mut self, first: usize, last: usize) -> Result<Option<Group>, Halt> {
        self.checkpoint.poll(self.trace.frame())?;
        if last - first < 1 {
            return Ok(None);
        }
        self.merge_2d(first, last).map(Some)
    }

    fn merge_2d(&mut self, first: usize, last: usize) -> Result<Group, Halt> {
        let mid = (first + last) / 2;
        let mut group = Group::new(self.trace.frame());

        let left = self.sub_hull_2d(first, mid)?;
        let mut left = self.paint(left, self.colors.left);
        let right = self.sub_hull_2d(mid + 1, last)?;
        let mut right = self.paint(right, self.colors.right);
        self.trace.advance();

        let points = self.trace.points();
        let order = self.order;
        let frame = self.trace.frame();

        // A half without edges is a single point, which closes its own hole.
        let mut left_hole = PointStack::new();
        if let Some(left) = &mut left {
            purge(left, points, &order[mid + 1..=last], frame, Some(&mut left_hole));
        }
        if left_hole.is_empty() {
            left_hole.put(order[first], order[first]);
        }
        let mut right_hole = PointStack::new();
        if let Some(right) = &mut right {
            purge(right, points, &order[first..=mid], frame, Some(&mut right_hole));
        }
        if right_hole.is_empty() {
            right_hole.put(order[last], order[last]);
        }

        group.children.extend(left.map(HistoryNode::from));
        group.children.extend(right.map(HistoryNode::from));

        let upper = self
            .trace
            .segment([left_hole.pop_start(), right_hole.pop_end()], frame);
        group.push(upper);
        self.checkpoint.face(frame)?;
        let lower = self
            .trace
            .segment([right_hole.pop_start(), left_hole.pop_end()], frame);
        group.push(lower);
        self.checkpoint.face(frame)?;
        self.trace.advance();

        Ok(group)
    }
}

/// Kills the live faces of `group` that a point of `others` can see.
///
/// In 2D the endpoints of every killed segment are recorded in `hole`.
fn purge(
    group: &mut Group,
    points: &[DVec3],
    others: &[PointId],
    frame: Frame,
    mut hole: Option<&mut PointStack>,
) {
    for child in &mut group.children {
        match child {
            HistoryNode::Group(nested) => {
                purge(nested, points, others, frame, hole.as_deref_mut());
            }
            HistoryNode::Primitive(Primitive::Triangle(triangle)) if triangle.lifetime.is_live() => {
                if others.iter().any(|&j| triangle.sees(points, j)) {
                    triangle.lifetime.kill(frame);
                }
            }
            HistoryNode::Primitive(Primitive::Segment(segment)) if segment.lifetime.is_live() => {
                let Some(hole) = hole.as_deref_mut() else {
                    continue;
                };
                if others.iter().any(|&j| segment.sees(points, j)) {
                    segment.lifetime.kill(frame);
                    hole.putp(segment.start(), segment.end());
                }
            }
            HistoryNode::Primitive(_) => {}
        }
    }
}

impl HullAlgorithm for DivideAndConquer {
    fn name(&self) -> &'static str {
        "Divide and Conquer"
    }

    fn extra_colors(&self) -> Vec<u32> {
        vec![self.config.colors.left, self.config.colors.right]
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

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use glam::dvec3;

    use super::*;
    use crate::{Distribution, FrameStamped};

    #[test]
    fn order_is_sorted_by_descending_x() {
        let points = Distribution::InCube.generate(50, 1);
        let algorithm = DivideAndConquer::new(&points);
        assert_eq!(algorithm.points(), points.as_slice());
        assert!(algorithm
            .order()
            .windows(2)
            .all(|w| w[0].position(&points).x >= w[1].position(&points).x));

        // Equal `x` keeps input order.
        let tied = [DVec3::Y, DVec3::X, DVec3::ZERO, DVec3::Z];
        let order = DivideAndConquer::new(&tied).order().to_vec();
        assert_eq!(order, [1u32, 0, 2, 3].map(PointId));
    }

    #[test]
    fn tetrahedron() {
        let points = vec![DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z];
        let history = DivideAndConquer::new(&points).build().unwrap();

        // Tangent, four seam faces and the purge frame.
        assert_eq!(history.final_frame(), 7);
        assert_eq!(history.final_triangles().count(), 4);
        assert!(history.is_closed_surface());

        let tangent = history.primitives().next().unwrap();
        assert!(tangent.as_segment().is_some());
        assert_eq!(tangent.last_frame(), Some(1));
    }

    #[test]
    fn three_points_give_a_flat_pair() {
        let points = vec![DVec3::ZERO, DVec3::X, DVec3::Y];
        let order = all_ids(&points);
        let mut merger = Merger::new(&points, &order, &crate::NoProgress, ColorHints::default());
        let group = merger.merge(0, 2).unwrap();

        let triangles: Vec<&crate::Triangle> = group
            .primitives()
            .filter_map(|primitive| primitive.as_triangle())
            .collect();
        assert_eq!(triangles.len(), 2);
        let normal = triangles[0].half_space().normal();
        assert!(normal.dot(triangles[1].half_space().normal()) < 0.0);
    }

    #[test]
    fn sub_hulls_are_coloured_groups() {
        let points = Distribution::InSphere.generate(40, 5);
        let algorithm = DivideAndConquer::new(&points);
        let history = algorithm.build().unwrap();
        let colors = HullConfig::default().colors;

        let groups: Vec<&Group> = history
            .root()
            .children()
            .iter()
            .filter_map(|child| match child {
                HistoryNode::Group(group) => Some(group),
                HistoryNode::Primitive(_) => None,
            })
            .collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].color(), Some(colors.left));
        assert_eq!(groups[1].color(), Some(colors.right));
        assert_eq!(algorithm.extra_colors(), vec![colors.left, colors.right]);

        assert!(history.is_closed_surface());
        assert_eq!(history.euler_characteristic(), 2);
    }

    #[test]
    fn square() {
        let points = vec![
            dvec3(0.0, 0.0, 0.0),
            dvec3(1.0, 0.0, 0.0),
            dvec3(1.0, 1.0, 0.0),
            dvec3(0.0, 1.0, 0.0),
        ];
        let algorithm = DivideAndConquer::new(&points);
        let history = algorithm.build_2d().unwrap();

        assert_eq!(history.final_frame(), 7);
        assert!(history.is_closed_polygon());
        assert_eq!(history.hull_vertices().len(), 4);

        // Both halves lose the segment facing the other half.
        let killed = history
            .primitives()
            .filter(|primitive| primitive.last_frame() == Some(6))
            .count();
        assert_eq!(killed, 2);
    }

    #[test]
    fn hull_vertices_keep_input_ids() {
        let mut points: Vec<DVec3> = (0..8)
            .map(|i| dvec3((i >> 2) as f64, ((i >> 1) & 1) as f64, (i & 1) as f64))
            .collect();
        points.push(DVec3::splat(0.5));
        let history = DivideAndConquer::new(&points).build().unwrap();

        assert!(history.is_closed_surface());
        assert_eq!(history.euler_characteristic(), 2);
        assert_eq!(history.hull_vertices(), (0..8u32).map(PointId).collect::<BTreeSet<_>>());
        for &point in &points {
            assert!(history.contains(point));
        }
    }

    #[test]
    fn single_point_half_closes_its_own_hole() {
        let points = vec![dvec3(2.0, 0.0, 0.0), dvec3(1.0, 1.0, 0.0), dvec3(0.0, 0.0, 0.0)];
        let history = DivideAndConquer::new(&points).build_2d().unwrap();
        assert_eq!(history.final_segments().count(), 3);
        assert!(history.is_closed_polygon());
    }
}
