//! The frame-stamped output of a hull build.
//!
//! Every algorithm records each vertex, segment and triangle it creates
//! together with the frames at which it appeared, was selected and was
//! deleted. A player can replay the construction by showing, for a given
//! frame, the primitives [`visible`](FrameStamped::visible) at that frame.

mod validation;

use std::collections::BTreeSet;

use foldhash::fast::FixedState;
use glam::DVec3;
use hashbrown::HashSet;

use crate::{
    boundary::Edge,
    orient::{beyond, orient2d, orient3d, right_of},
    Frame, FrameKey, FrameStamped, HalfSpace, Lifetime, PointId,
};

/// An input point together with its selection stamp.
#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
    pub(crate) position: DVec3,
    pub(crate) lifetime: Lifetime,
}

impl Vertex {
    /// The position of the vertex.
    #[inline]
    pub fn position(&self) -> DVec3 {
        self.position
    }
}

impl FrameStamped for Vertex {
    #[inline]
    fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }
}

/// A marker showing a single point, used by the 2D builds to highlight
/// the vertex being inserted.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexMark {
    pub(crate) point: PointId,
    pub(crate) lifetime: Lifetime,
}

impl VertexMark {
    /// The marked point.
    #[inline]
    pub fn point(&self) -> PointId {
        self.point
    }
}

impl FrameStamped for VertexMark {
    #[inline]
    fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }
}

/// A hull facet spanning `N` points: a segment in 2D, a triangle in 3D.
///
/// A facet can carry a conflict list: the points that lie strictly outside
/// it and therefore still see it.
#[derive(Clone, Debug, PartialEq)]
pub struct Face<const N: usize> {
    pub(crate) points: [PointId; N],
    pub(crate) half_space: HalfSpace,
    pub(crate) lifetime: Lifetime,
    pub(crate) conflicts: Vec<PointId>,
}

/// A 2D hull edge.
pub type Segment = Face<2>;

/// A 3D hull face.
pub type Triangle = Face<3>;

impl Face<2> {
    /// Creates a segment from `a` to `b`, created at `frame`.
    #[inline]
    pub fn new(points: &[DVec3], [a, b]: [PointId; 2], frame: Frame) -> Self {
        Self {
            points: [a, b],
            half_space: HalfSpace::from_segment(a.position(points), b.position(points)),
            lifetime: Lifetime::new(frame),
            conflicts: Vec::new(),
        }
    }

    /// The first point of the segment.
    #[inline]
    pub fn start(&self) -> PointId {
        self.points[0]
    }

    /// The second point of the segment.
    #[inline]
    pub fn end(&self) -> PointId {
        self.points[1]
    }
}

impl Face<3> {
    /// Creates the triangle `a, b, c`, created at `frame`.
    #[inline]
    pub fn new(points: &[DVec3], [a, b, c]: [PointId; 3], frame: Frame) -> Self {
        Self {
            points: [a, b, c],
            half_space: HalfSpace::from_triangle(
                a.position(points),
                b.position(points),
                c.position(points),
            ),
            lifetime: Lifetime::new(frame),
            conflicts: Vec::new(),
        }
    }

    /// The three directed edges of the triangle, in winding order.
    #[inline]
    pub fn edges(&self) -> [Edge; 3] {
        let [a, b, c] = self.points;
        [Edge::new(a, b), Edge::new(b, c), Edge::new(c, a)]
    }
}

impl<const N: usize> Face<N> {
    /// The points of the face in winding order.
    #[inline]
    pub fn points(&self) -> [PointId; N] {
        self.points
    }

    /// The half-space on the outer side of the face.
    #[inline]
    pub fn half_space(&self) -> &HalfSpace {
        &self.half_space
    }

    /// The points that can still see the face.
    #[inline]
    pub fn conflicts(&self) -> &[PointId] {
        &self.conflicts
    }

    /// Returns `true` if the point `id` can see the face.
    ///
    /// The test is exact. Points on the plane of a triangle, or on the line
    /// of a segment, are moved off it by a symbolic perturbation that is the
    /// same for every face, so each one sees exactly one of two opposite
    /// faces. A corner of the face never sees it.
    #[inline]
    pub fn sees(&self, points: &[DVec3], id: PointId) -> bool {
        match *self.points.as_slice() {
            [start, end] => right_of(points, [start, end], id),
            [a, b, c] => beyond(points, [a, b, c], id),
            _ => false,
        }
    }

    /// Adds `id` to the conflict list if it can see the face.
    ///
    /// Returns `true` if the point was added.
    #[inline]
    pub fn add(&mut self, points: &[DVec3], id: PointId) -> bool {
        if self.sees(points, id) {
            self.conflicts.push(id);
            true
        } else {
            false
        }
    }

    /// Returns the conflicting point farthest from the face plane.
    ///
    /// Ties go to the point that was added first.
    pub fn extreme(&self, points: &[DVec3]) -> Option<PointId> {
        let mut best: Option<(PointId, f64)> = None;
        for &id in &self.conflicts {
            let distance = self.half_space.distance(id.position(points));
            if best.is_none_or(|(_, max)| distance > max) {
                best = Some((id, distance));
            }
        }
        best.map(|(id, _)| id)
    }
}

impl<const N: usize> FrameStamped for Face<N> {
    #[inline]
    fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }
}

/// A single frame-stamped geometric primitive.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    /// A highlighted point.
    Vertex(VertexMark),
    /// An edge, either a 2D hull edge or a construction edge in 3D.
    Segment(Segment),
    /// A 3D hull face.
    Triangle(Triangle),
}

impl Primitive {
    /// Returns the triangle if this primitive is one.
    #[inline]
    pub fn as_triangle(&self) -> Option<&Triangle> {
        match self {
            Primitive::Triangle(triangle) => Some(triangle),
            _ => None,
        }
    }

    /// Returns the segment if this primitive is one.
    #[inline]
    pub fn as_segment(&self) -> Option<&Segment> {
        match self {
            Primitive::Segment(segment) => Some(segment),
            _ => None,
        }
    }

    #[inline]
    fn lifetime_mut(&mut self) -> &mut Lifetime {
        match self {
            Primitive::Vertex(mark) => &mut mark.lifetime,
            Primitive::Segment(segment) => &mut segment.lifetime,
            Primitive::Triangle(triangle) => &mut triangle.lifetime,
        }
    }
}

impl FrameStamped for Primitive {
    #[inline]
    fn lifetime(&self) -> &Lifetime {
        match self {
            Primitive::Vertex(mark) => &mark.lifetime,
            Primitive::Segment(segment) => &segment.lifetime,
            Primitive::Triangle(triangle) => &triangle.lifetime,
        }
    }
}

impl From<VertexMark> for Primitive {
    #[inline]
    fn from(value: VertexMark) -> Self {
        Primitive::Vertex(value)
    }
}

impl From<Segment> for Primitive {
    #[inline]
    fn from(value: Segment) -> Self {
        Primitive::Segment(value)
    }
}

impl From<Triangle> for Primitive {
    #[inline]
    fn from(value: Triangle) -> Self {
        Primitive::Triangle(value)
    }
}

/// An entry of a history: a primitive or a nested group.
#[derive(Clone, Debug, PartialEq)]
pub enum HistoryNode {
    /// A single primitive.
    Primitive(Primitive),
    /// A group of nodes, such as a divide-and-conquer sub-hull.
    Group(Group),
}

impl From<Primitive> for HistoryNode {
    #[inline]
    fn from(value: Primitive) -> Self {
        HistoryNode::Primitive(value)
    }
}

impl From<VertexMark> for HistoryNode {
    #[inline]
    fn from(value: VertexMark) -> Self {
        HistoryNode::Primitive(value.into())
    }
}

impl From<Segment> for HistoryNode {
    #[inline]
    fn from(value: Segment) -> Self {
        HistoryNode::Primitive(value.into())
    }
}

impl From<Triangle> for HistoryNode {
    #[inline]
    fn from(value: Triangle) -> Self {
        HistoryNode::Primitive(value.into())
    }
}

impl From<Group> for HistoryNode {
    #[inline]
    fn from(value: Group) -> Self {
        HistoryNode::Group(value)
    }
}

/// An ordered group of history nodes with an optional colour hint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Group {
    pub(crate) lifetime: Lifetime,
    pub(crate) color: Option<u32>,
    pub(crate) children: Vec<HistoryNode>,
}

impl Group {
    /// Creates an empty group starting at `first`.
    #[inline]
    pub fn new(first: Frame) -> Self {
        Self {
            lifetime: Lifetime::new(first),
            color: None,
            children: Vec::new(),
        }
    }

    /// Creates a group starting at `first` holding `children` in order.
    pub fn with_children<I>(first: Frame, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<HistoryNode>,
    {
        Self {
            lifetime: Lifetime::new(first),
            color: None,
            children: children.into_iter().map(Into::into).collect(),
        }
    }

    /// The colour index a renderer should default to for this group.
    #[inline]
    pub fn color(&self) -> Option<u32> {
        self.color
    }

    /// The nodes of the group in insertion order.
    #[inline]
    pub fn children(&self) -> &[HistoryNode] {
        &self.children
    }

    /// Appends a node to the group.
    #[inline]
    pub fn push(&mut self, node: impl Into<HistoryNode>) {
        self.children.push(node.into());
    }

    /// Iterates depth-first over every primitive in the group.
    #[inline]
    pub fn primitives(&self) -> Primitives<'_> {
        Primitives {
            stack: vec![self.children.iter()],
        }
    }

    fn close(&mut self, frame: Frame) {
        self.lifetime.close(frame);
        for child in &mut self.children {
            match child {
                HistoryNode::Primitive(primitive) => primitive.lifetime_mut().close(frame),
                HistoryNode::Group(group) => group.close(frame),
            }
        }
    }
}

impl FrameStamped for Group {
    #[inline]
    fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }
}

/// A depth-first iterator over the primitives of a [`Group`].
pub struct Primitives<'a> {
    stack: Vec<core::slice::Iter<'a, HistoryNode>>,
}

impl<'a> Iterator for Primitives<'a> {
    type Item = &'a Primitive;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let iter = self.stack.last_mut()?;
            match iter.next() {
                Some(HistoryNode::Primitive(primitive)) => return Some(primitive),
                Some(HistoryNode::Group(group)) => self.stack.push(group.children.iter()),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// The complete construction history of a hull.
///
/// The history owns a copy of the input points; [`PointId`]s stored in its
/// primitives index into [`vertices`](Self::vertices).
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryHistory {
    vertices: Vec<Vertex>,
    root: Group,
    final_frame: Frame,
}

impl GeometryHistory {
    /// The frame counter value when the build finished.
    ///
    /// Primitives whose last frame equals this value form the final hull.
    #[inline]
    pub fn final_frame(&self) -> Frame {
        self.final_frame
    }

    /// The input points with their selection stamps.
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// The position of the point `id`.
    #[inline]
    pub fn position(&self, id: PointId) -> DVec3 {
        self.vertices[id.index()].position
    }

    /// The top-level group of the history.
    #[inline]
    pub fn root(&self) -> &Group {
        &self.root
    }

    /// Iterates depth-first over every primitive.
    #[inline]
    pub fn primitives(&self) -> Primitives<'_> {
        self.root.primitives()
    }

    /// Returns `true` if the primitive belongs to the final hull.
    #[inline]
    pub fn is_final(&self, primitive: &impl FrameStamped) -> bool {
        primitive.last_frame() == Some(self.final_frame)
    }

    /// Iterates over the triangles of the final hull.
    pub fn final_triangles(&self) -> impl Iterator<Item = &Triangle> {
        self.primitives()
            .filter_map(Primitive::as_triangle)
            .filter(move |triangle| self.is_final(*triangle))
    }

    /// Iterates over the segments of the final hull.
    pub fn final_segments(&self) -> impl Iterator<Item = &Segment> {
        self.primitives()
            .filter_map(Primitive::as_segment)
            .filter(move |segment| self.is_final(*segment))
    }

    /// The points on the final hull.
    ///
    /// These are the corners of the final triangles, or of the final segments
    /// for a 2D build.
    pub fn hull_vertices(&self) -> BTreeSet<PointId> {
        let from_triangles: BTreeSet<PointId> = self
            .final_triangles()
            .flat_map(|triangle| triangle.points)
            .collect();
        if !from_triangles.is_empty() {
            return from_triangles;
        }
        self.final_segments()
            .flat_map(|segment| segment.points)
            .collect()
    }

    /// Computes `V - E + F` over the final triangles.
    ///
    /// A closed convex hull has an Euler characteristic of 2.
    pub fn euler_characteristic(&self) -> i64 {
        let mut vertices = BTreeSet::new();
        let mut edges = HashSet::with_hasher(FixedState::default());
        let mut faces = 0i64;
        for triangle in self.final_triangles() {
            faces += 1;
            vertices.extend(triangle.points);
            edges.extend(triangle.edges());
        }
        vertices.len() as i64 - edges.len() as i64 + faces
    }

    /// Returns `true` if `point` lies inside or on the final hull.
    ///
    /// The test is exact and unperturbed: a point on the plane of a final
    /// face is contained.
    pub fn contains(&self, point: DVec3) -> bool {
        let mut triangles = self.final_triangles().peekable();
        if triangles.peek().is_some() {
            triangles.all(|triangle| {
                let [a, b, c] = triangle.points.map(|id| self.position(id));
                orient3d(a, b, c, point) >= 0.0
            })
        } else {
            self.final_segments().all(|segment| {
                let [a, b] = segment.points.map(|id| self.position(id));
                orient2d(a, b, point) >= 0.0
            })
        }
    }

    /// The primitives that exist at `frame`, in history order.
    pub fn visible_at(&self, frame: Frame) -> impl Iterator<Item = &Primitive> {
        self.primitives()
            .filter(move |primitive| primitive.visible(frame))
    }

    /// Every primitive, stably sorted by the given frame.
    pub fn sorted_by(&self, key: FrameKey) -> Vec<&Primitive> {
        let mut primitives: Vec<&Primitive> = self.primitives().collect();
        primitives.sort_by_key(|primitive| key.key(primitive.lifetime()));
        primitives
    }
}

/// Records primitives and advances the frame counter during a build.
pub(crate) struct Trace<'a> {
    points: &'a [DVec3],
    vertices: Vec<Vertex>,
    frame: Frame,
}

impl<'a> Trace<'a> {
    pub(crate) fn new(points: &'a [DVec3]) -> Self {
        Self {
            points,
            vertices: points
                .iter()
                .map(|&position| Vertex {
                    position,
                    lifetime: Lifetime::new(0),
                })
                .collect(),
            frame: 1,
        }
    }

    #[inline]
    pub(crate) fn points(&self) -> &'a [DVec3] {
        self.points
    }

    #[inline]
    pub(crate) fn position(&self, id: PointId) -> DVec3 {
        self.points[id.index()]
    }

    /// The current frame.
    #[inline]
    pub(crate) fn frame(&self) -> Frame {
        self.frame
    }

    /// Returns the current frame and moves to the next one.
    #[inline]
    pub(crate) fn advance(&mut self) -> Frame {
        let frame = self.frame;
        self.frame += 1;
        frame
    }

    #[inline]
    pub(crate) fn triangle(&self, points: [PointId; 3], frame: Frame) -> Triangle {
        Triangle::new(self.points, points, frame)
    }

    #[inline]
    pub(crate) fn segment(&self, points: [PointId; 2], frame: Frame) -> Segment {
        Segment::new(self.points, points, frame)
    }

    #[inline]
    pub(crate) fn mark(&self, point: PointId, frame: Frame) -> VertexMark {
        VertexMark {
            point,
            lifetime: Lifetime::new(frame),
        }
    }

    #[inline]
    pub(crate) fn select_vertex(&mut self, id: PointId, frame: Frame) {
        self.vertices[id.index()].lifetime.select(frame);
    }

    /// Closes every open lifetime at the current frame and hands out the history.
    pub(crate) fn finish(self, mut root: Group) -> GeometryHistory {
        let final_frame = self.frame;
        root.close(final_frame);
        let mut vertices = self.vertices;
        for vertex in &mut vertices {
            vertex.lifetime.close(final_frame);
        }
        GeometryHistory {
            vertices,
            root,
            final_frame,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::dvec3;

    use super::*;

    fn tetrahedron() -> Vec<DVec3> {
        vec![
            dvec3(0.0, 0.0, 0.0),
            dvec3(1.0, 0.0, 0.0),
            dvec3(0.0, 1.0, 0.0),
            dvec3(0.0, 0.0, 1.0),
        ]
    }

    fn tetrahedron_history(points: &[DVec3]) -> GeometryHistory {
        let mut trace = Trace::new(points);
        let mut root = Group::new(0);
        let ids = [0u32, 1, 2, 3].map(PointId);
        let [a, b, c, d] = ids;
        for face in [[a, c, b], [a, b, d], [b, c, d], [c, a, d]] {
            let frame = trace.advance();
            root.push(trace.triangle(face, frame));
        }
        // A construction edge that dies immediately.
        let frame = trace.frame();
        root.push(Face::<2> {
            lifetime: Lifetime::instant(frame),
            ..trace.segment([a, b], frame)
        });
        trace.advance();
        trace.finish(root)
    }

    #[test]
    fn tetrahedron_is_closed() {
        let points = tetrahedron();
        let history = tetrahedron_history(&points);
        assert_eq!(history.final_frame(), 6);
        assert_eq!(history.final_triangles().count(), 4);
        assert_eq!(history.euler_characteristic(), 2);
        assert!(history.is_closed_surface());
        assert_eq!(history.hull_vertices().len(), 4);
        assert!(history.contains(dvec3(0.1, 0.1, 0.1)));
        assert!(!history.contains(dvec3(1.0, 1.0, 1.0)));
    }

    #[test]
    fn boundary_points_are_contained() {
        let points = tetrahedron();
        let history = tetrahedron_history(&points);
        for &corner in &points {
            assert!(history.contains(corner));
        }
        assert!(history.contains(dvec3(0.5, 0.5, 0.0)));
        assert!(!history.contains(dvec3(0.5, 0.5, -1e-12)));
    }

    #[test]
    fn opposite_faces_split_coplanar_points() {
        let points = vec![
            DVec3::ZERO,
            DVec3::X,
            DVec3::Y,
            dvec3(2.0, 2.0, 0.0),
            dvec3(0.25, 0.25, 0.0),
        ];
        let front = Triangle::new(&points, [0u32, 1, 2].map(PointId), 1);
        let back = Triangle::new(&points, [0u32, 2, 1].map(PointId), 1);
        for id in [PointId(3), PointId(4)] {
            assert_ne!(front.sees(&points, id), back.sees(&points, id));
        }
        assert!(!front.sees(&points, PointId(1)));
        assert!(!back.sees(&points, PointId(1)));

        let forward = Segment::new(&points, [0u32, 3].map(PointId), 1);
        let backward = Segment::new(&points, [3u32, 0].map(PointId), 1);
        assert_ne!(forward.sees(&points, PointId(4)), backward.sees(&points, PointId(4)));
    }

    #[test]
    fn visibility_follows_frames() {
        let points = tetrahedron();
        let history = tetrahedron_history(&points);
        assert_eq!(history.visible_at(1).count(), 1);
        assert_eq!(history.visible_at(5).count(), 5);
        assert_eq!(history.visible_at(6).count(), 4);
    }

    #[test]
    fn sorting_is_stable() {
        let points = tetrahedron();
        let history = tetrahedron_history(&points);
        let by_last = history.sorted_by(FrameKey::Last);
        // The construction edge dies first.
        assert!(by_last[0].as_segment().is_some());
        let by_first = history.sorted_by(FrameKey::First);
        let firsts: Vec<Frame> = by_first.iter().map(|p| p.first_frame()).collect();
        assert_eq!(firsts, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn nested_groups_are_walked_in_order() {
        let points = tetrahedron();
        let trace = Trace::new(&points);
        let mut inner = Group::new(1);
        inner.push(trace.mark(PointId(1), 1));
        let mut root = Group::new(1);
        root.push(trace.mark(PointId(0), 1));
        root.push(inner);
        root.push(trace.mark(PointId(2), 1));
        let history = trace.finish(root);
        let order: Vec<PointId> = history
            .primitives()
            .map(|p| match p {
                Primitive::Vertex(mark) => mark.point(),
                _ => PointId::PLACEHOLDER,
            })
            .collect();
        assert_eq!(order, vec![PointId(0), PointId(1), PointId(2)]);
    }

    #[test]
    fn extreme_conflict() {
        let points = vec![
            dvec3(0.0, 0.0, 0.0),
            dvec3(1.0, 0.0, 0.0),
            dvec3(0.0, 1.0, 0.0),
            dvec3(0.2, 0.2, 2.0),
            dvec3(0.3, 0.3, 5.0),
            dvec3(0.1, 0.1, -1.0),
        ];
        let mut face = Triangle::new(&points, [0u32, 1, 2].map(PointId), 1);
        for i in 3..6u32 {
            face.add(&points, PointId(i));
        }
        assert_eq!(face.conflicts(), &[PointId(3), PointId(4)]);
        assert_eq!(face.extreme(&points), Some(PointId(4)));
    }
}
