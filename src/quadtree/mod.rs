//! A bucket quadtree over the `xy` projection of a point set, used to answer
//! Gift-Wrap's pivot query without scanning every point.
//!
//! Each node remembers the `z` range of the points below it, so together with
//! its rectangle it bounds a box. A subtree is skipped when every corner of
//! that box lies strictly behind the plane of the current candidate face.

mod rect;

pub use rect::Rect;

use glam::DVec3;

use crate::{
    boundary::Edge,
    config::HullConfig,
    orient::{beyond, orient3d},
    PointId,
};

#[derive(Clone, Debug)]
enum Node {
    Leaf(Vec<PointId>),
    Branch(Box<[QuadTree; 4]>),
}

/// A region quadtree with a `z` interval per node.
#[derive(Clone, Debug)]
pub struct QuadTree {
    rect: Rect,
    min_z: f64,
    max_z: f64,
    node: Node,
}

impl QuadTree {
    /// Builds a quadtree over `points` with the bucket capacity and depth
    /// limit from `config`.
    pub fn build(points: &[DVec3], config: &HullConfig) -> Self {
        let mut tree = Self::empty(Rect::from_points(points));
        for (index, point) in points.iter().enumerate() {
            tree.insert(
                PointId::from(index),
                *point,
                points,
                0,
                config.bucket_capacity,
                config.max_depth,
            );
        }
        tree
    }

    fn empty(rect: Rect) -> Self {
        Self {
            rect,
            min_z: f64::INFINITY,
            max_z: f64::NEG_INFINITY,
            node: Node::Leaf(Vec::new()),
        }
    }

    fn insert(
        &mut self,
        id: PointId,
        point: DVec3,
        points: &[DVec3],
        depth: usize,
        capacity: usize,
        max_depth: usize,
    ) {
        self.min_z = self.min_z.min(point.z);
        self.max_z = self.max_z.max(point.z);

        match &mut self.node {
            Node::Leaf(ids) => {
                ids.push(id);
                if ids.len() > capacity && depth < max_depth {
                    let ids = core::mem::take(ids);
                    self.split(ids, points, depth, capacity, max_depth);
                }
            }
            Node::Branch(children) => {
                let quadrant = self.rect.quadrant_of(point.truncate());
                children[quadrant].insert(id, point, points, depth + 1, capacity, max_depth);
            }
        }
    }

    fn split(
        &mut self,
        ids: Vec<PointId>,
        points: &[DVec3],
        depth: usize,
        capacity: usize,
        max_depth: usize,
    ) {
        let mut children = Box::new(self.rect.quadrants().map(Self::empty));
        for id in ids {
            let point = id.position(points);
            let quadrant = self.rect.quadrant_of(point.truncate());
            children[quadrant].insert(id, point, points, depth + 1, capacity, max_depth);
        }
        self.node = Node::Branch(children);
    }

    /// The `xy` region covered by this node.
    #[inline]
    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    /// The `[ne, se, nw, sw]` corners of this node's region.
    #[inline]
    pub fn corners(&self) -> [glam::DVec2; 4] {
        self.rect.corners()
    }

    /// The smallest `z` coordinate below this node.
    #[inline]
    pub fn min_z(&self) -> f64 {
        self.min_z
    }

    /// The largest `z` coordinate below this node.
    #[inline]
    pub fn max_z(&self) -> f64 {
        self.max_z
    }

    /// Returns `true` if no point was inserted below this node.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min_z > self.max_z
    }

    /// Returns the number of points stored below this node.
    pub fn len(&self) -> usize {
        match &self.node {
            Node::Leaf(ids) => ids.len(),
            Node::Branch(children) => children.iter().map(QuadTree::len).sum(),
        }
    }

    /// Finds the point `w` such that no point lies beyond the triangle
    /// `edge.start, edge.end, w`.
    ///
    /// Like the linear scan of [`pivot`](crate::hull::pivot), the tree is
    /// walked repeatedly until a walk leaves the candidate unchanged, so for
    /// a hull edge both return the same point. Returns `None` if every point
    /// is an endpoint of `edge`.
    pub fn search(&self, points: &[DVec3], edge: Edge) -> Option<PointId> {
        let mut search = Search {
            points,
            start: edge.start,
            end: edge.end,
            candidate: None,
            changed: false,
        };
        for _ in 0..=self.len() {
            search.changed = false;
            self.find(&mut search);
            if !search.changed {
                break;
            }
        }
        search.candidate
    }

    fn find(&self, search: &mut Search) {
        if self.is_empty() || self.is_behind(search) {
            return;
        }
        match &self.node {
            Node::Leaf(ids) => {
                for &id in ids {
                    search.offer(id);
                }
            }
            Node::Branch(children) => {
                for child in children.iter() {
                    child.find(search);
                }
            }
        }
    }

    /// Returns `true` if every point in this node's box lies strictly behind
    /// the current candidate face.
    ///
    /// The orientation is affine in the tested point, so it is enough to
    /// check the eight corners of the box.
    fn is_behind(&self, search: &Search) -> bool {
        let Some(candidate) = search.candidate else {
            return false;
        };
        let [s, e, w] = [search.start, search.end, candidate].map(|id| id.position(search.points));
        for x in [self.rect.min.x, self.rect.max.x] {
            for y in [self.rect.min.y, self.rect.max.y] {
                for z in [self.min_z, self.max_z] {
                    if orient3d(s, e, w, DVec3::new(x, y, z)) <= 0.0 {
                        return false;
                    }
                }
            }
        }
        true
    }
}

struct Search<'a> {
    points: &'a [DVec3],
    start: PointId,
    end: PointId,
    candidate: Option<PointId>,
    changed: bool,
}

impl Search<'_> {
    #[inline]
    fn offer(&mut self, id: PointId) {
        if id == self.start || id == self.end {
            return;
        }
        let replace = match self.candidate {
            None => true,
            Some(candidate) => beyond(self.points, [self.start, self.end, candidate], id),
        };
        if replace {
            self.candidate = Some(id);
            self.changed = true;
        }
    }
}
