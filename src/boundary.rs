//! Boundary tracking for the "hole" left behind when hull faces are removed.
//!
//! When a set of faces is deleted, the edges they share cancel out and what
//! remains is the open boundary of the hole. [`EdgeStack`] does this for
//! triangles in 3D, [`PointStack`] for segments in 2D.

use core::hash::{Hash, Hasher};

use crate::PointId;

/// An edge between two points.
///
/// The edge is directed for construction purposes, but equality and hashing
/// ignore direction: `(a, b) == (b, a)`.
#[derive(Clone, Copy, Debug)]
pub struct Edge {
    /// The start point of the edge.
    pub start: PointId,
    /// The end point of the edge.
    pub end: PointId,
}

impl Edge {
    /// Creates a new edge from `start` to `end`.
    #[inline]
    pub const fn new(start: PointId, end: PointId) -> Self {
        Self { start, end }
    }

    /// Returns `true` if `other` runs between the same points in the opposite direction.
    #[inline]
    pub fn is_reverse_of(&self, other: &Edge) -> bool {
        self.start == other.end && self.end == other.start
    }

    #[inline]
    fn sorted(&self) -> (PointId, PointId) {
        if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        }
    }
}

impl PartialEq for Edge {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.sorted() == other.sorted()
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted().hash(state);
    }
}

/// A LIFO stack of directed edges with a cancellation law.
///
/// [`putp`](Self::putp) of an edge whose reverse is already stored removes
/// the reverse instead of pushing, so after deleting a connected patch of
/// faces the stack holds exactly the open boundary of the patch.
#[derive(Clone, Debug, Default)]
pub struct EdgeStack {
    edges: Vec<Edge>,
}

impl EdgeStack {
    /// Creates an empty stack.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the stack holds no edges.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Returns the number of stored edges.
    #[inline]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Pushes the edge `start → end` unconditionally.
    #[inline]
    pub fn put(&mut self, start: PointId, end: PointId) {
        self.edges.push(Edge::new(start, end));
    }

    /// Pushes the edge `start → end`, unless `end → start` is already stored,
    /// in which case both are discarded.
    pub fn putp(&mut self, start: PointId, end: PointId) {
        let edge = Edge::new(start, end);
        match self.edges.iter().rposition(|stored| stored.is_reverse_of(&edge)) {
            Some(index) => {
                self.edges.remove(index);
            }
            None => self.edges.push(edge),
        }
    }

    /// Removes and returns the most recently stored edge, if any.
    #[inline]
    pub fn pop(&mut self) -> Option<Edge> {
        self.edges.pop()
    }

    /// Removes and returns the most recently stored edge.
    ///
    /// # Panics
    ///
    /// Panics if the stack is empty.
    #[inline]
    #[track_caller]
    pub fn get(&mut self) -> Edge {
        match self.edges.pop() {
            Some(edge) => edge,
            None => panic!("get called on an empty edge stack"),
        }
    }

    /// Iterates over the stored edges from bottom to top.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }
}

/// The 2D analogue of [`EdgeStack`].
///
/// Deleting a run of boundary segments leaves a hole with one unmatched start
/// point and one unmatched end point. Shared endpoints cancel: a start that
/// matches a stored end removes that end, and vice versa.
#[derive(Clone, Debug, Default)]
pub struct PointStack {
    starts: Vec<PointId>,
    ends: Vec<PointId>,
}

impl PointStack {
    /// Creates an empty stack.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no unmatched start or end is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty() && self.ends.is_empty()
    }

    /// Records the segment `start → end` without cancellation.
    #[inline]
    pub fn put(&mut self, start: PointId, end: PointId) {
        self.starts.push(start);
        self.ends.push(end);
    }

    /// Records the segment `start → end`, cancelling endpoints it shares with
    /// previously recorded segments.
    pub fn putp(&mut self, start: PointId, end: PointId) {
        match self.ends.iter().rposition(|&stored| stored == start) {
            Some(index) => {
                self.ends.remove(index);
            }
            None => self.starts.push(start),
        }
        match self.starts.iter().rposition(|&stored| stored == end) {
            Some(index) => {
                self.starts.remove(index);
            }
            None => self.ends.push(end),
        }
    }

    /// Removes and returns the most recent unmatched start point.
    ///
    /// # Panics
    ///
    /// Panics if no start point is stored.
    #[inline]
    #[track_caller]
    pub fn pop_start(&mut self) -> PointId {
        match self.starts.pop() {
            Some(point) => point,
            None => panic!("pop_start called on an empty point stack"),
        }
    }

    /// Removes and returns the most recent unmatched end point.
    ///
    /// # Panics
    ///
    /// Panics if no end point is stored.
    #[inline]
    #[track_caller]
    pub fn pop_end(&mut self) -> PointId {
        match self.ends.pop() {
            Some(point) => point,
            None => panic!("pop_end called on an empty point stack"),
        }
    }
}
