use foldhash::fast::FixedState;
use hashbrown::HashMap;

use crate::{GeometryHistory, PointId};

impl GeometryHistory {
    /// Returns `true` if the final triangles form a closed, consistently
    /// oriented surface.
    ///
    /// Every directed edge must occur exactly once, and its reverse must
    /// occur exactly once in a neighboring face.
    pub fn is_closed_surface(&self) -> bool {
        let mut directed: HashMap<(PointId, PointId), u32, FixedState> = HashMap::default();
        for triangle in self.final_triangles() {
            for edge in triangle.edges() {
                *directed.entry((edge.start, edge.end)).or_insert(0) += 1;
            }
        }

        !directed.is_empty()
            && directed.iter().all(|(&(start, end), &count)| {
                count == 1 && directed.get(&(end, start)) == Some(&1)
            })
    }

    /// Returns `true` if the final segments form a single closed polygon.
    ///
    /// Every hull vertex must have exactly one outgoing and one incoming
    /// segment, and walking the outgoing segments must visit all of them.
    pub fn is_closed_polygon(&self) -> bool {
        let mut next: HashMap<PointId, PointId, FixedState> = HashMap::default();
        let mut incoming: HashMap<PointId, u32, FixedState> = HashMap::default();
        for segment in self.final_segments() {
            if next.insert(segment.start(), segment.end()).is_some() {
                return false;
            }
            *incoming.entry(segment.end()).or_insert(0) += 1;
        }

        let Some(&first) = next.keys().next() else {
            return false;
        };
        if incoming.values().any(|&count| count != 1) || incoming.len() != next.len() {
            return false;
        }

        let mut current = first;
        for steps in 1..=next.len() {
            match next.get(&current) {
                Some(&following) if following == first => return steps == next.len(),
                Some(&following) => current = following,
                None => return false,
            }
        }
        false
    }
}
