//! Orientation predicates that never tie.
//!
//! Signs are exact, computed with the adaptive predicates of `robust`. When a
//! determinant is exactly zero, the tie is broken by simulation of simplicity
//! (Edelsbrunner and Mücke, 1990): every coordinate of point `i` is moved by
//! an infinitesimal that shrinks with `i`, `z` the most and `x` the least, and
//! the sign is read off the first non-zero term of the expanded determinant.
//!
//! Coplanar, collinear and coincident points then behave like points in
//! general position, and they do so consistently across every query. Each
//! algorithm builds the hull of the same perturbed point set.

use core::cmp::Ordering;

use glam::DVec3;

use crate::PointId;

const X: usize = 0;
const Y: usize = 1;
const Z: usize = 2;

/// The perturbation terms of the 3D orientation determinant, most
/// significant first. Each term lists the perturbed `(row, column)` entries,
/// with rows sorted by ascending id.
const TERMS_3D: [&[(usize, usize)]; 17] = [
    &[(0, Z)],
    &[(0, Y)],
    &[(0, X)],
    &[(1, Z)],
    &[(0, Y), (1, Z)],
    &[(0, X), (1, Z)],
    &[(1, Y)],
    &[(0, Z), (1, Y)],
    &[(0, X), (1, Y)],
    &[(1, X)],
    &[(0, Z), (1, X)],
    &[(0, Y), (1, X)],
    &[(2, Z)],
    &[(0, Y), (2, Z)],
    &[(0, X), (2, Z)],
    &[(1, Y), (2, Z)],
    &[(0, X), (1, Y), (2, Z)],
];

/// The perturbation terms of the 2D orientation determinant.
const TERMS_2D: [&[(usize, usize)]; 4] = [&[(0, Y)], &[(0, X)], &[(1, Y)], &[(0, X), (1, Y)]];

/// Gives the orientation of the `xy` projection of the triangle `a`, `b`, `c`.
///
/// - `orientation > 0`: counterclockwise
/// - `orientation < 0`: clockwise
/// - `orientation == 0`: collinear
#[inline]
pub(crate) fn orient2d(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    use robust::Coord;
    robust::orient2d(
        Coord { x: a.x, y: a.y },
        Coord { x: b.x, y: b.y },
        Coord { x: c.x, y: c.y },
    )
}

/// Negative when `d` lies on the side of the plane through `a`, `b` and `c`
/// from which they appear counterclockwise, zero exactly when the four
/// points are coplanar.
#[inline]
pub(crate) fn orient3d(a: DVec3, b: DVec3, c: DVec3, d: DVec3) -> f64 {
    use robust::Coord3D;
    let coord = |p: DVec3| Coord3D {
        x: p.x,
        y: p.y,
        z: p.z,
    };
    robust::orient3d(coord(a), coord(b), coord(c), coord(d))
}

/// Returns `true` if `point` lies strictly on the side of the triangle from
/// which its corners appear counterclockwise.
///
/// A point that repeats a corner id is never beyond.
#[inline]
pub(crate) fn beyond(points: &[DVec3], triangle: [PointId; 3], point: PointId) -> bool {
    let [a, b, c] = triangle;
    perturbed(points, [a, b, c, point], &TERMS_3D, |[a, b, c, d]| {
        orient3d(a, b, c, d)
    })
    .is_lt()
}

/// Returns `true` if `point` lies strictly to the right of `start → end`
/// when seen from above.
#[inline]
pub(crate) fn right_of(points: &[DVec3], segment: [PointId; 2], point: PointId) -> bool {
    let [start, end] = segment;
    perturbed(points, [start, end, point], &TERMS_2D, |[a, b, c]| {
        orient2d(a, b, c)
    })
    .is_lt()
}

fn sign(value: f64) -> Ordering {
    value.partial_cmp(&0.0).unwrap_or(Ordering::Equal)
}

/// Sorts `ids` in place and reports whether an odd number of swaps was
/// needed, or `None` if an id repeats.
fn sort_rows<const N: usize>(mut ids: [PointId; N]) -> Option<([PointId; N], bool)> {
    let mut odd = false;
    for i in 1..N {
        let mut j = i;
        while j > 0 && ids[j - 1] > ids[j] {
            ids.swap(j - 1, j);
            odd = !odd;
            j -= 1;
        }
    }
    if ids.windows(2).any(|pair| pair[0] == pair[1]) {
        return None;
    }
    Some((ids, odd))
}

fn perturbed<const N: usize>(
    points: &[DVec3],
    ids: [PointId; N],
    terms: &[&[(usize, usize)]],
    exact: impl FnOnce([DVec3; N]) -> f64,
) -> Ordering {
    let Some((rows, odd)) = sort_rows(ids) else {
        return Ordering::Equal;
    };
    let rows = rows.map(|id| id.position(points));

    let mut result = sign(exact(rows));
    if result.is_eq() {
        result = terms
            .iter()
            .map(|term| expansion_term(&rows, term))
            .find(|term| term.is_ne())
            .unwrap_or(Ordering::Equal);
    }
    if odd {
        result.reverse()
    } else {
        result
    }
}

/// The sign of the coefficient of one perturbation term: a cofactor of the
/// determinant whose rows are `rows` with a trailing column of ones.
fn expansion_term(rows: &[DVec3], term: &[(usize, usize)]) -> Ordering {
    let mut negative = false;
    for (i, &(row, column)) in term.iter().enumerate() {
        negative ^= (row + column) % 2 == 1;
        let inversions = term[i + 1..]
            .iter()
            .filter(|&&(_, later)| later < column)
            .count();
        negative ^= inversions % 2 == 1;
    }

    let free_rows: Vec<DVec3> = (0..rows.len())
        .filter(|row| term.iter().all(|&(taken, _)| taken != *row))
        .map(|row| rows[row])
        .collect();
    let free_columns: Vec<usize> = (0..rows.len() - 1)
        .filter(|column| term.iter().all(|&(_, taken)| taken != *column))
        .collect();

    let minor = match (free_rows.as_slice(), free_columns.as_slice()) {
        ([_], []) => Ordering::Greater,
        ([a, b], &[column]) => a[column].partial_cmp(&b[column]).unwrap_or(Ordering::Equal),
        (&[a, b, c], &[u, v]) => {
            let project = |p: DVec3| DVec3::new(p[u], p[v], 0.0);
            sign(orient2d(project(a), project(b), project(c)))
        }
        _ => Ordering::Equal,
    };
    if negative {
        minor.reverse()
    } else {
        minor
    }
}
