//! Exact checks that reject degenerate input before any frame is emitted.

use glam::DVec3;

use crate::{
    hull::DegenerateInput,
    orient::{orient2d, orient3d},
};

/// Returns `true` if `a` and `b` have the same `x` and `y`.
#[inline]
pub(crate) fn same_xy(a: DVec3, b: DVec3) -> bool {
    a.x == b.x && a.y == b.y
}

/// Returns `true` if `a`, `b` and `c` lie on one line in 3D.
///
/// Three points are collinear exactly when all three axis-aligned
/// projections of their triangle are.
#[inline]
pub(crate) fn collinear(a: DVec3, b: DVec3, c: DVec3) -> bool {
    let yz = |p: DVec3| DVec3::new(p.y, p.z, 0.0);
    let zx = |p: DVec3| DVec3::new(p.z, p.x, 0.0);
    orient2d(a, b, c) == 0.0
        && orient2d(yz(a), yz(b), yz(c)) == 0.0
        && orient2d(zx(a), zx(b), zx(c)) == 0.0
}

/// Requires at least `required` points.
#[inline]
pub(crate) fn require_count(points: &[DVec3], required: usize) -> Result<(), DegenerateInput> {
    if points.len() < required {
        return Err(DegenerateInput::TooFewPoints {
            required,
            found: points.len(),
        });
    }
    Ok(())
}

/// Requires at least four points that span a volume.
pub(crate) fn require_volume(points: &[DVec3]) -> Result<(), DegenerateInput> {
    require_count(points, 4)?;

    let a = points[0];
    let b = *points
        .iter()
        .find(|&&p| p != a)
        .ok_or(DegenerateInput::Coincident)?;
    let c = *points
        .iter()
        .find(|&&p| !collinear(a, b, p))
        .ok_or(DegenerateInput::Collinear)?;
    if points.iter().all(|&d| orient3d(a, b, c, d) == 0.0) {
        return Err(DegenerateInput::Coplanar);
    }
    Ok(())
}

/// Requires at least two points whose `xy` projections span an area, or a
/// segment when there are exactly two.
pub(crate) fn require_area(points: &[DVec3]) -> Result<(), DegenerateInput> {
    require_count(points, 2)?;

    let a = points[0];
    let b = *points
        .iter()
        .find(|&&p| !same_xy(a, p))
        .ok_or(DegenerateInput::Coincident)?;
    if points.len() >= 3 && points.iter().all(|&c| orient2d(a, b, c) == 0.0) {
        return Err(DegenerateInput::Collinear);
    }
    Ok(())
}

/// Requires the first three points to form a proper triangle.
pub(crate) fn require_seed_triangle(points: &[DVec3]) -> Result<(), DegenerateInput> {
    require_count(points, 3)?;
    let [a, b, c] = [points[0], points[1], points[2]];
    if a == b {
        return Err(DegenerateInput::Coincident);
    }
    if collinear(a, b, c) {
        return Err(DegenerateInput::Collinear);
    }
    Ok(())
}

/// Requires the first two points to form a proper segment in `xy`.
pub(crate) fn require_seed_segment(points: &[DVec3]) -> Result<(), DegenerateInput> {
    require_count(points, 2)?;
    if same_xy(points[0], points[1]) {
        return Err(DegenerateInput::Coincident);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use glam::dvec3;

    use super::*;

    #[test]
    fn volume_classification() {
        let p = dvec3(1.0, 2.0, 3.0);
        assert_eq!(require_volume(&[p; 4]), Err(DegenerateInput::Coincident));

        let line: Vec<DVec3> = (0..5).map(|i| p + DVec3::X * i as f64).collect();
        assert_eq!(require_volume(&line), Err(DegenerateInput::Collinear));

        let plane = [DVec3::ZERO, DVec3::X, DVec3::Y, dvec3(1.0, 1.0, 0.0), dvec3(0.3, 0.7, 0.0)];
        assert_eq!(require_volume(&plane), Err(DegenerateInput::Coplanar));

        let tetrahedron = [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z];
        assert_eq!(require_volume(&tetrahedron), Ok(()));

        assert_eq!(
            require_volume(&tetrahedron[..3]),
            Err(DegenerateInput::TooFewPoints { required: 4, found: 3 })
        );
    }

    #[test]
    fn collinearity_is_exact() {
        // Lies on the line in every projection.
        assert!(collinear(DVec3::ZERO, dvec3(1.0, 2.0, 3.0), dvec3(2.0, 4.0, 6.0)));
        // Collinear when seen from above, but not in space.
        assert!(!collinear(DVec3::ZERO, dvec3(1.0, 0.0, 0.0), dvec3(2.0, 0.0, 1.0)));
    }

    #[test]
    fn area_classification() {
        let stacked = [dvec3(1.0, 1.0, 0.0), dvec3(1.0, 1.0, 5.0)];
        assert_eq!(require_area(&stacked), Err(DegenerateInput::Coincident));

        let line = [DVec3::ZERO, DVec3::X, DVec3::X * 2.0];
        assert_eq!(require_area(&line), Err(DegenerateInput::Collinear));

        assert_eq!(require_area(&line[..2]), Ok(()));
        assert_eq!(require_area(&[DVec3::ZERO, DVec3::X, DVec3::Y]), Ok(()));
    }

    #[test]
    fn seeds() {
        assert_eq!(
            require_seed_triangle(&[DVec3::ZERO, DVec3::X, DVec3::X * 3.0, DVec3::Y]),
            Err(DegenerateInput::Collinear)
        );
        assert_eq!(
            require_seed_triangle(&[DVec3::X, DVec3::X, DVec3::Y]),
            Err(DegenerateInput::Coincident)
        );
        assert_eq!(
            require_seed_segment(&[DVec3::X, dvec3(1.0, 0.0, 4.0)]),
            Err(DegenerateInput::Coincident)
        );
    }
}
