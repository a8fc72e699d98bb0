use std::collections::BTreeSet;

use glam::{dvec3, DVec3};

use super::*;
use crate::{
    point::all_ids, Distribution, FrameKey, FrameStamped, HistoryNode, ProgressMode,
    ProgressTracker,
};

/// The hull vertices of `history` as positions, sorted so that histories
/// built over differently ordered copies of a point set compare equal.
fn hull_positions(history: &GeometryHistory) -> Vec<DVec3> {
    let mut positions: Vec<DVec3> = history
        .hull_vertices()
        .into_iter()
        .map(|id| history.position(id))
        .collect();
    positions.sort_by(|a, b| {
        a.x.total_cmp(&b.x)
            .then(a.y.total_cmp(&b.y))
            .then(a.z.total_cmp(&b.z))
    });
    positions
}

fn check_closed_hull(algorithm: &dyn HullAlgorithm, points: &[DVec3]) -> GeometryHistory {
    let history = algorithm.build().unwrap();
    assert_eq!(history.euler_characteristic(), 2, "{}", algorithm.name());
    assert!(history.is_closed_surface(), "{}", algorithm.name());
    for &point in points {
        assert!(history.contains(point), "{}", algorithm.name());
    }
    history
}

#[test]
fn algorithms_agree_in_3d() {
    let distributions = [
        Distribution::InSphere,
        Distribution::OnSphere,
        Distribution::InCube,
        Distribution::Gaussian,
    ];
    for distribution in distributions {
        for seed in 0..4 {
            let points = distribution.generate(60, seed);
            let expected = hull_positions(&check_closed_hull(
                &*Algorithm::Incremental.instantiate(&points, HullConfig::default()),
                &points,
            ));
            for algorithm in Algorithm::ALL {
                let history = check_closed_hull(
                    &*algorithm.instantiate(&points, HullConfig::default()),
                    &points,
                );
                assert_eq!(
                    hull_positions(&history),
                    expected,
                    "{algorithm} on {distribution} with seed {seed}"
                );
            }
        }
    }
}

#[test]
fn algorithms_agree_in_2d() {
    let distributions = [
        Distribution::InCircle,
        Distribution::OnCircle,
        Distribution::InSquare,
        Distribution::InSphere,
    ];
    for distribution in distributions {
        for seed in 0..4 {
            let points = distribution.generate(50, seed);
            let mut expected = None;
            for algorithm in Algorithm::ALL {
                let history = algorithm
                    .instantiate(&points, HullConfig::default())
                    .build_2d()
                    .unwrap();
                assert!(history.is_closed_polygon(), "{algorithm} on {distribution}");
                for point in &points {
                    assert!(history.contains(*point), "{algorithm} on {distribution}");
                }
                let positions = hull_positions(&history);
                let first = expected.get_or_insert_with(|| positions.clone());
                assert_eq!(
                    *first, positions,
                    "{algorithm} on {distribution} with seed {seed}"
                );
            }
        }
    }
}

#[test]
fn wedge_block() {
    let points = Distribution::WedgeBlock.generate(16, 11);
    for algorithm in Algorithm::ALL {
        let history = check_closed_hull(
            &*algorithm.instantiate(&points, HullConfig::default()),
            &points,
        );
        // The two points inside the wedge never reach the hull.
        assert_eq!(history.hull_vertices().len(), 14, "{algorithm}");
    }
}

fn cube_with_center() -> Vec<DVec3> {
    let mut points: Vec<DVec3> = (0..8)
        .map(|i| dvec3((i >> 2) as f64, ((i >> 1) & 1) as f64, (i & 1) as f64))
        .collect();
    points.push(DVec3::splat(0.5));
    points
}

#[test]
fn algorithms_agree_on_degenerate_3d_input() {
    let seed_plane = vec![
        dvec3(0.0, 0.0, 0.0),
        dvec3(1.0, 0.0, 0.0),
        dvec3(0.0, 1.0, 0.0),
        dvec3(5.0, 5.0, 0.0),
        dvec3(0.0, 0.0, 1.0),
    ];
    let cases = [(cube_with_center(), 8), (seed_plane, 5)];
    for (points, vertices) in cases {
        let expected: BTreeSet<PointId> = (0..vertices).map(PointId).collect();
        for algorithm in Algorithm::ALL {
            let history = check_closed_hull(
                &*algorithm.instantiate(&points, HullConfig::default()),
                &points,
            );
            assert_eq!(history.hull_vertices(), expected, "{algorithm}");
        }
    }
}

#[test]
fn algorithms_agree_on_degenerate_2d_input() {
    let cases = [
        // Three points on the bottom edge.
        (
            vec![
                dvec3(0.0, 0.0, 0.0),
                dvec3(1.0, 0.0, 0.0),
                dvec3(2.0, 0.0, 0.0),
                dvec3(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 3],
        ),
        // A point on the top edge and one inside.
        (
            vec![
                dvec3(0.0, 0.0, 0.0),
                dvec3(2.0, 0.0, 0.0),
                dvec3(1.0, 1.0, 0.0),
                dvec3(2.0, 2.0, 0.0),
                dvec3(0.0, 2.0, 0.0),
                dvec3(1.0, 2.0, 0.0),
            ],
            vec![0, 1, 3, 4],
        ),
        // Points 0 and 2 share a projection.
        (
            vec![
                dvec3(1.0, 1.0, 1.0),
                dvec3(2.0, 2.0, 0.0),
                dvec3(1.0, 1.0, 0.0),
                dvec3(0.0, 1.0, 0.0),
            ],
            vec![1, 2, 3],
        ),
    ];
    for (points, vertices) in cases {
        let expected: BTreeSet<PointId> = vertices.into_iter().map(PointId).collect();
        for algorithm in Algorithm::ALL {
            let history = algorithm
                .instantiate(&points, HullConfig::default())
                .build_2d()
                .unwrap();
            assert!(history.is_closed_polygon(), "{algorithm}");
            for &point in &points {
                assert!(history.contains(point), "{algorithm}");
            }
            assert_eq!(history.hull_vertices(), expected, "{algorithm}");
        }
    }
}

#[test]
fn tetrahedron_everywhere() {
    let points = [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z];
    for algorithm in Algorithm::ALL {
        let history = algorithm.instantiate(&points, HullConfig::default()).build().unwrap();
        assert_eq!(history.final_triangles().count(), 4, "{algorithm}");
        assert_eq!(history.hull_vertices().len(), 4, "{algorithm}");
    }
}

#[test]
fn degenerate_input_is_reported_before_any_frame() {
    let plane: Vec<DVec3> = Distribution::InSquare.generate(20, 0);
    for algorithm in [Algorithm::GiftWrap, Algorithm::DivideAndConquer, Algorithm::QuickHull] {
        let tracker = ProgressTracker::new();
        let result = algorithm
            .instantiate(&plane, HullConfig::default())
            .build_with_progress(&tracker);
        assert_eq!(
            result,
            Err(BuildError::DegenerateInput(DegenerateInput::Coplanar)),
            "{algorithm}"
        );
        assert_eq!(tracker.updates(), 0);
    }

    let stacked = [dvec3(0.5, 0.5, 0.0), dvec3(0.5, 0.5, 1.0), dvec3(0.5, 0.5, 2.0)];
    for algorithm in Algorithm::ALL {
        assert_eq!(
            algorithm.instantiate(&stacked, HullConfig::default()).build_2d(),
            Err(BuildError::DegenerateInput(DegenerateInput::Coincident)),
            "{algorithm}"
        );
    }
}

#[test]
fn gift_wrap_quadtree_matches_linear_scan() {
    for seed in 0..4 {
        let points = Distribution::InSphere.generate(200, seed);
        let with_tree = GiftWrap::with_config(&points, HullConfig::default().with_bucket_capacity(4))
            .build()
            .unwrap();
        let without = GiftWrap::with_config(&points, HullConfig::default().with_quadtree(false))
            .build()
            .unwrap();
        assert_eq!(with_tree, without);
    }
}

#[test]
fn frames_are_consistent() {
    let points = Distribution::InCube.generate(40, 8);
    for algorithm in Algorithm::ALL {
        let history = algorithm.instantiate(&points, HullConfig::default()).build().unwrap();
        let final_frame = history.final_frame();
        for primitive in history.primitives() {
            let last = primitive.last_frame().unwrap();
            assert!(primitive.first_frame() <= last, "{algorithm}");
            assert!(last <= final_frame, "{algorithm}");
            if let Some(selected) = primitive.select_frame() {
                assert!(selected <= last, "{algorithm}");
            }
        }

        // The final hull is exactly what is visible at the last frame.
        let visible_faces = history
            .visible_at(final_frame)
            .filter(|primitive| primitive.as_triangle().is_some())
            .count();
        assert_eq!(visible_faces, history.final_triangles().count(), "{algorithm}");

        let sorted = history.sorted_by(FrameKey::First);
        assert!(sorted
            .windows(2)
            .all(|pair| pair[0].first_frame() <= pair[1].first_frame()));
    }
}

#[test]
fn progress_modes() {
    let points = Distribution::InSphere.generate(30, 1);
    let expected = [
        (Algorithm::Incremental, ProgressMode::Determinate),
        (Algorithm::GiftWrap, ProgressMode::Indeterminate),
        (Algorithm::DivideAndConquer, ProgressMode::Indeterminate),
        (Algorithm::QuickHull, ProgressMode::Determinate),
    ];
    for (algorithm, mode) in expected {
        let tracker = ProgressTracker::new();
        let outcome = algorithm
            .instantiate(&points, HullConfig::default())
            .build_with_progress(&tracker)
            .unwrap();
        assert!(!outcome.is_cancelled());
        assert_eq!(tracker.mode(), mode, "{algorithm}");
        assert_eq!(tracker.range(), (0, 30), "{algorithm}");
        assert!(tracker.updates() > 0, "{algorithm}");
    }
}

#[test]
fn cancelled_before_start() {
    let points = Distribution::InSphere.generate(30, 1);
    for algorithm in Algorithm::ALL {
        let tracker = ProgressTracker::new();
        tracker.cancel();
        let outcome = algorithm
            .instantiate(&points, HullConfig::default())
            .build_with_progress(&tracker)
            .unwrap();
        assert!(outcome.is_cancelled(), "{algorithm}");
        assert!(outcome.complete().is_none());
        assert_eq!(tracker.updates(), 0, "{algorithm}");
    }
}

#[test]
fn extra_colors() {
    let config = HullConfig::default();
    let points = [DVec3::ZERO];
    let colors = config.colors;
    let extra = |algorithm: Algorithm| algorithm.instantiate(&points, config).extra_colors();
    assert_eq!(extra(Algorithm::Incremental), vec![colors.selected]);
    assert_eq!(extra(Algorithm::GiftWrap), Vec::<u32>::new());
    assert_eq!(extra(Algorithm::DivideAndConquer), vec![colors.left, colors.right]);
    assert_eq!(extra(Algorithm::QuickHull), vec![colors.selected]);
}

#[test]
fn parse_algorithm_names() {
    for algorithm in Algorithm::ALL {
        assert_eq!(algorithm.name().parse(), Ok(algorithm));
        assert_eq!(algorithm.to_string(), algorithm.name());
        assert_eq!(
            algorithm.instantiate(&[], HullConfig::default()).name(),
            algorithm.name()
        );
    }
    assert_eq!("gift-wrap".parse(), Ok(Algorithm::GiftWrap));
    assert_eq!("divide_and_conquer".parse(), Ok(Algorithm::DivideAndConquer));
    assert_eq!(
        "graham".parse::<Algorithm>(),
        Err(UnknownAlgorithm("graham".to_string()))
    );
}

#[test]
fn pivot_finds_hull_faces() {
    let points = [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z, dvec3(0.1, 0.1, 0.1)];
    let ids = all_ids(&points);
    // The face on the edge from the origin to X is the one facing -y.
    let found = pivot(&points, &ids, PointId(0), PointId(1)).map(|index| ids[index]);
    assert_eq!(found, Some(PointId(3)));
    assert_eq!(pivot(&points, &ids[..2], PointId(0), PointId(1)), None);

    let square = [DVec3::ZERO, DVec3::X, dvec3(1.0, 1.0, 0.0), DVec3::Y, dvec3(0.5, 0.5, 0.0)];
    let ids = all_ids(&square);
    assert_eq!(pivot_2d(&square, &ids, PointId(0)), Some(1));
    assert_eq!(pivot_2d(&square, &ids, PointId(1)), Some(2));
}

#[test]
fn bottom_is_a_hull_vertex() {
    let points = [dvec3(1.0, 0.0, 0.0), dvec3(0.0, 0.0, 0.0), dvec3(0.5, 1.0, 0.0)];
    assert_eq!(bottom(&points), PointId(1));
}

#[test]
fn root_groups_only_for_divide_and_conquer() {
    let points = Distribution::InSphere.generate(30, 6);
    for algorithm in Algorithm::ALL {
        let history = algorithm.instantiate(&points, HullConfig::default()).build().unwrap();
        let nested = history
            .root()
            .children()
            .iter()
            .any(|child| matches!(child, HistoryNode::Group(_)));
        assert_eq!(nested, algorithm == Algorithm::DivideAndConquer, "{algorithm}");
    }
}
