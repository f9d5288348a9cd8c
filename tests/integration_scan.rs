// SPDX-License-Identifier: AGPL-3.0-only

//! Integration tests: parameter-space scan end-to-end.
//!
//! A depth staircase over a Gaussian well: deeper wells never lose bound
//! states, the scan classifies a robust plateau away from counting
//! boundaries, and every point serializes for the JSONL atlas.

use wellspring::operator::EdgeCondition;
use wellspring::overlap::OverlapSpec;
use wellspring::pipeline::SolverConfig;
use wellspring::potential::Potential;
use wellspring::scan::{run_scan, PointClass, ScanPlan};

fn staircase_plan() -> ScanPlan {
    ScanPlan {
        base: SolverConfig {
            potential: Potential::Gaussian {
                depth: 10.0,
                width: 0.6,
                center: 3.0,
            },
            length: 6.0,
            intervals: 1200,
            left: EdgeCondition::Dirichlet,
            right: EdgeCondition::Dirichlet,
            overlap: OverlapSpec::default(),
        },
        depths: vec![2.0, 8.0, 9.0, 10.0, 11.0, 30.0],
        widths: vec![0.6],
        alphas: vec![],
        budget: None,
    }
}

#[test]
fn depth_staircase_is_monotone() {
    let atlas = run_scan(&staircase_plan()).expect("scan");
    assert_eq!(atlas.points.len(), 6);

    let counts: Vec<usize> = atlas
        .points
        .iter()
        .map(|p| p.n_bound.expect("every point should solve"))
        .collect();

    assert!(counts[0] >= 1, "even a shallow well binds: {counts:?}");
    for w in counts.windows(2) {
        assert!(w[1] >= w[0], "deepening lost a bound state: {counts:?}");
    }
    assert!(
        counts[counts.len() - 1] > counts[0],
        "staircase should step at least once over this depth range: {counts:?}"
    );
}

#[test]
fn plateau_interior_is_robust() {
    let atlas = run_scan(&staircase_plan()).expect("scan");

    // Depths 8..11 sit well inside one counting plateau; the interior
    // points (9 and 10) have agreeing neighbors on both sides.
    let interior: Vec<_> = atlas
        .points
        .iter()
        .filter(|p| p.depth == 9.0 || p.depth == 10.0)
        .collect();
    assert_eq!(interior.len(), 2);
    for p in &interior {
        assert_eq!(
            p.class,
            PointClass::Robust,
            "depth {} classified {:?}: {}",
            p.depth,
            p.class,
            p.note
        );
    }

    let k = interior[0].n_bound.expect("census");
    assert!(!atlas.robust_region(k).is_empty());
}

#[test]
fn counting_boundaries_are_not_robust() {
    let atlas = run_scan(&staircase_plan()).expect("scan");
    for pair in atlas.points.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if let (Some(na), Some(nb)) = (a.n_bound, b.n_bound) {
            if na != nb {
                assert_ne!(a.class, PointClass::Robust, "depth {} on a boundary", a.depth);
                assert_ne!(b.class, PointClass::Robust, "depth {} on a boundary", b.depth);
            }
        }
    }
}

#[test]
fn atlas_points_serialize_as_jsonl() {
    let atlas = run_scan(&ScanPlan {
        depths: vec![9.0, 10.0],
        ..staircase_plan()
    })
    .expect("scan");

    for point in &atlas.points {
        let line = serde_json::to_string(point).expect("serialize");
        assert!(line.contains("\"depth\""));
        assert!(line.contains("\"class\""));
        assert!(!line.contains('\n'));
    }
}
