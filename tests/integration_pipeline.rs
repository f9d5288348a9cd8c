// SPDX-License-Identifier: AGPL-3.0-only

//! Integration tests: solve pipeline end-to-end.
//!
//! These exercise the full path from configuration to verified result,
//! checking the public API composes correctly across module boundaries
//! and reproduces closed-form spectra.

use std::f64::consts::PI;
use wellspring::operator::EdgeCondition;
use wellspring::overlap::OverlapSpec;
use wellspring::pipeline::{solve, solve_verified, SolveStatus, SolverConfig};
use wellspring::potential::Potential;
use wellspring::verify;

fn square_well() -> SolverConfig {
    SolverConfig {
        potential: Potential::SquareWell {
            depth: 10.0,
            width: 1.0,
            center: 0.5,
        },
        length: 1.0,
        intervals: 1000,
        left: EdgeCondition::Dirichlet,
        right: EdgeCondition::Dirichlet,
        overlap: OverlapSpec::default(),
    }
}

#[test]
fn shifted_box_spectrum_and_census() {
    let core = solve(&square_well()).expect("solve");
    for (n, &lam) in core.spectrum.values.iter().enumerate().take(4) {
        let exact = ((n + 1) as f64 * PI).powi(2) - 10.0;
        assert!(
            (lam - exact).abs() < 0.01,
            "λ_{n} = {lam}, expected {exact}"
        );
    }
    assert_eq!(core.census.n_bound, 1, "only (π)² − 10 < 0");
}

#[test]
fn ground_mode_overlap_integral() {
    let core = solve(&square_well()).expect("solve");
    // Ground mode √2 sin(πξ): I4 = 3/2.
    assert!((core.i4 - 1.5).abs() < 0.01, "I4 = {}", core.i4);
    assert!(core.i4_converged);
}

#[test]
fn verified_solve_passes_all_gates() {
    let v0 = verify::run_v0();
    assert!(v0.passed, "V0: {}", v0.detail);
    let result = solve_verified(&square_well(), &v0).expect("solve");
    assert_eq!(result.status, SolveStatus::Verified);
    assert!(result.verification.all_passed());
    assert_eq!(result.n_bound, 1);
}

#[test]
fn robin_ladder_interpolates_neumann_to_dirichlet() {
    // Flat potential, symmetric Robin: λ₀ rises monotonically from the
    // Neumann zero mode towards the Dirichlet π² as α grows.
    let lowest = |alpha: f64| {
        let bc = EdgeCondition::Robin { alpha };
        let config = SolverConfig {
            potential: Potential::SquareWell {
                depth: 0.0,
                width: 1.0,
                center: 0.5,
            },
            length: 1.0,
            intervals: 1000,
            left: bc,
            right: bc,
            overlap: OverlapSpec::default(),
        };
        solve(&config).expect("solve").spectrum.values[0]
    };

    let neumann = lowest(0.0);
    assert!(neumann.abs() < 1e-6, "Neumann zero mode, got {neumann}");

    let mut prev = neumann;
    for alpha in [1.0, 5.0, 25.0, 100.0] {
        let lam = lowest(alpha);
        assert!(lam > prev, "λ₀ not monotone at α={alpha}: {lam} ≤ {prev}");
        assert!(lam < PI * PI, "λ₀ overshot Dirichlet limit at α={alpha}");
        prev = lam;
    }
    assert!(prev > 0.9 * PI * PI, "α=100 should sit close to π²");
}

#[test]
fn cross_method_gate_agrees_on_localized_well() {
    let config = SolverConfig {
        potential: Potential::DomainWall {
            depth: 12.0 / (0.04 * 0.04),
            width: 0.04,
            center: 0.5,
        },
        length: 1.0,
        intervals: 2400,
        left: EdgeCondition::Dirichlet,
        right: EdgeCondition::Dirichlet,
        overlap: OverlapSpec::default(),
    };
    let core = solve(&config).expect("solve");
    assert_eq!(core.census.n_bound, 3);

    let v1 = verify::run_v1(&config, &core);
    assert!(v1.passed, "V1: {} ({})", v1.detail, v1.worst);

    // Analytic Pöschl-Teller levels: −((3−n)/w)².
    for (n, &lam) in core.spectrum.values.iter().enumerate().take(3) {
        let exact = -((3 - n) as f64 / 0.04).powi(2);
        assert!(
            (lam - exact).abs() / exact.abs() < 1e-3,
            "λ_{n} = {lam}, expected {exact}"
        );
    }
}

#[test]
fn results_are_bitwise_reproducible() {
    let v0 = verify::run_v0();
    let a = solve_verified(&square_well(), &v0).expect("solve");
    let b = solve_verified(&square_well(), &v0).expect("solve");
    assert_eq!(a.eigenvalues.len(), b.eigenvalues.len());
    for (x, y) in a.eigenvalues.iter().zip(&b.eigenvalues) {
        assert_eq!(x.to_bits(), y.to_bits());
    }
    assert_eq!(a.i4.to_bits(), b.i4.to_bits());
    assert_eq!(a.n_bound, b.n_bound);
}

#[test]
fn result_serializes_to_json() {
    let v0 = verify::run_v0();
    let result = solve_verified(&square_well(), &v0).expect("solve");
    let json = serde_json::to_string(&result).expect("serialize");
    assert!(json.contains("\"n_bound\":1"));
    assert!(json.contains("square_well"));
    assert!(json.contains("\"status\":\"verified\""));
}
