// SPDX-License-Identifier: AGPL-3.0-only

//! Validate the solve pipeline against analytic spectra.
//!
//! Checks: the V0/V1/V2 ladder, the shifted box spectrum of a
//! domain-filling square well, Robin boundary monotonicity, and the
//! ground-mode I4 of the box.
//! Reference: closed-form Sturm-Liouville spectra.

use wellspring::operator::EdgeCondition;
use wellspring::overlap::OverlapSpec;
use wellspring::pipeline::{solve, SolverConfig};
use wellspring::potential::Potential;
use wellspring::tolerances;
use wellspring::validation::GateHarness;
use wellspring::verify;

fn box_config(depth: f64, left: EdgeCondition, right: EdgeCondition) -> SolverConfig {
    SolverConfig {
        potential: Potential::SquareWell {
            depth,
            width: 1.0,
            center: 0.5,
        },
        length: 1.0,
        intervals: 1000,
        left,
        right,
        overlap: OverlapSpec::default(),
    }
}

fn main() {
    println!("═══════════════════════════════════════════════════════════");
    println!("  wellspring spectral validation");
    println!("  Reference: closed-form Sturm-Liouville spectra");
    println!("═══════════════════════════════════════════════════════════\n");

    let mut harness = GateHarness::new("spectral_ladder");
    let pi = std::f64::consts::PI;

    println!("── Verification ladder ──");
    let v0 = verify::run_v0();
    println!("  V0 worst deviation: {:.3e} ({})", v0.worst, v0.detail);
    harness.gate(&v0);

    println!("\n── Domain-filling square well ──");
    let config = box_config(
        10.0,
        EdgeCondition::Dirichlet,
        EdgeCondition::Dirichlet,
    );
    match solve(&config) {
        Ok(core) => {
            // V ≡ −10 on [0,1]: λ_n = (nπ)² − 10, one bound state.
            for (n, &lam) in core.spectrum.values.iter().enumerate().take(3) {
                let exact = ((n + 1) as f64 * pi).powi(2) - 10.0;
                harness.check_rel(
                    &format!("shifted box λ_{n}"),
                    lam,
                    exact,
                    tolerances::V0_BENCHMARK_REL * 100.0,
                );
            }
            harness.check_count("shifted box N_bound", core.census.n_bound, 1);
            harness.check_rel("ground-mode I4", core.i4, 1.5, 1e-2);
            harness.check_flag("I4 converged", core.i4_converged);

            harness.gate(&verify::run_v1(&config, &core));
            harness.gate(&verify::run_v2(&config, &core));
        }
        Err(e) => {
            eprintln!("square well solve failed: {e}");
            harness.check_flag("square well solve", false);
        }
    }

    println!("\n── Robin boundary monotonicity ──");
    {
        // Flat box with symmetric Robin edges: λ₀ grows from 0 (Neumann)
        // towards π² (Dirichlet) as α increases.
        let mut prev = -0.1;
        let mut monotone = true;
        let mut last = 0.0;
        for alpha in [0.0, 1.0, 5.0, 25.0] {
            let bc = EdgeCondition::Robin { alpha };
            match solve(&box_config(0.0, bc, bc)) {
                Ok(core) => {
                    let lam = core.spectrum.values[0];
                    println!("  α = {alpha:>5}: λ₀ = {lam:.6}");
                    monotone &= lam > prev;
                    prev = lam;
                    last = lam;
                }
                Err(e) => {
                    eprintln!("Robin solve failed at α={alpha}: {e}");
                    monotone = false;
                }
            }
        }
        harness.check_flag("λ₀ monotone in α", monotone);
        harness.check_flag(
            "λ₀(α=25) in (0.8π², π²)",
            last > 0.8 * pi * pi && last < pi * pi,
        );
    }

    harness.finish();
}
