// SPDX-License-Identifier: AGPL-3.0-only

//! Depth/width atlas scan over a Gaussian well.
//!
//! Runs the default scan lattice, prints one JSON record per point on
//! stdout (JSONL), and a class summary on stderr. Exit 0 on a completed
//! scan, 1 on a fatal solver or benchmark failure.

use std::process;
use wellspring::operator::EdgeCondition;
use wellspring::overlap::OverlapSpec;
use wellspring::pipeline::SolverConfig;
use wellspring::potential::Potential;
use wellspring::scan::{run_scan, ScanPlan};

fn default_plan() -> ScanPlan {
    ScanPlan {
        base: SolverConfig {
            potential: Potential::Gaussian {
                depth: 10.0,
                width: 0.4,
                center: 3.0,
            },
            length: 6.0,
            intervals: 1200,
            left: EdgeCondition::Dirichlet,
            right: EdgeCondition::Dirichlet,
            overlap: OverlapSpec::default(),
        },
        depths: vec![2.0, 6.0, 10.0, 14.0, 18.0, 22.0, 26.0, 30.0],
        widths: vec![0.4, 0.6],
        alphas: vec![],
        budget: None,
    }
}

fn main() {
    let plan = default_plan();
    eprintln!(
        "scanning {} depths × {} widths over {} wells on [0, {}]",
        plan.depths.len(),
        plan.widths.len(),
        plan.base.potential.family_name(),
        plan.base.length
    );

    let atlas = match run_scan(&plan) {
        Ok(atlas) => atlas,
        Err(e) => {
            eprintln!("scan aborted: {e}");
            process::exit(1);
        }
    };

    for point in &atlas.points {
        match serde_json::to_string(point) {
            Ok(line) => println!("{line}"),
            Err(e) => {
                eprintln!("serialization failed: {e}");
                process::exit(1);
            }
        }
    }

    for (class, count) in atlas.class_counts() {
        if count > 0 {
            eprintln!("{class:?}: {count}");
        }
    }
    eprintln!(
        "robust single-bound-state region: {} points",
        atlas.robust_region(1).len()
    );
}
