// SPDX-License-Identifier: AGPL-3.0-only

//! wellspring — 1D Sturm-Liouville bound-state solver with a built-in
//! verification ladder.
//!
//! Solves −f'' + V(ξ)f = λf on [0, ℓ] with Dirichlet or Robin edges,
//! counts bound states against the potential's intrinsic threshold, and
//! refuses to report numbers it cannot cross-check.
//!
//! ## Modules
//!   - `grid` — uniform grid with feature-resolution accounting
//!   - `potential` — well and oscillator families
//!   - `operator` — weak-form assembly of the (K, M) pair
//!   - `eigen` — Sturm bisection and dense Jacobi eigensolvers
//!   - `shooting` — Numerov shooting path for cross-method checks
//!   - `spectrum` — bound-state census and gap margins
//!   - `overlap` — eigenfunction overlap integrals (I4)
//!   - `pipeline` — config → verified solve result
//!   - `verify` — V0/V1/V2 verification ladder
//!   - `scan` — parallel parameter-space atlas with robustness classes
//!   - `validation` — check harness shared by the binaries
//!
//! ## Binaries
//!   - `validate_spectra` — verification ladder against analytic spectra
//!   - `scan_atlas` — depth/width scan emitting a JSONL atlas

pub mod eigen;
pub mod error;
pub mod grid;
pub mod operator;
pub mod overlap;
pub mod pipeline;
pub mod potential;
pub mod scan;
pub mod shooting;
pub mod spectrum;
pub mod tolerances;
pub mod validation;
pub mod verify;

pub use error::WellspringError;
