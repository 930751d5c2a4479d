//! Fiber Loss Budget Calculator
//!
//! Computes the insertion loss of a fiber-optic run from the static
//! [`fiber_standards`] table and is the single implementation behind the
//! CLI, the HTTP gateway and the WASM binding.
//!
//! # Loss Model
//!
//! ```text
//! Loss(w) = (distance_m / 1000) · A(w) + splices · S + connectors · C
//! ```
//!
//! | Term | Source | Units |
//! |------|--------|-------|
//! | A(w) | attenuation of the standard at wavelength w | dB/km |
//! | S    | per-splice loss | dB |
//! | C    | per-connector loss | dB |
//!
//! Evaluated twice per wavelength, once with the max column and once with
//! the typical column, rounded to 0.01 dB.
//!
//! # Link Analysis
//!
//! [`link::analyze_link`] chains up to three segments, adds a safety
//! margin and checks the total against an application budget.

pub mod calculator;
pub mod error;
pub mod input;
pub mod link;
pub mod report;

pub use calculator::{
    budget_for, compute_loss_budget, round_db, LossBudgetResult, WavelengthLoss, METERS_PER_KM,
};
pub use error::{ErrorDetails, ErrorKind, ErrorReport, InputField, LossBudgetError, Result};
pub use input::{parse_request, LossBudgetRequest, RawField, RawLossBudgetRequest};
pub use link::{
    analyze_link, CustomCoefficients, DistanceUnit, LinkAnalysis, LinkRequest, LinkStatus,
    LossBasis, SegmentInput, SegmentLoss, DEFAULT_APPLICATION, DEFAULT_SAFETY_MARGIN_DB,
    MAX_SEGMENTS,
};

pub use fiber_standards::{Catalog, FiberStandard, FiberType};
