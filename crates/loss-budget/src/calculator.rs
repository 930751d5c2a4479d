//! Per-wavelength insertion loss of a single fiber run
//!
//! ```text
//! maxLoss(w) = km * maxAtten(w) + splices * splice.max + connectors * connector.max
//! typLoss(w) = km * typAtten(w) + splices * splice.typ + connectors * connector.typ
//! ```
//!
//! The two columns are computed independently end to end and are never
//! blended.

use crate::error::{InputField, LossBudgetError, Result};
use crate::input::{check_non_negative, LossBudgetRequest};
use fiber_standards::{Catalog, FiberStandard};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const METERS_PER_KM: f64 = 1000.0;

/// Round the full-precision value to `places` decimals, the same digits
/// `{:.N}` prints
pub(crate) fn round_decimal(value: f64, places: usize) -> f64 {
    format!("{value:.places$}").parse().unwrap_or(value)
}

/// Round a dB figure to two decimals for display
pub fn round_db(value: f64) -> f64 {
    round_decimal(value, 2)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WavelengthLoss {
    pub label: String,
    pub max_loss_db: f64,
    pub typical_loss_db: f64,
}

/// Success half of the calculator contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LossBudgetResult {
    pub standard_code: String,
    pub standard_name: String,
    pub distance_meters: f64,
    pub splice_count: u32,
    pub connector_count: u32,
    pub wavelengths: Vec<WavelengthLoss>,
}

impl LossBudgetResult {
    pub fn wavelength(&self, label: &str) -> Option<&WavelengthLoss> {
        self.wavelengths.iter().find(|w| w.label == label)
    }
}

/// Compute the loss budget of one run against the built-in table
pub fn compute_loss_budget(
    standard_code: &str,
    distance_meters: f64,
    splice_count: u32,
    connector_count: u32,
) -> Result<LossBudgetResult> {
    let distance_meters = check_non_negative(InputField::Distance, distance_meters)?;
    let standard = Catalog::builtin().get(standard_code)?;
    budget_for(standard, distance_meters, splice_count, connector_count)
}

/// Compute the loss budget of one run against a resolved standard
pub fn budget_for(
    standard: &FiberStandard,
    distance_meters: f64,
    splice_count: u32,
    connector_count: u32,
) -> Result<LossBudgetResult> {
    if distance_meters > standard.max_distance_meters {
        debug!(
            standard = %standard.code,
            distance_meters,
            max = standard.max_distance_meters,
            "distance exceeds standard maximum"
        );
        return Err(LossBudgetError::DistanceExceeded {
            entered_m: distance_meters,
            max_m: standard.max_distance_meters,
            code: standard.code,
        });
    }

    let km = distance_meters / METERS_PER_KM;
    let splices = splice_count as f64;
    let connectors = connector_count as f64;

    let wavelengths = standard
        .wavelengths
        .iter()
        .map(|w| {
            let max_loss = km * w.attenuation.max_attenuation_db_per_km
                + splices * standard.splice_loss.max_db
                + connectors * standard.connector_loss.max_db;
            let typical_loss = km * w.attenuation.typical_attenuation_db_per_km
                + splices * standard.splice_loss.typical_db
                + connectors * standard.connector_loss.typical_db;

            WavelengthLoss {
                label: w.label.to_string(),
                max_loss_db: round_db(max_loss),
                typical_loss_db: round_db(typical_loss),
            }
        })
        .collect();

    debug!(
        standard = %standard.code,
        distance_meters,
        splice_count,
        connector_count,
        "computed loss budget"
    );

    Ok(LossBudgetResult {
        standard_code: standard.code.to_string(),
        standard_name: standard.display_name.to_string(),
        distance_meters,
        splice_count,
        connector_count,
        wavelengths,
    })
}

impl LossBudgetRequest {
    pub fn compute(&self) -> Result<LossBudgetResult> {
        compute_loss_budget(
            &self.standard_code,
            self.distance_meters,
            self.splice_count,
            self.connector_count,
        )
    }
}
