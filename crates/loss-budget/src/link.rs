//! Multi-segment link analysis
//!
//! Sums fiber, splice and connector loss over up to three concatenated
//! segments, adds a safety margin and compares the total against an
//! application budget (e.g. 10G Ethernet) of the first segment's fiber.

use crate::calculator::{round_db, round_decimal, METERS_PER_KM};
use crate::error::{InputField, LossBudgetError, Result};
use crate::input::{check_non_negative, parse_count, parse_non_negative, RawField};
use fiber_standards::{Catalog, FiberType};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

pub const MAX_SEGMENTS: usize = 3;
pub const DEFAULT_SAFETY_MARGIN_DB: f64 = 3.0;
pub const DEFAULT_APPLICATION: &str = "10G";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[default]
    #[serde(rename = "m", alias = "meters")]
    Meters,
    #[serde(rename = "km", alias = "kilometers")]
    Kilometers,
}

impl DistanceUnit {
    pub fn to_km(&self, distance: f64) -> f64 {
        match self {
            Self::Meters => distance / METERS_PER_KM,
            Self::Kilometers => distance,
        }
    }

    /// Meters rounded to the millimeter, for messages
    pub fn to_meters(&self, distance: f64) -> f64 {
        match self {
            Self::Meters => distance,
            Self::Kilometers => round_decimal(distance * METERS_PER_KM, 3),
        }
    }
}

/// Which coefficient column of the table a link analysis uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LossBasis {
    #[default]
    Typical,
    Max,
}

/// Measured coefficients replacing the table values for every segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomCoefficients {
    pub attenuation_db_per_km: f64,
    pub splice_db: f64,
    pub connector_db: f64,
}

impl CustomCoefficients {
    fn validate(&self) -> Result<Self> {
        Ok(Self {
            attenuation_db_per_km: check_non_negative(
                InputField::CustomAttenuation,
                self.attenuation_db_per_km,
            )?,
            splice_db: check_non_negative(InputField::CustomSplice, self.splice_db)?,
            connector_db: check_non_negative(InputField::CustomConnector, self.connector_db)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentInput {
    pub standard_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wavelength: Option<String>,
    pub distance: f64,
    #[serde(default)]
    pub unit: DistanceUnit,
    #[serde(default)]
    pub splice_count: u32,
    #[serde(default)]
    pub connector_count: u32,
}

impl SegmentInput {
    pub fn new(standard_code: impl Into<String>, distance: f64, unit: DistanceUnit) -> Self {
        Self {
            standard_code: standard_code.into(),
            wavelength: None,
            distance,
            unit,
            splice_count: 0,
            connector_count: 0,
        }
    }

    pub fn with_wavelength(mut self, wavelength: impl Into<String>) -> Self {
        self.wavelength = Some(wavelength.into());
        self
    }

    pub fn with_events(mut self, splice_count: u32, connector_count: u32) -> Self {
        self.splice_count = splice_count;
        self.connector_count = connector_count;
        self
    }
}

impl FromStr for SegmentInput {
    type Err = LossBudgetError;

    /// `CODE[@WAVELENGTH]:DISTANCE[m|km][:SPLICES[:CONNECTORS]]`,
    /// e.g. `OS2@1550nm:2.5km:2:2`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason| LossBudgetError::invalid(InputField::Segment, s, reason);

        let mut parts = s.trim().split(':');
        let fiber = parts.next().filter(|p| !p.trim().is_empty());
        let fiber = fiber.ok_or_else(|| invalid("missing fiber standard"))?;
        let distance = parts.next().ok_or_else(|| invalid("missing distance"))?;
        let splices = parts.next().unwrap_or("0");
        let connectors = parts.next().unwrap_or("0");
        if parts.next().is_some() {
            return Err(invalid("too many fields"));
        }

        let (standard_code, wavelength) = match fiber.split_once('@') {
            Some((code, wl)) => (code.trim(), Some(wl.trim().to_string())),
            None => (fiber.trim(), None),
        };

        let distance = distance.trim();
        let (number, unit) = if let Some(n) = distance.strip_suffix("km") {
            (n, DistanceUnit::Kilometers)
        } else if let Some(n) = distance.strip_suffix('m') {
            (n, DistanceUnit::Meters)
        } else {
            (distance, DistanceUnit::Meters)
        };

        Ok(Self {
            standard_code: standard_code.to_string(),
            wavelength,
            distance: parse_non_negative(InputField::Distance, &RawField::from(number))?,
            unit,
            splice_count: parse_count(InputField::SpliceCount, &RawField::from(splices))?,
            connector_count: parse_count(InputField::ConnectorCount, &RawField::from(connectors))?,
        })
    }
}

fn default_safety_margin() -> f64 {
    DEFAULT_SAFETY_MARGIN_DB
}

fn default_application() -> String {
    DEFAULT_APPLICATION.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRequest {
    pub segments: Vec<SegmentInput>,
    #[serde(default = "default_safety_margin")]
    pub safety_margin_db: f64,
    #[serde(default = "default_application")]
    pub application: String,
    #[serde(default)]
    pub basis: LossBasis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomCoefficients>,
}

impl LinkRequest {
    pub fn new(segments: Vec<SegmentInput>) -> Self {
        Self {
            segments,
            safety_margin_db: DEFAULT_SAFETY_MARGIN_DB,
            application: default_application(),
            basis: LossBasis::default(),
            custom: None,
        }
    }

    pub fn analyze(&self) -> Result<LinkAnalysis> {
        analyze_link(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentLoss {
    pub segment: usize,
    pub standard_code: String,
    pub wavelength: String,
    pub distance_km: f64,
    pub fiber_loss_db: f64,
    pub splice_loss_db: f64,
    pub connector_loss_db: f64,
    pub total_loss_db: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkStatus {
    Pass,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkAnalysis {
    pub basis: LossBasis,
    pub application: String,
    pub segments: Vec<SegmentLoss>,
    pub total_distance_km: f64,
    pub fiber_loss_db: f64,
    pub splice_loss_db: f64,
    pub connector_loss_db: f64,
    pub safety_margin_db: f64,
    pub total_loss_db: f64,
    pub budget_db: f64,
    pub margin_db: f64,
    pub status: LinkStatus,
    pub custom_coefficients: bool,
}

/// Resolved fiber and wavelength of one segment
struct SegmentFiber {
    code: FiberType,
    wavelength: &'static str,
}

/// Unrounded contributions of one segment
struct SegmentTotals {
    km: f64,
    fiber: f64,
    splice: f64,
    connector: f64,
}

pub fn analyze_link(request: &LinkRequest) -> Result<LinkAnalysis> {
    let count = request.segments.len();
    if count == 0 || count > MAX_SEGMENTS {
        return Err(LossBudgetError::invalid(
            InputField::Segments,
            count.to_string(),
            "a link needs 1 to 3 segments",
        ));
    }

    let safety_margin = check_non_negative(InputField::SafetyMargin, request.safety_margin_db)?;
    let custom = request.custom.map(|c| c.validate()).transpose()?;
    let catalog = Catalog::builtin();

    let mut segments = Vec::with_capacity(count);
    let mut totals = SegmentTotals {
        km: 0.0,
        fiber: 0.0,
        splice: 0.0,
        connector: 0.0,
    };

    for (i, input) in request.segments.iter().enumerate() {
        let index = i + 1;
        let (loss, fiber) = segment_loss(&catalog, input, request.basis, custom.as_ref())
            .map_err(|e| e.in_segment(index))?;

        totals.km += loss.km;
        totals.fiber += loss.fiber;
        totals.splice += loss.splice;
        totals.connector += loss.connector;

        segments.push(SegmentLoss {
            segment: index,
            standard_code: fiber.code.to_string(),
            wavelength: fiber.wavelength.to_string(),
            distance_km: round_km(loss.km),
            fiber_loss_db: round_db(loss.fiber),
            splice_loss_db: round_db(loss.splice),
            connector_loss_db: round_db(loss.connector),
            total_loss_db: round_db(loss.fiber + loss.splice + loss.connector),
        });
    }

    // Budget follows the first segment's fiber
    let first = catalog
        .get(&request.segments[0].standard_code)
        .map_err(|e| LossBudgetError::from(e).in_segment(1))?;
    let budget = first.budget(&request.application)?;

    let total_loss = totals.fiber + totals.splice + totals.connector + safety_margin;
    let margin = budget - total_loss;
    let status = if margin >= 0.0 {
        LinkStatus::Pass
    } else {
        LinkStatus::Fail
    };

    debug!(
        segments = count,
        total_loss,
        budget,
        margin,
        ?status,
        "analyzed link"
    );

    Ok(LinkAnalysis {
        basis: request.basis,
        application: request.application.trim().to_string(),
        segments,
        total_distance_km: round_km(totals.km),
        fiber_loss_db: round_db(totals.fiber),
        splice_loss_db: round_db(totals.splice),
        connector_loss_db: round_db(totals.connector),
        safety_margin_db: round_db(safety_margin),
        total_loss_db: round_db(total_loss),
        budget_db: budget,
        margin_db: round_db(margin),
        status,
        custom_coefficients: custom.is_some(),
    })
}

fn segment_loss(
    catalog: &Catalog,
    input: &SegmentInput,
    basis: LossBasis,
    custom: Option<&CustomCoefficients>,
) -> Result<(SegmentTotals, SegmentFiber)> {
    let standard = catalog.get(&input.standard_code)?;
    let wavelength = match &input.wavelength {
        Some(label) => standard.wavelength(label)?,
        None => standard.default_wavelength(),
    };

    let distance = check_non_negative(InputField::Distance, input.distance)?;
    let km = input.unit.to_km(distance);
    if km > standard.max_distance_km() {
        return Err(LossBudgetError::DistanceExceeded {
            entered_m: input.unit.to_meters(distance),
            max_m: standard.max_distance_meters,
            code: standard.code,
        });
    }

    let (attenuation, splice_db, connector_db) = match (custom, basis) {
        (Some(c), _) => (c.attenuation_db_per_km, c.splice_db, c.connector_db),
        (None, LossBasis::Typical) => (
            wavelength.attenuation.typical_attenuation_db_per_km,
            standard.splice_loss.typical_db,
            standard.connector_loss.typical_db,
        ),
        (None, LossBasis::Max) => (
            wavelength.attenuation.max_attenuation_db_per_km,
            standard.splice_loss.max_db,
            standard.connector_loss.max_db,
        ),
    };

    Ok((
        SegmentTotals {
            km,
            fiber: km * attenuation,
            splice: input.splice_count as f64 * splice_db,
            connector: input.connector_count as f64 * connector_db,
        },
        SegmentFiber {
            code: standard.code,
            wavelength: wavelength.label,
        },
    ))
}

fn round_km(value: f64) -> f64 {
    round_decimal(value, 3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn assert_db(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_single_os2_segment() {
        let request = LinkRequest::new(vec![SegmentInput::new("OS2", 1000.0, DistanceUnit::Meters)
            .with_wavelength("1550nm")
            .with_events(2, 2)]);
        let analysis = analyze_link(&request).unwrap();

        assert_db(analysis.fiber_loss_db, 0.22);
        assert_db(analysis.splice_loss_db, 0.10);
        assert_db(analysis.connector_loss_db, 0.50);
        assert_db(analysis.safety_margin_db, 3.0);
        assert_db(analysis.total_loss_db, 3.82);
        assert_db(analysis.budget_db, 10.0);
        assert_db(analysis.margin_db, 6.18);
        assert_eq!(analysis.status, LinkStatus::Pass);
        assert_eq!(analysis.segments[0].wavelength, "1550nm");
    }

    #[test]
    fn test_default_wavelength_is_first_declared() {
        let request = LinkRequest::new(vec![SegmentInput::new("om3", 0.1, DistanceUnit::Kilometers)]);
        let analysis = analyze_link(&request).unwrap();
        assert_eq!(analysis.segments[0].wavelength, "850nm");
        assert_eq!(analysis.segments[0].standard_code, "OM3");
        // 0.1 km * 2.5 dB/km
        assert_db(analysis.fiber_loss_db, 0.25);
    }

    #[test]
    fn test_multimode_link_fails_budget() {
        let request = LinkRequest::new(vec![
            SegmentInput::new("OM4", 150.0, DistanceUnit::Meters).with_events(1, 2),
            SegmentInput::new("OM4", 150.0, DistanceUnit::Meters).with_events(1, 2),
        ]);
        let analysis = analyze_link(&request).unwrap();

        assert_db(analysis.total_distance_km, 0.3);
        // 0.3 km * 2.5 + 2 * 0.1 + 4 * 0.3 + 3.0 margin
        assert_db(analysis.total_loss_db, 5.15);
        assert_db(analysis.budget_db, 2.6);
        assert_db(analysis.margin_db, -2.55);
        assert_eq!(analysis.status, LinkStatus::Fail);
    }

    #[test]
    fn test_max_basis_and_custom_override() {
        let mut request = LinkRequest::new(vec![SegmentInput::new("OS2", 2.0, DistanceUnit::Kilometers)
            .with_wavelength("1310nm")
            .with_events(1, 1)]);
        request.safety_margin_db = 0.0;
        request.basis = LossBasis::Max;
        let analysis = analyze_link(&request).unwrap();
        // 2 * 0.4 + 0.3 + 0.75
        assert_db(analysis.total_loss_db, 1.85);

        request.custom = Some(CustomCoefficients {
            attenuation_db_per_km: 0.5,
            splice_db: 0.2,
            connector_db: 0.5,
        });
        let analysis = analyze_link(&request).unwrap();
        assert!(analysis.custom_coefficients);
        assert_db(analysis.total_loss_db, 1.7);
    }

    #[test]
    fn test_segment_reports_canonical_code() {
        let request = LinkRequest::new(vec![SegmentInput::new(" om5 ", 100.0, DistanceUnit::Meters)
            .with_wavelength("953NM")]);
        let analysis = analyze_link(&request).unwrap();
        assert_eq!(analysis.segments[0].standard_code, "OM5");
        assert_eq!(analysis.segments[0].wavelength, "953nm");
    }

    #[test]
    fn test_kilometer_overrun_message_is_clean() {
        let request = LinkRequest::new(vec![SegmentInput::new("OM5", 0.4401, DistanceUnit::Kilometers)]);
        let err = analyze_link(&request).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Segment 1: The entered distance of 440.1m exceeds the recommended maximum of 440m for OM5"
        );
        assert_eq!(err.report().details.unwrap().entered_distance, Some(440.1));
    }

    #[test]
    fn test_segment_count_limits() {
        let err = analyze_link(&LinkRequest::new(vec![])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let segment = SegmentInput::new("OS2", 10.0, DistanceUnit::Meters);
        let err = analyze_link(&LinkRequest::new(vec![segment; MAX_SEGMENTS + 1])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_segment_over_limit_names_segment() {
        let request = LinkRequest::new(vec![
            SegmentInput::new("OS2", 5.0, DistanceUnit::Kilometers),
            SegmentInput::new("OM3", 0.35, DistanceUnit::Kilometers),
        ]);
        let err = analyze_link(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DistanceExceeded);
        let details = err.report().details.unwrap();
        assert_eq!(details.segment, Some(2));
        assert_eq!(details.max_distance, Some(300.0));
    }

    #[test]
    fn test_unknown_lookups() {
        let request = LinkRequest::new(vec![
            SegmentInput::new("OM5", 10.0, DistanceUnit::Meters).with_wavelength("1550nm")
        ]);
        assert_eq!(analyze_link(&request).unwrap_err().kind(), ErrorKind::UnknownWavelength);

        let mut request = LinkRequest::new(vec![SegmentInput::new("OS2", 10.0, DistanceUnit::Meters)]);
        request.application = "100G".into();
        assert_eq!(analyze_link(&request).unwrap_err().kind(), ErrorKind::UnknownApplication);
    }

    #[test]
    fn test_negative_parameters_rejected() {
        let mut request = LinkRequest::new(vec![SegmentInput::new("OS2", 10.0, DistanceUnit::Meters)]);
        request.safety_margin_db = -1.0;
        assert_eq!(analyze_link(&request).unwrap_err().kind(), ErrorKind::InvalidInput);

        request.safety_margin_db = 3.0;
        request.custom = Some(CustomCoefficients {
            attenuation_db_per_km: 0.3,
            splice_db: -0.1,
            connector_db: 0.5,
        });
        assert_eq!(analyze_link(&request).unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_segment_spec_parsing() {
        let segment: SegmentInput = "OS2@1550nm:2.5km:2:4".parse().unwrap();
        assert_eq!(
            segment,
            SegmentInput::new("OS2", 2.5, DistanceUnit::Kilometers)
                .with_wavelength("1550nm")
                .with_events(2, 4)
        );

        let segment: SegmentInput = "om4:120".parse().unwrap();
        assert_eq!(segment, SegmentInput::new("om4", 120.0, DistanceUnit::Meters));

        assert!("OS2".parse::<SegmentInput>().is_err());
        assert!("OS2:abc".parse::<SegmentInput>().is_err());
        assert!("OS2:10m:1:1:1".parse::<SegmentInput>().is_err());
    }

    #[test]
    fn test_request_defaults_from_json() {
        let request: LinkRequest = serde_json::from_str(
            r#"{"segments": [{"standardCode": "OS2", "distance": 3, "unit": "kilometers"}]}"#,
        )
        .unwrap();
        assert_eq!(request.safety_margin_db, DEFAULT_SAFETY_MARGIN_DB);
        assert_eq!(request.application, "10G");
        assert_eq!(request.basis, LossBasis::Typical);
        assert_eq!(request.segments[0].unit, DistanceUnit::Kilometers);
    }
}
