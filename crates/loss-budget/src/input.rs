//! Parsing of user-entered numbers
//!
//! Form fields, CLI arguments and JSON bodies all funnel through here so
//! every adapter rejects the same inputs with the same `InvalidInput` error.

use crate::error::{InputField, LossBudgetError, Result};
use serde::{Deserialize, Serialize};

/// A numeric field as submitted: a JSON number or free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Number(f64),
    Text(String),
}

impl From<f64> for RawField {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for RawField {
    fn from(value: u32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for RawField {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawField {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Parse a finite, non-negative real
pub fn parse_non_negative(field: InputField, raw: &RawField) -> Result<f64> {
    let value = match raw {
        RawField::Number(n) => *n,
        RawField::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| LossBudgetError::invalid(field, text.as_str(), "expected a number"))?,
    };
    check_non_negative(field, value)
}

pub fn check_non_negative(field: InputField, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(LossBudgetError::invalid(
            field,
            value.to_string(),
            "expected a finite number",
        ));
    }
    if value < 0.0 {
        return Err(LossBudgetError::invalid(
            field,
            value.to_string(),
            "must not be negative",
        ));
    }
    // Fold -0.0 into 0.0 so it never leaks into results
    Ok(if value == 0.0 { 0.0 } else { value })
}

/// Parse a non-negative whole count
pub fn parse_count(field: InputField, raw: &RawField) -> Result<u32> {
    match raw {
        RawField::Number(n) => {
            if n.is_finite() && n.fract() == 0.0 && *n >= 0.0 && *n <= u32::MAX as f64 {
                Ok(*n as u32)
            } else {
                Err(LossBudgetError::invalid(
                    field,
                    n.to_string(),
                    "expected a non-negative whole number",
                ))
            }
        }
        RawField::Text(text) => text.trim().parse::<u32>().map_err(|_| {
            LossBudgetError::invalid(field, text.as_str(), "expected a non-negative whole number")
        }),
    }
}

fn required(field: InputField, raw: Option<&RawField>) -> Result<&RawField> {
    raw.ok_or_else(|| LossBudgetError::invalid(field, "", "is required"))
}

/// Validated single-run request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LossBudgetRequest {
    pub standard_code: String,
    pub distance_meters: f64,
    pub splice_count: u32,
    pub connector_count: u32,
}

impl LossBudgetRequest {
    pub fn new(
        standard_code: impl Into<String>,
        distance_meters: f64,
        splice_count: u32,
        connector_count: u32,
    ) -> Self {
        Self {
            standard_code: standard_code.into(),
            distance_meters,
            splice_count,
            connector_count,
        }
    }
}

/// Single-run request exactly as submitted, before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLossBudgetRequest {
    #[serde(default)]
    pub standard_code: String,
    #[serde(default)]
    pub distance_meters: Option<RawField>,
    #[serde(default)]
    pub splice_count: Option<RawField>,
    #[serde(default)]
    pub connector_count: Option<RawField>,
}

impl RawLossBudgetRequest {
    /// Validate the three numeric fields. The standard code is resolved later
    /// by the calculator.
    pub fn parse(&self) -> Result<LossBudgetRequest> {
        let distance_meters = parse_non_negative(
            InputField::Distance,
            required(InputField::Distance, self.distance_meters.as_ref())?,
        )?;
        let splice_count = parse_count(
            InputField::SpliceCount,
            required(InputField::SpliceCount, self.splice_count.as_ref())?,
        )?;
        let connector_count = parse_count(
            InputField::ConnectorCount,
            required(InputField::ConnectorCount, self.connector_count.as_ref())?,
        )?;

        Ok(LossBudgetRequest {
            standard_code: self.standard_code.trim().to_string(),
            distance_meters,
            splice_count,
            connector_count,
        })
    }
}

/// Build a request from four text fields, as a form or CLI submits them
pub fn parse_request(
    standard_code: &str,
    distance: &str,
    splices: &str,
    connectors: &str,
) -> Result<LossBudgetRequest> {
    RawLossBudgetRequest {
        standard_code: standard_code.to_string(),
        distance_meters: Some(distance.into()),
        splice_count: Some(splices.into()),
        connector_count: Some(connectors.into()),
    }
    .parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_text_fields() {
        let req = parse_request(" OS2 ", "5000", " 4", "2 ").unwrap();
        assert_eq!(req, LossBudgetRequest::new("OS2", 5000.0, 4, 2));
    }

    #[test]
    fn test_empty_distance_is_invalid() {
        let err = parse_request("OS2", "", "0", "0").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(matches!(
            err,
            LossBudgetError::InvalidInput {
                field: InputField::Distance,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_bad_numbers() {
        for distance in ["abc", "-1", "NaN", "inf", "1e400"] {
            assert!(
                parse_request("OS2", distance, "0", "0").is_err(),
                "distance {distance:?} should be rejected"
            );
        }
        for count in ["1.5", "-1", "x", ""] {
            assert!(parse_request("OS2", "10", count, "0").is_err());
            assert!(parse_request("OS2", "10", "0", count).is_err());
        }
    }

    #[test]
    fn test_negative_zero_is_folded() {
        let req = parse_request("OM3", "-0", "0", "0").unwrap();
        assert!(req.distance_meters.is_sign_positive());
    }

    #[test]
    fn test_json_numbers_and_strings() {
        let raw: RawLossBudgetRequest = serde_json::from_str(
            r#"{"standardCode": "OM4", "distanceMeters": "120.5", "spliceCount": 2, "connectorCount": "3"}"#,
        )
        .unwrap();
        let req = raw.parse().unwrap();
        assert_eq!(req.distance_meters, 120.5);
        assert_eq!(req.splice_count, 2);
        assert_eq!(req.connector_count, 3);
    }

    #[test]
    fn test_fractional_json_count_is_invalid() {
        let raw: RawLossBudgetRequest = serde_json::from_str(
            r#"{"standardCode": "OM4", "distanceMeters": 10, "spliceCount": 2.5, "connectorCount": 0}"#,
        )
        .unwrap();
        let err = raw.parse().unwrap_err();
        assert!(matches!(
            err,
            LossBudgetError::InvalidInput {
                field: InputField::SpliceCount,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_field_is_invalid() {
        let raw: RawLossBudgetRequest =
            serde_json::from_str(r#"{"standardCode": "OS2", "distanceMeters": 10}"#).unwrap();
        let err = raw.parse().unwrap_err();
        assert_eq!(err.report().details.unwrap().field.as_deref(), Some("spliceCount"));
    }
}
