//! Calculator errors and their transport-neutral report form

use fiber_standards::{CatalogError, FiberType};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Input field a validation failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Distance,
    SpliceCount,
    ConnectorCount,
    Segment,
    Segments,
    SafetyMargin,
    CustomAttenuation,
    CustomSplice,
    CustomConnector,
}

impl InputField {
    /// Field name as it appears in request bodies
    pub fn key(&self) -> &'static str {
        match self {
            Self::Distance => "distanceMeters",
            Self::SpliceCount => "spliceCount",
            Self::ConnectorCount => "connectorCount",
            Self::Segment => "segment",
            Self::Segments => "segments",
            Self::SafetyMargin => "safetyMarginDb",
            Self::CustomAttenuation => "custom.attenuationDbPerKm",
            Self::CustomSplice => "custom.spliceDb",
            Self::CustomConnector => "custom.connectorDb",
        }
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Distance => "distance",
            Self::SpliceCount => "splice count",
            Self::ConnectorCount => "connector count",
            Self::Segment => "segment",
            Self::Segments => "segment list",
            Self::SafetyMargin => "safety margin",
            Self::CustomAttenuation => "custom attenuation",
            Self::CustomSplice => "custom splice loss",
            Self::CustomConnector => "custom connector loss",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LossBudgetError {
    #[error("Invalid {field}: {reason} (got {value:?})")]
    InvalidInput {
        field: InputField,
        value: String,
        reason: &'static str,
    },
    #[error(
        "The entered distance of {entered_m}m exceeds the recommended maximum of {max_m}m for {code}"
    )]
    DistanceExceeded {
        entered_m: f64,
        max_m: f64,
        code: FiberType,
    },
    #[error("Unknown fiber standard: {0:?}")]
    UnknownStandard(String),
    #[error("Wavelength {wavelength} is not defined for {code}")]
    UnknownWavelength { code: FiberType, wavelength: String },
    #[error("No {application} budget is defined for {code}")]
    UnknownApplication { code: FiberType, application: String },
    #[error("Segment {segment}: {source}")]
    Segment {
        segment: usize,
        #[source]
        source: Box<LossBudgetError>,
    },
}

pub type Result<T> = std::result::Result<T, LossBudgetError>;

impl From<CatalogError> for LossBudgetError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::UnknownStandard(code) => Self::UnknownStandard(code),
            CatalogError::UnknownWavelength {
                standard,
                wavelength,
            } => Self::UnknownWavelength {
                code: standard,
                wavelength,
            },
            CatalogError::UnknownApplication {
                standard,
                application,
            } => Self::UnknownApplication {
                code: standard,
                application,
            },
        }
    }
}

impl LossBudgetError {
    pub fn invalid(field: InputField, value: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidInput {
            field,
            value: value.into(),
            reason,
        }
    }

    /// Attach the 1-based index of the link segment that failed
    pub fn in_segment(self, segment: usize) -> Self {
        Self::Segment {
            segment,
            source: Box::new(self),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::DistanceExceeded { .. } => ErrorKind::DistanceExceeded,
            Self::UnknownStandard(_) => ErrorKind::UnknownStandard,
            Self::UnknownWavelength { .. } => ErrorKind::UnknownWavelength,
            Self::UnknownApplication { .. } => ErrorKind::UnknownApplication,
            Self::Segment { source, .. } => source.kind(),
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            error_kind: self.kind(),
            message: self.to_string(),
            details: Some(self.details()).filter(|d| !d.is_empty()),
        }
    }

    fn details(&self) -> ErrorDetails {
        match self {
            Self::InvalidInput { field, .. } => ErrorDetails {
                field: Some(field.key().to_string()),
                ..Default::default()
            },
            Self::DistanceExceeded {
                entered_m,
                max_m,
                code,
            } => ErrorDetails {
                entered_distance: Some(*entered_m),
                max_distance: Some(*max_m),
                standard_code: Some(code.to_string()),
                ..Default::default()
            },
            Self::UnknownStandard(code) => ErrorDetails {
                standard_code: Some(code.clone()),
                ..Default::default()
            },
            Self::UnknownWavelength { code, wavelength } => ErrorDetails {
                standard_code: Some(code.to_string()),
                wavelength: Some(wavelength.clone()),
                ..Default::default()
            },
            Self::UnknownApplication { code, application } => ErrorDetails {
                standard_code: Some(code.to_string()),
                application: Some(application.clone()),
                ..Default::default()
            },
            Self::Segment { segment, source } => ErrorDetails {
                segment: Some(*segment),
                ..source.details()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidInput,
    DistanceExceeded,
    UnknownStandard,
    UnknownWavelength,
    UnknownApplication,
}

/// Failure half of the calculator contract, shared by every adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub error_kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entered_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wavelength: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<usize>,
}

impl ErrorDetails {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<&LossBudgetError> for ErrorReport {
    fn from(err: &LossBudgetError) -> Self {
        err.report()
    }
}
