//! Fiber Standards Library
//!
//! Static reference table of the fiber-optic grades used for insertion
//! loss budgeting: single-mode OS2 (ITU-T G.652.D) and multimode OM3,
//! OM4 and OM5.
//!
//! | Code | Max length | Wavelengths      | Splice max/typ | Connector max/typ |
//! |------|------------|------------------|----------------|-------------------|
//! | OS2  | 10000 m    | 1310nm, 1550nm   | 0.3 / 0.05 dB  | 0.75 / 0.25 dB    |
//! | OM3  | 300 m      | 850nm, 1300nm    | 0.3 / 0.1 dB   | 0.75 / 0.3 dB     |
//! | OM4  | 400 m      | 850nm, 1300nm    | 0.3 / 0.1 dB   | 0.75 / 0.3 dB     |
//! | OM5  | 440 m      | 850nm, 953nm     | 0.3 / 0.1 dB   | 0.75 / 0.3 dB     |
//!
//! The table is a `static` and is never mutated. Wavelength order is the
//! declaration order and drives the order of every report.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Unknown fiber standard: {0}")]
    UnknownStandard(String),
    #[error("Wavelength {wavelength} is not defined for {standard}")]
    UnknownWavelength {
        standard: FiberType,
        wavelength: String,
    },
    #[error("No {application} budget is defined for {standard}")]
    UnknownApplication {
        standard: FiberType,
        application: String,
    },
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Fiber grade code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FiberType {
    #[serde(rename = "OS2")]
    Os2,
    #[serde(rename = "OM3")]
    Om3,
    #[serde(rename = "OM4")]
    Om4,
    #[serde(rename = "OM5")]
    Om5,
}

impl FiberType {
    pub const ALL: [FiberType; 4] = [Self::Os2, Self::Om3, Self::Om4, Self::Om5];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Os2 => "OS2",
            Self::Om3 => "OM3",
            Self::Om4 => "OM4",
            Self::Om5 => "OM5",
        }
    }

    /// Reference table entry for this grade
    pub fn standard(&self) -> &'static FiberStandard {
        match self {
            Self::Os2 => &STANDARDS[0],
            Self::Om3 => &STANDARDS[1],
            Self::Om4 => &STANDARDS[2],
            Self::Om5 => &STANDARDS[3],
        }
    }

    pub fn is_single_mode(&self) -> bool {
        matches!(self, Self::Os2)
    }
}

impl FromStr for FiberType {
    type Err = CatalogError;

    /// Accepts the table codes, ignoring surrounding whitespace and ASCII case.
    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(code))
            .ok_or_else(|| CatalogError::UnknownStandard(code.to_string()))
    }
}

impl fmt::Display for FiberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Per-kilometer attenuation at one wavelength
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attenuation {
    pub max_attenuation_db_per_km: f64,
    pub typical_attenuation_db_per_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WavelengthSpec {
    pub label: &'static str,
    #[serde(flatten)]
    pub attenuation: Attenuation,
}

/// Flat loss added per splice or per connector, independent of length
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLoss {
    pub max_db: f64,
    pub typical_db: f64,
}

/// Total channel loss an application tolerates over this fiber
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationBudget {
    pub application: &'static str,
    pub budget_db: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FiberStandard {
    pub code: FiberType,
    pub display_name: &'static str,
    pub max_distance_meters: f64,
    pub wavelengths: &'static [WavelengthSpec],
    pub splice_loss: EventLoss,
    pub connector_loss: EventLoss,
    pub application_budgets: &'static [ApplicationBudget],
    /// Wavelength whose OTDR trace report is read when verifying a link
    pub otdr_reference_wavelength: &'static str,
}

impl FiberStandard {
    /// Look up a wavelength by label (ASCII case-insensitive)
    pub fn wavelength(&self, label: &str) -> Result<&'static WavelengthSpec> {
        let label = label.trim();
        self.wavelengths
            .iter()
            .find(|w| w.label.eq_ignore_ascii_case(label))
            .ok_or_else(|| CatalogError::UnknownWavelength {
                standard: self.code,
                wavelength: label.to_string(),
            })
    }

    /// First declared wavelength, used when a caller does not pick one
    pub fn default_wavelength(&self) -> &'static WavelengthSpec {
        &self.wavelengths[0]
    }

    pub fn budget(&self, application: &str) -> Result<f64> {
        let application = application.trim();
        self.application_budgets
            .iter()
            .find(|b| b.application.eq_ignore_ascii_case(application))
            .map(|b| b.budget_db)
            .ok_or_else(|| CatalogError::UnknownApplication {
                standard: self.code,
                application: application.to_string(),
            })
    }

    pub fn max_distance_km(&self) -> f64 {
        self.max_distance_meters / 1000.0
    }
}

// TIA-568 per-event limits shared by the multimode grades
const MULTIMODE_SPLICE: EventLoss = EventLoss {
    max_db: 0.3,
    typical_db: 0.1,
};
const MULTIMODE_CONNECTOR: EventLoss = EventLoss {
    max_db: 0.75,
    typical_db: 0.3,
};

const MULTIMODE_BUDGETS: &[ApplicationBudget] = &[
    ApplicationBudget { application: "10G", budget_db: 2.6 },
    ApplicationBudget { application: "40G", budget_db: 1.9 },
];

const OM3_OM4_WAVELENGTHS: &[WavelengthSpec] = &[
    WavelengthSpec {
        label: "850nm",
        attenuation: Attenuation {
            max_attenuation_db_per_km: 3.0,
            typical_attenuation_db_per_km: 2.5,
        },
    },
    WavelengthSpec {
        label: "1300nm",
        attenuation: Attenuation {
            max_attenuation_db_per_km: 1.5,
            typical_attenuation_db_per_km: 0.8,
        },
    },
];

/// The reference table, in `FiberType::ALL` order
pub static STANDARDS: [FiberStandard; 4] = [
    FiberStandard {
        code: FiberType::Os2,
        display_name: "Single-Mode (ITU-T G.652.D)",
        max_distance_meters: 10000.0,
        wavelengths: &[
            WavelengthSpec {
                label: "1310nm",
                attenuation: Attenuation {
                    max_attenuation_db_per_km: 0.4,
                    typical_attenuation_db_per_km: 0.35,
                },
            },
            WavelengthSpec {
                label: "1550nm",
                attenuation: Attenuation {
                    max_attenuation_db_per_km: 0.3,
                    typical_attenuation_db_per_km: 0.22,
                },
            },
        ],
        splice_loss: EventLoss {
            max_db: 0.3,
            typical_db: 0.05,
        },
        connector_loss: EventLoss {
            max_db: 0.75,
            typical_db: 0.25,
        },
        application_budgets: &[
            ApplicationBudget { application: "10G", budget_db: 10.0 },
            ApplicationBudget { application: "40G", budget_db: 8.0 },
        ],
        otdr_reference_wavelength: "1550nm",
    },
    FiberStandard {
        code: FiberType::Om3,
        display_name: "Multimode OM3",
        max_distance_meters: 300.0,
        wavelengths: OM3_OM4_WAVELENGTHS,
        splice_loss: MULTIMODE_SPLICE,
        connector_loss: MULTIMODE_CONNECTOR,
        application_budgets: MULTIMODE_BUDGETS,
        otdr_reference_wavelength: "850nm",
    },
    FiberStandard {
        code: FiberType::Om4,
        display_name: "Multimode OM4",
        max_distance_meters: 400.0,
        wavelengths: OM3_OM4_WAVELENGTHS,
        splice_loss: MULTIMODE_SPLICE,
        connector_loss: MULTIMODE_CONNECTOR,
        application_budgets: MULTIMODE_BUDGETS,
        otdr_reference_wavelength: "850nm",
    },
    FiberStandard {
        code: FiberType::Om5,
        display_name: "Multimode OM5",
        max_distance_meters: 440.0,
        wavelengths: &[
            WavelengthSpec {
                label: "850nm",
                attenuation: Attenuation {
                    max_attenuation_db_per_km: 3.0,
                    typical_attenuation_db_per_km: 2.4,
                },
            },
            WavelengthSpec {
                label: "953nm",
                attenuation: Attenuation {
                    max_attenuation_db_per_km: 2.2,
                    typical_attenuation_db_per_km: 1.9,
                },
            },
        ],
        splice_loss: MULTIMODE_SPLICE,
        connector_loss: MULTIMODE_CONNECTOR,
        application_budgets: MULTIMODE_BUDGETS,
        otdr_reference_wavelength: "850nm",
    },
];

/// Read-only view over the reference table handed to every adapter
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    standards: &'static [FiberStandard],
}

impl Catalog {
    pub fn builtin() -> Self {
        Self {
            standards: &STANDARDS,
        }
    }

    pub fn get(&self, code: &str) -> Result<&'static FiberStandard> {
        let fiber: FiberType = code.parse()?;
        self.standards
            .iter()
            .find(|s| s.code == fiber)
            .ok_or_else(|| CatalogError::UnknownStandard(fiber.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static FiberStandard> {
        self.standards.iter()
    }

    pub fn codes(&self) -> impl Iterator<Item = &'static str> {
        self.standards.iter().map(|s| s.code.as_str())
    }

    pub fn len(&self) -> usize {
        self.standards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.standards.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
