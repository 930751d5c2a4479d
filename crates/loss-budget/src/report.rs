//! Plain text rendering and JSON output

use crate::calculator::LossBudgetResult;
use crate::error::{ErrorKind, ErrorReport};
use crate::link::{LinkAnalysis, LinkStatus, LossBasis};
use fiber_standards::FiberStandard;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const RULE: &str = "--------------------------------------";

impl fmt::Display for LossBudgetResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Link Loss Budget for {}", self.standard_name)?;
        writeln!(f, "{RULE}")?;
        writeln!(
            f,
            "Distance: {} m | Splices: {} | Connectors: {}",
            self.distance_meters, self.splice_count, self.connector_count
        )?;

        for w in &self.wavelengths {
            writeln!(f)?;
            writeln!(f, "Results for Wavelength: {}", w.label)?;
            writeln!(f, "  - Max Acceptable Loss: {:.2} dB", w.max_loss_db)?;
            writeln!(f, "  - Typical Good Performance: {:.2} dB", w.typical_loss_db)?;
        }
        Ok(())
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Pass => "Pass",
            Self::Fail => "Fail",
        })
    }
}

impl fmt::Display for LinkAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let coefficients = match (self.custom_coefficients, self.basis) {
            (true, _) => "custom",
            (false, LossBasis::Typical) => "typical",
            (false, LossBasis::Max) => "maximum",
        };

        writeln!(f, "Link Loss Budget Results")?;
        writeln!(f, "{RULE}")?;
        writeln!(
            f,
            "Total Distance: {:.2} km | Safety Margin: {:.2} dB | Coefficients: {}",
            self.total_distance_km, self.safety_margin_db, coefficients
        )?;
        writeln!(f)?;

        for s in &self.segments {
            writeln!(
                f,
                "Segment {}: {} @ {}, {:.3} km -> {:.2} dB",
                s.segment, s.standard_code, s.wavelength, s.distance_km, s.total_loss_db
            )?;
        }
        writeln!(f)?;

        writeln!(f, "{:<20} {:>10}", "Component", "Loss (dB)")?;
        let rows = [
            ("Fiber Attenuation", self.fiber_loss_db),
            ("Splice Loss", self.splice_loss_db),
            ("Connector Loss", self.connector_loss_db),
            ("Safety Margin", self.safety_margin_db),
            ("Total Loss", self.total_loss_db),
        ];
        for (label, value) in rows {
            writeln!(f, "{label:<20} {value:>10.2}")?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "Budget ({}): {:.2} dB | Margin: {:.2} dB | Status: {}",
            self.application, self.budget_db, self.margin_db, self.status
        )
    }
}

pub fn render_loss_budget(result: &LossBudgetResult) -> String {
    result.to_string()
}

pub fn render_link_analysis(analysis: &LinkAnalysis) -> String {
    analysis.to_string()
}

/// One-line actionable message for a failed calculation
pub fn render_error(report: &ErrorReport) -> String {
    let prefix = match report.error_kind {
        ErrorKind::InvalidInput => "Input Error",
        ErrorKind::DistanceExceeded => "Length Error",
        ErrorKind::UnknownStandard
        | ErrorKind::UnknownWavelength
        | ErrorKind::UnknownApplication => "Lookup Error",
    };
    format!("{prefix}: {}", report.message)
}

/// Which OTDR wavelength report to read when verifying this fiber
pub fn otdr_guidance(standard: &FiberStandard) -> String {
    let reason = if standard.code.is_single_mode() {
        "It is more sensitive to bends and losses, giving the most accurate splice count."
    } else {
        "This is the primary transmission wavelength and its higher natural loss gives a \
         worst-case, conservative budget."
    };

    format!(
        "{} ({}): use the {} report as your reference.\n  {reason}\n  \
         Fusion splices show as a small, sharp drop with no reflection; below 0.1 dB is excellent.\n  \
         The end of the fiber is the final large reflective spike.\n",
        standard.display_name, standard.code, standard.otdr_reference_wavelength
    )
}

/// Write any contract value as pretty JSON
pub fn write_json<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(std::io::Error::from)?;
    writer.write_all(b"\n")?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::compute_loss_budget;
    use crate::link::{analyze_link, DistanceUnit, LinkRequest, SegmentInput};
    use fiber_standards::FiberType;
    use tempfile::NamedTempFile;

    #[test]
    fn test_render_loss_budget() {
        let result = compute_loss_budget("OS2", 5000.0, 4, 2).unwrap();
        let text = render_loss_budget(&result);

        assert!(text.starts_with("Link Loss Budget for Single-Mode (ITU-T G.652.D)\n"));
        assert!(text.contains("Results for Wavelength: 1310nm\n  - Max Acceptable Loss: 4.70 dB\n  - Typical Good Performance: 2.45 dB"));
        let first = text.find("1310nm").unwrap();
        let second = text.find("1550nm").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_render_link_analysis() {
        let request = LinkRequest::new(vec![SegmentInput::new("OS2", 1000.0, DistanceUnit::Meters)
            .with_wavelength("1550nm")
            .with_events(2, 2)]);
        let text = render_link_analysis(&analyze_link(&request).unwrap());

        assert!(text.contains("Total Loss                 3.82"));
        assert!(text.contains("Budget (10G): 10.00 dB | Margin: 6.18 dB | Status: Pass"));
        assert!(text.contains("Segment 1: OS2 @ 1550nm, 1.000 km -> 0.82 dB"));
        assert!(text.contains("Coefficients: typical"));
    }

    #[test]
    fn test_render_error() {
        let err = compute_loss_budget("OM3", 350.0, 0, 0).unwrap_err();
        assert_eq!(
            render_error(&err.report()),
            "Length Error: The entered distance of 350m exceeds the recommended maximum of 300m for OM3"
        );
    }

    #[test]
    fn test_otdr_guidance() {
        assert!(otdr_guidance(FiberType::Os2.standard()).contains("use the 1550nm report"));
        assert!(otdr_guidance(FiberType::Om5.standard()).contains("use the 850nm report"));
    }

    #[test]
    fn test_write_json() {
        let result = compute_loss_budget("OM4", 100.0, 1, 2).unwrap();
        let file = NamedTempFile::new().unwrap();
        write_json(file.path(), &result).unwrap();

        let written = std::fs::read_to_string(file.path()).unwrap();
        let parsed: LossBudgetResult = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed.standard_code, "OM4");
        assert_eq!(parsed.wavelengths.len(), result.wavelengths.len());
        for (p, r) in parsed.wavelengths.iter().zip(&result.wavelengths) {
            assert_eq!(p.label, r.label);
            assert!((p.max_loss_db - r.max_loss_db).abs() < 1e-9);
        }
    }
}
