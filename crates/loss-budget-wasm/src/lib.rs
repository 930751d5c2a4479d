//! Loss Budget WASM
//!
//! Browser bindings for static-page front ends. The form fields go in as
//! the strings the page read from its inputs, and results come back as JSON
//! in the same camelCase contract the gateway serves.
//!
//! Build with `--features wasm` for `wasm-bindgen` exports. Without the
//! feature the same functions are plain Rust and return `Result<String, String>`
//! where the error side is a serialized [`ErrorReport`].

use fiber_standards::{Catalog, FiberStandard};
use loss_budget::{
    analyze_link, parse_request, report, ErrorKind, ErrorReport, LinkRequest, LossBudgetResult,
};
use serde::Serialize;

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

fn error_json(report: &ErrorReport) -> String {
    to_json(report).unwrap_or_else(|_| report.message.clone())
}

fn compute(
    standard_code: &str,
    distance: &str,
    splices: &str,
    connectors: &str,
) -> Result<LossBudgetResult, ErrorReport> {
    parse_request(standard_code, distance, splices, connectors)
        .and_then(|request| request.compute())
        .map_err(|e| e.report())
}

/// Loss budget for one run as JSON; the error side is an `ErrorReport`
pub fn compute_loss_budget_json(
    standard_code: &str,
    distance: &str,
    splices: &str,
    connectors: &str,
) -> Result<String, String> {
    match compute(standard_code, distance, splices, connectors) {
        Ok(result) => to_json(&result),
        Err(report) => Err(error_json(&report)),
    }
}

/// Text block for the page's result panel. Failures render as the one-line
/// error message so the page can show either without branching.
pub fn render_loss_budget_text(
    standard_code: &str,
    distance: &str,
    splices: &str,
    connectors: &str,
) -> String {
    match compute(standard_code, distance, splices, connectors) {
        Ok(result) => report::render_loss_budget(&result),
        Err(report) => report::render_error(&report),
    }
}

/// Link analysis from a JSON `LinkRequest`
pub fn analyze_link_json(request_json: &str) -> Result<String, String> {
    let request: LinkRequest = serde_json::from_str(request_json).map_err(|e| {
        error_json(&ErrorReport {
            error_kind: ErrorKind::InvalidInput,
            message: format!("Malformed link request: {e}"),
            details: None,
        })
    })?;

    match analyze_link(&request) {
        Ok(analysis) => to_json(&analysis),
        Err(err) => Err(error_json(&err.report())),
    }
}

/// The full reference table as a JSON array
pub fn list_standards_json() -> Result<String, String> {
    let standards: Vec<&FiberStandard> = Catalog::builtin().iter().collect();
    to_json(&standards)
}

// ============================================================================
// wasm-bindgen exports
// ============================================================================

#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = computeLossBudget)]
pub fn compute_loss_budget_js(
    standard_code: &str,
    distance: &str,
    splices: &str,
    connectors: &str,
) -> Result<String, JsValue> {
    compute_loss_budget_json(standard_code, distance, splices, connectors)
        .map_err(|e| JsValue::from_str(&e))
}

#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = renderLossBudget)]
pub fn render_loss_budget_js(
    standard_code: &str,
    distance: &str,
    splices: &str,
    connectors: &str,
) -> String {
    render_loss_budget_text(standard_code, distance, splices, connectors)
}

#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = analyzeLink)]
pub fn analyze_link_js(request_json: &str) -> Result<String, JsValue> {
    analyze_link_json(request_json).map_err(|e| JsValue::from_str(&e))
}

#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = listStandards)]
pub fn list_standards_js() -> Result<String, JsValue> {
    list_standards_json().map_err(|e| JsValue::from_str(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_compute_json_contract() {
        let json = compute_loss_budget_json("OS2", "10000", "0", "0").unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["standardCode"], "OS2");
        assert_eq!(value["wavelengths"][0]["label"], "1310nm");
        assert_eq!(value["wavelengths"][1]["typicalLossDb"].as_f64(), Some(2.2));
    }

    #[test]
    fn test_compute_json_error_is_report() {
        let json = compute_loss_budget_json("OM3", "350", "0", "0").unwrap_err();
        let report: ErrorReport = serde_json::from_str(&json).unwrap();

        assert_eq!(report.error_kind, ErrorKind::DistanceExceeded);
        let details = report.details.unwrap();
        assert_eq!(details.max_distance, Some(300.0));
        assert_eq!(details.standard_code.as_deref(), Some("OM3"));
    }

    #[test]
    fn test_render_text() {
        let text = render_loss_budget_text("OS2", "5000", "4", "2");
        assert!(text.contains("Typical Good Performance: 2.45 dB"));

        let text = render_loss_budget_text("OS2", "", "0", "0");
        assert!(text.starts_with("Input Error:"));
    }

    #[test]
    fn test_analyze_link_json() {
        let request = r#"{
            "segments": [
                {"standardCode": "OS2", "wavelength": "1550nm", "distance": 1000,
                 "spliceCount": 2, "connectorCount": 2}
            ]
        }"#;
        let value: Value = serde_json::from_str(&analyze_link_json(request).unwrap()).unwrap();

        assert_eq!(value["status"], "Pass");
        assert!((value["totalLossDb"].as_f64().unwrap() - 3.82).abs() < 1e-9);
        assert!((value["marginDb"].as_f64().unwrap() - 6.18).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_link_malformed() {
        let json = analyze_link_json("{not json").unwrap_err();
        let report: ErrorReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report.error_kind, ErrorKind::InvalidInput);
        assert!(report.message.starts_with("Malformed link request"));
    }

    #[test]
    fn test_list_standards() {
        let value: Value = serde_json::from_str(&list_standards_json().unwrap()).unwrap();
        let codes: Vec<_> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["code"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(codes, ["OS2", "OM3", "OM4", "OM5"]);
    }
}
