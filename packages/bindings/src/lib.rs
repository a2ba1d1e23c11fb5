use napi::Result as NapiResult;
use napi_derive::napi;

use intrinsic_core::valuation::dcf::{self, DcfCalcOptions, DcfInputs};
use intrinsic_core::valuation::sensitivity;
use intrinsic_core::valuation::ValuationRequest;
use intrinsic_core::ValuationDefaults;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_pair(inputs_json: &str, options_json: Option<String>) -> NapiResult<(DcfInputs, DcfCalcOptions)> {
    let inputs: DcfInputs = serde_json::from_str(inputs_json).map_err(to_napi_error)?;
    let options: DcfCalcOptions = match options_json {
        Some(json) if !json.trim().is_empty() => serde_json::from_str(&json).map_err(to_napi_error)?,
        _ => DcfCalcOptions::default(),
    };
    Ok((inputs, options))
}

fn parse_defaults(defaults_json: Option<String>) -> NapiResult<ValuationDefaults> {
    match defaults_json {
        Some(json) if !json.trim().is_empty() => {
            ValuationDefaults::from_json(&json).map_err(to_napi_error)
        }
        _ => Ok(ValuationDefaults::default()),
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// DCFResults for the given assumptions and optional overrides.
#[napi]
pub fn calculate_dcf(inputs_json: String, options_json: Option<String>) -> NapiResult<String> {
    let (inputs, options) = parse_pair(&inputs_json, options_json)?;
    let results = dcf::calculate_dcf(&inputs, &options);
    serde_json::to_string(&results).map_err(to_napi_error)
}

/// 5x5 discount rate x terminal growth grid of rounded intrinsic values.
#[napi]
pub fn generate_sensitivity_data(
    inputs_json: String,
    options_json: Option<String>,
) -> NapiResult<String> {
    let (inputs, options) = parse_pair(&inputs_json, options_json)?;
    let data = sensitivity::generate_sensitivity_data(&inputs, &options);
    serde_json::to_string(&data).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[napi]
pub fn value_company(request_json: String, defaults_json: Option<String>) -> NapiResult<String> {
    let request = ValuationRequest::from_json(&request_json).map_err(to_napi_error)?;
    let defaults = parse_defaults(defaults_json)?;
    let output = dcf::value_company(&request, &defaults).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn sensitivity_report(request_json: String, defaults_json: Option<String>) -> NapiResult<String> {
    let request = ValuationRequest::from_json(&request_json).map_err(to_napi_error)?;
    let defaults = parse_defaults(defaults_json)?;
    let output = sensitivity::run_sensitivity(&request, &defaults).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
