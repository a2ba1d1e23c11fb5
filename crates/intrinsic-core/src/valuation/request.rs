use serde::{Deserialize, Serialize};

use crate::error::IntrinsicError;
use crate::IntrinsicResult;

use super::dcf::{DcfCalcOptions, DcfInputs};

/// One company's valuation inputs as supplied by a data collaborator: the
/// percentage assumptions plus whatever absolute figures are known for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    pub inputs: DcfInputs,
    #[serde(default)]
    pub options: DcfCalcOptions,
}

impl ValuationRequest {
    pub fn from_json(contents: &str) -> IntrinsicResult<Self> {
        let request: ValuationRequest = serde_json::from_str(contents)?;
        request.check_ticker()?;
        Ok(request)
    }

    pub fn from_value(value: serde_json::Value) -> IntrinsicResult<Self> {
        let request: ValuationRequest = serde_json::from_value(value)?;
        request.check_ticker()?;
        Ok(request)
    }

    fn check_ticker(&self) -> IntrinsicResult<()> {
        match &self.ticker {
            Some(t) if t.trim().is_empty() => Err(IntrinsicError::InvalidInput {
                field: "ticker".into(),
                reason: "Ticker must not be blank when supplied".into(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const REQUEST: &str = r#"{
        "ticker": "ACME",
        "inputs": {
            "revenueCagr": 15, "ebitMargin": 25, "taxRate": 21, "capexPercent": 3,
            "nwcPercent": 2, "terminalGrowth": 3, "discountRate": 10
        },
        "options": { "fcfLatest": 1000, "growthEstimate5Y": 10, "useMidYear": true }
    }"#;

    #[test]
    fn test_parse_numeric_fields() {
        let r = ValuationRequest::from_json(REQUEST).unwrap();
        assert_eq!(r.ticker.as_deref(), Some("ACME"));
        assert_eq!(r.inputs.revenue_cagr, dec!(15));
        assert_eq!(r.options.fcf_latest, Some(dec!(1000)));
        assert_eq!(r.options.growth_estimate_5y, Some(dec!(10)));
        assert_eq!(r.options.use_mid_year, Some(true));
        assert_eq!(r.options.wacc, None);
    }

    #[test]
    fn test_options_may_be_omitted() {
        let r = ValuationRequest::from_json(
            r#"{ "inputs": { "revenueCagr": 1, "ebitMargin": 2, "taxRate": 3,
                 "capexPercent": 4, "nwcPercent": 5, "terminalGrowth": 2.5, "discountRate": 9 } }"#,
        )
        .unwrap();
        assert_eq!(r.options, DcfCalcOptions::default());
        assert_eq!(r.inputs.terminal_growth, dec!(2.5));
    }

    #[test]
    fn test_round_trip_is_exact() {
        let r = ValuationRequest::from_json(REQUEST).unwrap();
        let json = serde_json::to_string(&r).unwrap();
        let back = ValuationRequest::from_json(&json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn test_blank_ticker_rejected() {
        let bad = REQUEST.replace("\"ACME\"", "\"  \"");
        assert!(matches!(
            ValuationRequest::from_json(&bad),
            Err(IntrinsicError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_missing_inputs_is_serialization_error() {
        assert!(matches!(
            ValuationRequest::from_json(r#"{ "ticker": "X" }"#),
            Err(IntrinsicError::SerializationError(_))
        ));
    }
}
