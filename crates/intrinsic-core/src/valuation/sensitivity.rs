use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::ValuationDefaults;
use crate::time_value::round_half_up;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::IntrinsicResult;

use super::dcf::{calculate_dcf_with_defaults, DcfCalcOptions, DcfInputs};
use super::request::ValuationRequest;

/// Terminal growth axis in percent, independent of the caller's assumptions.
pub const TERMINAL_GROWTH_AXIS: [Percent; 5] = [dec!(1), dec!(1.5), dec!(2), dec!(2.5), dec!(3)];

/// Percentage-point offsets around the central discount rate.
const DISCOUNT_RATE_OFFSETS: [i64; 5] = [-2, -1, 0, 1, 2];

/// Intrinsic value per share across discount rate x terminal growth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityData {
    pub discount_rates: Vec<Percent>,
    pub terminal_growth_rates: Vec<Percent>,
    /// values[i][j] = rounded intrinsic value at discount_rates[i], terminal_growth_rates[j]
    pub values: Vec<Vec<Money>>,
}

/// Whole-percent discount rates centred on the override or assumption rate.
pub fn discount_rate_axis(center: Percent) -> Vec<Percent> {
    DISCOUNT_RATE_OFFSETS
        .iter()
        .map(|&offset| round_half_up(center.saturating_add(Decimal::from(offset))))
        .collect()
}

pub fn generate_sensitivity_data(inputs: &DcfInputs, options: &DcfCalcOptions) -> SensitivityData {
    generate_sensitivity_data_with_defaults(inputs, options, &ValuationDefaults::default())
}

pub fn generate_sensitivity_data_with_defaults(
    inputs: &DcfInputs,
    options: &DcfCalcOptions,
    defaults: &ValuationDefaults,
) -> SensitivityData {
    let center = options.wacc.unwrap_or(inputs.discount_rate);
    let discount_rates = discount_rate_axis(center);
    let terminal_growth_rates = TERMINAL_GROWTH_AXIS.to_vec();

    // Rate overrides would pin every cell to the same pair
    let cell_options = DcfCalcOptions {
        wacc: None,
        terminal_rate: None,
        ..options.clone()
    };

    let values = discount_rates
        .iter()
        .map(|&discount_rate| {
            terminal_growth_rates
                .iter()
                .map(|&terminal_growth| {
                    let cell_inputs = DcfInputs {
                        discount_rate,
                        terminal_growth,
                        ..inputs.clone()
                    };
                    let results = calculate_dcf_with_defaults(&cell_inputs, &cell_options, defaults);
                    round_half_up(results.intrinsic_value)
                })
                .collect()
        })
        .collect();

    tracing::debug!(center = %center, "generated 5x5 sensitivity grid");

    SensitivityData {
        discount_rates,
        terminal_growth_rates,
        values,
    }
}

/// Sensitivity grid for a request document, wrapped in the output envelope.
pub fn run_sensitivity(
    request: &ValuationRequest,
    defaults: &ValuationDefaults,
) -> IntrinsicResult<ComputationOutput<SensitivityData>> {
    let start = Instant::now();
    defaults.validate()?;

    let mut warnings = Vec::new();
    if request.options.wacc.is_some() || request.options.terminal_rate.is_some() {
        warnings.push(
            "WACC / terminal rate overrides centre the discount axis only; grid cells use the axis values"
                .into(),
        );
    }

    let data = generate_sensitivity_data_with_defaults(&request.inputs, &request.options, defaults);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "DCF Sensitivity (Discount Rate x Terminal Growth)",
        request,
        warnings,
        elapsed,
        data,
    ))
}
