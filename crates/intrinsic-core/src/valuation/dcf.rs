use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{ValuationDefaults, MAX_PERIOD_YEARS};
use crate::time_value::{
    discount_period, gordon_terminal_value, pct_to_rate, present_value, saturating_div,
};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::IntrinsicResult;

use super::request::ValuationRequest;
use super::resolve::{resolve_assumptions, ProjectionPath, ResolvedAssumptions, ValueSource};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Operating assumptions, all in percent (15 = 15%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcfInputs {
    /// Annual revenue growth
    pub revenue_cagr: Percent,
    /// EBIT as a share of revenue
    pub ebit_margin: Percent,
    /// Tax on EBIT
    pub tax_rate: Percent,
    /// Capital expenditure as a share of revenue
    pub capex_percent: Percent,
    /// Working capital investment as a share of the revenue change
    pub nwc_percent: Percent,
    /// Perpetuity growth after the explicit horizon
    pub terminal_growth: Percent,
    /// Discount rate (WACC)
    pub discount_rate: Percent,
}

/// Company-specific overrides in absolute units. Every field is optional;
/// absence is resolved by [`super::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DcfCalcOptions {
    /// Year-0 revenue for the revenue-driven path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_revenue: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shares_outstanding: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<Money>,
    /// Latest actual free cash flow; with `growth_estimate_5y` selects the FCF-growth path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fcf_latest: Option<Money>,
    /// Percent
    #[serde(rename = "growthEstimate5Y", skip_serializing_if = "Option::is_none")]
    pub growth_estimate_5y: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_years: Option<i32>,
    /// Percent; overrides `DcfInputs::terminal_growth` on the FCF-growth path only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal_rate: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_debt: Option<Money>,
    /// Percent of revenue added back as D&A
    #[serde(skip_serializing_if = "Option::is_none")]
    pub da_percent: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_mid_year: Option<bool>,
    /// Percent; overrides `DcfInputs::discount_rate`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wacc: Option<Percent>,
}

/// Headline valuation numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcfResults {
    /// Equity value per share
    pub intrinsic_value: Money,
    pub enterprise_value: Money,
    /// Equity value after the net debt bridge
    pub implied_market_cap: Money,
    /// Percent above (positive) or below (negative) the market price
    pub margin_of_safety: Percent,
    #[serde(rename = "projectedFCFs")]
    pub projected_fcfs: Vec<Money>,
}

/// Revenue build behind one year's FCF on the revenue-driven path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatingBuild {
    pub revenue: Money,
    pub ebit: Money,
    pub tax: Money,
    pub nopat: Money,
    pub plus_da: Money,
    pub less_capex: Money,
    pub less_nwc_change: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedYear {
    pub year: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating: Option<OperatingBuild>,
    pub fcf: Money,
    pub discount_period: Decimal,
    pub present_value: Money,
}

/// Full valuation: resolved assumptions, the year-by-year build, the terminal
/// value and the headline results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcfValuation {
    pub assumptions: ResolvedAssumptions,
    pub projections: Vec<ProjectedYear>,
    pub pv_of_fcfs: Money,
    pub terminal_value: Money,
    /// Gordon denominator used, as a decimal rate
    pub terminal_spread: Rate,
    pub terminal_spread_floored: bool,
    pub pv_of_terminal: Money,
    /// PV of terminal value / enterprise value; zero when EV is not positive
    pub terminal_value_pct: Rate,
    pub results: DcfResults,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Intrinsic value with the built-in defaults.
pub fn calculate_dcf(inputs: &DcfInputs, options: &DcfCalcOptions) -> DcfResults {
    calculate_dcf_with_defaults(inputs, options, &ValuationDefaults::default())
}

pub fn calculate_dcf_with_defaults(
    inputs: &DcfInputs,
    options: &DcfCalcOptions,
    defaults: &ValuationDefaults,
) -> DcfResults {
    build_valuation(inputs, options, defaults).results
}

/// Run the DCF and keep every intermediate figure.
///
/// Never fails: figures that would overflow a `Decimal` saturate at
/// `Decimal::MAX` / `Decimal::MIN`.
pub fn build_valuation(
    inputs: &DcfInputs,
    options: &DcfCalcOptions,
    defaults: &ValuationDefaults,
) -> DcfValuation {
    let assumptions = resolve_assumptions(inputs, options, defaults);
    let n_years = assumptions.period_years;

    // --- Project cash flows ---
    let cash_flows = match assumptions.path {
        ProjectionPath::FcfGrowth {
            fcf_latest,
            growth_rate,
        } => project_fcf_growth(fcf_latest, growth_rate, n_years),
        ProjectionPath::RevenueDriven { base_revenue } => {
            project_revenue_driven(inputs, base_revenue, assumptions.da_percent, n_years)
        }
    };

    // --- Discount ---
    let wacc = pct_to_rate(assumptions.discount_rate);
    let projections = discount_projections(cash_flows, wacc, assumptions.mid_year);
    let pv_of_fcfs: Money = projections
        .iter()
        .fold(Decimal::ZERO, |acc, p| acc.saturating_add(p.present_value));

    // --- Terminal value ---
    let last_fcf = projections.last().map(|p| p.fcf).unwrap_or(Decimal::ZERO);
    let growth = pct_to_rate(assumptions.terminal_growth);
    let tv = gordon_terminal_value(last_fcf, wacc, growth, assumptions.terminal_spread_floor);
    if tv.floored {
        tracing::debug!(
            discount_rate = %assumptions.discount_rate,
            terminal_growth = %assumptions.terminal_growth,
            floor = %assumptions.terminal_spread_floor,
            "terminal spread floored"
        );
    }

    let tv_period = if assumptions.mid_year {
        Decimal::from(n_years) - dec!(0.5)
    } else {
        Decimal::from(n_years)
    };
    let pv_of_terminal = present_value(tv.value, wacc, tv_period);

    // --- Enterprise value and equity bridge ---
    let enterprise_value = pv_of_fcfs.saturating_add(pv_of_terminal);
    let implied_market_cap = enterprise_value.saturating_sub(assumptions.net_debt);

    let shares = assumptions.shares_outstanding.value;
    let intrinsic_value = if shares > Decimal::ZERO {
        saturating_div(implied_market_cap, shares)
    } else {
        Decimal::ZERO
    };

    let price = assumptions.market_price.value;
    let margin_of_safety = if price > Decimal::ZERO {
        saturating_div(intrinsic_value.saturating_sub(price), price).saturating_mul(dec!(100))
    } else {
        Decimal::ZERO
    };

    // A share of a negative or zero EV is not meaningful
    let terminal_value_pct = if enterprise_value > Decimal::ZERO {
        saturating_div(pv_of_terminal, enterprise_value)
    } else {
        Decimal::ZERO
    };

    let results = DcfResults {
        intrinsic_value,
        enterprise_value,
        implied_market_cap,
        margin_of_safety,
        projected_fcfs: projections.iter().map(|p| p.fcf).collect(),
    };

    DcfValuation {
        assumptions,
        projections,
        pv_of_fcfs,
        terminal_value: tv.value,
        terminal_spread: tv.spread,
        terminal_spread_floored: tv.floored,
        pv_of_terminal,
        terminal_value_pct,
        results,
    }
}

/// Value one company from a request document, wrapped in the output envelope.
pub fn value_company(
    request: &ValuationRequest,
    defaults: &ValuationDefaults,
) -> IntrinsicResult<ComputationOutput<DcfValuation>> {
    let start = Instant::now();
    defaults.validate()?;

    let valuation = build_valuation(&request.inputs, &request.options, defaults);
    let mut warnings = valuation_warnings(&valuation);

    let methodology = match valuation.assumptions.path {
        ProjectionPath::FcfGrowth { .. } => "FCF Growth DCF (Gordon terminal value)",
        ProjectionPath::RevenueDriven { .. } => "Revenue-Driven FCFF DCF (Gordon terminal value)",
    };

    if let Some(requested) = request.options.period_years {
        if requested > MAX_PERIOD_YEARS as i32 {
            warnings.push(format!(
                "periodYears {requested} exceeds the {MAX_PERIOD_YEARS}-year maximum; horizon capped"
            ));
        }
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology,
        request,
        warnings,
        elapsed,
        valuation,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

struct YearCashFlow {
    fcf: Money,
    operating: Option<OperatingBuild>,
}

fn project_fcf_growth(fcf_latest: Money, growth_rate: Percent, n_years: u32) -> Vec<YearCashFlow> {
    let step = Decimal::ONE + pct_to_rate(growth_rate);
    let mut flows = Vec::with_capacity(n_years as usize);
    let mut fcf = fcf_latest;
    for _ in 0..n_years {
        fcf = fcf.saturating_mul(step);
        flows.push(YearCashFlow {
            fcf,
            operating: None,
        });
    }
    flows
}

fn project_revenue_driven(
    inputs: &DcfInputs,
    base_revenue: Money,
    da_percent: Percent,
    n_years: u32,
) -> Vec<YearCashFlow> {
    let growth = Decimal::ONE + pct_to_rate(inputs.revenue_cagr);
    let ebit_margin = pct_to_rate(inputs.ebit_margin);
    let tax_rate = pct_to_rate(inputs.tax_rate);
    let da_pct = pct_to_rate(da_percent);
    let capex_pct = pct_to_rate(inputs.capex_percent);
    let nwc_pct = pct_to_rate(inputs.nwc_percent);

    let mut flows = Vec::with_capacity(n_years as usize);
    let mut prev_revenue = base_revenue;

    for _ in 0..n_years {
        let revenue = prev_revenue.saturating_mul(growth);
        let ebit = revenue.saturating_mul(ebit_margin);
        let tax = ebit.saturating_mul(tax_rate);
        let nopat = ebit.saturating_sub(tax);
        let plus_da = revenue.saturating_mul(da_pct);
        let less_capex = revenue.saturating_mul(capex_pct);
        // Working capital tracks the revenue change, not the revenue level
        let less_nwc_change = revenue.saturating_sub(prev_revenue).saturating_mul(nwc_pct);

        // FCF = NOPAT + D&A - CapEx - Delta NWC
        let fcf = nopat
            .saturating_add(plus_da)
            .saturating_sub(less_capex)
            .saturating_sub(less_nwc_change);

        flows.push(YearCashFlow {
            fcf,
            operating: Some(OperatingBuild {
                revenue,
                ebit,
                tax,
                nopat,
                plus_da,
                less_capex,
                less_nwc_change,
            }),
        });
        prev_revenue = revenue;
    }
    flows
}

fn discount_projections(flows: Vec<YearCashFlow>, wacc: Rate, mid_year: bool) -> Vec<ProjectedYear> {
    flows
        .into_iter()
        .zip(0u32..)
        .map(|(flow, idx)| {
            let period = discount_period(idx, mid_year);
            let pv = present_value(flow.fcf, wacc, period);
            tracing::trace!(year = idx + 1, fcf = %flow.fcf, pv = %pv, "projected year");
            ProjectedYear {
                year: idx + 1,
                operating: flow.operating,
                fcf: flow.fcf,
                discount_period: period,
                present_value: pv,
            }
        })
        .collect()
}

fn valuation_warnings(v: &DcfValuation) -> Vec<String> {
    let mut warnings = Vec::new();
    let a = &v.assumptions;

    if v.terminal_spread_floored {
        warnings.push(format!(
            "Discount rate ({}%) is within {} of terminal growth ({}%); terminal value denominator floored",
            a.discount_rate,
            a.terminal_spread_floor,
            a.terminal_growth
        ));
    }
    if v.terminal_value_pct > dec!(0.75) {
        warnings.push(format!(
            "Terminal value represents {:.1}% of enterprise value; consider extending the explicit forecast period",
            v.terminal_value_pct.saturating_mul(dec!(100))
        ));
    }
    match a.shares_outstanding.source {
        ValueSource::Default => warnings.push(format!(
            "Share count not supplied; using default of {}",
            a.shares_outstanding.value
        )),
        ValueSource::DerivedFromMarketCap => warnings.push(format!(
            "Share count derived from market cap / price: {}",
            a.shares_outstanding.value.round_dp(0)
        )),
        ValueSource::Override => {}
    }
    if a.market_price.source == ValueSource::Default {
        warnings.push(format!(
            "Market price not supplied; margin of safety measured against default price {}",
            a.market_price.value
        ));
    }
    if a.market_price.value <= Decimal::ZERO {
        warnings.push("Market price is not positive; margin of safety reported as 0".into());
    }
    if a.shares_outstanding.value <= Decimal::ZERO {
        warnings.push("Share count is not positive; intrinsic value reported as 0".into());
    }

    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
