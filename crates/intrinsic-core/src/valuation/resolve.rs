//! Three-tier input resolution shared by both projection paths.
//!
//! Every value the engine needs is taken from the caller's override when one
//! exists, derived from other overrides where a derivation is defined, and
//! only then from [`ValuationDefaults`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{ValuationDefaults, MAX_PERIOD_YEARS};
use crate::time_value::saturating_div;
use crate::types::{Money, Percent, Rate};

use super::dcf::{DcfCalcOptions, DcfInputs};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which projection formula drives the explicit forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum ProjectionPath {
    /// Compound the latest actual FCF by a single growth estimate.
    #[serde(rename = "fcfGrowth", rename_all = "camelCase")]
    FcfGrowth {
        fcf_latest: Money,
        growth_rate: Percent,
    },
    /// Build FCF from revenue, margins, reinvestment and working capital.
    #[serde(rename = "revenueDriven", rename_all = "camelCase")]
    RevenueDriven { base_revenue: Money },
}

impl ProjectionPath {
    /// FCF-growth needs both the latest FCF and a growth estimate; anything
    /// less falls back to the revenue-driven build.
    pub fn select(options: &DcfCalcOptions, defaults: &ValuationDefaults) -> Self {
        match (options.fcf_latest, options.growth_estimate_5y) {
            (Some(fcf_latest), Some(growth_rate)) => ProjectionPath::FcfGrowth {
                fcf_latest,
                growth_rate,
            },
            _ => ProjectionPath::RevenueDriven {
                base_revenue: options.base_revenue.unwrap_or(defaults.base_revenue),
            },
        }
    }

    /// Same spelling as the serialized `method` tag.
    pub fn label(&self) -> &'static str {
        match self {
            ProjectionPath::FcfGrowth { .. } => "fcfGrowth",
            ProjectionPath::RevenueDriven { .. } => "revenueDriven",
        }
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueSource {
    Override,
    DerivedFromMarketCap,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Everything the engine computes from, after the precedence rules ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAssumptions {
    pub path: ProjectionPath,
    pub period_years: u32,
    /// Percent
    pub discount_rate: Percent,
    /// Percent
    pub terminal_growth: Percent,
    pub net_debt: Money,
    pub da_percent: Percent,
    pub mid_year: bool,
    pub market_price: Resolved<Money>,
    pub shares_outstanding: Resolved<Decimal>,
    pub terminal_spread_floor: Rate,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn resolve_assumptions(
    inputs: &DcfInputs,
    options: &DcfCalcOptions,
    defaults: &ValuationDefaults,
) -> ResolvedAssumptions {
    let path = ProjectionPath::select(options, defaults);
    let market_price = resolve_market_price(options, defaults);
    let shares_outstanding = resolve_shares_outstanding(options, market_price.value, defaults);

    let resolved = ResolvedAssumptions {
        path,
        period_years: resolve_period_years(options, defaults),
        discount_rate: resolve_discount_rate(inputs, options),
        terminal_growth: resolve_terminal_growth(&path, inputs, options),
        net_debt: options.net_debt.unwrap_or(Decimal::ZERO),
        da_percent: options.da_percent.unwrap_or(Decimal::ZERO),
        mid_year: options.use_mid_year.unwrap_or(false),
        market_price,
        shares_outstanding,
        terminal_spread_floor: defaults.terminal_spread_floor,
    };

    tracing::debug!(
        path = resolved.path.label(),
        period_years = resolved.period_years,
        discount_rate = %resolved.discount_rate,
        terminal_growth = %resolved.terminal_growth,
        shares_source = ?resolved.shares_outstanding.source,
        price_source = ?resolved.market_price.source,
        "resolved DCF assumptions"
    );

    resolved
}

/// Horizon in years, capped at [`MAX_PERIOD_YEARS`].
pub fn resolve_period_years(options: &DcfCalcOptions, defaults: &ValuationDefaults) -> u32 {
    let years = match options.period_years {
        Some(n) if n > 0 => n as u32,
        _ => defaults.period_years,
    };
    years.min(MAX_PERIOD_YEARS)
}

pub fn resolve_discount_rate(inputs: &DcfInputs, options: &DcfCalcOptions) -> Percent {
    options.wacc.unwrap_or(inputs.discount_rate)
}

/// The `terminalRate` override only applies on the FCF-growth path; the
/// revenue-driven build always uses the assumption set's terminal growth.
pub fn resolve_terminal_growth(
    path: &ProjectionPath,
    inputs: &DcfInputs,
    options: &DcfCalcOptions,
) -> Percent {
    match path {
        ProjectionPath::FcfGrowth { .. } => options.terminal_rate.unwrap_or(inputs.terminal_growth),
        ProjectionPath::RevenueDriven { .. } => inputs.terminal_growth,
    }
}

pub fn resolve_market_price(
    options: &DcfCalcOptions,
    defaults: &ValuationDefaults,
) -> Resolved<Money> {
    match options.market_price {
        Some(price) => Resolved::new(price, ValueSource::Override),
        None => Resolved::new(defaults.market_price, ValueSource::Default),
    }
}

pub fn resolve_shares_outstanding(
    options: &DcfCalcOptions,
    market_price: Money,
    defaults: &ValuationDefaults,
) -> Resolved<Decimal> {
    if let Some(shares) = options.shares_outstanding.filter(|s| *s > Decimal::ZERO) {
        return Resolved::new(shares, ValueSource::Override);
    }
    match options.market_cap {
        Some(cap) if market_price > Decimal::ZERO => {
            Resolved::new(saturating_div(cap, market_price), ValueSource::DerivedFromMarketCap)
        }
        _ => Resolved::new(defaults.shares_outstanding, ValueSource::Default),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn inputs() -> DcfInputs {
        DcfInputs {
            revenue_cagr: dec!(15),
            ebit_margin: dec!(25),
            tax_rate: dec!(21),
            capex_percent: dec!(3),
            nwc_percent: dec!(2),
            terminal_growth: dec!(3),
            discount_rate: dec!(10),
        }
    }

    #[test]
    fn test_path_requires_both_fcf_fields() {
        let d = ValuationDefaults::default();
        let both = DcfCalcOptions {
            fcf_latest: Some(dec!(1000)),
            growth_estimate_5y: Some(dec!(10)),
            ..Default::default()
        };
        assert_eq!(
            ProjectionPath::select(&both, &d),
            ProjectionPath::FcfGrowth {
                fcf_latest: dec!(1000),
                growth_rate: dec!(10)
            }
        );

        let only_fcf = DcfCalcOptions {
            fcf_latest: Some(dec!(1000)),
            ..Default::default()
        };
        assert_eq!(
            ProjectionPath::select(&only_fcf, &d),
            ProjectionPath::RevenueDriven {
                base_revenue: dec!(1000000000)
            }
        );

        let only_growth = DcfCalcOptions {
            growth_estimate_5y: Some(dec!(10)),
            base_revenue: Some(dec!(5000)),
            ..Default::default()
        };
        assert_eq!(
            ProjectionPath::select(&only_growth, &d),
            ProjectionPath::RevenueDriven {
                base_revenue: dec!(5000)
            }
        );
    }

    #[test]
    fn test_period_years_non_positive_uses_default() {
        let d = ValuationDefaults::default();
        for bad in [None, Some(0), Some(-3)] {
            let opts = DcfCalcOptions {
                period_years: bad,
                ..Default::default()
            };
            assert_eq!(resolve_period_years(&opts, &d), 5);
        }
        let opts = DcfCalcOptions {
            period_years: Some(8),
            ..Default::default()
        };
        assert_eq!(resolve_period_years(&opts, &d), 8);
    }

    #[test]
    fn test_period_years_capped_at_max_horizon() {
        let opts = DcfCalcOptions {
            period_years: Some(250),
            ..Default::default()
        };
        assert_eq!(
            resolve_period_years(&opts, &ValuationDefaults::default()),
            MAX_PERIOD_YEARS
        );

        let long_default = ValuationDefaults {
            period_years: 1000,
            ..ValuationDefaults::default()
        };
        assert_eq!(
            resolve_period_years(&DcfCalcOptions::default(), &long_default),
            MAX_PERIOD_YEARS
        );
    }

    #[test]
    fn test_label_matches_method_tag() {
        let paths = [
            ProjectionPath::FcfGrowth {
                fcf_latest: dec!(1),
                growth_rate: dec!(1),
            },
            ProjectionPath::RevenueDriven {
                base_revenue: dec!(1),
            },
        ];
        for path in paths {
            let json = serde_json::to_value(path).unwrap();
            assert_eq!(json["method"], path.label());
        }
    }

    #[test]
    fn test_wacc_override_wins() {
        let opts = DcfCalcOptions {
            wacc: Some(dec!(8.5)),
            ..Default::default()
        };
        assert_eq!(resolve_discount_rate(&inputs(), &opts), dec!(8.5));
        assert_eq!(
            resolve_discount_rate(&inputs(), &DcfCalcOptions::default()),
            dec!(10)
        );
    }

    #[test]
    fn test_terminal_rate_override_is_path_dependent() {
        let opts = DcfCalcOptions {
            terminal_rate: Some(dec!(2)),
            ..Default::default()
        };
        let fcf = ProjectionPath::FcfGrowth {
            fcf_latest: dec!(1),
            growth_rate: dec!(1),
        };
        let rev = ProjectionPath::RevenueDriven {
            base_revenue: dec!(1),
        };
        assert_eq!(resolve_terminal_growth(&fcf, &inputs(), &opts), dec!(2));
        assert_eq!(resolve_terminal_growth(&rev, &inputs(), &opts), dec!(3));
    }

    #[test]
    fn test_shares_precedence() {
        let d = ValuationDefaults::default();

        let explicit = DcfCalcOptions {
            shares_outstanding: Some(dec!(50)),
            market_cap: Some(dec!(1000)),
            ..Default::default()
        };
        let r = resolve_shares_outstanding(&explicit, dec!(25), &d);
        assert_eq!(r, Resolved::new(dec!(50), ValueSource::Override));

        let zero_shares = DcfCalcOptions {
            shares_outstanding: Some(Decimal::ZERO),
            market_cap: Some(dec!(1000)),
            ..Default::default()
        };
        let r = resolve_shares_outstanding(&zero_shares, dec!(25), &d);
        assert_eq!(r, Resolved::new(dec!(40), ValueSource::DerivedFromMarketCap));

        let zero_price = resolve_shares_outstanding(&zero_shares, Decimal::ZERO, &d);
        assert_eq!(zero_price.source, ValueSource::Default);
        assert_eq!(zero_price.value, dec!(100000000));

        let none = resolve_shares_outstanding(&DcfCalcOptions::default(), dec!(25), &d);
        assert_eq!(none.source, ValueSource::Default);
    }

    #[test]
    fn test_market_price_precedence() {
        let d = ValuationDefaults {
            market_price: dec!(30),
            ..ValuationDefaults::default()
        };
        let r = resolve_market_price(&DcfCalcOptions::default(), &d);
        assert_eq!(r, Resolved::new(dec!(30), ValueSource::Default));

        let opts = DcfCalcOptions {
            market_price: Some(Decimal::ZERO),
            ..Default::default()
        };
        // An explicit zero is still an override; margin of safety handles it
        assert_eq!(resolve_market_price(&opts, &d).value, Decimal::ZERO);
    }

    #[test]
    fn test_resolve_assumptions_defaults() {
        let r = resolve_assumptions(
            &inputs(),
            &DcfCalcOptions::default(),
            &ValuationDefaults::default(),
        );
        assert_eq!(r.period_years, 5);
        assert_eq!(r.net_debt, Decimal::ZERO);
        assert_eq!(r.da_percent, Decimal::ZERO);
        assert!(!r.mid_year);
        assert_eq!(r.terminal_spread_floor, dec!(0.02));
        assert_eq!(r.path.label(), "revenueDriven");
    }
}
