use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use intrinsic_core::valuation::dcf::{self, DcfCalcOptions, DcfInputs};
use intrinsic_core::valuation::sensitivity;
use intrinsic_core::valuation::ValuationRequest;
use intrinsic_core::ValuationDefaults;

use crate::input;

/// Arguments shared by `value` and `sensitivity`
#[derive(Args)]
pub struct ValuationArgs {
    /// Path to JSON request file ({"ticker", "inputs", "options"}); overrides individual flags
    #[arg(long)]
    pub input: Option<String>,

    /// Ticker symbol, carried through to the output assumptions
    #[arg(long)]
    pub ticker: Option<String>,

    /// Revenue CAGR in percent (e.g. 15 for 15%)
    #[arg(long, allow_negative_numbers = true)]
    pub revenue_cagr: Option<Decimal>,

    /// EBIT margin in percent
    #[arg(long, allow_negative_numbers = true)]
    pub ebit_margin: Option<Decimal>,

    /// Tax rate on EBIT in percent
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    /// CapEx as percent of revenue
    #[arg(long)]
    pub capex_percent: Option<Decimal>,

    /// Working capital investment as percent of the revenue change
    #[arg(long)]
    pub nwc_percent: Option<Decimal>,

    /// Terminal growth rate in percent
    #[arg(long, allow_negative_numbers = true)]
    pub terminal_growth: Option<Decimal>,

    /// Discount rate in percent
    #[arg(long)]
    pub discount_rate: Option<Decimal>,

    /// Year-0 revenue (absolute)
    #[arg(long)]
    pub base_revenue: Option<Decimal>,

    /// Diluted shares outstanding
    #[arg(long)]
    pub shares_outstanding: Option<Decimal>,

    /// Current share price
    #[arg(long)]
    pub market_price: Option<Decimal>,

    /// Market capitalisation, used to derive shares when none are given
    #[arg(long)]
    pub market_cap: Option<Decimal>,

    /// Latest actual free cash flow (with --growth-estimate selects the FCF-growth path)
    #[arg(long, allow_negative_numbers = true)]
    pub fcf_latest: Option<Decimal>,

    /// Five-year FCF growth estimate in percent
    #[arg(long, alias = "growth-estimate-5y", allow_negative_numbers = true)]
    pub growth_estimate: Option<Decimal>,

    /// Explicit projection years
    #[arg(long, allow_negative_numbers = true)]
    pub period_years: Option<i32>,

    /// Terminal growth override in percent (FCF-growth path only)
    #[arg(long, allow_negative_numbers = true)]
    pub terminal_rate: Option<Decimal>,

    /// Net debt for the equity bridge (debt minus cash)
    #[arg(long, allow_negative_numbers = true)]
    pub net_debt: Option<Decimal>,

    /// D&A add-back as percent of revenue
    #[arg(long)]
    pub da_percent: Option<Decimal>,

    /// Use mid-year discounting
    #[arg(long)]
    pub mid_year: bool,

    /// Discount rate override in percent
    #[arg(long)]
    pub wacc: Option<Decimal>,
}

pub fn run_value(
    args: ValuationArgs,
    defaults: &ValuationDefaults,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request = build_request(&args)?;
    let result = dcf::value_company(&request, defaults)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_sensitivity(
    args: ValuationArgs,
    defaults: &ValuationDefaults,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request = build_request(&args)?;
    let result = sensitivity::run_sensitivity(&request, defaults)?;
    Ok(serde_json::to_value(result)?)
}

fn build_request(args: &ValuationArgs) -> Result<ValuationRequest, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        let value = input::file::read_json_value(path)?;
        Ok(ValuationRequest::from_value(value)?)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(ValuationRequest::from_value(data)?)
    } else {
        request_from_flags(args)
    }
}

fn request_from_flags(args: &ValuationArgs) -> Result<ValuationRequest, Box<dyn std::error::Error>> {
    let inputs = DcfInputs {
        revenue_cagr: args
            .revenue_cagr
            .ok_or("--revenue-cagr is required (or provide --input)")?,
        ebit_margin: args
            .ebit_margin
            .ok_or("--ebit-margin is required (or provide --input)")?,
        tax_rate: args
            .tax_rate
            .ok_or("--tax-rate is required (or provide --input)")?,
        capex_percent: args
            .capex_percent
            .ok_or("--capex-percent is required (or provide --input)")?,
        nwc_percent: args
            .nwc_percent
            .ok_or("--nwc-percent is required (or provide --input)")?,
        terminal_growth: args
            .terminal_growth
            .ok_or("--terminal-growth is required (or provide --input)")?,
        discount_rate: args
            .discount_rate
            .ok_or("--discount-rate is required (or provide --input)")?,
    };

    let options = DcfCalcOptions {
        base_revenue: args.base_revenue,
        shares_outstanding: args.shares_outstanding,
        market_price: args.market_price,
        market_cap: args.market_cap,
        fcf_latest: args.fcf_latest,
        growth_estimate_5y: args.growth_estimate,
        period_years: args.period_years,
        terminal_rate: args.terminal_rate,
        net_debt: args.net_debt,
        da_percent: args.da_percent,
        use_mid_year: args.mid_year.then_some(true),
        wacc: args.wacc,
    };

    Ok(ValuationRequest {
        ticker: args.ticker.clone(),
        inputs,
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rust_decimal_macros::dec;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ValuationArgs,
    }

    fn parse(argv: &[&str]) -> ValuationArgs {
        let mut full = vec!["intrinsic"];
        full.extend_from_slice(argv);
        TestCli::try_parse_from(full).unwrap().args
    }

    const BASE: [&str; 14] = [
        "--revenue-cagr", "15",
        "--ebit-margin", "25",
        "--tax-rate", "21",
        "--capex-percent", "3",
        "--nwc-percent", "2",
        "--terminal-growth", "3",
        "--discount-rate", "10",
    ];

    #[test]
    fn test_flags_map_to_inputs() {
        let request = request_from_flags(&parse(&BASE)).unwrap();
        assert_eq!(request.inputs.revenue_cagr, dec!(15));
        assert_eq!(request.inputs.discount_rate, dec!(10));
        assert_eq!(request.options, DcfCalcOptions::default());
    }

    #[test]
    fn test_override_flags_map_to_options() {
        let mut argv = BASE.to_vec();
        argv.extend_from_slice(&[
            "--fcf-latest", "1000",
            "--growth-estimate", "10",
            "--net-debt", "-50",
            "--period-years", "7",
            "--mid-year",
            "--wacc", "9",
            "--ticker", "ACME",
        ]);
        let request = request_from_flags(&parse(&argv)).unwrap();
        assert_eq!(request.ticker.as_deref(), Some("ACME"));
        assert_eq!(request.options.fcf_latest, Some(dec!(1000)));
        assert_eq!(request.options.growth_estimate_5y, Some(dec!(10)));
        assert_eq!(request.options.net_debt, Some(dec!(-50)));
        assert_eq!(request.options.period_years, Some(7));
        assert_eq!(request.options.use_mid_year, Some(true));
        assert_eq!(request.options.wacc, Some(dec!(9)));
    }

    #[test]
    fn test_missing_assumption_is_reported() {
        let err = request_from_flags(&parse(&BASE[..12])).unwrap_err();
        assert!(err.to_string().contains("--discount-rate"));
    }

    #[test]
    fn test_flags_request_values() {
        let request = request_from_flags(&parse(&BASE)).unwrap();
        let out = dcf::value_company(&request, &ValuationDefaults::default()).unwrap();
        assert_eq!(out.result.results.projected_fcfs[0], dec!(189625000));
    }
}
