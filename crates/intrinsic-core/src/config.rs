use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::IntrinsicError;
use crate::types::{Money, Rate};
use crate::IntrinsicResult;

/// Revenue seed for the revenue-driven path when no base revenue is supplied.
pub const DEFAULT_BASE_REVENUE: Money = dec!(1000000000);

/// Share count used when neither shares outstanding nor market cap resolve.
pub const DEFAULT_SHARES_OUTSTANDING: Decimal = dec!(100000000);

/// Market price used when the caller does not supply one.
pub const DEFAULT_MARKET_PRICE: Money = dec!(25);

/// Explicit projection horizon when `periodYears` is absent or not positive.
pub const DEFAULT_PERIOD_YEARS: u32 = 5;

/// Longest explicit horizon the engine projects; longer requests are capped.
pub const MAX_PERIOD_YEARS: u32 = 100;

/// Floor on (discount rate - terminal growth) in the Gordon growth denominator.
pub const DEFAULT_TERMINAL_SPREAD_FLOOR: Rate = dec!(0.02);

/// Hard lower bound for any configured terminal spread floor.
pub const MIN_TERMINAL_SPREAD: Rate = dec!(0.001);

/// Fallback values the engine uses when neither an override nor a derived
/// value is available. Passed into every calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValuationDefaults {
    pub base_revenue: Money,
    pub shares_outstanding: Decimal,
    pub market_price: Money,
    pub period_years: u32,
    /// Minimum Gordon growth denominator, as a decimal rate (0.02 = 2pp)
    pub terminal_spread_floor: Rate,
}

impl Default for ValuationDefaults {
    fn default() -> Self {
        Self {
            base_revenue: DEFAULT_BASE_REVENUE,
            shares_outstanding: DEFAULT_SHARES_OUTSTANDING,
            market_price: DEFAULT_MARKET_PRICE,
            period_years: DEFAULT_PERIOD_YEARS,
            terminal_spread_floor: DEFAULT_TERMINAL_SPREAD_FLOOR,
        }
    }
}

impl ValuationDefaults {
    /// Check that every fallback keeps the engine's arithmetic well-defined.
    pub fn validate(&self) -> IntrinsicResult<()> {
        if self.base_revenue <= Decimal::ZERO {
            return Err(IntrinsicError::InvalidInput {
                field: "baseRevenue".into(),
                reason: "Default base revenue must be positive".into(),
            });
        }
        if self.shares_outstanding <= Decimal::ZERO {
            return Err(IntrinsicError::InvalidInput {
                field: "sharesOutstanding".into(),
                reason: "Default share count must be positive".into(),
            });
        }
        if self.market_price <= Decimal::ZERO {
            return Err(IntrinsicError::InvalidInput {
                field: "marketPrice".into(),
                reason: "Default market price must be positive".into(),
            });
        }
        if self.period_years == 0 || self.period_years > MAX_PERIOD_YEARS {
            return Err(IntrinsicError::InvalidInput {
                field: "periodYears".into(),
                reason: format!("Default projection horizon must be between 1 and {MAX_PERIOD_YEARS} years"),
            });
        }
        if self.terminal_spread_floor < MIN_TERMINAL_SPREAD {
            return Err(IntrinsicError::InvalidInput {
                field: "terminalSpreadFloor".into(),
                reason: format!("Terminal spread floor must be at least {MIN_TERMINAL_SPREAD}"),
            });
        }
        Ok(())
    }

    /// Parse defaults from JSON. Missing keys keep their built-in values.
    pub fn from_json(contents: &str) -> IntrinsicResult<Self> {
        let defaults: ValuationDefaults = serde_json::from_str(contents)
            .map_err(|e| IntrinsicError::ConfigError(e.to_string()))?;
        defaults.validate()?;
        Ok(defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_values() {
        let d = ValuationDefaults::default();
        assert_eq!(d.base_revenue, dec!(1000000000));
        assert_eq!(d.shares_outstanding, dec!(100000000));
        assert_eq!(d.market_price, dec!(25));
        assert_eq!(d.period_years, 5);
        assert_eq!(d.terminal_spread_floor, dec!(0.02));
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_remaining_defaults() {
        let d = ValuationDefaults::from_json(r#"{ "marketPrice": 40, "periodYears": 10 }"#).unwrap();
        assert_eq!(d.market_price, dec!(40));
        assert_eq!(d.period_years, 10);
        assert_eq!(d.base_revenue, DEFAULT_BASE_REVENUE);
        assert_eq!(d.shares_outstanding, DEFAULT_SHARES_OUTSTANDING);
    }

    #[test]
    fn test_floor_below_hard_guard_rejected() {
        let d = ValuationDefaults {
            terminal_spread_floor: dec!(0.0005),
            ..ValuationDefaults::default()
        };
        assert!(d.validate().is_err());

        let at_guard = ValuationDefaults {
            terminal_spread_floor: MIN_TERMINAL_SPREAD,
            ..ValuationDefaults::default()
        };
        assert!(at_guard.validate().is_ok());
    }

    #[test]
    fn test_non_positive_defaults_rejected() {
        let zero_price = ValuationDefaults {
            market_price: Decimal::ZERO,
            ..ValuationDefaults::default()
        };
        assert!(zero_price.validate().is_err());

        let zero_years = ValuationDefaults {
            period_years: 0,
            ..ValuationDefaults::default()
        };
        assert!(zero_years.validate().is_err());

        let too_long = ValuationDefaults {
            period_years: MAX_PERIOD_YEARS + 1,
            ..ValuationDefaults::default()
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = ValuationDefaults::from_json("{ not json").unwrap_err();
        assert!(matches!(err, IntrinsicError::ConfigError(_)));
    }
}
