use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::types::{Money, Percent, Rate};

const HUNDRED: Decimal = dec!(100);
const HALF: Decimal = dec!(0.5);

/// Convert a percentage assumption (15 = 15%) into a decimal rate (0.15).
pub fn pct_to_rate(pct: Percent) -> Rate {
    pct / HUNDRED
}

/// Quotient clamped to `Decimal::MAX` / `Decimal::MIN` on overflow.
///
/// A zero numerator or a zero divisor yields zero.
pub fn saturating_div(numerator: Decimal, divisor: Decimal) -> Decimal {
    if numerator.is_zero() || divisor.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(divisor).unwrap_or_else(|| {
        if numerator.is_sign_negative() == divisor.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        }
    })
}

/// Compounding factor (1 + rate)^period for a possibly fractional period.
///
/// `None` when the factor does not fit in a `Decimal`.
pub fn compound_factor(rate: Rate, period: Decimal) -> Option<Decimal> {
    (Decimal::ONE + rate).checked_powd(period)
}

/// Present value of `amount` received `period` years out.
///
/// A rate at or below -100% has no meaningful discount factor; the amount is
/// treated as worthless rather than dividing by zero. So is an amount whose
/// discount factor overflows.
pub fn present_value(amount: Money, rate: Rate, period: Decimal) -> Money {
    if Decimal::ONE + rate <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    match compound_factor(rate, period) {
        Some(factor) => saturating_div(amount, factor),
        None => Decimal::ZERO,
    }
}

/// Discount period for 0-based projection index `idx`.
///
/// Mid-year convention pulls every flow half a period earlier.
pub fn discount_period(idx: u32, mid_year: bool) -> Decimal {
    let end_of_year = Decimal::from(idx + 1);
    if mid_year {
        end_of_year - HALF
    } else {
        end_of_year
    }
}

/// Gordon growth terminal value with a floored denominator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminalValue {
    pub value: Money,
    /// Denominator actually used, after flooring
    pub spread: Rate,
    pub floored: bool,
}

/// TV = FCF_last * (1 + g) / max(r - g, floor)
pub fn gordon_terminal_value(
    last_cash_flow: Money,
    discount_rate: Rate,
    growth_rate: Rate,
    floor: Rate,
) -> TerminalValue {
    let raw_spread = discount_rate - growth_rate;
    let floored = raw_spread < floor;
    let spread = if floored { floor } else { raw_spread };
    TerminalValue {
        value: saturating_div(last_cash_flow.saturating_mul(Decimal::ONE + growth_rate), spread),
        spread,
        floored,
    }
}

/// Round to the nearest integer with halves going towards +infinity.
pub fn round_half_up(value: Decimal) -> Decimal {
    value.saturating_add(HALF).floor()
}
