use serde_json::Value;

use super::{format_scalar, is_sensitivity, result_of};

/// Print just the key answer: intrinsic value per share for a valuation,
/// the base-case cell for a sensitivity grid.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result = result_of(value);

    if is_sensitivity(result) {
        if let Some(centre) = centre_cell(result) {
            return format_scalar(centre, 0);
        }
    }

    let headline = result.get("results").unwrap_or(result);
    for key in ["intrinsicValue", "enterpriseValue"] {
        if let Some(val) = headline.get(key) {
            if !val.is_null() {
                return format_scalar(val, 2);
            }
        }
    }

    format_scalar(result, 2)
}

fn centre_cell(result: &Value) -> Option<&Value> {
    let rows = result.get("values")?.as_array()?;
    let row = rows.get(rows.len() / 2)?.as_array()?;
    row.get(row.len() / 2)
}
