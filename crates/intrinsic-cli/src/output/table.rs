use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{format_scalar, is_sensitivity, result_of};

const HEADLINE_FIELDS: [(&str, &str); 4] = [
    ("intrinsicValue", "Intrinsic value / share"),
    ("marginOfSafety", "Margin of safety %"),
    ("enterpriseValue", "Enterprise value"),
    ("impliedMarketCap", "Implied market cap"),
];

const BUILD_FIELDS: [(&str, &str); 4] = [
    ("pvOfFcfs", "PV of explicit FCFs"),
    ("terminalValue", "Terminal value"),
    ("pvOfTerminal", "PV of terminal value"),
    ("terminalValuePct", "Terminal value share of EV"),
];

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    let result = result_of(value);

    if is_sensitivity(result) {
        println!("{}", sensitivity_table(result));
    } else if result.get("results").is_some() {
        println!("{}", headline_table(result));
        println!("\n{}", assumptions_table(result));
        println!("\n{}", projections_table(result));
    } else {
        println!("{}", flat_table(result));
    }

    print_envelope_notes(value);
}

fn sensitivity_table(result: &Value) -> Table {
    let mut builder = Builder::default();

    let growth_rates = array_of(result, "terminalGrowthRates");
    let mut header = vec!["Discount \\ Growth".to_string()];
    header.extend(growth_rates.iter().map(|g| format!("{}%", format_scalar(g, 2))));
    builder.push_record(header);

    let discount_rates = array_of(result, "discountRates");
    let rows = array_of(result, "values");
    for (rate, row) in discount_rates.iter().zip(rows.iter()) {
        let mut record = vec![format!("{}%", format_scalar(rate, 2))];
        if let Value::Array(cells) = row {
            record.extend(cells.iter().map(|c| format_scalar(c, 0)));
        }
        builder.push_record(record);
    }

    Table::from(builder)
}

fn headline_table(result: &Value) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);

    let headline = &result["results"];
    for (key, label) in HEADLINE_FIELDS {
        builder.push_record([label.to_string(), format_scalar(&headline[key], 2)]);
    }
    for (key, label) in BUILD_FIELDS {
        let dp = if key == "terminalValuePct" { 4 } else { 2 };
        builder.push_record([label.to_string(), format_scalar(&result[key], dp)]);
    }

    Table::from(builder)
}

fn assumptions_table(result: &Value) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Assumption", "Value", "Source"]);

    let a = &result["assumptions"];
    builder.push_record([
        "Projection path".to_string(),
        format_scalar(&a["path"]["method"], 2),
        String::new(),
    ]);
    for (key, label) in [
        ("periodYears", "Projection years"),
        ("discountRate", "Discount rate %"),
        ("terminalGrowth", "Terminal growth %"),
        ("netDebt", "Net debt"),
        ("daPercent", "D&A % of revenue"),
        ("midYear", "Mid-year convention"),
    ] {
        builder.push_record([label.to_string(), format_scalar(&a[key], 2), String::new()]);
    }
    for (key, label) in [
        ("marketPrice", "Market price"),
        ("sharesOutstanding", "Shares outstanding"),
    ] {
        builder.push_record([
            label.to_string(),
            format_scalar(&a[key]["value"], 2),
            format_scalar(&a[key]["source"], 2),
        ]);
    }

    Table::from(builder)
}

fn projections_table(result: &Value) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Year", "Revenue", "EBIT", "NOPAT", "FCF", "Period", "PV"]);

    for year in array_of(result, "projections") {
        let op = &year["operating"];
        builder.push_record([
            format_scalar(&year["year"], 0),
            format_scalar(&op["revenue"], 0),
            format_scalar(&op["ebit"], 0),
            format_scalar(&op["nopat"], 0),
            format_scalar(&year["fcf"], 0),
            format_scalar(&year["discountPeriod"], 1),
            format_scalar(&year["presentValue"], 0),
        ]);
    }

    Table::from(builder)
}

fn flat_table(value: &Value) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    if let Value::Object(map) = value {
        for (key, val) in map {
            builder.push_record([key.clone(), format_scalar(val, 2)]);
        }
    } else {
        builder.push_record(["value".to_string(), format_scalar(value, 2)]);
    }
    Table::from(builder)
}

fn print_envelope_notes(value: &Value) {
    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn array_of<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .map(|v| v.as_slice())
        .unwrap_or(&[])
}
