use serde_json::Value;
use std::io::{self, Write};

use super::{is_sensitivity, result_of};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    write_csv(&mut wtr, value);
    let _ = wtr.flush();
}

fn write_csv<W: Write>(wtr: &mut csv::Writer<W>, value: &Value) {
    let result = result_of(value);

    if is_sensitivity(result) {
        write_grid(wtr, result);
    } else if let Some(Value::Array(years)) = result.get("projections") {
        write_projections(wtr, years);
    } else if let Value::Object(map) = result {
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in map {
            let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
        }
    } else {
        let _ = wtr.write_record([&format_csv_value(result)]);
    }
}

/// One row per discount rate, one column per terminal growth rate.
fn write_grid<W: Write>(wtr: &mut csv::Writer<W>, result: &Value) {
    let empty = Vec::new();
    let growth = result["terminalGrowthRates"].as_array().unwrap_or(&empty);
    let rates = result["discountRates"].as_array().unwrap_or(&empty);
    let rows = result["values"].as_array().unwrap_or(&empty);

    let mut header = vec!["discount_rate".to_string()];
    header.extend(growth.iter().map(|g| format!("g={}", format_csv_value(g))));
    let _ = wtr.write_record(&header);

    for (rate, row) in rates.iter().zip(rows) {
        let mut record = vec![format_csv_value(rate)];
        if let Value::Array(cells) = row {
            record.extend(cells.iter().map(format_csv_value));
        }
        let _ = wtr.write_record(&record);
    }
}

fn write_projections<W: Write>(wtr: &mut csv::Writer<W>, years: &[Value]) {
    let _ = wtr.write_record([
        "year",
        "revenue",
        "ebit",
        "nopat",
        "fcf",
        "discount_period",
        "present_value",
    ]);
    for year in years {
        let op = &year["operating"];
        let _ = wtr.write_record([
            format_csv_value(&year["year"]),
            format_csv_value(&op["revenue"]),
            format_csv_value(&op["ebit"]),
            format_csv_value(&op["nopat"]),
            format_csv_value(&year["fcf"]),
            format_csv_value(&year["discountPeriod"]),
            format_csv_value(&year["presentValue"]),
        ]);
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_csv(&mut wtr, value);
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_grid_csv() {
        let v = json!({ "result": {
            "discountRates": ["9", "10"],
            "terminalGrowthRates": ["1", "1.5"],
            "values": [["12", "13"], ["10", "11"]]
        } });
        assert_eq!(render(&v), "discount_rate,g=1,g=1.5\n9,12,13\n10,10,11\n");
    }

    #[test]
    fn test_projection_csv_leaves_missing_build_blank() {
        let v = json!({ "result": {
            "projections": [
                { "year": 1, "fcf": "1100", "discountPeriod": "1", "presentValue": "1000" }
            ]
        } });
        let out = render(&v);
        assert!(out.starts_with("year,revenue,ebit,nopat,fcf,discount_period,present_value\n"));
        assert!(out.contains("1,,,,1100,1,1000\n"));
    }
}
