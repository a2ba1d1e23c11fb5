use intrinsic_core::ValuationDefaults;

use super::file;

/// Load fallback values from `path`, or the built-in ones when no file is given.
///
/// `.yaml` / `.yml` files are parsed as YAML, anything else as JSON.
pub fn load_defaults(path: Option<&str>) -> Result<ValuationDefaults, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(ValuationDefaults::default());
    };

    let (canonical, contents) = file::read_text(path)?;
    let is_yaml = canonical
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);

    let defaults = if is_yaml {
        parse_yaml(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    } else {
        ValuationDefaults::from_json(&contents)?
    };

    tracing::info!(path = %canonical.display(), "loaded valuation defaults");
    Ok(defaults)
}

fn parse_yaml(contents: &str) -> Result<ValuationDefaults, Box<dyn std::error::Error>> {
    let defaults: ValuationDefaults = serde_yaml::from_str(contents)?;
    defaults.validate()?;
    Ok(defaults)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_no_path_gives_builtin_defaults() {
        assert_eq!(load_defaults(None).unwrap(), ValuationDefaults::default());
    }

    #[test]
    fn test_yaml_partial_defaults() {
        let d = parse_yaml("marketPrice: 42.5\nsharesOutstanding: 2500000\n").unwrap();
        assert_eq!(d.market_price, dec!(42.5));
        assert_eq!(d.shares_outstanding, dec!(2500000));
        assert_eq!(d.period_years, 5);
    }

    #[test]
    fn test_yaml_invalid_floor_rejected() {
        assert!(parse_yaml("terminalSpreadFloor: 0.0001\n").is_err());
    }

    #[test]
    fn test_missing_file_reported() {
        let err = load_defaults(Some("/definitely/not/here.yaml")).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
