
/// Placeholder written wherever a value could not be determined
pub const NOT_AVAILABLE: &str = "NA";

/// Rounds a value to a fixed number of decimal places, exact halves go to the even digit.
/// # Arguments
/// * `value` - the value to round
/// * `places` - number of digits to keep after the decimal point
pub fn round_decimal(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round_ties_even() / scale
}

/// Formats a float with the shortest representation that round-trips, always keeping a decimal point.
/// E.g., `1.0` is written as "1.0" and `0.375` as "0.375".
pub fn format_float(value: f64) -> String {
    format!("{value:?}")
}

/// Renders an optional float, using the NA placeholder when it is missing
pub fn format_optional_float(value: Option<f64>) -> String {
    value.map(format_float).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Renders any optional displayable value, using the NA placeholder when it is missing
pub fn format_optional<T: std::fmt::Display>(value: Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => NOT_AVAILABLE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_round_decimal() {
        assert_approx_eq!(round_decimal(12.0 / 14.0, 7), 0.8571429);
        assert_approx_eq!(round_decimal(1.0 / 3.0, 4), 0.3333);
        assert_approx_eq!(round_decimal(2.0 / 3.0, 4), 0.6667);
        assert_approx_eq!(round_decimal(0.375, 4), 0.375);

        // exact halves round to even
        assert_eq!(format_float(round_decimal(1.0 / 32.0, 4)), "0.0312");
        assert_eq!(format_float(round_decimal(3.0 / 32.0, 4)), "0.0938");
        assert_eq!(format_float(round_decimal(1.0 / 256.0, 7)), "0.0039062");
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(0.375), "0.375");
        assert_eq!(format_optional_float(None), "NA");
        assert_eq!(format_optional_float(Some(0.25)), "0.25");
        assert_eq!(format_optional(Some(80_u64)), "80");
        assert_eq!(format_optional::<u64>(None), "NA");
    }
}
