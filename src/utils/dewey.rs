//! Repair of Dewey numbers stored as unseparated integers
//!
//! Some spreadsheet exports lose the decimal point of a class number, so
//! `120.2` arrives as `1202`. Any whole number with 4 to 7 digits is read back
//! as `<first three digits>.<remaining digits>`.

const INTEGER_TOLERANCE: f64 = 1e-9;
const MIN_MALFORMED: f64 = 1_000.0;
const MAX_MALFORMED: f64 = 9_999_999.0;

/// Reinsert the decimal point after the third digit of a malformed class number
///
/// Values with a genuine fractional part, and whole numbers outside
/// `[1000, 9999999]`, are returned unchanged.
pub fn fix_malformed_dewey(value: f64) -> f64 {
    let whole = value.trunc();
    if (value - whole).abs() >= INTEGER_TOLERANCE || !(MIN_MALFORMED..=MAX_MALFORMED).contains(&whole) {
        return value;
    }

    let digits = (whole as i64).to_string();
    let (class, rest) = digits.split_at(3);
    format!("{}.{}", class, rest).parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_four_digit_code() {
        assert_relative_eq!(fix_malformed_dewey(1202.0), 120.2);
    }

    #[test]
    fn test_seven_digit_code() {
        assert_relative_eq!(fix_malformed_dewey(8634412.0), 863.4412);
    }

    #[test]
    fn test_fractional_untouched() {
        assert_relative_eq!(fix_malformed_dewey(120.2), 120.2);
        assert_relative_eq!(fix_malformed_dewey(1202.5), 1202.5);
    }

    #[test]
    fn test_out_of_band_untouched() {
        assert_relative_eq!(fix_malformed_dewey(42.0), 42.0);
        assert_relative_eq!(fix_malformed_dewey(999.0), 999.0);
        assert_relative_eq!(fix_malformed_dewey(10_000_000.0), 10_000_000.0);
    }

    #[test]
    fn test_float_noise_tolerated() {
        assert_relative_eq!(fix_malformed_dewey(1202.0 + 1e-12), 120.2);
    }
}
