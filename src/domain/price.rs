use std::fmt::Display;

/// Represents a price as it is stored for an entity.
///
/// The amount is normalized once, at write time. The display symbol is part of
/// the field configuration and is never normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceValue(f64);

impl PriceValue {
    /// lenient coercion: reads the longest numeric prefix, anything else is zero
    pub fn parse_lenient(input: &str) -> Self {
        let value = numeric_prefix(input)
            .and_then(|prefix| prefix.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(0.0);
        Self(value)
    }

    /// canonical stored form: two fraction digits, `.` separator, no grouping
    pub fn to_fixed(&self) -> String {
        let rounded = (self.0 * 100.0).round() / 100.0;
        let rounded = if !rounded.is_finite() {
            // scaling overflowed, the amount has no fraction digits left to round
            self.0
        } else if rounded == 0.0 {
            // -0.0 would print as "-0.00"
            0.0
        } else {
            rounded
        };
        format!("{rounded:.2}")
    }

    /// externally consumable form, symbol first without separator
    pub fn with_symbol(symbol: &str, stored: &str) -> String {
        format!("{symbol}{stored}")
    }
}

impl Display for PriceValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_fixed())
    }
}

/// Normalizes raw user input into the stored price string.
pub fn format_price(input: &str) -> String {
    PriceValue::parse_lenient(input).to_fixed()
}

/// Returns the longest prefix of `input` (after leading whitespace) that reads
/// as a decimal number with optional sign, fraction and exponent.
fn numeric_prefix(input: &str) -> Option<&str> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start || digits > 0 {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // exponent only counts when followed by at least one digit
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    Some(&s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_integer() {
        assert_eq!(format_price("3"), "3.00");
    }

    #[test]
    fn test_format_non_numeric_is_zero() {
        assert_eq!(format_price("abc"), "0.00");
        assert_eq!(format_price(""), "0.00");
        assert_eq!(format_price("   "), "0.00");
        assert_eq!(format_price("."), "0.00");
        assert_eq!(format_price("-"), "0.00");
    }

    #[test]
    fn test_format_negative_passes_through() {
        assert_eq!(format_price("-1.5"), "-1.50");
        assert_eq!(format_price("-0.001"), "0.00");
    }

    #[test]
    fn test_format_numeric_prefix() {
        assert_eq!(format_price("12abc"), "12.00");
        assert_eq!(format_price("  7.25 EUR"), "7.25");
        assert_eq!(format_price(".5"), "0.50");
        assert_eq!(format_price("5."), "5.00");
        assert_eq!(format_price("1e3"), "1000.00");
        assert_eq!(format_price("2e"), "2.00");
        assert_eq!(format_price("+4"), "4.00");
    }

    #[test]
    fn test_format_rounds_and_has_no_grouping() {
        assert_eq!(format_price("1234567.891"), "1234567.89");
        assert_eq!(format_price("0.125"), "0.13");
        assert_eq!(format_price("9.999"), "10.00");
    }

    #[test]
    fn test_format_non_finite_is_zero() {
        assert_eq!(format_price("1e400"), "0.00");
    }

    #[test]
    fn test_format_huge_finite_amount() {
        assert_eq!(format_price("1e307"), format!("{:.2}", 1e307_f64));
        assert_ne!(format_price("1e307"), "0.00");
        assert_eq!(format_price("-1.7e308"), format!("{:.2}", -1.7e308_f64));
        assert!(format_price("-1.7e308").ends_with(".00"));
    }

    #[test]
    fn test_format_is_idempotent() {
        for input in ["3", "abc", "-1.5", "0.125", "1e3", "  42.4242", "-0.004", "99.995"] {
            let once = format_price(input);
            assert_eq!(format_price(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn test_with_symbol() {
        assert_eq!(PriceValue::with_symbol("$", "3.00"), "$3.00");
        assert_eq!(PriceValue::with_symbol("", "3.00"), "3.00");
    }

    #[test]
    fn test_display_matches_fixed() {
        let price = PriceValue::parse_lenient("19.9");
        assert_eq!(price.to_string(), "19.90");
    }
}
