//! US-dollar amount validation and parsing.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::ExtractionError;

use super::patterns::CURRENCY_BODY;

/// Largest amount accepted as a currency value.
pub fn max_amount() -> Decimal {
    Decimal::new(9_999_999, 2)
}

/// Whether the text is shaped like a non-negative dollar amount.
///
/// Requires a `$` or `.`, digits with at most two decimals once `$` and
/// `,` are removed, and a value within `[0, 99999.99]`. `0.00` is valid.
pub fn is_currency_amount(text: &str) -> bool {
    let text = text.trim();
    if !text.contains('$') && !text.contains('.') {
        return false;
    }

    let body: String = text.chars().filter(|c| *c != '$' && *c != ',').collect();
    if !CURRENCY_BODY.is_match(&body) {
        return false;
    }

    match Decimal::from_str(body.trim_end_matches('.')) {
        Ok(value) => value >= Decimal::ZERO && value <= max_amount(),
        Err(_) => false,
    }
}

/// Parse a dollar amount, accepting `$`, commas, a leading `-` or
/// accounting parentheses.
pub fn parse_amount(text: &str) -> Result<Decimal, ExtractionError> {
    let text = text.trim();
    let (negative, body) = split_sign(text);

    let cleaned: String = body.chars().filter(|c| *c != '$' && *c != ',').collect();
    let cleaned = cleaned.trim().trim_end_matches('.');

    let value = Decimal::from_str(cleaned)
        .map_err(|_| ExtractionError::InvalidAmount(text.to_string()))?;
    Ok(if negative { -value } else { value })
}

fn split_sign(text: &str) -> (bool, &str) {
    if let Some(rest) = text.strip_prefix('-') {
        (true, rest.trim_start())
    } else if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        (true, inner)
    } else if let Some(rest) = text.strip_suffix('-') {
        (true, rest)
    } else {
        (false, text)
    }
}

/// Format an amount with exactly two decimals, rounding half away from zero.
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Validate a non-negative amount and return it normalized (`1,234.5` -> `1234.50`).
pub fn normalize_amount(text: &str) -> Option<String> {
    if !is_currency_amount(text) {
        return None;
    }
    parse_amount(text).ok().map(format_amount)
}

/// Like [`normalize_amount`], but keeps a negative sign (`-`, `(..)` or trailing `-`).
pub fn normalize_signed_amount(text: &str) -> Option<String> {
    let text = text.trim();
    let (negative, body) = split_sign(text);
    let normalized = normalize_amount(body)?;

    if negative && normalized != "0.00" {
        Some(format!("-{}", normalized))
    } else {
        Some(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_shapes() {
        assert!(is_currency_amount("$1,234.56"));
        assert!(is_currency_amount("1234.5"));
        assert!(is_currency_amount("$0.00"));
        assert!(is_currency_amount("$150"));
        assert!(is_currency_amount("99999.99"));

        assert!(!is_currency_amount("1234"));
        assert!(!is_currency_amount("12.345"));
        assert!(!is_currency_amount("$100000.00"));
        assert!(!is_currency_amount("-5.00"));
        assert!(!is_currency_amount("USD"));
        assert!(!is_currency_amount("1.2.3"));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.56").unwrap(), Decimal::new(123456, 2));
        assert_eq!(parse_amount("(50.00)").unwrap(), Decimal::new(-5000, 2));
        assert_eq!(parse_amount("-12").unwrap(), Decimal::from(-12));
        assert!(matches!(
            parse_amount("abc"),
            Err(ExtractionError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_amount("$1,234.5").as_deref(), Some("1234.50"));
        assert_eq!(normalize_amount("$0.00").as_deref(), Some("0.00"));
        assert_eq!(normalize_amount("42"), None);
        assert_eq!(normalize_signed_amount("(12.00)").as_deref(), Some("-12.00"));
        assert_eq!(normalize_signed_amount("-$7.25").as_deref(), Some("-7.25"));
        assert_eq!(normalize_signed_amount("15.00-").as_deref(), Some("-15.00"));
        assert_eq!(normalize_signed_amount("$19.99").as_deref(), Some("19.99"));
    }

    #[test]
    fn test_format_rounds_half_away_from_zero() {
        assert_eq!(format_amount(Decimal::new(12345, 3)), "12.35");
        assert_eq!(format_amount(Decimal::from(90)), "90.00");
    }
}
