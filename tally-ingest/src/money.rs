//! Monetary amount tokens ("150.23", "1,234.56").
//!
//! Signs are never part of the token; direction comes from the section.

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

static MONEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d{1,3}(?:,\d{3})+|\d+)\.\d+$").expect("money pattern compiles")
});

/// True when the whole token is an amount
pub fn is_money_token(token: &str) -> bool {
    MONEY_RE.is_match(token)
}

/// Value of an amount token, `None` for anything else
pub fn parse_money_token(token: &str) -> Option<Decimal> {
    if !is_money_token(token) {
        return None;
    }
    Decimal::from_str(&token.replace(',', "")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_plain_amounts() {
        assert_eq!(parse_money_token("150.23"), Some(dec!(150.23)));
        assert_eq!(parse_money_token("0.99"), Some(dec!(0.99)));
        assert_eq!(parse_money_token("12.5"), Some(dec!(12.5)));
        assert_eq!(parse_money_token("7.125"), Some(dec!(7.125)));
    }

    #[test]
    fn test_thousands_groups() {
        assert_eq!(parse_money_token("1,234.56"), Some(dec!(1234.56)));
        assert_eq!(parse_money_token("12,345,678.00"), Some(dec!(12345678.00)));
        assert_eq!(parse_money_token("1234.56"), Some(dec!(1234.56)));
    }

    #[test]
    fn test_rejects_non_amounts() {
        for token in [
            "150", "150.", ".50", "-4.50", "+4.50", "4.50,", "4.50)", "$4.50", "4.50USD",
            "1,23.45", "1,2345.00", ",123.45", "02/01", "", "USAA",
        ] {
            assert!(!is_money_token(token), "{token:?} should not match");
        }
    }

    #[test]
    fn test_trailing_newline_is_callers_job() {
        assert!(!is_money_token("4.50\n"));
        assert!(is_money_token("4.50\n".trim_end()));
    }
}
