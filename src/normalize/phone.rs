//! Phone canonicalization for match keys.

/// Reduce a raw phone string to a matchable digit key.
///
/// All non-digit characters are stripped. An 11-digit number with a leading
/// `1` loses the country code. Returns the empty string when no digits
/// remain; downstream matching treats that as "no key".
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 11 && digits.starts_with('1') {
        digits[1..].to_string()
    } else {
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_country_code() {
        assert_eq!(normalize_phone("+1 (787) 555-0123"), "7875550123");
        assert_eq!(normalize_phone("787-555-0123"), "7875550123");
        assert_eq!(
            normalize_phone("+1 (787) 555-0123"),
            normalize_phone("787-555-0123")
        );
    }

    #[test]
    fn keeps_eleven_digits_without_leading_one() {
        assert_eq!(normalize_phone("27875550123"), "27875550123");
    }

    #[test]
    fn empty_and_non_numeric_yield_no_key() {
        assert_eq!(normalize_phone(""), "");
        assert_eq!(normalize_phone("n/a"), "");
    }
}
