//! Payment source and amount canonicalization.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Source attached to rows of the manually entered payments sheet. Always
/// force-qualified by the classifier.
pub const MANUAL_SOURCE: &str = "manual";

/// Maps spreadsheet source variations to the canonical identifiers used by
/// filters and badges.
static SOURCE_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("ath_business_team", "ath_movil"),
        ("ath_movil", "ath_movil"),
        ("paypal", "paypal"),
    ])
});

/// Canonicalize a raw payment-service label.
///
/// Lower-cases, collapses whitespace runs to `_`, then applies the alias
/// table; unknown labels pass through in normalized form.
pub fn normalize_source(raw: &str) -> String {
    let key = raw
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    SOURCE_ALIASES
        .get(key.as_str())
        .map(|canonical| canonical.to_string())
        .unwrap_or(key)
}

/// Parse a display amount (`"25"`, `"$25.00"`, `"1,250.00"`) to a number.
/// Unparseable values degrade to `0.0`, matching the lenient upstream rows.
pub fn parse_amount(raw: &str) -> f64 {
    raw.trim()
        .trim_start_matches('$')
        .replace(',', "")
        .parse()
        .unwrap_or(0.0)
}
