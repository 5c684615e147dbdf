//! Payment domain types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A payment row as exposed to callers of `get_payments`.
///
/// Raw field values are kept close to the upstream cells; the `date` in
/// particular is the display string, not a parsed date, because callers
/// filter and render it as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Sequential listing id across both sources (primary first).
    pub id: usize,
    /// Upstream row number in the source sheet (first data row = 2).
    pub row_number: u32,
    pub email: String,
    pub phone: String,
    pub amount: f64,
    pub date: String,
    /// Canonicalized payment source (`ath_movil`, `paypal`, `manual`, ...).
    pub source: String,
    pub notes: String,
    /// Explicit membership classification, `None` when no override recorded.
    pub is_membership: Option<bool>,
}

/// A payment row normalized for matching against the member roster.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPayment {
    /// Lower-cased, trimmed email, `None` when empty.
    pub match_key_email: Option<String>,
    /// Digit-normalized phone, `None` when no digits remain.
    pub match_key_phone: Option<String>,
    pub amount: f64,
    /// `None` when the raw date string is unparseable.
    pub date: Option<NaiveDate>,
    pub notes: String,
    pub source: String,
    /// Explicit operator override, `None` when the field is absent or empty.
    pub explicit_classification: Option<bool>,
}

/// The latest qualifying payment observed for one match key.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIndexEntry {
    pub date: NaiveDate,
    pub amount: f64,
    pub notes: String,
    pub source: String,
}

/// Result of a classification write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyOutcome {
    #[serde(rename = "rowNumber")]
    pub row_number: u32,
    pub is_membership: Option<bool>,
}

/// One coordinate write against the roster, keyed by member email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoUpdate {
    pub key: String,
    pub lat: f64,
    pub lng: f64,
}

/// Outcome of a batch coordinate write. Per-row failures are collected, not
/// fatal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoWriteReport {
    pub updated: usize,
    pub errors: Vec<String>,
}
