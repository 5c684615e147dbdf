//! Member domain types.
//!
//! A `Member` is always derived fresh at read time from the roster sheet plus
//! the payment indexes; computed standing is never persisted upstream.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Membership status derived from the latest qualifying payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberStatus {
    /// Applied but never paid and no confirmed account.
    Applied,
    /// Coverage extends through December 31 of the current year or later.
    Active,
    /// Coverage lapsed at the end of last year; we are inside the
    /// January-February grace window.
    ExpiringSoon,
    /// Coverage lapsed and the grace window has passed.
    Expired,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Applied => "applied",
            MemberStatus::Active => "active",
            MemberStatus::ExpiringSoon => "expiring-soon",
            MemberStatus::Expired => "expired",
        }
    }
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of the membership status calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MembershipStanding {
    pub status: MemberStatus,
    /// Always December 31 of the coverage end year, or `None` without a
    /// qualifying payment.
    pub expiration_date: Option<NaiveDate>,
    /// Whole elapsed months since the last qualifying payment. Informational.
    pub months_since_payment: Option<i32>,
}

/// Provenance of the payment that determined a member's standing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastPayment {
    pub amount: f64,
    pub date: NaiveDate,
    pub notes: String,
    pub source: String,
}

/// A roster member enriched with payment-derived standing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Row-position-derived identifier (first roster row = 1). Unstable
    /// across refetches if upstream rows are reordered; preserved for
    /// downstream compatibility.
    pub id: usize,
    /// Upstream row number (first data row = 2), stable for writes.
    pub row_number: u32,
    pub email: String,
    /// Confirmed-account email; non-empty means the member has an account.
    pub sac_email: String,
    pub first_name: String,
    pub initial: String,
    pub last_name: String,
    pub second_last_name: String,
    /// Display name assembled from the name parts, `-` when empty.
    pub name: String,
    pub phone: String,
    pub postal_address: String,
    pub town: String,
    pub zipcode: String,
    pub member_since: String,
    pub geo_lat: Option<f64>,
    pub geo_lng: Option<f64>,
    pub status: MemberStatus,
    pub expiration_date: Option<NaiveDate>,
    pub months_since_payment: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_payment: Option<LastPayment>,
}

impl Member {
    /// True when the member has a confirmed account.
    pub fn has_confirmed_account(&self) -> bool {
        !self.sac_email.is_empty()
    }

    /// True when at least one address field is present.
    pub fn has_address(&self) -> bool {
        !self.postal_address.is_empty() || !self.town.is_empty() || !self.zipcode.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&MemberStatus::ExpiringSoon).unwrap(),
            "\"expiring-soon\""
        );
        assert_eq!(MemberStatus::ExpiringSoon.as_str(), "expiring-soon");
    }
}
