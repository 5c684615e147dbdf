//! Calendar-year membership status calculation.
//!
//! Coverage rule: a payment made in January-June covers through December 31
//! of the same year; July-December covers through December 31 of the
//! following year. After coverage lapses there is a January-February grace
//! window during which standing reads `expiring-soon` instead of `expired`.
//!
//! All arithmetic uses UTC calendar fields so the result is
//! timezone-independent. Status is recomputed from scratch on every call,
//! never advanced incrementally.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::models::{MemberStatus, MembershipStanding};

/// Payments through June cover the same year; later payments the next.
const COVERAGE_SPLIT_MONTH: u32 = 6;
/// Last month of the grace window following a lapsed coverage year.
const GRACE_LAST_MONTH: u32 = 2;

/// Derive standing from the latest qualifying payment date.
///
/// Without a payment, a member with a confirmed account is `expired` and one
/// without is merely `applied`; both carry no expiration date. `now` is
/// caller-supplied for testability; see
/// [`calculate_membership_status_now`] for the wall-clock wrapper.
pub fn calculate_membership_status(
    last_payment: Option<NaiveDate>,
    has_confirmed_account: bool,
    now: DateTime<Utc>,
) -> MembershipStanding {
    let Some(paid) = last_payment else {
        let status = if has_confirmed_account {
            MemberStatus::Expired
        } else {
            MemberStatus::Applied
        };
        return MembershipStanding {
            status,
            expiration_date: None,
            months_since_payment: None,
        };
    };

    let today = now.date_naive();

    let mut months_since = (today.year() - paid.year()) * 12
        + (today.month() as i32 - paid.month() as i32);
    if today.day() < paid.day() {
        months_since -= 1;
    }

    let coverage_end_year = paid.year() + i32::from(paid.month() > COVERAGE_SPLIT_MONTH);
    // Dec 31 exists in every year
    let expiration = NaiveDate::from_ymd_opt(coverage_end_year, 12, 31).unwrap();

    let status = if coverage_end_year >= today.year() {
        MemberStatus::Active
    } else if coverage_end_year == today.year() - 1 && today.month() <= GRACE_LAST_MONTH {
        MemberStatus::ExpiringSoon
    } else {
        MemberStatus::Expired
    };

    MembershipStanding {
        status,
        expiration_date: Some(expiration),
        months_since_payment: Some(months_since),
    }
}

/// Wall-clock convenience wrapper.
pub fn calculate_membership_status_now(
    last_payment: Option<NaiveDate>,
    has_confirmed_account: bool,
) -> MembershipStanding {
    calculate_membership_status(last_payment, has_confirmed_account, Utc::now())
}
