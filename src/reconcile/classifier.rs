//! Payment classification policy.
//!
//! Three-way rule: an explicit `TRUE` always counts, an explicit `FALSE`
//! never counts (even above the fee threshold), and an absent field falls
//! back to the amount heuristic. Rows from the manual payments sheet are
//! always force-qualified. Explicit-false is deliberately stronger than the
//! amount heuristic; clearing the field reverts to the heuristic, never to
//! explicit-true.

/// Literal cell value for an explicit membership classification.
pub const TRUE_TOKEN: &str = "TRUE";
/// Literal cell value for an explicit exclusion.
pub const FALSE_TOKEN: &str = "FALSE";

/// Whether one payment counts toward membership, and whether that decision
/// came from an explicit override rather than the amount heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub qualifies: bool,
    pub forced: bool,
}

impl Classification {
    /// Classification applied to every manual-sheet row.
    pub fn manual() -> Self {
        Classification {
            qualifies: true,
            forced: true,
        }
    }
}

/// Parse the raw `is_membership` cell into an override.
///
/// Tokens are matched case-insensitively; anything else (including empty)
/// means no override was recorded.
pub fn parse_override(raw: &str) -> Option<bool> {
    let value = raw.trim();
    if value.eq_ignore_ascii_case(TRUE_TOKEN) {
        Some(true)
    } else if value.eq_ignore_ascii_case(FALSE_TOKEN) {
        Some(false)
    } else {
        None
    }
}

/// Classify one primary-sheet payment.
pub fn classify(raw_is_membership: &str, amount: f64, fee_threshold: f64) -> Classification {
    match parse_override(raw_is_membership) {
        Some(true) => Classification {
            qualifies: true,
            forced: true,
        },
        Some(false) => Classification {
            qualifies: false,
            forced: false,
        },
        None => Classification {
            qualifies: amount >= fee_threshold,
            forced: false,
        },
    }
}
