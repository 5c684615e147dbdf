//! Membership reconciliation core.
//!
//! Pure business rules, no I/O: payment classification, the dual-key
//! latest-qualifying-payment index, the calendar-year status machine, and
//! the member join. The engine feeds these from already-fetched sheet rows.

pub mod classifier;
pub mod enricher;
pub mod index;
pub mod status;

pub use classifier::{classify, parse_override, Classification, FALSE_TOKEN, TRUE_TOKEN};
pub use enricher::enrich_member;
pub use index::{PaymentIndex, PaymentIndexBuilder};
pub use status::calculate_membership_status;
