//! Pure normalization of loosely structured upstream values.
//!
//! Spreadsheet headers vary by language and revision, phone numbers arrive in
//! arbitrary punctuation, amounts and dates come as display strings. Nothing
//! in this module performs I/O or fails on malformed input; bad values
//! degrade to empty strings or `None` and matching continues.

pub mod columns;
pub mod date;
pub mod phone;
pub mod source;

#[cfg(test)]
mod columns_tests;

pub use columns::{resolve_field, AliasTable, MANUAL_PAYMENT_ALIASES, MEMBER_ALIASES, PAYMENT_ALIASES};
pub use date::parse_payment_date;
pub use phone::normalize_phone;
pub use source::{normalize_source, parse_amount, MANUAL_SOURCE};
