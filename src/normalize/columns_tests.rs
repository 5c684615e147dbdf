use std::collections::HashMap;

use super::columns::{resolve_field, MANUAL_PAYMENT_ALIASES, MEMBER_ALIASES, PAYMENT_ALIASES};
use crate::store::SheetRow;

fn row(cells: &[(&str, &str)]) -> SheetRow {
    let values: HashMap<String, String> = cells
        .iter()
        .map(|(h, v)| (h.to_string(), v.to_string()))
        .collect();
    SheetRow::new(2, values)
}

#[test]
fn earlier_alias_wins() {
    let r = row(&[("Sender Email", "first@a.org"), ("Email", "second@a.org")]);
    assert_eq!(resolve_field(&r, PAYMENT_ALIASES, "email"), "first@a.org");
}

#[test]
fn empty_cells_fall_through_to_later_aliases() {
    let r = row(&[("Sender Email", ""), ("Email", "second@a.org")]);
    assert_eq!(resolve_field(&r, PAYMENT_ALIASES, "email"), "second@a.org");
}

#[test]
fn bilingual_headers_resolve() {
    let r = row(&[("Monto", "25.00"), ("Fecha", "2025-01-15")]);
    assert_eq!(resolve_field(&r, PAYMENT_ALIASES, "amount"), "25.00");
    assert_eq!(resolve_field(&r, PAYMENT_ALIASES, "date"), "2025-01-15");

    let m = row(&[("Nombre", "Ana"), ("Apellidos", "Rivera")]);
    assert_eq!(resolve_field(&m, MEMBER_ALIASES, "first_name"), "Ana");
    assert_eq!(resolve_field(&m, MEMBER_ALIASES, "last_name"), "Rivera");
}

#[test]
fn missing_headers_yield_empty_sentinel() {
    let r = row(&[("Unrelated", "x")]);
    assert_eq!(resolve_field(&r, MANUAL_PAYMENT_ALIASES, "email"), "");
}

#[test]
fn unknown_canonical_yields_empty_sentinel() {
    let r = row(&[("Email", "a@b.org")]);
    assert_eq!(resolve_field(&r, PAYMENT_ALIASES, "no_such_field"), "");
}
