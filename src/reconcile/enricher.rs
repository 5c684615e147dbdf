//! Roster row to enriched member join.

use chrono::{DateTime, Utc};

use crate::models::{LastPayment, Member};
use crate::normalize::{normalize_phone, resolve_field, MEMBER_ALIASES};
use crate::store::SheetRow;

use super::index::PaymentIndex;
use super::status::calculate_membership_status;

/// Join one roster row against the payment index and stamp standing.
///
/// `position` is the zero-based row position in the roster; the exposed id
/// is `position + 1`. Members match by lowercased email or normalized phone,
/// and when both keys hit different entries the fresher one wins.
pub fn enrich_member(
    row: &SheetRow,
    position: usize,
    index: &PaymentIndex,
    now: DateTime<Utc>,
) -> Member {
    let field = |canonical: &str| resolve_field(row, MEMBER_ALIASES, canonical).to_string();

    let email = field("email");
    let sac_email = field("sac_email");
    let phone = field("phone");

    let email_key = {
        let key = email.trim().to_lowercase();
        (!key.is_empty()).then_some(key)
    };
    let phone_key = {
        let key = normalize_phone(&phone);
        (!key.is_empty()).then_some(key)
    };

    let entry = index.lookup(email_key.as_deref(), phone_key.as_deref());

    let has_confirmed_account = !sac_email.is_empty();
    let standing =
        calculate_membership_status(entry.map(|e| e.date), has_confirmed_account, now);

    let first_name = field("first_name");
    let initial = field("initial");
    let last_name = field("last_name");
    let second_last_name = field("second_last_name");
    let name = display_name(&[&first_name, &initial, &last_name, &second_last_name]);

    Member {
        id: position + 1,
        row_number: row.row_number,
        email,
        sac_email,
        first_name,
        initial,
        last_name,
        second_last_name,
        name,
        phone,
        postal_address: field("postal_address"),
        town: field("town"),
        zipcode: field("zipcode"),
        member_since: field("member_since"),
        geo_lat: parse_coordinate(resolve_field(row, MEMBER_ALIASES, "geo_lat")),
        geo_lng: parse_coordinate(resolve_field(row, MEMBER_ALIASES, "geo_lng")),
        status: standing.status,
        expiration_date: standing.expiration_date,
        months_since_payment: standing.months_since_payment,
        last_payment: entry.map(|e| LastPayment {
            amount: e.amount,
            date: e.date,
            notes: e.notes.clone(),
            source: e.source.clone(),
        }),
    }
}

/// Join non-empty name parts with single spaces, `-` when all are empty.
fn display_name(parts: &[&str]) -> String {
    let joined = parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined
    }
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberStatus;
    use crate::reconcile::index::PaymentIndexBuilder;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn row(row_number: u32, cells: &[(&str, &str)]) -> SheetRow {
        let values: HashMap<String, String> = cells
            .iter()
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        SheetRow::new(row_number, values)
    }

    fn index_of(payments: &[(&str, &str, &str, &str)]) -> PaymentIndex {
        let mut builder = PaymentIndexBuilder::new(25.0);
        let rows: Vec<SheetRow> = payments
            .iter()
            .map(|(email, phone, amount, date)| {
                row(2, &[
                    ("Email", email),
                    ("Phone", phone),
                    ("Amount", amount),
                    ("Date", date),
                ])
            })
            .collect();
        builder.add_primary_rows(&rows);
        builder.finish()
    }

    #[test]
    fn matches_by_lowercased_email() {
        let index = index_of(&[("maria@example.org", "", "30", "2025-01-15")]);
        let member = enrich_member(
            &row(2, &[("E-mail", " Maria@Example.ORG "), ("SAC Email", "m@x.org")]),
            0,
            &index,
            now(),
        );
        assert_eq!(member.status, MemberStatus::Active);
        assert_eq!(member.last_payment.unwrap().amount, 30.0);
    }

    #[test]
    fn matches_by_normalized_phone_when_email_misses() {
        let index = index_of(&[("", "+1 (787) 555-0123", "30", "2025-01-15")]);
        let member = enrich_member(
            &row(2, &[("E-mail", "nobody@x.org"), ("Teléfono", "787-555-0123")]),
            0,
            &index,
            now(),
        );
        assert_eq!(member.status, MemberStatus::Active);
    }

    #[test]
    fn fresher_entry_wins_when_email_and_phone_hit_differently() {
        let index = index_of(&[
            ("maria@example.org", "", "30", "2024-03-01"),
            ("", "787-555-0123", "40", "2025-01-15"),
        ]);
        let member = enrich_member(
            &row(2, &[
                ("E-mail", "maria@example.org"),
                ("Phone", "7875550123"),
                ("SAC Email", "m@x.org"),
            ]),
            0,
            &index,
            now(),
        );
        assert_eq!(member.last_payment.unwrap().amount, 40.0);
        assert_eq!(member.status, MemberStatus::Active);
    }

    #[test]
    fn unmatched_member_standing_depends_on_confirmed_account() {
        let index = PaymentIndex::default();
        let applied = enrich_member(&row(2, &[("E-mail", "a@x.org")]), 0, &index, now());
        assert_eq!(applied.status, MemberStatus::Applied);
        assert!(applied.last_payment.is_none());

        let expired = enrich_member(
            &row(3, &[("E-mail", "b@x.org"), ("SAC Email", "b@sac.org")]),
            1,
            &index,
            now(),
        );
        assert_eq!(expired.status, MemberStatus::Expired);
    }

    #[test]
    fn id_is_position_plus_one_and_row_number_passes_through() {
        let index = PaymentIndex::default();
        let member = enrich_member(&row(7, &[("E-mail", "a@x.org")]), 5, &index, now());
        assert_eq!(member.id, 6);
        assert_eq!(member.row_number, 7);
    }

    #[test]
    fn display_name_joins_present_parts() {
        let index = PaymentIndex::default();
        let member = enrich_member(
            &row(2, &[
                ("Nombre", "María"),
                ("Inicial", "J"),
                ("Apellidos", "Rivera"),
                ("Segundo Apellido", "Cruz"),
            ]),
            0,
            &index,
            now(),
        );
        assert_eq!(member.name, "María J Rivera Cruz");

        let blank = enrich_member(&row(3, &[]), 1, &index, now());
        assert_eq!(blank.name, "-");
    }

    #[test]
    fn coordinates_parse_when_numeric() {
        let index = PaymentIndex::default();
        let member = enrich_member(
            &row(2, &[("geo_lat", "18.2208"), ("geo_lng", "not-a-number")]),
            0,
            &index,
            now(),
        );
        assert_eq!(member.geo_lat, Some(18.2208));
        assert_eq!(member.geo_lng, None);
        assert!(!member.has_address());
    }
}
