//! Declarative column alias tables.
//!
//! Upstream sheets have gone through several header revisions, some Spanish
//! and some English. Each canonical field maps to an ordered list of
//! acceptable raw header names; resolution returns the first present,
//! non-empty value. New aliases are table edits, never new conditionals.

use crate::store::SheetRow;

/// Canonical field name paired with its ordered header candidates.
pub type AliasTable = &'static [(&'static str, &'static [&'static str])];

/// Primary payments sheet (form submissions and imported service exports).
pub static PAYMENT_ALIASES: AliasTable = &[
    (
        "email",
        &["Sender Email", "sender_email", "E-mail", "Email", "email"],
    ),
    ("phone", &["Teléfono", "Telefono", "Phone", "phone"]),
    ("amount", &["Amount", "Monto", "Cantidad", "amount"]),
    (
        "date",
        &["Timestamp", "Fecha", "Payment Date", "payment_date", "Date"],
    ),
    (
        "source",
        &["Payment Service", "payment_service", "Servicio", "Source", "Fuente"],
    ),
    (
        "notes",
        &["Message", "payment_message", "Mensaje", "Notes", "Notas"],
    ),
    ("is_membership", &["is_membership", "Is Membership"]),
];

/// Manually entered payments sheet.
pub static MANUAL_PAYMENT_ALIASES: AliasTable = &[
    ("email", &["E-mail", "email"]),
    ("phone", &["Teléfono", "Telefono", "phone"]),
    ("amount", &["amount", "Amount"]),
    ("date", &["date", "Date", "fecha"]),
    ("notes", &["notes", "Notes"]),
];

/// Member roster sheet.
pub static MEMBER_ALIASES: AliasTable = &[
    ("email", &["E-mail", "email", "Email"]),
    ("sac_email", &["SAC Email", "sac_email"]),
    ("first_name", &["Nombre", "First Name", "first_name"]),
    ("initial", &["Inicial", "Initial"]),
    ("last_name", &["Apellidos", "Last Name", "last_name"]),
    (
        "second_last_name",
        &["Segundo Apellido", "second_last_name"],
    ),
    ("phone", &["Teléfono", "Telefono", "Phone", "phone"]),
    (
        "postal_address",
        &["Dirección postal", "Direccion postal", "postal_address"],
    ),
    ("town", &["Pueblo", "Town", "town"]),
    ("zipcode", &["Zipcode", "zipcode", "Zip"]),
    ("member_since", &["Miembro desde", "member_since"]),
    ("geo_lat", &["geo_lat"]),
    ("geo_lng", &["geo_lng"]),
];

/// Resolve a canonical field from a raw row.
///
/// Tries each alias in table order and returns the first present, non-empty
/// value; empty string when none match or the canonical name is unknown to
/// the table.
pub fn resolve_field<'a>(row: &'a SheetRow, table: AliasTable, canonical: &str) -> &'a str {
    table
        .iter()
        .find(|(name, _)| *name == canonical)
        .and_then(|(_, aliases)| {
            aliases
                .iter()
                .find_map(|alias| row.get(alias).filter(|v| !v.is_empty()))
        })
        .unwrap_or("")
}
