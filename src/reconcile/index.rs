//! Latest-qualifying-payment indexes.
//!
//! Both payment sources fold sequentially into the same pair of maps, keyed
//! by normalized email and normalized phone. An incoming qualifying payment
//! replaces the stored entry for a key only when its date is strictly
//! greater, so insertion order never changes the result. Non-qualifying,
//! keyless, or date-unparseable rows are silently dropped.

use std::collections::HashMap;

use crate::models::{NormalizedPayment, PaymentIndexEntry};
use crate::normalize::{
    normalize_phone, normalize_source, parse_amount, parse_payment_date, resolve_field,
    MANUAL_PAYMENT_ALIASES, MANUAL_SOURCE, PAYMENT_ALIASES,
};
use crate::store::SheetRow;

use super::classifier::{classify, parse_override, Classification};

/// The completed pair of match-key indexes.
#[derive(Debug, Default)]
pub struct PaymentIndex {
    by_email: HashMap<String, PaymentIndexEntry>,
    by_phone: HashMap<String, PaymentIndexEntry>,
}

impl PaymentIndex {
    /// Entry for an email match key, if any qualifying payment carried it.
    pub fn by_email(&self, key: &str) -> Option<&PaymentIndexEntry> {
        self.by_email.get(key)
    }

    /// Entry for a phone match key.
    pub fn by_phone(&self, key: &str) -> Option<&PaymentIndexEntry> {
        self.by_phone.get(key)
    }

    /// Resolve a member's entry: when both keys hit, the fresher entry wins.
    pub fn lookup(
        &self,
        email_key: Option<&str>,
        phone_key: Option<&str>,
    ) -> Option<&PaymentIndexEntry> {
        let email_hit = email_key.and_then(|k| self.by_email.get(k));
        let phone_hit = phone_key.and_then(|k| self.by_phone.get(k));
        match (email_hit, phone_hit) {
            (Some(e), Some(p)) => Some(if p.date > e.date { p } else { e }),
            (Some(e), None) => Some(e),
            (None, Some(p)) => Some(p),
            (None, None) => None,
        }
    }

    fn absorb(&mut self, payment: &NormalizedPayment, classification: Classification) {
        if !classification.qualifies {
            return;
        }
        let Some(date) = payment.date else {
            return;
        };
        if payment.match_key_email.is_none() && payment.match_key_phone.is_none() {
            return;
        }

        let entry = PaymentIndexEntry {
            date,
            amount: payment.amount,
            notes: payment.notes.clone(),
            source: payment.source.clone(),
        };
        if let Some(email) = &payment.match_key_email {
            upsert_latest(&mut self.by_email, email, &entry);
        }
        if let Some(phone) = &payment.match_key_phone {
            upsert_latest(&mut self.by_phone, phone, &entry);
        }
    }
}

/// Keep-latest-by-date upsert: replace only on a strictly greater date.
fn upsert_latest(
    map: &mut HashMap<String, PaymentIndexEntry>,
    key: &str,
    entry: &PaymentIndexEntry,
) {
    match map.get(key) {
        Some(existing) if existing.date >= entry.date => {}
        _ => {
            map.insert(key.to_string(), entry.clone());
        }
    }
}

/// Folds raw payment rows from both sources into a [`PaymentIndex`].
#[derive(Debug)]
pub struct PaymentIndexBuilder {
    fee_threshold: f64,
    index: PaymentIndex,
}

impl PaymentIndexBuilder {
    pub fn new(fee_threshold: f64) -> Self {
        Self {
            fee_threshold,
            index: PaymentIndex::default(),
        }
    }

    /// Fold rows of the primary payments sheet.
    pub fn add_primary_rows(&mut self, rows: &[SheetRow]) {
        for row in rows {
            let payment = normalize_primary_row(row);
            let classification = classify(
                resolve_field(row, PAYMENT_ALIASES, "is_membership"),
                payment.amount,
                self.fee_threshold,
            );
            self.index.absorb(&payment, classification);
        }
    }

    /// Fold rows of the manual payments sheet; every row force-qualifies.
    pub fn add_manual_rows(&mut self, rows: &[SheetRow]) {
        for row in rows {
            let payment = normalize_manual_row(row);
            self.index.absorb(&payment, Classification::manual());
        }
    }

    pub fn finish(self) -> PaymentIndex {
        self.index
    }
}

fn email_key(raw: &str) -> Option<String> {
    let key = raw.trim().to_lowercase();
    (!key.is_empty()).then_some(key)
}

fn phone_key(raw: &str) -> Option<String> {
    let key = normalize_phone(raw);
    (!key.is_empty()).then_some(key)
}

/// Normalize one primary-sheet row for matching.
pub fn normalize_primary_row(row: &SheetRow) -> NormalizedPayment {
    NormalizedPayment {
        match_key_email: email_key(resolve_field(row, PAYMENT_ALIASES, "email")),
        match_key_phone: phone_key(resolve_field(row, PAYMENT_ALIASES, "phone")),
        amount: parse_amount(resolve_field(row, PAYMENT_ALIASES, "amount")),
        date: parse_payment_date(resolve_field(row, PAYMENT_ALIASES, "date")),
        notes: resolve_field(row, PAYMENT_ALIASES, "notes").to_string(),
        source: normalize_source(resolve_field(row, PAYMENT_ALIASES, "source")),
        explicit_classification: parse_override(resolve_field(row, PAYMENT_ALIASES, "is_membership")),
    }
}

/// Normalize one manual-sheet row for matching.
pub fn normalize_manual_row(row: &SheetRow) -> NormalizedPayment {
    NormalizedPayment {
        match_key_email: email_key(resolve_field(row, MANUAL_PAYMENT_ALIASES, "email")),
        match_key_phone: phone_key(resolve_field(row, MANUAL_PAYMENT_ALIASES, "phone")),
        amount: parse_amount(resolve_field(row, MANUAL_PAYMENT_ALIASES, "amount")),
        date: parse_payment_date(resolve_field(row, MANUAL_PAYMENT_ALIASES, "date")),
        notes: resolve_field(row, MANUAL_PAYMENT_ALIASES, "notes").to_string(),
        source: MANUAL_SOURCE.to_string(),
        explicit_classification: None,
    }
}
