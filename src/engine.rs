//! Engine context object.
//!
//! `MembershipEngine` owns the store handle, configuration, and the TTL
//! cache, and exposes the caller-facing operations. It is constructed
//! explicitly and passed where needed; nothing in the crate reaches for
//! process-wide state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::cache::{spawn_sweeper, Cached, TtlCache};
use crate::config::EngineConfig;
use crate::geocode::{collect_geo_updates, Geocoder, GeocodeStats, Throttle};
use crate::models::{ClassifyOutcome, GeoUpdate, GeoWriteReport, Member, Payment};
use crate::normalize::{
    normalize_source, parse_amount, resolve_field, MANUAL_PAYMENT_ALIASES, MANUAL_SOURCE,
    MEMBER_ALIASES, PAYMENT_ALIASES,
};
use crate::reconcile::{
    enrich_member, parse_override, PaymentIndex, PaymentIndexBuilder, FALSE_TOKEN, TRUE_TOKEN,
};
use crate::store::{with_retry, EngineError, EngineResult, SheetRow, SheetStore};

const IS_MEMBERSHIP_COLUMN: &str = "is_membership";
const GEO_COLUMNS: [&str; 2] = ["geo_lat", "geo_lng"];

/// Cache keys for the two aggregate reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CacheKey {
    Members,
    Payments,
}

/// Cached payloads. `Arc`ed so cache hits never clone the row vectors.
#[derive(Debug, Clone)]
enum CacheValue {
    Members(Arc<Vec<Member>>),
    Payments(Arc<Vec<Payment>>),
}

/// The reconciliation engine.
///
/// Cheap to clone is not a goal; share it behind an `Arc` instead. Must be
/// created inside a tokio runtime (the cache sweeper task is spawned on
/// construction).
pub struct MembershipEngine {
    store: Arc<dyn SheetStore>,
    config: EngineConfig,
    cache: Arc<TtlCache<CacheKey, CacheValue>>,
}

impl MembershipEngine {
    pub fn new(store: Arc<dyn SheetStore>, config: EngineConfig) -> Self {
        let cache = Arc::new(TtlCache::new(Duration::from_secs(config.cache.ttl_secs)));
        spawn_sweeper(
            &cache,
            Duration::from_secs(config.cache.sweep_interval_secs),
        );
        Self {
            store,
            config,
            cache,
        }
    }

    /// All roster members enriched with payment-derived standing.
    pub async fn get_members(&self, force_refresh: bool) -> EngineResult<Cached<Arc<Vec<Member>>>> {
        let cached = self
            .cache
            .get_or_fetch(CacheKey::Members, force_refresh, || async {
                Ok(CacheValue::Members(Arc::new(self.load_members().await?)))
            })
            .await?;
        match cached.data {
            CacheValue::Members(members) => Ok(Cached {
                data: members,
                from_cache: cached.from_cache,
            }),
            CacheValue::Payments(_) => Err(EngineError::Internal(
                "cache key/value mismatch".to_string(),
            )),
        }
    }

    /// All payment rows from both sources, primary first.
    pub async fn get_payments(
        &self,
        force_refresh: bool,
    ) -> EngineResult<Cached<Arc<Vec<Payment>>>> {
        let cached = self
            .cache
            .get_or_fetch(CacheKey::Payments, force_refresh, || async {
                Ok(CacheValue::Payments(Arc::new(self.load_payments().await?)))
            })
            .await?;
        match cached.data {
            CacheValue::Payments(payments) => Ok(Cached {
                data: payments,
                from_cache: cached.from_cache,
            }),
            CacheValue::Members(_) => Err(EngineError::Internal(
                "cache key/value mismatch".to_string(),
            )),
        }
    }

    /// Record or clear the explicit membership classification of one payment
    /// row, then flush both caches.
    ///
    /// Forcing `true` on a row whose amount is below the fee threshold is
    /// rejected before any write.
    pub async fn classify_payment(
        &self,
        row_number: u32,
        is_membership: Option<bool>,
    ) -> EngineResult<ClassifyOutcome> {
        if row_number < 2 {
            return Err(EngineError::Validation(format!(
                "invalid payment row number: {}",
                row_number
            )));
        }

        let sheet = self.config.sheets.payments.as_str();
        let rows = self.fetch_sheet(sheet).await?;
        let row = rows
            .iter()
            .find(|r| r.row_number == row_number)
            .ok_or_else(|| {
                EngineError::NotFound(format!("payment row {} not found", row_number))
            })?;

        if is_membership == Some(true) {
            let amount = parse_amount(resolve_field(row, PAYMENT_ALIASES, "amount"));
            if amount < self.config.membership.fee_threshold {
                return Err(EngineError::Validation(format!(
                    "cannot mark a {:.2} payment as membership (minimum {:.2})",
                    amount, self.config.membership.fee_threshold
                )));
            }
        }

        self.store
            .ensure_columns(sheet, &[IS_MEMBERSHIP_COLUMN])
            .await?;

        let value = is_membership.map(|b| if b { TRUE_TOKEN } else { FALSE_TOKEN }.to_string());
        let values = vec![(IS_MEMBERSHIP_COLUMN.to_string(), value)];
        with_retry(
            || self.store.write_cells(sheet, row_number, &values),
            self.config.retry.max_attempts,
        )
        .await?;

        log::info!(
            "classified payment row {} as {:?}",
            row_number,
            is_membership
        );
        self.cache.invalidate(None);

        Ok(ClassifyOutcome {
            row_number,
            is_membership,
        })
    }

    /// Write coordinates onto roster rows, keyed by member email.
    ///
    /// Per-row failures are collected and reported, never fatal; the Members
    /// cache is invalidated once at the end regardless of partial failure.
    pub async fn write_geo_data(&self, updates: &[GeoUpdate]) -> EngineResult<GeoWriteReport> {
        let sheet = self.config.sheets.roster.as_str();
        self.store.ensure_columns(sheet, &GEO_COLUMNS).await?;

        let rows = self.fetch_sheet(sheet).await?;
        let row_by_email: HashMap<String, u32> = rows
            .iter()
            .filter_map(|row| {
                let email = resolve_field(row, MEMBER_ALIASES, "email").trim().to_lowercase();
                (!email.is_empty()).then_some((email, row.row_number))
            })
            .collect();

        let mut report = GeoWriteReport::default();
        for update in updates {
            let key = update.key.trim().to_lowercase();
            let Some(&row_number) = row_by_email.get(&key) else {
                report
                    .errors
                    .push(format!("no roster row for {}", update.key));
                continue;
            };
            let values = vec![
                ("geo_lat".to_string(), Some(update.lat.to_string())),
                ("geo_lng".to_string(), Some(update.lng.to_string())),
            ];
            match self.store.write_cells(sheet, row_number, &values).await {
                Ok(()) => report.updated += 1,
                Err(e) => report.errors.push(format!("{}: {}", update.key, e)),
            }
        }

        self.cache.invalidate(Some(&CacheKey::Members));
        log::info!(
            "geo write: {} updated, {} errors",
            report.updated,
            report.errors.len()
        );
        Ok(report)
    }

    /// Geocode members that have an address but no stored coordinates and
    /// write the results back. Lookup and write failures are soft.
    pub async fn geocode_members(&self, geocoder: &dyn Geocoder) -> EngineResult<GeocodeStats> {
        let members = self.get_members(false).await?.data;
        let mut throttle = Throttle::new(Duration::from_millis(self.config.geocode.delay_ms));

        let (updates, mut stats) = collect_geo_updates(geocoder, &members, &mut throttle).await;
        if !updates.is_empty() {
            let report = self.write_geo_data(&updates).await?;
            stats.geocoded = report.updated;
            stats.failed += report.errors.len();
        }

        log::info!(
            "geocoding batch: {} geocoded, {} skipped, {} failed of {}",
            stats.geocoded,
            stats.skipped,
            stats.failed,
            stats.total
        );
        Ok(stats)
    }

    async fn load_members(&self) -> EngineResult<Vec<Member>> {
        let (roster, index) = tokio::join!(
            self.fetch_sheet(&self.config.sheets.roster),
            self.build_payment_index()
        );
        let roster = roster?;
        let index = index?;

        let now = Utc::now();
        let members = roster
            .iter()
            .enumerate()
            .map(|(position, row)| enrich_member(row, position, &index, now))
            .collect::<Vec<_>>();
        log::info!("loaded {} members from {}", members.len(), self.config.sheets.roster);
        Ok(members)
    }

    async fn build_payment_index(&self) -> EngineResult<PaymentIndex> {
        let (primary, manual) = tokio::join!(
            self.fetch_sheet(&self.config.sheets.payments),
            self.fetch_optional_sheet(&self.config.sheets.manual_payments)
        );

        let mut builder = PaymentIndexBuilder::new(self.config.membership.fee_threshold);
        builder.add_primary_rows(&primary?);
        if let Some(manual_rows) = manual? {
            builder.add_manual_rows(&manual_rows);
        }
        Ok(builder.finish())
    }

    async fn load_payments(&self) -> EngineResult<Vec<Payment>> {
        let (primary, manual) = tokio::join!(
            self.fetch_sheet(&self.config.sheets.payments),
            self.fetch_optional_sheet(&self.config.sheets.manual_payments)
        );
        let primary = primary?;
        let manual = manual?.unwrap_or_default();

        let mut payments: Vec<Payment> = primary
            .iter()
            .enumerate()
            .map(|(i, row)| payment_from_primary_row(row, i + 1))
            .collect();
        let offset = payments.len();
        payments.extend(
            manual
                .iter()
                .enumerate()
                .map(|(i, row)| payment_from_manual_row(row, offset + i + 1)),
        );

        log::info!(
            "loaded {} payments ({} manual)",
            payments.len(),
            payments.len() - offset
        );
        Ok(payments)
    }

    async fn fetch_sheet(&self, sheet: &str) -> EngineResult<Vec<SheetRow>> {
        with_retry(
            || self.store.fetch_rows(sheet),
            self.config.retry.max_attempts,
        )
        .await
    }

    /// Fetch a sheet that may legitimately be absent.
    async fn fetch_optional_sheet(&self, sheet: &str) -> EngineResult<Option<Vec<SheetRow>>> {
        let exists = with_retry(
            || self.store.sheet_exists(sheet),
            self.config.retry.max_attempts,
        )
        .await?;
        if !exists {
            log::debug!("optional sheet {} absent, skipping", sheet);
            return Ok(None);
        }
        Ok(Some(self.fetch_sheet(sheet).await?))
    }
}

fn payment_from_primary_row(row: &SheetRow, id: usize) -> Payment {
    Payment {
        id,
        row_number: row.row_number,
        email: resolve_field(row, PAYMENT_ALIASES, "email").to_string(),
        phone: resolve_field(row, PAYMENT_ALIASES, "phone").to_string(),
        amount: parse_amount(resolve_field(row, PAYMENT_ALIASES, "amount")),
        date: resolve_field(row, PAYMENT_ALIASES, "date").to_string(),
        source: normalize_source(resolve_field(row, PAYMENT_ALIASES, "source")),
        notes: resolve_field(row, PAYMENT_ALIASES, "notes").to_string(),
        is_membership: parse_override(resolve_field(row, PAYMENT_ALIASES, "is_membership")),
    }
}

fn payment_from_manual_row(row: &SheetRow, id: usize) -> Payment {
    Payment {
        id,
        row_number: row.row_number,
        email: resolve_field(row, MANUAL_PAYMENT_ALIASES, "email")
            .trim()
            .to_lowercase(),
        phone: resolve_field(row, MANUAL_PAYMENT_ALIASES, "phone").to_string(),
        amount: parse_amount(resolve_field(row, MANUAL_PAYMENT_ALIASES, "amount")),
        date: resolve_field(row, MANUAL_PAYMENT_ALIASES, "date").to_string(),
        source: MANUAL_SOURCE.to_string(),
        notes: resolve_field(row, MANUAL_PAYMENT_ALIASES, "notes").to_string(),
        is_membership: None,
    }
}
