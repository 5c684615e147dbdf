//! Serialized batch geocoding.
//!
//! Members without stored coordinates but with at least one address part are
//! looked up one at a time through the [`Geocoder`] collaborator, with a
//! fixed minimum spacing between calls. Individual lookup failures are soft;
//! the batch always runs to completion and reports counts.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::models::{GeoUpdate, Member};
use crate::store::EngineResult;

/// A resolved coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Address-to-coordinates lookup collaborator.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a free-form address. `Ok(None)` means the provider found no
    /// match; errors mean the lookup itself failed.
    async fn lookup(&self, address: &str) -> EngineResult<Option<Coordinates>>;
}

/// Minimum-spacing throttle for consecutive provider calls.
///
/// The first call proceeds immediately; each subsequent call waits until
/// `delay` has elapsed since the previous one.
#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self { delay, last: None }
    }

    pub async fn wait(&mut self) {
        if let Some(last) = self.last {
            let ready_at = last + self.delay;
            let now = Instant::now();
            if ready_at > now {
                tokio::time::sleep(ready_at - now).await;
            }
        }
        self.last = Some(Instant::now());
    }
}

/// Counts for one geocoding batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeocodeStats {
    /// Members whose coordinates were resolved and written back.
    pub geocoded: usize,
    /// Members with coordinates already stored, or with no address to look up.
    pub skipped: usize,
    /// Lookups that errored or found no match, plus failed write-backs.
    pub failed: usize,
    pub total: usize,
}

/// Assemble the lookup string from a member's address parts.
pub fn format_address(member: &Member) -> String {
    [
        member.postal_address.as_str(),
        member.town.as_str(),
        member.zipcode.as_str(),
    ]
    .iter()
    .map(|p| p.trim())
    .filter(|p| !p.is_empty())
    .collect::<Vec<_>>()
    .join(", ")
}

/// Run the lookup loop over a member batch.
///
/// Returns the successful coordinate updates (keyed by member email) plus
/// partial stats; the caller writes the updates back and folds write
/// failures into `failed`.
pub async fn collect_geo_updates(
    geocoder: &dyn Geocoder,
    members: &[Member],
    throttle: &mut Throttle,
) -> (Vec<GeoUpdate>, GeocodeStats) {
    let mut stats = GeocodeStats {
        total: members.len(),
        ..GeocodeStats::default()
    };
    let mut updates = Vec::new();

    for member in members {
        // a partial coordinate pair still counts as geocoded; only members
        // with both coordinates absent are looked up
        let already_geocoded = member.geo_lat.is_some() || member.geo_lng.is_some();
        if already_geocoded || !member.has_address() {
            stats.skipped += 1;
            continue;
        }

        throttle.wait().await;
        match geocoder.lookup(&format_address(member)).await {
            Ok(Some(coords)) => {
                updates.push(GeoUpdate {
                    key: member.email.clone(),
                    lat: coords.lat,
                    lng: coords.lng,
                });
                stats.geocoded += 1;
            }
            Ok(None) => {
                log::debug!("no geocoding match for member {}", member.id);
                stats.failed += 1;
            }
            Err(e) => {
                log::warn!("geocoding lookup failed for member {}: {}", member.id, e);
                stats.failed += 1;
            }
        }
    }

    (updates, stats)
}
