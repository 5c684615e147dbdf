//! Membership/payment reconciliation engine.
//!
//! Normalizes heterogeneous payment records from two spreadsheet-shaped
//! sources, matches them to roster members by email or phone, classifies
//! which payments count toward membership, derives a calendar-year
//! membership status, and wraps the aggregate reads in a TTL cache with
//! retry-on-rate-limit upstream access.
//!
//! Entry point is [`engine::MembershipEngine`], constructed over any
//! [`store::SheetStore`] implementation:
//!
//! ```no_run
//! use std::sync::Arc;
//! use membership_engine::config::EngineConfig;
//! use membership_engine::engine::MembershipEngine;
//! use membership_engine::store::LocalSheetStore;
//!
//! # async fn run() -> membership_engine::store::EngineResult<()> {
//! let config = EngineConfig::from_default_location()?;
//! let engine = MembershipEngine::new(Arc::new(LocalSheetStore::new()), config);
//! let members = engine.get_members(false).await?;
//! println!("{} members ({})", members.data.len(),
//!     if members.from_cache { "cached" } else { "fresh" });
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod engine;
pub mod geocode;
pub mod models;
pub mod normalize;
pub mod reconcile;
pub mod store;

pub use cache::Cached;
pub use config::EngineConfig;
pub use engine::MembershipEngine;
pub use models::{Member, MemberStatus, Payment};
pub use store::{EngineError, EngineResult, SheetStore};
