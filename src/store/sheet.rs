//! Sheet store trait and error types.

use async_trait::async_trait;
use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Result type for engine and store operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Error type for engine and store operations.
///
/// Transports surface throttling as `RateLimited` so retry decisions are made
/// by variant, never by message substring.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Required upstream sheet or setting missing. Fatal, never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Upstream signaled throttling. Retried with backoff.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Target row for a write does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rejected before any write was performed.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// True for transient failures that the retry policy may re-attempt.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, EngineError::RateLimited(_))
    }
}

impl From<String> for EngineError {
    fn from(s: String) -> Self {
        EngineError::Internal(s)
    }
}

impl From<&str> for EngineError {
    fn from(s: &str) -> Self {
        EngineError::Internal(s.to_string())
    }
}

/// One row from an upstream sheet.
///
/// There is no fixed schema guarantee; headers must be probed defensively.
/// Cell access goes through the column alias tables in
/// [`crate::normalize::columns`] rather than hard-coded header names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetRow {
    /// Upstream row number. The first data row is 2 (row 1 holds headers).
    pub row_number: u32,
    values: HashMap<String, String>,
}

impl SheetRow {
    pub fn new(row_number: u32, values: HashMap<String, String>) -> Self {
        Self { row_number, values }
    }

    /// Get a cell by exact header name. Absent columns and absent cells both
    /// return `None`; an empty cell returns `Some("")`.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.values.get(header).map(String::as_str)
    }
}

/// Row-access abstraction over the upstream tabular source.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust and allow
/// sharing across tasks.
///
/// # Error Handling
/// A missing sheet on `fetch_rows` is a `Configuration` error (callers probe
/// optional sheets with [`SheetStore::sheet_exists`] first); a missing row on
/// `write_cells` is `NotFound`; throttling surfaces as `RateLimited`.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// True when the named sheet exists upstream.
    async fn sheet_exists(&self, sheet: &str) -> EngineResult<bool>;

    /// Fetch all data rows of a sheet, with their upstream row numbers.
    async fn fetch_rows(&self, sheet: &str) -> EngineResult<Vec<SheetRow>>;

    /// Write cells of one row. A `None` value clears the cell. Columns that
    /// do not exist yet are created.
    async fn write_cells(
        &self,
        sheet: &str,
        row_number: u32,
        values: &[(String, Option<String>)],
    ) -> EngineResult<()>;

    /// Ensure optional columns exist before a first write.
    async fn ensure_columns(&self, sheet: &str, columns: &[&str]) -> EngineResult<()>;
}
