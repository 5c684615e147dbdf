//! In-memory sheet store implementation.
//!
//! This module provides a local implementation of [`SheetStore`] suitable for
//! unit testing and local development. All data is stored in memory using
//! HashMap and Vec structures, providing fast, deterministic, and isolated
//! execution. Failure injection helpers allow exercising the retry and error
//! paths without a real transport.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::sheet::{EngineError, EngineResult, SheetRow, SheetStore};

/// In-memory sheet store.
///
/// # Example
/// ```
/// use membership_engine::store::LocalSheetStore;
///
/// let store = LocalSheetStore::new();
/// store.insert_sheet("PAYMENTS", &["Email", "Amount", "Date"]);
/// store.push_row("PAYMENTS", &[("Email", "a@b.org"), ("Amount", "25"), ("Date", "2025-01-15")]);
/// ```
#[derive(Clone, Default)]
pub struct LocalSheetStore {
    data: Arc<RwLock<LocalData>>,
}

#[derive(Default)]
struct LocalData {
    sheets: HashMap<String, LocalSheet>,

    // Failure injection and instrumentation for tests
    rate_limited_calls: u32,
    fetch_count: u64,
}

#[derive(Default)]
struct LocalSheet {
    headers: Vec<String>,
    rows: Vec<HashMap<String, String>>,
}

impl LocalSheetStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sheet with the given header row. Replaces any existing sheet
    /// of the same name.
    pub fn insert_sheet(&self, name: &str, headers: &[&str]) {
        let mut data = self.data.write().unwrap();
        data.sheets.insert(
            name.to_string(),
            LocalSheet {
                headers: headers.iter().map(|h| h.to_string()).collect(),
                rows: Vec::new(),
            },
        );
    }

    /// Append a data row to a sheet. Cells for headers not listed stay empty.
    ///
    /// # Panics
    /// Panics if the sheet does not exist; create it with
    /// [`LocalSheetStore::insert_sheet`] first. Setup helper, test use only.
    pub fn push_row(&self, name: &str, cells: &[(&str, &str)]) {
        let mut data = self.data.write().unwrap();
        let sheet = data
            .sheets
            .get_mut(name)
            .unwrap_or_else(|| panic!("sheet '{}' not created", name));
        let row = cells
            .iter()
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        sheet.rows.push(row);
    }

    /// Make the next `n` store calls fail with `RateLimited`.
    pub fn set_rate_limited(&self, n: u32) {
        self.data.write().unwrap().rate_limited_calls = n;
    }

    /// Number of `fetch_rows` calls served so far.
    pub fn fetch_count(&self) -> u64 {
        self.data.read().unwrap().fetch_count
    }

    /// Read one cell back, for asserting writes. `None` when the sheet, row
    /// or cell is absent.
    pub fn cell(&self, sheet: &str, row_number: u32, header: &str) -> Option<String> {
        let data = self.data.read().unwrap();
        let sheet = data.sheets.get(sheet)?;
        let idx = row_index(row_number)?;
        sheet.rows.get(idx)?.get(header).cloned()
    }

    /// Headers of a sheet, for asserting `ensure_columns`.
    pub fn headers(&self, sheet: &str) -> Vec<String> {
        let data = self.data.read().unwrap();
        data.sheets
            .get(sheet)
            .map(|s| s.headers.clone())
            .unwrap_or_default()
    }

    fn check_rate_limit(&self) -> EngineResult<()> {
        let mut data = self.data.write().unwrap();
        if data.rate_limited_calls > 0 {
            data.rate_limited_calls -= 1;
            return Err(EngineError::RateLimited(
                "upstream quota exceeded".to_string(),
            ));
        }
        Ok(())
    }
}

/// Convert an upstream row number (first data row = 2) to a vec index.
fn row_index(row_number: u32) -> Option<usize> {
    row_number.checked_sub(2).map(|i| i as usize)
}

#[async_trait]
impl SheetStore for LocalSheetStore {
    async fn sheet_exists(&self, sheet: &str) -> EngineResult<bool> {
        self.check_rate_limit()?;
        Ok(self.data.read().unwrap().sheets.contains_key(sheet))
    }

    async fn fetch_rows(&self, sheet: &str) -> EngineResult<Vec<SheetRow>> {
        self.check_rate_limit()?;
        let mut data = self.data.write().unwrap();
        data.fetch_count += 1;
        let local = data.sheets.get(sheet).ok_or_else(|| {
            EngineError::Configuration(format!("{} sheet not found in spreadsheet", sheet))
        })?;

        Ok(local
            .rows
            .iter()
            .enumerate()
            .map(|(idx, cells)| SheetRow::new(idx as u32 + 2, cells.clone()))
            .collect())
    }

    async fn write_cells(
        &self,
        sheet: &str,
        row_number: u32,
        values: &[(String, Option<String>)],
    ) -> EngineResult<()> {
        self.check_rate_limit()?;
        let mut data = self.data.write().unwrap();
        let local = data.sheets.get_mut(sheet).ok_or_else(|| {
            EngineError::Configuration(format!("{} sheet not found in spreadsheet", sheet))
        })?;

        let idx = row_index(row_number)
            .filter(|i| *i < local.rows.len())
            .ok_or_else(|| {
                EngineError::NotFound(format!("row {} not found in {}", row_number, sheet))
            })?;

        for (header, value) in values {
            if !local.headers.iter().any(|h| h == header) {
                local.headers.push(header.clone());
            }
            match value {
                Some(v) => {
                    local.rows[idx].insert(header.clone(), v.clone());
                }
                None => {
                    local.rows[idx].remove(header);
                }
            }
        }
        Ok(())
    }

    async fn ensure_columns(&self, sheet: &str, columns: &[&str]) -> EngineResult<()> {
        self.check_rate_limit()?;
        let mut data = self.data.write().unwrap();
        let local = data.sheets.get_mut(sheet).ok_or_else(|| {
            EngineError::Configuration(format!("{} sheet not found in spreadsheet", sheet))
        })?;

        for column in columns {
            if !local.headers.iter().any(|h| h == column) {
                local.headers.push(column.to_string());
            }
        }
        Ok(())
    }
}
