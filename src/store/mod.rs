//! Upstream tabular store boundary.
//!
//! The engine reads and writes spreadsheet-shaped data through the
//! [`SheetStore`] trait, allowing different backends to be swapped via
//! dependency injection. The shipped backend is the in-memory
//! [`LocalSheetStore`], suitable for unit tests and local development; a
//! production transport implements the same trait out of tree.

pub mod local;
pub mod retry;
pub mod sheet;

pub use local::LocalSheetStore;
pub use retry::{with_retry, DEFAULT_MAX_ATTEMPTS};
pub use sheet::{EngineError, EngineResult, SheetRow, SheetStore};
