//! Spreadsheet-backed article queue.
//!
//! [`SheetStore`] is the seam between the batch driver and the tabular store:
//! [`GoogleSheetsClient`] talks to the Sheets v4 REST API, `MockSheetStore`
//! keeps rows in memory for tests.

pub mod auth;
pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;
pub mod range;


pub use auth::{ServiceAccountAuth, ServiceAccountKey};
pub use client::{GoogleSheetsClient, SheetStore};
pub use error::{SheetsError, SheetsResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockSheetStore, RecordedWrite};
pub use model::{ArticleRow, ArticleStatus, Eligibility, RawRow, RowUpdate, ScoreCell};
pub use range::{SheetRange, column_letters};
