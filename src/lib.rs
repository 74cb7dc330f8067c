//! Newsdesk scorer library crate (used by the binary and integration tests).
//!
//! A batch job that reads an article queue from a spreadsheet, asks a
//! chat-completion model how relevant each unpublished title is, and writes a
//! status and score back to each row.
//!
//! ## Modules
//! - [`sheets`]: spreadsheet store ([`SheetStore`], [`GoogleSheetsClient`]) and row model
//! - [`classifier`]: prompt, completion client, reply parsing, and status decision
//! - [`batch`]: the sequential run loop ([`BatchScorer`])
//! - [`gateway`]: HTTP trigger
//! - [`config`]: environment-backed [`Config`]
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod batch;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod gateway;
pub mod sheets;

pub use batch::{BatchError, BatchOptions, BatchScorer, BatchSummary};
pub use classifier::{
    Assessment, ClassifierSettings, CompletionClient, DecisionPolicy, HttpCompletionClient,
    InferenceError, RelevanceClassifier, Verdict, decide,
};
#[cfg(any(test, feature = "mock"))]
pub use classifier::MockCompletionClient;
pub use config::{Config, ConfigError};
pub use gateway::{GatewayError, HandlerState, create_router_with_state};
#[cfg(any(test, feature = "mock"))]
pub use sheets::MockSheetStore;
pub use sheets::{
    ArticleRow, ArticleStatus, GoogleSheetsClient, RowUpdate, ServiceAccountAuth,
    ServiceAccountKey, SheetRange, SheetStore, SheetsError,
};
