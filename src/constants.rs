//! Cross-cutting, shared constants.
//!
//! Runtime overrides live in [`Config`](crate::config::Config); these are the defaults
//! it falls back to and the fixed parts of the sheet and prompt contracts.

use std::time::Duration;

/// Sheet range read on every run (title through score columns, header row excluded).
pub const DEFAULT_ARTICLES_RANGE: &str = "Articles!A2:F";

/// Number of columns in an article row.
pub const ARTICLE_COLUMNS: usize = 6;

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Value input mode for row writes: values are interpreted as if typed by a user.
pub const VALUE_INPUT_OPTION: &str = "USER_ENTERED";
pub const SHEETS_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_INFERENCE_URL: &str = "https://api.perplexity.ai/chat/completions";
pub const DEFAULT_MODEL: &str = "llama-3.1-sonar-small-128k-online";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_TOP_P: f32 = 0.9;
pub const DEFAULT_MAX_TOKENS: u32 = 150;
pub const INFERENCE_TIMEOUT: Duration = Duration::from_secs(10);
pub const INFERENCE_RETRY_BACKOFF: Duration = Duration::from_millis(750);

/// Body text is cut to this many characters before it goes into the prompt.
pub const BODY_EXCERPT_CHARS: usize = 500;

/// Case-insensitive phrase whose presence in a reply marks the article as region-related.
pub const REGION_MARKER: &str = "related to ukraine";

/// Scores at or above this value qualify for promotion.
pub const PROMOTION_THRESHOLD: u32 = 8;
pub const DEFAULT_PROMOTION_CAP: u32 = 2;

pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_secs(50);

/// Prefix written to the score column when a row's analysis failed.
pub const ERROR_SCORE_PREFIX: &str = "Error: ";

/// Response header describing how a trigger was handled.
pub const NEWSDESK_STATUS_HEADER: &str = "X-Newsdesk-Status";
pub const NEWSDESK_STATUS_HEALTHY: &str = "healthy";
pub const NEWSDESK_STATUS_COMPLETE: &str = "complete";
pub const NEWSDESK_STATUS_PARTIAL: &str = "partial";
pub const NEWSDESK_STATUS_BUSY: &str = "busy";
pub const NEWSDESK_STATUS_ERROR: &str = "error";
