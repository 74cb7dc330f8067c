//! Article rows as stored in the queue sheet.
//!
//! Column layout, left to right: `title, status, link, bodyText, relevanceTag, score`.

use std::fmt;

use serde_json::Value;

use crate::constants::{ARTICLE_COLUMNS, ERROR_SCORE_PREFIX};

/// One row as returned by the store: cells in column order, trailing blanks may be absent.
pub type RawRow = Vec<Option<String>>;

/// Canonical article status.
///
/// The sheet stores the label produced by [`ArticleStatus::label`]; no other
/// spellings are recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArticleStatus {
    /// Waiting for analysis or publication.
    Unpublished,
    /// Not region-related (or below the score floor).
    Rejected,
    /// Selected for cross-posting to the social channel.
    Facebook,
    /// Published through some other channel.
    PublishedOther,
    /// Analysis failed; the score column holds the error.
    ErrorState,
}

impl ArticleStatus {
    pub const ALL: [ArticleStatus; 5] = [
        ArticleStatus::Unpublished,
        ArticleStatus::Rejected,
        ArticleStatus::Facebook,
        ArticleStatus::PublishedOther,
        ArticleStatus::ErrorState,
    ];

    /// Label written to (and read from) the status column.
    pub fn label(&self) -> &'static str {
        match self {
            ArticleStatus::Unpublished => "Неопубліковано",
            ArticleStatus::Rejected => "Забраковано",
            ArticleStatus::Facebook => "Facebook",
            ArticleStatus::PublishedOther => "Опубліковано",
            ArticleStatus::ErrorState => "Помилка аналізу",
        }
    }

    /// Parses a status cell. Blank or unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a row is or is not picked up for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    /// The score column already holds a value.
    AlreadyScored,
    /// Status is something other than `Unpublished` (or unreadable).
    NotUnpublished(Option<ArticleStatus>),
    /// Nothing to send to the model.
    MissingTitle,
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

/// A typed article row. Position in the fetched range is its only identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRow {
    /// Zero-based offset into the fetched range.
    pub index: usize,
    pub title: String,
    pub status: Option<ArticleStatus>,
    pub link: Option<String>,
    pub body_text: Option<String>,
    pub relevance_tag: Option<String>,
    /// Raw score cell. Any non-blank value means "already analyzed".
    pub score: Option<String>,
}

impl ArticleRow {
    /// Builds a row from raw cells, treating missing and blank cells alike.
    pub fn from_cells(index: usize, cells: &[Option<String>]) -> Self {
        let cell = |i: usize| -> Option<String> {
            cells
                .get(i)
                .and_then(|c| c.as_deref())
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
        };

        Self {
            index,
            title: cell(0).unwrap_or_default(),
            status: cell(1).as_deref().and_then(ArticleStatus::from_label),
            link: cell(2),
            body_text: cell(3),
            relevance_tag: cell(4),
            score: cell(5),
        }
    }

    pub fn has_score(&self) -> bool {
        self.score.is_some()
    }

    /// The score cell as a number, if it holds one.
    pub fn numeric_score(&self) -> Option<u32> {
        self.score.as_deref().and_then(|s| s.parse().ok())
    }

    /// Eligibility policy: status must be `Unpublished` and the score cell blank.
    pub fn eligibility(&self) -> Eligibility {
        if self.title.is_empty() {
            return Eligibility::MissingTitle;
        }
        if self.status != Some(ArticleStatus::Unpublished) {
            return Eligibility::NotUnpublished(self.status);
        }
        if self.has_score() {
            return Eligibility::AlreadyScored;
        }
        Eligibility::Eligible
    }
}

/// Value written to the score column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreCell {
    Score(u32),
    Error(String),
}

impl ScoreCell {
    fn to_value(&self) -> Value {
        match self {
            ScoreCell::Score(score) => Value::from(*score),
            ScoreCell::Error(message) => Value::String(format!("{ERROR_SCORE_PREFIX}{message}")),
        }
    }
}

/// The five cells written back for a row: status through score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowUpdate {
    pub status: ArticleStatus,
    pub link: Option<String>,
    pub body_text: Option<String>,
    pub relevance_tag: Option<String>,
    pub score: ScoreCell,
}

impl RowUpdate {
    /// Update for a successfully classified row; passthrough columns are preserved.
    pub fn scored(row: &ArticleRow, status: ArticleStatus, score: u32) -> Self {
        Self {
            status,
            link: row.link.clone(),
            body_text: row.body_text.clone(),
            relevance_tag: row.relevance_tag.clone(),
            score: ScoreCell::Score(score),
        }
    }

    /// Update recording a failed analysis.
    pub fn failed(row: &ArticleRow, message: &str) -> Self {
        Self {
            status: ArticleStatus::ErrorState,
            link: row.link.clone(),
            body_text: row.body_text.clone(),
            relevance_tag: row.relevance_tag.clone(),
            score: ScoreCell::Error(message.to_string()),
        }
    }

    /// Cell values in column order. Missing optionals become `""` so stale data is overwritten.
    pub fn to_values(&self) -> Vec<Value> {
        let text = |v: &Option<String>| Value::String(v.clone().unwrap_or_default());
        let values = vec![
            Value::String(self.status.label().to_string()),
            text(&self.link),
            text(&self.body_text),
            text(&self.relevance_tag),
            self.score.to_value(),
        ];
        debug_assert_eq!(values.len(), ARTICLE_COLUMNS - 1);
        values
    }
}
