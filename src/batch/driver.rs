use std::time::Duration;

use tokio::time::Instant;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::error::BatchError;
use super::summary::{BatchSummary, Tally};
use crate::classifier::{
    ClassifierSettings, CompletionClient, DecisionPolicy, HttpCompletionClient,
    RelevanceClassifier, Verdict, decide,
};
use crate::config::{Config, ConfigError};
use crate::constants::{
    DEFAULT_REQUEST_DELAY, DEFAULT_TIME_BUDGET, INFERENCE_RETRY_BACKOFF, INFERENCE_TIMEOUT,
    PROMOTION_THRESHOLD, SHEETS_TIMEOUT,
};
use crate::sheets::{
    ArticleRow, ArticleStatus, GoogleSheetsClient, RowUpdate, ServiceAccountAuth, SheetRange,
    SheetStore,
};

/// Loop controls for [`BatchScorer`].
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    pub range: SheetRange,
    pub request_delay: Duration,
    pub time_budget: Duration,
    pub policy: DecisionPolicy,
    /// Write `ErrorState` rows when inference fails.
    pub mark_errors: bool,
}

impl BatchOptions {
    pub fn new(range: SheetRange) -> Self {
        Self {
            range,
            request_delay: DEFAULT_REQUEST_DELAY,
            time_budget: DEFAULT_TIME_BUDGET,
            policy: DecisionPolicy::default(),
            mark_errors: true,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, BatchError> {
        let range = SheetRange::parse(&config.range).map_err(|_| ConfigError::InvalidValue {
            name: "NEWSDESK_RANGE",
            value: config.range.clone(),
            reason: "expected a range like 'Articles!A2:F'",
        })?;

        Ok(Self {
            range,
            request_delay: config.request_delay,
            time_budget: config.time_budget,
            policy: DecisionPolicy {
                promotion_threshold: PROMOTION_THRESHOLD,
                promotion_cap: config.promotion_cap,
                min_score: config.min_score,
            },
            mark_errors: config.mark_errors,
        })
    }
}

/// Scores every eligible row of the article range, one at a time.
pub struct BatchScorer<S, C> {
    store: S,
    classifier: RelevanceClassifier<C>,
    options: BatchOptions,
}

impl BatchScorer<GoogleSheetsClient, HttpCompletionClient> {
    /// Wires the Google Sheets store and the HTTP completion client from `config`.
    pub fn from_config(config: &Config) -> Result<Self, BatchError> {
        let options = BatchOptions::from_config(config)?;

        let sheets_http = reqwest::Client::builder()
            .timeout(SHEETS_TIMEOUT)
            .build()
            .map_err(BatchError::HttpClient)?;
        let auth = ServiceAccountAuth::new(config.credentials.clone(), sheets_http.clone());
        let store = GoogleSheetsClient::new(
            sheets_http,
            config.sheets_base_url.clone(),
            config.spreadsheet_id.clone(),
            auth,
        );

        let inference_http = reqwest::Client::builder()
            .timeout(INFERENCE_TIMEOUT)
            .build()
            .map_err(BatchError::HttpClient)?;
        let client = HttpCompletionClient::new(
            inference_http,
            config.inference_url.clone(),
            config.inference_api_key.clone(),
        )
        .with_retries(config.inference_retries, INFERENCE_RETRY_BACKOFF);

        let classifier = RelevanceClassifier::new(client, ClassifierSettings::from_config(config));
        Ok(Self::new(store, classifier, options))
    }
}

impl<S: SheetStore, C: CompletionClient> BatchScorer<S, C> {
    pub fn new(store: S, classifier: RelevanceClassifier<C>, options: BatchOptions) -> Self {
        Self {
            store,
            classifier,
            options,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn classifier(&self) -> &RelevanceClassifier<C> {
        &self.classifier
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Runs one batch. Only fetch failures are returned; row-level failures are
    /// logged, counted, and (optionally) written back.
    pub async fn run(&self) -> Result<BatchSummary, BatchError> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("batch_run", run_id = %run_id);
        self.run_with_id(&run_id).instrument(span).await
    }

    async fn run_with_id(&self, run_id: &str) -> Result<BatchSummary, BatchError> {
        let started = Instant::now();
        let range = self.options.range.to_string();

        let rows = self.store.read_rows(&range).await?;
        info!(range = %range, rows = rows.len(), "Fetched article rows");

        let mut tally = Tally::default();
        let mut stopped_early = false;

        for (index, cells) in rows.iter().enumerate() {
            let row = ArticleRow::from_cells(index, cells);
            let row_number = self.options.range.row_number(index);

            let eligibility = row.eligibility();
            if !eligibility.is_eligible() {
                debug!(row = row_number, reason = ?eligibility, "Skipping row");
                tally.skipped += 1;
                continue;
            }

            if tally.analyzed > 0 {
                if self.budget_spent(started) {
                    stopped_early = true;
                    break;
                }
                tokio::time::sleep(self.options.request_delay).await;
                if self.budget_spent(started) {
                    stopped_early = true;
                    break;
                }
            }

            self.process_row(&row, row_number, &mut tally).await;
        }

        if stopped_early {
            warn!(
                analyzed = tally.analyzed,
                budget_secs = self.options.time_budget.as_secs_f64(),
                "Time budget exhausted, stopping early"
            );
        }

        let summary = tally.into_summary(run_id, started.elapsed(), stopped_early);
        info!(
            analyzed = summary.analyzed_count,
            promoted = summary.promoted_count,
            rejected = summary.rejected_count,
            failed = summary.failed_count,
            write_failures = summary.write_failures,
            skipped = summary.skipped_count,
            elapsed_secs = summary.execution_time,
            "Batch complete"
        );
        Ok(summary)
    }

    fn budget_spent(&self, started: Instant) -> bool {
        started.elapsed() >= self.options.time_budget
    }

    async fn process_row(&self, row: &ArticleRow, row_number: u32, tally: &mut Tally) {
        tally.analyzed += 1;

        let (update, verdict) = match self
            .classifier
            .classify(&row.title, row.body_text.as_deref())
            .await
        {
            Ok(assessment) => {
                let verdict = decide(&assessment, &self.options.policy, tally.promoted);
                info!(
                    row = row_number,
                    title = %row.title,
                    score = assessment.score,
                    region_related = assessment.region_related,
                    verdict = verdict.as_str(),
                    "Article scored"
                );
                (
                    RowUpdate::scored(row, verdict.status(), assessment.score),
                    Some(verdict),
                )
            }
            Err(err) => {
                tally.failed += 1;
                warn!(row = row_number, title = %row.title, error = %err, "Analysis failed");
                if !self.options.mark_errors {
                    return;
                }
                (RowUpdate::failed(row, &err.to_string()), None)
            }
        };

        let address = self.options.range.update_address(row.index);
        match self.store.write_row(&address, &update).await {
            Ok(()) => {
                debug!(row = row_number, address = %address, status = %update.status, "Row updated");
                match verdict {
                    Some(Verdict::Promoted) => tally.promoted += 1,
                    Some(v) if v.status() == ArticleStatus::Rejected => tally.rejected += 1,
                    _ => {}
                }
            }
            Err(err) => {
                tally.write_failures += 1;
                warn!(row = row_number, address = %address, error = %err, "Row write failed");
            }
        }
    }
}
