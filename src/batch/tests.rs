use super::*;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::classifier::{
    ClassifierSettings, DecisionPolicy, InferenceError, MockCompletionClient, RelevanceClassifier,
};
use crate::config::ConfigError;
use crate::sheets::{ArticleStatus, MockSheetStore, SheetRange, SheetsError};

const UNPUBLISHED: &str = "Неопубліковано";
const REJECTED: &str = "Забраковано";
const PROMOTE_REPLY: &str = "Score: 9. This is related to Ukraine.";
const KEEP_REPLY: &str = "Score: 6. Related to Ukraine.";

fn options() -> BatchOptions {
    BatchOptions {
        request_delay: Duration::from_secs(1),
        time_budget: Duration::from_secs(50),
        ..BatchOptions::new(SheetRange::parse("Articles!A2:F").unwrap())
    }
}

fn scorer(
    store: MockSheetStore,
    client: MockCompletionClient,
    options: BatchOptions,
) -> BatchScorer<Arc<MockSheetStore>, MockCompletionClient> {
    BatchScorer::new(
        Arc::new(store),
        RelevanceClassifier::new(client, ClassifierSettings::default()),
        options,
    )
}

mod run_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_scores_eligible_rows_and_skips_the_rest() {
        let store = MockSheetStore::with_str_rows(&[
            &["Drone radar startup", UNPUBLISHED, "https://a.example", "Body", "tech", ""],
            &["Old news", UNPUBLISHED, "", "", "", "7"],
            &["Already rejected", REJECTED, "", "", "", ""],
            &["Football results", UNPUBLISHED, "https://b.example", "", "", ""],
            &["", UNPUBLISHED, "", "", "", ""],
        ]);
        let client = MockCompletionClient::default().reply_for("Drone radar", PROMOTE_REPLY);
        let scorer = scorer(store, client, options());

        let summary = scorer.run().await.unwrap();

        assert_eq!(summary.analyzed_count, 2);
        assert_eq!(summary.promoted_count, 1);
        assert_eq!(summary.rejected_count, 1);
        assert_eq!(summary.skipped_count, 3);
        assert_eq!(summary.failed_count, 0);
        assert!(!summary.stopped_early);

        let store = scorer.store();
        assert_eq!(store.read_count(), 1);
        assert_eq!(store.writes().len(), 2);

        let promoted = store.write_to("Articles!B2:F2").unwrap();
        assert_eq!(
            promoted.values,
            vec![
                json!("Facebook"),
                json!("https://a.example"),
                json!("Body"),
                json!("tech"),
                json!(9)
            ]
        );

        let rejected = store.write_to("Articles!B5:F5").unwrap();
        assert_eq!(rejected.update.status, ArticleStatus::Rejected);
        assert_eq!(rejected.values[4], json!(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_related_low_score_stays_unpublished_with_score() {
        let store = MockSheetStore::with_str_rows(&[&["Grid upgrade", UNPUBLISHED, "", "", "", ""]]);
        let client = MockCompletionClient::new(KEEP_REPLY);
        let scorer = scorer(store, client, options());

        let summary = scorer.run().await.unwrap();

        assert_eq!(summary.analyzed_count, 1);
        assert_eq!(summary.promoted_count, 0);
        assert_eq!(summary.rejected_count, 0);
        let write = scorer.store().write_to("Articles!B2:F2").unwrap();
        assert_eq!(
            write.values,
            vec![json!(UNPUBLISHED), json!(""), json!(""), json!(""), json!(6)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_stops_after_slow_row() {
        let store = MockSheetStore::with_str_rows(&[
            &["First", UNPUBLISHED, "", "", "", ""],
            &["Second slow", UNPUBLISHED, "", "", "", ""],
            &["Third", UNPUBLISHED, "", "", "", ""],
        ]);
        let client = MockCompletionClient::default().delay_for("Second slow", Duration::from_secs(10));
        let scorer = scorer(
            store,
            client,
            BatchOptions {
                time_budget: Duration::from_secs(5),
                ..options()
            },
        );

        let summary = scorer.run().await.unwrap();

        assert_eq!(summary.analyzed_count, 2);
        assert!(summary.stopped_early);
        assert!(summary.message.starts_with("Time budget exhausted. Analyzed articles: 2."));
        assert_eq!(scorer.classifier().client().call_count(), 2);
        assert!(scorer.store().write_to("Articles!B3:F3").is_some());
        assert!(scorer.store().write_to("Articles!B4:F4").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_exhausted_on_last_row_is_not_early_stop() {
        let store = MockSheetStore::with_str_rows(&[
            &["Only slow", UNPUBLISHED, "", "", "", ""],
            &["Skipped", REJECTED, "", "", "", ""],
        ]);
        let client = MockCompletionClient::default().delay_for("Only slow", Duration::from_secs(60));
        let scorer = scorer(store, client, options());

        let summary = scorer.run().await.unwrap();

        assert_eq!(summary.analyzed_count, 1);
        assert!(!summary.stopped_early);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_only_between_analyses() {
        let store = MockSheetStore::with_str_rows(&[
            &["One", UNPUBLISHED, "", "", "", ""],
            &["Skip a", REJECTED, "", "", "", ""],
            &["Skip b", "Facebook", "", "", "", ""],
            &["Two", UNPUBLISHED, "", "", "", ""],
            &["Three", UNPUBLISHED, "", "", "", ""],
        ]);
        let scorer = scorer(store, MockCompletionClient::default(), options());

        let start = tokio::time::Instant::now();
        let summary = scorer.run().await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(summary.analyzed_count, 3);
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_failure_does_not_block_next_row() {
        let store = MockSheetStore::with_str_rows(&[
            &["First", UNPUBLISHED, "", "", "", ""],
            &["Second", UNPUBLISHED, "", "", "", ""],
            &["Third", UNPUBLISHED, "", "", "", ""],
        ])
        .rejecting_writes_to("Articles!B3:F3");
        let scorer = scorer(store, MockCompletionClient::default(), options());

        let summary = scorer.run().await.unwrap();

        assert_eq!(summary.analyzed_count, 3);
        assert_eq!(summary.write_failures, 1);
        assert_eq!(summary.rejected_count, 2);
        assert_eq!(scorer.store().attempted_write_count(), 3);
        assert!(scorer.store().write_to("Articles!B4:F4").is_some());
        assert_eq!(scorer.classifier().client().call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_promotion_cap_limits_facebook_rows() {
        let store = MockSheetStore::with_str_rows(&[
            &["A", UNPUBLISHED, "", "", "", ""],
            &["B", UNPUBLISHED, "", "", "", ""],
            &["C", UNPUBLISHED, "", "", "", ""],
            &["D", UNPUBLISHED, "", "", "", ""],
        ]);
        let scorer = scorer(store, MockCompletionClient::new(PROMOTE_REPLY), options());

        let summary = scorer.run().await.unwrap();

        assert_eq!(summary.promoted_count, 2);
        let statuses: Vec<ArticleStatus> = scorer
            .store()
            .writes()
            .iter()
            .map(|w| w.update.status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                ArticleStatus::Facebook,
                ArticleStatus::Facebook,
                ArticleStatus::Unpublished,
                ArticleStatus::Unpublished,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_promotion_write_frees_cap_slot() {
        let store = MockSheetStore::with_str_rows(&[
            &["A", UNPUBLISHED, "", "", "", ""],
            &["B", UNPUBLISHED, "", "", "", ""],
            &["C", UNPUBLISHED, "", "", "", ""],
        ])
        .rejecting_writes_to("Articles!B2:F2");
        let scorer = scorer(store, MockCompletionClient::new(PROMOTE_REPLY), options());

        let summary = scorer.run().await.unwrap();

        assert_eq!(summary.promoted_count, 2);
        assert_eq!(summary.write_failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_uncapped_policy() {
        let store = MockSheetStore::with_str_rows(&[
            &["A", UNPUBLISHED, "", "", "", ""],
            &["B", UNPUBLISHED, "", "", "", ""],
            &["C", UNPUBLISHED, "", "", "", ""],
        ]);
        let options = BatchOptions {
            policy: DecisionPolicy {
                promotion_cap: None,
                ..Default::default()
            },
            ..options()
        };
        let scorer = scorer(store, MockCompletionClient::new(PROMOTE_REPLY), options);

        let summary = scorer.run().await.unwrap();
        assert_eq!(summary.promoted_count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_inference_failure_is_recorded_on_row() {
        let store = MockSheetStore::with_str_rows(&[
            &["Broken story", UNPUBLISHED, "https://x.example", "", "eu", ""],
            &["Fine story", UNPUBLISHED, "", "", "", ""],
        ]);
        let client = MockCompletionClient::default().fail_for(
            "Broken",
            InferenceError::Status {
                status: 500,
                body: "boom".to_string(),
            },
        );
        let scorer = scorer(store, client, options());

        let summary = scorer.run().await.unwrap();

        assert_eq!(summary.analyzed_count, 2);
        assert_eq!(summary.failed_count, 1);
        let write = scorer.store().write_to("Articles!B2:F2").unwrap();
        assert_eq!(write.update.status, ArticleStatus::ErrorState);
        assert_eq!(
            write.values,
            vec![
                json!("Помилка аналізу"),
                json!("https://x.example"),
                json!(""),
                json!("eu"),
                json!("Error: inference endpoint returned 500: boom"),
            ]
        );
        assert!(scorer.store().write_to("Articles!B3:F3").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_inference_failure_without_marking() {
        let store = MockSheetStore::with_str_rows(&[&["Broken story", UNPUBLISHED, "", "", "", ""]]);
        let client = MockCompletionClient::default().fail_for("Broken", InferenceError::EmptyReply);
        let scorer = scorer(
            store,
            client,
            BatchOptions {
                mark_errors: false,
                ..options()
            },
        );

        let summary = scorer.run().await.unwrap();

        assert_eq!(summary.failed_count, 1);
        assert_eq!(scorer.store().attempted_write_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_fatal() {
        let store = MockSheetStore::new().failing_reads("503 Service Unavailable");
        let scorer = scorer(store, MockCompletionClient::default(), options());

        let err = scorer.run().await.unwrap_err();

        assert!(matches!(
            err,
            BatchError::Fetch(SheetsError::SourceUnavailable { .. })
        ));
        assert!(!err.is_auth_failure());
        assert_eq!(scorer.classifier().client().call_count(), 0);
        assert_eq!(scorer.store().attempted_write_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_sheet_is_fatal() {
        let scorer = scorer(MockSheetStore::new(), MockCompletionClient::default(), options());

        let err = scorer.run().await.unwrap_err();

        assert!(matches!(err, BatchError::Fetch(SheetsError::EmptyDataset { .. })));
        assert!(err.to_string().contains("Articles!A2:F"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ids_are_unique() {
        let store = MockSheetStore::with_str_rows(&[&["A", REJECTED, "", "", "", ""]]);
        let scorer = scorer(store, MockCompletionClient::default(), options());

        let first = scorer.run().await.unwrap();
        let second = scorer.run().await.unwrap();

        assert_ne!(first.run_id, second.run_id);
        assert_eq!(first.analyzed_count, 0);
        assert_eq!(first.skipped_count, 1);
    }
}

mod summary_tests {
    use super::*;

    #[test]
    fn test_summary_serializes_camel_case() {
        let tally = Tally {
            analyzed: 3,
            promoted: 1,
            rejected: 1,
            failed: 1,
            write_failures: 0,
            skipped: 4,
        };
        let summary = tally.into_summary("run-1", Duration::from_millis(2500), false);
        let value = serde_json::to_value(&summary).unwrap();

        assert_eq!(
            value["message"],
            "Analysis complete. Analyzed articles: 3. Total execution time: 2.50 seconds"
        );
        assert_eq!(value["executionTime"], 2.5);
        assert_eq!(value["analyzedCount"], 3);
        assert_eq!(value["promotedCount"], 1);
        assert_eq!(value["rejectedCount"], 1);
        assert_eq!(value["failedCount"], 1);
        assert_eq!(value["writeFailures"], 0);
        assert_eq!(value["skippedCount"], 4);
        assert_eq!(value["stoppedEarly"], false);
        assert_eq!(value["runId"], "run-1");
        assert!(value["completedAt"].as_str().unwrap().ends_with('Z'));
    }
}

mod error_tests {
    use super::*;

    #[test]
    fn test_auth_failure_classification() {
        assert!(BatchError::Fetch(SheetsError::Auth("denied".into())).is_auth_failure());
        assert!(BatchError::Config(ConfigError::MissingEnvVar { name: "SPREADSHEET_ID" }).is_auth_failure());
        assert!(
            !BatchError::Fetch(SheetsError::EmptyDataset {
                range: "A1:B".into()
            })
            .is_auth_failure()
        );
    }
}

mod options_tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_options_from_config() {
        let config = Config {
            range: "'News Queue'!B5:G".to_string(),
            request_delay: Duration::from_millis(200),
            time_budget: Duration::from_secs(30),
            promotion_cap: None,
            min_score: Some(3),
            mark_errors: false,
            ..Default::default()
        };

        let options = BatchOptions::from_config(&config).unwrap();

        assert_eq!(options.range.sheet.as_deref(), Some("News Queue"));
        assert_eq!(options.range.update_address(0), "'News Queue'!C5:G5");
        assert_eq!(options.request_delay, Duration::from_millis(200));
        assert_eq!(options.time_budget, Duration::from_secs(30));
        assert_eq!(options.policy.promotion_cap, None);
        assert_eq!(options.policy.min_score, Some(3));
        assert_eq!(options.policy.promotion_threshold, 8);
        assert!(!options.mark_errors);
    }

    #[test]
    fn test_options_reject_bad_range() {
        let config = Config {
            range: "nonsense".to_string(),
            ..Default::default()
        };

        let err = BatchOptions::from_config(&config).unwrap_err();
        assert!(matches!(err, BatchError::Config(ConfigError::InvalidValue { .. })));
    }
}
