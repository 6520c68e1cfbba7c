// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{processor, signal_config, InMemoryRepository, Scripted, ScriptedFetcher};
use signalscan::domain::models::domain_record::{DomainRecord, RecordStatus};
use signalscan::engines::traits::{FetchError, FetchErrorKind};
use signalscan::workers::item_processor::{ItemOutcome, ProcessError};
use std::sync::Arc;

const PAGE: &str = r#"<html>
<head><script src="/static/react.production.min.js"></script></head>
<body>
  <a href="https://shop.example.com/contact-us">Contact</a>
  <a href="https://shop.example.com/help/faq">FAQ</a>
  Write to support@shop.example.com
</body>
</html>"#;

#[tokio::test]
async fn test_process_classifies_and_commits() {
    let repo = InMemoryRepository::with_urls(&["https://shop.example.com"]);
    let fetcher = Arc::new(ScriptedFetcher::new().body("https://shop.example.com", PAGE));
    let processor = processor(
        repo.clone(),
        fetcher.clone(),
        signal_config(&["react", "vue"], &["zendesk"], 5),
    );

    let outcome = processor
        .process(DomainRecord::pending(1, "https://shop.example.com"))
        .await
        .unwrap();

    assert_eq!(outcome, ItemOutcome::Done { matched: true });

    let record = repo.get(1).unwrap();
    assert_eq!(record.status, RecordStatus::Done);
    assert!(record.completed_at.is_some());

    let result = record.result.unwrap();
    assert_eq!(result.frameworks, vec!["react".to_string()]);
    assert!(result.help_desks.is_empty());
    assert_eq!(result.emails, vec!["support@shop.example.com".to_string()]);
    assert_eq!(
        result.contact_page_links,
        vec!["https://shop.example.com/contact-us".to_string()]
    );
    assert_eq!(
        result.faq_page_links,
        vec!["https://shop.example.com/help/faq".to_string()]
    );
    assert_eq!(repo.body(1).as_deref(), Some(PAGE));
}

#[tokio::test]
async fn test_process_without_signals_is_done_unmatched() {
    let repo = InMemoryRepository::with_urls(&["https://plain.example.com"]);
    let fetcher = Arc::new(
        ScriptedFetcher::new().body("https://plain.example.com", "<html>nothing here</html>"),
    );
    let processor = processor(repo.clone(), fetcher, signal_config(&["react"], &[], 5));

    let outcome = processor
        .process(DomainRecord::pending(1, "https://plain.example.com"))
        .await
        .unwrap();

    assert_eq!(outcome, ItemOutcome::Done { matched: false });
    let record = repo.get(1).unwrap();
    assert_eq!(record.status, RecordStatus::Done);
    assert!(!record.result.unwrap().matched);
}

#[tokio::test(start_paused = true)]
async fn test_process_fetch_timeout_is_recorded() {
    let repo = InMemoryRepository::with_urls(&["https://slow.example.com"]);
    let fetcher =
        Arc::new(ScriptedFetcher::new().respond("https://slow.example.com", Scripted::Hang));
    let processor = processor(repo.clone(), fetcher, signal_config(&[], &[], 5));

    let outcome = processor
        .process(DomainRecord::pending(1, "https://slow.example.com"))
        .await
        .unwrap();

    assert_eq!(outcome, ItemOutcome::Failed(FetchErrorKind::Timeout));

    let record = repo.get(1).unwrap();
    assert_eq!(record.status, RecordStatus::Failed);
    assert!(record.result.is_none());
    assert!(record.error_message.unwrap().starts_with("timeout"));
}

#[tokio::test]
async fn test_process_http_status_is_recorded() {
    let repo = InMemoryRepository::with_urls(&["https://down.example.com"]);
    let fetcher = Arc::new(ScriptedFetcher::new().respond(
        "https://down.example.com",
        Scripted::Fail(FetchError::http_status(503)),
    ));
    let processor = processor(repo.clone(), fetcher, signal_config(&[], &[], 5));

    let outcome = processor
        .process(DomainRecord::pending(1, "https://down.example.com"))
        .await
        .unwrap();

    assert_eq!(outcome, ItemOutcome::Failed(FetchErrorKind::HttpStatus(503)));
    let message = repo.get(1).unwrap().error_message.unwrap();
    assert!(message.contains("503"));
}

#[tokio::test]
async fn test_process_skips_record_claimed_elsewhere() {
    let repo = InMemoryRepository::with_urls(&[]);
    repo.insert(
        DomainRecord::pending(1, "https://taken.example.com")
            .start()
            .unwrap(),
    );
    let fetcher = Arc::new(ScriptedFetcher::new().body("https://taken.example.com", PAGE));
    let processor = processor(repo.clone(), fetcher.clone(), signal_config(&["react"], &[], 5));

    let outcome = processor
        .process(DomainRecord::pending(1, "https://taken.example.com"))
        .await
        .unwrap();

    assert_eq!(outcome, ItemOutcome::Skipped);
    assert_eq!(fetcher.calls(), 0);
    assert_eq!(repo.get(1).unwrap().status, RecordStatus::InProgress);
}

#[tokio::test]
async fn test_process_skips_missing_record() {
    let repo = InMemoryRepository::with_urls(&[]);
    let fetcher = Arc::new(ScriptedFetcher::new());
    let processor = processor(repo, fetcher.clone(), signal_config(&[], &[], 5));

    let outcome = processor
        .process(DomainRecord::pending(42, "https://gone.example.com"))
        .await
        .unwrap();

    assert_eq!(outcome, ItemOutcome::Skipped);
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_process_commit_failure_leaves_record_in_progress() {
    let repo = InMemoryRepository::with_urls(&["https://shop.example.com"]);
    let fetcher = Arc::new(ScriptedFetcher::new().body("https://shop.example.com", PAGE));
    let processor = processor(repo.clone(), fetcher, signal_config(&["react"], &[], 5));
    repo.set_fail_commits(true);

    let result = processor
        .process(DomainRecord::pending(1, "https://shop.example.com"))
        .await;

    assert!(matches!(result, Err(ProcessError::Commit { id: 1, .. })));
    assert_eq!(repo.get(1).unwrap().status, RecordStatus::InProgress);
}

#[tokio::test]
async fn test_process_is_independent_of_previous_failures() {
    let repo = InMemoryRepository::with_urls(&["https://a.example.com", "https://b.example.com"]);
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .respond(
                "https://a.example.com",
                Scripted::Fail(FetchError::connection_failed("connection refused")),
            )
            .body("https://b.example.com", "mail ops@b.example.com"),
    );
    let processor = processor(repo.clone(), fetcher, signal_config(&[], &[], 5));

    let first = processor
        .process(DomainRecord::pending(1, "https://a.example.com"))
        .await
        .unwrap();
    let second = processor
        .process(DomainRecord::pending(2, "https://b.example.com"))
        .await
        .unwrap();

    assert_eq!(first, ItemOutcome::Failed(FetchErrorKind::ConnectionFailed));
    assert_eq!(second, ItemOutcome::Done { matched: true });
    assert_eq!(repo.get(1).unwrap().status, RecordStatus::Failed);
    assert_eq!(repo.get(2).unwrap().status, RecordStatus::Done);
}
