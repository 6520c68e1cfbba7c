// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{scheduler, InMemoryRepository, Scripted, ScriptedFetcher};
use signalscan::domain::models::domain_record::RecordStatus;
use signalscan::workers::batch_scheduler::{BatchOutcome, BatchSummary};
use signalscan::workers::Worker;
use std::sync::Arc;
use std::time::Duration;

fn urls(count: usize) -> Vec<String> {
    (1..=count)
        .map(|i| format!("https://site{}.example.com", i))
        .collect()
}

fn fetcher_for(urls: &[String], delay: Duration) -> ScriptedFetcher {
    urls.iter().fold(ScriptedFetcher::with_delay(delay), |f, url| {
        f.body(url, "<html>built with React</html>")
    })
}

fn repo_for(urls: &[String]) -> Arc<InMemoryRepository> {
    let refs: Vec<&str> = urls.iter().map(String::as_str).collect();
    InMemoryRepository::with_urls(&refs)
}

#[tokio::test]
async fn test_run_once_drains_backlog_in_batches() {
    let urls = urls(7);
    let repo = repo_for(&urls);
    let fetcher = Arc::new(fetcher_for(&urls, Duration::ZERO));
    let scheduler = scheduler(repo.clone(), fetcher, 5);

    let first = scheduler.run_once().await;
    assert_eq!(
        first,
        BatchOutcome::Processed(BatchSummary {
            succeeded: 5,
            ..Default::default()
        })
    );

    // The next round claims immediately without waiting for the idle interval
    let second = scheduler.run_once().await;
    assert_eq!(
        second,
        BatchOutcome::Processed(BatchSummary {
            succeeded: 2,
            ..Default::default()
        })
    );

    assert_eq!(scheduler.run_once().await, BatchOutcome::Idle);
    assert!(repo.statuses().iter().all(|s| *s == RecordStatus::Done));
    assert_eq!(repo.claim_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_run_idles_between_empty_polls() {
    let repo = InMemoryRepository::with_urls(&[]);
    let fetcher = Arc::new(ScriptedFetcher::new());
    let scheduler = Arc::new(scheduler(repo.clone(), fetcher.clone(), 5));

    let handle = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run().await })
    };

    // Polls at t=0, t=10 and t=20
    tokio::time::sleep(Duration::from_secs(25)).await;
    handle.abort();

    assert_eq!(repo.claim_calls(), 3);
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_does_not_affect_siblings() {
    let urls = urls(3);
    let repo = repo_for(&urls);
    let fetcher = Arc::new(fetcher_for(&urls, Duration::ZERO).respond(&urls[1], Scripted::Hang));
    let scheduler = scheduler(repo.clone(), fetcher, 5);

    let outcome = scheduler.run_once().await;

    assert_eq!(
        outcome,
        BatchOutcome::Processed(BatchSummary {
            succeeded: 2,
            failed: 1,
            ..Default::default()
        })
    );
    assert_eq!(repo.get(1).unwrap().status, RecordStatus::Done);
    assert_eq!(repo.get(2).unwrap().status, RecordStatus::Failed);
    assert!(repo
        .get(2)
        .unwrap()
        .error_message
        .unwrap()
        .starts_with("timeout"));
    assert_eq!(repo.get(3).unwrap().status, RecordStatus::Done);
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_never_exceeds_batch_size() {
    let urls = urls(12);
    let repo = repo_for(&urls);
    let fetcher = Arc::new(fetcher_for(&urls, Duration::from_millis(100)));
    let scheduler = scheduler(repo.clone(), fetcher.clone(), 4);

    let mut processed = 0;
    while let BatchOutcome::Processed(summary) = scheduler.run_once().await {
        assert!(summary.total() <= 4);
        processed += summary.total();
    }

    assert_eq!(processed, 12);
    assert_eq!(fetcher.calls(), 12);
    assert!(fetcher.max_in_flight() <= 4);
    assert!(fetcher.max_in_flight() > 1);
}

#[tokio::test]
async fn test_claim_error_is_treated_as_idle_round() {
    let urls = urls(2);
    let repo = repo_for(&urls);
    let fetcher = Arc::new(fetcher_for(&urls, Duration::ZERO));
    let scheduler = scheduler(repo.clone(), fetcher.clone(), 5);

    repo.set_fail_claims(true);
    assert_eq!(scheduler.run_once().await, BatchOutcome::Idle);
    assert_eq!(fetcher.calls(), 0);

    // Recovers once the store is reachable again
    repo.set_fail_claims(false);
    assert!(matches!(
        scheduler.run_once().await,
        BatchOutcome::Processed(BatchSummary { succeeded: 2, .. })
    ));
}

#[tokio::test]
async fn test_commit_errors_are_counted_not_fatal() {
    let urls = urls(2);
    let repo = repo_for(&urls);
    let fetcher = Arc::new(fetcher_for(&urls, Duration::ZERO));
    let scheduler = scheduler(repo.clone(), fetcher, 5);
    repo.set_fail_commits(true);

    let outcome = scheduler.run_once().await;

    assert_eq!(
        outcome,
        BatchOutcome::Processed(BatchSummary {
            errored: 2,
            ..Default::default()
        })
    );
    assert!(repo
        .statuses()
        .iter()
        .all(|s| *s == RecordStatus::InProgress));
}

#[tokio::test(start_paused = true)]
async fn test_run_reclaims_without_waiting_after_a_batch() {
    let urls = urls(7);
    let repo = repo_for(&urls);
    let fetcher = Arc::new(fetcher_for(&urls, Duration::ZERO));
    let scheduler = Arc::new(scheduler(repo.clone(), fetcher.clone(), 5));
    let start = tokio::time::Instant::now();

    let handle = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run().await })
    };

    // Two full rounds and the first empty poll, all before the clock moves
    while repo.claim_calls() < 3 {
        tokio::task::yield_now().await;
    }
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(fetcher.calls(), 7);

    tokio::time::sleep(Duration::from_secs(5)).await;
    handle.abort();

    assert_eq!(repo.claim_calls(), 3);
    assert!(repo.statuses().iter().all(|s| *s == RecordStatus::Done));
}

#[tokio::test(start_paused = true)]
async fn test_run_backs_off_when_no_record_can_be_claimed() {
    let urls = urls(1);
    let repo = repo_for(&urls);
    let fetcher = Arc::new(fetcher_for(&urls, Duration::ZERO));
    let scheduler = Arc::new(scheduler(repo.clone(), fetcher.clone(), 5));
    repo.set_fail_marks(true);

    let handle = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run().await })
    };

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(repo.claim_calls(), 1);

    // One retry per idle interval
    tokio::time::sleep(Duration::from_secs(25)).await;
    handle.abort();

    assert_eq!(repo.claim_calls(), 3);
    assert_eq!(fetcher.calls(), 0);
    assert_eq!(repo.get(1).unwrap().status, RecordStatus::Pending);
}

#[tokio::test]
async fn test_claim_failures_report_no_progress() {
    let urls = urls(3);
    let repo = repo_for(&urls);
    let fetcher = Arc::new(fetcher_for(&urls, Duration::ZERO));
    let scheduler = scheduler(repo.clone(), fetcher, 5);
    repo.set_fail_marks(true);

    match scheduler.run_once().await {
        BatchOutcome::Processed(summary) => {
            assert_eq!(summary.errored, 3);
            assert!(summary.made_no_progress());
        }
        BatchOutcome::Idle => panic!("expected a processed batch"),
    }
}

#[test]
fn test_worker_name() {
    let repo = InMemoryRepository::with_urls(&[]);
    let scheduler = scheduler(repo, Arc::new(ScriptedFetcher::new()), 5);
    assert_eq!(Worker::name(&scheduler), "batch_scheduler");
}
