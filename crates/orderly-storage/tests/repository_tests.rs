// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end save behaviour against real SQLite files.

use std::sync::Arc;
use std::time::Duration;

use orderly_config::RetryConfig;
use orderly_core::{Order, OrderError, OrderRepository};
use orderly_storage::SqliteOrderRepository;
use orderly_test_utils::{
    Fault, FaultInjectingFactory, FaultKind, FaultStep, NullConnectionFactory, RecordingObserver,
    TestStore,
};
use tokio_util::sync::CancellationToken;

const TIMEOUT: Duration = Duration::from_secs(2);

fn widget_order() -> Order {
    Order::new("Alice", "Widget", 3, 12.99)
}

async fn store() -> TestStore {
    TestStore::new().await.expect("temp store")
}

fn faulty(store: &TestStore, faults: &[Fault]) -> FaultInjectingFactory {
    faults
        .iter()
        .fold(FaultInjectingFactory::new(store.source().clone()), |f, fault| {
            f.with_fault(*fault)
        })
}

fn cancel_after(delay: Duration) -> CancellationToken {
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        canceller.cancel();
    });
    token
}

#[tokio::test]
async fn saves_exactly_one_row() {
    let store = store().await;
    let repo = SqliteOrderRepository::from_config(
        &store.storage_config(),
        &RetryConfig {
            max_retries: 3,
            base_delay_ms: 1,
        },
    )
    .unwrap();

    let id = repo.save(&widget_order()).await.unwrap();

    let rows = store.orders().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id);
    assert_eq!(rows[0].order, widget_order());
}

#[tokio::test]
async fn null_factory_is_configuration_without_retries() {
    let store = store().await;
    let observer = Arc::new(RecordingObserver::new());
    let repo = store
        .repository(Arc::new(NullConnectionFactory), 3, TIMEOUT)
        .with_observer(observer.clone());

    let err = repo.save(&widget_order()).await.unwrap_err();

    assert!(matches!(err, OrderError::Configuration(_)), "{err:?}");
    assert_eq!(observer.count(), 0);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn transient_failures_within_budget_succeed() {
    let store = store().await;
    let factory = Arc::new(faulty(
        &store,
        &[Fault::new(FaultStep::Insert, FaultKind::Busy, 2)],
    ));
    let observer = Arc::new(RecordingObserver::new());
    let repo = store
        .repository(factory.clone(), 3, TIMEOUT)
        .with_observer(observer.clone());

    repo.save(&widget_order()).await.unwrap();

    let events = observer.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].attempt, 1);
    assert_eq!(events[1].attempt, 2);
    assert!(events[1].delay > events[0].delay);
    assert!(events[0].cause.contains("database is locked"));
    assert_eq!(factory.connections_created(), 3);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn failure_between_insert_and_commit_leaves_nothing() {
    let store = store().await;
    let factory = Arc::new(faulty(
        &store,
        &[Fault::always(FaultStep::AfterInsert, FaultKind::Constraint)],
    ));
    let repo = store.repository(factory.clone(), 3, TIMEOUT);

    let err = repo.save(&widget_order()).await.unwrap_err();

    assert!(matches!(err, OrderError::FatalStorage { .. }), "{err:?}");
    assert_eq!(factory.connections_created(), 1);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn retries_exhausted_after_budget() {
    let store = store().await;
    let factory = Arc::new(faulty(
        &store,
        &[Fault::always(FaultStep::Commit, FaultKind::Busy)],
    ));
    let observer = Arc::new(RecordingObserver::new());
    let repo = store
        .repository(factory.clone(), 2, TIMEOUT)
        .with_observer(observer.clone());

    let err = repo.save(&widget_order()).await.unwrap_err();

    match err {
        OrderError::RetryExhausted { attempts, source } => {
            assert_eq!(attempts, 3);
            assert!(source.to_string().contains("commit"), "{source}");
        }
        other => panic!("expected RetryExhausted, got {other:?}"),
    }
    assert_eq!(observer.count(), 2);
    assert_eq!(factory.connections_created(), 3);
    assert_eq!(factory.live_connections(), 0);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn fatal_failure_is_not_retried() {
    let store = store().await;
    let factory = Arc::new(faulty(
        &store,
        &[Fault::new(FaultStep::Insert, FaultKind::Constraint, 1)],
    ));
    let observer = Arc::new(RecordingObserver::new());
    let repo = store
        .repository(factory.clone(), 3, TIMEOUT)
        .with_observer(observer.clone());

    let err = repo.save(&widget_order()).await.unwrap_err();

    assert!(matches!(err, OrderError::FatalStorage { .. }), "{err:?}");
    assert_eq!(observer.count(), 0);
    assert_eq!(factory.connections_created(), 1);
}

#[tokio::test]
async fn check_constraint_from_sqlite_is_fatal() {
    let store = store().await;
    let factory = Arc::new(faulty(&store, &[]));
    let repo = store.repository(factory.clone(), 3, TIMEOUT);

    let err = repo
        .save(&Order::new("Alice", "Widget", -1, 12.99))
        .await
        .unwrap_err();

    match err {
        OrderError::FatalStorage { source } => {
            assert!(source.to_string().contains("CHECK constraint failed"), "{source}");
        }
        other => panic!("expected FatalStorage, got {other:?}"),
    }
    assert_eq!(factory.connections_created(), 1);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn disconnect_before_commit_is_retried() {
    let store = store().await;
    let factory = Arc::new(faulty(
        &store,
        &[Fault::new(FaultStep::Open, FaultKind::Disconnect, 1)],
    ));
    let repo = store.repository(factory.clone(), 1, TIMEOUT);

    repo.save(&widget_order()).await.unwrap();

    assert_eq!(factory.connections_created(), 2);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn stalled_step_times_out_and_retries() {
    let store = store().await;
    let factory = Arc::new(faulty(
        &store,
        &[Fault::new(FaultStep::Insert, FaultKind::Stall, 1)],
    ));
    let observer = Arc::new(RecordingObserver::new());
    let repo = store
        .repository(factory.clone(), 2, Duration::from_millis(50))
        .with_observer(observer.clone());

    repo.save(&widget_order()).await.unwrap();

    let events = observer.events();
    assert_eq!(events.len(), 1);
    assert!(events[0].cause.contains("timed out"), "{}", events[0].cause);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn lost_commit_acknowledgement_is_not_retried() {
    let store = store().await;
    let factory = Arc::new(faulty(
        &store,
        &[Fault::always(FaultStep::Commit, FaultKind::Stall)],
    ));
    let repo = store.repository(factory.clone(), 3, Duration::from_millis(50));

    let err = repo.save(&widget_order()).await.unwrap_err();

    match err {
        OrderError::FatalStorage { source } => {
            assert!(source.to_string().starts_with("commit outcome unknown"), "{source}");
        }
        other => panic!("expected FatalStorage, got {other:?}"),
    }
    assert_eq!(factory.connections_created(), 1);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn cancellation_releases_connection_and_commits_nothing() {
    let store = store().await;
    let factory = Arc::new(faulty(
        &store,
        &[Fault::always(FaultStep::AfterInsert, FaultKind::Stall)],
    ));
    let repo = store.repository(factory.clone(), 3, Duration::from_secs(30));

    let token = cancel_after(Duration::from_millis(50));
    let err = repo.save_with_cancel(&widget_order(), &token).await.unwrap_err();

    assert!(matches!(err, OrderError::Cancelled), "{err:?}");
    assert_eq!(factory.live_connections(), 0);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn cancellation_after_commit_sent_is_not_reported_as_cancelled() {
    let store = store().await;
    let factory = Arc::new(faulty(
        &store,
        &[Fault::always(FaultStep::AfterCommit, FaultKind::Stall)],
    ));
    let repo = store.repository(factory.clone(), 3, Duration::from_secs(30));

    let token = cancel_after(Duration::from_millis(100));
    let err = repo.save_with_cancel(&widget_order(), &token).await.unwrap_err();

    match err {
        OrderError::FatalStorage { source } => {
            assert!(source.to_string().starts_with("commit outcome unknown"), "{source}");
        }
        other => panic!("expected FatalStorage, got {other:?}"),
    }
    assert_eq!(factory.connections_created(), 1);
    assert_eq!(factory.live_connections(), 0);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn cancellation_after_acknowledged_commit_returns_id() {
    let store = store().await;
    let factory = Arc::new(faulty(
        &store,
        &[Fault::always(FaultStep::Close, FaultKind::Stall)],
    ));
    let repo = store.repository(factory.clone(), 3, Duration::from_secs(30));

    let token = cancel_after(Duration::from_millis(100));
    let id = repo.save_with_cancel(&widget_order(), &token).await.unwrap();

    let rows = store.orders().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id);
    assert_eq!(factory.live_connections(), 0);
}

#[tokio::test]
async fn stalled_close_does_not_hold_up_save() {
    let store = store().await;
    let factory = Arc::new(faulty(
        &store,
        &[Fault::always(FaultStep::Close, FaultKind::Stall)],
    ));
    let repo = store.repository(factory.clone(), 3, Duration::from_millis(50));

    let saved = tokio::time::timeout(TIMEOUT, repo.save(&widget_order())).await;

    assert!(matches!(saved, Ok(Ok(_))), "{saved:?}");
    assert_eq!(factory.connections_created(), 1);
    assert_eq!(factory.live_connections(), 0);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn already_cancelled_token_saves_nothing() {
    let store = store().await;
    let factory = Arc::new(faulty(&store, &[]));
    let repo = store.repository(factory.clone(), 3, TIMEOUT);

    let token = CancellationToken::new();
    token.cancel();
    let err = repo.save_with_cancel(&widget_order(), &token).await.unwrap_err();

    assert!(matches!(err, OrderError::Cancelled));
    assert_eq!(factory.connections_created(), 0);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn connections_released_on_success_and_failure() {
    let store = store().await;
    let factory = Arc::new(faulty(
        &store,
        &[Fault::new(FaultStep::Begin, FaultKind::Constraint, 1)],
    ));
    let repo = store.repository(factory.clone(), 0, TIMEOUT);

    assert!(repo.save(&widget_order()).await.is_err());
    assert_eq!(factory.live_connections(), 0);

    repo.save(&widget_order()).await.unwrap();
    assert_eq!(factory.live_connections(), 0);
    assert_eq!(factory.connections_created(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_saves_each_commit() {
    let store = store().await;
    let repo = Arc::new(
        SqliteOrderRepository::from_config(
            &store.storage_config(),
            &RetryConfig {
                max_retries: 5,
                base_delay_ms: 5,
            },
        )
        .unwrap(),
    );

    let saves = (0..4).map(|i| {
        let repo = Arc::clone(&repo);
        tokio::spawn(async move {
            repo.save(&Order::new(format!("Customer {i}"), "Gadget", 1, 15.49))
                .await
        })
    });
    for handle in saves.collect::<Vec<_>>() {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(store.count().await.unwrap(), 4);
}
