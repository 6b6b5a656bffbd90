//! Behavioral tests for the connection pool: occupancy bounds, FIFO handoff,
//! leak-freedom, fault replacement, timeouts and shutdown.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use respool_conn::{Pool, PoolConfig, PoolError};
use respool_testing::StubConnector;

fn fast_config(max: usize) -> PoolConfig {
    PoolConfig::new()
        .max_connections(max)
        .connection_timeout(Duration::from_millis(200))
        .retry_attempts(3)
        .retry_base_delay(Duration::from_millis(1))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn at_most_max_connections_active() {
    let pool = Pool::initialize(fast_config(2), StubConnector::new())
        .await
        .unwrap();

    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let pool = pool.clone();
        let in_flight = Arc::clone(&in_flight);
        let peak = Arc::clone(&peak);
        tasks.push(tokio::spawn(async move {
            pool.with_connection(|_client| {
                let in_flight = Arc::clone(&in_flight);
                let peak = Arc::clone(&peak);
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await
            .unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert!(peak.load(Ordering::SeqCst) <= 2);

    let stats = pool.stats();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.active, 0);
    assert_eq!(stats.idle, 2);
}

#[tokio::test]
async fn waiters_are_served_in_fifo_order() {
    let pool = Pool::initialize(
        fast_config(1).connection_timeout(Duration::from_secs(5)),
        StubConnector::new(),
    )
    .await
    .unwrap();

    let held = pool.acquire().await.unwrap();
    let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

    let mut tasks = Vec::new();
    for tag in ["first", "second", "third"] {
        let pool = pool.clone();
        let order = Arc::clone(&order);
        tasks.push(tokio::spawn(async move {
            let conn = pool.acquire().await.unwrap();
            order.lock().push(tag);
            drop(conn);
        }));
        // Let this waiter enqueue before spawning the next.
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    drop(held);
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(*order.lock(), vec!["first", "second", "third"]);
}

#[tokio::test]
async fn failed_operations_never_leak_the_connection() {
    let pool = Pool::initialize(fast_config(1), StubConnector::new())
        .await
        .unwrap();

    let result: Result<(), PoolError> = pool
        .with_connection(|_client| async move { Err("backend unavailable".into()) })
        .await;

    match result {
        Err(PoolError::OperationFailed { attempts, .. }) => assert_eq!(attempts, 3),
        other => panic!("expected OperationFailed, got {other:?}"),
    }

    // All three failed attempts released their lease: the single slot must
    // be immediately acquirable again.
    let conn = pool.acquire().await.unwrap();
    drop(conn);

    let stats = pool.stats();
    assert_eq!(stats.idle, 1);
    assert_eq!(stats.total_errors, 3);
}

#[tokio::test]
async fn fault_threshold_replaces_the_connection() {
    let connector = StubConnector::new();
    let pool = Pool::initialize(
        fast_config(1).retry_attempts(2).fault_threshold(2),
        connector,
    )
    .await
    .unwrap();

    let result: Result<(), PoolError> = pool
        .with_connection(|_client| async move { Err("boom".into()) })
        .await;
    assert!(matches!(result, Err(PoolError::OperationFailed { .. })));

    // Two failures crossed the threshold: the slot now holds a replacement
    // client with a fresh handle id and a reset error count.
    let id = pool
        .with_connection(|client| async move { Ok(client.id) })
        .await
        .unwrap();
    assert_eq!(id, 1);
}

#[tokio::test]
async fn exhausted_pool_times_out_and_forgets_the_waiter() {
    let pool = Pool::initialize(
        fast_config(1).connection_timeout(Duration::from_millis(50)),
        StubConnector::new(),
    )
    .await
    .unwrap();

    let held = pool.acquire().await.unwrap();

    let result = pool.acquire().await;
    assert!(matches!(result, Err(PoolError::AcquireTimeout { .. })));
    assert_eq!(pool.stats().waiting, 0);

    // The timed-out entry was removed, so the release must leave the slot
    // idle instead of resolving a stale waiter.
    drop(held);
    let stats = pool.stats();
    assert_eq!(stats.idle, 1);
    assert_eq!(stats.active, 0);

    let conn = pool.acquire().await.unwrap();
    drop(conn);
}

#[tokio::test]
async fn shutdown_rejects_pending_waiters() {
    let pool = Pool::initialize(
        fast_config(1).connection_timeout(Duration::from_secs(5)),
        StubConnector::new(),
    )
    .await
    .unwrap();

    let held = pool.acquire().await.unwrap();

    let waiter = {
        let pool = pool.clone();
        tokio::spawn(async move { pool.acquire().await.map(drop) })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    pool.shutdown();
    assert!(matches!(waiter.await.unwrap(), Err(PoolError::Shutdown)));

    drop(held);
    assert!(matches!(pool.acquire().await, Err(PoolError::Shutdown)));
}

#[tokio::test]
async fn shutdown_is_idempotent() {
    let pool = Pool::initialize(fast_config(2), StubConnector::new())
        .await
        .unwrap();

    pool.shutdown();
    pool.shutdown();

    assert!(pool.is_closed());
    let stats = pool.stats();
    assert_eq!(stats.total, 0);
    assert_eq!(stats.active, 0);
    assert_eq!(stats.waiting, 0);
}

#[tokio::test]
async fn initialize_fails_fast_on_connect_error() {
    let connector = StubConnector::new().fail_next(1);
    let result = Pool::initialize(fast_config(2), connector).await;
    assert!(matches!(result, Err(PoolError::Connect(_))));
}

#[tokio::test]
async fn initialize_rejects_invalid_config() {
    let result = Pool::initialize(fast_config(0), StubConnector::new()).await;
    assert!(matches!(result, Err(PoolError::Config(_))));
}
