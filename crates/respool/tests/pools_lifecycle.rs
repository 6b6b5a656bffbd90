//! End-to-end lifecycle test for the composed pooling layer.

use std::time::Duration;

use serde_json::json;

use respool::{InitError, PoolConfig, Pools, SessionConfig, SessionData};
use respool_testing::StubConnector;

#[tokio::test]
async fn initialize_use_and_tear_down() {
    let pools: Pools<StubConnector, serde_json::Value> = Pools::initialize(
        StubConnector::new(),
        PoolConfig::new()
            .max_connections(2)
            .connection_timeout(Duration::from_millis(200)),
        SessionConfig::new().max_entries(10),
    )
    .await
    .unwrap();

    let id = pools
        .connections()
        .with_connection(|client| async move { Ok(client.id) })
        .await
        .unwrap();
    assert_eq!(id, 0);

    pools.sessions().store(SessionData {
        user_id: "u1".to_string(),
        email: "u1@example.com".to_string(),
        role: "ADMIN".to_string(),
        profile: json!({"plan": "pro"}),
    });
    assert_eq!(pools.sessions().get("u1").unwrap().role, "ADMIN");

    pools.shutdown();
    pools.shutdown();

    assert_eq!(pools.connections().stats().total, 0);
    assert_eq!(pools.sessions().stats().size, 0);
}

#[tokio::test]
async fn initialize_propagates_connect_failure() {
    let result: Result<Pools<StubConnector, ()>, InitError> = Pools::initialize(
        StubConnector::new().fail_next(1),
        PoolConfig::new().max_connections(1),
        SessionConfig::new(),
    )
    .await;

    assert!(matches!(result, Err(InitError::Connection(_))));
}
