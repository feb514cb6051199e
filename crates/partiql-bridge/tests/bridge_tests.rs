//! Integration tests for the engine bridge, driven against the stub engine.
//!
//! Covers the worker connection lifecycle, crash recovery in the dispatcher,
//! mode selection, and both one-shot command lines.

use std::sync::Arc;

use partiql_bridge::{
    BridgeError, DispatchMode, Dispatcher, EngineCommand, OneShotExecutor, QueryRequest,
    WorkerConnection,
};

// ─────────────────────── helpers ───────────────────────

fn stub_engine() -> EngineCommand {
    EngineCommand::new(env!("CARGO_BIN_EXE_partiql-stub-engine"))
}

/// A worker that answers every request with `text`.
fn canned_worker(text: &str) -> EngineCommand {
    stub_engine().arg("--respond").arg(text)
}

/// A worker that exits after answering `n` requests.
fn crashing_worker(n: u64) -> EngineCommand {
    stub_engine().arg("--exit-after").arg(n.to_string())
}

fn request(query: &str, environment: &str) -> QueryRequest {
    QueryRequest::new(query, environment)
}

// ═══════════════════════════════════════════════════════
// WORKER CONNECTION
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_worker_canned_response() {
    let mut connection = WorkerConnection::start(&canned_worker("1")).unwrap();
    assert!(connection.pid().is_some());

    let result = connection.execute(&request("SELECT 1", "{}")).await.unwrap();
    assert!(result.contains('1'));
    assert_eq!(connection.requests_served(), 1);

    connection.close().await.unwrap();
}

#[tokio::test]
async fn test_worker_serves_many_requests_on_one_process() {
    let mut connection = WorkerConnection::start(&stub_engine()).unwrap();
    let pid = connection.pid();

    for i in 0..5 {
        let query = format!("SELECT {i} FROM t");
        let env = format!("{{ 't': [{i}] }}");
        let result = connection.execute(&request(&query, &env)).await.unwrap();
        assert_eq!(result, format!("query: {query}\nenvironment: {env}"));
    }

    assert_eq!(connection.pid(), pid);
    assert_eq!(connection.requests_served(), 5);
    connection.close().await.unwrap();
}

#[tokio::test]
async fn test_worker_multibyte_and_empty_payloads() {
    let mut connection = WorkerConnection::start(&stub_engine()).unwrap();

    let result = connection
        .execute(&request("SELECT '世界 — ünïcode'", ""))
        .await
        .unwrap();
    assert_eq!(result, "query: SELECT '世界 — ünïcode'\nenvironment: ");

    connection.close().await.unwrap();
}

#[tokio::test]
async fn test_worker_engine_error_is_ordinary_response() {
    let mut connection = WorkerConnection::start(&stub_engine()).unwrap();

    let result = connection.execute(&request("!fail SELEC", "{}")).await.unwrap();
    assert!(result.starts_with("Execution error:"));

    // The connection is still healthy.
    assert!(!connection.is_poisoned());
    let result = connection.execute(&request("SELECT 2", "{}")).await.unwrap();
    assert!(result.contains("SELECT 2"));

    connection.close().await.unwrap();
}

#[tokio::test]
async fn test_worker_exit_poisons_connection() {
    let mut connection = WorkerConnection::start(&crashing_worker(1)).unwrap();

    connection.execute(&request("SELECT 1", "{}")).await.unwrap();

    let err = connection.execute(&request("SELECT 2", "{}")).await.unwrap_err();
    assert!(matches!(err, BridgeError::Protocol(_)));
    assert!(connection.is_poisoned());

    // Stub exited cleanly; close still reaps it.
    connection.close().await.unwrap();
}

// ═══════════════════════════════════════════════════════
// DISPATCHER
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_dispatch_canned_worker_response() {
    let dispatcher = Dispatcher::connect(DispatchMode::Worker(canned_worker("1")))
        .await
        .unwrap();

    let result = dispatcher.execute(&request("SELECT 1", "{}")).await.unwrap();
    assert!(result.contains('1'));

    dispatcher.shutdown().await;
    assert!(!dispatcher.has_worker().await);
}

#[tokio::test]
async fn test_dispatch_recovers_after_worker_crash() {
    let dispatcher = Dispatcher::connect(DispatchMode::Worker(crashing_worker(1)))
        .await
        .unwrap();

    let first = dispatcher.execute(&request("SELECT 1", "{}")).await.unwrap();
    assert!(first.contains("SELECT 1"));

    // The worker exited after the first response.
    let err = dispatcher.execute(&request("SELECT 2", "{}")).await.unwrap_err();
    assert!(matches!(err, BridgeError::Protocol(_)));

    // Recovery already happened; the third request hits a fresh worker.
    assert!(dispatcher.has_worker().await);
    let third = dispatcher.execute(&request("SELECT 3", "{}")).await.unwrap();
    assert!(third.contains("SELECT 3"));

    let stats = dispatcher.stats();
    assert_eq!(stats.requests, 3);
    assert_eq!(stats.worker_starts, 2);
    assert_eq!(stats.worker_failures, 1);
    assert_eq!(stats.one_shot_runs, 0);

    dispatcher.shutdown().await;
}

#[tokio::test]
async fn test_dispatch_healthy_worker_never_spawns_per_request() {
    let dispatcher = Dispatcher::connect(DispatchMode::Worker(stub_engine()))
        .await
        .unwrap();

    for i in 0..4 {
        let query = format!("SELECT {i}");
        let result = dispatcher.execute(&request(&query, "{}")).await.unwrap();
        assert!(result.contains(&query));
    }

    let stats = dispatcher.stats();
    assert_eq!(stats.requests, 4);
    assert_eq!(stats.worker_starts, 1);
    assert_eq!(stats.worker_failures, 0);
    assert_eq!(stats.one_shot_runs, 0);

    dispatcher.shutdown().await;
}

#[tokio::test]
async fn test_dispatch_lazy_worker_starts_on_first_request() {
    let dispatcher = Dispatcher::new(DispatchMode::Worker(stub_engine()));
    assert!(!dispatcher.has_worker().await);

    let result = dispatcher.execute(&request("SELECT 1", "{}")).await.unwrap();
    assert!(result.contains("SELECT 1"));
    assert!(dispatcher.has_worker().await);
    assert_eq!(dispatcher.stats().worker_starts, 1);

    dispatcher.shutdown().await;
}

#[tokio::test]
async fn test_dispatch_concurrent_requests_are_serialized() {
    let dispatcher = Arc::new(
        Dispatcher::connect(DispatchMode::Worker(stub_engine()))
            .await
            .unwrap(),
    );

    let mut handles = Vec::new();
    for i in 0..16 {
        let dispatcher = Arc::clone(&dispatcher);
        handles.push(tokio::spawn(async move {
            let query = format!("SELECT {i} AS n");
            let env = format!("{{ 'n': {i} }}");
            let result = dispatcher.execute(&request(&query, &env)).await.unwrap();
            assert_eq!(result, format!("query: {query}\nenvironment: {env}"));
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let stats = dispatcher.stats();
    assert_eq!(stats.requests, 16);
    assert_eq!(stats.worker_starts, 1);
    dispatcher.shutdown().await;
}

// ═══════════════════════════════════════════════════════
// ONE-SHOT
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_oneshot_new_cli_routes_every_request() {
    let dispatcher = Dispatcher::new(DispatchMode::OneShot(OneShotExecutor::new_cli(
        stub_engine(),
    )));

    for i in 0..3 {
        let query = format!("SELECT {i}");
        let result = dispatcher
            .execute(&request(&query, "{ 'a': 1 }"))
            .await
            .unwrap();
        assert!(result.contains(&query));
        assert!(result.contains("{ 'a': 1 }"));
    }

    let stats = dispatcher.stats();
    assert_eq!(stats.one_shot_runs, 3);
    assert_eq!(stats.worker_starts, 0);
    assert!(!dispatcher.has_worker().await);
}

#[tokio::test]
async fn test_oneshot_original_cli_with_classpath() {
    let executor = OneShotExecutor::original(stub_engine(), Some("lib/*".to_string()));

    // The tutorial query starts with a comment, i.e. a leading `--`.
    let query = "-- query from the PartiQL tutorial\nSELECT e.name FROM hr.employees e";
    let result = executor
        .execute(&request(query, "{ 'hr': { 'employees': <<>> } }"))
        .await
        .unwrap();

    assert!(result.contains("SELECT e.name FROM hr.employees e"));
    assert!(result.contains("'employees': <<>>"));
}

#[tokio::test]
async fn test_oneshot_engine_failure_carries_diagnostics() {
    for executor in [
        OneShotExecutor::new_cli(stub_engine()),
        OneShotExecutor::original(stub_engine(), None),
    ] {
        let err = executor
            .execute(&request("!fail SELEC", "{}"))
            .await
            .unwrap_err();

        let BridgeError::Execution(e) = err else {
            panic!("expected execution error from {} CLI", executor.variant_name());
        };
        assert!(e.output().contains("syntax error"));
        assert!(e.cause().unwrap().to_string().contains("exit"));
    }
}

#[tokio::test]
async fn test_oneshot_large_payload_does_not_deadlock() {
    // Larger than a pipe buffer in both directions.
    let environment = format!("{{ 'blob': '{}' }}", "x".repeat(256 * 1024));
    let query = format!("SELECT '{}'", "q".repeat(256 * 1024));

    let executor = OneShotExecutor::new_cli(stub_engine());
    let result = executor.execute(&request(&query, &environment)).await.unwrap();
    assert!(result.len() > 512 * 1024);
}
