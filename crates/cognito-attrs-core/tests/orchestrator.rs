mod common;

use cognito_attrs_core::{AttributeSpec, GatewayError, MemoryLogSink, ProviderStage, RunOptions, run};
use common::{Call, FakeGateway, mapping};
use serde_json::json;

const POOL: &str = "us-east-1_pool";
const CLIENT: &str = "client-1";

fn gateway() -> FakeGateway {
    FakeGateway::new(&[("UserPoolId", POOL), ("UserPoolClientId", CLIENT)])
}

#[tokio::test]
async fn converged_pool_issues_no_mutations() {
    let gateway = gateway()
        .with_pool(POOL, &["custom:another"])
        .with_client(POOL, CLIENT, &["custom:another"], &["custom:another"]);
    let log = MemoryLogSink::new();
    let raw = mapping("UserPoolId", Some("UserPoolClientId"), &["another"]);

    let summary = run(&gateway, &raw, &log, RunOptions::default()).await.unwrap();

    assert_eq!(summary.entries.len(), 1);
    assert_eq!(summary.changed_entries(), 0);
    assert!(gateway.mutating_calls().is_empty());
    assert_eq!(log.lines().first().map(String::as_str), Some("Start"));
    assert_eq!(log.lines().last().map(String::as_str), Some("End"));
}

#[tokio::test]
async fn empty_pool_and_client_get_one_call_each() {
    let gateway = gateway()
        .with_pool(POOL, &[])
        .with_client(POOL, CLIENT, &[], &[]);
    let log = MemoryLogSink::new();
    let raw = json!([{
        "CognitoUserPoolIdOutputKey": "UserPoolId",
        "CognitoUserPoolClientIdOutputKey": "UserPoolClientId",
        "CustomAttributes": [{ "Name": "foo" }]
    }]);

    run(&gateway, &raw, &log, RunOptions::default()).await.unwrap();

    let mutating = gateway.mutating_calls();
    assert_eq!(mutating.len(), 2);
    assert_eq!(
        mutating[0],
        Call::AddAttributes(POOL.to_string(), vec![AttributeSpec::new("foo")])
    );
    let Call::UpdateClient(update) = &mutating[1] else {
        panic!("expected UpdateClient, got {:?}", mutating[1]);
    };
    assert_eq!(update.read_attributes, vec!["custom:foo"]);
    assert_eq!(update.write_attributes, vec!["custom:foo"]);
}

#[tokio::test]
async fn each_entry_is_processed_once() {
    let gateway = FakeGateway::new(&[
        ("UserPoolId", POOL),
        ("ClientA", "client-a"),
        ("ClientB", "client-b"),
    ])
    .with_pool(POOL, &["custom:another"])
    .with_client(POOL, "client-a", &["custom:another"], &["custom:another"])
    .with_client(POOL, "client-b", &[], &[]);
    let log = MemoryLogSink::new();
    let raw = json!([
        mapping("UserPoolId", Some("ClientA"), &["another"]),
        mapping("UserPoolId", Some("ClientB"), &["another"]),
    ]);

    let summary = run(&gateway, &raw, &log, RunOptions::default()).await.unwrap();

    let pool_fetches = gateway
        .calls()
        .iter()
        .filter(|call| matches!(call, Call::DescribePool(_)))
        .count();
    assert_eq!(pool_fetches, 2);
    assert_eq!(summary.entries.len(), 2);
    assert_eq!(summary.entries[1].client_id.as_deref(), Some("client-b"));
    assert_eq!(summary.entries[1].granted_read, vec!["custom:another"]);
}

#[tokio::test]
async fn stack_is_described_once_per_run() {
    let gateway = FakeGateway::new(&[("PoolA", "pool-a"), ("PoolB", "pool-b")])
        .with_pool("pool-a", &[])
        .with_pool("pool-b", &[]);
    let log = MemoryLogSink::new();
    let raw = json!([mapping("PoolA", None, &["x"]), mapping("PoolB", None, &["y"])]);

    run(&gateway, &raw, &log, RunOptions::default()).await.unwrap();

    let describes = gateway
        .calls()
        .iter()
        .filter(|call| matches!(call, Call::DescribeStack))
        .count();
    assert_eq!(describes, 1);
}

#[tokio::test]
async fn missing_output_key_fails_before_any_mutation() {
    let gateway = FakeGateway::new(&[("PoolA", "pool-a")]).with_pool("pool-a", &[]);
    let log = MemoryLogSink::new();
    let raw = json!([
        mapping("PoolA", None, &["x"]),
        mapping("NotAnOutput", None, &["y"]),
    ]);

    let err = run(&gateway, &raw, &log, RunOptions::default()).await.unwrap_err();

    assert!(err.is_configuration());
    assert!(gateway.mutating_calls().is_empty());
    assert!(log.contains("Could not find CognitoUserPoolIdOutputKey 'NotAnOutput'"));
    assert!(!log.contains("End"));
}

#[tokio::test]
async fn missing_client_output_key_fails_before_any_mutation() {
    let gateway = FakeGateway::new(&[("PoolA", "pool-a")]).with_pool("pool-a", &[]);
    let log = MemoryLogSink::new();
    let raw = mapping("PoolA", Some("NoSuchClient"), &["x"]);

    let err = run(&gateway, &raw, &log, RunOptions::default()).await.unwrap_err();

    assert!(err.is_configuration());
    assert!(gateway.mutating_calls().is_empty());
}

#[tokio::test]
async fn absent_stack_is_configuration_error() {
    let gateway = FakeGateway::without_stack();
    let log = MemoryLogSink::new();
    let raw = mapping("UserPoolId", None, &["x"]);

    let err = run(&gateway, &raw, &log, RunOptions::default()).await.unwrap_err();

    assert!(err.is_configuration());
    assert_eq!(gateway.calls(), vec![Call::DescribeStack]);
}

#[tokio::test]
async fn no_valid_entries_fails_without_remote_calls() {
    let gateway = gateway();
    let log = MemoryLogSink::new();

    let err = run(&gateway, &json!([{}]), &log, RunOptions::default())
        .await
        .unwrap_err();

    assert!(err.is_configuration());
    assert_eq!(err.to_string(), "Missing required fields.");
    assert!(gateway.calls().is_empty());
    assert!(log.contains("Missing required fields."));
    assert!(!log.contains("Start"));
}

#[tokio::test]
async fn malformed_client_key_is_not_run_as_pool_only() {
    let gateway = gateway().with_pool(POOL, &[]);
    let log = MemoryLogSink::new();
    let raw = json!({
        "CognitoUserPoolIdOutputKey": "UserPoolId",
        "CognitoUserPoolClientIdOutputKey": ["UserPoolClientId"],
        "CustomAttributes": [{ "Name": "foo" }]
    });

    let err = run(&gateway, &raw, &log, RunOptions::default()).await.unwrap_err();

    assert!(err.is_configuration());
    assert!(gateway.calls().is_empty());
    assert!(log.contains("CognitoUserPoolClientIdOutputKey must be a string."));
    assert!(!log.contains("client permissions will not be updated"));
}

#[tokio::test]
async fn provider_failure_is_logged_with_stage() {
    let gateway = gateway().failing(
        "describe_stack",
        GatewayError::service("AccessDenied", "not allowed"),
    );
    let log = MemoryLogSink::new();
    let raw = mapping("UserPoolId", None, &["x"]);

    let err = run(&gateway, &raw, &log, RunOptions::default()).await.unwrap_err();

    assert_eq!(err.stage(), Some(ProviderStage::DescribeStack));
    assert!(log.contains("Error occurred when describing stack. AccessDenied: not allowed"));
}

#[tokio::test]
async fn first_error_aborts_without_rollback() {
    let gateway = FakeGateway::new(&[("PoolA", "pool-a"), ("PoolB", "pool-b")])
        .with_pool("pool-a", &[]);
    let log = MemoryLogSink::new();
    let raw = json!([
        mapping("PoolA", None, &["x"]),
        mapping("PoolB", None, &["y"]),
        mapping("PoolA", None, &["z"]),
    ]);

    let err = run(&gateway, &raw, &log, RunOptions::default()).await.unwrap_err();

    assert_eq!(err.stage(), Some(ProviderStage::FetchUserPool));
    assert_eq!(gateway.pool_attributes("pool-a"), vec!["custom:x"]);
    assert_eq!(gateway.mutating_calls().len(), 1);
}

#[tokio::test]
async fn parallel_run_serializes_entries_of_the_same_pool() {
    let gateway = FakeGateway::new(&[
        ("PoolA", "pool-a"),
        ("PoolB", "pool-b"),
        ("ClientA1", "a1"),
        ("ClientA2", "a2"),
        ("ClientB", "b"),
    ])
    .yielding()
    .with_pool("pool-a", &[])
    .with_pool("pool-b", &[])
    .with_client("pool-a", "a1", &[], &[])
    .with_client("pool-a", "a2", &[], &[])
    .with_client("pool-b", "b", &[], &[]);
    let log = MemoryLogSink::new();
    let raw = json!([
        mapping("PoolA", Some("ClientA1"), &["x"]),
        mapping("PoolB", Some("ClientB"), &["y"]),
        mapping("PoolA", Some("ClientA2"), &["x"]),
    ]);

    let summary = run(&gateway, &raw, &log, RunOptions::default().parallel(true))
        .await
        .unwrap();

    // Outcomes come back in configuration order.
    let clients: Vec<_> = summary
        .entries
        .iter()
        .map(|e| e.client_id.clone().unwrap())
        .collect();
    assert_eq!(clients, vec!["a1", "b", "a2"]);

    // Pool A sees its two entries strictly one after the other.
    let pool_a: Vec<Call> = gateway
        .calls()
        .into_iter()
        .filter(|call| call.pool_id() == Some("pool-a"))
        .collect();
    assert!(matches!(pool_a[0], Call::DescribePool(_)));
    assert!(matches!(pool_a[1], Call::AddAttributes(..)));
    assert!(matches!(pool_a[2], Call::DescribeClient(_, ref c) if c == "a1"));
    assert!(matches!(pool_a[3], Call::UpdateClient(_)));
    assert!(matches!(pool_a[4], Call::DescribePool(_)));
    assert!(matches!(pool_a[5], Call::DescribeClient(_, ref c) if c == "a2"));
    assert!(matches!(pool_a[6], Call::UpdateClient(_)));
    assert_eq!(pool_a.len(), 7);

    // The second entry found the attribute the first one added.
    assert_eq!(gateway.pool_attributes("pool-a"), vec!["custom:x"]);
    assert_eq!(gateway.pool_attributes("pool-b"), vec!["custom:y"]);
}

#[tokio::test]
async fn parallel_run_interleaves_different_pools() {
    let gateway = FakeGateway::new(&[("PoolA", "pool-a"), ("PoolB", "pool-b")])
        .yielding()
        .with_pool("pool-a", &[])
        .with_pool("pool-b", &[]);
    let log = MemoryLogSink::new();
    let raw = json!([mapping("PoolA", None, &["x"]), mapping("PoolB", None, &["y"])]);

    run(&gateway, &raw, &log, RunOptions::default().parallel(true))
        .await
        .unwrap();

    let calls = gateway.calls();
    let last_a = calls
        .iter()
        .rposition(|call| call.pool_id() == Some("pool-a"))
        .unwrap();
    let first_b = calls
        .iter()
        .position(|call| call.pool_id() == Some("pool-b"))
        .unwrap();
    assert!(first_b < last_a, "pools were processed one after the other: {calls:?}");
}
