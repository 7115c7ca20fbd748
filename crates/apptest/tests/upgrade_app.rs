use std::sync::Arc;

use apptest::{App, AppSetup, ErrorKind};
use apptest_catalog::StaticVersionResolver;
use apptest_db_memory::InMemoryClient;
use apptest_storage::{AppStatus, RecordKind, ResourceClient};
use tokio_util::sync::CancellationToken;

const DEFAULT_URL: &str = "https://giantswarm.github.io/default-catalog/";
const TEST_URL: &str = "https://giantswarm.github.io/default-test-catalog/";

fn resolver() -> StaticVersionResolver {
    StaticVersionResolver::new()
        .with_versions(DEFAULT_URL, "hello", ["0.1.0", "0.2.0"])
        .with_versions(TEST_URL, "hello", ["0.2.1-abc123"])
}

#[tokio::test(start_paused = true)]
async fn upgrade_from_latest_to_commit_build() {
    let client = Arc::new(InMemoryClient::new());
    let resolver = Arc::new(resolver());
    let setup = AppSetup::builder()
        .with_client(client.clone())
        .with_resolver(resolver.clone())
        .build()
        .unwrap();

    // One status per read: current wait, updater fetch, then two desired polls.
    client
        .script_app_statuses(
            "hello",
            "giantswarm",
            [
                AppStatus::new("deployed", "0.2.0"),
                AppStatus::new("deployed", "0.2.0"),
                AppStatus::new("pending-upgrade", "0.2.0"),
                AppStatus::new("deployed", "0.2.1-abc123"),
            ],
        )
        .await;

    let current = App::new("hello", "default").with_values_yaml("replicas: 1");
    let desired = App::new("hello", "default-test").with_commit_ref("abc123");
    setup
        .upgrade_app(&current, &desired, &CancellationToken::new())
        .await
        .unwrap();

    // Unconstrained latest for the current app, then the commit for the desired one.
    assert_eq!(resolver.constraints().await, vec!["", "abc123"]);

    let record = client.get_app("hello", "giantswarm").await.unwrap();
    assert_eq!(record.spec.version, "0.2.1-abc123");
    assert_eq!(record.spec.catalog, "default-test");
    assert!(!record.spec.user_config.is_empty());
    assert_eq!(client.count(RecordKind::Catalog).await, 2);
    assert_eq!(client.stats().updates, 1);
}

#[tokio::test(start_paused = true)]
async fn pinned_current_version_is_not_resolved() {
    let client = Arc::new(InMemoryClient::new());
    let resolver = Arc::new(resolver());
    let setup = AppSetup::builder()
        .with_client(client.clone())
        .with_resolver(resolver.clone())
        .build()
        .unwrap();
    client
        .script_app_statuses(
            "hello",
            "giantswarm",
            [
                AppStatus::new("deployed", "0.1.0"),
                AppStatus::new("deployed", "0.1.0"),
                AppStatus::new("deployed", "0.2.0"),
            ],
        )
        .await;

    let current = App::new("hello", "default").with_version("0.1.0");
    let desired = App::new("hello", "default").with_version("0.2.0");
    setup
        .upgrade_app(&current, &desired, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(resolver.constraints().await, vec!["0.2.0"]);
    let record = client.get_app("hello", "giantswarm").await.unwrap();
    assert_eq!(record.spec.version, "0.2.0");
}

#[tokio::test(start_paused = true)]
async fn failed_current_install_stops_before_update() {
    let client = Arc::new(InMemoryClient::new());
    let setup = AppSetup::builder()
        .with_client(client.clone())
        .with_resolver(Arc::new(resolver()))
        .build()
        .unwrap();
    client
        .script_app_statuses(
            "hello",
            "giantswarm",
            [AppStatus::new("not-installed", "").with_reason("image pull failed")],
        )
        .await;

    let err = setup
        .upgrade_app(
            &App::new("hello", "default").with_version("0.1.0"),
            &App::new("hello", "default").with_version("0.2.0"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TerminalRemoteFailure);
    assert_eq!(client.stats().updates, 0);
}
