mod common;

use std::sync::atomic::Ordering;

use common::{FakeOrm, Harness, OrmMode};
use db_connector::{ConnectionSpec, ConnectionState, Coordinator};

#[tokio::test]
async fn closes_every_primary_once_and_skips_aliases() {
    let harness = Harness::new();
    let orm = FakeOrm::new(OrmMode::Open);
    let specs = vec![
        ConnectionSpec::new("mongodb://localhost/app").named(vec!["db1:alpha", "db1:beta"]),
        ConnectionSpec::new("mysql://localhost/shop").named("shop"),
        ConnectionSpec::new("redis://localhost").named("cache"),
        ConnectionSpec::new("mongodb://localhost/orm").named("orm").with_orm(),
    ];
    harness
        .coordinator
        .init(specs, harness.options().with_orm(orm.clone()))
        .await
        .unwrap();

    harness.coordinator.close().await;

    assert!(harness.coordinator.registry().is_empty());
    let mut closed = harness.closes.uris();
    closed.sort();
    assert_eq!(
        closed,
        vec!["mongodb://localhost/app", "mysql://localhost/shop", "redis://localhost"]
    );
    assert_eq!(orm.disconnects.load(Ordering::SeqCst), 1);

    let infos = harness.lines.infos();
    assert!(infos.contains(&"MongoDB/app:alpha, beta connection closed".to_string()));
    assert!(infos.contains(&"MongoOrm/orm connection closed".to_string()));
    assert!(harness.lines.errors().is_empty());

    assert!(harness
        .coordinator
        .states()
        .iter()
        .all(|status| status.state == ConnectionState::Closed));
}

#[tokio::test]
async fn close_absorbs_every_failure() {
    let harness = Harness::new();
    let orm = FakeOrm::new(OrmMode::CloseFail);
    let specs = vec![
        ConnectionSpec::new("mongodb://closefail-d/app").named("app"),
        ConnectionSpec::new("mongodb://closefail-e/orm").named("orm").with_orm(),
        ConnectionSpec::new("mysql://closefail-a/shop").named("shop"),
        ConnectionSpec::new("postgres://closefail-b/ledger").named("ledger"),
        ConnectionSpec::new("redis://closefail-c").named("cache"),
    ];
    harness
        .coordinator
        .init(specs, harness.options().with_orm(orm.clone()))
        .await
        .unwrap();

    harness.coordinator.close().await;

    let mut errors = harness.lines.errors();
    errors.sort();
    assert_eq!(
        errors,
        vec![
            "MongoDB/app:app connection close error: socket already closed",
            "MongoOrm/orm connection close error: socket already closed",
            "MySQL/shop connection close error: socket already closed",
            "PostgreSQL/ledger connection close error: socket already closed",
            "Redis/cache connection close error: socket already closed",
        ]
    );
    assert!(harness.coordinator.registry().is_empty());
    assert_eq!(orm.disconnects.load(Ordering::SeqCst), 1);

    // nothing is left to close, so nothing new is attempted or logged
    harness.coordinator.close().await;
    assert_eq!(harness.lines.errors().len(), 5);
    assert_eq!(harness.closes.count(), 4);
    assert_eq!(orm.disconnects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn second_close_is_a_no_op() {
    let harness = Harness::new();
    let specs = vec![ConnectionSpec::new("postgres://localhost/ledger").named("ledger")];
    harness.coordinator.init(specs, harness.options()).await.unwrap();

    harness.coordinator.close().await;
    let lines_after_first = harness.lines.infos().len();

    harness.coordinator.close().await;

    assert_eq!(harness.closes.count(), 1);
    assert_eq!(harness.lines.infos().len(), lines_after_first);
}

#[tokio::test]
async fn close_before_init_resolves() {
    let coordinator = Coordinator::empty();
    coordinator.close().await;
    assert!(coordinator.registry().is_empty());
}

#[tokio::test]
async fn failed_connections_are_not_closed() {
    let harness = Harness::new();
    let specs = vec![ConnectionSpec::new("postgres://down/ledger").named("ledger")];
    assert!(harness.coordinator.init(specs, harness.options()).await.is_err());

    harness.coordinator.close().await;

    assert_eq!(harness.closes.count(), 0);
    assert_eq!(
        harness.coordinator.states()[0].state,
        ConnectionState::Failed
    );
}
