//! Integration tests for full notifier invocations.
//!
//! Each test wires the real watchers, the SQLite idempotency store and the
//! real HTTP sinks (same assembly as `main.rs`) against wiremock servers —
//! no live explorer or chat service needed.
//!
//! - `upstream` stubs the CryptoId summary endpoint and the Insight-style
//!   block explorer endpoints.
//! - `chat` accepts Slack webhook posts on `/slack/hook` and Discord posts
//!   on `/webhooks/42/token`.

use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;
use sqlx::SqlitePool;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use donation_notifier::{
    alerts::{NotificationFanout, SinkConfig},
    db,
    dedup::DedupGate,
    orchestrator::{Orchestrator, RunSummary},
    repository::NotificationRepository,
    services::{block_explorer::BlockExplorerClient, cryptoid::CryptoIdClient},
    types::{Cutoff, Provider, WatchTarget},
    watcher::{BlockExplorerWatcher, CryptoIdWatcher},
};

// ---- Fixtures ---------------------------------------------------------------

/// Three rows: an old deposit, a recent withdrawal, and a recent deposit.
/// Absolute times are 1_600_000_000, 1_600_000_100 and 1_600_000_500.
const CRYPTOID_SUMMARY: &str = r#"{
    "block": 2500000,
    "balance": 5.75,
    "tx": [
        [1, "aa", 2400000, 1600000000, 5.0, 5.0],
        [2, "bb", 2400010, 100, -1.5, 3.5],
        [3, "cc", 2400020, 400, 2.25, 5.75]
    ]
}"#;

const CUTOFF: i64 = 1_600_000_200;

const WATCHED: &str = "1DonationAddr";

fn cryptoid_target() -> WatchTarget {
    WatchTarget::new(Provider::CryptoIdApi, "ecc", "516674")
}

fn explorer_target() -> WatchTarget {
    WatchTarget::new(Provider::BlockExplorerApi, "btc", WATCHED)
}

async fn mount_cryptoid(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/explorer/address.summary.dws"))
        .and(query_param("coin", "ecc"))
        .and(query_param("id", "516674"))
        .respond_with(ResponseTemplate::new(status).set_body_string(CRYPTOID_SUMMARY))
        .mount(server)
        .await;
}

async fn mount_explorer(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/txs"))
        .and(query_param("address", WATCHED))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "pagesTotal": 1,
            "txs": [{
                "txid": "feed01",
                "blocktime": 1600000300,
                "vout": [
                    {"value": "1.00000000", "scriptPubKey": {"addresses": ["X", "Y"]}},
                    {"value": "2.00000000", "scriptPubKey": {"addresses": [WATCHED]}},
                    {"value": "3.00000000", "scriptPubKey": {"addresses": [WATCHED]}}
                ]
            }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/api/addr/{}/balance", WATCHED)))
        .respond_with(ResponseTemplate::new(200).set_body_string("1250000000"))
        .mount(server)
        .await;
}

async fn mount_chat(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/slack/hook"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/webhooks/42/token"))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
}

/// Same assembly as `main.rs`, pointed at the mock servers.
fn build_orchestrator(
    targets: Vec<WatchTarget>,
    upstream: &MockServer,
    chat: &MockServer,
    pool: SqlitePool,
) -> Orchestrator {
    let http = Client::new();
    let sinks = vec![
        SinkConfig::Webhook {
            url: format!("{}/slack/hook", chat.uri()),
            channel: "#donations".into(),
        },
        SinkConfig::Bot {
            id: "42".into(),
            token: "token".into(),
        },
    ];
    let fanout = Arc::new(NotificationFanout::from_config(&sinks, &chat.uri(), http.clone()));

    Orchestrator::new(
        targets,
        DedupGate::new(Arc::new(NotificationRepository::new(pool))),
        fanout,
    )
    .with_watcher(
        Provider::CryptoIdApi,
        Arc::new(CryptoIdWatcher::new(CryptoIdClient::with_http(
            upstream.uri(),
            http.clone(),
        ))),
    )
    .with_watcher(
        Provider::BlockExplorerApi,
        Arc::new(BlockExplorerWatcher::new(BlockExplorerClient::with_http(
            upstream.uri(),
            http,
        ))),
    )
}

/// JSON bodies posted to `path_suffix` on the chat server, in arrival order.
async fn posted(chat: &MockServer, path_suffix: &str) -> Vec<Value> {
    chat.received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|req| req.url.path().ends_with(path_suffix))
        .map(|req| serde_json::from_slice(&req.body).unwrap())
        .collect()
}

async fn run(orchestrator: &Orchestrator) -> RunSummary {
    orchestrator.run(Cutoff::new(CUTOFF)).await
}

// ---- Tests ------------------------------------------------------------------

#[tokio::test]
async fn cryptoid_invocation_notifies_only_the_recent_deposit() {
    let upstream = MockServer::start().await;
    let chat = MockServer::start().await;
    mount_cryptoid(&upstream, 200).await;
    mount_chat(&chat).await;
    let pool = db::create_pool("sqlite::memory:").await.unwrap();

    let orchestrator = build_orchestrator(vec![cryptoid_target()], &upstream, &chat, pool);
    let summary = run(&orchestrator).await;

    assert_eq!(summary.fetched, 3);
    assert_eq!(summary.recent, 1);
    assert_eq!(summary.notified, 1);

    let expected = format!(
        "New ECC donation of 2.25 ECC! The wallet now has a balance of 5.75 ECC.\n\
         View the tx here: {}/ecc/tx.dws?3.htm",
        upstream.uri()
    );

    let slack = posted(&chat, "/slack/hook").await;
    assert_eq!(slack.len(), 1);
    assert_eq!(slack[0]["text"], expected.as_str());
    assert_eq!(slack[0]["channel"], "#donations");

    let discord = posted(&chat, "/webhooks/42/token").await;
    assert_eq!(discord.len(), 1);
    assert_eq!(discord[0]["content"], expected.as_str());
}

#[tokio::test]
async fn rerun_against_same_store_sends_nothing() {
    let upstream = MockServer::start().await;
    let chat = MockServer::start().await;
    mount_cryptoid(&upstream, 200).await;
    mount_explorer(&upstream).await;
    mount_chat(&chat).await;
    let pool = db::create_pool("sqlite::memory:").await.unwrap();

    let orchestrator = build_orchestrator(
        vec![cryptoid_target(), explorer_target()],
        &upstream,
        &chat,
        pool.clone(),
    );

    let first = run(&orchestrator).await;
    let second = run(&orchestrator).await;

    assert_eq!(first.notified, 2);
    assert_eq!(second.notified, 0);
    assert_eq!(second.duplicates, 2);
    assert_eq!(posted(&chat, "/slack/hook").await.len(), 2);
    assert_eq!(NotificationRepository::new(pool).count().await.unwrap(), 2);
}

#[tokio::test]
async fn block_explorer_transaction_reports_first_matching_output_once() {
    let upstream = MockServer::start().await;
    let chat = MockServer::start().await;
    mount_explorer(&upstream).await;
    mount_chat(&chat).await;
    let pool = db::create_pool("sqlite::memory:").await.unwrap();

    let orchestrator = build_orchestrator(vec![explorer_target()], &upstream, &chat, pool);
    let summary = run(&orchestrator).await;

    assert_eq!(summary.notified, 1);
    let discord = posted(&chat, "/webhooks/42/token").await;
    assert_eq!(discord.len(), 1);
    assert_eq!(
        discord[0]["content"],
        format!(
            "New BTC donation of 2.00000000 BTC! The wallet now has a balance of 12.5 BTC.\n\
             View the tx here: {}/tx/feed01",
            upstream.uri()
        )
        .as_str()
    );
}

#[tokio::test]
async fn failing_upstream_does_not_block_other_targets() {
    let upstream = MockServer::start().await;
    let chat = MockServer::start().await;
    mount_cryptoid(&upstream, 500).await;
    mount_explorer(&upstream).await;
    mount_chat(&chat).await;
    let pool = db::create_pool("sqlite::memory:").await.unwrap();

    let orchestrator = build_orchestrator(
        vec![cryptoid_target(), explorer_target()],
        &upstream,
        &chat,
        pool,
    );
    let summary = run(&orchestrator).await;

    assert_eq!(summary.targets, 2);
    assert_eq!(summary.failed_targets, 1);
    assert_eq!(summary.notified, 1);
    assert_eq!(posted(&chat, "/slack/hook").await.len(), 1);
}

#[tokio::test]
async fn failing_chat_sink_still_records_and_delivers_elsewhere() {
    let upstream = MockServer::start().await;
    let chat = MockServer::start().await;
    mount_cryptoid(&upstream, 200).await;
    Mock::given(method("POST"))
        .and(path("/slack/hook"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&chat)
        .await;
    Mock::given(method("POST"))
        .and(path("/webhooks/42/token"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&chat)
        .await;
    let pool = db::create_pool("sqlite::memory:").await.unwrap();

    let orchestrator = build_orchestrator(vec![cryptoid_target()], &upstream, &chat, pool.clone());
    let summary = run(&orchestrator).await;

    assert_eq!(summary.notified, 1);
    assert_eq!(posted(&chat, "/webhooks/42/token").await.len(), 1);
    assert_eq!(NotificationRepository::new(pool).count().await.unwrap(), 1);
}
