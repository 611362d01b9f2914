use std::sync::Arc;

use dotenvy::dotenv;
use reqwest::Client;

use donation_notifier::alerts::NotificationFanout;
use donation_notifier::config::Config;
use donation_notifier::db::create_pool;
use donation_notifier::dedup::DedupGate;
use donation_notifier::error::AppError;
use donation_notifier::logging::init_logging;
use donation_notifier::orchestrator::Orchestrator;
use donation_notifier::repository::NotificationRepository;
use donation_notifier::services::block_explorer::BlockExplorerClient;
use donation_notifier::services::cryptoid::CryptoIdClient;
use donation_notifier::types::{Cutoff, Provider};
use donation_notifier::watcher::{BlockExplorerWatcher, CryptoIdWatcher};

/// One scheduled invocation. Exits non-zero only on bad configuration;
/// every runtime failure is logged and the run still completes.
#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();

    let config = Config::from_env()
        .map_err(AppError::Config)
        .unwrap_or_else(|err| {
            tracing::error!("{}", err);
            std::process::exit(1);
        });

    let cutoff = Cutoff::from_now(config.check_interval_seconds);

    let pool = match create_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(err) => {
            tracing::error!(
                "{}; dedup state unknown, skipping this invocation",
                AppError::Store(err)
            );
            return;
        }
    };

    let http = Client::new();
    let fanout = Arc::new(NotificationFanout::from_config(
        &config.sinks(),
        &config.discord_api_base,
        http.clone(),
    ));
    if fanout.sink_count() == 0 {
        tracing::warn!("No chat sinks configured; donations will only be logged");
    }

    let orchestrator = Orchestrator::new(
        config.targets.clone(),
        DedupGate::new(Arc::new(NotificationRepository::new(pool))),
        fanout,
    )
    .with_watcher(
        Provider::CryptoIdApi,
        Arc::new(CryptoIdWatcher::new(CryptoIdClient::with_http(
            config.cryptoid_base_url.clone(),
            http.clone(),
        ))),
    )
    .with_watcher(
        Provider::BlockExplorerApi,
        Arc::new(BlockExplorerWatcher::new(BlockExplorerClient::with_http(
            config.block_explorer_base_url.clone(),
            http,
        ))),
    );

    let summary = orchestrator.run(cutoff).await;

    tracing::info!(
        targets = summary.targets,
        failed_targets = summary.failed_targets,
        fetched = summary.fetched,
        recent = summary.recent,
        duplicates = summary.duplicates,
        unconfirmed = summary.unconfirmed,
        notified = summary.notified,
        "Invocation complete"
    );
}
