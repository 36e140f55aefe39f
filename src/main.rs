//! kiddy-lines: sports-odds fan-out service.
//!
//! Bootstraps the Postgres-backed score store, launches one poller
//! worker per supported sport, and serves the readiness HTTP endpoint
//! and the bidirectional subscription RPC for the process lifetime.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tonic::transport::Server;
use tracing::info;

use kiddy_lines::config::Config;
use kiddy_lines::grpc::{KiddyLineProcessorServer, LinesService};
use kiddy_lines::poller::PollerPool;
use kiddy_lines::provider::{HttpLinesProviderClient, LinesProviderClient};
use kiddy_lines::readiness;
use kiddy_lines::store::{PgScoreStore, ScoreStore};
use kiddy_lines::subscription::{DeltaService, SubscriptionCoordinator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kiddy_lines=info".parse()?),
        )
        .init();

    let config = Config::from_env();
    info!(
        update_interval = config.update_interval,
        http_url = %config.http_url,
        grpc_url = %config.grpc_url,
        "starting kiddy-lines"
    );

    let store = PgScoreStore::connect(&config.database_url).await?;
    store.bootstrap_if_needed().await?;
    let store: Arc<dyn ScoreStore> = Arc::new(store);

    let provider: Arc<dyn LinesProviderClient> =
        Arc::new(HttpLinesProviderClient::new(config.lines_provider_url.clone())?);

    let poller = PollerPool::new(
        Arc::clone(&provider),
        Arc::clone(&store),
        Duration::from_secs(config.update_interval),
    );
    poller.spawn();

    let coordinator = Arc::new(SubscriptionCoordinator::new(DeltaService::new(Arc::clone(
        &store,
    ))));

    let http_addr: SocketAddr = config.http_url.parse()?;
    let http_app = readiness::router();
    let http_server = async move {
        let listener = tokio::net::TcpListener::bind(http_addr).await?;
        info!(%http_addr, "readiness endpoint listening");
        axum::serve(listener, http_app).await?;
        Ok::<(), anyhow::Error>(())
    };

    let grpc_addr: SocketAddr = config.grpc_url.parse()?;
    let grpc_service = LinesService::new(Arc::clone(&coordinator));
    let grpc_server = async move {
        info!(%grpc_addr, "subscription gRPC service listening");
        Server::builder()
            .add_service(KiddyLineProcessorServer::new(grpc_service))
            .serve(grpc_addr)
            .await?;
        Ok::<(), anyhow::Error>(())
    };

    tokio::try_join!(http_server, grpc_server)?;
    Ok(())
}
