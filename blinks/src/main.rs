use reclaim_blinks::config::Config;
use reclaim_blinks::history::MemoryClaimHistory;
use reclaim_blinks::reclaim::Reclaimer;
use reclaim_blinks::referral::StaticReferralDirectory;
use reclaim_blinks::router;
use reclaim_blinks::state::AppState;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    let referrals = match &config.affiliates_path {
        Some(path) => match StaticReferralDirectory::load(path) {
            Ok(dir) => dir,
            Err(e) => {
                tracing::error!("{e}");
                std::process::exit(1);
            }
        },
        None => StaticReferralDirectory::default(),
    };

    tracing::info!("RPC endpoint: {}", config.rpc_url);
    tracing::info!("Base URL: {}", config.base_url);
    tracing::info!("Operator wallet: {}", config.reclaim.operator);
    tracing::info!("Owner share: {} bps", config.reclaim.owner_share_bps);
    tracing::info!("Loaded {} affiliates", referrals.len());
    tracing::info!("Listening on {}", config.bind_addr);

    let rpc = Arc::new(RpcClient::new_with_commitment(
        config.rpc_url.clone(),
        CommitmentConfig::confirmed(),
    ));
    let reclaimer = Reclaimer::new(config.reclaim, rpc, Arc::new(referrals));
    let state = AppState::new(
        reclaimer,
        Arc::new(MemoryClaimHistory::new()),
        config.base_url.clone(),
    );
    let app = router::build_router(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Ctrl+C received, shutting down"),
        _ = terminate => tracing::info!("SIGTERM received, shutting down"),
    }
}
