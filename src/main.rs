use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use donation_guard::config::GuardConfig;
use donation_guard::donation::{DonationService, MemoryDonationRepository, SubmissionGuard};
use donation_guard::grpc::{DonationGuardService, GrpcServer};
use donation_guard::ratelimit::{RateLimiter, SystemClock};
use donation_guard::store::MemoryRateStore;

/// Rate-limited donation submission service.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Override the gRPC listen address
    #[arg(long)]
    grpc_addr: Option<SocketAddr>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(true)
            .init();
    }

    info!("Starting Donation Guard");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = GuardConfig::load(args.config.as_deref())?;
    if let Some(addr) = args.grpc_addr {
        config.server.grpc_addr = addr;
    }
    let policy = config.rate_limiting.policy()?;
    info!(
        grpc_addr = %config.server.grpc_addr,
        limit = policy.limit(),
        window_ms = policy.window_ms(),
        "Configuration loaded"
    );

    let clock = Arc::new(SystemClock);
    let limiter = Arc::new(
        RateLimiter::with_clock(Arc::new(MemoryRateStore::new()), clock.clone())
            .with_default_policy(policy),
    );
    let donations = Arc::new(DonationService::new(
        SubmissionGuard::new(limiter.clone(), policy),
        Arc::new(MemoryDonationRepository::new()),
        clock,
    ));
    info!("Rate limiter initialized");

    let service = DonationGuardService::new(limiter, donations, config.audit.options());
    let grpc_server = GrpcServer::new(config.server.grpc_addr, service);

    // Run the server with graceful shutdown on Ctrl+C
    grpc_server.serve_with_shutdown(shutdown_signal()).await?;

    info!("Donation Guard stopped");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
