use anyhow::Context;
use clap::Parser;
use rinkstats::adapters::{PostgrestClient, RemoteStore};
use rinkstats::api::{create_router, AppState};
use rinkstats::cli::{Cli, Commands};
use rinkstats::config::{AppConfig, LoggingConfig};
use rinkstats::services::{
    LeagueService, PlayerSnapshotCache, RefreshScheduler, RefreshState, RosterService,
};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_dir = cli.config_dir.display();
    let mut config = AppConfig::load_from(&cli.config_dir)
        .with_context(|| format!("loading config from {config_dir}"))?;

    init_logging(&config.logging);

    match cli.command {
        Some(Commands::Refresh) => run_refresh_once(&config).await,
        Some(Commands::Serve { port }) => {
            if let Some(port) = port {
                config.server.port = port;
            }
            run_server(config).await
        }
        None => run_server(config).await,
    }
}

/// HTTP API plus the background roster refresh
async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let store: Arc<dyn RemoteStore> = Arc::new(PostgrestClient::from_config(&config.store)?);

    let roster = Arc::new(RosterService::new());
    roster
        .start(
            Arc::clone(&store),
            &config.store.roster_table,
            config.refresh.interval(),
        )
        .await?;

    let league = Arc::new(LeagueService::new(store, Arc::clone(&roster), &config));
    let app = create_router(AppState::new(Arc::clone(&roster), league));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(
        addr = %addr,
        store = %config.store.url,
        refresh_secs = config.refresh.interval_secs,
        "rinkstats listening"
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    info!("HTTP server stopped, shutting down roster refresh");
    roster.shutdown().await;

    served.context("HTTP server error")
}

/// One refresh cycle against the store, reporting the roster size
async fn run_refresh_once(config: &AppConfig) -> anyhow::Result<()> {
    let store: Arc<dyn RemoteStore> = Arc::new(PostgrestClient::from_config(&config.store)?);
    let snapshot = PlayerSnapshotCache::new();
    let state = Arc::new(RwLock::new(RefreshState::default()));
    let scheduler = RefreshScheduler::new(
        store,
        snapshot,
        state,
        config.store.roster_table.as_str(),
        config.refresh.interval(),
    );

    let count = scheduler
        .refresh_once()
        .await
        .context("roster refresh failed")?;
    println!("{} players in {}", count, config.store.roster_table);
    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},tower_http=info", logging.level))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
