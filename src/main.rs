//! adls-proxy - A serverless HTTP-to-SQL proxy.

use std::sync::Arc;

use adls_proxy::cli::Cli;
use adls_proxy::config::Config;
use adls_proxy::db::MssqlConnector;
use adls_proxy::logging;
use adls_proxy::query::QueryExecutor;
use adls_proxy::server::{self, AppState};
use anyhow::Context;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // A missing .env file is fine; the Functions host sets app settings directly.
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    logging::init_stderr_logging(&cli.log_level, cli.no_color());

    if let Err(e) = run(cli).await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Configuration precedence:
    // 1. CLI arguments (highest)
    // 2. Environment variables
    // 3. Config file
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    config.apply_env()?;
    cli.apply_overrides(&mut config)?;
    config.sql.auth.validate()?;

    info!(
        "SQL port {}, auth method {}, query timeout {}s",
        config.sql.port,
        config.sql.auth.method_name(),
        config.sql.query_timeout_secs
    );

    let connector = Arc::new(MssqlConnector::new(config.sql.clone()));
    let state = AppState {
        executor: QueryExecutor::new(connector),
    };
    let app = server::router(state, &config.server.route_prefix);

    let listener = tokio::net::TcpListener::bind(config.server.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.server.listen))?;

    info!(
        "adls-proxy listening on {} (routes under {})",
        config.server.listen, config.server.route_prefix
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("adls-proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
