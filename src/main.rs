// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::application::power_graph_service::PowerGraphService;
use crate::infrastructure::config::load_config;
use crate::infrastructure::data_files::DataFiles;
use crate::infrastructure::http_log_source::HttpLogSource;
use crate::infrastructure::plotters_chart::PlottersChartLibrary;
use crate::infrastructure::static_files::StaticFiles;
use crate::presentation::app_state::AppState;
use crate::presentation::routes::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("power_graph=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = load_config()?;

    // Create adapters (infrastructure layer)
    let log_source = HttpLogSource::new(
        &config.loader.page_url,
        &config.loader.log_path,
        config.loader.timeout(),
    )?;
    tracing::info!("Power log source: {}", log_source.log_url());
    let static_files = StaticFiles::new(&config.server.data_dir);
    let data_files = DataFiles::new(&config.server.data_dir);

    // Create services (application layer)
    let power_graph = PowerGraphService::new(
        Arc::new(log_source),
        Arc::new(PlottersChartLibrary),
        config.parser.malformed,
        config.chart.to_options(),
    )
    .with_load_timeout(config.chart.load_timeout());

    // Create application state
    let state = Arc::new(AppState {
        power_graph,
        static_files,
        data_files,
    });

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid server.bind address {:?}", config.server.bind))?;
    tracing::info!("Starting power-graph service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
