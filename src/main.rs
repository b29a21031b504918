// src/main.rs

use scorecard::config::Config;
use scorecard::extractor::PageLayout;
use scorecard::routes;
use scorecard::state::AppState;
use scorecard::storage::CsvTable;
use scorecard::utils::fetch::PageFetcher;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load configuration from environment (and .env, if present)
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "scorecard.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let layout = match &config.layout_file {
        Some(path) => {
            tracing::info!("Loading page layout from {}", path.display());
            PageLayout::load(path).expect("Failed to load page layout")
        }
        None => PageLayout::default(),
    };
    let layout = layout.compile().expect("Invalid page layout");
    tracing::info!(
        "Using page layout {} ({} questions per submission)",
        layout.version(),
        config.marking.total_questions()
    );

    let table = CsvTable::open(&config.table_path).expect("Failed to open record table");
    tracing::info!("Record table at {}", table.path().display());

    let fetcher = PageFetcher::new(
        &config.user_agent,
        Duration::from_secs(config.fetch_timeout_secs),
    )
    .expect("Failed to build HTTP client");

    let state = AppState {
        table: Arc::new(table),
        layout: Arc::new(layout),
        fetcher,
        config: config.clone(),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listening address");
    tracing::info!("Listening on {}", config.bind_addr);

    // Start the server
    axum::serve(listener, app).await.expect("Server error");
}
