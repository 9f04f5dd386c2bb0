use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use otodoki_supply::catalog::{CatalogClient, CatalogClientConfig, Normalizer};
use otodoki_supply::config::Config;
use otodoki_supply::queue::TrackQueue;
use otodoki_supply::rate_limit::{RateLimiter, RateLimiterConfig};
use otodoki_supply::strategies::artist::ArtistSearchStrategy;
use otodoki_supply::strategies::chart::ChartKeywordStrategy;
use otodoki_supply::strategies::genre::GenreSearchStrategy;
use otodoki_supply::strategies::llm::LlmKeywordStrategy;
use otodoki_supply::strategies::random_keyword::RandomKeywordStrategy;
use otodoki_supply::strategies::release_year::ReleaseYearSearchStrategy;
use otodoki_supply::strategies::{SearchStrategy, StrategyRotator};
use otodoki_supply::suggestions::SuggestionsService;
use otodoki_supply::web::{build_router, AppState};
use otodoki_supply::worker::{ReplenishmentWorker, ReplenishmentWorkerConfig};

const RECENT_TRACK_DEDUPE_WINDOW: Duration = Duration::from_secs(60);
const KEYWORD_BUFFER_MAX: usize = 20;

fn get_dependencies() -> Result<Value, Box<dyn std::error::Error>> {
    let sbom_str = include_str!(concat!(env!("OUT_DIR"), "/sbom.json"));
    let sbom: Value = serde_json::from_str(sbom_str)?;
    Ok(sbom)
}

fn print_version_info() {
    println!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!();
    println!("Software Bill of Materials:");

    match get_dependencies() {
        Ok(sbom) => {
            let mut dependencies = Vec::new();
            if let Some(packages) = sbom["packages"].as_array() {
                for package in packages {
                    if let (Some(name), Some(version)) =
                        (package["name"].as_str(), package["versionInfo"].as_str())
                    {
                        if name != env!("CARGO_PKG_NAME") && !version.contains("path+") {
                            dependencies.push((name.to_string(), version.to_string()));
                        }
                    }
                }
            }
            dependencies.sort_by(|a, b| a.0.cmp(&b.0));
            if dependencies.is_empty() {
                println!("  (No external components found in SBOM)");
            } else {
                for (name, version) in dependencies {
                    println!("  {name}: {version}");
                }
            }
        }
        Err(_) => println!("  (Unable to read SBOM data)"),
    }
}

#[derive(Parser)]
#[command(name = "otodoki-supply")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Candidate supply pipeline for a music-discovery backend")]
#[command(disable_version_flag = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Log level
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    /// Print version information including dependency versions
    #[arg(short = 'v', long)]
    version: bool,
}

/// Instantiates every registered strategy in a fixed order, with the
/// configured `search.strategy` name moved to the front of the rotation.
fn build_strategies(config: &Config, catalog: Arc<CatalogClient>) -> Vec<(String, Box<dyn SearchStrategy>)> {
    let mut strategies: Vec<(String, Box<dyn SearchStrategy>)> = vec![
        (
            "random_keyword".to_string(),
            Box::new(RandomKeywordStrategy::new(config.search.itunes_terms.clone())),
        ),
        (
            "artist_search".to_string(),
            Box::new(ArtistSearchStrategy::new(config.search.itunes_terms.clone())),
        ),
        (
            "genre_search".to_string(),
            Box::new(GenreSearchStrategy::new(config.search.search_genres.clone())),
        ),
        (
            "release_year_search".to_string(),
            Box::new(ReleaseYearSearchStrategy::new(config.search.search_years.clone())),
        ),
        (
            "chart_keyword".to_string(),
            Box::new(ChartKeywordStrategy::new(catalog, config.otodoki.country.clone(), 100)),
        ),
        (
            "gemini_keyword".to_string(),
            Box::new(LlmKeywordStrategy::new(config.llm.clone())),
        ),
    ];

    if let Some(pos) = strategies.iter().position(|(name, _)| name == &config.search.strategy) {
        let preferred = strategies.remove(pos);
        strategies.insert(0, preferred);
    }

    strategies
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.version {
        print_version_info();
        return Ok(());
    }

    let log_filter = format!("otodoki_supply={}", cli.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| log_filter.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting otodoki-supply v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    info!(config_file = %cli.config, "configuration loaded");

    let queue = Arc::new(TrackQueue::new(config.queue.max_capacity, config.queue.low_watermark));

    let catalog = Arc::new(CatalogClient::new(CatalogClientConfig {
        country: config.otodoki.country.clone(),
        lang: config.otodoki.lang.clone(),
        retry_max: config.otodoki.retry_max,
        http_timeout: Duration::from_secs_f64(config.otodoki.http_timeout_s),
        search_url: None,
        chart_feed_url_template: None,
    })?);

    let normalizer = Normalizer::new(RECENT_TRACK_DEDUPE_WINDOW);
    let strategies = build_strategies(&config, catalog.clone());
    let rotator = StrategyRotator::new(strategies);

    let worker = Arc::new(ReplenishmentWorker::new(
        queue.clone(),
        catalog.clone(),
        rotator,
        normalizer,
        ReplenishmentWorkerConfig {
            min_threshold: config.otodoki.min_threshold,
            batch_size: config.otodoki.batch_size,
            max_cap: config.otodoki.max_cap,
            poll_interval: Duration::from_millis(config.otodoki.poll_interval_ms),
            keyword_buffer_max: KEYWORD_BUFFER_MAX,
        },
    ));

    let suggestions = Arc::new(SuggestionsService::new(
        queue.clone(),
        Some(worker.clone()),
        config.suggestions.max_limit,
    ));

    let rate_limiter = Arc::new(RateLimiter::new(RateLimiterConfig {
        max_requests: config.rate_limit.per_sec as usize,
        window: Duration::from_secs(1),
    }));

    let cancel = CancellationToken::new();
    let worker_handle = {
        let worker = worker.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { worker.run(cancel).await })
    };

    let app = build_router(AppState {
        queue,
        worker,
        suggestions,
        rate_limiter,
    });

    let addr = format!("{}:{}", config.web.host, config.web.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    server.await?;

    cancel.cancel();
    worker_handle.await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
