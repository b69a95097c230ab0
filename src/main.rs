use std::net::SocketAddr;

use anyhow::Context;
use budget_dashboard::config::AppConfig;
use budget_dashboard::models::budget::BudgetDataset;
use budget_dashboard::{routes, store, AppState};
use mimalloc::MiMalloc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// M-MIMALLOC-APP: Use mimalloc as global allocator for improved performance.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "budget_dashboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    let budget = match &config.budget_dataset_path {
        Some(path) => BudgetDataset::from_path(path)
            .with_context(|| format!("Failed to load budget dataset from {}", path.display()))?,
        None => BudgetDataset::embedded().context("Embedded budget dataset is invalid")?,
    };
    tracing::info!(fiscal_year = budget.fiscal_year, "Loaded budget dataset");

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid BACKEND_HOST/BACKEND_PORT")?;

    let state = AppState::build(config, budget, store::open).context("Failed to open contacts store")?;
    let app = routes::router(state);

    tracing::info!(host = %addr, "Starting budget dashboard API server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
