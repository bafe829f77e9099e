//! Menu report binary
//!
//! Evaluates the whole dish catalog against the pantry ledger for today and prints the
//! menu as JSON.

use anyhow::Context;
use menu_engine::{
    evaluate_catalog_observed, Config, DishCatalog, Menu, Metrics, RecipeEvaluator,
};
use pantry_ledger::Ledger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = match std::env::var("MENU_CONFIG") {
        Ok(path) => Config::from_file(&path)
            .with_context(|| format!("Failed to load config from {path}"))?,
        Err(_) => Config::from_env().context("Invalid menu configuration")?,
    };

    tracing::info!(service = %config.service_name, "Starting menu report");

    let ledger = Ledger::open(config.ledger.clone())
        .await
        .context("Failed to open pantry ledger")?;
    let snapshot = ledger
        .snapshot()
        .await
        .context("Failed to read pantry ledger snapshot")?;

    let catalog = DishCatalog::load(&config.catalog_path)
        .with_context(|| format!("Failed to load dish catalog {:?}", config.catalog_path))?;

    let evaluator = RecipeEvaluator::new(config.evaluator.clone(), config.pricing.clone())
        .context("Invalid pricing rule")?;
    let metrics =
        Metrics::new().map_err(|e| anyhow::anyhow!("Failed to create metrics: {e}"))?;
    let today = chrono::Local::now().date_naive();

    let report = evaluate_catalog_observed(&evaluator, &catalog, &snapshot, today, &metrics);

    tracing::info!(
        date = %report.evaluated_on,
        available = report.available_count(),
        unavailable = report.unavailable_count(),
        discounted = report.discounted_count(),
        rejected = report.failure_count(),
        "Menu evaluated"
    );
    tracing::debug!("Metrics:\n{}", metrics.render());

    let menu = Menu::from_report(&catalog, &report);
    println!("{}", menu.to_json_pretty()?);

    ledger.shutdown().await?;
    Ok(())
}
