//! Metrics collection for observability
//!
//! Prometheus metrics for menu evaluation, kept in a registry owned by [`Metrics`].
//!
//! # Metrics
//!
//! - `menu_evaluations_total` - Dishes evaluated successfully
//! - `menu_dishes_unavailable_total` - Evaluations that came out unavailable
//! - `menu_dishes_discounted_total` - Evaluations sold at the discounted price
//! - `menu_evaluation_failures_total` - Dishes that could not be evaluated
//! - `menu_catalog_evaluation_seconds` - Histogram of whole-catalog evaluation time

use crate::batch::CatalogReport;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Successful evaluations
    pub evaluations_total: IntCounter,

    /// Unavailable dishes
    pub unavailable_total: IntCounter,

    /// Discounted dishes
    pub discounted_total: IntCounter,

    /// Failed evaluations
    pub failures_total: IntCounter,

    /// Catalog evaluation duration histogram
    pub catalog_duration: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let evaluations_total =
            IntCounter::new("menu_evaluations_total", "Dishes evaluated successfully")?;
        registry.register(Box::new(evaluations_total.clone()))?;

        let unavailable_total = IntCounter::new(
            "menu_dishes_unavailable_total",
            "Evaluations that came out unavailable",
        )?;
        registry.register(Box::new(unavailable_total.clone()))?;

        let discounted_total = IntCounter::new(
            "menu_dishes_discounted_total",
            "Evaluations sold at the discounted price",
        )?;
        registry.register(Box::new(discounted_total.clone()))?;

        let failures_total = IntCounter::new(
            "menu_evaluation_failures_total",
            "Dishes that could not be evaluated",
        )?;
        registry.register(Box::new(failures_total.clone()))?;

        let catalog_duration = Histogram::with_opts(
            HistogramOpts::new(
                "menu_catalog_evaluation_seconds",
                "Histogram of whole-catalog evaluation time",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.010, 0.050, 0.100, 0.500]),
        )?;
        registry.register(Box::new(catalog_duration.clone()))?;

        Ok(Self {
            evaluations_total,
            unavailable_total,
            discounted_total,
            failures_total,
            catalog_duration,
            registry,
        })
    }

    /// Record every outcome in a report
    pub fn record_report(&self, report: &CatalogReport) {
        self.evaluations_total.inc_by(report.results().count() as u64);
        self.unavailable_total.inc_by(report.unavailable_count() as u64);
        self.discounted_total.inc_by(report.discounted_count() as u64);
        self.failures_total.inc_by(report.failure_count() as u64);
    }

    /// Record catalog evaluation duration
    pub fn record_catalog_duration(&self, duration_seconds: f64) {
        self.catalog_duration.observe(duration_seconds);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render in the Prometheus text format
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            tracing::error!("Failed to encode metrics: {}", e);
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
