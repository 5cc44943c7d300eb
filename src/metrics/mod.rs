// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};
use std::time::Duration;

// Re-export for public API
pub use server::{start_metrics_server, ServerState};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Order creation and status transitions
// - Status updates addressed to unknown orders
// - Corrupt order documents read back as empty
// - Notification dispatch outcomes per template
// - Store operation latency
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the order service
pub struct Metrics {
    registry: Registry,

    // Order lifecycle
    pub orders_created: IntCounter,
    pub status_updates: IntCounterVec,
    pub status_update_misses: IntCounter,

    // Storage
    pub storage_unreadable: IntCounter,
    pub store_operation_duration: HistogramVec,

    // Notifications
    pub notifications: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_created = IntCounter::new("orders_created_total", "Total orders created")?;
        registry.register(Box::new(orders_created.clone()))?;

        let status_updates = IntCounterVec::new(
            Opts::new("order_status_updates_total", "Total applied order status updates"),
            &["status"],
        )?;
        registry.register(Box::new(status_updates.clone()))?;

        let status_update_misses = IntCounter::new(
            "order_status_update_misses_total",
            "Status updates addressed to an unknown order id",
        )?;
        registry.register(Box::new(status_update_misses.clone()))?;

        let storage_unreadable = IntCounter::new(
            "order_storage_unreadable_total",
            "Order documents that could not be parsed and were read as empty",
        )?;
        registry.register(Box::new(storage_unreadable.clone()))?;

        let store_operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "order_store_operation_duration_seconds",
                "Order store operation duration",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["operation"],
        )?;
        registry.register(Box::new(store_operation_duration.clone()))?;

        let notifications = IntCounterVec::new(
            Opts::new("order_notifications_total", "Notification dispatch attempts by outcome"),
            &["template", "outcome"],
        )?;
        registry.register(Box::new(notifications.clone()))?;

        Ok(Self {
            registry,
            orders_created,
            status_updates,
            status_update_misses,
            storage_unreadable,
            store_operation_duration,
            notifications,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_order_created(&self) {
        self.orders_created.inc();
    }

    pub fn record_status_update(&self, status: &str) {
        self.status_updates.with_label_values(&[status]).inc();
    }

    pub fn record_status_update_miss(&self) {
        self.status_update_misses.inc();
    }

    pub fn record_storage_unreadable(&self) {
        self.storage_unreadable.inc();
    }

    pub fn observe_store_operation(&self, operation: &str, elapsed: Duration) {
        self.store_operation_duration
            .with_label_values(&[operation])
            .observe(elapsed.as_secs_f64());
    }

    pub fn record_notification(&self, template: &str, outcome: &str) {
        self.notifications.with_label_values(&[template, outcome]).inc();
    }
}
