//! Monitor metrics.
//!
//! Counters are always recorded through the `metrics` facade; they only leave
//! the process when a Prometheus listener was installed with
//! [`init_metrics`]. Without a recorder every call is a no-op.

use std::net::SocketAddr;
use std::sync::Once;
use tracing::{info, warn};

static INIT: Once = Once::new();

pub const CYCLES_TOTAL: &str = "windy_cycles_total";
pub const SCRAPE_FAILURES_TOTAL: &str = "windy_scrape_failures_total";
pub const ALERTS_TOTAL: &str = "windy_alerts_total";
pub const DELIVERY_FAILURES_TOTAL: &str = "windy_delivery_failures_total";
pub const WIND_SPEED_KNOTS: &str = "windy_wind_speed_knots";

/// Install the Prometheus exporter listening on `addr`. Idempotent.
pub fn init_metrics(addr: SocketAddr) {
    INIT.call_once(|| {
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
        match builder.install() {
            Ok(()) => {
                info!("Prometheus HTTP exporter started at http://{}/metrics", addr);
                register_all_metrics();
            }
            Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
        }
    });
}

/// Pre-register so the series appear before the first cycle completes.
fn register_all_metrics() {
    ::metrics::describe_counter!(CYCLES_TOTAL, "Monitoring cycles started");
    ::metrics::describe_counter!(SCRAPE_FAILURES_TOTAL, "Cycles whose scrape failed");
    ::metrics::describe_counter!(ALERTS_TOTAL, "Cycles where the threshold was exceeded");
    ::metrics::describe_counter!(DELIVERY_FAILURES_TOTAL, "Notifiers that failed to deliver");
    ::metrics::describe_gauge!(WIND_SPEED_KNOTS, "Last observed wind speed in knots");
}

pub struct MonitorMetrics;

impl MonitorMetrics {
    pub fn record_cycle() {
        ::metrics::counter!(CYCLES_TOTAL).increment(1);
    }

    pub fn record_scrape_failure() {
        ::metrics::counter!(SCRAPE_FAILURES_TOTAL).increment(1);
    }

    pub fn record_reading(speed_knots: f64) {
        ::metrics::gauge!(WIND_SPEED_KNOTS).set(speed_knots);
    }

    pub fn record_alert() {
        ::metrics::counter!(ALERTS_TOTAL).increment(1);
    }

    pub fn record_delivery_failure(notifier: &'static str) {
        ::metrics::counter!(DELIVERY_FAILURES_TOTAL, "notifier" => notifier).increment(1);
    }
}
