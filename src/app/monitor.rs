use crate::app::ports::DiagnosticSink;
use crate::config::Settings;
use crate::metrics::MonitorMetrics;
use crate::notifiers::Notifier;
use crate::types::{LastCheck, WindSource};
use crate::units::format_wind_speed;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, instrument, warn};

/// Result of one monitoring cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    BelowThreshold { speed_knots: f64 },
    /// `delivered` counts notifiers that reached every recipient.
    Alerted { speed_knots: f64, delivered: usize },
    ScrapeFailed,
}

/// Periodic wind check: fetch, compare, notify.
///
/// Cheap to clone; every cycle runs on its own clone inside a spawned task.
#[derive(Clone)]
pub struct Monitor {
    source: Arc<dyn WindSource>,
    notifiers: Arc<Vec<Box<dyn Notifier>>>,
    diagnostics: Arc<dyn DiagnosticSink>,
    url: String,
    location: String,
    threshold: f64,
    interval: Duration,
}

impl Monitor {
    pub fn new(
        settings: &Settings,
        source: Arc<dyn WindSource>,
        notifiers: Vec<Box<dyn Notifier>>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            source,
            notifiers: Arc::new(notifiers),
            diagnostics,
            url: settings.weatherlink_url.clone(),
            location: settings.location.clone(),
            threshold: settings.wind_threshold,
            interval: settings.check_interval,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn notifier_names(&self) -> Vec<&'static str> {
        self.notifiers.iter().map(|n| n.name()).collect()
    }

    #[instrument(skip(self), fields(source = self.source.source_name()))]
    pub async fn run_cycle(&self) -> CycleOutcome {
        MonitorMetrics::record_cycle();
        info!("Checking wind speed...");

        let reading = match self.source.fetch_reading(&self.url).await {
            Ok(reading) => reading,
            Err(e) => {
                MonitorMetrics::record_scrape_failure();
                warn!("Could not get wind speed data, skipping this check: {}", e);
                return CycleOutcome::ScrapeFailed;
            }
        };

        let speed = reading.speed_knots;
        MonitorMetrics::record_reading(speed);
        self.diagnostics
            .record_check(&LastCheck::from_reading(&reading, self.threshold));
        info!("Current wind speed: {}", format_wind_speed(speed));

        if !reading.exceeds(self.threshold) {
            info!(
                "Wind speed ({}) is below threshold ({} knots). No notification sent.",
                format_wind_speed(speed),
                self.threshold
            );
            return CycleOutcome::BelowThreshold { speed_knots: speed };
        }

        MonitorMetrics::record_alert();
        info!(
            "Wind speed ({}) is above threshold ({} knots). Sending notification...",
            format_wind_speed(speed),
            self.threshold
        );
        if self.notifiers.is_empty() {
            warn!("No notifiers configured, alert not delivered");
        }

        let mut delivered = 0;
        for notifier in self.notifiers.iter() {
            let ok = notifier
                .send_notification(speed, reading.gust_knots, self.threshold, &self.location)
                .await;
            if ok {
                info!("Notification sent via {}", notifier.name());
                delivered += 1;
            } else {
                MonitorMetrics::record_delivery_failure(notifier.name());
                error!("Failed to send notification via {}", notifier.name());
            }
        }

        CycleOutcome::Alerted {
            speed_knots: speed,
            delivered,
        }
    }

    /// Check immediately, then every interval until Ctrl-C. With
    /// `max_cycles` the loop also stops after that many cycles.
    pub async fn run(&self, max_cycles: Option<usize>) -> Vec<Option<CycleOutcome>> {
        self.run_until(max_cycles, tokio::signal::ctrl_c()).await
    }

    /// Same loop as [`Monitor::run`], stopped by `shutdown` instead of Ctrl-C.
    ///
    /// `shutdown` is created once and polled both while waiting for the next
    /// tick and while a cycle runs. A cycle still in flight when it fires is
    /// aborted and left out of the returned outcomes. A panic inside a cycle
    /// is logged and reported as `None`.
    pub async fn run_until<F>(
        &self,
        max_cycles: Option<usize>,
        shutdown: F,
    ) -> Vec<Option<CycleOutcome>>
    where
        F: Future,
    {
        info!(
            "Starting wind monitor for {} (threshold {} knots, every {} min, notifiers: {})",
            self.location,
            self.threshold,
            self.interval.as_secs() / 60,
            self.notifier_names().join(", ")
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut outcomes = Vec::new();
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = &mut shutdown => {
                    info!("Wind monitor stopped by user");
                    break;
                }
            }

            let monitor = self.clone();
            let mut cycle = tokio::spawn(async move { monitor.run_cycle().await });
            let outcome = tokio::select! {
                joined = &mut cycle => match joined {
                    Ok(outcome) => Some(outcome),
                    Err(e) => {
                        error!("Error in monitoring cycle: {}", e);
                        None
                    }
                },
                _ = &mut shutdown => {
                    cycle.abort();
                    info!("Wind monitor stopped by user during a check");
                    break;
                }
            };
            outcomes.push(outcome);

            if max_cycles.is_some_and(|max| outcomes.len() >= max) {
                break;
            }
            info!("Next check in {} minutes", self.interval.as_secs() / 60);
        }
        outcomes
    }
}
