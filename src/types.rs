use crate::error::ScrapeError;
use crate::units::wind_description;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation from the dashboard, all speeds in knots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindReading {
    pub speed_knots: f64,
    pub gust_knots: Option<f64>,
    pub direction: Option<String>,
    pub temperature_c: Option<f64>,
    pub fetched_at: DateTime<Utc>,
}

impl WindReading {
    pub fn new(speed_knots: f64) -> Self {
        Self {
            speed_knots,
            gust_knots: None,
            direction: None,
            temperature_c: None,
            fetched_at: Utc::now(),
        }
    }

    /// Strict comparison: a reading equal to the threshold does not alert.
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.speed_knots > threshold
    }
}

/// Snapshot of the latest successful check, overwritten every cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastCheck {
    pub timestamp: i64,
    pub datetime: String,
    pub wind_speed: f64,
    pub wind_gust: Option<f64>,
    pub wind_description: String,
    pub beaufort_scale: u8,
    pub threshold: f64,
    pub above_threshold: bool,
}

impl LastCheck {
    pub fn from_reading(reading: &WindReading, threshold: f64) -> Self {
        let (beaufort, label) = wind_description(reading.speed_knots);
        Self {
            timestamp: reading.fetched_at.timestamp(),
            datetime: reading.fetched_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            wind_speed: reading.speed_knots,
            wind_gust: reading.gust_knots,
            wind_description: label.to_string(),
            beaufort_scale: beaufort,
            threshold,
            above_threshold: reading.exceeds(threshold),
        }
    }
}

/// Core trait for anything that can produce a wind reading.
#[async_trait::async_trait]
pub trait WindSource: Send + Sync {
    /// Short identifier used in logs
    fn source_name(&self) -> &'static str;

    /// Load the dashboard at `url` and extract the current reading
    async fn fetch_reading(&self, url: &str) -> Result<WindReading, ScrapeError>;
}
