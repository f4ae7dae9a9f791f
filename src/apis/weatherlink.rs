use crate::apis::extract::{extract_fields, has_wind_marker, RawWeatherFields};
use crate::app::ports::{DebugArtifacts, DiagnosticSink, LoadedPage, PageLoader};
use crate::error::ScrapeError;
use crate::types::{WindReading, WindSource};
use crate::units::{convert_to_knots, parse_temperature, parse_wind_value};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

pub const WEATHERLINK_SOURCE: &str = "weatherlink";

/// Scraper for the WeatherLink embeddable summary page.
pub struct WeatherLinkScraper {
    loader: Arc<dyn PageLoader>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl WeatherLinkScraper {
    pub fn new(loader: Arc<dyn PageLoader>, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            loader,
            diagnostics,
        }
    }

    /// Headless Chrome when built with the `browser` feature, plain HTTP otherwise.
    pub fn default_loader() -> Result<Arc<dyn PageLoader>, ScrapeError> {
        #[cfg(feature = "browser")]
        {
            Ok(Arc::new(crate::infra::chrome::ChromePageLoader::default()))
        }
        #[cfg(not(feature = "browser"))]
        {
            Ok(Arc::new(crate::infra::http_client::HttpPageLoader::new()?))
        }
    }

    /// Turn a rendered page into a reading. Wind speed is required; gust,
    /// direction and temperature are best effort.
    pub fn parse_page(html: &str) -> Result<WindReading, ScrapeError> {
        if !has_wind_marker(html) {
            return Err(ScrapeError::MissingElement(
                "no wind marker text on page (not rendered yet?)".into(),
            ));
        }

        let fields = extract_fields(html);
        info!("Weather data: {:?}", fields);
        Self::reading_from_fields(fields)
    }

    fn reading_from_fields(fields: RawWeatherFields) -> Result<WindReading, ScrapeError> {
        let raw_speed = fields
            .wind_speed
            .ok_or_else(|| ScrapeError::MissingElement("wind speed".into()))?;
        let (value, unit) = parse_wind_value(&raw_speed).ok_or_else(|| ScrapeError::NonNumeric {
            field: "wind_speed".into(),
            value: raw_speed.clone(),
        })?;
        let speed_knots = convert_to_knots(value, unit);
        info!("Wind speed: {} {} ({:.2} knots)", value, unit, speed_knots);

        let gust_knots = fields.gust_speed.as_deref().and_then(|raw| {
            match parse_wind_value(raw) {
                Some((value, unit)) => {
                    let knots = convert_to_knots(value, unit);
                    info!("Wind gust: {} {} ({:.2} knots)", value, unit, knots);
                    Some(knots)
                }
                None => {
                    warn!("Ignoring non-numeric gust value: {:?}", raw);
                    None
                }
            }
        });

        let temperature_c = fields.temperature.as_deref().and_then(|raw| {
            let parsed = parse_temperature(raw);
            if parsed.is_none() {
                warn!("Ignoring unparseable temperature: {:?}", raw);
            }
            parsed
        });

        Ok(WindReading {
            speed_knots,
            gust_knots,
            direction: fields.wind_direction,
            temperature_c,
            fetched_at: Utc::now(),
        })
    }

    fn save_artifacts(&self, reason: &ScrapeError, page: Option<&LoadedPage>) {
        self.diagnostics.record_failure(&DebugArtifacts {
            reason: reason.to_string(),
            html: page.map(|p| p.html.clone()),
            screenshot: page.and_then(|p| p.screenshot.clone()),
        });
    }
}

#[async_trait::async_trait]
impl WindSource for WeatherLinkScraper {
    fn source_name(&self) -> &'static str {
        WEATHERLINK_SOURCE
    }

    #[instrument(skip(self), fields(loader = self.loader.loader_name()))]
    async fn fetch_reading(&self, url: &str) -> Result<WindReading, ScrapeError> {
        let page = match self.loader.load(url).await {
            Ok(page) => page,
            Err(e) => {
                error!("Error accessing website: {}", e);
                self.save_artifacts(&e, None);
                return Err(e);
            }
        };

        match Self::parse_page(&page.html) {
            Ok(reading) => Ok(reading),
            Err(e) => {
                error!("Could not extract wind data: {}", e);
                self.save_artifacts(&e, Some(&page));
                Err(e)
            }
        }
    }
}
