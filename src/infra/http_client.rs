use crate::app::ports::{LoadedPage, PageLoader};
use crate::constants::{PAGE_LOAD_TIMEOUT_SECS, USER_AGENT};
use crate::error::ScrapeError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, info};

/// Plain HTTP GET. Sees only the server-rendered HTML and never produces a
/// screenshot.
pub struct HttpPageLoader {
    client: reqwest::Client,
}

impl HttpPageLoader {
    pub fn new() -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(PAGE_LOAD_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageLoader for HttpPageLoader {
    fn loader_name(&self) -> &'static str {
        "http"
    }

    async fn load(&self, url: &str) -> Result<LoadedPage, ScrapeError> {
        info!("Accessing {} over HTTP", url);
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::PageLoad(format!(
                "{} returned status {}",
                url, status
            )));
        }
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_string();
        let html = resp.text().await?;
        debug!("Loaded {} bytes ({})", html.len(), content_type);
        Ok(LoadedPage {
            html,
            screenshot: None,
        })
    }
}
