//! Headless Chrome page loader for the script-rendered dashboard.

use crate::app::ports::{LoadedPage, PageLoader};
use crate::constants::{PAGE_LOAD_TIMEOUT_SECS, RENDER_SETTLE_SECS, USER_AGENT};
use crate::error::ScrapeError;
use anyhow::anyhow;
use async_trait::async_trait;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions};
use std::ffi::OsStr;
use std::time::Duration;
use tracing::{info, warn};

pub struct ChromePageLoader {
    settle: Duration,
}

impl Default for ChromePageLoader {
    fn default() -> Self {
        Self::new(Duration::from_secs(RENDER_SETTLE_SECS))
    }
}

impl ChromePageLoader {
    /// `settle` is how long to let the page scripts run after `body` appears.
    pub fn new(settle: Duration) -> Self {
        Self { settle }
    }
}

fn render_blocking(url: &str, settle: Duration) -> anyhow::Result<LoadedPage> {
    let user_agent_arg = format!("--user-agent={}", USER_AGENT);
    let options = LaunchOptions::default_builder()
        .headless(true)
        .sandbox(false)
        .window_size(Some((1920, 1080)))
        .args(vec![
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new(user_agent_arg.as_str()),
        ])
        .build()
        .map_err(|e| anyhow!("invalid launch options: {}", e))?;

    let browser = Browser::new(options)?;
    info!("Chrome driver initialized");
    let tab = browser.new_tab()?;
    tab.set_default_timeout(Duration::from_secs(PAGE_LOAD_TIMEOUT_SECS));
    tab.navigate_to(url)?.wait_until_navigated()?;
    info!("URL loaded");

    if let Err(e) = tab.wait_for_element("body") {
        warn!("Waiting for body tag failed: {}", e);
    }
    // Values are filled in by the page scripts after load
    std::thread::sleep(settle);

    let html = tab.get_content()?;
    let screenshot = match tab.capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
    {
        Ok(png) => Some(png),
        Err(e) => {
            warn!("Could not capture screenshot: {}", e);
            None
        }
    };
    Ok(LoadedPage { html, screenshot })
}

#[async_trait]
impl PageLoader for ChromePageLoader {
    fn loader_name(&self) -> &'static str {
        "chrome"
    }

    fn renders_scripts(&self) -> bool {
        true
    }

    async fn load(&self, url: &str) -> Result<LoadedPage, ScrapeError> {
        let url = url.to_string();
        let settle = self.settle;
        tokio::task::spawn_blocking(move || render_blocking(&url, settle))
            .await
            .map_err(|e| ScrapeError::PageLoad(format!("browser task failed: {}", e)))?
            .map_err(|e| ScrapeError::PageLoad(e.to_string()))
    }
}
