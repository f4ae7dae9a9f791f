use crate::error::{NotifyError, ScrapeError};
use crate::types::LastCheck;
use async_trait::async_trait;

// Scrape-side ports
#[async_trait]
pub trait PageLoader: Send + Sync {
    fn loader_name(&self) -> &'static str;

    /// Whether page scripts run before the HTML is returned.
    fn renders_scripts(&self) -> bool {
        false
    }

    async fn load(&self, url: &str) -> Result<LoadedPage, ScrapeError>;
}

#[derive(Clone, Debug)]
pub struct LoadedPage {
    pub html: String,
    /// PNG bytes, only when the loader renders the page
    pub screenshot: Option<Vec<u8>>,
}

/// What gets kept for manual diagnosis when a scrape fails.
#[derive(Clone, Debug, Default)]
pub struct DebugArtifacts {
    pub reason: String,
    pub html: Option<String>,
    pub screenshot: Option<Vec<u8>>,
}

/// Receiver of diagnostic side effects. Implementations must not fail the caller.
pub trait DiagnosticSink: Send + Sync {
    fn record_failure(&self, artifacts: &DebugArtifacts);
    fn record_check(&self, check: &LastCheck);
}

// Delivery-side ports
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: lettre::Message) -> Result<(), NotifyError>;
}

#[async_trait]
pub trait BotApi: Send + Sync {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), NotifyError>;
}
