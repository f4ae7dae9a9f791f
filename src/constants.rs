/// Defaults and well-known names shared across the crate.

// Monitored site
pub const DEFAULT_WEATHERLINK_URL: &str =
    "https://www.weatherlink.com/embeddablePage/show/d8f389c51427467eb5c4f266caaf78a9/summary";
pub const DEFAULT_PORT_WEBSITE_URL: &str =
    "https://www.ville-saintraphael.fr/utile/la-regie-des-ports-raphaelois";
pub const DEFAULT_LOCATION: &str = "Saint-Raphaël port";

// Alerting
pub const DEFAULT_WIND_THRESHOLD: f64 = 15.0;
pub const DEFAULT_CHECK_INTERVAL_MINUTES: u64 = 30;

// SMTP
pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

// Telegram
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const TELEGRAM_TIMEOUT_SECS: u64 = 10;

// Page loading
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const PAGE_LOAD_TIMEOUT_SECS: u64 = 30;
pub const RENDER_SETTLE_SECS: u64 = 8;

// Debug artifacts
pub const DEFAULT_DEBUG_DIR: &str = "debug";
pub const SCREENSHOT_FILE: &str = "weatherlink_debug.png";
pub const PAGE_DUMP_FILE: &str = "last_weatherlink_page.html";
pub const LAST_CHECK_FILE: &str = "last_check.json";
pub const LOG_FILE: &str = "windy_notifier.log";

/// Footer line attached to every alert.
pub const SIGNATURE: &str = "This is an automated message from Windy Notifier.";
