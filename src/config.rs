use crate::constants::*;
use crate::error::{Result, WindyError};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Which notifier backends the monitor should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationMethod {
    Email,
    Telegram,
    Both,
}

impl NotificationMethod {
    /// Unknown selectors fall back to email.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "email" => NotificationMethod::Email,
            "telegram" => NotificationMethod::Telegram,
            "both" => NotificationMethod::Both,
            other => {
                warn!("Unknown notification method '{}', defaulting to email", other);
                NotificationMethod::Email
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationMethod::Email => "email",
            NotificationMethod::Telegram => "telegram",
            NotificationMethod::Both => "both",
        }
    }

    pub fn uses_email(&self) -> bool {
        matches!(self, NotificationMethod::Email | NotificationMethod::Both)
    }

    pub fn uses_telegram(&self) -> bool {
        matches!(self, NotificationMethod::Telegram | NotificationMethod::Both)
    }
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Falls back to `username` when not set
    pub sender: Option<String>,
    pub recipients: Vec<String>,
    pub website_url: String,
}

impl EmailConfig {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.smtp_server.trim().is_empty() {
            missing.push("SMTP_SERVER");
        }
        if self.username.is_none() {
            missing.push("SMTP_USERNAME");
        }
        if self.password.is_none() {
            missing.push("SMTP_PASSWORD");
        }
        if self.sender.is_none() {
            missing.push("SENDER_EMAIL");
        }
        if self.recipients.is_empty() {
            missing.push("RECIPIENT_EMAIL");
        }
        missing
    }

    pub fn is_configured(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_ids: Vec<String>,
    pub website_url: String,
    pub api_base: String,
}

impl TelegramConfig {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.bot_token.is_none() {
            missing.push("TELEGRAM_BOT_TOKEN");
        }
        if self.chat_ids.is_empty() {
            missing.push("TELEGRAM_CHAT_ID");
        }
        missing
    }

    pub fn is_configured(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Everything the process needs, loaded once at startup and passed down.
#[derive(Debug, Clone)]
pub struct Settings {
    pub wind_threshold: f64,
    pub check_interval: Duration,
    pub notification_method: NotificationMethod,
    pub weatherlink_url: String,
    pub location: String,
    pub debug_dir: PathBuf,
    pub prometheus_addr: Option<SocketAddr>,
    pub email: EmailConfig,
    pub telegram: TelegramConfig,
}

impl Settings {
    /// Load from the process environment (after `.env`, if present).
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from a TOML file whose keys are the lowercase env var names.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            WindyError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(content)?;
        Self::from_lookup(|key| table.get(&key.to_lowercase()).and_then(toml_value_to_string))
    }

    /// Build settings from any key-value source using the env var names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let wind_threshold = parse_or(&get, "WIND_THRESHOLD", DEFAULT_WIND_THRESHOLD)?;
        let interval_minutes: u64 =
            parse_or(&get, "CHECK_INTERVAL_MINUTES", DEFAULT_CHECK_INTERVAL_MINUTES)?;
        if interval_minutes == 0 {
            return Err(WindyError::Config("CHECK_INTERVAL_MINUTES must be at least 1".into()));
        }

        let notification_method = get("NOTIFICATION_METHOD")
            .map(|m| NotificationMethod::parse(&m))
            .unwrap_or(NotificationMethod::Email);

        let website_url =
            get("PORT_WEBSITE_URL").unwrap_or_else(|| DEFAULT_PORT_WEBSITE_URL.to_string());

        let prometheus_addr = match get("PROMETHEUS_ADDR") {
            Some(addr) => Some(addr.parse::<SocketAddr>().map_err(|e| {
                WindyError::Config(format!("Invalid PROMETHEUS_ADDR '{}': {}", addr, e))
            })?),
            None => None,
        };

        let username = get("SMTP_USERNAME");
        let email = EmailConfig {
            smtp_server: get("SMTP_SERVER").unwrap_or_else(|| DEFAULT_SMTP_SERVER.to_string()),
            smtp_port: parse_or(&get, "SMTP_PORT", DEFAULT_SMTP_PORT)?,
            sender: get("SENDER_EMAIL").or_else(|| username.clone()),
            username,
            password: get("SMTP_PASSWORD"),
            recipients: split_list(get("RECIPIENT_EMAIL").as_deref()),
            website_url: website_url.clone(),
        };

        let telegram = TelegramConfig {
            bot_token: get("TELEGRAM_BOT_TOKEN"),
            chat_ids: split_list(get("TELEGRAM_CHAT_ID").as_deref()),
            website_url,
            api_base: get("TELEGRAM_API_BASE").unwrap_or_else(|| TELEGRAM_API_BASE.to_string()),
        };

        Ok(Settings {
            wind_threshold,
            check_interval: Duration::from_secs(interval_minutes * 60),
            notification_method,
            weatherlink_url: get("WEATHERLINK_URL")
                .unwrap_or_else(|| DEFAULT_WEATHERLINK_URL.to_string()),
            location: get("LOCATION_NAME").unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            debug_dir: get("DEBUG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DEBUG_DIR)),
            prometheus_addr,
            email,
            telegram,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| WindyError::Config(format!("Invalid {} '{}': {}", key, raw, e))),
        None => Ok(default),
    }
}

/// Comma-separated recipients, blanks dropped, order kept.
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn toml_value_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Array(items) => Some(
            items
                .iter()
                .filter_map(toml_value_to_string)
                .collect::<Vec<_>>()
                .join(","),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Result<Settings> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings_from(&[]).unwrap();
        assert_eq!(settings.wind_threshold, 15.0);
        assert_eq!(settings.check_interval, Duration::from_secs(30 * 60));
        assert_eq!(settings.notification_method, NotificationMethod::Email);
        assert_eq!(settings.email.smtp_server, "smtp.gmail.com");
        assert_eq!(settings.email.smtp_port, 587);
        assert_eq!(settings.location, "Saint-Raphaël port");
        assert!(!settings.email.is_configured());
        assert!(!settings.telegram.is_configured());
        assert!(settings.prometheus_addr.is_none());
    }

    #[test]
    fn test_recipient_lists_are_split() {
        let settings = settings_from(&[
            ("RECIPIENT_EMAIL", "a@example.com, b@example.com,,"),
            ("TELEGRAM_CHAT_ID", "123,456"),
        ])
        .unwrap();
        assert_eq!(settings.email.recipients, vec!["a@example.com", "b@example.com"]);
        assert_eq!(settings.telegram.chat_ids, vec!["123", "456"]);
    }

    #[test]
    fn test_sender_falls_back_to_username() {
        let settings = settings_from(&[
            ("SMTP_USERNAME", "me@example.com"),
            ("SMTP_PASSWORD", "secret"),
            ("RECIPIENT_EMAIL", "you@example.com"),
        ])
        .unwrap();
        assert_eq!(settings.email.sender.as_deref(), Some("me@example.com"));
        assert!(settings.email.is_configured());
    }

    #[test]
    fn test_missing_fields_reported() {
        let settings = settings_from(&[("SMTP_USERNAME", "me@example.com")]).unwrap();
        let missing = settings.email.missing_fields();
        assert!(missing.contains(&"SMTP_PASSWORD"));
        assert!(missing.contains(&"RECIPIENT_EMAIL"));
        assert!(!missing.contains(&"SENDER_EMAIL"));
    }

    #[test]
    fn test_blank_values_are_absent() {
        let settings = settings_from(&[("TELEGRAM_BOT_TOKEN", "  "), ("TELEGRAM_CHAT_ID", "1")])
            .unwrap();
        assert!(settings.telegram.bot_token.is_none());
        assert!(!settings.telegram.is_configured());
    }

    #[test]
    fn test_invalid_numbers_are_config_errors() {
        let err = settings_from(&[("WIND_THRESHOLD", "windy")]).unwrap_err();
        assert!(matches!(err, WindyError::Config(_)));
        assert!(settings_from(&[("CHECK_INTERVAL_MINUTES", "0")]).is_err());
        assert!(settings_from(&[("PROMETHEUS_ADDR", "nope")]).is_err());
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!(NotificationMethod::parse("Telegram"), NotificationMethod::Telegram);
        assert_eq!(NotificationMethod::parse("both"), NotificationMethod::Both);
        assert_eq!(NotificationMethod::parse("pigeon"), NotificationMethod::Email);
        assert!(NotificationMethod::Both.uses_email());
        assert!(!NotificationMethod::Email.uses_telegram());
    }

    #[test]
    fn test_toml_source() {
        let settings = Settings::from_toml_str(
            r#"
            wind_threshold = 20
            check_interval_minutes = 5
            notification_method = "telegram"
            telegram_bot_token = "123:abc"
            telegram_chat_id = ["42", "43"]
            "#,
        )
        .unwrap();
        assert_eq!(settings.wind_threshold, 20.0);
        assert_eq!(settings.check_interval, Duration::from_secs(300));
        assert_eq!(settings.notification_method, NotificationMethod::Telegram);
        assert_eq!(settings.telegram.chat_ids, vec!["42", "43"]);
        assert!(settings.telegram.is_configured());
    }
}
