use thiserror::Error;

/// Failures while loading or reading the wind dashboard.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Page failed to load: {0}")]
    PageLoad(String),

    #[error("Missing required element: {0}")]
    MissingElement(String),

    #[error("Non-numeric value for {field}: {value:?}")]
    NonNumeric { field: String, value: String },
}

impl From<reqwest::Error> for ScrapeError {
    fn from(err: reqwest::Error) -> Self {
        ScrapeError::PageLoad(err.to_string())
    }
}

/// Failure delivering one alert to one recipient.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Invalid address {address:?}: {message}")]
    Address { address: String, message: String },

    #[error("Failed to build message: {0}")]
    Message(String),

    #[error("SMTP error: {0}")]
    Smtp(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bot API error: {message}")]
    Api { message: String },
}

#[derive(Error, Debug)]
pub enum WindyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("No usable notifier for method '{method}'")]
    NoNotifiers { method: String },
}

pub type Result<T> = std::result::Result<T, WindyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_toml_converts_to_windy_error() {
        let parsed: std::result::Result<toml::Value, _> = toml::from_str("threshold = ");
        let err: WindyError = parsed.unwrap_err().into();
        assert!(matches!(err, WindyError::Toml(_)));
        assert!(err.to_string().starts_with("TOML deserialization failed"));
    }

    #[test]
    fn test_no_notifiers_names_the_method() {
        let err = WindyError::NoNotifiers {
            method: "both".into(),
        };
        assert_eq!(err.to_string(), "No usable notifier for method 'both'");
    }
}
