use crate::constants::SIGNATURE;
use crate::units::{format_gust, format_threshold, format_wind_speed, wind_description, Beaufort};
use chrono::{DateTime, Local};

/// Alert content derived from one reading. Built fresh for every send.
#[derive(Debug, Clone)]
pub struct AlertMessage {
    pub wind_speed: String,
    pub description: &'static str,
    pub beaufort: Beaufort,
    pub gust: String,
    pub threshold: String,
    pub location: String,
    pub website_url: String,
    pub generated_at: DateTime<Local>,
}

impl AlertMessage {
    pub fn new(
        wind_speed: f64,
        wind_gust: Option<f64>,
        threshold: f64,
        location: &str,
        website_url: &str,
    ) -> Self {
        let (beaufort, description) = wind_description(wind_speed);
        Self {
            wind_speed: format_wind_speed(wind_speed),
            description,
            beaufort,
            gust: format_gust(wind_gust),
            threshold: format_threshold(threshold),
            location: location.to_string(),
            website_url: website_url.to_string(),
            generated_at: Local::now(),
        }
    }

    fn timestamp(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M:%S %:z").to_string()
    }

    pub fn subject(&self) -> String {
        format!("High Wind Alert: {}", self.wind_speed)
    }

    pub fn text(&self) -> String {
        format!(
            "High Wind Alert!\n\
             \n\
             High wind conditions have been detected at {location}!\n\
             \n\
             Current wind speed: {speed}\n\
             Wind conditions: {description}\n\
             Wind gusts: {gust}\n\
             Alert threshold: {threshold} knots\n\
             \n\
             Check the website for more details: {url}\n\
             \n\
             {signature}\n\
             Time: {time}\n",
            location = self.location,
            speed = self.wind_speed,
            description = self.description,
            gust = self.gust,
            threshold = self.threshold,
            url = self.website_url,
            signature = SIGNATURE,
            time = self.timestamp(),
        )
    }

    /// Plain markup only; email clients strip most CSS.
    pub fn html(&self) -> String {
        format!(
            r#"<html>
<body>
  <h1>High Wind Alert!</h1>
  <p>High wind conditions have been detected at <strong>{location}</strong>!</p>
  <p><strong>Current wind speed:</strong> {speed}</p>
  <p><strong>Wind conditions:</strong> {description}</p>
  <p><strong>Wind gusts:</strong> {gust}</p>
  <p><strong>Alert threshold:</strong> {threshold} knots</p>
  <p><a href="{url}">View Port Website</a></p>
  <p style="color: #777; font-size: 0.8em;">
    {signature}<br>
    Time: {time}
  </p>
</body>
</html>
"#,
            location = escape_html(&self.location),
            speed = self.wind_speed,
            description = self.description,
            gust = self.gust,
            threshold = self.threshold,
            url = escape_html(&self.website_url),
            signature = SIGNATURE,
            time = self.timestamp(),
        )
    }

    /// Icon for the scale level, used by the compact bot format.
    pub fn icon(&self) -> &'static str {
        match self.beaufort {
            0..=3 => "🌬️",
            4..=5 => "💨",
            6..=7 => "🌪️",
            _ => "⚠️🌪️",
        }
    }

    /// Single Telegram message in legacy Markdown.
    pub fn telegram_markdown(&self) -> String {
        let icon = self.icon();
        format!(
            "{icon} *High Wind Alert* {icon}\n\
             \n\
             *Location:* {location}\n\
             \n\
             *Current Wind Speed:* {speed}\n\
             *Wind Conditions:* {description}\n\
             *Wind Gusts:* {gust}\n\
             *Alert Threshold:* {threshold} knots\n\
             \n\
             Click [here]({url}) to check the port website.\n\
             \n\
             _Sent by Windy Notifier at {time}_",
            icon = icon,
            location = escape_markdown(&self.location),
            speed = self.wind_speed,
            description = self.description,
            gust = self.gust,
            threshold = self.threshold,
            url = markdown_link_target(&self.website_url),
            time = self.timestamp(),
        )
    }
}

/// Backslash-escape the characters legacy Telegram Markdown treats as markup.
fn escape_markdown(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '_' | '*' | '[' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Link targets are not unescaped by Telegram, so markup characters and the
/// closing parenthesis are percent-encoded instead.
fn markdown_link_target(url: &str) -> String {
    let mut encoded = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '_' => encoded.push_str("%5F"),
            '*' => encoded.push_str("%2A"),
            '[' => encoded.push_str("%5B"),
            ']' => encoded.push_str("%5D"),
            '`' => encoded.push_str("%60"),
            '(' => encoded.push_str("%28"),
            ')' => encoded.push_str("%29"),
            ' ' => encoded.push_str("%20"),
            _ => encoded.push(c),
        }
    }
    encoded
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(gust: Option<f64>) -> AlertMessage {
        AlertMessage::new(18.5, gust, 15.0, "Saint-Raphaël port", "https://example.org/port")
    }

    #[test]
    fn test_all_formats_carry_the_numbers() {
        let message = sample(Some(24.2));
        for body in [message.text(), message.html(), message.telegram_markdown()] {
            assert!(body.contains("18.5"), "missing speed in {body}");
            assert!(body.contains("15"), "missing threshold in {body}");
            assert!(body.contains("Fresh breeze"));
            assert!(body.contains("24.2 knots"));
            assert!(body.contains("https://example.org/port"));
            assert!(body.contains("Saint-Raphaël port"));
        }
        assert!(!message.description.is_empty());
        assert_eq!(message.subject(), "High Wind Alert: 18.5 knots");
    }

    #[test]
    fn test_missing_gust_shows_placeholder() {
        let message = sample(None);
        assert!(message.text().contains("Wind gusts: N/A"));
        assert!(message.html().contains("<strong>Wind gusts:</strong> N/A"));
        assert!(message.telegram_markdown().contains("*Wind Gusts:* N/A"));
    }

    #[test]
    fn test_threshold_is_rendered_literally() {
        let message = sample(None);
        assert!(message.text().contains("Alert threshold: 15 knots"));
    }

    #[test]
    fn test_icon_follows_scale() {
        assert_eq!(AlertMessage::new(2.0, None, 1.0, "x", "u").icon(), "🌬️");
        assert_eq!(AlertMessage::new(18.5, None, 1.0, "x", "u").icon(), "💨");
        assert_eq!(AlertMessage::new(30.0, None, 1.0, "x", "u").icon(), "🌪️");
        assert_eq!(AlertMessage::new(45.0, None, 1.0, "x", "u").icon(), "⚠️🌪️");
    }

    #[test]
    fn test_html_escapes_location() {
        let message = AlertMessage::new(20.0, None, 15.0, "Port <A&B>", "https://x");
        assert!(message.html().contains("Port &lt;A&amp;B&gt;"));
    }

    #[test]
    fn test_telegram_escapes_markup_in_location() {
        let message = AlertMessage::new(20.0, None, 15.0, "Port_A*B [`x`]", "https://x");
        let body = message.telegram_markdown();
        assert!(body.contains(r"*Location:* Port\_A\*B \[\`x\`]"));
        assert!(message
            .text()
            .contains("High wind conditions have been detected at Port_A*B [`x`]!"));
    }

    #[test]
    fn test_telegram_link_target_cannot_break_markup() {
        let message = AlertMessage::new(
            20.0,
            None,
            15.0,
            "port",
            "https://example.org/wind_map(1)*",
        );
        let body = message.telegram_markdown();
        assert!(body.contains("[here](https://example.org/wind%5Fmap%281%29%2A)"));
    }
}
