//! Wind speed helpers: Beaufort lookup, display formatting and unit parsing.
//!
//! Everything here is a display helper. Out-of-range input (negative, NaN,
//! absurdly large) is formatted or classified as given rather than rejected.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Beaufort force number, 0 (calm) to 12 (hurricane force).
pub type Beaufort = u8;

/// Upper knot bound of each force, paired with its label. Calm includes its
/// bound; every other band excludes it. A speed belongs to the first band
/// whose bound it is below.
const BEAUFORT_SCALE: [(f64, &str); 13] = [
    (1.0, "Calm"),
    (4.0, "Light air"),
    (7.0, "Light breeze"),
    (11.0, "Gentle breeze"),
    (17.0, "Moderate breeze"),
    (22.0, "Fresh breeze"),
    (28.0, "Strong breeze"),
    (34.0, "Near gale"),
    (41.0, "Gale"),
    (48.0, "Strong gale"),
    (56.0, "Storm"),
    (64.0, "Violent storm"),
    (f64::INFINITY, "Hurricane force"),
];

/// Map a speed in knots to its Beaufort force and label.
pub fn wind_description(speed_knots: f64) -> (Beaufort, &'static str) {
    let (calm_max, calm) = BEAUFORT_SCALE[0];
    if speed_knots.is_nan() || speed_knots <= calm_max {
        return (0, calm);
    }
    for (force, (upper, label)) in BEAUFORT_SCALE.iter().enumerate().skip(1) {
        if speed_knots < *upper {
            return (force as Beaufort, label);
        }
    }
    (12, "Hurricane force")
}

/// `18.5` -> `"18.5 knots"`.
pub fn format_wind_speed(speed_knots: f64) -> String {
    format!("{speed_knots:.1} knots")
}

/// Gust speed or `N/A` when the dashboard did not report one.
pub fn format_gust(gust_knots: Option<f64>) -> String {
    match gust_knots {
        Some(gust) => format_wind_speed(gust),
        None => "N/A".to_string(),
    }
}

/// Threshold as shown in alerts: integral values without a decimal part.
pub fn format_threshold(threshold: f64) -> String {
    if threshold.fract() == 0.0 && threshold.is_finite() {
        format!("{threshold:.0}")
    } else {
        format!("{threshold}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedUnit {
    Knots,
    KilometersPerHour,
    MilesPerHour,
    MetersPerSecond,
}

impl SpeedUnit {
    pub fn parse(unit: &str) -> Option<Self> {
        match unit.trim().to_lowercase().as_str() {
            "knots" | "kts" | "kt" => Some(SpeedUnit::Knots),
            "km/h" | "kph" => Some(SpeedUnit::KilometersPerHour),
            "mph" => Some(SpeedUnit::MilesPerHour),
            "m/s" => Some(SpeedUnit::MetersPerSecond),
            _ => None,
        }
    }
}

impl fmt::Display for SpeedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SpeedUnit::Knots => "knots",
            SpeedUnit::KilometersPerHour => "km/h",
            SpeedUnit::MilesPerHour => "mph",
            SpeedUnit::MetersPerSecond => "m/s",
        };
        f.write_str(s)
    }
}

pub fn convert_to_knots(value: f64, unit: SpeedUnit) -> f64 {
    match unit {
        SpeedUnit::Knots => value,
        SpeedUnit::KilometersPerHour => value * 0.539957,
        SpeedUnit::MilesPerHour => value * 0.868976,
        SpeedUnit::MetersPerSecond => value * 1.94384,
    }
}

/// Every unit spelling [`SpeedUnit::parse`] understands, as a regex alternation.
/// Longer spellings come first so `kts` wins over `kt`.
pub const SPEED_UNIT_PATTERN: &str = "mph|km/h|kph|kts|knots|kt|m/s";

static SPEED_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)(\d+(?:[,.]\d+)?)\s*({SPEED_UNIT_PATTERN})?")).expect("valid regex")
});

static TEMPERATURE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(-?\d+(?:[,.]\d+)?)\s*°?\s*([CF])\b").expect("valid regex"));

/// Parse the first speed in a dashboard string such as `"12,5 mph"`.
///
/// Comma decimals are accepted. Without a unit the dashboard's default, mph,
/// is assumed.
pub fn parse_wind_value(text: &str) -> Option<(f64, SpeedUnit)> {
    let caps = SPEED_VALUE_RE.captures(text)?;
    let value: f64 = caps.get(1)?.as_str().replace(',', ".").parse().ok()?;
    let unit = caps
        .get(2)
        .and_then(|m| SpeedUnit::parse(m.as_str()))
        .unwrap_or(SpeedUnit::MilesPerHour);
    Some((value, unit))
}

/// Parse a temperature string (`"21.4 °C"`, `"70 F"`) into degrees Celsius.
pub fn parse_temperature(text: &str) -> Option<f64> {
    let caps = TEMPERATURE_RE.captures(text)?;
    let value: f64 = caps.get(1)?.as_str().replace(',', ".").parse().ok()?;
    match caps.get(2)?.as_str() {
        "F" | "f" => Some((value - 32.0) * 5.0 / 9.0),
        _ => Some(value),
    }
}
