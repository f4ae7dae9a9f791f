//! Field extraction from the WeatherLink summary page.
//!
//! Two passes, both keyed on the page's current layout:
//! 1. label pass: find the element whose own text carries a label such as
//!    "Wind Speed" and read the first element that follows it in document
//!    order;
//! 2. text pass: regexes over the whole page text, for values the label pass
//!    missed.
//!
//! Values are returned as the raw strings shown on the page; unit handling
//! happens in [`crate::units`].

use crate::units::SPEED_UNIT_PATTERN;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use tracing::{debug, info};

pub const WIND_SPEED_LABELS: &[&str] = &["Wind Speed", "Current Wind", "Wind"];
pub const GUST_LABELS: &[&str] = &["Wind Gust", "Gust Speed", "Gust"];
pub const DIRECTION_LABELS: &[&str] = &["Wind Direction"];
pub const TEMPERATURE_LABELS: &[&str] = &["Temperature"];

static SPEED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)(\d+(?:[,.]\d+)?)\s*({SPEED_UNIT_PATTERN})")).unwrap()
});
static TEMPERATURE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:[,.]\d+)?)\s*°?\s*[CF]\b").unwrap());
static SPEED_CONTEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is)wind\s+speed.*?(\d+(?:[,.]\d+)?)\s*({SPEED_UNIT_PATTERN})"
    ))
    .unwrap()
});
static GUST_CONTEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is)(?:gust|rafale).*?(\d+(?:[,.]\d+)?)\s*({SPEED_UNIT_PATTERN})"
    ))
    .unwrap()
});
static DIRECTION_TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i:wind|from)\s+([NESW]{1,3}|(?i:north|south|east|west|nord|sud|est|ouest))\b")
        .unwrap()
});

/// Raw strings as displayed on the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawWeatherFields {
    pub wind_speed: Option<String>,
    pub gust_speed: Option<String>,
    pub wind_direction: Option<String>,
    pub temperature: Option<String>,
}

/// True once the page has rendered anything wind related.
pub fn has_wind_marker(html: &str) -> bool {
    let document = Html::parse_document(html);
    let text = page_text(&document);
    text.to_lowercase().contains("wind")
}

pub fn extract_fields(html: &str) -> RawWeatherFields {
    let document = Html::parse_document(html);
    let elements: Vec<ElementRef> = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .collect();

    let mut fields = RawWeatherFields {
        wind_speed: find_by_label(&elements, WIND_SPEED_LABELS, |t| SPEED_RE.is_match(t)),
        gust_speed: find_by_label(&elements, GUST_LABELS, |t| SPEED_RE.is_match(t)),
        wind_direction: find_by_label(&elements, DIRECTION_LABELS, |t| !t.is_empty()),
        temperature: find_by_label(&elements, TEMPERATURE_LABELS, |t| TEMPERATURE_RE.is_match(t)),
    };

    if fields.wind_speed.is_none() || fields.gust_speed.is_none() || fields.wind_direction.is_none()
    {
        info!("Label targeting incomplete, falling back to page text");
        text_fallback(&page_text(&document), &mut fields);
    }
    fields
}

/// Text directly inside `element`, excluding its children's text.
fn own_text(element: &ElementRef) -> String {
    element
        .children()
        .filter_map(|child| child.value().as_text())
        .map(|text| text.to_string())
        .collect()
}

/// For each element whose own text contains one of `labels` (tried in order),
/// look at the first element after it that is not nested inside it.
fn find_by_label<F>(elements: &[ElementRef], labels: &[&str], accept: F) -> Option<String>
where
    F: Fn(&str) -> bool,
{
    for label in labels {
        for (idx, element) in elements.iter().enumerate() {
            if !own_text(element).contains(label) {
                continue;
            }
            let following = elements[idx + 1..]
                .iter()
                .find(|candidate| !candidate.ancestors().any(|a| a == **element));
            if let Some(value_element) = following {
                let text = value_element.text().collect::<String>().trim().to_string();
                if !text.is_empty() && accept(&text) {
                    debug!("Found '{}' value: {}", label, text);
                    return Some(text);
                }
            }
        }
    }
    None
}

/// Visible text, one trimmed text node per line.
fn page_text(document: &Html) -> String {
    document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn text_fallback(text: &str, fields: &mut RawWeatherFields) {
    if fields.wind_speed.is_none() {
        fields.wind_speed = SPEED_CONTEXT_RE
            .captures(text)
            .or_else(|| SPEED_RE.captures(text))
            .map(|caps| format!("{} {}", caps[1].replace(',', "."), &caps[2]));
        if let Some(speed) = &fields.wind_speed {
            info!("Extracted wind_speed from page text: {}", speed);
        }
    }

    // No context-free fallback for gusts: the first bare speed on the page is
    // the sustained wind.
    if fields.gust_speed.is_none() {
        fields.gust_speed = GUST_CONTEXT_RE
            .captures(text)
            .map(|caps| format!("{} {}", caps[1].replace(',', "."), &caps[2]));
    }

    if fields.wind_direction.is_none() {
        fields.wind_direction = DIRECTION_TEXT_RE.captures(text).map(|caps| caps[1].to_string());
    }
}
