//! Manual self-checks behind `windy_notifier check`. Results go to stdout as
//! pass/fail lines; the caller maps `false` to a non-zero exit code.

use crate::apis::weatherlink::WeatherLinkScraper;
use crate::config::Settings;
use crate::infra::diagnostics::FsDiagnosticSink;
use crate::notifiers::email::EmailNotifier;
use crate::notifiers::telegram::{mask_token, TelegramNotifier};
use crate::notifiers::Notifier;
use crate::types::WindSource;
use crate::units::{format_gust, format_wind_speed, wind_description};
use std::sync::Arc;

/// Fetch one live reading and print what was extracted.
pub async fn check_scraper(settings: &Settings) -> bool {
    println!("\n===== Testing Wind Data Extraction =====");
    println!("Accessing {} ...", settings.weatherlink_url);

    let loader = match WeatherLinkScraper::default_loader() {
        Ok(loader) => loader,
        Err(e) => {
            println!("❌ Could not create page loader: {}", e);
            return false;
        }
    };
    let diagnostics = Arc::new(FsDiagnosticSink::new(&settings.debug_dir));
    let scraper = WeatherLinkScraper::new(loader, diagnostics);

    match scraper.fetch_reading(&settings.weatherlink_url).await {
        Ok(reading) => {
            let (beaufort, label) = wind_description(reading.speed_knots);
            println!("\nWind Speed: {}", format_wind_speed(reading.speed_knots));
            println!("Wind Conditions: {} (Beaufort {})", label, beaufort);
            println!("Wind Gust: {}", format_gust(reading.gust_knots));
            if let Some(direction) = &reading.direction {
                println!("Wind Direction: {}", direction);
            }
            if let Some(temp) = reading.temperature_c {
                println!("Temperature: {:.1} °C", temp);
            }
            let status = if reading.exceeds(settings.wind_threshold) {
                "ABOVE"
            } else {
                "below"
            };
            println!(
                "Current wind is {} the alert threshold of {} knots",
                status, settings.wind_threshold
            );
            println!("✅ Wind data extracted successfully");
            true
        }
        Err(e) => {
            println!("❌ Failed to extract wind data: {}", e);
            println!(
                "Debug artifacts (if any) were written to {}",
                settings.debug_dir.display()
            );
            false
        }
    }
}

/// Print the email settings and send one test alert.
pub async fn check_email(settings: &Settings, wind_speed: f64, wind_gust: Option<f64>) -> bool {
    println!("\n===== Testing Email Notification =====");
    let config = &settings.email;
    let notifier = EmailNotifier::from_config(config.clone());

    if !notifier.is_valid() {
        println!("❌ Email configuration is incomplete");
        println!("Missing settings:");
        for field in config.missing_fields() {
            println!("  - {}", field);
        }
        return false;
    }

    println!("SMTP Server: {}", config.smtp_server);
    println!("SMTP Port: {}", config.smtp_port);
    println!("Sender: {}", config.sender.as_deref().unwrap_or_default());
    println!("Recipients: {}", config.recipients.join(", "));

    send_test(&notifier, settings, wind_speed, wind_gust).await
}

/// Print the bot settings (token masked) and send one test alert.
pub async fn check_telegram(settings: &Settings, wind_speed: f64, wind_gust: Option<f64>) -> bool {
    println!("\n===== Testing Telegram Notification =====");
    let config = &settings.telegram;
    let notifier = TelegramNotifier::from_config(config.clone());

    if !notifier.is_valid() {
        println!("❌ Telegram configuration is incomplete");
        println!("Missing settings:");
        for field in config.missing_fields() {
            println!("  - {}", field);
        }
        return false;
    }

    if let Some(token) = &config.bot_token {
        println!("Bot Token: {}", mask_token(token));
    }
    println!("Chat IDs: {}", config.chat_ids.join(", "));

    send_test(&notifier, settings, wind_speed, wind_gust).await
}

/// Run both notifier checks; passes only if both do.
pub async fn check_notifiers(settings: &Settings, wind_speed: f64, wind_gust: Option<f64>) -> bool {
    let email_ok = check_email(settings, wind_speed, wind_gust).await;
    let telegram_ok = check_telegram(settings, wind_speed, wind_gust).await;

    println!("\n===== Test Summary =====");
    println!("Email: {}", pass_fail(email_ok));
    println!("Telegram: {}", pass_fail(telegram_ok));
    email_ok && telegram_ok
}

async fn send_test(
    notifier: &dyn Notifier,
    settings: &Settings,
    wind_speed: f64,
    wind_gust: Option<f64>,
) -> bool {
    let (beaufort, label) = wind_description(wind_speed);
    println!("\nSending test {} notification:", notifier.name());
    println!("  - Wind Speed: {} ({})", format_wind_speed(wind_speed), label);
    println!("  - Wind Gust: {}", format_gust(wind_gust));
    println!("  - Beaufort Scale: {}", beaufort);

    let ok = notifier
        .send_notification(wind_speed, wind_gust, settings.wind_threshold, &settings.location)
        .await;
    if ok {
        println!("✅ Test {} notification sent successfully!", notifier.name());
    } else {
        println!("❌ Failed to send test {} notification", notifier.name());
    }
    ok
}

fn pass_fail(ok: bool) -> &'static str {
    if ok {
        "✅ PASSED"
    } else {
        "❌ FAILED"
    }
}
