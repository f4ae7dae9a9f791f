#[cfg(feature = "browser")]
pub mod chrome;
pub mod diagnostics;
pub mod http_client;
pub mod smtp;
pub mod telegram_api;
