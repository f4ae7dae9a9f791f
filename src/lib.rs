pub mod apis;
pub mod cleanup;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod notifiers;
pub mod selftest;
pub mod types;
pub mod units;

// Layered boundaries: ports and the monitor use case in `app`, adapters in `infra`
pub mod app;
pub mod infra;
