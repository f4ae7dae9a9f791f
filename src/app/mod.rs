pub mod monitor;
pub mod ports;
