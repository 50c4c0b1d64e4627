pub mod company;
pub mod config;
pub mod error;
pub mod telemetry;
