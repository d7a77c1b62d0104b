pub mod config;
pub mod error;
pub mod middleware;
pub mod properties;
pub mod telemetry;
