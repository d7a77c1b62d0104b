use crate::config::ConfigError;
use crate::properties::{PropertyServiceError, SalesImportError, StorageError};
use crate::telemetry::TelemetryError;
use std::fmt;

/// Failures surfaced by the binaries outside of request handling.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Storage(StorageError),
    Import(SalesImportError),
    Service(PropertyServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {err}"),
            AppError::Telemetry(err) => write!(f, "telemetry error: {err}"),
            AppError::Io(err) => write!(f, "io error: {err}"),
            AppError::Storage(err) => write!(f, "storage error: {err}"),
            AppError::Import(err) => write!(f, "import error: {err}"),
            AppError::Service(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Storage(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Service(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<StorageError> for AppError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<SalesImportError> for AppError {
    fn from(value: SalesImportError) -> Self {
        Self::Import(value)
    }
}

impl From<PropertyServiceError> for AppError {
    fn from(value: PropertyServiceError) -> Self {
        Self::Service(value)
    }
}
