use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::approvals::{CoreClientError, RuleViolation};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    CoreClient(CoreClientError),
    RulesDocument(serde_json::Error),
    InvalidRules(RuleViolation),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::CoreClient(err) => write!(f, "core client error: {}", err),
            AppError::RulesDocument(err) => write!(f, "invalid rules document: {}", err),
            AppError::InvalidRules(err) => write!(f, "validation error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::CoreClient(err) => Some(err),
            AppError::RulesDocument(err) => Some(err),
            AppError::InvalidRules(err) => Some(err),
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

impl From<CoreClientError> for AppError {
    fn from(value: CoreClientError) -> Self {
        Self::CoreClient(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::RulesDocument(value)
    }
}

impl From<RuleViolation> for AppError {
    fn from(value: RuleViolation) -> Self {
        Self::InvalidRules(value)
    }
}
