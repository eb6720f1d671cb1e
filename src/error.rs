//! Error types for SmsSafe.

/// Top-level error type for the interception engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A setting was consulted and turned out to hold an unusable value.
    ///
    /// Raised at the point of use, never when the configuration is built.
    #[error("Invalid configuration for {setting}: expected {expected}. It was: {value}")]
    InvalidConfiguration {
        setting: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("Backend adapter for {message_type} does not implement {operation}")]
    NotImplemented {
        operation: &'static str,
        message_type: &'static str,
    },

    #[error("Mail delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    pub(crate) fn invalid(
        setting: &'static str,
        expected: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidConfiguration {
            setting,
            expected,
            value: value.into(),
        }
    }

    pub(crate) fn not_implemented<N: ?Sized>(operation: &'static str) -> Self {
        Self::NotImplemented {
            operation,
            message_type: std::any::type_name::<N>(),
        }
    }
}

/// Errors raised while loading a configuration document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from building or delivering a notification email.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Invalid email address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("Transport failed: {0}")]
    Transport(String),
}

/// Result type alias for SmsSafe.
pub type Result<T> = std::result::Result<T, Error>;
