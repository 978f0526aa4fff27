//! Error types and handling for the `aqmap` engine

use thiserror::Error;

/// Main error type for the `aqmap` engine
#[derive(Error, Debug)]
pub enum AqMapError {
    /// Caller passed a value outside the accepted domain (e.g. a negative AQI)
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// City identifier is not part of the catalog
    #[error("Unknown city: {id}")]
    UnknownCity { id: String },

    /// The live air-quality provider failed (network, timeout, non-2xx, bad body)
    #[error("Air quality provider unavailable: {message}")]
    ProviderUnavailable { message: String },

    /// An optional map overlay could not be initialized
    #[error("Overlay source unavailable: {message}")]
    OverlaySourceUnavailable { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl AqMapError {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new unknown city error
    pub fn unknown_city<S: Into<String>>(id: S) -> Self {
        Self::UnknownCity { id: id.into() }
    }

    /// Create a new provider error
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::ProviderUnavailable {
            message: message.into(),
        }
    }

    /// Create a new overlay error
    pub fn overlay<S: Into<String>>(message: S) -> Self {
        Self::OverlaySourceUnavailable {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the condition is absorbed locally instead of propagated to the caller
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AqMapError::ProviderUnavailable { .. } | AqMapError::OverlaySourceUnavailable { .. }
        )
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AqMapError::InvalidInput { message } => format!("Invalid input: {message}"),
            AqMapError::UnknownCity { id } => format!("City '{id}' is not available."),
            AqMapError::ProviderUnavailable { .. } => {
                "Live air quality data is currently unavailable. Please try again later."
                    .to_string()
            }
            AqMapError::OverlaySourceUnavailable { .. } => {
                "Satellite overlay is currently unavailable.".to_string()
            }
            AqMapError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            AqMapError::Io { .. } => {
                "File or network operation failed. Please check permissions.".to_string()
            }
        }
    }
}
