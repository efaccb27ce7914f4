//! Error types and handling for the `VenueScout` library

use thiserror::Error;

/// Main error type for the `VenueScout` library
#[derive(Error, Debug)]
pub enum VenueScoutError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Place provider communication errors
    #[error("Provider error: {message}")]
    Provider { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },
}

impl VenueScoutError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new provider error
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            VenueScoutError::Config { .. } => {
                "Configuration error. Please check your config file and Places API key."
                    .to_string()
            }
            VenueScoutError::Provider { .. } => {
                "Unable to reach the places service. Please check your internet connection."
                    .to_string()
            }
            VenueScoutError::Validation { message } => {
                format!("Invalid input: {message}")
            }
        }
    }
}
