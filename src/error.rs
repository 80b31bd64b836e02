//! # Error Types
//!
//! This module defines all error types for the degree drill.
//!
//! Input errors carry the offending token so the user can fix the command line
//! or settings file. Every input error is raised before any sound is made.
//!
//! ## Error Types
//! - `ParseError` - Unrecognized scale-degree token
//! - `InvalidKeyError` - Unrecognized key token
//! - `CollaboratorUnavailableError` - Speech or audio engine missing at startup
//! - `PlaybackError` - Speech or audio engine failed during the drill
//! - `ConfigError` - Unreadable settings file or empty element/key list
//!
//! ## Usage
//! ```rust
//! use degree_drill::{normalize, PracticeError};
//!
//! match normalize("flat 9") {
//!     Ok(degree) => println!("step {}", degree.step()),
//!     Err(PracticeError::ParseError { token, message }) => {
//!         eprintln!("bad degree '{}': {}", token, message);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::fmt;

use thiserror::Error;

/// External capability the drill depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Speech,
    Audio,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Speech => write!(f, "speech engine"),
            Capability::Audio => write!(f, "audio output"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PracticeError {
    /// Unrecognized scale-degree token.
    ///
    /// # Example
    /// ```
    /// # use degree_drill::PracticeError;
    /// let err = PracticeError::ParseError {
    ///     token: "flat x".to_string(),
    ///     message: "no scale step 1-7 found".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Invalid scale degree 'flat x': no scale step 1-7 found");
    /// ```
    #[error("Invalid scale degree '{token}': {message}")]
    ParseError { token: String, message: String },

    /// Unrecognized key token.
    ///
    /// # Example
    /// ```
    /// # use degree_drill::PracticeError;
    /// let err = PracticeError::InvalidKeyError { token: "H".to_string() };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Invalid key 'H': expected a letter A-G, an optional '#' or 'b', and an optional 'm' for minor"
    /// );
    /// ```
    #[error("Invalid key '{token}': expected a letter A-G, an optional '#' or 'b', and an optional 'm' for minor")]
    InvalidKeyError { token: String },

    /// A collaborator could not be started.
    #[error("The {capability} is unavailable: {message}")]
    CollaboratorUnavailableError {
        capability: Capability,
        message: String,
    },

    /// A collaborator failed after the drill started. Not retried.
    #[error("The {capability} failed during playback: {message}")]
    PlaybackError {
        capability: Capability,
        message: String,
    },

    /// Invalid settings.
    ///
    /// # Example
    /// ```
    /// # use degree_drill::PracticeError;
    /// let err = PracticeError::ConfigError("no keys given".to_string());
    /// assert_eq!(err.to_string(), "Invalid configuration: no keys given");
    /// ```
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl PracticeError {
    pub(crate) fn parse(token: &str, message: impl Into<String>) -> Self {
        PracticeError::ParseError {
            token: token.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn unavailable(capability: Capability, message: impl Into<String>) -> Self {
        PracticeError::CollaboratorUnavailableError {
            capability,
            message: message.into(),
        }
    }

    pub(crate) fn playback(capability: Capability, message: impl Into<String>) -> Self {
        PracticeError::PlaybackError {
            capability,
            message: message.into(),
        }
    }
}
