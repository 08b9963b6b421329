//! Common error types used throughout oga2mp3.
//!
//! Every failure a conversion request can hit is one of these variants, and
//! each maps to exactly one HTTP status via [`Error::http_status`].

use crate::ConversionStage;

/// Common error type for oga2mp3.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request used a method other than the one the route accepts.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// The request body was empty or could not be read.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request body exceeded the configured size limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An external tool could not be run or reported failure.
    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },

    /// A conversion step failed after validation.
    #[error("conversion failed at {stage}: {source}")]
    Conversion {
        stage: ConversionStage,
        #[source]
        source: Box<Error>,
    },

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new MethodNotAllowed error.
    pub fn method_not_allowed<S: Into<String>>(method: S) -> Self {
        Self::MethodNotAllowed(method.into())
    }

    /// Create a new BadRequest error.
    pub fn bad_request<S: Into<String>>(msg: S) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Create a new PayloadTooLarge error.
    pub fn payload_too_large<S: Into<String>>(msg: S) -> Self {
        Self::PayloadTooLarge(msg.into())
    }

    /// Create a new Tool error.
    pub fn tool<T: Into<String>, M: Into<String>>(tool: T, message: M) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Tag this error with the conversion stage it occurred in.
    pub fn at_stage(self, stage: ConversionStage) -> Self {
        Self::Conversion {
            stage,
            source: Box::new(self),
        }
    }

    /// The stage a conversion error was raised in, if any.
    pub fn stage(&self) -> Option<ConversionStage> {
        match self {
            Self::Conversion { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::MethodNotAllowed(_) => 405,
            Self::BadRequest(_) => 400,
            Self::PayloadTooLarge(_) => 413,
            Self::Io(_) | Self::Tool { .. } | Self::Conversion { .. } | Self::Internal(_) => 500,
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
