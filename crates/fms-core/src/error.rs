//! Error types for flight plan edits and navigation database lookups.

use thiserror::Error;

/// Failure reported by a [`crate::navdata::NavigationDatabase`] implementation.
#[derive(Error, Debug)]
pub enum NavdataError {
    /// Backend refused or is known to be down
    #[error("navigation database unavailable: {message}")]
    Unavailable { message: String },
    /// Request could not be completed
    #[error("navigation database request failed: {message}")]
    Transport {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Backend answered with data we cannot interpret
    #[error("malformed navigation data: {message}")]
    Malformed { message: String },
}

impl NavdataError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn transport(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// Errors surfaced by flight plan operations.
///
/// A failed operation leaves the plan exactly as it was before the call.
#[derive(Error, Debug)]
pub enum FlightPlanError {
    #[error("cannot select a procedure without a destination airport")]
    MissingDestination,
    #[error("cannot select a procedure without an origin airport")]
    MissingOrigin,
    #[error("cannot select an approach via without an approach")]
    MissingApproach,
    #[error("procedure '{ident}' not found for {airport}")]
    ProcedureNotFound { ident: String, airport: String },
    #[error("airport '{ident}' not found")]
    AirportNotFound { ident: String },
    #[error("runway '{ident}' not found for {airport}")]
    RunwayNotFound { ident: String, airport: String },
    /// Edit position outside the range the operation may touch
    #[error("index {index} outside editable range {start}..={end}")]
    IndexOutOfRange {
        index: usize,
        start: usize,
        end: usize,
    },
    #[error(transparent)]
    ExternalLookupFailure(#[from] NavdataError),
}

/// Result type alias for flight plan operations
pub type Result<T> = std::result::Result<T, FlightPlanError>;
