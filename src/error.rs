//! Error types for the print sheet compositor

use thiserror::Error;

/// Result type alias for compositor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, composing or printing a sheet
#[derive(Error, Debug)]
pub enum Error {
    /// The backend has no approved image ready
    #[error("No approved image available: {0}")]
    MissingApproved(String),

    /// The backend returned the wrong number of approved images
    #[error("Expected {expected} approved images, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    /// A fetched payload could not be decoded as an image
    #[error("Image decode failed: {0}")]
    DecodeFailed(String),

    /// Margins/gutters/inset leave no room for a cell
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// Source image has a zero dimension
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Composition failed at print time; the printer was never invoked
    #[error("Print aborted: {0}")]
    PrintAborted(#[source] Box<Error>),

    /// Network error talking to the backend
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Session reset was refused by the backend
    #[error("Session reset failed: {0}")]
    SessionError(String),

    /// Failed to encode the raster
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// The print trigger failed
    #[error("Print failed: {0}")]
    PrintError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Where the user should be sent after an error surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Back to prompt/style selection so the images can be regenerated
    PromptEntry,
    /// Stay on (or return to) the print review page
    Review,
    /// Start of the booth flow, with a generic network message
    Home,
    /// Configuration or programming error; not user-actionable
    Internal,
}

impl Recovery {
    /// Route the booth frontend navigates to.
    pub fn path(&self) -> &'static str {
        match self {
            Recovery::PromptEntry => "/multi",
            Recovery::Review => "/print-layout",
            Recovery::Home | Recovery::Internal => "/",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Recovery::PromptEntry => "Your photos are not ready yet. Please generate them again.",
            Recovery::Review => "Printing could not start. Please review your sheet and try again.",
            Recovery::Home => "A network error occurred. Please start again.",
            Recovery::Internal => "Something went wrong while preparing the sheet.",
        }
    }
}

impl Error {
    /// Classify the error into the navigational fallback shown to the user.
    pub fn recovery(&self) -> Recovery {
        match self {
            Error::MissingApproved(_) | Error::CountMismatch { .. } | Error::DecodeFailed(_) => {
                Recovery::PromptEntry
            }
            Error::PrintAborted(_) | Error::PrintError(_) => Recovery::Review,
            Error::NetworkError(_) | Error::SessionError(_) => Recovery::Home,
            Error::InvalidLayout(_)
            | Error::InvalidImage(_)
            | Error::RenderError(_)
            | Error::ConfigError(_)
            | Error::Other(_) => Recovery::Internal,
        }
    }

    /// True for errors caused by the backend's approved-image state.
    pub fn is_user_actionable(&self) -> bool {
        self.recovery() == Recovery::PromptEntry
    }
}
