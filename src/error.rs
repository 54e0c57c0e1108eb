//! Error types shared by the tutor engine

use crate::dialogue::Surface;

/// Result type for tutor operations
pub type Result<T> = std::result::Result<T, TutorError>;

/// Error types for tutor operations
#[derive(thiserror::Error, Debug)]
pub enum TutorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Backend reported failure: {0}")]
    Server(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Please select an answer first, then submit.")]
    NoSelection,

    #[error("Option {0} is not available for this question")]
    UnknownOption(char),

    #[error("No knowledge point {0}")]
    UnknownKnowledgePoint(String),

    #[error("No question is active")]
    NoActiveQuestion,

    #[error("This question is already answered")]
    AlreadyAnswered,

    #[error("Cannot find the corresponding user message")]
    NoCorrespondingUserMessage,

    #[error("Message is empty")]
    EmptyMessage,

    #[error("Message exceeds the {limit} character limit")]
    MessageTooLong { limit: usize },

    #[error("A request from the {0} surface is already in flight")]
    Busy(Surface),

    #[error("Session has been closed")]
    SessionClosed,
}

impl TutorError {
    /// Transport and server failures; everything else is a local precondition
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            TutorError::Io(_)
                | TutorError::Http(_)
                | TutorError::Json(_)
                | TutorError::Url(_)
                | TutorError::Status { .. }
                | TutorError::Server(_)
        )
    }
}
