//! Error types for the transcript parser.
//!
//! None of these escape [`crate::StreamParser::feed_line`]. They describe why
//! an analyst block was discarded and are logged at the point of discard.

/// Reasons a balanced analyst block failed to become an update.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The buffered text is not a JSON document.
    #[error("analyst block is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but lacks one or more required top-level keys.
    #[error("analyst block missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Required keys are present but hold values of the wrong type.
    #[error("analyst block has unexpected shape: {0}")]
    Shape(String),
}
