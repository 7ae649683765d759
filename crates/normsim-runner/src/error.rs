//! Error types for the simulation runner.
//!
//! Uses `thiserror` for typed errors that surface through the runner
//! pipeline: configuration, the agent service, transcript files, and the
//! final record check.

/// Errors that can occur while running one simulation round.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// The agent service returned an error or an unusable body.
    #[error("agent service error: {0}")]
    AgentService(String),

    /// The agent service failed its health check.
    #[error("agent service unavailable: {0}")]
    Unavailable(String),

    /// Reading a transcript file failed.
    #[error("transcript I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transcript produced no records at all.
    #[error("no responses could be parsed from the agent's output")]
    NoRecords,

    /// Serialization of the output failed.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
