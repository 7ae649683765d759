//! Transcript sources feeding a [`SimulationRun`].
//!
//! Defines an enum-based dispatch over the two places a transcript can come
//! from: the remote agent service (HTTP via `reqwest`) and a transcript file
//! captured earlier. Both push text into the run as it arrives; neither
//! knows anything about the transcript grammar.

use std::path::{Path, PathBuf};

use normsim_parser::country_from_alias;
use normsim_types::SessionId;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use crate::config::{AgentServiceConfig, SourceConfig};
use crate::error::RunnerError;
use crate::runner::SimulationRun;

/// Read size for transcript files.
const READ_BUFFER_BYTES: usize = 8 * 1024;

// ---------------------------------------------------------------------------
// Unified source enum (dyn-compatible alternative to async trait)
// ---------------------------------------------------------------------------

/// A source of transcript text.
///
/// Uses enum dispatch instead of trait objects because async methods
/// are not dyn-compatible in Rust.
pub enum TextSource {
    /// The remote multi-agent service.
    AgentService(AgentServiceClient),
    /// A transcript file on disk.
    Transcript(TranscriptFile),
}

impl TextSource {
    /// Confirm the source is usable before any parsing starts.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Unavailable`] if the agent service health check
    /// fails, or [`RunnerError::Io`] if the transcript file is unreadable.
    pub async fn check_health(&self) -> Result<(), RunnerError> {
        match self {
            Self::AgentService(client) => client.check_health().await,
            Self::Transcript(file) => file.check_health().await,
        }
    }

    /// Push the whole transcript into `run`.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::AgentService`] on HTTP failures or an unusable
    /// response body, and [`RunnerError::Io`] on file read failures.
    pub async fn feed(&self, run: &mut SimulationRun) -> Result<(), RunnerError> {
        match self {
            Self::AgentService(client) => client.feed(run).await,
            Self::Transcript(file) => file.feed(run).await,
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::AgentService(_) => "agent-service",
            Self::Transcript(_) => "transcript-file",
        }
    }
}

/// Create the source described by `config`.
///
/// # Errors
///
/// Returns [`RunnerError::Config`] if the HTTP client cannot be built.
pub fn create_source(config: &SourceConfig) -> Result<TextSource, RunnerError> {
    match config {
        SourceConfig::AgentService(service) => {
            Ok(TextSource::AgentService(AgentServiceClient::new(service)?))
        }
        SourceConfig::Transcript { path } => Ok(TextSource::Transcript(TranscriptFile::new(path))),
    }
}

// ---------------------------------------------------------------------------
// Agent service
// ---------------------------------------------------------------------------

/// Client for the multi-agent simulation service.
///
/// Sends one `POST {base_url}/run` per simulation round. A JSON response is
/// read whole and the transcript pulled out of it; any other content type is
/// treated as the transcript itself and streamed into the run chunk by
/// chunk.
pub struct AgentServiceClient {
    client: reqwest::Client,
    base_url: String,
    app_name: String,
    user_id: String,
    event: String,
}

impl AgentServiceClient {
    /// Create a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] if the HTTP client cannot be built.
    pub fn new(config: &AgentServiceConfig) -> Result<Self, RunnerError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RunnerError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            app_name: config.app_name.clone(),
            user_id: config.user_id.clone(),
            event: config.event.clone(),
        })
    }

    async fn check_health(&self) -> Result<(), RunnerError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RunnerError::Unavailable(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RunnerError::Unavailable(format!("{url} returned {status}")));
        }
        debug!(url, "agent service healthy");
        Ok(())
    }

    async fn feed(&self, run: &mut SimulationRun) -> Result<(), RunnerError> {
        let url = format!("{}/run", self.base_url);
        let session_id = SessionId::new();
        let body = serde_json::json!({
            "app_name": self.app_name,
            "user_id": self.user_id,
            "session_id": session_id.to_string(),
            "event": self.event,
        });

        info!(%session_id, app_name = self.app_name, "requesting simulation round");
        let mut response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RunnerError::AgentService(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(RunnerError::AgentService(format!(
                "{url} returned {status}: {error_body}"
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);

        if is_json_content_type(content_type.as_deref()) {
            let json: serde_json::Value = response.json().await.map_err(|e| {
                RunnerError::AgentService(format!("response parse failed: {e}"))
            })?;
            let text = extract_agent_text(&json)?;
            run.ingest_text(&text);
        } else {
            while let Some(chunk) = response
                .chunk()
                .await
                .map_err(|e| RunnerError::AgentService(format!("body stream failed: {e}")))?
            {
                run.ingest_bytes(&chunk);
            }
        }
        Ok(())
    }
}

/// Whether a `Content-Type` value denotes a JSON body.
fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

/// Extract the transcript text from a JSON agent service response.
///
/// Accepts an object carrying the text under `output` or `text`, or an
/// array of agent events whose `content.parts[].text` pieces are joined in
/// order, one event per line. An event authored by a country agent whose
/// text does not already open with a marker is prefixed with
/// `[Country] said: ` so the turn still lands on the right speaker.
///
/// # Errors
///
/// Returns [`RunnerError::AgentService`] when no text can be found.
pub fn extract_agent_text(json: &serde_json::Value) -> Result<String, RunnerError> {
    if let Some(text) = ["output", "text"]
        .iter()
        .find_map(|key| json.get(key).and_then(serde_json::Value::as_str))
    {
        return Ok(text.to_owned());
    }

    if let Some(events) = json.as_array() {
        let pieces: Vec<String> = events.iter().filter_map(event_text).collect();
        if !pieces.is_empty() {
            return Ok(pieces.join("\n"));
        }
    }

    Err(RunnerError::AgentService(
        "response carries no transcript text".to_owned(),
    ))
}

/// Text of one agent event, attributed to its author when needed.
fn event_text(event: &serde_json::Value) -> Option<String> {
    let text: String = event
        .get("content")?
        .get("parts")?
        .as_array()?
        .iter()
        .filter_map(|part| part.get("text").and_then(serde_json::Value::as_str))
        .collect();
    let opening = text.trim_start();
    if opening.is_empty() {
        return None;
    }

    let author = event
        .get("author")
        .and_then(serde_json::Value::as_str)
        .and_then(country_from_alias);
    match author {
        Some(country) if !opening.starts_with('[') && !opening.starts_with('{') => {
            Some(format!("[{country}] said: {text}"))
        }
        _ => Some(text),
    }
}

// ---------------------------------------------------------------------------
// Transcript file
// ---------------------------------------------------------------------------

/// A transcript captured to disk, replayed through the same parser.
pub struct TranscriptFile {
    path: PathBuf,
}

impl TranscriptFile {
    /// Source reading from `path`.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    async fn check_health(&self) -> Result<(), RunnerError> {
        let metadata = tokio::fs::metadata(&self.path).await?;
        debug!(path = %self.path.display(), bytes = metadata.len(), "transcript found");
        Ok(())
    }

    async fn feed(&self, run: &mut SimulationRun) -> Result<(), RunnerError> {
        let mut file = tokio::fs::File::open(&self.path).await?;
        let mut buf = vec![0_u8; READ_BUFFER_BYTES];
        loop {
            let read = file.read(&mut buf).await?;
            if read == 0 {
                break;
            }
            run.ingest_bytes(buf.get(..read).unwrap_or_default());
        }
        Ok(())
    }
}
