//! Configuration types for the simulation runner.
//!
//! All configuration is loaded from environment variables. The runner either
//! replays a captured transcript file or asks the agent service to simulate
//! one event.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::RunnerError;

/// Complete runner configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Where the transcript text comes from.
    pub source: SourceConfig,
    /// Skip the agent service health check before running.
    pub skip_health_check: bool,
}

/// Transcript source selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    /// Replay a transcript captured earlier.
    Transcript {
        /// Path to the text file.
        path: PathBuf,
    },
    /// Call the remote agent service.
    AgentService(AgentServiceConfig),
}

/// Connection details for the remote agent service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentServiceConfig {
    /// Base URL (e.g. `http://localhost:8000`), without trailing slash.
    pub base_url: String,
    /// Agent application name registered with the service.
    pub app_name: String,
    /// User identifier for the session.
    pub user_id: String,
    /// Event description the simulation reacts to.
    pub event: String,
    /// Upper bound for one request, including the streamed body.
    pub request_timeout: Duration,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Read `LOG_FORMAT` (`text` or `json`, default `text`).
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT") {
            Ok(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

impl RunnerConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `TRANSCRIPT_PATH` -- replay this file instead of calling the service
    /// - `AGENT_SERVICE_URL` -- agent service base URL (required without a transcript)
    /// - `SIM_EVENT` -- event description (required without a transcript)
    /// - `AGENT_APP_NAME` -- application name (default `international_system`)
    /// - `AGENT_USER_ID` -- user identifier (default `user1`)
    /// - `REQUEST_TIMEOUT_MS` -- request deadline in milliseconds (default 120000)
    /// - `SKIP_HEALTH_CHECK` -- skip the health gate (default `false`)
    pub fn from_env() -> Result<Self, RunnerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RunnerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let skip_health_check: bool = lookup("SKIP_HEALTH_CHECK")
            .unwrap_or_else(|| "false".to_owned())
            .parse()
            .map_err(|e| RunnerError::Config(format!("invalid SKIP_HEALTH_CHECK: {e}")))?;

        if let Some(path) = lookup("TRANSCRIPT_PATH").filter(|p| !p.trim().is_empty()) {
            return Ok(Self {
                source: SourceConfig::Transcript {
                    path: PathBuf::from(path),
                },
                skip_health_check,
            });
        }

        let base_url = required(&lookup, "AGENT_SERVICE_URL")?
            .trim_end_matches('/')
            .to_owned();
        let event = required(&lookup, "SIM_EVENT")?;

        let request_timeout_ms: u64 = lookup("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|| "120000".to_owned())
            .parse()
            .map_err(|e| RunnerError::Config(format!("invalid REQUEST_TIMEOUT_MS: {e}")))?;

        Ok(Self {
            source: SourceConfig::AgentService(AgentServiceConfig {
                base_url,
                app_name: lookup("AGENT_APP_NAME")
                    .unwrap_or_else(|| "international_system".to_owned()),
                user_id: lookup("AGENT_USER_ID").unwrap_or_else(|| "user1".to_owned()),
                event,
                request_timeout: Duration::from_millis(request_timeout_ms),
            }),
            skip_health_check,
        })
    }
}

/// Read a required variable.
fn required<F>(lookup: &F, name: &str) -> Result<String, RunnerError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| RunnerError::Config(format!("missing required env var {name}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<RunnerConfig, RunnerError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        RunnerConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn transcript_path_wins() {
        let config = load(&[
            ("TRANSCRIPT_PATH", "runs/round1.txt"),
            ("AGENT_SERVICE_URL", "http://localhost:8000"),
        ]);
        assert!(matches!(
            config.map(|c| c.source),
            Ok(SourceConfig::Transcript { ref path }) if path == &PathBuf::from("runs/round1.txt")
        ));
    }

    #[test]
    fn agent_service_defaults() -> Result<(), RunnerError> {
        let config = load(&[
            ("AGENT_SERVICE_URL", "http://localhost:8000/"),
            ("SIM_EVENT", "A tariff war breaks out"),
        ])?;
        assert!(!config.skip_health_check);
        assert_eq!(
            config.source,
            SourceConfig::AgentService(AgentServiceConfig {
                base_url: "http://localhost:8000".to_owned(),
                app_name: "international_system".to_owned(),
                user_id: "user1".to_owned(),
                event: "A tariff war breaks out".to_owned(),
                request_timeout: Duration::from_millis(120_000),
            })
        );
        Ok(())
    }

    #[test]
    fn missing_event_is_a_config_error() {
        let config = load(&[("AGENT_SERVICE_URL", "http://localhost:8000")]);
        assert!(matches!(config, Err(RunnerError::Config(ref m)) if m.contains("SIM_EVENT")));
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let config = load(&[
            ("AGENT_SERVICE_URL", "http://localhost:8000"),
            ("SIM_EVENT", "x"),
            ("REQUEST_TIMEOUT_MS", "soon"),
        ]);
        assert!(matches!(config, Err(RunnerError::Config(_))));
    }

    #[test]
    fn skip_health_check_parses() {
        let config = load(&[("TRANSCRIPT_PATH", "t.txt"), ("SKIP_HEALTH_CHECK", "true")]);
        assert!(config.is_ok_and(|c| c.skip_health_check));
    }
}
