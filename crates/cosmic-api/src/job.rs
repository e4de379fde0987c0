//! Asynchronous job polling
//!
//! Commands that complete asynchronously return a `jobid`. [`JobPoller`]
//! queries the job at a fixed interval until it reaches a terminal state or
//! the caller's deadline passes.

use crate::command::Command;
use crate::envelope::{self, Envelope};
use crate::error::{CosmicError, Result};
use crate::normalize::Normalizer;
use crate::transport::Transport;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout_at};

const QUERY_JOB_COMMAND: &str = "queryAsyncJobResult";

/// Shortest delay between two status queries
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Server-side job state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum JobStatus {
    Pending,
    Success,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

impl TryFrom<i64> for JobStatus {
    type Error = String;

    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(JobStatus::Pending),
            1 => Ok(JobStatus::Success),
            2 => Ok(JobStatus::Failed),
            other => Err(format!("unknown job status {}", other)),
        }
    }
}

impl From<JobStatus> for i64 {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Pending => 0,
            JobStatus::Success => 1,
            JobStatus::Failed => 2,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Success => write!(f, "success"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Decoded `queryAsyncJobResult` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "jobid", default)]
    pub id: String,

    #[serde(rename = "jobstatus")]
    pub status: JobStatus,

    #[serde(rename = "jobresulttype", default)]
    pub result_type: Option<String>,

    #[serde(rename = "jobresultcode", default)]
    pub result_code: Option<i64>,

    #[serde(rename = "jobresult", default)]
    pub result: Option<Value>,
}

impl Job {
    /// Failure text reported by the server
    pub fn error_message(&self) -> String {
        match &self.result {
            Some(Value::Object(map)) => map
                .get("errortext")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(map.clone()).to_string()),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => "Undefined error".to_string(),
        }
    }
}

/// Poll interval and deadline for one await
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay before each status query, never shorter than [`MIN_POLL_INTERVAL`]
    pub interval: Duration,

    /// How long to watch the job before giving up
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(300),
        }
    }
}

impl PollConfig {
    /// `interval` is raised to [`MIN_POLL_INTERVAL`] if shorter
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval: interval.max(MIN_POLL_INTERVAL),
            timeout,
        }
    }
}

/// Watches async jobs until they finish
pub struct JobPoller<'a> {
    transport: &'a dyn Transport,
}

impl<'a> JobPoller<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    /// Query a job's current state once
    pub async fn query(&self, job_id: &str) -> Result<Job> {
        let command = Command::builder(QUERY_JOB_COMMAND)
            .param("jobid", job_id)
            .normalizer(Normalizer::JOB)
            .build()?;

        let raw = self.transport.send(&command).await?;
        let body = Envelope::from_bytes(&raw)?.into_value();
        let body = command.normalizer().normalize_value(body)?;
        Ok(serde_json::from_value(body)?)
    }

    /// Poll `job_id` until it succeeds, fails or `config.timeout` elapses.
    ///
    /// On success the job result is unwrapped and repaired with `normalizer`.
    pub async fn await_job(
        &self,
        job_id: &str,
        config: &PollConfig,
        normalizer: &Normalizer,
    ) -> Result<Value> {
        let deadline = Instant::now() + config.timeout;
        let mut polls = 0u32;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            // fields are public, so clamp here too
            let interval = config.interval.max(MIN_POLL_INTERVAL);
            sleep(interval.min(remaining)).await;
            polls += 1;

            let job = match timeout_at(deadline, self.query(job_id)).await {
                Ok(job) => job?,
                Err(_) => {
                    tracing::debug!(job_id, polls, "Deadline passed during job query");
                    return Err(CosmicError::AsyncTimeout {
                        job_id: job_id.to_string(),
                    });
                }
            };

            match job.status {
                JobStatus::Pending => {
                    if Instant::now() >= deadline {
                        tracing::debug!(job_id, polls, "Job still pending at deadline");
                        return Err(CosmicError::AsyncTimeout {
                            job_id: job_id.to_string(),
                        });
                    }
                    tracing::trace!(job_id, polls, "Job pending");
                }
                JobStatus::Success => {
                    tracing::debug!(job_id, polls, "Job finished");
                    let result = envelope::unwrap_entity(job.result.unwrap_or(Value::Null));
                    return normalizer.normalize_value(result);
                }
                JobStatus::Failed => {
                    return Err(CosmicError::JobFailed {
                        job_id: job_id.to_string(),
                        message: job.error_message(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_job() {
        let job: Job = serde_json::from_value(json!({
            "jobid": "J1",
            "jobstatus": 1,
            "jobresultcode": 0,
            "jobresulttype": "object",
            "jobresult": {"firewallrule": {"id": "R1"}}
        }))
        .unwrap();

        assert_eq!(job.id, "J1");
        assert_eq!(job.status, JobStatus::Success);
        assert!(job.status.is_terminal());
        assert_eq!(job.result_code, Some(0));
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result: std::result::Result<Job, _> =
            serde_json::from_value(json!({"jobid": "J1", "jobstatus": 7}));
        assert!(result.is_err());
    }

    #[test]
    fn test_error_message() {
        let job: Job = serde_json::from_value(json!({
            "jobid": "J1",
            "jobstatus": 2,
            "jobresult": {"errorcode": 530, "errortext": "Port range conflicts"}
        }))
        .unwrap();
        assert_eq!(job.error_message(), "Port range conflicts");

        let job: Job =
            serde_json::from_value(json!({"jobid": "J1", "jobstatus": 2, "jobresult": "boom"}))
                .unwrap();
        assert_eq!(job.error_message(), "boom");

        let job: Job = serde_json::from_value(json!({"jobid": "J1", "jobstatus": 2})).unwrap();
        assert_eq!(job.error_message(), "Undefined error");
    }

    #[test]
    fn test_poll_config_default() {
        let config = PollConfig::default();
        assert_eq!(config.interval, Duration::from_secs(2));
        assert_eq!(config.timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_poll_config_clamps_interval() {
        let config = PollConfig::new(Duration::ZERO, Duration::from_secs(5));
        assert_eq!(config.interval, MIN_POLL_INTERVAL);

        let config = PollConfig::new(Duration::from_secs(3), Duration::from_secs(5));
        assert_eq!(config.interval, Duration::from_secs(3));
    }
}
