//! Command dispatch

use crate::command::Command;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::job::{JobPoller, PollConfig};
use crate::transport::Transport;
use serde_json::Value;

/// Sends a command and, for async commands, waits for its job
pub struct CommandDispatcher<'a> {
    transport: &'a dyn Transport,
}

impl<'a> CommandDispatcher<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    /// Execute `command`.
    ///
    /// With `async_mode` set and a `jobid` in the response, the job is polled
    /// under `poll` and its result returned. Otherwise the immediate response
    /// body is returned (including any `jobid`).
    pub async fn execute(&self, command: Command, async_mode: bool, poll: &PollConfig) -> Result<Value> {
        tracing::debug!(command = command.name(), async_mode, "Executing command");

        let raw = self.transport.send(&command).await?;
        let envelope = Envelope::from_bytes(&raw)?;

        match envelope.job_id().map(str::to_string) {
            Some(job_id) if async_mode => {
                tracing::debug!(command = command.name(), job_id = %job_id, "Waiting for async job");
                JobPoller::new(self.transport)
                    .await_job(&job_id, poll, command.normalizer())
                    .await
            }
            _ => command.normalizer().normalize_value(envelope.into_value()),
        }
    }
}
