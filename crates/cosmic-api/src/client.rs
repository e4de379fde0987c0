//! Client context
//!
//! [`CosmicClient`] is the immutable value threaded into every call. It owns
//! the transport and the default polling policy; nothing is global.

use crate::command::Command;
use crate::dispatch::CommandDispatcher;
use crate::error::Result;
use crate::firewall::FirewallService;
use crate::job::{Job, JobPoller, PollConfig};
use crate::list::{ListQuery, PaginatedLister, ResultSet};
use crate::normalize::Normalizer;
use crate::resolve::SingleMatchResolver;
use crate::transport::{HttpTransport, Transport};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Connection settings for [`CosmicClient::from_config`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API endpoint, e.g. `https://cosmic.example.com/client/api`
    pub api_url: String,

    pub api_key: String,

    pub secret_key: String,

    /// Default polling policy for async commands
    pub poll: PollConfig,

    /// Per-request HTTP timeout
    pub http_timeout: Duration,

    pub verify_ssl: bool,

    /// Wait for async jobs instead of returning their `jobid`
    pub async_mode: bool,
}

impl ClientConfig {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            poll: PollConfig::default(),
            http_timeout: Duration::from_secs(60),
            verify_ssl: true,
            async_mode: true,
        }
    }
}

/// Cosmic API client
#[derive(Clone)]
pub struct CosmicClient {
    transport: Arc<dyn Transport>,
    poll: PollConfig,
    async_mode: bool,
}

impl CosmicClient {
    /// Create a client talking HTTP to `config.api_url`
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self {
            transport: Arc::new(transport),
            poll: config.poll,
            async_mode: config.async_mode,
        })
    }

    /// Create a client over any transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            poll: PollConfig::default(),
            async_mode: true,
        }
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_async_mode(mut self, async_mode: bool) -> Self {
        self.async_mode = async_mode;
        self
    }

    pub fn poll_config(&self) -> &PollConfig {
        &self.poll
    }

    pub fn async_mode(&self) -> bool {
        self.async_mode
    }

    /// Execute a command with the client's default polling policy
    pub async fn execute(&self, command: Command) -> Result<Value> {
        self.execute_with(command, &self.poll).await
    }

    /// Execute a command with an explicit polling policy
    pub async fn execute_with(&self, command: Command, poll: &PollConfig) -> Result<Value> {
        CommandDispatcher::new(self.transport.as_ref())
            .execute(command, self.async_mode, poll)
            .await
    }

    /// Execute and decode the result into `T`
    pub async fn execute_as<T: DeserializeOwned>(&self, command: Command) -> Result<T> {
        let value = self.execute(command).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn fetch_all(&self, query: ListQuery) -> Result<ResultSet<Value>> {
        PaginatedLister::new(self.transport.as_ref())
            .fetch_all(query)
            .await
    }

    pub async fn fetch_all_as<T: DeserializeOwned>(&self, query: ListQuery) -> Result<ResultSet<T>> {
        PaginatedLister::new(self.transport.as_ref())
            .fetch_all_as(query)
            .await
    }

    pub async fn resolve_one(&self, query: ListQuery, id: &str) -> Result<Value> {
        SingleMatchResolver::new(self.transport.as_ref())
            .resolve_one(query, id)
            .await
    }

    pub async fn resolve_one_as<T: DeserializeOwned>(&self, query: ListQuery, id: &str) -> Result<T> {
        SingleMatchResolver::new(self.transport.as_ref())
            .resolve_one_as(query, id)
            .await
    }

    /// Wait for a job the caller already holds an id for
    pub async fn await_job(&self, job_id: &str, normalizer: &Normalizer) -> Result<Value> {
        JobPoller::new(self.transport.as_ref())
            .await_job(job_id, &self.poll, normalizer)
            .await
    }

    /// Query a job's state once, without waiting
    pub async fn query_job(&self, job_id: &str) -> Result<Job> {
        JobPoller::new(self.transport.as_ref()).query(job_id).await
    }

    pub fn firewall(&self) -> FirewallService<'_> {
        FirewallService::new(self)
    }
}
