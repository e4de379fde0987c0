//! Cosmic API client
//!
//! Control-plane client for the Cosmic cloud orchestration API. The API has
//! synchronous commands, asynchronously completed commands (the response
//! carries a `jobid`) and list endpoints that page their results.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                     CosmicClient                     │
//! │        execute  │  fetch_all  │  resolve_one         │
//! └────────┬────────────────┬────────────────┬───────────┘
//!          │                │                │
//! ┌────────▼────────┐       │      ┌─────────▼──────────┐
//! │ CommandDispatcher│      │      │ SingleMatchResolver│
//! └───┬─────────┬───┘       │      └─────────┬──────────┘
//!     │         │     ┌─────▼────────────────▼─┐
//!     │  ┌──────▼───┐ │    PaginatedLister     │
//!     │  │ JobPoller│ └───────────┬────────────┘
//!     │  └──────┬───┘             │
//! ┌───▼─────────▼─────────────────▼───────────────────────┐
//! │        Transport  →  Envelope  →  Normalizer           │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use cosmic_api::{ClientConfig, CosmicClient, CreateFirewallRule};
//!
//! let config = ClientConfig::new("https://cosmic.example.com/client/api", key, secret);
//! let client = CosmicClient::from_config(&config)?;
//!
//! let rule = client
//!     .firewall()
//!     .create_firewall_rule(&CreateFirewallRule::new(ip_id, "tcp").ports(443, 443))
//!     .await?;
//!
//! match client.firewall().get_firewall_rule_by_id(&rule.id).await {
//!     Ok(rule) => println!("{:?}", rule),
//!     Err(e) if e.is_not_found() => println!("rule is gone"),
//!     Err(e) => return Err(e.into()),
//! }
//! ```

pub mod client;
pub mod command;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod firewall;
pub mod job;
pub mod list;
pub mod normalize;
pub mod resolve;
pub mod signing;
pub mod transport;

// Re-exports
pub use client::{ClientConfig, CosmicClient};
pub use command::{Command, CommandBuilder, ParamValue};
pub use dispatch::CommandDispatcher;
pub use envelope::Envelope;
pub use error::{CosmicError, ErrorKind, Result};
pub use firewall::{
    CreateEgressFirewallRule, CreateFirewallRule, CreatePortForwardingRule, FirewallRule,
    FirewallService, ListFirewallRules, ListPortForwardingRules, PortForwardingRule,
    SuccessResponse, Tag, UpdatePortForwardingRule,
};
pub use job::{Job, JobPoller, JobStatus, MIN_POLL_INTERVAL, PollConfig};
pub use list::{ListQuery, PaginatedLister, ResultSet};
pub use normalize::Normalizer;
pub use resolve::SingleMatchResolver;
pub use transport::{HttpTransport, Transport};
