//! Firewall service
//!
//! Ingress and egress firewall rules, plus port forwarding. Each operation
//! builds a typed [`Command`] or [`ListQuery`] and hands it to the client's
//! entry points.

use crate::client::CosmicClient;
use crate::command::Command;
use crate::error::Result;
use crate::list::{ListQuery, ResultSet};
use crate::normalize::Normalizer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const LIST_KEY: &str = "firewallrule";
const PORT_FORWARD_LIST_KEY: &str = "portforwardingrule";

/// Parameters for `createFirewallRule`
#[derive(Debug, Clone, Default)]
pub struct CreateFirewallRule {
    pub ipaddressid: String,
    pub protocol: String,
    pub cidrlist: Vec<String>,
    pub startport: Option<i64>,
    pub endport: Option<i64>,
    pub icmpcode: Option<i64>,
    pub icmptype: Option<i64>,
    pub fordisplay: Option<bool>,
    pub rule_type: Option<String>,
}

impl CreateFirewallRule {
    pub fn new(ipaddressid: impl Into<String>, protocol: impl Into<String>) -> Self {
        Self {
            ipaddressid: ipaddressid.into(),
            protocol: protocol.into(),
            ..Default::default()
        }
    }

    pub fn ports(mut self, startport: i64, endport: i64) -> Self {
        self.startport = Some(startport);
        self.endport = Some(endport);
        self
    }

    pub fn cidrlist(mut self, cidrs: Vec<String>) -> Self {
        self.cidrlist = cidrs;
        self
    }

    fn to_command(&self) -> Result<Command> {
        Command::builder("createFirewallRule")
            .param("ipaddressid", &self.ipaddressid)
            .param("protocol", &self.protocol)
            .param_opt(
                "cidrlist",
                (!self.cidrlist.is_empty()).then(|| self.cidrlist.clone()),
            )
            .param_opt("startport", self.startport)
            .param_opt("endport", self.endport)
            .param_opt("icmpcode", self.icmpcode)
            .param_opt("icmptype", self.icmptype)
            .param_opt("fordisplay", self.fordisplay)
            .param_opt("type", self.rule_type.clone())
            .normalizer(Normalizer::FIREWALL)
            .build()
    }
}

/// Parameters for `createEgressFirewallRule`
#[derive(Debug, Clone, Default)]
pub struct CreateEgressFirewallRule {
    pub networkid: String,
    pub protocol: String,
    pub cidrlist: Vec<String>,
    pub startport: Option<i64>,
    pub endport: Option<i64>,
    pub icmpcode: Option<i64>,
    pub icmptype: Option<i64>,
    pub fordisplay: Option<bool>,
    pub rule_type: Option<String>,
}

impl CreateEgressFirewallRule {
    pub fn new(networkid: impl Into<String>, protocol: impl Into<String>) -> Self {
        Self {
            networkid: networkid.into(),
            protocol: protocol.into(),
            ..Default::default()
        }
    }

    fn to_command(&self) -> Result<Command> {
        Command::builder("createEgressFirewallRule")
            .param("networkid", &self.networkid)
            .param("protocol", &self.protocol)
            .param_opt(
                "cidrlist",
                (!self.cidrlist.is_empty()).then(|| self.cidrlist.clone()),
            )
            .param_opt("startport", self.startport)
            .param_opt("endport", self.endport)
            .param_opt("icmpcode", self.icmpcode)
            .param_opt("icmptype", self.icmptype)
            .param_opt("fordisplay", self.fordisplay)
            .param_opt("type", self.rule_type.clone())
            .normalizer(Normalizer::EGRESS_FIREWALL)
            .build()
    }
}

/// Filters for `listFirewallRules` / `listEgressFirewallRules`
#[derive(Debug, Clone, Default)]
pub struct ListFirewallRules {
    pub ipaddressid: Option<String>,
    pub networkid: Option<String>,
    pub keyword: Option<String>,
    pub listall: Option<bool>,
    pub projectid: Option<String>,
    pub tags: BTreeMap<String, String>,
}

impl ListFirewallRules {
    fn to_query(&self, command: &str, normalizer: Normalizer) -> ListQuery {
        ListQuery::new(command, LIST_KEY)
            .filter_opt("ipaddressid", self.ipaddressid.clone())
            .filter_opt("networkid", self.networkid.clone())
            .filter_opt("keyword", self.keyword.clone())
            .filter_opt("listall", self.listall)
            .filter_opt("projectid", self.projectid.clone())
            .filter_opt("tags", (!self.tags.is_empty()).then(|| self.tags.clone()))
            .normalizer(normalizer)
    }
}

/// Parameters for `createPortForwardingRule`
#[derive(Debug, Clone, Default)]
pub struct CreatePortForwardingRule {
    pub ipaddressid: String,
    pub protocol: String,
    pub privateport: i64,
    pub publicport: i64,
    pub virtualmachineid: String,
    pub privateendport: Option<i64>,
    pub publicendport: Option<i64>,
    pub cidrlist: Vec<String>,
    pub networkid: Option<String>,
    pub vmguestip: Option<String>,
    pub openfirewall: Option<bool>,
    pub fordisplay: Option<bool>,
}

impl CreatePortForwardingRule {
    pub fn new(
        ipaddressid: impl Into<String>,
        protocol: impl Into<String>,
        privateport: i64,
        publicport: i64,
        virtualmachineid: impl Into<String>,
    ) -> Self {
        Self {
            ipaddressid: ipaddressid.into(),
            protocol: protocol.into(),
            privateport,
            publicport,
            virtualmachineid: virtualmachineid.into(),
            ..Default::default()
        }
    }

    /// Forward a port range instead of a single port
    pub fn end_ports(mut self, privateendport: i64, publicendport: i64) -> Self {
        self.privateendport = Some(privateendport);
        self.publicendport = Some(publicendport);
        self
    }

    fn to_command(&self) -> Result<Command> {
        Command::builder("createPortForwardingRule")
            .param("ipaddressid", &self.ipaddressid)
            .param("protocol", &self.protocol)
            .param("privateport", self.privateport)
            .param("publicport", self.publicport)
            .param("virtualmachineid", &self.virtualmachineid)
            .param_opt("privateendport", self.privateendport)
            .param_opt("publicendport", self.publicendport)
            .param_opt(
                "cidrlist",
                (!self.cidrlist.is_empty()).then(|| self.cidrlist.clone()),
            )
            .param_opt("networkid", self.networkid.clone())
            .param_opt("vmguestip", self.vmguestip.clone())
            .param_opt("openfirewall", self.openfirewall)
            .param_opt("fordisplay", self.fordisplay)
            .normalizer(Normalizer::PORT_FORWARD)
            .build()
    }
}

/// Parameters for `updatePortForwardingRule`
#[derive(Debug, Clone, Default)]
pub struct UpdatePortForwardingRule {
    pub id: String,
    pub customid: Option<String>,
    pub fordisplay: Option<bool>,
    pub privateport: Option<i64>,
    pub virtualmachineid: Option<String>,
    pub vmguestip: Option<String>,
}

impl UpdatePortForwardingRule {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    fn to_command(&self) -> Result<Command> {
        Command::builder("updatePortForwardingRule")
            .param("id", &self.id)
            .param_opt("customid", self.customid.clone())
            .param_opt("fordisplay", self.fordisplay)
            .param_opt("privateport", self.privateport)
            .param_opt("virtualmachineid", self.virtualmachineid.clone())
            .param_opt("vmguestip", self.vmguestip.clone())
            .normalizer(Normalizer::PORT_FORWARD)
            .build()
    }
}

/// Filters for `listPortForwardingRules`
#[derive(Debug, Clone, Default)]
pub struct ListPortForwardingRules {
    pub ipaddressid: Option<String>,
    pub networkid: Option<String>,
    pub keyword: Option<String>,
    pub listall: Option<bool>,
    pub fordisplay: Option<bool>,
    pub projectid: Option<String>,
    pub tags: BTreeMap<String, String>,
}

impl ListPortForwardingRules {
    fn to_query(&self) -> ListQuery {
        ListQuery::new("listPortForwardingRules", PORT_FORWARD_LIST_KEY)
            .filter_opt("ipaddressid", self.ipaddressid.clone())
            .filter_opt("networkid", self.networkid.clone())
            .filter_opt("keyword", self.keyword.clone())
            .filter_opt("listall", self.listall)
            .filter_opt("fordisplay", self.fordisplay)
            .filter_opt("projectid", self.projectid.clone())
            .filter_opt("tags", (!self.tags.is_empty()).then(|| self.tags.clone()))
            .normalizer(Normalizer::PORT_FORWARD)
    }
}

/// A resource tag as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub key: String,
    pub value: String,
    pub resourceid: String,
    pub resourcetype: String,
}

/// Ingress or egress firewall rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallRule {
    /// Set instead of the rule fields when the client does not wait for jobs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobid: Option<String>,
    pub id: String,
    pub protocol: String,
    pub startport: Option<i64>,
    pub endport: Option<i64>,
    pub icmpcode: Option<i64>,
    pub icmptype: Option<i64>,
    pub cidrlist: String,
    pub ipaddress: String,
    pub ipaddressid: String,
    pub networkid: String,
    pub state: String,
    pub fordisplay: bool,
    pub tags: Vec<Tag>,
}

/// Port forwarding rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortForwardingRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobid: Option<String>,
    pub id: String,
    pub protocol: String,
    pub privateport: Option<i64>,
    pub privateendport: Option<i64>,
    pub publicport: Option<i64>,
    pub publicendport: Option<i64>,
    pub ipaddress: String,
    pub ipaddressid: String,
    pub networkid: String,
    pub virtualmachineid: String,
    pub virtualmachinename: String,
    pub vmguestip: String,
    pub cidrlist: String,
    pub state: String,
    pub fordisplay: bool,
    pub tags: Vec<Tag>,
}

/// Result of delete commands
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuccessResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobid: Option<String>,
    pub success: bool,
    pub displaytext: Option<String>,
}

pub struct FirewallService<'a> {
    client: &'a CosmicClient,
}

impl<'a> FirewallService<'a> {
    pub fn new(client: &'a CosmicClient) -> Self {
        Self { client }
    }

    /// Creates a firewall rule for a given IP address
    pub async fn create_firewall_rule(&self, params: &CreateFirewallRule) -> Result<FirewallRule> {
        self.client.execute_as(params.to_command()?).await
    }

    /// Updates a firewall rule's custom id or display flag
    pub async fn update_firewall_rule(
        &self,
        id: &str,
        customid: Option<&str>,
        fordisplay: Option<bool>,
    ) -> Result<FirewallRule> {
        let command = Command::builder("updateFirewallRule")
            .param("id", id)
            .param_opt("customid", customid)
            .param_opt("fordisplay", fordisplay)
            .normalizer(Normalizer::FIREWALL)
            .build()?;
        self.client.execute_as(command).await
    }

    pub async fn delete_firewall_rule(&self, id: &str) -> Result<SuccessResponse> {
        let command = Command::builder("deleteFirewallRule")
            .param("id", id)
            .build()?;
        self.client.execute_as(command).await
    }

    pub async fn list_firewall_rules(&self, params: &ListFirewallRules) -> Result<ResultSet<FirewallRule>> {
        self.client
            .fetch_all_as(params.to_query("listFirewallRules", Normalizer::FIREWALL))
            .await
    }

    pub async fn get_firewall_rule_by_id(&self, id: &str) -> Result<FirewallRule> {
        let query = ListFirewallRules::default().to_query("listFirewallRules", Normalizer::FIREWALL);
        self.client.resolve_one_as(query, id).await
    }

    /// Creates an egress firewall rule for a network
    pub async fn create_egress_firewall_rule(
        &self,
        params: &CreateEgressFirewallRule,
    ) -> Result<FirewallRule> {
        self.client.execute_as(params.to_command()?).await
    }

    /// Updates an egress firewall rule's custom id or display flag
    pub async fn update_egress_firewall_rule(
        &self,
        id: &str,
        customid: Option<&str>,
        fordisplay: Option<bool>,
    ) -> Result<FirewallRule> {
        let command = Command::builder("updateEgressFirewallRule")
            .param("id", id)
            .param_opt("customid", customid)
            .param_opt("fordisplay", fordisplay)
            .normalizer(Normalizer::EGRESS_FIREWALL)
            .build()?;
        self.client.execute_as(command).await
    }

    pub async fn delete_egress_firewall_rule(&self, id: &str) -> Result<SuccessResponse> {
        let command = Command::builder("deleteEgressFirewallRule")
            .param("id", id)
            .build()?;
        self.client.execute_as(command).await
    }

    pub async fn list_egress_firewall_rules(
        &self,
        params: &ListFirewallRules,
    ) -> Result<ResultSet<FirewallRule>> {
        self.client
            .fetch_all_as(params.to_query("listEgressFirewallRules", Normalizer::EGRESS_FIREWALL))
            .await
    }

    pub async fn get_egress_firewall_rule_by_id(&self, id: &str) -> Result<FirewallRule> {
        let query = ListFirewallRules::default()
            .to_query("listEgressFirewallRules", Normalizer::EGRESS_FIREWALL);
        self.client.resolve_one_as(query, id).await
    }

    /// Creates a port forwarding rule from a public IP to a virtual machine
    pub async fn create_port_forwarding_rule(
        &self,
        params: &CreatePortForwardingRule,
    ) -> Result<PortForwardingRule> {
        self.client.execute_as(params.to_command()?).await
    }

    pub async fn update_port_forwarding_rule(
        &self,
        params: &UpdatePortForwardingRule,
    ) -> Result<PortForwardingRule> {
        self.client.execute_as(params.to_command()?).await
    }

    pub async fn delete_port_forwarding_rule(&self, id: &str) -> Result<SuccessResponse> {
        let command = Command::builder("deletePortForwardingRule")
            .param("id", id)
            .build()?;
        self.client.execute_as(command).await
    }

    pub async fn list_port_forwarding_rules(
        &self,
        params: &ListPortForwardingRules,
    ) -> Result<ResultSet<PortForwardingRule>> {
        self.client.fetch_all_as(params.to_query()).await
    }

    pub async fn get_port_forwarding_rule_by_id(&self, id: &str) -> Result<PortForwardingRule> {
        self.client
            .resolve_one_as(ListPortForwardingRules::default().to_query(), id)
            .await
    }
}
