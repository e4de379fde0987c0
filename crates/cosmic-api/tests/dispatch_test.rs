mod common;

use common::{Reply, ScriptedTransport, failed, pending, succeeded};
use cosmic_api::{
    Command, CommandDispatcher, CosmicClient, CosmicError, CreateFirewallRule,
    CreatePortForwardingRule, ErrorKind, ListFirewallRules, ListPortForwardingRules, Normalizer,
    PollConfig, UpdatePortForwardingRule,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn poll() -> PollConfig {
    PollConfig::new(Duration::from_secs(1), Duration::from_secs(60))
}

fn create_rule() -> Command {
    Command::builder("createFirewallRule")
        .param("ipaddressid", "ip-1")
        .param("protocol", "tcp")
        .param("startport", 80)
        .param("endport", 80)
        .normalizer(Normalizer::FIREWALL)
        .build()
        .unwrap()
}

/// createFirewallRule → {jobid: J1} → Pending → Success with string port
#[tokio::test(start_paused = true)]
async fn test_async_create_end_to_end() {
    let transport = ScriptedTransport::new();
    transport.respond("createFirewallRule", json!({"jobid": "J1"}));
    transport.job("J1", json!({"jobid": "J1", "jobstatus": 0}));
    transport.job(
        "J1",
        json!({"jobid": "J1", "jobstatus": 1, "jobresult": {"id": "R1", "startport": "80"}}),
    );

    let result = CommandDispatcher::new(&transport)
        .execute(create_rule(), true, &poll())
        .await
        .unwrap();

    assert_eq!(result["id"], json!("R1"));
    assert_eq!(result["startport"], json!(80));
    assert!(result["startport"].is_i64());
    assert_eq!(transport.sent_count("createFirewallRule"), 1);
    assert_eq!(transport.sent_count("queryAsyncJobResult"), 2);
}

#[tokio::test]
async fn test_sync_command_returns_immediately() {
    let transport = ScriptedTransport::new();
    transport.respond(
        "updateFirewallRule",
        json!({"id": "R1", "startport": "22", "endport": "22"}),
    );

    let command = Command::builder("updateFirewallRule")
        .param("id", "R1")
        .normalizer(Normalizer::FIREWALL)
        .build()
        .unwrap();

    let result = CommandDispatcher::new(&transport)
        .execute(command, true, &poll())
        .await
        .unwrap();

    assert_eq!(result["startport"], json!(22));
    assert_eq!(transport.sent_count("queryAsyncJobResult"), 0);
}

/// Without async mode the job id is handed back and nothing is polled
#[tokio::test]
async fn test_job_id_returned_when_not_async() {
    let transport = ScriptedTransport::new();
    transport.respond("createFirewallRule", json!({"jobid": "J1"}));

    let result = CommandDispatcher::new(&transport)
        .execute(create_rule(), false, &poll())
        .await
        .unwrap();

    assert_eq!(result, json!({"jobid": "J1"}));
    assert_eq!(transport.sent_count("queryAsyncJobResult"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_job_surfaces_message() {
    let transport = ScriptedTransport::new();
    transport.respond("createFirewallRule", json!({"jobid": "J2"}));
    transport.job("J2", failed("J2", "Port range conflicts"));

    let err = CommandDispatcher::new(&transport)
        .execute(create_rule(), true, &poll())
        .await
        .unwrap_err();

    assert!(
        matches!(err, CosmicError::JobFailed { ref message, .. } if message == "Port range conflicts")
    );
}

#[tokio::test(start_paused = true)]
async fn test_timeout_is_distinct_from_failure() {
    let transport = ScriptedTransport::new();
    transport.respond("createFirewallRule", json!({"jobid": "J3"}));
    for _ in 0..5 {
        transport.job("J3", pending("J3"));
    }

    let err = CommandDispatcher::new(&transport)
        .execute(
            create_rule(),
            true,
            &PollConfig::new(Duration::from_secs(1), Duration::from_secs(3)),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AsyncTimeout);
}

#[tokio::test]
async fn test_submit_error_is_transport_error() {
    let transport = ScriptedTransport::new();
    transport.push(
        "createFirewallRule",
        Reply::Status(401, "unable to verify user credentials".to_string()),
    );

    let err = CommandDispatcher::new(&transport)
        .execute(create_rule(), true, &poll())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(transport.sent().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_client_firewall_service() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond("createFirewallRule", json!({"jobid": "J1"}));
    transport.job(
        "J1",
        succeeded(
            "J1",
            json!({"firewallrule": {"id": "R1", "protocol": "tcp", "startport": "443", "endport": "443"}}),
        ),
    );
    transport.respond("deleteFirewallRule", json!({"jobid": "J2"}));
    transport.job("J2", succeeded("J2", json!({"success": true})));
    transport.respond(
        "listFirewallRules",
        json!({"count": 2, "firewallrule": [{"id": "R1"}, {"id": "R2"}]}),
    );
    transport.respond("listFirewallRules", json!({}));

    let client = CosmicClient::with_transport(transport.clone()).with_poll_config(poll());
    let firewall = client.firewall();

    let rule = firewall
        .create_firewall_rule(&CreateFirewallRule::new("ip-1", "tcp").ports(443, 443))
        .await
        .unwrap();
    assert_eq!(rule.id, "R1");
    assert_eq!(rule.startport, Some(443));

    let deleted = tokio_test::assert_ok!(firewall.delete_firewall_rule("R1").await);
    assert!(deleted.success);

    let rules = firewall
        .list_firewall_rules(&ListFirewallRules::default())
        .await
        .unwrap();
    assert_eq!(rules.len(), 2);

    let err = firewall.get_firewall_rule_by_id("R1").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_client_without_async_mode() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond("createEgressFirewallRule", json!({"jobid": "J7"}));

    let client = CosmicClient::with_transport(transport.clone()).with_async_mode(false);
    let rule = client
        .firewall()
        .create_egress_firewall_rule(&cosmic_api::CreateEgressFirewallRule::new("net-1", "all"))
        .await
        .unwrap();

    assert_eq!(rule.jobid.as_deref(), Some("J7"));
    assert!(rule.id.is_empty());
    assert_eq!(transport.sent_count("queryAsyncJobResult"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_client_port_forwarding_service() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond("createPortForwardingRule", json!({"jobid": "J1"}));
    transport.job(
        "J1",
        succeeded(
            "J1",
            json!({"portforwardingrule": {"id": "PF1", "protocol": "tcp", "privateport": "8080", "publicport": "80"}}),
        ),
    );
    transport.respond("updatePortForwardingRule", json!({"jobid": "J2"}));
    transport.job(
        "J2",
        succeeded(
            "J2",
            json!({"portforwardingrule": {"id": "PF1", "privateport": "9090", "publicport": "80"}}),
        ),
    );
    transport.respond(
        "listPortForwardingRules",
        json!({"count": 2, "portforwardingrule": [
            {"id": "PF1", "publicport": "80"},
            {"id": "PF2", "publicport": "443"}
        ]}),
    );
    transport.respond(
        "listPortForwardingRules",
        json!({"count": 1, "portforwardingrule": [{"id": "PF1", "publicendport": "81"}]}),
    );
    transport.respond("deletePortForwardingRule", json!({"jobid": "J3"}));
    transport.job("J3", succeeded("J3", json!({"success": true})));

    let client = CosmicClient::with_transport(transport.clone()).with_poll_config(poll());
    let firewall = client.firewall();

    let rule = firewall
        .create_port_forwarding_rule(&CreatePortForwardingRule::new("ip-1", "tcp", 8080, 80, "vm-1"))
        .await
        .unwrap();
    assert_eq!(rule.id, "PF1");
    assert_eq!(rule.privateport, Some(8080));

    let update = UpdatePortForwardingRule {
        privateport: Some(9090),
        ..UpdatePortForwardingRule::new("PF1")
    };
    let rule = firewall.update_port_forwarding_rule(&update).await.unwrap();
    assert_eq!(rule.privateport, Some(9090));

    let rules = firewall
        .list_port_forwarding_rules(&ListPortForwardingRules::default())
        .await
        .unwrap();
    let ports: Vec<_> = rules.iter().map(|r| r.publicport).collect();
    assert_eq!(ports, vec![Some(80), Some(443)]);

    let rule = firewall.get_port_forwarding_rule_by_id("PF1").await.unwrap();
    assert_eq!(rule.publicendport, Some(81));

    let deleted = tokio_test::assert_ok!(firewall.delete_port_forwarding_rule("PF1").await);
    assert!(deleted.success);
    assert_eq!(transport.sent_count("queryAsyncJobResult"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_update_egress_firewall_rule() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond("updateEgressFirewallRule", json!({"jobid": "J4"}));
    transport.job(
        "J4",
        succeeded(
            "J4",
            json!({"firewallrule": {"id": "E1", "protocol": "tcp", "startport": "53", "fordisplay": false}}),
        ),
    );

    let client = CosmicClient::with_transport(transport.clone()).with_poll_config(poll());
    let rule = client
        .firewall()
        .update_egress_firewall_rule("E1", None, Some(false))
        .await
        .unwrap();

    assert_eq!(rule.id, "E1");
    assert_eq!(rule.startport, Some(53));
    assert!(!rule.fordisplay);

    let sent = transport.sent();
    assert_eq!(sent[0].name(), "updateEgressFirewallRule");
    assert_eq!(sent[0].get("fordisplay"), Some(&cosmic_api::ParamValue::Bool(false)));
    assert!(sent[0].get("customid").is_none());
}
