//! Integration tests for link/session recovery as seen from the node loop.

use crate::mock_hw::{MockHardware, MockNetwork, RecordingSink};

use greenhouse_node::adapters::entropy::EntropySource;
use greenhouse_node::adapters::mqtt::MqttAdapter;
use greenhouse_node::adapters::network::NetworkAdapter;
use greenhouse_node::adapters::wifi::WifiAdapter;
use greenhouse_node::app::commands::Actuator;
use greenhouse_node::app::events::NodeEvent;
use greenhouse_node::app::service::NodeService;
use greenhouse_node::config::NodeConfig;
use greenhouse_node::connectivity::ConnectivityPhase;
use greenhouse_node::topics::Topics;

fn make_node() -> (NodeService, MockHardware, RecordingSink) {
    let mut node = NodeService::new(NodeConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    node.start(&mut hw, &mut sink);
    hw.clear();
    (node, hw, sink)
}

fn control_filter(node: &NodeService) -> String {
    Topics::for_node(&node.config().node_id).control_filter.to_string()
}

#[test]
fn connects_and_subscribes_in_one_tick_when_link_is_up() {
    let (mut node, mut hw, mut sink) = make_node();
    let mut net = MockNetwork::online();

    node.tick(0, &mut hw, &mut net, &mut sink);

    assert_eq!(node.connectivity(), ConnectivityPhase::Connected);
    assert_eq!(net.subscriptions, vec![control_filter(&node)]);
    assert_eq!(net.client_ids, vec!["gh-client-gh1-7".to_string()]);
    assert!(sink.events.contains(&NodeEvent::ConnectivityChanged {
        from: ConnectivityPhase::Disconnected,
        to: ConnectivityPhase::Connected,
    }));
}

#[test]
fn link_loss_reconnects_and_resubscribes() {
    let (mut node, mut hw, mut sink) = make_node();
    let mut net = MockNetwork::online();
    node.tick(0, &mut hw, &mut net, &mut sink);
    assert!(node.is_online());

    net.link_up = false;
    node.tick(100, &mut hw, &mut net, &mut sink);
    assert_eq!(node.connectivity(), ConnectivityPhase::ConnectingLink);
    assert_eq!(net.link_kicks, 1);
    assert!(!net.session_up, "session torn down with the link");

    net.link_up = true;
    node.tick(200, &mut hw, &mut net, &mut sink);
    assert!(node.is_online());
    assert_eq!(net.subscriptions, vec![control_filter(&node)]);
    assert_eq!(net.client_ids.len(), 2);
    assert_eq!(node.connectivity_stats().sessions_established, 2);

    // Commands flow again after the resubscribe.
    let light = Topics::control(&node.config().node_id, Actuator::Light);
    assert!(net.inject(&light, r#"{"command":"ON"}"#));
    node.tick(300, &mut hw, &mut net, &mut sink);
    assert_eq!(hw.light_writes(), vec![true]);
}

#[test]
fn broker_drop_reconnects_without_touching_link() {
    let (mut node, mut hw, mut sink) = make_node();
    let mut net = MockNetwork::online();
    node.tick(0, &mut hw, &mut net, &mut sink);

    net.drop_session();
    node.tick(50, &mut hw, &mut net, &mut sink);

    assert!(node.is_online());
    assert_eq!(net.link_kicks, 0);
    assert_eq!(net.subscriptions.len(), 1);
}

#[test]
fn refused_session_retries_after_delay() {
    let (mut node, mut hw, mut sink) = make_node();
    let mut net = MockNetwork::online();
    net.refuse_sessions = true;
    let retry_ms = u64::from(node.config().session_retry_delay_ms);

    node.tick(0, &mut hw, &mut net, &mut sink);
    assert_eq!(node.connectivity(), ConnectivityPhase::ConnectingSession);
    node.tick(retry_ms - 1, &mut hw, &mut net, &mut sink);
    assert_eq!(net.client_ids.len(), 1, "no attempt before the delay");

    net.refuse_sessions = false;
    node.tick(retry_ms, &mut hw, &mut net, &mut sink);
    assert!(node.is_online());
    assert_eq!(net.client_ids.len(), 2);
    assert_ne!(net.client_ids[0], net.client_ids[1], "fresh client id per attempt");
}

#[test]
fn subscribe_failure_drops_session_and_retries() {
    let (mut node, mut hw, mut sink) = make_node();
    let mut net = MockNetwork::online();
    net.fail_subscribe = true;

    node.tick(0, &mut hw, &mut net, &mut sink);
    assert!(!node.is_online());
    assert!(!net.session_up);

    net.fail_subscribe = false;
    node.tick(u64::from(node.config().session_retry_delay_ms), &mut hw, &mut net, &mut sink);
    assert!(node.is_online());
}

#[test]
fn nothing_is_polled_while_offline() {
    let (mut node, mut hw, mut sink) = make_node();
    let mut net = MockNetwork::online();
    node.tick(0, &mut hw, &mut net, &mut sink);
    let light = Topics::control(&node.config().node_id, Actuator::Light);
    assert!(net.inject(&light, r#"{"command":"ON"}"#));

    // Link goes down before the message is drained.
    net.link_up = false;
    node.tick(10, &mut hw, &mut net, &mut sink);
    assert!(hw.light_writes().is_empty());
    assert_eq!(net.pending(), 0, "teardown discards undrained messages");

    // Long outage, then recovery: the old command stays dead.
    net.link_up = true;
    node.tick(3_600_000, &mut hw, &mut net, &mut sink);
    assert!(node.is_online());
    node.tick(3_600_001, &mut hw, &mut net, &mut sink);
    assert!(hw.light_writes().is_empty());

    // A command sent after the resubscribe is applied.
    assert!(net.inject(&light, r#"{"command":"ON"}"#));
    node.tick(3_600_002, &mut hw, &mut net, &mut sink);
    assert_eq!(hw.light_writes(), vec![true]);
}

#[test]
fn session_drop_discards_undrained_command() {
    let (mut node, mut hw, mut sink) = make_node();
    let mut net = MockNetwork::online();
    node.tick(0, &mut hw, &mut net, &mut sink);
    let light = Topics::control(&node.config().node_id, Actuator::Light);
    assert!(net.inject(&light, r#"{"command":"ON"}"#));

    // Broker drops us with the message still queued; the next tick
    // reconnects at once.
    net.drop_session();
    node.tick(10, &mut hw, &mut net, &mut sink);
    assert!(node.is_online());

    assert!(hw.light_writes().is_empty());
}

// ── Full adapter stack (host simulation) ──────────────────────

fn sim_network(config: &NodeConfig) -> NetworkAdapter {
    NetworkAdapter::new(
        WifiAdapter::new(config),
        MqttAdapter::new(config),
        EntropySource::seeded(0x5eed),
    )
}

#[test]
fn sim_stack_comes_online_and_publishes() {
    let config = NodeConfig::default();
    let mut net = sim_network(&config);
    let (mut node, mut hw, mut sink) = make_node();

    node.tick(0, &mut hw, &mut net, &mut sink);
    assert_eq!(node.connectivity(), ConnectivityPhase::ConnectingLink);
    node.tick(1, &mut hw, &mut net, &mut sink);
    assert!(node.is_online());
    assert_eq!(net.mqtt().sim_subscriptions(), &[control_filter(&node)]);

    let fan = Topics::control(&config.node_id, Actuator::Fan);
    assert!(net.mqtt_mut().sim_inject(&fan, br#"{"command":"ON"}"#));
    node.tick(2, &mut hw, &mut net, &mut sink);
    assert!(node.state().is_on(Actuator::Fan));

    node.tick(u64::from(config.publish_interval_ms), &mut hw, &mut net, &mut sink);
    let topics = Topics::for_node(&config.node_id);
    let published: Vec<&str> = net
        .mqtt()
        .sim_published()
        .iter()
        .map(|(t, _)| t.as_str())
        .collect();
    assert_eq!(published, vec![topics.environment.as_str(), topics.status.as_str()]);
}

#[test]
fn sim_stack_drops_commands_from_a_dead_session() {
    let config = NodeConfig::default();
    let mut net = sim_network(&config);
    let (mut node, mut hw, mut sink) = make_node();
    node.tick(0, &mut hw, &mut net, &mut sink);
    node.tick(1, &mut hw, &mut net, &mut sink);
    assert!(node.is_online());

    let light = Topics::control(&config.node_id, Actuator::Light);
    assert!(net.mqtt_mut().sim_inject(&light, br#"{"command":"ON"}"#));
    net.wifi_mut().sim_refuse_connect(true);
    net.wifi_mut().sim_set_link(false);
    node.tick(2, &mut hw, &mut net, &mut sink);
    assert!(!node.is_online());

    net.wifi_mut().sim_refuse_connect(false);
    node.tick(3_600_000, &mut hw, &mut net, &mut sink);
    node.tick(3_600_001, &mut hw, &mut net, &mut sink);
    assert!(node.is_online());
    assert!(hw.light_writes().is_empty(), "stale command must not replay");

    assert!(net.mqtt_mut().sim_inject(&light, br#"{"command":"ON"}"#));
    node.tick(3_600_002, &mut hw, &mut net, &mut sink);
    assert_eq!(hw.light_writes(), vec![true]);
}

#[test]
fn sim_stack_survives_wifi_drop() {
    let config = NodeConfig::default();
    let mut net = sim_network(&config);
    let (mut node, mut hw, mut sink) = make_node();
    node.tick(0, &mut hw, &mut net, &mut sink);
    node.tick(1, &mut hw, &mut net, &mut sink);
    assert!(node.is_online());

    net.wifi_mut().sim_set_link(false);
    node.tick(2, &mut hw, &mut net, &mut sink);
    // The sim link comes back on the connect request itself.
    node.tick(3, &mut hw, &mut net, &mut sink);

    assert!(node.is_online());
    assert_eq!(net.wifi().connect_requests(), 2);
    assert_eq!(net.mqtt().sim_client_ids().len(), 2);
    assert_eq!(net.mqtt().sim_subscriptions(), &[control_filter(&node)]);
}
