//! Integration tests for the NodeService loop: control messages in,
//! actuator writes and telemetry out.

use crate::mock_hw::{ActuatorCall, MockHardware, MockNetwork, RecordingSink};

use greenhouse_node::app::commands::{Actuator, Switch};
use greenhouse_node::app::events::{CommandSource, NodeEvent};
use greenhouse_node::app::service::NodeService;
use greenhouse_node::app::state::{SweepDirection, SWEEP_MAX_DEG};
use greenhouse_node::config::NodeConfig;
use greenhouse_node::telemetry::{DoorState, SensorSample};
use greenhouse_node::topics::Topics;

const STEP_MS: u64 = 25;
const PUBLISH_MS: u64 = 2_000;

fn make_node() -> (NodeService, MockHardware, MockNetwork, RecordingSink) {
    let mut node = NodeService::new(NodeConfig::default());
    let mut hw = MockHardware::new();
    let net = MockNetwork::online();
    let mut sink = RecordingSink::new();
    node.start(&mut hw, &mut sink);
    hw.clear();
    (node, hw, net, sink)
}

fn control_topic(node: &NodeService, actuator: Actuator) -> String {
    Topics::control(&node.config().node_id, actuator).to_string()
}

fn topics(node: &NodeService) -> Topics {
    Topics::for_node(&node.config().node_id)
}

#[test]
fn start_drives_outputs_to_rest() {
    let mut node = NodeService::new(NodeConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    node.start(&mut hw, &mut sink);

    assert_eq!(
        hw.calls,
        vec![
            ActuatorCall::Light(false),
            ActuatorCall::Sprinkler(false),
            ActuatorCall::Sweep(0),
        ]
    );
    assert_eq!(sink.events, vec![NodeEvent::Started]);
}

// ── Light scenario ────────────────────────────────────────────

#[test]
fn light_on_command_switches_relay_and_shows_in_status() {
    let (mut node, mut hw, mut net, mut sink) = make_node();
    node.tick(0, &mut hw, &mut net, &mut sink);
    assert!(node.is_online());

    let topic = control_topic(&node, Actuator::Light);
    assert!(net.inject(&topic, r#"{"command":"ON"}"#));
    node.tick(10, &mut hw, &mut net, &mut sink);

    assert_eq!(hw.light_writes(), vec![true]);
    assert_eq!(node.state().switch(Actuator::Light), Switch::On);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            NodeEvent::CommandApplied { source: CommandSource::Remote, .. }
        )),
        1
    );

    node.tick(PUBLISH_MS, &mut hw, &mut net, &mut sink);
    let status = net.published_on(&topics(&node).status);
    assert_eq!(
        status,
        vec![r#"{"door":"CLOSED","light_state":"ON","fan_state":"OFF","sprinkler_state":"OFF","interval":2000}"#]
    );
}

#[test]
fn anything_but_exact_on_switches_off() {
    let (mut node, mut hw, mut net, mut sink) = make_node();
    node.tick(0, &mut hw, &mut net, &mut sink);
    let topic = control_topic(&node, Actuator::Sprinkler);

    net.inject(&topic, r#"{"command":"ON"}"#);
    node.tick(1, &mut hw, &mut net, &mut sink);
    net.inject(&topic, r#"{"command":"on"}"#);
    node.tick(2, &mut hw, &mut net, &mut sink);
    net.inject(&topic, r#"{"command":"ON"}"#);
    node.tick(3, &mut hw, &mut net, &mut sink);
    net.inject(&topic, "not json");
    node.tick(4, &mut hw, &mut net, &mut sink);

    assert_eq!(hw.sprinkler_writes(), vec![true, false, true, false]);
}

#[test]
fn repeated_command_writes_once() {
    let (mut node, mut hw, mut net, mut sink) = make_node();
    node.tick(0, &mut hw, &mut net, &mut sink);
    let topic = control_topic(&node, Actuator::Light);

    for now in 1..=3 {
        net.inject(&topic, r#"{"command":"ON"}"#);
        node.tick(now, &mut hw, &mut net, &mut sink);
    }

    assert_eq!(hw.light_writes(), vec![true]);
    assert_eq!(node.stats().commands_applied, 1);
}

#[test]
fn unknown_actuator_is_ignored() {
    let (mut node, mut hw, mut net, mut sink) = make_node();
    node.tick(0, &mut hw, &mut net, &mut sink);

    let topic = format!("{}/{}/control/heater", greenhouse_node::topics::TOPIC_ROOT, node.config().node_id);
    assert!(net.inject(&topic, r#"{"command":"ON"}"#));
    node.tick(1, &mut hw, &mut net, &mut sink);

    assert!(hw.calls.is_empty());
    assert_eq!(node.stats().commands_ignored, 1);
    assert_eq!(sink.count(|e| *e == NodeEvent::CommandIgnored), 1);
}

#[test]
fn several_messages_in_one_tick_apply_in_order() {
    let (mut node, mut hw, mut net, mut sink) = make_node();
    node.tick(0, &mut hw, &mut net, &mut sink);
    let light = control_topic(&node, Actuator::Light);

    net.inject(&light, r#"{"command":"ON"}"#);
    net.inject(&light, r#"{"command":"OFF"}"#);
    net.inject(&light, r#"{"command":"ON"}"#);
    node.tick(1, &mut hw, &mut net, &mut sink);

    assert_eq!(hw.light_writes(), vec![true, false, true]);
    assert!(node.state().is_on(Actuator::Light));
}

// ── Telemetry ─────────────────────────────────────────────────

#[test]
fn telemetry_publishes_both_payloads_each_interval() {
    let (mut node, mut hw, mut net, mut sink) = make_node();
    hw.door = DoorState::Open;
    let t = topics(&node);

    let mut now = 0;
    while now <= 3 * PUBLISH_MS {
        node.tick(now, &mut hw, &mut net, &mut sink);
        now += 100;
    }

    let env = net.published_on(&t.environment);
    assert_eq!(env.len(), 3);
    assert_eq!(env[0], r#"{"temperature":24.5,"humidity":58.0}"#);
    let status = net.published_on(&t.status);
    assert_eq!(status.len(), 3);
    assert!(status[0].starts_with(r#"{"door":"OPEN""#));
    assert_eq!(node.stats().telemetry_published, 3);
    assert_eq!(hw.climate_reads, 3);
}

#[test]
fn invalid_reading_publishes_nothing() {
    let (mut node, mut hw, mut net, mut sink) = make_node();
    hw.sample = SensorSample::new(f32::NAN, 55.0);

    node.tick(0, &mut hw, &mut net, &mut sink);
    node.tick(PUBLISH_MS, &mut hw, &mut net, &mut sink);

    assert!(net.published.is_empty());
    assert_eq!(node.stats().telemetry_skipped, 1);
    assert_eq!(sink.count(|e| *e == NodeEvent::SensorUnavailable), 1);

    // Recovers on the next cycle.
    hw.sample = SensorSample::new(22.0, 55.0);
    node.tick(2 * PUBLISH_MS, &mut hw, &mut net, &mut sink);
    assert_eq!(net.published.len(), 2);
}

#[test]
fn offline_cycle_is_skipped_not_queued() {
    let (mut node, mut hw, _, mut sink) = make_node();
    let mut net = MockNetwork::offline();

    node.tick(PUBLISH_MS, &mut hw, &mut net, &mut sink);
    assert_eq!(node.stats().telemetry_skipped, 1);
    assert_eq!(hw.climate_reads, 0);

    // Coming online just after a skipped firing waits a full interval.
    net.link_up = true;
    node.tick(PUBLISH_MS + 10, &mut hw, &mut net, &mut sink);
    assert!(node.is_online());
    node.tick(2 * PUBLISH_MS - 1, &mut hw, &mut net, &mut sink);
    assert!(net.published.is_empty());
    node.tick(2 * PUBLISH_MS, &mut hw, &mut net, &mut sink);
    assert_eq!(net.published.len(), 2);
}

// ── Sweep scenario ────────────────────────────────────────────

#[test]
fn fan_sweep_runs_for_two_hundred_steps() {
    let (mut node, mut hw, mut net, mut sink) = make_node();
    node.tick(0, &mut hw, &mut net, &mut sink);
    net.inject(&control_topic(&node, Actuator::Fan), r#"{"command":"ON"}"#);
    node.tick(0, &mut hw, &mut net, &mut sink);
    assert!(node.state().is_on(Actuator::Fan));
    assert!(hw.sweep_writes().is_empty(), "fan command itself writes no angle");

    for step in 1..=200 {
        node.tick(step * STEP_MS, &mut hw, &mut net, &mut sink);
    }

    let angles = hw.sweep_writes();
    assert_eq!(angles.len(), 200);
    assert_eq!(angles[0], 1);
    assert_eq!(angles[179], SWEEP_MAX_DEG);
    assert_eq!(angles[180], SWEEP_MAX_DEG - 1);
    assert_eq!(*angles.last().unwrap(), 160);
    assert!(angles.windows(2).all(|w| w[0].abs_diff(w[1]) == 1));
    assert_eq!(node.state().sweep_direction(), SweepDirection::Reverse);
}

#[test]
fn sweep_does_not_step_faster_than_interval() {
    let (mut node, mut hw, mut net, mut sink) = make_node();
    node.tick(0, &mut hw, &mut net, &mut sink);
    net.inject(&control_topic(&node, Actuator::Fan), r#"{"command":"ON"}"#);

    for now in 0..100 {
        node.tick(now, &mut hw, &mut net, &mut sink);
    }

    assert_eq!(hw.sweep_writes(), vec![1, 2, 3]);
}

#[test]
fn fan_off_parks_servo_once() {
    let (mut node, mut hw, mut net, mut sink) = make_node();
    let fan = control_topic(&node, Actuator::Fan);
    node.tick(0, &mut hw, &mut net, &mut sink);
    net.inject(&fan, r#"{"command":"ON"}"#);
    for step in 0..=10 {
        node.tick(step * STEP_MS, &mut hw, &mut net, &mut sink);
    }
    hw.clear();

    net.inject(&fan, r#"{"command":"OFF"}"#);
    for step in 11..=20 {
        node.tick(step * STEP_MS, &mut hw, &mut net, &mut sink);
    }

    assert_eq!(hw.sweep_writes(), vec![0]);
    assert_eq!(node.state().sweep_position(), 0);
    assert_eq!(node.state().sweep_direction(), SweepDirection::Forward);
}

#[test]
fn sweep_keeps_running_while_offline() {
    let (mut node, mut hw, mut net, mut sink) = make_node();
    node.tick(0, &mut hw, &mut net, &mut sink);
    net.inject(&control_topic(&node, Actuator::Fan), r#"{"command":"ON"}"#);
    node.tick(0, &mut hw, &mut net, &mut sink);

    net.link_up = false;
    for step in 1..=10 {
        node.tick(step * STEP_MS, &mut hw, &mut net, &mut sink);
    }

    assert!(!node.is_online());
    assert_eq!(hw.sweep_writes().len(), 10);
}

// ── Local climate rules ───────────────────────────────────────

#[test]
fn climate_rules_act_on_published_sample() {
    let mut config = NodeConfig::default();
    config.automation.enabled = true;
    let mut node = NodeService::new(config);
    let mut hw = MockHardware::new();
    let mut net = MockNetwork::online();
    let mut sink = RecordingSink::new();
    node.start(&mut hw, &mut sink);
    hw.clear();
    hw.sample = SensorSample::new(31.0, 35.0);

    node.tick(0, &mut hw, &mut net, &mut sink);
    node.tick(PUBLISH_MS, &mut hw, &mut net, &mut sink);

    assert!(node.state().is_on(Actuator::Fan));
    assert!(node.state().is_on(Actuator::Sprinkler));
    assert_eq!(hw.sprinkler_writes(), vec![true]);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            NodeEvent::CommandApplied { source: CommandSource::Automation, .. }
        )),
        2
    );
}

#[test]
fn climate_rules_disabled_by_default() {
    let (mut node, mut hw, mut net, mut sink) = make_node();
    hw.sample = SensorSample::new(35.0, 10.0);

    node.tick(0, &mut hw, &mut net, &mut sink);
    node.tick(PUBLISH_MS, &mut hw, &mut net, &mut sink);

    assert!(!node.state().is_on(Actuator::Fan));
    assert!(hw.sprinkler_writes().is_empty());
}
