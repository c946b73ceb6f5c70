//! Local climate rules.
//!
//! The node can run the same threshold automation the greenhouse backend
//! offers in its "auto" mode, without a round trip through the broker:
//!
//! * fan ON while temperature > `fan_on_above_c`, else OFF
//! * sprinkler ON while humidity < `sprinkler_on_below_pct`, else OFF
//!
//! Rules are evaluated against each published sample and produce ordinary
//! [`Command`]s, so they go through the same apply path as remote ones.
//! Disabled by default.

use crate::app::commands::{Actuator, Command, Switch};
use crate::config::ClimateRules;
use crate::telemetry::SensorSample;

/// Commands implied by `sample`. Empty when disabled or the sample is invalid.
pub fn evaluate(rules: &ClimateRules, sample: &SensorSample) -> [Option<Command>; 2] {
    if !rules.enabled || !sample.is_valid() {
        return [None, None];
    }
    let fan = sample.temperature_c > rules.fan_on_above_c;
    let sprinkler = sample.humidity_pct < rules.sprinkler_on_below_pct;
    [
        Some(Command::new(Actuator::Fan, Switch::from_bool(fan))),
        Some(Command::new(Actuator::Sprinkler, Switch::from_bool(sprinkler))),
    ]
}
