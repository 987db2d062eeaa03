//! Transceiver readings and threshold alarms
//! (`show interfaces transceiver detail`).

mod alarm;
mod lane;

pub use alarm::{AlarmSeverity, Thresholds, classify};
pub use lane::{LaneMapping, resolve_lane};

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{ScrapeContext, number};
use crate::metrics::{MetricSample, SFP_ALARMS, SFP_STATS};

const SHOW_TRANSCEIVERS: &str = "show interfaces transceiver detail";

const SENSORS: [&str; 4] = ["rxPower", "txBias", "txPower", "voltage"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Transceiver {
    media_type: String,
    vendor_sn: String,
    #[serde(default)]
    details: Map<String, Value>,
}

pub fn collect(ctx: &mut ScrapeContext<'_>) -> Vec<MetricSample> {
    let target = ctx.target().to_string();
    let Some(result) = ctx.run(SHOW_TRANSCEIVERS) else {
        return Vec::new();
    };
    let Some(entries) = result.get("interfaces").and_then(Value::as_object) else {
        debug!(switch = %target, "no transceiver table");
        return Vec::new();
    };
    let Some(interfaces) = ctx.interfaces() else {
        return Vec::new();
    };

    let serials: HashMap<&str, &str> = entries
        .iter()
        .filter_map(|(name, data)| {
            let serial = data.get("vendorSn")?.as_str()?;
            Some((name.as_str(), serial))
        })
        .collect();

    let mut samples = Vec::new();
    for (name, data) in entries {
        if data.as_object().is_none_or(Map::is_empty) {
            debug!(switch = %target, interface = %name, "port has no transceiver");
            continue;
        }
        let xcvr = match Transceiver::deserialize(data) {
            Ok(xcvr) => xcvr,
            Err(e) => {
                warn!(switch = %target, interface = %name, error = %e, "skipping transceiver");
                continue;
            }
        };

        let mapping = resolve_lane(name, interfaces, &serials);
        if mapping.interface != *name {
            debug!(
                switch = %target,
                lane = %mapping.lane,
                interface = %mapping.interface,
                "transceiver entry is a lane of another interface"
            );
        }
        let description = interfaces
            .get(&mapping.interface)
            .and_then(|i| i.get("description"))
            .and_then(Value::as_str)
            .unwrap_or("");

        for sensor in SENSORS {
            let Some(value) = data.get(sensor).and_then(number) else {
                warn!(switch = %target, interface = %name, sensor, "sensor reading missing");
                continue;
            };
            samples.push(MetricSample::gauge(
                &SFP_STATS,
                [
                    mapping.interface.as_str(),
                    sensor,
                    xcvr.media_type.as_str(),
                    xcvr.vendor_sn.as_str(),
                    description,
                    mapping.lane.as_str(),
                    target.as_str(),
                ],
                value,
            ));

            let thresholds = xcvr
                .details
                .get(sensor)
                .and_then(|t| Thresholds::deserialize(t).ok())
                .unwrap_or_default();
            if let Some(severity) = classify(value, &thresholds) {
                samples.push(MetricSample::gauge(
                    &SFP_ALARMS,
                    [
                        mapping.interface.as_str(),
                        mapping.lane.as_str(),
                        sensor,
                        severity.as_str(),
                        target.as_str(),
                    ],
                    value,
                ));
            }
        }
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockSwitch;
    use crate::collector::session::DeviceSession;
    use serde_json::json;
    use std::sync::Arc;

    fn run(switch: MockSwitch) -> Vec<MetricSample> {
        let mut session = DeviceSession::new("sw1", Arc::new(switch));
        let identity = session.probe().unwrap();
        let mut ctx = ScrapeContext::new(&mut session, &identity);
        collect(&mut ctx)
    }

    fn of<'a>(samples: &'a [MetricSample], family: &str) -> Vec<&'a MetricSample> {
        samples.iter().filter(|s| s.family.name == family).collect()
    }

    #[test]
    fn typical_switch_readings() {
        let samples = run(MockSwitch::typical_switch());
        let stats = of(&samples, "arista_sfp_stats");

        // Ethernet2/1 has an empty entry.
        assert_eq!(stats.len(), 3 * 4);
        assert!(stats.iter().all(|s| s.label("device") != Some("Ethernet2/1")));

        let rx = stats
            .iter()
            .find(|s| {
                s.label("lane") == Some("Ethernet1/1") && s.label("sensor") == Some("rxPower")
            })
            .unwrap();
        assert_eq!(rx.gauge_value(), Some(-2.1));
        assert_eq!(rx.label("mediaType"), Some("10GBASE-SR"));
        assert_eq!(rx.label("serial"), Some("XCVR-A1"));
        assert_eq!(rx.label("description"), Some("uplink spine1"));
    }

    #[test]
    fn lane_readings_are_attributed_to_parent() {
        let samples = run(MockSwitch::typical_switch());
        let lane = of(&samples, "arista_sfp_stats")
            .into_iter()
            .filter(|s| s.label("lane") == Some("Ethernet3/2"))
            .collect::<Vec<_>>();

        assert_eq!(lane.len(), 4);
        assert!(lane.iter().all(|s| s.label("device") == Some("Ethernet3/1")));
        assert!(lane.iter().all(|s| s.label("description") == Some("uplink spine2")));
    }

    #[test]
    fn alarms_for_violated_thresholds() {
        let samples = run(MockSwitch::typical_switch());
        let alarms = of(&samples, "arista_sfp_alarms");
        assert_eq!(alarms.len(), 2);

        let tx = alarms
            .iter()
            .find(|s| s.label("sensor") == Some("txPower"))
            .unwrap();
        assert_eq!(tx.label("alarmType"), Some("highWarn"));
        assert_eq!(tx.label("lane"), Some("Ethernet3/1"));
        assert_eq!(tx.gauge_value(), Some(1.5));

        let rx = alarms
            .iter()
            .find(|s| s.label("sensor") == Some("rxPower"))
            .unwrap();
        assert_eq!(rx.label("alarmType"), Some("lowAlarm"));
        assert_eq!(rx.label("device"), Some("Ethernet3/1"));
        assert_eq!(rx.label("lane"), Some("Ethernet3/2"));
        assert_eq!(rx.gauge_value(), Some(-15.0));
    }

    #[test]
    fn incomplete_entries_are_skipped() {
        let switch = MockSwitch::typical_switch();
        switch.add_response(
            SHOW_TRANSCEIVERS,
            json!({"interfaces": {
                "Ethernet1/1": {"vendorSn": "X1", "rxPower": -2.0},
                "Ethernet2/1": {"mediaType": "10GBASE-LR", "vendorSn": "X2",
                                "rxPower": -3.0, "txPower": -1.0}
            }}),
        );
        let samples = run(switch);

        // Ethernet1/1 lacks mediaType; Ethernet2/1 lacks two readings and
        // has no thresholds.
        assert_eq!(samples.len(), 2);
        assert!(samples.iter().all(|s| s.label("device") == Some("Ethernet2/1")));
        assert!(samples.iter().all(|s| s.family.name == "arista_sfp_stats"));
    }

    #[test]
    fn unknown_interface_gets_empty_description() {
        let switch = MockSwitch::typical_switch();
        switch.add_response(
            SHOW_TRANSCEIVERS,
            json!({"interfaces": {
                "Ethernet9/1": {"mediaType": "10GBASE-SR", "vendorSn": "X9",
                                "rxPower": -2.0, "txBias": 6.0, "txPower": -1.0,
                                "voltage": 3.3}
            }}),
        );
        let samples = run(switch);
        assert_eq!(samples.len(), 4);
        assert!(samples.iter().all(|s| s.label("description") == Some("")));
    }

    #[test]
    fn failed_transceiver_command_yields_nothing() {
        let switch = MockSwitch::typical_switch();
        switch.remove_response(SHOW_TRANSCEIVERS);
        assert!(run(switch).is_empty());
    }
}
