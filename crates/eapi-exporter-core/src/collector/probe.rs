//! Reachability and identity probe (`show version`).

use serde::Deserialize;
use tracing::{debug, warn};

use super::session::DeviceSession;
use crate::metrics::{HW, MetricSample, UP};

const SHOW_VERSION: &str = "show version";

/// Placeholder for hw labels of unreachable switches.
pub const UNKNOWN: &str = "unknown";

/// Identity reported by a reachable switch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(rename = "modelName")]
    pub model: String,
    #[serde(rename = "serialNumber")]
    pub serial: String,
    pub version: String,
    pub mem_total: f64,
    pub mem_free: f64,
}

impl DeviceSession {
    /// Runs the base probe and records the outcome on the session.
    ///
    /// Returns `None` (and marks the switch down) when the command fails or
    /// a required field is missing.
    pub fn probe(&mut self) -> Option<Identity> {
        let identity = match self.execute(SHOW_VERSION) {
            Ok(result) => match Identity::deserialize(&result) {
                Ok(identity) => Some(identity),
                Err(e) => {
                    warn!(switch = %self.target(), error = %e, "unexpected show version output");
                    None
                }
            },
            Err(_) => None,
        };

        self.up = identity.is_some();
        if self.up {
            debug!(switch = %self.target(), "received a result from switch");
        }
        self.identity = identity.clone();
        identity
    }

    /// Identity captured by the last successful probe.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}

/// Builds the `up` and `hw` samples for one target.
pub fn identity_samples(target: &str, identity: Option<&Identity>) -> Vec<MetricSample> {
    match identity {
        Some(id) => vec![
            MetricSample::gauge(&UP, [target], 1.0),
            MetricSample::info(
                &HW,
                [id.model.as_str(), id.serial.as_str(), id.version.as_str(), target],
            ),
        ],
        None => vec![
            MetricSample::gauge(&UP, [target], 0.0),
            MetricSample::info(&HW, [UNKNOWN, UNKNOWN, UNKNOWN, target]),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockSwitch;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn probe_healthy_switch() {
        let mut session = DeviceSession::new("sw1", Arc::new(MockSwitch::typical_switch()));
        let identity = session.probe().unwrap();

        assert!(session.is_up());
        assert_eq!(identity.model, "DCS-7280SR-48C6");
        assert_eq!(identity.serial, "JPE17191234");
        assert_eq!(identity.mem_total, 16012300.0);
        assert_eq!(session.identity(), Some(&identity));
    }

    #[test]
    fn probe_is_idempotent() {
        let mut session = DeviceSession::new("sw1", Arc::new(MockSwitch::typical_switch()));
        let first = identity_samples("sw1", session.probe().as_ref());
        let second = identity_samples("sw1", session.probe().as_ref());
        assert_eq!(first, second);
    }

    #[test]
    fn unreachable_switch_is_down_with_unknown_labels() {
        let switch = MockSwitch::typical_switch();
        switch.set_unreachable("sw1");
        let mut session = DeviceSession::new("sw1", Arc::new(switch));

        let identity = session.probe();
        assert!(identity.is_none());
        assert!(!session.is_up());

        let samples = identity_samples("sw1", identity.as_ref());
        assert_eq!(samples[0].gauge_value(), Some(0.0));
        assert_eq!(samples[1].label("model"), Some(UNKNOWN));
        assert_eq!(samples[1].label("target"), Some("sw1"));
    }

    #[test]
    fn missing_field_marks_switch_down() {
        let switch = MockSwitch::new();
        switch.add_response(
            "show version",
            json!({"modelName": "DCS-7050", "serialNumber": "SN", "version": "4.20"}),
        );
        let mut session = DeviceSession::new("sw1", Arc::new(switch));
        assert!(session.probe().is_none());
        assert!(!session.is_up());
    }

    #[test]
    fn recovered_switch_comes_back_up() {
        let switch = MockSwitch::typical_switch();
        switch.set_unreachable("sw1");
        let mut session = DeviceSession::new("sw1", Arc::new(switch.clone()));
        assert!(session.probe().is_none());

        switch.set_reachable("sw1");
        assert!(session.probe().is_some());
        assert!(session.is_up());
    }
}
