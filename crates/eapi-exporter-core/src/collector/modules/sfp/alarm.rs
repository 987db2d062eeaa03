//! Threshold classification of transceiver readings.

use serde::Deserialize;

/// Vendor thresholds for one sensor. Any of them may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Thresholds {
    pub high_alarm: Option<f64>,
    pub high_warn: Option<f64>,
    pub low_alarm: Option<f64>,
    pub low_warn: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmSeverity {
    HighAlarm,
    HighWarn,
    LowAlarm,
    LowWarn,
}

impl AlarmSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmSeverity::HighAlarm => "highAlarm",
            AlarmSeverity::HighWarn => "highWarn",
            AlarmSeverity::LowAlarm => "lowAlarm",
            AlarmSeverity::LowWarn => "lowWarn",
        }
    }
}

/// Returns the most severe violated threshold, checked in the order
/// highAlarm, highWarn, lowAlarm, lowWarn.
pub fn classify(value: f64, thresholds: &Thresholds) -> Option<AlarmSeverity> {
    let above = |limit: Option<f64>| limit.is_some_and(|l| value > l);
    let below = |limit: Option<f64>| limit.is_some_and(|l| value < l);

    if above(thresholds.high_alarm) {
        Some(AlarmSeverity::HighAlarm)
    } else if above(thresholds.high_warn) {
        Some(AlarmSeverity::HighWarn)
    } else if below(thresholds.low_alarm) {
        Some(AlarmSeverity::LowAlarm)
    } else if below(thresholds.low_warn) {
        Some(AlarmSeverity::LowWarn)
    } else {
        None
    }
}
