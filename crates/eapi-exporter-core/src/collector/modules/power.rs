//! Power supplies (`show environment power`).

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{LabelValue, ScrapeContext, number};
use crate::metrics::{
    MetricSample, POWER_SUPPLY, POWER_SUPPLY_FAN_SPEED, POWER_SUPPLY_POWER,
    POWER_SUPPLY_TEMPERATURE,
};

const SHOW_ENVIRONMENT_POWER: &str = "show environment power";

const MEASUREMENTS: [&str; 4] = ["inputCurrent", "inputVoltage", "outputCurrent", "outputPower"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PowerSupply {
    state: String,
    model_name: String,
    capacity: LabelValue,
    #[serde(default)]
    temp_sensors: BTreeMap<String, Value>,
    #[serde(default)]
    fans: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct TempSensor {
    status: String,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct Fan {
    status: String,
    speed: f64,
}

pub fn collect(ctx: &mut ScrapeContext<'_>) -> Vec<MetricSample> {
    let Some(result) = ctx.run(SHOW_ENVIRONMENT_POWER) else {
        return Vec::new();
    };
    let target = ctx.target();
    let Some(supplies) = result.get("powerSupplies").and_then(Value::as_object) else {
        warn!(switch = %target, "no powerSupplies in output");
        return Vec::new();
    };

    let mut samples = Vec::new();
    for (id, raw) in supplies {
        let psu = match PowerSupply::deserialize(raw) {
            Ok(psu) => psu,
            Err(e) => {
                warn!(switch = %target, psu = %id, error = %e, "skipping power supply");
                continue;
            }
        };
        let capacity = psu.capacity.to_string();
        samples.push(MetricSample::info(
            &POWER_SUPPLY,
            [
                psu.state.as_str(),
                psu.model_name.as_str(),
                capacity.as_str(),
                id.as_str(),
                target,
            ],
        ));

        for measurement in MEASUREMENTS {
            match raw.get(measurement).and_then(number) {
                Some(value) => samples.push(MetricSample::gauge(
                    &POWER_SUPPLY_POWER,
                    [id.as_str(), measurement, target],
                    value,
                )),
                None => warn!(switch = %target, psu = %id, measurement, "measurement missing"),
            }
        }

        for (name, raw_sensor) in &psu.temp_sensors {
            match TempSensor::deserialize(raw_sensor) {
                Ok(sensor) => samples.push(MetricSample::gauge(
                    &POWER_SUPPLY_TEMPERATURE,
                    [id.as_str(), sensor.status.as_str(), name.as_str(), target],
                    sensor.temperature,
                )),
                Err(e) => {
                    warn!(switch = %target, psu = %id, sensor = %name, error = %e, "skipping sensor")
                }
            }
        }

        for (name, raw_fan) in &psu.fans {
            match Fan::deserialize(raw_fan) {
                Ok(fan) => samples.push(MetricSample::gauge(
                    &POWER_SUPPLY_FAN_SPEED,
                    [id.as_str(), fan.status.as_str(), name.as_str(), target],
                    fan.speed,
                )),
                Err(e) => {
                    warn!(switch = %target, psu = %id, fan = %name, error = %e, "skipping fan")
                }
            }
        }
    }
    samples
}
