//! Interface state and counters (`show interfaces`).
//!
//! Counters are exported raw, in the units the switch reports; rates are
//! left to the consumer.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{LabelValue, ScrapeContext, number};
use crate::metrics::{ADMIN_UP, L2_UP, MetricSample, PORT_BANDWIDTH, PORT_STATS};

const ADMIN_DISABLED: &str = "disabled";
const LINE_PROTOCOL_UP: &str = "up";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Interface {
    name: String,
    description: String,
    interface_status: String,
    line_protocol_status: String,
    bandwidth: f64,
    physical_address: String,
    mtu: LabelValue,
    interface_counters: Map<String, Value>,
}

pub fn collect(ctx: &mut ScrapeContext<'_>) -> Vec<MetricSample> {
    let target = ctx.target().to_string();
    let Some(interfaces) = ctx.interfaces() else {
        return Vec::new();
    };

    let mut samples = Vec::new();
    for (device, raw) in interfaces {
        // Some interface types never expose counters.
        if raw.get("interfaceCounters").is_none() {
            debug!(switch = %target, interface = %device, "no interfaceCounters, skipping");
            continue;
        }
        match Interface::deserialize(raw) {
            Ok(iface) => samples.extend(interface_samples(device, &iface, &target)),
            Err(e) => {
                warn!(switch = %target, interface = %device, error = %e, "skipping interface");
            }
        }
    }
    samples
}

fn interface_samples(device: &str, iface: &Interface, target: &str) -> Vec<MetricSample> {
    let labels = [iface.name.as_str(), iface.description.as_str(), target];
    let admin_up = if iface.interface_status == ADMIN_DISABLED {
        0.0
    } else {
        1.0
    };
    let l2_up = if iface.line_protocol_status == LINE_PROTOCOL_UP {
        1.0
    } else {
        0.0
    };

    let mut samples = Vec::with_capacity(3 + PORT_STATS.len());
    samples.push(MetricSample::gauge(&ADMIN_UP, labels, admin_up));
    samples.push(MetricSample::gauge(&L2_UP, labels, l2_up));
    samples.push(MetricSample::gauge(&PORT_BANDWIDTH, labels, iface.bandwidth));

    let mtu = iface.mtu.to_string();
    for (field, family) in PORT_STATS.iter() {
        let Some(value) = iface.interface_counters.get(*field).and_then(number) else {
            debug!(switch = %target, interface = %device, counter = *field, "counter missing");
            continue;
        };
        samples.push(MetricSample::gauge(
            family,
            [
                device,
                iface.description.as_str(),
                iface.physical_address.as_str(),
                mtu.as_str(),
                target,
            ],
            value,
        ));
    }
    samples
}
