//! BGP peer state and accepted prefixes for IPv4 and IPv6.
//!
//! Both address families go through the same path. A dual-stack peer shows
//! up once per family.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{LabelValue, ScrapeContext};
use crate::metrics::{BGP_ACCEPTED_PREFIXES, BGP_PEER_STATE, MetricSample};

const SHOW_IPV4_SUMMARY: &str = "show ip bgp summary";
const SHOW_IPV6_SUMMARY: &str = "show ipv6 bgp summary";

#[derive(Debug, Deserialize)]
struct Summary {
    #[serde(default)]
    vrfs: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Vrf {
    router_id: String,
    peers: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Peer {
    asn: LabelValue,
    peer_state: String,
    prefix_received: Option<f64>,
}

pub fn collect(ctx: &mut ScrapeContext<'_>) -> Vec<MetricSample> {
    let mut samples = address_family(ctx, SHOW_IPV4_SUMMARY);
    samples.extend(address_family(ctx, SHOW_IPV6_SUMMARY));
    samples
}

fn address_family(ctx: &mut ScrapeContext<'_>, command: &str) -> Vec<MetricSample> {
    let Some(result) = ctx.run(command) else {
        return Vec::new();
    };
    let target = ctx.target();
    let summary = match Summary::deserialize(&result) {
        Ok(summary) => summary,
        Err(e) => {
            warn!(switch = %target, command, error = %e, "unexpected bgp summary");
            return Vec::new();
        }
    };

    let mut samples = Vec::new();
    for (vrf_name, raw) in &summary.vrfs {
        if raw.get("peers").is_none() {
            continue;
        }
        let vrf = match Vrf::deserialize(raw) {
            Ok(vrf) => vrf,
            Err(e) => {
                warn!(switch = %target, vrf = %vrf_name, error = %e, "skipping vrf");
                continue;
            }
        };
        for (address, raw_peer) in &vrf.peers {
            let peer = match Peer::deserialize(raw_peer) {
                Ok(peer) => peer,
                Err(e) => {
                    warn!(
                        switch = %target,
                        vrf = %vrf_name,
                        peer = %address,
                        error = %e,
                        "skipping peer"
                    );
                    continue;
                }
            };
            let asn = peer.asn.to_string();
            samples.push(MetricSample::info(
                &BGP_PEER_STATE,
                [
                    vrf_name.as_str(),
                    address.as_str(),
                    asn.as_str(),
                    peer.peer_state.as_str(),
                    vrf.router_id.as_str(),
                    target,
                ],
            ));
            match peer.prefix_received {
                Some(received) => samples.push(MetricSample::gauge(
                    &BGP_ACCEPTED_PREFIXES,
                    [vrf_name.as_str(), address.as_str(), asn.as_str(), target],
                    received,
                )),
                None => debug!(switch = %target, peer = %address, "no prefixReceived"),
            }
        }
    }
    samples
}
