//! Lane resolution for multi-lane transceivers.
//!
//! A breakout-capable optic (for example 100G as 4x25G) reports one
//! transceiver entry per lane, while only the first lane exists as an
//! interface. `Ethernet3/2` with the same serial as `Ethernet3/1` is lane 2
//! of `Ethernet3/1`.

use std::collections::HashMap;

use serde_json::{Map, Value};

/// Where a transceiver entry's readings are attributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneMapping {
    pub interface: String,
    pub lane: String,
}

impl LaneMapping {
    fn own(name: &str) -> Self {
        Self {
            interface: name.to_string(),
            lane: name.to_string(),
        }
    }
}

/// Resolves the parent interface of transceiver entry `name`.
///
/// `serials` maps transceiver entry names to their vendor serial numbers.
pub fn resolve_lane(
    name: &str,
    interfaces: &Map<String, Value>,
    serials: &HashMap<&str, &str>,
) -> LaneMapping {
    if interfaces.contains_key(name) {
        return LaneMapping::own(name);
    }
    let Some((prefix, _)) = name.rsplit_once('/') else {
        return LaneMapping::own(name);
    };
    let parent = format!("{}/1", prefix);
    if parent == name {
        return LaneMapping::own(name);
    }

    match (serials.get(name), serials.get(parent.as_str())) {
        (Some(own), Some(theirs)) if own == theirs => LaneMapping {
            interface: parent,
            lane: name.to_string(),
        },
        _ => LaneMapping::own(name),
    }
}
