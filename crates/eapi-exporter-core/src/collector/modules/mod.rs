//! Collection modules.
//!
//! Each module runs one or more commands on a reachable switch and turns
//! the output into samples:
//! - `memory`: memory totals captured by the base probe
//! - `tcam`: hardware table capacity (`show hardware capacity`)
//! - `port`: interface state and counters (`show interfaces`)
//! - `sfp`: transceiver readings and threshold alarms
//! - `bgp`: IPv4 and IPv6 peer state and accepted prefixes
//! - `power`: power supplies with their temperature and fan sensors
//!
//! Modules never fail as a whole. A command that fails yields no samples,
//! and an entry with missing fields is skipped on its own with a log entry.

pub mod bgp;
pub mod memory;
pub mod port;
pub mod power;
pub mod sfp;
pub mod tcam;

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::probe::Identity;
use super::session::DeviceSession;

const SHOW_INTERFACES: &str = "show interfaces";

/// Per-target state shared by the modules of one scrape.
pub struct ScrapeContext<'a> {
    session: &'a mut DeviceSession,
    identity: &'a Identity,
    interfaces: Option<Map<String, Value>>,
}

impl<'a> ScrapeContext<'a> {
    pub fn new(session: &'a mut DeviceSession, identity: &'a Identity) -> Self {
        Self {
            session,
            identity,
            interfaces: None,
        }
    }

    pub fn target(&self) -> &str {
        self.session.target()
    }

    pub fn identity(&self) -> &Identity {
        self.identity
    }

    /// Runs a command, returning `None` when it fails.
    ///
    /// The session has already logged the failure.
    pub fn run(&mut self, command: &str) -> Option<Value> {
        self.session.execute(command).ok()
    }

    /// Returns the interface table, fetching it on first use.
    ///
    /// A successful fetch is kept for the rest of this scrape so `port` and
    /// `sfp` share one `show interfaces`.
    pub fn interfaces(&mut self) -> Option<&Map<String, Value>> {
        if self.interfaces.is_none() {
            let result = self.run(SHOW_INTERFACES)?;
            match result.get("interfaces").and_then(Value::as_object) {
                Some(table) => self.interfaces = Some(table.clone()),
                None => {
                    debug!(switch = %self.target(), "show interfaces returned no interface table");
                    return None;
                }
            }
        }
        self.interfaces.as_ref()
    }
}

/// Scalar that eAPI reports either as a string or as a number, rendered as a
/// label value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum LabelValue {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for LabelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelValue::Text(s) => f.write_str(s),
            LabelValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Reads a numeric field, accepting numbers and numeric strings.
pub(crate) fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
