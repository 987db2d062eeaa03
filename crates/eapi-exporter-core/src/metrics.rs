//! Metric families and samples produced by a scrape.
//!
//! Every family is declared once here with its name, help text, kind and
//! ordered label keys. Names and labels are consumed by dashboards and
//! alerting rules, so they must not change.

/// How a family is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Point-in-time numeric reading.
    Gauge,
    /// Label-only descriptive record, exposed as `<name>_info 1`.
    Info,
}

/// Static description of one metric family.
#[derive(Debug, PartialEq, Eq)]
pub struct MetricFamily {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub labels: &'static [&'static str],
}

impl MetricFamily {
    const fn gauge(
        name: &'static str,
        help: &'static str,
        labels: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Gauge,
            labels,
        }
    }

    const fn info(
        name: &'static str,
        help: &'static str,
        labels: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Info,
            labels,
        }
    }
}

/// Value carried by a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    Gauge(f64),
    /// The label set is the payload.
    Info,
}

/// One emitted sample. Label values are stored in the family's label order.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub family: &'static MetricFamily,
    pub labels: Vec<String>,
    pub value: SampleValue,
}

impl MetricSample {
    pub fn gauge<I, S>(family: &'static MetricFamily, labels: I, value: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        debug_assert_eq!(family.kind, MetricKind::Gauge, "{} is not a gauge", family.name);
        Self::new(family, labels, SampleValue::Gauge(value))
    }

    pub fn info<I, S>(family: &'static MetricFamily, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        debug_assert_eq!(family.kind, MetricKind::Info, "{} is not an info", family.name);
        Self::new(family, labels, SampleValue::Info)
    }

    fn new<I, S>(family: &'static MetricFamily, labels: I, value: SampleValue) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        debug_assert_eq!(
            labels.len(),
            family.labels.len(),
            "label count mismatch for {}",
            family.name
        );
        Self {
            family,
            labels,
            value,
        }
    }

    /// Returns the value of the named label.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.family
            .labels
            .iter()
            .position(|k| *k == key)
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }

    /// Returns the gauge reading, `None` for info samples.
    pub fn gauge_value(&self) -> Option<f64> {
        match self.value {
            SampleValue::Gauge(v) => Some(v),
            SampleValue::Info => None,
        }
    }

    /// Label pairs in family order.
    pub fn label_pairs(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.family
            .labels
            .iter()
            .copied()
            .zip(self.labels.iter().map(String::as_str))
    }
}

// ============================================================
// Target-level families
// ============================================================

pub static UP: MetricFamily = MetricFamily::gauge(
    "arista_up",
    "Information whether the switch is reachable and responds to API calls",
    &["target"],
);

pub static HW: MetricFamily = MetricFamily::info(
    "arista_hw",
    "Information about this arista device, such as serial number and model",
    &["model", "serial", "version", "target"],
);

pub static SCRAPE_DURATION: MetricFamily = MetricFamily::gauge(
    "arista_scrape_duration_seconds",
    "Duration of a collector scrape.",
    &["collector", "target"],
);

// ============================================================
// memory
// ============================================================

pub static MEM_TOTAL: MetricFamily =
    MetricFamily::gauge("arista_mem_total", "Total memory available", &["target"]);

pub static MEM_FREE: MetricFamily =
    MetricFamily::gauge("arista_mem_free", "Total memory free", &["target"]);

// ============================================================
// tcam
// ============================================================

const TCAM_LABELS: &[&str] = &["table", "chip", "feature", "target"];

pub static TCAM_USED: MetricFamily =
    MetricFamily::gauge("arista_tcam_used", "TCAM Usage Data", TCAM_LABELS);

pub static TCAM_TOTAL: MetricFamily =
    MetricFamily::gauge("arista_tcam_total", "TCAM Capacity", TCAM_LABELS);

// ============================================================
// port
// ============================================================

const PORT_LABELS: &[&str] = &["device", "description", "target"];
const PORT_STAT_LABELS: &[&str] = &["device", "description", "mac", "mtu", "target"];

pub static ADMIN_UP: MetricFamily =
    MetricFamily::gauge("arista_admin_up", "Value 1 if port is not shutdown", PORT_LABELS);

pub static L2_UP: MetricFamily =
    MetricFamily::gauge("arista_l2_up", "Value 1 if port is connected", PORT_LABELS);

pub static PORT_BANDWIDTH: MetricFamily =
    MetricFamily::gauge("arista_port_bandwidth", "Bandwidth in bits/s", PORT_LABELS);

const fn port_stat(name: &'static str, help: &'static str) -> MetricFamily {
    MetricFamily::gauge(name, help, PORT_STAT_LABELS)
}

/// Per-interface counters, keyed by the eAPI `interfaceCounters` field name.
pub static PORT_STATS: [(&str, MetricFamily); 10] = [
    ("inBroadcastPkts", port_stat("arista_port_inBroadcastPkts", "Port stats inBroadcastPkts")),
    ("inDiscards", port_stat("arista_port_inDiscards", "Port stats inDiscards")),
    ("inMulticastPkts", port_stat("arista_port_inMulticastPkts", "Port stats inMulticastPkts")),
    ("inOctets", port_stat("arista_port_inOctets", "Port stats inOctets")),
    ("inUcastPkts", port_stat("arista_port_inUcastPkts", "Port stats inUcastPkts")),
    ("outBroadcastPkts", port_stat("arista_port_outBroadcastPkts", "Port stats outBroadcastPkts")),
    ("outDiscards", port_stat("arista_port_outDiscards", "Port stats outDiscards")),
    ("outMulticastPkts", port_stat("arista_port_outMulticastPkts", "Port stats outMulticastPkts")),
    ("outOctets", port_stat("arista_port_outOctets", "Port stats outOctets")),
    ("outUcastPkts", port_stat("arista_port_outUcastPkts", "Port stats outUcastPkts")),
];

// ============================================================
// sfp
// ============================================================

pub static SFP_STATS: MetricFamily = MetricFamily::gauge(
    "arista_sfp_stats",
    "SFP Statistics",
    &["device", "sensor", "mediaType", "serial", "description", "lane", "target"],
);

pub static SFP_ALARMS: MetricFamily = MetricFamily::gauge(
    "arista_sfp_alarms",
    "SFP Alarms",
    &["device", "lane", "sensor", "alarmType", "target"],
);

// ============================================================
// bgp
// ============================================================

pub static BGP_PEER_STATE: MetricFamily = MetricFamily::info(
    "arista_bgp_peer_state",
    "State of the BGP peer",
    &["vrf", "peer", "asn", "state", "router_id", "target"],
);

pub static BGP_ACCEPTED_PREFIXES: MetricFamily = MetricFamily::gauge(
    "arista_bgp_accepted_prefixes",
    "Number of prefixes accepted",
    &["vrf", "peer", "asn", "target"],
);

// ============================================================
// power
// ============================================================

pub static POWER_SUPPLY: MetricFamily = MetricFamily::info(
    "arista_power_supply",
    "State of the power supply",
    &["state", "model", "capacity_watts", "id", "target"],
);

pub static POWER_SUPPLY_POWER: MetricFamily = MetricFamily::gauge(
    "arista_power_supply_power",
    "Power supply power measurements",
    &["id", "measurement", "target"],
);

pub static POWER_SUPPLY_TEMPERATURE: MetricFamily = MetricFamily::gauge(
    "arista_power_supply_temperature",
    "Power supply temperature sensors",
    &["id", "status", "sensor", "target"],
);

pub static POWER_SUPPLY_FAN_SPEED: MetricFamily = MetricFamily::gauge(
    "arista_power_supply_fan_speed_percent",
    "Power supply fan speed sensors",
    &["id", "status", "sensor", "target"],
);
