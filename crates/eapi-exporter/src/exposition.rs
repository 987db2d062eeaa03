//! Prometheus text exposition of scrape samples.
//!
//! Each request gets its own registry, so nothing leaks between scrapes or
//! targets.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

use eapi_exporter_core::metrics::{MetricKind, MetricSample, SampleValue};

/// Content type of the text exposition format.
pub(crate) const CONTENT_TYPE_LATEST: &str = "text/plain; version=0.0.4; charset=utf-8";

const INFO_SUFFIX: &str = "_info";

/// Encodes samples in the Prometheus text format.
///
/// Info families become gauges named `<name>_info` with value 1.
pub(crate) fn encode(samples: &[MetricSample]) -> Result<String, prometheus::Error> {
    let registry = Registry::new();
    let mut families: HashMap<&'static str, GaugeVec> = HashMap::new();

    for sample in samples {
        let family = sample.family;
        let gauge = match families.entry(family.name) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let name = match family.kind {
                    MetricKind::Gauge => family.name.to_string(),
                    MetricKind::Info => format!("{}{}", family.name, INFO_SUFFIX),
                };
                let gauge = GaugeVec::new(Opts::new(name, family.help), family.labels)?;
                registry.register(Box::new(gauge.clone()))?;
                entry.insert(gauge)
            }
        };

        let labels: Vec<&str> = sample.labels.iter().map(String::as_str).collect();
        let value = match sample.value {
            SampleValue::Gauge(v) => v,
            SampleValue::Info => 1.0,
        };
        gauge.get_metric_with_label_values(&labels)?.set(value);
    }

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
