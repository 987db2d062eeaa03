//! Hardware table capacity (`show hardware capacity`).

use serde::Deserialize;
use tracing::warn;

use super::ScrapeContext;
use crate::metrics::{MetricSample, TCAM_TOTAL, TCAM_USED};

const SHOW_HARDWARE_CAPACITY: &str = "show hardware capacity";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableEntry {
    table: String,
    chip: String,
    feature: String,
    used: f64,
    max_limit: f64,
}

pub fn collect(ctx: &mut ScrapeContext<'_>) -> Vec<MetricSample> {
    let Some(result) = ctx.run(SHOW_HARDWARE_CAPACITY) else {
        return Vec::new();
    };
    let target = ctx.target();

    let Some(tables) = result.get("tables").and_then(|t| t.as_array()) else {
        warn!(switch = %target, "hardware capacity output has no tables");
        return Vec::new();
    };

    let mut samples = Vec::with_capacity(tables.len() * 2);
    for raw in tables {
        let entry = match TableEntry::deserialize(raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(switch = %target, error = %e, "skipping incomplete TCAM entry");
                continue;
            }
        };
        let labels = [
            entry.table.as_str(),
            entry.chip.as_str(),
            entry.feature.as_str(),
            target,
        ];
        samples.push(MetricSample::gauge(&TCAM_USED, labels, entry.used));
        samples.push(MetricSample::gauge(&TCAM_TOTAL, labels, entry.max_limit));
    }
    samples
}
