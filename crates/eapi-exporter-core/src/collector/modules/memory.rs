//! Memory totals captured by the base probe. Runs no command.

use super::ScrapeContext;
use crate::metrics::{MEM_FREE, MEM_TOTAL, MetricSample};

pub fn collect(ctx: &mut ScrapeContext<'_>) -> Vec<MetricSample> {
    let target = ctx.target();
    let identity = ctx.identity();
    vec![
        MetricSample::gauge(&MEM_TOTAL, [target], identity.mem_total),
        MetricSample::gauge(&MEM_FREE, [target], identity.mem_free),
    ]
}
