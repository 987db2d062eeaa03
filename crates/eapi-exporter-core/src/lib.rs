//! eapi-exporter-core: collection engine for switches managed over eAPI.
//!
//! Provides:
//! - `collector`: device sessions, per-module command parsers and the
//!   scrape orchestrator
//! - `metrics`: metric family catalogue and the `MetricSample` type
//! - `config`: YAML configuration with environment credential overrides

pub mod collector;
pub mod config;
pub mod metrics;

/// Crate version, reported by the exporter binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
