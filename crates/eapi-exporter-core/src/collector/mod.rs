//! Switch telemetry collector for Arista eAPI.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Collector                         │
//! │  ┌───────────────────┐   ┌────────────────────────────┐  │
//! │  │  SessionRegistry  │   │  ModuleSelection           │  │
//! │  │  - DeviceSession  │   │  - memory, tcam, port      │  │
//! │  │    per target     │   │  - sfp, bgp, power         │  │
//! │  └─────────┬─────────┘   └────────────────────────────┘  │
//! │            │                                             │
//! │     ┌──────▼──────┐                                      │
//! │     │  Connector  │ (trait)                              │
//! │     └──────┬──────┘                                      │
//! └────────────┼─────────────────────────────────────────────┘
//!              │
//!       ┌──────┴────────┐
//!       │               │
//! ┌─────▼─────────┐ ┌───▼─────────┐
//! │ HttpConnector │ │ MockSwitch  │
//! │ (JSON-RPC)    │ │ (Testing)   │
//! └───────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use eapi_exporter_core::collector::{Collector, ModuleSelection, MockSwitch};
//!
//! let collector = Collector::new(Arc::new(MockSwitch::typical_switch()));
//! let samples = collector.collect(&["sw1".to_string()], &ModuleSelection::all());
//! assert!(samples.iter().any(|s| s.family.name == "arista_up"));
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod mock;
pub mod modules;
mod probe;
mod registry;
mod session;
mod timing;
pub mod transport;

pub use collector::Collector;
pub use mock::MockSwitch;
pub use probe::{Identity, UNKNOWN, identity_samples};
pub use registry::{ALL_TOKEN, ModuleId, ModuleSelection, UnknownModule};
pub use session::{DeviceSession, SessionRegistry};
pub use timing::{BASE_COLLECTOR, ScrapeTiming};
pub use transport::{Connection, Connector, HttpConnector, SessionError};
