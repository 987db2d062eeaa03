//! Catalogue of collection modules and request-time module selection.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use super::modules::{ScrapeContext, bgp, memory, port, power, sfp, tcam};
use crate::metrics::MetricSample;

/// Token selecting every module.
pub const ALL_TOKEN: &str = "all";

/// Known collection modules, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleId {
    Memory,
    Tcam,
    Port,
    Sfp,
    Bgp,
    Power,
}

impl ModuleId {
    pub const ALL: [ModuleId; 6] = [
        ModuleId::Memory,
        ModuleId::Tcam,
        ModuleId::Port,
        ModuleId::Sfp,
        ModuleId::Bgp,
        ModuleId::Power,
    ];

    /// Name used in requests and in `arista_scrape_duration_seconds`.
    pub fn name(self) -> &'static str {
        match self {
            ModuleId::Memory => "memory",
            ModuleId::Tcam => "tcam",
            ModuleId::Port => "port",
            ModuleId::Sfp => "sfp",
            ModuleId::Bgp => "bgp",
            ModuleId::Power => "power",
        }
    }

    /// Runs the module against one reachable switch.
    pub fn collect(self, ctx: &mut ScrapeContext<'_>) -> Vec<MetricSample> {
        match self {
            ModuleId::Memory => memory::collect(ctx),
            ModuleId::Tcam => tcam::collect(ctx),
            ModuleId::Port => port::collect(ctx),
            ModuleId::Sfp => sfp::collect(ctx),
            ModuleId::Bgp => bgp::collect(ctx),
            ModuleId::Power => power::collect(ctx),
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A requested module name that is not in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownModule(pub String);

impl fmt::Display for UnknownModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown module requested: {}", self.0)
    }
}

impl std::error::Error for UnknownModule {}

impl FromStr for ModuleId {
    type Err = UnknownModule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModuleId::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| UnknownModule(s.to_string()))
    }
}

/// Modules to run for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSelection {
    modules: Vec<ModuleId>,
    unknown: Vec<UnknownModule>,
}

impl ModuleSelection {
    /// Selects every module.
    pub fn all() -> Self {
        Self {
            modules: ModuleId::ALL.to_vec(),
            unknown: Vec::new(),
        }
    }

    /// Resolves a comma-separated module list.
    ///
    /// `None`, an empty list, or any `all` token selects every module.
    /// Unknown names are logged and dropped; they never fail the request.
    pub fn parse(requested: Option<&str>) -> Self {
        let Some(requested) = requested.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::all();
        };

        let mut modules = Vec::new();
        let mut unknown = Vec::new();
        for token in requested.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if token == ALL_TOKEN {
                return Self::all();
            }
            match token.parse::<ModuleId>() {
                Ok(module) => modules.push(module),
                Err(e) => {
                    warn!(module = %e.0, "unknown module requested, ignoring");
                    unknown.push(e);
                }
            }
        }
        modules.sort();
        modules.dedup();
        Self { modules, unknown }
    }

    pub fn modules(&self) -> &[ModuleId] {
        &self.modules
    }

    /// Requested names that were ignored.
    pub fn unknown(&self) -> &[UnknownModule] {
        &self.unknown
    }

    pub fn contains(&self, module: ModuleId) -> bool {
        self.modules.contains(&module)
    }
}

impl Default for ModuleSelection {
    fn default() -> Self {
        Self::all()
    }
}
