//! Shared application state and the global allocator.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::sync::Arc;

use eapi_exporter_core::collector::Collector;

pub(crate) struct AppState {
    pub(crate) collector: Arc<Collector>,
    /// Module list used when a request does not name any.
    pub(crate) default_modules: Option<String>,
}

pub(crate) type SharedState = Arc<AppState>;
