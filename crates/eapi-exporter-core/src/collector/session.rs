//! Per-target device sessions.
//!
//! A `DeviceSession` lazily opens a connection on first use and keeps it for
//! subsequent commands, across scrapes. Any transport or command failure
//! drops the cached connection so the next command reconnects; there is no
//! retry within a call.
//!
//! Sessions live in a `SessionRegistry` owned by the collector. Each session
//! sits behind its own mutex, so concurrent scrapes never interleave commands
//! on one switch. The registry holds at most one session per target requested
//! since the last eviction; sessions left unused for the idle timeout are
//! dropped together with their HTTP client.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, error, info};

use super::probe::Identity;
use super::transport::{Connection, Connector, SessionError};

/// Cached connection state for one switch.
pub struct DeviceSession {
    target: String,
    connector: Arc<dyn Connector>,
    connection: Option<Box<dyn Connection>>,
    /// Result of the last base probe.
    pub(crate) up: bool,
    pub(crate) identity: Option<Identity>,
}

impl DeviceSession {
    pub fn new(target: impl Into<String>, connector: Arc<dyn Connector>) -> Self {
        Self {
            target: target.into(),
            connector,
            connection: None,
            up: false,
            identity: None,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns whether the last base probe succeeded.
    pub fn is_up(&self) -> bool {
        self.up
    }

    /// Returns whether a connection handle is currently cached.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Runs one command, connecting first if needed.
    ///
    /// On error the cached connection is discarded and the failure is logged
    /// here, so callers only decide what missing data means for them.
    pub fn execute(&mut self, command: &str) -> Result<Value, SessionError> {
        if self.connection.is_none() {
            info!(switch = %self.target, "connecting to switch");
            match self.connector.connect(&self.target) {
                Ok(connection) => self.connection = Some(connection),
                Err(e) => {
                    error!(switch = %self.target, error = %e, "failed to connect");
                    return Err(e);
                }
            }
        }
        let Some(connection) = self.connection.as_mut() else {
            return Err(SessionError::Transport("no connection".to_string()));
        };

        debug!(switch = %self.target, command, "running command");
        match connection.run(command) {
            Ok(result) => Ok(result),
            Err(e) => {
                self.connection = None;
                error!(switch = %self.target, command, error = %e, "command failed");
                Err(e)
            }
        }
    }
}

struct RegistryEntry {
    session: Arc<Mutex<DeviceSession>>,
    last_used: Instant,
}

/// Sessions keyed by target name, created on first request.
pub struct SessionRegistry {
    connector: Arc<dyn Connector>,
    sessions: Mutex<HashMap<String, RegistryEntry>>,
}

impl SessionRegistry {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the session for `target`, creating it if needed.
    pub fn session(&self, target: &str) -> Arc<Mutex<DeviceSession>> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = sessions
            .entry(target.to_string())
            .or_insert_with(|| {
                debug!(switch = target, "new device session");
                RegistryEntry {
                    session: Arc::new(Mutex::new(DeviceSession::new(
                        target,
                        self.connector.clone(),
                    ))),
                    last_used: Instant::now(),
                }
            });
        entry.last_used = Instant::now();
        entry.session.clone()
    }

    /// Drops sessions not requested within `max_idle` and returns how many
    /// were dropped. Sessions still handed out to a scrape are kept.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|target, entry| {
            let keep =
                entry.last_used.elapsed() < max_idle || Arc::strong_count(&entry.session) > 1;
            if !keep {
                info!(switch = %target, "dropping idle device session");
            }
            keep
        });
        before - sessions.len()
    }

    /// Number of known targets.
    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockSwitch;
    use serde_json::json;

    #[test]
    fn connects_lazily_and_reuses_connection() {
        let switch = MockSwitch::typical_switch();
        let mut session = DeviceSession::new("sw1", Arc::new(switch.clone()));
        assert!(!session.is_connected());
        assert_eq!(switch.connect_count(), 0);

        session.execute("show version").unwrap();
        session.execute("show hardware capacity").unwrap();

        assert!(session.is_connected());
        assert_eq!(switch.connect_count(), 1);
    }

    #[test]
    fn command_error_invalidates_connection() {
        let switch = MockSwitch::typical_switch();
        let mut session = DeviceSession::new("sw1", Arc::new(switch.clone()));

        session.execute("show version").unwrap();
        let err = session.execute("show bogus").unwrap_err();
        assert!(matches!(err, SessionError::Command { .. }));
        assert!(!session.is_connected());

        // Next command reconnects.
        session.execute("show version").unwrap();
        assert_eq!(switch.connect_count(), 2);
    }

    #[test]
    fn connect_failure_returns_transport_error() {
        let switch = MockSwitch::typical_switch();
        switch.set_unreachable("sw1");
        let mut session = DeviceSession::new("sw1", Arc::new(switch.clone()));

        let err = session.execute("show version").unwrap_err();
        assert!(matches!(err, SessionError::Transport(_)));
        assert!(!session.is_connected());

        switch.set_reachable("sw1");
        assert!(session.execute("show version").is_ok());
    }

    #[test]
    fn transport_error_mid_session_invalidates_connection() {
        let switch = MockSwitch::new();
        switch.add_response("show version", json!({"version": "4.28.3M"}));
        switch.add_error(
            "show interfaces",
            SessionError::Transport("connection reset".to_string()),
        );
        let mut session = DeviceSession::new("sw1", Arc::new(switch.clone()));

        session.execute("show version").unwrap();
        assert!(session.execute("show interfaces").is_err());
        assert!(!session.is_connected());
    }

    #[test]
    fn registry_returns_same_session_per_target() {
        let registry = SessionRegistry::new(Arc::new(MockSwitch::typical_switch()));
        let a = registry.session("sw1");
        let b = registry.session("sw1");
        let c = registry.session("sw2");

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(registry.len(), 2);
        assert_eq!(c.lock().unwrap().target(), "sw2");
    }

    #[test]
    fn idle_sessions_are_evicted_unless_in_use() {
        let registry = SessionRegistry::new(Arc::new(MockSwitch::typical_switch()));
        let held = registry.session("sw1");
        drop(registry.session("sw2"));
        assert_eq!(registry.len(), 2);

        assert_eq!(registry.evict_idle(Duration::from_secs(3600)), 0);
        assert_eq!(registry.evict_idle(Duration::ZERO), 1);
        assert_eq!(registry.len(), 1);

        // The held session survives and is handed out again.
        assert!(Arc::ptr_eq(&held, &registry.session("sw1")));
        drop(held);
        assert_eq!(registry.evict_idle(Duration::ZERO), 1);
        assert!(registry.is_empty());
    }
}
