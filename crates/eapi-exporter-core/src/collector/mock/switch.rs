//! In-memory switch that answers commands from canned responses.
//!
//! `MockSwitch` implements `Connector`, so it can stand in for
//! `HttpConnector` anywhere a collector or session is built.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use crate::collector::transport::{Connection, Connector, SessionError};

#[derive(Debug, Default)]
struct MockState {
    /// Map from command to its result.
    responses: HashMap<String, Result<Value, SessionError>>,
    /// Targets whose connection attempts fail.
    unreachable: HashSet<String>,
    connects: usize,
    /// Every command run, in order, as `(target, command)`.
    history: Vec<(String, String)>,
}

/// Scripted switch shared by every connection it hands out.
///
/// Clones share state, so a test can keep a handle to inspect calls after
/// passing the switch into a collector.
#[derive(Debug, Clone, Default)]
pub struct MockSwitch {
    state: Arc<Mutex<MockState>>,
}

impl MockSwitch {
    /// Creates a switch that knows no commands.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets the result returned for `command`.
    pub fn add_response(&self, command: &str, result: Value) {
        self.state().responses.insert(command.to_string(), Ok(result));
    }

    /// Makes `command` fail with `error`.
    pub fn add_error(&self, command: &str, error: SessionError) {
        self.state().responses.insert(command.to_string(), Err(error));
    }

    /// Forgets `command`; running it then yields an invalid-command error.
    pub fn remove_response(&self, command: &str) {
        self.state().responses.remove(command);
    }

    /// Makes connection attempts to `target` fail.
    pub fn set_unreachable(&self, target: &str) {
        self.state().unreachable.insert(target.to_string());
    }

    pub fn set_reachable(&self, target: &str) {
        self.state().unreachable.remove(target);
    }

    /// Number of successful connection attempts.
    pub fn connect_count(&self) -> usize {
        self.state().connects
    }

    /// Commands run against `target`, in order.
    pub fn commands_for(&self, target: &str) -> Vec<String> {
        self.state()
            .history
            .iter()
            .filter(|(t, _)| t == target)
            .map(|(_, c)| c.clone())
            .collect()
    }
}

impl Connector for MockSwitch {
    fn connect(&self, target: &str) -> Result<Box<dyn Connection>, SessionError> {
        let mut state = self.state();
        if state.unreachable.contains(target) {
            return Err(SessionError::Transport(format!(
                "connection to {} refused",
                target
            )));
        }
        state.connects += 1;
        Ok(Box::new(MockConnection {
            target: target.to_string(),
            state: self.state.clone(),
        }))
    }
}

struct MockConnection {
    target: String,
    state: Arc<Mutex<MockState>>,
}

impl Connection for MockConnection {
    fn run(&mut self, command: &str) -> Result<Value, SessionError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .history
            .push((self.target.clone(), command.to_string()));
        if state.unreachable.contains(&self.target) {
            return Err(SessionError::Transport("connection reset by peer".to_string()));
        }
        match state.responses.get(command) {
            Some(result) => result.clone(),
            None => Err(SessionError::Command {
                code: 1002,
                message: format!("CLI command 1 of 1 '{}' failed: invalid command", command),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn answers_known_commands() {
        let switch = MockSwitch::new();
        switch.add_response("show version", json!({"version": "4.28.3M"}));
        let mut conn = switch.connect("sw1").unwrap();

        assert_eq!(conn.run("show version").unwrap()["version"], "4.28.3M");
        assert!(matches!(
            conn.run("show nothing"),
            Err(SessionError::Command { code: 1002, .. })
        ));
        assert_eq!(
            switch.commands_for("sw1"),
            vec!["show version".to_string(), "show nothing".to_string()]
        );
    }

    #[test]
    fn unreachable_target_drops_open_connection() {
        let switch = MockSwitch::new();
        switch.add_response("show version", json!({}));
        let mut conn = switch.connect("sw1").unwrap();

        switch.set_unreachable("sw1");
        assert!(matches!(
            conn.run("show version"),
            Err(SessionError::Transport(_))
        ));
        assert!(switch.connect("sw1").is_err());
        assert!(switch.connect("sw2").is_ok());
        assert_eq!(switch.connect_count(), 2);
    }
}
