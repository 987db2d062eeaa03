//! Abstractions over the eAPI transport to enable testing and mocking.
//!
//! A `Connector` opens a `Connection` to one switch; the connection runs
//! commands and returns their structured output. `HttpConnector` talks
//! JSON-RPC to the real `/command-api` endpoint, while
//! `collector::mock::MockSwitch` serves canned responses in tests.

use std::fmt;
use std::net::Ipv6Addr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{DeviceSettings, Protocol};

/// Error type for device command execution.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Connection could not be established, was dropped, timed out, or the
    /// reply was not a valid JSON-RPC envelope.
    Transport(String),
    /// The switch rejected or failed the command.
    Command { code: i64, message: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Transport(msg) => write!(f, "eAPI connection error: {}", msg),
            SessionError::Command { code, message } => {
                write!(f, "eAPI command error {}: {}", code, message)
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// Live connection to one switch.
pub trait Connection: Send {
    /// Runs a single command and returns its JSON output.
    fn run(&mut self, command: &str) -> Result<Value, SessionError>;
}

/// Opens connections to switches.
pub trait Connector: Send + Sync {
    fn connect(&self, target: &str) -> Result<Box<dyn Connection>, SessionError>;
}

// ============================================================
// JSON-RPC over HTTP(S)
// ============================================================

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: RpcParams<'a>,
    id: String,
}

#[derive(Serialize)]
struct RpcParams<'a> {
    version: u32,
    cmds: [&'a str; 1],
    format: &'static str,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Vec<Value>>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl<'a> RpcRequest<'a> {
    fn run_cmds(command: &'a str, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method: "runCmds",
            params: RpcParams {
                version: 1,
                cmds: [command],
                format: "json",
            },
            id: id.to_string(),
        }
    }
}

/// Extracts the first command result from a JSON-RPC reply.
fn unwrap_response(response: RpcResponse) -> Result<Value, SessionError> {
    if let Some(err) = response.error {
        return Err(SessionError::Command {
            code: err.code,
            message: err.message,
        });
    }
    response
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| SessionError::Transport("reply carries no result".to_string()))
}

/// Builds the eAPI endpoint URL, bracketing IPv6 literals.
fn command_api_url(protocol: Protocol, target: &str) -> String {
    if target.parse::<Ipv6Addr>().is_ok() {
        format!("{}://[{}]/command-api", protocol.scheme(), target)
    } else {
        format!("{}://{}/command-api", protocol.scheme(), target)
    }
}

/// Connector for the real eAPI endpoint.
pub struct HttpConnector {
    settings: DeviceSettings,
}

impl HttpConnector {
    pub fn new(settings: DeviceSettings) -> Self {
        Self { settings }
    }
}

impl Connector for HttpConnector {
    fn connect(&self, target: &str) -> Result<Box<dyn Connection>, SessionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.settings.timeout)
            .danger_accept_invalid_certs(self.settings.accept_invalid_certs)
            .build()
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        Ok(Box::new(HttpConnection {
            client,
            url: command_api_url(self.settings.protocol, target),
            username: self.settings.username.clone(),
            password: self.settings.password.clone(),
            next_id: 1,
        }))
    }
}

struct HttpConnection {
    client: reqwest::blocking::Client,
    url: String,
    username: String,
    password: String,
    next_id: u64,
}

impl Connection for HttpConnection {
    fn run(&mut self, command: &str) -> Result<Value, SessionError> {
        let id = self.next_id;
        self.next_id += 1;
        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&RpcRequest::run_cmds(command, id))
            .send()
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::Transport(format!("HTTP {}", status)));
        }

        let body: RpcResponse = response
            .json()
            .map_err(|e| SessionError::Transport(format!("invalid JSON-RPC reply: {}", e)))?;
        unwrap_response(body)
    }
}
