use std::net::TcpListener;

use resubmit_core::errors::{ErrorInfo, ResubError};
use tracing::info;

/// Blocks until an external debugger connects on a port.
pub trait DebuggerAttach: Send + Sync {
    fn wait_for_client(&self, port: u16) -> Result<(), ResubError>;
}

/// Waits for a debugger when `port` is a positive number; otherwise does nothing.
pub fn maybe_attach_debugger(
    attach: &dyn DebuggerAttach,
    port: Option<i64>,
) -> Result<(), ResubError> {
    match port {
        Some(port) if port > 0 => {
            let port = u16::try_from(port).map_err(|_| {
                ResubError::Configuration(
                    ErrorInfo::new("debug-port-range", "debug port must fit in 1..=65535")
                        .with_context("port", port.to_string()),
                )
            })?;
            attach.wait_for_client(port)
        }
        _ => Ok(()),
    }
}

/// Listens on a TCP port and returns once a single client has connected.
#[derive(Debug, Clone)]
pub struct TcpDebugListener {
    host: String,
}

impl TcpDebugListener {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }
}

impl Default for TcpDebugListener {
    fn default() -> Self {
        Self::new("0.0.0.0")
    }
}

impl DebuggerAttach for TcpDebugListener {
    fn wait_for_client(&self, port: u16) -> Result<(), ResubError> {
        let debugger_error = |code: &str, err: std::io::Error| {
            ResubError::Debugger(
                ErrorInfo::new(code, err.to_string())
                    .with_context("host", self.host.clone())
                    .with_context("port", port.to_string()),
            )
        };
        let listener = TcpListener::bind((self.host.as_str(), port))
            .map_err(|err| debugger_error("debugger-bind", err))?;
        info!(host = %self.host, port, "Waiting for debugger to attach");
        let (_stream, peer) = listener
            .accept()
            .map_err(|err| debugger_error("debugger-accept", err))?;
        info!(%peer, "Debugger attached");
        Ok(())
    }
}

/// Attach hook that never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDebugger;

impl DebuggerAttach for NoDebugger {
    fn wait_for_client(&self, _port: u16) -> Result<(), ResubError> {
        Ok(())
    }
}
