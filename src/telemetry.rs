//! Instrumentation events, delivered through the host's command interface.
//!
//! Delivery is strictly best-effort: a host that does not register the
//! logging command (older versions do not) makes `execute_command` fail,
//! and that failure is discarded here. Telemetry must never surface to,
//! or abort, a navigation request.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

/// The command used to deliver telemetry events to the host.
pub const LOG_EVENT_COMMAND: &str = "logTelemetryEvent";

/// The host platform's opaque "execute named command" operation.
#[async_trait]
pub trait HostCommands: Send + Sync {
    async fn execute_command(&self, command: &str, arguments: Vec<Value>) -> Result<()>;
}

#[async_trait]
impl<H: HostCommands + ?Sized> HostCommands for std::sync::Arc<H> {
    async fn execute_command(&self, command: &str, arguments: Vec<Value>) -> Result<()> {
        (**self).execute_command(command, arguments).await
    }
}

/// A wrapper around telemetry events. A new instance should be created at
/// the start of each action, as it handles latency tracking.
pub struct TelemetryEmitter<H: HostCommands> {
    host: H,
    language_id: String,
    started: Instant,
    enabled: bool,
    emitted: Mutex<HashSet<String>>,
}

impl<H: HostCommands> TelemetryEmitter<H> {
    pub fn new(host: H, language_id: impl Into<String>) -> Self {
        Self::with_enabled(host, language_id, true)
    }

    pub fn with_enabled(host: H, language_id: impl Into<String>, enabled: bool) -> Self {
        Self {
            host,
            language_id: language_id.into(),
            started: Instant::now(),
            enabled,
            emitted: Mutex::new(HashSet::new()),
        }
    }

    /// Emit a telemetry event only if the same action has not yet been
    /// emitted by this instance.
    pub async fn emit_once(&self, action: &str, args: Value) {
        {
            let mut emitted = match self.emitted.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if !emitted.insert(action.to_string()) {
                return;
            }
        }
        self.emit(action, args).await;
    }

    /// Emit a telemetry event with `durationMs` and `languageId`
    /// attributes. Failures are discarded.
    pub async fn emit(&self, action: &str, args: Value) {
        if !self.enabled {
            return;
        }
        let mut payload = match args {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        payload.insert(
            "durationMs".to_string(),
            json!(self.started.elapsed().as_millis() as u64),
        );
        payload.insert("languageId".to_string(), json!(self.language_id));

        let arguments = vec![json!(format!("codeintel.{action}")), Value::Object(payload)];
        if let Err(err) = self.host.execute_command(LOG_EVENT_COMMAND, arguments).await {
            // Older hosts may not have registered the command. Safe to
            // ignore.
            debug!("discarding telemetry failure for '{}': {}", action, err);
        }
    }
}
