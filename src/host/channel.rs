//! Host command channel and router.
//!
//! The router owns a [`SyncHandler`] and runs on a blocking thread, since a
//! `sync.tick` may perform a blocking HTTP fetch. Commands arrive over an
//! mpsc channel and each gets a oneshot reply; events fan out over a
//! broadcast channel.

use crate::error::{BridgeError, Result};
use crate::host::contract::{CommandEnvelope, CommandName, EventEnvelope, ResponseEnvelope};
use crate::host::display::TextWrite;
use crate::orchestrator::TickReport;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Result of one `sync.tick`.
#[derive(Debug, Clone)]
pub struct TickOutput {
    pub report: TickReport,
    /// Writes performed during the tick, in order.
    pub writes: Vec<TextWrite>,
}

/// Bridge-side implementation of the host commands.
pub trait SyncHandler: Send + 'static {
    /// Replace the list of live display targets.
    fn set_targets(&mut self, names: Vec<String>) -> Result<()>;
    /// Rebuild the configuration from the host's settings object and
    /// return the applied configuration.
    fn update_settings(&mut self, settings: serde_json::Value) -> Result<serde_json::Value>;
    /// The configuration UI description.
    fn describe_properties(&self) -> Result<serde_json::Value>;
    /// Run one orchestration cycle.
    fn tick(&mut self) -> TickOutput;
}

struct HostCommandRequest {
    envelope: CommandEnvelope,
    response_tx: oneshot::Sender<ResponseEnvelope>,
}

#[derive(Clone)]
pub struct HostCommandClient {
    request_tx: mpsc::Sender<HostCommandRequest>,
    event_tx: broadcast::Sender<EventEnvelope>,
}

impl HostCommandClient {
    /// Validate `envelope`, dispatch it, and wait for the response.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Host`] if the envelope is invalid or the
    /// router has gone away.
    pub async fn send(&self, envelope: CommandEnvelope) -> Result<ResponseEnvelope> {
        envelope.validate().map_err(|e| {
            BridgeError::Host(format!(
                "invalid host command envelope {}: {}",
                envelope.request_id, e
            ))
        })?;

        let (response_tx, response_rx) = oneshot::channel();
        self.request_tx
            .send(HostCommandRequest {
                envelope,
                response_tx,
            })
            .await
            .map_err(|e| BridgeError::Host(format!("failed to send host command request: {e}")))?;

        response_rx
            .await
            .map_err(|e| BridgeError::Host(format!("host command response dropped: {e}")))
    }

    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<EventEnvelope> {
        self.event_tx.subscribe()
    }
}

pub struct HostCommandServer<H: SyncHandler> {
    request_rx: mpsc::Receiver<HostCommandRequest>,
    event_tx: broadcast::Sender<EventEnvelope>,
    handler: H,
    next_event_id: u64,
}

#[must_use]
pub fn command_channel<H: SyncHandler>(
    request_capacity: usize,
    event_capacity: usize,
    handler: H,
) -> (HostCommandClient, HostCommandServer<H>) {
    let (event_tx, _event_rx) = broadcast::channel(event_capacity.max(1));
    let (request_tx, request_rx) = mpsc::channel(request_capacity.max(1));

    (
        HostCommandClient {
            request_tx,
            event_tx: event_tx.clone(),
        },
        HostCommandServer {
            request_rx,
            event_tx,
            handler,
            next_event_id: 0,
        },
    )
}

impl<H: SyncHandler> HostCommandServer<H> {
    /// Serve requests on a blocking thread until every client is dropped.
    pub async fn run(self) {
        if let Err(e) = tokio::task::spawn_blocking(move || self.run_blocking()).await {
            tracing::error!(error = %e, "host command router panicked");
        }
    }

    /// Serve requests on the current thread until every client is dropped.
    pub fn run_blocking(mut self) {
        while let Some(request) = self.request_rx.blocking_recv() {
            let response = self.route(&request.envelope);
            let _ = request.response_tx.send(response);
        }
        tracing::debug!("host command channel closed");
    }

    /// The wrapped handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Route a command envelope to the handler. Handler errors become
    /// error responses.
    pub fn route(&mut self, envelope: &CommandEnvelope) -> ResponseEnvelope {
        let request_id = envelope.request_id.clone();
        let result = match envelope.command {
            CommandName::HostPing => Ok(serde_json::json!({"pong": true})),
            CommandName::HostVersion => Ok(serde_json::json!({
                "contract_version": crate::host::contract::EVENT_VERSION,
                "bridge_version": env!("CARGO_PKG_VERSION"),
            })),
            CommandName::TargetsSet => self.handle_targets_set(envelope),
            CommandName::SettingsUpdate => self.handler.update_settings(envelope.payload.clone()),
            CommandName::PropertiesGet => self
                .handler
                .describe_properties()
                .map(|properties| serde_json::json!({ "properties": properties })),
            CommandName::SyncTick => self.handle_sync_tick(),
            CommandName::RuntimeStop => Ok(serde_json::json!({"stopping": true})),
        };

        match result {
            Ok(payload) => ResponseEnvelope::ok(request_id, payload),
            Err(e) => {
                tracing::warn!(
                    command = envelope.command.as_str(),
                    error = %e,
                    "host command failed"
                );
                ResponseEnvelope::error(request_id, e.to_string())
            }
        }
    }

    fn handle_targets_set(&mut self, envelope: &CommandEnvelope) -> Result<serde_json::Value> {
        let names = parse_target_names(&envelope.payload)?;
        let count = names.len();
        self.handler.set_targets(names)?;
        Ok(serde_json::json!({"accepted": true, "targets": count}))
    }

    fn handle_sync_tick(&mut self) -> Result<serde_json::Value> {
        let output = self.handler.tick();
        for write in &output.writes {
            let event_id = self.event_id();
            self.emit_event(EventEnvelope::target_write(event_id, &write.target, &write.text));
        }
        serde_json::to_value(&output.report)
            .map_err(|e| BridgeError::Host(format!("failed to serialize tick report: {e}")))
    }

    fn event_id(&mut self) -> String {
        self.next_event_id += 1;
        format!("evt-{}", self.next_event_id)
    }

    fn emit_event(&self, event: EventEnvelope) {
        // No subscribers is not an error.
        let _ = self.event_tx.send(event);
    }
}

fn parse_target_names(payload: &serde_json::Value) -> Result<Vec<String>> {
    let list = payload
        .get("targets")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| BridgeError::Host("missing payload.targets array".to_owned()))?;
    list.iter()
        .map(|v| {
            v.as_str()
                .map(str::to_owned)
                .ok_or_else(|| BridgeError::Host(format!("target name must be a string, got {v}")))
        })
        .collect()
}
