//! Production [`SyncHandler`]: an orchestrator plus the host's live targets.

use crate::clock::{Clock, SystemClock};
use crate::config::{JsonSettings, SyncConfig};
use crate::error::{BridgeError, Result};
use crate::host::channel::{SyncHandler, TickOutput};
use crate::host::display::{DisplayHost, MemoryHost};
use crate::host::properties::properties;
use crate::orchestrator::SyncOrchestrator;
use crate::store::StateStore;
use schedule_feed::ScheduleFetcher;
use tracing::info;

/// Mirrors the host's display targets in memory and reports every write
/// back to the host as an event.
pub struct BridgeHandler<F, S, C = SystemClock> {
    orchestrator: SyncOrchestrator<F, S, C>,
    host: MemoryHost,
}

impl<F, S> BridgeHandler<F, S, SystemClock>
where
    F: ScheduleFetcher,
    S: StateStore,
{
    pub fn new(config: SyncConfig, fetcher: F, store: S) -> Self {
        Self::from_orchestrator(SyncOrchestrator::new(config, fetcher, store))
    }
}

impl<F, S, C> BridgeHandler<F, S, C>
where
    F: ScheduleFetcher,
    S: StateStore,
    C: Clock,
{
    pub fn from_orchestrator(orchestrator: SyncOrchestrator<F, S, C>) -> Self {
        Self {
            orchestrator,
            host: MemoryHost::default(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &SyncConfig {
        self.orchestrator.config()
    }

    /// Last known text of every live target.
    pub fn host(&self) -> &MemoryHost {
        &self.host
    }
}

impl<F, S, C> SyncHandler for BridgeHandler<F, S, C>
where
    F: ScheduleFetcher + Send + 'static,
    S: StateStore + Send + 'static,
    C: Clock + Send + 'static,
{
    fn set_targets(&mut self, names: Vec<String>) -> Result<()> {
        if names.iter().any(|n| n.trim().is_empty()) {
            return Err(BridgeError::Host("target names cannot be blank".to_owned()));
        }
        info!(count = names.len(), "display targets updated");
        self.host.set_targets(names);
        Ok(())
    }

    fn update_settings(&mut self, settings: serde_json::Value) -> Result<serde_json::Value> {
        let settings = JsonSettings::from_value(settings)?;
        let mut next = SyncConfig::from_settings(&settings);
        // Host settings carry no HTTP options; keep the ones from startup.
        next.feed = self.orchestrator.config().feed.clone();
        let problem = next.validate().err().map(|e| e.to_string());
        self.orchestrator.reconfigure(next);

        let applied = serde_json::to_value(self.orchestrator.config())
            .map_err(|e| BridgeError::Host(format!("failed to serialize config: {e}")))?;
        Ok(serde_json::json!({ "config": applied, "problem": problem }))
    }

    fn describe_properties(&self) -> Result<serde_json::Value> {
        serde_json::to_value(properties(&self.host))
            .map_err(|e| BridgeError::Host(format!("failed to serialize properties: {e}")))
    }

    fn tick(&mut self) -> TickOutput {
        let report = self.orchestrator.tick(&mut self.host);
        TickOutput {
            report,
            writes: self.host.take_writes(),
        }
    }
}

impl<F, S, C> std::fmt::Debug for BridgeHandler<F, S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeHandler")
            .field("targets", &self.host.target_names())
            .finish_non_exhaustive()
    }
}
