//! The tick driver.

use crate::cache::ContentCache;
use crate::clock::{Clock, SystemClock, resolution_time};
use crate::config::SyncConfig;
use crate::error::{BridgeError, Result};
use crate::host::display::DisplayHost;
use crate::orchestrator::report::{FetchOutcome, TargetFailure, TickReport, WriteSummary};
use crate::orchestrator::state::FetchState;
use crate::resolver::{ResolvedView, resolve};
use crate::store::StateStore;
use chrono::{DateTime, Utc};
use schedule_feed::ScheduleFetcher;
use tracing::{debug, info, warn};

/// Drives fetch, cache, resolve, and display writes for one room.
///
/// `tick` takes `&mut self`, so two ticks on one orchestrator can never
/// interleave their cache read-modify-write. Callers that share an
/// orchestrator across threads must wrap it in a mutex.
pub struct SyncOrchestrator<F, S, C = SystemClock> {
    config: SyncConfig,
    fetcher: F,
    cache: ContentCache<S>,
    clock: C,
}

impl<F, S> SyncOrchestrator<F, S, SystemClock>
where
    F: ScheduleFetcher,
    S: StateStore,
{
    /// Create an orchestrator on the system clock.
    pub fn new(config: SyncConfig, fetcher: F, store: S) -> Self {
        Self::with_clock(config, fetcher, store, SystemClock)
    }
}

impl<F, S, C> SyncOrchestrator<F, S, C>
where
    F: ScheduleFetcher,
    S: StateStore,
    C: Clock,
{
    /// Create an orchestrator with an explicit clock.
    pub fn with_clock(config: SyncConfig, fetcher: F, store: S, clock: C) -> Self {
        Self {
            config,
            fetcher,
            cache: ContentCache::new(store),
            clock,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Swap in a configuration rebuilt from new host settings.
    pub fn reconfigure(&mut self, config: SyncConfig) {
        if let Err(e) = config.validate() {
            warn!(error = %e, "applying configuration with problems");
        }
        debug!(
            enabled = config.enabled,
            room = %config.room_name,
            interval_minutes = config.fetch_interval_minutes,
            "configuration updated"
        );
        self.config = config;
    }

    /// Replace the fetcher (e.g. after its HTTP settings changed).
    pub fn replace_fetcher(&mut self, fetcher: F) {
        self.fetcher = fetcher;
    }

    /// The content cache.
    pub fn cache(&self) -> &ContentCache<S> {
        &self.cache
    }

    /// The last persisted fetch time.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Store`] if the store cannot be read.
    pub fn fetch_state(&self) -> Result<FetchState> {
        FetchState::load(self.cache.store())
    }

    /// Run one orchestration cycle and push the result to `host`.
    pub fn tick(&mut self, host: &mut dyn DisplayHost) -> TickReport {
        if !self.config.enabled {
            debug!("sync disabled; skipping tick");
            return TickReport::Disabled;
        }

        let fetch = self.fetch_if_due();

        match self.resolve_now() {
            Ok(view) => {
                let writes = self.push_view(&view, host);
                TickReport::Ran {
                    fetch,
                    view: Some(view),
                    writes: Some(writes),
                    error: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "cannot resolve sessions; leaving display targets untouched");
                TickReport::Ran {
                    fetch,
                    view: None,
                    writes: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Resolve the current and next session from the cache without fetching.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] if nothing is cached yet, or
    /// [`BridgeError::Config`] if the override time cannot be interpreted.
    pub fn resolve_now(&self) -> Result<ResolvedView> {
        let document = self.cache.load()?;
        let now = resolution_time(&self.config, &self.clock)?;
        Ok(resolve(&document, &self.config.room_name, now))
    }

    fn fetch_if_due(&self) -> FetchOutcome {
        let now = self.clock.now();
        let state = match self.fetch_state() {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "cannot read last fetch time; fetching anyway");
                FetchState::default()
            }
        };

        if !state.is_due(now, self.config.fetch_interval_secs()) {
            debug!(last_fetch_at = ?state.last_fetch_at, "fetch not due");
            return FetchOutcome::NotDue;
        }

        match self.fetch_and_cache(now) {
            Ok(true) => FetchOutcome::Updated,
            Ok(false) => FetchOutcome::Unchanged,
            Err(e) => {
                warn!(error = %e, "failed to fetch schedule; using the last fetched data");
                FetchOutcome::Failed(e.to_string())
            }
        }
    }

    /// Fetch, cache, and only then record the fetch time.
    fn fetch_and_cache(&self, now: DateTime<Utc>) -> Result<bool> {
        let document = self.fetcher.fetch(&self.config.url)?;
        let changed = self.cache.store_if_changed(&document)?;
        FetchState {
            last_fetch_at: Some(now),
        }
        .save(self.cache.store())?;
        if changed {
            info!(url = %self.config.url, "schedule updated from feed");
        }
        Ok(changed)
    }

    fn push_view(&self, view: &ResolvedView, host: &mut dyn DisplayHost) -> WriteSummary {
        let mut summary = WriteSummary::default();

        for (target, value) in self.config.targets().into_iter().zip(view.fields()) {
            if target.trim().is_empty() {
                summary.unassigned += 1;
                continue;
            }
            match host.write_text(target, value.unwrap_or_default()) {
                Ok(()) => summary.written += 1,
                Err(e) => {
                    match &e {
                        BridgeError::UnknownTarget(_) => {
                            warn!(target = %target, "display target does not exist");
                        }
                        other => warn!(target = %target, error = %other, "display write failed"),
                    }
                    summary.failed.push(TargetFailure {
                        target: target.to_owned(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        summary
    }
}
