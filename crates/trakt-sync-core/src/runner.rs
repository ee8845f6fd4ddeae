//! Background execution of sync passes with a re-entrancy guard.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use trakt_sync_config::AuthorizationStore;

use crate::sync::{SyncOrchestrator, SyncStatistics};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSelection {
    pub movies: bool,
    pub series: bool,
}

impl Default for SyncSelection {
    fn default() -> Self {
        Self {
            movies: true,
            series: true,
        }
    }
}

/// Result of one background run. `None` means the pass was not selected.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub movies: Option<bool>,
    pub series: Option<bool>,
    pub statistics: SyncStatistics,
}

impl SyncOutcome {
    pub fn succeeded(&self) -> bool {
        self.movies.unwrap_or(true) && self.series.unwrap_or(true)
    }
}

#[derive(Debug)]
pub enum SyncStart {
    Started(JoinHandle<SyncOutcome>),
    AlreadyRunning,
    NotAuthorized,
}

pub struct SyncRunner {
    orchestrator: Arc<SyncOrchestrator>,
    authorization: AuthorizationStore,
    is_synchronizing: Arc<AtomicBool>,
}

/// Clears the flag once both passes are over, even if the task panics.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SyncRunner {
    pub fn new(orchestrator: Arc<SyncOrchestrator>, authorization: AuthorizationStore) -> Self {
        Self {
            orchestrator,
            authorization,
            is_synchronizing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_synchronizing(&self) -> bool {
        self.is_synchronizing.load(Ordering::SeqCst)
    }

    pub fn statistics(&self) -> SyncStatistics {
        self.orchestrator.statistics()
    }

    /// Start a pass on a background task unless one is running or the user
    /// is not authorized. Must be called inside a tokio runtime.
    pub fn start(&self, selection: SyncSelection) -> SyncStart {
        if !self.authorization.is_authorized() {
            warn!("Not authorized with Trakt, refusing to sync");
            self.orchestrator.set_status("Not authorized");
            return SyncStart::NotAuthorized;
        }

        // The flag is raised before the task is spawned so a second caller
        // sees it immediately.
        if self
            .is_synchronizing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("Sync already in progress");
            return SyncStart::AlreadyRunning;
        }

        let guard = RunningGuard(self.is_synchronizing.clone());
        let orchestrator = self.orchestrator.clone();
        let handle = tokio::spawn(async move {
            let _guard = guard;
            let movies = if selection.movies {
                Some(orchestrator.sync_movies().await)
            } else {
                None
            };
            let series = if selection.series {
                Some(orchestrator.sync_series().await)
            } else {
                None
            };
            let outcome = SyncOutcome {
                movies,
                series,
                statistics: orchestrator.statistics(),
            };
            info!(
                "Sync finished: movies={:?}, series={:?}",
                outcome.movies, outcome.series
            );
            outcome
        });

        SyncStart::Started(handle)
    }
}
