use std::sync::Arc;

use omrin_core::{RefreshCoordinator, RefreshError};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

/// Result of one refresh, reported back to the UI loop.
#[derive(Debug)]
pub(crate) enum RefreshOutcome {
    Refreshed,
    Coalesced,
    Failed(String),
}

impl RefreshOutcome {
    pub(crate) fn from_result(result: Result<bool, RefreshError>) -> Self {
        match result {
            Ok(true) => RefreshOutcome::Refreshed,
            Ok(false) => RefreshOutcome::Coalesced,
            Err(err) => RefreshOutcome::Failed(err.to_string()),
        }
    }
}

/// Refresh the coordinator on its update interval until the UI goes away.
///
/// The first tick is skipped: startup already ran the initial refresh.
pub(crate) fn spawn(
    coordinator: Arc<RefreshCoordinator>,
    outcomes: UnboundedSender<RefreshOutcome>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let interval = coordinator.options().update_interval;
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        info!("Refresh scheduler started (interval: {:?})", interval);

        loop {
            ticker.tick().await;
            debug!("Running scheduled refresh");

            let result = coordinator.refresh().await.map(|()| true);
            if let Err(err) = &result {
                error!("Scheduled refresh failed: {err}");
                // Keep ticking; the next interval retries.
            }

            if outcomes.send(RefreshOutcome::from_result(result)).is_err() {
                break;
            }
        }
    })
}

/// Fire a debounced refresh without blocking the UI loop.
pub(crate) fn request(
    coordinator: &Arc<RefreshCoordinator>,
    outcomes: &UnboundedSender<RefreshOutcome>,
) {
    let coordinator = Arc::clone(coordinator);
    let outcomes = outcomes.clone();
    tokio::spawn(async move {
        let outcome = RefreshOutcome::from_result(coordinator.request_refresh().await);
        // The receiver only disappears on shutdown.
        let _sent = outcomes.send(outcome);
    });
}
