//! Refresh coordinator: owns the session and publishes summaries to listeners.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use tokio::sync::{Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::model::PublicKey;
use crate::ports::{CalendarPort, PortError};
use crate::sensor::{SensorReading, WasteSensor};
use crate::session::Session;
use crate::summary::CollectionSummary;

/// Cooldown between two requested refreshes.
pub const DEFAULT_REFRESH_COOLDOWN: Duration = Duration::from_secs(10);
/// Interval between scheduled refreshes.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(12 * 60 * 60);

#[derive(thiserror::Error, Debug)]
/// Errors surfaced by a refresh cycle.
pub enum RefreshError {
    /// Fetching or transforming the calendar failed; previous values stay published.
    #[error("Update failed: {0}")]
    UpdateFailed(#[source] PortError),
}

#[derive(Debug, Clone, Copy)]
/// Scheduling knobs consumed by the coordinator and its host.
pub struct CoordinatorOptions {
    /// Period of scheduled refreshes.
    pub update_interval: Duration,
    /// Requests closer together than this are coalesced.
    pub cooldown: Duration,
    /// Run the first requested refresh immediately instead of after the cooldown.
    pub immediate: bool,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            update_interval: DEFAULT_UPDATE_INTERVAL,
            cooldown: DEFAULT_REFRESH_COOLDOWN,
            immediate: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Handle returned by [`RefreshCoordinator::add_listener`].
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&CollectionSummary) + Send + Sync>;

#[derive(Default)]
struct State {
    summary: Option<CollectionSummary>,
    last_update_success: bool,
    last_refresh: Option<Instant>,
}

/// Drives refresh cycles for one session.
///
/// The public key is fetched once in [`RefreshCoordinator::connect`] and reused
/// for every calendar request. Each successful refresh replaces the published
/// summary wholesale; a failed one leaves it untouched.
pub struct RefreshCoordinator {
    port: Arc<dyn CalendarPort>,
    session: Session,
    public_key: PublicKey,
    options: CoordinatorOptions,
    state: RwLock<State>,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_listener: AtomicU64,
    pending_request: AtomicBool,
    refresh_lock: AsyncMutex<()>,
}

impl RefreshCoordinator {
    /// Fetch the provider key and set up a coordinator for the session.
    ///
    /// # Errors
    ///
    /// Returns the [`PortError`] of the key exchange.
    pub async fn connect(
        port: Arc<dyn CalendarPort>,
        session: Session,
        options: CoordinatorOptions,
    ) -> Result<Self, PortError> {
        debug!(client_id = %session.client_id, "fetching provider public key");
        let public_key = port.fetch_public_key(&session.client_id).await?;
        info!(address = %session.address, "connected to provider");

        Ok(Self {
            port,
            session,
            public_key,
            options,
            state: RwLock::new(State::default()),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(0),
            pending_request: AtomicBool::new(false),
            refresh_lock: AsyncMutex::new(()),
        })
    }

    /// The session this coordinator polls for.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Scheduling options.
    #[must_use]
    pub fn options(&self) -> CoordinatorOptions {
        self.options
    }

    /// Last successfully published summary.
    #[must_use]
    pub fn summary(&self) -> Option<CollectionSummary> {
        self.read_state().summary.clone()
    }

    /// Whether the most recent refresh succeeded.
    #[must_use]
    pub fn last_update_success(&self) -> bool {
        self.read_state().last_update_success
    }

    /// Rendered readings for the full sensor set.
    #[must_use]
    pub fn readings(&self) -> Vec<SensorReading> {
        let state = self.read_state();
        WasteSensor::all()
            .iter()
            .map(|sensor| sensor.reading(state.summary.as_ref(), &self.session.date_format))
            .collect()
    }

    /// Register a callback run after every successful refresh.
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&CollectionSummary) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.lock_listeners().push((id, Arc::new(listener)));
        id
    }

    /// Unregister a callback. Returns `false` when it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock_listeners();
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);
        listeners.len() != before
    }

    /// Run one refresh cycle relative to the local date.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError::UpdateFailed`] when the calendar fetch fails.
    pub async fn refresh(&self) -> Result<(), RefreshError> {
        self.refresh_at(Local::now().date_naive()).await
    }

    /// Run one refresh cycle with `today` as the reference day.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError::UpdateFailed`] when the calendar fetch fails.
    pub async fn refresh_at(&self, today: NaiveDate) -> Result<(), RefreshError> {
        let serialized = self.refresh_lock.lock().await;
        self.refresh_locked(&serialized, today).await
    }

    /// Debounced refresh. Returns `Ok(false)` when the request was coalesced.
    ///
    /// With `immediate` set, a request runs at once unless the last refresh
    /// started less than `cooldown` ago. The check happens under the refresh
    /// lock, so requests queued behind a running refresh see its start time.
    /// Otherwise the request waits out the cooldown and concurrent requests
    /// during the wait are folded into it.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError::UpdateFailed`] when the refresh it triggers fails.
    pub async fn request_refresh(&self) -> Result<bool, RefreshError> {
        if !self.options.immediate {
            if self.pending_request.swap(true, Ordering::AcqRel) {
                debug!("refresh request folded into pending one");
                return Ok(false);
            }
            tokio::time::sleep(self.options.cooldown).await;
            self.pending_request.store(false, Ordering::Release);
            return self.refresh().await.map(|()| true);
        }

        let serialized = self.refresh_lock.lock().await;
        let recent = self
            .read_state()
            .last_refresh
            .is_some_and(|at| at.elapsed() < self.options.cooldown);
        if recent {
            debug!("refresh request coalesced");
            return Ok(false);
        }
        self.refresh_locked(&serialized, Local::now().date_naive())
            .await
            .map(|()| true)
    }

    /// One refresh cycle; the caller holds `refresh_lock`.
    async fn refresh_locked(
        &self,
        _serialized: &AsyncMutexGuard<'_, ()>,
        today: NaiveDate,
    ) -> Result<(), RefreshError> {
        self.write_state().last_refresh = Some(Instant::now());

        debug!(address = %self.session.address, "fetching collection calendar");
        let fetched = self
            .port
            .fetch_calendar(&self.session.client_id, &self.public_key, &self.session.address)
            .await;

        match fetched {
            Ok(events) => {
                let summary = CollectionSummary::from_events(&events, today);
                {
                    let mut state = self.write_state();
                    state.summary = Some(summary.clone());
                    state.last_update_success = true;
                }
                info!(events = events.len(), "collection calendar refreshed");
                self.notify(&summary);
                Ok(())
            }
            Err(err) => {
                self.write_state().last_update_success = false;
                warn!(error = %err, "collection calendar update failed");
                Err(RefreshError::UpdateFailed(err))
            }
        }
    }

    fn notify(&self, summary: &CollectionSummary) {
        let listeners: Vec<Listener> = self
            .lock_listeners()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(summary);
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Vec<(ListenerId, Listener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
