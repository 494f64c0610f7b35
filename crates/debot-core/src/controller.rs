// ── Dashboard controller ──
//
// Lifecycle and data flow for one dashboard bound to one gateway:
// immediate fetches on start, a periodic status refresh gated on the
// active view, section-by-section config saves, and toasts.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use debot_api::transport::{TlsMode, TransportConfig};
use debot_api::{ConfigDocument, CronJob, GatewayClient, Status};

use crate::config::{DashboardConfig, TlsVerification};
use crate::error::CoreError;
use crate::format::{self, ChannelEntry};
use crate::state::{DashboardEvent, DashboardState, Toast, View};
use crate::toast::Toaster;

const EVENT_CHANNEL_SIZE: usize = 64;

// ── DashboardController ──────────────────────────────────────────

/// The view-model a rendering layer drives.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Observers read state
/// through [`subscribe()`](Self::subscribe) and
/// [`events()`](Self::events); nothing is held in globals.
#[derive(Clone)]
pub struct DashboardController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: DashboardConfig,
    client: GatewayClient,
    state: watch::Sender<DashboardState>,
    event_tx: broadcast::Sender<DashboardEvent>,
    toaster: Toaster,
    /// The periodic refresh task, if running.
    refresh: Mutex<Option<RefreshTimer>>,
    /// Number of status fetches currently awaiting the gateway.
    status_in_flight: AtomicUsize,
}

struct RefreshTimer {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl DashboardController {
    /// Create a controller from configuration. Does NOT fetch anything --
    /// call [`start()`](Self::start) to load data and begin refreshing.
    pub fn new(config: DashboardConfig) -> Result<Self, CoreError> {
        let client = GatewayClient::new(config.url.clone(), &build_transport(&config))?;
        Ok(Self::with_client(config, client))
    }

    /// Create a controller around an existing gateway client.
    pub fn with_client(config: DashboardConfig, client: GatewayClient) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let toaster = Toaster::new(config.toast_duration);

        Self {
            inner: Arc::new(ControllerInner {
                config,
                client,
                state,
                event_tx,
                toaster,
                refresh: Mutex::new(None),
                status_in_flight: AtomicUsize::new(0),
            }),
        }
    }

    /// Access the dashboard configuration.
    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    /// Access the underlying gateway client.
    pub fn client(&self) -> &GatewayClient {
        &self.inner.client
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Begin periodic refresh, then fetch status and config once.
    ///
    /// Fetch failures are logged, never returned: the dashboard keeps
    /// whatever it had. Calling `start()` again while the refresh task is
    /// alive refetches but does not spawn a second timer.
    pub async fn start(&self) {
        self.start_refresh().await;

        let (status, config) = tokio::join!(self.fetch_status(), self.fetch_config());
        if status.is_ok() && config.is_ok() {
            info!(gateway = %self.inner.config.url, "dashboard loaded");
        }
    }

    /// Stop periodic refresh. Safe to call any number of times.
    ///
    /// A fetch already awaiting the gateway is not aborted; its result is
    /// still committed, but no further tick fires.
    pub async fn stop(&self) {
        let Some(timer) = self.inner.refresh.lock().await.take() else {
            trace!("stop: refresh task not running");
            return;
        };
        timer.cancel.cancel();
        drop(timer.handle);
        debug!("refresh task stopped");
    }

    /// Whether the periodic refresh task is active.
    pub async fn is_refreshing(&self) -> bool {
        self.inner
            .refresh
            .lock()
            .await
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    async fn start_refresh(&self) {
        let period = self.inner.config.refresh_interval;
        if period.is_zero() {
            debug!("periodic refresh disabled");
            return;
        }

        let mut slot = self.inner.refresh.lock().await;
        if slot.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            debug!("refresh task already running");
            return;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(refresh_task(self.clone(), period, cancel.clone()));
        *slot = Some(RefreshTimer { cancel, handle });
        debug!(?period, "refresh task spawned");
    }

    /// One refresh tick: refetch status if the dashboard view is showing
    /// and no status fetch is already in flight.
    async fn on_refresh_tick(&self) {
        let view = self.view();
        if !view.polls_status() {
            trace!(%view, "refresh tick suppressed");
            return;
        }
        if self.inner.status_in_flight.load(Ordering::Acquire) > 0 {
            debug!("refresh tick skipped: status fetch still in flight");
            return;
        }
        // Failure already logged; keep last-known-good data.
        let _ = self.fetch_status().await;
    }

    // ── Fetching ─────────────────────────────────────────────────

    /// Fetch status and cron jobs concurrently and commit them together.
    ///
    /// Either sub-fetch failing aborts the whole cycle: prior state is left
    /// untouched and the failure is logged.
    pub async fn fetch_status(&self) -> Result<(), CoreError> {
        let _in_flight = InFlight::enter(&self.inner.status_in_flight);
        let client = &self.inner.client;

        let (status, cron) = tokio::join!(client.get_status(), client.get_cron());
        let (status, jobs) = match (status, cron) {
            (Ok(status), Ok(cron)) => (status, cron.into_jobs()),
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "failed to fetch status");
                return Err(e.into());
            }
        };

        debug!(jobs = jobs.len(), "status refreshed");
        self.inner.state.send_modify(|state| {
            state.status = Some(Arc::new(status));
            state.cron_jobs = Arc::new(jobs);
            state.last_status_refresh = Some(Utc::now());
        });
        let _ = self.inner.event_tx.send(DashboardEvent::StatusUpdated);
        Ok(())
    }

    /// Fetch the full configuration document and replace the in-memory
    /// copy (unsaved edits included).
    pub async fn fetch_config(&self) -> Result<(), CoreError> {
        let config = match self.inner.client.get_config().await {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "failed to fetch config");
                return Err(e.into());
            }
        };

        debug!(sections = config.sections.len(), "config loaded");
        self.inner.state.send_modify(|state| state.config = Some(config));
        let _ = self
            .inner
            .event_tx
            .send(DashboardEvent::ConfigUpdated { section: None });
        Ok(())
    }

    // ── Saving ───────────────────────────────────────────────────

    /// PUT the in-memory value of `section` and adopt the gateway's reply.
    ///
    /// Shows exactly one toast: `"{section} saved"` on success, or
    /// `"Error: ..."` with the gateway's own error text on failure. A failed
    /// save leaves the edited value in place.
    pub async fn save_section(&self, section: &str) -> Result<Value, CoreError> {
        let result = self.put_section(section).await;
        match &result {
            Ok(_) => {
                info!(section, "config section saved");
                self.toast(format!("{section} saved")).await;
            }
            Err(e) => {
                warn!(section, error = %e, "failed to save config section");
                self.toast(format!("Error: {}", e.toast_message())).await;
            }
        }
        result
    }

    async fn put_section(&self, section: &str) -> Result<Value, CoreError> {
        let body = self.section(section)?;
        let updated = self.inner.client.put_section(section, &body).await?;

        self.inner.state.send_modify(|state| {
            if let Some(config) = state.config.as_mut() {
                config.sections.insert(section.to_owned(), updated.clone());
            }
        });
        let _ = self.inner.event_tx.send(DashboardEvent::ConfigUpdated {
            section: Some(section.to_owned()),
        });
        Ok(updated)
    }

    // ── Editing ──────────────────────────────────────────────────

    /// Mutate the in-memory body of `section`.
    ///
    /// A section missing from a loaded config is created as an empty
    /// object first. Nothing is sent to the gateway until
    /// [`save_section()`](Self::save_section).
    pub fn edit_section<F, R>(&self, section: &str, f: F) -> Result<R, CoreError>
    where
        F: FnOnce(&mut Value) -> R,
    {
        let mut outcome = None;
        self.inner.state.send_if_modified(|state| {
            let Some(config) = state.config.as_mut() else {
                return false;
            };
            let body = config
                .sections
                .entry(section.to_owned())
                .or_insert_with(|| Value::Object(Map::new()));
            outcome = Some(f(body));
            true
        });

        let outcome = outcome.ok_or(CoreError::ConfigNotLoaded)?;
        let _ = self.inner.event_tx.send(DashboardEvent::ConfigUpdated {
            section: Some(section.to_owned()),
        });
        Ok(outcome)
    }

    /// Set one top-level field of an object section.
    ///
    /// Masked values are refused: writing `****` back is not an edit.
    pub fn set_field(&self, section: &str, key: &str, value: Value) -> Result<(), CoreError> {
        if format::is_masked(&value) {
            return Err(CoreError::ValidationFailed {
                message: format!("{section}.{key}: value is a masked secret, not a real value"),
            });
        }
        self.edit_section(section, |body| match body.as_object_mut() {
            Some(fields) => {
                fields.insert(key.to_owned(), value);
                Ok(())
            }
            None => Err(CoreError::ValidationFailed {
                message: format!("section '{section}' is not an object"),
            }),
        })?
    }

    /// Replace the whole in-memory body of `section`.
    pub fn replace_section(&self, section: &str, value: Value) -> Result<(), CoreError> {
        self.edit_section(section, |body| *body = value)
    }

    // ── Toasts ───────────────────────────────────────────────────

    /// Show a transient message, replacing any toast on screen.
    pub async fn toast(&self, message: impl Into<String>) {
        let message = message.into();
        debug!(%message, "toast");
        self.inner.toaster.show(message.clone()).await;
        let _ = self.inner.event_tx.send(DashboardEvent::Toast(message));
    }

    /// The toast currently on screen, if any.
    pub fn current_toast(&self) -> Option<Toast> {
        self.inner.toaster.current()
    }

    /// Subscribe to toast changes (`None` once dismissed).
    pub fn toasts(&self) -> watch::Receiver<Option<Toast>> {
        self.inner.toaster.subscribe()
    }

    // ── View selection ───────────────────────────────────────────

    pub fn view(&self) -> View {
        self.inner.state.borrow().view
    }

    /// Switch the active view. Switching away from the dashboard pauses
    /// status polling without stopping the timer.
    pub fn set_view(&self, view: View) {
        let changed = self.inner.state.send_if_modified(|state| {
            if state.view == view {
                return false;
            }
            state.view = view;
            true
        });
        if changed {
            debug!(%view, "view changed");
            let _ = self.inner.event_tx.send(DashboardEvent::ViewChanged(view));
        }
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.inner.state.subscribe()
    }

    /// Subscribe to discrete dashboard events.
    pub fn events(&self) -> broadcast::Receiver<DashboardEvent> {
        self.inner.event_tx.subscribe()
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> DashboardState {
        self.inner.state.borrow().clone()
    }

    pub fn status(&self) -> Option<Arc<Status>> {
        self.inner.state.borrow().status.clone()
    }

    pub fn cron_jobs(&self) -> Arc<Vec<CronJob>> {
        Arc::clone(&self.inner.state.borrow().cron_jobs)
    }

    pub fn config_document(&self) -> Option<ConfigDocument> {
        self.inner.state.borrow().config.clone()
    }

    /// Current in-memory body of `section`.
    pub fn section(&self, section: &str) -> Result<Value, CoreError> {
        let state = self.inner.state.borrow();
        let config = state.config.as_ref().ok_or(CoreError::ConfigNotLoaded)?;
        config
            .section(section)
            .cloned()
            .ok_or_else(|| CoreError::SectionNotFound {
                section: section.to_owned(),
            })
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.inner.state.borrow().provider_names()
    }

    pub fn channel_list(&self) -> Vec<ChannelEntry> {
        self.inner.state.borrow().channel_list()
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically refresh status while the dashboard view is active.
///
/// Each tick is awaited to completion before the next; ticks missed
/// meanwhile are skipped rather than bunched up.
async fn refresh_task(controller: DashboardController, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => controller.on_refresh_tick().await,
        }
    }
}

/// Counts a status fetch as in flight for as long as it is alive.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Build a [`TransportConfig`] from the dashboard configuration.
fn build_transport(config: &DashboardConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
