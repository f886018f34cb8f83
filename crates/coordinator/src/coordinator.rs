//! The coordinator: single writer over the report store.
//!
//! Fetches run concurrently (one per status bucket), commands go through
//! the backend and reconcile with a full reload, and notification events
//! apply optimistic store updates.  Every state change publishes a fresh
//! [`DashboardSnapshot`] on a `watch` channel.

use std::sync::Arc;

use tokio::sync::{broadcast, watch, Mutex, RwLock};

use vozurbana_backend::ReportsBackend;
use vozurbana_core::{CoordinatorError, Report, ReportId, ReportStatus, ReportTab};
use vozurbana_notify::{NotificationChannel, NotificationEvent};

use crate::store::{BucketCounts, ReportStore};

/// Everything a dashboard needs to render one frame.
#[derive(Debug, Clone, Default)]
pub struct DashboardSnapshot {
    pub is_loading: bool,
    pub socket_connected: bool,
    pub counts: BucketCounts,
    pub current_tab: ReportTab,
    /// Reports of the active tab, in backend order.
    pub reports: Vec<Report>,
    pub error: Option<String>,
    pub message: Option<String>,
    /// Set when a push notification arrived since the last reload.
    pub has_new_notification: bool,
}

struct CoordinatorState {
    store: ReportStore,
    current_tab: ReportTab,
    is_loading: bool,
    socket_connected: bool,
    error: Option<String>,
    message: Option<String>,
    has_new_notification: bool,
}

impl CoordinatorState {
    fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            is_loading: self.is_loading,
            socket_connected: self.socket_connected,
            counts: self.store.counts(),
            current_tab: self.current_tab,
            reports: self.store.current_view(self.current_tab).to_vec(),
            error: self.error.clone(),
            message: self.message.clone(),
            has_new_notification: self.has_new_notification,
        }
    }
}

/// Orchestrates backend fetches, status commands, and notification
/// reactions.  Share via `Arc`; all mutation funnels through the
/// interior lock, so the WebSocket task and callers never race on the
/// buckets.
pub struct ReportsCoordinator {
    backend: Arc<dyn ReportsBackend>,
    inner: RwLock<CoordinatorState>,
    /// Serializes overlapping full reloads: the five bucket fetches of
    /// one reload run concurrently, but two reloads never interleave.
    reload_gate: Mutex<()>,
    snapshot_tx: watch::Sender<DashboardSnapshot>,
}

impl ReportsCoordinator {
    pub fn new(backend: Arc<dyn ReportsBackend>) -> Arc<ReportsCoordinator> {
        let (snapshot_tx, _) = watch::channel(DashboardSnapshot::default());
        Arc::new(ReportsCoordinator {
            backend,
            inner: RwLock::new(CoordinatorState {
                store: ReportStore::new(),
                current_tab: ReportTab::default(),
                is_loading: false,
                socket_connected: false,
                error: None,
                message: None,
                has_new_notification: false,
            }),
            reload_gate: Mutex::new(()),
            snapshot_tx,
        })
    }

    /// Watch snapshot changes (UI feed).
    pub fn watch(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Current snapshot.
    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.inner.read().await.snapshot()
    }

    /// Reload all five buckets from the backend.  This is the sole
    /// reconciliation point: successful buckets match backend truth,
    /// failed ones keep their prior contents and surface an error, and
    /// the loading flag always clears.
    pub async fn load_all_reports(&self) {
        let _reload = self.reload_gate.lock().await;

        {
            let mut state = self.inner.write().await;
            state.is_loading = true;
            state.error = None;
        }
        self.publish().await;

        let fetches = ReportTab::ALL.map(|tab| {
            let backend = Arc::clone(&self.backend);
            async move { (tab, backend.fetch_reports_by_status(&tab.status()).await) }
        });
        let results = futures::future::join_all(fetches).await;

        let mut state = self.inner.write().await;
        for (tab, result) in results {
            match result {
                Ok(reports) => {
                    tracing::debug!(tab = ?tab, count = reports.len(), "Bucket reloaded");
                    state.store.replace_bucket(tab, reports);
                }
                Err(e) => {
                    // Keep the bucket's prior contents; the other four
                    // fetches already ran independently.
                    tracing::warn!(tab = ?tab, error = %e, "Bucket reload failed");
                    state.error = Some(e.to_string());
                }
            }
        }
        state.is_loading = false;
        state.has_new_notification = false;
        drop(state);

        self.publish().await;
    }

    /// Switch the active tab.  View-only: no network call.
    pub async fn set_current_tab(&self, tab: ReportTab) {
        self.inner.write().await.current_tab = tab;
        self.publish().await;
    }

    /// Advance a report to the next status in the fixed progression.
    /// Fails locally, without calling the backend, when the current
    /// status has no successor.
    pub async fn advance_status(
        &self,
        report_id: ReportId,
        current: &ReportStatus,
    ) -> Result<(), CoordinatorError> {
        let Some(next) = current.next() else {
            let err = CoordinatorError::NoTransition {
                status: current.clone(),
            };
            tracing::warn!(report_id, status = %current, "No transition available");
            self.fail(&err).await;
            return Err(err);
        };
        self.apply_status(report_id, next).await
    }

    /// Reject a report.  Unconditional: the backend moves it to
    /// `no_aprobado` whatever its current status is.
    pub async fn reject_report(&self, report_id: ReportId) -> Result<(), CoordinatorError> {
        match self.backend.reject_report(report_id).await {
            Ok(_updated) => {
                self.load_all_reports().await;
                self.succeed(format!("Reporte {report_id} rechazado")).await;
                Ok(())
            }
            Err(e) => {
                self.fail(&e).await;
                Err(e)
            }
        }
    }

    /// Administrative override: set a status directly, bypassing the
    /// adjacency rule.
    pub async fn set_status(
        &self,
        report_id: ReportId,
        status: &ReportStatus,
    ) -> Result<(), CoordinatorError> {
        self.apply_status(report_id, status.clone()).await
    }

    pub async fn clear_error(&self) {
        self.inner.write().await.error = None;
        self.publish().await;
    }

    pub async fn clear_message(&self) {
        self.inner.write().await.message = None;
        self.publish().await;
    }

    /// Subscribe to a notification channel and spawn the task that hands
    /// its events to this coordinator's serialized context.
    pub fn attach(self: &Arc<Self>, channel: &NotificationChannel) -> tokio::task::JoinHandle<()> {
        let mut rx = channel.subscribe();
        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => coordinator.handle_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Missed events are harmless: the next reload
                        // reconciles the buckets anyway.
                        tracing::warn!(skipped, "Notification receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// React to one notification event.
    ///
    /// New-report and status-change reactions are optimistic view
    /// touches only; the next [`load_all_reports`](Self::load_all_reports)
    /// is the correctness backstop and always wins.
    pub async fn handle_event(&self, event: NotificationEvent) {
        match event {
            NotificationEvent::NewReport { report_id, titulo } => {
                tracing::info!(report_id, titulo = %titulo, "Prepending announced report");
                let mut state = self.inner.write().await;
                state.store.prepend_new(Report::placeholder(report_id, titulo));
                state.has_new_notification = true;
                drop(state);
                self.publish().await;
            }
            NotificationEvent::StatusChanged {
                report_id,
                new_status,
                ..
            } => {
                if new_status == ReportStatus::Nuevo {
                    return;
                }
                let mut state = self.inner.write().await;
                let removed = state.store.remove_from_new(report_id);
                drop(state);
                if removed {
                    tracing::debug!(report_id, new_status = %new_status, "Removed from nuevo bucket");
                    self.publish().await;
                }
            }
            NotificationEvent::ConnectionChanged { connected } => {
                self.inner.write().await.socket_connected = connected;
                self.publish().await;
            }
        }
    }

    // ---- private helpers ----

    async fn apply_status(
        &self,
        report_id: ReportId,
        target: ReportStatus,
    ) -> Result<(), CoordinatorError> {
        match self.backend.set_report_status(report_id, &target).await {
            Ok(_updated) => {
                self.load_all_reports().await;
                self.succeed(format!(
                    "Reporte {report_id} actualizado a '{}'",
                    target.wire()
                ))
                .await;
                Ok(())
            }
            Err(e) => {
                self.fail(&e).await;
                Err(e)
            }
        }
    }

    async fn succeed(&self, message: String) {
        let mut state = self.inner.write().await;
        state.message = Some(message);
        drop(state);
        self.publish().await;
    }

    async fn fail(&self, error: &CoordinatorError) {
        let mut state = self.inner.write().await;
        state.error = Some(error.to_string());
        state.is_loading = false;
        drop(state);
        self.publish().await;
    }

    async fn publish(&self) {
        let snapshot = self.inner.read().await.snapshot();
        // A SendError only means there are no watchers.
        let _ = self.snapshot_tx.send(snapshot);
    }
}
