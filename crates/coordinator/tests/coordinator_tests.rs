//! Coordinator behaviour against a scripted mock backend.
//!
//! Covers the reconciliation reload, per-bucket failure isolation, the
//! status commands, and the optimistic notification reactions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use async_trait::async_trait;

use vozurbana_backend::ReportsBackend;
use vozurbana_coordinator::ReportsCoordinator;
use vozurbana_core::{CoordinatorError, Report, ReportId, ReportStatus, ReportTab};
use vozurbana_notify::NotificationEvent;

/// Scripted backend: canned fetch results per status, recorded calls.
#[derive(Default)]
struct MockBackend {
    /// Fetch results keyed by wire status; missing key means empty list.
    fetch_results: Mutex<HashMap<String, Result<Vec<Report>, CoordinatorError>>>,
    fetch_calls: Mutex<Vec<String>>,
    status_calls: Mutex<Vec<(ReportId, String)>>,
    reject_calls: Mutex<Vec<ReportId>>,
    mutation_error: Mutex<Option<CoordinatorError>>,
}

impl MockBackend {
    fn new() -> Arc<MockBackend> {
        Arc::new(MockBackend::default())
    }

    fn put_bucket(&self, status: &ReportStatus, reports: Vec<Report>) {
        self.fetch_results
            .lock()
            .unwrap()
            .insert(status.wire().to_owned(), Ok(reports));
    }

    fn fail_bucket(&self, status: &ReportStatus, error: CoordinatorError) {
        self.fetch_results
            .lock()
            .unwrap()
            .insert(status.wire().to_owned(), Err(error));
    }

    fn fail_mutations(&self, error: CoordinatorError) {
        *self.mutation_error.lock().unwrap() = Some(error);
    }

    fn fetch_count(&self) -> usize {
        self.fetch_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ReportsBackend for MockBackend {
    async fn fetch_reports_by_status(
        &self,
        status: &ReportStatus,
    ) -> Result<Vec<Report>, CoordinatorError> {
        self.fetch_calls
            .lock()
            .unwrap()
            .push(status.wire().to_owned());
        match self.fetch_results.lock().unwrap().get(status.wire()) {
            Some(result) => result.clone(),
            None => Ok(Vec::new()),
        }
    }

    async fn set_report_status(
        &self,
        report_id: ReportId,
        status: &ReportStatus,
    ) -> Result<Option<Report>, CoordinatorError> {
        if let Some(error) = self.mutation_error.lock().unwrap().clone() {
            return Err(error);
        }
        self.status_calls
            .lock()
            .unwrap()
            .push((report_id, status.wire().to_owned()));
        Ok(None)
    }

    async fn reject_report(
        &self,
        report_id: ReportId,
    ) -> Result<Option<Report>, CoordinatorError> {
        if let Some(error) = self.mutation_error.lock().unwrap().clone() {
            return Err(error);
        }
        self.reject_calls.lock().unwrap().push(report_id);
        Ok(None)
    }
}

fn report(id: ReportId) -> Report {
    Report::placeholder(id, format!("Reporte {id}"))
}

#[tokio::test]
async fn reload_populates_buckets_and_counts() {
    let backend = MockBackend::new();
    backend.put_bucket(&ReportStatus::Nuevo, vec![report(1)]);
    let coordinator = ReportsCoordinator::new(backend.clone());

    coordinator.load_all_reports().await;

    let snapshot = coordinator.snapshot().await;
    assert!(!snapshot.is_loading);
    assert_eq!(snapshot.counts.nuevos, 1);
    assert_eq!(snapshot.counts.en_proceso, 0);
    assert_eq!(snapshot.counts.resueltos, 0);
    assert_eq!(snapshot.counts.cerrados, 0);
    assert_eq!(snapshot.counts.rechazados, 0);
    assert_eq!(snapshot.error, None);
    // One fetch per status bucket.
    assert_eq!(backend.fetch_count(), 5);

    // Default tab is nuevo, so the visible list holds the report.
    assert_eq!(snapshot.reports.len(), 1);
    assert_eq!(snapshot.reports[0].id, 1);
}

#[tokio::test]
async fn failed_bucket_keeps_prior_contents_and_loading_clears() {
    let backend = MockBackend::new();
    backend.put_bucket(&ReportStatus::Nuevo, vec![report(1), report(2)]);
    backend.put_bucket(&ReportStatus::EnProceso, vec![report(3)]);
    let coordinator = ReportsCoordinator::new(backend.clone());

    coordinator.load_all_reports().await;

    // Second reload: nuevo now fails, en_proceso grows.
    backend.fail_bucket(
        &ReportStatus::Nuevo,
        CoordinatorError::BackendUnavailable("connection refused".into()),
    );
    backend.put_bucket(&ReportStatus::EnProceso, vec![report(3), report(4)]);

    coordinator.load_all_reports().await;

    let snapshot = coordinator.snapshot().await;
    assert!(!snapshot.is_loading, "loading must clear even on failure");
    assert!(snapshot.error.is_some());
    // The failed bucket kept its prior contents; the rest reloaded.
    assert_eq!(snapshot.counts.nuevos, 2);
    assert_eq!(snapshot.counts.en_proceso, 2);
}

#[tokio::test]
async fn advance_sends_next_status_then_reloads() {
    let backend = MockBackend::new();
    let coordinator = ReportsCoordinator::new(backend.clone());

    coordinator
        .advance_status(1, &ReportStatus::Nuevo)
        .await
        .unwrap();

    assert_eq!(
        backend.status_calls.lock().unwrap().as_slice(),
        &[(1, "en_proceso".to_owned())]
    );
    // The command triggered a full reconciliation.
    assert_eq!(backend.fetch_count(), 5);

    let snapshot = coordinator.snapshot().await;
    assert_eq!(
        snapshot.message.as_deref(),
        Some("Reporte 1 actualizado a 'en_proceso'")
    );
}

#[tokio::test]
async fn advance_on_terminal_status_fails_locally() {
    let backend = MockBackend::new();
    let coordinator = ReportsCoordinator::new(backend.clone());

    let result = coordinator.advance_status(5, &ReportStatus::Cerrado).await;

    assert_matches!(result, Err(CoordinatorError::NoTransition { .. }));
    // The backend was never called: no mutation, no reload.
    assert!(backend.status_calls.lock().unwrap().is_empty());
    assert_eq!(backend.fetch_count(), 0);

    let snapshot = coordinator.snapshot().await;
    assert!(snapshot.error.as_deref().unwrap().contains("cerrado"));
}

#[tokio::test]
async fn reject_is_unconditional() {
    let backend = MockBackend::new();
    let coordinator = ReportsCoordinator::new(backend.clone());

    // Report 7 could be in any status; reject never checks.
    coordinator.reject_report(7).await.unwrap();

    assert_eq!(backend.reject_calls.lock().unwrap().as_slice(), &[7]);
    assert_eq!(backend.fetch_count(), 5);
}

#[tokio::test]
async fn set_status_bypasses_adjacency() {
    let backend = MockBackend::new();
    let coordinator = ReportsCoordinator::new(backend.clone());

    coordinator
        .set_status(2, &ReportStatus::Cerrado)
        .await
        .unwrap();

    assert_eq!(
        backend.status_calls.lock().unwrap().as_slice(),
        &[(2, "cerrado".to_owned())]
    );
}

#[tokio::test]
async fn mutation_failure_surfaces_error_without_reload() {
    let backend = MockBackend::new();
    backend.fail_mutations(CoordinatorError::BackendRejected {
        status: 403,
        body: "forbidden".into(),
    });
    let coordinator = ReportsCoordinator::new(backend.clone());

    let result = coordinator.advance_status(1, &ReportStatus::Nuevo).await;

    assert_matches!(result, Err(CoordinatorError::BackendRejected { status: 403, .. }));
    assert_eq!(backend.fetch_count(), 0, "failed commands must not reload");

    let snapshot = coordinator.snapshot().await;
    assert_eq!(snapshot.error.as_deref(), Some("Error del servidor: 403"));
    assert!(!snapshot.is_loading);
}

#[tokio::test]
async fn new_report_event_is_optimistic_and_reload_wins() {
    let backend = MockBackend::new();
    let coordinator = ReportsCoordinator::new(backend.clone());

    coordinator
        .handle_event(NotificationEvent::NewReport {
            report_id: 99,
            titulo: "Fuga de agua".into(),
        })
        .await;

    let snapshot = coordinator.snapshot().await;
    assert_eq!(snapshot.counts.nuevos, 1);
    assert_eq!(snapshot.reports[0].id, 99);
    assert!(snapshot.has_new_notification);

    // The backend never heard of report 99: the next reload overwrites
    // the optimistic insertion.
    coordinator.load_all_reports().await;
    let snapshot = coordinator.snapshot().await;
    assert_eq!(snapshot.counts.nuevos, 0);
    assert!(!snapshot.has_new_notification);
}

#[tokio::test]
async fn status_change_event_removes_from_new_idempotently() {
    let backend = MockBackend::new();
    backend.put_bucket(&ReportStatus::Nuevo, vec![report(3), report(8)]);
    let coordinator = ReportsCoordinator::new(backend.clone());
    coordinator.load_all_reports().await;

    let event = NotificationEvent::StatusChanged {
        report_id: 3,
        old_status: ReportStatus::Nuevo,
        new_status: ReportStatus::EnProceso,
    };

    coordinator.handle_event(event.clone()).await;
    let snapshot = coordinator.snapshot().await;
    assert_eq!(snapshot.counts.nuevos, 1);
    assert_eq!(snapshot.reports[0].id, 8);

    // Duplicate delivery is a no-op, not an error.
    coordinator.handle_event(event).await;
    assert_eq!(coordinator.snapshot().await.counts.nuevos, 1);
}

#[tokio::test]
async fn status_change_back_to_new_is_ignored() {
    let backend = MockBackend::new();
    backend.put_bucket(&ReportStatus::Nuevo, vec![report(3)]);
    let coordinator = ReportsCoordinator::new(backend.clone());
    coordinator.load_all_reports().await;

    coordinator
        .handle_event(NotificationEvent::StatusChanged {
            report_id: 3,
            old_status: ReportStatus::EnProceso,
            new_status: ReportStatus::Nuevo,
        })
        .await;

    assert_eq!(coordinator.snapshot().await.counts.nuevos, 1);
}

#[tokio::test]
async fn connection_events_only_touch_connectivity() {
    let backend = MockBackend::new();
    backend.put_bucket(&ReportStatus::Nuevo, vec![report(1)]);
    let coordinator = ReportsCoordinator::new(backend.clone());
    coordinator.load_all_reports().await;
    let fetches_before = backend.fetch_count();

    coordinator
        .handle_event(NotificationEvent::ConnectionChanged { connected: true })
        .await;
    let snapshot = coordinator.snapshot().await;
    assert!(snapshot.socket_connected);
    assert_eq!(snapshot.counts.nuevos, 1);

    coordinator
        .handle_event(NotificationEvent::ConnectionChanged { connected: false })
        .await;
    assert!(!coordinator.snapshot().await.socket_connected);
    assert_eq!(backend.fetch_count(), fetches_before);
}

#[tokio::test]
async fn switching_tabs_needs_no_network() {
    let backend = MockBackend::new();
    backend.put_bucket(&ReportStatus::EnProceso, vec![report(4)]);
    let coordinator = ReportsCoordinator::new(backend.clone());
    coordinator.load_all_reports().await;
    let fetches_before = backend.fetch_count();

    coordinator.set_current_tab(ReportTab::EnProceso).await;

    let snapshot = coordinator.snapshot().await;
    assert_eq!(snapshot.current_tab, ReportTab::EnProceso);
    assert_eq!(snapshot.reports.len(), 1);
    assert_eq!(snapshot.reports[0].id, 4);
    assert_eq!(backend.fetch_count(), fetches_before);
}

#[tokio::test]
async fn messages_and_errors_are_clearable() {
    let backend = MockBackend::new();
    let coordinator = ReportsCoordinator::new(backend.clone());

    coordinator.reject_report(7).await.unwrap();
    assert!(coordinator.snapshot().await.message.is_some());
    coordinator.clear_message().await;
    assert_eq!(coordinator.snapshot().await.message, None);

    let _ = coordinator.advance_status(1, &ReportStatus::Cerrado).await;
    assert!(coordinator.snapshot().await.error.is_some());
    coordinator.clear_error().await;
    assert_eq!(coordinator.snapshot().await.error, None);
}
