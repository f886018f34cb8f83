//! HTTP wrapper for the admin report endpoints.
//!
//! Routes mirror the backend's Express router:
//!
//! * `GET   {base}/reports/status/{status}`: list reports in one status
//! * `PATCH {base}/reports/admin/status/{id}`: set a report's status
//! * `PATCH {base}/reports/admin/reject/{id}`: reject a report
//!
//! Mutations answer with an envelope that may carry the updated report
//! under `data` or `report`, or be a bare acknowledgement.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use vozurbana_core::{CoordinatorError, Report, ReportId, ReportStatus};

use crate::auth::CredentialProvider;

/// Backend operations the coordinator needs.  Implemented by
/// [`ReportsApi`] in production and by mocks in tests.
#[async_trait]
pub trait ReportsBackend: Send + Sync {
    async fn fetch_reports_by_status(
        &self,
        status: &ReportStatus,
    ) -> Result<Vec<Report>, CoordinatorError>;

    /// Set a report's status directly.  Returns the updated report when
    /// the backend includes it in the response.
    async fn set_report_status(
        &self,
        report_id: ReportId,
        status: &ReportStatus,
    ) -> Result<Option<Report>, CoordinatorError>;

    /// Reject a report unconditionally (target status `no_aprobado`),
    /// regardless of its current status.
    async fn reject_report(
        &self,
        report_id: ReportId,
    ) -> Result<Option<Report>, CoordinatorError>;
}

/// Envelope wrapping mutation responses.
///
/// Older backend routes answer `{"report": ...}`, newer ones
/// `{"data": ...}`, and some only acknowledge; all three shapes occur.
#[derive(Debug, Deserialize)]
pub struct MutationEnvelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Report>,
    #[serde(default)]
    pub report: Option<Report>,
    #[serde(default)]
    pub error: Option<String>,
}

impl MutationEnvelope {
    /// The updated report, wherever the backend put it.
    pub fn into_report(self) -> Option<Report> {
        self.report.or(self.data)
    }
}

/// `reqwest`-backed client for the Voz Urbana REST API.
pub struct ReportsApi {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl ReportsApi {
    /// * `base_url`  - e.g. `http://host:3000/api`, no trailing slash.
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialProvider>) -> ReportsApi {
        ReportsApi {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            credentials,
        }
    }

    /// Reuse an existing [`reqwest::Client`] (connection pooling).
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> ReportsApi {
        ReportsApi {
            client,
            base_url: base_url.into(),
            credentials,
        }
    }

    fn bearer(&self) -> Result<String, CoordinatorError> {
        self.credentials
            .bearer_token()
            .ok_or(CoordinatorError::AuthMissing)
    }

    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, CoordinatorError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_owned());
            return Err(CoordinatorError::BackendRejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_envelope(
        response: reqwest::Response,
    ) -> Result<MutationEnvelope, CoordinatorError> {
        let response = Self::ensure_success(response).await?;
        let envelope: MutationEnvelope = response.json().await.map_err(transport)?;
        if let Some(message) = &envelope.message {
            tracing::debug!(message = %message, "Backend mutation message");
        }
        Ok(envelope)
    }
}

/// Map a reqwest failure (connect, DNS, TLS, body decode) into the
/// recoverable transport error.
fn transport(e: reqwest::Error) -> CoordinatorError {
    CoordinatorError::BackendUnavailable(e.to_string())
}

#[async_trait]
impl ReportsBackend for ReportsApi {
    async fn fetch_reports_by_status(
        &self,
        status: &ReportStatus,
    ) -> Result<Vec<Report>, CoordinatorError> {
        let token = self.bearer()?;
        let response = self
            .client
            .get(format!("{}/reports/status/{}", self.base_url, status.wire()))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;

        let response = Self::ensure_success(response).await?;
        let reports: Vec<Report> = response.json().await.map_err(transport)?;
        tracing::debug!(status = %status, count = reports.len(), "Fetched reports");
        Ok(reports)
    }

    async fn set_report_status(
        &self,
        report_id: ReportId,
        status: &ReportStatus,
    ) -> Result<Option<Report>, CoordinatorError> {
        let token = self.bearer()?;
        let body = serde_json::json!({ "estado": status.wire() });

        let response = self
            .client
            .patch(format!("{}/reports/admin/status/{}", self.base_url, report_id))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let envelope = Self::parse_envelope(response).await?;
        tracing::info!(report_id, status = %status, "Report status updated");
        Ok(envelope.into_report())
    }

    async fn reject_report(
        &self,
        report_id: ReportId,
    ) -> Result<Option<Report>, CoordinatorError> {
        let token = self.bearer()?;
        let response = self
            .client
            .patch(format!("{}/reports/admin/reject/{}", self.base_url, report_id))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;

        let envelope = Self::parse_envelope(response).await?;
        tracing::info!(report_id, "Report rejected");
        Ok(envelope.into_report())
    }
}
