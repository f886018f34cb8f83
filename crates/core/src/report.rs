//! The `Report` wire model.
//!
//! Field names follow the backend's JSON exactly (Spanish snake_case,
//! plus the embedded reporter under the legacy `User` key).  Timestamps
//! are opaque ISO-8601 strings and are never parsed here.

use serde::{Deserialize, Serialize};

use crate::status::{ReportPriority, ReportStatus};
use crate::types::ReportId;

/// A citizen-submitted incident record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub titulo: String,
    pub descripcion: String,
    pub categoria_id: i64,
    pub ubicacion: Option<String>,
    pub latitud: f64,
    pub longitud: f64,
    pub estado: ReportStatus,
    pub prioridad: ReportPriority,
    pub imagen_url: Option<String>,
    pub usuario_id: i64,
    pub asignado_a: Option<i64>,
    pub fecha_creacion: String,
    pub fecha_actualizacion: String,
    /// Embedded reporter summary, serialized under `User` by the backend.
    #[serde(rename = "User")]
    pub reporter: Option<Reporter>,
}

/// Summary of the user that filed a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reporter {
    pub id: i64,
    pub nombre: String,
    pub email: String,
}

impl Report {
    /// Minimal placeholder for a report announced over WebSocket before
    /// the next full reload fetches the real record.  Business fields the
    /// notification does not carry are zeroed; the next reconciliation
    /// overwrites the whole bucket anyway.
    pub fn placeholder(id: ReportId, titulo: impl Into<String>) -> Report {
        let now = chrono::Utc::now().to_rfc3339();
        Report {
            id,
            titulo: titulo.into(),
            descripcion: String::new(),
            categoria_id: 0,
            ubicacion: None,
            latitud: 0.0,
            longitud: 0.0,
            estado: ReportStatus::Nuevo,
            prioridad: ReportPriority::Media,
            imagen_url: None,
            usuario_id: 0,
            asignado_a: None,
            fecha_creacion: now.clone(),
            fecha_actualizacion: now,
            reporter: None,
        }
    }
}
