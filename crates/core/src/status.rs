//! Report status vocabulary and the forward-only status machine.
//!
//! The backend speaks Spanish status strings (`"nuevo"`, `"en_proceso"`,
//! `"resuelto"`, `"cerrado"`, `"no_aprobado"`) in both REST query
//! parameters and WebSocket payloads.  [`ReportStatus`] round-trips those
//! strings bit-exactly; anything outside the closed set is preserved
//! verbatim in [`ReportStatus::Unknown`] and yields no further action.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a report.
///
/// Forward progression is fixed: nuevo → en_proceso → resuelto → cerrado.
/// `no_aprobado` and `cerrado` are terminal.  There is no backward
/// transition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReportStatus {
    Nuevo,
    EnProceso,
    Resuelto,
    Cerrado,
    NoAprobado,
    /// A status string this client does not recognize, kept untouched so
    /// it survives a serialize round-trip.
    Unknown(String),
}

impl ReportStatus {
    /// The exact string used on the wire.
    pub fn wire(&self) -> &str {
        match self {
            ReportStatus::Nuevo => "nuevo",
            ReportStatus::EnProceso => "en_proceso",
            ReportStatus::Resuelto => "resuelto",
            ReportStatus::Cerrado => "cerrado",
            ReportStatus::NoAprobado => "no_aprobado",
            ReportStatus::Unknown(raw) => raw,
        }
    }

    /// Parse a wire string, preserving unrecognized values verbatim.
    pub fn from_wire(raw: &str) -> ReportStatus {
        match raw {
            "nuevo" => ReportStatus::Nuevo,
            "en_proceso" => ReportStatus::EnProceso,
            "resuelto" => ReportStatus::Resuelto,
            "cerrado" => ReportStatus::Cerrado,
            "no_aprobado" => ReportStatus::NoAprobado,
            other => ReportStatus::Unknown(other.to_owned()),
        }
    }

    /// Next status in the forward progression, `None` for terminal and
    /// unknown statuses.
    pub fn next(&self) -> Option<ReportStatus> {
        match self {
            ReportStatus::Nuevo => Some(ReportStatus::EnProceso),
            ReportStatus::EnProceso => Some(ReportStatus::Resuelto),
            ReportStatus::Resuelto => Some(ReportStatus::Cerrado),
            ReportStatus::Cerrado | ReportStatus::NoAprobado | ReportStatus::Unknown(_) => None,
        }
    }

    /// The operator action that advances this status, paired 1:1 with
    /// [`next`](Self::next): `Some` exactly when `next` is `Some`.
    pub fn next_action(&self) -> Option<ReportAction> {
        match self {
            ReportStatus::Nuevo => Some(ReportAction::MarkInProcess),
            ReportStatus::EnProceso => Some(ReportAction::MarkResolved),
            ReportStatus::Resuelto => Some(ReportAction::MarkClosed),
            ReportStatus::Cerrado | ReportStatus::NoAprobado | ReportStatus::Unknown(_) => None,
        }
    }

    /// Whether the status is one of the two terminal states.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReportStatus::Cerrado | ReportStatus::NoAprobado)
    }
}

impl From<String> for ReportStatus {
    fn from(raw: String) -> Self {
        ReportStatus::from_wire(&raw)
    }
}

impl From<ReportStatus> for String {
    fn from(status: ReportStatus) -> Self {
        status.wire().to_owned()
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire())
    }
}

/// Operator action advancing a report to its next status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportAction {
    MarkInProcess,
    MarkResolved,
    MarkClosed,
}

impl ReportAction {
    /// Button label shown to the operator.
    pub fn label(self) -> &'static str {
        match self {
            ReportAction::MarkInProcess => "Marcar en Proceso",
            ReportAction::MarkResolved => "Marcar Resuelto",
            ReportAction::MarkClosed => "Marcar Cerrado",
        }
    }

    /// The status this action moves a report into.
    pub fn target(self) -> ReportStatus {
        match self {
            ReportAction::MarkInProcess => ReportStatus::EnProceso,
            ReportAction::MarkResolved => ReportStatus::Resuelto,
            ReportAction::MarkClosed => ReportStatus::Cerrado,
        }
    }
}

/// View partition key for the dashboard: one tab per known status.
///
/// Purely a display concept; never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportTab {
    #[default]
    Nuevo,
    EnProceso,
    Resuelto,
    Cerrado,
    NoAprobado,
}

impl ReportTab {
    /// All tabs in display order.
    pub const ALL: [ReportTab; 5] = [
        ReportTab::Nuevo,
        ReportTab::EnProceso,
        ReportTab::Resuelto,
        ReportTab::Cerrado,
        ReportTab::NoAprobado,
    ];

    /// The status this tab partitions on.
    pub fn status(self) -> ReportStatus {
        match self {
            ReportTab::Nuevo => ReportStatus::Nuevo,
            ReportTab::EnProceso => ReportStatus::EnProceso,
            ReportTab::Resuelto => ReportStatus::Resuelto,
            ReportTab::Cerrado => ReportStatus::Cerrado,
            ReportTab::NoAprobado => ReportStatus::NoAprobado,
        }
    }

    /// Tab for a status, `None` for unknown statuses (which have no tab).
    pub fn from_status(status: &ReportStatus) -> Option<ReportTab> {
        match status {
            ReportStatus::Nuevo => Some(ReportTab::Nuevo),
            ReportStatus::EnProceso => Some(ReportTab::EnProceso),
            ReportStatus::Resuelto => Some(ReportTab::Resuelto),
            ReportStatus::Cerrado => Some(ReportTab::Cerrado),
            ReportStatus::NoAprobado => Some(ReportTab::NoAprobado),
            ReportStatus::Unknown(_) => None,
        }
    }

    /// Display name for the tab selector.
    pub fn label(self) -> &'static str {
        match self {
            ReportTab::Nuevo => "Nuevos",
            ReportTab::EnProceso => "En Proceso",
            ReportTab::Resuelto => "Resueltos",
            ReportTab::Cerrado => "Cerrados",
            ReportTab::NoAprobado => "Rechazados",
        }
    }
}

/// Report priority as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReportPriority {
    Baja,
    Media,
    Alta,
    /// Unrecognized priority string, preserved verbatim.
    Unknown(String),
}

impl ReportPriority {
    pub fn wire(&self) -> &str {
        match self {
            ReportPriority::Baja => "baja",
            ReportPriority::Media => "media",
            ReportPriority::Alta => "alta",
            ReportPriority::Unknown(raw) => raw,
        }
    }
}

impl From<String> for ReportPriority {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "baja" => ReportPriority::Baja,
            "media" => ReportPriority::Media,
            "alta" => ReportPriority::Alta,
            _ => ReportPriority::Unknown(raw),
        }
    }
}

impl From<ReportPriority> for String {
    fn from(priority: ReportPriority) -> Self {
        priority.wire().to_owned()
    }
}
