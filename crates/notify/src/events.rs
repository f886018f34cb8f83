//! Events the channel broadcasts to its subscribers.
//!
//! Delivery order matches the wire, and duplicates from the backend are
//! forwarded as-is, so consumers must be idempotent.

use vozurbana_core::{ReportId, ReportStatus};

/// A notification the rest of the application cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    /// A report was just created on the backend.
    NewReport { report_id: ReportId, titulo: String },

    /// A report moved from one status to another.
    StatusChanged {
        report_id: ReportId,
        old_status: ReportStatus,
        new_status: ReportStatus,
    },

    /// The WebSocket link went up or down.
    ConnectionChanged { connected: bool },
}
