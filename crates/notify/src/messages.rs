//! Wire format of the notification WebSocket.
//!
//! The server sends JSON envelopes of the shape
//! `{"type": "<kind>", "data": {...}}`.  Parsing is total and fail-soft:
//! malformed JSON, unknown types, and known types with broken payloads
//! all come back as [`ServerMessage::Unrecognized`] so a bad frame can
//! never take down the read loop.

use serde::Deserialize;

use vozurbana_core::{ReportId, ReportStatus};

/// Envelope shared by every server message.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Payload of `new_report` messages.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReportData {
    #[serde(rename = "reportId")]
    pub report_id: ReportId,
    pub titulo: String,
    #[serde(default)]
    pub prioridad: Option<String>,
    #[serde(rename = "fechaCreacion", default)]
    pub fecha_creacion: Option<String>,
}

/// Payload of `status_change` messages.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusChangeData {
    #[serde(rename = "reportId")]
    pub report_id: ReportId,
    #[serde(rename = "oldStatus")]
    pub old_status: ReportStatus,
    #[serde(rename = "newStatus")]
    pub new_status: ReportStatus,
}

/// Payload of `pending_reports` reminder messages.
#[derive(Debug, Clone, Deserialize)]
pub struct PendingReportsData {
    pub count: u32,
}

/// A parsed server message.
#[derive(Debug, Clone)]
pub enum ServerMessage {
    NewReport(NewReportData),
    StatusChange(StatusChangeData),
    PendingReports(PendingReportsData),
    /// Connection acknowledgement; no payload worth processing.
    Connected,
    /// Keepalive answer; no payload worth processing.
    Pong,
    /// Anything this client does not understand, kept raw for logging.
    Unrecognized { raw: String },
}

/// The subscribe control message sent right after the socket opens.
pub fn subscribe_frame() -> String {
    r#"{"type":"subscribe"}"#.to_owned()
}

/// Parse a text frame.  Never fails; see the module docs.
pub fn parse_message(text: &str) -> ServerMessage {
    let unrecognized = || ServerMessage::Unrecognized {
        raw: text.to_owned(),
    };

    let Ok(envelope) = serde_json::from_str::<Envelope>(text) else {
        return unrecognized();
    };

    match envelope.kind.as_str() {
        "new_report" => serde_json::from_value(envelope.data)
            .map(ServerMessage::NewReport)
            .unwrap_or_else(|_| unrecognized()),
        "status_change" => serde_json::from_value(envelope.data)
            .map(ServerMessage::StatusChange)
            .unwrap_or_else(|_| unrecognized()),
        "pending_reports" => serde_json::from_value(envelope.data)
            .map(ServerMessage::PendingReports)
            .unwrap_or_else(|_| unrecognized()),
        "connected" => ServerMessage::Connected,
        "pong" => ServerMessage::Pong,
        _ => unrecognized(),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_new_report() {
        let json = r#"{"type":"new_report","data":{"reportId":12,"titulo":"Bache en avenida","prioridad":"alta","fechaCreacion":"2024-01-15T10:30:00Z"}}"#;
        let msg = parse_message(json);
        assert_matches!(msg, ServerMessage::NewReport(data) => {
            assert_eq!(data.report_id, 12);
            assert_eq!(data.titulo, "Bache en avenida");
            assert_eq!(data.prioridad.as_deref(), Some("alta"));
        });
    }

    #[test]
    fn parse_new_report_minimal_payload() {
        let json = r#"{"type":"new_report","data":{"reportId":3,"titulo":"Fuga"}}"#;
        let msg = parse_message(json);
        assert_matches!(msg, ServerMessage::NewReport(data) => {
            assert_eq!(data.report_id, 3);
            assert_eq!(data.prioridad, None);
        });
    }

    #[test]
    fn parse_status_change() {
        let json = r#"{"type":"status_change","data":{"reportId":3,"oldStatus":"nuevo","newStatus":"en_proceso"}}"#;
        let msg = parse_message(json);
        assert_matches!(msg, ServerMessage::StatusChange(data) => {
            assert_eq!(data.report_id, 3);
            assert_eq!(data.old_status, ReportStatus::Nuevo);
            assert_eq!(data.new_status, ReportStatus::EnProceso);
        });
    }

    #[test]
    fn parse_pending_reports() {
        let json = r#"{"type":"pending_reports","data":{"count":4}}"#;
        let msg = parse_message(json);
        assert_matches!(msg, ServerMessage::PendingReports(data) => {
            assert_eq!(data.count, 4);
        });
    }

    #[test]
    fn parse_connected_and_pong_without_payload() {
        assert_matches!(
            parse_message(r#"{"type":"connected"}"#),
            ServerMessage::Connected
        );
        assert_matches!(parse_message(r#"{"type":"pong"}"#), ServerMessage::Pong);
    }

    #[test]
    fn unknown_type_is_unrecognized() {
        let json = r#"{"type":"server_restart","data":{}}"#;
        assert_matches!(parse_message(json), ServerMessage::Unrecognized { raw } => {
            assert_eq!(raw, json);
        });
    }

    #[test]
    fn malformed_json_is_unrecognized() {
        assert_matches!(
            parse_message("not json at all"),
            ServerMessage::Unrecognized { .. }
        );
    }

    #[test]
    fn known_type_with_broken_payload_is_unrecognized() {
        let json = r#"{"type":"new_report","data":{"titulo":"sin id"}}"#;
        assert_matches!(parse_message(json), ServerMessage::Unrecognized { .. });
    }

    #[test]
    fn subscribe_frame_matches_protocol() {
        let value: serde_json::Value = serde_json::from_str(&subscribe_frame()).unwrap();
        assert_eq!(value["type"], "subscribe");
    }
}
