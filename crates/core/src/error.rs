//! Shared error taxonomy for the report console.
//!
//! Every variant is recoverable: the coordinator converts these into a
//! user-visible error string and keeps running.  The `Display` output is
//! that user-visible text, which is why the messages are in the
//! application's language.

use crate::status::ReportStatus;

#[derive(Debug, Clone, thiserror::Error)]
pub enum CoordinatorError {
    /// An advance was requested on a status with no successor.  Detected
    /// locally; the backend is never called.
    #[error("No hay transición disponible desde el estado '{status}'")]
    NoTransition { status: ReportStatus },

    /// Network/transport-level failure reaching the backend.
    #[error("Sin conexión al servidor: {0}")]
    BackendUnavailable(String),

    /// The backend answered with a non-2xx status.
    #[error("Error del servidor: {status}")]
    BackendRejected { status: u16, body: String },

    /// No bearer credential was available; the request was not attempted.
    #[error("No hay sesión de administrador activa")]
    AuthMissing,
}
