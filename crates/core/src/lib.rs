//! Domain types for the Voz Urbana report console.
//!
//! The status vocabulary, the forward-only status machine, the `Report`
//! wire model, and the shared error taxonomy live here.  Everything is
//! transport-agnostic: the REST and WebSocket layers build on top of
//! these types without this crate knowing about either.

pub mod error;
pub mod report;
pub mod status;
pub mod types;

pub use error::CoordinatorError;
pub use report::{Report, Reporter};
pub use status::{ReportAction, ReportPriority, ReportStatus, ReportTab};
pub use types::ReportId;
