//! REST client for the Voz Urbana backend.
//!
//! [`ReportsApi`] wraps the admin report endpoints using [`reqwest`];
//! the [`ReportsBackend`] trait is the seam the coordinator depends on,
//! so tests can substitute a mock.  Credentials are injected via
//! [`CredentialProvider`] rather than read from global state.

pub mod api;
pub mod auth;

pub use api::{ReportsApi, ReportsBackend};
pub use auth::{CredentialProvider, StaticCredentials};
