//! Report store and coordinator.
//!
//! [`ReportStore`] keeps the in-memory status buckets; the
//! [`ReportsCoordinator`] is the single writer on top of it, driving
//! backend fetches, status commands, and notification reactions, and
//! publishing [`DashboardSnapshot`]s for whatever renders them.

pub mod coordinator;
pub mod store;

pub use coordinator::{DashboardSnapshot, ReportsCoordinator};
pub use store::{BucketCounts, ReportStore};
