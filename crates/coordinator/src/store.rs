//! In-memory report buckets, one per status tab.
//!
//! The store is plain synchronous state: all locking and all writes go
//! through the coordinator, which is the single logical owner.  Buckets
//! are replaced wholesale by reconciliation reloads; the only in-place
//! mutations are the optimistic prepend/remove driven by notifications,
//! and the next reload overwrites those.

use std::collections::HashMap;

use vozurbana_core::{Report, ReportId, ReportTab};

/// Per-tab report lists keyed by status bucket.
#[derive(Debug, Default)]
pub struct ReportStore {
    buckets: HashMap<ReportTab, Vec<Report>>,
}

/// Derived bucket sizes, recomputed on every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketCounts {
    pub nuevos: usize,
    pub en_proceso: usize,
    pub resueltos: usize,
    pub cerrados: usize,
    pub rechazados: usize,
}

impl BucketCounts {
    pub fn get(&self, tab: ReportTab) -> usize {
        match tab {
            ReportTab::Nuevo => self.nuevos,
            ReportTab::EnProceso => self.en_proceso,
            ReportTab::Resuelto => self.resueltos,
            ReportTab::Cerrado => self.cerrados,
            ReportTab::NoAprobado => self.rechazados,
        }
    }

    pub fn total(&self) -> usize {
        self.nuevos + self.en_proceso + self.resueltos + self.cerrados + self.rechazados
    }
}

impl ReportStore {
    pub fn new() -> ReportStore {
        ReportStore::default()
    }

    /// Replace a bucket wholesale, keeping the backend's order.
    pub fn replace_bucket(&mut self, tab: ReportTab, reports: Vec<Report>) {
        self.buckets.insert(tab, reports);
    }

    /// Current bucket sizes.
    pub fn counts(&self) -> BucketCounts {
        let len = |tab| self.buckets.get(&tab).map_or(0, Vec::len);
        BucketCounts {
            nuevos: len(ReportTab::Nuevo),
            en_proceso: len(ReportTab::EnProceso),
            resueltos: len(ReportTab::Resuelto),
            cerrados: len(ReportTab::Cerrado),
            rechazados: len(ReportTab::NoAprobado),
        }
    }

    /// Reports in the given tab; empty if never populated.
    pub fn current_view(&self, tab: ReportTab) -> &[Report] {
        self.buckets.get(&tab).map_or(&[], Vec::as_slice)
    }

    /// Optimistically insert a just-announced report at the front of the
    /// `nuevo` bucket.  Not the source of truth; the next reload wins.
    pub fn prepend_new(&mut self, report: Report) {
        self.buckets
            .entry(ReportTab::Nuevo)
            .or_default()
            .insert(0, report);
    }

    /// Remove a report from the `nuevo` bucket ahead of the next reload.
    /// Returns `false` when the report was not there (duplicate
    /// deliveries are a no-op).
    pub fn remove_from_new(&mut self, report_id: ReportId) -> bool {
        let Some(bucket) = self.buckets.get_mut(&ReportTab::Nuevo) else {
            return false;
        };
        let before = bucket.len();
        bucket.retain(|report| report.id != report_id);
        bucket.len() != before
    }
}
