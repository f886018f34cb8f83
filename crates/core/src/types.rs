/// Report identifiers are backend-assigned integers.
pub type ReportId = i64;
