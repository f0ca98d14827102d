//! Persisted run history.
//!
//! Every finished [`RunRecord`](crate::workflow::RunRecord) is written as
//! pretty JSON to `<audit_dir>/runs/<started_at>_<run-id-prefix>.json`.
//! File names sort chronologically, so the newest run is the last one.

mod logger;

pub use logger::{AuditLogger, RunListing};
