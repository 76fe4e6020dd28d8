//! Reconciliation of pushed events with REST-fetched state.
//!
//! REST snapshots are authoritative. Pushed events only raise a toast and
//! patch the in-memory copies between two refetches.

pub mod board;
pub mod live;
pub mod reconciler;
pub mod source;
pub mod toast;

pub use board::{AdminDashboard, AdminStats, AppliedJob, AppliedJobs, JobBoard};
pub use live::LiveView;
pub use reconciler::{ReconcileAction, Reconciled, Reconciler};
pub use source::{HttpSnapshotSource, SnapshotError, SnapshotSource};
pub use toast::{Severity, Toast};
