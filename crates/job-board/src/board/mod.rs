//! Job-application board: normalized cards partitioned by pipeline status,
//! optimistic status transitions reconciled with a remote store, and the
//! dashboard/analytics statistics derived from the same collection.

pub mod domain;
pub mod engine;
pub mod http_store;
pub mod projection;
pub mod router;
pub mod stats;
pub mod store;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    admit, normalize, Application, ApplicationId, ApplicationStatus, FetchedRecord,
    RawApplicationRecord, ValidationError, WorkModel,
};
pub use engine::{BoardEngine, BoardError, Collection, LoadReport};
pub use http_store::HttpApplicationStore;
pub use projection::{project_board, BoardColumn};
pub use router::board_router;
pub use store::{ApplicationStore, StatusUpdate, StoreError};
pub use views::{AnalyticsReport, DashboardSummary};
