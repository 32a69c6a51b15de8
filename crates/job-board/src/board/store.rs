use async_trait::async_trait;
use serde::Serialize;

use super::domain::{Application, ApplicationId, ApplicationStatus, FetchedRecord};

/// Authoritative store the board reconciles against.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<FetchedRecord>, StoreError>;
    async fn update_status(
        &self,
        id: ApplicationId,
        update: &StatusUpdate,
    ) -> Result<(), StoreError>;
    async fn delete_entity(&self, id: ApplicationId) -> Result<(), StoreError>;
}

/// Body of a status write.
///
/// The store's update schema rejects payloads without `job_title` and
/// `company_name`, so both travel with every status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    #[serde(rename = "job_title")]
    pub title: String,
    #[serde(rename = "company_name")]
    pub company: String,
    pub status: ApplicationStatus,
}

impl StatusUpdate {
    pub fn for_transition(application: &Application, status: ApplicationStatus) -> Self {
        Self {
            title: application.title.clone(),
            company: application.company.clone(),
            status,
        }
    }
}

/// Failure talking to the remote store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Transport(String),
    #[error("store request timed out")]
    Timeout,
    #[error("store rejected the request with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("store returned a malformed payload: {0}")]
    Malformed(String),
}
