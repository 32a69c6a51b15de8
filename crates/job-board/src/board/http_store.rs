use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, instrument};

use super::domain::{ApplicationId, FetchedRecord, RawApplicationRecord};
use super::store::{ApplicationStore, StatusUpdate, StoreError};
use crate::config::StoreConfig;

/// REST client for the application store (`/applications/` resource).
#[derive(Debug, Clone)]
pub struct HttpApplicationStore {
    client: Client,
    base_url: String,
}

impl HttpApplicationStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| StoreError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/applications/", self.base_url)
    }

    fn entity_url(&self, id: ApplicationId) -> String {
        format!("{}/applications/{}", self.base_url, id)
    }
}

async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Rejected {
        status: status.as_u16(),
        message,
    })
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::Timeout
        } else if err.is_decode() {
            StoreError::Malformed(err.to_string())
        } else {
            StoreError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl ApplicationStore for HttpApplicationStore {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_all(&self) -> Result<Vec<FetchedRecord>, StoreError> {
        let response = self.client.get(self.collection_url()).send().await?;
        let batch = ensure_success(response).await?.json::<Vec<Value>>().await?;
        debug!(count = batch.len(), "fetched application records");
        Ok(batch
            .into_iter()
            .enumerate()
            .map(|(index, value)| RawApplicationRecord::from_json(index, value))
            .collect())
    }

    #[instrument(skip(self, update), fields(status = %update.status))]
    async fn update_status(
        &self,
        id: ApplicationId,
        update: &StatusUpdate,
    ) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.entity_url(id))
            .json(update)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_entity(&self, id: ApplicationId) -> Result<(), StoreError> {
        let response = self.client.delete(self.entity_url(id)).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}
