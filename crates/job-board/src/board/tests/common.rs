use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;
use tokio::sync::{mpsc, Notify, Semaphore};

use crate::board::domain::{
    Application, ApplicationId, ApplicationStatus, FetchedRecord, RawApplicationRecord,
    WorkModel,
};
use crate::board::engine::BoardEngine;
use crate::board::store::{ApplicationStore, StatusUpdate, StoreError};

pub(super) fn raw(id: u64, status: Option<&str>) -> RawApplicationRecord {
    RawApplicationRecord {
        id: Some(id),
        job_title: Some(format!("Backend Engineer {id}")),
        company_name: Some(format!("Company {id}")),
        status: status.map(str::to_string),
        ..RawApplicationRecord::default()
    }
}

pub(super) fn card(id: u64, status: ApplicationStatus) -> Application {
    Application {
        id: ApplicationId(id),
        title: format!("Backend Engineer {id}"),
        company: format!("Company {id}"),
        status,
        work_model: None,
        created_at: None,
        location: None,
        job_type: None,
        priority: None,
        notes: None,
    }
}

pub(super) fn detailed_card(
    id: u64,
    status: ApplicationStatus,
    work_model: Option<WorkModel>,
    created_at: Option<(i32, u32, u32)>,
) -> Application {
    Application {
        work_model,
        created_at: created_at
            .map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).expect("valid date")),
        ..card(id, status)
    }
}

pub(super) fn ids(collection: &[Application]) -> Vec<u64> {
    collection.iter().map(|application| application.id.0).collect()
}

pub(super) fn status_of<S>(engine: &BoardEngine<S>, id: u64) -> ApplicationStatus
where
    S: ApplicationStore + 'static,
{
    engine
        .get(ApplicationId(id))
        .expect("application on board")
        .status
}

/// Two-card board used by the transition scenarios.
pub(super) fn scenario_records() -> Vec<RawApplicationRecord> {
    vec![raw(1, Some("To Apply")), raw(2, Some("Interview"))]
}

pub(super) async fn loaded_engine<S>(store: Arc<S>) -> BoardEngine<S>
where
    S: ApplicationStore + 'static,
{
    let engine = BoardEngine::new(store);
    engine.load().await.expect("board loads");
    engine
}

#[derive(Default)]
pub(super) struct MemoryStore {
    records: Mutex<Vec<RawApplicationRecord>>,
    updates: Mutex<Vec<(ApplicationId, StatusUpdate)>>,
    deletes: Mutex<Vec<ApplicationId>>,
    failing_updates: Mutex<HashSet<ApplicationId>>,
    fail_all_updates: AtomicBool,
    fail_deletes: AtomicBool,
    fail_fetch: AtomicBool,
}

impl MemoryStore {
    pub(super) fn with_records(records: Vec<RawApplicationRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub(super) fn replace_records(&self, records: Vec<RawApplicationRecord>) {
        *self.records.lock().expect("records mutex poisoned") = records;
    }

    pub(super) fn fail_updates(&self, fail: bool) {
        self.fail_all_updates.store(fail, Ordering::SeqCst);
    }

    pub(super) fn fail_updates_for(&self, id: u64) {
        self.failing_updates
            .lock()
            .expect("failure mutex poisoned")
            .insert(ApplicationId(id));
    }

    pub(super) fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub(super) fn fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub(super) fn updates(&self) -> Vec<(ApplicationId, StatusUpdate)> {
        self.updates.lock().expect("updates mutex poisoned").clone()
    }

    pub(super) fn deletes(&self) -> Vec<ApplicationId> {
        self.deletes.lock().expect("deletes mutex poisoned").clone()
    }

    pub(super) fn stored_status(&self, id: u64) -> Option<String> {
        self.records
            .lock()
            .expect("records mutex poisoned")
            .iter()
            .find(|record| record.id == Some(id))
            .and_then(|record| record.status.clone())
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn fetch_all(&self) -> Result<Vec<FetchedRecord>, StoreError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("connection refused".to_string()));
        }
        let records = self.records.lock().expect("records mutex poisoned").clone();
        Ok(records.into_iter().map(Ok).collect())
    }

    async fn update_status(
        &self,
        id: ApplicationId,
        update: &StatusUpdate,
    ) -> Result<(), StoreError> {
        self.updates
            .lock()
            .expect("updates mutex poisoned")
            .push((id, update.clone()));

        let failing = self.fail_all_updates.load(Ordering::SeqCst)
            || self
                .failing_updates
                .lock()
                .expect("failure mutex poisoned")
                .contains(&id);
        if failing {
            return Err(StoreError::Rejected {
                status: 500,
                message: "internal server error".to_string(),
            });
        }

        let mut records = self.records.lock().expect("records mutex poisoned");
        match records.iter_mut().find(|record| record.id == Some(id.0)) {
            Some(record) => {
                record.status = Some(update.status.label().to_string());
                Ok(())
            }
            None => Err(StoreError::Rejected {
                status: 404,
                message: "Application not found".to_string(),
            }),
        }
    }

    async fn delete_entity(&self, id: ApplicationId) -> Result<(), StoreError> {
        self.deletes.lock().expect("deletes mutex poisoned").push(id);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Timeout);
        }
        self.records
            .lock()
            .expect("records mutex poisoned")
            .retain(|record| record.id != Some(id.0));
        Ok(())
    }
}

/// Store whose writes park until the test releases them, so assertions can
/// run while a change is in flight. Fetches can be parked too, after the
/// records have been read.
pub(super) struct GatedStore {
    pub(super) inner: MemoryStore,
    gate: Semaphore,
    entered_tx: mpsc::UnboundedSender<ApplicationId>,
    entered_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<ApplicationId>>,
    fetch_gated: AtomicBool,
    fetch_gate: Semaphore,
    fetch_entered: Notify,
}

impl GatedStore {
    pub(super) fn new(inner: MemoryStore) -> Self {
        let (entered_tx, entered_rx) = mpsc::unbounded_channel();
        Self {
            inner,
            gate: Semaphore::new(0),
            entered_tx,
            entered_rx: tokio::sync::Mutex::new(entered_rx),
            fetch_gated: AtomicBool::new(false),
            fetch_gate: Semaphore::new(0),
            fetch_entered: Notify::new(),
        }
    }

    pub(super) fn gate_fetches(&self) {
        self.fetch_gated.store(true, Ordering::SeqCst);
    }

    /// Wait until a gated fetch has read its records.
    pub(super) async fn fetch_entered(&self) {
        self.fetch_entered.notified().await;
    }

    pub(super) fn release_fetches(&self, fetches: usize) {
        self.fetch_gate.add_permits(fetches);
    }

    /// Wait until a write reaches the store; returns the id it targets.
    pub(super) async fn entered(&self) -> ApplicationId {
        self.entered_rx
            .lock()
            .await
            .recv()
            .await
            .expect("store sender alive")
    }

    pub(super) fn release(&self, writes: usize) {
        self.gate.add_permits(writes);
    }

    async fn wait_for_gate(&self, id: ApplicationId) {
        self.entered_tx.send(id).expect("store receiver alive");
        self.gate.acquire().await.expect("gate open").forget();
    }
}

#[async_trait]
impl ApplicationStore for GatedStore {
    async fn fetch_all(&self) -> Result<Vec<FetchedRecord>, StoreError> {
        let records = self.inner.fetch_all().await;
        if self.fetch_gated.load(Ordering::SeqCst) {
            self.fetch_entered.notify_one();
            self.fetch_gate.acquire().await.expect("gate open").forget();
        }
        records
    }

    async fn update_status(
        &self,
        id: ApplicationId,
        update: &StatusUpdate,
    ) -> Result<(), StoreError> {
        self.wait_for_gate(id).await;
        self.inner.update_status(id, update).await
    }

    async fn delete_entity(&self, id: ApplicationId) -> Result<(), StoreError> {
        self.wait_for_gate(id).await;
        self.inner.delete_entity(id).await
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
