use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use super::domain::{admit, Application, ApplicationId, ApplicationStatus, ValidationError};
use super::projection::{project_board, BoardColumn};
use super::store::{ApplicationStore, StatusUpdate, StoreError};
use super::views::{AnalyticsReport, DashboardSummary};

/// Immutable view of the board collection. A new value is published on every change.
pub type Collection = Arc<Vec<Application>>;

#[derive(Debug, Default)]
struct BoardState {
    collection: Collection,
    in_flight: HashSet<ApplicationId>,
    generation: u64,
}

impl BoardState {
    fn publish(&mut self, collection: Collection) {
        self.collection = collection;
        self.generation = self.generation.wrapping_add(1);
    }
}

fn lock(state: &Mutex<BoardState>) -> MutexGuard<'_, BoardState> {
    // every critical section leaves the state whole, so a poisoned lock is still usable
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What is needed to undo an optimistic transition.
struct Rollback {
    snapshot: Collection,
    optimistic: Collection,
    previous: ApplicationStatus,
}

impl Rollback {
    fn restore(self, state: &mut BoardState, id: ApplicationId) {
        if Arc::ptr_eq(&state.collection, &self.optimistic) {
            state.publish(self.snapshot);
            return;
        }

        // other writes landed meanwhile; only this card goes back
        let reverted = state
            .collection
            .iter()
            .map(|application| {
                if application.id == id {
                    application.with_status(self.previous)
                } else {
                    application.clone()
                }
            })
            .collect();
        state.publish(Arc::new(reverted));
    }
}

/// Marks an id as having a remote write outstanding until settled or dropped.
///
/// Dropping an unsettled transition (its future was cancelled mid-write)
/// rolls the card back, since the store never confirmed the change.
struct PendingChange<'a> {
    state: &'a Mutex<BoardState>,
    id: ApplicationId,
    rollback: Option<Rollback>,
    armed: bool,
}

impl<'a> PendingChange<'a> {
    fn transition(state: &'a Mutex<BoardState>, id: ApplicationId, rollback: Rollback) -> Self {
        Self {
            state,
            id,
            rollback: Some(rollback),
            armed: true,
        }
    }

    fn delete(state: &'a Mutex<BoardState>, id: ApplicationId) -> Self {
        Self {
            state,
            id,
            rollback: None,
            armed: true,
        }
    }

    fn settle(mut self, state: &mut BoardState) -> Option<Rollback> {
        state.in_flight.remove(&self.id);
        self.armed = false;
        self.rollback.take()
    }
}

impl Drop for PendingChange<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = lock(self.state);
        state.in_flight.remove(&self.id);
        if let Some(rollback) = self.rollback.take() {
            rollback.restore(&mut state, self.id);
            warn!(id = %self.id, "abandoned transition rolled back");
        }
    }
}

/// Outcome of populating the board from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub admitted: usize,
    pub rejected: Vec<ValidationError>,
}

/// Error raised by board operations.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("application {0} is not on the board")]
    NotFound(ApplicationId),
    #[error("application {0} already has a change in flight")]
    Conflict(ApplicationId),
    #[error("moving application {id} to {attempted_status} failed: {cause}")]
    TransitionFailed {
        id: ApplicationId,
        attempted_status: ApplicationStatus,
        #[source]
        cause: StoreError,
    },
    #[error("deleting application {id} failed: {cause}")]
    DeleteFailed {
        id: ApplicationId,
        #[source]
        cause: StoreError,
    },
    #[error("loading applications failed: {0}")]
    LoadFailed(#[source] StoreError),
    #[error("cannot reload while {0} change(s) are in flight")]
    ChangesPending(usize),
    #[error("the board changed while loading; reload again")]
    LoadSuperseded,
}

/// Owns the board collection and is its only writer.
///
/// Status changes are applied locally before the store confirms them, so any
/// read taken while a write is outstanding sees the optimistic state. A
/// failed or abandoned write restores the collection captured just before
/// the change.
pub struct BoardEngine<S> {
    store: Arc<S>,
    state: Mutex<BoardState>,
}

impl<S> BoardEngine<S>
where
    S: ApplicationStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            state: Mutex::new(BoardState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        lock(&self.state)
    }

    /// Replace the collection with the store's current contents.
    ///
    /// Malformed records and repeated ids are dropped and reported. On failure
    /// the previous collection is kept, as it is when a change is published
    /// while the fetch is outstanding.
    pub async fn load(&self) -> Result<LoadReport, BoardError> {
        let generation = {
            let state = self.lock();
            if !state.in_flight.is_empty() {
                return Err(BoardError::ChangesPending(state.in_flight.len()));
            }
            state.generation
        };

        let records = match self.store.fetch_all().await {
            Ok(records) => records,
            Err(cause) => {
                warn!(error = %cause, "failed to load applications");
                return Err(BoardError::LoadFailed(cause));
            }
        };

        let (admitted, rejected) = admit(records);
        for error in &rejected {
            warn!(%error, "dropped application record");
        }

        let mut state = self.lock();
        if !state.in_flight.is_empty() {
            return Err(BoardError::ChangesPending(state.in_flight.len()));
        }
        if state.generation != generation {
            warn!("board changed during fetch; discarding loaded records");
            return Err(BoardError::LoadSuperseded);
        }
        let report = LoadReport {
            admitted: admitted.len(),
            rejected,
        };
        state.publish(Arc::new(admitted));
        info!(
            admitted = report.admitted,
            rejected = report.rejected.len(),
            "board loaded"
        );
        Ok(report)
    }

    /// Move a card to `status`, confirming with the store.
    ///
    /// Returns the card as it now stands. A second request for an id whose
    /// previous change is unresolved is rejected with [`BoardError::Conflict`].
    pub async fn request_transition(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, BoardError> {
        let (rollback, update, moved) = {
            let mut state = self.lock();
            if state.in_flight.contains(&id) {
                warn!(%id, %status, "rejected overlapping transition");
                return Err(BoardError::Conflict(id));
            }

            let current = state
                .collection
                .iter()
                .find(|application| application.id == id)
                .ok_or(BoardError::NotFound(id))?;
            let previous = current.status;
            let update = StatusUpdate::for_transition(current, status);
            let moved = current.with_status(status);

            let snapshot = Arc::clone(&state.collection);
            let optimistic: Collection = Arc::new(
                snapshot
                    .iter()
                    .map(|application| {
                        if application.id == id {
                            moved.clone()
                        } else {
                            application.clone()
                        }
                    })
                    .collect(),
            );
            state.publish(Arc::clone(&optimistic));
            state.in_flight.insert(id);
            let rollback = Rollback {
                snapshot,
                optimistic,
                previous,
            };
            (rollback, update, moved)
        };

        let previous = rollback.previous;
        let pending = PendingChange::transition(&self.state, id, rollback);
        debug!(%id, from = %previous, to = %status, "applied optimistic transition");

        let result = self.store.update_status(id, &update).await;

        let mut state = self.lock();
        let rollback = pending.settle(&mut state);
        match result {
            Ok(()) => {
                info!(%id, from = %previous, to = %status, "transition confirmed");
                Ok(moved)
            }
            Err(cause) => {
                if let Some(rollback) = rollback {
                    rollback.restore(&mut state, id);
                }
                warn!(%id, attempted = %status, error = %cause, "transition rolled back");
                Err(BoardError::TransitionFailed {
                    id,
                    attempted_status: status,
                    cause,
                })
            }
        }
    }

    /// Delete a card from the store, then from the board. On failure the card stays.
    pub async fn delete(&self, id: ApplicationId) -> Result<Application, BoardError> {
        {
            let mut state = self.lock();
            if state.in_flight.contains(&id) {
                return Err(BoardError::Conflict(id));
            }
            if !state
                .collection
                .iter()
                .any(|application| application.id == id)
            {
                return Err(BoardError::NotFound(id));
            }
            state.in_flight.insert(id);
        }

        let pending = PendingChange::delete(&self.state, id);
        let result = self.store.delete_entity(id).await;

        let mut state = self.lock();
        pending.settle(&mut state);
        if let Err(cause) = result {
            warn!(%id, error = %cause, "delete failed; card kept");
            return Err(BoardError::DeleteFailed { id, cause });
        }

        let mut removed = None;
        let remaining: Vec<Application> = state
            .collection
            .iter()
            .filter(|application| {
                if application.id == id {
                    removed = Some((*application).clone());
                    false
                } else {
                    true
                }
            })
            .cloned()
            .collect();
        state.publish(Arc::new(remaining));
        info!(%id, "application deleted");
        removed.ok_or(BoardError::NotFound(id))
    }

    /// Current collection, including unconfirmed changes.
    pub fn snapshot(&self) -> Collection {
        Arc::clone(&self.lock().collection)
    }

    pub fn get(&self, id: ApplicationId) -> Option<Application> {
        self.snapshot()
            .iter()
            .find(|application| application.id == id)
            .cloned()
    }

    pub fn is_pending(&self, id: ApplicationId) -> bool {
        self.lock().in_flight.contains(&id)
    }

    /// Ids with a remote write outstanding, ascending.
    pub fn pending(&self) -> Vec<ApplicationId> {
        let mut ids: Vec<ApplicationId> = self.lock().in_flight.iter().copied().collect();
        ids.sort();
        ids
    }

    pub fn board(&self) -> Vec<BoardColumn> {
        project_board(&self.snapshot())
    }

    pub fn dashboard(&self) -> DashboardSummary {
        DashboardSummary::from_collection(&self.snapshot())
    }

    pub fn analytics(&self) -> AnalyticsReport {
        AnalyticsReport::from_collection(&self.snapshot())
    }
}
