use serde::Serialize;

use super::domain::{Application, ApplicationStatus};

/// One board column: every card currently sharing `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardColumn {
    pub status: ApplicationStatus,
    pub status_label: &'static str,
    pub count: usize,
    pub cards: Vec<Application>,
}

/// Partition the collection into one column per status, in pipeline order.
///
/// Columns are emitted even when empty, and cards keep the relative order they
/// have in `collection`. The projection is recomputed in full on every call.
pub fn project_board(collection: &[Application]) -> Vec<BoardColumn> {
    ApplicationStatus::ordered()
        .into_iter()
        .map(|status| {
            let cards: Vec<Application> = collection
                .iter()
                .filter(|application| application.status == status)
                .cloned()
                .collect();
            BoardColumn {
                status,
                status_label: status.label(),
                count: cards.len(),
                cards,
            }
        })
        .collect()
}
