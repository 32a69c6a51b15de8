//! Read-only statistics over a board collection.
//!
//! Every function here is total: an empty collection yields zero counts, a 0%
//! rate, and no most-common status.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::domain::{Application, ApplicationStatus, WorkModel};

/// Number of cards shown in "recent activity" summaries.
pub const RECENT_LIMIT: usize = 5;

const UNSPECIFIED_LABEL: &str = "Unspecified";
const UNDATED_LABEL: &str = "Undated";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: ApplicationStatus,
    pub status_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkModelCount {
    pub work_model: Option<WorkModel>,
    pub label: &'static str,
    pub count: usize,
}

/// Calendar month a card was created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationMonth {
    Month { year: i32, month: u32 },
    Undated,
}

impl CreationMonth {
    pub fn of(created_at: Option<NaiveDate>) -> Self {
        match created_at {
            Some(date) => CreationMonth::Month {
                year: date.year(),
                month: date.month(),
            },
            None => CreationMonth::Undated,
        }
    }

    /// Short month and year, e.g. `Mar 2025`.
    pub fn label(self) -> String {
        match self {
            CreationMonth::Month { year, month } => NaiveDate::from_ymd_opt(year, month, 1)
                .map(|date| date.format("%b %Y").to_string())
                .unwrap_or_else(|| format!("{year}-{month:02}")),
            CreationMonth::Undated => UNDATED_LABEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub month: CreationMonth,
    pub label: String,
    pub count: usize,
}

/// Whole percentage of `part` in `total`, rounded half up. Zero when `total` is zero.
pub fn percent(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (part * 200 + total) / (total * 2);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

/// Occurrences of every status, zero-filled, in pipeline order.
pub fn status_counts(collection: &[Application]) -> Vec<StatusCount> {
    ApplicationStatus::ordered()
        .into_iter()
        .map(|status| StatusCount {
            status,
            status_label: status.label(),
            count: count_status(collection, status),
        })
        .collect()
}

pub fn count_status(collection: &[Application], status: ApplicationStatus) -> usize {
    collection
        .iter()
        .filter(|application| application.status == status)
        .count()
}

/// Share of applications that received any answer (interview, offer or rejection).
pub fn response_rate(collection: &[Application]) -> u8 {
    let responded = collection
        .iter()
        .filter(|application| application.status.is_response())
        .count();
    percent(responded, collection.len())
}

/// Share of applications currently at the interview stage.
pub fn conversion_rate(collection: &[Application]) -> u8 {
    percent(
        count_status(collection, ApplicationStatus::Interview),
        collection.len(),
    )
}

/// Work-model histogram in first-seen order; cards without one count as `Unspecified`.
pub fn work_model_counts(collection: &[Application]) -> Vec<WorkModelCount> {
    let mut counts: Vec<WorkModelCount> = Vec::new();
    for application in collection {
        match counts
            .iter_mut()
            .find(|entry| entry.work_model == application.work_model)
        {
            Some(entry) => entry.count += 1,
            None => counts.push(WorkModelCount {
                work_model: application.work_model,
                label: application
                    .work_model
                    .map(WorkModel::label)
                    .unwrap_or(UNSPECIFIED_LABEL),
                count: 1,
            }),
        }
    }
    counts
}

/// Creation histogram by calendar month, buckets ordered by first appearance.
///
/// Callers that need chronological buckets must sort the collection first.
pub fn monthly_counts(collection: &[Application]) -> Vec<MonthlyCount> {
    let mut counts: Vec<MonthlyCount> = Vec::new();
    for application in collection {
        let month = CreationMonth::of(application.created_at);
        match counts.iter_mut().find(|entry| entry.month == month) {
            Some(entry) => entry.count += 1,
            None => counts.push(MonthlyCount {
                month,
                label: month.label(),
                count: 1,
            }),
        }
    }
    counts
}

/// Status held by the most cards. Ties go to the status seen first in the collection.
pub fn most_common_status(collection: &[Application]) -> Option<ApplicationStatus> {
    let mut seen: Vec<(ApplicationStatus, usize)> = Vec::new();
    for application in collection {
        match seen
            .iter_mut()
            .find(|(status, _)| *status == application.status)
        {
            Some((_, count)) => *count += 1,
            None => seen.push((application.status, 1)),
        }
    }

    seen.into_iter()
        .fold(None, |best: Option<(ApplicationStatus, usize)>, candidate| {
            match best {
                Some((_, best_count)) if best_count >= candidate.1 => best,
                _ => Some(candidate),
            }
        })
        .map(|(status, _)| status)
}

/// Highest ids first, used as the recency order for summaries.
// TODO: switch to `created_at` once product confirms ids are not meant as the recency signal.
pub fn most_recent(collection: &[Application], limit: usize) -> Vec<Application> {
    let mut sorted: Vec<&Application> = collection.iter().collect();
    sorted.sort_by(|left, right| right.id.cmp(&left.id));
    sorted.into_iter().take(limit).cloned().collect()
}
