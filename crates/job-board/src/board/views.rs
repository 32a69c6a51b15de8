use serde::Serialize;

use super::domain::{Application, ApplicationStatus};
use super::stats::{self, MonthlyCount, StatusCount, WorkModelCount, RECENT_LIMIT};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total: usize,
    pub interviews: usize,
    pub offers: usize,
    pub response_rate: u8,
    pub recent: Vec<Application>,
}

impl DashboardSummary {
    pub fn from_collection(collection: &[Application]) -> Self {
        Self {
            total: collection.len(),
            interviews: stats::count_status(collection, ApplicationStatus::Interview),
            offers: stats::count_status(collection, ApplicationStatus::Offer),
            response_rate: stats::response_rate(collection),
            recent: stats::most_recent(collection, RECENT_LIMIT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsReport {
    pub total: usize,
    pub status_counts: Vec<StatusCount>,
    pub work_models: Vec<WorkModelCount>,
    pub monthly: Vec<MonthlyCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_common_status: Option<ApplicationStatus>,
    pub conversion_rate: u8,
}

impl AnalyticsReport {
    pub fn from_collection(collection: &[Application]) -> Self {
        Self {
            total: collection.len(),
            status_counts: stats::status_counts(collection),
            work_models: stats::work_model_counts(collection),
            monthly: stats::monthly_counts(collection),
            most_common_status: stats::most_common_status(collection),
            conversion_rate: stats::conversion_rate(collection),
        }
    }

    pub fn most_common_label(&self) -> &'static str {
        self.most_common_status
            .map(ApplicationStatus::label)
            .unwrap_or("N/A")
    }
}
