use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier assigned by the remote store when an application is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub u64);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pipeline status of a tracked application. Any status may move to any other.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ApplicationStatus {
    #[default]
    #[serde(rename = "To Apply")]
    ToApply,
    #[serde(rename = "Applied")]
    Applied,
    #[serde(rename = "Interview")]
    Interview,
    #[serde(rename = "Offer")]
    Offer,
    #[serde(rename = "Rejected")]
    Rejected,
}

impl ApplicationStatus {
    pub const fn ordered() -> [ApplicationStatus; 5] {
        [
            ApplicationStatus::ToApply,
            ApplicationStatus::Applied,
            ApplicationStatus::Interview,
            ApplicationStatus::Offer,
            ApplicationStatus::Rejected,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::ToApply => "To Apply",
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Offer => "Offer",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// Statuses that count as the employer having answered.
    pub const fn is_response(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Interview | ApplicationStatus::Offer | ApplicationStatus::Rejected
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ApplicationStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        ApplicationStatus::ordered()
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnknownStatus(value.to_string()))
    }
}

/// Where the role is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkModel {
    Remote,
    Hybrid,
    #[serde(rename = "On-site")]
    OnSite,
}

impl WorkModel {
    pub const fn label(self) -> &'static str {
        match self {
            WorkModel::Remote => "Remote",
            WorkModel::Hybrid => "Hybrid",
            WorkModel::OnSite => "On-site",
        }
    }
}

impl FromStr for WorkModel {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(WorkModel::Remote),
            "hybrid" => Ok(WorkModel::Hybrid),
            "on-site" | "onsite" | "on site" => Ok(WorkModel::OnSite),
            _ => Err(ValidationError::UnknownWorkModel(value.to_string())),
        }
    }
}

/// Record exactly as the remote store returns it. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawApplicationRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub work_model: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDate>,
}

/// A normalized application card resident in the board collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Application {
    pub id: ApplicationId,
    pub title: String,
    pub company: String,
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_model: Option<WorkModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Application {
    pub fn with_status(&self, status: ApplicationStatus) -> Application {
        Application {
            status,
            ..self.clone()
        }
    }
}

/// Reasons a store record is refused admission into the collection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("application record is missing an id")]
    MissingId,
    #[error("application {id} has an empty {field}")]
    EmptyField {
        id: ApplicationId,
        field: &'static str,
    },
    #[error("unknown application status '{0}'")]
    UnknownStatus(String),
    #[error("unknown work model '{0}'")]
    UnknownWorkModel(String),
    #[error("application {0} appears more than once in the collection")]
    DuplicateId(ApplicationId),
    #[error("record {index} of the fetched batch could not be decoded: {reason}")]
    Malformed { index: usize, reason: String },
}

/// One element of a fetched batch, decoded on its own so a bad record cannot
/// fail its neighbours.
pub type FetchedRecord = Result<RawApplicationRecord, ValidationError>;

impl RawApplicationRecord {
    pub fn from_json(index: usize, value: serde_json::Value) -> FetchedRecord {
        serde_json::from_value(value).map_err(|err| ValidationError::Malformed {
            index,
            reason: err.to_string(),
        })
    }
}

fn non_empty(
    value: Option<String>,
    id: ApplicationId,
    field: &'static str,
) -> Result<String, ValidationError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ValidationError::EmptyField { id, field }),
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

/// Convert a store record into an [`Application`], defaulting a missing status to `To Apply`.
pub fn normalize(raw: RawApplicationRecord) -> Result<Application, ValidationError> {
    let id = raw.id.map(ApplicationId).ok_or(ValidationError::MissingId)?;
    let title = non_empty(raw.job_title, id, "title")?;
    let company = non_empty(raw.company_name, id, "company")?;

    let status = match blank_to_none(raw.status) {
        Some(value) => value.parse()?,
        None => ApplicationStatus::default(),
    };
    let work_model = blank_to_none(raw.work_model)
        .map(|value| value.parse())
        .transpose()?;

    Ok(Application {
        id,
        title,
        company,
        status,
        work_model,
        created_at: raw.created_at,
        location: raw.location,
        job_type: raw.job_type,
        priority: raw.priority,
        notes: raw.notes,
    })
}

/// Normalize a fetched batch. Undecodable or invalid records and repeated ids
/// are returned separately; admitted records keep their fetch order.
pub fn admit<I>(records: I) -> (Vec<Application>, Vec<ValidationError>)
where
    I: IntoIterator<Item = FetchedRecord>,
{
    let mut seen = HashSet::new();
    let mut admitted = Vec::new();
    let mut rejected = Vec::new();

    for fetched in records {
        match fetched.and_then(normalize) {
            Ok(application) if seen.insert(application.id) => admitted.push(application),
            Ok(application) => rejected.push(ValidationError::DuplicateId(application.id)),
            Err(error) => rejected.push(error),
        }
    }

    (admitted, rejected)
}
