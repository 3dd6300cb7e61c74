use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{}", s)
    }
}

/// A borrower's time-boxed ask to use a resource. The window is half-open:
/// [start_date, end_date).
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BorrowRequest {
    pub id: String,
    pub resource_id: String,
    pub borrower_id: String,
    pub owner_id: String,
    pub group_id: Option<String>,
    pub status: RequestStatus,
    #[schema(value_type = String, example = "2025-06-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, example = "2025-06-05")]
    pub end_date: NaiveDate,
    pub message: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl BorrowRequest {
    /// Interval test on half-open windows: overlap iff start1 < end2 && start2 < end1.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date < end && start < self.end_date
    }
}
