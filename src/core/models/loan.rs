use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanStatus {
    Active,
    Returned,
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LoanStatus::Active => "ACTIVE",
            LoanStatus::Returned => "RETURNED",
        };
        write!(f, "{}", s)
    }
}

/// The active/returned record created once a borrow request is approved.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Loan {
    pub id: String,
    pub borrow_request_id: String,
    pub status: LoanStatus,
    #[schema(value_type = String, example = "2025-06-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, example = "2025-06-05")]
    pub end_date: NaiveDate,
    #[schema(value_type = Option<String>, example = "2025-06-05")]
    pub returned_date: Option<NaiveDate>,
}
