use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::errors::GearShareError;

// Request structs for JSON payloads
#[derive(Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateResourceRequest {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub owner_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateResourceRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub updated_by_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct DeleteResourceRequest {
    pub deleted_by_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub created_by_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub updated_by_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct DeleteGroupRequest {
    pub deleted_by_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct InviteMemberRequest {
    pub email: String,
    pub invited_by_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RemoveMemberRequest {
    pub user_id: String,
    pub removed_by_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct SetMemberRoleRequest {
    pub user_id: String,
    pub role: crate::core::models::group::Role,
    pub changed_by_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct TransferOwnershipRequest {
    pub new_owner_id: String,
    pub transferred_by_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ShareResourceRequest {
    pub shared_by_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UnshareResourceRequest {
    pub unshared_by_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateBorrowRequestRequest {
    pub resource_id: String,
    pub borrower_id: String,
    #[schema(value_type = String, example = "2025-06-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, example = "2025-06-05")]
    pub end_date: NaiveDate,
    pub message: Option<String>,
    pub group_id: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateBorrowRequestRequest {
    #[schema(value_type = Option<String>, example = "2025-06-01")]
    pub start_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, example = "2025-06-05")]
    pub end_date: Option<NaiveDate>,
    pub message: Option<String>,
    pub updated_by_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct DeleteBorrowRequestRequest {
    pub deleted_by_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RequestActionRequest {
    pub acting_user_id: String,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct UserIdQuery {
    pub user_id: String,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ListRequestsQuery {
    pub user_id: String,
    /// "borrower" (default) or "owner"
    pub role: Option<String>,
}

// Error response struct
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// Newtype wrapper for GearShareError to implement IntoResponse
pub struct ApiError(pub GearShareError);

impl From<GearShareError> for ApiError {
    fn from(err: GearShareError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            GearShareError::MissingEmail
            | GearShareError::InvalidEmail(_)
            | GearShareError::SelfBorrow
            | GearShareError::InvalidDateRange(_)
            | GearShareError::InvalidInput(_, _) => StatusCode::BAD_REQUEST,

            GearShareError::InvalidCredentials | GearShareError::Unauthorized(_) => StatusCode::UNAUTHORIZED,

            GearShareError::NotGroupMember(_)
            | GearShareError::NotResourceOwner(_, _)
            | GearShareError::PermissionDenied(_, _)
            | GearShareError::OwnerCannotBeRemoved
            | GearShareError::ResourceNotVisible(_, _) => StatusCode::FORBIDDEN,

            GearShareError::UserNotFound(_)
            | GearShareError::ResourceNotFound(_)
            | GearShareError::GroupNotFound(_)
            | GearShareError::RequestNotFound(_)
            | GearShareError::LoanNotFound(_)
            | GearShareError::InviteeNotRegistered(_) => StatusCode::NOT_FOUND,

            GearShareError::EmailAlreadyRegistered(_)
            | GearShareError::AlreadyGroupMember(_)
            | GearShareError::OverlappingRequest(_)
            | GearShareError::WrongRequestState(_, _, _)
            | GearShareError::LoanNotActive(_)
            | GearShareError::ResourceOnLoan(_) => StatusCode::CONFLICT,

            GearShareError::InternalServerError(_)
            | GearShareError::StorageError(_)
            | GearShareError::LoggingError(_)
            | GearShareError::EventBusError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
