use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

#[derive(Error, Debug, Serialize)]
pub enum GearShareError {
    /// Email field is empty
    #[error("Email is required")]
    MissingEmail,

    /// Email format is invalid
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    /// Email is already registered
    #[error("Email {0} already registered")]
    EmailAlreadyRegistered(String),

    /// Login failed
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Bearer token missing, malformed or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User with given ID not found
    #[error("User {0} not found")]
    UserNotFound(String),

    /// Resource with given ID not found
    #[error("Resource {0} not found")]
    ResourceNotFound(String),

    /// Group with given ID not found
    #[error("Group {0} not found")]
    GroupNotFound(String),

    /// Borrow request with given ID not found
    #[error("Borrow request {0} not found")]
    RequestNotFound(String),

    /// No loan exists for the given borrow request
    #[error("No loan found for borrow request {0}")]
    LoanNotFound(String),

    /// No registered user with the invited email
    #[error("No registered user with email {0}")]
    InviteeNotRegistered(String),

    /// User is already a member of the group
    #[error("User {0} is already a group member")]
    AlreadyGroupMember(String),

    /// User is not a member of the group
    #[error("User {0} is not a group member")]
    NotGroupMember(String),

    /// User is not the resource owner
    #[error("User {0} does not own resource {1}")]
    NotResourceOwner(String, String),

    /// Caller's role does not grant the attempted group action
    #[error("User {0} lacks permission to {1}")]
    PermissionDenied(String, String),

    /// Group owner cannot be removed or remove themselves
    #[error("Group owner cannot be removed")]
    OwnerCannotBeRemoved,

    /// Owners cannot borrow their own gear
    #[error("Cannot request to borrow your own resource")]
    SelfBorrow,

    /// Resource is not visible to the requesting user
    #[error("Resource {0} is not shared with user {1}")]
    ResourceNotVisible(String, String),

    /// Borrow window fails the date rules
    #[error("Invalid borrow window: {0}")]
    InvalidDateRange(String),

    /// Borrower already has an open request covering these dates
    #[error("An open request for resource {0} already covers this window")]
    OverlappingRequest(String),

    /// Request is not in the state the transition requires
    #[error("Borrow request {0} is {1}, expected {2}")]
    WrongRequestState(String, String, String),

    /// Loan is not active
    #[error("Loan for borrow request {0} is not active")]
    LoanNotActive(String),

    /// Resource already has an active loan
    #[error("Resource {0} is currently on loan")]
    ResourceOnLoan(String),

    /// Generic input validation error with detailed field information
    #[error("Invalid input for field `{0}`: {1:?}")]
    InvalidInput(String, FieldError),

    /// Internal server error (e.g., unexpected failure)
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Logging error: {0}")]
    LoggingError(String),

    #[error("Event bus error: {0}")]
    EventBusError(String),
}
