pub mod in_memory;

use crate::core::errors::GearShareError;
use crate::core::models::{
    audit::GroupAudit,
    borrow_request::{BorrowRequest, RequestStatus},
    group::Group,
    loan::Loan,
    resource::Resource,
    user::User,
};
use async_trait::async_trait;

#[async_trait]
pub trait Storage: Send + Sync {
    async fn save_user(&self, user: User) -> Result<(), GearShareError>;
    async fn get_user(&self, id: &str) -> Result<Option<User>, GearShareError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, GearShareError>;

    /// Insert or replace; groups are stored whole with embedded members.
    async fn save_group(&self, group: Group) -> Result<(), GearShareError>;
    async fn get_group(&self, id: &str) -> Result<Option<Group>, GearShareError>;
    async fn delete_group(&self, id: &str) -> Result<(), GearShareError>;
    async fn list_groups_for_user(&self, user_id: &str) -> Result<Vec<Group>, GearShareError>;

    async fn save_resource(&self, resource: Resource) -> Result<(), GearShareError>;
    async fn get_resource(&self, id: &str) -> Result<Option<Resource>, GearShareError>;
    async fn delete_resource(&self, id: &str) -> Result<(), GearShareError>;
    async fn list_resources_by_owner(&self, owner_id: &str) -> Result<Vec<Resource>, GearShareError>;

    /// Share operations are idempotent: adding an existing pair or removing
    /// a missing one is a no-op.
    async fn add_share(&self, resource_id: &str, group_id: &str) -> Result<(), GearShareError>;
    async fn remove_share(&self, resource_id: &str, group_id: &str) -> Result<(), GearShareError>;
    async fn share_exists(&self, resource_id: &str, group_id: &str) -> Result<bool, GearShareError>;
    async fn list_group_ids_for_resource(&self, resource_id: &str) -> Result<Vec<String>, GearShareError>;
    async fn list_resource_ids_for_group(&self, group_id: &str) -> Result<Vec<String>, GearShareError>;
    async fn remove_shares_for_resource(&self, resource_id: &str) -> Result<(), GearShareError>;
    async fn remove_shares_for_group(&self, group_id: &str) -> Result<(), GearShareError>;

    async fn save_request(&self, request: BorrowRequest) -> Result<(), GearShareError>;
    async fn get_request(&self, id: &str) -> Result<Option<BorrowRequest>, GearShareError>;
    async fn delete_request(&self, id: &str) -> Result<(), GearShareError>;
    async fn list_requests_by_borrower(&self, user_id: &str) -> Result<Vec<BorrowRequest>, GearShareError>;
    async fn list_requests_by_owner(&self, user_id: &str) -> Result<Vec<BorrowRequest>, GearShareError>;
    async fn list_requests_by_resource(&self, resource_id: &str) -> Result<Vec<BorrowRequest>, GearShareError>;
    async fn list_requests_by_group(&self, group_id: &str) -> Result<Vec<BorrowRequest>, GearShareError>;

    /// Compare-and-swap on the request status, atomic with respect to other
    /// transitions of the same request. Returns the updated request, or
    /// `WrongRequestState` if the status no longer matches `expected`.
    async fn transition_request(
        &self,
        id: &str,
        expected: RequestStatus,
        next: RequestStatus,
    ) -> Result<BorrowRequest, GearShareError>;

    async fn save_loan(&self, loan: Loan) -> Result<(), GearShareError>;
    async fn get_loan_by_request(&self, request_id: &str) -> Result<Option<Loan>, GearShareError>;
    async fn active_loan_for_resource(&self, resource_id: &str) -> Result<Option<Loan>, GearShareError>;

    async fn save_group_audit(&self, audit: GroupAudit) -> Result<(), GearShareError>;
    async fn get_group_audits(&self, group_id: &str) -> Result<Vec<GroupAudit>, GearShareError>;
}
