//! Action names recorded in app logs and group audit trails.

pub const USER_REGISTERED: &str = "user_registered";
pub const GROUP_CREATED: &str = "group_created";
pub const GROUP_UPDATED: &str = "group_updated";
pub const GROUP_DELETED: &str = "group_deleted";
pub const MEMBER_INVITED: &str = "member_invited";
pub const MEMBER_REMOVED: &str = "member_removed";
pub const MEMBER_ROLE_CHANGED: &str = "member_role_changed";
pub const OWNERSHIP_TRANSFERRED: &str = "ownership_transferred";
pub const RESOURCE_CREATED: &str = "resource_created";
pub const RESOURCE_UPDATED: &str = "resource_updated";
pub const RESOURCE_DELETED: &str = "resource_deleted";
pub const RESOURCE_SHARED: &str = "resource_shared";
pub const RESOURCE_UNSHARED: &str = "resource_unshared";
pub const REQUEST_CREATED: &str = "borrow_request_created";
pub const REQUEST_UPDATED: &str = "borrow_request_updated";
pub const REQUEST_ACCEPTED: &str = "borrow_request_accepted";
pub const REQUEST_DECLINED: &str = "borrow_request_declined";
pub const REQUEST_CANCELLED: &str = "borrow_request_cancelled";
pub const REQUEST_DELETED: &str = "borrow_request_deleted";
pub const LOAN_RETURNED: &str = "loan_returned";
