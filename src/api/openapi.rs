use utoipa::OpenApi;

use crate::{
    api::models::{
        CreateBorrowRequestRequest, CreateGroupRequest, CreateResourceRequest, DeleteBorrowRequestRequest,
        DeleteGroupRequest, DeleteResourceRequest, ErrorResponse, InviteMemberRequest, LoginRequest, LoginResponse,
        RegisterUserRequest, RemoveMemberRequest, RequestActionRequest, SetMemberRoleRequest, ShareResourceRequest,
        TransferOwnershipRequest, UnshareResourceRequest, UpdateBorrowRequestRequest, UpdateGroupRequest,
        UpdateResourceRequest,
    },
    core::models::{
        audit::{AppLog, GroupAudit},
        borrow_request::BorrowRequest,
        group::{Group, GroupPermissions},
        loan::Loan,
        resource::Resource,
        user::User,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::login,
        super::handlers::register_user,
        super::handlers::get_user,
        super::handlers::list_resources,
        super::handlers::create_resource,
        super::handlers::get_resource,
        super::handlers::update_resource,
        super::handlers::delete_resource,
        super::handlers::list_resource_groups,
        super::handlers::share_resource,
        super::handlers::unshare_resource,
        super::handlers::list_groups,
        super::handlers::create_group,
        super::handlers::get_group,
        super::handlers::update_group,
        super::handlers::delete_group,
        super::handlers::invite_member,
        super::handlers::remove_member,
        super::handlers::set_member_role,
        super::handlers::transfer_ownership,
        super::handlers::list_group_resources,
        super::handlers::get_group_permissions,
        super::handlers::list_borrow_requests,
        super::handlers::create_borrow_request,
        super::handlers::get_borrow_request,
        super::handlers::update_borrow_request,
        super::handlers::delete_borrow_request,
        super::handlers::accept_borrow_request,
        super::handlers::decline_borrow_request,
        super::handlers::cancel_borrow_request,
        super::handlers::mark_returned,
        super::handlers::get_loan,
        super::handlers::get_app_logs,
        super::handlers::get_group_audits
    ),
    components(schemas(
        RegisterUserRequest,
        LoginRequest,
        LoginResponse,
        CreateResourceRequest,
        UpdateResourceRequest,
        DeleteResourceRequest,
        CreateGroupRequest,
        UpdateGroupRequest,
        DeleteGroupRequest,
        InviteMemberRequest,
        RemoveMemberRequest,
        SetMemberRoleRequest,
        TransferOwnershipRequest,
        ShareResourceRequest,
        UnshareResourceRequest,
        CreateBorrowRequestRequest,
        UpdateBorrowRequestRequest,
        DeleteBorrowRequestRequest,
        RequestActionRequest,
        ErrorResponse,
        User,
        Resource,
        Group,
        GroupPermissions,
        BorrowRequest,
        Loan,
        AppLog,
        GroupAudit
    )),
    info(
        title = "GearShare API",
        description = "API for lending gear within trust groups",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
