use crate::{
    api::models::*,
    core::{
        errors::GearShareError,
        models::{
            audit::{AppLog, GroupAudit},
            borrow_request::BorrowRequest,
            group::{Group, GroupPermissions},
            loan::Loan,
            resource::Resource,
            user::User,
        },
        services::GearShareService,
    },
    infrastructure::{
        events::in_memory::InMemoryEventBus, logging::in_memory::InMemoryLogging, storage::in_memory::InMemoryStorage,
    },
};
use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::IntoResponse,
};
use http::header;

use std::sync::Arc;

type AppService = GearShareService<InMemoryLogging, InMemoryStorage, InMemoryEventBus>;

// Middleware to validate JWT
async fn auth_middleware(
    State(service): State<Arc<AppService>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| GearShareError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| GearShareError::Unauthorized("Invalid Authorization header".to_string()))?;

    let claims = service.validate_token(token)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

// Define API routes
pub fn api_routes(service: Arc<AppService>) -> Router {
    let protected_routes = Router::new()
        .route("/users/{user_id}", axum::routing::get(get_user))
        .route(
            "/resources",
            axum::routing::get(list_resources).post(create_resource),
        )
        .route(
            "/resources/{resource_id}",
            axum::routing::get(get_resource)
                .put(update_resource)
                .delete(delete_resource),
        )
        .route(
            "/resources/{resource_id}/groups",
            axum::routing::get(list_resource_groups),
        )
        .route(
            "/resources/{resource_id}/groups/{group_id}",
            axum::routing::post(share_resource).delete(unshare_resource),
        )
        .route("/groups", axum::routing::get(list_groups).post(create_group))
        .route(
            "/groups/{group_id}",
            axum::routing::get(get_group).put(update_group).delete(delete_group),
        )
        .route("/groups/{group_id}/invite", axum::routing::post(invite_member))
        .route("/groups/{group_id}/members/remove", axum::routing::post(remove_member))
        .route("/groups/{group_id}/members/role", axum::routing::post(set_member_role))
        .route("/groups/{group_id}/ownership", axum::routing::post(transfer_ownership))
        .route("/groups/{group_id}/resources", axum::routing::get(list_group_resources))
        .route(
            "/groups/{group_id}/permissions",
            axum::routing::get(get_group_permissions),
        )
        .route(
            "/borrow-requests",
            axum::routing::get(list_borrow_requests).post(create_borrow_request),
        )
        .route(
            "/borrow-requests/{request_id}",
            axum::routing::get(get_borrow_request)
                .put(update_borrow_request)
                .delete(delete_borrow_request),
        )
        .route(
            "/borrow-requests/{request_id}/accept",
            axum::routing::post(accept_borrow_request),
        )
        .route(
            "/borrow-requests/{request_id}/decline",
            axum::routing::post(decline_borrow_request),
        )
        .route(
            "/borrow-requests/{request_id}/cancel",
            axum::routing::post(cancel_borrow_request),
        )
        .route(
            "/borrow-requests/{request_id}/mark-returned",
            axum::routing::post(mark_returned),
        )
        .route("/borrow-requests/{request_id}/loan", axum::routing::get(get_loan))
        .route("/logs", axum::routing::get(get_app_logs))
        .route("/groups/{group_id}/audits", axum::routing::get(get_group_audits))
        .route_layer(middleware::from_fn_with_state(service.clone(), auth_middleware));

    Router::new()
        .route("/login", axum::routing::post(login))
        .route("/users", axum::routing::post(register_user)) // Unprotected
        .merge(protected_routes)
        .with_state(service)
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn login(
    State(service): State<Arc<AppService>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let token = service.authenticate(&req.email, &req.password).await?;
    Ok(Json(LoginResponse { token }))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered", body = User),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub async fn register_user(
    State(service): State<Arc<AppService>>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = service.register(req.id, req.name, req.email, req.password).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    params(("user_id" = String, Path, description = "ID of the user to retrieve")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_user(
    State(service): State<Arc<AppService>>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user = service
        .get_user(&user_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(user_id))?;
    Ok(Json(user))
}

#[utoipa::path(
    get,
    path = "/api/resources",
    params(UserIdQuery),
    responses(
        (status = 200, description = "Resources visible to the user", body = [Resource]),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn list_resources(
    State(service): State<Arc<AppService>>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<Vec<Resource>>, ApiError> {
    let user = service
        .get_user(&query.user_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(query.user_id))?;
    let resources = service.list_visible_resources(&user).await?;
    Ok(Json(resources))
}

#[utoipa::path(
    post,
    path = "/api/resources",
    request_body = CreateResourceRequest,
    responses(
        (status = 200, description = "Resource created", body = Resource),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "Owner not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn create_resource(
    State(service): State<Arc<AppService>>,
    Json(req): Json<CreateResourceRequest>,
) -> Result<Json<Resource>, ApiError> {
    let owner = service
        .get_user(&req.owner_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(req.owner_id))?;
    let resource = service
        .create_resource(&owner, req.title, req.description, req.image_url)
        .await?;
    Ok(Json(resource))
}

#[utoipa::path(
    get,
    path = "/api/resources/{resource_id}",
    params(("resource_id" = String, Path, description = "ID of the resource")),
    responses(
        (status = 200, description = "Resource found", body = Resource),
        (status = 404, description = "Resource not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_resource(
    State(service): State<Arc<AppService>>,
    Path(resource_id): Path<String>,
) -> Result<Json<Resource>, ApiError> {
    let resource = service
        .get_resource(&resource_id)
        .await?
        .ok_or_else(|| GearShareError::ResourceNotFound(resource_id))?;
    Ok(Json(resource))
}

#[utoipa::path(
    put,
    path = "/api/resources/{resource_id}",
    params(("resource_id" = String, Path, description = "ID of the resource")),
    request_body = UpdateResourceRequest,
    responses(
        (status = 200, description = "Resource updated", body = Resource),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Resource not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn update_resource(
    State(service): State<Arc<AppService>>,
    Path(resource_id): Path<String>,
    Json(req): Json<UpdateResourceRequest>,
) -> Result<Json<Resource>, ApiError> {
    let acting = service
        .get_user(&req.updated_by_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(req.updated_by_id))?;
    let resource = service
        .update_resource(&resource_id, &acting, req.title, req.description, req.image_url)
        .await?;
    Ok(Json(resource))
}

#[utoipa::path(
    delete,
    path = "/api/resources/{resource_id}",
    params(("resource_id" = String, Path, description = "ID of the resource")),
    request_body = DeleteResourceRequest,
    responses(
        (status = 200, description = "Resource deleted"),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 409, description = "Resource on active loan", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn delete_resource(
    State(service): State<Arc<AppService>>,
    Path(resource_id): Path<String>,
    Json(req): Json<DeleteResourceRequest>,
) -> Result<StatusCode, ApiError> {
    let acting = service
        .get_user(&req.deleted_by_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(req.deleted_by_id))?;
    service.delete_resource(&resource_id, &acting).await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/api/resources/{resource_id}/groups",
    params(
        ("resource_id" = String, Path, description = "ID of the resource"),
        UserIdQuery
    ),
    responses(
        (status = 200, description = "Groups the resource is shared with", body = [Group]),
        (status = 403, description = "Not the owner", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn list_resource_groups(
    State(service): State<Arc<AppService>>,
    Path(resource_id): Path<String>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<Vec<Group>>, ApiError> {
    let acting = service
        .get_user(&query.user_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(query.user_id))?;
    let groups = service.list_groups_for_resource(&resource_id, &acting).await?;
    Ok(Json(groups))
}

#[utoipa::path(
    post,
    path = "/api/resources/{resource_id}/groups/{group_id}",
    params(
        ("resource_id" = String, Path, description = "ID of the resource"),
        ("group_id" = String, Path, description = "ID of the group")
    ),
    request_body = ShareResourceRequest,
    responses(
        (status = 200, description = "Resource shared (idempotent)"),
        (status = 403, description = "Not the owner or not a group member", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn share_resource(
    State(service): State<Arc<AppService>>,
    Path((resource_id, group_id)): Path<(String, String)>,
    Json(req): Json<ShareResourceRequest>,
) -> Result<StatusCode, ApiError> {
    let acting = service
        .get_user(&req.shared_by_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(req.shared_by_id))?;
    service.share_resource(&resource_id, &acting, &group_id).await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    delete,
    path = "/api/resources/{resource_id}/groups/{group_id}",
    params(
        ("resource_id" = String, Path, description = "ID of the resource"),
        ("group_id" = String, Path, description = "ID of the group")
    ),
    request_body = UnshareResourceRequest,
    responses(
        (status = 200, description = "Resource unshared (idempotent)"),
        (status = 403, description = "Not the owner", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn unshare_resource(
    State(service): State<Arc<AppService>>,
    Path((resource_id, group_id)): Path<(String, String)>,
    Json(req): Json<UnshareResourceRequest>,
) -> Result<StatusCode, ApiError> {
    let acting = service
        .get_user(&req.unshared_by_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(req.unshared_by_id))?;
    service.unshare_resource(&resource_id, &acting, &group_id).await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/api/groups",
    params(UserIdQuery),
    responses(
        (status = 200, description = "Groups the user belongs to", body = [Group])
    ),
    security(("Bearer" = []))
)]
pub async fn list_groups(
    State(service): State<Arc<AppService>>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<Vec<Group>>, ApiError> {
    let groups = service.list_groups_for_user(&query.user_id).await?;
    Ok(Json(groups))
}

#[utoipa::path(
    post,
    path = "/api/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 200, description = "Group created", body = Group),
        (status = 404, description = "Creator not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn create_group(
    State(service): State<Arc<AppService>>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<Json<Group>, ApiError> {
    let creator = service
        .get_user(&req.created_by_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(req.created_by_id))?;
    let group = service
        .create_group(&creator, req.name, req.description, req.avatar_url)
        .await?;
    Ok(Json(group))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}",
    params(("group_id" = String, Path, description = "ID of the group")),
    responses(
        (status = 200, description = "Group found", body = Group),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_group(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<Group>, ApiError> {
    let group = service
        .get_group(&group_id)
        .await?
        .ok_or_else(|| GearShareError::GroupNotFound(group_id))?;
    Ok(Json(group))
}

#[utoipa::path(
    put,
    path = "/api/groups/{group_id}",
    params(("group_id" = String, Path, description = "ID of the group")),
    request_body = UpdateGroupRequest,
    responses(
        (status = 200, description = "Group updated", body = Group),
        (status = 403, description = "Caller cannot edit the group", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn update_group(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    Json(req): Json<UpdateGroupRequest>,
) -> Result<Json<Group>, ApiError> {
    let acting = service
        .get_user(&req.updated_by_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(req.updated_by_id))?;
    let group = service
        .update_group(&group_id, &acting, req.name, req.description, req.avatar_url)
        .await?;
    Ok(Json(group))
}

#[utoipa::path(
    delete,
    path = "/api/groups/{group_id}",
    params(("group_id" = String, Path, description = "ID of the group")),
    request_body = DeleteGroupRequest,
    responses(
        (status = 200, description = "Group deleted"),
        (status = 403, description = "Only the owner can delete", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn delete_group(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    Json(req): Json<DeleteGroupRequest>,
) -> Result<StatusCode, ApiError> {
    let acting = service
        .get_user(&req.deleted_by_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(req.deleted_by_id))?;
    service.delete_group(&group_id, &acting).await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/invite",
    params(("group_id" = String, Path, description = "ID of the group")),
    request_body = InviteMemberRequest,
    responses(
        (status = 200, description = "Member invited", body = Group),
        (status = 403, description = "Caller cannot invite", body = ErrorResponse),
        (status = 404, description = "No registered user with that email", body = ErrorResponse),
        (status = 409, description = "Already a member", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn invite_member(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    Json(req): Json<InviteMemberRequest>,
) -> Result<Json<Group>, ApiError> {
    let acting = service
        .get_user(&req.invited_by_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(req.invited_by_id))?;
    let group = service.invite_member(&group_id, &acting, &req.email).await?;
    Ok(Json(group))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/members/remove",
    params(("group_id" = String, Path, description = "ID of the group")),
    request_body = RemoveMemberRequest,
    responses(
        (status = 200, description = "Member removed", body = Group),
        (status = 403, description = "Caller cannot remove members", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn remove_member(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    Json(req): Json<RemoveMemberRequest>,
) -> Result<Json<Group>, ApiError> {
    let acting = service
        .get_user(&req.removed_by_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(req.removed_by_id))?;
    let group = service.remove_member(&group_id, &acting, &req.user_id).await?;
    Ok(Json(group))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/members/role",
    params(("group_id" = String, Path, description = "ID of the group")),
    request_body = SetMemberRoleRequest,
    responses(
        (status = 200, description = "Role changed", body = Group),
        (status = 403, description = "Only the owner can change roles", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn set_member_role(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    Json(req): Json<SetMemberRoleRequest>,
) -> Result<Json<Group>, ApiError> {
    let acting = service
        .get_user(&req.changed_by_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(req.changed_by_id))?;
    let group = service.set_member_role(&group_id, &acting, &req.user_id, req.role).await?;
    Ok(Json(group))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/ownership",
    params(("group_id" = String, Path, description = "ID of the group")),
    request_body = TransferOwnershipRequest,
    responses(
        (status = 200, description = "Ownership transferred", body = Group),
        (status = 403, description = "Only the owner can transfer", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn transfer_ownership(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    Json(req): Json<TransferOwnershipRequest>,
) -> Result<Json<Group>, ApiError> {
    let acting = service
        .get_user(&req.transferred_by_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(req.transferred_by_id))?;
    let group = service.transfer_ownership(&group_id, &acting, &req.new_owner_id).await?;
    Ok(Json(group))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/resources",
    params(
        ("group_id" = String, Path, description = "ID of the group"),
        UserIdQuery
    ),
    responses(
        (status = 200, description = "Resources shared with the group", body = [Resource]),
        (status = 403, description = "Not a group member", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn list_group_resources(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<Vec<Resource>>, ApiError> {
    let acting = service
        .get_user(&query.user_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(query.user_id))?;
    let resources = service.list_resources_for_group(&group_id, &acting).await?;
    Ok(Json(resources))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/permissions",
    params(
        ("group_id" = String, Path, description = "ID of the group"),
        UserIdQuery
    ),
    responses(
        (status = 200, description = "Caller's capabilities in the group", body = GroupPermissions),
        (status = 403, description = "Not a group member", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_group_permissions(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<GroupPermissions>, ApiError> {
    let permissions = service.permissions_for(&group_id, &query.user_id).await?;
    Ok(Json(permissions))
}

#[utoipa::path(
    get,
    path = "/api/borrow-requests",
    params(ListRequestsQuery),
    responses(
        (status = 200, description = "Borrow requests for the user", body = [BorrowRequest])
    ),
    security(("Bearer" = []))
)]
pub async fn list_borrow_requests(
    State(service): State<Arc<AppService>>,
    Query(query): Query<ListRequestsQuery>,
) -> Result<Json<Vec<BorrowRequest>>, ApiError> {
    let requests = match query.role.as_deref() {
        Some("owner") => service.list_requests_for_owner(&query.user_id).await?,
        _ => service.list_requests_for_borrower(&query.user_id).await?,
    };
    Ok(Json(requests))
}

#[utoipa::path(
    post,
    path = "/api/borrow-requests",
    request_body = CreateBorrowRequestRequest,
    responses(
        (status = 200, description = "Borrow request created", body = BorrowRequest),
        (status = 400, description = "Invalid dates or self-borrow", body = ErrorResponse),
        (status = 403, description = "Resource not visible to borrower", body = ErrorResponse),
        (status = 409, description = "Overlapping open request", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn create_borrow_request(
    State(service): State<Arc<AppService>>,
    Json(req): Json<CreateBorrowRequestRequest>,
) -> Result<Json<BorrowRequest>, ApiError> {
    let borrower = service
        .get_user(&req.borrower_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(req.borrower_id))?;
    let request = service
        .create_request(
            &req.resource_id,
            &borrower,
            req.start_date,
            req.end_date,
            req.message,
            req.group_id,
        )
        .await?;
    Ok(Json(request))
}

#[utoipa::path(
    get,
    path = "/api/borrow-requests/{request_id}",
    params(("request_id" = String, Path, description = "ID of the borrow request")),
    responses(
        (status = 200, description = "Borrow request found", body = BorrowRequest),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_borrow_request(
    State(service): State<Arc<AppService>>,
    Path(request_id): Path<String>,
) -> Result<Json<BorrowRequest>, ApiError> {
    let request = service
        .get_request(&request_id)
        .await?
        .ok_or_else(|| GearShareError::RequestNotFound(request_id))?;
    Ok(Json(request))
}

#[utoipa::path(
    put,
    path = "/api/borrow-requests/{request_id}",
    params(("request_id" = String, Path, description = "ID of the borrow request")),
    request_body = UpdateBorrowRequestRequest,
    responses(
        (status = 200, description = "Borrow request updated", body = BorrowRequest),
        (status = 403, description = "Only the borrower may edit", body = ErrorResponse),
        (status = 409, description = "Request is not pending", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn update_borrow_request(
    State(service): State<Arc<AppService>>,
    Path(request_id): Path<String>,
    Json(req): Json<UpdateBorrowRequestRequest>,
) -> Result<Json<BorrowRequest>, ApiError> {
    let acting = service
        .get_user(&req.updated_by_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(req.updated_by_id))?;
    let request = service
        .update_request(&request_id, &acting, req.start_date, req.end_date, req.message)
        .await?;
    Ok(Json(request))
}

#[utoipa::path(
    delete,
    path = "/api/borrow-requests/{request_id}",
    params(("request_id" = String, Path, description = "ID of the borrow request")),
    request_body = DeleteBorrowRequestRequest,
    responses(
        (status = 200, description = "Borrow request deleted"),
        (status = 409, description = "Request still pending or approved", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn delete_borrow_request(
    State(service): State<Arc<AppService>>,
    Path(request_id): Path<String>,
    Json(req): Json<DeleteBorrowRequestRequest>,
) -> Result<StatusCode, ApiError> {
    let acting = service
        .get_user(&req.deleted_by_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(req.deleted_by_id))?;
    service.delete_request(&request_id, &acting).await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/api/borrow-requests/{request_id}/accept",
    params(("request_id" = String, Path, description = "ID of the borrow request")),
    request_body = RequestActionRequest,
    responses(
        (status = 200, description = "Request approved, loan created", body = Loan),
        (status = 403, description = "Only the owner may accept", body = ErrorResponse),
        (status = 409, description = "Request not pending or resource on loan", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn accept_borrow_request(
    State(service): State<Arc<AppService>>,
    Path(request_id): Path<String>,
    Json(req): Json<RequestActionRequest>,
) -> Result<Json<Loan>, ApiError> {
    let acting = service
        .get_user(&req.acting_user_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(req.acting_user_id))?;
    let (_, loan) = service.accept_request(&request_id, &acting).await?;
    Ok(Json(loan))
}

#[utoipa::path(
    post,
    path = "/api/borrow-requests/{request_id}/decline",
    params(("request_id" = String, Path, description = "ID of the borrow request")),
    request_body = RequestActionRequest,
    responses(
        (status = 200, description = "Request declined", body = BorrowRequest),
        (status = 403, description = "Only the owner may decline", body = ErrorResponse),
        (status = 409, description = "Request not pending", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn decline_borrow_request(
    State(service): State<Arc<AppService>>,
    Path(request_id): Path<String>,
    Json(req): Json<RequestActionRequest>,
) -> Result<Json<BorrowRequest>, ApiError> {
    let acting = service
        .get_user(&req.acting_user_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(req.acting_user_id))?;
    let request = service.decline_request(&request_id, &acting).await?;
    Ok(Json(request))
}

#[utoipa::path(
    post,
    path = "/api/borrow-requests/{request_id}/cancel",
    params(("request_id" = String, Path, description = "ID of the borrow request")),
    request_body = RequestActionRequest,
    responses(
        (status = 200, description = "Request cancelled", body = BorrowRequest),
        (status = 403, description = "Only the borrower may cancel", body = ErrorResponse),
        (status = 409, description = "Request not pending", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn cancel_borrow_request(
    State(service): State<Arc<AppService>>,
    Path(request_id): Path<String>,
    Json(req): Json<RequestActionRequest>,
) -> Result<Json<BorrowRequest>, ApiError> {
    let acting = service
        .get_user(&req.acting_user_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(req.acting_user_id))?;
    let request = service.cancel_request(&request_id, &acting).await?;
    Ok(Json(request))
}

#[utoipa::path(
    post,
    path = "/api/borrow-requests/{request_id}/mark-returned",
    params(("request_id" = String, Path, description = "ID of the borrow request")),
    request_body = RequestActionRequest,
    responses(
        (status = 200, description = "Loan marked returned", body = Loan),
        (status = 403, description = "Only the owner may mark returned", body = ErrorResponse),
        (status = 409, description = "Loan not active", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn mark_returned(
    State(service): State<Arc<AppService>>,
    Path(request_id): Path<String>,
    Json(req): Json<RequestActionRequest>,
) -> Result<Json<Loan>, ApiError> {
    let acting = service
        .get_user(&req.acting_user_id)
        .await?
        .ok_or_else(|| GearShareError::UserNotFound(req.acting_user_id))?;
    let loan = service.mark_returned(&request_id, &acting).await?;
    Ok(Json(loan))
}

#[utoipa::path(
    get,
    path = "/api/borrow-requests/{request_id}/loan",
    params(("request_id" = String, Path, description = "ID of the borrow request")),
    responses(
        (status = 200, description = "Loan for the request", body = Loan),
        (status = 404, description = "No loan for this request", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_loan(
    State(service): State<Arc<AppService>>,
    Path(request_id): Path<String>,
) -> Result<Json<Loan>, ApiError> {
    let loan = service
        .get_loan_for_request(&request_id)
        .await?
        .ok_or_else(|| GearShareError::LoanNotFound(request_id))?;
    Ok(Json(loan))
}

#[utoipa::path(
    get,
    path = "/api/logs",
    responses(
        (status = 200, description = "Application action logs", body = [AppLog])
    ),
    security(("Bearer" = []))
)]
pub async fn get_app_logs(State(service): State<Arc<AppService>>) -> Result<Json<Vec<AppLog>>, ApiError> {
    let logs = service.get_app_logs().await?;
    Ok(Json(logs))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/audits",
    params(("group_id" = String, Path, description = "ID of the group")),
    responses(
        (status = 200, description = "Audit trail for the group", body = [GroupAudit])
    ),
    security(("Bearer" = []))
)]
pub async fn get_group_audits(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<GroupAudit>>, ApiError> {
    let audits = service.get_group_audits(&group_id).await?;
    Ok(Json(audits))
}
