use crate::auth::jwt::{Claims, JwtService};
use crate::constants::{
    GROUP_CREATED, GROUP_DELETED, GROUP_UPDATED, LOAN_RETURNED, MEMBER_INVITED, MEMBER_REMOVED, MEMBER_ROLE_CHANGED,
    OWNERSHIP_TRANSFERRED, REQUEST_ACCEPTED, REQUEST_CANCELLED, REQUEST_CREATED, REQUEST_DECLINED, REQUEST_DELETED,
    REQUEST_UPDATED, RESOURCE_CREATED, RESOURCE_DELETED, RESOURCE_SHARED, RESOURCE_UNSHARED, RESOURCE_UPDATED,
    USER_REGISTERED,
};
use crate::core::errors::{FieldError, GearShareError};
use crate::core::models::{
    audit::{AppLog, GroupAudit},
    borrow_request::{BorrowRequest, RequestStatus},
    group::{Group, GroupMember, GroupPermissions, Role},
    loan::{Loan, LoanStatus},
    resource::Resource,
    user::User,
};
use crate::infrastructure::events::{DomainEvent, EventBus, EventStream};
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::Storage;
use chrono::{NaiveDate, Utc};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

pub struct GearShareService<L: LoggingService, S: Storage, E: EventBus> {
    storage: S,
    logging: L,
    events: E,
    jwt_service: JwtService,
}

impl<L: LoggingService, S: Storage, E: EventBus> GearShareService<L, S, E> {
    pub fn new(storage: S, logging: L, events: E, jwt_secret: String) -> Self {
        GearShareService {
            storage,
            logging,
            events,
            jwt_service: JwtService::new(jwt_secret),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, GearShareError> {
        self.jwt_service.validate_token(token)
    }

    /// Subscribe to the domain event stream.
    pub async fn subscribe(&self) -> Result<EventStream, GearShareError> {
        self.events.subscribe().await
    }

    async fn log_and_audit(
        &self,
        group_id: Option<&str>,
        action: &str,
        log_details: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<(), GearShareError> {
        self.logging.log_action(action, log_details.clone(), user_id).await?;
        if let Some(gid) = group_id {
            self.storage
                .save_group_audit(GroupAudit {
                    id: Uuid::new_v4().to_string(),
                    group_id: gid.to_string(),
                    action: action.to_string(),
                    user_id: user_id.map(String::from),
                    details: serde_json::from_value(log_details).unwrap_or_default(),
                    timestamp: Utc::now(),
                })
                .await?;
        }
        Ok(())
    }

    fn validate_string_input(&self, field: &str, value: &str, max_length: usize) -> Result<(), GearShareError> {
        if value.trim().is_empty() {
            return Err(GearShareError::InvalidInput(
                field.to_string(),
                FieldError {
                    field: field.to_string(),
                    title: format!("Invalid {}", field),
                    description: format!("{} cannot be empty", field),
                },
            ));
        }
        if value.len() > max_length {
            return Err(GearShareError::InvalidInput(
                field.to_string(),
                FieldError {
                    field: field.to_string(),
                    title: format!("{} Too Long", field),
                    description: format!("{} cannot exceed {} characters", field, max_length),
                },
            ));
        }
        if value.chars().any(|c| c.is_control() || "<>{}[]".contains(c)) {
            return Err(GearShareError::InvalidInput(
                field.to_string(),
                FieldError {
                    field: field.to_string(),
                    title: format!("Invalid {}", field),
                    description: format!("{} contains invalid characters", field),
                },
            ));
        }
        Ok(())
    }

    /// Server-side borrow window rules: start no earlier than today,
    /// end strictly after start.
    fn validate_window(&self, start: NaiveDate, end: NaiveDate) -> Result<(), GearShareError> {
        let today = Utc::now().date_naive();
        if start < today {
            return Err(GearShareError::InvalidDateRange(
                "start date cannot be in the past".to_string(),
            ));
        }
        if end <= start {
            return Err(GearShareError::InvalidDateRange(
                "end date must be after start date".to_string(),
            ));
        }
        Ok(())
    }

    async fn require_group_role(&self, group_id: &str, user_id: &str) -> Result<(Group, Role), GearShareError> {
        let group = self
            .storage
            .get_group(group_id)
            .await?
            .ok_or_else(|| GearShareError::GroupNotFound(group_id.to_string()))?;
        let role = group
            .role_of(user_id)
            .ok_or_else(|| GearShareError::NotGroupMember(user_id.to_string()))?;
        Ok((group, role))
    }

    async fn require_resource_owner(&self, resource_id: &str, user: &User) -> Result<Resource, GearShareError> {
        let resource = self
            .storage
            .get_resource(resource_id)
            .await?
            .ok_or_else(|| GearShareError::ResourceNotFound(resource_id.to_string()))?;
        if resource.owner_id != user.id {
            warn!(user_id = %user.id, resource_id, "non-owner attempted owner-only resource action");
            return Err(GearShareError::NotResourceOwner(
                user.id.clone(),
                resource_id.to_string(),
            ));
        }
        Ok(resource)
    }

    /// Owners always see their own gear; anyone else needs co-membership in
    /// a group the resource is shared to.
    async fn resource_visible_to(&self, resource: &Resource, user_id: &str) -> Result<bool, GearShareError> {
        if resource.owner_id == user_id {
            return Ok(true);
        }
        for group_id in self.storage.list_group_ids_for_resource(&resource.id).await? {
            if let Some(group) = self.storage.get_group(&group_id).await? {
                if group.role_of(user_id).is_some() {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    // USERS & IDENTITY

    pub async fn register(
        &self,
        id: Option<String>,
        name: String,
        email: String,
        password: String,
    ) -> Result<User, GearShareError> {
        if email.is_empty() {
            return Err(GearShareError::MissingEmail);
        }
        if !email.contains('@') || !email.contains('.') || email.len() < 5 {
            return Err(GearShareError::InvalidEmail(email));
        }
        if password.is_empty() {
            return Err(GearShareError::InvalidInput(
                "password".to_string(),
                FieldError {
                    field: "password".to_string(),
                    title: "Invalid password".to_string(),
                    description: "Password cannot be empty".to_string(),
                },
            ));
        }
        self.validate_string_input("name", &name, 100)?;

        let hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)
            .map_err(|e| GearShareError::InternalServerError(format!("Password hashing error: {}", e)))?;
        let user = User {
            id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name,
            email,
            password: hash,
            created_at: Utc::now(),
        };
        self.storage.save_user(user.clone()).await?;
        info!(user_id = %user.id, "user registered");

        self.log_and_audit(
            None,
            USER_REGISTERED,
            json!({ "user_id": user.id, "email": user.email }),
            Some(&user.id),
        )
        .await?;
        self.events
            .publish(DomainEvent::UserRegistered {
                user_id: user.id.clone(),
            })
            .await?;
        Ok(user)
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<String, GearShareError> {
        let user = self
            .storage
            .get_user_by_email(email)
            .await?
            .ok_or(GearShareError::InvalidCredentials)?;

        if bcrypt::verify(password, &user.password)
            .map_err(|e| GearShareError::InternalServerError(format!("Password verification error: {}", e)))?
        {
            self.jwt_service.generate_token(&user.id)
        } else {
            Err(GearShareError::InvalidCredentials)
        }
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, GearShareError> {
        self.storage.get_user(user_id).await
    }

    // RESOURCES

    pub async fn create_resource(
        &self,
        owner: &User,
        title: String,
        description: String,
        image_url: Option<String>,
    ) -> Result<Resource, GearShareError> {
        self.validate_string_input("title", &title, 100)?;
        self.validate_string_input("description", &description, 2000)?;

        let now = Utc::now();
        let resource = Resource {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            image_url,
            owner_id: owner.id.clone(),
            created_at: now,
            updated_at: now,
        };
        self.storage.save_resource(resource.clone()).await?;
        info!(resource_id = %resource.id, owner_id = %owner.id, "resource created");

        self.log_and_audit(
            None,
            RESOURCE_CREATED,
            json!({ "resource_id": resource.id, "title": resource.title }),
            Some(&owner.id),
        )
        .await?;
        self.events
            .publish(DomainEvent::ResourceCreated {
                resource_id: resource.id.clone(),
                user_id: owner.id.clone(),
            })
            .await?;
        Ok(resource)
    }

    pub async fn update_resource(
        &self,
        resource_id: &str,
        acting: &User,
        new_title: Option<String>,
        new_description: Option<String>,
        new_image_url: Option<String>,
    ) -> Result<Resource, GearShareError> {
        let mut resource = self.require_resource_owner(resource_id, acting).await?;

        if let Some(title) = new_title {
            self.validate_string_input("title", &title, 100)?;
            resource.title = title;
        }
        if let Some(description) = new_description {
            self.validate_string_input("description", &description, 2000)?;
            resource.description = description;
        }
        if let Some(image_url) = new_image_url {
            resource.image_url = Some(image_url);
        }
        resource.updated_at = Utc::now();
        self.storage.save_resource(resource.clone()).await?;

        self.log_and_audit(
            None,
            RESOURCE_UPDATED,
            json!({ "resource_id": resource.id }),
            Some(&acting.id),
        )
        .await?;
        self.events
            .publish(DomainEvent::ResourceUpdated {
                resource_id: resource.id.clone(),
                user_id: acting.id.clone(),
            })
            .await?;
        Ok(resource)
    }

    /// Deleting gear detaches every group share and cancels open requests.
    /// Blocked while the gear is out on an active loan.
    pub async fn delete_resource(&self, resource_id: &str, acting: &User) -> Result<(), GearShareError> {
        let resource = self.require_resource_owner(resource_id, acting).await?;

        if self.storage.active_loan_for_resource(resource_id).await?.is_some() {
            warn!(resource_id, "attempted to delete resource with an active loan");
            return Err(GearShareError::ResourceOnLoan(resource_id.to_string()));
        }

        for request in self.storage.list_requests_by_resource(resource_id).await? {
            if request.status == RequestStatus::Pending {
                self.storage
                    .transition_request(&request.id, RequestStatus::Pending, RequestStatus::Cancelled)
                    .await?;
            }
        }
        self.storage.remove_shares_for_resource(resource_id).await?;
        self.storage.delete_resource(resource_id).await?;
        info!(resource_id, "resource deleted");

        self.log_and_audit(
            None,
            RESOURCE_DELETED,
            json!({ "resource_id": resource.id, "title": resource.title }),
            Some(&acting.id),
        )
        .await?;
        self.events
            .publish(DomainEvent::ResourceDeleted {
                resource_id: resource_id.to_string(),
                user_id: acting.id.clone(),
            })
            .await?;
        Ok(())
    }

    pub async fn get_resource(&self, resource_id: &str) -> Result<Option<Resource>, GearShareError> {
        self.storage.get_resource(resource_id).await
    }

    pub async fn list_owned_resources(&self, owner_id: &str) -> Result<Vec<Resource>, GearShareError> {
        self.storage.list_resources_by_owner(owner_id).await
    }

    /// Everything the user owns plus everything shared to a group they
    /// belong to, deduplicated.
    pub async fn list_visible_resources(&self, user: &User) -> Result<Vec<Resource>, GearShareError> {
        let mut resources = self.storage.list_resources_by_owner(&user.id).await?;
        let mut seen: std::collections::HashSet<String> = resources.iter().map(|r| r.id.clone()).collect();

        for group in self.storage.list_groups_for_user(&user.id).await? {
            for resource_id in self.storage.list_resource_ids_for_group(&group.id).await? {
                if seen.insert(resource_id.clone()) {
                    if let Some(resource) = self.storage.get_resource(&resource_id).await? {
                        resources.push(resource);
                    }
                }
            }
        }
        Ok(resources)
    }

    // GROUPS & MEMBERSHIP

    pub async fn create_group(
        &self,
        creator: &User,
        name: String,
        description: Option<String>,
        avatar_url: Option<String>,
    ) -> Result<Group, GearShareError> {
        self.validate_string_input("name", &name, 100)?;
        if let Some(ref description) = description {
            self.validate_string_input("description", description, 2000)?;
        }

        let now = Utc::now();
        let group = Group {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            avatar_url,
            created_by_id: creator.id.clone(),
            members: vec![GroupMember {
                user: creator.clone(),
                role: Role::Owner,
                joined_at: now,
            }],
            created_at: now,
            updated_at: now,
        };
        self.storage.save_group(group.clone()).await?;
        info!(group_id = %group.id, creator_id = %creator.id, "group created");

        self.log_and_audit(
            Some(&group.id),
            GROUP_CREATED,
            json!({ "group_id": group.id, "name": group.name }),
            Some(&creator.id),
        )
        .await?;
        self.events
            .publish(DomainEvent::GroupCreated {
                group_id: group.id.clone(),
                user_id: creator.id.clone(),
            })
            .await?;
        Ok(group)
    }

    pub async fn update_group(
        &self,
        group_id: &str,
        acting: &User,
        new_name: Option<String>,
        new_description: Option<String>,
        new_avatar_url: Option<String>,
    ) -> Result<Group, GearShareError> {
        let (mut group, role) = self.require_group_role(group_id, &acting.id).await?;
        if !GroupPermissions::for_role(role).can_edit {
            warn!(user_id = %acting.id, group_id, "edit denied");
            return Err(GearShareError::PermissionDenied(
                acting.id.clone(),
                "edit this group".to_string(),
            ));
        }

        if let Some(name) = new_name {
            self.validate_string_input("name", &name, 100)?;
            group.name = name;
        }
        if let Some(description) = new_description {
            self.validate_string_input("description", &description, 2000)?;
            group.description = Some(description);
        }
        if let Some(avatar_url) = new_avatar_url {
            group.avatar_url = Some(avatar_url);
        }
        group.updated_at = Utc::now();
        self.storage.save_group(group.clone()).await?;

        self.log_and_audit(
            Some(group_id),
            GROUP_UPDATED,
            json!({ "group_id": group_id }),
            Some(&acting.id),
        )
        .await?;
        self.events
            .publish(DomainEvent::GroupUpdated {
                group_id: group_id.to_string(),
                user_id: acting.id.clone(),
            })
            .await?;
        Ok(group)
    }

    /// Deleting a group removes its shares and memberships. In-flight borrow
    /// requests that referenced the group survive with the link cleared.
    pub async fn delete_group(&self, group_id: &str, acting: &User) -> Result<(), GearShareError> {
        let (_, role) = self.require_group_role(group_id, &acting.id).await?;
        if !GroupPermissions::for_role(role).can_delete {
            warn!(user_id = %acting.id, group_id, "delete denied");
            return Err(GearShareError::PermissionDenied(
                acting.id.clone(),
                "delete this group".to_string(),
            ));
        }

        self.storage.remove_shares_for_group(group_id).await?;
        for mut request in self.storage.list_requests_by_group(group_id).await? {
            request.group_id = None;
            self.storage.save_request(request).await?;
        }
        self.storage.delete_group(group_id).await?;
        info!(group_id, "group deleted");

        self.log_and_audit(None, GROUP_DELETED, json!({ "group_id": group_id }), Some(&acting.id))
            .await?;
        self.events
            .publish(DomainEvent::GroupDeleted {
                group_id: group_id.to_string(),
                user_id: acting.id.clone(),
            })
            .await?;
        Ok(())
    }

    /// Invitees must already be registered; the lookup is by email.
    pub async fn invite_member(&self, group_id: &str, acting: &User, email: &str) -> Result<Group, GearShareError> {
        let (mut group, role) = self.require_group_role(group_id, &acting.id).await?;
        if !GroupPermissions::for_role(role).can_invite {
            warn!(user_id = %acting.id, group_id, "invite denied");
            return Err(GearShareError::PermissionDenied(
                acting.id.clone(),
                "invite members".to_string(),
            ));
        }

        let invitee = self
            .storage
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| GearShareError::InviteeNotRegistered(email.to_string()))?;
        if group.role_of(&invitee.id).is_some() {
            return Err(GearShareError::AlreadyGroupMember(invitee.id));
        }

        group.members.push(GroupMember {
            user: invitee.clone(),
            role: Role::Member,
            joined_at: Utc::now(),
        });
        group.updated_at = Utc::now();
        self.storage.save_group(group.clone()).await?;
        info!(group_id, member_id = %invitee.id, "member invited");

        self.log_and_audit(
            Some(group_id),
            MEMBER_INVITED,
            json!({ "group_id": group_id, "member_id": invitee.id, "email": email }),
            Some(&acting.id),
        )
        .await?;
        self.events
            .publish(DomainEvent::MemberInvited {
                group_id: group_id.to_string(),
                member_id: invitee.id,
                user_id: acting.id.clone(),
            })
            .await?;
        Ok(group)
    }

    /// Admins may remove plain members; the owner may remove anyone but
    /// themselves. The owner role itself is never removable.
    pub async fn remove_member(
        &self,
        group_id: &str,
        acting: &User,
        target_user_id: &str,
    ) -> Result<Group, GearShareError> {
        let (mut group, role) = self.require_group_role(group_id, &acting.id).await?;
        if !GroupPermissions::for_role(role).can_remove_members {
            warn!(user_id = %acting.id, group_id, "remove member denied");
            return Err(GearShareError::PermissionDenied(
                acting.id.clone(),
                "remove members".to_string(),
            ));
        }
        let target_role = group
            .role_of(target_user_id)
            .ok_or_else(|| GearShareError::NotGroupMember(target_user_id.to_string()))?;
        if target_role == Role::Owner {
            return Err(GearShareError::OwnerCannotBeRemoved);
        }
        if role == Role::Admin && target_role.at_least(Role::Admin) {
            return Err(GearShareError::PermissionDenied(
                acting.id.clone(),
                "remove admins".to_string(),
            ));
        }

        group.members.retain(|m| m.user.id != target_user_id);
        group.updated_at = Utc::now();
        self.storage.save_group(group.clone()).await?;
        info!(group_id, member_id = target_user_id, "member removed");

        self.log_and_audit(
            Some(group_id),
            MEMBER_REMOVED,
            json!({ "group_id": group_id, "member_id": target_user_id }),
            Some(&acting.id),
        )
        .await?;
        self.events
            .publish(DomainEvent::MemberRemoved {
                group_id: group_id.to_string(),
                member_id: target_user_id.to_string(),
                user_id: acting.id.clone(),
            })
            .await?;
        Ok(group)
    }

    /// Owner-only promotion/demotion between Member and Admin. The Owner
    /// role moves via transfer_ownership, never through here.
    pub async fn set_member_role(
        &self,
        group_id: &str,
        acting: &User,
        target_user_id: &str,
        role: Role,
    ) -> Result<Group, GearShareError> {
        let (mut group, acting_role) = self.require_group_role(group_id, &acting.id).await?;
        if acting_role != Role::Owner {
            warn!(user_id = %acting.id, group_id, "role change denied");
            return Err(GearShareError::PermissionDenied(
                acting.id.clone(),
                "change member roles".to_string(),
            ));
        }
        if role == Role::Owner || target_user_id == acting.id {
            return Err(GearShareError::PermissionDenied(
                acting.id.clone(),
                "assign the owner role".to_string(),
            ));
        }
        let target_role = group
            .role_of(target_user_id)
            .ok_or_else(|| GearShareError::NotGroupMember(target_user_id.to_string()))?;
        if target_role == Role::Owner {
            return Err(GearShareError::OwnerCannotBeRemoved);
        }

        for member in &mut group.members {
            if member.user.id == target_user_id {
                member.role = role;
            }
        }
        group.updated_at = Utc::now();
        self.storage.save_group(group.clone()).await?;
        info!(group_id, member_id = target_user_id, role = %role, "member role changed");

        self.log_and_audit(
            Some(group_id),
            MEMBER_ROLE_CHANGED,
            json!({ "group_id": group_id, "member_id": target_user_id, "role": role.to_string() }),
            Some(&acting.id),
        )
        .await?;
        self.events
            .publish(DomainEvent::MemberRoleChanged {
                group_id: group_id.to_string(),
                member_id: target_user_id.to_string(),
                role,
                user_id: acting.id.clone(),
            })
            .await?;
        Ok(group)
    }

    pub async fn transfer_ownership(
        &self,
        group_id: &str,
        acting: &User,
        new_owner_id: &str,
    ) -> Result<Group, GearShareError> {
        let (mut group, role) = self.require_group_role(group_id, &acting.id).await?;
        if !GroupPermissions::for_role(role).can_transfer_ownership {
            warn!(user_id = %acting.id, group_id, "ownership transfer denied");
            return Err(GearShareError::PermissionDenied(
                acting.id.clone(),
                "transfer ownership".to_string(),
            ));
        }
        if group.role_of(new_owner_id).is_none() {
            return Err(GearShareError::NotGroupMember(new_owner_id.to_string()));
        }

        for member in &mut group.members {
            if member.user.id == acting.id {
                member.role = Role::Member;
            } else if member.user.id == new_owner_id {
                member.role = Role::Owner;
            }
        }
        group.updated_at = Utc::now();
        self.storage.save_group(group.clone()).await?;
        info!(group_id, new_owner_id, "ownership transferred");

        self.log_and_audit(
            Some(group_id),
            OWNERSHIP_TRANSFERRED,
            json!({ "group_id": group_id, "new_owner_id": new_owner_id }),
            Some(&acting.id),
        )
        .await?;
        self.events
            .publish(DomainEvent::OwnershipTransferred {
                group_id: group_id.to_string(),
                new_owner_id: new_owner_id.to_string(),
                user_id: acting.id.clone(),
            })
            .await?;
        Ok(group)
    }

    pub async fn permissions_for(&self, group_id: &str, user_id: &str) -> Result<GroupPermissions, GearShareError> {
        let (_, role) = self.require_group_role(group_id, user_id).await?;
        Ok(GroupPermissions::for_role(role))
    }

    pub async fn get_group(&self, group_id: &str) -> Result<Option<Group>, GearShareError> {
        self.storage.get_group(group_id).await
    }

    pub async fn list_groups_for_user(&self, user_id: &str) -> Result<Vec<Group>, GearShareError> {
        self.storage.list_groups_for_user(user_id).await
    }

    // RESOURCE SHARING

    /// Idempotent: sharing an already-shared pair is a no-op.
    pub async fn share_resource(&self, resource_id: &str, acting: &User, group_id: &str) -> Result<(), GearShareError> {
        self.require_resource_owner(resource_id, acting).await?;
        self.require_group_role(group_id, &acting.id).await?;

        if self.storage.share_exists(resource_id, group_id).await? {
            return Ok(());
        }
        self.storage.add_share(resource_id, group_id).await?;
        info!(resource_id, group_id, "resource shared");

        self.log_and_audit(
            Some(group_id),
            RESOURCE_SHARED,
            json!({ "resource_id": resource_id, "group_id": group_id }),
            Some(&acting.id),
        )
        .await?;
        self.events
            .publish(DomainEvent::ResourceShared {
                resource_id: resource_id.to_string(),
                group_id: group_id.to_string(),
                user_id: acting.id.clone(),
            })
            .await?;
        Ok(())
    }

    /// Idempotent: unsharing a pair that is not shared is a no-op.
    pub async fn unshare_resource(
        &self,
        resource_id: &str,
        acting: &User,
        group_id: &str,
    ) -> Result<(), GearShareError> {
        self.require_resource_owner(resource_id, acting).await?;

        if !self.storage.share_exists(resource_id, group_id).await? {
            return Ok(());
        }
        self.storage.remove_share(resource_id, group_id).await?;
        info!(resource_id, group_id, "resource unshared");

        self.log_and_audit(
            Some(group_id),
            RESOURCE_UNSHARED,
            json!({ "resource_id": resource_id, "group_id": group_id }),
            Some(&acting.id),
        )
        .await?;
        self.events
            .publish(DomainEvent::ResourceUnshared {
                resource_id: resource_id.to_string(),
                group_id: group_id.to_string(),
                user_id: acting.id.clone(),
            })
            .await?;
        Ok(())
    }

    pub async fn list_groups_for_resource(
        &self,
        resource_id: &str,
        acting: &User,
    ) -> Result<Vec<Group>, GearShareError> {
        self.require_resource_owner(resource_id, acting).await?;
        let mut groups = Vec::new();
        for group_id in self.storage.list_group_ids_for_resource(resource_id).await? {
            if let Some(group) = self.storage.get_group(&group_id).await? {
                groups.push(group);
            }
        }
        Ok(groups)
    }

    pub async fn list_resources_for_group(
        &self,
        group_id: &str,
        acting: &User,
    ) -> Result<Vec<Resource>, GearShareError> {
        self.require_group_role(group_id, &acting.id).await?;
        let mut resources = Vec::new();
        for resource_id in self.storage.list_resource_ids_for_group(group_id).await? {
            if let Some(resource) = self.storage.get_resource(&resource_id).await? {
                resources.push(resource);
            }
        }
        Ok(resources)
    }

    // BORROW REQUEST LIFECYCLE

    pub async fn create_request(
        &self,
        resource_id: &str,
        borrower: &User,
        start_date: NaiveDate,
        end_date: NaiveDate,
        message: Option<String>,
        group_id: Option<String>,
    ) -> Result<BorrowRequest, GearShareError> {
        let resource = self
            .storage
            .get_resource(resource_id)
            .await?
            .ok_or_else(|| GearShareError::ResourceNotFound(resource_id.to_string()))?;
        if resource.owner_id == borrower.id {
            return Err(GearShareError::SelfBorrow);
        }
        if !self.resource_visible_to(&resource, &borrower.id).await? {
            warn!(resource_id, borrower_id = %borrower.id, "request against non-visible resource");
            return Err(GearShareError::ResourceNotVisible(
                resource_id.to_string(),
                borrower.id.clone(),
            ));
        }
        self.validate_window(start_date, end_date)?;
        if let Some(message) = message.as_deref() {
            self.validate_string_input("message", message, 1000)?;
        }
        if let Some(ref gid) = group_id {
            self.require_group_role(gid, &borrower.id).await?;
            if !self.storage.share_exists(resource_id, gid).await? {
                return Err(GearShareError::ResourceNotVisible(
                    resource_id.to_string(),
                    borrower.id.clone(),
                ));
            }
        }

        // One open window per borrower per resource.
        let open_overlap = self
            .storage
            .list_requests_by_resource(resource_id)
            .await?
            .iter()
            .any(|r| {
                r.borrower_id == borrower.id
                    && matches!(r.status, RequestStatus::Pending | RequestStatus::Approved)
                    && r.overlaps(start_date, end_date)
            });
        if open_overlap {
            warn!(resource_id, borrower_id = %borrower.id, "overlapping borrow request rejected");
            return Err(GearShareError::OverlappingRequest(resource_id.to_string()));
        }

        let now = Utc::now();
        let request = BorrowRequest {
            id: Uuid::new_v4().to_string(),
            resource_id: resource_id.to_string(),
            borrower_id: borrower.id.clone(),
            owner_id: resource.owner_id.clone(),
            group_id,
            status: RequestStatus::Pending,
            start_date,
            end_date,
            message,
            created_at: now,
            updated_at: now,
        };
        self.storage.save_request(request.clone()).await?;
        info!(request_id = %request.id, resource_id, borrower_id = %borrower.id, "borrow request created");

        self.log_and_audit(
            request.group_id.as_deref(),
            REQUEST_CREATED,
            json!({ "request_id": request.id, "resource_id": resource_id }),
            Some(&borrower.id),
        )
        .await?;
        self.events
            .publish(DomainEvent::RequestCreated {
                request_id: request.id.clone(),
                resource_id: resource_id.to_string(),
                user_id: borrower.id.clone(),
            })
            .await?;
        Ok(request)
    }

    /// PENDING -> APPROVED, owner only. The status swap is a conditional
    /// update, so of two concurrent accepts exactly one succeeds; the other
    /// sees the wrong-state conflict.
    pub async fn accept_request(
        &self,
        request_id: &str,
        acting: &User,
    ) -> Result<(BorrowRequest, Loan), GearShareError> {
        let request = self
            .storage
            .get_request(request_id)
            .await?
            .ok_or_else(|| GearShareError::RequestNotFound(request_id.to_string()))?;
        if request.owner_id != acting.id {
            warn!(request_id, user_id = %acting.id, "accept denied: not resource owner");
            return Err(GearShareError::NotResourceOwner(
                acting.id.clone(),
                request.resource_id.clone(),
            ));
        }
        if self
            .storage
            .active_loan_for_resource(&request.resource_id)
            .await?
            .is_some()
        {
            return Err(GearShareError::ResourceOnLoan(request.resource_id));
        }

        let request = self
            .storage
            .transition_request(request_id, RequestStatus::Pending, RequestStatus::Approved)
            .await?;

        let loan = Loan {
            id: Uuid::new_v4().to_string(),
            borrow_request_id: request.id.clone(),
            status: LoanStatus::Active,
            start_date: request.start_date,
            end_date: request.end_date,
            returned_date: None,
        };
        self.storage.save_loan(loan.clone()).await?;
        info!(request_id, loan_id = %loan.id, "borrow request accepted");

        self.log_and_audit(
            request.group_id.as_deref(),
            REQUEST_ACCEPTED,
            json!({ "request_id": request_id, "loan_id": loan.id }),
            Some(&acting.id),
        )
        .await?;
        self.events
            .publish(DomainEvent::RequestAccepted {
                request_id: request_id.to_string(),
                loan_id: loan.id.clone(),
                user_id: acting.id.clone(),
            })
            .await?;
        Ok((request, loan))
    }

    /// PENDING -> REJECTED, owner only.
    pub async fn decline_request(&self, request_id: &str, acting: &User) -> Result<BorrowRequest, GearShareError> {
        let request = self
            .storage
            .get_request(request_id)
            .await?
            .ok_or_else(|| GearShareError::RequestNotFound(request_id.to_string()))?;
        if request.owner_id != acting.id {
            warn!(request_id, user_id = %acting.id, "decline denied: not resource owner");
            return Err(GearShareError::NotResourceOwner(
                acting.id.clone(),
                request.resource_id.clone(),
            ));
        }

        let request = self
            .storage
            .transition_request(request_id, RequestStatus::Pending, RequestStatus::Rejected)
            .await?;
        info!(request_id, "borrow request declined");

        self.log_and_audit(
            request.group_id.as_deref(),
            REQUEST_DECLINED,
            json!({ "request_id": request_id }),
            Some(&acting.id),
        )
        .await?;
        self.events
            .publish(DomainEvent::RequestDeclined {
                request_id: request_id.to_string(),
                user_id: acting.id.clone(),
            })
            .await?;
        Ok(request)
    }

    /// PENDING -> CANCELLED, borrower only.
    pub async fn cancel_request(&self, request_id: &str, acting: &User) -> Result<BorrowRequest, GearShareError> {
        let request = self
            .storage
            .get_request(request_id)
            .await?
            .ok_or_else(|| GearShareError::RequestNotFound(request_id.to_string()))?;
        if request.borrower_id != acting.id {
            warn!(request_id, user_id = %acting.id, "cancel denied: not the borrower");
            return Err(GearShareError::PermissionDenied(
                acting.id.clone(),
                "cancel this request".to_string(),
            ));
        }

        let request = self
            .storage
            .transition_request(request_id, RequestStatus::Pending, RequestStatus::Cancelled)
            .await?;
        info!(request_id, "borrow request cancelled");

        self.log_and_audit(
            request.group_id.as_deref(),
            REQUEST_CANCELLED,
            json!({ "request_id": request_id }),
            Some(&acting.id),
        )
        .await?;
        self.events
            .publish(DomainEvent::RequestCancelled {
                request_id: request_id.to_string(),
                user_id: acting.id.clone(),
            })
            .await?;
        Ok(request)
    }

    /// Borrower edits a still-PENDING request; dates are re-validated.
    pub async fn update_request(
        &self,
        request_id: &str,
        acting: &User,
        new_start: Option<NaiveDate>,
        new_end: Option<NaiveDate>,
        new_message: Option<String>,
    ) -> Result<BorrowRequest, GearShareError> {
        let mut request = self
            .storage
            .get_request(request_id)
            .await?
            .ok_or_else(|| GearShareError::RequestNotFound(request_id.to_string()))?;
        if request.borrower_id != acting.id {
            warn!(request_id, user_id = %acting.id, "update denied: not the borrower");
            return Err(GearShareError::PermissionDenied(
                acting.id.clone(),
                "edit this request".to_string(),
            ));
        }
        if request.status != RequestStatus::Pending {
            return Err(GearShareError::WrongRequestState(
                request_id.to_string(),
                request.status.to_string(),
                RequestStatus::Pending.to_string(),
            ));
        }

        let start = new_start.unwrap_or(request.start_date);
        let end = new_end.unwrap_or(request.end_date);
        self.validate_window(start, end)?;
        if let Some(message) = new_message.as_deref() {
            self.validate_string_input("message", message, 1000)?;
        }

        let open_overlap = self
            .storage
            .list_requests_by_resource(&request.resource_id)
            .await?
            .iter()
            .any(|r| {
                r.id != request.id
                    && r.borrower_id == acting.id
                    && matches!(r.status, RequestStatus::Pending | RequestStatus::Approved)
                    && r.overlaps(start, end)
            });
        if open_overlap {
            return Err(GearShareError::OverlappingRequest(request.resource_id));
        }

        request.start_date = start;
        request.end_date = end;
        if new_message.is_some() {
            request.message = new_message;
        }
        request.updated_at = Utc::now();
        self.storage.save_request(request.clone()).await?;
        info!(request_id, "borrow request updated");

        self.log_and_audit(
            request.group_id.as_deref(),
            REQUEST_UPDATED,
            json!({ "request_id": request_id }),
            Some(&acting.id),
        )
        .await?;
        self.events
            .publish(DomainEvent::RequestUpdated {
                request_id: request_id.to_string(),
                user_id: acting.id.clone(),
            })
            .await?;
        Ok(request)
    }

    /// Either party may clear out a settled (REJECTED or CANCELLED) request.
    pub async fn delete_request(&self, request_id: &str, acting: &User) -> Result<(), GearShareError> {
        let request = self
            .storage
            .get_request(request_id)
            .await?
            .ok_or_else(|| GearShareError::RequestNotFound(request_id.to_string()))?;
        if request.borrower_id != acting.id && request.owner_id != acting.id {
            return Err(GearShareError::PermissionDenied(
                acting.id.clone(),
                "delete this request".to_string(),
            ));
        }
        if !matches!(request.status, RequestStatus::Rejected | RequestStatus::Cancelled) {
            return Err(GearShareError::WrongRequestState(
                request_id.to_string(),
                request.status.to_string(),
                "REJECTED or CANCELLED".to_string(),
            ));
        }

        self.storage.delete_request(request_id).await?;
        info!(request_id, "borrow request deleted");

        self.log_and_audit(
            request.group_id.as_deref(),
            REQUEST_DELETED,
            json!({ "request_id": request_id }),
            Some(&acting.id),
        )
        .await?;
        self.events
            .publish(DomainEvent::RequestDeleted {
                request_id: request_id.to_string(),
                user_id: acting.id.clone(),
            })
            .await?;
        Ok(())
    }

    /// Owner marks the gear back on the shelf: ACTIVE -> RETURNED. The stamp
    /// never precedes the loan's start date, even for early returns.
    pub async fn mark_returned(&self, request_id: &str, acting: &User) -> Result<Loan, GearShareError> {
        let request = self
            .storage
            .get_request(request_id)
            .await?
            .ok_or_else(|| GearShareError::RequestNotFound(request_id.to_string()))?;
        if request.owner_id != acting.id {
            warn!(request_id, user_id = %acting.id, "mark-returned denied: not resource owner");
            return Err(GearShareError::NotResourceOwner(
                acting.id.clone(),
                request.resource_id.clone(),
            ));
        }
        let mut loan = self
            .storage
            .get_loan_by_request(request_id)
            .await?
            .ok_or_else(|| GearShareError::LoanNotFound(request_id.to_string()))?;
        if loan.status != LoanStatus::Active {
            return Err(GearShareError::LoanNotActive(request_id.to_string()));
        }

        loan.status = LoanStatus::Returned;
        loan.returned_date = Some(Utc::now().date_naive().max(loan.start_date));
        self.storage.save_loan(loan.clone()).await?;
        info!(request_id, loan_id = %loan.id, "loan returned");

        self.log_and_audit(
            request.group_id.as_deref(),
            LOAN_RETURNED,
            json!({ "request_id": request_id, "loan_id": loan.id }),
            Some(&acting.id),
        )
        .await?;
        self.events
            .publish(DomainEvent::LoanReturned {
                request_id: request_id.to_string(),
                loan_id: loan.id.clone(),
                user_id: acting.id.clone(),
            })
            .await?;
        Ok(loan)
    }

    pub async fn get_request(&self, request_id: &str) -> Result<Option<BorrowRequest>, GearShareError> {
        self.storage.get_request(request_id).await
    }

    pub async fn list_requests_for_borrower(&self, user_id: &str) -> Result<Vec<BorrowRequest>, GearShareError> {
        self.storage.list_requests_by_borrower(user_id).await
    }

    pub async fn list_requests_for_owner(&self, user_id: &str) -> Result<Vec<BorrowRequest>, GearShareError> {
        self.storage.list_requests_by_owner(user_id).await
    }

    pub async fn get_loan_for_request(&self, request_id: &str) -> Result<Option<Loan>, GearShareError> {
        self.storage.get_loan_by_request(request_id).await
    }

    // LOGS & AUDITS

    pub async fn get_app_logs(&self) -> Result<Vec<AppLog>, GearShareError> {
        self.logging.get_logs().await
    }

    pub async fn get_group_audits(&self, group_id: &str) -> Result<Vec<GroupAudit>, GearShareError> {
        self.storage.get_group_audits(group_id).await
    }
}
