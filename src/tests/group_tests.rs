use crate::core::errors::GearShareError;
use crate::core::models::group::{GroupPermissions, Role};
use crate::tests::{create_test_service, register_user};

#[tokio::test]
async fn test_create_group_creator_is_owner() {
    let service = create_test_service();
    let user = register_user(&service, "Creator", "creator@example.com").await;

    let group = service
        .create_group(&user, "Test Group".to_string(), Some("A group".to_string()), None)
        .await
        .unwrap();

    assert_eq!(group.name, "Test Group");
    assert_eq!(group.created_by_id, user.id);
    assert_eq!(group.members.len(), 1);
    assert_eq!(group.members[0].role, Role::Owner);
    assert_eq!(group.role_of(&user.id), Some(Role::Owner));
}

#[tokio::test]
async fn test_invite_member_by_email() {
    let service = create_test_service();
    let owner = register_user(&service, "Owner", "owner@example.com").await;
    let invitee = register_user(&service, "Invitee", "invitee@example.com").await;
    let group = service
        .create_group(&owner, "Test Group".to_string(), None, None)
        .await
        .unwrap();

    let group = service.invite_member(&group.id, &owner, &invitee.email).await.unwrap();
    assert_eq!(group.role_of(&invitee.id), Some(Role::Member));

    // Unknown email and duplicate invites fail with distinct error kinds
    let result = service.invite_member(&group.id, &owner, "ghost@example.com").await;
    assert!(matches!(result, Err(GearShareError::InviteeNotRegistered(_))));

    let result = service.invite_member(&group.id, &owner, &invitee.email).await;
    assert!(matches!(result, Err(GearShareError::AlreadyGroupMember(_))));
}

#[tokio::test]
async fn test_member_cannot_invite() {
    let service = create_test_service();
    let owner = register_user(&service, "Owner", "owner@example.com").await;
    let member = register_user(&service, "Member", "member@example.com").await;
    let outsider = register_user(&service, "Outsider", "outsider@example.com").await;
    let group = service
        .create_group(&owner, "Test Group".to_string(), None, None)
        .await
        .unwrap();
    service.invite_member(&group.id, &owner, &member.email).await.unwrap();

    let result = service.invite_member(&group.id, &member, &outsider.email).await;
    assert!(matches!(result, Err(GearShareError::PermissionDenied(_, _))));

    let result = service.invite_member(&group.id, &outsider, &member.email).await;
    assert!(matches!(result, Err(GearShareError::NotGroupMember(_))));
}

#[tokio::test]
async fn test_permissions_follow_role_lattice() {
    let service = create_test_service();
    let owner = register_user(&service, "Owner", "owner@example.com").await;
    let admin = register_user(&service, "Admin", "admin@example.com").await;
    let member = register_user(&service, "Member", "member@example.com").await;
    let group = service
        .create_group(&owner, "Test Group".to_string(), None, None)
        .await
        .unwrap();
    service.invite_member(&group.id, &owner, &admin.email).await.unwrap();
    service.invite_member(&group.id, &owner, &member.email).await.unwrap();
    service
        .set_member_role(&group.id, &owner, &admin.id, Role::Admin)
        .await
        .unwrap();

    let p = service.permissions_for(&group.id, &owner.id).await.unwrap();
    assert!(p.can_edit && p.can_delete && p.can_invite && p.can_remove_members && p.can_transfer_ownership);

    let p = service.permissions_for(&group.id, &admin.id).await.unwrap();
    assert!(p.can_edit && p.can_invite && p.can_remove_members);
    assert!(!p.can_delete && !p.can_transfer_ownership);

    let p = service.permissions_for(&group.id, &member.id).await.unwrap();
    assert!(!p.can_edit && !p.can_delete && !p.can_invite && !p.can_remove_members && !p.can_transfer_ownership);

    // Derivation is pure in the role
    assert!(!GroupPermissions::for_role(Role::Member).can_edit);
}

#[tokio::test]
async fn test_remove_member_rules() {
    let service = create_test_service();
    let owner = register_user(&service, "Owner", "owner@example.com").await;
    let admin = register_user(&service, "Admin", "admin@example.com").await;
    let member = register_user(&service, "Member", "member@example.com").await;
    let group = service
        .create_group(&owner, "Test Group".to_string(), None, None)
        .await
        .unwrap();
    service.invite_member(&group.id, &owner, &admin.email).await.unwrap();
    service.invite_member(&group.id, &owner, &member.email).await.unwrap();
    service
        .set_member_role(&group.id, &owner, &admin.id, Role::Admin)
        .await
        .unwrap();

    // Admins cannot touch other admins or the owner
    let result = service.remove_member(&group.id, &admin, &owner.id).await;
    assert!(matches!(result, Err(GearShareError::OwnerCannotBeRemoved)));

    // Admins may remove plain members
    let group_after = service.remove_member(&group.id, &admin, &member.id).await.unwrap();
    assert_eq!(group_after.role_of(&member.id), None);

    // Members cannot remove anyone
    service.invite_member(&group.id, &owner, &member.email).await.unwrap();
    let result = service.remove_member(&group.id, &member, &admin.id).await;
    assert!(matches!(result, Err(GearShareError::PermissionDenied(_, _))));

    // The owner cannot remove themselves
    let result = service.remove_member(&group.id, &owner, &owner.id).await;
    assert!(matches!(result, Err(GearShareError::OwnerCannotBeRemoved)));
}

#[tokio::test]
async fn test_transfer_ownership() {
    let service = create_test_service();
    let owner = register_user(&service, "Owner", "owner@example.com").await;
    let next = register_user(&service, "Next", "next@example.com").await;
    let outsider = register_user(&service, "Outsider", "outsider@example.com").await;
    let group = service
        .create_group(&owner, "Test Group".to_string(), None, None)
        .await
        .unwrap();
    service.invite_member(&group.id, &owner, &next.email).await.unwrap();

    // New owner must already be a member
    let result = service.transfer_ownership(&group.id, &owner, &outsider.id).await;
    assert!(matches!(result, Err(GearShareError::NotGroupMember(_))));

    let group = service.transfer_ownership(&group.id, &owner, &next.id).await.unwrap();
    assert_eq!(group.role_of(&next.id), Some(Role::Owner));
    assert_eq!(group.role_of(&owner.id), Some(Role::Member));

    // The previous owner lost the transfer permission with the role
    let result = service.transfer_ownership(&group.id, &owner, &owner.id).await;
    assert!(matches!(result, Err(GearShareError::PermissionDenied(_, _))));
}

#[tokio::test]
async fn test_delete_group_requires_owner_and_clears_request_links() {
    let service = create_test_service();
    let (owner, borrower, group, resource) = crate::tests::setup_lending(&service).await;
    let (start, end) = crate::tests::window(1, 4);
    let request = service
        .create_request(&resource.id, &borrower, start, end, None, Some(group.id.clone()))
        .await
        .unwrap();
    assert_eq!(request.group_id.as_deref(), Some(group.id.as_str()));

    let result = service.delete_group(&group.id, &borrower).await;
    assert!(matches!(result, Err(GearShareError::PermissionDenied(_, _))));

    service.delete_group(&group.id, &owner).await.unwrap();
    assert!(service.get_group(&group.id).await.unwrap().is_none());

    // The in-flight request survives with the group link cleared
    let request = service.get_request(&request.id).await.unwrap().unwrap();
    assert_eq!(request.group_id, None);
}
