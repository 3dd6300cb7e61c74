use crate::core::errors::GearShareError;
use crate::core::models::borrow_request::RequestStatus;
use crate::infrastructure::events::DomainEvent;
use crate::tests::{create_test_service, register_user, setup_lending, window};
use futures::StreamExt;

#[tokio::test]
async fn test_create_and_update_resource() {
    let service = create_test_service();
    let owner = register_user(&service, "Owner", "owner@example.com").await;
    let other = register_user(&service, "Other", "other@example.com").await;

    let resource = service
        .create_resource(&owner, "Tent".to_string(), "2-person tent".to_string(), None)
        .await
        .unwrap();
    assert_eq!(resource.owner_id, owner.id);

    let updated = service
        .update_resource(&resource.id, &owner, Some("Tent (patched)".to_string()), None, None)
        .await
        .unwrap();
    assert_eq!(updated.title, "Tent (patched)");
    assert_eq!(updated.description, "2-person tent");

    // Only the owner may edit
    let result = service
        .update_resource(&resource.id, &other, Some("Mine now".to_string()), None, None)
        .await;
    assert!(matches!(result, Err(GearShareError::NotResourceOwner(_, _))));
}

#[tokio::test]
async fn test_create_resource_rejects_empty_title() {
    let service = create_test_service();
    let owner = register_user(&service, "Owner", "owner@example.com").await;

    let result = service
        .create_resource(&owner, "   ".to_string(), "desc".to_string(), None)
        .await;
    assert!(matches!(result, Err(GearShareError::InvalidInput(_, _))));
}

#[tokio::test]
async fn test_share_unshare_round_trip() {
    let service = create_test_service();
    let owner = register_user(&service, "Owner", "owner@example.com").await;
    let group = service
        .create_group(&owner, "Circle".to_string(), None, None)
        .await
        .unwrap();
    let resource = service
        .create_resource(&owner, "Drill".to_string(), "Cordless drill".to_string(), None)
        .await
        .unwrap();

    // Share twice: second call is a no-op
    service.share_resource(&resource.id, &owner, &group.id).await.unwrap();
    service.share_resource(&resource.id, &owner, &group.id).await.unwrap();
    let groups = service.list_groups_for_resource(&resource.id, &owner).await.unwrap();
    assert_eq!(groups.len(), 1);

    // Unshare twice: back to the original empty share set, idempotently
    service.unshare_resource(&resource.id, &owner, &group.id).await.unwrap();
    service.unshare_resource(&resource.id, &owner, &group.id).await.unwrap();
    let groups = service.list_groups_for_resource(&resource.id, &owner).await.unwrap();
    assert!(groups.is_empty());
}

#[tokio::test]
async fn test_visibility_gated_by_co_membership() {
    let service = create_test_service();
    let (owner, borrower, group, resource) = setup_lending(&service).await;
    let stranger = register_user(&service, "Stranger", "stranger@example.com").await;

    let visible = service.list_visible_resources(&borrower).await.unwrap();
    assert!(visible.iter().any(|r| r.id == resource.id));

    let visible = service.list_visible_resources(&stranger).await.unwrap();
    assert!(visible.is_empty());

    // Owner always sees their own gear, shared or not
    service.unshare_resource(&resource.id, &owner, &group.id).await.unwrap();
    let visible = service.list_visible_resources(&owner).await.unwrap();
    assert!(visible.iter().any(|r| r.id == resource.id));
    let visible = service.list_visible_resources(&borrower).await.unwrap();
    assert!(visible.is_empty());
}

#[tokio::test]
async fn test_delete_resource_cascades() {
    let service = create_test_service();
    let (owner, borrower, group, resource) = setup_lending(&service).await;
    let (start, end) = window(1, 4);
    let request = service
        .create_request(&resource.id, &borrower, start, end, None, None)
        .await
        .unwrap();

    service.delete_resource(&resource.id, &owner).await.unwrap();

    assert!(service.get_resource(&resource.id).await.unwrap().is_none());
    let resources = service.list_resources_for_group(&group.id, &owner).await.unwrap();
    assert!(resources.is_empty());
    let request = service.get_request(&request.id).await.unwrap().unwrap();
    assert_eq!(request.status, RequestStatus::Cancelled);
}

#[tokio::test]
async fn test_delete_resource_blocked_by_active_loan() {
    let service = create_test_service();
    let (owner, borrower, _, resource) = setup_lending(&service).await;
    let (start, end) = window(1, 4);
    let request = service
        .create_request(&resource.id, &borrower, start, end, None, None)
        .await
        .unwrap();
    service.accept_request(&request.id, &owner).await.unwrap();

    let result = service.delete_resource(&resource.id, &owner).await;
    assert!(matches!(result, Err(GearShareError::ResourceOnLoan(_))));

    // Returning the gear unblocks deletion
    service.mark_returned(&request.id, &owner).await.unwrap();
    service.delete_resource(&resource.id, &owner).await.unwrap();
}

#[tokio::test]
async fn test_share_publishes_event() {
    let service = create_test_service();
    let owner = register_user(&service, "Owner", "owner@example.com").await;
    let group = service
        .create_group(&owner, "Circle".to_string(), None, None)
        .await
        .unwrap();
    let resource = service
        .create_resource(&owner, "Drill".to_string(), "Cordless drill".to_string(), None)
        .await
        .unwrap();

    let mut events = service.subscribe().await.unwrap();
    service.share_resource(&resource.id, &owner, &group.id).await.unwrap();

    let event = events.next().await.unwrap();
    assert_eq!(
        event,
        DomainEvent::ResourceShared {
            resource_id: resource.id.clone(),
            group_id: group.id.clone(),
            user_id: owner.id.clone(),
        }
    );
}
