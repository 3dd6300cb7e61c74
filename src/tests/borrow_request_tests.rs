use crate::core::errors::GearShareError;
use crate::core::models::borrow_request::RequestStatus;
use crate::core::models::loan::LoanStatus;
use crate::tests::{create_test_service, register_user, setup_lending, window};
use chrono::{Days, Utc};

#[tokio::test]
async fn test_full_lifecycle_happy_path() {
    let service = create_test_service();
    let (owner, borrower, _, resource) = setup_lending(&service).await;
    let (start, end) = window(1, 4);

    let request = service
        .create_request(&resource.id, &borrower, start, end, Some("Weekend trip".to_string()), None)
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.owner_id, owner.id);

    let (request, loan) = service.accept_request(&request.id, &owner).await.unwrap();
    assert_eq!(request.status, RequestStatus::Approved);
    assert_eq!(loan.status, LoanStatus::Active);
    assert_eq!(loan.borrow_request_id, request.id);

    let loan = service.mark_returned(&request.id, &owner).await.unwrap();
    assert_eq!(loan.status, LoanStatus::Returned);
    let returned = loan.returned_date.unwrap();
    assert!(returned >= loan.start_date);
}

#[tokio::test]
async fn test_date_validation_is_server_side() {
    let service = create_test_service();
    let (_, borrower, _, resource) = setup_lending(&service).await;
    let today = Utc::now().date_naive();

    // end <= start
    let result = service
        .create_request(&resource.id, &borrower, today + Days::new(3), today + Days::new(3), None, None)
        .await;
    assert!(matches!(result, Err(GearShareError::InvalidDateRange(_))));

    // start in the past
    let result = service
        .create_request(&resource.id, &borrower, today - Days::new(1), today + Days::new(2), None, None)
        .await;
    assert!(matches!(result, Err(GearShareError::InvalidDateRange(_))));
}

#[tokio::test]
async fn test_overlapping_open_requests_conflict() {
    let service = create_test_service();
    let (_, borrower, _, resource) = setup_lending(&service).await;

    let (start, end) = window(1, 4);
    service
        .create_request(&resource.id, &borrower, start, end, None, None)
        .await
        .unwrap();

    // Overlaps the open window
    let result = service
        .create_request(&resource.id, &borrower, start + Days::new(2), end + Days::new(2), None, None)
        .await;
    assert!(matches!(result, Err(GearShareError::OverlappingRequest(_))));

    // Back-to-back windows do not overlap (half-open ranges)
    service
        .create_request(&resource.id, &borrower, end, end + Days::new(3), None, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_cannot_borrow_own_or_hidden_gear() {
    let service = create_test_service();
    let (owner, _, _, resource) = setup_lending(&service).await;
    let stranger = register_user(&service, "Stranger", "stranger@example.com").await;
    let (start, end) = window(1, 4);

    let result = service
        .create_request(&resource.id, &owner, start, end, None, None)
        .await;
    assert!(matches!(result, Err(GearShareError::SelfBorrow)));

    let result = service
        .create_request(&resource.id, &stranger, start, end, None, None)
        .await;
    assert!(matches!(result, Err(GearShareError::ResourceNotVisible(_, _))));
}

#[tokio::test]
async fn test_only_owner_accepts_or_declines() {
    let service = create_test_service();
    let (owner, borrower, group, resource) = setup_lending(&service).await;
    let third = register_user(&service, "Third", "third@example.com").await;
    service.invite_member(&group.id, &owner, &third.email).await.unwrap();
    let (start, end) = window(1, 4);
    let request = service
        .create_request(&resource.id, &borrower, start, end, None, None)
        .await
        .unwrap();

    for actor in [&borrower, &third] {
        let result = service.accept_request(&request.id, actor).await;
        assert!(matches!(result, Err(GearShareError::NotResourceOwner(_, _))));
        let result = service.decline_request(&request.id, actor).await;
        assert!(matches!(result, Err(GearShareError::NotResourceOwner(_, _))));
    }

    // And only the borrower cancels
    let result = service.cancel_request(&request.id, &owner).await;
    assert!(matches!(result, Err(GearShareError::PermissionDenied(_, _))));
}

#[tokio::test]
async fn test_pending_is_the_only_transitionable_state() {
    let service = create_test_service();
    let (owner, borrower, _, resource) = setup_lending(&service).await;
    let (start, end) = window(1, 4);

    let request = service
        .create_request(&resource.id, &borrower, start, end, None, None)
        .await
        .unwrap();
    service.decline_request(&request.id, &owner).await.unwrap();

    // Every transition out of REJECTED fails with the state conflict
    let result = service.accept_request(&request.id, &owner).await;
    assert!(matches!(result, Err(GearShareError::WrongRequestState(_, _, _))));
    let result = service.decline_request(&request.id, &owner).await;
    assert!(matches!(result, Err(GearShareError::WrongRequestState(_, _, _))));
    let result = service.cancel_request(&request.id, &borrower).await;
    assert!(matches!(result, Err(GearShareError::WrongRequestState(_, _, _))));
    let result = service
        .update_request(&request.id, &borrower, Some(start), Some(end), None)
        .await;
    assert!(matches!(result, Err(GearShareError::WrongRequestState(_, _, _))));
}

#[tokio::test]
async fn test_borrower_edits_pending_request() {
    let service = create_test_service();
    let (owner, borrower, _, resource) = setup_lending(&service).await;
    let (start, end) = window(1, 4);
    let request = service
        .create_request(&resource.id, &borrower, start, end, None, None)
        .await
        .unwrap();

    let updated = service
        .update_request(
            &request.id,
            &borrower,
            Some(start + Days::new(1)),
            Some(end + Days::new(1)),
            Some("Pushed back a day".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(updated.start_date, start + Days::new(1));
    assert_eq!(updated.message.as_deref(), Some("Pushed back a day"));

    // Edits re-validate the window
    let result = service
        .update_request(&request.id, &borrower, Some(end), Some(start), None)
        .await;
    assert!(matches!(result, Err(GearShareError::InvalidDateRange(_))));

    // The owner cannot edit the borrower's request
    let result = service.update_request(&request.id, &owner, None, None, None).await;
    assert!(matches!(result, Err(GearShareError::PermissionDenied(_, _))));
}

#[tokio::test]
async fn test_delete_only_settled_requests() {
    let service = create_test_service();
    let (owner, borrower, _, resource) = setup_lending(&service).await;
    let (start, end) = window(1, 4);
    let request = service
        .create_request(&resource.id, &borrower, start, end, None, None)
        .await
        .unwrap();

    // PENDING cannot be deleted
    let result = service.delete_request(&request.id, &borrower).await;
    assert!(matches!(result, Err(GearShareError::WrongRequestState(_, _, _))));

    service.cancel_request(&request.id, &borrower).await.unwrap();
    service.delete_request(&request.id, &owner).await.unwrap();
    assert!(service.get_request(&request.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_accepts_have_one_winner() {
    let service = create_test_service();
    let (owner, borrower, _, resource) = setup_lending(&service).await;
    let (start, end) = window(1, 4);
    let request = service
        .create_request(&resource.id, &borrower, start, end, None, None)
        .await
        .unwrap();

    let (first, second) = tokio::join!(
        service.accept_request(&request.id, &owner),
        service.accept_request(&request.id, &owner),
    );
    let wins = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);

    let request = service.get_request(&request.id).await.unwrap().unwrap();
    assert_eq!(request.status, RequestStatus::Approved);
}

#[tokio::test]
async fn test_accept_blocked_while_resource_on_loan() {
    let service = create_test_service();
    let (owner, borrower, group, resource) = setup_lending(&service).await;
    let second_borrower = register_user(&service, "Second", "second@example.com").await;
    service
        .invite_member(&group.id, &owner, &second_borrower.email)
        .await
        .unwrap();

    let (start, end) = window(1, 4);
    let first = service
        .create_request(&resource.id, &borrower, start, end, None, None)
        .await
        .unwrap();
    let second = service
        .create_request(&resource.id, &second_borrower, start, end, None, None)
        .await
        .unwrap();

    service.accept_request(&first.id, &owner).await.unwrap();
    let result = service.accept_request(&second.id, &owner).await;
    assert!(matches!(result, Err(GearShareError::ResourceOnLoan(_))));

    // After the return, the second request can be accepted
    service.mark_returned(&first.id, &owner).await.unwrap();
    service.accept_request(&second.id, &owner).await.unwrap();
}
