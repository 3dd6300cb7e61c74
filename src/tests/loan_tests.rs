use crate::core::errors::GearShareError;
use crate::core::models::loan::LoanStatus;
use crate::tests::{create_test_service, setup_lending, window};

#[tokio::test]
async fn test_loan_exists_only_after_approval() {
    let service = create_test_service();
    let (owner, borrower, _, resource) = setup_lending(&service).await;
    let (start, end) = window(1, 4);
    let request = service
        .create_request(&resource.id, &borrower, start, end, None, None)
        .await
        .unwrap();

    assert!(service.get_loan_for_request(&request.id).await.unwrap().is_none());

    service.accept_request(&request.id, &owner).await.unwrap();
    let loan = service.get_loan_for_request(&request.id).await.unwrap().unwrap();
    assert_eq!(loan.status, LoanStatus::Active);
    assert_eq!(loan.start_date, start);
    assert_eq!(loan.end_date, end);
}

#[tokio::test]
async fn test_mark_returned_owner_only_and_once() {
    let service = create_test_service();
    let (owner, borrower, _, resource) = setup_lending(&service).await;
    let (start, end) = window(1, 4);
    let request = service
        .create_request(&resource.id, &borrower, start, end, None, None)
        .await
        .unwrap();

    // No loan yet while the request is pending
    let result = service.mark_returned(&request.id, &owner).await;
    assert!(matches!(result, Err(GearShareError::LoanNotFound(_))));

    service.accept_request(&request.id, &owner).await.unwrap();

    let result = service.mark_returned(&request.id, &borrower).await;
    assert!(matches!(result, Err(GearShareError::NotResourceOwner(_, _))));

    let loan = service.mark_returned(&request.id, &owner).await.unwrap();
    assert_eq!(loan.status, LoanStatus::Returned);
    assert!(loan.returned_date.unwrap() >= loan.start_date);

    // Second return attempt conflicts
    let result = service.mark_returned(&request.id, &owner).await;
    assert!(matches!(result, Err(GearShareError::LoanNotActive(_))));
}
