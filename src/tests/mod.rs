mod borrow_request_tests;
mod group_tests;
mod loan_tests;
mod resource_tests;
mod user_tests;

use crate::core::models::{group::Group, resource::Resource, user::User};
use crate::core::services::GearShareService;
use crate::infrastructure::events::in_memory::InMemoryEventBus;
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use chrono::{Days, NaiveDate, Utc};

pub type TestService = GearShareService<InMemoryLogging, InMemoryStorage, InMemoryEventBus>;

pub fn create_test_service() -> TestService {
    let storage = InMemoryStorage::new();
    let logging = InMemoryLogging::new();
    let events = InMemoryEventBus::new();
    GearShareService::new(storage, logging, events, "test-secret".to_string())
}

pub async fn register_user(service: &TestService, name: &str, email: &str) -> User {
    service
        .register(None, name.to_string(), email.to_string(), "hunter22".to_string())
        .await
        .unwrap()
}

/// A borrow window `days_ahead` days from today, `len` days long.
pub fn window(days_ahead: u64, len: u64) -> (NaiveDate, NaiveDate) {
    let start = Utc::now().date_naive() + Days::new(days_ahead);
    (start, start + Days::new(len))
}

/// Owner and borrower sharing a group, with one resource shared into it.
pub async fn setup_lending(service: &TestService) -> (User, User, Group, Resource) {
    let owner = register_user(service, "Olive Owner", "olive@example.com").await;
    let borrower = register_user(service, "Bram Borrower", "bram@example.com").await;

    let group = service
        .create_group(&owner, "Climbing Club".to_string(), None, None)
        .await
        .unwrap();
    let group = service.invite_member(&group.id, &owner, &borrower.email).await.unwrap();

    let resource = service
        .create_resource(&owner, "60m Rope".to_string(), "Dry-treated single rope".to_string(), None)
        .await
        .unwrap();
    service.share_resource(&resource.id, &owner, &group.id).await.unwrap();

    (owner, borrower, group, resource)
}
