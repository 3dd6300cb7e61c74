//! Typed pub/sub for cross-component notification.
//!
//! Views and other listeners subscribe to domain events instead of relying
//! on ad-hoc refresh signals. Implementations can be in-memory (single
//! server, tokio broadcast channels) or backed by an external broker.

pub mod in_memory;

use crate::core::errors::GearShareError;
use crate::core::models::group::Role;
use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Event emitted after a successful mutation, carrying the ids a listener
/// needs to refetch affected views.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    UserRegistered { user_id: String },
    GroupCreated { group_id: String, user_id: String },
    GroupUpdated { group_id: String, user_id: String },
    GroupDeleted { group_id: String, user_id: String },
    MemberInvited { group_id: String, member_id: String, user_id: String },
    MemberRemoved { group_id: String, member_id: String, user_id: String },
    MemberRoleChanged { group_id: String, member_id: String, role: Role, user_id: String },
    OwnershipTransferred { group_id: String, new_owner_id: String, user_id: String },
    ResourceCreated { resource_id: String, user_id: String },
    ResourceUpdated { resource_id: String, user_id: String },
    ResourceDeleted { resource_id: String, user_id: String },
    ResourceShared { resource_id: String, group_id: String, user_id: String },
    ResourceUnshared { resource_id: String, group_id: String, user_id: String },
    RequestCreated { request_id: String, resource_id: String, user_id: String },
    RequestUpdated { request_id: String, user_id: String },
    RequestAccepted { request_id: String, loan_id: String, user_id: String },
    RequestDeclined { request_id: String, user_id: String },
    RequestCancelled { request_id: String, user_id: String },
    RequestDeleted { request_id: String, user_id: String },
    LoanReturned { request_id: String, loan_id: String, user_id: String },
}

/// Stream of domain events.
pub type EventStream = Pin<Box<dyn Stream<Item = DomainEvent> + Send>>;

#[async_trait]
pub trait EventBus: Send + Sync {
    /// Broadcast an event to all active subscribers.
    async fn publish(&self, event: DomainEvent) -> Result<(), GearShareError>;

    /// Subscribe to all domain events. The stream yields events as they
    /// occur until it is dropped.
    async fn subscribe(&self) -> Result<EventStream, GearShareError>;
}
