use crate::core::errors::GearShareError;
use crate::infrastructure::events::{DomainEvent, EventBus, EventStream};
use async_trait::async_trait;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

/// Single-process event bus on a tokio broadcast channel. Subscribers that
/// fall behind skip lagged events rather than block publishers.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        InMemoryEventBus { sender }
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, event: DomainEvent) -> Result<(), GearShareError> {
        // A send error only means there are no subscribers right now.
        let _ = self.sender.send(event);
        Ok(())
    }

    async fn subscribe(&self) -> Result<EventStream, GearShareError> {
        let receiver = self.sender.subscribe();
        let stream = futures::stream::unfold(receiver, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(event) => return Some((event, rx)),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });
        Ok(Box::pin(stream))
    }
}
