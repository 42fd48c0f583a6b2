//! In-process event bus between the services and whatever renders them

use tokio::sync::broadcast;

use crate::notifications::Notification;

const EVENT_CAPACITY: usize = 64;

/// Events published by the client services
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A push message was turned into a temporary notification
    NotificationArrived(Notification),
    /// The stored session was torn down
    SessionInvalidated,
    /// The view should move to the given path
    Navigate(String),
}

/// Bounded broadcast channel for [`AppEvent`]s
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Subscribe to every event published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: AppEvent) {
        if let Err(e) = self.sender.send(event) {
            log::trace!("No subscribers for event {:?}", e.0);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
