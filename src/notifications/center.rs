//! In-memory notification state for an open page
//!
//! Push messages are prepended as temporary entries right away. Every
//! reconciliation swaps the whole list for the backend's, so a temporary
//! entry (and any read flag set on it) lives at most one poll interval.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, error, warn};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;

use super::{Notification, NotificationsClient};
use crate::error::Error;
use crate::events::{AppEvent, EventBus};
use crate::poll::PollHandle;
use crate::push::{DisplayNotification, NotificationSurface, Permission, PushMessage};

const LOCAL_ICON: &str = "/icon-192.png";

/// Result of [`NotificationCenter::mark_read`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkRead {
    /// Flag flipped and the backend was told
    Synced,
    /// Flag flipped; temporary entry, nothing to tell the backend
    LocalOnly,
    /// Already read, nothing to do
    AlreadyRead,
    NotFound,
}

#[derive(Debug, Default)]
struct State {
    items: Vec<Notification>,
    loaded: bool,
}

/// Notification list shared by the page's views
#[derive(Clone)]
pub struct NotificationCenter {
    client: NotificationsClient,
    state: Arc<RwLock<State>>,
    surface: Option<Arc<dyn NotificationSurface>>,
    events: EventBus,
}

impl NotificationCenter {
    pub fn new(
        client: NotificationsClient,
        surface: Option<Arc<dyn NotificationSurface>>,
        events: EventBus,
    ) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(State::default())),
            surface,
            events,
        }
    }

    /// Snapshot of the current list, newest first
    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.read().await.items.clone()
    }

    pub async fn unread_count(&self) -> usize {
        self.state.read().await.items.iter().filter(|n| !n.read).count()
    }

    /// Whether at least one reconciliation has completed
    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.loaded
    }

    /// Replace the list with the backend's. On failure the current list is kept.
    pub async fn reconcile(&self) -> Result<usize, Error> {
        let items = self.client.list().await?;
        let unread = items.iter().filter(|n| !n.read).count();
        let mut state = self.state.write().await;
        state.items = items;
        state.loaded = true;
        debug!("Reconciled {} notifications, {} unread", state.items.len(), unread);
        Ok(unread)
    }

    /// Foreground listener: show a push message immediately as a temporary entry
    pub async fn handle_push(&self, message: &PushMessage) -> Notification {
        let notification = Notification::from_push(message, Utc::now());
        self.state.write().await.items.insert(0, notification.clone());

        if let Some(surface) = &self.surface {
            if surface.permission() == Permission::Granted {
                let local = DisplayNotification {
                    title: notification.title.clone(),
                    body: notification.message.clone(),
                    icon: LOCAL_ICON.to_string(),
                    badge: None,
                    tag: None,
                    require_interaction: false,
                    data: message.data.clone(),
                    actions: Vec::new(),
                };
                if let Err(e) = surface.show(local).await {
                    warn!("Could not raise local notification: {}", e);
                }
            }
        }

        self.events
            .publish(AppEvent::NotificationArrived(notification.clone()));
        notification
    }

    /// Optimistically mark a notification read.
    ///
    /// The local flag is flipped first and never reverted. Only durable ids
    /// that were still unread reach the backend.
    pub async fn mark_read(&self, id: &str) -> Result<MarkRead, Error> {
        {
            let mut state = self.state.write().await;
            match state.items.iter_mut().find(|n| n.id == id) {
                None => return Ok(MarkRead::NotFound),
                Some(n) if n.read => return Ok(MarkRead::AlreadyRead),
                Some(n) => n.read = true,
            }
        }

        if super::is_temporary_id(id) {
            return Ok(MarkRead::LocalOnly);
        }

        if let Err(e) = self.client.mark_read(id).await {
            error!("Could not mark notification {} as read: {}", id, e);
            return Err(e);
        }
        Ok(MarkRead::Synced)
    }

    /// Reconcile now and then every `period` until the handle is dropped
    pub fn spawn_polling(&self, period: Duration) -> PollHandle {
        let center = self.clone();
        PollHandle::spawn(period, move || {
            let center = center.clone();
            async move {
                if let Err(e) = center.reconcile().await {
                    error!("Could not load notifications: {}", e);
                }
            }
        })
    }

    /// Consume the foreground push channel
    pub fn listen(&self, mut receiver: mpsc::Receiver<PushMessage>) -> JoinHandle<()> {
        let center = self.clone();
        tokio::spawn(async move {
            while let Some(message) = receiver.recv().await {
                center.handle_push(&message).await;
            }
            debug!("Foreground push channel closed");
        })
    }
}
