//! Background delivery worker
//!
//! Runs as its own task and is reached only through its channel, the same
//! way the page never touches a service worker's state directly.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;

use super::{DisplayNotification, NotificationAction, NotificationSurface, PushMessage, WindowClients};
use crate::error::Error;

pub const DEFAULT_TITLE: &str = "Transporte Eliud";
pub const DEFAULT_BODY: &str = "Nueva notificación";
pub const NOTIFICATION_ICON: &str = "/icon-192.png";
pub const NOTIFICATION_TAG: &str = "transporte-eliud-notification";
pub const DEFAULT_TARGET_URL: &str = "/notificaciones";
pub const VIEW_ACTION: &str = "view";
pub const CLOSE_ACTION: &str = "close";

const WORKER_QUEUE: usize = 32;

/// A click on a displayed notification
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationClick {
    /// Button that was pressed, `None` for the notification body
    pub action: Option<String>,
    pub notification: DisplayNotification,
}

/// What the worker did with a click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Dismissed,
    Focused(String),
    Opened(String),
}

/// Input to the worker task
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Push(PushMessage),
    Click(NotificationClick),
}

/// Displays push messages while no page has focus and routes clicks back into the app
pub struct BackgroundWorker {
    surface: Arc<dyn NotificationSurface>,
    clients: Arc<dyn WindowClients>,
}

impl BackgroundWorker {
    pub fn new(surface: Arc<dyn NotificationSurface>, clients: Arc<dyn WindowClients>) -> Self {
        Self { surface, clients }
    }

    /// Build the OS notification for a push message
    pub fn build_notification(message: &PushMessage) -> DisplayNotification {
        let mut data = HashMap::new();
        data.insert("url".to_string(), DEFAULT_TARGET_URL.to_string());
        // Message data wins, including its own url
        data.extend(message.data.clone());

        DisplayNotification {
            title: message.title().unwrap_or(DEFAULT_TITLE).to_string(),
            body: message.body().unwrap_or(DEFAULT_BODY).to_string(),
            icon: NOTIFICATION_ICON.to_string(),
            badge: Some(NOTIFICATION_ICON.to_string()),
            tag: Some(NOTIFICATION_TAG.to_string()),
            require_interaction: true,
            data,
            actions: vec![
                NotificationAction {
                    action: VIEW_ACTION.to_string(),
                    title: "Ver Reserva".to_string(),
                },
                NotificationAction {
                    action: CLOSE_ACTION.to_string(),
                    title: "Cerrar".to_string(),
                },
            ],
        }
    }

    pub async fn handle_push(&self, message: &PushMessage) -> Result<DisplayNotification, Error> {
        debug!("Background push received: {:?}", message);
        let notification = Self::build_notification(message);
        self.surface.show(notification.clone()).await?;
        Ok(notification)
    }

    pub async fn handle_click(&self, click: &NotificationClick) -> Result<ClickOutcome, Error> {
        if let Err(e) = self.surface.close(&click.notification).await {
            warn!("Could not close notification: {}", e);
        }

        if click.action.as_deref() == Some(CLOSE_ACTION) {
            return Ok(ClickOutcome::Dismissed);
        }

        let target = click
            .notification
            .data
            .get("url")
            .filter(|u| !u.is_empty())
            .cloned()
            .unwrap_or_else(|| "/".to_string());

        let windows = self.clients.match_all().await?;
        if let Some(window) = windows.iter().find(|w| shows_url(&w.url, &target)) {
            self.clients.focus(&window.id).await?;
            return Ok(ClickOutcome::Focused(window.id.clone()));
        }

        self.clients.open_window(&target).await?;
        Ok(ClickOutcome::Opened(target))
    }

    async fn handle(&self, event: WorkerEvent) {
        match event {
            WorkerEvent::Push(message) => {
                if let Err(e) = self.handle_push(&message).await {
                    error!("Failed to display background notification: {}", e);
                }
            }
            WorkerEvent::Click(click) => match self.handle_click(&click).await {
                Ok(outcome) => debug!("Notification click handled: {:?}", outcome),
                Err(e) => error!("Failed to handle notification click: {}", e),
            },
        }
    }

    /// Move the worker onto its own task
    pub fn spawn(self) -> WorkerHandle {
        let (sender, mut receiver) = mpsc::channel::<WorkerEvent>(WORKER_QUEUE);
        let join = tokio::spawn(async move {
            info!("Background worker started");
            while let Some(event) = receiver.recv().await {
                self.handle(event).await;
            }
            info!("Background worker stopped");
        });
        WorkerHandle { sender, join }
    }
}

/// Whether a window at `window_url` is already showing `target`.
/// Relative targets are compared against the window's path and query.
fn shows_url(window_url: &str, target: &str) -> bool {
    if window_url == target {
        return true;
    }
    match Url::parse(window_url) {
        Ok(url) if target.starts_with('/') => {
            let mut path = url.path().to_string();
            if let Some(query) = url.query() {
                path.push('?');
                path.push_str(query);
            }
            path == target
        }
        _ => false,
    }
}

/// Channel into a spawned [`BackgroundWorker`]
pub struct WorkerHandle {
    sender: mpsc::Sender<WorkerEvent>,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    pub fn sender(&self) -> mpsc::Sender<WorkerEvent> {
        self.sender.clone()
    }

    pub async fn send(&self, event: WorkerEvent) -> Result<(), Error> {
        self.sender
            .send(event)
            .await
            .map_err(|_| Error::push("background worker is not running"))
    }

    /// Close the channel and wait for queued events to drain
    pub async fn shutdown(self) {
        drop(self.sender);
        if let Err(e) = self.join.await {
            error!("Background worker task failed: {}", e);
        }
    }
}
