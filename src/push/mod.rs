//! Push notifications: registration, background delivery and routing
//!
//! The browser pieces (permission prompt, worker registration, OS
//! notification surface, window list) sit behind the traits in this module.

mod dispatch;
mod registration;
mod worker;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub use dispatch::*;
pub use registration::*;
pub use worker::*;

/// Message delivered by the push provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    /// Display part of the message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<PushNotification>,

    /// Free-form payload, e.g. `reservaId` or `url`
    #[serde(default)]
    pub data: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushNotification {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

impl PushMessage {
    pub fn new(title: &str, body: &str) -> Self {
        Self {
            notification: Some(PushNotification {
                title: Some(title.to_string()),
                body: Some(body.to_string()),
            }),
            data: HashMap::new(),
        }
    }

    pub fn with_data(mut self, key: &str, value: &str) -> Self {
        self.data.insert(key.to_string(), value.to_string());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.notification
            .as_ref()
            .and_then(|n| n.title.as_deref())
            .filter(|t| !t.is_empty())
    }

    pub fn body(&self) -> Option<&str> {
        self.notification
            .as_ref()
            .and_then(|n| n.body.as_deref())
            .filter(|b| !b.is_empty())
    }
}

/// Notification permission as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// The user has not answered yet
    Prompt,
}

/// Handle to the background worker registration a device token is scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerRegistration {
    pub scope: String,
}

/// Action button on an OS notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// OS-level notification to display
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayNotification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: Option<String>,
    /// Notifications sharing a tag replace each other
    pub tag: Option<String>,
    pub require_interaction: bool,
    pub data: HashMap<String, String>,
    pub actions: Vec<NotificationAction>,
}

/// An open application window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowClient {
    pub id: String,
    pub url: String,
}

/// Push provider SDK: issues device tokens
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Wait until the background worker is registered and active
    async fn worker_ready(&self) -> Result<WorkerRegistration, Error>;

    /// Obtain a device token scoped to the worker registration
    async fn get_token(
        &self,
        registration: &WorkerRegistration,
        vapid_key: &str,
    ) -> Result<Option<String>, Error>;
}

/// Platform notification API
#[async_trait]
pub trait NotificationSurface: Send + Sync {
    /// Current permission, without prompting
    fn permission(&self) -> Permission;

    /// Ask the user for permission
    async fn request_permission(&self) -> Result<Permission, Error>;

    async fn show(&self, notification: DisplayNotification) -> Result<(), Error>;

    async fn close(&self, notification: &DisplayNotification) -> Result<(), Error>;
}

/// Window management available to the background worker
#[async_trait]
pub trait WindowClients: Send + Sync {
    /// Every window of the application, including ones the worker does not control
    async fn match_all(&self) -> Result<Vec<WindowClient>, Error>;

    async fn focus(&self, id: &str) -> Result<(), Error>;

    async fn open_window(&self, url: &str) -> Result<(), Error>;
}
