//! Notification list, foreground push listener and reconciliation

mod center;
mod types;

use crate::error::Error;
use crate::fetch::ApiClient;

pub use center::*;
pub use types::*;

/// Client for the notification endpoints
#[derive(Clone)]
pub struct NotificationsClient {
    api: ApiClient,
}

impl NotificationsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Authoritative notification list
    pub async fn list(&self) -> Result<Vec<Notification>, Error> {
        self.api.get("/notificaciones").execute().await
    }

    pub async fn mark_read(&self, id: &str) -> Result<(), Error> {
        self.api
            .patch(&format!("/notificaciones/{}/leer", id))
            .execute_empty()
            .await
    }

    /// Associate a push device token with a user (upsert on the backend)
    pub async fn register_device(&self, registration: &DeviceRegistration) -> Result<(), Error> {
        self.api
            .post("/notificaciones/login")
            .json(registration)?
            .execute_empty()
            .await
    }
}
