//! Device registration for push delivery

use std::sync::Arc;

use log::{debug, error, info};

use super::{NotificationSurface, Permission, PushProvider};
use crate::error::Error;
use crate::notifications::{DeviceRegistration, NotificationsClient};
use crate::session::SessionController;

/// How a registration attempt ended. Only `Registered` reached the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered,
    PermissionDenied,
    NoToken,
    NoUser,
    Failed(String),
}

/// Requests permission, obtains a device token and hands it to the backend.
///
/// Push is an optional enhancement: every failure is logged and reported as
/// an outcome, never as an error.
#[derive(Clone)]
pub struct PushRegistrar {
    surface: Arc<dyn NotificationSurface>,
    provider: Arc<dyn PushProvider>,
    notifications: NotificationsClient,
    session: SessionController,
    vapid_key: String,
}

impl PushRegistrar {
    pub fn new(
        surface: Arc<dyn NotificationSurface>,
        provider: Arc<dyn PushProvider>,
        notifications: NotificationsClient,
        session: SessionController,
        vapid_key: &str,
    ) -> Self {
        Self {
            surface,
            provider,
            notifications,
            session,
            vapid_key: vapid_key.to_string(),
        }
    }

    pub async fn register_for_push(&self) -> RegistrationOutcome {
        match self.try_register().await {
            Ok(outcome) => {
                debug!("Push registration finished: {:?}", outcome);
                outcome
            }
            Err(e) => {
                error!("Push registration failed: {}", e);
                RegistrationOutcome::Failed(e.to_string())
            }
        }
    }

    async fn try_register(&self) -> Result<RegistrationOutcome, Error> {
        if self.surface.request_permission().await? != Permission::Granted {
            return Ok(RegistrationOutcome::PermissionDenied);
        }

        let registration = self.provider.worker_ready().await?;

        let token = match self.provider.get_token(&registration, &self.vapid_key).await? {
            Some(token) if !token.is_empty() => token,
            _ => return Ok(RegistrationOutcome::NoToken),
        };

        let user = match self.session.user()? {
            Some(user) => user,
            None => return Ok(RegistrationOutcome::NoUser),
        };

        self.notifications
            .register_device(&DeviceRegistration {
                token,
                user_id: user.id.clone(),
                role: user.role.clone(),
            })
            .await?;

        info!("Registered push token for user {}", user.id);
        Ok(RegistrationOutcome::Registered)
    }
}
