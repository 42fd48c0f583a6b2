//! Transfer Admin Client Library
//!
//! A Rust client for the administration panel of a passenger-transport
//! booking service: operator login, reservation review and editing, a
//! reservation calendar, spreadsheet export, and push-driven notifications.

pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod fetch;
pub mod notifications;
pub mod poll;
pub mod push;
pub mod reservations;
pub mod session;

mod wire;

use std::sync::Arc;

use log::debug;
use tokio::task::JoinHandle;

use crate::auth::{AuthClient, Session};
use crate::config::{AdminConfig, ClientOptions};
use crate::error::Error;
use crate::events::EventBus;
use crate::fetch::ApiClient;
use crate::notifications::{NotificationCenter, NotificationsClient};
use crate::push::{
    BackgroundWorker, NotificationSurface, PushProvider, PushRegistrar, RegistrationOutcome,
    WindowClients, WorkerHandle,
};
use crate::reservations::{Calendar, ReservationTable, ReservationsClient};
use crate::session::{FileStorage, MemoryStorage, RouteGuard, SessionController, SessionStorage};

pub use wire::parse_timestamp;

/// The main entry point for the admin client
pub struct AdminPanel {
    config: AdminConfig,
    options: ClientOptions,
    events: EventBus,
    session: SessionController,
    api: ApiClient,
    surface: Option<Arc<dyn NotificationSurface>>,
    center: NotificationCenter,
    registrar: Option<PushRegistrar>,
}

impl AdminPanel {
    /// Create a new admin client with default options
    ///
    /// The session lives in memory unless the configuration names a session file.
    ///
    /// # Example
    ///
    /// ```
    /// use transfer_admin::{AdminPanel, config::AdminConfig};
    ///
    /// let config = AdminConfig::new("https://api.example.com", "vapid-key").unwrap();
    /// let panel = AdminPanel::new(config).unwrap();
    /// assert!(!panel.session().is_authenticated());
    /// ```
    pub fn new(config: AdminConfig) -> Result<Self, Error> {
        Self::builder(config).build()
    }

    /// Start configuring an admin client
    pub fn builder(config: AdminConfig) -> AdminPanelBuilder {
        AdminPanelBuilder {
            config,
            options: ClientOptions::default(),
            storage: None,
            surface: None,
            provider: None,
        }
    }

    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Event bus shared by every service of this client
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn guard(&self) -> RouteGuard {
        RouteGuard::new(self.session.clone(), &self.options.login_path)
    }

    pub fn auth(&self) -> AuthClient {
        AuthClient::new(self.api.clone())
    }

    pub fn reservations(&self) -> ReservationsClient {
        ReservationsClient::new(self.api.clone())
    }

    /// A fresh, empty calendar
    pub fn calendar(&self) -> Calendar {
        Calendar::new(self.reservations())
    }

    /// A fresh, empty reservation table
    pub fn table(&self) -> ReservationTable {
        ReservationTable::new(self.reservations())
    }

    pub fn notifications(&self) -> NotificationsClient {
        NotificationsClient::new(self.api.clone())
    }

    /// The notification list shared by every view
    pub fn notification_center(&self) -> &NotificationCenter {
        &self.center
    }

    /// Push registration, if a push provider and notification surface were configured
    pub fn push_registrar(&self) -> Option<&PushRegistrar> {
        self.registrar.as_ref()
    }

    /// Start the background delivery worker on the configured notification surface
    pub fn spawn_background_worker(
        &self,
        clients: Arc<dyn WindowClients>,
    ) -> Result<WorkerHandle, Error> {
        let surface = self
            .surface
            .clone()
            .ok_or_else(|| Error::push("no notification surface configured"))?;
        Ok(BackgroundWorker::new(surface, clients).spawn())
    }

    /// Application start: re-register for push when a user is already stored
    pub fn start(&self) -> Option<JoinHandle<RegistrationOutcome>> {
        match self.session.user() {
            Ok(Some(_)) => self.spawn_registration(),
            Ok(None) => None,
            Err(e) => {
                debug!("Stored user unreadable, skipping push registration: {}", e);
                None
            }
        }
    }

    /// Sign in, then register for push in the background.
    ///
    /// Push registration never affects the outcome of the login.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, Error> {
        let session = self.auth().login(email, password).await?;
        self.spawn_registration();
        Ok(session)
    }

    pub fn logout(&self) {
        self.auth().logout();
    }

    fn spawn_registration(&self) -> Option<JoinHandle<RegistrationOutcome>> {
        let registrar = self.registrar.clone()?;
        Some(tokio::spawn(async move { registrar.register_for_push().await }))
    }
}

/// Builder for [`AdminPanel`]
pub struct AdminPanelBuilder {
    config: AdminConfig,
    options: ClientOptions,
    storage: Option<Arc<dyn SessionStorage>>,
    surface: Option<Arc<dyn NotificationSurface>>,
    provider: Option<Arc<dyn PushProvider>>,
}

impl AdminPanelBuilder {
    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a specific session store instead of the one the configuration implies
    pub fn storage(mut self, storage: Arc<dyn SessionStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Platform notification API, used for local notifications and push permission
    pub fn notification_surface(mut self, surface: Arc<dyn NotificationSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn push_provider(mut self, provider: Arc<dyn PushProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn build(self) -> Result<AdminPanel, Error> {
        let storage: Arc<dyn SessionStorage> = match (self.storage, &self.config.session_file) {
            (Some(storage), _) => storage,
            (None, Some(path)) => Arc::new(FileStorage::new(path.clone())),
            (None, None) => Arc::new(MemoryStorage::new()),
        };

        let events = EventBus::new();
        let session = SessionController::new(storage, events.clone(), &self.options.admin_role);
        let api = ApiClient::new(
            self.config.api_url.clone(),
            session.clone(),
            events.clone(),
            self.options.clone(),
        )?;

        let notifications = NotificationsClient::new(api.clone());
        let center = NotificationCenter::new(notifications.clone(), self.surface.clone(), events.clone());
        let registrar = match (&self.surface, &self.provider) {
            (Some(surface), Some(provider)) => Some(PushRegistrar::new(
                surface.clone(),
                provider.clone(),
                notifications,
                session.clone(),
                &self.config.vapid_key,
            )),
            _ => None,
        };

        Ok(AdminPanel {
            config: self.config,
            options: self.options,
            events,
            session,
            api,
            surface: self.surface,
            center,
            registrar,
        })
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::{AdminConfig, ClientOptions};
    pub use crate::error::Error;
    pub use crate::events::AppEvent;
    pub use crate::reservations::{ReservationQuery, ReservationStatus};
    pub use crate::{AdminPanel, AdminPanelBuilder};
}
