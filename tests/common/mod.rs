#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use transfer_admin::auth::{Session, User};
use transfer_admin::config::{AdminConfig, ClientOptions};
use transfer_admin::error::Error;
use transfer_admin::push::{
    DisplayNotification, NotificationSurface, Permission, PushProvider, WindowClient,
    WindowClients, WorkerRegistration,
};
use transfer_admin::AdminPanel;
use wiremock::MockServer;

pub const ADMIN: &str = "ADMINISTRADOR";

pub fn options() -> ClientOptions {
    ClientOptions::default()
        .with_request_timeout(Duration::from_secs(2))
        .with_unauthorized_redirect_delay(Duration::from_millis(50))
}

pub fn config(server: &MockServer) -> AdminConfig {
    AdminConfig::new(&server.uri(), "test-vapid-key").unwrap()
}

pub fn panel(server: &MockServer) -> AdminPanel {
    AdminPanel::builder(config(server)).options(options()).build().unwrap()
}

pub fn admin_session() -> Session {
    Session::new("test-token", User::new("u-1", Some("admin@example.com"), ADMIN))
}

/// A panel with an administrator already signed in
pub fn signed_in(panel: AdminPanel) -> AdminPanel {
    panel.session().store(&admin_session()).unwrap();
    panel
}

pub fn reservation_json(id: &str, name: &str, estado: &str) -> Value {
    json!({
        "id": id,
        "nombre": name,
        "telefono": "8888-0000",
        "correoElectronico": format!("{}@example.com", id),
        "fechaHoraServicio": "2026-10-20T14:00:00.000Z",
        "lugarRecogida": "Hotel Central",
        "destino": "Aeropuerto SJO",
        "cantidadPersonas": 2,
        "estado": estado,
        "fechaCreacion": "2026-10-17T09:00:00.000Z"
    })
}

pub fn notification_json(id: u64, leida: bool) -> Value {
    json!({
        "id": id,
        "titulo": format!("Reserva {}", id),
        "mensaje": "Nueva solicitud",
        "datos": { "reservaId": format!("r-{}", id) },
        "fechaCreacion": "2026-10-17T09:00:00.000Z",
        "leida": leida
    })
}

/// Notification surface that records what it shows
pub struct FakeSurface {
    permission: Permission,
    pub shown: Mutex<Vec<DisplayNotification>>,
    pub closed: Mutex<usize>,
}

impl FakeSurface {
    pub fn new(permission: Permission) -> Arc<Self> {
        Arc::new(Self {
            permission,
            shown: Mutex::new(Vec::new()),
            closed: Mutex::new(0),
        })
    }

    pub fn shown(&self) -> Vec<DisplayNotification> {
        self.shown.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSurface for FakeSurface {
    fn permission(&self) -> Permission {
        self.permission
    }

    async fn request_permission(&self) -> Result<Permission, Error> {
        Ok(self.permission)
    }

    async fn show(&self, notification: DisplayNotification) -> Result<(), Error> {
        self.shown.lock().unwrap().push(notification);
        Ok(())
    }

    async fn close(&self, _notification: &DisplayNotification) -> Result<(), Error> {
        *self.closed.lock().unwrap() += 1;
        Ok(())
    }
}

/// Push provider handing out a fixed token
pub struct FakeProvider {
    token: Option<String>,
    fail: bool,
}

impl FakeProvider {
    pub fn with_token(token: &str) -> Arc<Self> {
        Arc::new(Self {
            token: Some(token.to_string()),
            fail: false,
        })
    }

    pub fn without_token() -> Arc<Self> {
        Arc::new(Self {
            token: None,
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            token: None,
            fail: true,
        })
    }
}

#[async_trait]
impl PushProvider for FakeProvider {
    async fn worker_ready(&self) -> Result<WorkerRegistration, Error> {
        if self.fail {
            return Err(Error::push("worker registration failed"));
        }
        Ok(WorkerRegistration {
            scope: "/".to_string(),
        })
    }

    async fn get_token(
        &self,
        _registration: &WorkerRegistration,
        vapid_key: &str,
    ) -> Result<Option<String>, Error> {
        assert_eq!(vapid_key, "test-vapid-key");
        Ok(self.token.clone())
    }
}

/// Window list that records focus and open calls
#[derive(Default)]
pub struct FakeWindows {
    pub windows: Vec<WindowClient>,
    pub focused: Mutex<Vec<String>>,
    pub opened: Mutex<Vec<String>>,
}

impl FakeWindows {
    pub fn with_windows(urls: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            windows: urls
                .iter()
                .enumerate()
                .map(|(i, url)| WindowClient {
                    id: format!("w{}", i),
                    url: url.to_string(),
                })
                .collect(),
            ..Self::default()
        })
    }
}

#[async_trait]
impl WindowClients for FakeWindows {
    async fn match_all(&self) -> Result<Vec<WindowClient>, Error> {
        Ok(self.windows.clone())
    }

    async fn focus(&self, id: &str) -> Result<(), Error> {
        self.focused.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn open_window(&self, url: &str) -> Result<(), Error> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}
