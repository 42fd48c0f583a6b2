//! Login and logout against the admin backend

mod session;
mod types;

use log::info;

use crate::error::Error;
use crate::events::AppEvent;
use crate::fetch::ApiClient;

pub use session::*;
pub use types::*;

pub const ACCESS_DENIED_MESSAGE: &str =
    "Acceso denegado. Solo administradores pueden acceder al panel.";

/// Client for authentication
#[derive(Clone)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Sign in with email and password.
    ///
    /// Only administrators are let in; anyone else gets [`Error::Auth`] and
    /// nothing is stored.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, Error> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self
            .api
            .post("/auth/login")
            .json(&body)?
            .execute::<LoginResponse>()
            .await?;

        let session = Session::new(response.token, response.user);
        let session_ctl = self.api.session();
        if !session.is_admin(session_ctl.admin_role()) {
            return Err(Error::auth(ACCESS_DENIED_MESSAGE));
        }

        session_ctl.store(&session)?;
        info!("User {} signed in", session.user.id);
        Ok(session)
    }

    /// Sign out locally and go back to the login page
    pub fn logout(&self) {
        self.api.session().clear();
        self.api
            .events()
            .publish(AppEvent::Navigate(self.api.options().login_path.clone()));
        info!("Signed out");
    }
}
