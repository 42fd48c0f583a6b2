//! Configuration options for the admin client

use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::Error;

/// Configuration options for the admin client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Duration,

    /// Delay between a 401 teardown and the redirect to the login page
    pub unauthorized_redirect_delay: Duration,

    /// How often the notification list is reconciled with the backend
    pub notification_poll_interval: Duration,

    /// How often the calendar reloads reservations
    pub calendar_refresh_interval: Duration,

    /// Role a user must carry to use the panel
    pub admin_role: String,

    /// Path of the login page
    pub login_path: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            unauthorized_redirect_delay: Duration::from_secs(1),
            notification_poll_interval: Duration::from_secs(30),
            calendar_refresh_interval: Duration::from_secs(30),
            admin_role: "ADMINISTRADOR".to_string(),
            login_path: "/".to_string(),
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Duration) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the delay before redirecting after a 401
    pub fn with_unauthorized_redirect_delay(mut self, value: Duration) -> Self {
        self.unauthorized_redirect_delay = value;
        self
    }

    /// Set the notification reconciliation interval
    pub fn with_notification_poll_interval(mut self, value: Duration) -> Self {
        self.notification_poll_interval = value;
        self
    }

    /// Set the calendar refresh interval
    pub fn with_calendar_refresh_interval(mut self, value: Duration) -> Self {
        self.calendar_refresh_interval = value;
        self
    }

    /// Set the administrator role name
    pub fn with_admin_role(mut self, value: &str) -> Self {
        self.admin_role = value.to_string();
        self
    }

    /// Set the login page path
    pub fn with_login_path(mut self, value: &str) -> Self {
        self.login_path = value.to_string();
        self
    }
}

/// Where the backend lives and how this client identifies itself to the push provider.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub api_url: Url,
    pub vapid_key: String,
    pub session_file: Option<PathBuf>,
}

impl AdminConfig {
    /// Creates a new configuration, validating the URL.
    pub fn new(api_url: &str, vapid_key: &str) -> Result<Self, Error> {
        let mut api_url = Url::parse(api_url)?;
        if api_url.cannot_be_a_base() {
            return Err(Error::general(format!("{} cannot be used as a base URL", api_url)));
        }
        // Url::join drops the last segment unless the path ends with a slash
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }
        Ok(Self {
            api_url,
            vapid_key: vapid_key.to_string(),
            session_file: None,
        })
    }

    /// Attempts to create configuration from environment variables.
    pub fn from_env() -> Result<Self, Error> {
        let api_url = std::env::var("TRANSFER_ADMIN_API_URL").map_err(|_| {
            Error::general("TRANSFER_ADMIN_API_URL environment variable not found")
        })?;
        let vapid_key = std::env::var("TRANSFER_ADMIN_VAPID_KEY").unwrap_or_default();
        let mut config = Self::new(&api_url, &vapid_key)?;
        config.session_file = std::env::var_os("TRANSFER_ADMIN_SESSION_FILE").map(PathBuf::from);
        Ok(config)
    }

    /// Set the file used to persist the session
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_panel_behaviour() {
        let options = ClientOptions::default();
        assert_eq!(options.request_timeout, Duration::from_secs(10));
        assert_eq!(options.unauthorized_redirect_delay, Duration::from_secs(1));
        assert_eq!(options.notification_poll_interval, Duration::from_secs(30));
        assert_eq!(options.admin_role, "ADMINISTRADOR");
    }

    #[test]
    fn api_url_gets_trailing_slash() {
        let config = AdminConfig::new("https://api.example.com/v1", "").unwrap();
        assert_eq!(config.api_url.join("reservas").unwrap().as_str(), "https://api.example.com/v1/reservas");
    }

    #[test]
    fn reads_environment() {
        std::env::set_var("TRANSFER_ADMIN_API_URL", "http://localhost:3000");
        std::env::set_var("TRANSFER_ADMIN_VAPID_KEY", "BPub");
        std::env::set_var("TRANSFER_ADMIN_SESSION_FILE", "/tmp/session.json");

        let config = AdminConfig::from_env().unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:3000/");
        assert_eq!(config.vapid_key, "BPub");
        assert_eq!(config.session_file, Some(PathBuf::from("/tmp/session.json")));
    }

    #[test]
    fn rejects_non_base_url() {
        assert!(AdminConfig::new("mailto:ops@example.com", "").is_err());
    }
}
