//! Session ownership: the only place the stored token and profile change

mod guard;
mod storage;

use std::sync::{Arc, Mutex};

use log::{debug, warn};

use crate::auth::{Session, User};
use crate::error::Error;
use crate::events::{AppEvent, EventBus};

pub use guard::*;
pub use storage::*;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Owns the persisted session. Every writer replaces both keys or clears both.
#[derive(Clone)]
pub struct SessionController {
    storage: Arc<dyn SessionStorage>,
    events: EventBus,
    admin_role: String,
    clearing: Arc<Mutex<()>>,
}

impl SessionController {
    pub fn new(storage: Arc<dyn SessionStorage>, events: EventBus, admin_role: &str) -> Self {
        Self {
            storage,
            events,
            admin_role: admin_role.to_string(),
            clearing: Arc::new(Mutex::new(())),
        }
    }

    pub fn admin_role(&self) -> &str {
        &self.admin_role
    }

    /// Persist a freshly issued session
    pub fn store(&self, session: &Session) -> Result<(), Error> {
        let user = serde_json::to_string(&session.user)?;
        let result = self
            .storage
            .set(TOKEN_KEY, &session.token)
            .and_then(|_| self.storage.set(USER_KEY, &user));
        if let Err(e) = result {
            self.clear();
            return Err(e);
        }
        debug!("Stored session for user {}", session.user.id);
        Ok(())
    }

    /// The stored bearer token, if any
    pub fn token(&self) -> Option<String> {
        match self.storage.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!("Could not read token: {}", e);
                None
            }
        }
    }

    /// The stored profile. A profile that does not parse is an error, not `None`.
    pub fn user(&self) -> Result<Option<User>, Error> {
        match self.storage.get(USER_KEY)? {
            Some(raw) if !raw.is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
            _ => Ok(None),
        }
    }

    /// The stored session without validating the role and without side effects
    pub fn current(&self) -> Option<Session> {
        let token = self.token()?;
        let user = self.user().ok().flatten()?;
        Some(Session::new(token, user))
    }

    /// Route-guard check: true only for a complete session with the admin role.
    ///
    /// Any other state clears both keys before returning false.
    pub fn is_authenticated(&self) -> bool {
        match self.current() {
            Some(session) if session.is_admin(&self.admin_role) => true,
            Some(session) => {
                warn!("User {} is not an administrator, clearing session", session.user.id);
                self.clear();
                false
            }
            None => {
                self.clear();
                false
            }
        }
    }

    /// Remove both keys. Returns whether anything was stored before.
    ///
    /// Concurrent callers are serialized, so only one of them sees the keys.
    pub fn clear(&self) -> bool {
        // A poisoned lock only means another clear panicked midway
        let _clearing = self.clearing.lock().unwrap_or_else(|e| e.into_inner());
        let mut had_any = false;
        for key in [TOKEN_KEY, USER_KEY] {
            match self.storage.take(key) {
                Ok(Some(_)) => had_any = true,
                Ok(None) => {}
                Err(e) => {
                    warn!("Could not remove {}: {}", key, e);
                    had_any = true;
                }
            }
        }
        had_any
    }

    /// Tear the session down after the backend refused it.
    ///
    /// Publishes [`AppEvent::SessionInvalidated`] only when there was a session
    /// to tear down, so concurrent 401s produce a single teardown.
    pub fn invalidate(&self) -> bool {
        let cleared = self.clear();
        if cleared {
            debug!("Session invalidated");
            self.events.publish(AppEvent::SessionInvalidated);
        }
        cleared
    }
}
