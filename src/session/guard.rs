//! Route gating

use super::SessionController;

/// Pages of the admin panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Calendar,
    Reservations,
    Notifications,
    Settings,
    ReservationTable,
}

impl Route {
    pub const ALL: [Route; 6] = [
        Route::Login,
        Route::Calendar,
        Route::Reservations,
        Route::Notifications,
        Route::Settings,
        Route::ReservationTable,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Calendar => "/calendario",
            Route::Reservations => "/reservas",
            Route::Notifications => "/notificaciones",
            Route::Settings => "/ajustes",
            Route::ReservationTable => "/tabla-reservas",
        }
    }

    /// Parse a path, ignoring any query string
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        Route::ALL.into_iter().find(|route| route.path() == path)
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }
}

/// Result of a guard check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted,
    Redirect(String),
}

/// Decides whether a route may render for the stored session
#[derive(Clone)]
pub struct RouteGuard {
    session: SessionController,
    login_path: String,
}

impl RouteGuard {
    pub fn new(session: SessionController, login_path: &str) -> Self {
        Self {
            session,
            login_path: login_path.to_string(),
        }
    }

    /// Check a route. Protected routes clear an invalid session as a side effect.
    pub fn check(&self, route: Route) -> Access {
        if route.is_protected() {
            if self.session.is_authenticated() {
                Access::Granted
            } else {
                Access::Redirect(self.login_path.clone())
            }
        } else {
            // An operator who is already signed in skips the login page
            match self.session.current() {
                Some(session) if session.is_admin(self.session.admin_role()) => {
                    Access::Redirect(Route::Calendar.path().to_string())
                }
                _ => Access::Granted,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Session, User};
    use crate::events::EventBus;
    use crate::session::MemoryStorage;
    use std::sync::Arc;

    fn guard() -> (RouteGuard, SessionController) {
        let session = SessionController::new(
            Arc::new(MemoryStorage::new()),
            EventBus::new(),
            "ADMINISTRADOR",
        );
        (RouteGuard::new(session.clone(), "/"), session)
    }

    #[test]
    fn paths_round_trip() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
        assert_eq!(Route::from_path("/reservas?estado=CONFIRMADA"), Some(Route::Reservations));
        assert_eq!(Route::from_path("/nope"), None);
    }

    #[test]
    fn protected_routes_redirect_without_session() {
        let (guard, _) = guard();
        for route in Route::ALL.into_iter().filter(Route::is_protected) {
            assert_eq!(guard.check(route), Access::Redirect("/".to_string()));
        }
        assert_eq!(guard.check(Route::Login), Access::Granted);
    }

    #[test]
    fn signed_in_admin_skips_login() {
        let (guard, session) = guard();
        session
            .store(&Session::new("tok", User::new("1", None, "ADMINISTRADOR")))
            .unwrap();
        assert_eq!(guard.check(Route::Calendar), Access::Granted);
        assert_eq!(guard.check(Route::Login), Access::Redirect("/calendario".to_string()));
    }
}
