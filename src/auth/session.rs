//! Session data for the logged-in operator

use serde::{Deserialize, Serialize};

/// Session data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The bearer token issued by `/auth/login`
    pub token: String,

    /// The profile of the logged-in user
    pub user: User,
}

/// User profile as returned by the backend and persisted under the `user` key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user ID
    #[serde(deserialize_with = "crate::wire::id")]
    pub id: String,

    /// The user's email address
    #[serde(rename = "correoElectronico", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// The user's role
    #[serde(rename = "rol")]
    pub role: String,

    /// Any other profile fields, kept so the stored profile round-trips
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Session {
    /// Create a new session
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    /// Whether this session may render protected pages
    pub fn is_admin(&self, admin_role: &str) -> bool {
        !self.token.is_empty() && self.user.role == admin_role
    }
}

impl User {
    pub fn new(id: impl Into<String>, email: Option<&str>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.map(str::to_string),
            role: role.into(),
            extra: serde_json::Map::new(),
        }
    }
}
