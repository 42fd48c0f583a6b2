//! Wire types for the login endpoint

use serde::{Deserialize, Serialize};

use super::User;

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    #[serde(rename = "correoElectronico")]
    pub email: String,

    #[serde(rename = "contrasena")]
    pub password: String,
}

/// Successful login response
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// The bearer token
    pub token: String,

    /// The authenticated user
    #[serde(rename = "usuario")]
    pub user: User,
}
