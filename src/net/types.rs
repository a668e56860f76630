//! Wire types for the admin auth endpoints.
//!
//! SYSTEM CONTEXT
//! ==============
//! These mirror the JSON the backend returns; the client never sees the
//! session credential itself, only the admin it resolves to.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// The signed-in administrator. Always replaced as a whole, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

/// Body of `POST /auth/admin/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Session validation payload: the backend answers with either shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionPayload {
    #[serde(default)]
    pub user: Option<AdminUser>,
    #[serde(default)]
    pub admin: Option<AdminUser>,
}

impl SessionPayload {
    /// The canonical user, preferring `user` over `admin`.
    #[must_use]
    pub fn into_user(self) -> Option<AdminUser> {
        self.user.or(self.admin)
    }
}

/// Successful login payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub admin: Option<AdminUser>,
}

/// Error body shape used by the backend on failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorPayload {
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        self.error
            .filter(|m| !m.is_empty())
            .or(self.message.filter(|m| !m.is_empty()))
    }
}
