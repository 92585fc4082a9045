use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

const DEFAULT_DISPLAY_NAME: &str = "User";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Admin => f.write_str("admin"),
        }
    }
}

/// User as returned by `/auth/me`, `/auth/register` and `/users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of a successful `/auth/token` exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Option<UserRecord>,
}

/// `/auth/register` either signs the new account in or just returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegistrationResponse {
    SignedIn(TokenResponse),
    Created(UserRecord),
}

impl RegistrationResponse {
    pub fn credential(&self) -> Option<&str> {
        match self {
            RegistrationResponse::SignedIn(token) => Some(token.access_token.as_str()),
            RegistrationResponse::Created(_) => None,
        }
    }

    pub fn user(&self) -> Option<&UserRecord> {
        match self {
            RegistrationResponse::SignedIn(token) => token.user.as_ref(),
            RegistrationResponse::Created(user) => Some(user),
        }
    }
}

/// Authenticated identity held by the session manager and persisted as
/// the `user_data` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&UserRecord> for Session {
    fn from(user: &UserRecord) -> Self {
        let name = user
            .full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME);
        Session {
            id: user.id,
            name: name.to_string(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}
