//! User domain model.

use serde::{Deserialize, Deserializer, Serialize};

use super::loose_string;
use crate::error::DomainError;

/// Row of the `Users` table.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(rename = "Username")]
    pub username: String,
    /// Stored as plain text (sometimes as a number) by the hosted table.
    #[serde(rename = "Password", default, deserialize_with = "password_text")]
    password: String,
    #[serde(rename = "Role", default)]
    pub role: Option<String>,
}

fn password_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_string(deserializer)?.unwrap_or_default())
}

impl User {
    /// Compares a submitted password against the stored one.
    pub fn password_matches(&self, candidate: &str) -> bool {
        !self.password.is_empty() && self.password == candidate
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            username: self.username.clone(),
            role: self.role.clone(),
        }
    }
}

/// Public view of a user returned after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub username: String,
    pub role: Option<String>,
}

/// Login request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "loose_string")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub password: Option<String>,
}

impl LoginRequest {
    /// Returns `(username, password)`, both required.
    pub fn credentials(&self) -> Result<(&str, &str), DomainError> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password)) => Ok((username, password)),
            _ => Err(DomainError::validation("username and password required")),
        }
    }
}
