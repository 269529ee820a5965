//! User records
//!
//! A user is keyed by email. The role is optional and unset for ordinary
//! accounts; everything the client posts on first login besides `email` and
//! `role` is kept verbatim in `profile`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::shared::error::SharedError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Stored user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

/// `POST /users` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.email.trim().is_empty() {
            return Err(SharedError::validation("email", "email is required"));
        }
        Ok(())
    }

    pub fn into_user(self) -> User {
        User {
            email: self.email,
            role: self.role,
            profile: self.profile,
        }
    }
}

/// `GET /users/role/{email}` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleResponse {
    pub role: Option<UserRole>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_fields_are_flattened() {
        let body = serde_json::json!({
            "email": "a@x.com",
            "name": "Ada",
            "photo": "https://example.com/a.png"
        });
        let user: NewUser = serde_json::from_value(body).unwrap();
        assert_eq!(user.role, None);
        assert_eq!(user.profile["name"], "Ada");

        let json = serde_json::to_value(user.into_user()).unwrap();
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["photo"], "https://example.com/a.png");
        assert!(json.get("profile").is_none());
    }

    #[test]
    fn test_role_round_trips_lowercase() {
        let user: NewUser =
            serde_json::from_value(serde_json::json!({ "email": "b@x.com", "role": "admin" })).unwrap();
        assert_eq!(user.role, Some(UserRole::Admin));
        assert_eq!(UserRole::parse("user"), Some(UserRole::User));
        assert_eq!(UserRole::parse("root"), None);
    }
}
