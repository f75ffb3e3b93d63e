//! User and Session records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::value_objects::{emails_match, new_id, Role};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub role: Role,
    pub name: String,
    pub email: String,
    pub password: String,
    /// Soft-delete flag; records without it count as active.
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

fn default_active() -> bool { true }

impl User {
    pub fn create(role: Role, name: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: new_id("u"), role, name: name.into(), email: email.into().trim().to_lowercase(),
            password: password.into(), active: true, whatsapp: None, phone: None,
            created_at: Some(Utc::now()), last_login: None,
        }
    }

    pub fn has_email(&self, email: &str) -> bool { emails_match(&self.email, email) }
}

/// The single active-login record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub login_time: DateTime<Utc>,
}

impl Session {
    pub fn for_user(user: &User) -> Self {
        Self { id: user.id.clone(), role: user.role, name: user.name.clone(), email: user.email.clone(), login_time: Utc::now() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_active_defaults_true() {
        let user: User = serde_json::from_str(r#"{"id":"c1","role":"client","name":"Cliente","email":"c@hb.local","password":"x"}"#).unwrap();
        assert!(user.active);
        assert!(user.created_at.is_none());
    }

    #[test]
    fn test_session_copies_identity() {
        let user = User::create(Role::Distributor, "Alfa", "Distri@HB.local", "distri123");
        let session = Session::for_user(&user);
        assert_eq!(session.id, user.id);
        assert_eq!(session.role, Role::Distributor);
        assert_eq!(session.email, "distri@hb.local");
        assert!(user.has_email("DISTRI@hb.local"));
    }
}
