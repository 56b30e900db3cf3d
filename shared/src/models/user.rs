//! User Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Built-in staff roles
pub const STAFF_ROLES: &[&str] = &["admin", "waiter", "hostess", "cashier", "kitchen", "bar"];

/// User entity (员工)
///
/// `password_hash` never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub alias: Option<String>,
    pub pin: String,
    /// PIN 过期时间 (Unix millis)
    pub pin_expiration: i64,
    pub role: Option<String>,
    pub role_id: Option<i64>,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub is_demo: bool,
    pub notifications: bool,
    pub dark_mode: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    pub fn is_pin_expired(&self, now: i64) -> bool {
        now > self.pin_expiration
    }

    pub fn role_name(&self) -> &str {
        self.role.as_deref().unwrap_or("")
    }
}

fn validate_staff_role(role: &str) -> Result<(), validator::ValidationError> {
    if STAFF_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("unknown_role"))
    }
}

/// Signup payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    #[validate(length(min = 1, max = 200))]
    pub username: Option<String>,
    #[validate(length(min = 4, max = 128))]
    pub password: Option<String>,
    #[validate(custom(function = "validate_staff_role"))]
    pub role: Option<String>,
    #[validate(length(min = 4, max = 12))]
    pub pin: String,
    pub pin_expiration: Option<i64>,
}

/// Password login payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// PIN login payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PinLoginRequest {
    #[validate(length(min = 1))]
    pub pin: String,
}

/// Token + user returned by both login flavours
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
}

/// Profile view
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user: User,
    pub is_profile_complete: bool,
}

/// Profile update payload; an unknown role name creates the role
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 200))]
    pub username: Option<String>,
    #[validate(length(min = 4, max = 128))]
    pub password: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub role: Option<String>,
    #[validate(length(max = 200))]
    pub alias: Option<String>,
}

/// Per-user UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub notifications: bool,
    pub dark_mode: bool,
}

/// PIN generation payload (creates a PIN-only user valid for 24h)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PinCreate {
    #[validate(length(min = 1, max = 200))]
    pub username: String,
    #[validate(custom(function = "validate_staff_role"))]
    pub role: Option<String>,
    #[validate(length(min = 4, max = 12))]
    pub pin: String,
}

/// Master password exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAccessRequest {
    pub master_key: String,
}

/// First admin payload, accepted only with a special access token
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FirstAdminCreate {
    #[validate(length(min = 1, max = 200))]
    pub username: String,
    #[validate(length(min = 4, max = 128))]
    pub password: String,
    #[validate(length(min = 4, max = 12))]
    pub pin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersExist {
    pub exists: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_not_serialized() {
        let user = User {
            id: 1,
            username: Some("ana".into()),
            alias: None,
            pin: "123456".into(),
            pin_expiration: 0,
            role: Some("waiter".into()),
            role_id: None,
            password_hash: Some("$argon2id$secret".into()),
            is_demo: false,
            notifications: true,
            dark_mode: false,
            created_at: 0,
            updated_at: 0,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["pinExpiration"], 0);
        assert_eq!(json["role"], "waiter");
    }

    #[test]
    fn signup_rejects_unknown_role() {
        let payload = UserCreate {
            username: Some("ana".into()),
            password: None,
            role: Some("sommelier".into()),
            pin: "123456".into(),
            pin_expiration: None,
        };
        assert!(payload.validate().is_err());

        let payload = UserCreate {
            role: Some("cashier".into()),
            ..payload
        };
        assert!(payload.validate().is_ok());
    }
}
