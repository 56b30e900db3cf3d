//! User Service

use std::sync::Arc;
use std::time::Duration;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    AdminAccessRequest, AssignPermissions, FirstAdminCreate, Group, GroupCreate, LoginRequest,
    LoginResponse, Permission, PermissionCreate, PinCreate, PinLoginRequest, ProfileUpdate, Role,
    RoleCreate, TokenResponse, User, UserCreate, UserProfile, UserSettings, UsersExist,
};
use shared::util::now_millis;
use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::permissions::{is_valid_permission, merge_permissions};
use crate::db::repository::user::{NewUser, UserChanges};
use crate::db::repository::{RepoError, group, permission, role, user};
use crate::security_log;

/// 认证固定延迟, 避免通过响应时间枚举用户
const AUTH_FIXED_DELAY_MS: u64 = 200;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Lifetime of a generated PIN user
pub const PIN_USER_TTL_MS: i64 = DAY_MS;

/// PIN lifetime for the first admin and for signups without an expiration
const LONG_PIN_TTL_MS: i64 = 365 * DAY_MS;

#[derive(Clone, Debug)]
pub struct UserService {
    pool: SqlitePool,
    jwt: Arc<JwtService>,
    master_password: Option<String>,
}

impl UserService {
    pub fn new(pool: SqlitePool, jwt: Arc<JwtService>, master_password: Option<String>) -> Self {
        Self {
            pool,
            jwt,
            master_password,
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Username + password login
    pub async fn login(&self, req: LoginRequest) -> AppResult<LoginResponse> {
        let found = user::find_by_username(&self.pool, &req.username).await?;

        tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

        let Some(found) = found else {
            security_log!("WARN", "login_failed", username = req.username.clone(), reason = "user_not_found");
            return Err(invalid_login());
        };

        let password_valid = match found.password_hash.as_deref() {
            Some(hash) => verify_password(&req.password, hash)
                .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?,
            None => false,
        };
        if !password_valid {
            security_log!("WARN", "login_failed", username = req.username.clone(), reason = "invalid_password");
            return Err(invalid_login());
        }

        tracing::info!(user_id = found.id, role = found.role_name(), "User logged in");
        self.issue_token(found).await
    }

    /// PIN login; unknown and expired PINs are both 401
    pub async fn login_pin(&self, req: PinLoginRequest) -> AppResult<LoginResponse> {
        let found = user::find_by_pin(&self.pool, &req.pin).await?;

        tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

        let Some(found) = found else {
            security_log!("WARN", "pin_login_failed", reason = "unknown_pin");
            return Err(AppError::with_message(
                ErrorCode::InvalidCredentials,
                "Invalid or expired PIN",
            ));
        };
        if found.is_pin_expired(now_millis()) {
            security_log!("WARN", "pin_login_failed", user_id = found.id, reason = "expired");
            return Err(AppError::with_message(
                ErrorCode::PinExpired,
                "Invalid or expired PIN",
            ));
        }

        tracing::info!(user_id = found.id, role = found.role_name(), "User logged in with PIN");
        self.issue_token(found).await
    }

    async fn issue_token(&self, found: User) -> AppResult<LoginResponse> {
        let custom = match found.role_id {
            Some(role_id) => role::find_by_id(&self.pool, role_id)
                .await?
                .map(|r| r.permissions)
                .unwrap_or_default(),
            None => Vec::new(),
        };
        let permissions = merge_permissions(found.role_name(), &custom);
        let display = found
            .username
            .clone()
            .or_else(|| found.alias.clone())
            .unwrap_or_default();

        let token = self
            .jwt
            .generate_token(found.id, &display, found.role_name(), &permissions)
            .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

        Ok(LoginResponse {
            token,
            expires_in: self.jwt.config.expiration_minutes * 60,
            user: found,
        })
    }

    /// Exchange the master password for a short-lived bootstrap token
    pub async fn admin_access(&self, req: AdminAccessRequest) -> AppResult<TokenResponse> {
        if user::count(&self.pool).await? > 0 {
            security_log!("WARN", "admin_access_denied", reason = "users_exist");
            return Err(AppError::with_message(
                ErrorCode::BootstrapClosed,
                "Access denied: users already exist",
            ));
        }

        let matches = self
            .master_password
            .as_deref()
            .is_some_and(|master| master == req.master_key);
        if !matches {
            security_log!("WARN", "admin_access_denied", reason = "invalid_master_key");
            return Err(AppError::with_message(
                ErrorCode::InvalidCredentials,
                "Invalid master key",
            ));
        }

        let token = self
            .jwt
            .generate_special_token()
            .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;
        security_log!(
            "INFO",
            "admin_access_granted",
            expires_in_minutes = self.jwt.config.special_expiration_minutes
        );
        Ok(TokenResponse { token })
    }

    /// Create the first admin (only while no user exists)
    pub async fn create_first_admin(&self, data: FirstAdminCreate) -> AppResult<User> {
        let password_hash = hash(&data.password)?;

        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        if user::count(&mut *tx).await? > 0 {
            return Err(AppError::with_message(
                ErrorCode::BootstrapClosed,
                "Users already exist",
            ));
        }
        let admin = user::create(
            &mut *tx,
            NewUser {
                username: Some(data.username),
                pin: data.pin,
                pin_expiration: now_millis() + LONG_PIN_TTL_MS,
                role: Some("admin".into()),
                password_hash: Some(password_hash),
                ..Default::default()
            },
        )
        .await
        .map_err(user_write_error)?;
        tx.commit().await.map_err(RepoError::from)?;

        security_log!("INFO", "first_admin_created", user_id = admin.id);
        Ok(admin)
    }

    pub async fn users_exist(&self) -> AppResult<UsersExist> {
        let count = user::count(&self.pool).await?;
        Ok(UsersExist { exists: count > 0 })
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub async fn signup(&self, data: UserCreate) -> AppResult<User> {
        let password_hash = data.password.as_deref().map(hash).transpose()?;
        let created = user::create(
            &self.pool,
            NewUser {
                username: data.username,
                pin: data.pin,
                pin_expiration: data
                    .pin_expiration
                    .unwrap_or_else(|| now_millis() + LONG_PIN_TTL_MS),
                role: data.role,
                password_hash,
                ..Default::default()
            },
        )
        .await
        .map_err(user_write_error)?;

        tracing::info!(user_id = created.id, role = created.role_name(), "User created");
        Ok(created)
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        Ok(user::find_all(&self.pool).await?)
    }

    /// PIN-only user valid for [`PIN_USER_TTL_MS`]
    pub async fn generate_pin(&self, data: PinCreate) -> AppResult<User> {
        let created = user::create(
            &self.pool,
            NewUser {
                username: Some(data.username),
                pin: data.pin,
                pin_expiration: now_millis() + PIN_USER_TTL_MS,
                role: data.role,
                ..Default::default()
            },
        )
        .await
        .map_err(user_write_error)?;

        tracing::info!(user_id = created.id, expires_at = created.pin_expiration, "PIN generated");
        Ok(created)
    }

    /// Users whose PIN is still valid
    pub async fn list_pins(&self) -> AppResult<Vec<User>> {
        Ok(user::find_with_active_pin(&self.pool, now_millis()).await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<User> {
        user::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::with_message(ErrorCode::UserNotFound, format!("User {id} not found")))
    }

    pub async fn profile(&self, id: i64) -> AppResult<UserProfile> {
        let found = self.get(id).await?;
        let is_profile_complete = found.username.is_some() && found.role_id.is_some();
        Ok(UserProfile {
            user: found,
            is_profile_complete,
        })
    }

    /// Update the caller's profile; a role name that does not exist yet is
    /// created without permissions
    pub async fn update_profile(&self, id: i64, data: ProfileUpdate) -> AppResult<User> {
        let password_hash = data.password.as_deref().map(hash).transpose()?;

        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let role_id = match data.role.as_deref() {
            Some(name) => Some(role::find_or_create(&mut tx, name).await?.id),
            None => None,
        };
        let updated = user::update_profile(
            &mut *tx,
            id,
            UserChanges {
                username: data.username,
                alias: data.alias,
                role_id,
                password_hash,
                ..Default::default()
            },
        )
        .await
        .map_err(user_write_error)?;
        tx.commit().await.map_err(RepoError::from)?;

        Ok(updated)
    }

    pub async fn settings(&self, id: i64) -> AppResult<UserSettings> {
        let found = self.get(id).await?;
        Ok(UserSettings {
            notifications: found.notifications,
            dark_mode: found.dark_mode,
        })
    }

    pub async fn update_settings(&self, id: i64, data: UserSettings) -> AppResult<UserSettings> {
        let updated = user::update_settings(&self.pool, id, data.notifications, data.dark_mode)
            .await
            .map_err(user_write_error)?;
        Ok(UserSettings {
            notifications: updated.notifications,
            dark_mode: updated.dark_mode,
        })
    }

    // =========================================================================
    // Roles / permissions / groups
    // =========================================================================

    pub async fn list_roles(&self, group_id: Option<i64>) -> AppResult<Vec<Role>> {
        Ok(role::find_all(&self.pool, group_id).await?)
    }

    pub async fn create_role(&self, data: RoleCreate) -> AppResult<Role> {
        check_permission_names(&data.permissions)?;
        if let Some(group_id) = data.group_id
            && group::find_by_id(&self.pool, group_id).await?.is_none()
        {
            return Err(AppError::not_found(format!("Group {group_id}")));
        }

        let created = role::create(&self.pool, &data.name, &data.permissions, data.group_id).await?;
        tracing::info!(role_id = created.id, name = %created.name, "Role created");
        Ok(created)
    }

    pub async fn assign_permissions(&self, data: AssignPermissions) -> AppResult<Role> {
        check_permission_names(&data.permissions)?;

        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let updated = role::add_permissions(&mut tx, data.role_id, &data.permissions)
            .await
            .map_err(|e| match e {
                RepoError::NotFound(msg) => AppError::with_message(ErrorCode::RoleNotFound, msg),
                other => other.into(),
            })?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(role_id = updated.id, permissions = ?updated.permissions, "Role permissions updated");
        Ok(updated)
    }

    pub async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        Ok(permission::find_all(&self.pool).await?)
    }

    pub async fn create_permission(&self, data: PermissionCreate) -> AppResult<Permission> {
        check_permission_names(std::slice::from_ref(&data.name))?;
        Ok(permission::create(&self.pool, &data.name, data.description.as_deref()).await?)
    }

    pub async fn list_groups(&self) -> AppResult<Vec<Group>> {
        Ok(group::find_all(&self.pool).await?)
    }

    pub async fn create_group(&self, data: GroupCreate) -> AppResult<Group> {
        Ok(group::create(&self.pool, &data.name, data.description.as_deref()).await?)
    }
}

fn invalid_login() -> AppError {
    AppError::with_message(ErrorCode::InvalidCredentials, "Invalid username or password")
}

fn hash(password: &str) -> AppResult<String> {
    hash_password(password).map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

fn check_permission_names(names: &[String]) -> AppResult<()> {
    let invalid: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|p| !is_valid_permission(p))
        .collect();
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(AppError::validation(format!("Invalid permission names: {}", invalid.join(", "))))
    }
}

/// Unique violations on the user table carry their own codes
fn user_write_error(err: RepoError) -> AppError {
    match err {
        RepoError::Duplicate(msg) if msg.starts_with("PIN") => {
            AppError::with_message(ErrorCode::PinExists, msg)
        }
        RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::UsernameExists, msg),
        RepoError::NotFound(msg) => AppError::with_message(ErrorCode::UserNotFound, msg),
        other => other.into(),
    }
}
