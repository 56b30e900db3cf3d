//! User / Auth API Handlers

use axum::{
    Json,
    extract::{Extension, Query, State},
};

use crate::auth::{CurrentUser, SpecialAccess};
use crate::core::ServerState;
use crate::utils::{AppResult, ValidatedJson};
use shared::models::{
    AdminAccessRequest, AssignPermissions, FirstAdminCreate, Group, GroupCreate, LoginRequest,
    LoginResponse, Permission, PermissionCreate, PinCreate, PinLoginRequest, ProfileUpdate, Role,
    RoleCreate, RoleQuery, TokenResponse, User, UserCreate, UserProfile, UserSettings, UsersExist,
};

// ========== 认证 ==========

/// POST /api/users/signup - 注册 (PIN 必填)
pub async fn signup(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<UserCreate>,
) -> AppResult<Json<User>> {
    let user = state.users.signup(payload).await?;
    Ok(Json(user))
}

/// POST /api/users/login - 用户名密码登录
pub async fn login(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let response = state.users.login(payload).await?;
    Ok(Json(response))
}

/// POST /api/users/login-pin - PIN 登录
pub async fn login_pin(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<PinLoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let response = state.users.login_pin(payload).await?;
    Ok(Json(response))
}

/// POST /api/users/admin-access - 引导口令换取特殊访问令牌
pub async fn admin_access(
    State(state): State<ServerState>,
    Json(payload): Json<AdminAccessRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state.users.admin_access(payload).await?;
    Ok(Json(token))
}

/// POST /api/users/first-admin - 创建首个管理员 (需要特殊访问令牌)
pub async fn first_admin(
    State(state): State<ServerState>,
    _access: SpecialAccess,
    ValidatedJson(payload): ValidatedJson<FirstAdminCreate>,
) -> AppResult<Json<User>> {
    let admin = state.users.create_first_admin(payload).await?;
    Ok(Json(admin))
}

/// GET /api/users/exists - 是否已有用户
pub async fn exists(State(state): State<ServerState>) -> AppResult<Json<UsersExist>> {
    Ok(Json(state.users.users_exist().await?))
}

// ========== 当前用户 ==========

/// GET /api/users/profile - 当前用户资料
pub async fn profile(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(state.users.profile(current_user.id).await?))
}

/// PUT /api/users/profile - 更新资料 (未知角色名自动创建)
pub async fn update_profile(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<ProfileUpdate>,
) -> AppResult<Json<User>> {
    let user = state.users.update_profile(current_user.id, payload).await?;
    Ok(Json(user))
}

/// GET /api/users/settings - 界面设置
pub async fn settings(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<UserSettings>> {
    Ok(Json(state.users.settings(current_user.id).await?))
}

/// PUT /api/users/settings - 更新界面设置
pub async fn update_settings(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<UserSettings>,
) -> AppResult<Json<UserSettings>> {
    let settings = state.users.update_settings(current_user.id, payload).await?;
    Ok(Json(settings))
}

// ========== 用户管理 ==========

/// GET /api/users - 所有用户
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.list().await?))
}

/// GET /api/users/pins - 仍有效的 PIN
pub async fn list_pins(State(state): State<ServerState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.list_pins().await?))
}

/// POST /api/users/pins - 生成 24 小时有效的 PIN 用户
pub async fn generate_pin(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<PinCreate>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.generate_pin(payload).await?))
}

/// GET /api/users/roles?groupId= - 角色列表
pub async fn list_roles(
    State(state): State<ServerState>,
    Query(query): Query<RoleQuery>,
) -> AppResult<Json<Vec<Role>>> {
    Ok(Json(state.users.list_roles(query.group_id).await?))
}

/// POST /api/users/roles - 创建角色
pub async fn create_role(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<RoleCreate>,
) -> AppResult<Json<Role>> {
    Ok(Json(state.users.create_role(payload).await?))
}

/// POST /api/users/roles/assign-permissions - 为角色追加权限
pub async fn assign_permissions(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<AssignPermissions>,
) -> AppResult<Json<Role>> {
    Ok(Json(state.users.assign_permissions(payload).await?))
}

/// GET /api/users/permissions - 权限列表
pub async fn list_permissions(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<Permission>>> {
    Ok(Json(state.users.list_permissions().await?))
}

/// POST /api/users/permissions - 新增权限
pub async fn create_permission(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<PermissionCreate>,
) -> AppResult<Json<Permission>> {
    Ok(Json(state.users.create_permission(payload).await?))
}

/// GET /api/users/groups - 分组列表
pub async fn list_groups(State(state): State<ServerState>) -> AppResult<Json<Vec<Group>>> {
    Ok(Json(state.users.list_groups().await?))
}

/// POST /api/users/groups - 新增分组
pub async fn create_group(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<GroupCreate>,
) -> AppResult<Json<Group>> {
    Ok(Json(state.users.create_group(payload).await?))
}
