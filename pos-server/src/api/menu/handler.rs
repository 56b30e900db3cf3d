//! Menu API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::core::ServerState;
use crate::utils::{AppResult, ValidatedJson};
use shared::models::{
    MenuCategory, MenuCategoryCreate, MenuCategoryUpdate, MenuItem, MenuItemCreate,
    MenuItemQuery, MenuItemUpdate,
};

/// GET /api/menu/categories - 获取所有分类
pub async fn list_categories(State(state): State<ServerState>) -> AppResult<Json<Vec<MenuCategory>>> {
    Ok(Json(state.catalog.list_categories().await?))
}

/// POST /api/menu/categories - 创建分类
pub async fn create_category(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<MenuCategoryCreate>,
) -> AppResult<Json<MenuCategory>> {
    Ok(Json(state.catalog.create_category(payload).await?))
}

/// PUT /api/menu/categories/:id - 更新分类
pub async fn update_category(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<MenuCategoryUpdate>,
) -> AppResult<Json<MenuCategory>> {
    Ok(Json(state.catalog.update_category(id, payload).await?))
}

/// DELETE /api/menu/categories/:id - 删除分类 (仍有菜品时拒绝)
pub async fn delete_category(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    state.catalog.delete_category(id).await?;
    Ok(Json(true))
}

/// GET /api/menu/items?category=&categoryName= - 获取菜品
pub async fn list_items(
    State(state): State<ServerState>,
    Query(query): Query<MenuItemQuery>,
) -> AppResult<Json<Vec<MenuItem>>> {
    Ok(Json(state.catalog.list_items(query).await?))
}

/// GET /api/menu/items/:id - 获取单个菜品
pub async fn get_item(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MenuItem>> {
    Ok(Json(state.catalog.get_item(id).await?))
}

/// POST /api/menu/items - 创建菜品 (校验配方原料与单位)
pub async fn create_item(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<MenuItemCreate>,
) -> AppResult<Json<MenuItem>> {
    Ok(Json(state.catalog.create_item(payload).await?))
}

/// PUT /api/menu/items/:id - 更新菜品
pub async fn update_item(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<MenuItemUpdate>,
) -> AppResult<Json<MenuItem>> {
    Ok(Json(state.catalog.update_item(id, payload).await?))
}

/// DELETE /api/menu/items/:id - 删除菜品
pub async fn delete_item(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    state.catalog.delete_item(id).await?;
    Ok(Json(true))
}
